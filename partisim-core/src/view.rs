//! Mapping from simulation space to the camera
//!
//! Pure functions of the domain bounds, zoom, aspect ratio and window
//! width. Nothing here feeds back into the physics.

use crate::engine::Bounds;
use glam::{Mat4, Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    bounds: Bounds,
    zoom: f32,
    window_width: f32,
}

impl ViewTransform {
    pub fn new(bounds: Bounds, zoom: f32, window_width: f32) -> Self {
        let mut view = Self {
            bounds,
            zoom: 1.0,
            window_width: 800.0,
        };
        view.set_zoom(zoom);
        view.set_window_width(window_width);
        view
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Values > 1 magnify. Non-positive or non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom = zoom;
        }
    }

    pub fn window_width(&self) -> f32 {
        self.window_width
    }

    pub fn set_window_width(&mut self, width: f32) {
        if width.is_finite() && width > 0.0 {
            self.window_width = width;
        }
    }

    /// Width of simulation space visible across the window
    pub fn view_width(&self) -> f32 {
        self.bounds.width() / self.zoom
    }

    /// Orthographic projection centered on the domain.
    ///
    /// `border_offset` shifts the view center down by that many simulation
    /// units, leaving room above the domain.
    pub fn projection(&self, aspect_ratio: f32, border_offset: f32) -> Mat4 {
        let mut center = self.bounds.center();
        center.y -= border_offset;

        let view_width = self.view_width();
        let view_height = view_width / aspect_ratio;

        Mat4::orthographic_rh_gl(
            center.x - view_width / 2.0,
            center.x + view_width / 2.0,
            center.y - view_height / 2.0,
            center.y + view_height / 2.0,
            -1.0,
            1.0,
        )
    }

    /// Simulation units covered by `pixels` screen pixels at the current zoom
    pub fn pixel_to_simulation_distance(&self, pixels: f32) -> f32 {
        pixels * self.view_width() / self.window_width
    }

    pub fn simulation_to_pixel_distance(&self, distance: f32) -> f32 {
        distance * self.window_width / self.view_width()
    }
}

/// Project a simulation-space point to normalized device coordinates
pub fn to_ndc(projection: &Mat4, point: Vec2) -> Vec2 {
    projection.project_point3(Vec3::new(point.x, point.y, 0.0)).truncate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(zoom: f32) -> ViewTransform {
        let bounds = Bounds::new(Vec2::new(-1000.0, -750.0), Vec2::new(1000.0, 750.0)).unwrap();
        ViewTransform::new(bounds, zoom, 800.0)
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn unit_zoom_maps_bounds_to_clip_edges() {
        let v = view(1.0);
        let proj = v.projection(2000.0 / 1500.0, 0.0);
        assert!(close(to_ndc(&proj, Vec2::new(-1000.0, -750.0)), Vec2::new(-1.0, -1.0)));
        assert!(close(to_ndc(&proj, Vec2::new(1000.0, 750.0)), Vec2::new(1.0, 1.0)));
        assert!(close(to_ndc(&proj, Vec2::ZERO), Vec2::ZERO));
    }

    #[test]
    fn zoom_magnifies() {
        let proj = view(2.0).projection(4.0 / 3.0, 0.0);
        assert!(close(to_ndc(&proj, Vec2::new(500.0, 0.0)), Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn zoom_out_shrinks() {
        let proj = view(0.5).projection(1.0, 0.0);
        assert!(close(to_ndc(&proj, Vec2::new(1000.0, 0.0)), Vec2::new(0.5, 0.0)));
    }

    #[test]
    fn border_offset_moves_center_down() {
        let proj = view(1.0).projection(1.0, 100.0);
        // The view is centered at y = -100, so the domain center sits above it
        assert!(close(to_ndc(&proj, Vec2::new(0.0, -100.0)), Vec2::ZERO));
        assert!(to_ndc(&proj, Vec2::ZERO).y > 0.0);
    }

    #[test]
    fn pixel_distance_scales_with_zoom() {
        assert_eq!(view(1.0).pixel_to_simulation_distance(400.0), 1000.0);
        assert_eq!(view(2.0).pixel_to_simulation_distance(400.0), 500.0);
        assert_eq!(view(2.0).simulation_to_pixel_distance(500.0), 400.0);
    }

    #[test]
    fn invalid_zoom_is_ignored() {
        let mut v = view(0.7);
        v.set_zoom(0.0);
        v.set_zoom(f32::NAN);
        assert_eq!(v.zoom(), 0.7);
    }
}
