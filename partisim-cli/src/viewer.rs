//! Interactive viewer
//!
//! Drives the simulation from the window's frame loop, draws the particles
//! through the view projection, and reloads the scenario file whenever it
//! changes on disk.

use crate::scenario::ScenarioArgs;
use eframe::egui;
use glam::Vec2;
use notify::{Event, RecommendedWatcher, Watcher};
use partisim_core::view::to_ndc;
use partisim_core::{
    advance_frame, build_simulation_context, get_particle_states, projection, step_simulation,
    SimConfig, SimulationContext,
};
use std::path::PathBuf;
use std::sync::mpsc;

/// Frames between window title refreshes
const TITLE_INTERVAL: u32 = 75;
const TARGET_FPS: f32 = 60.0;

pub fn run_viewer(scenario: ScenarioArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = scenario.resolve()?;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 960.0])
            .with_title("Partisim"),
        ..Default::default()
    };
    eframe::run_native(
        "Partisim",
        options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(scenario, config, cc)))),
    )?;
    Ok(())
}

pub struct ViewerApp {
    scenario: ScenarioArgs,
    config: SimConfig,
    sim_opt: Option<SimulationContext>,
    last_load_error: Option<String>,
    playing: bool,
    frames_since_title: u32,
    #[allow(dead_code)] // Kept alive to maintain file watching
    file_watcher: Option<RecommendedWatcher>,
    file_receiver: mpsc::Receiver<notify::Result<Event>>,
}

impl ViewerApp {
    pub fn new(
        scenario: ScenarioArgs,
        config: SimConfig,
        _cc: &eframe::CreationContext<'_>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            // The receiver may already be gone during shutdown
            let _ = tx.send(res);
        })
        .ok();

        if let (Some(w), Some(path)) = (watcher.as_mut(), scenario.config.as_ref()) {
            if let Err(e) = w.watch(path, notify::RecursiveMode::NonRecursive) {
                log::warn!("not watching {}: {}", path.display(), e);
            }
        }

        let mut app = Self {
            scenario,
            config,
            sim_opt: None,
            last_load_error: None,
            playing: true,
            frames_since_title: 0,
            file_watcher: watcher,
            file_receiver: rx,
        };
        app.rebuild();
        app
    }

    fn watched_path(&self) -> Option<&PathBuf> {
        self.scenario.config.as_ref()
    }

    fn rebuild(&mut self) {
        match build_simulation_context(&self.config) {
            Ok(sim) => {
                log::info!(
                    "loaded scenario with {} particles ({})",
                    sim.world.len(),
                    sim.integrator.broad_phase_name()
                );
                self.sim_opt = Some(sim);
                self.last_load_error = None;
            }
            Err(e) => {
                self.last_load_error = Some(e.to_string());
                self.sim_opt = None;
                self.playing = false;
            }
        }
    }

    fn reload_from_disk(&mut self) {
        match self.scenario.resolve() {
            Ok(config) => {
                self.config = config;
                self.rebuild();
            }
            Err(e) => {
                self.last_load_error = Some(e.to_string());
            }
        }
    }

    fn check_file_changes(&mut self) {
        let mut needs_reload = false;
        while let Ok(event) = self.file_receiver.try_recv() {
            match event {
                Ok(Event {
                    kind: notify::EventKind::Modify(_),
                    paths,
                    ..
                }) => {
                    if let Some(watched) = self.watched_path() {
                        if paths.iter().any(|p| p.ends_with(watched) || p == watched) {
                            needs_reload = true;
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => log::warn!("file watcher error: {}", e),
            }
        }

        if needs_reload {
            self.reload_from_disk();
        }
    }

    fn draw_simulation(&mut self, ui: &mut egui::Ui) {
        let rect = ui.max_rect();
        let Some(sim) = self.sim_opt.as_mut() else {
            return;
        };

        // Scroll to zoom
        if ui.rect_contains_pointer(rect) {
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let zoom = sim.view.zoom() * (1.0 + scroll * 0.001);
                sim.view.set_zoom(zoom);
            }
        }

        sim.view.set_window_width(rect.width());
        let aspect = rect.width() / rect.height().max(1.0);
        let proj = projection(sim, aspect);
        let half = rect.size() / 2.0;
        let to_screen = |p: Vec2| {
            let ndc = to_ndc(&proj, p);
            rect.center() + egui::vec2(ndc.x * half.x, -ndc.y * half.y)
        };

        let painter = ui.painter_at(rect);

        let bounds = *sim.world.bounds();
        let border = egui::Rect::from_two_pos(
            to_screen(bounds.bottom_left),
            to_screen(bounds.top_right),
        );
        painter.rect_stroke(
            border,
            0.0,
            egui::Stroke::new(2.0, egui::Color32::from_white_alpha(128)),
        );

        for particle in get_particle_states(sim) {
            let radius = sim.view.simulation_to_pixel_distance(particle.radius).max(1.0);
            painter.circle_filled(to_screen(particle.pos), radius, egui::Color32::LIGHT_BLUE);
        }
    }

    fn refresh_title(&mut self, ctx: &egui::Context) {
        self.frames_since_title += 1;
        if self.frames_since_title <= TITLE_INTERVAL {
            return;
        }
        self.frames_since_title = 0;
        if let Some(sim) = &self.sim_opt {
            let stats = sim.clock.stats();
            let title = format!(
                "Partisim | {} {}",
                stats,
                stats.rating(TARGET_FPS)
            );
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_file_changes();

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button(if self.playing { "⏸ Pause" } else { "▶ Play" }).clicked() {
                    self.playing = !self.playing;
                    if self.playing {
                        // Time spent paused is not owed to the simulation
                        if let Some(ref mut sim) = self.sim_opt {
                            sim.clock.reset();
                        }
                    }
                }

                if ui.button("⏮ Reset").clicked() {
                    self.rebuild();
                }

                if ui.button("⏭ Step").clicked() {
                    if let Some(ref mut sim) = self.sim_opt {
                        step_simulation(sim);
                    }
                }

                ui.separator();

                if let Some(ref mut sim) = self.sim_opt {
                    let mut zoom = sim.view.zoom();
                    ui.label("Zoom:");
                    if ui
                        .add(egui::Slider::new(&mut zoom, 0.1..=10.0).logarithmic(true))
                        .changed()
                    {
                        sim.view.set_zoom(zoom);
                    }

                    ui.separator();
                    ui.label(format!(
                        "Step: {}  Particles: {}  Anomalies: {}",
                        sim.current_step,
                        sim.world.len(),
                        sim.anomalies.total_anomalies()
                    ));
                }
            });
        });

        if let Some(ref error) = self.last_load_error {
            egui::TopBottomPanel::bottom("errors").show(ctx, |ui| {
                ui.set_max_height(100.0);
                let text = egui::RichText::new(format!("Error: {}", error));
                ui.label(text.color(egui::Color32::RED));
            });
        }

        if self.playing {
            let frame_seconds = ctx.input(|i| i.unstable_dt);
            if let Some(ref mut sim) = self.sim_opt {
                advance_frame(sim, frame_seconds);
            }
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| self.draw_simulation(ui));

        self.refresh_title(ctx);

        if self.playing {
            ctx.request_repaint();
        }
    }
}
