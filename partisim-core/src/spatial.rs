//! Broad-phase contact search
//!
//! The domain is covered by a uniform grid of square cells at least one
//! particle diameter wide, so two touching particles always sit in the same
//! or adjacent cells and only the 3x3 block around a particle needs
//! checking. The grid is rebuilt from scratch every time it is queried.
//!
//! [`BroadPhase`] is the seam between the solver and the search strategy:
//! [`CellGrid`] uses the grid, [`AllPairs`] tests every pair. Both report the
//! same contacts in the same order.

use crate::collision::in_contact;
use crate::engine::{Bounds, Particle, World};
use glam::Vec2;
use std::fmt;

/// Uniform bucket grid over a rectangular domain.
///
/// Positions outside the domain are bucketed into the nearest edge cell.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    origin: Vec2,
    cell_size: f32,
    inv_cell_size: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<usize>>,
}

/// Upper bound on the number of cells in any grid
pub const MAX_CELLS: usize = 1 << 20;

/// Cell budget per particle for [`CellGrid`], never below [`MIN_CELL_BUDGET`]
const CELLS_PER_PARTICLE: usize = 4;
const MIN_CELL_BUDGET: usize = 1024;

impl SpatialGrid {
    pub fn new(bounds: &Bounds, cell_size: f32) -> Self {
        Self::with_max_cells(bounds, cell_size, MAX_CELLS)
    }

    /// Build a grid with cells at least `cell_size` wide, doubling the cell
    /// size until the grid has no more than `max_cells` cells.
    pub fn with_max_cells(bounds: &Bounds, cell_size: f32, max_cells: usize) -> Self {
        // f64 keeps the extent finite for any pair of finite f32 corners
        let width = f64::from(bounds.top_right.x) - f64::from(bounds.bottom_left.x);
        let height = f64::from(bounds.top_right.y) - f64::from(bounds.bottom_left.y);
        let budget = max_cells.max(1) as f64;

        let mut cell = f64::from(cell_size);
        if !(cell.is_finite() && cell > 0.0) {
            cell = width.max(height);
        }
        let (mut cols, mut rows) = axis_cells(width, height, cell);
        while cols * rows > budget {
            cell *= 2.0;
            (cols, rows) = axis_cells(width, height, cell);
        }

        let (cols, rows) = (cols as usize, rows as usize);
        let cell_size = cell.min(f64::from(f32::MAX)) as f32;
        Self {
            origin: bounds.bottom_left,
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols.saturating_mul(rows)],
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// (columns, rows)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Column and row of the cell containing `pos`
    #[inline]
    pub fn cell_of(&self, pos: Vec2) -> (usize, usize) {
        let local = (pos - self.origin) * self.inv_cell_size;
        // Float-to-int casts saturate and map NaN to zero
        let col = (local.x.floor() as i64).clamp(0, self.cols as i64 - 1) as usize;
        let row = (local.y.floor() as i64).clamp(0, self.rows as i64 - 1) as usize;
        (col, row)
    }

    /// Empty every cell, keeping allocations
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    pub fn insert(&mut self, idx: usize, pos: Vec2) {
        let (col, row) = self.cell_of(pos);
        self.cells[row * self.cols + col].push(idx);
    }

    /// Re-bucket every particle by its current position
    pub fn rebuild(&mut self, particles: &[Particle]) {
        self.clear();
        for (idx, particle) in particles.iter().enumerate() {
            self.insert(idx, particle.pos);
        }
    }

    pub fn cell(&self, col: usize, row: usize) -> &[usize] {
        &self.cells[row * self.cols + col]
    }

    /// Collect the indices in the 3x3 block of cells around `pos`, except `idx` itself.
    ///
    /// `neighbors` is cleared first. Each index appears at most once.
    pub fn query_neighbors_into(&self, idx: usize, pos: Vec2, neighbors: &mut Vec<usize>) {
        neighbors.clear();
        let (col, row) = self.cell_of(pos);
        let col_range = col.saturating_sub(1)..=(col + 1).min(self.cols - 1);
        let row_range = row.saturating_sub(1)..=(row + 1).min(self.rows - 1);

        for r in row_range {
            for c in col_range.clone() {
                neighbors.extend(self.cell(c, r).iter().copied().filter(|&j| j != idx));
            }
        }
    }
}

fn axis_cells(width: f64, height: f64, cell: f64) -> (f64, f64) {
    ((width / cell).ceil().max(1.0), (height / cell).ceil().max(1.0))
}

/// Strategy for finding overlapping particle pairs
pub trait BroadPhase: fmt::Debug {
    fn name(&self) -> &'static str;

    /// Append every pair `(i, j)` with `i < j` whose circles currently overlap,
    /// sorted by `i` then `j`. `contacts` is cleared first.
    fn collect_contacts(&mut self, world: &World, contacts: &mut Vec<(usize, usize)>);
}

/// Exhaustive O(n^2) search
#[derive(Debug, Default, Clone, Copy)]
pub struct AllPairs;

impl BroadPhase for AllPairs {
    fn name(&self) -> &'static str {
        "all-pairs"
    }

    fn collect_contacts(&mut self, world: &World, contacts: &mut Vec<(usize, usize)>) {
        contacts.clear();
        let particles = &world.particles;
        for i in 0..particles.len() {
            for j in (i + 1)..particles.len() {
                if in_contact(&particles[i], &particles[j]) {
                    contacts.push((i, j));
                }
            }
        }
    }
}

/// Grid-accelerated search.
///
/// The cell size is the larger of the configured minimum and the diameter
/// of the biggest particle in the world, grown further when the domain
/// would otherwise need more cells than a few per particle.
#[derive(Debug, Default, Clone)]
pub struct CellGrid {
    min_cell_size: Option<f32>,
    grid: Option<SpatialGrid>,
    grid_bounds: Option<Bounds>,
    neighbors: Vec<usize>,
}

impl CellGrid {
    pub fn new(min_cell_size: Option<f32>) -> Self {
        Self {
            min_cell_size,
            ..Self::default()
        }
    }

    /// Grid used by the most recent search, if any
    pub fn grid(&self) -> Option<&SpatialGrid> {
        self.grid.as_ref()
    }

    fn prepare(&mut self, world: &World) -> &mut SpatialGrid {
        let needed = self
            .min_cell_size
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(0.0)
            .max(2.0 * world.max_radius());
        let max_cells = world
            .len()
            .saturating_mul(CELLS_PER_PARTICLE)
            .clamp(MIN_CELL_BUDGET, MAX_CELLS);
        let stale = match (&self.grid, &self.grid_bounds) {
            (Some(grid), Some(bounds)) => grid.cell_size() < needed || bounds != world.bounds(),
            _ => true,
        };
        if stale {
            self.grid_bounds = Some(*world.bounds());
        }
        let grid = match self.grid.take() {
            Some(grid) if !stale => grid,
            _ => SpatialGrid::with_max_cells(world.bounds(), needed, max_cells),
        };
        self.grid.insert(grid)
    }
}

impl BroadPhase for CellGrid {
    fn name(&self) -> &'static str {
        "cell-grid"
    }

    fn collect_contacts(&mut self, world: &World, contacts: &mut Vec<(usize, usize)>) {
        contacts.clear();
        let mut neighbors = std::mem::take(&mut self.neighbors);
        let grid = self.prepare(world);
        grid.rebuild(&world.particles);

        let particles = &world.particles;
        for (i, particle) in particles.iter().enumerate() {
            grid.query_neighbors_into(i, particle.pos, &mut neighbors);
            neighbors.retain(|&j| j > i && in_contact(particle, &particles[j]));
            neighbors.sort_unstable();
            contacts.extend(neighbors.iter().map(|&j| (i, j)));
        }

        self.neighbors = neighbors;
    }
}

/// Pick the search strategy once, at construction time
pub fn broad_phase_for(
    use_spatial_partitioning: bool,
    min_cell_size: Option<f32>,
) -> Box<dyn BroadPhase> {
    if use_spatial_partitioning {
        Box::new(CellGrid::new(min_cell_size))
    } else {
        Box::new(AllPairs)
    }
}
