//! Scenario selection shared by the `run` and `view` commands

use clap::Args;
use partisim_core::{GridConfig, SimConfig};
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct ScenarioArgs {
    /// Path to a JSON scenario file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Grid rows (overrides the file)
    #[arg(long)]
    pub rows: Option<i32>,

    /// Grid columns (overrides the file)
    #[arg(long)]
    pub cols: Option<i32>,

    /// Center-to-center spacing; 0 distributes particles evenly
    #[arg(long, num_args = 2, value_names = ["X", "Y"])]
    pub spacing: Option<Vec<f32>>,

    /// Spawn grid particles at rest instead of with random velocities
    #[arg(long)]
    pub at_rest: bool,

    /// Test every particle pair instead of using the spatial grid
    #[arg(long)]
    pub exhaustive: bool,

    /// Seed for initial velocities
    #[arg(long)]
    pub seed: Option<u64>,

    /// View magnification (> 1 zooms in)
    #[arg(long)]
    pub zoom: Option<f32>,
}

impl ScenarioArgs {
    /// Load the file (or defaults) and apply command-line overrides
    pub fn resolve(&self) -> Result<SimConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load(path)?,
            None => SimConfig {
                grid: Some(GridConfig {
                    rows: 40,
                    cols: 50,
                    ..GridConfig::default()
                }),
                ..SimConfig::default()
            },
        };

        let grid = config.grid.get_or_insert_with(GridConfig::default);
        if let Some(rows) = self.rows {
            grid.rows = rows;
        }
        if let Some(cols) = self.cols {
            grid.cols = cols;
        }
        if let Some(spacing) = self.spacing.as_deref() {
            grid.spacing = glam::Vec2::new(spacing[0], spacing[1]);
        }
        if self.at_rest {
            grid.with_initial_velocity = false;
        }
        if self.exhaustive {
            config.use_spatial_partitioning = false;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(zoom) = self.zoom {
            config.zoom = zoom;
        }

        config.validate()?;
        Ok(config)
    }
}
