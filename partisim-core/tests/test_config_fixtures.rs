//! Loading scenario files, good and broken

use partisim_core::tests::test_helpers::{load_fixture, test_data_path};
use partisim_core::{build_simulation_context, ConfigError, SimConfig};

#[test]
fn test_small_box_loads() {
    let config = load_fixture("small_box.json").expect("fixture should load");
    assert_eq!(config.particle_radius, 5.0);
    assert_eq!(config.collision_iterations, 4);

    let ctx = build_simulation_context(&config).unwrap();
    assert_eq!(ctx.world.len(), 80);
    assert_eq!(ctx.world.bounds().width(), 400.0);
}

#[test]
fn test_grid_mass_override() {
    let config = load_fixture("gravity_pile.json").expect("fixture should load");
    let ctx = build_simulation_context(&config).unwrap();
    assert!(ctx.world.particles.iter().all(|p| p.mass == 2.0));
    assert_eq!(ctx.integrator.params().wall_restitution, 0.5);
}

#[test]
fn test_inverted_bounds_rejected() {
    assert!(matches!(
        load_fixture("inverted_bounds.json"),
        Err(ConfigError::InvalidBounds)
    ));
}

#[test]
fn test_out_of_range_restitution_rejected() {
    let err = load_fixture("bad_restitution.json").unwrap_err();
    assert!(err.to_string().contains("wall_restitution"));
}

#[test]
fn test_oversized_grid_fails_at_build() {
    // The file itself is valid; the grid only fails once placed
    let config = load_fixture("oversized_grid.json").expect("fixture should load");
    let err = build_simulation_context(&config).unwrap_err();
    assert!(matches!(err, ConfigError::Grid(_)));
    assert!(err.to_string().contains("2000x2000"));
}

#[test]
fn test_missing_file_is_io_error() {
    assert!(matches!(
        SimConfig::load(test_data_path("does_not_exist.json")),
        Err(ConfigError::Io(_))
    ));
}
