//! Grid population: all-or-nothing placement

use glam::Vec2;
use partisim_core::tests::test_helpers::{all_inside, empty_world, min_pair_gap};
use partisim_core::{GridError, GridRequest};

#[test]
fn test_valid_grids_add_exactly_rows_times_cols() {
    for (rows, cols) in [(1, 1), (1, 7), (5, 1), (3, 4), (20, 30), (70, 95)] {
        let mut world = empty_world(10.0);
        let added = world
            .add_grid(rows, cols, Vec2::ZERO, false, 1.0)
            .unwrap_or_else(|e| panic!("{rows}x{cols} should fit: {e}"));
        assert_eq!(added.len(), (rows * cols) as usize);
        assert_eq!(world.len(), (rows * cols) as usize);
    }
}

#[test]
fn test_rejected_grids_add_nothing() {
    let requests = [
        GridRequest::new(0, 3),
        GridRequest::new(3, -2),
        GridRequest::new(100, 100),
        GridRequest::new(2, 2).spacing(Vec2::new(5.0, 50.0)),
        GridRequest::new(2, 2).mass(0.0),
        GridRequest::new(2, 2).region(Vec2::new(5000.0, 0.0), Vec2::new(6000.0, 10.0)),
    ];

    for request in &requests {
        let mut world = empty_world(10.0);
        world.add_grid(1, 1, Vec2::ZERO, false, 1.0).unwrap();
        assert!(world.add_grid_request(request).is_err(), "{request:?} should be rejected");
        assert_eq!(world.len(), 1, "{request:?} must not add particles");
    }
}

#[test]
fn test_two_by_two_is_spread_and_centered() {
    let mut world = empty_world(10.0);
    world.add_grid(2, 2, Vec2::ZERO, false, 1.0).unwrap();

    assert_eq!(world.len(), 4);
    assert!(min_pair_gap(&world.particles) >= 0.0);
    let centroid: Vec2 = world.positions().sum::<Vec2>() / 4.0;
    assert_eq!(centroid, Vec2::ZERO);
    assert!(all_inside(&world.particles, world.bounds(), 0.0));
}

#[test]
fn test_hundred_by_hundred_reports_required_space() {
    let mut world = empty_world(10.0);
    let err = world.add_grid(100, 100, Vec2::ZERO, false, 1.0).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("2000x2000"), "unexpected message: {message}");
    assert!(matches!(err, GridError::InsufficientSpace { .. }));
    assert!(world.is_empty());
}

#[test]
fn test_dense_request_fails_capacity_check() {
    let mut world = empty_world(10.0);
    // Each axis fits on its own, but not the 2-D count
    let err = world
        .add_grid_request(&GridRequest::new(75, 99).spacing(Vec2::new(-100.0, -100.0)))
        .unwrap_err();
    assert!(
        matches!(err, GridError::TooManyParticles { .. } | GridError::InsufficientSpace { .. }),
        "unexpected error: {err}"
    );
    assert!(world.is_empty());
}

#[test]
fn test_successive_grids_keep_stable_indices() {
    let mut world = empty_world(10.0);
    let first_request =
        GridRequest::new(2, 2).region(Vec2::new(-900.0, -600.0), Vec2::new(-700.0, -400.0));
    let first = world.add_grid_request(&first_request).unwrap();
    let snapshot = world.particles.clone();
    let second_request =
        GridRequest::new(3, 3).region(Vec2::new(400.0, 200.0), Vec2::new(700.0, 500.0));
    let second = world.add_grid_request(&second_request).unwrap();

    assert_eq!(first, 0..4);
    assert_eq!(second, 4..13);
    assert_eq!(&world.particles[..4], &snapshot[..]);
}
