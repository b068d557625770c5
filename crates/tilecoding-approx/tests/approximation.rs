//! End-to-end fitting of smooth targets through tile-coded features

use rand::rngs::StdRng;
use rand::SeedableRng;
use tilecoding_approx::discounted_returns;
use tilecoding_approx::prelude::*;

fn target(x: f64) -> f64 {
    3.0 * x - 1.0
}

fn sweep() -> impl Iterator<Item = f64> {
    (0..50).map(|i| f64::from(i) / 49.0)
}

#[test]
fn hashed_q_function_fits_linear_target() {
    let config = TileCoderConfig::from_json_str(
        r#"{
            "num_tilings": 8,
            "max_size": 4096,
            "step_size": 0.5,
            "bounds": [{"min": 0.0, "max": 1.0}]
        }"#,
    )
    .unwrap();
    let mut q = TileCodedQFunction::new(&config, 1).unwrap();
    let action = DiscreteAction(0);

    for _ in 0..200 {
        for x in sweep() {
            q.learn(&[x], action, target(x)).unwrap();
        }
    }

    let error: f64 = sweep()
        .map(|x| (q.q_value(&[x], action).unwrap() - target(x)).abs())
        .sum::<f64>()
        / 50.0;
    assert!(error < 0.3, "mean absolute error {error}");
    assert!(q.table().count() <= 4096);
}

#[test]
fn grid_q_function_fits_linear_target() {
    let unit = FeatureRange::new(0.0, 1.0).unwrap();
    let tilings = Tilings::uniform(&[unit], 4, &[10]).unwrap();
    let mut q = TilingQFunction::new(tilings, vec![DiscreteAction(0), DiscreteAction(1)], 0.1).unwrap();

    for _ in 0..300 {
        for x in sweep() {
            q.learn(&[x], DiscreteAction(1), target(x)).unwrap();
        }
    }

    let error: f64 = sweep()
        .map(|x| (q.q_value(&[x], DiscreteAction(1)).unwrap() - target(x)).abs())
        .sum::<f64>()
        / 50.0;
    assert!(error < 0.4, "mean absolute error {error}");
    assert_eq!(q.q_value(&[0.5], DiscreteAction(0)).unwrap(), 0.0);
}

#[test]
fn greedy_selection_follows_learned_values() {
    let config = TileCoderConfig {
        step_size: 1.0,
        ..TileCoderConfig::default()
    };
    let mut q = TileCodedQFunction::new(&config, 2).unwrap();
    let actions = [DiscreteAction(-1), DiscreteAction(0), DiscreteAction(1)];
    let state = [1.5, -0.25];

    q.learn(&state, actions[0], -3.0).unwrap();
    q.learn(&state, actions[1], -2.0).unwrap();
    q.learn(&state, actions[2], -1.0).unwrap();

    let mut rng = StdRng::seed_from_u64(5);
    let chosen = EpsilonGreedy::new(0.0).select(&q, &state, &actions, &mut rng).unwrap();
    assert_eq!(chosen, DiscreteAction(1));
}

#[test]
fn monte_carlo_targets_are_learned_exactly() {
    let config = TileCoderConfig {
        step_size: 1.0,
        bounds: Some(vec![FeatureRange::new(0.0, 10.0).unwrap()]),
        ..TileCoderConfig::default()
    };
    let mut q = TileCodedQFunction::new(&config, 1).unwrap();
    let action = DiscreteAction(0);

    // States two units apart never share a tile
    let states = [0.0, 2.0, 4.0, 6.0];
    let returns = discounted_returns(&[-1.0; 4], 0.9, 0.0);
    for (&x, &g) in states.iter().zip(&returns) {
        q.learn(&[x], action, g).unwrap();
    }

    for (&x, &g) in states.iter().zip(&returns) {
        assert!((q.q_value(&[x], action).unwrap() - g).abs() < 1e-9);
    }
    assert!((q.q_value(&[0.0], action).unwrap() + 3.439).abs() < 1e-9);
}
