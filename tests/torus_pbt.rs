use evolarium_lib::engine::genetics::{self, TRAIT_SPECS};
use evolarium_lib::engine::spatial_grid::SpatialGrid;
use evolarium_lib::engine::{torus, SimConfig};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

prop_compose! {
    /// World sizes and offsets on a quarter-unit lattice so sums stay exact.
    fn arb_world_and_offset()(size in 1u32..20_000)(
        size in Just(size),
        quarters in 0u64..(size as u64 * 4)
    ) -> (f64, f64) {
        (size as f64, quarters as f64 / 4.0)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_wrap_past_edge_lands_at_offset((size, eps) in arb_world_and_offset()) {
        prop_assert_eq!(torus::wrap(size + eps, size), eps);
    }

    #[test]
    fn test_wrap_stays_in_world(v in -1.0e6f64..1.0e6, size in 1.0f64..10_000.0) {
        let w = torus::wrap(v, size);
        prop_assert!((0.0..size).contains(&w), "{} wrapped to {}", v, w);
    }

    #[test]
    fn test_delta_takes_short_way(a in 0.0f64..1000.0, b in 0.0f64..1000.0) {
        let d = torus::delta(a, b, 1000.0);
        prop_assert!(d.abs() <= 500.0);
        prop_assert!((torus::wrap(a + d, 1000.0) - b).abs() < 1e-9
            || (torus::wrap(a + d, 1000.0) - b).abs() > 1000.0 - 1e-9);
    }

    #[test]
    fn test_mutation_keeps_traits_in_range(
        seed in any::<u64>(),
        rate in 0.0f64..20.0,
        chance in 0.0f64..=1.0,
        rounds in 1usize..50
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let config = SimConfig {
            mutation_rate: rate,
            mutation_chance: chance,
            ..Default::default()
        };
        let mut traits = genetics::random_traits(&mut rng);
        for _ in 0..rounds {
            traits = genetics::inherit(&traits, &config, &mut rng);
            prop_assert!(genetics::in_range(&traits), "{:?}", traits);
        }
        for (k, spec) in TRAIT_SPECS.iter().enumerate() {
            prop_assert!(spec.contains(traits.0[k]));
        }
    }

    #[test]
    fn test_grid_cell_index_in_bounds(
        x in -100.0f64..5000.0,
        y in -100.0f64..5000.0,
        cell in 1.0f64..500.0
    ) {
        let grid = SpatialGrid::new(3000.0, cell, 0);
        prop_assert!(grid.cell_index(x, y) < grid.dim() * grid.dim());
    }
}
