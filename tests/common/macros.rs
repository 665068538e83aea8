/// Asserts that the simulation holds exactly `count` living organisms.
#[macro_export]
macro_rules! assert_population {
    ($sim:expr, $count:expr) => {
        assert_eq!($sim.population(), $count, "Population count mismatch");
    };
}

/// Asserts the slot bookkeeping of both stores: active count matches the
/// active flags and the free list holds everything else.
#[macro_export]
macro_rules! assert_store_consistent {
    ($sim:expr) => {
        let org_flags = $sim.organisms.active_flags().iter().filter(|&&a| a).count();
        assert_eq!($sim.organisms.len(), org_flags, "organism active count drifted");
        assert_eq!(
            $sim.organisms.free_count() + $sim.organisms.len(),
            $sim.organisms.capacity(),
            "organism free list out of sync"
        );
        let food_flags = $sim.food.active_flags().iter().filter(|&&a| a).count();
        assert_eq!($sim.food.len(), food_flags, "food active count drifted");
        assert_eq!(
            $sim.food.free_count() + $sim.food.len(),
            $sim.food.capacity(),
            "food free list out of sync"
        );
    };
}

/// Asserts every living organism has in-range traits and an in-world position.
#[macro_export]
macro_rules! assert_traits_in_bounds {
    ($sim:expr) => {
        let size = $sim.world.size;
        for idx in $sim.organisms.iter_active() {
            let traits = $sim.organisms.traits_of(idx);
            assert!(
                evolarium_lib::engine::genetics::in_range(&traits),
                "organism {} has out-of-range traits {:?}",
                idx,
                traits
            );
            let (x, y) = ($sim.organisms.x[idx], $sim.organisms.y[idx]);
            assert!(
                (0.0..size).contains(&x) && (0.0..size).contains(&y),
                "organism {} at ({}, {}) outside world",
                idx,
                x,
                y
            );
            assert!($sim.organisms.energy[idx] > 0.0, "dead organism {} still active", idx);
        }
    };
}
