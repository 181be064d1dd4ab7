use cutstock::{ColgenConfig, Error, Instance, MasterModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

fn check(instance: Instance) {
    let mut master = MasterModel::new(instance).unwrap();
    let solution = master.solve_integer().unwrap();
    let bound = master.lower_bound().unwrap();

    assert!(solution.is_feasible(), "unmet demand in {solution}");
    assert!(
        bound <= solution.stock_needed() as f64,
        "lower bound {bound} above {} for {}",
        solution.stock_needed(),
        master.instance()
    );
    assert!(bound >= 0.0);
    // every stock unit holds at most `capacity` length of items
    let capacity = master.instance().capacity() as f64;
    assert!(bound >= (master.instance().total_length() as f64 / capacity).ceil() - 1e-9);

    for pattern in master.patterns() {
        assert!(pattern.total_size() <= master.instance().capacity() as u64);
    }
    for pattern in solution.patterns() {
        assert!(master.contains_pattern(pattern));
    }
}

#[test]
fn small_random_instances() {
    let mut rng = StdRng::seed_from_u64(54321);
    for _ in 0..10 {
        let seed = rng.gen_range(0..=u64::MAX);
        check(Instance::random(seed, 8, 13, 20).unwrap());
    }
}

#[test]
fn larger_random_instance() {
    check(Instance::random(7, 30, 13, 20).unwrap());
}

#[test]
fn models_solve_in_parallel() {
    let values = (0..16u64)
        .into_par_iter()
        .map(|seed| {
            let instance = Instance::random(seed, 6, 10, 10).unwrap();
            let mut master = MasterModel::new(instance).unwrap();
            master.solve_integer().unwrap().stock_needed()
        })
        .collect::<Vec<_>>();

    let sequential = (0..16u64)
        .map(|seed| {
            let instance = Instance::random(seed, 6, 10, 10).unwrap();
            let mut master = MasterModel::new(instance).unwrap();
            master.solve_integer().unwrap().stock_needed()
        })
        .collect::<Vec<_>>();
    assert_eq!(values, sequential);
}

#[test]
fn single_size_instance() {
    let instance = Instance::new(10, [(3, 7)]).unwrap();
    let mut master = MasterModel::new(instance).unwrap();
    let solution = master.solve_integer().unwrap();
    // three per stock unit
    assert_eq!(solution.stock_needed(), 3);
    assert_eq!(master.lower_bound(), Some(3.0));
}

#[test]
fn config_is_loaded_from_json() {
    let config: ColgenConfig =
        serde_json::from_str(r#"{"max_iterations": 50, "solver": {"time_limit": 60.0}}"#)
            .unwrap();
    let instance = Instance::new(10, [(3, 2), (4, 1)]).unwrap();
    let mut master = MasterModel::with_config(instance, config).unwrap();
    assert_eq!(master.solve_integer().unwrap().stock_needed(), 1);
}

#[test]
fn invalid_instances_are_rejected() {
    assert!(matches!(
        Instance::new(0, []),
        Err(Error::InvalidInstance(_))
    ));
    assert!(matches!(
        Instance::new(5, [(6, 1)]),
        Err(Error::InvalidInstance(_))
    ));
}
