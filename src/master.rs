use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::config::ColgenConfig;
use crate::error::{Error, SolverError};
use crate::instance::Instance;
use crate::pattern::Pattern;
use crate::pricing::{Duals, PricingModel};
use crate::solution::Solution;
use crate::solver::{
    ConsId, LinearObjective, LpSolver, ObjSense, ScipSolver, Sense, SolveStatus, VarId, VarType,
};

/// Where a [`MasterModel`] is in its life cycle.
///
/// Releasing the model is done by [`MasterModel::clean_up`] (or dropping it), so there is no
/// state for a released model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterState {
    /// Seed patterns are in place, nothing has been solved yet.
    Initialized,
    /// The LP over the current columns is solved and its duals are up to date.
    RelaxationSolved,
    /// Columns were added after the last LP solve.
    ColumnsPending,
    /// An integer solution over the generated columns is available.
    IntegerResolved,
}

/// Summary of one [`MasterModel::solve_relaxation`] run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RelaxationStats {
    /// Number of master LP solves.
    pub iterations: usize,
    /// Number of patterns added as new columns.
    pub columns_added: usize,
    /// Optimal value of the final LP.
    pub objective: f64,
    /// Whether pricing found no improving pattern, so that `objective` is the optimum of the
    /// full LP relaxation.
    pub converged: bool,
    /// A lower bound on the optimum of the full LP relaxation.
    ///
    /// Equals `objective` up to the threshold when converged. Otherwise it is
    /// `objective / (1 + improvement)`, with `improvement` the last pricing objective: every
    /// pattern costs 1, so no solution can use fewer than that many stock units.
    pub dual_bound: f64,
}

/// The master problem of the cutting-stock column generation.
///
/// ```text
///   min  sum_p x_p
///   s.t. sum_p amount_p(s) * x_p >= demand(s)   for every ordered size s   [dual_s]
///        x_p >= 0
/// ```
///
/// with one variable per known pattern `p`. The model starts with one pattern per size, cutting
/// that size as often as it fits, and grows through [`solve_relaxation`](Self::solve_relaxation).
/// Columns are never removed.
///
/// The integer resolve in [`solve_integer`](Self::solve_integer) is a heuristic: it only uses the
/// generated columns, so it is not guaranteed to be optimal. The gap to the
/// [`lower_bound`](Self::lower_bound) tells how far off it can be.
#[derive(Debug)]
pub struct MasterModel<S: LpSolver = ScipSolver> {
    instance: Arc<Instance>,
    config: ColgenConfig,
    solver: S,
    columns: IndexMap<Pattern, VarId>,
    constraints: IndexMap<u32, ConsId>,
    pricing: PricingModel<S>,
    state: MasterState,
    lower_bound: Option<f64>,
    solution: Option<Solution>,
}

impl MasterModel {
    /// Builds the master problem for `instance` on a SCIP backend with default settings.
    pub fn new(instance: impl Into<Arc<Instance>>) -> Result<Self, Error> {
        Self::with_config(instance, ColgenConfig::default())
    }

    /// Builds the master problem for `instance` on a SCIP backend.
    pub fn with_config(
        instance: impl Into<Arc<Instance>>,
        config: ColgenConfig,
    ) -> Result<Self, Error> {
        Self::with_backend(instance, config)
    }
}

impl<S: LpSolver> MasterModel<S> {
    /// Builds the master problem for `instance` on the backend `S`.
    pub fn with_backend(
        instance: impl Into<Arc<Instance>>,
        config: ColgenConfig,
    ) -> Result<Self, Error> {
        let instance = instance.into();
        let solver = S::create(&config.solver)?;
        let pricing = PricingModel::with_backend(&instance, &config.solver)?;

        let mut model = MasterModel {
            instance,
            config,
            solver,
            columns: IndexMap::new(),
            constraints: IndexMap::new(),
            pricing,
            state: MasterState::Initialized,
            lower_bound: None,
            solution: None,
        };
        model.init_patterns()?;
        model.init_constraints()?;
        model.update_objective()?;
        debug!(
            "built master problem with {} seed patterns for {}",
            model.columns.len(),
            model.instance
        );
        Ok(model)
    }

    fn init_patterns(&mut self) -> Result<(), Error> {
        let capacity = self.instance.capacity();
        let sizes: Vec<u32> = self.instance.sizes().collect();
        for size in sizes {
            let pattern = Pattern::new([(size, capacity / size)]);
            let var = self
                .solver
                .add_var(0.0, f64::INFINITY, VarType::Continuous)?;
            self.columns.insert(pattern, var);
        }
        Ok(())
    }

    fn init_constraints(&mut self) -> Result<(), Error> {
        let orders: Vec<(u32, u32)> = self.instance.orders().collect();
        for (size, demand) in orders {
            let coefs: Vec<(VarId, f64)> = self
                .columns
                .iter()
                .filter(|(pattern, _)| pattern.contains_size(size))
                .map(|(pattern, &var)| (var, pattern.amount(size) as f64))
                .collect();
            let cons = self.solver.add_cons(&coefs, Sense::Ge, demand as f64)?;
            self.constraints.insert(size, cons);
        }
        Ok(())
    }

    /// Every stock unit costs the same, whatever pattern it is cut with.
    fn update_objective(&mut self) -> Result<(), Error> {
        let objective = self
            .columns
            .values()
            .fold(LinearObjective::new(ObjSense::Minimize), |obj, &var| {
                obj.coef(var, 1.0)
            });
        self.solver.set_objective(objective)?;
        Ok(())
    }

    /// Adds `pattern` as a new column: a continuous variable with cost 1 that covers
    /// `pattern.amount(size)` items in the demand constraint of every size it cuts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the pattern is already a column or does not fit into a
    /// stock unit.
    pub fn add_pattern(&mut self, pattern: Pattern) -> Result<VarId, Error> {
        if self.columns.contains_key(&pattern) {
            return Err(Error::InvalidState(format!(
                "pattern {pattern} was already added to the model"
            )));
        }
        if pattern.total_size() > self.instance.capacity() as u64 {
            return Err(Error::InvalidState(format!(
                "pattern {pattern} exceeds the capacity {}",
                self.instance.capacity()
            )));
        }

        let var = self
            .solver
            .add_var(0.0, f64::INFINITY, VarType::Continuous)?;
        for (&size, &cons) in &self.constraints {
            if pattern.contains_size(size) {
                self.solver
                    .add_coef(cons, var, pattern.amount(size) as f64)?;
            }
        }
        self.columns.insert(pattern, var);
        self.update_objective()?;

        if self.state != MasterState::Initialized {
            self.state = MasterState::ColumnsPending;
        }
        Ok(var)
    }

    /// The dual price of every demand constraint in the last LP solution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] unless the LP was solved and no column was added since.
    pub fn duals(&self) -> Result<Duals, Error> {
        if self.state != MasterState::RelaxationSolved {
            return Err(Error::InvalidState(format!(
                "duals are only available right after solving the relaxation, the model is {:?}",
                self.state
            )));
        }
        let mut duals = Duals::with_capacity(self.constraints.len());
        for (&size, &cons) in &self.constraints {
            duals.insert(size, self.solver.dual(cons)?);
        }
        Ok(duals)
    }

    fn solve_lp(&mut self) -> Result<f64, Error> {
        let status = self.solver.solve()?;
        if status != SolveStatus::Optimal {
            return Err(SolverError::NotOptimal(status).into());
        }
        self.state = MasterState::RelaxationSolved;
        Ok(self.solver.objective_value()?)
    }

    /// Solves the LP relaxation by column generation.
    ///
    /// Alternates between solving the LP and pricing a new pattern with its duals, until the
    /// pricing objective drops to the configured threshold or a pattern comes back that is
    /// already a column. If `max_iterations` is hit first, the run ends unconverged and
    /// [`RelaxationStats::dual_bound`] falls back to a bound derived from the last pricing
    /// objective.
    pub fn solve_relaxation(&mut self) -> Result<RelaxationStats, Error> {
        let mut stats = RelaxationStats::default();
        let improvement = loop {
            stats.objective = self.solve_lp()?;
            stats.iterations += 1;

            let duals = self.duals()?;
            self.pricing.set_duals(&duals)?;
            self.pricing.solve()?;
            let improvement = self.pricing.objective()?;
            if improvement <= self.config.threshold {
                stats.converged = true;
                break improvement;
            }

            let pattern = self.pricing.pattern()?;
            if self.columns.contains_key(&pattern) {
                // treated as convergence, the duals leave nothing to improve on
                warn!(
                    "pricing returned known pattern {pattern} (improvement {improvement:e}), stopping"
                );
                stats.converged = true;
                break improvement;
            }
            if self
                .config
                .max_iterations
                .is_some_and(|max| stats.iterations >= max)
            {
                warn!(
                    "stopping column generation after {} iterations with improvement {improvement:e} left",
                    stats.iterations
                );
                break improvement;
            }

            debug!(
                "iteration {}: LP value {:.6}, adding {pattern} (improvement {improvement:.6})",
                stats.iterations, stats.objective
            );
            self.add_pattern(pattern)?;
            stats.columns_added += 1;
        };
        stats.dual_bound = stats.objective / (1.0 + improvement.max(0.0));

        info!(
            "column generation done after {} iterations: {} columns added, LP value {:.6}, bound {:.6}",
            stats.iterations, stats.columns_added, stats.objective, stats.dual_bound
        );
        Ok(stats)
    }

    /// Runs column generation, then resolves the generated columns as an integer program.
    ///
    /// The lower bound is `ceil(bound - tolerance)`, where `bound` is the
    /// [`dual_bound`](RelaxationStats::dual_bound) of the relaxation and `tolerance` the solver's
    /// optimality tolerance: the number of stock units is integral, and subtracting the tolerance
    /// keeps numerical slack from rounding an integral LP value up. All columns are continuous
    /// again afterwards, also when the integer solve fails. On failure the bound and solution of
    /// an earlier run are kept.
    pub fn solve_integer(&mut self) -> Result<Solution, Error> {
        let stats = self.solve_relaxation()?;
        let bound = (stats.dual_bound - self.solver.optimality_tolerance()).ceil();
        let bound = if bound > 0.0 { bound } else { 0.0 };

        let resolved = self
            .convert_columns(VarType::Integer)
            .and_then(|_| self.resolve_integer());
        let reverted = self.convert_columns(VarType::Continuous);
        let solution = resolved?;
        reverted?;

        info!(
            "integer solution uses {} stock units, lower bound {bound}",
            solution.stock_needed()
        );
        if bound > solution.stock_needed() as f64 {
            warn!(
                "lower bound {bound} exceeds the integer solution {}",
                solution.stock_needed()
            );
        }
        self.lower_bound = Some(bound);
        self.solution = Some(solution.clone());
        self.state = MasterState::IntegerResolved;
        Ok(solution)
    }

    fn convert_columns(&mut self, var_type: VarType) -> Result<(), Error> {
        for &var in self.columns.values() {
            self.solver.set_var_type(var, var_type)?;
        }
        Ok(())
    }

    fn resolve_integer(&mut self) -> Result<Solution, Error> {
        let status = self.solver.solve()?;
        let accepted = matches!(
            status,
            SolveStatus::Optimal | SolveStatus::TimeLimit | SolveStatus::OtherLimit
        );
        if !accepted || !self.solver.is_feasible() {
            return Err(SolverError::NotOptimal(status).into());
        }
        if status != SolveStatus::Optimal {
            warn!("integer resolve stopped with status {status:?}, using the best solution found");
        }

        let mut copies = Vec::new();
        for (pattern, &var) in &self.columns {
            let value = self.solver.value(var)?.round();
            if value > 0.0 {
                copies.push((pattern.clone(), value as u32));
            }
        }
        Ok(Solution::new(self.instance.clone(), copies))
    }

    /// The lower bound from the last [`solve_integer`](Self::solve_integer), if any.
    pub fn lower_bound(&self) -> Option<f64> {
        self.lower_bound
    }

    /// The solution from the last [`solve_integer`](Self::solve_integer), if any.
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    /// The patterns that are columns of the model, in the order they were added.
    pub fn patterns(&self) -> impl ExactSizeIterator<Item = &Pattern> + '_ {
        self.columns.keys()
    }

    /// Whether `pattern` is a column of the model.
    pub fn contains_pattern(&self, pattern: &Pattern) -> bool {
        self.columns.contains_key(pattern)
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Current life cycle state.
    pub fn state(&self) -> MasterState {
        self.state
    }

    /// The instance being solved.
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// The configuration this model was built with.
    pub fn config(&self) -> &ColgenConfig {
        &self.config
    }

    /// Releases the master and pricing solvers. The model cannot be used afterwards.
    ///
    /// Dropping the model releases the same resources, this only makes the end explicit.
    pub fn clean_up(self) {
        debug!(
            "releasing master problem with {} columns",
            self.columns.len()
        );
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn master(capacity: u32, orders: &[(u32, u32)]) -> MasterModel {
        let instance = Instance::new(capacity, orders.iter().copied()).unwrap();
        MasterModel::new(instance).unwrap()
    }

    fn assert_demand_met(solution: &Solution) {
        for (size, demand) in solution.instance().orders() {
            assert!(
                solution.produced(size) >= demand as u64,
                "size {size}: produced {} < demand {demand}",
                solution.produced(size)
            );
        }
    }

    #[test]
    fn seeds_one_pattern_per_size() {
        let model = master(10, &[(3, 2), (4, 1)]);
        let patterns: Vec<&Pattern> = model.patterns().collect();
        assert_eq!(
            patterns,
            vec![&Pattern::new([(3, 3)]), &Pattern::new([(4, 2)])]
        );
        assert_eq!(model.state(), MasterState::Initialized);
        assert_eq!(model.lower_bound(), None);
        assert!(model.solution().is_none());
    }

    #[test]
    fn one_stock_unit_fits_everything() {
        let mut model = master(10, &[(3, 2), (4, 1)]);
        let solution = model.solve_integer().unwrap();
        assert_eq!(solution.stock_needed(), 1);
        assert_eq!(solution.copies(&Pattern::new([(3, 2), (4, 1)])), 1);
        assert!(model.lower_bound().unwrap() <= 1.0);
        assert_demand_met(&solution);
        assert_eq!(model.state(), MasterState::IntegerResolved);
    }

    #[test]
    fn no_orders_need_no_stock() {
        let mut model = master(10, &[]);
        let solution = model.solve_integer().unwrap();
        assert_eq!(solution.stock_needed(), 0);
        assert_eq!(model.lower_bound(), Some(0.0));
    }

    #[test]
    fn items_that_do_not_fit_together() {
        let mut model = master(5, &[(3, 1), (4, 1)]);
        let solution = model.solve_integer().unwrap();
        assert_eq!(solution.stock_needed(), 2);
        let bound = model.lower_bound().unwrap();
        assert!(bound <= 2.0);
        assert!(bound > 1.0);
        assert_demand_met(&solution);
    }

    #[test]
    fn relaxation_adds_improving_patterns() {
        let mut model = master(10, &[(3, 2), (4, 1)]);
        let stats = model.solve_relaxation().unwrap();
        assert!(stats.columns_added >= 1);
        assert_eq!(model.n_columns(), 2 + stats.columns_added);
        assert!(model.contains_pattern(&Pattern::new([(3, 2), (4, 1)])));
        assert!((stats.objective - 1.0).abs() < 1e-6);
        assert_eq!(model.state(), MasterState::RelaxationSolved);

        let duals = model.duals().unwrap();
        assert_eq!(duals.keys().copied().collect::<Vec<_>>(), vec![3, 4]);
    }

    #[test]
    fn duplicate_patterns_are_rejected() {
        let mut model = master(10, &[(3, 2), (4, 1)]);
        let err = model.add_pattern(Pattern::new([(3, 3)])).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert_eq!(model.n_columns(), 2);
    }

    #[test]
    fn oversized_patterns_are_rejected() {
        let mut model = master(10, &[(3, 2), (4, 1)]);
        let err = model.add_pattern(Pattern::new([(4, 3)])).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }

    #[test]
    fn duals_need_a_fresh_relaxation() {
        let mut model = master(10, &[(3, 2), (4, 1)]);
        assert!(matches!(model.duals(), Err(Error::InvalidState(_))));

        model.solve_relaxation().unwrap();
        assert!(model.duals().is_ok());

        model.add_pattern(Pattern::new([(3, 1)])).unwrap();
        assert_eq!(model.state(), MasterState::ColumnsPending);
        assert!(matches!(model.duals(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn injected_patterns_are_used() {
        let mut model = master(10, &[(3, 2), (4, 1)]);
        model.add_pattern(Pattern::new([(3, 2), (4, 1)])).unwrap();
        assert_eq!(model.state(), MasterState::Initialized);
        let stats = model.solve_relaxation().unwrap();
        assert!((stats.objective - 1.0).abs() < 1e-6);
        assert_eq!(model.patterns().next(), Some(&Pattern::new([(3, 3)])));
    }

    #[test]
    fn model_is_reusable_after_integer_resolve() {
        let mut model = master(10, &[(3, 5), (4, 3), (5, 2)]);
        let first = model.solve_integer().unwrap();
        for var in model.columns.values() {
            assert_eq!(model.solver.var_type(*var).unwrap(), VarType::Continuous);
        }
        let columns = model.n_columns();
        let stats = model.solve_relaxation().unwrap();
        assert_eq!(stats.columns_added, 0);
        assert_eq!(model.n_columns(), columns);

        let second = model.solve_integer().unwrap();
        assert_eq!(first.stock_needed(), second.stock_needed());
    }

    #[test]
    fn iteration_cap_stops_early() {
        let instance = Instance::new(10, [(3, 2), (4, 1)]).unwrap();
        let mut model =
            MasterModel::with_config(instance, ColgenConfig::default().max_iterations(1)).unwrap();
        let stats = model.solve_relaxation().unwrap();
        assert_eq!(stats.iterations, 1);
        assert_eq!(stats.columns_added, 0);
        assert!(!stats.converged);
        // seeds alone give 7/6, pricing still finds an improvement of 1/6
        assert!((stats.objective - 7.0 / 6.0).abs() < 1e-6);
        assert!((stats.dual_bound - 1.0).abs() < 1e-6);

        // the seed patterns alone still give a feasible integer solution
        let solution = model.solve_integer().unwrap();
        assert_demand_met(&solution);
        // [3, 3, 4] fits into one stock unit, the bound must not exceed that
        assert_eq!(model.lower_bound(), Some(1.0));
        assert!(model.lower_bound().unwrap() <= solution.stock_needed() as f64);
    }

    mod scripted {
        use std::cell::RefCell;

        use super::*;
        use crate::config::{DEFAULT_THRESHOLD, SolverConfig};

        /// What the scripted backend reports: `lp_value` for the master LP, `improvement` and
        /// the per-size counts in `priced` for the pricing knapsack.
        #[derive(Debug, Clone, Default)]
        struct Script {
            lp_value: f64,
            improvement: f64,
            priced: Vec<f64>,
            fail_integer: bool,
        }

        thread_local! {
            static SCRIPT: RefCell<Script> = RefCell::new(Script::default());
        }

        fn set_script(lp_value: f64, improvement: f64, priced: &[f64]) {
            SCRIPT.with(|script| {
                *script.borrow_mut() = Script {
                    lp_value,
                    improvement,
                    priced: priced.to_vec(),
                    fail_integer: false,
                }
            });
        }

        /// Tells master and pricing apart by the objective sense: the knapsack is the only
        /// maximization problem.
        #[derive(Debug)]
        struct ScriptedSolver {
            types: Vec<VarType>,
            n_conss: usize,
            sense: ObjSense,
        }

        impl ScriptedSolver {
            fn is_pricing(&self) -> bool {
                self.sense == ObjSense::Maximize
            }
        }

        impl LpSolver for ScriptedSolver {
            fn create(_config: &SolverConfig) -> Result<Self, SolverError> {
                Ok(ScriptedSolver {
                    types: Vec::new(),
                    n_conss: 0,
                    sense: ObjSense::Minimize,
                })
            }

            fn add_var(
                &mut self,
                _lb: f64,
                _ub: f64,
                var_type: VarType,
            ) -> Result<VarId, SolverError> {
                self.types.push(var_type);
                Ok(VarId(self.types.len() - 1))
            }

            fn set_var_type(&mut self, var: VarId, var_type: VarType) -> Result<(), SolverError> {
                self.types[var.index()] = var_type;
                Ok(())
            }

            fn var_type(&self, var: VarId) -> Result<VarType, SolverError> {
                Ok(self.types[var.index()])
            }

            fn add_cons(
                &mut self,
                _coefs: &[(VarId, f64)],
                _sense: Sense,
                _rhs: f64,
            ) -> Result<ConsId, SolverError> {
                self.n_conss += 1;
                Ok(ConsId(self.n_conss - 1))
            }

            fn add_coef(
                &mut self,
                _cons: ConsId,
                _var: VarId,
                _coef: f64,
            ) -> Result<(), SolverError> {
                Ok(())
            }

            fn set_objective(&mut self, objective: LinearObjective) -> Result<(), SolverError> {
                self.sense = objective.sense;
                Ok(())
            }

            fn solve(&mut self) -> Result<SolveStatus, SolverError> {
                let integer = self.types.contains(&VarType::Integer);
                let fail = SCRIPT.with(|script| script.borrow().fail_integer);
                if !self.is_pricing() && integer && fail {
                    Ok(SolveStatus::Infeasible)
                } else {
                    Ok(SolveStatus::Optimal)
                }
            }

            fn is_feasible(&self) -> bool {
                true
            }

            fn value(&self, var: VarId) -> Result<f64, SolverError> {
                if self.is_pricing() {
                    Ok(SCRIPT.with(|script| {
                        let script = script.borrow();
                        script.priced.get(var.index()).copied().unwrap_or(0.0)
                    }))
                } else {
                    Ok(1.0)
                }
            }

            fn dual(&self, _cons: ConsId) -> Result<f64, SolverError> {
                Ok(0.5)
            }

            fn objective_value(&self) -> Result<f64, SolverError> {
                Ok(SCRIPT.with(|script| {
                    let script = script.borrow();
                    if self.is_pricing() {
                        script.improvement
                    } else {
                        script.lp_value
                    }
                }))
            }

            fn optimality_tolerance(&self) -> f64 {
                1e-9
            }

            fn n_vars(&self) -> usize {
                self.types.len()
            }

            fn n_conss(&self) -> usize {
                self.n_conss
            }
        }

        fn scripted_master(config: ColgenConfig) -> MasterModel<ScriptedSolver> {
            let instance = Instance::new(10, [(3, 2), (4, 1)]).unwrap();
            MasterModel::with_backend(instance, config).unwrap()
        }

        #[test]
        fn known_pattern_ends_generation() {
            // pricing proposes the seed [3, 3, 3] with a clearly positive improvement
            set_script(7.0 / 6.0, 0.5, &[3.0, 0.0]);
            let mut model = scripted_master(ColgenConfig::default());
            let stats = model.solve_relaxation().unwrap();
            assert_eq!(stats.iterations, 1);
            assert_eq!(stats.columns_added, 0);
            assert!(stats.converged);
            assert_eq!(model.n_columns(), 2);
            assert_eq!(model.solver.n_vars(), 2);
            assert_eq!(model.state(), MasterState::RelaxationSolved);
        }

        #[test]
        fn improvement_at_the_threshold_is_not_improving() {
            set_script(7.0 / 6.0, DEFAULT_THRESHOLD, &[2.0, 1.0]);
            let mut model = scripted_master(ColgenConfig::default());
            let stats = model.solve_relaxation().unwrap();
            assert_eq!(stats.columns_added, 0);
            assert!(stats.converged);
            assert!(!model.contains_pattern(&Pattern::new([(3, 2), (4, 1)])));
        }

        #[test]
        fn improvement_above_the_threshold_adds_the_pattern_once() {
            set_script(7.0 / 6.0, 10.0 * DEFAULT_THRESHOLD, &[2.0, 1.0]);
            let mut model = scripted_master(ColgenConfig::default());
            let stats = model.solve_relaxation().unwrap();
            // the second round prices the same pattern again and stops
            assert_eq!(stats.iterations, 2);
            assert_eq!(stats.columns_added, 1);
            assert!(stats.converged);
            assert!(model.contains_pattern(&Pattern::new([(3, 2), (4, 1)])));
            assert_eq!(model.n_columns(), 3);
        }

        #[test]
        fn capped_run_bounds_with_the_last_improvement() {
            set_script(3.0, 0.5, &[2.0, 1.0]);
            let mut model = scripted_master(ColgenConfig::default().max_iterations(1));
            let stats = model.solve_relaxation().unwrap();
            assert!(!stats.converged);
            assert_eq!(stats.columns_added, 0);
            assert!((stats.dual_bound - 2.0).abs() < 1e-12);

            let solution = model.solve_integer().unwrap();
            assert_eq!(model.lower_bound(), Some(2.0));
            assert_eq!(solution.stock_needed(), 2);
        }

        #[test]
        fn failed_integer_resolve_keeps_the_previous_run() {
            set_script(1.0, 0.0, &[]);
            let mut model = scripted_master(ColgenConfig::default());
            let first = model.solve_integer().unwrap();
            assert_eq!(model.lower_bound(), Some(1.0));

            set_script(5.0, 0.0, &[]);
            SCRIPT.with(|script| script.borrow_mut().fail_integer = true);
            let err = model.solve_integer().unwrap_err();
            assert!(matches!(
                err,
                Error::Solver(SolverError::NotOptimal(SolveStatus::Infeasible))
            ));
            assert_eq!(model.lower_bound(), Some(1.0));
            assert_eq!(
                model.solution().map(Solution::stock_needed),
                Some(first.stock_needed())
            );
            for var in model.columns.values() {
                assert_eq!(model.solver.var_type(*var).unwrap(), VarType::Continuous);
            }
        }
    }

    #[test]
    fn clean_up_consumes_the_model() {
        let mut model = master(7, &[(2, 3)]);
        model.solve_integer().unwrap();
        model.clean_up();
    }
}
