use indexmap::IndexMap;
use log::trace;

use crate::config::SolverConfig;
use crate::error::{Error, SolverError};
use crate::instance::Instance;
use crate::pattern::Pattern;
use crate::solver::{
    LinearObjective, LpSolver, ObjSense, ScipSolver, Sense, SolveStatus, VarId, VarType,
};

/// Dual prices of the demand constraints, keyed by item size.
pub type Duals = IndexMap<u32, f64>;

/// The pricing problem of the cutting-stock column generation.
///
/// This is an unbounded knapsack: every ordered size may be cut any number of times as long as the
/// stock capacity is respected, and each item is worth its current dual price. One stock unit
/// costs 1, so the optimal value
///
/// ```text
///   max  sum_i dual_i * z_i - 1
///   s.t. sum_i size_i * z_i <= capacity
///        z_i >= 0, integer
/// ```
///
/// is the negated reduced cost of the best pattern. A positive value means the pattern improves
/// the master LP.
#[derive(Debug)]
pub struct PricingModel<S: LpSolver = ScipSolver> {
    solver: S,
    vars: IndexMap<u32, VarId>,
    solved: bool,
}

impl PricingModel {
    /// Creates the pricing problem for `instance` on a SCIP backend.
    pub fn new(instance: &Instance, config: &SolverConfig) -> Result<Self, Error> {
        Self::with_backend(instance, config)
    }
}

impl<S: LpSolver> PricingModel<S> {
    /// Creates the pricing problem for `instance` on the backend `S`.
    pub fn with_backend(instance: &Instance, config: &SolverConfig) -> Result<Self, Error> {
        let mut solver = S::create(config)?;
        let capacity = instance.capacity();

        let mut vars = IndexMap::with_capacity(instance.len());
        for size in instance.sizes() {
            let max_copies = (capacity / size) as f64;
            let var = solver.add_var(0.0, max_copies, VarType::Integer)?;
            vars.insert(size, var);
        }

        let knapsack: Vec<(VarId, f64)> = vars
            .iter()
            .map(|(&size, &var)| (var, size as f64))
            .collect();
        solver.add_cons(&knapsack, Sense::Le, capacity as f64)?;
        solver.set_objective(LinearObjective::new(ObjSense::Maximize).constant(-1.0))?;

        Ok(PricingModel {
            solver,
            vars,
            solved: false,
        })
    }

    /// Replaces the objective with one built from `duals`.
    ///
    /// Sizes without a dual are priced at 0, duals of sizes that are not ordered are ignored.
    pub fn set_duals(&mut self, duals: &Duals) -> Result<(), Error> {
        let mut objective = LinearObjective::new(ObjSense::Maximize).constant(-1.0);
        for (size, &var) in &self.vars {
            let dual = duals.get(size).copied().unwrap_or(0.0);
            if dual != 0.0 {
                objective = objective.coef(var, dual);
            }
        }
        self.solver.set_objective(objective)?;
        self.solved = false;
        Ok(())
    }

    /// Solves the knapsack for the current duals.
    ///
    /// # Errors
    ///
    /// Fails with [`SolverError::NotOptimal`] if the knapsack is not solved to optimality. The
    /// empty pattern is always feasible, so this signals a solver failure.
    pub fn solve(&mut self) -> Result<(), Error> {
        self.solved = false;
        let status = self.solver.solve()?;
        if status != SolveStatus::Optimal {
            return Err(SolverError::NotOptimal(status).into());
        }
        self.solved = true;
        Ok(())
    }

    /// The optimal value of the last solve: the improvement a new pattern would bring.
    pub fn objective(&self) -> Result<f64, Error> {
        self.ensure_solved()?;
        Ok(self.solver.objective_value()?)
    }

    /// The optimal pattern of the last solve. Values are rounded to absorb solver noise.
    pub fn pattern(&self) -> Result<Pattern, Error> {
        self.ensure_solved()?;
        let mut cuts = Vec::with_capacity(self.vars.len());
        for (&size, &var) in &self.vars {
            let count = self.solver.value(var)?.round().max(0.0) as u32;
            cuts.push((size, count));
        }
        let pattern = Pattern::try_new(cuts)?;
        trace!("priced pattern {pattern}");
        Ok(pattern)
    }

    fn ensure_solved(&self) -> Result<(), Error> {
        if self.solved {
            Ok(())
        } else {
            Err(Error::InvalidState(
                "the pricing problem has not been solved for the current duals".to_string(),
            ))
        }
    }
}
