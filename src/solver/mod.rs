use crate::config::SolverConfig;
use crate::error::SolverError;

mod scip;
pub use scip::ScipSolver;

/// Handle of a variable inside an [`LpSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Position of the variable in creation order.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Handle of a constraint inside an [`LpSolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConsId(pub(crate) usize);

impl ConsId {
    /// Position of the constraint in creation order.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// The domain of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    /// Any real value within the bounds.
    Continuous,
    /// Integral values within the bounds.
    Integer,
}

/// The sense of the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjSense {
    /// Minimize the objective.
    #[default]
    Minimize,
    /// Maximize the objective.
    Maximize,
}

/// The comparison of a linear constraint against its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// `expr <= rhs`
    Le,
    /// `expr >= rhs`
    Ge,
    /// `expr == rhs`
    Eq,
}

impl Sense {
    /// The `(lhs, rhs)` range of a ranged constraint with this sense.
    pub fn range(&self, rhs: f64) -> (f64, f64) {
        match self {
            Sense::Le => (f64::NEG_INFINITY, rhs),
            Sense::Ge => (rhs, f64::INFINITY),
            Sense::Eq => (rhs, rhs),
        }
    }
}

/// Outcome of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// An optimal solution was found.
    Optimal,
    /// The problem is infeasible.
    Infeasible,
    /// The problem is unbounded.
    Unbounded,
    /// The problem is infeasible or unbounded.
    InfeasibleOrUnbounded,
    /// The time limit was hit.
    TimeLimit,
    /// Some other limit (nodes, memory, solutions, gap) was hit.
    OtherLimit,
    /// The solve was interrupted by the user or a signal.
    Interrupted,
    /// The solver did not report a definite status.
    Unknown,
}

/// A linear objective: `constant + sum(coef * var)`, minimized or maximized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearObjective {
    /// Whether to minimize or maximize.
    pub sense: ObjSense,
    /// Constant offset.
    pub constant: f64,
    /// Coefficients per variable. Variables not listed have coefficient 0.
    pub coefs: Vec<(VarId, f64)>,
}

impl LinearObjective {
    /// An empty objective with the given sense.
    pub fn new(sense: ObjSense) -> Self {
        LinearObjective {
            sense,
            constant: 0.0,
            coefs: Vec::new(),
        }
    }

    /// Sets the constant offset.
    pub fn constant(mut self, constant: f64) -> Self {
        self.constant = constant;
        self
    }

    /// Adds a coefficient for `var`.
    pub fn coef(mut self, var: VarId, coef: f64) -> Self {
        self.coefs.push((var, coef));
        self
    }
}

/// The linear/integer programming capability the models are built on.
///
/// Variables and constraints are only ever appended. The objective is replaced as a whole. Any
/// modification invalidates the results of the previous [`solve`](LpSolver::solve); reading
/// values, duals or the objective value then fails with [`SolverError::NotSolved`].
///
/// Native resources are owned by the implementor and released when it is dropped.
pub trait LpSolver {
    /// Creates an empty problem.
    fn create(config: &SolverConfig) -> Result<Self, SolverError>
    where
        Self: Sized;

    /// Adds a variable with the given bounds and type.
    fn add_var(&mut self, lb: f64, ub: f64, var_type: VarType) -> Result<VarId, SolverError>;

    /// Changes the type of an existing variable.
    fn set_var_type(&mut self, var: VarId, var_type: VarType) -> Result<(), SolverError>;

    /// Returns the type of an existing variable.
    fn var_type(&self, var: VarId) -> Result<VarType, SolverError>;

    /// Adds the constraint `sum(coef * var) <sense> rhs`.
    fn add_cons(
        &mut self,
        coefs: &[(VarId, f64)],
        sense: Sense,
        rhs: f64,
    ) -> Result<ConsId, SolverError>;

    /// Adds `coef * var` to an existing constraint.
    fn add_coef(&mut self, cons: ConsId, var: VarId, coef: f64) -> Result<(), SolverError>;

    /// Replaces the objective.
    fn set_objective(&mut self, objective: LinearObjective) -> Result<(), SolverError>;

    /// Solves the current problem and returns the final status.
    fn solve(&mut self) -> Result<SolveStatus, SolverError>;

    /// Whether the last solve produced a primal feasible solution.
    fn is_feasible(&self) -> bool;

    /// Value of `var` in the last solution.
    fn value(&self, var: VarId) -> Result<f64, SolverError>;

    /// Dual value of `cons` in the last solution. Only available if every variable was
    /// continuous at solve time.
    fn dual(&self, cons: ConsId) -> Result<f64, SolverError>;

    /// Objective value of the last solution, including the constant.
    fn objective_value(&self) -> Result<f64, SolverError>;

    /// The tolerance within which the solver regards reduced costs as optimal.
    fn optimality_tolerance(&self) -> f64;

    /// Number of variables.
    fn n_vars(&self) -> usize;

    /// Number of constraints.
    fn n_conss(&self) -> usize;
}
