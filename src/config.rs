use serde::{Deserialize, Serialize};

/// Reduced costs at or below this value are treated as numerical noise.
pub const DEFAULT_THRESHOLD: f64 = 1e-14;

/// Configuration of the column generation loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColgenConfig {
    /// A priced pattern is only added if the pricing objective exceeds this threshold.
    pub threshold: f64,
    /// Optional cap on the number of master LP solves in one relaxation run.
    /// When reached, the loop stops with the columns generated so far.
    pub max_iterations: Option<usize>,
    /// Settings passed to every solver instance created by the models.
    pub solver: SolverConfig,
}

impl Default for ColgenConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_iterations: None,
            solver: SolverConfig::default(),
        }
    }
}

impl ColgenConfig {
    /// Sets the reduced cost threshold.
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Caps the number of master LP solves in one relaxation run.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Replaces the solver settings.
    pub fn solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }
}

/// Settings of a single solver instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverConfig {
    /// Show the solver's own log output.
    pub verbose: bool,
    /// Time limit per solve in seconds.
    pub time_limit: Option<f64>,
    /// Overrides the solver's dual feasibility (optimality) tolerance.
    pub optimality_tolerance: Option<f64>,
}

impl SolverConfig {
    /// Shows the solver's own log output.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the time limit per solve in seconds.
    pub fn time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Overrides the optimality tolerance.
    pub fn optimality_tolerance(mut self, tolerance: f64) -> Self {
        self.optimality_tolerance = Some(tolerance);
        self
    }
}
