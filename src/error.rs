use thiserror::Error;

use crate::retcode::Retcode;
use crate::solver::{ConsId, SolveStatus, VarId};

/// Errors raised while building or solving a cutting-stock model.
///
/// None of these are retried. Callers solving many instances should give each instance its own
/// [`MasterModel`](crate::MasterModel) so that one failure does not leak into the next run.
#[derive(Debug, Error)]
pub enum Error {
    /// The demand data or capacity is malformed.
    #[error("invalid instance: {0}")]
    InvalidInstance(String),
    /// A cutting pattern cannot be represented.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
    /// An operation was called out of sequence, e.g. adding a pattern twice or reading stale duals.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// The solver backend failed.
    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// Failures of the linear/integer programming backend.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    /// A SCIP call returned a non-okay return code.
    #[error("SCIP call failed: {0}")]
    Scip(#[from] Retcode),
    /// The solve finished without proving optimality.
    #[error("solve finished with status {0:?}")]
    NotOptimal(SolveStatus),
    /// The solver reported optimality but no primal solution is available.
    #[error("no primal solution available")]
    NoSolution,
    /// A result was requested before the first successful solve or after the model changed.
    #[error("no up-to-date solve result available")]
    NotSolved,
    /// The variable handle does not belong to this solver.
    #[error("unknown variable {0:?}")]
    UnknownVariable(VarId),
    /// The constraint handle does not belong to this solver.
    #[error("unknown constraint {0:?}")]
    UnknownConstraint(ConsId),
}

impl From<Retcode> for Error {
    fn from(retcode: Retcode) -> Self {
        Error::Solver(SolverError::Scip(retcode))
    }
}
