//! Column generation for the one-dimensional cutting-stock problem, solved with [SCIP](https://scipopt.org/).
//!
//! Given a stock length and a demand for shorter item lengths, the goal is to cut as few stock
//! units as possible. The [`MasterModel`] holds the LP relaxation over the cutting patterns known
//! so far and grows it with patterns proposed by the [`PricingModel`], a knapsack over the current
//! dual prices. Once no improving pattern is left, the generated columns are resolved as an integer
//! program, which yields a feasible [`Solution`] together with a lower bound on the optimum.
//!
//! # Example
//!
//! ```no_run
//! use cutstock::prelude::*;
//!
//! let instance = Instance::new(10, [(3, 2), (4, 1)]).unwrap();
//! let mut master = MasterModel::new(instance).unwrap();
//! let solution = master.solve_integer().unwrap();
//! assert_eq!(solution.stock_needed(), 1);
//! assert!(master.lower_bound().unwrap() <= 1.0);
//! ```

pub use scip_sys as ffi;

/// Configuration of the column generation loop and the solver backend.
pub mod config;
pub use config::*;

/// Errors reported by the models and the solver backends.
pub mod error;
pub use error::*;

/// Return codes of SCIP calls.
pub mod retcode;
pub use retcode::*;

/// Cutting-stock instances.
pub mod instance;
pub use instance::*;

/// Cutting patterns.
pub mod pattern;
pub use pattern::*;

/// Integer solutions.
pub mod solution;
pub use solution::*;

/// The knapsack subproblem that prices new patterns.
pub mod pricing;
pub use pricing::*;

/// The master problem and the column generation loop.
pub mod master;
pub use master::*;

/// The linear/integer programming capability and its SCIP backend.
pub mod solver;
pub use solver::*;

/// Command line arguments of the demonstration binary.
pub mod cli;

/// A general macro for calling SCIP functions and returning an error if the return code is not SCIP_OKAY.
#[macro_export]
macro_rules! scip_call {
    ($res:expr) => {
        let res = unsafe { $res };
        let retcode = $crate::retcode::Retcode::from(res);
        if retcode != $crate::retcode::Retcode::Okay {
            return Err(retcode.into());
        }
    };
}

/// A macro for calling SCIP functions where failure can only mean a broken invariant, such as releasing memory.
#[macro_export]
macro_rules! scip_call_panic {
    ($res:expr) => {
        let res = unsafe { $res };
        let retcode = $crate::retcode::Retcode::from(res);
        if retcode != $crate::retcode::Retcode::Okay {
            panic!("SCIP call failed with retcode {:?}", retcode);
        }
    };
}

/// The prelude module re-exports the types needed to solve an instance.
pub mod prelude {
    pub use crate::config::{ColgenConfig, SolverConfig};
    pub use crate::error::{Error, SolverError};
    pub use crate::instance::Instance;
    pub use crate::master::{MasterModel, MasterState};
    pub use crate::pattern::Pattern;
    pub use crate::solution::Solution;
}
