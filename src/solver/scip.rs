use std::ffi::{CString, c_int};
use std::mem::MaybeUninit;

use log::trace;

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::retcode::Retcode;
use crate::solver::{
    ConsId, LinearObjective, LpSolver, ObjSense, Sense, SolveStatus, VarId, VarType,
};
use crate::{ffi, scip_call, scip_call_panic};

/// SCIP's default dual feasibility tolerance.
const DEFAULT_DUAL_FEASTOL: f64 = 1e-7;

/// Owns one native SCIP instance together with the variables and constraints created in it.
///
/// Everything is released on drop, so an early return through `?` never leaks the instance.
#[derive(Debug)]
pub(crate) struct ScipPtr {
    pub(crate) raw: *mut ffi::SCIP,
    vars: Vec<*mut ffi::SCIP_VAR>,
    conss: Vec<*mut ffi::SCIP_CONS>,
}

impl ScipPtr {
    pub(crate) fn new() -> Result<Self, Retcode> {
        let mut scip_ptr = MaybeUninit::uninit();
        scip_call!(ffi::SCIPcreate(scip_ptr.as_mut_ptr()));
        let scip_ptr = unsafe { scip_ptr.assume_init() };
        Ok(ScipPtr {
            raw: scip_ptr,
            vars: Vec::new(),
            conss: Vec::new(),
        })
    }

    pub(crate) fn set_int_param(&self, param: &str, value: i32) -> Result<(), Retcode> {
        let param = c_string(param)?;
        scip_call! { ffi::SCIPsetIntParam(self.raw, param.as_ptr(), value) };
        Ok(())
    }

    pub(crate) fn set_real_param(&self, param: &str, value: f64) -> Result<(), Retcode> {
        let param = c_string(param)?;
        scip_call! { ffi::SCIPsetRealParam(self.raw, param.as_ptr(), value) };
        Ok(())
    }

    pub(crate) fn disable_presolving(&self) -> Result<(), Retcode> {
        scip_call! { ffi::SCIPsetPresolving(self.raw, ffi::SCIP_ParamSetting_SCIP_PARAMSETTING_OFF, true.into()) };
        Ok(())
    }

    pub(crate) fn include_default_plugins(&self) -> Result<(), Retcode> {
        scip_call!(ffi::SCIPincludeDefaultPlugins(self.raw));
        Ok(())
    }

    pub(crate) fn create_prob(&self, name: &str) -> Result<(), Retcode> {
        let name = c_string(name)?;
        scip_call!(ffi::SCIPcreateProbBasic(self.raw, name.as_ptr()));
        Ok(())
    }

    pub(crate) fn set_obj_sense(&self, sense: ObjSense) -> Result<(), Retcode> {
        let sense = match sense {
            ObjSense::Minimize => ffi::SCIP_Objsense_SCIP_OBJSENSE_MINIMIZE,
            ObjSense::Maximize => ffi::SCIP_Objsense_SCIP_OBJSENSE_MAXIMIZE,
        };
        scip_call!(ffi::SCIPsetObjsense(self.raw, sense));
        Ok(())
    }

    pub(crate) fn add_obj_offset(&self, offset: f64) -> Result<(), Retcode> {
        scip_call!(ffi::SCIPaddOrigObjoffset(self.raw, offset));
        Ok(())
    }

    pub(crate) fn create_var(
        &mut self,
        lb: f64,
        ub: f64,
        obj: f64,
        name: &str,
        var_type: VarType,
    ) -> Result<*mut ffi::SCIP_VAR, Retcode> {
        let name = c_string(name)?;
        let var_type = match var_type {
            VarType::Continuous => ffi::SCIP_Vartype_SCIP_VARTYPE_CONTINUOUS,
            VarType::Integer => ffi::SCIP_Vartype_SCIP_VARTYPE_INTEGER,
        };
        let mut var_ptr = MaybeUninit::uninit();
        scip_call! { ffi::SCIPcreateVarBasic(
            self.raw,
            var_ptr.as_mut_ptr(),
            name.as_ptr(),
            lb,
            ub,
            obj,
            var_type,
        ) };
        let var_ptr = unsafe { var_ptr.assume_init() };
        // keep our reference even if adding fails, it is released on drop
        self.vars.push(var_ptr);
        scip_call! { ffi::SCIPaddVar(self.raw, var_ptr) };
        Ok(var_ptr)
    }

    pub(crate) fn create_cons(
        &mut self,
        vars: &mut [*mut ffi::SCIP_VAR],
        coefs: &mut [f64],
        lhs: f64,
        rhs: f64,
        name: &str,
    ) -> Result<*mut ffi::SCIP_CONS, Retcode> {
        assert_eq!(vars.len(), coefs.len());
        let c_name = c_string(name)?;
        let mut scip_cons = MaybeUninit::uninit();
        scip_call! { ffi::SCIPcreateConsBasicLinear(
            self.raw,
            scip_cons.as_mut_ptr(),
            c_name.as_ptr(),
            vars.len() as c_int,
            vars.as_mut_ptr(),
            coefs.as_mut_ptr(),
            lhs,
            rhs,
        ) };
        let scip_cons = unsafe { scip_cons.assume_init() };
        self.conss.push(scip_cons);
        scip_call! { ffi::SCIPaddCons(self.raw, scip_cons) };
        Ok(scip_cons)
    }

    pub(crate) fn solve(&self) -> Result<(), Retcode> {
        scip_call!(ffi::SCIPsolve(self.raw));
        Ok(())
    }

    pub(crate) fn status(&self) -> SolveStatus {
        let status = unsafe { ffi::SCIPgetStatus(self.raw) };
        status_from_scip(status)
    }

    pub(crate) fn best_sol(&self) -> Option<*mut ffi::SCIP_SOL> {
        if unsafe { ffi::SCIPgetNSols(self.raw) } == 0 {
            return None;
        }
        Some(unsafe { ffi::SCIPgetBestSol(self.raw) })
    }

    pub(crate) fn sol_val(&self, sol: *mut ffi::SCIP_SOL, var: *mut ffi::SCIP_VAR) -> f64 {
        unsafe { ffi::SCIPgetSolVal(self.raw, sol, var) }
    }

    pub(crate) fn obj_val(&self) -> f64 {
        unsafe { ffi::SCIPgetPrimalbound(self.raw) }
    }

    pub(crate) fn dual_feastol(&self) -> f64 {
        unsafe { ffi::SCIPdualfeastol(self.raw) }
    }

    /// Dual value of an original linear constraint, read from the row of its transformed
    /// counterpart. The value lives in the transformed space, which is always minimized.
    /// Only meaningful after the root LP of a pure LP was solved with presolving switched off.
    pub(crate) fn dual_sol(&self, cons: *mut ffi::SCIP_CONS) -> Result<f64, Retcode> {
        let mut transformed = MaybeUninit::<*mut ffi::SCIP_CONS>::uninit();
        scip_call!(ffi::SCIPgetTransformedCons(
            self.raw,
            cons,
            transformed.as_mut_ptr()
        ));
        let transformed = unsafe { transformed.assume_init() };
        if transformed.is_null() {
            // deleted during solving, it cannot be binding
            return Ok(0.0);
        }
        Ok(unsafe { ffi::SCIPgetDualsolLinear(self.raw, transformed) })
    }
}

impl Drop for ScipPtr {
    fn drop(&mut self) {
        // the instance holds its own references, ours have to go first
        for var in self.vars.iter_mut() {
            scip_call_panic!(ffi::SCIPreleaseVar(self.raw, var));
        }
        for cons in self.conss.iter_mut() {
            scip_call_panic!(ffi::SCIPreleaseCons(self.raw, cons));
        }
        unsafe { ffi::SCIPfree(&mut self.raw) };
    }
}

fn c_string(s: &str) -> Result<CString, Retcode> {
    CString::new(s).map_err(|_| Retcode::InvalidData)
}

fn status_from_scip(status: ffi::SCIP_Status) -> SolveStatus {
    match status {
        ffi::SCIP_Status_SCIP_STATUS_OPTIMAL => SolveStatus::Optimal,
        ffi::SCIP_Status_SCIP_STATUS_INFEASIBLE => SolveStatus::Infeasible,
        ffi::SCIP_Status_SCIP_STATUS_UNBOUNDED => SolveStatus::Unbounded,
        ffi::SCIP_Status_SCIP_STATUS_INFORUNBD => SolveStatus::InfeasibleOrUnbounded,
        ffi::SCIP_Status_SCIP_STATUS_TIMELIMIT => SolveStatus::TimeLimit,
        ffi::SCIP_Status_SCIP_STATUS_NODELIMIT
        | ffi::SCIP_Status_SCIP_STATUS_TOTALNODELIMIT
        | ffi::SCIP_Status_SCIP_STATUS_STALLNODELIMIT
        | ffi::SCIP_Status_SCIP_STATUS_MEMLIMIT
        | ffi::SCIP_Status_SCIP_STATUS_GAPLIMIT
        | ffi::SCIP_Status_SCIP_STATUS_SOLLIMIT
        | ffi::SCIP_Status_SCIP_STATUS_BESTSOLLIMIT
        | ffi::SCIP_Status_SCIP_STATUS_RESTARTLIMIT => SolveStatus::OtherLimit,
        ffi::SCIP_Status_SCIP_STATUS_USERINTERRUPT | ffi::SCIP_Status_SCIP_STATUS_TERMINATE => {
            SolveStatus::Interrupted
        }
        _ => SolveStatus::Unknown,
    }
}

#[derive(Debug, Clone)]
struct VarRecord {
    lb: f64,
    ub: f64,
    var_type: VarType,
}

#[derive(Debug, Clone)]
struct ConsRecord {
    coefs: Vec<(VarId, f64)>,
    lhs: f64,
    rhs: f64,
}

#[derive(Debug, Clone)]
struct SolveResult {
    values: Option<Vec<f64>>,
    duals: Option<Vec<f64>>,
    objective: Option<f64>,
}

/// [`LpSolver`] backed by SCIP.
///
/// The problem is recorded on the Rust side and a fresh SCIP instance is built from it on every
/// [`solve`](LpSolver::solve). The instance lives only for the duration of that call: the
/// results are copied out and the native memory is freed before returning. Presolving and
/// propagation are switched off, so the duals of a pure LP refer to the constraints as they were
/// added.
#[derive(Debug)]
pub struct ScipSolver {
    config: SolverConfig,
    vars: Vec<VarRecord>,
    conss: Vec<ConsRecord>,
    objective: LinearObjective,
    result: Option<SolveResult>,
    tolerance: f64,
}

impl ScipSolver {
    fn var(&self, var: VarId) -> Result<&VarRecord, SolverError> {
        self.vars
            .get(var.index())
            .ok_or(SolverError::UnknownVariable(var))
    }

    fn result(&self) -> Result<&SolveResult, SolverError> {
        self.result.as_ref().ok_or(SolverError::NotSolved)
    }

    fn configure(&self, scip: &ScipPtr) -> Result<(), Retcode> {
        if !self.config.verbose {
            scip.set_int_param("display/verblevel", 0)?;
        }
        scip.include_default_plugins()?;
        scip.disable_presolving()?;
        scip.set_int_param("propagating/maxrounds", 0)?;
        scip.set_int_param("propagating/maxroundsroot", 0)?;
        if let Some(time_limit) = self.config.time_limit {
            scip.set_real_param("limits/time", time_limit)?;
        }
        if let Some(tolerance) = self.config.optimality_tolerance {
            scip.set_real_param("numerics/dualfeastol", tolerance)?;
        }
        Ok(())
    }

    fn build_and_solve(&self) -> Result<(SolveStatus, SolveResult, f64), SolverError> {
        let mut scip = ScipPtr::new()?;
        self.configure(&scip)?;
        scip.create_prob("cutstock")?;
        scip.set_obj_sense(self.objective.sense)?;
        if self.objective.constant != 0.0 {
            scip.add_obj_offset(self.objective.constant)?;
        }

        let mut obj = vec![0.0; self.vars.len()];
        for &(var, coef) in &self.objective.coefs {
            obj[var.index()] += coef;
        }

        let mut var_ptrs = Vec::with_capacity(self.vars.len());
        for (i, record) in self.vars.iter().enumerate() {
            let ptr = scip.create_var(
                record.lb,
                record.ub,
                obj[i],
                &format!("x{i}"),
                record.var_type,
            )?;
            var_ptrs.push(ptr);
        }

        let mut cons_ptrs = Vec::with_capacity(self.conss.len());
        for (i, record) in self.conss.iter().enumerate() {
            let mut vars: Vec<_> = record
                .coefs
                .iter()
                .map(|(v, _)| var_ptrs[v.index()])
                .collect();
            let mut coefs: Vec<_> = record.coefs.iter().map(|&(_, c)| c).collect();
            let ptr = scip.create_cons(&mut vars, &mut coefs, record.lhs, record.rhs, &format!("c{i}"))?;
            cons_ptrs.push(ptr);
        }

        scip.solve()?;
        let status = scip.status();
        trace!(
            "SCIP solved {} vars / {} conss with status {status:?}",
            var_ptrs.len(),
            cons_ptrs.len()
        );

        let (values, objective) = match scip.best_sol() {
            Some(sol) => (
                Some(var_ptrs.iter().map(|&v| scip.sol_val(sol, v)).collect()),
                Some(scip.obj_val()),
            ),
            None => (None, None),
        };

        let is_lp = self.vars.iter().all(|v| v.var_type == VarType::Continuous);
        let duals = if is_lp && status == SolveStatus::Optimal {
            let mut duals = Vec::with_capacity(cons_ptrs.len());
            // maximization is solved as minimization of the negated objective
            let sign = match self.objective.sense {
                ObjSense::Minimize => 1.0,
                ObjSense::Maximize => -1.0,
            };
            for &cons in &cons_ptrs {
                duals.push(sign * scip.dual_sol(cons)?);
            }
            Some(duals)
        } else {
            None
        };

        let tolerance = scip.dual_feastol();
        Ok((
            status,
            SolveResult {
                values,
                duals,
                objective,
            },
            tolerance,
        ))
    }
}

impl LpSolver for ScipSolver {
    fn create(config: &SolverConfig) -> Result<Self, SolverError> {
        Ok(ScipSolver {
            config: config.clone(),
            vars: Vec::new(),
            conss: Vec::new(),
            objective: LinearObjective::default(),
            result: None,
            tolerance: config.optimality_tolerance.unwrap_or(DEFAULT_DUAL_FEASTOL),
        })
    }

    fn add_var(&mut self, lb: f64, ub: f64, var_type: VarType) -> Result<VarId, SolverError> {
        self.result = None;
        self.vars.push(VarRecord { lb, ub, var_type });
        Ok(VarId(self.vars.len() - 1))
    }

    fn set_var_type(&mut self, var: VarId, var_type: VarType) -> Result<(), SolverError> {
        let record = self
            .vars
            .get_mut(var.index())
            .ok_or(SolverError::UnknownVariable(var))?;
        if record.var_type != var_type {
            record.var_type = var_type;
            self.result = None;
        }
        Ok(())
    }

    fn var_type(&self, var: VarId) -> Result<VarType, SolverError> {
        Ok(self.var(var)?.var_type)
    }

    fn add_cons(
        &mut self,
        coefs: &[(VarId, f64)],
        sense: Sense,
        rhs: f64,
    ) -> Result<ConsId, SolverError> {
        for &(var, _) in coefs {
            self.var(var)?;
        }
        let (lhs, rhs) = sense.range(rhs);
        self.result = None;
        self.conss.push(ConsRecord {
            coefs: coefs.to_vec(),
            lhs,
            rhs,
        });
        Ok(ConsId(self.conss.len() - 1))
    }

    fn add_coef(&mut self, cons: ConsId, var: VarId, coef: f64) -> Result<(), SolverError> {
        self.var(var)?;
        let record = self
            .conss
            .get_mut(cons.index())
            .ok_or(SolverError::UnknownConstraint(cons))?;
        record.coefs.push((var, coef));
        self.result = None;
        Ok(())
    }

    fn set_objective(&mut self, objective: LinearObjective) -> Result<(), SolverError> {
        for &(var, _) in &objective.coefs {
            self.var(var)?;
        }
        self.objective = objective;
        self.result = None;
        Ok(())
    }

    fn solve(&mut self) -> Result<SolveStatus, SolverError> {
        self.result = None;
        let (status, result, tolerance) = self.build_and_solve()?;
        self.result = Some(result);
        self.tolerance = tolerance;
        Ok(status)
    }

    fn is_feasible(&self) -> bool {
        self.result
            .as_ref()
            .is_some_and(|result| result.values.is_some())
    }

    fn value(&self, var: VarId) -> Result<f64, SolverError> {
        self.var(var)?;
        let values = self
            .result()?
            .values
            .as_ref()
            .ok_or(SolverError::NoSolution)?;
        Ok(values[var.index()])
    }

    fn dual(&self, cons: ConsId) -> Result<f64, SolverError> {
        if cons.index() >= self.conss.len() {
            return Err(SolverError::UnknownConstraint(cons));
        }
        let duals = self
            .result()?
            .duals
            .as_ref()
            .ok_or(SolverError::NoSolution)?;
        Ok(duals[cons.index()])
    }

    fn objective_value(&self) -> Result<f64, SolverError> {
        self.result()?.objective.ok_or(SolverError::NoSolution)
    }

    fn optimality_tolerance(&self) -> f64 {
        self.tolerance
    }

    fn n_vars(&self) -> usize {
        self.vars.len()
    }

    fn n_conss(&self) -> usize {
        self.conss.len()
    }
}
