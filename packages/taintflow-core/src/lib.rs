/*
 * taintflow-core — kernel of an interprocedural taint-propagation engine
 *
 * Feature-first hexagonal architecture:
 * - shared/   : common models (ids, value refs, per-method CFG, errors)
 * - features/ : the taint-analysis slice (domain, ports, infrastructure,
 *               application)
 *
 * The program representation, the IFDS/IDE-style tabulation solver and the
 * per-instruction flow functions are external collaborators reached
 * through ports; this crate supplies the dataflow-fact model the solver
 * propagates, the control-dependency oracle that bounds implicit flows,
 * the signature model that matches sources and sinks, and the problem
 * shell that configures a run.
 */

#![allow(clippy::new_without_default)]

pub mod features;
pub mod shared;

pub use features::taint_analysis::{
    Abstraction, ControlDependencyOracle, DefaultNativeCallHandler, ElementSignature,
    FlowFunctions, InMemoryIcfg, InfoflowProblem, InfoflowResults, InterproceduralCfg,
    NativeCallHandler, OracleStats, PathTrackingMethod, PostDominatorTree, ReconvergencePoint,
    ResultKind, ResultRecord, TabulationProblem, TaintWrapper,
};
pub use shared::models::{
    MethodCfg, MethodId, ProgramMethod, Result, StmtId, TaintflowError, ValueRef,
};
