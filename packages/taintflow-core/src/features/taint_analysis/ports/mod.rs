/*
 * Taint analysis ports
 *
 * Boundaries to the external collaborators this core deliberately does not
 * implement:
 *
 * - the program representation (statements, bodies, call graph) behind
 *   `InterproceduralCfg`
 * - the generic IFDS/IDE-style tabulation solver, which consumes the
 *   problem shell through `TabulationProblem`
 * - the analysis-policy layer, which supplies per-instruction transfer
 *   rules through `FlowFunctions` and library models through
 *   `TaintWrapper` / `NativeCallHandler`
 *
 * Everything here is synchronous: the core exposes no suspension points,
 * and cancellation of the overall run belongs to the external driver.
 */

use rustc_hash::FxHashSet;
use std::sync::Arc;

use crate::features::taint_analysis::domain::{Abstraction, PathTrackingMethod};
use crate::shared::models::{MethodCfg, MethodId, ProgramMethod, Result, StmtId, ValueRef};

/// Capability set the program representation must provide.
///
/// Implementations are expected to be cheap on repeated queries (the
/// control-dependency oracle asks for the same bodies many times) and
/// stale-free: the program under analysis is immutable for the duration of
/// one run.
pub trait InterproceduralCfg: Send + Sync {
    /// Enclosing method of a statement.
    fn method_of(&self, stmt: StmtId) -> Result<MethodId>;

    /// Intraprocedural control-flow graph of a method body.
    fn cfg_of(&self, method: MethodId) -> Result<Arc<MethodCfg>>;

    /// Concrete facts about a method, for signature derivation.
    fn method(&self, method: MethodId) -> Result<ProgramMethod>;

    /// Callee candidates of a call site. Empty for non-call statements.
    fn callees_of(&self, call_site: StmtId) -> Vec<MethodId>;

    /// Value defined (written) by a statement, if any.
    fn def_value_of(&self, stmt: StmtId) -> Option<ValueRef>;

    /// Values used (read) by a statement.
    fn use_values_of(&self, stmt: StmtId) -> Vec<ValueRef>;
}

/// Flow-function strategy supplied by the analysis-policy layer.
///
/// This core defines only the shape; the transfer rules for assignments,
/// calls and returns are policy code built on top of the abstraction
/// model, not part of the kernel.
pub trait FlowFunctions: Send + Sync {
    /// Intra-procedural edge `curr -> succ`.
    fn normal_flow(&self, curr: StmtId, succ: StmtId, fact: &Abstraction)
        -> FxHashSet<Abstraction>;

    /// Call edge from a call site into a callee.
    fn call_flow(
        &self,
        call_site: StmtId,
        callee: MethodId,
        fact: &Abstraction,
    ) -> FxHashSet<Abstraction>;

    /// Return edge from a callee exit back to the return site.
    fn return_flow(
        &self,
        callee_exit: StmtId,
        return_site: StmtId,
        call_site: StmtId,
        fact: &Abstraction,
    ) -> FxHashSet<Abstraction>;

    /// Pass-through edge for facts that bypass the callee entirely.
    fn call_to_return_flow(
        &self,
        call_site: StmtId,
        return_site: StmtId,
        fact: &Abstraction,
    ) -> FxHashSet<Abstraction>;
}

/// Hook for modeling taint through library methods whose bodies are not
/// analyzed.
pub trait TaintWrapper: Send + Sync {
    /// Whether this wrapper has a model for the given class.
    fn supports_class(&self, class_name: &str) -> bool;

    /// Values that become tainted by `call_site` when `incoming` holds on
    /// entry.
    fn taints_for_call(&self, call_site: StmtId, incoming: &Abstraction) -> Vec<ValueRef>;
}

/// Summarization of native/library calls the representation cannot look
/// into. The handler synthesizes facts itself, so it must know the
/// analysis-wide tracking mode to produce path-consistent abstractions.
pub trait NativeCallHandler: Send + Sync {
    /// Keep synthesized facts consistent with the configured mode.
    fn set_path_tracking(&mut self, mode: PathTrackingMethod);

    /// Facts produced by `call_site` for one incoming fact.
    fn handle_call(
        &self,
        icfg: &dyn InterproceduralCfg,
        call_site: StmtId,
        incoming: &Abstraction,
    ) -> FxHashSet<Abstraction>;
}

/// Configuration surface the tabulation solver consumes.
pub trait TabulationProblem {
    /// The distinguished "nothing is tainted yet" fact; one shared
    /// instance per analysis.
    fn create_zero_value(&self) -> Arc<Abstraction>;

    /// Statements propagation starts from.
    fn initial_seeds(&self) -> Vec<StmtId>;

    /// Continue propagation past the return of a method even when that
    /// method was itself a seed, so taint introduced inside a seeded
    /// method still reaches its callers. Always true for this analysis.
    fn follow_returns_past_seeds(&self) -> bool;

    /// The shell supplies explicit seeds only; the solver must not inject
    /// the zero fact on its own. Always false for this analysis.
    fn auto_add_zero(&self) -> bool;

    /// The registered flow-function strategy, if any.
    fn flow_functions(&self) -> Option<&dyn FlowFunctions>;
}
