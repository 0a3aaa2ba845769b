/*
 * In-memory interprocedural CFG
 *
 * Reference implementation of the program-representation port: a hand
 * assembled program model for integration tests, benches and small host
 * programs. Methods, statements, edges and def/use facts are registered
 * through the builder methods; per-method graphs are materialized lazily
 * and handed out behind `Arc`s, with a request counter so callers can
 * observe how often the representation is actually consulted.
 */

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::features::taint_analysis::ports::InterproceduralCfg;
use crate::shared::models::{
    MethodCfg, MethodId, ProgramMethod, Result, StmtId, TaintflowError, ValueRef,
};

/// Builder-style program model implementing [`InterproceduralCfg`].
#[derive(Debug, Default)]
pub struct InMemoryIcfg {
    methods: FxHashMap<MethodId, ProgramMethod>,
    entries: FxHashMap<MethodId, StmtId>,
    enclosing: FxHashMap<StmtId, MethodId>,
    stmts: FxHashMap<MethodId, Vec<StmtId>>,
    edges: FxHashMap<MethodId, Vec<(StmtId, StmtId)>>,
    exits: FxHashMap<MethodId, Vec<StmtId>>,
    defs: FxHashMap<StmtId, ValueRef>,
    uses: FxHashMap<StmtId, Vec<ValueRef>>,
    callees: FxHashMap<StmtId, Vec<MethodId>>,
    cfg_cache: Mutex<FxHashMap<MethodId, Arc<MethodCfg>>>,
    cfg_requests: AtomicUsize,
}

impl InMemoryIcfg {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method and its entry statement. Returns the method id
    /// for convenience when chaining.
    pub fn add_method(&mut self, method: ProgramMethod, entry: StmtId) -> MethodId {
        let id = method.id;
        self.methods.insert(id, method);
        self.entries.insert(id, entry);
        self.register_stmt(id, entry);
        id
    }

    /// Register a statement inside a method without connecting it yet.
    pub fn add_statement(&mut self, method: MethodId, stmt: StmtId) {
        self.register_stmt(method, stmt);
    }

    /// Add an intraprocedural edge. `from` must already be registered so
    /// the enclosing method is known; `to` is registered automatically.
    pub fn add_edge(&mut self, from: StmtId, to: StmtId) {
        let method = *self
            .enclosing
            .get(&from)
            .expect("edge source must belong to a registered method");
        self.register_stmt(method, to);
        self.edges.entry(method).or_default().push((from, to));
    }

    /// Mark a registered statement as a method exit.
    pub fn add_exit(&mut self, stmt: StmtId) {
        let method = *self
            .enclosing
            .get(&stmt)
            .expect("exit must belong to a registered method");
        self.exits.entry(method).or_default().push(stmt);
    }

    pub fn set_def(&mut self, stmt: StmtId, value: ValueRef) {
        self.defs.insert(stmt, value);
    }

    pub fn add_use(&mut self, stmt: StmtId, value: ValueRef) {
        self.uses.entry(stmt).or_default().push(value);
    }

    pub fn add_callee(&mut self, call_site: StmtId, callee: MethodId) {
        self.callees.entry(call_site).or_default().push(callee);
    }

    /// How many times a per-method graph was actually built (cache misses
    /// on the representation side).
    pub fn cfg_requests(&self) -> usize {
        self.cfg_requests.load(Ordering::Relaxed)
    }

    fn register_stmt(&mut self, method: MethodId, stmt: StmtId) {
        if self.enclosing.insert(stmt, method).is_none() {
            self.stmts.entry(method).or_default().push(stmt);
        }
    }

    fn build_cfg(&self, method: MethodId) -> Result<MethodCfg> {
        let entry = *self
            .entries
            .get(&method)
            .ok_or(TaintflowError::UnknownMethod(method))?;
        let mut cfg = MethodCfg::new(method, entry);
        if let Some(stmts) = self.stmts.get(&method) {
            for &stmt in stmts {
                cfg.add_stmt(stmt);
            }
        }
        if let Some(edges) = self.edges.get(&method) {
            for &(from, to) in edges {
                cfg.add_edge(from, to);
            }
        }
        if let Some(exits) = self.exits.get(&method) {
            for &exit in exits {
                cfg.add_exit(exit);
            }
        }
        Ok(cfg)
    }
}

impl InterproceduralCfg for InMemoryIcfg {
    fn method_of(&self, stmt: StmtId) -> Result<MethodId> {
        self.enclosing
            .get(&stmt)
            .copied()
            .ok_or(TaintflowError::UnknownStatement(stmt))
    }

    fn cfg_of(&self, method: MethodId) -> Result<Arc<MethodCfg>> {
        let mut cache = self.cfg_cache.lock();
        if let Some(cfg) = cache.get(&method) {
            return Ok(Arc::clone(cfg));
        }
        self.cfg_requests.fetch_add(1, Ordering::Relaxed);
        let cfg = Arc::new(self.build_cfg(method)?);
        cache.insert(method, Arc::clone(&cfg));
        Ok(cfg)
    }

    fn method(&self, method: MethodId) -> Result<ProgramMethod> {
        self.methods
            .get(&method)
            .cloned()
            .ok_or(TaintflowError::UnknownMethod(method))
    }

    fn callees_of(&self, call_site: StmtId) -> Vec<MethodId> {
        self.callees.get(&call_site).cloned().unwrap_or_default()
    }

    fn def_value_of(&self, stmt: StmtId) -> Option<ValueRef> {
        self.defs.get(&stmt).cloned()
    }

    fn use_values_of(&self, stmt: StmtId) -> Vec<ValueRef> {
        self.uses.get(&stmt).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InMemoryIcfg {
        let mut icfg = InMemoryIcfg::new();
        icfg.add_method(
            ProgramMethod::new(
                MethodId(1),
                "foo",
                "com.example.A",
                "int",
                vec!["java.lang.String".to_string()],
            ),
            StmtId(10),
        );
        icfg.add_edge(StmtId(10), StmtId(11));
        icfg.add_exit(StmtId(11));
        icfg
    }

    #[test]
    fn enclosing_method_lookup() {
        let icfg = sample();
        assert_eq!(icfg.method_of(StmtId(11)).unwrap(), MethodId(1));
        assert_eq!(
            icfg.method_of(StmtId(99)).unwrap_err(),
            TaintflowError::UnknownStatement(StmtId(99))
        );
    }

    #[test]
    fn graphs_are_built_once_and_shared() {
        let icfg = sample();
        let a = icfg.cfg_of(MethodId(1)).unwrap();
        let b = icfg.cfg_of(MethodId(1)).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(icfg.cfg_requests(), 1);
        assert_eq!(a.entry(), StmtId(10));
        assert_eq!(a.exits(), &[StmtId(11)]);
    }

    #[test]
    fn unknown_method_is_an_error() {
        let icfg = sample();
        assert_eq!(
            icfg.cfg_of(MethodId(9)).unwrap_err(),
            TaintflowError::UnknownMethod(MethodId(9))
        );
        assert_eq!(
            icfg.method(MethodId(9)).unwrap_err(),
            TaintflowError::UnknownMethod(MethodId(9))
        );
    }

    #[test]
    fn def_use_and_callee_facts() {
        let mut icfg = sample();
        icfg.set_def(StmtId(10), ValueRef::local("x", "int"));
        icfg.add_use(StmtId(10), ValueRef::local("y", "int"));
        icfg.add_callee(StmtId(10), MethodId(1));

        assert_eq!(icfg.def_value_of(StmtId(10)), Some(ValueRef::local("x", "int")));
        assert_eq!(icfg.use_values_of(StmtId(10)).len(), 1);
        assert_eq!(icfg.callees_of(StmtId(10)), vec![MethodId(1)]);
        assert!(icfg.callees_of(StmtId(11)).is_empty());
    }
}
