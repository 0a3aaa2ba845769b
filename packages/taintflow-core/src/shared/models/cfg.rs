//! Per-method control-flow graph
//!
//! Plain adjacency model over opaque statement ids: one entry, any number
//! of exits (return and throw statements alike). Built by the program
//! representation collaborator and consumed read-only by the
//! post-dominator computation, so there is no mutation after hand-off.

use rustc_hash::FxHashMap;

use super::ids::{MethodId, StmtId};

/// Intraprocedural control-flow graph of one method body.
#[derive(Debug, Clone)]
pub struct MethodCfg {
    method: MethodId,
    entry: StmtId,
    /// Statements in registration order; gives the graph a stable dense
    /// numbering for the dominance computation.
    stmts: Vec<StmtId>,
    succs: FxHashMap<StmtId, Vec<StmtId>>,
    preds: FxHashMap<StmtId, Vec<StmtId>>,
    exits: Vec<StmtId>,
}

impl MethodCfg {
    pub fn new(method: MethodId, entry: StmtId) -> Self {
        let mut cfg = Self {
            method,
            entry,
            stmts: Vec::new(),
            succs: FxHashMap::default(),
            preds: FxHashMap::default(),
            exits: Vec::new(),
        };
        cfg.add_stmt(entry);
        cfg
    }

    /// Register a statement without edges (isolated until connected).
    pub fn add_stmt(&mut self, stmt: StmtId) {
        if !self.succs.contains_key(&stmt) {
            self.succs.insert(stmt, Vec::new());
            self.preds.insert(stmt, Vec::new());
            self.stmts.push(stmt);
        }
    }

    /// Add a control-flow edge, registering both endpoints.
    pub fn add_edge(&mut self, from: StmtId, to: StmtId) {
        self.add_stmt(from);
        self.add_stmt(to);
        self.succs.entry(from).or_default().push(to);
        self.preds.entry(to).or_default().push(from);
    }

    /// Mark a statement as a method exit (return or throw).
    pub fn add_exit(&mut self, stmt: StmtId) {
        self.add_stmt(stmt);
        if !self.exits.contains(&stmt) {
            self.exits.push(stmt);
        }
    }

    pub fn method(&self) -> MethodId {
        self.method
    }

    pub fn entry(&self) -> StmtId {
        self.entry
    }

    pub fn exits(&self) -> &[StmtId] {
        &self.exits
    }

    pub fn stmts(&self) -> &[StmtId] {
        &self.stmts
    }

    pub fn successors_of(&self, stmt: StmtId) -> &[StmtId] {
        self.succs.get(&stmt).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn predecessors_of(&self, stmt: StmtId) -> &[StmtId] {
        self.preds.get(&stmt).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn contains(&self, stmt: StmtId) -> bool {
        self.succs.contains_key(&stmt)
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}
