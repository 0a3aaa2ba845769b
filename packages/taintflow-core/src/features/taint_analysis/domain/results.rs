/*
 * Result records
 *
 * Minimal association of a reporting statement with its enclosing
 * method/class. Construction is two-phase on purpose: the statement is
 * known the moment a source or sink match is confirmed, but the enclosing
 * method and declaring class often only become known after the solver
 * finishes attributing context.
 */

use serde::{Deserialize, Serialize};

use crate::shared::models::{MethodId, StmtId};

/// Whether a record reports a taint source or a taint-sensitive use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultKind {
    Source,
    Sink,
}

/// One confirmed source or sink occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    kind: ResultKind,
    stmt: StmtId,
    method: Option<MethodId>,
    declaring_class: Option<String>,
}

impl ResultRecord {
    pub fn new(kind: ResultKind, stmt: StmtId) -> Self {
        Self {
            kind,
            stmt,
            method: None,
            declaring_class: None,
        }
    }

    pub fn source_at(stmt: StmtId) -> Self {
        Self::new(ResultKind::Source, stmt)
    }

    pub fn sink_at(stmt: StmtId) -> Self {
        Self::new(ResultKind::Sink, stmt)
    }

    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    pub fn stmt(&self) -> StmtId {
        self.stmt
    }

    pub fn method(&self) -> Option<MethodId> {
        self.method
    }

    pub fn set_method(&mut self, method: MethodId) {
        self.method = Some(method);
    }

    pub fn declaring_class(&self) -> Option<&str> {
        self.declaring_class.as_deref()
    }

    pub fn set_declaring_class(&mut self, class: impl Into<String>) {
        self.declaring_class = Some(class.into());
    }
}

/// All source and sink occurrences confirmed during one analysis run.
/// Lives in memory only; nothing is persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InfoflowResults {
    sources: Vec<ResultRecord>,
    sinks: Vec<ResultRecord>,
}

impl InfoflowResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: ResultRecord) {
        match record.kind() {
            ResultKind::Source => self.sources.push(record),
            ResultKind::Sink => self.sinks.push(record),
        }
    }

    pub fn sources(&self) -> &[ResultRecord] {
        &self.sources
    }

    pub fn sinks(&self) -> &[ResultRecord] {
        &self.sinks
    }

    pub fn len(&self) -> usize {
        self.sources.len() + self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.sinks.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
