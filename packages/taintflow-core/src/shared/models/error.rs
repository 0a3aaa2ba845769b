//! Error types for taintflow-core
//!
//! This core is a pure data/algorithm kernel and carries no recoverable
//! error taxonomy of its own: the only failures that surface as `Err` come
//! from the program representation answering a lookup inconsistently
//! (unknown statement or method). Malformed construction input remains a
//! programming error and is not handled defensively.

use thiserror::Error;

use super::ids::{MethodId, StmtId};

/// Unified error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaintflowError {
    /// The program representation has no enclosing method for a statement.
    #[error("no enclosing method for statement {0}")]
    UnknownStatement(StmtId),

    /// The program representation has no body/CFG for a method.
    #[error("no control-flow graph for method {0}")]
    UnknownMethod(MethodId),

    /// A statement was attributed to a method whose graph does not contain it.
    #[error("statement {stmt} is not part of the control-flow graph of method {method}")]
    StatementOutsideMethod { stmt: StmtId, method: MethodId },
}

/// Crate-local result alias.
pub type Result<T> = std::result::Result<T, TaintflowError>;
