//! Shared models
//!
//! Representation-independent value types consumed by every feature slice:
//! opaque statement/method identifiers, structural value references, the
//! concrete-method facts needed for signature derivation, the per-method
//! control-flow graph handed across the ICFG port, and the unified error
//! type.

mod cfg;
mod error;
mod ids;
mod method;
mod value;

pub use cfg::MethodCfg;
pub use error::{Result, TaintflowError};
pub use ids::{MethodId, StmtId};
pub use method::ProgramMethod;
pub use value::ValueRef;
