//! Infrastructure: the control-dependency oracle, the post-dominator
//! computation underneath it, the default native-call summary and the
//! in-memory reference implementation of the program-representation port.

mod control_deps;
mod in_memory_icfg;
mod native;
mod postdom;

pub use control_deps::{ControlDependencyOracle, OracleStats, ReconvergencePoint};
pub use in_memory_icfg::InMemoryIcfg;
pub use native::DefaultNativeCallHandler;
pub use postdom::PostDominatorTree;
