// Interprocedural taint-propagation core
//
// Hexagonal architecture:
// - domain: dataflow facts, element signatures, result records
// - infrastructure: control-dependency oracle, post-dominators, adapters
// - ports: boundaries to the program representation, solver and policy layer
// - application: the problem shell consumed by the solver

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// Re-export application layer (primary interface)
pub use application::InfoflowProblem;

// Re-export domain types
pub use domain::{
    Abstraction, ElementSignature, InfoflowResults, PathTrackingMethod, ResultKind, ResultRecord,
};

// Re-export infrastructure
pub use infrastructure::{
    ControlDependencyOracle, DefaultNativeCallHandler, InMemoryIcfg, OracleStats,
    PostDominatorTree, ReconvergencePoint,
};

pub use ports::{
    FlowFunctions, InterproceduralCfg, NativeCallHandler, TabulationProblem, TaintWrapper,
};
