//! Application layer: the analysis problem shell handed to the solver.

mod problem;

pub use problem::InfoflowProblem;
