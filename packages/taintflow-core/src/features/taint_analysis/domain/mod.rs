//! Domain layer: the dataflow-fact data model and signature identity.

mod abstraction;
mod results;
mod signature;

pub use abstraction::{Abstraction, PathTrackingMethod};
pub use results::{InfoflowResults, ResultKind, ResultRecord};
pub use signature::ElementSignature;
