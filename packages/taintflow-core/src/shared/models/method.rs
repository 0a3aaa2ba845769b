//! Concrete method facts
//!
//! The minimal string facts about a real program method that the signature
//! model needs: name, declaring class, return type and parameter types,
//! all rendered exactly as the program representation spells them.

use serde::{Deserialize, Serialize};

use super::ids::MethodId;

/// A concrete method surfaced by the program representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramMethod {
    pub id: MethodId,
    pub name: String,
    pub class_name: String,
    pub return_type: String,
    pub parameter_types: Vec<String>,
}

impl ProgramMethod {
    pub fn new(
        id: MethodId,
        name: impl Into<String>,
        class_name: impl Into<String>,
        return_type: impl Into<String>,
        parameter_types: Vec<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            class_name: class_name.into(),
            return_type: return_type.into(),
            parameter_types,
        }
    }
}
