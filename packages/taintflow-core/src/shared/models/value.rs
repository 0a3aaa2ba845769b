//! Structural value references
//!
//! A `ValueRef` names a program value that can carry taint. Two references
//! are the same tainted value whenever they are structurally equal — the
//! comparison never falls back to object identity, so facts produced in
//! different call contexts for the same local or field collapse correctly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural identity of a program value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueRef {
    /// A method-local variable.
    Local { name: String, ty: String },

    /// A static field.
    StaticField {
        class: String,
        name: String,
        ty: String,
    },

    /// An instance field, identified by its base local and field name.
    InstanceField {
        base: String,
        name: String,
        ty: String,
    },

    /// Synthetic null-typed placeholder carried by the zero fact. Never
    /// produced by the program representation, so it cannot collide with
    /// a real value.
    NullPlaceholder,
}

impl ValueRef {
    pub fn local(name: impl Into<String>, ty: impl Into<String>) -> Self {
        ValueRef::Local {
            name: name.into(),
            ty: ty.into(),
        }
    }

    pub fn static_field(
        class: impl Into<String>,
        name: impl Into<String>,
        ty: impl Into<String>,
    ) -> Self {
        ValueRef::StaticField {
            class: class.into(),
            name: name.into(),
            ty: ty.into(),
        }
    }

    pub fn instance_field(
        base: impl Into<String>,
        name: impl Into<String>,
        ty: impl Into<String>,
    ) -> Self {
        ValueRef::InstanceField {
            base: base.into(),
            name: name.into(),
            ty: ty.into(),
        }
    }

    /// Whether this is the zero fact's synthetic placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, ValueRef::NullPlaceholder)
    }

    /// Declared type of the referenced value.
    pub fn ty(&self) -> &str {
        match self {
            ValueRef::Local { ty, .. }
            | ValueRef::StaticField { ty, .. }
            | ValueRef::InstanceField { ty, .. } => ty,
            ValueRef::NullPlaceholder => "null",
        }
    }

    /// Canonical dotted rendering, e.g. `com.example.A.field` for a static
    /// field. Used when a value must be matched against a textual
    /// source/sink specification.
    pub fn qualified_name(&self) -> String {
        match self {
            ValueRef::Local { name, .. } => name.clone(),
            ValueRef::StaticField { class, name, .. } => format!("{}.{}", class, name),
            ValueRef::InstanceField { base, name, .. } => format!("{}.{}", base, name),
            ValueRef::NullPlaceholder => "<zero>".to_string(),
        }
    }
}

impl fmt::Display for ValueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}
