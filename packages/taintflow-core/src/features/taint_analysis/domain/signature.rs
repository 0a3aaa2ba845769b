/*
 * Element signatures
 *
 * Canonical, representation-independent identity for a method or field.
 * Source and sink specifications are written against these signatures and
 * matched against concrete program elements during propagation.
 *
 * Identity contract:
 * - equality and hash cover (member name, declaring class, parameter list)
 * - the return type is excluded, so a specification entry still matches a
 *   concrete method with a covariant or annotated return type
 * - declaring-class-at-use and line number are display metadata only
 */

use once_cell::sync::OnceCell;
use rustc_hash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::shared::models::ProgramMethod;

/// Canonical signature of a method or field.
///
/// Immutable after construction except for the declaring-class-at-use and
/// line-number metadata, which may be attached later, and the parameter
/// list, which stays reachable through [`parameters_mut`]. Cloning
/// deep-copies the parameter list, so copies diverge independently.
///
/// [`parameters_mut`]: ElementSignature::parameters_mut
#[derive(Debug, Clone)]
pub struct ElementSignature {
    name: String,
    class_name: String,
    return_type: String,
    parameters: Vec<String>,
    declared_class: Option<String>,
    line_number: Option<u32>,
    is_field: bool,
    /// Cached hash of (name, class_name). Both fields are immutable, so
    /// the cache survives cloning. The parameter list is mutable from the
    /// outside and its contribution is recomputed on every `hash` call.
    base_hash: OnceCell<u64>,
}

impl ElementSignature {
    /// Build a signature directly from parts. An empty `return_type`
    /// combined with [`set_field`] is the convention for "this names a
    /// field, not a method".
    ///
    /// [`set_field`]: ElementSignature::set_field
    pub fn new(
        name: impl Into<String>,
        class_name: impl Into<String>,
        return_type: impl Into<String>,
        parameters: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
            return_type: return_type.into(),
            parameters,
            declared_class: None,
            line_number: None,
            is_field: false,
            base_hash: OnceCell::new(),
        }
    }

    /// Derive a signature from a concrete program method, copying its
    /// string facts verbatim.
    pub fn from_method(method: &ProgramMethod) -> Self {
        Self::new(
            method.name.clone(),
            method.class_name.clone(),
            method.return_type.clone(),
            method.parameter_types.clone(),
        )
    }

    /// Signature for a field: the field's type sits in the return-type
    /// slot and the parameter list is empty.
    pub fn for_field(
        class_name: impl Into<String>,
        field_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let mut sig = Self::new(name, class_name, field_type, Vec::new());
        sig.is_field = true;
        sig
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn return_type(&self) -> &str {
        &self.return_type
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Mutable access to the parameter list. The hash stays consistent
    /// with whatever the list currently holds.
    pub fn parameters_mut(&mut self) -> &mut Vec<String> {
        &mut self.parameters
    }

    pub fn is_field(&self) -> bool {
        self.is_field
    }

    pub fn set_field(&mut self, is_field: bool) {
        self.is_field = is_field;
    }

    pub fn declared_class(&self) -> Option<&str> {
        self.declared_class.as_deref()
    }

    /// Attach the class this element was used in (metadata only).
    pub fn set_declared_class(&mut self, declared_class: impl Into<String>) {
        self.declared_class = Some(declared_class.into());
    }

    pub fn line_number(&self) -> Option<u32> {
        self.line_number
    }

    /// Attach the source line this element was used at (metadata only).
    pub fn set_line_number(&mut self, line: u32) {
        self.line_number = Some(line);
    }

    /// The member's signature without its declaring class, used to match a
    /// method against overriding declarations across a class hierarchy.
    pub fn sub_signature(&self) -> String {
        if self.is_field {
            self.field_sub_signature()
        } else {
            self.method_sub_signature()
        }
    }

    /// Canonical bracketed signature including the declaring class and, if
    /// set, a `class:line` use-site prefix.
    pub fn signature(&self) -> String {
        if self.is_field {
            self.field_signature()
        } else {
            self.method_signature()
        }
    }

    fn use_site_prefix(&self) -> String {
        match &self.declared_class {
            Some(class) => format!("{}:{} ", class, self.line_number.unwrap_or(0)),
            None => String::new(),
        }
    }

    fn joined_parameters(&self) -> String {
        self.parameters
            .iter()
            .map(|p| p.trim())
            .collect::<Vec<_>>()
            .join(",")
    }

    fn method_sub_signature(&self) -> String {
        let ret = if self.return_type.is_empty() {
            String::new()
        } else {
            format!("{} ", self.return_type)
        };
        format!("{}{}({})", ret, self.name, self.joined_parameters())
    }

    fn field_sub_signature(&self) -> String {
        format!("{}: {} {}", self.class_name, self.return_type, self.name)
    }

    fn method_signature(&self) -> String {
        let ret = if self.return_type.is_empty() {
            String::new()
        } else {
            format!("{} ", self.return_type)
        };
        format!(
            "{}<{}: {}{}({})>",
            self.use_site_prefix(),
            self.class_name,
            ret,
            self.name,
            self.joined_parameters()
        )
    }

    fn field_signature(&self) -> String {
        format!(
            "{}<{}: {} {}>",
            self.use_site_prefix(),
            self.class_name,
            self.return_type,
            self.name
        )
    }

    fn base_hash(&self) -> u64 {
        *self.base_hash.get_or_init(|| {
            let mut h = FxHasher::default();
            self.name.hash(&mut h);
            let name_hash = h.finish();
            let mut h = FxHasher::default();
            self.class_name.hash(&mut h);
            name_hash.wrapping_add(h.finish().wrapping_mul(5))
        })
    }
}

impl PartialEq for ElementSignature {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.parameters == other.parameters
            && self.class_name == other.class_name
    }
}

impl Eq for ElementSignature {}

impl Hash for ElementSignature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut params = FxHasher::default();
        self.parameters.hash(&mut params);
        state.write_u64(
            self.base_hash()
                .wrapping_add(params.finish().wrapping_mul(7)),
        );
    }
}

impl fmt::Display for ElementSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signature())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::MethodId;
    use pretty_assertions::assert_eq;

    fn hash_of(sig: &ElementSignature) -> u64 {
        let mut h = FxHasher::default();
        sig.hash(&mut h);
        h.finish()
    }

    #[test]
    fn return_type_excluded_from_identity() {
        let a = ElementSignature::new(
            "foo",
            "com.example.A",
            "int",
            vec!["java.lang.String".to_string()],
        );
        let b = ElementSignature::new(
            "foo",
            "com.example.A",
            "void",
            vec!["java.lang.String".to_string()],
        );
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn parameter_list_part_of_identity() {
        let a = ElementSignature::new("foo", "com.example.A", "int", vec![]);
        let b = ElementSignature::new("foo", "com.example.A", "int", vec!["int".to_string()]);
        assert_ne!(a, b);
        assert_ne!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn mutating_parameters_updates_hash() {
        let mut a = ElementSignature::new("foo", "com.example.A", "int", vec![]);
        let before = hash_of(&a);

        a.parameters_mut().push("int".to_string());
        let after = hash_of(&a);
        assert_ne!(before, after);

        // Consistent with a fresh signature built with the mutated list.
        let fresh = ElementSignature::new("foo", "com.example.A", "int", vec!["int".to_string()]);
        assert_eq!(a, fresh);
        assert_eq!(after, hash_of(&fresh));
    }

    #[test]
    fn method_renderings() {
        let mut sig = ElementSignature::new(
            "foo",
            "com.example.A",
            "int",
            vec!["java.lang.String".to_string(), " int ".to_string()],
        );
        assert_eq!(sig.sub_signature(), "int foo(java.lang.String,int)");
        assert_eq!(sig.signature(), "<com.example.A: int foo(java.lang.String,int)>");

        sig.set_declared_class("com.example.B");
        sig.set_line_number(42);
        assert_eq!(
            sig.signature(),
            "com.example.B:42 <com.example.A: int foo(java.lang.String,int)>"
        );
    }

    #[test]
    fn field_renderings() {
        let sig = ElementSignature::for_field("com.example.A", "java.lang.String", "secret");
        assert!(sig.is_field());
        assert_eq!(sig.signature(), "<com.example.A: java.lang.String secret>");
        assert_eq!(sig.sub_signature(), "com.example.A: java.lang.String secret");
    }

    #[test]
    fn derived_from_concrete_method() {
        let m = ProgramMethod::new(
            MethodId(3),
            "bar",
            "com.example.C",
            "void",
            vec!["int".to_string(), "int".to_string()],
        );
        let sig = ElementSignature::from_method(&m);
        assert_eq!(sig.name(), "bar");
        assert_eq!(sig.class_name(), "com.example.C");
        assert_eq!(sig.parameters().len(), 2);
        assert!(!sig.is_field());
    }

    #[test]
    fn clone_is_a_deep_copy() {
        let a = ElementSignature::new("foo", "com.example.A", "int", vec!["int".to_string()]);
        let mut b = a.clone();
        b.parameters_mut().push("long".to_string());

        assert_eq!(a.parameters().len(), 1);
        assert_ne!(a, b);
    }

    #[test]
    fn metadata_does_not_affect_identity() {
        let a = ElementSignature::new("foo", "com.example.A", "int", vec![]);
        let mut b = a.clone();
        b.set_declared_class("com.example.Use");
        b.set_line_number(7);

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }
}
