/*
 * Taint abstractions (dataflow facts)
 *
 * An abstraction says "this value is tainted, introduced at this source
 * statement". The tabulation solver propagates these facts along the
 * exploded supergraph and stores them in hash sets, so their identity
 * contract is what bounds the whole analysis:
 *
 *   equality and hash cover the tainted value and the source context only,
 *   never the recorded path.
 *
 * Many paths reaching the same fact therefore collapse into one, keeping
 * the fact space at O(values x contexts) instead of O(paths). The optional
 * path exists purely for explainability and is carried outside the
 * identity.
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::shared::models::{StmtId, ValueRef};

/// How taint propagation paths are recorded on abstractions.
///
/// Selected once per analysis and immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PathTrackingMethod {
    /// Do not track any paths. Connections between sources and sinks are
    /// still found, but the route between them is forgotten. Minimal
    /// memory.
    #[default]
    NoTracking,

    /// Record every statement visited since the taint was introduced.
    /// Memory grows with path length; enables full taint-trace reporting.
    ForwardTracking,
}

/// A single dataflow fact.
///
/// Immutable once published into the solver's fact sets: extension always
/// produces a new value, which is what makes concurrent propagation safe
/// without per-fact locking. The recorded path is shared read-only.
#[derive(Debug, Clone)]
pub struct Abstraction {
    value: ValueRef,
    /// Statement that introduced the taint. `None` only for the zero fact.
    source: Option<StmtId>,
    zero: bool,
    /// `Some` iff forward tracking is on.
    path: Option<Vec<StmtId>>,
    /// Whether this fact already left the method it was introduced in;
    /// used to stop extending the path across call boundaries.
    exited_method: bool,
}

impl Abstraction {
    /// Fact for `value` tainted at `source`, shaped by the configured
    /// tracking mode.
    pub fn new(value: ValueRef, source: StmtId, tracking: PathTrackingMethod) -> Self {
        Self {
            value,
            source: Some(source),
            zero: false,
            path: match tracking {
                PathTrackingMethod::NoTracking => None,
                PathTrackingMethod::ForwardTracking => Some(Vec::new()),
            },
            exited_method: false,
        }
    }

    /// The distinguished "nothing is tainted yet" fact, wrapping the
    /// synthetic null placeholder with no source context. Normally
    /// obtained through the problem shell, which caches one per analysis
    /// instance.
    pub fn zero(tracking: PathTrackingMethod) -> Self {
        Self {
            value: ValueRef::NullPlaceholder,
            source: None,
            zero: true,
            path: match tracking {
                PathTrackingMethod::NoTracking => None,
                PathTrackingMethod::ForwardTracking => Some(Vec::new()),
            },
            exited_method: false,
        }
    }

    pub fn value(&self) -> &ValueRef {
        &self.value
    }

    pub fn source(&self) -> Option<StmtId> {
        self.source
    }

    pub fn is_zero(&self) -> bool {
        self.zero
    }

    /// Recorded path, oldest first. `None` under `NoTracking`.
    pub fn path(&self) -> Option<&[StmtId]> {
        self.path.as_deref()
    }

    pub fn has_exited_method(&self) -> bool {
        self.exited_method
    }

    /// New fact with `stmt` appended to the recorded path. Identity is
    /// unchanged; a plain clone under `NoTracking`.
    pub fn with_statement_appended(&self, stmt: StmtId) -> Self {
        let mut next = self.clone();
        if let Some(path) = next.path.as_mut() {
            path.push(stmt);
        }
        next
    }

    /// New fact flagged as having left its introducing method.
    pub fn with_method_exited(&self) -> Self {
        let mut next = self.clone();
        next.exited_method = true;
        next
    }

    /// New fact for a different tainted value sharing this fact's source
    /// context and path; used when taint transfers to another value (e.g.
    /// a summarized library call tainting its result).
    pub fn with_value(&self, value: ValueRef) -> Self {
        let mut next = self.clone();
        next.value = value;
        next.zero = false;
        next
    }
}

impl PartialEq for Abstraction {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.source == other.source
    }
}

impl Eq for Abstraction {}

impl Hash for Abstraction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
        self.source.hash(state);
    }
}

impl fmt::Display for Abstraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.zero {
            write!(f, "<<zero>>")
        } else {
            match self.source {
                Some(source) => write!(f, "{} @ {}", self.value, source),
                None => write!(f, "{}", self.value),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;
    use rustc_hash::FxHasher;

    fn hash_of(a: &Abstraction) -> u64 {
        let mut h = FxHasher::default();
        a.hash(&mut h);
        h.finish()
    }

    #[test]
    fn path_history_excluded_from_identity() {
        let a = Abstraction::new(
            ValueRef::local("x", "int"),
            StmtId(4),
            PathTrackingMethod::ForwardTracking,
        );
        let b = a
            .with_statement_appended(StmtId(5))
            .with_statement_appended(StmtId(6));

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(b.path(), Some([StmtId(5), StmtId(6)].as_slice()));
        assert_eq!(a.path(), Some([].as_slice()));
    }

    #[test]
    fn facts_with_same_identity_collapse_in_sets() {
        let a = Abstraction::new(
            ValueRef::local("x", "int"),
            StmtId(4),
            PathTrackingMethod::ForwardTracking,
        );
        let b = a.with_statement_appended(StmtId(5));

        let mut set = FxHashSet::default();
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn different_source_context_is_a_different_fact() {
        let a = Abstraction::new(
            ValueRef::local("x", "int"),
            StmtId(4),
            PathTrackingMethod::NoTracking,
        );
        let b = Abstraction::new(
            ValueRef::local("x", "int"),
            StmtId(9),
            PathTrackingMethod::NoTracking,
        );
        assert_ne!(a, b);
    }

    #[test]
    fn exited_method_flag_outside_identity() {
        let a = Abstraction::new(
            ValueRef::local("x", "int"),
            StmtId(4),
            PathTrackingMethod::NoTracking,
        );
        let b = a.with_method_exited();

        assert!(b.has_exited_method());
        assert!(!a.has_exited_method());
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn no_tracking_records_no_path() {
        let a = Abstraction::new(
            ValueRef::local("x", "int"),
            StmtId(4),
            PathTrackingMethod::NoTracking,
        );
        assert_eq!(a.path(), None);
        assert_eq!(a.with_statement_appended(StmtId(5)).path(), None);
    }

    #[test]
    fn zero_never_equals_a_real_fact() {
        let zero = Abstraction::zero(PathTrackingMethod::NoTracking);
        assert!(zero.is_zero());
        assert!(zero.value().is_placeholder());
        assert_eq!(zero.source(), None);

        let real = Abstraction::new(
            ValueRef::local("zero", "null"),
            StmtId(0),
            PathTrackingMethod::NoTracking,
        );
        assert_ne!(zero, real);
    }

    #[test]
    fn zero_shape_matches_across_tracking_modes() {
        let plain = Abstraction::zero(PathTrackingMethod::NoTracking);
        let tracked = Abstraction::zero(PathTrackingMethod::ForwardTracking);

        // Structurally the same fact; only the path capability differs.
        assert_eq!(plain, tracked);
        assert_eq!(hash_of(&plain), hash_of(&tracked));
        assert_eq!(plain.path(), None);
        assert_eq!(tracked.path(), Some([].as_slice()));
    }

    #[test]
    fn with_value_keeps_source_and_path() {
        let a = Abstraction::new(
            ValueRef::local("arg", "java.lang.String"),
            StmtId(4),
            PathTrackingMethod::ForwardTracking,
        )
        .with_statement_appended(StmtId(5));

        let b = a.with_value(ValueRef::local("ret", "java.lang.String"));
        assert_eq!(b.source(), Some(StmtId(4)));
        assert_eq!(b.path(), Some([StmtId(5)].as_slice()));
        assert_ne!(a, b);
    }
}
