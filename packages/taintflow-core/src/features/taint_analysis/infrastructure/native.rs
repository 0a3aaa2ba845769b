/*
 * Default native-call handling
 *
 * Conservative summary for calls whose bodies the program representation
 * cannot look into: if any incoming tainted value is used by the call, the
 * value the call defines becomes tainted as well. Synthesized facts follow
 * the analysis-wide path-tracking mode, so summaries stay consistent with
 * facts produced by regular propagation.
 */

use rustc_hash::FxHashSet;

use crate::features::taint_analysis::domain::{Abstraction, PathTrackingMethod};
use crate::features::taint_analysis::ports::{InterproceduralCfg, NativeCallHandler};
use crate::shared::models::StmtId;

/// Taints the call's defined value whenever a tainted value flows in.
#[derive(Debug, Default)]
pub struct DefaultNativeCallHandler {
    path_tracking: PathTrackingMethod,
}

impl DefaultNativeCallHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path_tracking(&self) -> PathTrackingMethod {
        self.path_tracking
    }
}

impl NativeCallHandler for DefaultNativeCallHandler {
    fn set_path_tracking(&mut self, mode: PathTrackingMethod) {
        self.path_tracking = mode;
    }

    fn handle_call(
        &self,
        icfg: &dyn InterproceduralCfg,
        call_site: StmtId,
        incoming: &Abstraction,
    ) -> FxHashSet<Abstraction> {
        let mut out = FxHashSet::default();
        if incoming.is_zero() {
            return out;
        }
        let reaches_call = icfg
            .use_values_of(call_site)
            .iter()
            .any(|used| used == incoming.value());
        if !reaches_call {
            return out;
        }
        if let Some(defined) = icfg.def_value_of(call_site) {
            let fact = incoming.with_value(defined);
            out.insert(match self.path_tracking {
                PathTrackingMethod::ForwardTracking => fact.with_statement_appended(call_site),
                PathTrackingMethod::NoTracking => fact,
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::taint_analysis::infrastructure::InMemoryIcfg;
    use crate::shared::models::{MethodId, ProgramMethod, ValueRef};

    fn call_program() -> InMemoryIcfg {
        // 0: ret = lib(arg)
        let mut icfg = InMemoryIcfg::new();
        icfg.add_method(
            ProgramMethod::new(MethodId(0), "caller", "com.example.A", "void", vec![]),
            StmtId(0),
        );
        icfg.add_exit(StmtId(0));
        icfg.set_def(StmtId(0), ValueRef::local("ret", "java.lang.String"));
        icfg.add_use(StmtId(0), ValueRef::local("arg", "java.lang.String"));
        icfg
    }

    #[test]
    fn taints_defined_value_when_tainted_argument_flows_in() {
        let icfg = call_program();
        let handler = DefaultNativeCallHandler::new();

        let incoming = Abstraction::new(
            ValueRef::local("arg", "java.lang.String"),
            StmtId(7),
            PathTrackingMethod::NoTracking,
        );
        let out = handler.handle_call(&icfg, StmtId(0), &incoming);

        assert_eq!(out.len(), 1);
        let fact = out.iter().next().unwrap();
        assert_eq!(fact.value(), &ValueRef::local("ret", "java.lang.String"));
        assert_eq!(fact.source(), Some(StmtId(7)));
    }

    #[test]
    fn unrelated_fact_produces_nothing() {
        let icfg = call_program();
        let handler = DefaultNativeCallHandler::new();

        let incoming = Abstraction::new(
            ValueRef::local("other", "int"),
            StmtId(7),
            PathTrackingMethod::NoTracking,
        );
        assert!(handler.handle_call(&icfg, StmtId(0), &incoming).is_empty());
    }

    #[test]
    fn zero_fact_produces_nothing() {
        let icfg = call_program();
        let handler = DefaultNativeCallHandler::new();

        let zero = Abstraction::zero(PathTrackingMethod::NoTracking);
        assert!(handler.handle_call(&icfg, StmtId(0), &zero).is_empty());
    }

    #[test]
    fn forward_tracking_appends_the_call_site() {
        let icfg = call_program();
        let mut handler = DefaultNativeCallHandler::new();
        handler.set_path_tracking(PathTrackingMethod::ForwardTracking);

        let incoming = Abstraction::new(
            ValueRef::local("arg", "java.lang.String"),
            StmtId(7),
            PathTrackingMethod::ForwardTracking,
        );
        let out = handler.handle_call(&icfg, StmtId(0), &incoming);
        let fact = out.iter().next().unwrap();
        assert_eq!(fact.path(), Some([StmtId(0)].as_slice()));
    }
}
