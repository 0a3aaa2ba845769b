//! End-to-end scenarios over the in-memory program model: signature
//! matching and reconvergence queries the way the policy layer issues
//! them during propagation.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use taintflow_core::{
    ControlDependencyOracle, ElementSignature, InMemoryIcfg, InterproceduralCfg, MethodId,
    ProgramMethod, StmtId, TaintflowError,
};

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn signatures_differing_only_in_return_type_match() {
    let spec = ElementSignature::new(
        "foo",
        "com.example.A",
        "int",
        vec!["java.lang.String".to_string()],
    );
    let concrete = ElementSignature::new(
        "foo",
        "com.example.A",
        "void",
        vec!["java.lang.String".to_string()],
    );

    assert_eq!(spec, concrete);
    assert_eq!(hash_of(&spec), hash_of(&concrete));
}

#[test]
fn signature_derived_from_program_method_matches_specification() {
    let spec = ElementSignature::new(
        "getDeviceId",
        "android.telephony.TelephonyManager",
        "java.lang.String",
        vec![],
    );

    let concrete = ProgramMethod::new(
        MethodId(5),
        "getDeviceId",
        "android.telephony.TelephonyManager",
        // Annotated return type in the concrete program.
        "java.lang.String{tainted}",
        vec![],
    );

    assert_eq!(spec, ElementSignature::from_method(&concrete));
}

/// `if (tainted) { x = 1; } else { x = 2; } return x;`
///
/// The branch statement's reconvergence point is the `return x` statement.
#[test]
fn branch_reconverges_at_the_return_statement() {
    let mut icfg = InMemoryIcfg::new();
    icfg.add_method(
        ProgramMethod::new(MethodId(0), "choose", "com.example.A", "int", vec![]),
        StmtId(0),
    );
    let branch = StmtId(1);
    let then_arm = StmtId(2);
    let else_arm = StmtId(3);
    let ret = StmtId(4);
    icfg.add_edge(StmtId(0), branch);
    icfg.add_edge(branch, then_arm);
    icfg.add_edge(branch, else_arm);
    icfg.add_edge(then_arm, ret);
    icfg.add_edge(else_arm, ret);
    icfg.add_exit(ret);

    let oracle = ControlDependencyOracle::new(Arc::new(icfg));
    let record = oracle.reconvergence_point_of(branch).unwrap();

    assert_eq!(record.stmt(), Some(ret));
    assert!(!record.extends_to_method_exit());
}

/// `if (tainted) { return 1; } return 2;`
///
/// One arm exits before the other's return; only the unified method exit
/// joins them, so the record degrades to the enclosing method.
#[test]
fn early_return_degrades_to_enclosing_method() {
    let mut icfg = InMemoryIcfg::new();
    let method = icfg.add_method(
        ProgramMethod::new(MethodId(0), "gate", "com.example.A", "int", vec![]),
        StmtId(0),
    );
    let branch = StmtId(1);
    icfg.add_edge(StmtId(0), branch);
    icfg.add_edge(branch, StmtId(2));
    icfg.add_edge(branch, StmtId(3));
    icfg.add_exit(StmtId(2));
    icfg.add_exit(StmtId(3));

    let oracle = ControlDependencyOracle::new(Arc::new(icfg));
    let record = oracle.reconvergence_point_of(branch).unwrap();

    assert_eq!(record.stmt(), None);
    assert_eq!(record.method(), Some(method));
    assert!(record.extends_to_method_exit());
}

#[test]
fn second_query_reuses_the_dominator_tree() {
    let mut icfg = InMemoryIcfg::new();
    icfg.add_method(
        ProgramMethod::new(MethodId(0), "f", "com.example.A", "void", vec![]),
        StmtId(0),
    );
    icfg.add_edge(StmtId(0), StmtId(1));
    icfg.add_edge(StmtId(0), StmtId(2));
    icfg.add_edge(StmtId(1), StmtId(3));
    icfg.add_edge(StmtId(2), StmtId(3));
    icfg.add_exit(StmtId(3));
    let icfg = Arc::new(icfg);

    let oracle = ControlDependencyOracle::new(Arc::clone(&icfg) as Arc<dyn InterproceduralCfg>);

    let first = oracle.reconvergence_point_of(StmtId(0)).unwrap();
    let second = oracle.reconvergence_point_of(StmtId(0)).unwrap();

    assert_eq!(first, second);
    assert_eq!(hash_of(&first), hash_of(&second));
    assert_eq!(icfg.cfg_requests(), 1, "dominator tree must not be recomputed");
}

#[test]
fn methods_are_analyzed_independently() {
    let mut icfg = InMemoryIcfg::new();
    icfg.add_method(
        ProgramMethod::new(MethodId(0), "f", "com.example.A", "void", vec![]),
        StmtId(0),
    );
    icfg.add_edge(StmtId(0), StmtId(1));
    icfg.add_exit(StmtId(1));

    icfg.add_method(
        ProgramMethod::new(MethodId(1), "g", "com.example.B", "void", vec![]),
        StmtId(10),
    );
    icfg.add_edge(StmtId(10), StmtId(11));
    icfg.add_edge(StmtId(10), StmtId(12));
    icfg.add_edge(StmtId(11), StmtId(13));
    icfg.add_edge(StmtId(12), StmtId(13));
    icfg.add_exit(StmtId(13));
    let icfg = Arc::new(icfg);

    let oracle = ControlDependencyOracle::new(Arc::clone(&icfg) as Arc<dyn InterproceduralCfg>);

    assert_eq!(
        oracle.reconvergence_point_of(StmtId(0)).unwrap().stmt(),
        Some(StmtId(1))
    );
    assert_eq!(
        oracle.reconvergence_point_of(StmtId(10)).unwrap().stmt(),
        Some(StmtId(13))
    );
    assert_eq!(icfg.cfg_requests(), 2);
    assert_eq!(oracle.stats().trees_built, 2);
}

#[test]
fn inconsistent_representation_surfaces_as_error() {
    let icfg = InMemoryIcfg::new();
    let oracle = ControlDependencyOracle::new(Arc::new(icfg));

    assert_eq!(
        oracle.reconvergence_point_of(StmtId(0)).unwrap_err(),
        TaintflowError::UnknownStatement(StmtId(0))
    );
}
