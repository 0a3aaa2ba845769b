/*
 * Analysis problem shell
 *
 * Owns everything the generic tabulation solver needs to drive taint
 * propagation: the lazily created zero fact, the explicit seed set, the
 * pluggable policy hooks (taint wrapper, native-call handler, flow
 * functions) and the results collection. The solver consumes it through
 * the `TabulationProblem` port; the control-dependency oracle rides along
 * so the policy layer can bound implicit flows from the same place.
 *
 * Configuration is mutable only until propagation starts: the external
 * driver calls `begin_propagation()` right before handing the problem to
 * the solver, after which every setter is a programming error.
 */

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::features::taint_analysis::domain::{
    Abstraction, InfoflowResults, PathTrackingMethod, ResultRecord,
};
use crate::features::taint_analysis::infrastructure::{
    ControlDependencyOracle, DefaultNativeCallHandler,
};
use crate::features::taint_analysis::ports::{
    FlowFunctions, InterproceduralCfg, NativeCallHandler, TabulationProblem, TaintWrapper,
};
use crate::shared::models::StmtId;

/// Configuration and state shared by one taint-analysis run.
pub struct InfoflowProblem {
    icfg: Arc<dyn InterproceduralCfg>,
    oracle: Arc<ControlDependencyOracle>,
    initial_seeds: FxHashSet<StmtId>,
    results: Mutex<InfoflowResults>,
    taint_wrapper: Option<Arc<dyn TaintWrapper>>,
    nc_handler: Box<dyn NativeCallHandler>,
    flow_functions: Option<Box<dyn FlowFunctions>>,
    path_tracking: PathTrackingMethod,
    debug: bool,
    zero_value: OnceCell<Arc<Abstraction>>,
    sealed: AtomicBool,
}

impl InfoflowProblem {
    pub fn new(icfg: Arc<dyn InterproceduralCfg>) -> Self {
        let oracle = Arc::new(ControlDependencyOracle::new(Arc::clone(&icfg)));
        Self {
            icfg,
            oracle,
            initial_seeds: FxHashSet::default(),
            results: Mutex::new(InfoflowResults::new()),
            taint_wrapper: None,
            nc_handler: Box::new(DefaultNativeCallHandler::new()),
            flow_functions: None,
            path_tracking: PathTrackingMethod::default(),
            debug: false,
            zero_value: OnceCell::new(),
            sealed: AtomicBool::new(false),
        }
    }

    pub fn icfg(&self) -> &Arc<dyn InterproceduralCfg> {
        &self.icfg
    }

    pub fn oracle(&self) -> &Arc<ControlDependencyOracle> {
        &self.oracle
    }

    pub fn path_tracking(&self) -> PathTrackingMethod {
        self.path_tracking
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn taint_wrapper(&self) -> Option<&Arc<dyn TaintWrapper>> {
        self.taint_wrapper.as_ref()
    }

    pub fn native_call_handler(&self) -> &dyn NativeCallHandler {
        self.nc_handler.as_ref()
    }

    /// Install a taint wrapper for library-call modeling.
    pub fn set_taint_wrapper(&mut self, wrapper: Arc<dyn TaintWrapper>) {
        self.assert_mutable();
        self.taint_wrapper = Some(wrapper);
    }

    /// Select how propagation paths are recorded. The native-call handler
    /// synthesizes facts on its own, so the mode is pushed down to it as
    /// well.
    pub fn set_path_tracking(&mut self, mode: PathTrackingMethod) {
        self.assert_mutable();
        self.path_tracking = mode;
        self.nc_handler.set_path_tracking(mode);
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.assert_mutable();
        self.debug = debug;
    }

    /// Replace the native-call handler; the current tracking mode is
    /// applied to the replacement so its facts stay consistent.
    pub fn set_native_call_handler(&mut self, mut handler: Box<dyn NativeCallHandler>) {
        self.assert_mutable();
        handler.set_path_tracking(self.path_tracking);
        self.nc_handler = handler;
    }

    /// Register the flow-function strategy supplied by the policy layer.
    pub fn register_flow_functions(&mut self, flow_functions: Box<dyn FlowFunctions>) {
        self.assert_mutable();
        self.flow_functions = Some(flow_functions);
    }

    pub fn add_initial_seed(&mut self, stmt: StmtId) {
        self.assert_mutable();
        self.initial_seeds.insert(stmt);
    }

    /// Mutable access to the seed set for bulk population by the driver.
    pub fn initial_seeds_mut(&mut self) -> &mut FxHashSet<StmtId> {
        self.assert_mutable();
        &mut self.initial_seeds
    }

    /// Freeze the configuration. Called by the external driver immediately
    /// before the problem is handed to the solver; idempotent.
    pub fn begin_propagation(&self) {
        if !self.sealed.swap(true, Ordering::SeqCst) {
            debug!(
                seeds = self.initial_seeds.len(),
                path_tracking = ?self.path_tracking,
                "configuration sealed, propagation starting"
            );
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::SeqCst)
    }

    fn assert_mutable(&self) {
        assert!(
            !self.is_sealed(),
            "configuration is frozen once propagation has started"
        );
    }

    /// Record a confirmed source or sink occurrence.
    pub fn report(&self, record: ResultRecord) {
        self.results.lock().add(record);
    }

    /// Snapshot of everything reported so far.
    pub fn results(&self) -> InfoflowResults {
        self.results.lock().clone()
    }
}

impl TabulationProblem for InfoflowProblem {
    /// Lazily creates the zero fact on first request and shares the same
    /// instance for the rest of the analysis, whatever thread asks first.
    fn create_zero_value(&self) -> Arc<Abstraction> {
        Arc::clone(self.zero_value.get_or_init(|| {
            trace!(path_tracking = ?self.path_tracking, "creating zero value");
            Arc::new(Abstraction::zero(self.path_tracking))
        }))
    }

    fn initial_seeds(&self) -> Vec<StmtId> {
        self.initial_seeds.iter().copied().collect()
    }

    fn follow_returns_past_seeds(&self) -> bool {
        true
    }

    fn auto_add_zero(&self) -> bool {
        false
    }

    fn flow_functions(&self) -> Option<&dyn FlowFunctions> {
        self.flow_functions.as_deref()
    }
}
