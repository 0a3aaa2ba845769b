/*
 * Control-dependency oracle
 *
 * Answers, for any statement, "where do all control-flow paths from here
 * reconverge?". Implicit-flow handling asks this for every branch on a
 * tainted condition, often for many branches inside the same method body,
 * so both layers of the computation are memoized for the lifetime of the
 * analysis: the per-statement record, and the per-method post-dominator
 * tree underneath it. The program under analysis is immutable for the
 * duration of a run; neither cache is ever invalidated.
 */

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rayon::prelude::*;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

use super::postdom::PostDominatorTree;
use crate::features::taint_analysis::ports::InterproceduralCfg;
use crate::shared::models::{MethodId, Result, StmtId};

/// Reconvergence point of a statement: either the nearest statement at
/// which all paths from it meet again, or — when no such statement exists
/// before method exit — the enclosing method as a whole, meaning the
/// control-dependent region extends to the method's end.
///
/// At most one of the two fields is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconvergencePoint {
    stmt: Option<StmtId>,
    method: Option<MethodId>,
}

impl ReconvergencePoint {
    pub fn at_statement(stmt: StmtId) -> Self {
        Self {
            stmt: Some(stmt),
            method: None,
        }
    }

    pub fn at_method_exit(method: MethodId) -> Self {
        Self {
            stmt: None,
            method: Some(method),
        }
    }

    pub fn stmt(&self) -> Option<StmtId> {
        self.stmt
    }

    pub fn method(&self) -> Option<MethodId> {
        self.method
    }

    /// True when the record degraded to the enclosing method.
    pub fn extends_to_method_exit(&self) -> bool {
        self.method.is_some()
    }
}

impl Hash for ReconvergencePoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Both possible fields contribute, an absent one as zero.
        let stmt_hash = self.stmt.map_or(0, |s| {
            let mut h = FxHasher::default();
            s.hash(&mut h);
            h.finish()
        });
        let method_hash = self.method.map_or(0, |m| {
            let mut h = FxHasher::default();
            m.hash(&mut h);
            h.finish()
        });
        state.write_u64(
            stmt_hash
                .wrapping_mul(31)
                .wrapping_add(method_hash.wrapping_mul(31)),
        );
    }
}

#[derive(Debug, Default)]
struct OracleCounters {
    queries: AtomicUsize,
    hits: AtomicUsize,
    trees_built: AtomicUsize,
}

/// Point-in-time snapshot of the oracle's cache behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleStats {
    pub queries: usize,
    pub cache_hits: usize,
    pub trees_built: usize,
    pub cached_records: usize,
    pub cached_trees: usize,
}

/// Memoizing wrapper around the interprocedural CFG.
///
/// Thread-safe: concurrent queries for the same statement observe a single
/// computed record — the loader runs at most once per key, because the
/// vacant map entry holds its shard lock for the duration of the load.
/// Loader failures (a statement or method the program representation
/// cannot resolve) propagate to the caller and are not cached; the
/// underlying structure is deterministic, so there is nothing to retry.
pub struct ControlDependencyOracle {
    icfg: Arc<dyn InterproceduralCfg>,
    records: DashMap<StmtId, ReconvergencePoint>,
    trees: DashMap<MethodId, Arc<PostDominatorTree>>,
    counters: OracleCounters,
}

impl ControlDependencyOracle {
    pub fn new(icfg: Arc<dyn InterproceduralCfg>) -> Self {
        Self {
            icfg,
            records: DashMap::new(),
            trees: DashMap::new(),
            counters: OracleCounters::default(),
        }
    }

    /// Reconvergence point of `stmt`. O(1) after the first query for this
    /// statement; the first query for any statement of a method pays the
    /// one-off post-dominator computation for that method body.
    pub fn reconvergence_point_of(&self, stmt: StmtId) -> Result<ReconvergencePoint> {
        self.counters.queries.fetch_add(1, Ordering::Relaxed);
        match self.records.entry(stmt) {
            Entry::Occupied(cached) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                Ok(cached.get().clone())
            }
            Entry::Vacant(slot) => {
                let record = self.load(stmt)?;
                Ok(slot.insert(record).clone())
            }
        }
    }

    fn load(&self, stmt: StmtId) -> Result<ReconvergencePoint> {
        let method = self.icfg.method_of(stmt)?;
        let tree = self.tree_of(method)?;
        let record = match tree.immediate_post_dominator(stmt) {
            Some(join) => ReconvergencePoint::at_statement(join),
            None => ReconvergencePoint::at_method_exit(method),
        };
        debug!(%stmt, %method, to_method_exit = record.extends_to_method_exit(), "resolved reconvergence point");
        Ok(record)
    }

    fn tree_of(&self, method: MethodId) -> Result<Arc<PostDominatorTree>> {
        match self.trees.entry(method) {
            Entry::Occupied(cached) => Ok(Arc::clone(cached.get())),
            Entry::Vacant(slot) => {
                let cfg = self.icfg.cfg_of(method)?;
                let tree = Arc::new(PostDominatorTree::compute(&cfg));
                self.counters.trees_built.fetch_add(1, Ordering::Relaxed);
                Ok(Arc::clone(&slot.insert(tree)))
            }
        }
    }

    /// Warm the cache for a batch of statements in parallel, e.g. every
    /// branch statement of the methods about to be propagated. Statements
    /// the representation cannot resolve are skipped; returns how many
    /// records are now cached from this batch.
    pub fn precompute(&self, stmts: &[StmtId]) -> usize {
        stmts
            .par_iter()
            .filter(|stmt| self.reconvergence_point_of(**stmt).is_ok())
            .count()
    }

    pub fn stats(&self) -> OracleStats {
        OracleStats {
            queries: self.counters.queries.load(Ordering::Relaxed),
            cache_hits: self.counters.hits.load(Ordering::Relaxed),
            trees_built: self.counters.trees_built.load(Ordering::Relaxed),
            cached_records: self.records.len(),
            cached_trees: self.trees.len(),
        }
    }
}
