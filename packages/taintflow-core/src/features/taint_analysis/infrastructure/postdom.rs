/*
 * Immediate post-dominators
 *
 * A statement S post-dominates a statement B when every path from B to
 * method exit passes through S. The immediate post-dominator of a branch
 * is the nearest such statement: the point where the branch's arms
 * reconverge, which bounds the region considered control-dependent on the
 * branch condition.
 *
 * Algorithm: dominance on the reversed control-flow graph, using the
 * iterative scheme of Cooper, Harvey, Kennedy, "A Simple, Fast Dominance
 * Algorithm" (2001). Methods may have several exit statements (returns and
 * throws), so a virtual unified exit node is synthesized behind all real
 * exits and used as the root of the reversed graph. A statement whose
 * immediate post-dominator is the virtual exit has no reconvergence
 * statement inside the method; the caller degrades such queries to "the
 * enclosing method as a whole".
 */

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::shared::models::{MethodCfg, MethodId, StmtId};

const UNDEF: usize = usize::MAX;

/// Immediate post-dominator tree of one method body.
#[derive(Debug)]
pub struct PostDominatorTree {
    method: MethodId,
    stmts: Vec<StmtId>,
    index_of: FxHashMap<StmtId, usize>,
    /// Immediate post-dominator per dense index; `UNDEF` when no exit is
    /// reachable from the statement.
    ipdom: Vec<usize>,
    virtual_exit: usize,
}

impl PostDominatorTree {
    /// Compute the tree for one method body. O(graph) in practice; callers
    /// are expected to cache the result per method.
    pub fn compute(cfg: &MethodCfg) -> Self {
        let n = cfg.stmts().len();
        let virtual_exit = n;

        let mut index_of = FxHashMap::default();
        for (i, &stmt) in cfg.stmts().iter().enumerate() {
            index_of.insert(stmt, i);
        }

        // Children in the reversed graph: CFG predecessors, and the real
        // exits for the virtual root.
        let mut rev_children: Vec<Vec<usize>> = Vec::with_capacity(n + 1);
        for &stmt in cfg.stmts() {
            rev_children.push(
                cfg.predecessors_of(stmt)
                    .iter()
                    .map(|p| index_of[p])
                    .collect(),
            );
        }
        rev_children.push(cfg.exits().iter().map(|e| index_of[e]).collect());

        // Predecessors in the reversed graph: CFG successors, plus the
        // virtual root for every real exit.
        let mut rev_preds: Vec<Vec<usize>> = Vec::with_capacity(n + 1);
        for &stmt in cfg.stmts() {
            rev_preds.push(
                cfg.successors_of(stmt)
                    .iter()
                    .map(|s| index_of[s])
                    .collect(),
            );
        }
        rev_preds.push(Vec::new());
        for exit in cfg.exits() {
            rev_preds[index_of[exit]].push(virtual_exit);
        }

        // Iterative DFS post-order over the reversed graph. Statements
        // from which no exit is reachable are never numbered and keep an
        // undefined post-dominator.
        let mut postorder = vec![UNDEF; n + 1];
        let mut order: Vec<usize> = Vec::with_capacity(n + 1);
        let mut visited = vec![false; n + 1];
        let mut stack: Vec<(usize, usize)> = vec![(virtual_exit, 0)];
        visited[virtual_exit] = true;
        while let Some(frame) = stack.last_mut() {
            let (node, child) = *frame;
            if child < rev_children[node].len() {
                frame.1 += 1;
                let next = rev_children[node][child];
                if !visited[next] {
                    visited[next] = true;
                    stack.push((next, 0));
                }
            } else {
                stack.pop();
                postorder[node] = order.len();
                order.push(node);
            }
        }

        let mut ipdom = vec![UNDEF; n + 1];
        ipdom[virtual_exit] = virtual_exit;

        // Fixpoint over reverse post-order, skipping the root.
        let mut changed = true;
        while changed {
            changed = false;
            for &b in order.iter().rev().skip(1) {
                let mut new_idom = UNDEF;
                for &p in &rev_preds[b] {
                    if ipdom[p] == UNDEF {
                        continue;
                    }
                    new_idom = if new_idom == UNDEF {
                        p
                    } else {
                        Self::intersect(&ipdom, &postorder, p, new_idom)
                    };
                }
                if new_idom != UNDEF && ipdom[b] != new_idom {
                    ipdom[b] = new_idom;
                    changed = true;
                }
            }
        }

        debug!(
            method = %cfg.method(),
            statements = n,
            exits = cfg.exits().len(),
            "computed post-dominator tree"
        );

        Self {
            method: cfg.method(),
            stmts: cfg.stmts().to_vec(),
            index_of,
            ipdom,
            virtual_exit,
        }
    }

    fn intersect(ipdom: &[usize], postorder: &[usize], mut a: usize, mut b: usize) -> usize {
        while a != b {
            while postorder[a] < postorder[b] {
                a = ipdom[a];
            }
            while postorder[b] < postorder[a] {
                b = ipdom[b];
            }
        }
        a
    }

    pub fn method(&self) -> MethodId {
        self.method
    }

    /// Immediate post-dominator of `stmt`, or `None` when the paths from
    /// `stmt` only reconverge at method exit (the virtual exit is its
    /// nearest post-dominator), no exit is reachable from it, or the
    /// statement is not part of this method.
    pub fn immediate_post_dominator(&self, stmt: StmtId) -> Option<StmtId> {
        let &idx = self.index_of.get(&stmt)?;
        match self.ipdom[idx] {
            d if d == UNDEF || d == self.virtual_exit => None,
            d => Some(self.stmts[d]),
        }
    }

    /// Whether every path from `b` to method exit passes through `a`.
    pub fn post_dominates(&self, a: StmtId, b: StmtId) -> bool {
        if a == b {
            return true;
        }
        let (Some(&ai), Some(&bi)) = (self.index_of.get(&a), self.index_of.get(&b)) else {
            return false;
        };
        let mut cur = bi;
        loop {
            let d = self.ipdom[cur];
            if d == UNDEF || d == self.virtual_exit {
                return false;
            }
            if d == ai {
                return true;
            }
            cur = d;
        }
    }
}
