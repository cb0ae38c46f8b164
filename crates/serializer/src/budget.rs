/// Bounds for a single tree walk: deepest level, children visited per node,
/// and a node allowance that is consumed as the walk proceeds.
///
/// One budget may be threaded through several walks (e.g. all frames of a
/// request) so the node allowance is shared between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalBudget {
    max_depth: usize,
    max_fanout: usize,
    remaining_nodes: usize,
}

impl TraversalBudget {
    #[must_use]
    pub const fn new(max_depth: usize, max_fanout: usize, max_nodes: usize) -> Self {
        Self {
            max_depth,
            max_fanout,
            remaining_nodes: max_nodes,
        }
    }

    /// Depth and fan-out bounds only.
    #[must_use]
    pub const fn without_node_limit(max_depth: usize, max_fanout: usize) -> Self {
        Self::new(max_depth, max_fanout, usize::MAX)
    }

    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[must_use]
    pub const fn max_fanout(&self) -> usize {
        self.max_fanout
    }

    #[must_use]
    pub const fn remaining_nodes(&self) -> usize {
        self.remaining_nodes
    }

    #[must_use]
    pub const fn admits_depth(&self, depth: usize) -> bool {
        depth <= self.max_depth
    }

    /// How many of `child_count` children a node may visit.
    #[must_use]
    pub fn fanout(&self, child_count: usize) -> usize {
        child_count.min(self.max_fanout)
    }

    /// Consume one node from the allowance. `false` once exhausted.
    pub fn try_take_node(&mut self) -> bool {
        if self.remaining_nodes == 0 {
            return false;
        }
        self.remaining_nodes -= 1;
        true
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining_nodes == 0
    }
}
