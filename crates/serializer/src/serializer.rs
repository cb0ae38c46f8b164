use critique_protocol::SerializedNode;

use crate::budget::TraversalBudget;
use crate::config::SerializerConfig;
use crate::node::{DesignNode, NodeKind};

/// Bounded, deterministic projection of design trees
#[derive(Debug, Clone)]
pub struct TreeSerializer {
    config: SerializerConfig,
}

/// A node whose children are still being visited.
struct Pending<'a> {
    source: &'a DesignNode,
    depth: usize,
    next_child: usize,
    child_limit: usize,
    out: SerializedNode,
}

impl<'a> Pending<'a> {
    fn next_child(&mut self) -> Option<&'a DesignNode> {
        if self.next_child >= self.child_limit {
            return None;
        }
        let child = self.source.children()?.get(self.next_child)?;
        self.next_child += 1;
        Some(child)
    }
}

impl TreeSerializer {
    pub fn new(config: SerializerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// Fresh budget sized from the configuration.
    #[must_use]
    pub fn budget(&self) -> TraversalBudget {
        TraversalBudget::new(
            self.config.max_depth,
            self.config.max_children,
            self.config.max_nodes,
        )
    }

    /// Serialize one subtree rooted at depth 0 with its own budget.
    #[must_use]
    pub fn serialize(&self, node: &DesignNode) -> Option<SerializedNode> {
        self.serialize_at(node, 0)
    }

    /// Serialize `node` as if it sat at `depth`. `None` when `depth` is past
    /// the cap.
    #[must_use]
    pub fn serialize_at(&self, node: &DesignNode, depth: usize) -> Option<SerializedNode> {
        let mut budget = self.budget();
        self.serialize_with(node, depth, &mut budget)
    }

    /// Serialize the first `max_frames` frames, sharing one node budget.
    #[must_use]
    pub fn serialize_frames(&self, frames: &[DesignNode]) -> Vec<SerializedNode> {
        let mut budget = self.budget();
        let payload: Vec<SerializedNode> = frames
            .iter()
            .take(self.config.max_frames)
            .filter_map(|frame| self.serialize_with(frame, 0, &mut budget))
            .collect();
        if frames.len() > self.config.max_frames {
            log::debug!(
                "serialized {} of {} selected frames (frame cap)",
                payload.len(),
                frames.len()
            );
        }
        payload
    }

    /// Worklist walk. Invisible or over-depth children are skipped outright;
    /// once the node allowance runs out the remaining subtrees are truncated.
    pub fn serialize_with(
        &self,
        root: &DesignNode,
        depth: usize,
        budget: &mut TraversalBudget,
    ) -> Option<SerializedNode> {
        if !budget.admits_depth(depth) || !budget.try_take_node() {
            return None;
        }

        let mut truncated = false;
        let mut stack = vec![self.enter(root, depth, budget)];
        while let Some(top) = stack.last_mut() {
            if let Some(child) = top.next_child() {
                let child_depth = top.depth + 1;
                if !child.visible || !budget.admits_depth(child_depth) {
                    continue;
                }
                if !budget.try_take_node() {
                    truncated = true;
                    continue;
                }
                let pending = self.enter(child, child_depth, budget);
                stack.push(pending);
                continue;
            }

            let finished = stack.pop()?;
            match stack.last_mut() {
                Some(parent) => parent.out.children.push(finished.out),
                None => {
                    if truncated {
                        log::debug!(
                            "node budget exhausted while serializing '{}'; payload truncated",
                            root.name
                        );
                    }
                    return Some(finished.out);
                }
            }
        }
        None
    }

    fn enter<'a>(
        &self,
        node: &'a DesignNode,
        depth: usize,
        budget: &TraversalBudget,
    ) -> Pending<'a> {
        let mut out = SerializedNode {
            id: node.id.clone(),
            name: node.name.clone(),
            node_type: node.node_type,
            visible: node.visible,
            width: rounded(node.width),
            height: rounded(node.height),
            text: None,
            font_size: None,
            layout: None,
            fills: None,
            strokes: None,
            children: Vec::new(),
        };

        if let NodeKind::Text {
            characters,
            font_size,
        } = &node.kind
        {
            if !characters.is_empty() {
                out.text = Some(characters.clone());
                let size = font_size.unwrap_or(self.config.default_font_size);
                if size != self.config.default_font_size {
                    out.font_size = Some(size.round() as i64);
                }
            }
        }
        out.layout = node.layout;

        if self.config.include_styles {
            out.fills = node.style.fills.clone();
            out.strokes = node.style.strokes.clone();
        }

        let child_limit = if budget.admits_depth(depth + 1) {
            node.children().map_or(0, |children| budget.fanout(children.len()))
        } else {
            0
        };

        Pending {
            source: node,
            depth,
            next_child: 0,
            child_limit,
            out,
        }
    }
}

fn rounded(value: Option<f64>) -> i64 {
    value.map_or(0, |v| v.round() as i64)
}
