use std::sync::{Arc, Mutex, PoisonError};

use critique_protocol::FrameSummary;
use critique_serializer::DesignNode;

/// Host selection plus the subset eligible for analysis. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    raw: Vec<DesignNode>,
    frames: Vec<DesignNode>,
}

impl SelectionState {
    pub fn from_raw(raw: Vec<DesignNode>) -> Self {
        let frames = raw
            .iter()
            .filter(|node| node.node_type.is_analyzable())
            .cloned()
            .collect();
        Self { raw, frames }
    }

    pub fn raw(&self) -> &[DesignNode] {
        &self.raw
    }

    /// Container-like nodes only
    pub fn frames(&self) -> &[DesignNode] {
        &self.frames
    }

    pub fn frame_ids(&self) -> Vec<String> {
        self.frames.iter().map(|frame| frame.id.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn summaries(&self) -> Vec<FrameSummary> {
        self.frames
            .iter()
            .map(|frame| FrameSummary {
                id: frame.id.clone(),
                name: frame.name.clone(),
                width: frame.width.unwrap_or(0.0),
                height: frame.height.unwrap_or(0.0),
                node_type: frame.node_type,
            })
            .collect()
    }
}

/// Shared handle to the current [`SelectionState`].
///
/// Readers take an `Arc` snapshot; a selection change swaps in a new state
/// without touching snapshots already handed out.
#[derive(Debug, Clone, Default)]
pub struct SelectionHandle {
    current: Arc<Mutex<Arc<SelectionState>>>,
}

impl SelectionHandle {
    pub fn new(state: SelectionState) -> Self {
        Self {
            current: Arc::new(Mutex::new(Arc::new(state))),
        }
    }

    pub fn replace(&self, state: SelectionState) -> Arc<SelectionState> {
        let state = Arc::new(state);
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *current = Arc::clone(&state);
        state
    }

    pub fn snapshot(&self) -> Arc<SelectionState> {
        Arc::clone(
            &self
                .current
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use critique_protocol::NodeType;
    use pretty_assertions::assert_eq;

    fn mixed_selection() -> Vec<DesignNode> {
        vec![
            DesignNode::container("1", "Home", NodeType::Frame).with_size(375.0, 812.0),
            DesignNode::text("2", "Loose text", "hi"),
            DesignNode::container("3", "Card", NodeType::Instance),
            DesignNode::leaf("4", "Shape", NodeType::Rectangle),
            DesignNode::container("5", "Area", NodeType::Section),
        ]
    }

    #[test]
    fn only_container_like_nodes_are_eligible() {
        let state = SelectionState::from_raw(mixed_selection());
        assert_eq!(state.raw().len(), 5);
        assert_eq!(state.frame_ids(), vec!["1", "3", "5"]);
        let summary = &state.summaries()[0];
        assert_eq!((summary.width, summary.height), (375.0, 812.0));
    }

    #[test]
    fn snapshots_survive_replacement() {
        let handle = SelectionHandle::new(SelectionState::from_raw(mixed_selection()));
        let before = handle.snapshot();
        handle.replace(SelectionState::default());
        assert_eq!(before.frames().len(), 3);
        assert!(handle.snapshot().is_empty());
    }
}
