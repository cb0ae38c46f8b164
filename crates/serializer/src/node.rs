use critique_protocol::{LayoutMode, NodeType};
use serde_json::Value;

/// Kind-specific fields of a design node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Holds an ordered list of children (possibly empty)
    Container { children: Vec<DesignNode> },
    /// Text layer; `characters` is empty when the host reported none
    Text {
        characters: String,
        font_size: Option<f64>,
    },
    /// No children concept at all
    Leaf,
}

/// Paint and stroke fields, carried through unmodified
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeStyle {
    pub fills: Option<Value>,
    pub strokes: Option<Value>,
    pub stroke_weight: Option<f64>,
    pub stroke_align: Option<String>,
    pub dash_pattern: Option<Vec<f64>>,
}

/// A node of the host's element tree, after boundary validation
#[derive(Debug, Clone, PartialEq)]
pub struct DesignNode {
    pub id: String,
    pub name: String,
    pub node_type: NodeType,
    pub visible: bool,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Auto-layout of a container-like node, whether or not it lists children
    pub layout: Option<LayoutMode>,
    pub kind: NodeKind,
    pub style: NodeStyle,
}

impl DesignNode {
    fn base(id: &str, name: &str, node_type: NodeType, kind: NodeKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            node_type,
            visible: true,
            width: None,
            height: None,
            layout: None,
            kind,
            style: NodeStyle::default(),
        }
    }

    #[must_use]
    pub fn container(id: &str, name: &str, node_type: NodeType) -> Self {
        Self::base(
            id,
            name,
            node_type,
            NodeKind::Container {
                children: Vec::new(),
            },
        )
    }

    #[must_use]
    pub fn text(id: &str, name: &str, characters: &str) -> Self {
        Self::base(
            id,
            name,
            NodeType::Text,
            NodeKind::Text {
                characters: characters.to_string(),
                font_size: None,
            },
        )
    }

    #[must_use]
    pub fn leaf(id: &str, name: &str, node_type: NodeType) -> Self {
        Self::base(id, name, node_type, NodeKind::Leaf)
    }

    /// Builder: append a child, turning a leaf into an empty container first
    #[must_use]
    pub fn with_child(mut self, child: DesignNode) -> Self {
        match &mut self.kind {
            NodeKind::Container { children, .. } => children.push(child),
            _ => {
                self.kind = NodeKind::Container {
                    children: vec![child],
                }
            }
        }
        self
    }

    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    #[must_use]
    pub fn children(&self) -> Option<&[DesignNode]> {
        match &self.kind {
            NodeKind::Container { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Text content; `None` for non-text kinds
    #[must_use]
    pub fn characters(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { characters, .. } => Some(characters),
            _ => None,
        }
    }

    #[must_use]
    pub const fn layout(&self) -> Option<LayoutMode> {
        self.layout
    }

    /// Depth-first lookup by id, root included
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&DesignNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.id == id {
                return Some(node);
            }
            if let Some(children) = node.children() {
                stack.extend(children.iter().rev());
            }
        }
        None
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut DesignNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.id == id {
                return Some(node);
            }
            if let NodeKind::Container { children, .. } = &mut node.kind {
                stack.extend(children.iter_mut().rev());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DesignNode {
        DesignNode::container("1", "Screen", NodeType::Frame)
            .with_child(DesignNode::text("2", "Title", "Hello"))
            .with_child(
                DesignNode::container("3", "Card", NodeType::Group)
                    .with_child(DesignNode::leaf("4", "Icon", NodeType::Vector)),
            )
    }

    #[test]
    fn kind_accessors() {
        let root = sample();
        assert_eq!(root.children().map(<[_]>::len), Some(2));
        assert_eq!(root.find("2").and_then(DesignNode::characters), Some("Hello"));
        assert!(root.find("4").and_then(DesignNode::children).is_none());
        assert!(root.find("missing").is_none());
    }

    #[test]
    fn find_mut_reaches_nested_nodes() {
        let mut root = sample();
        root.find_mut("4").unwrap().style.stroke_weight = Some(3.0);
        assert_eq!(root.find("4").unwrap().style.stroke_weight, Some(3.0));
    }

    #[test]
    fn with_child_promotes_leaf_to_container() {
        let node = DesignNode::leaf("1", "Wrapper", NodeType::Instance)
            .with_child(DesignNode::leaf("2", "Inner", NodeType::Rectangle));
        assert_eq!(node.children().map(<[_]>::len), Some(1));
    }
}
