use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type tag of a design node, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Frame,
    Group,
    Section,
    Component,
    ComponentSet,
    Instance,
    Text,
    Rectangle,
    Ellipse,
    Polygon,
    Star,
    Vector,
    Line,
    BooleanOperation,
    Slice,
    #[serde(other)]
    Unknown,
}

impl NodeType {
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "FRAME" => Self::Frame,
            "GROUP" => Self::Group,
            "SECTION" => Self::Section,
            "COMPONENT" => Self::Component,
            "COMPONENT_SET" => Self::ComponentSet,
            "INSTANCE" => Self::Instance,
            "TEXT" => Self::Text,
            "RECTANGLE" => Self::Rectangle,
            "ELLIPSE" => Self::Ellipse,
            "POLYGON" => Self::Polygon,
            "STAR" => Self::Star,
            "VECTOR" => Self::Vector,
            "LINE" => Self::Line,
            "BOOLEAN_OPERATION" => Self::BooleanOperation,
            "SLICE" => Self::Slice,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Frame => "FRAME",
            Self::Group => "GROUP",
            Self::Section => "SECTION",
            Self::Component => "COMPONENT",
            Self::ComponentSet => "COMPONENT_SET",
            Self::Instance => "INSTANCE",
            Self::Text => "TEXT",
            Self::Rectangle => "RECTANGLE",
            Self::Ellipse => "ELLIPSE",
            Self::Polygon => "POLYGON",
            Self::Star => "STAR",
            Self::Vector => "VECTOR",
            Self::Line => "LINE",
            Self::BooleanOperation => "BOOLEAN_OPERATION",
            Self::Slice => "SLICE",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Node kinds that hold children in the host's object model.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(
            self,
            Self::Frame
                | Self::Group
                | Self::Section
                | Self::Component
                | Self::ComponentSet
                | Self::Instance
                | Self::BooleanOperation
        )
    }

    /// Kinds a user can select as an analysis target.
    #[must_use]
    pub const fn is_analyzable(self) -> bool {
        matches!(
            self,
            Self::Frame | Self::Group | Self::Section | Self::Component | Self::Instance
        )
    }

    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Text)
    }
}

/// Auto-layout direction of a container. `NONE` is never represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayoutMode {
    Horizontal,
    Vertical,
    Grid,
}

impl LayoutMode {
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "HORIZONTAL" => Some(Self::Horizontal),
            "VERTICAL" => Some(Self::Vertical),
            "GRID" => Some(Self::Grid),
            _ => None,
        }
    }
}

/// Bounded, host-independent projection of a design subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SerializedNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub visible: bool,
    pub width: i64,
    pub height: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fills: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strokes: Option<Value>,
    #[serde(default)]
    pub children: Vec<SerializedNode>,
}

impl SerializedNode {
    /// Number of nodes in this subtree, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Depth of the deepest descendant, the root being depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|child| (child, depth + 1)));
        }
        deepest
    }
}
