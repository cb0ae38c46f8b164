use critique_protocol::{LayoutMode, NodeType};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AdapterError, Result};
use crate::node::{DesignNode, NodeKind, NodeStyle};

/// Host node as it arrives over the wire: every field optional, loosely typed.
///
/// Fields are normalised once in the conversion to [`DesignNode`]. Values of the
/// wrong JSON type are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default, rename = "type")]
    pub node_type: Option<Value>,
    #[serde(default)]
    pub visible: Option<Value>,
    #[serde(default)]
    pub width: Option<Value>,
    #[serde(default)]
    pub height: Option<Value>,
    #[serde(default)]
    pub characters: Option<Value>,
    #[serde(default)]
    pub font_size: Option<Value>,
    #[serde(default)]
    pub layout_mode: Option<Value>,
    #[serde(default)]
    pub children: Option<Value>,
    #[serde(default)]
    pub fills: Option<Value>,
    #[serde(default)]
    pub strokes: Option<Value>,
    #[serde(default)]
    pub stroke_weight: Option<Value>,
    #[serde(default)]
    pub stroke_align: Option<Value>,
    #[serde(default)]
    pub dash_pattern: Option<Value>,
}

fn finite_number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|n| n.is_finite())
}

fn string(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text),
        _ => None,
    }
}

fn identity(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Malformed descendants are dropped; the rest of the subtree survives.
fn adapt_children(values: Vec<Value>) -> Vec<DesignNode> {
    values
        .into_iter()
        .filter_map(|value| {
            let raw: RawNode = match serde_json::from_value(value) {
                Ok(raw) => raw,
                Err(err) => {
                    log::debug!("dropping child that is not a node: {err}");
                    return None;
                }
            };
            match DesignNode::try_from(raw) {
                Ok(node) => Some(node),
                Err(err) => {
                    log::debug!("dropping child: {err}");
                    None
                }
            }
        })
        .collect()
}

impl TryFrom<RawNode> for DesignNode {
    type Error = AdapterError;

    fn try_from(raw: RawNode) -> Result<Self> {
        let name = string(raw.name).unwrap_or_default();
        let id = identity(raw.id.as_ref()).ok_or_else(|| AdapterError::MissingId {
            name: name.clone(),
        })?;
        let node_type = raw
            .node_type
            .as_ref()
            .and_then(Value::as_str)
            .map_or(NodeType::Unknown, NodeType::from_tag);

        let layout = if node_type.is_text() {
            None
        } else {
            raw.layout_mode
                .as_ref()
                .and_then(Value::as_str)
                .and_then(LayoutMode::from_tag)
        };

        let kind = if node_type.is_text() {
            NodeKind::Text {
                characters: string(raw.characters).unwrap_or_default(),
                font_size: finite_number(raw.font_size.as_ref()),
            }
        } else {
            match raw.children {
                Some(Value::Array(children)) => NodeKind::Container {
                    children: adapt_children(children),
                },
                _ => NodeKind::Leaf,
            }
        };

        Ok(Self {
            id,
            name,
            node_type,
            visible: !matches!(raw.visible, Some(Value::Bool(false))),
            width: finite_number(raw.width.as_ref()),
            height: finite_number(raw.height.as_ref()),
            layout,
            kind,
            style: NodeStyle {
                fills: raw.fills,
                strokes: raw.strokes,
                stroke_weight: finite_number(raw.stroke_weight.as_ref()),
                stroke_align: string(raw.stroke_align),
                dash_pattern: match raw.dash_pattern {
                    Some(Value::Array(dashes)) => {
                        Some(dashes.iter().filter_map(Value::as_f64).collect())
                    }
                    _ => None,
                },
            },
        })
    }
}

/// Parse a host document: either a single node or an array of top-level nodes.
///
/// Top-level nodes must carry an id; descendants without one are dropped.
pub fn parse_document(bytes: &[u8]) -> Result<Vec<DesignNode>> {
    let value: Value = serde_json::from_slice(bytes)?;
    let raws: Vec<RawNode> = match value {
        Value::Array(_) => serde_json::from_value(value)?,
        Value::Object(_) => vec![serde_json::from_value(value)?],
        other => {
            return Err(AdapterError::invalid_document(format!(
                "expected a node or an array of nodes, got {other}"
            )))
        }
    };
    raws.into_iter().map(DesignNode::try_from).collect()
}
