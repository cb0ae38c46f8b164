use std::time::Duration;

use async_trait::async_trait;
use critique_protocol::OutboundMessage;
use critique_serializer::{DesignNode, NodeStyle};
use serde_json::Value;

use crate::error::Result;

/// Stroke fields overridden while a node is highlighted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeStyle {
    pub strokes: Option<Value>,
    pub weight: Option<f64>,
    pub align: Option<String>,
    pub dash_pattern: Option<Vec<f64>>,
}

impl From<&NodeStyle> for StrokeStyle {
    fn from(style: &NodeStyle) -> Self {
        Self {
            strokes: style.strokes.clone(),
            weight: style.stroke_weight,
            align: style.stroke_align.clone(),
            dash_pattern: style.dash_pattern.clone(),
        }
    }
}

impl StrokeStyle {
    pub fn apply_to(&self, style: &mut NodeStyle) {
        style.strokes = self.strokes.clone();
        style.stroke_weight = self.weight;
        style.stroke_align = self.align.clone();
        style.dash_pattern = self.dash_pattern.clone();
    }
}

/// Capabilities of the design tool the pipeline drives.
///
/// Everything the pipeline knows about the document arrives through this
/// trait; nothing is read from ambient state.
#[async_trait]
pub trait DesignHost: Send + Sync {
    /// Raw selection, in host order.
    fn current_selection(&self) -> Vec<DesignNode>;

    /// Live lookup. `None` once the node has been removed.
    async fn node_by_id(&self, id: &str) -> Option<DesignNode>;

    fn select(&self, ids: &[String]);

    fn scroll_and_zoom_into_view(&self, ids: &[String]);

    fn notify(&self, message: &str, timeout: Duration);

    /// Current stroke fields, `None` when the node does not take strokes.
    fn stroke_style(&self, id: &str) -> Option<StrokeStyle>;

    fn apply_stroke_style(&self, id: &str, style: &StrokeStyle) -> Result<()>;

    fn post_message(&self, message: &OutboundMessage);

    fn close(&self);
}
