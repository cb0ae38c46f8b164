use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::host::{DesignHost, StrokeStyle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub duration_ms: u64,
    /// RGB, each channel in 0..=1
    pub color: [f64; 3],
    pub weight: f64,
    pub dash_pattern: Vec<f64>,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            duration_ms: 2_000,
            color: [1.0, 0.2, 0.2],
            weight: 3.0,
            dash_pattern: vec![4.0, 2.0],
        }
    }
}

impl HighlightConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err("highlight.color channels must be within 0..=1".to_string());
        }
        if !(self.weight.is_finite() && self.weight > 0.0) {
            return Err("highlight.weight must be > 0".to_string());
        }
        Ok(())
    }

    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    #[must_use]
    pub fn override_style(&self) -> StrokeStyle {
        let [r, g, b] = self.color;
        StrokeStyle {
            strokes: Some(json!([{"type": "SOLID", "color": {"r": r, "g": g, "b": b}}])),
            weight: Some(self.weight),
            align: Some("CENTER".to_string()),
            dash_pattern: Some(self.dash_pattern.clone()),
        }
    }
}

#[derive(Default)]
struct Registry {
    next_generation: u64,
    /// Node id -> stroke fields before the first override, and the
    /// generation of the newest highlight on that node
    active: HashMap<String, (StrokeStyle, u64)>,
}

type SharedRegistry = Arc<Mutex<Registry>>;

fn lock(registry: &SharedRegistry) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Restores a node's original strokes on drop, unless a newer highlight of
/// the same node has taken over.
pub struct HighlightGuard {
    host: Arc<dyn DesignHost>,
    registry: SharedRegistry,
    node_id: String,
    generation: u64,
}

impl HighlightGuard {
    pub fn node_id(&self) -> &str {
        &self.node_id
    }
}

impl Drop for HighlightGuard {
    fn drop(&mut self) {
        let mut registry = lock(&self.registry);
        let newest = registry
            .active
            .get(&self.node_id)
            .is_some_and(|(_, generation)| *generation == self.generation);
        if !newest {
            return;
        }
        if let Some((original, _)) = registry.active.remove(&self.node_id) {
            if let Err(err) = self.host.apply_stroke_style(&self.node_id, &original) {
                log::warn!("failed to restore highlight on {}: {err}", self.node_id);
            }
        }
    }
}

/// Temporary stroke overrides with guaranteed release.
///
/// The first highlight of a node saves its strokes; re-highlighting an
/// already highlighted node keeps that saved copy and only pushes the revert
/// back. The originals come back once the newest highlight expires.
pub struct Highlighter {
    host: Arc<dyn DesignHost>,
    config: HighlightConfig,
    registry: SharedRegistry,
}

impl Highlighter {
    pub fn new(host: Arc<dyn DesignHost>, config: HighlightConfig) -> Self {
        Self {
            host,
            config,
            registry: SharedRegistry::default(),
        }
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    pub fn is_active(&self, node_id: &str) -> bool {
        lock(&self.registry).active.contains_key(node_id)
    }

    /// Override the node's strokes and schedule the restore.
    ///
    /// The guard is armed before the override is written, so the originals
    /// come back even when applying the override fails or the revert task is
    /// dropped with the runtime. `Ok(None)` when the node takes no strokes.
    pub fn highlight(&self, node_id: &str) -> Result<Option<JoinHandle<()>>> {
        let guard = {
            let mut registry = lock(&self.registry);
            registry.next_generation += 1;
            let generation = registry.next_generation;
            match registry.active.get_mut(node_id) {
                Some(entry) => {
                    log::debug!("node {node_id} already highlighted; extending");
                    entry.1 = generation;
                }
                None => {
                    let Some(original) = self.host.stroke_style(node_id) else {
                        log::debug!("node {node_id} has no strokes; skipping highlight");
                        return Ok(None);
                    };
                    registry
                        .active
                        .insert(node_id.to_string(), (original, generation));
                }
            }
            HighlightGuard {
                host: Arc::clone(&self.host),
                registry: Arc::clone(&self.registry),
                node_id: node_id.to_string(),
                generation,
            }
        };
        self.host
            .apply_stroke_style(node_id, &self.config.override_style())?;

        let duration = self.config.duration();
        Ok(Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            drop(guard);
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_host::MemoryHost;
    use critique_protocol::NodeType;
    use critique_serializer::DesignNode;
    use pretty_assertions::assert_eq;

    fn setup() -> (Arc<MemoryHost>, Highlighter) {
        let mut label = DesignNode::text("2", "Label", "Go");
        label.style.stroke_weight = Some(1.0);
        let host = Arc::new(MemoryHost::new(vec![DesignNode::container(
            "1",
            "Screen",
            NodeType::Frame,
        )
        .with_child(label)
        .with_child(DesignNode::container("3", "Group", NodeType::Group))]));
        let highlighter = Highlighter::new(host.clone(), HighlightConfig::default());
        (host, highlighter)
    }

    #[tokio::test(start_paused = true)]
    async fn override_is_reverted_after_the_duration() {
        let (host, highlighter) = setup();
        let revert = highlighter.highlight("2").unwrap().unwrap();
        assert_eq!(host.stroke_style("2").unwrap().weight, Some(3.0));
        assert!(highlighter.is_active("2"));

        revert.await.unwrap();
        assert_eq!(host.stroke_style("2").unwrap().weight, Some(1.0));
        assert!(!highlighter.is_active("2"));
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_highlights_restore_the_first_original() {
        let (host, highlighter) = setup();
        let first = highlighter.highlight("2").unwrap().unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        let second = highlighter.highlight("2").unwrap().unwrap();

        first.await.unwrap();
        assert_eq!(host.stroke_style("2").unwrap().weight, Some(3.0));

        second.await.unwrap();
        let restored = host.stroke_style("2").unwrap();
        assert_eq!(restored.weight, Some(1.0));
        assert_eq!(restored.dash_pattern, None);
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_revert_still_restores() {
        let (host, highlighter) = setup();
        let revert = highlighter.highlight("2").unwrap().unwrap();
        revert.abort();
        assert!(revert.await.unwrap_err().is_cancelled());
        assert_eq!(host.stroke_style("2").unwrap().weight, Some(1.0));
    }

    #[tokio::test]
    async fn nodes_without_strokes_are_skipped() {
        let (_, highlighter) = setup();
        assert!(highlighter.highlight("3").unwrap().is_none());
        assert!(!highlighter.is_active("3"));
    }

    #[test]
    fn validation_rejects_bad_colors() {
        let config = HighlightConfig {
            color: [1.5, 0.0, 0.0],
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(HighlightConfig::default().validate().is_ok());
    }
}
