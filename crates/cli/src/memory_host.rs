use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use critique_protocol::{NodeType, OutboundMessage};
use critique_serializer::{parse_document, DesignNode, NodeKind};

use crate::error::{PipelineError, Result};
use crate::host::{DesignHost, StrokeStyle};

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub timeout: Duration,
}

/// Recorded notifications and outbound messages kept per host; older entries
/// are dropped first.
pub const HISTORY_LIMIT: usize = 256;

#[derive(Debug, Default)]
struct HostState {
    roots: Vec<DesignNode>,
    selection: Vec<String>,
    viewport: Vec<String>,
    notifications: VecDeque<Notification>,
    outbound: VecDeque<OutboundMessage>,
    closed: bool,
}

fn record<T>(history: &mut VecDeque<T>, item: T) {
    if history.len() == HISTORY_LIMIT {
        history.pop_front();
    }
    history.push_back(item);
}

/// Design host backed by an in-memory document.
///
/// Records every capability call so the driver and tests can observe what the
/// pipeline did, up to [`HISTORY_LIMIT`] entries each. With `echo` set,
/// outbound messages are written to stdout as JSON lines instead of being
/// recorded.
#[derive(Debug, Default)]
pub struct MemoryHost {
    state: Mutex<HostState>,
    echo: bool,
}

impl MemoryHost {
    pub fn new(roots: Vec<DesignNode>) -> Self {
        Self {
            state: Mutex::new(HostState {
                roots,
                ..Default::default()
            }),
            echo: false,
        }
    }

    pub fn from_document(bytes: &[u8]) -> Result<Self> {
        let roots =
            parse_document(bytes).map_err(|err| PipelineError::Host(err.to_string()))?;
        Ok(Self::new(roots))
    }

    #[must_use]
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the selection by id. Unknown ids are skipped.
    pub fn select_ids<S: AsRef<str>>(&self, ids: &[S]) -> Vec<DesignNode> {
        let mut state = self.state();
        let mut selected = Vec::new();
        for id in ids {
            let id = id.as_ref();
            match find(&state.roots, id) {
                Some(node) => selected.push(node.clone()),
                None => log::warn!("selection id {id} not found in document"),
            }
        }
        state.selection = selected.iter().map(|node| node.id.clone()).collect();
        selected
    }

    /// Detach a node from the document, as if the user deleted it.
    pub fn remove_node(&self, id: &str) -> bool {
        let mut state = self.state();
        let roots = &mut state.roots;
        if let Some(pos) = roots.iter().position(|root| root.id == id) {
            roots.remove(pos);
            return true;
        }
        let mut stack: Vec<&mut DesignNode> = roots.iter_mut().collect();
        while let Some(node) = stack.pop() {
            if let NodeKind::Container { children, .. } = &mut node.kind {
                if let Some(pos) = children.iter().position(|child| child.id == id) {
                    children.remove(pos);
                    return true;
                }
                stack.extend(children.iter_mut());
            }
        }
        false
    }

    pub fn node(&self, id: &str) -> Option<DesignNode> {
        find(&self.state().roots, id).cloned()
    }

    pub fn selection_ids(&self) -> Vec<String> {
        self.state().selection.clone()
    }

    pub fn viewport_ids(&self) -> Vec<String> {
        self.state().viewport.clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state().notifications.iter().cloned().collect()
    }

    pub fn outbound(&self) -> Vec<OutboundMessage> {
        self.state().outbound.iter().cloned().collect()
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

fn find<'a>(roots: &'a [DesignNode], id: &str) -> Option<&'a DesignNode> {
    roots.iter().find_map(|root| root.find(id))
}

/// Groups and slices carry no stroke fields.
fn takes_strokes(node: &DesignNode) -> bool {
    !matches!(node.node_type, NodeType::Group | NodeType::Slice)
}

#[async_trait]
impl DesignHost for MemoryHost {
    fn current_selection(&self) -> Vec<DesignNode> {
        let state = self.state();
        state
            .selection
            .iter()
            .filter_map(|id| find(&state.roots, id).cloned())
            .collect()
    }

    async fn node_by_id(&self, id: &str) -> Option<DesignNode> {
        self.node(id)
    }

    fn select(&self, ids: &[String]) {
        self.state().selection = ids.to_vec();
    }

    fn scroll_and_zoom_into_view(&self, ids: &[String]) {
        self.state().viewport = ids.to_vec();
    }

    fn notify(&self, message: &str, timeout: Duration) {
        log::info!("notify: {message}");
        record(
            &mut self.state().notifications,
            Notification {
                message: message.to_string(),
                timeout,
            },
        );
    }

    fn stroke_style(&self, id: &str) -> Option<StrokeStyle> {
        let state = self.state();
        let node = find(&state.roots, id)?;
        takes_strokes(node).then(|| StrokeStyle::from(&node.style))
    }

    fn apply_stroke_style(&self, id: &str, style: &StrokeStyle) -> Result<()> {
        let mut state = self.state();
        let node = state
            .roots
            .iter_mut()
            .find_map(|root| root.find_mut(id))
            .ok_or_else(|| PipelineError::NodeNotFound(id.to_string()))?;
        style.apply_to(&mut node.style);
        Ok(())
    }

    fn post_message(&self, message: &OutboundMessage) {
        if self.echo {
            match serde_json::to_string(message) {
                Ok(line) => {
                    let mut stdout = std::io::stdout().lock();
                    if let Err(err) = writeln!(stdout, "{line}").and_then(|()| stdout.flush()) {
                        log::warn!("failed to write outbound message: {err}");
                    }
                }
                Err(err) => log::error!("failed to encode outbound message: {err}"),
            }
            return;
        }
        record(&mut self.state().outbound, message.clone());
    }

    fn close(&self) {
        log::info!("close requested");
        self.state().closed = true;
    }
}
