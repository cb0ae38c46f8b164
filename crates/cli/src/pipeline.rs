use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use critique_client::{CritiqueClient, HttpTransport, Transport};
use critique_protocol::{AnalysisRequest, AnalysisResult, InboundCommand, OutboundMessage, Violation};
use critique_search::{ContextAnalyzer, RelevanceScorer};
use critique_serializer::{DesignNode, TreeSerializer};
use tokio::task::JoinHandle;

use crate::config::CritiqueConfig;
use crate::error::{PipelineError, Result};
use crate::highlight::Highlighter;
use crate::host::DesignHost;
use crate::selection::{SelectionHandle, SelectionState};

pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_millis(3_000);

const MSG_CANNOT_FOCUS: &str = "Cannot focus on violation";
const MSG_SHOWING_FRAMES: &str = "Showing selected frames";
const MSG_NO_FRAMES: &str = "No frames selected";

/// Entry point for host events and UI commands.
///
/// Owns the selection state and every component of the analysis path.
/// Handlers run in arrival order; remote analyses run as spawned tasks
/// over a snapshot of the selection taken when the request arrived.
pub struct Pipeline<T = HttpTransport> {
    host: Arc<dyn DesignHost>,
    selection: SelectionHandle,
    serializer: TreeSerializer,
    analyzer: ContextAnalyzer,
    scorer: RelevanceScorer,
    highlighter: Highlighter,
    client: Arc<CritiqueClient<T>>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl<T: Transport + 'static> Pipeline<T> {
    pub fn new(host: Arc<dyn DesignHost>, client: CritiqueClient<T>, config: &CritiqueConfig) -> Self {
        let selection = SelectionHandle::new(SelectionState::from_raw(host.current_selection()));
        Self {
            highlighter: Highlighter::new(Arc::clone(&host), config.highlight.clone()),
            host,
            selection,
            serializer: TreeSerializer::new(config.serializer.clone()),
            analyzer: ContextAnalyzer::new(config.analyzer.clone()),
            scorer: RelevanceScorer::new(config.matcher.clone()),
            client: Arc::new(client),
            in_flight: Mutex::new(Vec::new()),
        }
    }

    pub fn selection(&self) -> &SelectionHandle {
        &self.selection
    }

    pub fn scorer(&self) -> &RelevanceScorer {
        &self.scorer
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    /// Analyses submitted and not yet reaped.
    pub fn in_flight(&self) -> usize {
        self.lock_in_flight().len()
    }

    /// Replace the selection wholesale and tell the UI.
    pub fn on_selection_change(&self, raw: Vec<DesignNode>) {
        let state = self.selection.replace(SelectionState::from_raw(raw));
        log::debug!(
            "selection changed: {} raw, {} eligible",
            state.raw().len(),
            state.frames().len()
        );
        self.post_selection(&state);
    }

    pub async fn handle(&self, command: InboundCommand) {
        match command {
            InboundCommand::RequestInitialState => {
                let state = self.selection.snapshot();
                self.post_selection(&state);
            }
            InboundCommand::FocusCurrentSelection => self.focus_selection(),
            InboundCommand::RequestAnalysis {
                context,
                ignore_repeated_text,
            } => self.request_analysis(context.as_deref(), ignore_repeated_text),
            InboundCommand::FocusViolationArea { violation_context } => {
                self.focus_violation(violation_context.as_ref()).await;
            }
            InboundCommand::ShowNotification { message, timeout } => {
                let timeout = timeout.map_or(DEFAULT_NOTIFY_TIMEOUT, Duration::from_millis);
                self.host.notify(&message, timeout);
            }
            InboundCommand::Close => self.host.close(),
        }
    }

    /// Serialize the current selection and build the request body.
    pub fn prepare_request(
        &self,
        user_context: Option<&str>,
        dedupe_text: bool,
    ) -> Result<AnalysisRequest> {
        let state = self.selection.snapshot();
        if state.is_empty() {
            return Err(PipelineError::NoSelection);
        }
        let payload = self.serializer.serialize_frames(state.frames());
        if payload.is_empty() {
            return Err(PipelineError::Serialization(
                "no frame survived serialization".to_string(),
            ));
        }
        let context = self.analyzer.analyze(&payload, user_context, dedupe_text);
        log::info!(
            "prepared {} frame(s) for analysis ({:?}, {:?})",
            payload.len(),
            context.design_type,
            context.complexity
        );
        Ok(AnalysisRequest::new(payload, context))
    }

    /// Post `analysis-started` and submit in the background. Failures are
    /// reported as `analysis-error` with a user-facing sentence.
    pub fn request_analysis(&self, user_context: Option<&str>, dedupe_text: bool) {
        let request = match self.prepare_request(user_context, dedupe_text) {
            Ok(request) => request,
            Err(err) => {
                self.report_error(&err);
                return;
            }
        };
        self.host.post_message(&OutboundMessage::AnalysisStarted);

        let host = Arc::clone(&self.host);
        let client = Arc::clone(&self.client);
        let task = tokio::spawn(async move {
            match client.submit(&request).await {
                Ok(raw) => {
                    let result = AnalysisResult::from_critique(&raw);
                    log::info!("analysis complete: {}", result.summary);
                    host.post_message(&OutboundMessage::AnalysisComplete { result });
                }
                Err(err) => {
                    let err = PipelineError::from(err);
                    log::error!("analysis failed: {err}");
                    host.post_message(&OutboundMessage::AnalysisError {
                        error: err.user_message().to_string(),
                    });
                }
            }
        });
        let mut in_flight = self.lock_in_flight();
        in_flight.retain(|task| !task.is_finished());
        in_flight.push(task);
    }

    /// Wait for every analysis submitted so far.
    pub async fn drain(&self) {
        let tasks = std::mem::take(&mut *self.lock_in_flight());
        for task in tasks {
            if let Err(err) = task.await {
                log::error!("analysis task aborted: {err}");
            }
        }
    }

    fn focus_selection(&self) {
        let state = self.selection.snapshot();
        if state.is_empty() {
            self.host.notify(MSG_NO_FRAMES, DEFAULT_NOTIFY_TIMEOUT);
            return;
        }
        let ids = state.frame_ids();
        self.host.select(&ids);
        self.host.scroll_and_zoom_into_view(&ids);
        self.host.notify(
            &format!("Focused on {} frame(s)", ids.len()),
            DEFAULT_NOTIFY_TIMEOUT,
        );
    }

    /// Match the report against the live frames of the current selection.
    /// Returns the id that was focused, or `None` when the selection fallback
    /// was used.
    pub async fn focus_violation(&self, report: Option<&Violation>) -> Option<String> {
        let state = self.selection.snapshot();
        let Some(report) = report.filter(|_| !state.is_empty()) else {
            self.host.notify(MSG_CANNOT_FOCUS, DEFAULT_NOTIFY_TIMEOUT);
            return None;
        };

        let mut live = Vec::with_capacity(state.frames().len());
        for frame in state.frames() {
            match self.host.node_by_id(&frame.id).await {
                Some(node) => live.push(node),
                None => log::debug!("selected frame {} no longer exists", frame.id),
            }
        }

        let target = self.scorer.locate(&live, report).map(|node| node.id.clone());
        let outcome = match &target {
            Some(id) => self.focus_node(id, report).await,
            None => Err(PipelineError::NodeNotFound("no matching node".to_string())),
        };
        match outcome {
            Ok(()) => target,
            Err(err) => {
                log::debug!("focus fallback: {err}");
                let ids = state.frame_ids();
                self.host.select(&ids);
                self.host.scroll_and_zoom_into_view(&ids);
                self.host.notify(MSG_SHOWING_FRAMES, DEFAULT_NOTIFY_TIMEOUT);
                None
            }
        }
    }

    async fn focus_node(&self, id: &str, report: &Violation) -> Result<()> {
        let node = self
            .host
            .node_by_id(id)
            .await
            .ok_or_else(|| PipelineError::NodeNotFound(id.to_string()))?;
        let ids = vec![node.id.clone()];
        self.host.select(&ids);
        self.host.scroll_and_zoom_into_view(&ids);
        let label = report
            .title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or("element");
        self.host
            .notify(&format!("Found: {label}"), DEFAULT_NOTIFY_TIMEOUT);

        if let Err(err) = self.highlighter.highlight(&node.id) {
            log::warn!("highlight of {} failed: {err}", node.id);
        }
        Ok(())
    }

    fn post_selection(&self, state: &SelectionState) {
        self.host.post_message(&OutboundMessage::SelectionChanged {
            frames: state.summaries(),
        });
    }

    fn report_error(&self, err: &PipelineError) {
        log::warn!("analysis not started: {err}");
        self.host.post_message(&OutboundMessage::AnalysisError {
            error: err.user_message().to_string(),
        });
    }

    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
