//! Debounced completion trigger.
//!
//! Every edit restarts a quiet-period countdown. When the countdown elapses
//! without another edit, the current line is sent to the completion service
//! exactly once. The answer is offered inline only if the editor is still at
//! the version and cursor position captured when the request was sent.
//!
//! ```text
//! IDLE --edit--> PENDING(deadline) --edit--> PENDING(new deadline)
//!                PENDING(deadline) --deadline elapses--> IDLE + one request
//! ```
//!
//! At most one deadline is outstanding: the trigger owns the only handle and
//! replacing it aborts the previous countdown. A request that has already
//! been sent is never cancelled; a late answer is dropped by the anchor check.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::api::RemoteOperations;
use crate::models::editor::{CompletionRequest, EditorSnapshot, InlineSuggestion};
use crate::models::usage::FeatureKind;
use crate::session::SessionStore;
use crate::usage::UsageRecorder;

/// Default quiet interval before a completion request is sent.
pub const DEFAULT_QUIET_INTERVAL: Duration = Duration::from_millis(3000);

/// The host editor, as far as the trigger is concerned.
pub trait EditorHost: Send + Sync {
    /// Current state of the focused editor, or `None` when nothing is focused.
    fn snapshot(&self) -> Option<EditorSnapshot>;

    /// Display `suggestion` inline. Only called with a suggestion whose anchor
    /// matched the editor's state immediately beforehand.
    fn offer(&self, suggestion: InlineSuggestion);
}

/// Observable trigger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Idle,
    Pending { deadline: Instant },
}

struct Pending {
    deadline: Instant,
    handle: JoinHandle<()>,
}

/// Collaborators the fired request needs, cloned into the countdown task.
#[derive(Clone)]
struct Dispatcher {
    remote: Arc<dyn RemoteOperations>,
    editor: Arc<dyn EditorHost>,
    session: Arc<dyn SessionStore>,
    usage: Option<UsageRecorder>,
}

/// Debounced completion trigger for one editing session.
///
/// Must be driven from within a Tokio runtime.
pub struct SuggestionTrigger {
    dispatcher: Dispatcher,
    quiet: Duration,
    pending: Option<Pending>,
}

impl SuggestionTrigger {
    pub fn new(
        remote: Arc<dyn RemoteOperations>,
        editor: Arc<dyn EditorHost>,
        session: Arc<dyn SessionStore>,
        quiet: Duration,
    ) -> Self {
        Self {
            dispatcher: Dispatcher {
                remote,
                editor,
                session,
                usage: None,
            },
            quiet,
            pending: None,
        }
    }

    /// Log every offered suggestion so the host's accept or reject can
    /// settle it.
    pub fn with_usage(mut self, usage: UsageRecorder) -> Self {
        self.dispatcher.usage = Some(usage);
        self
    }

    pub fn quiet_interval(&self) -> Duration {
        self.quiet
    }

    pub fn state(&self) -> TriggerState {
        match &self.pending {
            Some(p) if !p.handle.is_finished() => TriggerState::Pending {
                deadline: p.deadline,
            },
            _ => TriggerState::Idle,
        }
    }

    /// Record a qualifying edit: drop any outstanding deadline and start a
    /// fresh full quiet interval.
    pub fn on_edit(&mut self) {
        self.cancel();

        let deadline = Instant::now() + self.quiet;
        let dispatcher = self.dispatcher.clone();
        let handle = tokio::spawn(async move {
            sleep_until(deadline).await;
            dispatcher.fire();
        });
        self.pending = Some(Pending { deadline, handle });
    }

    /// Abort the outstanding deadline, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(p) => {
                let was_pending = !p.handle.is_finished();
                p.handle.abort();
                if was_pending {
                    debug!("superseded pending completion deadline");
                }
                was_pending
            }
            None => false,
        }
    }
}

impl Drop for SuggestionTrigger {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl Dispatcher {
    /// Capture the cursor line and send it. The request runs on its own task
    /// so that later edits (which only abort countdowns) never cancel it.
    fn fire(self) {
        let Some(anchor) = self.editor.snapshot() else {
            debug!("quiet period elapsed with no focused editor");
            return;
        };
        let Some(user_id) = self.session.current_user_id() else {
            debug!("quiet period elapsed without a session; no completion requested");
            return;
        };

        let request = CompletionRequest {
            timestamp: Utc::now(),
            user_id,
            language: anchor.language.clone(),
            text: anchor.line_text.clone(),
        };
        info!(
            language = %request.language,
            line = anchor.position.line,
            "requesting completion"
        );
        tokio::spawn(self.dispatch(request, anchor));
    }

    async fn dispatch(self, request: CompletionRequest, anchor: EditorSnapshot) {
        let text = match self
            .remote
            .request_completion(&request.user_id, &request.language, &request.text)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "completion request failed; no suggestion");
                return;
            }
        };
        if text.is_empty() {
            debug!("completion service returned an empty suggestion");
            return;
        }

        match self.editor.snapshot() {
            Some(current) if anchor.same_anchor(&current) => {
                self.record(&request).await;
                self.editor.offer(InlineSuggestion {
                    text,
                    position: anchor.position,
                    version: anchor.version,
                });
            }
            _ => debug!(
                version = anchor.version,
                "editor moved on before the suggestion arrived; discarding"
            ),
        }
    }

    async fn record(&self, request: &CompletionRequest) {
        let Some(usage) = &self.usage else {
            return;
        };
        if let Err(e) = usage
            .record(
                &request.user_id,
                FeatureKind::CodeCompletion,
                &request.language,
                None,
                request.timestamp,
            )
            .await
        {
            warn!(error = %e, "failed to record completion usage");
        }
    }
}
