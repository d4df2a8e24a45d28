//! The add-torrent request lifecycle.

use std::sync::Arc;

use fetchctl_api_models::AddTorrentRequest;
use fetchctl_config::{MotionConfig, SubmissionDefaults};
use serde_json::json;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::form::{SubmissionError, SubmissionForm};
use super::state::{ButtonIcon, ButtonPhase, IconTransition, SubmissionView, SubmitOutcome};
use crate::api::TorrentApi;
use crate::error::Disposed;
use crate::fence::{FlowFence, FlowId};
use crate::output::OutputPanel;
use crate::timers::TimerRegistry;

const FALLBACK_FAILURE: &str = "Request failed";

/// Drives one form through idle, pending and the timed icon sequence.
///
/// Icon and label mutations are fenced by a [`FlowId`]: once a newer submit
/// begins, continuations of older flows (the success hold in particular) become
/// no-ops.
#[derive(Clone)]
pub struct SubmissionController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    api: Arc<dyn TorrentApi>,
    view: watch::Sender<SubmissionView>,
    fence: FlowFence,
    timers: TimerRegistry,
    output: OutputPanel,
    motion: MotionConfig,
    defaults: SubmissionDefaults,
}

enum Start {
    Ignored,
    Rejected(SubmissionError),
    Accepted(FlowId, AddTorrentRequest),
}

impl SubmissionController {
    /// Controller with an idle view; all delays are scheduled on `timers`.
    #[must_use]
    pub fn new(
        api: Arc<dyn TorrentApi>,
        timers: TimerRegistry,
        motion: MotionConfig,
        defaults: SubmissionDefaults,
    ) -> Self {
        let (view, _) = watch::channel(SubmissionView {
            form: SubmissionForm::from_defaults(&defaults),
            ..SubmissionView::default()
        });
        let output = OutputPanel::new(timers.clone(), motion.output_line());
        Self {
            inner: Arc::new(ControllerInner {
                api,
                view,
                fence: FlowFence::new(),
                timers,
                output,
                motion,
                defaults,
            }),
        }
    }

    /// Receiver observing every view change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SubmissionView> {
        self.inner.view.subscribe()
    }

    /// Snapshot of the current view.
    #[must_use]
    pub fn view(&self) -> SubmissionView {
        self.inner.view.borrow().clone()
    }

    /// Response panel fed by this controller.
    #[must_use]
    pub fn output(&self) -> &OutputPanel {
        &self.inner.output
    }

    /// Apply an edit to the form. Changing the URL clears a visible URL error.
    /// Edits are refused while a request is pending.
    pub fn edit_form<F>(&self, edit: F) -> bool
    where
        F: FnOnce(&mut SubmissionForm),
    {
        self.inner.view.send_if_modified(|view| {
            if view.phase == ButtonPhase::Pending {
                return false;
            }
            let before = view.form.clone();
            edit(&mut view.form);
            if view.form.url != before.url {
                view.url_error = None;
            }
            view.form != before
        })
    }

    /// Submit the current form.
    ///
    /// Resolves once the button is back to idle; the success hold and the final
    /// return to the resting icon continue in the background.
    pub async fn submit(&self) -> SubmitOutcome {
        let (flow, request) = match self.start() {
            Start::Ignored => {
                debug!("submit ignored while pending");
                return SubmitOutcome::Ignored;
            }
            Start::Rejected(err) => {
                self.inner.output.reset();
                return SubmitOutcome::Rejected(err);
            }
            Start::Accepted(flow, request) => (flow, request),
        };

        info!(flow = flow.get(), url = %request.url, "submitting torrent");
        match self.run(flow, request).await {
            Ok(outcome) => outcome,
            Err(Disposed) => SubmitOutcome::Cancelled,
        }
    }

    /// Validate and enter pending in one view update. The new flow begins under
    /// the same lock, so fenced writes of older flows cannot interleave.
    fn start(&self) -> Start {
        let mut start = Start::Ignored;
        self.inner.view.send_if_modified(|view| {
            if view.phase == ButtonPhase::Pending {
                return false;
            }
            match view.form.into_request(&self.inner.defaults) {
                Ok(request) => {
                    view.url_error = None;
                    view.phase = ButtonPhase::Pending;
                    view.transition = None;
                    start = Start::Accepted(self.inner.fence.begin(), request);
                }
                Err(err) => {
                    view.url_error = Some(err.to_string());
                    start = Start::Rejected(err);
                }
            }
            true
        });
        start
    }

    async fn run(
        &self,
        flow: FlowId,
        request: AddTorrentRequest,
    ) -> Result<SubmitOutcome, Disposed> {
        self.transition(ButtonIcon::Pending, flow).await?;

        let response = tokio::select! {
            biased;
            () = self.inner.timers.disposed() => return Err(Disposed),
            response = self.inner.api.add_torrent(&request) => response,
        };

        match response {
            Ok(body) => {
                self.inner.output.render(&body);
                self.inner.view.send_modify(|view| view.form.url.clear());
                self.transition(ButtonIcon::Check, flow).await?;
                self.settle(flow);
                self.schedule_rest(flow);
                Ok(SubmitOutcome::Succeeded(body))
            }
            Err(err) => {
                let mut message = err.to_string();
                if message.trim().is_empty() {
                    message = FALLBACK_FAILURE.to_string();
                }
                warn!(flow = flow.get(), error = %message, "torrent submission failed");
                self.inner.output.render(&json!({ "error": message }));
                self.transition(ButtonIcon::Arrows, flow).await?;
                self.settle(flow);
                Ok(SubmitOutcome::Failed(message))
            }
        }
    }

    /// Return the button to idle if `flow` still owns it.
    fn settle(&self, flow: FlowId) {
        let fence = &self.inner.fence;
        self.inner.view.send_if_modified(|view| {
            if !fence.is_current(flow) {
                return false;
            }
            view.phase = ButtonPhase::Idle;
            true
        });
    }

    /// Hold the success icon, then fall back to the resting icon.
    fn schedule_rest(&self, flow: FlowId) {
        let controller = self.clone();
        self.inner.timers.spawn(async move {
            if controller
                .inner
                .timers
                .sleep(controller.inner.motion.success_hold())
                .await
                .is_ok()
            {
                let _ = controller.transition(ButtonIcon::Arrows, flow).await;
            }
        });
    }

    /// Animate the icon towards `next`. Stale flows change nothing.
    ///
    /// Each fence check runs inside the view update it guards.
    async fn transition(&self, next: ButtonIcon, flow: FlowId) -> Result<(), Disposed> {
        let fence = &self.inner.fence;
        let started = self.inner.view.send_if_modified(|view| {
            if !fence.is_current(flow) || view.icon == next {
                return false;
            }
            view.transition = Some(IconTransition {
                from: view.icon,
                to: next,
            });
            true
        });
        if !started {
            return Ok(());
        }

        self.inner
            .timers
            .sleep(self.inner.motion.icon_transition())
            .await?;

        self.inner.view.send_if_modified(|view| {
            if !fence.is_current(flow) {
                return false;
            }
            view.icon = next;
            view.transition = None;
            true
        });
        Ok(())
    }
}
