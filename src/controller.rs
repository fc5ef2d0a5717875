//! The UI-thread coordinator.
//!
//! [`Controller`] owns the [`SessionState`] and is the only thing that
//! mutates it. It never touches a toolkit type: everything it needs from the
//! host event loop goes through [`UiScheduler`], [`HostWindow`] and
//! [`ClipboardHost`].

use crate::clipboard::{self, ClipboardHost, CopyTrigger, ACK_DURATION};
use crate::config::ApiConfig;
use crate::dispatcher::{ChatOutcome, ChatRequest, RequestDispatcher};
use crate::renderer::{self, RenderMode, RenderedSegment};
use crate::session::SessionState;
use crate::sizing::{Geometry, SizingPolicy};
use futures_util::future::BoxFuture;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum UiEvent {
    InputChanged { text: String, line_count: usize },
    Submit,
    Completed { sequence: u64, outcome: ChatOutcome },
    CopyRequested(CopyTrigger),
    CopyAckExpired { generation: u64 },
    Close,
}

pub trait UiScheduler {
    /// Runs `work` off the UI thread; the event it yields is handed back to
    /// [`Controller::handle`] on the UI thread.
    fn run_on_ui_thread(&mut self, work: BoxFuture<'static, UiEvent>);

    fn schedule_after(&mut self, delay: Duration, event: UiEvent);
}

pub trait HostWindow {
    fn resize(&mut self, geometry: Geometry);

    /// Replaces the answer pane contents. An empty slice clears it.
    fn show_response(&mut self, segments: &[RenderedSegment]);

    fn close(&mut self);
}

pub trait Host: UiScheduler + HostWindow + ClipboardHost {}

impl<T: UiScheduler + HostWindow + ClipboardHost> Host for T {}

pub struct Controller {
    state: SessionState,
    api: ApiConfig,
    dispatcher: RequestDispatcher,
    sizing: SizingPolicy,
    render_mode: RenderMode,
    input_line_count: usize,
    geometry: Option<Geometry>,
    ack_generation: u64,
    copy_acknowledged: bool,
}

impl Controller {
    pub fn new(
        api: ApiConfig,
        dispatcher: RequestDispatcher,
        sizing: SizingPolicy,
        render_mode: RenderMode,
    ) -> Self {
        Controller {
            state: SessionState::new(),
            api,
            dispatcher,
            sizing,
            render_mode,
            input_line_count: 1,
            geometry: None,
            ack_generation: 0,
            copy_acknowledged: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn input_line_count(&self) -> usize {
        self.input_line_count
    }

    /// Whether the "Copied!" acknowledgement is showing.
    pub fn copy_acknowledged(&self) -> bool {
        self.copy_acknowledged
    }

    pub fn handle(&mut self, event: UiEvent, host: &mut impl Host) {
        match event {
            UiEvent::InputChanged { text, line_count } => {
                self.state.set_input(text);
                self.input_line_count = line_count.max(1);
                self.relayout(host);
            }
            UiEvent::Submit => self.submit(host),
            UiEvent::Completed { sequence, outcome } => self.complete(sequence, outcome, host),
            UiEvent::CopyRequested(trigger) => self.copy(trigger, host),
            UiEvent::CopyAckExpired { generation } => {
                if generation == self.ack_generation {
                    self.copy_acknowledged = false;
                }
            }
            UiEvent::Close => {
                tracing::debug!("closing window");
                host.close();
            }
        }
    }

    fn submit(&mut self, host: &mut impl Host) {
        let superseded = self.state.in_flight();
        let Some(submission) = self.state.submit() else {
            return;
        };

        if let Some(previous) = superseded {
            tracing::debug!(previous, "request superseded, its result will be dropped");
        }
        tracing::info!(sequence = submission.sequence, "submitting query");

        self.copy_acknowledged = false;
        host.show_response(&[]);

        let sequence = submission.sequence;
        let request = ChatRequest::from_config(&self.api, &submission.query);
        let work = self.dispatcher.dispatch(request);
        host.run_on_ui_thread(Box::pin(async move {
            UiEvent::Completed {
                sequence,
                outcome: work.await,
            }
        }));

        self.relayout(host);
    }

    fn complete(&mut self, sequence: u64, outcome: ChatOutcome, host: &mut impl Host) {
        if !self.state.complete(sequence, &outcome) {
            tracing::debug!(
                sequence,
                latest = ?self.state.in_flight(),
                "discarding stale completion"
            );
            return;
        }

        tracing::debug!(
            sequence,
            length = self.state.response_text.len(),
            status = ?self.state.status,
            "updating response"
        );

        let segments = renderer::render(&outcome, self.render_mode);
        host.show_response(&segments);
        self.relayout(host);
    }

    fn copy(&mut self, trigger: CopyTrigger, host: &mut impl Host) {
        if !self.state.copy_button_visible() {
            return;
        }
        if !clipboard::copy(host, &trigger, &self.state.response_text) {
            return;
        }

        self.ack_generation += 1;
        self.copy_acknowledged = true;
        host.schedule_after(
            ACK_DURATION,
            UiEvent::CopyAckExpired {
                generation: self.ack_generation,
            },
        );
    }

    fn relayout(&mut self, host: &mut impl Host) {
        let geometry = self.sizing.compute_size(&self.state, self.input_line_count);
        if self.geometry != Some(geometry) {
            self.geometry = Some(geometry);
            host.resize(geometry);
        }
    }
}
