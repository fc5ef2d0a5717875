use crate::dispatcher::ChatOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

/// A query accepted by [`SessionState::submit`], tagged with the sequence
/// number its outcome must carry to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub sequence: u64,
    pub query: String,
}

/// Everything the window shows, owned by the UI thread.
///
/// `status == Pending` exactly when `in_flight` holds the sequence number of
/// the submission whose outcome is awaited. Outcomes for any other sequence
/// number are stale and get dropped, so the latest submission always wins.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub input_text: String,
    pub response_text: String,
    pub status: Status,
    pub last_error_message: Option<String>,
    in_flight: Option<u64>,
    next_sequence: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, text: String) {
        self.input_text = text;
    }

    /// Moves to `Pending` for the current input. Blank input is ignored.
    ///
    /// Submitting while a request is already in flight is allowed; the
    /// earlier request becomes stale.
    pub fn submit(&mut self) -> Option<Submission> {
        if self.input_text.trim().is_empty() {
            return None;
        }

        self.next_sequence += 1;
        let sequence = self.next_sequence;

        self.response_text.clear();
        self.last_error_message = None;
        self.status = Status::Pending;
        self.in_flight = Some(sequence);

        Some(Submission {
            sequence,
            query: self.input_text.clone(),
        })
    }

    /// Applies the outcome of submission `sequence`. Returns `false` when the
    /// outcome is stale and the state was left untouched.
    pub fn complete(&mut self, sequence: u64, outcome: &ChatOutcome) -> bool {
        if self.in_flight != Some(sequence) {
            return false;
        }

        self.in_flight = None;
        match outcome {
            ChatOutcome::Success(content) => {
                self.status = Status::Success;
                self.response_text = content.clone();
            }
            ChatOutcome::Failure(message) => {
                self.status = Status::Error;
                self.response_text = message.clone();
                self.last_error_message = Some(message.clone());
            }
        }
        true
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    pub fn is_pending(&self) -> bool {
        self.status == Status::Pending
    }

    /// The answer pane appears on the first submission and stays afterwards.
    pub fn response_pane_visible(&self) -> bool {
        self.status != Status::Idle || !self.response_text.is_empty()
    }

    pub fn copy_button_visible(&self) -> bool {
        !self.response_text.is_empty() && !self.is_pending()
    }
}
