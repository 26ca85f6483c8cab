//! # Result Rendering
//!
//! The client-side view model: what the result panel shows at any moment,
//! and the rule for which upload gets to decide it.
//!
//! ## Render States:
//! - `Idle`: nothing selected yet, the panel is empty
//! - `Loading`: an upload is in flight, show the pending message
//! - `Success`: show the transcript (or a fallback when it is blank)
//! - `Error`: show the failure with a troubleshooting checklist
//!
//! Every transition into a final state goes through [`ResultPanel::present`]
//! with the ticket issued for that upload. A newer upload supersedes older
//! pending ones, so a slow first response can never overwrite the outcome of
//! a later selection.

/// Message shown while an upload is in flight.
pub const LOADING_MESSAGE: &str = "Processing audio with AI...";

/// Shown in place of a transcript that came back empty or whitespace.
pub const EMPTY_TRANSCRIPT_FALLBACK: &str = "No transcript generated.";

/// Fixed checklist appended to every error render.
pub const TROUBLESHOOTING_CHECKLIST: &str = "Please check that:\n\
- the file is a supported audio format (MP3, WAV, M4A, FLAC, OGG, WEBM)\n\
- the file is smaller than 25MB\n\
- your internet connection is working";

/// What the result panel is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading,
    /// Transcript text as the server sent it, possibly empty.
    Success(String),
    /// The failure message, without the troubleshooting boilerplate.
    Error(String),
}

impl ViewState {
    pub fn label(&self) -> &'static str {
        match self {
            ViewState::Idle => "idle",
            ViewState::Loading => "loading",
            ViewState::Success(_) => "success",
            ViewState::Error(_) => "error",
        }
    }

    /// Text the panel displays for this state. `None` means the panel
    /// stays empty.
    pub fn render(&self) -> Option<String> {
        match self {
            ViewState::Idle => None,
            ViewState::Loading => Some(LOADING_MESSAGE.to_string()),
            ViewState::Success(text) if text.trim().is_empty() => {
                Some(EMPTY_TRANSCRIPT_FALLBACK.to_string())
            }
            ViewState::Success(text) => Some(text.clone()),
            ViewState::Error(message) => Some(format!(
                "Transcription failed: {}\n\n{}",
                message, TROUBLESHOOTING_CHECKLIST
            )),
        }
    }
}

/// Identifies one upload attempt. Later tickets supersede earlier ones.
pub type UploadTicket = u64;

/// The panel itself: current state plus the newest issued ticket.
///
/// Uploads are superseded, not cancelled. An old request keeps running, but
/// its outcome is dropped at presentation time when a newer ticket exists.
#[derive(Debug)]
pub struct ResultPanel {
    state: ViewState,
    latest_ticket: UploadTicket,
}

impl ResultPanel {
    pub fn new() -> Self {
        Self {
            state: ViewState::Idle,
            latest_ticket: 0,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Start a new upload: switch to `Loading` and issue a ticket that
    /// supersedes every earlier one.
    pub fn begin_upload(&mut self) -> UploadTicket {
        self.latest_ticket += 1;
        self.state = ViewState::Loading;
        self.latest_ticket
    }

    /// The single transition point into a final state.
    ///
    /// Returns `true` when the outcome was accepted. A stale ticket leaves
    /// the panel untouched and returns `false`.
    pub fn present(&mut self, ticket: UploadTicket, outcome: ViewState) -> bool {
        if ticket != self.latest_ticket {
            return false;
        }
        self.state = outcome;
        true
    }
}

impl Default for ResultPanel {
    fn default() -> Self {
        Self::new()
    }
}
