//! # Upload Client
//!
//! The client half of the prototype: takes a selected audio file, posts it to
//! the service, and drives the result panel through its states.
//!
//! ## Key Responsibilities:
//! - [`ApiClient`]: one multipart `POST /api/transcribe` per selection, with
//!   server rejections and transport failures kept apart
//! - [`UploadController`]: the file-selection entry point; issues a ticket
//!   per upload and presents only the newest outcome
//!
//! Requests carry no timeout. An upload waits until the server answers or
//! the transport itself gives up.

use std::fmt;
use std::sync::Mutex;

use tracing::debug;

use crate::contract::{self, AudioClip, ErrorBody, TranscriptionReply};
use crate::view::{ResultPanel, ViewState};

/// Why an upload produced no transcript.
#[derive(Debug)]
pub enum UploadError {
    /// No usable HTTP response: connection refused, DNS failure, or a 2xx
    /// body that could not be decoded.
    Transport(reqwest::Error),

    /// The server answered with a non-2xx status.
    Rejected {
        status: u16,
        status_text: String,
        detail: Option<String>,
    },
}

impl UploadError {
    /// The message interpolated into the error render, e.g.
    /// `400 Bad Request: File is empty` or `Unknown error` fallbacks for
    /// rejections whose body carried no detail.
    pub fn message(&self) -> String {
        match self {
            UploadError::Transport(err) => err.to_string(),
            UploadError::Rejected {
                status,
                status_text,
                detail,
            } => format!(
                "{} {}: {}",
                status,
                status_text,
                detail.as_deref().unwrap_or("Unknown error")
            ),
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UploadError::Transport(err) => Some(err),
            UploadError::Rejected { .. } => None,
        }
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        UploadError::Transport(err)
    }
}

/// HTTP client for the transcription endpoint.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// `base_url` is the service origin, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn transcribe_url(&self) -> String {
        format!("{}{}", self.base_url, contract::TRANSCRIBE_PATH)
    }

    /// Upload one clip and return the transcript text.
    ///
    /// A 2xx response yields the `transcription` field, whatever the rest of
    /// the body looks like. A non-2xx response becomes [`UploadError::Rejected`]
    /// with the `detail` field when the body carries one.
    pub async fn upload(&self, clip: &AudioClip) -> Result<String, UploadError> {
        let part = reqwest::multipart::Part::bytes(clip.bytes.clone())
            .file_name(clip.filename.clone())
            .mime_str(&clip.mime_type)?;
        let form = reqwest::multipart::Form::new().part(contract::FILE_FIELD, part);

        let response = self
            .http
            .post(self.transcribe_url())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Tolerate foreign error bodies: a gateway 502 page is not JSON.
            let body: ErrorBody = response.json().await.unwrap_or_default();
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                detail: body.detail,
            });
        }

        let reply: TranscriptionReply = response.json().await?;
        Ok(reply.transcription)
    }
}

/// Drives the result panel from file selections.
pub struct UploadController {
    client: ApiClient,
    panel: Mutex<ResultPanel>,
}

impl UploadController {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            panel: Mutex::new(ResultPanel::new()),
        }
    }

    /// Snapshot of what the panel currently shows.
    pub fn view(&self) -> ViewState {
        self.panel.lock().unwrap().state().clone()
    }

    /// Handle a file selection.
    ///
    /// `None` means the file dialog was cancelled: no request is made and the
    /// panel keeps its state. A `Some` selection flips the panel to loading,
    /// uploads the clip, and presents the outcome under the ticket issued at
    /// the start, so a newer selection supersedes this one.
    ///
    /// Returns the panel state after the attempt resolved.
    pub async fn select_file(&self, selection: Option<AudioClip>) -> ViewState {
        let Some(clip) = selection else {
            return self.view();
        };

        let ticket = self.panel.lock().unwrap().begin_upload();
        debug!(
            ticket,
            filename = %clip.filename,
            size_bytes = clip.size_bytes(),
            "Upload started"
        );

        let outcome = match self.client.upload(&clip).await {
            Ok(text) => ViewState::Success(text),
            Err(err) => ViewState::Error(err.message()),
        };

        let mut panel = self.panel.lock().unwrap();
        let accepted = panel.present(ticket, outcome);
        debug!(
            ticket,
            accepted,
            state = panel.state().label(),
            "Upload resolved"
        );
        panel.state().clone()
    }
}
