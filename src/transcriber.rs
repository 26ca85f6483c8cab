//! # Transcription Engine Interface
//!
//! The seam between the HTTP service and whatever turns audio into text.
//!
//! ## Key Responsibilities:
//! - Define the [`Transcriber`] trait the upload handler calls
//! - Provide [`RemoteTranscriber`], which forwards audio to a
//!   Whisper-compatible HTTP endpoint and relays the transcript back
//!
//! The service deliberately owns no model weights and no audio decoding.
//! Inference runs behind the configured endpoint; swapping engines means
//! changing a URL, not recompiling.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::contract::{AudioClip, FILE_FIELD};

/// Output of one engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
    /// Language the engine detected, `"unknown"` when it reports none.
    pub language: String,
}

/// Anything that can turn an audio clip into a transcript.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Short human-readable engine identity, reported by `/health`.
    fn describe(&self) -> String;

    async fn transcribe(&self, clip: &AudioClip) -> Result<Transcript>;
}

/// Forwards clips to an external inference endpoint over HTTP.
///
/// The endpoint receives the same multipart shape the service accepts, so a
/// second instance of this service can act as the engine for a first.
pub struct RemoteTranscriber {
    endpoint: String,
    client: reqwest::Client,
}

impl RemoteTranscriber {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Transcriber for RemoteTranscriber {
    fn describe(&self) -> String {
        format!("remote engine at {}", self.endpoint)
    }

    async fn transcribe(&self, clip: &AudioClip) -> Result<Transcript> {
        debug!(
            endpoint = %self.endpoint,
            filename = %clip.filename,
            size_bytes = clip.size_bytes(),
            "Forwarding clip to inference endpoint"
        );

        let part = reqwest::multipart::Part::bytes(clip.bytes.clone())
            .file_name(clip.filename.clone())
            .mime_str(&clip.mime_type)
            .context("building multipart part for the inference request")?;
        let form = reqwest::multipart::Form::new().part(FILE_FIELD, part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("inference endpoint {} unreachable", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("inference endpoint returned {}: {}", status, body));
        }

        let reply: Value = response
            .json()
            .await
            .context("parsing the inference endpoint reply")?;

        // Engines differ on the transcript key. Whisper servers answer with
        // "text"; this service itself answers with "transcription".
        let text = reply
            .get("text")
            .or_else(|| reply.get("transcription"))
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("inference reply carries no transcript text"))?
            .to_string();

        let language = reply
            .get("language")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        Ok(Transcript { text, language })
    }
}
