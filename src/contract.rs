//! # Wire Contract
//!
//! The typed request/response schema shared by the upload client and the
//! HTTP service. Both binaries compile against this module, so a field
//! rename or a path change breaks at compile time instead of at runtime.
//!
//! ## Key Responsibilities:
//! - Fix the endpoint path and the multipart field name in one place
//! - Describe the success body (`TranscriptionReply`) and the error body
//!   (`ErrorBody`) exactly as they appear on the wire
//! - Carry the audio payload (`AudioClip`) with enough metadata to
//!   validate it on either side of the connection

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contract revision reported by `/health`. Bump when the wire shape changes.
pub const VERSION: &str = "v1";

/// The single upload endpoint.
pub const TRANSCRIBE_PATH: &str = "/api/transcribe";

/// Multipart field name carrying the audio bytes.
pub const FILE_FIELD: &str = "file";

/// Extensions accepted when the part's MIME type is not `audio/*`.
pub const ALLOWED_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "flac", "ogg", "webm"];

/// One audio file selected for upload: name, declared MIME type, raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl AudioClip {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a clip from disk, deriving the MIME type from the extension.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read audio file {}", path.display()))?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();
        let mime_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(mime_for_extension)
            .unwrap_or("application/octet-stream")
            .to_string();
        Ok(Self {
            filename,
            mime_type,
            bytes,
        })
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Lowercased filename extension, if there is one.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.filename.rsplit_once('.')?;
        if ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Accepts the clip when the declared MIME type is `audio/*`, or when the
    /// filename extension is on the allowed list. Browsers report unreliable
    /// MIME types for some containers, so the extension acts as a fallback.
    pub fn is_supported_audio(&self, allowed_extensions: &[String]) -> bool {
        if self.mime_type.starts_with("audio/") {
            return true;
        }
        match self.extension() {
            Some(ext) => allowed_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(&ext)),
            None => false,
        }
    }
}

/// MIME type for a filename extension, `application/octet-stream` when unknown.
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
}

/// Success body of `POST /api/transcribe`.
///
/// Deserialization treats every field as optional so the client keeps working
/// against servers that only send `transcription`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionReply {
    pub filename: String,
    pub transcription: String,
    pub language: String,
    pub success: bool,
}

/// Error body of every non-2xx response: `{"detail": "..."}`.
///
/// `detail` stays optional on the way in; foreign proxies and gateways answer
/// with bodies of their own and the client must not choke on them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub detail: Option<String>,
}
