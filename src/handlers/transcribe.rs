//! # Transcription Upload Handler
//!
//! The one operation this service exists for: accept an audio file as
//! multipart form data, run it through the transcription engine, and answer
//! with the transcript.
//!
//! ## Endpoint: `POST /api/transcribe`
//!
//! ## Request:
//! Multipart form data with the audio in a field named "file".
//!
//! ## Response:
//! ```json
//! {
//!   "filename": "set.mp3",
//!   "transcription": "so I told the heckler...",
//!   "language": "en",
//!   "success": true
//! }
//! ```
//!
//! Failures answer `{"detail": "..."}` with 400 for client mistakes, 413 for
//! oversized uploads, and 500 when the engine fails.

use crate::contract::{self, AudioClip, TranscriptionReply};
use crate::error::AppError;
use crate::state::AppState;
use actix_multipart::{Multipart, MultipartError};
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use tracing::{info, warn};
use uuid::Uuid;

pub async fn transcribe_audio(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let upload_id = Uuid::new_v4();
    let config = state.get_config();
    let max_bytes = config.upload.max_file_size_bytes();

    // Pull the audio part out of the form. Other fields are ignored.
    let mut clip: Option<AudioClip> = None;

    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(field) => field,
            // A form with no parts at all ends in Incomplete instead of a
            // clean end of stream. Report it as a missing file below.
            Err(MultipartError::Incomplete) if clip.is_none() => break,
            Err(e) => {
                return Err(AppError::BadRequest(format!(
                    "Malformed multipart payload: {}",
                    e
                )))
            }
        };

        let (name, filename) = {
            let disposition = match field.content_disposition() {
                Some(disposition) => disposition,
                None => continue,
            };
            (
                disposition.get_name().map(str::to_string),
                disposition.get_filename().map(str::to_string),
            )
        };

        if name.as_deref() != Some(contract::FILE_FIELD) {
            continue;
        }

        let mime_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk
                .map_err(|e| AppError::BadRequest(format!("Failed reading upload: {}", e)))?;
            if bytes.len() + chunk.len() > max_bytes {
                return Err(AppError::PayloadTooLarge(format!(
                    "File too large: maximum upload size is {} MB",
                    config.upload.max_file_size_mb
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        clip = Some(AudioClip::new(
            filename.unwrap_or_else(|| "upload".to_string()),
            mime_type,
            bytes,
        ));
    }

    let clip = clip.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    if !clip.is_supported_audio(&config.upload.allowed_extensions) {
        return Err(AppError::BadRequest(format!(
            "Invalid file type. Please upload an audio file ({})",
            config.upload.extension_summary()
        )));
    }

    if clip.bytes.is_empty() {
        return Err(AppError::BadRequest("File is empty".to_string()));
    }

    info!(
        upload_id = %upload_id,
        filename = %clip.filename,
        mime_type = %clip.mime_type,
        size_bytes = clip.size_bytes(),
        "Processing upload"
    );

    state.begin_transcription();
    let result = state.transcriber().transcribe(&clip).await;
    state.finish_transcription(result.is_ok());

    let transcript = result.map_err(|e| {
        warn!(upload_id = %upload_id, error = %e, "Transcription failed");
        AppError::Transcription(format!("Transcription failed: {}", e))
    })?;

    info!(
        upload_id = %upload_id,
        language = %transcript.language,
        transcript_chars = transcript.text.len(),
        "Transcription completed"
    );

    Ok(HttpResponse::Ok().json(TranscriptionReply {
        filename: clip.filename,
        transcription: transcript.text,
        language: transcript.language,
        success: true,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::transcriber::{Transcript, Transcriber};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct FixedTranscriber {
        text: &'static str,
        language: &'static str,
    }

    #[async_trait]
    impl Transcriber for FixedTranscriber {
        fn describe(&self) -> String {
            "fixed test engine".to_string()
        }

        async fn transcribe(&self, _clip: &AudioClip) -> anyhow::Result<Transcript> {
            Ok(Transcript {
                text: self.text.to_string(),
                language: self.language.to_string(),
            })
        }
    }

    struct FailingTranscriber;

    #[async_trait]
    impl Transcriber for FailingTranscriber {
        fn describe(&self) -> String {
            "failing test engine".to_string()
        }

        async fn transcribe(&self, _clip: &AudioClip) -> anyhow::Result<Transcript> {
            Err(anyhow!("engine exploded"))
        }
    }

    fn ok_state() -> AppState {
        AppState::new(
            AppConfig::default(),
            Arc::new(FixedTranscriber {
                text: "hello world",
                language: "en",
            }),
        )
    }

    const BOUNDARY: &str = "a8c7e1b2d94f4f76b1f2c3a4d5e6f708";

    /// Build a multipart body with a single part.
    fn part_body(name: &str, filename: Option<&str>, mime: Option<&str>, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n", name).as_bytes(),
            ),
        }
        if let Some(mime) = mime {
            body.extend_from_slice(format!("Content-Type: {}\r\n", mime).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn content_type() -> (&'static str, String) {
        (
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
    }

    async fn post_upload(
        state: AppState,
        body: Vec<u8>,
    ) -> (StatusCode, serde_json::Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::handlers::routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/transcribe")
            .insert_header(content_type())
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: serde_json::Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn test_valid_upload_returns_transcript() {
        let state = ok_state();
        let body = part_body("file", Some("set.mp3"), Some("audio/mpeg"), b"mp3 bytes");

        let (status, json) = post_upload(state.clone(), body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["filename"], "set.mp3");
        assert_eq!(json["transcription"], "hello world");
        assert_eq!(json["language"], "en");
        assert_eq!(json["success"], true);

        let metrics = state.get_metrics_snapshot();
        assert_eq!(metrics.transcriptions_completed, 1);
        assert_eq!(metrics.inflight_transcriptions, 0);
    }

    #[actix_web::test]
    async fn test_missing_file_part_is_rejected() {
        let body = part_body("note", None, None, b"not audio");
        let (status, json) = post_upload(ok_state(), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "No file uploaded");
    }

    #[actix_web::test]
    async fn test_empty_form_is_rejected() {
        let body = format!("--{}--\r\n", BOUNDARY).into_bytes();
        let (status, json) = post_upload(ok_state(), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "No file uploaded");
    }

    #[actix_web::test]
    async fn test_truncated_form_reports_malformed_payload() {
        // A complete file part followed by a dangling part opener and EOF.
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"file\"; filename=\"set.mp3\"\r\n",
        );
        body.extend_from_slice(b"Content-Type: audio/mpeg\r\n\r\nmp3 bytes\r\n");
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());

        let (status, json) = post_upload(ok_state(), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["detail"]
            .as_str()
            .unwrap()
            .starts_with("Malformed multipart payload"));
    }

    #[actix_web::test]
    async fn test_empty_file_is_rejected() {
        let body = part_body("file", Some("silent.mp3"), Some("audio/mpeg"), b"");
        let (status, json) = post_upload(ok_state(), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "File is empty");
    }

    #[actix_web::test]
    async fn test_unsupported_type_is_rejected() {
        let body = part_body("file", Some("notes.txt"), Some("text/plain"), b"words");
        let (status, json) = post_upload(ok_state(), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["detail"],
            "Invalid file type. Please upload an audio file (MP3, WAV, M4A, FLAC, OGG, WEBM)"
        );
    }

    #[actix_web::test]
    async fn test_empty_file_of_wrong_type_reports_the_type() {
        let body = part_body("file", Some("notes.txt"), Some("text/plain"), b"");
        let (status, json) = post_upload(ok_state(), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["detail"]
            .as_str()
            .unwrap()
            .starts_with("Invalid file type"));
    }

    #[actix_web::test]
    async fn test_audio_mime_bypasses_extension_check() {
        let body = part_body("file", Some("capture.blob"), Some("audio/webm"), b"opus");
        let (status, json) = post_upload(ok_state(), body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["transcription"], "hello world");
    }

    #[actix_web::test]
    async fn test_allowed_extension_bypasses_mime_check() {
        let body = part_body(
            "file",
            Some("set.FLAC"),
            Some("application/octet-stream"),
            b"flac bytes",
        );
        let (status, _) = post_upload(ok_state(), body).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_oversized_upload_is_rejected_with_413() {
        let mut config = AppConfig::default();
        config.upload.max_file_size_mb = 1;
        let state = AppState::new(
            config,
            Arc::new(FixedTranscriber {
                text: "unreachable",
                language: "en",
            }),
        );

        let data = vec![0u8; 1024 * 1024 + 1024];
        let body = part_body("file", Some("long-set.mp3"), Some("audio/mpeg"), &data);
        let (status, json) = post_upload(state, body).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            json["detail"],
            "File too large: maximum upload size is 1 MB"
        );
    }

    #[actix_web::test]
    async fn test_engine_failure_maps_to_500_with_detail() {
        let state = AppState::new(AppConfig::default(), Arc::new(FailingTranscriber));
        let body = part_body("file", Some("set.mp3"), Some("audio/mpeg"), b"mp3 bytes");

        let (status, json) = post_upload(state.clone(), body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["detail"], "Transcription failed: engine exploded");

        let metrics = state.get_metrics_snapshot();
        assert_eq!(metrics.transcriptions_failed, 1);
        assert_eq!(metrics.inflight_transcriptions, 0);
    }

    #[actix_web::test]
    async fn test_file_part_wins_over_other_fields() {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"note\"\r\n\r\nhi\r\n");
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"file\"; filename=\"set.wav\"\r\n",
        );
        body.extend_from_slice(b"Content-Type: audio/wav\r\n\r\nwav bytes\r\n");
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let (status, json) = post_upload(ok_state(), body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["filename"], "set.wav");
    }
}
