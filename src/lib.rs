//! # Comedy Transcription
//!
//! A minimal audio-to-transcript pipeline in two halves:
//!
//! - a server (`comedy-transcription`) that accepts one audio upload on
//!   `POST /api/transcribe`, forwards it to a transcription engine, and
//!   answers with the transcript
//! - a client (`transcribe`) that uploads a file and renders the result the
//!   way the web page does: loading, transcript, or a troubleshooting error
//!
//! Both halves share the [`contract`] module, so the multipart field name,
//! the endpoint path, and the response shapes can never drift apart.

pub mod config;
pub mod contract;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod state;
pub mod transcriber;
pub mod upload;
pub mod view;
