//! Command-line uploader: the web page's upload flow without the browser.
//!
//! Prints the transcript to stdout; progress and errors go to stderr so the
//! output can be piped.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use comedy_transcription::contract::AudioClip;
use comedy_transcription::upload::{ApiClient, UploadController};
use comedy_transcription::view::{self, ViewState};

#[derive(Parser)]
#[command(name = "transcribe")]
#[command(version)]
#[command(about = "Upload an audio clip and print its transcript")]
struct Cli {
    /// Audio file to transcribe (MP3, WAV, M4A, FLAC, OGG, WEBM)
    file: PathBuf,

    /// Base URL of the transcription service
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server: String,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comedy_transcription=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let clip = AudioClip::from_path(&cli.file)?;

    let controller = UploadController::new(ApiClient::new(cli.server));

    eprintln!("{}", view::LOADING_MESSAGE);
    let state = controller.select_file(Some(clip)).await;

    match &state {
        ViewState::Success(_) => {
            if let Some(text) = state.render() {
                println!("{}", text);
            }
            Ok(ExitCode::SUCCESS)
        }
        ViewState::Error(_) => {
            if let Some(text) = state.render() {
                eprintln!("{}", text);
            }
            Ok(ExitCode::FAILURE)
        }
        // select_file on a real file always resolves to a final state.
        ViewState::Idle | ViewState::Loading => Ok(ExitCode::SUCCESS),
    }
}
