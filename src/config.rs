//! # Configuration Management
//!
//! Loads application configuration from multiple sources:
//! - TOML configuration file (config.toml)
//! - Environment variables (with APP_ prefix)
//! - Default values (built into the code)
//!
//! ## Configuration Priority (highest to lowest):
//! 1. Environment variables (APP_SERVER_HOST, APP_ENGINE_ENDPOINT, etc.)
//! 2. Configuration file (config.toml)
//! 3. Default values (defined in the Default impl)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

use crate::contract;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub engine: EngineConfig,
}

/// Server bind settings.
///
/// ## Common values:
/// - `host = "127.0.0.1"`: Only accept connections from localhost (development)
/// - `host = "0.0.0.0"`: Accept connections from any IP address (deployment)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Upload acceptance rules.
///
/// ## Fields:
/// - `max_file_size_mb`: Hard cap on a single upload; requests over it get 413
/// - `allowed_extensions`: Filename extensions accepted when the part's MIME
///   type is not `audio/*`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_file_size_mb: usize,
    pub allowed_extensions: Vec<String>,
}

impl UploadConfig {
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }

    /// The extension list the way user-facing messages spell it,
    /// e.g. `MP3, WAV, M4A, FLAC, OGG, WEBM`.
    pub fn extension_summary(&self) -> String {
        self.allowed_extensions
            .iter()
            .map(|ext| ext.to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Where transcription actually happens.
///
/// The service does not run inference itself; it forwards the audio to a
/// Whisper-compatible HTTP endpoint and relays the transcript back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub endpoint: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            upload: UploadConfig {
                max_file_size_mb: 25,
                allowed_extensions: contract::ALLOWED_EXTENSIONS
                    .iter()
                    .map(|ext| ext.to_string())
                    .collect(),
            },
            engine: EngineConfig {
                endpoint: "http://127.0.0.1:9090/transcribe".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, then config.toml, then environment.
    ///
    /// ## Environment Variable Examples:
    /// - `APP_SERVER_HOST=0.0.0.0`: Override server host
    /// - `APP_SERVER_PORT=3000`: Override server port
    /// - `APP_ENGINE_ENDPOINT=http://whisper:9090/transcribe`: Override engine
    /// - `HOST` / `PORT`: Special cases for deployment platforms
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("_"));

        // Deployment platforms export bare HOST/PORT without the APP_ prefix.
        if let Ok(host) = env::var("HOST") {
            settings = settings.set_override("server.host", host)?;
        }

        if let Ok(port) = env::var("PORT") {
            settings = settings.set_override("server.port", port)?;
        }

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate that the configuration values make sense.
    ///
    /// ## What this checks:
    /// - Server port is not 0
    /// - The upload size cap allows at least one megabyte
    /// - At least one filename extension is accepted
    /// - The engine endpoint is an http(s) URL
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.upload.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("Upload size cap must be at least 1 MB"));
        }

        if self.upload.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "At least one allowed audio extension is required"
            ));
        }

        if !self.engine.endpoint.starts_with("http://")
            && !self.engine.endpoint.starts_with("https://")
        {
            return Err(anyhow::anyhow!(
                "Engine endpoint must be an http:// or https:// URL, got '{}'",
                self.engine.endpoint
            ));
        }

        Ok(())
    }
}
