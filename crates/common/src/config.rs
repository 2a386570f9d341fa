use std::{path::PathBuf, time::Duration};

use tracing::warn;

/// Default backend webhook base URL.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Default chat bridge base URL.
pub const DEFAULT_BRIDGE_URL: &str = "http://localhost:3001";

/// Runtime configuration, read once from the environment at startup and
/// passed into components explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend webhook base URL (`BACKEND_URL`).
    pub backend_url: String,
    /// Sole authorized sender, normalized number without the platform
    /// suffix (`ALLOWED_NUMBER`). Unset means everyone is allowed.
    pub allowed_number: Option<String>,
    /// Scratch directory for transcoding temp files (`SCRATCH_DIR`).
    pub scratch_dir: PathBuf,
    /// Audio tempo multiplier (`AUDIO_TEMPO`).
    pub tempo: f32,
    /// Explicit ffmpeg binary path (`FFMPEG_PATH`); PATH lookup otherwise.
    pub ffmpeg_path: Option<String>,
    /// External chat bridge base URL (`CHAT_BRIDGE_URL`).
    pub bridge_url: String,
    /// Gateway listen port (`PORT`).
    pub port: u16,
    /// Timeout for relay HTTP calls (`REQUEST_TIMEOUT_SECS`).
    pub request_timeout: Duration,
    /// Timeout for one ffmpeg invocation (`TRANSCODE_TIMEOUT_SECS`).
    pub transcode_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.into(),
            allowed_number: None,
            scratch_dir: PathBuf::from("temp"),
            tempo: 1.25,
            ffmpeg_path: None,
            bridge_url: DEFAULT_BRIDGE_URL.into(),
            port: 3000,
            request_timeout: Duration::from_secs(30),
            transcode_timeout: Duration::from_secs(60),
        }
    }
}

impl Config {
    /// Build a config from the process environment.
    ///
    /// Unset variables fall back to defaults; unparseable numeric values
    /// are logged and ignored rather than aborting startup.
    #[must_use]
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(url) = std::env::var("BACKEND_URL") {
            cfg.backend_url = url;
        }
        if let Ok(number) = std::env::var("ALLOWED_NUMBER")
            && !number.is_empty()
        {
            cfg.allowed_number = Some(number);
        }
        if let Ok(dir) = std::env::var("SCRATCH_DIR") {
            cfg.scratch_dir = PathBuf::from(dir);
        }
        if let Ok(path) = std::env::var("FFMPEG_PATH") {
            cfg.ffmpeg_path = Some(path);
        }
        if let Ok(url) = std::env::var("CHAT_BRIDGE_URL") {
            cfg.bridge_url = url;
        }
        if let Some(tempo) = parse_env("AUDIO_TEMPO") {
            cfg.tempo = tempo;
        }
        if let Some(port) = parse_env("PORT") {
            cfg.port = port;
        }
        if let Some(secs) = parse_env("REQUEST_TIMEOUT_SECS") {
            cfg.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_env("TRANSCODE_TIMEOUT_SECS") {
            cfg.transcode_timeout = Duration::from_secs(secs);
        }

        cfg
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "ignoring unparseable env value");
            None
        },
    }
}
