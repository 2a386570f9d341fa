//! Webhook relay to the backend service.
//!
//! Two encodings for the same `POST {base}/webhook` endpoint: JSON for text
//! messages, multipart form for transcoded audio. Both normalize the
//! backend's reply to `Option<String>` at this boundary; failures are
//! logged here and surface to the dispatcher as "no reply", since backend
//! unavailability must never crash the inbound path.

mod error;

pub use error::{Error, Result};

use std::{path::Path, time::Duration};

use {
    reqwest::multipart::{Form, Part},
    serde::{Deserialize, Serialize},
    tracing::{debug, warn},
};

use zaprelay_common::Config;

/// HTTP client for the backend webhook.
#[derive(Debug, Clone)]
pub struct BackendRelay {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

/// JSON body for the text path.
#[derive(Debug, Serialize)]
struct TextPayload<'a> {
    from: &'a str,
    body: &'a str,
    timestamp: i64,
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Backend response envelope.
///
/// The reply string shows up either flat (`{"response": "..."}`) or nested
/// one level (`{"response": {"response": "..."}}`) depending on which path
/// the backend took; both shapes are accepted on both encodings.
#[derive(Debug, Deserialize)]
struct WebhookReply {
    #[serde(default)]
    response: Option<ReplyField>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplyField {
    Text(String),
    Nested {
        #[serde(default)]
        response: Option<String>,
    },
}

impl WebhookReply {
    /// Normalize to `Option<String>`; an empty reply string means no reply.
    fn into_reply(self) -> Option<String> {
        let text = match self.response? {
            ReplyField::Text(text) => text,
            ReplyField::Nested { response } => response?,
        };
        if text.is_empty() { None } else { Some(text) }
    }
}

impl BackendRelay {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_options(&config.backend_url, config.request_timeout)
    }

    #[must_use]
    pub fn with_options(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn webhook_url(&self) -> String {
        format!("{}/webhook", self.base_url)
    }

    /// Relay a text message. Returns the backend's reply, or `None` when
    /// there is none or the call failed (failure is logged, not raised).
    pub async fn relay_text(&self, sender: &str, body: &str, timestamp: i64) -> Option<String> {
        match self.try_relay_text(sender, body, timestamp).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(sender, error = %e, "text relay to backend failed");
                None
            },
        }
    }

    /// Relay a transcoded audio file as a multipart form. Same semantics as
    /// [`Self::relay_text`]; the file is not deleted here, temp-file
    /// lifecycle belongs to the caller.
    pub async fn relay_audio(
        &self,
        sender: &str,
        timestamp: i64,
        file_path: &Path,
    ) -> Option<String> {
        match self.try_relay_audio(sender, timestamp, file_path).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(sender, error = %e, "audio relay to backend failed");
                None
            },
        }
    }

    async fn try_relay_text(
        &self,
        sender: &str,
        body: &str,
        timestamp: i64,
    ) -> Result<Option<String>> {
        let payload = TextPayload {
            from: sender,
            body,
            timestamp,
            kind: "chat",
        };

        let response = self
            .client
            .post(self.webhook_url())
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await?;

        Self::extract_reply(response).await
    }

    async fn try_relay_audio(
        &self,
        sender: &str,
        timestamp: i64,
        file_path: &Path,
    ) -> Result<Option<String>> {
        let bytes = tokio::fs::read(file_path).await?;
        let file_name = file_path
            .file_name()
            .map_or_else(|| "audio.ogg".to_string(), |n| n.to_string_lossy().into());

        let file_part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/ogg")?;

        let form = Form::new()
            .text("from", sender.to_string())
            .text("message_type", "audio")
            .text("timestamp", timestamp.to_string())
            .part("audio_file", file_part);

        let response = self
            .client
            .post(self.webhook_url())
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await?;

        Self::extract_reply(response).await
    }

    /// Shared normalization of the backend response to `Option<String>`.
    async fn extract_reply(response: reqwest::Response) -> Result<Option<String>> {
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status { status });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            debug!("backend returned empty body, no reply");
            return Ok(None);
        }

        let reply: WebhookReply = serde_json::from_str(&body)?;
        Ok(reply.into_reply())
    }
}
