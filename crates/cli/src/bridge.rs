//! HTTP adapter for the external chat bridge, the process that holds the
//! actual messaging session. The bridge exposes `/status`, `/send` and
//! `/media`; this client maps those onto the [`ChatClient`] trait.

use std::time::Duration;

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use zaprelay_common::{
    ChatClient, Config, Error, InboundMessage, MediaPayload, error::Result,
};

pub struct BridgeClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    quote_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct BridgeStatus {
    status: String,
}

#[derive(Serialize)]
struct MediaRequest<'a> {
    message_id: &'a str,
}

impl BridgeClient {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.bridge_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, chat_id: &str, text: &str, quote_id: Option<&str>) -> Result<()> {
        let response = self
            .client
            .post(self.url("/send"))
            .timeout(self.timeout)
            .json(&SendRequest {
                chat_id,
                text,
                quote_id,
            })
            .send()
            .await
            .map_err(|e| Error::external("bridge send", e))?;

        if !response.status().is_success() {
            return Err(Error::unavailable(format!(
                "bridge send returned status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatClient for BridgeClient {
    async fn is_ready(&self) -> bool {
        let response = match self
            .client
            .get(self.url("/status"))
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "bridge status probe failed");
                return false;
            },
        };
        if !response.status().is_success() {
            return false;
        }
        match response.json::<BridgeStatus>().await {
            Ok(status) => status.status == "ready",
            Err(e) => {
                debug!(error = %e, "bridge status body unreadable");
                false
            },
        }
    }

    async fn download_media(&self, msg: &InboundMessage) -> Result<Option<MediaPayload>> {
        let response = self
            .client
            .post(self.url("/media"))
            .timeout(self.timeout)
            .json(&MediaRequest {
                message_id: &msg.id,
            })
            .send()
            .await
            .map_err(|e| Error::external("bridge media fetch", e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::media_download(format!(
                "bridge returned status {}",
                response.status()
            )));
        }

        let payload = response
            .json::<MediaPayload>()
            .await
            .map_err(|e| Error::external("bridge media body", e))?;
        Ok(Some(payload))
    }

    async fn reply(&self, msg: &InboundMessage, text: &str) -> Result<()> {
        self.send(&msg.sender, text, Some(&msg.id)).await
    }

    async fn send_text(&self, chat_id: &str, text: &str) -> Result<()> {
        self.send(chat_id, text, None).await
    }
}
