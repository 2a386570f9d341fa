use std::sync::Arc;

use tracing::{debug, error, info, warn};

use {
    zaprelay_common::{ChatClient, Config, InboundMessage},
    zaprelay_relay::BackendRelay,
    zaprelay_transcode::Transcoder,
};

use crate::access;

/// Terminal state of one message's processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Sender not authorized; no side effects.
    Dropped,
    /// Message type is not relayed (stickers, images, ...).
    Ignored,
    /// Processed to completion without a reply to deliver (including
    /// backend failures and undeliverable replies, both already logged).
    Done,
    /// Backend reply delivered to the originating chat.
    ReplySent,
    /// Processing aborted on a contained error (already logged).
    Failed,
}

/// Errors contained at the dispatch boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("media download failed for message {msg_id}: {reason}")]
    MediaDownload { msg_id: String, reason: String },

    #[error(transparent)]
    Transcode(#[from] zaprelay_transcode::Error),
}

/// The per-inbound-message decision logic.
pub struct Dispatcher {
    allowed_number: Option<String>,
    relay: BackendRelay,
    transcoder: Transcoder,
    client: Arc<dyn ChatClient>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(config: &Config, client: Arc<dyn ChatClient>) -> Self {
        Self::with_components(
            config.allowed_number.clone(),
            BackendRelay::new(config),
            Transcoder::new(config),
            client,
        )
    }

    /// Assemble from pre-built components (injection point for tests).
    #[must_use]
    pub fn with_components(
        allowed_number: Option<String>,
        relay: BackendRelay,
        transcoder: Transcoder,
        client: Arc<dyn ChatClient>,
    ) -> Self {
        Self {
            allowed_number,
            relay,
            transcoder,
            client,
        }
    }

    /// Process one inbound message to a terminal state.
    ///
    /// Never returns an error and never panics: anything that goes wrong is
    /// logged with the message id and reported as [`Outcome::Failed`], so
    /// in-flight handling of other messages is unaffected.
    pub async fn dispatch(&self, msg: &InboundMessage) -> Outcome {
        if let Err(reason) = access::check_access(self.allowed_number.as_deref(), &msg.sender) {
            info!(msg_id = %msg.id, sender = %msg.sender, %reason, "dropping message");
            return Outcome::Dropped;
        }

        let result = if msg.is_text() {
            self.handle_text(msg).await
        } else if msg.is_voice() {
            self.handle_audio(msg).await
        } else {
            debug!(msg_id = %msg.id, kind = ?msg.kind, "ignoring unsupported message type");
            return Outcome::Ignored;
        };

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(msg_id = %msg.id, error = %e, "message processing failed");
                Outcome::Failed
            },
        }
    }

    async fn handle_text(&self, msg: &InboundMessage) -> Result<Outcome, Error> {
        let reply = self
            .relay
            .relay_text(&msg.sender, &msg.body, msg.timestamp)
            .await;
        Ok(self.deliver(msg, reply).await)
    }

    async fn handle_audio(&self, msg: &InboundMessage) -> Result<Outcome, Error> {
        let media = self
            .client
            .download_media(msg)
            .await
            .map_err(|e| Error::MediaDownload {
                msg_id: msg.id.clone(),
                reason: e.to_string(),
            })?
            .ok_or_else(|| Error::MediaDownload {
                msg_id: msg.id.clone(),
                reason: "transport returned no media".into(),
            })?;

        // The transcoder removes its temp files itself when it fails.
        let output = self.transcoder.transcode(&media.data, &msg.id).await?;

        // relay_audio never raises; cleanup after it is unconditional.
        let reply = self
            .relay
            .relay_audio(&msg.sender, msg.timestamp, &output)
            .await;
        self.transcoder.cleanup(&msg.id).await;

        Ok(self.deliver(msg, reply).await)
    }

    /// Send a non-empty backend reply to the originating chat. Delivery
    /// failures are logged, not retried.
    async fn deliver(&self, msg: &InboundMessage, reply: Option<String>) -> Outcome {
        let Some(text) = reply else {
            return Outcome::Done;
        };
        match self.client.reply(msg, &text).await {
            Ok(()) => Outcome::ReplySent,
            Err(e) => {
                warn!(msg_id = %msg.id, error = %e, "failed to deliver reply");
                Outcome::Done
            },
        }
    }
}
