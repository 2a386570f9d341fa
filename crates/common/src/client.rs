use async_trait::async_trait;

use crate::{
    error::Result,
    types::{InboundMessage, MediaPayload},
};

/// Seam for the external chat-protocol client.
///
/// The real client (session auth, QR pairing, transport) runs outside this
/// process; the gateway's send endpoint and the dispatcher only ever talk
/// to it through this trait, which keeps both testable with injected fakes.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Whether the underlying session is paired and connected.
    async fn is_ready(&self) -> bool;

    /// Fetch the media attachment of a message.
    ///
    /// `Ok(None)` means the transport reported no media for a message that
    /// claimed to have some; callers treat that as a download failure.
    async fn download_media(&self, msg: &InboundMessage) -> Result<Option<MediaPayload>>;

    /// Reply to the chat/thread that `msg` arrived on.
    async fn reply(&self, msg: &InboundMessage, text: &str) -> Result<()>;

    /// Send a text message to an arbitrary chat id.
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<()>;
}
