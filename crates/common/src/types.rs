use serde::{Deserialize, Serialize};

/// Platform message type, as reported by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Plain text message.
    Chat,
    /// Push-to-talk voice note.
    #[serde(rename = "ptt")]
    Voice,
    /// Audio file attachment.
    Audio,
    /// Anything else (images, stickers, locations, ...); never relayed.
    #[serde(other)]
    Other,
}

impl MessageKind {
    /// Whether this kind carries relayable audio (when media is present).
    #[must_use]
    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Voice | Self::Audio)
    }
}

/// One received chat event, read-only to the relay core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Opaque unique message id. Also namespaces transcoding temp files,
    /// so uniqueness matters beyond dedup.
    pub id: String,
    /// Opaque chat-participant identifier, platform suffix included
    /// (e.g. `5511999999999@c.us`).
    pub sender: String,
    /// Text content; empty for media messages.
    #[serde(default)]
    pub body: String,
    pub kind: MessageKind,
    /// Seconds since epoch, as reported by the source platform.
    pub timestamp: i64,
    #[serde(default)]
    pub has_media: bool,
}

impl InboundMessage {
    /// True for plain text messages that take the JSON relay path.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.kind == MessageKind::Chat && !self.has_media
    }

    /// True for media-bearing voice/audio messages that take the
    /// transcode-then-multipart path.
    #[must_use]
    pub fn is_voice(&self) -> bool {
        self.has_media && self.kind.is_audio()
    }
}

/// A downloaded media attachment.
///
/// `data` is the base64 payload exactly as the transport hands it over;
/// decoding happens at the point of use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaPayload {
    pub data: String,
    pub mime_type: String,
}
