//! Shared types and seams for the relay pipeline.
//!
//! The external chat-protocol client (session auth, QR pairing, transport)
//! lives outside this workspace; everything that talks to it goes through
//! the [`client::ChatClient`] trait.

pub mod client;
pub mod config;
pub mod error;
pub mod gating;
pub mod types;

pub use {
    client::ChatClient,
    config::Config,
    error::{Error, Result},
    types::{InboundMessage, MediaPayload, MessageKind},
};
