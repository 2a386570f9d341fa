//! Per-message dispatch: access filtering, type branching, audio
//! transcode-and-relay with guaranteed temp-file cleanup, and reply
//! delivery.
//!
//! Each inbound message runs as an independent task; there is no state
//! shared across messages and no ordering guarantee between them. Every
//! error inside one message's processing is contained at the dispatch
//! boundary, so a failing message never affects the next one.

pub mod access;
mod dispatcher;

pub use dispatcher::{Dispatcher, Error, Outcome};
