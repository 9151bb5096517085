//! Opus encoding, isolated from the capture/control path
//!
//! [`encoder::VoiceEncoder`] holds the actual codec state; it is owned
//! exclusively by the [`worker::EncoderWorker`] thread so encoding cost
//! never blocks frame capture or the UI-facing control path.

pub mod encoder;
pub mod worker;

pub use encoder::VoiceEncoder;
pub use worker::{EncodeRequest, EncoderCommand, EncoderReply, EncoderWorker};
