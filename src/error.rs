//! Error types for the voice client core
//!
//! Encoder and pipeline failures are kept distinct from capture failures so
//! the UI layer can tell "can't transmit" apart from "no microphone".

use thiserror::Error;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Encoder error: {0}")]
    Encoder(#[from] EncoderError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Capture subsystem errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No input device available")]
    NoInputDevice,

    #[error("Failed to open stream: {0}")]
    StreamError(String),
}

/// Encoder errors
///
/// `ControlRejected` is fatal to the current encoder instance: the codec is
/// left at an ambiguous bitrate and must be torn down and reconfigured.
#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("Encoder initialization failed: {0}")]
    Init(String),

    #[error("Encode requested before configure")]
    NotConfigured,

    #[error("Encoder control directive rejected: {0}")]
    ControlRejected(String),

    #[error("Encoding failed: {0}")]
    EncodeFailed(String),

    #[error("Invalid frame size: {0} samples")]
    InvalidFrameSize(usize),

    #[error("Encoder worker is gone")]
    WorkerGone,
}

/// Uplink pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Programming error: something tried to open an outbound stream while
    /// self-muted
    #[error("Tried to send audio while self-muted")]
    MutedStreamOpen,

    /// The encoder hit a fatal control error; transmission stays down until
    /// the caller explicitly resets the encoder
    #[error("Encoder failed; reconfiguration required")]
    EncoderFailed,

    #[error("Outbound stream error: {0}")]
    TransportFailed(String),
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, Error>;
