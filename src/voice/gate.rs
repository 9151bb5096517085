//! Transmission modes and the per-frame admission gate

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// How outbound transmission is gated. Exactly one mode is active at a
/// time; mute is orthogonal to both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmissionMode {
    /// Transmit whenever frames arrive and the user is not muted
    Continuous,
    /// Transmit only while the push-to-talk key is held
    PushToTalk,
}

impl FromStr for TransmissionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cont" | "continuous" => Ok(TransmissionMode::Continuous),
            "ptt" | "push_to_talk" => Ok(TransmissionMode::PushToTalk),
            other => Err(Error::Config(format!("unknown voice mode: {}", other))),
        }
    }
}

impl fmt::Display for TransmissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransmissionMode::Continuous => write!(f, "cont"),
            TransmissionMode::PushToTalk => write!(f, "ptt"),
        }
    }
}

/// Per-mode gate state
#[derive(Debug)]
pub(crate) enum Gate {
    Continuous,
    PushToTalk { pushed: bool },
}

impl Gate {
    pub(crate) fn new(mode: TransmissionMode) -> Self {
        match mode {
            TransmissionMode::Continuous => Gate::Continuous,
            TransmissionMode::PushToTalk => Gate::PushToTalk { pushed: false },
        }
    }

    pub(crate) fn mode(&self) -> TransmissionMode {
        match self {
            Gate::Continuous => TransmissionMode::Continuous,
            Gate::PushToTalk { .. } => TransmissionMode::PushToTalk,
        }
    }

    /// Whether an incoming frame should be forwarded to the encoder
    pub(crate) fn admits(&self, muted: bool) -> bool {
        if muted {
            return false;
        }
        match self {
            Gate::Continuous => true,
            Gate::PushToTalk { pushed } => *pushed,
        }
    }
}
