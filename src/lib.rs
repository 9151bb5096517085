//! # Voice Uplink
//!
//! Client-side core of a multi-user voice-chat application: microphone
//! capture, transmission gating (continuous / push-to-talk), off-path Opus
//! encoding, and ordered packet delivery to an externally supplied outbound
//! stream, plus the channel-link reachability tracker used by the channel
//! tree view.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐   PcmFrame    ┌───────────────────────────────────────┐
//! │ Microphone   │──────────────▶│           VoiceUplink                 │
//! │ (cpal, 48k)  │  FrameQueue   │                                       │
//! └──────────────┘               │  ┌──────────┐      ┌───────────────┐  │
//!                                │  │   Gate   │─────▶│ EncoderWorker │  │
//!                                │  │ cont/ptt │      │ (opus thread) │  │
//!                                │  │  + mute  │      └───────┬───────┘  │
//!                                │  └──────────┘   tokens     │          │
//!                                │        ▲                   ▼          │
//!                                │        │            ┌────────────┐    │
//!          TalkEvent ◀───────────│────────┘            │ReorderQueue│    │
//!   (started/stopped talking)    │                     └─────┬──────┘    │
//!                                └───────────────────────────┼───────────┘
//!                                                            │ EncodedPacket
//!                                                            ▼
//!                                                   ┌─────────────────┐
//!                                                   │   VoiceSink     │
//!                                                   │   (transport,   │
//!                                                   │    external)    │
//!                                                   └─────────────────┘
//!
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │ ChannelTree + ChannelLinkSynchronizer                                │
//! │   directory events ──▶ tree mutations ──▶ recompute() ──▶ linked()   │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The wire protocol, UI bindings, and remote directory live in external
//! collaborators; this crate consumes them through the traits in
//! [`voice::transport`].

pub mod audio;
pub mod channels;
pub mod codec;
pub mod config;
pub mod error;
pub mod voice;

pub use error::{Error, Result};

/// Application-wide constants
pub mod constants {
    /// Sample rate the voice protocol operates at; capture and encoding are
    /// both pinned to it
    pub const SAMPLE_RATE: u32 = 48_000;

    /// Default capture channel count (mono microphone)
    pub const DEFAULT_CHANNELS: u16 = 1;

    /// Default samples per outbound packet (20ms at 48kHz)
    pub const DEFAULT_SAMPLES_PER_PACKET: u32 = 960;

    /// Maximum encoded Opus frame size (a single Opus frame tops out around
    /// 1275 bytes; leave headroom)
    pub const MAX_OPUS_PACKET_SIZE: usize = 4000;

    /// Capture frame queue capacity (in frames)
    pub const FRAME_QUEUE_CAPACITY: usize = 256;

    /// Default push-to-talk key combination
    pub const DEFAULT_PTT_KEY: &str = "space";
}
