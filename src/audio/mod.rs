//! Audio capture subsystem

pub mod capture;
pub mod frame;

pub use capture::AudioFrameSource;
pub use frame::{create_shared_queue, FrameQueue, PcmFrame, SharedFrameQueue};
