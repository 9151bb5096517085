//! Voice transmission pipeline
//!
//! Frame gating (continuous / push-to-talk), the uplink pipeline itself,
//! and the interfaces to the external transport and key-binding
//! collaborators.

pub mod driver;
pub mod gate;
pub mod pipeline;
pub mod transport;

pub use driver::run_uplink;
pub use gate::TransmissionMode;
pub use pipeline::{TalkEvent, VoiceUplink};
pub use transport::{
    DropSink, DropTransport, EncodedPacket, KeyBindingHost, NoBindings, VoiceSink, VoiceTarget,
    VoiceTransport,
};
