//! External collaborator interfaces
//!
//! The wire protocol, the key-event source, and the UI all live outside
//! this crate; the pipeline consumes them through these narrow traits.

use bytes::Bytes;

use crate::error::Result;

/// Packet classification the transport routes on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceTarget {
    Normal,
    Shout,
    Whisper,
}

/// One compressed audio packet, owned by the pipeline until handed to the
/// outbound sink
#[derive(Debug, Clone)]
pub struct EncodedPacket {
    pub payload: Bytes,
    pub target: VoiceTarget,
    /// Optional positional-audio coordinates
    pub position: Option<[f32; 3]>,
}

/// Outbound voice stream created per transmission burst
pub trait VoiceSink: Send {
    fn write(&mut self, packet: EncodedPacket) -> Result<()>;
    fn end(&mut self) -> Result<()>;
}

/// The connection-level collaborator: hands out outbound streams and takes
/// quality directives
pub trait VoiceTransport: Send {
    /// Open a new outbound voice stream packetized at `samples_per_packet`
    fn create_voice_stream(&mut self, samples_per_packet: u32) -> Result<Box<dyn VoiceSink>>;

    /// Apply audio quality to the active connection; `bitrate` of `None`
    /// means automatic
    fn set_audio_quality(&mut self, bitrate: Option<u32>, samples_per_packet: u32) -> Result<()>;
}

/// Key-binding collaborator for push-to-talk.
///
/// On entering push-to-talk mode the pipeline installs the configured key
/// combination; the host is expected to route matching key transitions to
/// [`crate::voice::VoiceUplink::ptt_pressed`] /
/// [`crate::voice::VoiceUplink::ptt_released`]. The binding is removed when
/// the mode is left, so no listener outlives its mode.
pub trait KeyBindingHost: Send {
    fn install(&mut self, combo: &str) -> Result<()>;
    fn remove(&mut self, combo: &str);
}

/// Binding host for embedders that drive `ptt_pressed`/`ptt_released`
/// themselves
pub struct NoBindings;

impl KeyBindingHost for NoBindings {
    fn install(&mut self, _combo: &str) -> Result<()> {
        Ok(())
    }

    fn remove(&mut self, _combo: &str) {}
}

/// Sink that discards everything; used for mic-test paths where audio
/// should flow through the pipeline without reaching a server
pub struct DropSink;

impl VoiceSink for DropSink {
    fn write(&mut self, _packet: EncodedPacket) -> Result<()> {
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Transport handing out [`DropSink`]s
pub struct DropTransport;

impl VoiceTransport for DropTransport {
    fn create_voice_stream(&mut self, _samples_per_packet: u32) -> Result<Box<dyn VoiceSink>> {
        Ok(Box::new(DropSink))
    }

    fn set_audio_quality(&mut self, _bitrate: Option<u32>, _samples_per_packet: u32) -> Result<()> {
        Ok(())
    }
}
