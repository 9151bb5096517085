//! Opus encoder state
//!
//! Thin wrapper over the `opus` crate keeping the lazily-created encoder
//! instance, the cached bitrate directive, and a reused encode buffer.
//! The instance is re-created only when the channel count changes; a
//! re-creation would otherwise throw away the codec's predictive state.

use bytes::Bytes;
use opus::{Application, Bitrate, Channels, Encoder};

use crate::constants::{MAX_OPUS_PACKET_SIZE, SAMPLE_RATE};
use crate::error::EncoderError;

/// Stateful Opus encoder at the fixed protocol sample rate
pub struct VoiceEncoder {
    encoder: Option<Encoder>,
    channels: u16,
    /// Last requested bitrate directive; outer `None` = never requested,
    /// inner `None` = automatic bitrate selection
    bitrate: Option<Option<u32>>,
    /// Encoding buffer (reused to avoid allocations)
    encode_buffer: Vec<u8>,
    /// Bumped every time a fresh encoder instance is created
    generation: u64,
}

impl VoiceEncoder {
    pub fn new() -> Self {
        Self {
            encoder: None,
            channels: 0,
            bitrate: None,
            encode_buffer: vec![0u8; MAX_OPUS_PACKET_SIZE],
            generation: 0,
        }
    }

    /// Lazily create the encoder instance for the given channel count.
    ///
    /// No-op when an instance for the same channel count already exists.
    /// On a channel-count change the instance is replaced and the cached
    /// bitrate directive re-applied to the fresh one.
    pub fn configure(&mut self, channels: u16) -> Result<(), EncoderError> {
        if self.encoder.is_some() && self.channels == channels {
            return Ok(());
        }

        let ch = match channels {
            1 => Channels::Mono,
            2 => Channels::Stereo,
            _ => {
                return Err(EncoderError::Init(format!(
                    "Unsupported channel count: {}",
                    channels
                )))
            }
        };

        let encoder = Encoder::new(SAMPLE_RATE, ch, Application::Voip)
            .map_err(|e| EncoderError::Init(e.to_string()))?;

        self.encoder = Some(encoder);
        self.channels = channels;
        self.generation += 1;

        if let Some(directive) = self.bitrate {
            self.apply_bitrate(directive)?;
        }

        Ok(())
    }

    /// Apply a bitrate directive to the live instance without recreating it.
    ///
    /// `None` selects automatic bitrate. Returns whether a directive was
    /// actually recorded: a request equal to the cached value is a no-op.
    /// When no instance exists yet the value is cached and applied on the
    /// next `configure`. A rejected directive is fatal to the instance.
    pub fn set_bitrate(&mut self, bitrate: Option<u32>) -> Result<bool, EncoderError> {
        if self.bitrate == Some(bitrate) {
            return Ok(false);
        }
        if self.encoder.is_some() {
            self.apply_bitrate(bitrate)?;
        }
        self.bitrate = Some(bitrate);
        Ok(true)
    }

    fn apply_bitrate(&mut self, bitrate: Option<u32>) -> Result<(), EncoderError> {
        let encoder = self.encoder.as_mut().ok_or(EncoderError::NotConfigured)?;
        let directive = match bitrate {
            Some(bits) => Bitrate::Bits(bits as i32),
            None => Bitrate::Auto,
        };
        encoder
            .set_bitrate(directive)
            .map_err(|e| EncoderError::ControlRejected(e.to_string()))
    }

    /// Encode one frame of interleaved f32 samples
    pub fn encode(&mut self, samples: &[f32]) -> Result<Bytes, EncoderError> {
        let encoder = self.encoder.as_mut().ok_or(EncoderError::NotConfigured)?;

        if samples.is_empty() || samples.len() % self.channels as usize != 0 {
            return Err(EncoderError::InvalidFrameSize(samples.len()));
        }

        let size = encoder
            .encode_float(samples, &mut self.encode_buffer)
            .map_err(|e| EncoderError::EncodeFailed(e.to_string()))?;

        Ok(Bytes::copy_from_slice(&self.encode_buffer[..size]))
    }

    /// Destroy the encoder instance and clear the cached bitrate.
    /// Safe to call when no instance exists.
    pub fn reset(&mut self) {
        self.encoder = None;
        self.channels = 0;
        self.bitrate = None;
    }

    /// Whether an encoder instance currently exists
    pub fn is_configured(&self) -> bool {
        self.encoder.is_some()
    }

    /// Current channel count (0 when unconfigured)
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Instance generation counter
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Default for VoiceEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_is_lazy_and_stable() {
        let mut enc = VoiceEncoder::new();
        assert!(!enc.is_configured());

        enc.configure(1).unwrap();
        assert_eq!(enc.generation(), 1);

        // Same channel count must not re-create the instance
        enc.configure(1).unwrap();
        assert_eq!(enc.generation(), 1);

        // Channel change does
        enc.configure(2).unwrap();
        assert_eq!(enc.generation(), 2);
    }

    #[test]
    fn bitrate_directive_issued_at_most_once() {
        let mut enc = VoiceEncoder::new();
        enc.configure(1).unwrap();

        assert!(enc.set_bitrate(Some(32_000)).unwrap());
        assert!(!enc.set_bitrate(Some(32_000)).unwrap());

        // Different value goes through again
        assert!(enc.set_bitrate(None).unwrap());
        assert!(!enc.set_bitrate(None).unwrap());
    }

    #[test]
    fn bitrate_cached_before_configure() {
        let mut enc = VoiceEncoder::new();
        assert!(enc.set_bitrate(Some(64_000)).unwrap());

        enc.configure(1).unwrap();
        // Already cached and applied during configure
        assert!(!enc.set_bitrate(Some(64_000)).unwrap());
    }

    #[test]
    fn bitrate_survives_channel_change() {
        let mut enc = VoiceEncoder::new();
        enc.configure(1).unwrap();
        enc.set_bitrate(Some(48_000)).unwrap();

        enc.configure(2).unwrap();
        assert!(!enc.set_bitrate(Some(48_000)).unwrap());
    }

    #[test]
    fn encode_requires_configure() {
        let mut enc = VoiceEncoder::new();
        let samples = vec![0.0f32; 960];
        assert!(matches!(
            enc.encode(&samples),
            Err(EncoderError::NotConfigured)
        ));
    }

    #[test]
    fn encode_silence() {
        let mut enc = VoiceEncoder::new();
        enc.configure(1).unwrap();

        let samples = vec![0.0f32; 960];
        let packet = enc.encode(&samples).unwrap();
        assert!(!packet.is_empty());
        assert!(packet.len() < samples.len() * 4);
    }

    #[test]
    fn encode_rejects_ragged_frame() {
        let mut enc = VoiceEncoder::new();
        enc.configure(2).unwrap();

        let samples = vec![0.0f32; 961];
        assert!(matches!(
            enc.encode(&samples),
            Err(EncoderError::InvalidFrameSize(961))
        ));
    }

    #[test]
    fn reset_clears_state() {
        let mut enc = VoiceEncoder::new();
        enc.configure(1).unwrap();
        enc.set_bitrate(Some(32_000)).unwrap();

        enc.reset();
        assert!(!enc.is_configured());
        assert!(matches!(
            enc.encode(&[0.0; 960]),
            Err(EncoderError::NotConfigured)
        ));

        // Cached bitrate cleared: same value is a fresh directive again
        assert!(enc.set_bitrate(Some(32_000)).unwrap());

        // Reset with no instance is fine
        enc.reset();
        enc.reset();
    }
}
