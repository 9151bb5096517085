//! Microphone capture
//!
//! Wraps a cpal input stream on the default input device, pinned to the
//! protocol sample rate, and pushes fixed-format PCM frames into a shared
//! frame queue. The stream runs on its own dedicated thread so capture
//! keeps going regardless of what the control path is doing.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use crossbeam_channel::{bounded, Receiver};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::audio::frame::{PcmFrame, SharedFrameQueue};
use crate::constants::{DEFAULT_CHANNELS, SAMPLE_RATE};
use crate::error::AudioError;

/// Microphone frame source feeding the uplink pipeline
pub struct AudioFrameSource {
    /// Whether capture is running
    running: Arc<AtomicBool>,

    /// Output queue for captured frames
    output: SharedFrameQueue,

    /// Stream thread handle
    thread_handle: Option<JoinHandle<()>>,

    /// Channel for stream errors
    error_rx: Option<Receiver<AudioError>>,

    /// Current frame sequence number
    sequence: Arc<AtomicU32>,

    /// Total samples captured
    samples_captured: Arc<AtomicU64>,

    /// Stream configuration
    config: StreamConfig,

    /// Start time for timestamps
    start_time: Instant,
}

impl AudioFrameSource {
    /// Create a frame source on the default input device.
    ///
    /// Capture is pinned to the protocol sample rate; the channel count
    /// defaults to mono unless overridden.
    pub fn new(channels: Option<u16>, output: SharedFrameQueue) -> Result<Self, AudioError> {
        let config = StreamConfig {
            channels: channels.unwrap_or(DEFAULT_CHANNELS),
            sample_rate: cpal::SampleRate(SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };

        Ok(Self {
            running: Arc::new(AtomicBool::new(false)),
            output,
            thread_handle: None,
            error_rx: None,
            sequence: Arc::new(AtomicU32::new(0)),
            samples_captured: Arc::new(AtomicU64::new(0)),
            config,
            start_time: Instant::now(),
        })
    }

    /// Start capturing audio
    pub fn start(&mut self) -> Result<(), AudioError> {
        if self.running.load(Ordering::SeqCst) {
            return Ok(());
        }

        let device = cpal::default_host()
            .default_input_device()
            .ok_or(AudioError::NoInputDevice)?;

        let (error_tx, error_rx) = bounded::<AudioError>(16);
        self.error_rx = Some(error_rx);

        let running = self.running.clone();
        let running_for_loop = self.running.clone();
        let output = self.output.clone();
        let sequence = self.sequence.clone();
        let samples_captured = self.samples_captured.clone();
        let config = self.config.clone();
        let channels = self.config.channels;

        // Reset counters
        self.sequence.store(0, Ordering::SeqCst);
        self.samples_captured.store(0, Ordering::SeqCst);
        self.start_time = Instant::now();
        let start_time = self.start_time;

        running.store(true, Ordering::SeqCst);

        let handle = thread::Builder::new()
            .name("mic-capture".to_string())
            .spawn(move || {
                let stream = device.build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        if !running.load(Ordering::Relaxed) {
                            return;
                        }

                        let timestamp = start_time.elapsed().as_micros() as u64;
                        let seq = sequence.fetch_add(1, Ordering::Relaxed);
                        samples_captured.fetch_add(data.len() as u64, Ordering::Relaxed);

                        let frame = PcmFrame::new(data.to_vec(), channels, timestamp, seq);

                        // Queue full means the consumer fell behind; the
                        // frame is dropped rather than blocking the callback
                        if !output.push(frame) {
                            tracing::trace!(seq, "capture queue full, frame dropped");
                        }
                    },
                    move |err| {
                        let _ = error_tx.try_send(AudioError::StreamError(err.to_string()));
                    },
                    None,
                );

                match stream {
                    Ok(stream) => {
                        if let Err(e) = stream.play() {
                            tracing::error!("Failed to start capture stream: {}", e);
                            return;
                        }

                        // Keep thread alive while running
                        while running_for_loop.load(Ordering::Relaxed) {
                            thread::sleep(std::time::Duration::from_millis(10));
                        }

                        // Stream is dropped here, stopping capture
                    }
                    Err(e) => {
                        tracing::error!("Failed to build capture stream: {}", e);
                    }
                }
            })
            .map_err(|e| AudioError::StreamError(e.to_string()))?;

        self.thread_handle = Some(handle);
        tracing::info!(
            channels = self.config.channels,
            sample_rate = SAMPLE_RATE,
            "microphone capture started"
        );
        Ok(())
    }

    /// Stop capturing audio
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }

    /// Check if capture is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get current frame sequence number
    pub fn current_sequence(&self) -> u32 {
        self.sequence.load(Ordering::Relaxed)
    }

    /// Get total samples captured
    pub fn samples_captured(&self) -> u64 {
        self.samples_captured.load(Ordering::Relaxed)
    }

    /// Get channel count
    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Take the next pending stream error, if any
    pub fn take_error(&self) -> Option<AudioError> {
        self.error_rx.as_ref().and_then(|rx| rx.try_recv().ok())
    }
}

impl Drop for AudioFrameSource {
    fn drop(&mut self) {
        self.stop();
    }
}
