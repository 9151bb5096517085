//! PCM frames and the capture-side frame queue
//!
//! The queue is a single-producer single-consumer lock-free ring sitting
//! between the cpal capture callback and the uplink driver. The callback
//! must never block, so a full queue drops the frame and counts the
//! overflow instead.

use crossbeam::queue::ArrayQueue;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::constants::SAMPLE_RATE;

/// One captured frame of interleaved f32 PCM at 48kHz.
///
/// Frame length is whatever the capture device delivered, not a protocol
/// quantity. Ownership moves frame-by-frame down the pipeline; once a frame
/// is submitted to the encoder the sender must not touch it again.
#[derive(Clone)]
pub struct PcmFrame {
    /// Interleaved audio samples (f32)
    pub samples: Vec<f32>,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in microseconds since capture start
    pub timestamp: u64,
    /// Capture sequence number
    pub sequence: u32,
}

impl PcmFrame {
    pub fn new(samples: Vec<f32>, channels: u16, timestamp: u64, sequence: u32) -> Self {
        Self {
            samples,
            channels,
            timestamp,
            sequence,
        }
    }

    /// Get number of samples per channel
    pub fn samples_per_channel(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Get frame duration in microseconds
    pub fn duration_us(&self) -> u64 {
        (self.samples_per_channel() as u64 * 1_000_000) / SAMPLE_RATE as u64
    }
}

/// Lock-free SPSC queue of captured frames
pub struct FrameQueue {
    queue: ArrayQueue<PcmFrame>,
    overflow_count: AtomicUsize,
}

impl FrameQueue {
    /// Create a new queue with the specified capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity),
            overflow_count: AtomicUsize::new(0),
        }
    }

    /// Push a frame into the queue.
    /// Returns false if the queue is full (frame dropped, overflow counted).
    pub fn push(&self, frame: PcmFrame) -> bool {
        match self.queue.push(frame) {
            Ok(()) => true,
            Err(_) => {
                self.overflow_count.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Pop the next frame, if any
    pub fn try_pop(&self) -> Option<PcmFrame> {
        self.queue.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Frames dropped because the consumer fell behind
    pub fn overflow_count(&self) -> usize {
        self.overflow_count.load(Ordering::Relaxed)
    }

    pub fn reset_stats(&self) {
        self.overflow_count.store(0, Ordering::Relaxed);
    }
}

/// Thread-safe handle to a frame queue
pub type SharedFrameQueue = Arc<FrameQueue>;

/// Create a new shared frame queue
pub fn create_shared_queue(capacity: usize) -> SharedFrameQueue {
    Arc::new(FrameQueue::new(capacity))
}
