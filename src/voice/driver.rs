//! Uplink driver loop
//!
//! Bridges the capture frame queue into the pipeline as an async task:
//! drain whatever the microphone produced, hand it to the pipeline one
//! frame at a time, sleep briefly when idle. Frame processing itself is a
//! single logical control flow; only the encoder boundary runs
//! concurrently.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::audio::frame::SharedFrameQueue;
use crate::error::{Error, PipelineError, Result};
use crate::voice::pipeline::VoiceUplink;

/// Drive captured frames into the uplink until `stop` is set, then end the
/// pipeline. Returns the pipeline for reuse.
///
/// Non-fatal write errors are logged and the loop keeps going; a fatal
/// encoder failure aborts since transmission cannot continue without an
/// explicit reconfiguration.
pub async fn run_uplink(
    queue: SharedFrameQueue,
    mut uplink: VoiceUplink,
    stop: Arc<AtomicBool>,
) -> Result<VoiceUplink> {
    let mut forwarded: u64 = 0;

    while !stop.load(Ordering::Relaxed) {
        while let Some(frame) = queue.try_pop() {
            match uplink.write(frame) {
                Ok(()) => {
                    forwarded += 1;
                    if forwarded % 1000 == 0 {
                        tracing::info!(
                            forwarded,
                            dropped = queue.overflow_count(),
                            "uplink stats"
                        );
                    }
                }
                Err(Error::Pipeline(PipelineError::EncoderFailed)) => {
                    uplink.end()?;
                    return Err(PipelineError::EncoderFailed.into());
                }
                Err(e) => {
                    tracing::warn!("uplink write failed: {}", e);
                }
            }
        }

        // Small sleep to prevent busy-waiting
        tokio::time::sleep(Duration::from_micros(500)).await;
    }

    uplink.end()?;
    Ok(uplink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::frame::{create_shared_queue, PcmFrame};
    use crate::voice::gate::TransmissionMode;
    use crate::voice::pipeline::TalkEvent;
    use crate::voice::transport::{DropTransport, NoBindings};

    #[tokio::test]
    async fn drains_queue_and_ends_on_stop() {
        let queue = create_shared_queue(32);
        let mut uplink =
            VoiceUplink::new(Box::new(DropTransport), Box::new(NoBindings)).unwrap();
        uplink.set_mode(TransmissionMode::Continuous).unwrap();
        let events = uplink.events();

        for i in 0..4u32 {
            queue.push(PcmFrame::new(vec![0.0f32; 960], 1, 0, i));
        }

        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let task = tokio::spawn(run_uplink(queue.clone(), uplink, stop));

        // Give the driver a moment to drain, then stop it
        tokio::time::sleep(Duration::from_millis(100)).await;
        stop_flag.store(true, Ordering::Relaxed);

        let uplink = task.await.unwrap().unwrap();
        assert!(queue.is_empty());
        assert!(!uplink.is_talking());

        let seen: Vec<TalkEvent> = events.try_iter().collect();
        assert_eq!(
            seen,
            vec![TalkEvent::StartedTalking, TalkEvent::StoppedTalking]
        );
    }
}
