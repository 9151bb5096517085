//! Encoder worker thread
//!
//! The codec runs on its own thread so a slow encode never stalls the
//! capture callback or the UI-facing control path. Commands travel over a
//! channel bounded to a single entry: submitting a frame blocks until the
//! worker has taken the previous one, which is the pipeline's backpressure
//! point. Because a single thread drains that queue in order, control
//! changes (reset / configure / bitrate) are naturally serialized against
//! encodes and apply before the next frame, never mid-encode.
//!
//! Each encode request carries a caller-chosen correlation token that is
//! echoed on the reply, letting the pipeline match asynchronous results
//! back to submission order.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryIter};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::audio::frame::PcmFrame;
use crate::codec::encoder::VoiceEncoder;
use crate::error::EncoderError;
use crate::voice::transport::{EncodedPacket, VoiceTarget};

/// One frame handed to the worker. The frame buffer moves in with the
/// request; the submitter must not retain it.
pub struct EncodeRequest {
    /// Correlation token echoed on the reply
    pub token: u64,
    pub frame: PcmFrame,
    pub target: VoiceTarget,
    pub position: Option<[f32; 3]>,
}

/// Commands processed strictly in submission order
pub enum EncoderCommand {
    /// Destroy the encoder instance and clear the cached bitrate
    Reset,
    /// Ensure an encoder instance exists for this channel count
    Configure { channels: u16 },
    /// Live bitrate directive; `None` = automatic
    SetBitrate(Option<u32>),
    Encode(EncodeRequest),
}

/// Replies from the worker thread
pub enum EncoderReply {
    Encoded {
        token: u64,
        packet: EncodedPacket,
    },
    Failed {
        /// `None` for failures of control commands
        token: Option<u64>,
        error: EncoderError,
    },
    ResetDone,
}

/// Handle to the encoder thread
pub struct EncoderWorker {
    cmd_tx: Option<Sender<EncoderCommand>>,
    reply_rx: Receiver<EncoderReply>,
    thread_handle: Option<JoinHandle<()>>,
}

impl EncoderWorker {
    /// Spawn the worker thread
    pub fn spawn() -> Result<Self, EncoderError> {
        // Depth 1: the submitter must not get arbitrarily ahead of the codec
        let (cmd_tx, cmd_rx) = bounded::<EncoderCommand>(1);
        let (reply_tx, reply_rx) = unbounded::<EncoderReply>();

        let handle = thread::Builder::new()
            .name("opus-encoder".to_string())
            .spawn(move || worker_loop(cmd_rx, reply_tx))
            .map_err(|e| EncoderError::Init(e.to_string()))?;

        Ok(Self {
            cmd_tx: Some(cmd_tx),
            reply_rx,
            thread_handle: Some(handle),
        })
    }

    fn send(&self, cmd: EncoderCommand) -> Result<(), EncoderError> {
        self.cmd_tx
            .as_ref()
            .ok_or(EncoderError::WorkerGone)?
            .send(cmd)
            .map_err(|_| EncoderError::WorkerGone)
    }

    /// Destroy the encoder instance; `EncoderReply::ResetDone` confirms once
    /// every previously queued command has been processed
    pub fn reset(&self) -> Result<(), EncoderError> {
        self.send(EncoderCommand::Reset)
    }

    pub fn configure(&self, channels: u16) -> Result<(), EncoderError> {
        self.send(EncoderCommand::Configure { channels })
    }

    pub fn set_bitrate(&self, bitrate: Option<u32>) -> Result<(), EncoderError> {
        self.send(EncoderCommand::SetBitrate(bitrate))
    }

    /// Submit one frame for encoding. Blocks while the worker still holds
    /// the previous command (bounded queue of depth 1).
    pub fn submit(&self, request: EncodeRequest) -> Result<(), EncoderError> {
        self.send(EncoderCommand::Encode(request))
    }

    /// Drain currently available replies without blocking
    pub fn try_replies(&self) -> TryIter<'_, EncoderReply> {
        self.reply_rx.try_iter()
    }

    /// Wait up to `timeout` for the next reply
    pub fn recv_reply_timeout(&self, timeout: Duration) -> Option<EncoderReply> {
        self.reply_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for EncoderWorker {
    fn drop(&mut self) {
        // Closing the command channel ends the worker loop
        self.cmd_tx.take();
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(cmd_rx: Receiver<EncoderCommand>, reply_tx: Sender<EncoderReply>) {
    let mut encoder = VoiceEncoder::new();

    for cmd in cmd_rx.iter() {
        match cmd {
            EncoderCommand::Reset => {
                encoder.reset();
                let _ = reply_tx.send(EncoderReply::ResetDone);
            }
            EncoderCommand::Configure { channels } => {
                if let Err(error) = encoder.configure(channels) {
                    let _ = reply_tx.send(EncoderReply::Failed { token: None, error });
                }
            }
            EncoderCommand::SetBitrate(bitrate) => match encoder.set_bitrate(bitrate) {
                Ok(issued) => {
                    if issued {
                        tracing::debug!(?bitrate, "encoder bitrate updated");
                    }
                }
                Err(error) => {
                    let _ = reply_tx.send(EncoderReply::Failed { token: None, error });
                }
            },
            EncoderCommand::Encode(request) => {
                let token = request.token;
                // Lazy configure from the frame itself, like the capture
                // side sees it
                let result = encoder
                    .configure(request.frame.channels)
                    .and_then(|_| encoder.encode(&request.frame.samples));
                let reply = match result {
                    Ok(payload) => EncoderReply::Encoded {
                        token,
                        packet: EncodedPacket {
                            payload,
                            target: request.target,
                            position: request.position,
                        },
                    },
                    Err(error) => EncoderReply::Failed {
                        token: Some(token),
                        error,
                    },
                };
                if reply_tx.send(reply).is_err() {
                    break;
                }
            }
        }
    }
}
