//! Voice uplink pipeline
//!
//! Glues the capture side to the transport: each incoming PCM frame runs
//! through the transmission gate, admitted frames go to the encoder worker
//! (blocking on its depth-1 queue, which is the backpressure point), and
//! completed packets are forwarded to the outbound sink in submission
//! order. The outbound stream is opened lazily on the first admitted frame
//! of a burst and closed on mute, key release, mode switch, or `end()`,
//! emitting `StartedTalking`/`StoppedTalking` exactly once per burst.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use crate::audio::frame::PcmFrame;
use crate::codec::worker::{EncodeRequest, EncoderReply, EncoderWorker};
use crate::config::Settings;
use crate::constants::{DEFAULT_PTT_KEY, DEFAULT_SAMPLES_PER_PACKET};
use crate::error::{EncoderError, Error, PipelineError, Result};
use crate::voice::gate::{Gate, TransmissionMode};
use crate::voice::transport::{EncodedPacket, KeyBindingHost, VoiceTarget, VoiceTransport};

/// How long to wait for in-flight encodes when closing a stream
const FLUSH_TIMEOUT: Duration = Duration::from_millis(200);

/// Talking-state notifications for the UI collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TalkEvent {
    StartedTalking,
    StoppedTalking,
}

/// Restores submission order over correlation tokens.
///
/// The worker thread completes requests in FIFO order, but the contract
/// with the sink is submission order regardless of how the encoding
/// boundary behaves, so packets pass through here before the sink.
pub(crate) struct ReorderQueue {
    next: u64,
    pending: BTreeMap<u64, EncodedPacket>,
    skipped: BTreeSet<u64>,
}

impl ReorderQueue {
    pub(crate) fn new() -> Self {
        Self {
            next: 0,
            pending: BTreeMap::new(),
            skipped: BTreeSet::new(),
        }
    }

    fn ready(&mut self) -> Vec<EncodedPacket> {
        let mut out = Vec::new();
        loop {
            if let Some(packet) = self.pending.remove(&self.next) {
                out.push(packet);
                self.next += 1;
            } else if self.skipped.remove(&self.next) {
                self.next += 1;
            } else {
                break;
            }
        }
        out
    }

    /// Insert a completed packet; returns every packet now deliverable in
    /// order
    pub(crate) fn push(&mut self, token: u64, packet: EncodedPacket) -> Vec<EncodedPacket> {
        if token < self.next {
            // Stale result from before a cancellation point
            return Vec::new();
        }
        self.pending.insert(token, packet);
        self.ready()
    }

    /// Mark a token as failed so later packets do not stall behind it
    pub(crate) fn skip(&mut self, token: u64) -> Vec<EncodedPacket> {
        if token < self.next {
            return Vec::new();
        }
        self.skipped.insert(token);
        self.ready()
    }

    /// Discard everything below `token`; results for earlier submissions
    /// are ignored from now on
    pub(crate) fn cancel_before(&mut self, token: u64) {
        if token > self.next {
            self.next = token;
        }
        self.pending = self.pending.split_off(&self.next);
        self.skipped = self.skipped.split_off(&self.next);
    }

    pub(crate) fn next_expected(&self) -> u64 {
        self.next
    }
}

/// The uplink pipeline. Owns the encoder worker, the gate, and the handles
/// to the transport and key-binding collaborators.
pub struct VoiceUplink {
    transport: Box<dyn VoiceTransport>,
    bindings: Box<dyn KeyBindingHost>,
    worker: EncoderWorker,
    gate: Option<Gate>,
    ptt_key: String,
    muted: bool,
    outbound: Option<Box<dyn crate::voice::transport::VoiceSink>>,
    events_tx: Sender<TalkEvent>,
    events_rx: Receiver<TalkEvent>,
    next_token: u64,
    in_flight: u64,
    reorder: ReorderQueue,
    samples_per_packet: u32,
    bitrate: Option<u32>,
    target: VoiceTarget,
    position: Option<[f32; 3]>,
    encoder_failed: bool,
}

impl VoiceUplink {
    /// Create a pipeline over the given transport and key-binding host.
    /// Transmission stays disabled until a mode is set.
    pub fn new(
        transport: Box<dyn VoiceTransport>,
        bindings: Box<dyn KeyBindingHost>,
    ) -> Result<Self> {
        let worker = EncoderWorker::spawn().map_err(Error::Encoder)?;
        let (events_tx, events_rx) = unbounded();

        Ok(Self {
            transport,
            bindings,
            worker,
            gate: None,
            ptt_key: DEFAULT_PTT_KEY.to_string(),
            muted: false,
            outbound: None,
            events_tx,
            events_rx,
            next_token: 0,
            in_flight: 0,
            reorder: ReorderQueue::new(),
            samples_per_packet: DEFAULT_SAMPLES_PER_PACKET,
            bitrate: None,
            target: VoiceTarget::Normal,
            position: None,
            encoder_failed: false,
        })
    }

    /// Receiver for talking-state events; may be cloned freely
    pub fn events(&self) -> Receiver<TalkEvent> {
        self.events_rx.clone()
    }

    /// Currently active transmission mode, if any
    pub fn mode(&self) -> Option<TransmissionMode> {
        self.gate.as_ref().map(Gate::mode)
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Whether an outbound stream is currently open
    pub fn is_talking(&self) -> bool {
        self.outbound.is_some()
    }

    /// Set the packet classification for subsequent frames
    pub fn set_target(&mut self, target: VoiceTarget) {
        self.target = target;
    }

    /// Set the positional-audio payload attached to subsequent frames
    pub fn set_position(&mut self, position: Option<[f32; 3]>) {
        self.position = position;
    }

    /// Mute or unmute. Muting forcibly closes any open outbound stream and
    /// suppresses new ones regardless of mode or key state.
    pub fn set_mute(&mut self, mute: bool) {
        self.muted = mute;
        if mute {
            if let Err(e) = self.stop_outbound() {
                tracing::warn!("error closing stream on mute: {}", e);
            }
        }
    }

    /// Apply voice settings in one go: quality first, then mode
    pub fn apply_settings(&mut self, settings: &Settings) -> Result<()> {
        // Finalize under the old key combination before swapping it
        self.finalize_gate()?;
        self.ptt_key = settings.ptt_key.clone();
        self.set_audio_quality(settings.audio_bitrate, settings.samples_per_packet)?;
        self.set_mode_str(&settings.voice_mode)
    }

    /// Switch transmission mode, finalizing the previous one first: the
    /// outbound stream is closed (emitting `StoppedTalking` if talking) and
    /// push-to-talk bindings are removed before the new mode activates.
    pub fn set_mode(&mut self, mode: TransmissionMode) -> Result<()> {
        self.finalize_gate()?;
        self.activate_gate(mode)
    }

    /// Switch mode by its settings name (`"cont"` / `"ptt"`). An unknown
    /// name finalizes the previous mode, reports the error, and leaves
    /// transmission disabled until a valid mode is set.
    pub fn set_mode_str(&mut self, mode: &str) -> Result<()> {
        self.finalize_gate()?;
        let mode: TransmissionMode = mode.parse()?;
        self.activate_gate(mode)
    }

    fn activate_gate(&mut self, mode: TransmissionMode) -> Result<()> {
        if mode == TransmissionMode::PushToTalk {
            self.bindings.install(&self.ptt_key)?;
        }
        self.gate = Some(Gate::new(mode));
        tracing::info!(%mode, "transmission mode set");
        Ok(())
    }

    fn finalize_gate(&mut self) -> Result<()> {
        if let Some(gate) = self.gate.take() {
            self.stop_outbound()?;
            if gate.mode() == TransmissionMode::PushToTalk {
                self.bindings.remove(&self.ptt_key);
            }
        }
        Ok(())
    }

    /// Push-to-talk key pressed
    pub fn ptt_pressed(&mut self) {
        if let Some(Gate::PushToTalk { pushed }) = self.gate.as_mut() {
            *pushed = true;
        }
    }

    /// Push-to-talk key released: the outbound stream closes immediately
    pub fn ptt_released(&mut self) {
        if let Some(Gate::PushToTalk { pushed }) = self.gate.as_mut() {
            *pushed = false;
            if let Err(e) = self.stop_outbound() {
                tracing::warn!("error closing stream on key release: {}", e);
            }
        }
    }

    /// Forward audio quality to the encoder and the transport. The bitrate
    /// directive is deduplicated at the encoder; `samples_per_packet`
    /// governs transport-side packetization only.
    pub fn set_audio_quality(
        &mut self,
        bitrate: Option<u32>,
        samples_per_packet: u32,
    ) -> Result<()> {
        self.bitrate = bitrate;
        self.samples_per_packet = samples_per_packet;
        self.worker.set_bitrate(bitrate).map_err(Error::Encoder)?;
        self.transport.set_audio_quality(bitrate, samples_per_packet)
    }

    /// Route one captured frame through the pipeline.
    ///
    /// Returns once the encoder has accepted the frame; with the worker's
    /// depth-1 queue this is where the capture side stalls if encoding
    /// falls behind. Frames not admitted by the gate are dropped silently.
    pub fn write(&mut self, frame: PcmFrame) -> Result<()> {
        self.pump()?;

        if self.encoder_failed {
            return Err(PipelineError::EncoderFailed.into());
        }

        let admitted = match self.gate.as_ref() {
            Some(gate) => gate.admits(self.muted),
            None => false,
        };
        if !admitted {
            return Ok(());
        }

        self.ensure_outbound()?;

        let request = EncodeRequest {
            token: self.next_token,
            frame,
            target: self.target,
            position: self.position,
        };
        self.next_token += 1;
        self.worker.submit(request).map_err(Error::Encoder)?;
        self.in_flight += 1;

        self.pump()
    }

    /// Close any open outbound stream, flush and release the encoder
    /// instance. Idempotent; a second call emits nothing.
    pub fn end(&mut self) -> Result<()> {
        self.finalize_gate()?;
        self.sync_reset()
    }

    /// Recover from a fatal encoder error: drops the poisoned instance and
    /// re-issues the cached quality settings.
    pub fn reset_encoder(&mut self) -> Result<()> {
        self.sync_reset()?;
        self.encoder_failed = false;
        self.worker.set_bitrate(self.bitrate).map_err(Error::Encoder)
    }

    fn ensure_outbound(&mut self) -> Result<()> {
        if self.outbound.is_some() {
            return Ok(());
        }
        if self.muted {
            // Programming error; admission checks mute before we get here
            return Err(PipelineError::MutedStreamOpen.into());
        }

        let sink = self.transport.create_voice_stream(self.samples_per_packet)?;
        self.outbound = Some(sink);
        let _ = self.events_tx.send(TalkEvent::StartedTalking);
        tracing::debug!("outbound voice stream opened");
        Ok(())
    }

    fn stop_outbound(&mut self) -> Result<()> {
        if self.outbound.is_none() {
            return Ok(());
        }

        // Deliver what the encoder has already finished for this burst,
        // then close; anything still in flight is stale afterwards
        self.flush_in_flight();

        let Some(mut sink) = self.outbound.take() else {
            return Ok(());
        };
        self.reorder.cancel_before(self.next_token);
        if let Err(e) = sink.end() {
            tracing::warn!("outbound stream close failed: {}", e);
        }
        let _ = self.events_tx.send(TalkEvent::StoppedTalking);
        tracing::debug!("outbound voice stream closed");
        Ok(())
    }

    fn flush_in_flight(&mut self) {
        let deadline = Instant::now() + FLUSH_TIMEOUT;
        while self.in_flight > 0 && Instant::now() < deadline {
            match self.worker.recv_reply_timeout(Duration::from_millis(20)) {
                Some(reply) => {
                    if let Err(e) = self.handle_reply(reply) {
                        tracing::warn!("error while flushing encoder replies: {}", e);
                    }
                }
                None => continue,
            }
        }
    }

    /// Reset the encoder and wait until the worker confirms, so every
    /// previously submitted command has been processed
    fn sync_reset(&mut self) -> Result<()> {
        self.worker.reset().map_err(Error::Encoder)?;
        let deadline = Instant::now() + FLUSH_TIMEOUT;
        while Instant::now() < deadline {
            match self.worker.recv_reply_timeout(Duration::from_millis(20)) {
                Some(EncoderReply::ResetDone) => break,
                Some(reply) => {
                    if let Err(e) = self.handle_reply(reply) {
                        tracing::warn!("error while draining encoder replies: {}", e);
                    }
                }
                None => continue,
            }
        }
        self.reorder.cancel_before(self.next_token);
        self.in_flight = 0;
        Ok(())
    }

    /// Drain available worker replies and forward deliverable packets
    fn pump(&mut self) -> Result<()> {
        let replies: Vec<EncoderReply> = self.worker.try_replies().collect();
        for reply in replies {
            self.handle_reply(reply)?;
        }
        Ok(())
    }

    fn handle_reply(&mut self, reply: EncoderReply) -> Result<()> {
        match reply {
            EncoderReply::Encoded { token, packet } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                for packet in self.reorder.push(token, packet) {
                    if let Some(sink) = self.outbound.as_mut() {
                        sink.write(packet)?;
                    }
                    // Stream already closed: result was cancelled
                }
            }
            EncoderReply::Failed { token, error } => {
                if token.is_some() {
                    self.in_flight = self.in_flight.saturating_sub(1);
                }
                match &error {
                    EncoderError::ControlRejected(_) => {
                        // Fatal: the codec is at an ambiguous bitrate. Tear
                        // down and require explicit reconfiguration.
                        tracing::error!("fatal encoder control error: {}", error);
                        self.encoder_failed = true;
                        let _ = self.stop_outbound();
                    }
                    _ => tracing::warn!(?token, "encode failed: {}", error),
                }
                if let Some(token) = token {
                    for packet in self.reorder.skip(token) {
                        if let Some(sink) = self.outbound.as_mut() {
                            sink.write(packet)?;
                        }
                    }
                }
            }
            EncoderReply::ResetDone => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::transport::VoiceSink;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct TransportLog {
        writes: Arc<Mutex<Vec<EncodedPacket>>>,
        streams_opened: Arc<Mutex<usize>>,
        streams_ended: Arc<Mutex<usize>>,
        quality: Arc<Mutex<Vec<(Option<u32>, u32)>>>,
    }

    struct MockSink {
        log: TransportLog,
    }

    impl VoiceSink for MockSink {
        fn write(&mut self, packet: EncodedPacket) -> Result<()> {
            self.log.writes.lock().push(packet);
            Ok(())
        }

        fn end(&mut self) -> Result<()> {
            *self.log.streams_ended.lock() += 1;
            Ok(())
        }
    }

    struct MockTransport {
        log: TransportLog,
    }

    impl VoiceTransport for MockTransport {
        fn create_voice_stream(&mut self, _spp: u32) -> Result<Box<dyn VoiceSink>> {
            *self.log.streams_opened.lock() += 1;
            Ok(Box::new(MockSink {
                log: self.log.clone(),
            }))
        }

        fn set_audio_quality(&mut self, bitrate: Option<u32>, spp: u32) -> Result<()> {
            self.log.quality.lock().push((bitrate, spp));
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct BindingLog {
        installed: Arc<Mutex<Vec<String>>>,
        removed: Arc<Mutex<Vec<String>>>,
    }

    struct MockBindings {
        log: BindingLog,
    }

    impl KeyBindingHost for MockBindings {
        fn install(&mut self, combo: &str) -> Result<()> {
            self.log.installed.lock().push(combo.to_string());
            Ok(())
        }

        fn remove(&mut self, combo: &str) {
            self.log.removed.lock().push(combo.to_string());
        }
    }

    fn uplink() -> (VoiceUplink, TransportLog, BindingLog) {
        let tlog = TransportLog::default();
        let blog = BindingLog::default();
        let uplink = VoiceUplink::new(
            Box::new(MockTransport { log: tlog.clone() }),
            Box::new(MockBindings { log: blog.clone() }),
        )
        .unwrap();
        (uplink, tlog, blog)
    }

    fn frame(sequence: u32) -> PcmFrame {
        PcmFrame::new(vec![0.0f32; 960], 1, sequence as u64 * 20_000, sequence)
    }

    fn events_of(rx: &Receiver<TalkEvent>) -> Vec<TalkEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn continuous_burst_emits_events_once() {
        let (mut uplink, tlog, _) = uplink();
        let events = uplink.events();

        uplink.set_mode(TransmissionMode::Continuous).unwrap();
        for i in 0..3 {
            uplink.write(frame(i)).unwrap();
        }

        assert_eq!(events_of(&events), vec![TalkEvent::StartedTalking]);

        // Mute closes the stream and stops the burst
        uplink.set_mute(true);
        assert_eq!(events_of(&events), vec![TalkEvent::StoppedTalking]);
        assert_eq!(*tlog.streams_opened.lock(), 1);
        assert_eq!(*tlog.streams_ended.lock(), 1);

        // Closing flushed every frame of the burst, in order
        let writes = tlog.writes.lock();
        assert_eq!(writes.len(), 3);

        drop(writes);

        // Frames while muted are dropped without events
        uplink.write(frame(3)).unwrap();
        assert!(events_of(&events).is_empty());
        assert_eq!(tlog.writes.lock().len(), 3);

        // Unmuting starts a fresh burst on the next frame
        uplink.set_mute(false);
        uplink.write(frame(4)).unwrap();
        assert_eq!(events_of(&events), vec![TalkEvent::StartedTalking]);
        assert_eq!(*tlog.streams_opened.lock(), 2);
    }

    #[test]
    fn ptt_forwards_only_between_press_and_release() {
        let (mut uplink, tlog, blog) = uplink();
        let events = uplink.events();

        uplink.set_mode(TransmissionMode::PushToTalk).unwrap();
        assert_eq!(blog.installed.lock().as_slice(), [DEFAULT_PTT_KEY]);

        // Released: frames dropped
        uplink.write(frame(0)).unwrap();
        assert!(events_of(&events).is_empty());
        assert!(!uplink.is_talking());

        uplink.ptt_pressed();
        uplink.write(frame(1)).unwrap();
        uplink.write(frame(2)).unwrap();
        assert_eq!(events_of(&events), vec![TalkEvent::StartedTalking]);

        uplink.ptt_released();
        assert_eq!(events_of(&events), vec![TalkEvent::StoppedTalking]);
        assert_eq!(tlog.writes.lock().len(), 2);
        assert_eq!(*tlog.streams_ended.lock(), 1);

        // Released again: nothing flows
        uplink.write(frame(3)).unwrap();
        assert!(events_of(&events).is_empty());

        // Pressed but muted: still nothing
        uplink.ptt_pressed();
        uplink.set_mute(true);
        uplink.write(frame(4)).unwrap();
        assert!(events_of(&events).is_empty());
        assert_eq!(tlog.writes.lock().len(), 2);
    }

    #[test]
    fn end_is_idempotent() {
        let (mut uplink, tlog, _) = uplink();
        let events = uplink.events();

        uplink.set_mode(TransmissionMode::Continuous).unwrap();
        uplink.write(frame(0)).unwrap();
        assert_eq!(events_of(&events), vec![TalkEvent::StartedTalking]);

        uplink.end().unwrap();
        assert_eq!(events_of(&events), vec![TalkEvent::StoppedTalking]);
        assert_eq!(*tlog.streams_ended.lock(), 1);

        uplink.end().unwrap();
        assert!(events_of(&events).is_empty());
        assert_eq!(*tlog.streams_ended.lock(), 1);
    }

    #[test]
    fn mode_switch_mid_transmission_closes_stream_once() {
        let (mut uplink, tlog, blog) = uplink();
        let events = uplink.events();

        uplink.set_mode(TransmissionMode::Continuous).unwrap();
        uplink.write(frame(0)).unwrap();
        assert!(uplink.is_talking());

        uplink.set_mode(TransmissionMode::PushToTalk).unwrap();
        assert_eq!(
            events_of(&events),
            vec![TalkEvent::StartedTalking, TalkEvent::StoppedTalking]
        );
        assert_eq!(*tlog.streams_ended.lock(), 1);
        assert_eq!(blog.installed.lock().len(), 1);
        assert_eq!(uplink.mode(), Some(TransmissionMode::PushToTalk));
        assert!(!uplink.is_talking());
    }

    #[test]
    fn leaving_ptt_removes_bindings() {
        let (mut uplink, _, blog) = uplink();

        uplink.set_mode(TransmissionMode::PushToTalk).unwrap();
        uplink.set_mode(TransmissionMode::Continuous).unwrap();

        assert_eq!(blog.installed.lock().len(), 1);
        assert_eq!(blog.removed.lock().as_slice(), [DEFAULT_PTT_KEY]);
    }

    #[test]
    fn unknown_mode_disables_transmission() {
        let (mut uplink, tlog, _) = uplink();
        let events = uplink.events();

        uplink.set_mode(TransmissionMode::Continuous).unwrap();
        uplink.write(frame(0)).unwrap();

        let err = uplink.set_mode_str("vox").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        // Previous mode was finalized before the name was parsed
        assert_eq!(
            events_of(&events),
            vec![TalkEvent::StartedTalking, TalkEvent::StoppedTalking]
        );
        assert_eq!(uplink.mode(), None);

        // Transmission stays disabled
        uplink.write(frame(1)).unwrap();
        assert!(events_of(&events).is_empty());
        assert_eq!(*tlog.streams_opened.lock(), 1);
    }

    #[test]
    fn quality_reaches_transport_and_settings_apply() {
        let (mut uplink, tlog, blog) = uplink();

        let settings = Settings {
            voice_mode: "ptt".to_string(),
            ptt_key: "ctrl + t".to_string(),
            audio_bitrate: Some(40_000),
            samples_per_packet: 480,
        };
        uplink.apply_settings(&settings).unwrap();

        assert_eq!(tlog.quality.lock().as_slice(), [(Some(40_000), 480)]);
        assert_eq!(blog.installed.lock().as_slice(), ["ctrl + t"]);
        assert_eq!(uplink.mode(), Some(TransmissionMode::PushToTalk));
    }

    #[test]
    fn packets_keep_submission_order() {
        let (mut uplink, tlog, _) = uplink();

        uplink.set_mode(TransmissionMode::Continuous).unwrap();
        let n = 16;
        for i in 0..n {
            uplink.write(frame(i)).unwrap();
        }
        uplink.end().unwrap();

        let writes = tlog.writes.lock();
        assert_eq!(writes.len(), n as usize);
        // Silence frames after the first encode to different sizes as the
        // codec adapts, so only count and non-emptiness are stable; order
        // is asserted structurally below via the reorder queue
        assert!(writes.iter().all(|p| !p.payload.is_empty()));
    }

    fn packet(tag: u8) -> EncodedPacket {
        EncodedPacket {
            payload: Bytes::copy_from_slice(&[tag]),
            target: VoiceTarget::Normal,
            position: None,
        }
    }

    #[test]
    fn reorder_queue_restores_submission_order() {
        let mut queue = ReorderQueue::new();

        assert!(queue.push(2, packet(2)).is_empty());
        assert!(queue.push(1, packet(1)).is_empty());

        let ready = queue.push(0, packet(0));
        let tags: Vec<u8> = ready.iter().map(|p| p.payload[0]).collect();
        assert_eq!(tags, vec![0, 1, 2]);
        assert_eq!(queue.next_expected(), 3);
    }

    #[test]
    fn reorder_queue_skips_failed_tokens() {
        let mut queue = ReorderQueue::new();

        assert!(queue.push(1, packet(1)).is_empty());
        let ready = queue.skip(0);
        let tags: Vec<u8> = ready.iter().map(|p| p.payload[0]).collect();
        assert_eq!(tags, vec![1]);
    }

    #[test]
    fn reorder_queue_ignores_cancelled_results() {
        let mut queue = ReorderQueue::new();

        assert!(queue.push(1, packet(1)).is_empty());
        queue.cancel_before(3);

        // Late results from before the cancellation point are dropped
        assert!(queue.push(0, packet(0)).is_empty());
        assert!(queue.push(2, packet(2)).is_empty());

        let ready = queue.push(3, packet(3));
        let tags: Vec<u8> = ready.iter().map(|p| p.payload[0]).collect();
        assert_eq!(tags, vec![3]);
    }

    mod reorder_properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn any_completion_order_drains_in_submission_order(
                order in Just((0u64..24).collect::<Vec<_>>()).prop_shuffle()
            ) {
                let mut queue = ReorderQueue::new();
                let mut delivered = Vec::new();
                for &token in &order {
                    for p in queue.push(token, packet(token as u8)) {
                        delivered.push(p.payload[0] as u64);
                    }
                }
                let expected: Vec<u64> = (0..24).collect();
                prop_assert_eq!(delivered, expected);
            }
        }
    }
}
