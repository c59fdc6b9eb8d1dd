use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::models::chunk::RecordedChunk;
use crate::models::error::RecorderError;
use crate::models::stream::{ChannelLayout, MixedStream};
use crate::recording::chunk_buffer::ChunkBuffer;
use crate::traits::fragment_encoder::{EncoderEvent, FragmentEncoder};

/// Recorder phase machine: `idle → recording → stopping → stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderPhase {
    Idle,
    Recording,
    Stopping,
    Stopped,
}

/// Counters for debugging a recording, updated by the drain thread.
#[derive(Debug, Clone, Default)]
pub struct RecorderDiagnostics {
    pub fragments_received: u64,
    pub bytes_received: u64,
    pub chunks_sealed: u64,
}

/// Drives an encoder over a mixed stream and accumulates its fragments
/// into size-bounded chunks.
///
/// The recorder owns the mixed stream for the session's duration and
/// drains the encoder's event channel on a dedicated thread. That thread
/// is the single owner of the chunk buffer, so appends and the
/// check-and-seal after each append run without locking and never
/// reorder fragments.
pub struct ChunkedRecorder {
    threshold_bytes: usize,
    mime_type: String,
    phase: RecorderPhase,
    stream: Option<MixedStream>,
    diagnostics: Arc<Mutex<RecorderDiagnostics>>,
    drain: Option<thread::JoinHandle<Vec<RecordedChunk>>>,
}

impl ChunkedRecorder {
    pub fn new(threshold_bytes: usize, mime_type: String) -> Self {
        Self {
            threshold_bytes,
            mime_type,
            phase: RecorderPhase::Idle,
            stream: None,
            diagnostics: Arc::new(Mutex::new(RecorderDiagnostics::default())),
            drain: None,
        }
    }

    pub fn phase(&self) -> RecorderPhase {
        self.phase
    }

    pub fn channel_layout(&self) -> Option<ChannelLayout> {
        self.stream.as_ref().map(MixedStream::channel_layout)
    }

    pub fn diagnostics(&self) -> RecorderDiagnostics {
        self.diagnostics.lock().clone()
    }

    /// Start the encoder against `stream` and begin draining fragments.
    /// Transitions: idle → recording.
    pub fn start<E: FragmentEncoder>(
        &mut self,
        encoder: &mut E,
        stream: MixedStream,
    ) -> Result<(), RecorderError> {
        if self.phase != RecorderPhase::Idle {
            return Err(RecorderError::InvalidState(format!(
                "recorder can only start from idle, not {:?}",
                self.phase
            )));
        }

        let (events, receiver) = mpsc::channel();
        encoder.start(&stream, &self.mime_type, events)?;

        let threshold = self.threshold_bytes;
        let mime_type = self.mime_type.clone();
        let diagnostics = Arc::clone(&self.diagnostics);
        let handle = thread::Builder::new()
            .name("fragment-drain".into())
            .spawn(move || drain_fragments(receiver, threshold, &mime_type, &diagnostics))
            .map_err(|e| {
                RecorderError::EncodingError(format!("failed to spawn drain thread: {e}"))
            })?;

        self.drain = Some(handle);
        self.stream = Some(stream);
        self.phase = RecorderPhase::Recording;
        Ok(())
    }

    /// Signal the encoder to flush and finalize, then collect the sealed
    /// chunks, oldest first. Transitions: recording → stopping → stopped.
    pub fn stop<E: FragmentEncoder>(
        &mut self,
        encoder: &mut E,
    ) -> Result<Vec<RecordedChunk>, RecorderError> {
        if self.phase != RecorderPhase::Recording {
            return Err(RecorderError::InvalidState(format!(
                "recorder can only stop from recording, not {:?}",
                self.phase
            )));
        }

        self.phase = RecorderPhase::Stopping;
        if let Err(err) = encoder.stop() {
            // The drain thread unblocks once the encoder drops its sender;
            // detach it rather than risk joining against a hung flush.
            self.drain = None;
            self.phase = RecorderPhase::Stopped;
            return Err(err);
        }

        let chunks = match self.drain.take() {
            Some(handle) => handle.join().map_err(|_| {
                RecorderError::EncodingError("fragment drain thread panicked".into())
            })?,
            None => Vec::new(),
        };
        self.phase = RecorderPhase::Stopped;
        Ok(chunks)
    }
}

/// Drain loop: single owner of the chunk buffer.
///
/// Appends each fragment in arrival order and seals synchronously after
/// every append that crosses the threshold. On finalization (or a closed
/// channel, the documented abort path) any buffered remainder is sealed
/// into one last, possibly undersized chunk so no fragment is dropped.
fn drain_fragments(
    receiver: mpsc::Receiver<EncoderEvent>,
    threshold: usize,
    mime_type: &str,
    diagnostics: &Mutex<RecorderDiagnostics>,
) -> Vec<RecordedChunk> {
    let mut buffer = ChunkBuffer::new(threshold);
    let mut chunks = Vec::new();

    loop {
        match receiver.recv() {
            Ok(EncoderEvent::Fragment(fragment)) => {
                {
                    let mut d = diagnostics.lock();
                    d.fragments_received += 1;
                    d.bytes_received += fragment.size_bytes() as u64;
                }
                buffer.append(fragment);
                if buffer.is_full() {
                    let chunk = buffer.seal(mime_type);
                    log::debug!("sealed chunk {} ({} bytes)", chunks.len(), chunk.size_bytes());
                    diagnostics.lock().chunks_sealed += 1;
                    chunks.push(chunk);
                }
            }
            Ok(EncoderEvent::Finalized(trailing)) => {
                if let Some(fragment) = trailing {
                    let mut d = diagnostics.lock();
                    d.fragments_received += 1;
                    d.bytes_received += fragment.size_bytes() as u64;
                    drop(d);
                    buffer.append(fragment);
                }
                break;
            }
            Err(mpsc::RecvError) => {
                log::warn!("encoder event channel closed before finalization");
                break;
            }
        }
    }

    if !buffer.is_empty() {
        let chunk = buffer.seal(mime_type);
        log::debug!("sealed final chunk ({} bytes)", chunk.size_bytes());
        diagnostics.lock().chunks_sealed += 1;
        chunks.push(chunk);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chunk::EncodedFragment;
    use crate::models::stream::{AudioSource, AudioTrack, SourceKind, TrackKind};

    /// Scripted encoder: emits its fragments when started, and the
    /// finalization flush when stopped.
    struct ScriptedEncoder {
        fragments: Vec<Vec<u8>>,
        trailing: Option<Vec<u8>>,
        fail_start: bool,
        events: Option<mpsc::Sender<EncoderEvent>>,
        started_container: Option<String>,
    }

    impl ScriptedEncoder {
        fn new(fragments: Vec<Vec<u8>>, trailing: Option<Vec<u8>>) -> Self {
            Self {
                fragments,
                trailing,
                fail_start: false,
                events: None,
                started_container: None,
            }
        }
    }

    impl FragmentEncoder for ScriptedEncoder {
        fn start(
            &mut self,
            _stream: &MixedStream,
            container: &str,
            events: mpsc::Sender<EncoderEvent>,
        ) -> Result<(), RecorderError> {
            if self.fail_start {
                return Err(RecorderError::EncodingError(
                    "scripted encoder refused to start".into(),
                ));
            }
            self.started_container = Some(container.to_string());
            for bytes in self.fragments.drain(..) {
                events
                    .send(EncoderEvent::Fragment(EncodedFragment::new(bytes)))
                    .expect("drain thread alive");
            }
            self.events = Some(events);
            Ok(())
        }

        fn stop(&mut self) -> Result<(), RecorderError> {
            let events = self
                .events
                .take()
                .ok_or_else(|| RecorderError::InvalidState("encoder not started".into()))?;
            let trailing = self.trailing.take().map(EncodedFragment::new);
            events
                .send(EncoderEvent::Finalized(trailing))
                .expect("drain thread alive");
            Ok(())
        }
    }

    fn mic_stream() -> MixedStream {
        let source = AudioSource::new(
            SourceKind::Microphone,
            vec![AudioTrack::new("mic-0", TrackKind::Microphone)],
        );
        MixedStream::new(source.live_tracks(), ChannelLayout::SingleSourceFallback)
    }

    fn run_recorder(
        threshold: usize,
        fragments: Vec<Vec<u8>>,
        trailing: Option<Vec<u8>>,
    ) -> Vec<RecordedChunk> {
        let mut encoder = ScriptedEncoder::new(fragments, trailing);
        let mut recorder = ChunkedRecorder::new(threshold, "audio/webm".into());
        recorder.start(&mut encoder, mic_stream()).unwrap();
        recorder.stop(&mut encoder).unwrap()
    }

    #[test]
    fn stop_before_any_fragment_yields_empty_sequence() {
        let chunks = run_recorder(10, vec![], None);

        assert!(chunks.is_empty());
    }

    #[test]
    fn fragments_4_4_4_with_threshold_10_make_one_chunk_of_12() {
        let chunks = run_recorder(10, vec![vec![1; 4], vec![2; 4], vec![3; 4]], None);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].size_bytes(), 12);
        assert_eq!(chunks[0].fragment_count(), 3);
    }

    #[test]
    fn no_bytes_are_lost_and_order_is_preserved() {
        let fragments = vec![vec![1, 2, 3], vec![4, 5], vec![6], vec![7, 8, 9, 10]];
        let expected: Vec<u8> = fragments.iter().flatten().copied().collect();

        let chunks = run_recorder(4, fragments, Some(vec![11, 12]));

        let total: usize = chunks.iter().map(RecordedChunk::size_bytes).sum();
        assert_eq!(total, expected.len() + 2);
        let mut replay: Vec<u8> = Vec::new();
        for chunk in &chunks {
            replay.extend_from_slice(chunk.as_bytes());
        }
        assert_eq!(&replay[..expected.len()], &expected[..]);
        assert_eq!(&replay[expected.len()..], &[11, 12]);
    }

    #[test]
    fn only_the_last_chunk_may_be_undersized() {
        let chunks = run_recorder(
            4,
            vec![vec![0; 3], vec![0; 2], vec![0; 3], vec![0; 2], vec![0; 2]],
            None,
        );

        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].size_bytes() >= 4);
        assert!(chunks[1].size_bytes() >= 4);
        assert_eq!(chunks[2].size_bytes(), 2);
    }

    #[test]
    fn oversized_fragment_seals_a_chunk_by_itself() {
        let chunks = run_recorder(4, vec![vec![0; 10], vec![0; 1]], None);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].size_bytes(), 10);
        assert_eq!(chunks[0].fragment_count(), 1);
        assert_eq!(chunks[1].size_bytes(), 1);
    }

    #[test]
    fn trailing_flush_fragment_lands_in_the_final_chunk() {
        let chunks = run_recorder(10, vec![vec![1; 4], vec![2; 4], vec![3; 4]], Some(vec![9; 2]));

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].size_bytes(), 12);
        assert_eq!(chunks[1].size_bytes(), 2);
    }

    #[test]
    fn recorder_tracks_phase_and_diagnostics() {
        let mut encoder = ScriptedEncoder::new(vec![vec![0; 6], vec![0; 6]], None);
        let mut recorder = ChunkedRecorder::new(4, "audio/webm".into());
        assert_eq!(recorder.phase(), RecorderPhase::Idle);

        recorder.start(&mut encoder, mic_stream()).unwrap();
        assert_eq!(recorder.phase(), RecorderPhase::Recording);
        assert_eq!(
            recorder.channel_layout(),
            Some(ChannelLayout::SingleSourceFallback)
        );

        let chunks = recorder.stop(&mut encoder).unwrap();
        assert_eq!(recorder.phase(), RecorderPhase::Stopped);
        assert_eq!(chunks.len(), 2);

        let diagnostics = recorder.diagnostics();
        assert_eq!(diagnostics.fragments_received, 2);
        assert_eq!(diagnostics.bytes_received, 12);
        assert_eq!(diagnostics.chunks_sealed, 2);
    }

    #[test]
    fn start_twice_is_an_invalid_state() {
        let mut encoder = ScriptedEncoder::new(vec![], None);
        let mut recorder = ChunkedRecorder::new(4, "audio/webm".into());
        recorder.start(&mut encoder, mic_stream()).unwrap();

        let mut second = ScriptedEncoder::new(vec![], None);
        let err = recorder.start(&mut second, mic_stream()).unwrap_err();

        assert!(matches!(err, RecorderError::InvalidState(_)));
        recorder.stop(&mut encoder).unwrap();
    }

    #[test]
    fn failed_encoder_start_leaves_the_recorder_idle() {
        let mut encoder = ScriptedEncoder::new(vec![], None);
        encoder.fail_start = true;
        let mut recorder = ChunkedRecorder::new(4, "audio/webm".into());

        let err = recorder.start(&mut encoder, mic_stream()).unwrap_err();

        assert!(matches!(err, RecorderError::EncodingError(_)));
        assert_eq!(recorder.phase(), RecorderPhase::Idle);
    }

    #[test]
    fn encoder_receives_the_configured_container() {
        let mut encoder = ScriptedEncoder::new(vec![], None);
        let mut recorder = ChunkedRecorder::new(4, "audio/ogg".into());

        recorder.start(&mut encoder, mic_stream()).unwrap();
        recorder.stop(&mut encoder).unwrap();

        assert_eq!(encoder.started_container.as_deref(), Some("audio/ogg"));
    }
}
