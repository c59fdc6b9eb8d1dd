use std::sync::Arc;
use std::time::Instant;

use crate::mixing::stream_mixer::StreamMixer;
use crate::models::chunk::RecordingResult;
use crate::models::config::{SessionConfig, SystemAudioPolicy};
use crate::models::error::RecorderError;
use crate::models::state::SessionStatus;
use crate::models::stream::{AudioSource, ChannelLayout};
use crate::recording::chunked_recorder::{ChunkedRecorder, RecorderDiagnostics};
use crate::traits::fragment_encoder::FragmentEncoder;
use crate::traits::session_control::SessionControl;
use crate::traits::session_delegate::SessionDelegate;
use crate::traits::source_provider::SourceProvider;

/// Orchestrates one recording session: acquire → mix → record → stop.
///
/// Generic over the microphone and system-audio providers and the
/// encoder. Owns every acquired source and guarantees scoped release:
/// whichever stage fails and however the session ends, each source's
/// tracks are stopped exactly once.
///
/// Data flow:
/// ```text
/// [Mic Provider] ──┐
///                  ├→ [StreamMixer] → [ChunkedRecorder] → chunks
/// [Sys Provider] ──┘
/// ```
pub struct RecordingSession<M: SourceProvider, S: SourceProvider, E: FragmentEncoder> {
    mic: M,
    system: S,
    encoder: E,
    config: SessionConfig,
    status: SessionStatus,
    delegate: Option<Arc<dyn SessionDelegate>>,
    sources: Vec<AudioSource>,
    recorder: Option<ChunkedRecorder>,
    started_at: Option<Instant>,
}

impl<M: SourceProvider, S: SourceProvider, E: FragmentEncoder> RecordingSession<M, S, E> {
    pub fn new(mic: M, system: S, encoder: E, config: SessionConfig) -> Result<Self, RecorderError> {
        config.validate().map_err(RecorderError::InvalidState)?;
        Ok(Self {
            mic,
            system,
            encoder,
            config,
            status: SessionStatus::Idle,
            delegate: None,
            sources: Vec::new(),
            recorder: None,
            started_at: None,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn SessionDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn status(&self) -> SessionStatus {
        self.status.clone()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Recorder counters for the active session, if one is running.
    pub fn diagnostics(&self) -> Option<RecorderDiagnostics> {
        self.recorder.as_ref().map(ChunkedRecorder::diagnostics)
    }

    /// Acquire sources, mix, and begin chunked recording.
    /// Transitions: idle → acquiring → recording.
    ///
    /// Microphone failure is terminal with no fallback; the system-audio
    /// provider is not consulted afterwards. System-audio failure follows
    /// the configured policy. Every abort path releases the sources
    /// acquired up to that point.
    pub fn start_session(&mut self) -> Result<(), RecorderError> {
        if !self.status.is_idle() {
            return Err(RecorderError::InvalidState(format!(
                "cannot start a session while {:?}",
                self.status
            )));
        }
        self.set_status(SessionStatus::Acquiring);

        match self.mic.acquire() {
            Ok(source) => {
                log::info!("microphone acquired ({} track(s))", source.tracks().len());
                self.sources.push(source);
            }
            Err(err) => {
                let description = describe_microphone_failure(&err);
                return Err(self.abort(err, &description));
            }
        }

        if let Some(source) = self.acquire_system_audio()? {
            log::info!("system audio acquired ({} track(s))", source.tracks().len());
            self.sources.push(source);
        }

        let mixer = StreamMixer::new(self.config.mixing);
        let stream = match mixer.mix(&self.sources[0], self.sources.get(1)) {
            Ok(stream) => stream,
            Err(err) => {
                let description = format!("Audio mixing failed: {err}.");
                return Err(self.abort(err, &description));
            }
        };
        log::info!(
            "mixed stream ready: {:?} layout, {} track(s)",
            stream.channel_layout(),
            stream.tracks().len()
        );

        let mut recorder = ChunkedRecorder::new(
            self.config.chunk_threshold_bytes,
            self.config.mime_type.clone(),
        );
        if let Err(err) = recorder.start(&mut self.encoder, stream) {
            let description = format!("Recording could not be started: {err}.");
            return Err(self.abort(err, &description));
        }
        self.recorder = Some(recorder);
        self.started_at = Some(Instant::now());
        self.set_status(SessionStatus::Recording);
        Ok(())
    }

    /// Stop recording, seal the final chunk, and release every acquired
    /// source. Transitions: recording → stopping → stopped → idle.
    ///
    /// Idempotent: with no active session this is a no-op returning
    /// `Ok(None)`, never an error. The returned chunks are the resolved
    /// value of the session.
    pub fn stop_session(&mut self) -> Result<Option<RecordingResult>, RecorderError> {
        if !self.status.is_recording() {
            log::debug!("stop requested with no active recording");
            return Ok(None);
        }
        self.set_status(SessionStatus::Stopping);

        let mut recorder = self.recorder.take();
        let outcome = match recorder.as_mut() {
            Some(recorder) => recorder.stop(&mut self.encoder),
            None => Ok(Vec::new()),
        };
        // Sources are released no matter how finalization went.
        self.release_sources();

        let chunks = match outcome {
            Ok(chunks) => chunks,
            Err(err) => {
                let description = format!("Recording could not be finalized: {err}.");
                log::error!("session failed while stopping: {err}");
                if let Some(delegate) = &self.delegate {
                    delegate.on_error(&err, &description);
                }
                self.set_status(SessionStatus::Failed(err.clone()));
                return Err(err);
            }
        };

        let channel_layout = recorder
            .as_ref()
            .and_then(ChunkedRecorder::channel_layout)
            .unwrap_or(ChannelLayout::SingleSourceFallback);
        let duration_secs = self
            .started_at
            .take()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        let result = RecordingResult::new(
            chunks,
            &self.config.mime_type,
            channel_layout,
            duration_secs,
        );
        log::info!(
            "session finished: {} chunk(s), {} bytes",
            result.chunks.len(),
            result.total_size_bytes()
        );

        self.set_status(SessionStatus::Stopped);
        if let Some(delegate) = &self.delegate {
            delegate.on_session_finished(&result);
        }
        // Ready for the next session.
        self.status = SessionStatus::Idle;
        Ok(Some(result))
    }

    /// Acquire the system-audio source under the configured policy.
    ///
    /// An unsupported host fails fast without prompting the user.
    /// `Ok(None)` means recording proceeds microphone-only.
    fn acquire_system_audio(&mut self) -> Result<Option<AudioSource>, RecorderError> {
        if !self.system.is_supported() {
            let err = RecorderError::NotSupported("system audio capture".into());
            return match self.config.system_audio {
                SystemAudioPolicy::Required => {
                    let description = describe_system_audio_failure(&err);
                    Err(self.abort(err, &description))
                }
                SystemAudioPolicy::FallbackToMicrophone => {
                    log::warn!("system audio capture is not supported here, recording microphone only");
                    Ok(None)
                }
            };
        }

        match self.system.acquire() {
            Ok(source) => Ok(Some(source)),
            Err(err) => match self.config.system_audio {
                SystemAudioPolicy::Required => {
                    let description = describe_system_audio_failure(&err);
                    Err(self.abort(err, &description))
                }
                SystemAudioPolicy::FallbackToMicrophone => {
                    log::warn!("system audio capture failed ({err}), recording microphone only");
                    Ok(None)
                }
            },
        }
    }

    /// Fail the session: release acquired sources, notify, mark failed.
    fn abort(&mut self, err: RecorderError, description: &str) -> RecorderError {
        self.release_sources();
        log::error!("session aborted: {err}");
        if let Some(delegate) = &self.delegate {
            delegate.on_error(&err, description);
        }
        self.set_status(SessionStatus::Failed(err.clone()));
        err
    }

    /// Stop every acquired source's tracks exactly once. The list is
    /// drained, so a later call finds nothing left to stop.
    fn release_sources(&mut self) {
        for mut source in self.sources.drain(..) {
            let stopped = source.stop_tracks();
            log::debug!("released {:?} source ({stopped} track(s) stopped)", source.kind());
        }
        self.started_at = None;
    }

    fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
        if let Some(delegate) = &self.delegate {
            delegate.on_status_changed(&self.status);
        }
    }
}

impl<M: SourceProvider, S: SourceProvider, E: FragmentEncoder> SessionControl
    for RecordingSession<M, S, E>
{
    fn status(&self) -> SessionStatus {
        RecordingSession::status(self)
    }

    fn start_session(&mut self) -> Result<(), RecorderError> {
        RecordingSession::start_session(self)
    }

    fn stop_session(&mut self) -> Result<Option<RecordingResult>, RecorderError> {
        RecordingSession::stop_session(self)
    }
}

fn describe_microphone_failure(err: &RecorderError) -> String {
    match err {
        RecorderError::PermissionDenied(_) => {
            "Permission to access the microphone was denied. Allow microphone access to record audio.".into()
        }
        other => format!("The microphone could not be accessed: {other}."),
    }
}

fn describe_system_audio_failure(err: &RecorderError) -> String {
    match err {
        RecorderError::PermissionDenied(_) => {
            "Permission to capture system audio was denied. Allow access to record audio.".into()
        }
        RecorderError::NotSupported(_) => {
            "System audio capture is not supported in this environment.".into()
        }
        other => format!("System audio could not be captured: {other}."),
    }
}
