use crate::models::chunk::RecordingResult;
use crate::models::error::RecorderError;
use crate::models::state::SessionStatus;

/// Object-safe facade over a recording session controller.
///
/// The two operations exposed to callers: start a session, stop it. The
/// resolved chunks of a session are the `Ok(Some(result))` of
/// `stop_session`.
pub trait SessionControl: Send {
    /// Current session status.
    fn status(&self) -> SessionStatus;

    /// Acquire sources, mix, and begin chunked recording.
    fn start_session(&mut self) -> Result<(), RecorderError>;

    /// Stop recording, seal the final chunk, and release every acquired
    /// source. Idempotent: returns `Ok(None)` when no session is active.
    fn stop_session(&mut self) -> Result<Option<RecordingResult>, RecorderError>;
}
