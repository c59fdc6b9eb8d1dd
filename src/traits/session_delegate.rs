use crate::models::chunk::RecordingResult;
use crate::models::error::RecorderError;
use crate::models::state::SessionStatus;

/// Notification sink for session events.
///
/// `description` strings are display-ready and distinguish permission
/// denial from unsupported capability from other device errors.
/// Implementations should marshal to the UI thread if needed.
pub trait SessionDelegate: Send + Sync {
    /// Called on every session status transition.
    fn on_status_changed(&self, status: &SessionStatus);

    /// Called on every failure path with the error and a human-readable
    /// description suitable for direct display.
    fn on_error(&self, error: &RecorderError, description: &str);

    /// Called once the session has fully stopped and the final chunks
    /// are sealed.
    fn on_session_finished(&self, result: &RecordingResult);
}
