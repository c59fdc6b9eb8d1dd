use thiserror::Error;

/// Errors that can occur while acquiring sources, mixing, or recording.
///
/// Every variant's `Display` output is a human-readable description; the
/// string payload names the failing subject ("microphone", "system audio")
/// or the underlying cause.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    /// The user declined access to a capture device.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The capability is absent in the host environment.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Generic acquisition or hardware failure.
    #[error("device error: {0}")]
    DeviceError(String),

    /// The encoder failed to start, emit, or finalize.
    #[error("encoding error: {0}")]
    EncodingError(String),

    /// The operation is not legal in the current state.
    ///
    /// Stopping with no active recording is not this error; the session
    /// treats that as a harmless no-op.
    #[error("invalid state: {0}")]
    InvalidState(String),
}
