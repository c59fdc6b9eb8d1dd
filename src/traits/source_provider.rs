use crate::models::error::RecorderError;
use crate::models::stream::{AudioSource, SourceKind};

/// Interface to the host's device/permission subsystem for one source
/// kind.
///
/// Implemented by platform backends (e.g. a WASAPI microphone provider,
/// a loopback capture provider) and by in-memory fakes in tests.
pub trait SourceProvider: Send {
    /// Which source this provider acquires.
    fn kind(&self) -> SourceKind;

    /// Whether the capability exists in the running environment at all.
    ///
    /// Checked before `acquire` so an unsupported host fails fast without
    /// prompting the user.
    fn is_supported(&self) -> bool;

    /// Acquire a live source.
    ///
    /// May block indefinitely pending a consent prompt, and may be
    /// cancelled by the host (surfaced as `PermissionDenied` or
    /// `DeviceError`). Each successful call opens a new device handle;
    /// prior handles are never reused.
    fn acquire(&mut self) -> Result<AudioSource, RecorderError>;
}
