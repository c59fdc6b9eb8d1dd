/// Default chunk seal boundary: 500 MiB.
pub const DEFAULT_CHUNK_THRESHOLD_BYTES: usize = 500 * 1024 * 1024;

/// How two sources are combined into one recordable stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixingStrategy {
    /// The output track list is the union of both sources' track lists,
    /// with no signal processing. Relies on the downstream encoder to
    /// interpret multiple raw tracks.
    Multiplex,

    /// Each source is summed per channel through a two-input merge node:
    /// primary on channel 0, secondary on channel 1. Yields a single
    /// well-formed output track even when the sources' native channel
    /// counts differ.
    ChannelRouted,
}

/// What to do when the system-audio source cannot be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemAudioPolicy {
    /// Any system-audio failure aborts the whole session.
    Required,

    /// Log a warning and record microphone-only.
    FallbackToMicrophone,
}

/// Configuration for a recording session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Accumulated size at which a chunk is sealed (default: 500 MiB).
    pub chunk_threshold_bytes: usize,

    /// Container MIME type tagged onto every sealed chunk and handed to
    /// the encoder (default: `audio/webm`).
    pub mime_type: String,

    /// Mixing strategy (default: `ChannelRouted`).
    pub mixing: MixingStrategy,

    /// System-audio failure policy (default: `FallbackToMicrophone`).
    pub system_audio: SystemAudioPolicy,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_threshold_bytes == 0 {
            return Err("chunk threshold must be at least one byte".into());
        }
        if self.mime_type.is_empty() {
            return Err("container MIME type must not be empty".into());
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            chunk_threshold_bytes: DEFAULT_CHUNK_THRESHOLD_BYTES,
            mime_type: "audio/webm".into(),
            mixing: MixingStrategy::ChannelRouted,
            system_audio: SystemAudioPolicy::FallbackToMicrophone,
        }
    }
}
