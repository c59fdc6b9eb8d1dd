//! # mixcap-core
//!
//! Platform-agnostic dual-source audio recording core.
//!
//! Captures a microphone source and a system-audio source, combines them
//! into one recordable stream, and buffers the encoder's output into
//! size-bounded chunks that are handed back when recording stops. Device
//! access, encoding, and user alerting are collaborator seams: platform
//! backends implement `SourceProvider` and `FragmentEncoder` and plug
//! into the generic `RecordingSession`.
//!
//! ## Architecture
//!
//! ```text
//! mixcap-core (this crate)
//! ├── traits/      ← SourceProvider, FragmentEncoder, SessionDelegate, SessionControl
//! ├── models/      ← RecorderError, SessionStatus, SessionConfig, AudioSource, chunks
//! ├── mixing/      ← StreamMixer (multiplex / channel-routed)
//! ├── recording/   ← ChunkBuffer, ChunkedRecorder (fragment drain, chunk sealing)
//! └── session/     ← RecordingSession (generic orchestrator)
//! ```

pub mod mixing;
pub mod models;
pub mod recording;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use mixing::stream_mixer::{ChannelMergeNode, StreamMixer};
pub use models::chunk::{EncodedFragment, RecordedChunk, RecordingMetadata, RecordingResult};
pub use models::config::{
    MixingStrategy, SessionConfig, SystemAudioPolicy, DEFAULT_CHUNK_THRESHOLD_BYTES,
};
pub use models::error::RecorderError;
pub use models::state::SessionStatus;
pub use models::stream::{AudioSource, AudioTrack, ChannelLayout, MixedStream, SourceKind, TrackKind};
pub use recording::chunk_buffer::ChunkBuffer;
pub use recording::chunked_recorder::{ChunkedRecorder, RecorderDiagnostics, RecorderPhase};
pub use session::controller::RecordingSession;
pub use traits::fragment_encoder::{EncoderEvent, FragmentEncoder};
pub use traits::session_control::SessionControl;
pub use traits::session_delegate::SessionDelegate;
pub use traits::source_provider::SourceProvider;
