use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Kind of capture source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Microphone,
    System,
}

/// Origin of an audio track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Microphone,
    System,
    /// Synthesized by the channel merge node.
    Merged,
}

/// Channel layout of a mixed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelLayout {
    /// Raw track union; a downstream encoder folds the tracks into one
    /// channel.
    MergedMono,
    /// Merge-node output: primary on channel 0, secondary on channel 1.
    DualChannel,
    /// Only the primary source is present (channel 1 silent, if routed).
    SingleSourceFallback,
}

/// Opaque handle to one live track of a capture source.
///
/// Clones alias the same liveness flag, so a mixed stream that reuses a
/// source's tracks goes silent when that source is stopped.
#[derive(Debug, Clone)]
pub struct AudioTrack {
    id: String,
    kind: TrackKind,
    live: Arc<AtomicBool>,
}

impl AudioTrack {
    pub fn new(id: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            kind,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    /// A track whose liveness follows `upstream` (a merge-node output
    /// dies with its driving input).
    pub fn derived(id: impl Into<String>, kind: TrackKind, upstream: &AudioTrack) -> Self {
        Self {
            id: id.into(),
            kind,
            live: Arc::clone(&upstream.live),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Stop the track. Returns `true` only for the call that actually
    /// transitioned it from live to stopped.
    pub fn stop(&self) -> bool {
        self.live.swap(false, Ordering::SeqCst)
    }
}

/// Handle to a live audio source with one or more tracks.
///
/// Providers return a fresh handle per acquisition; handles are never
/// reused across acquisitions.
#[derive(Debug)]
pub struct AudioSource {
    kind: SourceKind,
    tracks: Vec<AudioTrack>,
    active: bool,
}

impl AudioSource {
    pub fn new(kind: SourceKind, tracks: Vec<AudioTrack>) -> Self {
        Self {
            kind,
            tracks,
            active: true,
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn tracks(&self) -> &[AudioTrack] {
        &self.tracks
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Clones of the tracks that are still live.
    pub fn live_tracks(&self) -> Vec<AudioTrack> {
        self.tracks
            .iter()
            .filter(|t| t.is_live())
            .cloned()
            .collect()
    }

    /// Stop every track and deactivate the source. Idempotent; returns
    /// the number of tracks stopped by this call.
    pub fn stop_tracks(&mut self) -> usize {
        if !self.active {
            return 0;
        }
        self.active = false;
        self.tracks.iter().filter(|t| t.stop()).count()
    }
}

/// The single combined stream fed to the encoder.
///
/// Tracks may alias source tracks (multiplexing) or be synthesized by the
/// merge node (channel routing); either way the stream is torn down
/// implicitly when the sources' tracks are stopped.
#[derive(Debug)]
pub struct MixedStream {
    tracks: Vec<AudioTrack>,
    channel_layout: ChannelLayout,
}

impl MixedStream {
    pub fn new(tracks: Vec<AudioTrack>, channel_layout: ChannelLayout) -> Self {
        Self {
            tracks,
            channel_layout,
        }
    }

    pub fn tracks(&self) -> &[AudioTrack] {
        &self.tracks
    }

    pub fn channel_layout(&self) -> ChannelLayout {
        self.channel_layout
    }

    pub fn is_live(&self) -> bool {
        self.tracks.iter().any(|t| t.is_live())
    }
}
