use crate::models::config::MixingStrategy;
use crate::models::error::RecorderError;
use crate::models::stream::{AudioSource, AudioTrack, ChannelLayout, MixedStream, TrackKind};

/// Two-input channel merge node.
///
/// Sums each input per channel: channel 0 carries the primary source,
/// channel 1 the secondary. The synthesized output is a single track
/// whose left/right channels correspond to microphone/system, regardless
/// of the inputs' native channel counts.
#[derive(Debug)]
pub struct ChannelMergeNode {
    channel_inputs: [Vec<AudioTrack>; 2],
}

impl ChannelMergeNode {
    pub fn new(primary: Vec<AudioTrack>, secondary: Vec<AudioTrack>) -> Self {
        Self {
            channel_inputs: [primary, secondary],
        }
    }

    pub fn channel_inputs(&self, channel: usize) -> &[AudioTrack] {
        &self.channel_inputs[channel]
    }

    /// Synthesize the merged output track.
    ///
    /// Liveness follows the first primary input, so the output dies when
    /// its driving source is stopped.
    ///
    /// # Panics
    ///
    /// Panics if channel 0 has no inputs; the mixer rejects a dead
    /// primary before building the node.
    pub fn output_track(&self) -> AudioTrack {
        let driver = &self.channel_inputs[0][0];
        AudioTrack::derived(format!("merge({})", driver.id()), TrackKind::Merged, driver)
    }
}

/// Combines a primary source and an optional secondary source into one
/// recordable stream.
#[derive(Debug, Clone, Copy)]
pub struct StreamMixer {
    strategy: MixingStrategy,
}

impl StreamMixer {
    pub fn new(strategy: MixingStrategy) -> Self {
        Self { strategy }
    }

    /// Mix `primary` with an optional `secondary` source.
    ///
    /// A primary with no live tracks means there is no usable audio
    /// pipeline, which is fatal. A secondary with no live tracks is
    /// treated as absent.
    pub fn mix(
        &self,
        primary: &AudioSource,
        secondary: Option<&AudioSource>,
    ) -> Result<MixedStream, RecorderError> {
        let primary_tracks = primary.live_tracks();
        if primary_tracks.is_empty() {
            return Err(RecorderError::DeviceError(
                "primary source has no live audio tracks".into(),
            ));
        }

        let secondary_tracks = secondary
            .map(AudioSource::live_tracks)
            .filter(|tracks| !tracks.is_empty());

        let stream = match self.strategy {
            MixingStrategy::Multiplex => match secondary_tracks {
                Some(mut extra) => {
                    let mut tracks = primary_tracks;
                    tracks.append(&mut extra);
                    MixedStream::new(tracks, ChannelLayout::MergedMono)
                }
                None => MixedStream::new(primary_tracks, ChannelLayout::SingleSourceFallback),
            },
            MixingStrategy::ChannelRouted => {
                let layout = if secondary_tracks.is_some() {
                    ChannelLayout::DualChannel
                } else {
                    ChannelLayout::SingleSourceFallback
                };
                let node =
                    ChannelMergeNode::new(primary_tracks, secondary_tracks.unwrap_or_default());
                MixedStream::new(vec![node.output_track()], layout)
            }
        };
        Ok(stream)
    }
}
