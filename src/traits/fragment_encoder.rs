use std::sync::mpsc;

use crate::models::chunk::EncodedFragment;
use crate::models::error::RecorderError;
use crate::models::stream::MixedStream;

/// Event emitted by an encoder over its event channel.
///
/// Delivery is strictly in emission order. `Finalized` is sent exactly
/// once, after `stop`, and closes the stream; the flush may or may not
/// carry a final fragment.
#[derive(Debug)]
pub enum EncoderEvent {
    Fragment(EncodedFragment),
    Finalized(Option<EncodedFragment>),
}

/// Interface to the opaque encoder/container muxer.
///
/// The encoder consumes a mixed stream and periodically emits binary
/// fragments of the agreed container format. Output is delivered over the
/// channel handed to `start`, which replaces per-fragment callbacks with
/// explicit completion semantics: the recorder owns the receiving end and
/// drains it from a single thread.
pub trait FragmentEncoder: Send {
    /// Begin encoding `stream` into `container`, delivering output via
    /// `events`. The sender may be moved to an encoder-owned thread.
    fn start(
        &mut self,
        stream: &MixedStream,
        container: &str,
        events: mpsc::Sender<EncoderEvent>,
    ) -> Result<(), RecorderError>;

    /// Signal the encoder to flush and finalize. The encoder responds
    /// with one `Finalized` event carrying any trailing fragment.
    fn stop(&mut self) -> Result<(), RecorderError>;
}
