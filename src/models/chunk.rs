use serde::{Deserialize, Serialize};

use super::stream::ChannelLayout;

/// One opaque unit of encoder output, delivered in emission order and
/// consumed immediately into the active chunk buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFragment {
    bytes: Vec<u8>,
}

impl EncodedFragment {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// A sealed, size-bounded concatenation of whole fragments, tagged with
/// the container MIME type. The unit returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedChunk {
    bytes: Vec<u8>,
    mime_type: String,
    fragment_count: usize,
}

impl RecordedChunk {
    /// Concatenate `fragments` into one blob. Fragment boundaries are
    /// preserved only as a count; a fragment is never split across chunks.
    pub fn from_fragments(fragments: Vec<EncodedFragment>, mime_type: &str) -> Self {
        let total: usize = fragments.iter().map(EncodedFragment::size_bytes).sum();
        let mut bytes = Vec::with_capacity(total);
        let fragment_count = fragments.len();
        for fragment in fragments {
            bytes.extend_from_slice(fragment.as_bytes());
        }
        Self {
            bytes,
            mime_type: mime_type.to_string(),
            fragment_count,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragment_count
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Metadata describing a finished recording, serializable for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub created_at: String,
    pub mime_type: String,
    pub channel_layout: ChannelLayout,
    pub chunk_count: usize,
    pub total_size_bytes: u64,
    pub duration_secs: f64,
}

impl RecordingMetadata {
    pub fn new(
        mime_type: &str,
        channel_layout: ChannelLayout,
        chunks: &[RecordedChunk],
        duration_secs: f64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            mime_type: mime_type.to_string(),
            channel_layout,
            chunk_count: chunks.len(),
            total_size_bytes: chunks.iter().map(|c| c.size_bytes() as u64).sum(),
            duration_secs,
        }
    }
}

/// Result of a completed session: the sealed chunks, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    pub chunks: Vec<RecordedChunk>,
    pub metadata: RecordingMetadata,
}

impl RecordingResult {
    pub fn new(
        chunks: Vec<RecordedChunk>,
        mime_type: &str,
        channel_layout: ChannelLayout,
        duration_secs: f64,
    ) -> Self {
        let metadata = RecordingMetadata::new(mime_type, channel_layout, &chunks, duration_secs);
        Self { chunks, metadata }
    }

    pub fn total_size_bytes(&self) -> u64 {
        self.metadata.total_size_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_concatenates_fragments_in_order() {
        let fragments = vec![
            EncodedFragment::new(vec![1, 2]),
            EncodedFragment::new(vec![3]),
            EncodedFragment::new(vec![4, 5, 6]),
        ];

        let chunk = RecordedChunk::from_fragments(fragments, "audio/webm");

        assert_eq!(chunk.as_bytes(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(chunk.size_bytes(), 6);
        assert_eq!(chunk.fragment_count(), 3);
        assert_eq!(chunk.mime_type(), "audio/webm");
    }

    #[test]
    fn result_metadata_totals_chunk_sizes() {
        let chunks = vec![
            RecordedChunk::from_fragments(vec![EncodedFragment::new(vec![0; 12])], "audio/webm"),
            RecordedChunk::from_fragments(vec![EncodedFragment::new(vec![0; 4])], "audio/webm"),
        ];

        let result =
            RecordingResult::new(chunks, "audio/webm", ChannelLayout::DualChannel, 1.5);

        assert_eq!(result.metadata.chunk_count, 2);
        assert_eq!(result.total_size_bytes(), 16);
        assert!(!result.metadata.id.is_empty());
    }

    #[test]
    fn metadata_serializes_with_kebab_case_layout() {
        let metadata = RecordingMetadata::new(
            "audio/webm",
            ChannelLayout::SingleSourceFallback,
            &[],
            0.0,
        );

        let json = serde_json::to_value(&metadata).unwrap();

        assert_eq!(json["channel_layout"], "single-source-fallback");
        assert_eq!(json["mime_type"], "audio/webm");
        assert_eq!(json["chunk_count"], 0);
    }
}
