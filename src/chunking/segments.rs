//! Attribution of timestamped caption segments to text chunks.
//!
//! Chunking works on the flattened transcript text, so the time range of a
//! chunk has to be recovered from the caption segments it contains.

use super::TextChunk;
use crate::config::SegmentMapping;
use crate::transcript::TranscriptSegment;

/// Assigns caption segments to chunks.
pub trait SegmentMapper: Send + Sync {
    /// For every chunk, the segments belonging to it, in input order.
    fn assign<'a>(
        &self,
        chunks: &[TextChunk],
        full_text: &str,
        segments: &'a [TranscriptSegment],
    ) -> Vec<Vec<&'a TranscriptSegment>>;
}

/// Create the mapper selected in configuration.
pub fn create_mapper(mapping: SegmentMapping) -> Box<dyn SegmentMapper> {
    match mapping {
        SegmentMapping::Substring => Box::new(SubstringMapper),
        SegmentMapping::Offset => Box::new(OffsetMapper),
    }
}

/// Heuristic mapper: a segment belongs to a chunk when its lowercase text
/// occurs in the chunk's lowercase text.
///
/// This is an approximation. A short caption repeated elsewhere in the
/// transcript (e.g. "yeah") matches every chunk containing that word, and a
/// caption cut in half by a chunk boundary matches neither neighbour.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMapper;

impl SubstringMapper {
    /// Segments whose text occurs in `chunk_text`, in input order.
    pub fn matches<'a>(
        chunk_text: &str,
        segments: &'a [TranscriptSegment],
    ) -> Vec<&'a TranscriptSegment> {
        let chunk_lower = chunk_text.to_lowercase();
        segments
            .iter()
            .filter(|seg| {
                let needle = seg.text.trim().to_lowercase();
                !needle.is_empty() && chunk_lower.contains(&needle)
            })
            .collect()
    }
}

impl SegmentMapper for SubstringMapper {
    fn assign<'a>(
        &self,
        chunks: &[TextChunk],
        _full_text: &str,
        segments: &'a [TranscriptSegment],
    ) -> Vec<Vec<&'a TranscriptSegment>> {
        chunks
            .iter()
            .map(|chunk| Self::matches(&chunk.text, segments))
            .collect()
    }
}

/// Exact mapper: segments are located in order in the full transcript text,
/// and a segment belongs to every chunk whose window overlaps its span.
///
/// Segments that cannot be found in the text are left unassigned.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetMapper;

impl OffsetMapper {
    /// Character span `[start, end)` of each segment in `full_text`.
    pub fn locate(full_text: &str, segments: &[TranscriptSegment]) -> Vec<Option<(usize, usize)>> {
        // Lowercasing can change the number of characters, so keep a map
        // back to the original character offsets.
        let mut haystack = Vec::with_capacity(full_text.len());
        let mut origin = Vec::with_capacity(full_text.len());
        for (idx, ch) in full_text.chars().enumerate() {
            for lower in ch.to_lowercase() {
                haystack.push(lower);
                origin.push(idx);
            }
        }

        let mut cursor = 0;
        segments
            .iter()
            .map(|seg| {
                let needle: Vec<char> = seg.text.trim().to_lowercase().chars().collect();
                if needle.is_empty() {
                    return None;
                }
                let pos = find_chars(&haystack, &needle, cursor)?;
                let last = pos + needle.len() - 1;
                cursor = last + 1;
                Some((origin[pos], origin[last] + 1))
            })
            .collect()
    }
}

impl SegmentMapper for OffsetMapper {
    fn assign<'a>(
        &self,
        chunks: &[TextChunk],
        full_text: &str,
        segments: &'a [TranscriptSegment],
    ) -> Vec<Vec<&'a TranscriptSegment>> {
        let spans = Self::locate(full_text, segments);

        chunks
            .iter()
            .map(|chunk| {
                segments
                    .iter()
                    .zip(&spans)
                    .filter_map(|(seg, span)| {
                        let (start, end) = (*span)?;
                        (start < chunk.end && end > chunk.start).then_some(seg)
                    })
                    .collect()
            })
            .collect()
    }
}

fn find_chars(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if from >= haystack.len() || needle.len() > haystack.len() - from {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::{ChunkingConfig, TextChunker};

    fn segments() -> Vec<TranscriptSegment> {
        vec![
            TranscriptSegment::new(0.0, 4.0, "Welcome to the Channel"),
            TranscriptSegment::new(4.0, 3.0, "today we talk about ownership"),
            TranscriptSegment::new(7.0, 2.0, "yeah"),
            TranscriptSegment::new(9.0, 5.0, "and then borrowing"),
        ]
    }

    #[test]
    fn test_substring_match_is_case_insensitive_and_ordered() {
        let segs = segments();
        let matched = SubstringMapper::matches(
            "and then BORROWING, yeah. welcome to the channel",
            &segs,
        );
        let texts: Vec<&str> = matched.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Welcome to the Channel", "yeah", "and then borrowing"]);
    }

    #[test]
    fn test_substring_split_segment_matches_neither_chunk() {
        let segs = vec![TranscriptSegment::new(0.0, 1.0, "split across here")];
        assert!(SubstringMapper::matches("text ending in split across", &segs).is_empty());
        assert!(SubstringMapper::matches("here and more text", &segs).is_empty());
    }

    #[test]
    fn test_blank_segments_never_match() {
        let segs = vec![TranscriptSegment::new(0.0, 1.0, "   ")];
        assert!(SubstringMapper::matches("anything", &segs).is_empty());
        assert_eq!(OffsetMapper::locate("anything", &segs), vec![None]);
    }

    #[test]
    fn test_locate_walks_forward() {
        let segs = vec![
            TranscriptSegment::new(0.0, 1.0, "yeah"),
            TranscriptSegment::new(1.0, 1.0, "ok"),
            TranscriptSegment::new(2.0, 1.0, "Yeah"),
            TranscriptSegment::new(3.0, 1.0, "missing"),
        ];
        let spans = OffsetMapper::locate("yeah ok yeah", &segs);
        assert_eq!(spans, vec![Some((0, 4)), Some((5, 7)), Some((8, 12)), None]);
    }

    #[test]
    fn test_offset_mapper_attributes_repeated_text_to_its_own_chunk() {
        let filler = "x".repeat(60);
        let text = format!("yeah {filler} middle {filler} yeah");
        let segs = vec![
            TranscriptSegment::new(0.0, 1.0, "yeah"),
            TranscriptSegment::new(10.0, 1.0, "yeah"),
        ];

        let chunker = TextChunker::new(ChunkingConfig::new(70, 10).unwrap()).unwrap();
        let chunks = chunker.split(&text);
        assert!(chunks.len() >= 2);

        let offset = OffsetMapper.assign(&chunks, &text, &segs);
        assert_eq!(offset[0].len(), 1);
        assert_eq!(offset[0][0].start, 0.0);
        let last = offset.last().unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].start, 10.0);

        // The heuristic matches both captions in both chunks.
        let substring = SubstringMapper.assign(&chunks, &text, &segs);
        assert_eq!(substring[0].len(), 2);
    }

    #[test]
    fn test_offset_mapper_assigns_straddling_segment_to_both_chunks() {
        let text = format!("{} straddling words {}", "a".repeat(45), "b".repeat(45));
        let segs = vec![TranscriptSegment::new(3.0, 2.0, "straddling words")];

        let chunker = TextChunker::new(ChunkingConfig::new(55, 5).unwrap()).unwrap();
        let chunks = chunker.split(&text);
        let assigned = OffsetMapper.assign(&chunks, &text, &segs);

        assert_eq!(assigned[0].len(), 1);
        assert_eq!(assigned[1].len(), 1);
    }
}
