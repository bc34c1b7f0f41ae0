//! Ordered reassembly of per-chunk results.
//!
//! The sort by chunk index here is the only ordering step in the pipeline. Everything
//! upstream may produce results in any order; output is identical either way.

use serde::Serialize;

use crate::output_type::OutputType;
use crate::planner::ChunkDescriptor;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::ChunkResult;
use crate::srt_encoder::SrtEncoder;
use crate::vtt_encoder::VttEncoder;
use crate::{Error, Result};

/// One subtitle cue in global time with a global sequence number starting at 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleEntry {
    pub sequence_number: usize,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
}

/// Final result of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Chunk texts joined in temporal order.
    pub text: String,

    /// Rendered subtitles, present when a subtitle output type was requested.
    pub subtitles: Option<String>,
}

/// Merge chunk results into the final transcript and, for subtitle outputs, rendered cues.
///
/// `results` must hold exactly one entry per planned chunk.
pub fn assemble(
    mut results: Vec<ChunkResult>,
    plan: &[ChunkDescriptor],
    output_type: OutputType,
) -> Result<PipelineOutput> {
    results.sort_by_key(|r| r.index);
    check_complete(&results, plan)?;

    let text = merge_text(&results);
    let subtitles = match output_type {
        OutputType::Text => None,
        OutputType::Srt | OutputType::Vtt => {
            let entries = subtitle_entries(&results, plan);
            let mut buf = Vec::new();
            if output_type == OutputType::Srt {
                render(&mut SrtEncoder::new(&mut buf), &entries)?;
            } else {
                render(&mut VttEncoder::new(&mut buf), &entries)?;
            }
            let rendered = String::from_utf8(buf)
                .map_err(|err| Error::msg(format!("subtitle output is not utf-8: {err}")))?;
            Some(rendered)
        }
    };

    Ok(PipelineOutput { text, subtitles })
}

/// Join trimmed chunk texts with a single space, skipping chunks with no speech.
/// `results` must already be sorted.
fn merge_text(results: &[ChunkResult]) -> String {
    results
        .iter()
        .map(|r| r.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Shift every segment into global time and number it. `results` must already be sorted.
fn subtitle_entries(results: &[ChunkResult], plan: &[ChunkDescriptor]) -> Vec<SubtitleEntry> {
    let mut entries = Vec::new();
    let mut sequence_number = 0;

    for result in results {
        let offset = plan[result.index].start_seconds;
        for segment in &result.segments {
            sequence_number += 1;
            let shifted = segment.shifted(offset);
            entries.push(SubtitleEntry {
                sequence_number,
                start_seconds: shifted.start_seconds,
                end_seconds: shifted.end_seconds,
                text: shifted.text.trim().to_owned(),
            });
        }
    }

    entries
}

fn check_complete(sorted: &[ChunkResult], plan: &[ChunkDescriptor]) -> Result<()> {
    if sorted.len() != plan.len() {
        return Err(Error::msg(format!(
            "expected {} chunk results, got {}",
            plan.len(),
            sorted.len()
        )));
    }
    for (expected, result) in sorted.iter().enumerate() {
        if result.index != expected || plan[expected].index != expected {
            return Err(Error::msg(format!(
                "chunk results do not match the plan at index {expected}"
            )));
        }
    }
    Ok(())
}

fn render(encoder: &mut dyn SegmentEncoder, entries: &[SubtitleEntry]) -> Result<()> {
    for entry in entries {
        encoder.write_entry(entry)?;
    }
    encoder.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::plan;
    use crate::segments::TranscriptSegment;

    fn seg(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            start_seconds: start,
            end_seconds: end,
            text: text.to_owned(),
        }
    }

    fn results() -> Vec<ChunkResult> {
        vec![
            ChunkResult {
                index: 0,
                text: " first chunk ".into(),
                segments: vec![seg(0.0, 2.0, "a"), seg(2.0, 4.5, "b")],
            },
            ChunkResult {
                index: 1,
                text: "second".into(),
                segments: vec![seg(0.25, 1.0, " c ")],
            },
            ChunkResult {
                index: 2,
                text: "third".into(),
                segments: vec![seg(10.5, 12.0, "d"), seg(12.0, 13.0, "e"), seg(14.0, 15.0, "f")],
            },
        ]
    }

    /// Every ordering of three results.
    fn permutations(items: Vec<ChunkResult>) -> Vec<Vec<ChunkResult>> {
        let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        orders
            .iter()
            .map(|order| order.iter().map(|&i| items[i].clone()).collect())
            .collect()
    }

    #[test]
    fn output_is_independent_of_completion_order() -> anyhow::Result<()> {
        let chunks = plan(650.0, 300.0)?;
        let expected = assemble(results(), &chunks, OutputType::Srt)?;
        for shuffled in permutations(results()) {
            assert_eq!(assemble(shuffled, &chunks, OutputType::Srt)?, expected);
        }
        assert_eq!(expected.text, "first chunk second third");
        Ok(())
    }

    #[test]
    fn sequence_numbers_are_global_and_gapless() -> anyhow::Result<()> {
        let chunks = plan(650.0, 300.0)?;
        let mut sorted = results();
        sorted.sort_by_key(|r| r.index);
        let entries = subtitle_entries(&sorted, &chunks);

        let numbers: Vec<usize> = entries.iter().map(|e| e.sequence_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
        for pair in entries.windows(2) {
            assert!(pair[0].start_seconds <= pair[1].start_seconds);
        }
        Ok(())
    }

    #[test]
    fn segments_are_shifted_by_chunk_offset() -> anyhow::Result<()> {
        let chunks = plan(650.0, 300.0)?;
        let entries = subtitle_entries(&results(), &chunks);
        let d = &entries[3];
        assert_eq!(d.text, "d");
        assert_eq!(d.start_seconds, 610.5);
        assert_eq!(d.end_seconds, 612.0);
        assert_eq!(entries[2].text, "c");
        assert_eq!(entries[2].start_seconds, 300.25);
        Ok(())
    }

    #[test]
    fn renders_srt_blocks() -> anyhow::Result<()> {
        let chunks = plan(650.0, 300.0)?;
        let out = assemble(results(), &chunks, OutputType::Srt)?;
        let srt = out.subtitles.expect("subtitles requested");
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:02,000\na\n\n2\n"));
        assert!(srt.contains("4\n00:10:10,500 --> 00:10:12,000\nd\n\n"));
        assert!(srt.ends_with("6\n00:10:14,000 --> 00:10:15,000\nf\n\n"));
        Ok(())
    }

    #[test]
    fn renders_vtt_with_header() -> anyhow::Result<()> {
        let chunks = plan(650.0, 300.0)?;
        let out = assemble(results(), &chunks, OutputType::Vtt)?;
        let vtt = out.subtitles.expect("subtitles requested");
        assert!(vtt.starts_with("WEBVTT\n\n1\n00:00:00.000 --> 00:00:02.000\na\n\n"));
        Ok(())
    }

    #[test]
    fn text_output_has_no_subtitles() -> anyhow::Result<()> {
        let chunks = plan(650.0, 300.0)?;
        let out = assemble(results(), &chunks, OutputType::Text)?;
        assert_eq!(out.subtitles, None);
        Ok(())
    }

    #[test]
    fn blank_chunks_do_not_double_the_separator() -> anyhow::Result<()> {
        let chunks = plan(650.0, 300.0)?;
        let texts = ["a", "  ", "b"];
        let results = texts
            .iter()
            .enumerate()
            .map(|(index, text)| ChunkResult {
                index,
                text: (*text).to_owned(),
                segments: Vec::new(),
            })
            .collect();

        let out = assemble(results, &chunks, OutputType::Text)?;
        assert_eq!(out.text, "a b");
        Ok(())
    }

    #[test]
    fn missing_or_duplicate_results_are_rejected() -> anyhow::Result<()> {
        let chunks = plan(650.0, 300.0)?;

        let mut missing = results();
        missing.remove(1);
        assert!(assemble(missing, &chunks, OutputType::Text).is_err());

        let mut duplicate = results();
        duplicate[2].index = 1;
        assert!(assemble(duplicate, &chunks, OutputType::Text).is_err());
        Ok(())
    }
}
