use std::io::Write;

use crate::assembler::SubtitleEntry;
use crate::segment_encoder::{SegmentEncoder, format_timestamp, write_cue};
use crate::{Error, Result};

const HEADER: &[u8] = b"WEBVTT\n\n";

/// A `SegmentEncoder` that writes entries as WebVTT cues.
///
/// Cues have the same layout as SRT blocks, with `.` before the milliseconds. The `WEBVTT`
/// header goes out with the first cue, so an empty run produces an empty document.
pub struct VttEncoder<W: Write> {
    w: W,
    header_written: bool,
    closed: bool,
}

impl<W: Write> VttEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            header_written: false,
            closed: false,
        }
    }
}

impl<W: Write> SegmentEncoder for VttEncoder<W> {
    fn write_entry(&mut self, entry: &SubtitleEntry) -> Result<()> {
        if self.closed {
            return Err(Error::msg("cannot write entry: encoder is already closed"));
        }
        if !self.header_written {
            self.w.write_all(HEADER)?;
            self.header_written = true;
        }
        write_cue(&mut self.w, entry, '.')
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.w.flush()?;
        self.closed = true;
        Ok(())
    }
}

/// Format seconds into a WebVTT timestamp (`HH:MM:SS.mmm`).
pub fn format_timestamp_vtt(seconds: f64) -> String {
    format_timestamp(seconds, '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize, start: f64, end: f64, text: &str) -> SubtitleEntry {
        SubtitleEntry {
            sequence_number: n,
            start_seconds: start,
            end_seconds: end,
            text: text.to_string(),
        }
    }

    #[test]
    fn empty_run_is_an_empty_document() -> anyhow::Result<()> {
        let mut out = Vec::new();
        VttEncoder::new(&mut out).close()?;
        assert!(out.is_empty());
        Ok(())
    }

    #[test]
    fn header_precedes_numbered_cues() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);
        enc.write_entry(&entry(1, 0.0, 1.2346, "hello"))?;
        enc.write_entry(&entry(2, 61.2, 62.0, "world"))?;
        enc.close()?;

        assert_eq!(
            std::str::from_utf8(&out)?,
            "WEBVTT\n\n\
             1\n00:00:00.000 --> 00:00:01.235\nhello\n\n\
             2\n00:01:01.200 --> 00:01:02.000\nworld\n\n"
        );
        Ok(())
    }

    #[test]
    fn timestamps_use_a_dot_and_carry_round_ups() {
        assert_eq!(format_timestamp_vtt(0.0004), "00:00:00.000");
        assert_eq!(format_timestamp_vtt(0.0005), "00:00:00.001");
        assert_eq!(format_timestamp_vtt(1.9996), "00:00:02.000");
        assert_eq!(format_timestamp_vtt(3725.25), "01:02:05.250");
    }

    #[test]
    fn closed_encoder_rejects_entries() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);
        enc.close()?;
        let err = enc.write_entry(&entry(1, 0.0, 1.0, "nope")).unwrap_err();
        assert!(err.to_string().contains("already closed"));
        Ok(())
    }
}
