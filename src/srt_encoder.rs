use std::io::Write;

use crate::assembler::SubtitleEntry;
use crate::segment_encoder::{SegmentEncoder, format_timestamp, write_cue};
use crate::{Error, Result};

/// A `SegmentEncoder` that writes entries in SubRip (`.srt`) format.
///
/// Each entry becomes one block: sequence number, time range, text, blank line.
pub struct SrtEncoder<W: Write> {
    w: W,
    closed: bool,
}

impl<W: Write> SrtEncoder<W> {
    pub fn new(w: W) -> Self {
        Self { w, closed: false }
    }
}

impl<W: Write> SegmentEncoder for SrtEncoder<W> {
    fn write_entry(&mut self, entry: &SubtitleEntry) -> Result<()> {
        if self.closed {
            return Err(Error::msg("cannot write entry: encoder is already closed"));
        }

        write_cue(&mut self.w, entry, ',')
    }

    /// Flush the underlying writer. This is idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.w.flush()?;
        self.closed = true;
        Ok(())
    }
}

/// Format seconds into an SRT timestamp (`HH:MM:SS,mmm`).
pub fn format_timestamp_srt(seconds: f64) -> String {
    format_timestamp(seconds, ',')
}
