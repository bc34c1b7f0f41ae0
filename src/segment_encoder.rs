use std::io::Write;

use crate::Result;
use crate::assembler::SubtitleEntry;

pub trait SegmentEncoder {
    fn write_entry(&mut self, entry: &SubtitleEntry) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

/// Split seconds into `(hours, minutes, seconds, milliseconds)`.
///
/// Rounding policy:
/// - We round to the nearest millisecond first and then split, so a round-up to 1000 ms
///   carries into the seconds field (`1.9996` becomes `00:00:02.000`).
/// - Negative inputs clamp to zero.
pub(crate) fn split_timestamp(seconds: f64) -> (u64, u64, u64, u64) {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;

    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;

    let s = total_s % 60;
    let total_m = total_s / 60;

    let m = total_m % 60;
    let h = total_m / 60;

    (h, m, s, ms)
}

/// Format seconds as `HH:MM:SS<sep>mmm`. SRT separates milliseconds with `,`, WebVTT with `.`.
pub(crate) fn format_timestamp(seconds: f64, ms_separator: char) -> String {
    let (h, m, s, ms) = split_timestamp(seconds);
    format!("{h:02}:{m:02}:{s:02}{ms_separator}{ms:03}")
}

/// Write one cue block: sequence number, time range, text, then a blank line.
///
/// SRT and WebVTT share this layout; in WebVTT the number is the optional cue identifier.
pub(crate) fn write_cue<W: Write>(
    w: &mut W,
    entry: &SubtitleEntry,
    ms_separator: char,
) -> Result<()> {
    let start = format_timestamp(entry.start_seconds, ms_separator);
    let end = format_timestamp(entry.end_seconds, ms_separator);
    write!(
        w,
        "{}\n{start} --> {end}\n{}\n\n",
        entry.sequence_number, entry.text
    )?;
    Ok(())
}
