use crate::{Error, Result};

/// One planned time range of the source audio.
///
/// `index` is contiguous from 0 and matches temporal order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkDescriptor {
    pub index: usize,
    pub start_seconds: f64,
    pub duration_seconds: f64,
}

impl ChunkDescriptor {
    /// Exclusive end of this chunk's range.
    pub fn end_seconds(&self) -> f64 {
        self.start_seconds + self.duration_seconds
    }
}

/// Split `[0, total_seconds)` into `ceil(total / chunk)` contiguous ranges.
///
/// Every range is `chunk_seconds` long except possibly the last, which covers whatever remains.
pub fn plan(total_seconds: f64, chunk_seconds: f64) -> Result<Vec<ChunkDescriptor>> {
    if !total_seconds.is_finite() || total_seconds <= 0.0 {
        return Err(Error::config(format!(
            "total duration must be positive, got {total_seconds}"
        )));
    }
    if !chunk_seconds.is_finite() || chunk_seconds <= 0.0 {
        return Err(Error::config(format!(
            "chunk length must be positive, got {chunk_seconds}"
        )));
    }

    let count = (total_seconds / chunk_seconds).ceil() as usize;
    let chunks = (0..count)
        .map(|index| {
            let start_seconds = index as f64 * chunk_seconds;
            let end_seconds = (start_seconds + chunk_seconds).min(total_seconds);
            ChunkDescriptor {
                index,
                start_seconds,
                duration_seconds: end_seconds - start_seconds,
            }
        })
        .collect();

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(chunks: &[ChunkDescriptor]) -> Vec<(f64, f64)> {
        chunks
            .iter()
            .map(|c| (c.start_seconds, c.end_seconds()))
            .collect()
    }

    #[test]
    fn plans_short_final_chunk() -> anyhow::Result<()> {
        let chunks = plan(650.0, 300.0)?;
        assert_eq!(chunks.len(), 3);
        assert_eq!(
            ranges(&chunks),
            vec![(0.0, 300.0), (300.0, 600.0), (600.0, 650.0)]
        );
        Ok(())
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() -> anyhow::Result<()> {
        let chunks = plan(600.0, 300.0)?;
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].duration_seconds, 300.0);
        Ok(())
    }

    #[test]
    fn audio_shorter_than_one_chunk() -> anyhow::Result<()> {
        let chunks = plan(12.5, 300.0)?;
        assert_eq!(ranges(&chunks), vec![(0.0, 12.5)]);
        Ok(())
    }

    #[test]
    fn ranges_are_contiguous_and_cover_the_whole_duration() -> anyhow::Result<()> {
        let cases = [
            (1.0, 0.3),
            (3600.0, 300.0),
            (3601.7, 300.0),
            (59.9, 60.0),
            (10.0, 2.5),
        ];
        for (total, chunk) in cases {
            let chunks = plan(total, chunk)?;
            assert_eq!(chunks.len(), (total / chunk).ceil() as usize);
            assert_eq!(chunks[0].start_seconds, 0.0);
            for (i, pair) in chunks.windows(2).enumerate() {
                assert_eq!(pair[0].index, i);
                assert_eq!(pair[1].index, i + 1);
                assert!((pair[0].end_seconds() - pair[1].start_seconds).abs() < 1e-9);
                assert!(pair[0].duration_seconds > 0.0);
            }
            let last = chunks.last().expect("at least one chunk");
            assert!((last.end_seconds() - total).abs() < 1e-9);
            assert!(last.duration_seconds > 0.0 && last.duration_seconds <= chunk);
        }
        Ok(())
    }

    #[test]
    fn rejects_non_positive_inputs() {
        assert!(matches!(plan(0.0, 300.0), Err(Error::Config(_))));
        assert!(matches!(plan(-1.0, 300.0), Err(Error::Config(_))));
        assert!(matches!(plan(100.0, 0.0), Err(Error::Config(_))));
        assert!(matches!(plan(100.0, -3.0), Err(Error::Config(_))));
        assert!(matches!(plan(f64::NAN, 300.0), Err(Error::Config(_))));
    }
}
