/// The supported output formats for a pipeline run.
///
/// `Text` requests a plain merged transcript. The subtitle variants request time-aligned
/// segments from the recognition service and render them as one global cue sequence.
///
/// Integration notes:
/// - With the `cli` feature, `ValueEnum` allows this enum to be used directly as a CLI flag.
/// - Each subtitle variant maps to a concrete `SegmentEncoder` implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputType {
    /// Plain transcript text.
    #[default]
    Text,

    /// SubRip (`.srt`) subtitles.
    Srt,

    /// WebVTT subtitles.
    Vtt,
}

impl OutputType {
    /// Whether this output needs time-aligned segments from the recognition service.
    pub fn wants_subtitles(self) -> bool {
        !matches!(self, Self::Text)
    }
}
