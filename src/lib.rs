//! `longscribe` — chunked, bounded-concurrency transcription of long-form audio.
//!
//! This crate provides:
//! - Duration probing and lossless splitting through an external media tool (ffmpeg)
//! - A chunk planner that covers the whole recording with fixed-length ranges
//! - Bounded-concurrency dispatch of chunks to a remote speech-recognition service
//! - Ordered reassembly into one transcript, with optional SRT/WebVTT subtitles
//! - A scoped temp workspace that never outlives a run
//!
//! The library is designed to be used by both CLI tools and long-running services,
//! with an emphasis on deterministic output and all-or-nothing runs.

// High-level API (most consumers should start here).
pub mod opts;
pub mod pipeline;

// Pipeline stages, leaf-first.
pub mod media;
pub mod planner;
pub mod splitter;
pub mod scheduler;
pub mod assembler;
pub mod workspace;

// External service seams and concrete backends.
pub mod backend;
pub mod backends;

// Segment data structures and language routing.
pub mod language;
pub mod segments;

// Output selection and encoder interfaces.
pub mod output_type;
pub mod segment_encoder;

// Output encoders that serialize subtitle entries into various formats.
pub mod srt_encoder;
pub mod vtt_encoder;

// Logging configuration.
#[cfg(feature = "logging")]
pub mod logging;

mod error;

pub use assembler::{PipelineOutput, SubtitleEntry};
pub use backend::{
    Formatter, Passthrough, Recognition, RecognitionMode, RecognitionRequest, Recognizer,
};
pub use error::{Error, Result};
pub use language::Language;
pub use media::{Ffmpeg, MediaTool};
pub use opts::Opts;
pub use output_type::OutputType;
pub use pipeline::Transcriber;
pub use scheduler::Progress;

#[cfg(feature = "logging")]
pub use logging::init as init_logging;
