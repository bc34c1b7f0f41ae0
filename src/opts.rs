use std::path::PathBuf;

use crate::language::Language;
use crate::output_type::OutputType;
use crate::{Error, Result};

/// Default chunk length in seconds.
pub const DEFAULT_CHUNK_SECONDS: f64 = 300.0;

/// Default number of recognition requests allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 3;

/// Options that control how a transcription run is performed.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that:
/// - the library remains reusable outside of a CLI context
/// - other frontends (services, tests, batch jobs) can construct options programmatically
#[derive(Debug, Clone)]
pub struct Opts {
    /// Length of each chunk in seconds. The final chunk may be shorter.
    pub chunk_seconds: f64,

    /// Upper bound on outstanding recognition requests.
    ///
    /// This bounds network requests, not CPU usage.
    pub max_concurrency: usize,

    /// Language setting. `Language::Auto` lets the service detect it.
    pub language: Language,

    /// The desired output format.
    pub output_type: OutputType,

    /// Parent directory for the per-run workspace. `None` uses the system temp dir.
    pub workspace_root: Option<PathBuf>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            chunk_seconds: DEFAULT_CHUNK_SECONDS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            language: Language::Auto,
            output_type: OutputType::Text,
            workspace_root: None,
        }
    }
}

impl Opts {
    /// Reject parameters no run could succeed with.
    pub fn validate(&self) -> Result<()> {
        if !self.chunk_seconds.is_finite() || self.chunk_seconds <= 0.0 {
            return Err(Error::config(format!(
                "chunk length must be a positive number of seconds, got {}",
                self.chunk_seconds
            )));
        }
        if self.max_concurrency == 0 {
            return Err(Error::config("concurrency must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() -> anyhow::Result<()> {
        let opts = Opts::default();
        assert_eq!(opts.chunk_seconds, 300.0);
        assert_eq!(opts.max_concurrency, 3);
        assert_eq!(opts.language, Language::Auto);
        opts.validate()?;
        Ok(())
    }

    #[test]
    fn rejects_bad_chunk_length_and_concurrency() {
        for chunk_seconds in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let opts = Opts {
                chunk_seconds,
                ..Opts::default()
            };
            assert!(matches!(opts.validate(), Err(Error::Config(_))));
        }

        let opts = Opts {
            max_concurrency: 0,
            ..Opts::default()
        };
        assert!(matches!(opts.validate(), Err(Error::Config(_))));
    }
}
