use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding `tracing` filter directives, e.g. `longscribe=debug`.
pub const LOG_ENV: &str = "LONGSCRIBE_LOG";

/// Initialize JSON logging on stderr at `error` unless `LONGSCRIBE_LOG` says otherwise.
pub fn init() {
    init_with_default(LevelFilter::ERROR);
}

/// Initialize JSON logging on stderr with `default` as the fallback level.
///
/// Stdout stays free for transcripts. Calling this again after a subscriber is installed is
/// a no-op.
pub fn init_with_default(default: LevelFilter) {
    let directives = std::env::var(LOG_ENV).ok();
    let filter = build_filter(directives.as_deref(), default);

    let json = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_current_span(true)
        .with_span_list(true);

    let _ = tracing_subscriber::registry().with(filter).with(json).try_init();
}

fn build_filter(directives: Option<&str>, default: LevelFilter) -> EnvFilter {
    let builder = EnvFilter::builder().with_default_directive(default.into());
    match directives.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directives) => builder.parse_lossy(directives),
        None => builder.parse_lossy(""),
    }
}
