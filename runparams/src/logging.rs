//! Diagnostic tracing for the `runparams` binary.
//!
//! Nothing here is product output: results go to stdout and failures are
//! returned as errors. With `RUST_LOG=runparams=debug` the stderr stream shows
//!
//! - `parsed run parameters` with the RunID, read and kit counts,
//! - skipped `ReagentKits` groups and metadata text mixed with child elements,
//! - `listed run folders` and one `scanned run folder` event per folder.
//!
//! At the default `warn` level only a run folder whose name differs from its
//! RunID is reported.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr subscriber. Invalid `RUST_LOG` directives are skipped
/// rather than discarding the whole filter.
///
/// ```bash
/// RUST_LOG=runparams=debug runparams scan /data/runs
/// ```
pub fn init() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .compact(),
        )
        .init();
}
