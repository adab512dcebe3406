//! Diagnostic logging.
//!
//! Events go to stderr through a `tracing-subscriber` fmt layer. The filter
//! comes from `LLAMA_CHAT_LOG` when set, otherwise `debug` for `--verbose`
//! and `warn` for everything else.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "LLAMA_CHAT_LOG";

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("llama_chat=debug")
        } else {
            EnvFilter::new("warn")
        }
    })
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
