//! Tracing subscriber setup.
//!
//! The filter comes from `HWSEARCH_LOG`, then `RUST_LOG`, then `warn`. The
//! interactive surface owns the terminal, so it logs to a daily file in the
//! data directory; one-shot commands log to stderr.

use std::path::PathBuf;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "HWSEARCH_LOG";
const LOG_FILE_PREFIX: &str = "hwsearch.log";

#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    /// Daily-rotated files under this directory.
    File(PathBuf),
}

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber. Calling it twice is harmless: the second
/// install fails quietly and the first one stays in place.
pub fn init_logging(target: LogTarget) {
    let registry = tracing_subscriber::registry().with(env_filter());
    let installed = match target {
        LogTarget::Stderr => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init(),
        LogTarget::File(dir) => {
            if let Err(e) = std::fs::create_dir_all(&dir) {
                eprintln!("cannot create log dir {}: {e}", dir.display());
                return;
            }
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            registry
                .with(
                    fmt::layer()
                        .with_writer(appender)
                        .with_ansi(false)
                        .with_target(true),
                )
                .try_init()
        }
    };
    if installed.is_ok() {
        tracing::debug!("logging initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn filter_prefers_own_variable() {
        // SAFETY: serialised with the other env-mutating tests.
        unsafe {
            std::env::set_var(LOG_ENV, "hwconsole_search=debug");
            std::env::set_var("RUST_LOG", "error");
        }
        let filter = env_filter().to_string();
        unsafe {
            std::env::remove_var(LOG_ENV);
            std::env::remove_var("RUST_LOG");
        }
        assert!(filter.contains("hwconsole_search=debug"), "{filter}");
    }

    #[test]
    #[serial]
    fn filter_defaults_to_warn() {
        unsafe {
            std::env::remove_var(LOG_ENV);
            std::env::remove_var("RUST_LOG");
        }
        assert_eq!(env_filter().to_string(), "warn");
    }
}
