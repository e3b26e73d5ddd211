//! Unified logging initialization for the coffee shop binaries
//!
//! Filter priority, highest first:
//! 1. CLI flags (`-v/-q`)
//! 2. `RUST_LOG`
//! 3. The binary's default filter

use anyhow::{anyhow, Result};
use clap_verbosity_flag::{LogLevel, Verbosity};
use std::str::FromStr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Single-line human readable output
    #[default]
    Compact,
    /// One JSON object per event, for log shippers
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" | "text" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}', expected compact or json")),
        }
    }
}

/// Resolve the effective filter from verbosity flags, `RUST_LOG` and the default
pub fn resolve_filter<L: LogLevel>(
    verbosity: &Verbosity<L>,
    default_filter: &str,
) -> Result<EnvFilter> {
    if verbosity.is_present() {
        let log_level = verbosity
            .log_level()
            .map(|level| level.to_string())
            .unwrap_or_else(|| "off".to_string());
        return EnvFilter::try_new(log_level)
            .map_err(|e| anyhow!("invalid log level: {e}"));
    }
    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
}

/// Initialize logging with the specified verbosity level and default filter.
///
/// # Example
///
/// ```no_run
/// use clap::Parser;
/// use clap_verbosity_flag::{InfoLevel, Verbosity};
/// use coffee_shop_common::logging::{self, LogFormat};
///
/// #[derive(Parser)]
/// struct Args {
///     #[clap(flatten)]
///     verbosity: Verbosity<InfoLevel>,
/// }
///
/// let args = Args::parse();
/// logging::init_logging(&args.verbosity, "coffee_shop_api=info", LogFormat::Compact).unwrap();
/// ```
pub fn init_logging<L: LogLevel>(
    verbosity: &Verbosity<L>,
    default_filter: &str,
    format: LogFormat,
) -> Result<()> {
    let filter = resolve_filter(verbosity, default_filter)?;
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .compact(),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .json(),
            )
            .try_init(),
    }
    .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap_verbosity_flag::InfoLevel;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_filter_priority() {
        let default = "coffee_shop_api=info";
        let quiet = Verbosity::<InfoLevel>::default();

        std::env::set_var("RUST_LOG", "coffee_shop_api=trace");
        let filter = resolve_filter(&quiet, default).unwrap();
        assert_eq!(filter.to_string(), "coffee_shop_api=trace");

        let verbose = Verbosity::<InfoLevel>::new(1, 0);
        let filter = resolve_filter(&verbose, default).unwrap();
        assert!(filter.to_string().eq_ignore_ascii_case("debug"));

        std::env::remove_var("RUST_LOG");
        let filter = resolve_filter(&quiet, default).unwrap();
        assert_eq!(filter.to_string(), default);
    }
}
