//! Tracing setup for the binary.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level for a `-v` count: 0 is info, 1 debug, 2 or more trace.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Filter directives used when `RUST_LOG` is unset.
///
/// Dependencies stay at `warn` so `-vv` does not drown in hyper and reqwest
/// internals.
pub fn default_directives(verbosity: u8) -> String {
    format!("warn,tablewatch={}", level_for(verbosity))
}

/// Install the global subscriber, writing text logs to stderr.
///
/// `RUST_LOG` takes precedence over `verbosity`.
pub fn init_logging(verbosity: u8) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity >= 1)
                .with_file(verbosity >= 2)
                .with_line_number(verbosity >= 2),
        )
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for(0), "info");
        assert_eq!(level_for(1), "debug");
        assert_eq!(level_for(2), "trace");
        assert_eq!(level_for(9), "trace");
    }

    #[test]
    fn directives_parse() {
        for v in 0..3 {
            let directives = default_directives(v);
            assert!(directives.starts_with("warn,tablewatch="));
            assert!(EnvFilter::try_new(&directives).is_ok());
        }
    }
}
