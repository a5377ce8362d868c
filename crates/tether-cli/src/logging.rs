//! Logging setup for the `tether` binary.
//!
//! `tether-core` only emits `tracing` events; the subscriber lives here.
//! Plugin loggers tag their events with `plugin` and `context` fields, so
//! tunnel and server messages can be told apart in either output format.

use tracing::Level;
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

/// Level applied to tether's own targets for a `-v` count.
fn tether_level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Filter: `RUST_LOG` when set, otherwise `warn` for dependencies. tether's
/// targets always log at the `-v` level on top of that.
fn filter(verbosity: u8) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    match format!("tether={}", tether_level(verbosity)).parse::<Directive>() {
        Ok(directive) => base.add_directive(directive),
        Err(_) => base,
    }
}

/// Install the global subscriber, writing to stderr so stdout stays free
/// for `entries` and `commands` output.
///
/// With `json`, each event is one JSON line carrying the current span
/// (`start` runs inside a `cmd`/`cwd` span).
///
/// # Panics
/// Panics if a global subscriber is already installed.
pub fn init(verbosity: u8, json: bool) {
    let registry = tracing_subscriber::registry().with(filter(verbosity));

    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tether_level() {
        assert_eq!(tether_level(0), Level::INFO);
        assert_eq!(tether_level(1), Level::DEBUG);
        assert_eq!(tether_level(5), Level::TRACE);
    }
}
