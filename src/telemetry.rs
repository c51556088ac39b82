//! Log output for the relay
//!
//! One `fmt` layer behind an `EnvFilter`. The relay's own events follow
//! `observability.log_level`; `tower_http` request spans stay at debug so
//! each HTTP exchange is visible whenever the relay logs at debug.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// `gpt_relay=<level>,tower_http=debug`, used when RUST_LOG is unset
pub fn default_filter(level: &str) -> String {
    format!("gpt_relay={},tower_http=debug", level)
}

/// Install the global subscriber
///
/// RUST_LOG, when set, replaces [`default_filter`] entirely. Only the first
/// call has any effect.
///
/// ```no_run
/// gpt_relay::telemetry::init("info");
/// ```
pub fn init(default_level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter(default_level)));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_targets_crate() {
        assert_eq!(default_filter("debug"), "gpt_relay=debug,tower_http=debug");
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(default_filter("info")).is_ok());
    }
}
