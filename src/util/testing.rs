//! Tracing setup shared by unit and integration tests.

use std::sync::Once;

use tracing::info;
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

static TEST_SETUP: Once = Once::new();

/// Level used when `RUST_LOG` is unset.
const DEFAULT_TEST_FILTER: &str = "springtree=trace";

/// Targets whose events are dropped regardless of the filter.
const QUIET_TARGETS: [&str; 1] = ["config::"];

/// Install a stderr subscriber once per test binary.
///
/// Honours `RUST_LOG`; without it every springtree span and event is shown.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TEST_FILTER));
        let quiet = filter_fn(|metadata| {
            !QUIET_TARGETS
                .iter()
                .any(|target| metadata.target().starts_with(target))
        });

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::ENTER | FmtSpan::CLOSE)
            .with_filter(quiet)
            .with_filter(env_filter);

        // another harness may already own the global dispatcher
        if tracing_subscriber::registry().with(layer).try_init().is_ok() {
            info!("test tracing ready");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_repeated_calls_when_initializing_then_idempotent() {
        init_test_setup();
        init_test_setup();
        tracing::debug!("still logging");
    }
}
