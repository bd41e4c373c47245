use std::sync::Once;

static TRACING: Once = Once::new();

/// Routes `tracing` output to the test harness, honoring whatever
/// filter `RUST_LOG` carries. Every test entry point may call this;
/// only the first call installs the subscriber.
#[allow(dead_code)]
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::from_default_env();
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}
