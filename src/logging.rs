// ==========================================
// Logging initialisation
// ==========================================
// tracing + tracing-subscriber, level from RUST_LOG
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global subscriber
///
/// # Environment
/// - RUST_LOG: filter directives (default: info)
///   e.g. RUST_LOG=debug or RUST_LOG=foundry_qc=trace,tower_http=debug
/// - FOUNDRY_QC_LOG_JSON=1: emit JSON lines instead of text
///
/// # Examples
/// ```no_run
/// use foundry_qc::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("FOUNDRY_QC_LOG_JSON")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Test subscriber: debug level, captured by the test harness
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
