//! Process-wide logging setup shared by binaries and tests.

/// Initialize tracing/logging.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Subscriber construction (filters, formatting).
pub mod tracing;
