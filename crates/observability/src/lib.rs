//! Process-wide logging setup shared by the binaries.

/// Initialize process-wide tracing with the format chosen by `LOG_FORMAT`.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber construction (format, filters).
pub mod tracing;
