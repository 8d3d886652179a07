//! Process-wide logging setup.

pub mod tracing;

pub use self::tracing::{LogFormat, UnknownLogFormat};

/// Initialize JSON logging for the process.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(LogFormat::Json);
}

/// Initialize logging in the given format.
pub fn init_with(format: LogFormat) {
    tracing::init(format);
}
