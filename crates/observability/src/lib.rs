//! Tracing and logging setup shared by the hrdesk crates.

/// Initialize process-wide observability with JSON logs.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    self::tracing::init(LogFormat::Json);
}

/// Initialize observability with an explicit output format.
pub fn init_with(format: LogFormat) {
    self::tracing::init(format);
}

/// Tracing configuration (filters, formats).
pub mod tracing;

/// Credential masking for log fields.
pub mod redact;

pub use redact::redact;
pub use self::tracing::LogFormat;
