// Logging macros
//
// Format the message first, then run it through the default redactor before
// it reaches tracing. Structured fields are passed through untouched, so only
// put already-safe values there.

#[macro_export]
macro_rules! redacted_info {
    ($($arg:tt)*) => {
        tracing::info!("{}", $crate::redact(&format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! redacted_warn {
    ($($arg:tt)*) => {
        tracing::warn!("{}", $crate::redact(&format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! redacted_error {
    ($($arg:tt)*) => {
        tracing::error!("{}", $crate::redact(&format!($($arg)*)))
    };
}
