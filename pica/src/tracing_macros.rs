//! Logging macros that forward to `tracing` when the `tracing` feature is
//! enabled and compile to nothing otherwise.

/// Emit a `tracing::debug!` event (no-op without the `tracing` feature).
#[cfg(feature = "tracing")]
#[macro_export]
#[doc(hidden)]
macro_rules! debug {
    ($($arg:tt)*) => { ::tracing::debug!($($arg)*) };
}

/// Emit a `tracing::debug!` event (no-op without the `tracing` feature).
#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::trace!` event (no-op without the `tracing` feature).
#[cfg(feature = "tracing")]
#[macro_export]
#[doc(hidden)]
macro_rules! trace {
    ($($arg:tt)*) => { ::tracing::trace!($($arg)*) };
}

/// Emit a `tracing::trace!` event (no-op without the `tracing` feature).
#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! trace {
    ($($arg:tt)*) => {};
}
