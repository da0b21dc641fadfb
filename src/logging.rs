//! Unified Logging Macros for the switch endpoint
//!
//! This module provides a unified logging interface that automatically
//! selects between `log::` and `defmt::` based on the active feature flags.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::switch_log;
//!
//! switch_log!(info, "EP={}: do state change {}", 2, true);
//! switch_log!(debug, "Matched BTN1_PRESS");
//! switch_log!(warn, "Relay send failed");
//! switch_log!(error, "Configuration write failed");
//! switch_log!(trace, "Dispatcher idle");
//! ```
//!
//! # Feature Flags
//!
//! - `log` - Uses `log::` crate (host builds, USB/serial loggers)
//! - `defmt` - Uses `defmt::` (more efficient for embedded)
//! - neither - Logging compiles to nothing, arguments are still type-checked
//!
//! Only `{}` and `{:?}` placeholders are used so the same call site works with
//! both backends.

/// Unified logging macro - automatically selects log:: or defmt:: based on features
#[macro_export]
#[cfg(feature = "log")]
macro_rules! switch_log {
    (info, $($arg:tt)*) => { log::info!($($arg)*) };
    (debug, $($arg:tt)*) => { log::debug!($($arg)*) };
    (warn, $($arg:tt)*) => { log::warn!($($arg)*) };
    (error, $($arg:tt)*) => { log::error!($($arg)*) };
    (trace, $($arg:tt)*) => { log::trace!($($arg)*) };
}

#[macro_export]
#[cfg(all(feature = "defmt", not(feature = "log")))]
macro_rules! switch_log {
    (info, $($arg:tt)*) => { defmt::info!($($arg)*) };
    (debug, $($arg:tt)*) => { defmt::debug!($($arg)*) };
    (warn, $($arg:tt)*) => { defmt::warn!($($arg)*) };
    (error, $($arg:tt)*) => { defmt::error!($($arg)*) };
    (trace, $($arg:tt)*) => { defmt::trace!($($arg)*) };
}

#[macro_export]
#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! switch_log {
    ($level:ident, $($arg:tt)*) => {{
        let _ = core::format_args!($($arg)*);
    }};
}
