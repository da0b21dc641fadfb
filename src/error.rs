//! Error types for switch endpoint operations following M-ERRORS-CANONICAL-STRUCTS guideline.
//!
//! This module provides structured error types with backtraces (when std is enabled)
//! and helper methods for error information.
//!
//! None of these errors is fatal to the device: the endpoint logs them and keeps
//! running on in-memory state, default configuration, or without a confirmed relay.

use core::fmt;

#[cfg(feature = "std")]
use std::backtrace::Backtrace;

/// Result type alias for switch endpoint operations.
pub type Result<T> = core::result::Result<T, SwitchError>;

// =============================================================================
// Error Kind Enums (Internal)
// =============================================================================

/// Configuration error variants (internal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum ConfigErrorKind {
    Missing,
    InvalidButtonCount,
    InvalidPin,
    DuplicatePin,
}

/// Persistence error variants (internal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum PersistenceErrorKind {
    NotFound,
    WriteFailed,
    ReadFailed,
    Corrupt,
    BufferTooSmall,
}

/// Outbound command error variants (internal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum CommandErrorKind {
    SendFailed,
    PayloadTooLarge,
}

/// ZCL boundary error variants (internal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum ZclErrorKind {
    UnsupportedCluster,
    UnsupportedAttribute,
    UnsupportedCommand,
    InvalidPayload,
    InvalidValue,
}

// =============================================================================
// Main Error Type
// =============================================================================

/// Switch endpoint error types.
///
/// This is the main error type returned by all endpoint operations.
/// It contains a backtrace (when std feature is enabled) and detailed
/// error information through helper methods.
#[derive(Debug)]
#[cfg_attr(all(feature = "defmt", not(feature = "std")), derive(defmt::Format))]
pub enum SwitchError {
    /// Configuration errors (first boot, invalid button layout, etc.)
    Config(ConfigError),
    /// Persistence errors (record missing, write failure, corruption)
    Persistence(PersistenceError),
    /// Outbound command errors (send failure, oversized payload)
    Command(CommandError),
    /// ZCL boundary errors (unknown cluster/attribute, malformed payload)
    Zcl(ZclError),
    /// Operation called in the wrong lifecycle phase
    InvalidState,
    /// Operation not available in the current endpoint mode
    UnsupportedOperation,
}

// =============================================================================
// Structured Error Types
// =============================================================================

/// Configuration error with optional backtrace
#[derive(Debug)]
#[cfg_attr(all(feature = "defmt", not(feature = "std")), derive(defmt::Format))]
pub struct ConfigError {
    kind: ConfigErrorKind,
    #[cfg(feature = "std")]
    backtrace: Backtrace,
}

impl ConfigError {
    pub(crate) fn new(kind: ConfigErrorKind) -> Self {
        Self {
            kind,
            #[cfg(feature = "std")]
            backtrace: Backtrace::capture(),
        }
    }

    /// Check if the configuration was missing (first boot)
    pub fn is_missing(&self) -> bool {
        matches!(self.kind, ConfigErrorKind::Missing)
    }

    /// Check if the button layout had an unsupported number of buttons
    pub fn is_invalid_button_count(&self) -> bool {
        matches!(self.kind, ConfigErrorKind::InvalidButtonCount)
    }

    /// Check if a pin number was out of range or repeated
    pub fn is_invalid_pin(&self) -> bool {
        matches!(self.kind, ConfigErrorKind::InvalidPin | ConfigErrorKind::DuplicatePin)
    }
}

/// Persistence error with optional backtrace
#[derive(Debug)]
#[cfg_attr(all(feature = "defmt", not(feature = "std")), derive(defmt::Format))]
pub struct PersistenceError {
    kind: PersistenceErrorKind,
    #[cfg(feature = "std")]
    backtrace: Backtrace,
}

impl PersistenceError {
    pub(crate) fn new(kind: PersistenceErrorKind) -> Self {
        Self {
            kind,
            #[cfg(feature = "std")]
            backtrace: Backtrace::capture(),
        }
    }

    /// Check if no record was stored yet
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, PersistenceErrorKind::NotFound)
    }

    /// Check if the storage medium rejected a write
    pub fn is_write_failure(&self) -> bool {
        matches!(self.kind, PersistenceErrorKind::WriteFailed)
    }

    /// Check if the stored record failed validation
    pub fn is_corrupt(&self) -> bool {
        matches!(self.kind, PersistenceErrorKind::Corrupt)
    }
}

/// Command error with optional backtrace
#[derive(Debug)]
#[cfg_attr(all(feature = "defmt", not(feature = "std")), derive(defmt::Format))]
pub struct CommandError {
    kind: CommandErrorKind,
    #[cfg(feature = "std")]
    backtrace: Backtrace,
}

impl CommandError {
    pub(crate) fn new(kind: CommandErrorKind) -> Self {
        Self {
            kind,
            #[cfg(feature = "std")]
            backtrace: Backtrace::capture(),
        }
    }

    /// Check if the protocol engine failed to send the command
    pub fn is_send_failure(&self) -> bool {
        matches!(self.kind, CommandErrorKind::SendFailed)
    }
}

/// ZCL boundary error with optional backtrace
#[derive(Debug)]
#[cfg_attr(all(feature = "defmt", not(feature = "std")), derive(defmt::Format))]
pub struct ZclError {
    kind: ZclErrorKind,
    #[cfg(feature = "std")]
    backtrace: Backtrace,
}

impl ZclError {
    pub(crate) fn new(kind: ZclErrorKind) -> Self {
        Self {
            kind,
            #[cfg(feature = "std")]
            backtrace: Backtrace::capture(),
        }
    }

    /// Check if the attribute is not handled by this endpoint
    pub fn is_unsupported_attribute(&self) -> bool {
        matches!(self.kind, ZclErrorKind::UnsupportedAttribute)
    }

    /// Check if the command is not handled by this endpoint
    pub fn is_unsupported_command(&self) -> bool {
        matches!(self.kind, ZclErrorKind::UnsupportedCommand)
    }

    /// Check if a payload or attribute value could not be decoded
    pub fn is_invalid_payload(&self) -> bool {
        matches!(self.kind, ZclErrorKind::InvalidPayload | ZclErrorKind::InvalidValue)
    }
}

// =============================================================================
// Convenience Constructors for SwitchError
// =============================================================================

impl SwitchError {
    // Configuration errors
    pub(crate) fn configuration_missing() -> Self {
        Self::Config(ConfigError::new(ConfigErrorKind::Missing))
    }

    pub(crate) fn invalid_button_count() -> Self {
        Self::Config(ConfigError::new(ConfigErrorKind::InvalidButtonCount))
    }

    pub(crate) fn invalid_pin() -> Self {
        Self::Config(ConfigError::new(ConfigErrorKind::InvalidPin))
    }

    pub(crate) fn duplicate_pin() -> Self {
        Self::Config(ConfigError::new(ConfigErrorKind::DuplicatePin))
    }

    // Persistence errors
    /// Returned by a [`StorageMedium`](crate::config::StorageMedium) with no stored record.
    pub fn record_not_found() -> Self {
        Self::Persistence(PersistenceError::new(PersistenceErrorKind::NotFound))
    }

    /// Returned by a [`StorageMedium`](crate::config::StorageMedium) whose write failed.
    pub fn write_failed() -> Self {
        Self::Persistence(PersistenceError::new(PersistenceErrorKind::WriteFailed))
    }

    /// Returned by a [`StorageMedium`](crate::config::StorageMedium) whose read failed.
    pub fn read_failed() -> Self {
        Self::Persistence(PersistenceError::new(PersistenceErrorKind::ReadFailed))
    }

    pub(crate) fn corrupt_record() -> Self {
        Self::Persistence(PersistenceError::new(PersistenceErrorKind::Corrupt))
    }

    pub(crate) fn buffer_too_small() -> Self {
        Self::Persistence(PersistenceError::new(PersistenceErrorKind::BufferTooSmall))
    }

    // Command errors
    /// Returned by a [`ZclStack`](crate::zcl::ZclStack) that could not queue a frame.
    pub fn send_failed() -> Self {
        Self::Command(CommandError::new(CommandErrorKind::SendFailed))
    }

    pub(crate) fn payload_too_large() -> Self {
        Self::Command(CommandError::new(CommandErrorKind::PayloadTooLarge))
    }

    // ZCL errors
    pub(crate) fn unsupported_cluster() -> Self {
        Self::Zcl(ZclError::new(ZclErrorKind::UnsupportedCluster))
    }

    pub(crate) fn unsupported_attribute() -> Self {
        Self::Zcl(ZclError::new(ZclErrorKind::UnsupportedAttribute))
    }

    pub(crate) fn unsupported_command() -> Self {
        Self::Zcl(ZclError::new(ZclErrorKind::UnsupportedCommand))
    }

    pub(crate) fn invalid_payload() -> Self {
        Self::Zcl(ZclError::new(ZclErrorKind::InvalidPayload))
    }

    pub(crate) fn invalid_value() -> Self {
        Self::Zcl(ZclError::new(ZclErrorKind::InvalidValue))
    }

    /// Check if this error means "no stored configuration" (first boot)
    pub fn is_not_found(&self) -> bool {
        match self {
            SwitchError::Persistence(e) => e.is_not_found() || e.is_corrupt(),
            SwitchError::Config(e) => e.is_missing(),
            _ => false,
        }
    }
}

// =============================================================================
// Display Implementation
// =============================================================================

impl fmt::Display for SwitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchError::Config(e) => write!(f, "Configuration error: {:?}", e.kind),
            SwitchError::Persistence(e) => write!(f, "Persistence error: {:?}", e.kind),
            SwitchError::Command(e) => write!(f, "Command error: {:?}", e.kind),
            SwitchError::Zcl(e) => write!(f, "ZCL error: {:?}", e.kind),
            SwitchError::InvalidState => write!(f, "Invalid state"),
            SwitchError::UnsupportedOperation => write!(f, "Unsupported operation"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SwitchError {}
