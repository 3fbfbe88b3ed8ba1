//! Top-level error type for tuning sessions.

use serde::Serialize;

use crate::{DeviceError, EncodeError, TableError};

/// Every failure a tuning command can end with.
///
/// None of them is fatal: the session stays usable and the table is left in
/// its pre-command state.
#[derive(Debug, thiserror::Error)]
pub enum FfTuneError {
    /// Malformed `add` arguments
    #[error("invalid effect parameters: {0}")]
    Input(#[from] EncodeError),

    /// Effect table lookups and capacity
    #[error(transparent)]
    Table(#[from] TableError),

    /// Device refused the request or could not be reached
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// `run`/`stop`/`remove` without a slot argument
    #[error("no such effect")]
    MissingSlot,

    /// Slot argument that is not an integer
    #[error("no such effect '{0}'")]
    InvalidSlot(String),
}

/// Coarse classification for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Bad numeric token, unknown waveform or kind, missing token
    Input,
    /// Effect table full
    Capacity,
    /// Device rejection or transport failure
    Device,
    /// Slot index with no effect behind it
    Lookup,
}

impl FfTuneError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FfTuneError::Input(_) => ErrorCategory::Input,
            FfTuneError::Table(TableError::Full { .. }) => ErrorCategory::Capacity,
            FfTuneError::Table(TableError::NotFound { .. }) => ErrorCategory::Lookup,
            // internal ordering violations surface as device-side disagreements
            FfTuneError::Table(TableError::NotReserved { .. } | TableError::Unassigned { .. }) => {
                ErrorCategory::Device
            }
            FfTuneError::Device(_) => ErrorCategory::Device,
            FfTuneError::MissingSlot | FfTuneError::InvalidSlot(_) => ErrorCategory::Lookup,
        }
    }

    /// Whether the session can keep accepting commands.
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// Shorthand for a lookup failure on `slot`.
    pub fn no_such_effect(slot: i64) -> Self {
        FfTuneError::Table(TableError::NotFound { slot })
    }
}
