//! Error types for the fftune CLI

use std::path::PathBuf;

use openracing_fftune::{DeviceError, FfTuneError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to open device {}: {source}", path.display())]
    DeviceOpen {
        path: PathBuf,
        #[source]
        source: DeviceError,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Event devices are only supported on Linux")]
    Unsupported,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Force feedback error: {0}")]
    Tune(#[from] FfTuneError),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::DeviceNotFound(_) => 2,
            CliError::InvalidConfiguration(_) | CliError::YamlError(_) => 4,
            CliError::DeviceOpen { .. } | CliError::IoError(_) | CliError::Unsupported => 5,
            CliError::Tune(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_category() {
        assert_eq!(CliError::DeviceNotFound("x".into()).exit_code(), 2);
        assert_eq!(CliError::InvalidConfiguration("x".into()).exit_code(), 4);
        assert_eq!(CliError::Unsupported.exit_code(), 5);
        assert_eq!(
            CliError::DeviceOpen {
                path: PathBuf::from("/dev/input/event3"),
                source: DeviceError::rejected("open", "busy"),
            }
            .exit_code(),
            5
        );
    }

    #[test]
    fn open_error_names_path() {
        let err = CliError::DeviceOpen {
            path: PathBuf::from("/dev/input/event3"),
            source: DeviceError::rejected("open", "busy"),
        };
        assert!(err.to_string().contains("/dev/input/event3"));
    }
}
