//! Optional YAML configuration for fftune sessions.
//!
//! Command-line arguments always win over values read from the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CliError;

/// Event nodes scanned by `--probe` unless configured otherwise.
pub const DEFAULT_PROBE_LIMIT: u32 = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TuneConfig {
    /// Event device opened when none is given on the command line
    pub device: Option<PathBuf>,
    /// Highest `/dev/input/eventN` index (exclusive) tried while probing
    pub probe_limit: u32,
    /// Stop every uploaded effect before exiting
    pub stop_on_exit: bool,
    /// Shell prompt
    pub prompt: String,
}

impl Default for TuneConfig {
    fn default() -> Self {
        Self {
            device: None,
            probe_limit: DEFAULT_PROBE_LIMIT,
            stop_on_exit: true,
            prompt: ">> ".to_string(),
        }
    }
}

impl TuneConfig {
    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Unreadable files, malformed YAML, unknown keys and a zero probe limit.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|e| {
            CliError::InvalidConfiguration(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_yaml_str(&text)?;
        debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    /// Parse and validate configuration text.
    ///
    /// # Errors
    ///
    /// Malformed YAML, unknown keys and a zero probe limit.
    pub fn from_yaml_str(text: &str) -> Result<Self, CliError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), CliError> {
        if self.probe_limit == 0 {
            return Err(CliError::InvalidConfiguration(
                "probe_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn empty_document_is_default() -> TestResult {
        let config = TuneConfig::from_yaml_str("{}")?;
        assert_eq!(config, TuneConfig::default());
        assert!(config.stop_on_exit);
        assert_eq!(config.probe_limit, DEFAULT_PROBE_LIMIT);
        Ok(())
    }

    #[test]
    fn partial_document_keeps_defaults() -> TestResult {
        let config = TuneConfig::from_yaml_str("device: /dev/input/event7\nprompt: \"ff> \"\n")?;
        assert_eq!(config.device, Some(PathBuf::from("/dev/input/event7")));
        assert_eq!(config.prompt, "ff> ");
        assert_eq!(config.probe_limit, DEFAULT_PROBE_LIMIT);
        Ok(())
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = TuneConfig::from_yaml_str("gain: 50\n");
        assert!(matches!(result, Err(CliError::YamlError(_))));
    }

    #[test]
    fn zero_probe_limit_is_invalid() {
        let result = TuneConfig::from_yaml_str("probe_limit: 0\n");
        assert!(matches!(result, Err(CliError::InvalidConfiguration(_))));
    }

    #[test]
    fn load_reads_file() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "stop_on_exit: false")?;
        let config = TuneConfig::load(file.path())?;
        assert!(!config.stop_on_exit);
        Ok(())
    }

    #[test]
    fn load_missing_file_is_invalid_configuration() {
        let result = TuneConfig::load(Path::new("/nonexistent/fftune.yaml"));
        assert!(matches!(result, Err(CliError::InvalidConfiguration(_))));
    }
}
