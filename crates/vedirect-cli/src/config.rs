//! Application configuration

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use vedirect_emulator::{DeviceModel, EmulatorConfig};
use vedirect_reader::{ReaderConfig, SerialConfig};

/// How monitored records are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per record
    Json,
    /// One `name: value unit` line per field
    Text,
}

/// Settings for the `vedirect` binary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Serial port device path
    pub device: String,
    pub baud_rate: u32,
    /// Deadline for one record (milliseconds)
    pub read_timeout_ms: u64,
    /// Records to read or frames to send (0 = unlimited)
    pub records: usize,
    /// Tracing level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub log_level: String,
    pub json_logs: bool,
    pub output: OutputFormat,
    /// Emulate this device model instead of monitoring
    pub emulate: Option<DeviceModel>,
    pub samples_per_hour: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let serial = SerialConfig::default();
        let emulator = EmulatorConfig::default();
        Self {
            device: serial.device,
            baud_rate: serial.baud_rate,
            read_timeout_ms: ReaderConfig::default().read_timeout_ms,
            records: 0,
            log_level: "INFO".to_string(),
            json_logs: false,
            output: OutputFormat::Json,
            emulate: None,
            samples_per_hour: emulator.samples_per_hour,
        }
    }
}

impl AppConfig {
    /// Load from an optional TOML file, then `VEDIRECT_*` environment variables
    ///
    /// Without an explicit path, `vedirect.toml` in the working directory is
    /// used when present.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(path.unwrap_or("vedirect")).required(path.is_some()))
            .add_source(Environment::with_prefix("VEDIRECT").try_parsing(true));
        Self::from_builder(builder)
    }

    /// Deserialize from caller-assembled sources; missing keys take defaults
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    pub fn serial(&self) -> SerialConfig {
        SerialConfig {
            device: self.device.clone(),
            baud_rate: self.baud_rate,
            ..Default::default()
        }
    }

    pub fn reader(&self) -> ReaderConfig {
        ReaderConfig {
            read_timeout_ms: self.read_timeout_ms,
            ..Default::default()
        }
    }

    /// Emulator settings, when emulation is requested
    pub fn emulator(&self) -> Option<EmulatorConfig> {
        self.emulate.map(|model| EmulatorConfig {
            model,
            samples_per_hour: self.samples_per_hour,
        })
    }

    /// Record limit, `None` for unlimited
    pub fn limit(&self) -> Option<usize> {
        (self.records > 0).then_some(self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> AppConfig {
        AppConfig::from_builder(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
            .unwrap()
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = from_toml("");
        assert_eq!(config.device, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 19200);
        assert_eq!(config.output, OutputFormat::Json);
        assert!(config.emulator().is_none());
        assert_eq!(config.limit(), None);
    }

    #[test]
    fn test_emulator_settings() {
        let config = from_toml(
            r#"
            device = "/tmp/vmodem0"
            emulate = "BMV_700"
            samples_per_hour = 720.0
            records = 10
            "#,
        );
        let emulator = config.emulator().unwrap();
        assert_eq!(emulator.model, DeviceModel::Bmv700);
        assert_eq!(emulator.interval().as_secs(), 5);
        assert_eq!(config.serial().device, "/tmp/vmodem0");
        assert_eq!(config.limit(), Some(10));
    }

    #[test]
    fn test_monitor_settings() {
        let config = from_toml(
            r#"
            read_timeout_ms = 500
            output = "text"
            log_level = "DEBUG"
            "#,
        );
        assert_eq!(config.reader().read_timeout_ms, 500);
        assert_eq!(config.output, OutputFormat::Text);
    }

    #[test]
    fn test_unknown_model_rejected() {
        let result = AppConfig::from_builder(
            Config::builder().add_source(File::from_str("emulate = \"BMV_900\"", FileFormat::Toml)),
        );
        assert!(result.is_err());
    }
}
