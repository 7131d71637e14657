//! Reader and serial port configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use vedirect_protocol::DEFAULT_BAUD_RATE;

/// Record delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Deadline for a pull read (milliseconds)
    pub read_timeout_ms: u64,
    /// Records kept for a slow event-queue consumer
    pub queue_capacity: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: 3000,
            queue_capacity: ring_buffer::DEFAULT_CAPACITY,
        }
    }
}

impl ReaderConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Serial port settings (VE.Direct is always 8N1)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Serial port device path (e.g., "/dev/ttyUSB0" or "COM3")
    pub device: String,
    pub baud_rate: u32,
    /// Per-read timeout of the port itself (milliseconds)
    pub timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_ms: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReaderConfig::default();
        assert_eq!(config.read_timeout(), Duration::from_secs(3));
        assert_eq!(config.queue_capacity, 4);
        assert_eq!(SerialConfig::default().baud_rate, 19200);
    }
}
