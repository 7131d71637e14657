//! Serial port helpers

use crate::config::SerialConfig;
use std::time::Duration;
use tokio_serial::{DataBits, Parity, SerialPort, SerialPortBuilder, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::info;
use vedirect_protocol::VeDirectError;

fn builder(config: &SerialConfig) -> SerialPortBuilder {
    tokio_serial::new(&config.device, config.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .timeout(Duration::from_millis(config.timeout_ms))
}

/// Open a port for use with [`crate::RecordReader`]
pub fn open_async(config: &SerialConfig) -> Result<SerialStream, VeDirectError> {
    info!("Opening VE.Direct port {} at {} baud", config.device, config.baud_rate);
    builder(config)
        .open_native_async()
        .map_err(|e| VeDirectError::Serial(e.to_string()))
}

/// Open a port for use with [`crate::BlockingRecordReader`]
pub fn open_blocking(config: &SerialConfig) -> Result<Box<dyn SerialPort>, VeDirectError> {
    info!("Opening VE.Direct port {} at {} baud (blocking)", config.device, config.baud_rate);
    builder(config)
        .open()
        .map_err(|e| VeDirectError::Serial(e.to_string()))
}
