//! VE.Direct monitor and emulator
//!
//! Reads typed records from a serial port and prints them, or impersonates a
//! device by writing sample frames to a port.

mod config;

pub use config::{AppConfig, OutputFormat};

use std::io::Write;
use tokio::io::{AsyncRead, BufReader};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use vedirect_emulator::{Emulator, EmulatorConfig};
use vedirect_protocol::{TypedRecord, VeDirectError};
use vedirect_reader::{open_async, RecordReader};

/// Initialize tracing to stderr, keeping stdout for records
pub fn init_logging(config: &AppConfig) -> anyhow::Result<()> {
    let level: Level = config.log_level.parse().unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if config.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Render a record for stdout
pub fn format_record(record: &TypedRecord, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string(record),
        OutputFormat::Text => Ok(record
            .fields()
            .iter()
            .map(|field| format!("{}: {}", field.name, field.display()))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Records and timeouts seen by one monitor session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSummary {
    /// Records delivered, including those dropped for catalog gaps
    pub records: usize,
    /// Pulls that reached `read_timeout_ms` without a complete frame
    pub timeouts: usize,
}

/// Pull records from `reader` and write them to `out` until the transport
/// closes or the configured record limit is reached
pub async fn monitor<R, W>(
    reader: &mut RecordReader<R>,
    config: &AppConfig,
    out: &mut W,
) -> anyhow::Result<MonitorSummary>
where
    R: AsyncRead + Unpin,
    W: Write,
{
    let mut summary = MonitorSummary::default();
    while config.limit().map_or(true, |n| summary.records < n) {
        match reader.read_record().await {
            Ok(Some(record)) => {
                writeln!(out, "{}", format_record(&record, config.output)?)?;
                summary.records += 1;
            }
            Ok(None) => {
                summary.timeouts += 1;
                warn!("No VE.Direct frame within {} ms", config.read_timeout_ms);
            }
            Err(e) if e.is_catalog_gap() => {
                warn!("Skipping record: {}", e);
                summary.records += 1;
            }
            Err(VeDirectError::TransportClosed) => {
                info!("Transport closed");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(summary)
}

/// Print records from the configured port until it closes or the limit is reached
pub async fn run_monitor(config: &AppConfig) -> anyhow::Result<()> {
    let port = open_async(&config.serial())?;
    let mut reader = RecordReader::new(BufReader::new(port), &config.reader());

    let summary = monitor(&mut reader, config, &mut std::io::stdout()).await?;

    let stats = reader.decoder().stats();
    info!(
        "Monitor stopped after {} records, {} timeouts ({} malformed frames, {} HEX messages)",
        summary.records, summary.timeouts, stats.malformed_frames, stats.hex_frames
    );
    Ok(())
}

/// Write emulated frames to the configured port
pub async fn run_emulator(config: &AppConfig, emulator: &EmulatorConfig) -> anyhow::Result<()> {
    info!("VE.Direct emulator writing to {}", config.device);
    let port = open_async(&config.serial())?;
    Emulator::new(port, emulator)
        .send_frames(config.records as u64)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use vedirect_protocol::{encode, typecast, RawRecord};

    fn record() -> TypedRecord {
        let raw: RawRecord = [("V", "12800"), ("PPV", "130"), ("CS", "3")]
            .into_iter()
            .collect();
        typecast(&raw).unwrap()
    }

    #[test]
    fn test_format_json() {
        let line = format_record(&record(), OutputFormat::Json).unwrap();
        assert_eq!(line, r#"{"batteryVoltage":12800,"panelPower":130,"mode":"Bulk"}"#);
    }

    #[test]
    fn test_format_text() {
        let text = format_record(&record(), OutputFormat::Text).unwrap();
        assert_eq!(text, "batteryVoltage: 12.80 V\npanelPower: 130 W\nmode: Bulk");
    }

    fn monitor_config(records: usize) -> AppConfig {
        AppConfig {
            read_timeout_ms: 100,
            records,
            ..Default::default()
        }
    }

    fn raw_frame(fields: &[(&str, &str)]) -> Vec<u8> {
        let record: RawRecord = fields.iter().copied().collect();
        encode(&record)
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_reports_timeouts() {
        let config = monitor_config(0);
        let (mut device, host) = tokio::io::duplex(256);
        let mut reader = RecordReader::new(host, &config.reader());

        let sender = tokio::spawn(async move {
            device.write_all(&raw_frame(&[("PPV", "130")])).await.unwrap();
            tokio::time::sleep(Duration::from_millis(250)).await;
        });

        let mut out = Vec::new();
        let summary = monitor(&mut reader, &config, &mut out).await.unwrap();
        sender.await.unwrap();

        assert_eq!(summary.records, 1);
        assert!(summary.timeouts >= 1);
        assert_eq!(String::from_utf8(out).unwrap(), "{\"panelPower\":130}\n");
    }

    #[tokio::test]
    async fn test_monitor_stops_at_limit() {
        let mut bytes = raw_frame(&[("CS", "8")]);
        for _ in 0..3 {
            bytes.extend(raw_frame(&[("CS", "3")]));
        }
        let config = monitor_config(2);
        let mut reader = RecordReader::new(&bytes[..], &config.reader());

        let mut out = Vec::new();
        let summary = monitor(&mut reader, &config, &mut out).await.unwrap();

        assert_eq!(summary, MonitorSummary { records: 2, timeouts: 0 });
        assert_eq!(String::from_utf8(out).unwrap(), "{\"mode\":\"Bulk\"}\n");
    }
}
