//! Periodic frame writer

use crate::model::DeviceModel;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};
use vedirect_protocol::{encode, RawRecord, VeDirectError};

/// Emulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    pub model: DeviceModel,
    /// Frame rate (real devices send one frame per second)
    pub samples_per_hour: f64,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            model: DeviceModel::All,
            samples_per_hour: 3600.0,
        }
    }
}

impl EmulatorConfig {
    /// Pause between frames
    pub fn interval(&self) -> Duration {
        if self.samples_per_hour > 0.0 {
            Duration::from_secs_f64(3600.0 / self.samples_per_hour)
        } else {
            Duration::ZERO
        }
    }
}

/// Writes a model's sample frame to a transport
pub struct Emulator<W> {
    writer: W,
    record: RawRecord,
    interval: Duration,
    frames_sent: u64,
}

impl<W: AsyncWrite + Unpin> Emulator<W> {
    pub fn new(writer: W, config: &EmulatorConfig) -> Self {
        info!("Emulating {} at {} frames/hour", config.model, config.samples_per_hour);
        Self {
            writer,
            record: config.model.sample_record(),
            interval: config.interval(),
            frames_sent: 0,
        }
    }

    /// Record sent in each frame, for changing values between frames
    pub fn record_mut(&mut self) -> &mut RawRecord {
        &mut self.record
    }

    /// Encoded bytes of the current frame
    pub fn frame(&self) -> Vec<u8> {
        encode(&self.record)
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Write one frame
    pub async fn send_frame(&mut self) -> Result<(), VeDirectError> {
        let frame = self.frame();
        self.writer.write_all(&frame).await?;
        self.writer.flush().await?;
        self.frames_sent += 1;
        debug!("Sent frame {} ({} bytes)", self.frames_sent, frame.len());
        Ok(())
    }

    /// Write `count` frames (0 = forever), pausing the configured interval after each
    pub async fn send_frames(&mut self, count: u64) -> Result<(), VeDirectError> {
        let mut sent = 0;
        while count == 0 || sent < count {
            self.send_frame().await?;
            sent += 1;
            tokio::time::sleep(self.interval).await;
        }
        info!("Emulator done after {} frames", sent);
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
