//! Async VE.Direct Record Reader
//!
//! Reads one byte at a time from an async transport and feeds the decoder.
//! Wrap unbuffered transports in `tokio::io::BufReader` to avoid a syscall per byte.

use crate::config::ReaderConfig;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info, warn};
use vedirect_protocol::{typecast, FrameDecoder, TypedRecord, VeDirectError};

/// Pull or push typed records from an async byte source
pub struct RecordReader<R> {
    transport: R,
    decoder: FrameDecoder,
    timeout: Duration,
}

impl<R: AsyncRead + Unpin> RecordReader<R> {
    /// Create a reader over a transport
    pub fn new(transport: R, config: &ReaderConfig) -> Self {
        Self::with_timeout(transport, config.read_timeout())
    }

    pub fn with_timeout(transport: R, timeout: Duration) -> Self {
        Self {
            transport,
            decoder: FrameDecoder::new(),
            timeout,
        }
    }

    pub fn decoder(&self) -> &FrameDecoder {
        &self.decoder
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Give back the transport, discarding any partial frame
    pub fn into_inner(self) -> R {
        self.transport
    }

    /// Wait for the next record, up to the configured timeout
    ///
    /// Returns `Ok(None)` on timeout. The partial frame is kept, so the
    /// next call continues where this one stopped.
    pub async fn read_record(&mut self) -> Result<Option<TypedRecord>, VeDirectError> {
        self.read_record_timeout(self.timeout).await
    }

    /// Wait for the next record, up to `timeout`
    pub async fn read_record_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<TypedRecord>, VeDirectError> {
        match tokio::time::timeout(timeout, self.next_record()).await {
            Ok(result) => result.map(Some),
            Err(_) => {
                debug!(
                    "{}",
                    VeDirectError::ReadTimeout(timeout.as_millis() as u64)
                );
                Ok(None)
            }
        }
    }

    /// Wait for the next record without a deadline
    ///
    /// Cancel safe: a byte is either fully fed to the decoder or not read at all.
    pub async fn next_record(&mut self) -> Result<TypedRecord, VeDirectError> {
        let mut byte = [0u8; 1];
        loop {
            if self.transport.read(&mut byte).await? == 0 {
                return Err(VeDirectError::TransportClosed);
            }
            if let Some(raw) = self.decoder.feed(byte[0]) {
                self.report_metrics();
                return typecast(&raw);
            }
        }
    }

    /// Deliver every record to `on_record` until the transport closes
    ///
    /// Catalog gaps (`UnknownCode`, `InvalidValue`) are handed to the callback
    /// as `Err` and the loop continues; transport errors end it. Stops after
    /// `limit` deliveries when given. Returns the number of deliveries.
    pub async fn run<F>(&mut self, limit: Option<usize>, mut on_record: F) -> Result<usize, VeDirectError>
    where
        F: FnMut(Result<TypedRecord, VeDirectError>),
    {
        info!("Starting VE.Direct record loop");
        let mut delivered = 0;

        while limit.map_or(true, |n| delivered < n) {
            match self.next_record().await {
                Ok(record) => on_record(Ok(record)),
                Err(e) if e.is_catalog_gap() => {
                    warn!("Record dropped: {}", e);
                    on_record(Err(e));
                }
                Err(VeDirectError::TransportClosed) => {
                    info!("Transport closed after {} records", delivered);
                    break;
                }
                Err(e) => return Err(e),
            }
            delivered += 1;
        }

        Ok(delivered)
    }

    fn report_metrics(&self) {
        let stats = self.decoder.stats();
        metrics::counter!("vedirect_frames_decoded").absolute(stats.frames);
        metrics::counter!("vedirect_frames_malformed").absolute(stats.malformed_frames);
        metrics::counter!("vedirect_hex_frames").absolute(stats.hex_frames);
    }
}
