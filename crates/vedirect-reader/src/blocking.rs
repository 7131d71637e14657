//! Blocking VE.Direct Record Reader
//!
//! For thread-per-connection use over `std::io::Read`, typically a serial
//! port opened with [`crate::open_blocking`]. The port's own read timeout
//! bounds each byte read; the reader's timeout bounds a whole pull.

use crate::config::ReaderConfig;
use std::io::{ErrorKind, Read};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use vedirect_protocol::{typecast, FrameDecoder, RawRecord, TypedRecord, VeDirectError};

/// Back-off when a non-blocking transport has no data
const IDLE_SLEEP: Duration = Duration::from_millis(5);

/// Pull or push typed records from a blocking byte source
pub struct BlockingRecordReader<R> {
    transport: R,
    decoder: FrameDecoder,
    timeout: Duration,
}

impl<R: Read> BlockingRecordReader<R> {
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

    pub fn into_inner(self) -> R {
        self.transport
    }

    /// Block until a record completes or the configured timeout elapses
    pub fn read_record(&mut self) -> Result<Option<TypedRecord>, VeDirectError> {
        self.read_record_timeout(self.timeout)
    }

    /// Block until a record completes or `timeout` elapses (`Ok(None)`)
    pub fn read_record_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<TypedRecord>, VeDirectError> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(byte) = self.read_byte()? {
                if let Some(raw) = self.decoder.feed(byte) {
                    return typecast(&raw).map(Some);
                }
            }
        }
        debug!("{}", VeDirectError::ReadTimeout(timeout.as_millis() as u64));
        Ok(None)
    }

    /// Consume the bytes available right now and return the newest record they complete
    ///
    /// Older records completed by the same bytes are discarded. Intended for
    /// ports opened with a zero or very short timeout.
    pub fn poll_available(&mut self) -> Result<Option<TypedRecord>, VeDirectError> {
        let mut newest: Option<RawRecord> = None;
        let mut buf = [0u8; 64];
        loop {
            match self.transport.read(&mut buf) {
                Ok(0) if newest.is_none() => return Err(VeDirectError::TransportClosed),
                Ok(0) => break,
                Ok(n) => {
                    for &byte in &buf[..n] {
                        if let Some(raw) = self.decoder.feed(byte) {
                            if newest.replace(raw).is_some() {
                                debug!("Discarding older record in favour of newer one");
                            }
                        }
                    }
                }
                Err(e) if is_idle(&e) => break,
                Err(e) => return Err(e.into()),
            }
        }
        newest.as_ref().map(typecast).transpose()
    }

    /// Deliver every record to `on_record` until the transport closes
    ///
    /// Same contract as [`crate::RecordReader::run`].
    pub fn run<F>(&mut self, limit: Option<usize>, mut on_record: F) -> Result<usize, VeDirectError>
    where
        F: FnMut(Result<TypedRecord, VeDirectError>),
    {
        info!("Starting blocking VE.Direct record loop");
        let mut delivered = 0;

        while limit.map_or(true, |n| delivered < n) {
            let byte = match self.read_byte() {
                Ok(Some(byte)) => byte,
                Ok(None) => continue,
                Err(VeDirectError::TransportClosed) => {
                    info!("Transport closed after {} records", delivered);
                    break;
                }
                Err(e) => return Err(e),
            };
            let Some(raw) = self.decoder.feed(byte) else {
                continue;
            };
            match typecast(&raw) {
                Ok(record) => on_record(Ok(record)),
                Err(e) => {
                    warn!("Record dropped: {}", e);
                    on_record(Err(e));
                }
            }
            delivered += 1;
        }

        Ok(delivered)
    }

    /// Read one byte; `None` when the transport timed out or has nothing yet
    fn read_byte(&mut self) -> Result<Option<u8>, VeDirectError> {
        let mut byte = [0u8; 1];
        match self.transport.read(&mut byte) {
            Ok(0) => Err(VeDirectError::TransportClosed),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                std::thread::sleep(IDLE_SLEEP);
                Ok(None)
            }
            Err(e) if is_idle(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn is_idle(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
    )
}
