//! Event-queue delivery
//!
//! A background task decodes records into a bounded queue and signals a
//! readiness event. When the consumer falls behind, the oldest unread record
//! is evicted so the queue always holds the freshest telemetry.

use crate::config::ReaderConfig;
use crate::reader::RecordReader;
use ring_buffer::{BufferStats, RingBuffer};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::AsyncRead;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use vedirect_protocol::{TypedRecord, VeDirectError};

/// A queued record, or the catalog gap that prevented typing it
pub type QueuedRecord = Result<TypedRecord, VeDirectError>;

/// Bounded record queue shared by one producer and one consumer
pub struct RecordQueue {
    buffer: Mutex<RingBuffer<QueuedRecord>>,
    ready: Notify,
}

impl RecordQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Mutex::new(RingBuffer::new(capacity)),
            ready: Notify::new(),
        }
    }

    /// Queue sized by `queue_capacity`
    pub fn with_config(config: &ReaderConfig) -> Self {
        Self::new(config.queue_capacity)
    }

    /// Enqueue a record and signal readiness, evicting the oldest if full
    pub fn push(&self, record: QueuedRecord) {
        if self.lock().push(record).is_some() {
            debug!("Record queue full, evicted oldest unread record");
        }
        self.ready.notify_one();
    }

    /// Take the oldest queued record, if any
    pub fn pop(&self) -> Option<QueuedRecord> {
        self.lock().pop()
    }

    /// Wait for and take the oldest queued record
    pub async fn recv(&self) -> QueuedRecord {
        loop {
            if let Some(record) = self.pop() {
                return record;
            }
            // A notify_one issued since the pop above leaves a permit, so no wake-up is lost
            self.ready.notified().await;
        }
    }

    /// Wait until at least one record is queued, without taking it
    pub async fn wait_ready(&self) {
        while self.is_empty() {
            self.ready.notified().await;
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn stats(&self) -> BufferStats {
        self.lock().stats()
    }

    fn lock(&self) -> MutexGuard<'_, RingBuffer<QueuedRecord>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Run `reader` in a background task, pushing each record into `queue`
///
/// The task ends with `Ok(())` when the transport closes and with `Err` on a
/// transport error. Aborting the handle stops it.
pub fn spawn_event_loop<R>(
    mut reader: RecordReader<R>,
    queue: Arc<RecordQueue>,
) -> JoinHandle<Result<(), VeDirectError>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        info!("VE.Direct event loop started");
        loop {
            match reader.next_record().await {
                Ok(record) => queue.push(Ok(record)),
                Err(e) if e.is_catalog_gap() => {
                    warn!("Queueing catalog gap: {}", e);
                    queue.push(Err(e));
                }
                Err(VeDirectError::TransportClosed) => {
                    info!("VE.Direct event loop finished, transport closed");
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
    })
}

impl<R> RecordReader<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    /// Move this reader into a background task feeding a new queue
    pub fn into_event_queue(
        self,
        capacity: usize,
    ) -> (Arc<RecordQueue>, JoinHandle<Result<(), VeDirectError>>) {
        let queue = Arc::new(RecordQueue::new(capacity));
        let handle = spawn_event_loop(self, Arc::clone(&queue));
        (queue, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use vedirect_protocol::{encode, RawRecord, Value};

    fn frame(ppv: i64) -> Vec<u8> {
        let record: RawRecord = [("PPV", ppv.to_string())].into_iter().collect();
        encode(&record)
    }

    fn ppv(record: &QueuedRecord) -> i64 {
        record
            .as_ref()
            .ok()
            .and_then(|r| r.get("PPV"))
            .and_then(Value::as_i64)
            .unwrap_or(-1)
    }

    proptest! {
        #[test]
        fn prop_queue_keeps_newest(capacity in 1usize..8, count in 0i64..32) {
            let queue = RecordQueue::new(capacity);
            let mut decoder = vedirect_protocol::FrameDecoder::new();
            for n in 0..count {
                for raw in decoder.feed_slice(&frame(n)) {
                    queue.push(vedirect_protocol::typecast(&raw));
                }
            }

            let drained: Vec<i64> = std::iter::from_fn(|| queue.pop()).map(|r| ppv(&r)).collect();
            let kept = (count as usize).min(capacity) as i64;
            prop_assert_eq!(drained, ((count - kept)..count).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_with_config() {
        let queue = RecordQueue::with_config(&ReaderConfig::default());
        assert_eq!(queue.stats().capacity, 4);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_recv_in_order() {
        let mut bytes = Vec::new();
        for n in 1..=3 {
            bytes.extend(frame(n));
        }
        let reader = RecordReader::with_timeout(std::io::Cursor::new(bytes), Duration::from_secs(1));
        let (queue, handle) = reader.into_event_queue(8);

        assert_eq!(ppv(&queue.recv().await), 1);
        assert_eq!(ppv(&queue.recv().await), 2);
        assert_eq!(ppv(&queue.recv().await), 3);
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_slow_consumer_gets_freshest() {
        let mut bytes = Vec::new();
        for n in 1..=10 {
            bytes.extend(frame(n));
        }
        let reader = RecordReader::with_timeout(std::io::Cursor::new(bytes), Duration::from_secs(1));
        let (queue, handle) = reader.into_event_queue(3);
        handle.await.unwrap().unwrap();

        let stats = queue.stats();
        assert_eq!(stats.total_written, 10);
        assert_eq!(stats.evicted, 7);
        let drained: Vec<i64> = std::iter::from_fn(|| queue.pop()).map(|r| ppv(&r)).collect();
        assert_eq!(drained, vec![8, 9, 10]);
    }

    #[tokio::test]
    async fn test_wait_ready_signals_event() {
        let (mut device, host) = tokio::io::duplex(256);
        let reader = RecordReader::with_timeout(host, Duration::from_secs(1));
        let (queue, handle) = reader.into_event_queue(2);
        assert!(queue.is_empty());

        device.write_all(&frame(42)).await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), queue.wait_ready())
            .await
            .unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(ppv(&queue.pop().unwrap()), 42);

        drop(device);
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_catalog_gap_is_queued() {
        let record: RawRecord = [("CS", "200")].into_iter().collect();
        let reader = RecordReader::with_timeout(std::io::Cursor::new(encode(&record)), Duration::from_secs(1));
        let (queue, handle) = reader.into_event_queue(2);
        handle.await.unwrap().unwrap();
        assert!(matches!(queue.pop(), Some(Err(VeDirectError::UnknownCode { .. }))));
    }
}
