//! Bounded Ring Buffer
//!
//! Fixed-capacity FIFO that overwrites its oldest entry when full, for
//! consumers that want the freshest telemetry rather than every record.

mod buffer;

pub use buffer::{BufferStats, RingBuffer, DEFAULT_CAPACITY};
