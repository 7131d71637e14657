//! VE.Direct Record Delivery
//!
//! Adapters that drive a [`vedirect_protocol::FrameDecoder`] from a byte
//! transport and hand typed records to the caller:
//!
//! - [`RecordReader`]: async pull with a deadline, or push to a callback
//! - [`RecordQueue`]: background task feeding a bounded, freshest-first queue
//! - [`BlockingRecordReader`]: the same pull/push styles over `std::io::Read`
//!
//! Each adapter owns its decoder; never share one transport between adapters.

mod blocking;
mod config;
mod event;
mod reader;
mod serial;

pub use blocking::BlockingRecordReader;
pub use config::{ReaderConfig, SerialConfig};
pub use event::{spawn_event_loop, QueuedRecord, RecordQueue};
pub use reader::RecordReader;
pub use serial::{open_async, open_blocking};

pub use vedirect_protocol::{TypedRecord, VeDirectError};
