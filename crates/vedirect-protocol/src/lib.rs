//! VE.Direct Protocol Implementation
//!
//! Decodes the text telemetry stream of Victron Energy charge controllers,
//! battery monitors and inverters. Bytes are pushed one at a time into a
//! [`FrameDecoder`], which yields checksum-validated [`RawRecord`]s; [`typecast`]
//! turns those into unit-tagged [`TypedRecord`]s using the static field catalog.
//! [`encode`] produces the wire bytes for a record, for device emulation.

pub mod catalog;
mod checksum;
mod decoder;
mod encoder;
mod error;
pub mod flags;
mod record;
mod typecast;

pub use catalog::{Decode, FieldDescriptor, LookupTable, Unit};
pub use checksum::Checksum;
pub use decoder::{DecoderState, DecoderStats, FrameDecoder, MAX_KEY_LEN, MAX_VALUE_LEN};
pub use encoder::{encode, encode_fields};
pub use error::VeDirectError;
pub use record::{RawRecord, TypedField, TypedRecord, Value};
pub use typecast::{decode_value, parse_auto_base, typecast};

/// Byte that starts a field key (second byte of the `\r\n` header)
pub const FRAME_START: u8 = b'\n';
/// Header byte that is checksummed but otherwise ignored
pub const FILLER: u8 = b'\r';
/// Separates a key from its value
pub const DELIMITER: u8 = b'\t';
/// Starts a HEX protocol message
pub const HEX_MARKER: u8 = b':';
/// Ends a HEX protocol message
pub const HEX_TERMINATOR: u8 = b'\n';
/// Key of the final field, whose value is the checksum byte
pub const CHECKSUM_KEY: &[u8] = b"Checksum";

/// Serial line speed of every VE.Direct port
pub const DEFAULT_BAUD_RATE: u32 = 19200;

/// Decode a chunk of bytes and typecast every completed frame
pub fn decode_typed(
    decoder: &mut FrameDecoder,
    bytes: &[u8],
) -> Vec<Result<TypedRecord, VeDirectError>> {
    decoder
        .feed_slice(bytes)
        .iter()
        .map(typecast)
        .collect()
}
