//! VE.Direct Frame Encoder
//!
//! Serializes a record into the exact byte sequence a device would emit.
//! Used to emulate devices and to drive the decoder in tests.

use crate::checksum::Checksum;
use crate::record::RawRecord;
use crate::{CHECKSUM_KEY, DELIMITER, FILLER, FRAME_START};

/// Encode a record as one text frame, including the trailing checksum byte
pub fn encode(record: &RawRecord) -> Vec<u8> {
    encode_fields(record.iter())
}

/// Encode key/value pairs in iteration order
pub fn encode_fields<'a, I>(fields: I) -> Vec<u8>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut frame = Vec::with_capacity(256);
    for (key, value) in fields {
        frame.push(FILLER);
        frame.push(FRAME_START);
        frame.extend_from_slice(key.as_bytes());
        frame.push(DELIMITER);
        frame.extend_from_slice(value.as_bytes());
    }
    frame.push(FILLER);
    frame.push(FRAME_START);
    frame.extend_from_slice(CHECKSUM_KEY);
    frame.push(DELIMITER);

    let mut sum = Checksum::new();
    sum.extend(&frame);
    frame.push(sum.complement());
    frame
}
