//! VE.Direct Error Types

use thiserror::Error;

/// Errors and diagnostic conditions raised while decoding VE.Direct telemetry
///
/// Only catalog and transport failures are returned as `Err` to callers.
/// Frame-level noise (`MalformedFrame`, `UndecodableField`, `UnknownFieldKey`)
/// is logged and counted, and `ReadTimeout` is folded into an empty result.
#[derive(Debug, Error)]
pub enum VeDirectError {
    /// Frame checksum did not sum to zero
    #[error("Malformed frame: checksum remainder {remainder}")]
    MalformedFrame { remainder: u8 },

    /// Key or value bytes were not valid UTF-8
    #[error("Undecodable field: {key:?}")]
    UndecodableField { key: Vec<u8> },

    /// Field key has no catalog entry
    #[error("Unknown field key: {0}")]
    UnknownFieldKey(String),

    /// Lookup table has no entry for the received code
    #[error("Unknown code {code:?} for field {key}")]
    UnknownCode { key: String, code: String },

    /// Catalogued field whose value does not parse under its decode rule
    #[error("Invalid value {value:?} for field {key}")]
    InvalidValue { key: String, value: String },

    /// No complete frame arrived before the deadline
    #[error("Timeout waiting for VE.Direct frame after {0}ms")]
    ReadTimeout(u64),

    /// The byte source reached end of stream
    #[error("Transport closed")]
    TransportClosed,

    /// Serial port or I/O error
    #[error("Serial port error: {0}")]
    Serial(String),
}

impl VeDirectError {
    /// Whether this error indicates a gap in the field catalog rather than transport noise
    pub fn is_catalog_gap(&self) -> bool {
        matches!(
            self,
            VeDirectError::UnknownCode { .. } | VeDirectError::InvalidValue { .. }
        )
    }
}

impl From<std::io::Error> for VeDirectError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => VeDirectError::TransportClosed,
            _ => VeDirectError::Serial(err.to_string()),
        }
    }
}
