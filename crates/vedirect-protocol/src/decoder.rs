//! VE.Direct Frame Decoder
//!
//! Byte-driven state machine that recovers checksum-validated records from
//! the text protocol. Every call to [`FrameDecoder::feed`] performs at most one
//! transition, so work per byte is constant and the only buffered input is the
//! key and value currently being read.

use crate::checksum::Checksum;
use crate::record::RawRecord;
use crate::{CHECKSUM_KEY, DELIMITER, FILLER, FRAME_START, HEX_MARKER, HEX_TERMINATOR};
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Longest key accepted before the frame is abandoned
pub const MAX_KEY_LEN: usize = 32;

/// Longest value accepted before the frame is abandoned
pub const MAX_VALUE_LEN: usize = 64;

/// Decoder cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecoderState {
    /// Waiting for the frame-start byte
    WaitHeader,
    /// Reading a field key
    InKey,
    /// Reading a field value
    InValue,
    /// Next byte is the frame checksum
    InChecksum,
    /// Skipping a HEX protocol message
    HexEscape,
}

/// Counters of decoder outcomes since construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecoderStats {
    /// Frames returned to the caller
    pub frames: u64,
    /// Frames dropped on checksum mismatch or overlong fields
    pub malformed_frames: u64,
    /// Fields dropped because key or value was not UTF-8
    pub undecodable_fields: u64,
    /// HEX messages skipped
    pub hex_frames: u64,
}

/// Incremental VE.Direct text frame decoder
///
/// One instance owns the state of exactly one byte stream.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: DecoderState,
    key: Vec<u8>,
    value: Vec<u8>,
    checksum: Checksum,
    record: RawRecord,
    stats: DecoderStats,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::WaitHeader,
            key: Vec::with_capacity(MAX_KEY_LEN),
            value: Vec::with_capacity(MAX_VALUE_LEN),
            checksum: Checksum::new(),
            record: RawRecord::new(),
            stats: DecoderStats::default(),
        }
    }

    /// Consume one byte, returning a record when it completes a valid frame
    pub fn feed(&mut self, byte: u8) -> Option<RawRecord> {
        if byte == HEX_MARKER
            && !matches!(
                self.state,
                DecoderState::InChecksum | DecoderState::HexEscape
            )
        {
            self.enter_hex();
            return None;
        }

        match self.state {
            DecoderState::HexEscape => {
                if byte == HEX_TERMINATOR {
                    debug!("HEX message ended, waiting for header");
                    self.state = DecoderState::WaitHeader;
                }
                None
            }
            DecoderState::InChecksum => self.finish_frame(byte),
            _ => {
                self.checksum.add(byte);
                if byte == FILLER {
                    return None;
                }
                self.advance(byte);
                None
            }
        }
    }

    /// Feed a chunk of bytes, collecting every record it completes
    pub fn feed_slice(&mut self, bytes: &[u8]) -> Vec<RawRecord> {
        bytes.iter().filter_map(|&b| self.feed(b)).collect()
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Running checksum of the frame in progress
    pub fn checksum(&self) -> u8 {
        self.checksum.value()
    }

    /// Drop any partial frame and return to the initial state
    pub fn reset(&mut self) {
        self.clear_buffers();
        self.record.clear();
        self.checksum.reset();
        self.state = DecoderState::WaitHeader;
    }

    fn advance(&mut self, byte: u8) {
        match self.state {
            DecoderState::WaitHeader => {
                if byte == FRAME_START {
                    self.clear_buffers();
                    self.state = DecoderState::InKey;
                }
            }
            DecoderState::InKey => {
                if byte == DELIMITER {
                    if self.key == CHECKSUM_KEY {
                        self.state = DecoderState::InChecksum;
                    } else {
                        self.state = DecoderState::InValue;
                    }
                } else if self.key.len() < MAX_KEY_LEN {
                    self.key.push(byte);
                } else {
                    self.abandon_frame("key too long");
                }
            }
            DecoderState::InValue => {
                if byte == FRAME_START {
                    self.commit_field();
                    self.state = DecoderState::InKey;
                } else if self.value.len() < MAX_VALUE_LEN {
                    self.value.push(byte);
                } else {
                    self.abandon_frame("value too long");
                }
            }
            DecoderState::InChecksum | DecoderState::HexEscape => {}
        }
    }

    fn commit_field(&mut self) {
        match (
            std::str::from_utf8(&self.key),
            std::str::from_utf8(&self.value),
        ) {
            (Ok(key), Ok(value)) => {
                debug!("Field {}={}", key, value);
                self.record.insert(key, value);
            }
            _ => {
                warn!(
                    "Could not decode key {:?} and value {:?}, dropping field",
                    self.key, self.value
                );
                self.stats.undecodable_fields += 1;
            }
        }
        self.clear_buffers();
    }

    fn finish_frame(&mut self, byte: u8) -> Option<RawRecord> {
        self.checksum.add(byte);
        self.clear_buffers();
        self.state = DecoderState::WaitHeader;

        if self.checksum.is_valid() {
            self.stats.frames += 1;
            let record = std::mem::take(&mut self.record);
            info!("Decoded VE.Direct frame with {} fields", record.len());
            Some(record)
        } else {
            error!(
                "Malformed frame, checksum remainder {}",
                self.checksum.value()
            );
            self.stats.malformed_frames += 1;
            self.record.clear();
            self.checksum.reset();
            None
        }
    }

    fn enter_hex(&mut self) {
        debug!("HEX marker in state {:?}, skipping HEX message", self.state);
        if !self.record.is_empty() || !self.key.is_empty() {
            warn!("HEX message interrupted a text frame, dropping partial frame");
        }
        self.reset();
        self.state = DecoderState::HexEscape;
        self.stats.hex_frames += 1;
    }

    fn abandon_frame(&mut self, reason: &str) {
        error!("Malformed frame: {}", reason);
        self.stats.malformed_frames += 1;
        self.reset();
    }

    fn clear_buffers(&mut self) {
        self.key.clear();
        self.value.clear();
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
