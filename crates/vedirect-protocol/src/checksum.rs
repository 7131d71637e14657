//! Running modulo-256 checksum shared by the decoder and encoder.

/// Byte sum of a frame, wrapping at 256
///
/// A frame is valid when the sum of every byte from the first header up to and
/// including the trailing checksum byte is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checksum(u8);

impl Checksum {
    pub fn new() -> Self {
        Self(0)
    }

    /// Add one byte to the running sum
    pub fn add(&mut self, byte: u8) {
        self.0 = self.0.wrapping_add(byte);
    }

    /// Add every byte of a slice
    pub fn extend(&mut self, bytes: &[u8]) {
        self.0 = bytes.iter().fold(self.0, |acc, &b| acc.wrapping_add(b));
    }

    /// Current sum modulo 256
    pub fn value(&self) -> u8 {
        self.0
    }

    /// True when the bytes seen so far form a valid frame
    pub fn is_valid(&self) -> bool {
        self.0 == 0
    }

    /// The byte that brings the sum back to zero
    pub fn complement(&self) -> u8 {
        0u8.wrapping_sub(self.0)
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_at_256() {
        let mut sum = Checksum::new();
        sum.add(200);
        sum.add(100);
        assert_eq!(sum.value(), 44);
    }

    #[test]
    fn test_complement_zeroes_sum() {
        let mut sum = Checksum::new();
        sum.extend(b"\r\nV\t12800\r\nChecksum\t");
        let fix = sum.complement();
        sum.add(fix);
        assert!(sum.is_valid());
    }

    #[test]
    fn test_complement_of_zero_is_zero() {
        assert_eq!(Checksum::new().complement(), 0);
    }

    #[test]
    fn test_reset() {
        let mut sum = Checksum::new();
        sum.add(0x3A);
        sum.reset();
        assert!(sum.is_valid());
    }
}
