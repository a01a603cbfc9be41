use std::ops::{Deref, Range};

/// Raw device memory as carried by a dump.
///
/// The layout is the device's native one and is never reinterpreted here,
/// so a buffer written out and read back must stay bit-exact. Buffers are
/// immutable; edits produce a new buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ParameterBuffer {
    bytes: Vec<u8>,
}

impl ParameterBuffer {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    /// Copy of this buffer with every byte inside `zones` set to zero.
    /// Zone ends past the buffer are cut to its length.
    pub fn blanked_out(&self, zones: &[Range<usize>]) -> ParameterBuffer {
        let mut bytes = self.bytes.clone();
        for zone in zones {
            let end = zone.end.min(bytes.len());
            let start = zone.start.min(end);
            bytes[start..end].fill(0);
        }
        ParameterBuffer::new(bytes)
    }

    /// Copy of this buffer with `data` written at `offset`, growing the
    /// buffer if needed.
    pub fn with_bytes_at(&self, offset: usize, data: &[u8]) -> ParameterBuffer {
        let mut bytes = self.bytes.clone();
        let end = offset + data.len();
        if bytes.len() < end {
            bytes.resize(end, 0);
        }
        bytes[offset..end].copy_from_slice(data);
        ParameterBuffer::new(bytes)
    }
}

impl Deref for ParameterBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for ParameterBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for ParameterBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blanked_out_zeroes_only_zone() {
        let buffer = ParameterBuffer::new(vec![0xaa; 10]);
        let blanked = buffer.blanked_out(&[2..5]);
        assert_eq!(blanked.as_slice(), &[0xaa, 0xaa, 0, 0, 0, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa]);
        assert_eq!(buffer.as_slice(), &[0xaa; 10]);
    }

    #[test]
    fn test_blanked_out_clips_zone() {
        let buffer = ParameterBuffer::new(vec![1; 4]);
        assert_eq!(buffer.blanked_out(&[2..20]).as_slice(), &[1, 1, 0, 0]);
        assert_eq!(buffer.blanked_out(&[8..20]).as_slice(), &[1, 1, 1, 1]);
    }

    #[test]
    fn test_with_bytes_at() {
        let buffer = ParameterBuffer::new(vec![0; 3]);
        assert_eq!(buffer.with_bytes_at(1, &[7, 8]).as_slice(), &[0, 7, 8]);
        assert_eq!(buffer.with_bytes_at(2, &[7, 8]).as_slice(), &[0, 0, 7, 8]);
    }
}
