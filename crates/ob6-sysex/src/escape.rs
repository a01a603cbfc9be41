//! Packed MS-bit encoding used by DSI / Sequential dumps.
//!
//! SysEx data bytes must stay below `0x80`, so every run of up to seven
//! 8-bit bytes is sent as one carry byte followed by the seven bytes with
//! their top bit cleared. Bit `i` of the carry byte holds the top bit of
//! data byte `i` in the run.
//!
//! ```text
//! raw:     A7..A0  B7..B0  ...  G7..G0
//! escaped: 0 G7 F7 E7 D7 C7 B7 A7   0 A6..A0   0 B6..B0  ...  0 G6..G0
//! ```

use thiserror::Error;

/// Data bytes carried by one carry byte.
pub const GROUP_SIZE: usize = 7;

/// Problems found while unescaping.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnescapeError {
    #[error("byte {byte:#04x} at index {index} is not 7-bit clean")]
    NotSevenBit { index: usize, byte: u8 },

    #[error("stream ends with a carry byte and no data")]
    DanglingCarry,
}

/// Number of bytes `escape` produces for `raw_len` input bytes.
pub fn escaped_len(raw_len: usize) -> usize {
    raw_len + raw_len.div_ceil(GROUP_SIZE)
}

/// Escape 8-bit data into a 7-bit clean byte stream.
pub fn escape(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(escaped_len(raw.len()));
    for group in raw.chunks(GROUP_SIZE) {
        let carry = group
            .iter()
            .enumerate()
            .fold(0u8, |carry, (i, byte)| carry | ((byte >> 7) << i));
        out.push(carry);
        out.extend(group.iter().map(|byte| byte & 0x7f));
    }
    out
}

/// Reverse [`escape`], stopping once `max_length` bytes have been produced.
///
/// Anything after the cap is ignored, so a dump that carries more data than
/// the buffer holds is accepted and truncated.
pub fn unescape(escaped: &[u8], max_length: usize) -> Result<Vec<u8>, UnescapeError> {
    let mut out = Vec::with_capacity(max_length.min(escaped.len()));
    let mut index = 0;

    for group in escaped.chunks(GROUP_SIZE + 1) {
        if out.len() >= max_length {
            break;
        }
        let carry = check_seven_bit(group[0], index)?;
        if group.len() == 1 {
            return Err(UnescapeError::DanglingCarry);
        }
        for (i, &byte) in group[1..].iter().enumerate() {
            if out.len() >= max_length {
                break;
            }
            let low = check_seven_bit(byte, index + 1 + i)?;
            out.push(low | (((carry >> i) & 1) << 7));
        }
        index += group.len();
    }

    Ok(out)
}

fn check_seven_bit(byte: u8, index: usize) -> Result<u8, UnescapeError> {
    if byte & 0x80 != 0 {
        Err(UnescapeError::NotSevenBit { index, byte })
    } else {
        Ok(byte)
    }
}
