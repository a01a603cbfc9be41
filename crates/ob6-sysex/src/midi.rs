//! MIDI messages produced and consumed by the protocol layer.
//!
//! SysEx messages are held as their inner bytes, without the `F0`/`F7`
//! framing. The transport adds and strips the framing; [`MidiMessage::to_bytes`]
//! and [`split_sysex_stream`] do the same for `.syx` files.

use crate::error::{Error, Result};

/// Start of system exclusive.
pub const SOX: u8 = 0xf0;
/// End of system exclusive.
pub const EOX: u8 = 0xf7;

/// NRPN parameter number MSB controller.
pub const CC_NRPN_MSB: u8 = 99;
/// NRPN parameter number LSB controller.
pub const CC_NRPN_LSB: u8 = 98;
/// Data entry MSB controller.
pub const CC_DATA_ENTRY_MSB: u8 = 6;
/// Data entry LSB controller.
pub const CC_DATA_ENTRY_LSB: u8 = 38;

const MAX_FOURTEEN_BIT: u16 = 0x3fff;

/// An outbound or inbound MIDI message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiMessage {
    /// Control change: channel (0-15), controller, value
    ControlChange {
        channel: u8,
        controller: u8,
        value: u8,
    },
    /// SysEx inner bytes, without `F0`/`F7`
    SystemExclusive(Vec<u8>),
}

impl MidiMessage {
    pub fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        MidiMessage::ControlChange {
            channel: channel & 0x0f,
            controller: controller & 0x7f,
            value: value & 0x7f,
        }
    }

    /// Convert to wire bytes, adding SysEx framing.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            MidiMessage::ControlChange {
                channel,
                controller,
                value,
            } => {
                vec![0xb0 | (channel & 0x0f), *controller & 0x7f, *value & 0x7f]
            }
            MidiMessage::SystemExclusive(data) => {
                let mut bytes = Vec::with_capacity(data.len() + 2);
                bytes.push(SOX);
                bytes.extend_from_slice(data);
                bytes.push(EOX);
                bytes
            }
        }
    }

    /// Parse wire bytes. SysEx framing is stripped; a missing `F7` is
    /// tolerated.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&status, rest) = bytes.split_first()?;
        match status {
            SOX => {
                let inner = rest.strip_suffix(&[EOX]).unwrap_or(rest);
                Some(MidiMessage::SystemExclusive(inner.to_vec()))
            }
            s if s & 0xf0 == 0xb0 && rest.len() >= 2 => Some(MidiMessage::ControlChange {
                channel: s & 0x0f,
                controller: rest[0],
                value: rest[1],
            }),
            _ => None,
        }
    }

    /// Inner bytes of a SysEx message.
    pub fn sysex_data(&self) -> Option<&[u8]> {
        match self {
            MidiMessage::SystemExclusive(data) => Some(data),
            _ => None,
        }
    }
}

/// The four control changes that set NRPN `parameter` to `value` on
/// `channel` (0-15): parameter MSB (99), parameter LSB (98), data entry MSB
/// (6), data entry LSB (38). Both numbers are 14-bit.
///
/// There is no acknowledgement; the caller sends the block as a unit.
/// Numbers above 14 bits fail with [`Error::NrpnOutOfRange`].
pub fn nrpn(channel: u8, parameter: u16, value: u16) -> Result<[MidiMessage; 4]> {
    let parameter = fourteen_bit("parameter", parameter)?;
    let value = fourteen_bit("value", value)?;
    Ok([
        MidiMessage::control_change(channel, CC_NRPN_MSB, parameter.0),
        MidiMessage::control_change(channel, CC_NRPN_LSB, parameter.1),
        MidiMessage::control_change(channel, CC_DATA_ENTRY_MSB, value.0),
        MidiMessage::control_change(channel, CC_DATA_ENTRY_LSB, value.1),
    ])
}

/// Split into (MSB, LSB) 7-bit halves.
fn fourteen_bit(field: &'static str, number: u16) -> Result<(u8, u8)> {
    if number > MAX_FOURTEEN_BIT {
        return Err(Error::NrpnOutOfRange { field, number });
    }
    Ok(((number >> 7) as u8, (number & 0x7f) as u8))
}

/// Cut a byte stream (e.g. a `.syx` file) into SysEx inner payloads.
///
/// Bytes outside `F0 .. F7` are skipped, including realtime clock bytes. A
/// message cut off by a new `F0` is dropped.
pub fn split_sysex_stream(stream: &[u8]) -> Vec<Vec<u8>> {
    let mut messages = Vec::new();
    let mut current: Option<Vec<u8>> = None;

    for &byte in stream {
        match byte {
            SOX => {
                if current.is_some() {
                    log::warn!("SysEx message interrupted by a new F0, dropping it");
                }
                current = Some(Vec::new());
            }
            EOX => {
                if let Some(message) = current.take() {
                    messages.push(message);
                }
            }
            b if b >= 0xf8 => {}
            b => {
                if let Some(message) = current.as_mut() {
                    message.push(b);
                }
            }
        }
    }

    if current.is_some() {
        log::warn!("SysEx stream ends inside a message, dropping it");
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midi_message_bytes() {
        let cc = MidiMessage::control_change(2, 0x7a, 1);
        assert_eq!(cc.to_bytes(), vec![0xb2, 0x7a, 1]);

        let sysex = MidiMessage::SystemExclusive(vec![0x01, 0x2e, 0x0e]);
        assert_eq!(sysex.to_bytes(), vec![0xf0, 0x01, 0x2e, 0x0e, 0xf7]);
    }

    #[test]
    fn test_from_bytes() {
        assert_eq!(
            MidiMessage::from_bytes(&[0xf0, 0x01, 0x2e, 0xf7]),
            Some(MidiMessage::SystemExclusive(vec![0x01, 0x2e]))
        );
        assert_eq!(
            MidiMessage::from_bytes(&[0xb3, 99, 8]),
            Some(MidiMessage::ControlChange {
                channel: 3,
                controller: 99,
                value: 8,
            })
        );
        assert_eq!(MidiMessage::from_bytes(&[0x90, 60, 100]), None);
        assert_eq!(MidiMessage::from_bytes(&[]), None);
    }

    #[test]
    fn test_nrpn_framing() {
        let messages = nrpn(0, 1026, 5).unwrap();
        let bytes: Vec<Vec<u8>> = messages.iter().map(|m| m.to_bytes()).collect();
        assert_eq!(
            bytes,
            vec![
                vec![0xb0, 99, 8],
                vec![0xb0, 98, 2],
                vec![0xb0, 6, 0],
                vec![0xb0, 38, 5],
            ]
        );
    }

    #[test]
    fn test_nrpn_full_range() {
        let messages = nrpn(15, 0x3fff, 0x3fff).unwrap();
        assert!(messages.iter().all(|m| m.to_bytes()[2] == 0x7f));
        assert_eq!(messages[0].to_bytes()[0], 0xbf);
    }

    #[test]
    fn test_nrpn_rejects_numbers_past_fourteen_bits() {
        assert_eq!(
            nrpn(0, 16384, 5),
            Err(Error::NrpnOutOfRange {
                field: "parameter",
                number: 16384
            })
        );
        assert_eq!(
            nrpn(0, 1026, 0x4000),
            Err(Error::NrpnOutOfRange {
                field: "value",
                number: 0x4000
            })
        );
    }

    #[test]
    fn test_split_sysex_stream() {
        let stream = [
            0xf0, 0x01, 0x2e, 0x0e, 0xf7, 0xf8, 0x00, 0xf0, 0x7e, 0xf8, 0x7f, 0xf7, 0xf0, 0x01,
        ];
        assert_eq!(
            split_sysex_stream(&stream),
            vec![vec![0x01, 0x2e, 0x0e], vec![0x7e, 0x7f]]
        );
    }
}
