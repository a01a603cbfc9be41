//! MIDI Tuning Standard bulk dumps.
//!
//! The OB-6 stores its alternative tunings as MTS bulk tuning dumps
//! (non-realtime universal SysEx, sub-ids `08 01`). They don't carry the
//! DSI header, so they are parsed here instead of in [`crate::dump`].
//!
//! ```text
//! 7E <device> 08 01 <program> <name: 16 bytes> 128 x (xx yy zz) <checksum>
//! ```
//!
//! `xx` is the semitone, `yy zz` a 14-bit fraction of a semitone. The
//! checksum is the XOR of every byte from `7E` through the last `zz`, masked
//! to 7 bits.

use nom::bytes::complete::{tag, take};
use nom::combinator::{all_consuming, verify};
use nom::multi::count;
use nom::number::complete::be_u8;
use nom::sequence::tuple;
use nom::IResult;

use crate::error::{Error, Result};

pub const UNIVERSAL_NON_REALTIME: u8 = 0x7e;
pub const MIDI_TUNING_STANDARD: u8 = 0x08;
pub const BULK_DUMP_REQUEST: u8 = 0x00;
pub const BULK_DUMP_REPLY: u8 = 0x01;
/// Addresses every device.
pub const DEVICE_ID_BROADCAST: u8 = 0x7f;

pub const NAME_LENGTH: usize = 16;
pub const KEY_COUNT: usize = 128;
/// Inner length of a bulk dump, without `F0`/`F7`.
pub const DUMP_LENGTH: usize = 5 + NAME_LENGTH + 3 * KEY_COUNT + 1;

/// `xx yy zz = 7F 7F 7F` leaves a key untouched.
const NO_CHANGE: (u8, u8, u8) = (0x7f, 0x7f, 0x7f);

/// The tuning of one MIDI key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTuning {
    /// Base semitone (MIDI note number).
    pub semitone: u8,
    /// Fraction above `semitone`, in 1/16384 semitone steps.
    pub fraction: u16,
}

impl KeyTuning {
    pub fn equal_tempered(key: u8) -> Self {
        Self { semitone: key, fraction: 0 }
    }

    /// `None` for the MTS "no change" marker.
    pub fn from_bytes(xx: u8, yy: u8, zz: u8) -> Option<Self> {
        if (xx, yy, zz) == NO_CHANGE {
            return None;
        }
        Some(Self {
            semitone: xx,
            fraction: ((yy as u16) << 7) | zz as u16,
        })
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [
            self.semitone & 0x7f,
            ((self.fraction >> 7) & 0x7f) as u8,
            (self.fraction & 0x7f) as u8,
        ]
    }

    /// Pitch in cents above MIDI note 0.
    pub fn cents(&self) -> f64 {
        self.semitone as f64 * 100.0 + self.fraction as f64 * 100.0 / 16384.0
    }
}

/// A parsed alternative tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuningDump {
    /// Tuning program slot.
    pub program: u8,
    pub name: String,
    /// One entry per MIDI key; `None` keeps the key's current tuning.
    pub keys: Vec<Option<KeyTuning>>,
}

impl TuningDump {
    /// Twelve-tone equal temperament.
    pub fn equal_tempered(program: u8, name: &str) -> Self {
        Self {
            program,
            name: name.to_string(),
            keys: (0..KEY_COUNT as u8).map(|key| Some(KeyTuning::equal_tempered(key))).collect(),
        }
    }

    /// Parse the inner bytes of an MTS bulk dump.
    ///
    /// Anything that isn't a well-formed dump with a valid checksum is a
    /// [`Error::ClassificationMiss`].
    pub fn parse(message: &[u8]) -> Result<Self> {
        let (_, (program, name, keys, checksum)) =
            all_consuming(bulk_dump)(message).map_err(|_| Error::ClassificationMiss)?;

        let expected = checksum_of(&message[..message.len() - 1]);
        if checksum != expected {
            log::debug!(
                "Tuning dump checksum mismatch: got {:#04x}, expected {:#04x}",
                checksum,
                expected
            );
            return Err(Error::ClassificationMiss);
        }

        Ok(Self {
            program,
            name: decode_name(name),
            keys: keys
                .into_iter()
                .map(|(xx, yy, zz)| KeyTuning::from_bytes(xx, yy, zz))
                .collect(),
        })
    }

    /// Inner bytes of a bulk dump for `device_id`.
    pub fn to_sysex(&self, device_id: u8) -> Vec<u8> {
        let mut data = Vec::with_capacity(DUMP_LENGTH);
        data.extend_from_slice(&[
            UNIVERSAL_NON_REALTIME,
            device_id & 0x7f,
            MIDI_TUNING_STANDARD,
            BULK_DUMP_REPLY,
            self.program & 0x7f,
        ]);
        data.extend(encode_name(&self.name));
        for key in 0..KEY_COUNT {
            match self.keys.get(key).copied().flatten() {
                Some(tuning) => data.extend_from_slice(&tuning.to_bytes()),
                None => data.extend_from_slice(&[NO_CHANGE.0, NO_CHANGE.1, NO_CHANGE.2]),
            }
        }
        data.push(checksum_of(&data));
        data
    }
}

/// Inner bytes of a bulk dump request for `program`.
pub fn dump_request(device_id: u8, program: u8) -> Vec<u8> {
    vec![
        UNIVERSAL_NON_REALTIME,
        device_id & 0x7f,
        MIDI_TUNING_STANDARD,
        BULK_DUMP_REQUEST,
        program & 0x7f,
    ]
}

/// True if `message` starts like an MTS bulk dump, whatever its body.
pub fn is_bulk_dump(message: &[u8]) -> bool {
    message.len() >= 4
        && message[0] == UNIVERSAL_NON_REALTIME
        && message[2] == MIDI_TUNING_STANDARD
        && message[3] == BULK_DUMP_REPLY
}

type KeyBytes = (u8, u8, u8);

fn seven_bit(input: &[u8]) -> IResult<&[u8], u8> {
    verify(be_u8, |b: &u8| *b < 0x80)(input)
}

fn bulk_dump(input: &[u8]) -> IResult<&[u8], (u8, &[u8], Vec<KeyBytes>, u8)> {
    let (input, _) = tag(&[UNIVERSAL_NON_REALTIME][..])(input)?;
    let (input, _device_id) = seven_bit(input)?;
    let (input, _) = tag(&[MIDI_TUNING_STANDARD, BULK_DUMP_REPLY][..])(input)?;
    let (input, program) = seven_bit(input)?;
    let (input, name) = take(NAME_LENGTH)(input)?;
    let (input, keys) = count(tuple((seven_bit, seven_bit, seven_bit)), KEY_COUNT)(input)?;
    let (input, checksum) = seven_bit(input)?;
    Ok((input, (program, name, keys, checksum)))
}

fn checksum_of(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |sum, b| sum ^ b) & 0x7f
}

fn decode_name(raw: &[u8]) -> String {
    raw.iter()
        .map(|&b| if (0x20..0x7f).contains(&b) { b as char } else { ' ' })
        .collect::<String>()
        .trim_end()
        .to_string()
}

fn encode_name(name: &str) -> Vec<u8> {
    let mut bytes: Vec<u8> = name
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c as u8 } else { b'?' })
        .take(NAME_LENGTH)
        .collect();
    bytes.resize(NAME_LENGTH, b' ');
    bytes
}
