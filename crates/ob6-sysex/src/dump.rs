//! Dump classification and parsing.
//!
//! Inbound SysEx (inner bytes, no `F0`/`F7`) is matched against the dump
//! kinds a DSI synth sends:
//!
//! | type byte | kind              | header | placement            |
//! |-----------|-------------------|--------|----------------------|
//! | `0x02`    | program dump      | 5      | bank, program        |
//! | `0x03`    | edit-buffer dump  | 3      |                      |
//! | `0x0F`    | global parameters | 3      |                      |
//! | MTS       | alternate tuning  | 5      | tuning program slot  |
//!
//! The DSI header is `01 <model> <type>`. Alternate tunings are MTS bulk
//! dumps and are handed to [`crate::tuning`].
//!
//! A message that isn't of the kind being tried is a
//! [`Error::ClassificationMiss`], which callers skip. A message with the
//! right header but a broken payload is [`Error::MalformedPayload`].

use std::fmt;

use nom::bytes::complete::tag;
use nom::number::complete::be_u8;
use nom::sequence::tuple;
use nom::IResult;

use crate::buffer::ParameterBuffer;
use crate::catalog::GlobalSettings;
use crate::error::{Error, Result};
use crate::escape::unescape;
use crate::patch::{Patch, ProgramNumber, PATCH_SIZE};
use crate::tuning::{self, TuningDump};

/// Manufacturer id of Dave Smith Instruments / Sequential.
pub const DSI_ID: u8 = 0x01;

pub const PROGRAM_DUMP: u8 = 0x02;
pub const EDIT_BUFFER_DUMP: u8 = 0x03;
pub const PROGRAM_DUMP_REQUEST: u8 = 0x05;
pub const EDIT_BUFFER_DUMP_REQUEST: u8 = 0x06;
pub const GLOBAL_PARAMETER_DUMP_REQUEST: u8 = 0x0e;
pub const GLOBAL_PARAMETER_DUMP: u8 = 0x0f;

/// Maximum size of an unescaped global parameter dump.
pub const GLOBAL_SETTINGS_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DumpKind {
    Program,
    EditBuffer,
    GlobalSettings,
    AlternateTuning,
}

impl DumpKind {
    /// Order tried by [`DumpParser::classify`].
    pub const ALL: [DumpKind; 4] = [
        DumpKind::Program,
        DumpKind::EditBuffer,
        DumpKind::GlobalSettings,
        DumpKind::AlternateTuning,
    ];
}

impl fmt::Display for DumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DumpKind::Program => "program dump",
            DumpKind::EditBuffer => "edit buffer dump",
            DumpKind::GlobalSettings => "global settings dump",
            DumpKind::AlternateTuning => "alternate tuning dump",
        };
        f.write_str(name)
    }
}

/// What the header of a message says about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpDescriptor {
    pub kind: DumpKind,
    /// Bytes before the payload.
    pub header_len: usize,
    pub place: Option<ProgramNumber>,
}

/// A parsed dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dump {
    /// A stored program; the patch always has a place.
    Program(Patch),
    EditBuffer(Patch),
    GlobalSettings(GlobalSettings),
    AlternateTuning(TuningDump),
}

impl Dump {
    pub fn kind(&self) -> DumpKind {
        match self {
            Dump::Program(_) => DumpKind::Program,
            Dump::EditBuffer(_) => DumpKind::EditBuffer,
            Dump::GlobalSettings(_) => DumpKind::GlobalSettings,
            Dump::AlternateTuning(_) => DumpKind::AlternateTuning,
        }
    }

    pub fn patch(&self) -> Option<&Patch> {
        match self {
            Dump::Program(patch) | Dump::EditBuffer(patch) => Some(patch),
            _ => None,
        }
    }
}

/// Dump parser for one DSI model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpParser {
    model_id: u8,
    /// Global dumps shorter than this can't hold every setting.
    min_global_size: usize,
}

impl DumpParser {
    pub fn new(model_id: u8, min_global_size: usize) -> Self {
        Self {
            model_id,
            min_global_size,
        }
    }

    pub fn model_id(&self) -> u8 {
        self.model_id
    }

    /// Read the header of `message`.
    pub fn describe(&self, message: &[u8]) -> Result<DumpDescriptor> {
        if tuning::is_bulk_dump(message) {
            return Ok(DumpDescriptor {
                kind: DumpKind::AlternateTuning,
                header_len: 5,
                place: message
                    .get(4)
                    .and_then(|slot| ProgramNumber::from_zero_based(*slot as u16)),
            });
        }

        let (rest, message_type) =
            dsi_header(message, self.model_id).map_err(|_| Error::ClassificationMiss)?;
        match message_type {
            PROGRAM_DUMP => {
                let (_, (bank, program)) = placement(rest).map_err(|_| Error::ClassificationMiss)?;
                let place = ProgramNumber::from_bank_and_program(bank, program).ok_or_else(|| {
                    Error::malformed(
                        DumpKind::Program,
                        format!("no program {} in bank {}", program, bank),
                    )
                })?;
                Ok(DumpDescriptor {
                    kind: DumpKind::Program,
                    header_len: 5,
                    place: Some(place),
                })
            }
            EDIT_BUFFER_DUMP => Ok(DumpDescriptor {
                kind: DumpKind::EditBuffer,
                header_len: 3,
                place: None,
            }),
            GLOBAL_PARAMETER_DUMP => Ok(DumpDescriptor {
                kind: DumpKind::GlobalSettings,
                header_len: 3,
                place: None,
            }),
            _ => Err(Error::ClassificationMiss),
        }
    }

    /// Parse `message` as a dump of `kind`.
    pub fn parse_as(&self, kind: DumpKind, message: &[u8]) -> Result<Dump> {
        let cap = match kind {
            DumpKind::AlternateTuning => {
                return TuningDump::parse(message).map(Dump::AlternateTuning)
            }
            DumpKind::Program | DumpKind::EditBuffer => PATCH_SIZE,
            DumpKind::GlobalSettings => GLOBAL_SETTINGS_SIZE,
        };

        let descriptor = self.describe(message)?;
        if descriptor.kind != kind {
            return Err(Error::ClassificationMiss);
        }
        let data = unescape_payload(kind, &message[descriptor.header_len..], cap)?;

        match kind {
            DumpKind::Program => Ok(Dump::Program(Patch::new(data, descriptor.place))),
            DumpKind::EditBuffer => Ok(Dump::EditBuffer(Patch::new(data, None))),
            _ => {
                if data.len() < self.min_global_size {
                    return Err(Error::malformed(
                        kind,
                        format!("{} bytes, need at least {}", data.len(), self.min_global_size),
                    ));
                }
                Ok(Dump::GlobalSettings(GlobalSettings::new(data)))
            }
        }
    }

    pub fn parse_program_dump(&self, message: &[u8]) -> Result<Patch> {
        match self.parse_as(DumpKind::Program, message)? {
            Dump::Program(patch) => Ok(patch),
            _ => Err(Error::ClassificationMiss),
        }
    }

    pub fn parse_edit_buffer_dump(&self, message: &[u8]) -> Result<Patch> {
        match self.parse_as(DumpKind::EditBuffer, message)? {
            Dump::EditBuffer(patch) => Ok(patch),
            _ => Err(Error::ClassificationMiss),
        }
    }

    pub fn parse_global_settings_dump(&self, message: &[u8]) -> Result<GlobalSettings> {
        match self.parse_as(DumpKind::GlobalSettings, message)? {
            Dump::GlobalSettings(settings) => Ok(settings),
            _ => Err(Error::ClassificationMiss),
        }
    }

    /// Try every dump kind in turn and return the first match.
    ///
    /// `Ok(None)` means no kind matched. Malformed payloads are returned as
    /// errors so the caller can report them; they never panic.
    pub fn classify(&self, message: &[u8]) -> Result<Option<Dump>> {
        for kind in DumpKind::ALL {
            match self.parse_as(kind, message) {
                Ok(dump) => {
                    log::debug!("Classified {} byte message as {}", message.len(), kind);
                    return Ok(Some(dump));
                }
                Err(e) if e.is_classification_miss() => continue,
                Err(e) => {
                    log::warn!("Discarding {}", e);
                    return Err(e);
                }
            }
        }
        log::trace!("Unrecognized message: {:02x?}", message);
        Ok(None)
    }
}

fn dsi_header(input: &[u8], model_id: u8) -> IResult<&[u8], u8> {
    let (input, _) = tag(&[DSI_ID, model_id][..])(input)?;
    be_u8(input)
}

fn placement(input: &[u8]) -> IResult<&[u8], (u8, u8)> {
    tuple((be_u8, be_u8))(input)
}

fn unescape_payload(kind: DumpKind, payload: &[u8], cap: usize) -> Result<ParameterBuffer> {
    if payload.is_empty() {
        return Err(Error::malformed(kind, "empty payload"));
    }
    unescape(payload, cap)
        .map(ParameterBuffer::new)
        .map_err(|e| Error::malformed(kind, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::escape;

    const OB6: u8 = 0x2e;

    fn parser() -> DumpParser {
        DumpParser::new(OB6, 19)
    }

    fn message(header: &[u8], raw: &[u8]) -> Vec<u8> {
        let mut bytes = header.to_vec();
        bytes.extend(escape(raw));
        bytes
    }

    fn patch_bytes() -> Vec<u8> {
        (0..PATCH_SIZE).map(|i| (i * 7) as u8).collect()
    }

    #[test]
    fn test_program_dump_placement() {
        let raw = patch_bytes();
        let msg = message(&[DSI_ID, OB6, PROGRAM_DUMP, 1, 5], &raw);

        let descriptor = parser().describe(&msg).unwrap();
        assert_eq!(descriptor.kind, DumpKind::Program);
        assert_eq!(descriptor.header_len, 5);

        let patch = parser().parse_program_dump(&msg).unwrap();
        assert_eq!(patch.place(), ProgramNumber::from_zero_based(105));
        assert_eq!(patch.data().as_slice(), raw.as_slice());
    }

    #[test]
    fn test_edit_buffer_dump() {
        let raw = patch_bytes();
        let msg = message(&[DSI_ID, OB6, EDIT_BUFFER_DUMP], &raw);
        let patch = parser().parse_edit_buffer_dump(&msg).unwrap();
        assert_eq!(patch.place(), None);
        assert_eq!(patch.data().len(), PATCH_SIZE);
        assert_eq!(patch.data()[1000], raw[1000]);
    }

    #[test]
    fn test_patch_is_capped() {
        let raw: Vec<u8> = (0..PATCH_SIZE + 50).map(|i| i as u8).collect();
        let msg = message(&[DSI_ID, OB6, EDIT_BUFFER_DUMP], &raw);
        let patch = parser().parse_edit_buffer_dump(&msg).unwrap();
        assert_eq!(patch.data().len(), PATCH_SIZE);
    }

    #[test]
    fn test_global_settings_dump() {
        let mut raw = vec![0u8; 32];
        raw[2] = 4;
        let msg = message(&[DSI_ID, OB6, GLOBAL_PARAMETER_DUMP], &raw);
        match parser().classify(&msg).unwrap() {
            Some(Dump::GlobalSettings(settings)) => assert_eq!(settings.buffer()[2], 4),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_global_settings_too_short() {
        let msg = message(&[DSI_ID, OB6, GLOBAL_PARAMETER_DUMP], &[0u8; 5]);
        assert!(matches!(
            parser().parse_global_settings_dump(&msg),
            Err(Error::MalformedPayload {
                kind: DumpKind::GlobalSettings,
                ..
            })
        ));
    }

    #[test]
    fn test_kind_mismatch_is_a_miss() {
        let msg = message(&[DSI_ID, OB6, EDIT_BUFFER_DUMP], &patch_bytes());
        assert_eq!(parser().parse_program_dump(&msg), Err(Error::ClassificationMiss));
        assert_eq!(
            parser().parse_global_settings_dump(&msg),
            Err(Error::ClassificationMiss)
        );
    }

    #[test]
    fn test_unknown_type_or_prefix_is_no_match() {
        let p = parser();
        for msg in [
            vec![DSI_ID, OB6, 0x04, 0x00, 0x00],
            vec![DSI_ID, OB6, 0x7f],
            vec![DSI_ID, 0x2f, PROGRAM_DUMP, 0, 0, 0, 1],
            vec![0x42, OB6, GLOBAL_PARAMETER_DUMP, 0],
            vec![DSI_ID, OB6],
            vec![DSI_ID],
            vec![],
        ] {
            assert_eq!(p.classify(&msg), Ok(None), "{:02x?}", msg);
            for kind in DumpKind::ALL {
                assert_eq!(p.parse_as(kind, &msg), Err(Error::ClassificationMiss));
            }
        }
    }

    #[test]
    fn test_truncated_program_header() {
        let msg = vec![DSI_ID, OB6, PROGRAM_DUMP, 1];
        assert_eq!(parser().classify(&msg), Ok(None));
    }

    #[test]
    fn test_malformed_payloads() {
        let p = parser();

        let empty = vec![DSI_ID, OB6, EDIT_BUFFER_DUMP];
        assert!(matches!(p.classify(&empty), Err(Error::MalformedPayload { .. })));

        let mut dangling = message(&[DSI_ID, OB6, EDIT_BUFFER_DUMP], &[1, 2, 3, 4, 5, 6, 7]);
        dangling.push(0x00);
        assert!(matches!(p.classify(&dangling), Err(Error::MalformedPayload { .. })));

        let mut high_bit = message(&[DSI_ID, OB6, PROGRAM_DUMP, 0, 0], &[1, 2, 3]);
        high_bit[6] = 0x85;
        assert!(matches!(p.classify(&high_bit), Err(Error::MalformedPayload { .. })));

        let bad_place = message(&[DSI_ID, OB6, PROGRAM_DUMP, 12, 0], &[1, 2, 3]);
        assert!(matches!(p.classify(&bad_place), Err(Error::MalformedPayload { .. })));
    }

    #[test]
    fn test_alternate_tuning_is_delegated() {
        let dump = TuningDump::equal_tempered(4, "Just");
        let msg = dump.to_sysex(0x7f);

        let descriptor = parser().describe(&msg).unwrap();
        assert_eq!(descriptor.kind, DumpKind::AlternateTuning);
        assert_eq!(descriptor.place, ProgramNumber::from_zero_based(4));

        assert_eq!(parser().classify(&msg), Ok(Some(Dump::AlternateTuning(dump))));
    }

    #[test]
    fn test_broken_tuning_is_no_match() {
        let mut msg = TuningDump::equal_tempered(4, "Just").to_sysex(0x7f);
        msg[30] ^= 0x01;
        assert_eq!(parser().classify(&msg), Ok(None));
    }

    #[test]
    fn test_fuzzed_messages_never_panic() {
        let mut seed = 0x1234_5678u32;
        for len in 0..200usize {
            let msg: Vec<u8> = (0..len)
                .map(|i| {
                    seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                    match i {
                        0 => DSI_ID,
                        1 => OB6,
                        2 => [PROGRAM_DUMP, EDIT_BUFFER_DUMP, GLOBAL_PARAMETER_DUMP][len % 3],
                        _ => (seed >> 16) as u8,
                    }
                })
                .collect();
            let _ = parser().classify(&msg);
        }
    }
}
