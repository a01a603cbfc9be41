//! OB-6 programs.
//!
//! A patch buffer is opaque to this crate apart from the 20-character name
//! field. The name is stored in the program but never shown on the panel, so
//! it is excluded when comparing two programs for sound.

use std::fmt;
use std::ops::Range;

use crate::buffer::ParameterBuffer;

pub const NUMBER_OF_BANKS: u16 = 10;
pub const PATCHES_PER_BANK: u16 = 100;
pub const NUMBER_OF_PROGRAMS: u16 = NUMBER_OF_BANKS * PATCHES_PER_BANK;

/// Maximum size of an unescaped program.
pub const PATCH_SIZE: usize = 1024;

/// Where the program name lives in a patch buffer.
pub const NAME_ZONE: Range<usize> = 107..127;

/// Byte ranges that don't affect the sound.
pub const BLANK_OUT_ZONES: &[Range<usize>] = &[NAME_ZONE];

/// Name of a freshly initialised program.
pub const DEFAULT_NAME: &str = "Basic Program";

/// A program slot, counted from zero across all banks. Always below
/// [`NUMBER_OF_PROGRAMS`], so bank and program fit in a data byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProgramNumber(u16);

impl ProgramNumber {
    /// `None` unless `place` is a slot the device has.
    pub fn from_zero_based(place: u16) -> Option<Self> {
        (place < NUMBER_OF_PROGRAMS).then_some(Self(place))
    }

    /// `bank * 100 + program`, as carried in a program dump header.
    pub fn from_bank_and_program(bank: u8, program: u8) -> Option<Self> {
        if bank as u16 >= NUMBER_OF_BANKS || program as u16 >= PATCHES_PER_BANK {
            return None;
        }
        Some(Self(bank as u16 * PATCHES_PER_BANK + program as u16))
    }

    /// The slot `offset` places further on, `None` past the last program.
    pub fn offset_by(self, offset: usize) -> Option<Self> {
        let place = u16::try_from(offset).ok()?.checked_add(self.0)?;
        Self::from_zero_based(place)
    }

    pub fn to_zero_based(self) -> u16 {
        self.0
    }

    pub fn bank(self) -> u8 {
        (self.0 / PATCHES_PER_BANK) as u8
    }

    pub fn program_in_bank(self) -> u8 {
        (self.0 % PATCHES_PER_BANK) as u8
    }

    /// Three-digit place as shown on the panel, e.g. `"105"`.
    pub fn friendly_name(self) -> String {
        format!("{:03}", self.0)
    }
}

impl fmt::Display for ProgramNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

/// Range label for a bank, e.g. `"100 - 199"` for bank 1.
pub fn friendly_bank_name(bank: u8) -> String {
    let first = bank as u16 * PATCHES_PER_BANK;
    format!("{:03} - {:03}", first, first + PATCHES_PER_BANK - 1)
}

/// A program buffer and the slot it came from, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    data: ParameterBuffer,
    place: Option<ProgramNumber>,
}

impl Patch {
    pub fn new(data: ParameterBuffer, place: Option<ProgramNumber>) -> Self {
        Self { data, place }
    }

    pub fn data(&self) -> &ParameterBuffer {
        &self.data
    }

    pub fn place(&self) -> Option<ProgramNumber> {
        self.place
    }

    pub fn with_place(self, place: ProgramNumber) -> Self {
        Self {
            place: Some(place),
            ..self
        }
    }

    /// Program name, trailing spaces and NULs removed.
    pub fn name(&self) -> String {
        let end = NAME_ZONE.end.min(self.data.len());
        let start = NAME_ZONE.start.min(end);
        self.data[start..end]
            .iter()
            .map(|&b| if (0x20..0x7f).contains(&b) { b as char } else { ' ' })
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    /// A copy with `name` written to the name field, cut to 20 characters
    /// and padded with spaces.
    pub fn renamed(&self, name: &str) -> Patch {
        let mut field: Vec<u8> = name
            .chars()
            .filter(|c| c.is_ascii() && !c.is_ascii_control())
            .map(|c| c as u8)
            .take(NAME_ZONE.len())
            .collect();
        field.resize(NAME_ZONE.len(), b' ');
        Patch {
            data: self.data.with_bytes_at(NAME_ZONE.start, &field),
            place: self.place,
        }
    }

    pub fn is_default_name(&self) -> bool {
        self.name() == DEFAULT_NAME
    }

    /// The buffer with the name zeroed, for telling whether two programs
    /// sound the same.
    pub fn voice_relevant_data(&self) -> ParameterBuffer {
        self.data.blanked_out(BLANK_OUT_ZONES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch_with(fill: u8) -> Patch {
        Patch::new(ParameterBuffer::new(vec![fill; PATCH_SIZE]), None)
    }

    #[test]
    fn test_program_number_placement() {
        let place = ProgramNumber::from_bank_and_program(1, 5).unwrap();
        assert_eq!(place.to_zero_based(), 105);
        assert_eq!(place.bank(), 1);
        assert_eq!(place.program_in_bank(), 5);
        assert_eq!(place.friendly_name(), "105");
        assert_eq!(ProgramNumber::from_zero_based(7).unwrap().to_string(), "007");
    }

    #[test]
    fn test_program_number_range() {
        let last = ProgramNumber::from_zero_based(999).unwrap();
        assert_eq!((last.bank(), last.program_in_bank()), (9, 99));
        assert_eq!(ProgramNumber::from_zero_based(1000), None);
        assert_eq!(ProgramNumber::from_zero_based(20000), None);
        assert_eq!(ProgramNumber::from_bank_and_program(10, 0), None);
        assert_eq!(ProgramNumber::from_bank_and_program(0, 100), None);
    }

    #[test]
    fn test_offset_by() {
        let first = ProgramNumber::from_zero_based(998).unwrap();
        assert_eq!(first.offset_by(1), ProgramNumber::from_zero_based(999));
        assert_eq!(first.offset_by(2), None);
        assert_eq!(first.offset_by(usize::MAX), None);
    }

    #[test]
    fn test_friendly_bank_name() {
        assert_eq!(friendly_bank_name(0), "000 - 099");
        assert_eq!(friendly_bank_name(9), "900 - 999");
    }

    #[test]
    fn test_name_round_trip() {
        let patch = patch_with(0).renamed("Brass Stab");
        assert_eq!(patch.name(), "Brass Stab");
        assert_eq!(&patch.data()[107..127], b"Brass Stab          ");
        assert_eq!(patch.data()[106], 0);
        assert_eq!(patch.data()[127], 0);
    }

    #[test]
    fn test_long_name_is_cut() {
        let patch = patch_with(0).renamed("A name that is far too long");
        assert_eq!(patch.name(), "A name that is far t");
    }

    #[test]
    fn test_default_name() {
        assert!(patch_with(0).renamed(DEFAULT_NAME).is_default_name());
        assert!(!patch_with(0).renamed("Pad").is_default_name());
    }

    #[test]
    fn test_voice_relevant_data_blanks_name_only() {
        let patch = patch_with(0x33).renamed("Lead");
        let filtered = patch.voice_relevant_data();
        for (i, byte) in filtered.iter().enumerate() {
            if NAME_ZONE.contains(&i) {
                assert_eq!(*byte, 0, "byte {}", i);
            } else {
                assert_eq!(*byte, 0x33, "byte {}", i);
            }
        }
    }

    #[test]
    fn test_name_does_not_change_fingerprint() {
        let a = patch_with(0x10).renamed("One");
        let b = patch_with(0x10).renamed("Two");
        assert_ne!(a, b);
        assert_eq!(a.voice_relevant_data(), b.voice_relevant_data());

        let c = Patch::new(a.data().with_bytes_at(3, &[0x11]), None);
        assert_ne!(a.voice_relevant_data(), c.voice_relevant_data());
    }
}
