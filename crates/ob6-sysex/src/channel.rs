use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A one-based MIDI channel, 1..=16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelNumber(u8);

impl ChannelNumber {
    pub fn new(channel: u8) -> Option<Self> {
        (1..=16).contains(&channel).then_some(Self(channel))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ChannelNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The channel a device listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MidiChannel {
    Omni,
    Channel(ChannelNumber),
}

impl MidiChannel {
    /// `None` unless `channel` is in 1..=16.
    pub fn from_one_based(channel: u8) -> Option<Self> {
        ChannelNumber::new(channel).map(MidiChannel::Channel)
    }

    /// Decode the channel byte of a global dump: 0 is omni, 1..=16 a channel.
    pub fn from_setting_byte(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(MidiChannel::Omni),
            n => Self::from_one_based(n),
        }
    }

    /// The value the device stores and expects over NRPN: 0 for omni.
    pub fn to_setting_byte(self) -> u8 {
        match self {
            MidiChannel::Omni => 0,
            MidiChannel::Channel(n) => n.get(),
        }
    }

    /// Zero-based channel to put in a status byte. Omni devices listen
    /// everywhere, so channel 1 reaches them.
    pub fn status_channel(self) -> u8 {
        match self {
            MidiChannel::Omni => 0,
            MidiChannel::Channel(n) => n.get() - 1,
        }
    }
}

impl fmt::Display for MidiChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiChannel::Omni => write!(f, "Omni"),
            MidiChannel::Channel(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for MidiChannel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("omni") {
            return Ok(MidiChannel::Omni);
        }
        s.parse::<u8>()
            .ok()
            .and_then(MidiChannel::from_one_based)
            .ok_or_else(|| Error::InvalidSettingValue {
                setting: "midi-channel".to_string(),
                value: s.to_string(),
            })
    }
}
