//! Global settings catalog.
//!
//! A [`Catalog`] is a plain value holding one [`SettingDefinition`] per
//! global parameter, in the order the device lays them out. It is built once
//! by the device implementation and handed out by reference; nothing here is
//! global or lazily initialised.
//!
//! Each definition knows where its byte sits in the global dump, how to turn
//! that byte into a display value and back, and which values the hardware
//! actually accepts over remote control. The last point matters: the unit
//! reports some values in its dump that it ignores when they are sent as
//! NRPN, so [`SettingDefinition::check_settable`] refuses those instead of
//! producing a message that would be dropped.

mod domain;
mod ob6;

pub use domain::{Domain, RemoteRoute, Settable, SettingValue};

use std::fmt;
use std::str::FromStr;

use crate::buffer::ParameterBuffer;
use crate::error::{Error, Result};

/// Stable identifier of a global setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingId {
    Transpose,
    MasterTune,
    MidiChannel,
    MidiClock,
    ClockPort,
    ParamTransmit,
    ParamReceive,
    MidiControl,
    MidiSysex,
    MidiOut,
    LocalControl,
    SeqJack,
    PotMode,
    SustainPolarity,
    AltTuning,
    VelocityResponse,
    AftertouchResponse,
    StereoMono,
    ArpBeatSync,
}

impl SettingId {
    pub const ALL: [SettingId; 19] = [
        SettingId::Transpose,
        SettingId::MasterTune,
        SettingId::MidiChannel,
        SettingId::MidiClock,
        SettingId::ClockPort,
        SettingId::ParamTransmit,
        SettingId::ParamReceive,
        SettingId::MidiControl,
        SettingId::MidiSysex,
        SettingId::MidiOut,
        SettingId::LocalControl,
        SettingId::SeqJack,
        SettingId::PotMode,
        SettingId::SustainPolarity,
        SettingId::AltTuning,
        SettingId::VelocityResponse,
        SettingId::AftertouchResponse,
        SettingId::StereoMono,
        SettingId::ArpBeatSync,
    ];

    /// Kebab-case key used on the command line and in logs.
    pub fn key(&self) -> &'static str {
        match self {
            SettingId::Transpose => "transpose",
            SettingId::MasterTune => "master-tune",
            SettingId::MidiChannel => "midi-channel",
            SettingId::MidiClock => "midi-clock",
            SettingId::ClockPort => "clock-port",
            SettingId::ParamTransmit => "param-transmit",
            SettingId::ParamReceive => "param-receive",
            SettingId::MidiControl => "midi-control",
            SettingId::MidiSysex => "midi-sysex",
            SettingId::MidiOut => "midi-out",
            SettingId::LocalControl => "local-control",
            SettingId::SeqJack => "seq-jack",
            SettingId::PotMode => "pot-mode",
            SettingId::SustainPolarity => "sustain-polarity",
            SettingId::AltTuning => "alt-tuning",
            SettingId::VelocityResponse => "velocity-response",
            SettingId::AftertouchResponse => "aftertouch-response",
            SettingId::StereoMono => "stereo-mono",
            SettingId::ArpBeatSync => "arp-beat-sync",
        }
    }
}

impl fmt::Display for SettingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SettingId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        SettingId::ALL
            .iter()
            .copied()
            .find(|id| id.key() == wanted)
            .ok_or_else(|| Error::UnknownSetting(s.to_string()))
    }
}

/// One named, typed global parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingDefinition {
    pub id: SettingId,
    /// Byte position in the unescaped global dump.
    pub offset: usize,
    pub name: &'static str,
    pub category: &'static str,
    pub domain: Domain,
    pub settable: Settable,
    /// `None` if the setting can only be changed on the panel.
    pub remote: Option<RemoteRoute>,
}

impl SettingDefinition {
    /// The raw byte of this setting in a global dump buffer.
    pub fn raw_value(&self, buffer: &[u8]) -> Result<u8> {
        buffer.get(self.offset).copied().ok_or(Error::BufferTooShort {
            needed: self.offset + 1,
            actual: buffer.len(),
        })
    }

    /// Read and decode this setting from a global dump buffer.
    pub fn decode_value(&self, buffer: &[u8]) -> Result<SettingValue> {
        let raw = self.raw_value(buffer)?;
        self.domain
            .decode(raw)
            .ok_or_else(|| self.invalid(format!("raw {}", raw)))
    }

    /// Turn a display value into the raw byte the device stores.
    ///
    /// Values outside the domain fail with [`Error::InvalidSettingValue`];
    /// nothing is clamped.
    pub fn encode_raw_value(&self, value: &SettingValue) -> Result<u8> {
        self.domain
            .encode(value)
            .ok_or_else(|| self.invalid(value.to_string()))
    }

    /// Raw values the device can report in a dump.
    pub fn reportable_values(&self) -> Vec<u8> {
        self.domain.raw_values()
    }

    /// Raw values the device accepts over remote control.
    pub fn settable_values(&self) -> Vec<u8> {
        if self.remote.is_none() {
            return Vec::new();
        }
        let reportable = self.domain.raw_values();
        match self.settable {
            Settable::All => reportable,
            Settable::Only(allowed) => reportable
                .into_iter()
                .filter(|raw| allowed.contains(raw))
                .collect(),
        }
    }

    pub fn is_settable(&self, raw: u8) -> bool {
        self.settable_values().contains(&raw)
    }

    /// Fail with [`Error::UnsettableValue`] if the device would ignore `raw`
    /// when it arrives over remote control.
    pub fn check_settable(&self, raw: u8) -> Result<()> {
        if self.is_settable(raw) {
            return Ok(());
        }
        let value = self
            .domain
            .decode(raw)
            .map(|value| value.to_string())
            .unwrap_or_else(|| format!("raw {}", raw));
        log::warn!("{} cannot be set remotely to {}", self.name, value);
        Err(Error::UnsettableValue {
            setting: self.id.key().to_string(),
            value,
        })
    }

    fn invalid(&self, value: String) -> Error {
        Error::InvalidSettingValue {
            setting: self.id.key().to_string(),
            value,
        }
    }
}

/// The set of global settings a device exposes.
#[derive(Debug, Clone)]
pub struct Catalog {
    definitions: Vec<SettingDefinition>,
    dump_size: usize,
}

impl Catalog {
    /// Build a catalog from definitions in declaration order.
    ///
    /// Panics if two definitions share an offset or an identifier; catalogs
    /// are static tables and a clash is a programming error.
    pub fn new(definitions: Vec<SettingDefinition>) -> Self {
        for (i, a) in definitions.iter().enumerate() {
            for b in &definitions[i + 1..] {
                assert!(a.offset != b.offset, "{} and {} share offset {}", a.id, b.id, a.offset);
                assert!(a.id != b.id, "{} defined twice", a.id);
            }
        }
        let dump_size = definitions.iter().map(|d| d.offset + 1).max().unwrap_or(0);
        Self {
            definitions,
            dump_size,
        }
    }

    /// The OB-6 global settings.
    pub fn ob6() -> Self {
        Self::new(ob6::definitions())
    }

    pub fn lookup(&self, id: SettingId) -> Result<&SettingDefinition> {
        self.definitions
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| Error::UnknownSetting(id.key().to_string()))
    }

    /// Look a setting up by its key, e.g. `"midi-clock"`.
    pub fn lookup_key(&self, key: &str) -> Result<&SettingDefinition> {
        self.lookup(key.parse()?)
    }

    /// All definitions in declaration order.
    pub fn all_definitions(&self) -> &[SettingDefinition] {
        &self.definitions
    }

    /// Category names in first-seen order.
    pub fn categories(&self) -> Vec<&'static str> {
        let mut categories: Vec<&'static str> = Vec::new();
        for definition in &self.definitions {
            if !categories.contains(&definition.category) {
                categories.push(definition.category);
            }
        }
        categories
    }

    pub fn in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a SettingDefinition> + 'a {
        self.definitions
            .iter()
            .filter(move |d| d.category == category)
    }

    /// Smallest dump that holds every setting.
    pub fn dump_size(&self) -> usize {
        self.dump_size
    }

    /// A buffer with every setting at its default value.
    pub fn default_buffer(&self) -> ParameterBuffer {
        let mut bytes = vec![0u8; self.dump_size];
        for definition in &self.definitions {
            bytes[definition.offset] = definition.domain.default_raw();
        }
        ParameterBuffer::new(bytes)
    }
}

/// A received global-settings dump read through a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalSettings {
    buffer: ParameterBuffer,
}

impl GlobalSettings {
    pub fn new(buffer: ParameterBuffer) -> Self {
        Self { buffer }
    }

    pub fn buffer(&self) -> &ParameterBuffer {
        &self.buffer
    }

    pub fn value(&self, catalog: &Catalog, id: SettingId) -> Result<SettingValue> {
        catalog.lookup(id)?.decode_value(&self.buffer)
    }

    pub fn raw(&self, catalog: &Catalog, id: SettingId) -> Result<u8> {
        catalog.lookup(id)?.raw_value(&self.buffer)
    }

    /// Every setting with its decoded value, in catalog order.
    pub fn values<'c>(
        &'c self,
        catalog: &'c Catalog,
    ) -> impl Iterator<Item = (&'c SettingDefinition, Result<SettingValue>)> + 'c {
        catalog
            .all_definitions()
            .iter()
            .map(move |definition| (definition, definition.decode_value(&self.buffer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ob6_catalog_is_complete() {
        let catalog = Catalog::ob6();
        assert_eq!(catalog.all_definitions().len(), SettingId::ALL.len());
        for id in SettingId::ALL {
            assert_eq!(catalog.lookup(id).unwrap().id, id);
        }
        assert_eq!(catalog.dump_size(), 19);
    }

    #[test]
    fn test_declaration_order_matches_offsets() {
        let catalog = Catalog::ob6();
        let offsets: Vec<usize> = catalog.all_definitions().iter().map(|d| d.offset).collect();
        assert_eq!(offsets, (0..19).collect::<Vec<_>>());
        assert_eq!(
            catalog.categories(),
            vec!["Tuning", "MIDI", "Controls", "Audio", "Arpeggiator"]
        );
    }

    #[test]
    fn test_lookup_by_key() {
        let catalog = Catalog::ob6();
        assert_eq!(catalog.lookup_key("midi-clock").unwrap().offset, 3);
        assert_eq!(catalog.lookup_key("MIDI_CLOCK").unwrap().offset, 3);
        assert!(matches!(
            catalog.lookup_key("volume"),
            Err(Error::UnknownSetting(_))
        ));
    }

    #[test]
    fn test_lookup_missing_from_catalog() {
        let catalog = Catalog::new(vec![*Catalog::ob6().lookup(SettingId::Transpose).unwrap()]);
        assert_eq!(
            catalog.lookup(SettingId::MidiClock),
            Err(Error::UnknownSetting("midi-clock".to_string()))
        );
    }

    #[test]
    fn test_decode_values() {
        let catalog = Catalog::ob6();
        let mut bytes = catalog.default_buffer().to_vec();
        bytes[0] = 14;
        bytes[3] = 4;
        bytes[7] = 1;
        let buffer = ParameterBuffer::new(bytes);

        let transpose = catalog.lookup(SettingId::Transpose).unwrap();
        assert_eq!(transpose.decode_value(&buffer), Ok(SettingValue::Int(2)));

        let clock = catalog.lookup(SettingId::MidiClock).unwrap();
        assert_eq!(clock.decode_value(&buffer), Ok(SettingValue::Choice("Slave No S/S")));

        let control = catalog.lookup(SettingId::MidiControl).unwrap();
        assert_eq!(control.decode_value(&buffer), Ok(SettingValue::Bool(true)));
    }

    #[test]
    fn test_decode_out_of_domain_and_short_buffer() {
        let catalog = Catalog::ob6();
        let clock = catalog.lookup(SettingId::MidiClock).unwrap();
        assert!(matches!(
            clock.decode_value(&[0, 0, 0, 9]),
            Err(Error::InvalidSettingValue { .. })
        ));
        assert_eq!(
            clock.decode_value(&[0, 0]),
            Err(Error::BufferTooShort {
                needed: 4,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_settable_values_round_trip() {
        let catalog = Catalog::ob6();
        for definition in catalog.all_definitions() {
            for raw in definition.settable_values() {
                let mut bytes = vec![0u8; catalog.dump_size()];
                bytes[definition.offset] = raw;
                let value = definition.decode_value(&bytes).unwrap();
                assert_eq!(definition.encode_raw_value(&value), Ok(raw), "{}", definition.name);
            }
        }
    }

    #[test]
    fn test_decoded_values_stay_in_domain() {
        let catalog = Catalog::ob6();
        for definition in catalog.all_definitions() {
            for raw in 0..=127u8 {
                let mut bytes = vec![0u8; catalog.dump_size()];
                bytes[definition.offset] = raw;
                if let Ok(value) = definition.decode_value(&bytes) {
                    assert!(definition.encode_raw_value(&value).is_ok(), "{}", definition.name);
                }
            }
        }
    }

    #[test]
    fn test_reportable_but_not_settable() {
        let catalog = Catalog::ob6();
        let clock = catalog.lookup(SettingId::MidiClock).unwrap();
        assert!(clock.reportable_values().contains(&4));
        assert!(!clock.settable_values().contains(&4));
        assert!(clock.check_settable(3).is_ok());
        assert_eq!(
            clock.check_settable(4),
            Err(Error::UnsettableValue {
                setting: "midi-clock".to_string(),
                value: "Slave No S/S".to_string(),
            })
        );

        let stereo = catalog.lookup(SettingId::StereoMono).unwrap();
        assert_eq!(stereo.settable_values(), vec![0]);
    }

    #[test]
    fn test_encode_rejects_out_of_domain() {
        let catalog = Catalog::ob6();
        let tune = catalog.lookup(SettingId::MasterTune).unwrap();
        assert_eq!(tune.encode_raw_value(&SettingValue::Int(-50)), Ok(0));
        assert_eq!(tune.encode_raw_value(&SettingValue::Int(50)), Ok(100));
        assert!(matches!(
            tune.encode_raw_value(&SettingValue::Int(51)),
            Err(Error::InvalidSettingValue { .. })
        ));
    }

    #[test]
    fn test_global_settings_view() {
        let catalog = Catalog::ob6();
        let settings = GlobalSettings::new(catalog.default_buffer());
        assert_eq!(
            settings.value(&catalog, SettingId::MidiChannel),
            Ok(SettingValue::Int(1))
        );
        let values: Vec<_> = settings.values(&catalog).collect();
        assert_eq!(values.len(), 19);
        assert!(values.iter().all(|(_, value)| value.is_ok()));
        assert_eq!(values[0].0.id, SettingId::Transpose);
        assert_eq!(values[0].1, Ok(SettingValue::Int(0)));
    }
}
