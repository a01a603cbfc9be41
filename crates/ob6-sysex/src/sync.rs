//! Mirrored device state.
//!
//! The synth never acknowledges NRPN or CC writes, so the host keeps a
//! best-effort copy of the few global settings it needs to talk to the
//! device: the channel, MIDI control and local control. That copy is a
//! [`DeviceIdentity`] value. It is set from a global-settings dump received
//! during detection and updated optimistically whenever a command is built.
//!
//! Nothing here holds shared state. Every transition takes the old value
//! and returns the new one; publishing it is up to the host.

use crate::builder::MessageBuilder;
use crate::catalog::{Catalog, GlobalSettings, SettingId, SettingValue};
use crate::channel::MidiChannel;
use crate::dump::{Dump, DumpParser};
use crate::error::{Error, Result};
use crate::midi::MidiMessage;

/// What the host knows about a detected device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub channel: MidiChannel,
    pub local_control: bool,
    pub midi_control: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionState {
    #[default]
    Unidentified,
    Identified(DeviceIdentity),
}

impl DetectionState {
    pub fn identity(&self) -> Option<&DeviceIdentity> {
        match self {
            DetectionState::Identified(identity) => Some(identity),
            DetectionState::Unidentified => None,
        }
    }
}

/// Outcome of feeding one message to the synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub state: DetectionState,
    /// Channel found in this message, `None` if it carried no channel.
    pub channel: Option<MidiChannel>,
}

/// A command's messages and the identity the device will have once it has
/// applied them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub identity: DeviceIdentity,
    pub messages: Vec<MidiMessage>,
}

pub struct Synchronizer<'c> {
    catalog: &'c Catalog,
    parser: DumpParser,
    builder: MessageBuilder,
}

impl<'c> Synchronizer<'c> {
    pub fn new(catalog: &'c Catalog, parser: DumpParser, builder: MessageBuilder) -> Self {
        Self {
            catalog,
            parser,
            builder,
        }
    }

    /// Read the mirrored fields out of a global-settings dump.
    pub fn identity_from(&self, settings: &GlobalSettings) -> Result<DeviceIdentity> {
        let raw_channel = settings.raw(self.catalog, SettingId::MidiChannel)?;
        let channel =
            MidiChannel::from_setting_byte(raw_channel).ok_or_else(|| Error::InvalidSettingValue {
                setting: SettingId::MidiChannel.key().to_string(),
                value: format!("raw {}", raw_channel),
            })?;
        Ok(DeviceIdentity {
            channel,
            local_control: settings.raw(self.catalog, SettingId::LocalControl)? == 1,
            midi_control: settings.raw(self.catalog, SettingId::MidiControl)? == 1,
        })
    }

    /// Advance `state` with an already classified message.
    ///
    /// Only a global-settings dump changes the state. Anything else, or a
    /// dump whose channel byte is out of range, leaves it as it was and
    /// reports no channel.
    pub fn on_dump(&self, state: DetectionState, dump: Option<&Dump>) -> Detection {
        let unchanged = Detection {
            state,
            channel: None,
        };
        let Some(Dump::GlobalSettings(settings)) = dump else {
            return unchanged;
        };
        match self.identity_from(settings) {
            Ok(identity) => {
                log::info!(
                    "Device identified on channel {}, MIDI control {}, local control {}",
                    identity.channel,
                    on_off(identity.midi_control),
                    on_off(identity.local_control)
                );
                Detection {
                    state: DetectionState::Identified(identity),
                    channel: Some(identity.channel),
                }
            }
            Err(e) => {
                log::warn!("Ignoring global settings dump: {}", e);
                unchanged
            }
        }
    }

    /// Classify `message` and advance `state` with it. Malformed dumps are
    /// logged by the parser and leave the state alone.
    pub fn on_sysex(&self, state: DetectionState, message: &[u8]) -> Detection {
        let dump = self.parser.classify(message).ok().flatten();
        self.on_dump(state, dump.as_ref())
    }

    /// Move the device to `channel`. The message goes out on the channel the
    /// device listens on now.
    pub fn change_channel(
        &self,
        identity: &DeviceIdentity,
        channel: MidiChannel,
    ) -> Result<Update> {
        let messages = self.setting_change(
            SettingId::MidiChannel,
            SettingValue::Int(channel.to_setting_byte() as i32),
            identity.channel,
        )?;
        Ok(Update {
            identity: DeviceIdentity {
                channel,
                ..*identity
            },
            messages,
        })
    }

    pub fn set_midi_control(&self, identity: &DeviceIdentity, enabled: bool) -> Result<Update> {
        let messages = self.setting_change(
            SettingId::MidiControl,
            SettingValue::Bool(enabled),
            identity.channel,
        )?;
        Ok(Update {
            identity: DeviceIdentity {
                midi_control: enabled,
                ..*identity
            },
            messages,
        })
    }

    /// Local control is switched with a CC, which the device only obeys
    /// while MIDI control is on.
    pub fn set_local_control(&self, identity: &DeviceIdentity, enabled: bool) -> Result<Update> {
        if !identity.midi_control {
            log::warn!("MIDI control is off, the device will ignore the local control change");
        }
        let messages = self.setting_change(
            SettingId::LocalControl,
            SettingValue::Bool(enabled),
            identity.channel,
        )?;
        Ok(Update {
            identity: DeviceIdentity {
                local_control: enabled,
                ..*identity
            },
            messages,
        })
    }

    fn setting_change(
        &self,
        id: SettingId,
        value: SettingValue,
        channel: MidiChannel,
    ) -> Result<Vec<MidiMessage>> {
        let definition = self.catalog.lookup(id)?;
        self.builder.build_setting_change(definition, &value, channel)
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
