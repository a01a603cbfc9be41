//! Outbound message construction.
//!
//! Everything here only produces bytes. Sending them, and deciding how often
//! to repeat an unacknowledged NRPN block, is up to the transport.

use crate::catalog::{RemoteRoute, SettingDefinition, SettingValue};
use crate::channel::MidiChannel;
use crate::dump::{
    DSI_ID, EDIT_BUFFER_DUMP, EDIT_BUFFER_DUMP_REQUEST, GLOBAL_PARAMETER_DUMP,
    GLOBAL_PARAMETER_DUMP_REQUEST, PROGRAM_DUMP, PROGRAM_DUMP_REQUEST,
};
use crate::error::Result;
use crate::escape::escape;
use crate::midi::{self, MidiMessage};
use crate::patch::ProgramNumber;
use crate::tuning::{self, TuningDump};

/// What to ask the device for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpRequest {
    GlobalSettings,
    EditBuffer,
    Program(ProgramNumber),
    AlternateTuning { slot: u8 },
}

/// Builds messages for one DSI model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageBuilder {
    model_id: u8,
    tuning_device_id: u8,
}

impl MessageBuilder {
    pub fn new(model_id: u8) -> Self {
        Self {
            model_id,
            tuning_device_id: tuning::DEVICE_ID_BROADCAST,
        }
    }

    /// Address MTS messages to a specific device id instead of broadcast.
    pub fn with_tuning_device_id(self, device_id: u8) -> Self {
        Self {
            tuning_device_id: device_id & 0x7f,
            ..self
        }
    }

    fn dsi(&self, message_type: u8) -> Vec<u8> {
        vec![DSI_ID, self.model_id, message_type]
    }

    pub fn build_dump_request(&self, request: DumpRequest) -> MidiMessage {
        let data = match request {
            DumpRequest::GlobalSettings => self.dsi(GLOBAL_PARAMETER_DUMP_REQUEST),
            DumpRequest::EditBuffer => self.dsi(EDIT_BUFFER_DUMP_REQUEST),
            DumpRequest::Program(place) => {
                let mut data = self.dsi(PROGRAM_DUMP_REQUEST);
                data.extend_from_slice(&[place.bank(), place.program_in_bank()]);
                data
            }
            DumpRequest::AlternateTuning { slot } => {
                tuning::dump_request(self.tuning_device_id, slot)
            }
        };
        log::debug!("Built {:?} request", request);
        MidiMessage::SystemExclusive(data)
    }

    /// Send `buffer` to the edit buffer.
    pub fn build_edit_buffer_dump(&self, buffer: &[u8]) -> MidiMessage {
        let mut data = self.dsi(EDIT_BUFFER_DUMP);
        data.extend(escape(buffer));
        MidiMessage::SystemExclusive(data)
    }

    /// Store `buffer` at `place`.
    pub fn build_program_dump(&self, buffer: &[u8], place: ProgramNumber) -> MidiMessage {
        let mut data = self.dsi(PROGRAM_DUMP);
        data.extend_from_slice(&[place.bank(), place.program_in_bank()]);
        data.extend(escape(buffer));
        MidiMessage::SystemExclusive(data)
    }

    /// The message a device sends in reply to a global settings request.
    pub fn build_global_settings_dump(&self, buffer: &[u8]) -> MidiMessage {
        let mut data = self.dsi(GLOBAL_PARAMETER_DUMP);
        data.extend(escape(buffer));
        MidiMessage::SystemExclusive(data)
    }

    pub fn build_tuning_dump(&self, dump: &TuningDump) -> MidiMessage {
        MidiMessage::SystemExclusive(dump.to_sysex(self.tuning_device_id))
    }

    /// NRPN block setting `parameter` to `value`. Both are 14-bit.
    pub fn build_nrpn_sequence(
        &self,
        channel: MidiChannel,
        parameter: u16,
        value: u16,
    ) -> Result<Vec<MidiMessage>> {
        Ok(midi::nrpn(channel.status_channel(), parameter, value)?.to_vec())
    }

    /// Messages that change one global setting.
    ///
    /// The value must be in the setting's domain and in the subset the
    /// hardware accepts remotely; otherwise nothing is built and the error
    /// says why.
    pub fn build_setting_change(
        &self,
        definition: &SettingDefinition,
        value: &SettingValue,
        channel: MidiChannel,
    ) -> Result<Vec<MidiMessage>> {
        let raw = definition.encode_raw_value(value)?;
        definition.check_settable(raw)?;

        let messages = match definition.remote {
            Some(RemoteRoute::Nrpn(number)) => {
                self.build_nrpn_sequence(channel, number, raw as u16)?
            }
            Some(RemoteRoute::ControlChange(controller)) => vec![MidiMessage::control_change(
                channel.status_channel(),
                controller,
                raw,
            )],
            // check_settable already refused settings without a route
            None => Vec::new(),
        };
        log::debug!(
            "{} -> {} ({} messages)",
            definition.name,
            value,
            messages.len()
        );
        Ok(messages)
    }
}
