//! Device capability interface.
//!
//! A host picks a [`SynthProtocol`] implementation by the model it detected
//! and talks to it only through this trait. The OB-6 is the one model
//! implemented here.

use std::ops::Range;

use crate::builder::{DumpRequest, MessageBuilder};
use crate::catalog::Catalog;
use crate::dump::{Dump, DumpParser};
use crate::error::Result;
use crate::midi::MidiMessage;
use crate::patch::{self, Patch};
use crate::sync::Synchronizer;

/// What a host can do with one synth model.
pub trait SynthProtocol {
    /// Human readable model name.
    fn name(&self) -> &str;

    /// Model byte following the manufacturer id.
    fn model_id(&self) -> u8;

    /// Identify and parse an inbound message. `Ok(None)` if it isn't a dump
    /// this model sends.
    fn classify(&self, message: &[u8]) -> Result<Option<Dump>>;

    fn build_request(&self, request: DumpRequest) -> MidiMessage;

    /// Send `patch` to its place, or to the edit buffer if it has none.
    fn build_dump(&self, patch: &Patch) -> MidiMessage;

    fn settings_catalog(&self) -> &Catalog;

    /// The message whose reply identifies the device.
    fn detect_request(&self) -> MidiMessage {
        self.build_request(DumpRequest::GlobalSettings)
    }

    /// Patch byte ranges to ignore when comparing programs.
    fn blank_out_zones(&self) -> &[Range<usize>];

    fn number_of_banks(&self) -> u16;

    fn patches_per_bank(&self) -> u16;
}

/// Dave Smith Instruments OB-6.
#[derive(Debug, Clone)]
pub struct Ob6 {
    catalog: Catalog,
    parser: DumpParser,
    builder: MessageBuilder,
}

impl Ob6 {
    pub const MODEL_ID: u8 = 0x2e;

    pub fn new() -> Self {
        let catalog = Catalog::ob6();
        let parser = DumpParser::new(Self::MODEL_ID, catalog.dump_size());
        Self {
            catalog,
            parser,
            builder: MessageBuilder::new(Self::MODEL_ID),
        }
    }

    /// Address alternate-tuning messages to `device_id`.
    pub fn with_tuning_device_id(self, device_id: u8) -> Self {
        Self {
            builder: self.builder.with_tuning_device_id(device_id),
            ..self
        }
    }

    pub fn parser(&self) -> &DumpParser {
        &self.parser
    }

    pub fn message_builder(&self) -> &MessageBuilder {
        &self.builder
    }

    pub fn synchronizer(&self) -> Synchronizer<'_> {
        Synchronizer::new(&self.catalog, self.parser, self.builder)
    }
}

impl Default for Ob6 {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthProtocol for Ob6 {
    fn name(&self) -> &str {
        "DSI OB-6"
    }

    fn model_id(&self) -> u8 {
        Self::MODEL_ID
    }

    fn classify(&self, message: &[u8]) -> Result<Option<Dump>> {
        self.parser.classify(message)
    }

    fn build_request(&self, request: DumpRequest) -> MidiMessage {
        self.builder.build_dump_request(request)
    }

    fn build_dump(&self, patch: &Patch) -> MidiMessage {
        match patch.place() {
            Some(place) => self.builder.build_program_dump(patch.data(), place),
            None => self.builder.build_edit_buffer_dump(patch.data()),
        }
    }

    fn settings_catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn blank_out_zones(&self) -> &[Range<usize>] {
        patch::BLANK_OUT_ZONES
    }

    fn number_of_banks(&self) -> u16 {
        patch::NUMBER_OF_BANKS
    }

    fn patches_per_bank(&self) -> u16 {
        patch::PATCHES_PER_BANK
    }
}
