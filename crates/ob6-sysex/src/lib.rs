//! # ob6-sysex
//!
//! SysEx protocol mapping for the Dave Smith Instruments / Sequential OB-6.
//!
//! The crate turns raw SysEx payloads into typed dumps and builds the
//! messages a host sends back. It does no MIDI I/O: messages in and out are
//! inner SysEx bytes (without `F0`/`F7`) or [`MidiMessage`] values, and the
//! transport is the host's business.
//!
//! ## Modules
//!
//! - [`escape`]: packed MS-bit 8-to-7-bit codec
//! - [`catalog`]: global settings, their offsets, domains and remote routes
//! - [`dump`]: classify and parse program, edit-buffer, global and tuning dumps
//! - [`builder`]: dump requests, dumps, NRPN and CC parameter changes
//! - [`sync`]: device detection and the mirrored channel/control state
//! - [`device`]: the [`SynthProtocol`] capability trait and [`Ob6`]
//!
//! ## Example
//!
//! ```
//! use ob6_sysex::{Ob6, SynthProtocol};
//!
//! let ob6 = Ob6::new();
//! let request = ob6.detect_request();
//! assert_eq!(request.to_bytes(), vec![0xf0, 0x01, 0x2e, 0x0e, 0xf7]);
//!
//! // Not a dump the OB-6 sends
//! assert!(matches!(ob6.classify(&[0x01, 0x2e, 0x44]), Ok(None)));
//! ```

pub mod buffer;
pub mod builder;
pub mod catalog;
pub mod channel;
pub mod device;
pub mod dump;
pub mod error;
pub mod escape;
pub mod midi;
pub mod patch;
pub mod sync;
pub mod tuning;

pub use buffer::ParameterBuffer;
pub use builder::{DumpRequest, MessageBuilder};
pub use catalog::{Catalog, GlobalSettings, SettingDefinition, SettingId, SettingValue};
pub use channel::MidiChannel;
pub use device::{Ob6, SynthProtocol};
pub use dump::{Dump, DumpDescriptor, DumpKind, DumpParser};
pub use error::{Error, Result};
pub use midi::MidiMessage;
pub use patch::{Patch, ProgramNumber};
pub use sync::{DetectionState, Detection, DeviceIdentity, Synchronizer, Update};
pub use tuning::TuningDump;
