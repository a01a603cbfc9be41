//! Error types for the ob6-sysex crate.

use thiserror::Error;

use crate::dump::DumpKind;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while classifying dumps or working with the
/// settings catalog.
///
/// Classification misses are expected during probing: a caller that tries
/// several dump kinds in turn should skip them with
/// [`Error::is_classification_miss`] and move on to the next kind. Every
/// other variant is reported to the caller as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The message is not a dump of the kind that was asked for.
    #[error("Message is not a recognized dump")]
    ClassificationMiss,

    /// The message had the right header but the escaped payload is
    /// truncated or contains bytes that cannot appear in 7-bit data.
    #[error("Malformed {kind} payload: {reason}")]
    MalformedPayload { kind: DumpKind, reason: String },

    /// A setting was looked up by a name the catalog doesn't know.
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    /// A value is outside the domain of the setting.
    #[error("Invalid value for setting {setting}: {value}")]
    InvalidSettingValue { setting: String, value: String },

    /// The value is legal for the setting but the hardware ignores it when
    /// sent through remote control.
    #[error("Setting {setting} cannot be set remotely to {value}")]
    UnsettableValue { setting: String, value: String },

    /// An NRPN parameter number or value doesn't fit in 14 bits.
    #[error("NRPN {field} {number} is out of range (0-16383)")]
    NrpnOutOfRange { field: &'static str, number: u16 },

    /// A buffer is too short to hold the requested offset.
    #[error("Buffer too short: need {needed} bytes, have {actual}")]
    BufferTooShort { needed: usize, actual: usize },
}

impl Error {
    /// True if this error only means "not this kind of dump".
    pub fn is_classification_miss(&self) -> bool {
        matches!(self, Error::ClassificationMiss)
    }

    pub(crate) fn malformed(kind: DumpKind, reason: impl Into<String>) -> Self {
        Error::MalformedPayload {
            kind,
            reason: reason.into(),
        }
    }
}
