use std::fmt;

/// The legal values of a setting, and how a raw byte is shown to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// Raw `1` is on, anything else is off.
    Boolean,
    /// Raw bytes `min..=max`, displayed as `raw + display_offset`.
    Ranged {
        min: u8,
        max: u8,
        default: u8,
        display_offset: i32,
    },
    /// A fixed set of raw bytes, each with a label.
    Enumerated(&'static [(u8, &'static str)]),
}

/// A decoded setting value in display terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Int(i32),
    Choice(&'static str),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(true) => write!(f, "On"),
            SettingValue::Bool(false) => write!(f, "Off"),
            SettingValue::Int(value) => write!(f, "{}", value),
            SettingValue::Choice(label) => write!(f, "{}", label),
        }
    }
}

/// Which raw values the hardware accepts over remote control.
///
/// Some firmware reports values in its global dump that it silently ignores
/// when they arrive as NRPN or CC, so the settable subset is kept apart from
/// the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settable {
    All,
    Only(&'static [u8]),
}

/// How a setting is changed remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteRoute {
    Nrpn(u16),
    ControlChange(u8),
}

impl Domain {
    /// Map a raw byte to its display value. `None` if the byte is outside
    /// the domain.
    pub fn decode(&self, raw: u8) -> Option<SettingValue> {
        match *self {
            Domain::Boolean => Some(SettingValue::Bool(raw == 1)),
            Domain::Ranged {
                min,
                max,
                display_offset,
                ..
            } => (min..=max)
                .contains(&raw)
                .then(|| SettingValue::Int(raw as i32 + display_offset)),
            Domain::Enumerated(choices) => choices
                .iter()
                .find(|(value, _)| *value == raw)
                .map(|(_, label)| SettingValue::Choice(*label)),
        }
    }

    /// Map a display value back to its raw byte. `None` if the value is not
    /// part of the domain.
    pub fn encode(&self, value: &SettingValue) -> Option<u8> {
        match (*self, value) {
            (Domain::Boolean, SettingValue::Bool(on)) => Some(u8::from(*on)),
            (
                Domain::Ranged {
                    min,
                    max,
                    display_offset,
                    ..
                },
                SettingValue::Int(display),
            ) => {
                let raw = display - display_offset;
                (min as i32..=max as i32)
                    .contains(&raw)
                    .then_some(raw as u8)
            }
            (Domain::Enumerated(choices), SettingValue::Choice(label)) => choices
                .iter()
                .find(|(_, name)| name.eq_ignore_ascii_case(label))
                .map(|(raw, _)| *raw),
            _ => None,
        }
    }

    /// Every raw byte the domain covers, in ascending order.
    pub fn raw_values(&self) -> Vec<u8> {
        match *self {
            Domain::Boolean => vec![0, 1],
            Domain::Ranged { min, max, .. } => (min..=max).collect(),
            Domain::Enumerated(choices) => {
                let mut values: Vec<u8> = choices.iter().map(|(raw, _)| *raw).collect();
                values.sort_unstable();
                values
            }
        }
    }

    /// The value a freshly initialised device reports.
    pub fn default_raw(&self) -> u8 {
        match *self {
            Domain::Boolean => 0,
            Domain::Ranged { default, .. } => default,
            Domain::Enumerated(choices) => choices.first().map(|(raw, _)| *raw).unwrap_or(0),
        }
    }

    /// Parse user input such as `on`, `-3` or `slave thru` into a value of
    /// this domain.
    pub fn parse_value(&self, text: &str) -> Option<SettingValue> {
        let text = text.trim();
        match *self {
            Domain::Boolean => match text.to_lowercase().as_str() {
                "on" | "true" | "yes" | "1" => Some(SettingValue::Bool(true)),
                "off" | "false" | "no" | "0" => Some(SettingValue::Bool(false)),
                _ => None,
            },
            Domain::Ranged { .. } => text.parse::<i32>().ok().map(SettingValue::Int),
            Domain::Enumerated(choices) => choices
                .iter()
                .find(|(_, label)| label.eq_ignore_ascii_case(text))
                .map(|(_, label)| SettingValue::Choice(*label)),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Domain::Boolean => write!(f, "Off/On"),
            Domain::Ranged {
                min,
                max,
                display_offset,
                ..
            } => write!(
                f,
                "{}..{}",
                min as i32 + display_offset,
                max as i32 + display_offset
            ),
            Domain::Enumerated(choices) => {
                let labels: Vec<&str> = choices.iter().map(|(_, label)| *label).collect();
                write!(f, "{}", labels.join(" | "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOCK: Domain = Domain::Enumerated(&[(0, "Off"), (1, "Master"), (2, "Slave")]);

    #[test]
    fn test_boolean_is_truth_test_against_one() {
        assert_eq!(Domain::Boolean.decode(1), Some(SettingValue::Bool(true)));
        assert_eq!(Domain::Boolean.decode(0), Some(SettingValue::Bool(false)));
        assert_eq!(Domain::Boolean.decode(2), Some(SettingValue::Bool(false)));
    }

    #[test]
    fn test_ranged_affine_offset() {
        let transpose = Domain::Ranged {
            min: 0,
            max: 24,
            default: 12,
            display_offset: -12,
        };
        assert_eq!(transpose.decode(12), Some(SettingValue::Int(0)));
        assert_eq!(transpose.decode(0), Some(SettingValue::Int(-12)));
        assert_eq!(transpose.decode(25), None);
        assert_eq!(transpose.encode(&SettingValue::Int(-3)), Some(9));
        assert_eq!(transpose.encode(&SettingValue::Int(13)), None);
        assert_eq!(transpose.encode(&SettingValue::Bool(true)), None);
    }

    #[test]
    fn test_enumerated_labels() {
        assert_eq!(CLOCK.decode(2), Some(SettingValue::Choice("Slave")));
        assert_eq!(CLOCK.decode(7), None);
        assert_eq!(CLOCK.encode(&SettingValue::Choice("master")), Some(1));
        assert_eq!(CLOCK.encode(&SettingValue::Choice("Thru")), None);
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(Domain::Boolean.parse_value("On"), Some(SettingValue::Bool(true)));
        assert_eq!(CLOCK.parse_value(" slave "), Some(SettingValue::Choice("Slave")));
        assert_eq!(CLOCK.parse_value("nope"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(CLOCK.to_string(), "Off | Master | Slave");
        assert_eq!(SettingValue::Bool(false).to_string(), "Off");
    }
}
