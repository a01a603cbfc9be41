//! OB-6 global parameter table.
//!
//! Offsets index the unescaped global parameter dump. NRPN numbers come from
//! the global parameter list in the OB-6 manual; the block skips 1034.

use super::domain::{Domain, RemoteRoute, Settable};
use super::{SettingDefinition, SettingId};

const OFF_CC_NRPN: &[(u8, &str)] = &[(0, "Off"), (1, "CC"), (2, "NRPN")];
const MIDI_USB: &[(u8, &str)] = &[(0, "MIDI"), (1, "USB")];

const MIDI_CLOCK: &[(u8, &str)] = &[
    (0, "Off"),
    (1, "Master"),
    (2, "Slave"),
    (3, "Slave Thru"),
    (4, "Slave No S/S"),
];
const MIDI_OUT: &[(u8, &str)] = &[(0, "MIDI"), (1, "USB"), (2, "MIDI+USB")];
const SEQ_JACK: &[(u8, &str)] = &[
    (0, "Normal"),
    (1, "Tri/Gate"),
    (2, "Gate/Trigger"),
    (3, "Gate"),
];
const POT_MODE: &[(u8, &str)] = &[(0, "Relative"), (1, "Pass Thru"), (2, "Jump")];
const SUSTAIN_POLARITY: &[(u8, &str)] = &[
    (0, "Normal"),
    (1, "Reversed"),
    (2, "Normal Arp Latch"),
    (3, "Reversed Arp Latch"),
];
const STEREO_MONO: &[(u8, &str)] = &[(0, "Stereo"), (1, "Mono")];
const ARP_BEAT_SYNC: &[(u8, &str)] = &[(0, "Off"), (1, "Quantize")];

fn def(
    id: SettingId,
    offset: usize,
    name: &'static str,
    category: &'static str,
    domain: Domain,
    settable: Settable,
    remote: Option<RemoteRoute>,
) -> SettingDefinition {
    SettingDefinition {
        id,
        offset,
        name,
        category,
        domain,
        settable,
        remote,
    }
}

fn nrpn(number: u16) -> Option<RemoteRoute> {
    Some(RemoteRoute::Nrpn(number))
}

/// All OB-6 global settings in dump order.
pub(crate) fn definitions() -> Vec<SettingDefinition> {
    use SettingId::*;

    vec![
        def(
            Transpose,
            0,
            "Transpose",
            "Tuning",
            Domain::Ranged {
                min: 0,
                max: 24,
                default: 12,
                display_offset: -12,
            },
            Settable::All,
            nrpn(1024),
        ),
        def(
            MasterTune,
            1,
            "Master Tune",
            "Tuning",
            Domain::Ranged {
                min: 0,
                max: 100,
                default: 50,
                display_offset: -50,
            },
            Settable::All,
            nrpn(1025),
        ),
        def(
            MidiChannel,
            2,
            "MIDI Channel",
            "MIDI",
            Domain::Ranged {
                min: 0,
                max: 16,
                default: 1,
                display_offset: 0,
            },
            Settable::All,
            nrpn(1026),
        ),
        def(
            MidiClock,
            3,
            "MIDI Clock Mode",
            "MIDI",
            Domain::Enumerated(MIDI_CLOCK),
            Settable::Only(&[0, 1, 2, 3]),
            nrpn(1027),
        ),
        def(
            ClockPort,
            4,
            "MIDI Clock Cable",
            "MIDI",
            Domain::Enumerated(MIDI_USB),
            Settable::All,
            nrpn(1028),
        ),
        def(
            ParamTransmit,
            5,
            "MIDI Param Transmit",
            "MIDI",
            Domain::Enumerated(OFF_CC_NRPN),
            Settable::Only(&[0, 2]),
            nrpn(1029),
        ),
        def(
            ParamReceive,
            6,
            "MIDI Param Receive",
            "MIDI",
            Domain::Enumerated(OFF_CC_NRPN),
            Settable::All,
            nrpn(1030),
        ),
        def(
            MidiControl,
            7,
            "MIDI Control",
            "MIDI",
            Domain::Boolean,
            Settable::All,
            nrpn(1031),
        ),
        def(
            MidiSysex,
            8,
            "MIDI SysEx Cable",
            "MIDI",
            Domain::Enumerated(MIDI_USB),
            Settable::All,
            nrpn(1032),
        ),
        def(
            MidiOut,
            9,
            "MIDI Out",
            "MIDI",
            Domain::Enumerated(MIDI_OUT),
            Settable::Only(&[0, 1]),
            nrpn(1033),
        ),
        // NRPN 1035 is documented for local control but the unit ignores it.
        def(
            LocalControl,
            10,
            "Local Control",
            "MIDI",
            Domain::Boolean,
            Settable::All,
            Some(RemoteRoute::ControlChange(0x7a)),
        ),
        def(
            SeqJack,
            11,
            "Seq Jack",
            "Controls",
            Domain::Enumerated(SEQ_JACK),
            Settable::Only(&[0, 1, 2]),
            nrpn(1036),
        ),
        def(
            PotMode,
            12,
            "Pot Mode",
            "Controls",
            Domain::Enumerated(POT_MODE),
            Settable::Only(&[0, 1]),
            nrpn(1037),
        ),
        def(
            SustainPolarity,
            13,
            "Sustain Polarity",
            "Controls",
            Domain::Enumerated(SUSTAIN_POLARITY),
            Settable::Only(&[0, 1]),
            nrpn(1038),
        ),
        def(
            AltTuning,
            14,
            "Alternative Tuning",
            "Tuning",
            Domain::Ranged {
                min: 0,
                max: 16,
                default: 0,
                display_offset: 0,
            },
            Settable::Only(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]),
            nrpn(1039),
        ),
        def(
            VelocityResponse,
            15,
            "Velocity Response",
            "Controls",
            Domain::Ranged {
                min: 0,
                max: 7,
                default: 0,
                display_offset: 1,
            },
            Settable::Only(&[0, 1, 2, 3]),
            nrpn(1040),
        ),
        def(
            AftertouchResponse,
            16,
            "Aftertouch Response",
            "Controls",
            Domain::Ranged {
                min: 0,
                max: 3,
                default: 0,
                display_offset: 1,
            },
            Settable::Only(&[0, 1, 2]),
            nrpn(1041),
        ),
        def(
            StereoMono,
            17,
            "Stereo/Mono",
            "Audio",
            Domain::Enumerated(STEREO_MONO),
            Settable::Only(&[0]),
            nrpn(1042),
        ),
        // Read from byte 18 but written through the NRPN of byte 19; the
        // firmware stores it one byte off.
        def(
            ArpBeatSync,
            18,
            "Arp Beat Sync",
            "Arpeggiator",
            Domain::Enumerated(ARP_BEAT_SYNC),
            Settable::All,
            nrpn(1044),
        ),
    ]
}
