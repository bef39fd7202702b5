//! Wire addressing for the Twister.
//!
//! Every control on the device is a Control Change address: a channel and a CC
//! number. The CC number carries the bank and slot, the channel carries the kind
//! of control. This module is the only place that knows the numbering scheme.

use midly::MidiMessage;
use midly::live::LiveEvent;

/// Twister MIDI channels. Zero indexed.
pub struct MidiChannel;

impl MidiChannel {
    pub const ENCODER: u8 = 0;
    pub const BUTTON: u8 = 1;
    pub const RGB_ANIMATION: u8 = 2;
    pub const SIDE_BUTTON: u8 = 3;
    pub const SYSTEM: u8 = 3;
    pub const SHIFT: u8 = 4;
    pub const RING_ANIMATION: u8 = 5;
    pub const SEQUENCER: u8 = 7;
}

pub const NUM_BANKS: usize = 4;
pub const NUM_KNOBS: usize = 16;
pub const NUM_LEFT_SIDE_BUTTONS: usize = 3;
pub const NUM_RIGHT_SIDE_BUTTONS: usize = 3;
pub const NUM_SIDE_BUTTONS: usize = NUM_LEFT_SIDE_BUTTONS + NUM_RIGHT_SIDE_BUTTONS;

const CONTROL_CHANGE: u8 = 0xB0;
const SIDE_BUTTONS_FIRST_LEFT_CC: u8 = 8;
const SIDE_BUTTONS_FIRST_RIGHT_CC: u8 = SIDE_BUTTONS_FIRST_LEFT_CC + NUM_LEFT_SIDE_BUTTONS as u8;

pub const PRESSED_VALUE: u8 = 127;
pub const RELEASED_VALUE: u8 = 0;

/// A single Control Change address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MidiInfo {
    pub channel: u8,
    pub cc: u8,
}

impl MidiInfo {
    pub const fn new(channel: u8, cc: u8) -> Self {
        Self { channel, cc }
    }

    pub const fn status_byte(&self) -> u8 {
        CONTROL_CHANGE | self.channel
    }

    /// Builds the three wire bytes for `value` on this address.
    pub fn message(&self, value: u8) -> CcMessage {
        CcMessage {
            status: self.status_byte(),
            data1: self.cc,
            data2: value.min(127),
        }
    }
}

/// The two addresses a light listens on: its value and its animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightMidiInfo {
    pub light: MidiInfo,
    pub animation: MidiInfo,
}

impl LightMidiInfo {
    pub const fn new(channel: u8, animation_channel: u8, cc: u8) -> Self {
        Self {
            light: MidiInfo::new(channel, cc),
            animation: MidiInfo::new(animation_channel, cc),
        }
    }
}

/// All the addresses belonging to one knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnobMidiInfo {
    pub encoder: MidiInfo,
    pub shift_encoder: MidiInfo,
    pub button: MidiInfo,
    pub rgb_light: LightMidiInfo,
    pub ring_light: LightMidiInfo,
    pub shift_ring_light: LightMidiInfo,
}

impl KnobMidiInfo {
    pub fn new(bank: usize, knob: usize) -> Self {
        let cc = knob_cc(bank, knob);
        Self {
            encoder: MidiInfo::new(MidiChannel::ENCODER, cc),
            shift_encoder: MidiInfo::new(MidiChannel::SHIFT, cc),
            button: MidiInfo::new(MidiChannel::BUTTON, cc),
            rgb_light: LightMidiInfo::new(MidiChannel::BUTTON, MidiChannel::RGB_ANIMATION, cc),
            ring_light: LightMidiInfo::new(MidiChannel::ENCODER, MidiChannel::RING_ANIMATION, cc),
            shift_ring_light: LightMidiInfo::new(
                MidiChannel::SHIFT,
                MidiChannel::RING_ANIMATION,
                cc,
            ),
        }
    }
}

/// Which column of side buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

fn knob_cc(bank: usize, knob: usize) -> u8 {
    assert!(bank < NUM_BANKS, "bank index {bank} out of range");
    assert!(knob < NUM_KNOBS, "knob index {knob} out of range");
    (NUM_KNOBS * bank + knob) as u8
}

/// Address of a side button.
pub fn side_button_midi_info(bank: usize, side: Side, index: usize) -> MidiInfo {
    assert!(bank < NUM_BANKS, "bank index {bank} out of range");
    assert!(index < NUM_LEFT_SIDE_BUTTONS, "side button index {index} out of range");
    let first = match side {
        Side::Left => SIDE_BUTTONS_FIRST_LEFT_CC,
        Side::Right => SIDE_BUTTONS_FIRST_RIGHT_CC,
    };
    let cc = first + index as u8 + (NUM_SIDE_BUTTONS * bank) as u8;
    MidiInfo::new(MidiChannel::SIDE_BUTTON, cc)
}

/// The bank switch message sent to (and received from) the device.
pub fn bank_change_message(bank: usize) -> CcMessage {
    assert!(bank < NUM_BANKS, "bank index {bank} out of range");
    MidiInfo::new(MidiChannel::SYSTEM, bank as u8).message(PRESSED_VALUE)
}

/// A physical input a Control Change message can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAddress {
    Encoder { bank: usize, knob: usize },
    ShiftEncoder { bank: usize, knob: usize },
    KnobButton { bank: usize, knob: usize },
    SideButton { bank: usize, side: Side, index: usize },
}

impl ControlAddress {
    /// Reverse of the addressing scheme for inbound traffic. Anything that is not
    /// one of our inputs maps to `None`.
    pub fn decode(channel: u8, cc: u8) -> Option<Self> {
        let cc = cc as usize;
        match channel {
            MidiChannel::ENCODER | MidiChannel::SHIFT | MidiChannel::BUTTON => {
                if cc >= NUM_BANKS * NUM_KNOBS {
                    return None;
                }
                let (bank, knob) = (cc / NUM_KNOBS, cc % NUM_KNOBS);
                Some(match channel {
                    MidiChannel::ENCODER => Self::Encoder { bank, knob },
                    MidiChannel::SHIFT => Self::ShiftEncoder { bank, knob },
                    _ => Self::KnobButton { bank, knob },
                })
            }
            MidiChannel::SIDE_BUTTON => {
                let first = SIDE_BUTTONS_FIRST_LEFT_CC as usize;
                if cc < first || cc >= first + NUM_BANKS * NUM_SIDE_BUTTONS {
                    return None;
                }
                let offset = cc - first;
                let bank = offset / NUM_SIDE_BUTTONS;
                let slot = offset % NUM_SIDE_BUTTONS;
                let (side, index) = if slot < NUM_LEFT_SIDE_BUTTONS {
                    (Side::Left, slot)
                } else {
                    (Side::Right, slot - NUM_LEFT_SIDE_BUTTONS)
                };
                Some(Self::SideButton { bank, side, index })
            }
            _ => None,
        }
    }
}

/// A raw Control Change triple as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcMessage {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl CcMessage {
    /// Parses inbound bytes. Returns `None` for anything that is not a Control
    /// Change, foreign traffic is expected and never an error.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        match LiveEvent::parse(bytes).ok()? {
            LiveEvent::Midi {
                channel,
                message: MidiMessage::Controller { controller, value },
            } => Some(Self {
                status: CONTROL_CHANGE | channel.as_int(),
                data1: controller.as_int(),
                data2: value.as_int(),
            }),
            _ => None,
        }
    }

    pub fn channel(&self) -> u8 {
        self.status & 0x0F
    }

    pub fn bytes(&self) -> [u8; 3] {
        [self.status, self.data1, self.data2]
    }
}
