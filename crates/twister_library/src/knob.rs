use crate::button::{Button, ButtonId};
use crate::encoder::{Encoder, Sensitivity};
use crate::lights::{Light, RgbLight, RingLight};
use crate::midi::KnobMidiInfo;
use crate::output::MidiOut;
use crate::value::Target;
use std::rc::Rc;

/// A Twister knob: encoder, shift encoder, push button and both lights.
///
/// The shift encoder is the same physical knob turned while the device's own
/// shift is held. It reports on its own channel and has its own binding and
/// ring light.
pub struct Knob {
    midi_info: KnobMidiInfo,
    encoder: Encoder,
    shift_encoder: Encoder,
    button: Button,
    rgb_light: RgbLight,
    ring_light: RingLight,
    shift_ring_light: RingLight,
}

impl Knob {
    pub fn new(out: &MidiOut, bank: usize, knob: usize) -> Self {
        let midi_info = KnobMidiInfo::new(bank, knob);
        Self {
            midi_info,
            encoder: Encoder::new(midi_info.encoder),
            shift_encoder: Encoder::new(midi_info.shift_encoder),
            button: Button::new(ButtonId::Knob { bank, knob }),
            rgb_light: RgbLight::new(out.clone(), midi_info.rgb_light),
            ring_light: RingLight::new(out.clone(), midi_info.ring_light),
            shift_ring_light: RingLight::new(out.clone(), midi_info.shift_ring_light),
        }
    }

    pub fn midi_info(&self) -> &KnobMidiInfo {
        &self.midi_info
    }

    pub fn button(&self) -> &Button {
        &self.button
    }

    pub fn button_mut(&mut self) -> &mut Button {
        &mut self.button
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub fn encoder_mut(&mut self) -> &mut Encoder {
        &mut self.encoder
    }

    pub fn shift_encoder(&self) -> &Encoder {
        &self.shift_encoder
    }

    pub fn shift_encoder_mut(&mut self) -> &mut Encoder {
        &mut self.shift_encoder
    }

    pub fn rgb_light(&self) -> &RgbLight {
        &self.rgb_light
    }

    pub fn ring_light(&self) -> &RingLight {
        &self.ring_light
    }

    pub fn shift_ring_light(&self) -> &RingLight {
        &self.shift_ring_light
    }

    /// Value of whatever the knob is bound to (0-1).
    pub fn target_value(&self) -> Option<f64> {
        self.encoder.target_value()
    }

    pub fn shift_target_value(&self) -> Option<f64> {
        self.shift_encoder.target_value()
    }

    pub fn set_binding(&mut self, target: Rc<dyn Target>) {
        self.encoder.set_binding(target);
    }

    pub fn set_shift_binding(&mut self, target: Rc<dyn Target>) {
        self.shift_encoder.set_binding(target);
    }

    pub fn set_sensitivity(&self, factor: f64) {
        self.encoder.set_sensitivity(factor);
    }

    pub fn set_fine_sensitivity(&self, factor: f64) {
        self.encoder.set_fine_sensitivity(factor);
    }

    /// Switches the primary encoder between normal and fine sensitivity. The
    /// shift encoder is left alone.
    pub fn toggle_sensitivity(&self) {
        self.encoder.toggle_sensitivity();
    }

    /// Shared sensitivity of the primary encoder, for gesture callbacks.
    pub fn sensitivity(&self) -> Sensitivity {
        self.encoder.sensitivity().clone()
    }

    /// Resets all animations and turns off all lights.
    pub fn lights_off(&self) {
        self.ring_light.light_off();
        self.shift_ring_light.light_off();
        self.rgb_light.light_off();
    }
}
