//! The two lights on every knob.
//!
//! Both lights share the animation and brightness override encoding, sent on
//! their animation channel. They differ in what their value channel means: a
//! palette index for the RGB light, a ring position for the ring light.

use crate::animation::{AnimationState, AnimationTable};
use crate::cursor::CursorNormalizedValue;
use crate::midi::{LightMidiInfo, MidiInfo};
use crate::output::MidiOut;
use crate::palette::{self, Color, OFF_INDEX};
use crate::value::ObservableValue;
use std::cell::RefCell;
use std::rc::Rc;

const RGB_ANIMATION_START: u8 = 1;
const RGB_BRIGHTNESS_START: u8 = 17;
const RING_ANIMATION_START: u8 = 49;
const RING_BRIGHTNESS_START: u8 = 65;

const BRIGHTNESS_STEPS: f64 = 30.0;

/// Animation and brightness override for one light.
#[derive(Clone)]
pub struct LightAnimation {
    info: MidiInfo,
    table: AnimationTable,
    brightness_start: u8,
    out: MidiOut,
}

impl LightAnimation {
    pub fn new(out: MidiOut, info: MidiInfo, animation_start: u8, brightness_start: u8) -> Self {
        Self {
            info,
            table: AnimationTable::new(animation_start),
            brightness_start,
            out,
        }
    }

    pub fn set_animation_state(&self, state: AnimationState) {
        self.send(self.table.code(state));
    }

    /// Dims the light without touching its colour or ring value. Replaces any
    /// running animation.
    pub fn override_brightness(&self, brightness: f64) {
        let value = brightness.clamp(0.0, 1.0);
        let code = (value * BRIGHTNESS_STEPS).round() as u8 + self.brightness_start;
        self.send(code);
    }

    pub fn reset_brightness(&self) {
        self.send(0);
    }

    pub fn code(&self, state: AnimationState) -> u8 {
        self.table.code(state)
    }

    fn send(&self, value: u8) {
        self.out.send_cc(self.info, value);
    }
}

/// Behaviour shared by every light.
pub trait Light {
    fn animation(&self) -> &LightAnimation;

    /// Turns the light off and resets all animations.
    fn light_off(&self);

    fn set_animation_state(&self, state: AnimationState) {
        self.animation().set_animation_state(state);
    }

    fn override_brightness(&self, brightness: f64) {
        self.animation().override_brightness(brightness);
    }

    fn reset_brightness(&self) {
        self.animation().reset_brightness();
    }
}

pub type ColorSupplier = Rc<dyn Fn() -> Color>;

#[derive(Clone)]
enum ColorSource {
    Fixed(Color),
    Supplier(ColorSupplier),
}

struct RgbState {
    source: ColorSource,
    last_sent: Option<u8>,
    displayed: Color,
}

/// The RGB light under a knob.
///
/// Colour requests are latched and only go out on [`RgbLight::update_hardware`],
/// which sends the palette index when it differs from what the device already
/// shows. Clones share the same light.
#[derive(Clone)]
pub struct RgbLight {
    animation: LightAnimation,
    info: MidiInfo,
    state: Rc<RefCell<RgbState>>,
}

impl RgbLight {
    pub fn new(out: MidiOut, info: LightMidiInfo) -> Self {
        Self {
            animation: LightAnimation::new(
                out,
                info.animation,
                RGB_ANIMATION_START,
                RGB_BRIGHTNESS_START,
            ),
            info: info.light,
            state: Rc::new(RefCell::new(RgbState {
                source: ColorSource::Fixed(Color::BLACK),
                last_sent: None,
                displayed: Color::BLACK,
            })),
        }
    }

    pub fn set_color(&self, color: Color) {
        self.state.borrow_mut().source = ColorSource::Fixed(color);
    }

    /// Sets the colour from a palette index.
    pub fn set_raw_value(&self, index: u8) {
        self.set_color(palette::palette_color(index));
    }

    /// The light pulls its colour from `supplier` on every update.
    pub fn set_color_supplier(&self, supplier: ColorSupplier) {
        self.state.borrow_mut().source = ColorSource::Supplier(supplier);
    }

    /// Resolves the current colour and sends it if the device shows something else.
    pub fn update_hardware(&self) {
        let source = self.state.borrow().source.clone();
        let color = match source {
            ColorSource::Fixed(color) => color,
            ColorSource::Supplier(supplier) => supplier(),
        };
        let quantized = palette::quantize(color);

        let mut state = self.state.borrow_mut();
        state.displayed = quantized.color;
        if state.last_sent != Some(quantized.index) {
            state.last_sent = Some(quantized.index);
            self.animation.out.send_cc(self.info, quantized.index);
        }
    }

    /// The colour the device shows after the last update.
    pub fn displayed_color(&self) -> Color {
        self.state.borrow().displayed
    }

    pub fn last_sent_index(&self) -> Option<u8> {
        self.state.borrow().last_sent
    }
}

impl Light for RgbLight {
    fn animation(&self) -> &LightAnimation {
        &self.animation
    }

    fn light_off(&self) {
        self.set_animation_state(AnimationState::Off);

        let mut state = self.state.borrow_mut();
        state.source = ColorSource::Fixed(Color::BLACK);
        state.displayed = Color::BLACK;
        state.last_sent = Some(OFF_INDEX);

        // Goes out now rather than on the next update, so nothing stays lit when
        // the host shuts down.
        self.animation.out.send_cc(self.info, OFF_INDEX);
    }
}

/// The LED ring around a knob.
#[derive(Clone)]
pub struct RingLight {
    animation: LightAnimation,
    info: MidiInfo,
}

impl RingLight {
    pub fn new(out: MidiOut, info: LightMidiInfo) -> Self {
        Self {
            animation: LightAnimation::new(
                out,
                info.animation,
                RING_ANIMATION_START,
                RING_BRIGHTNESS_START,
            ),
            info: info.light,
        }
    }

    pub fn set_raw_value(&self, value: i32) {
        self.animation.out.send_cc(self.info, value.clamp(0, 127) as u8);
    }

    pub fn set_value(&self, value: f64) {
        self.set_raw_value((value * 127.0).round() as i32);
    }

    /// Ring in "dot" mode used as a cursor. Any value in 0-1 shows the dot, even
    /// 0. Negative values hide it.
    pub fn set_cursor_value(&self, value: f64) {
        if value < 0.0 {
            self.set_raw_value(0);
            return;
        }

        self.set_raw_value((value.min(1.0) * 126.0).round() as i32 + 1);
    }

    pub fn observe_value(&self, value: &ObservableValue) {
        let light = self.clone();
        value.add_observer(Rc::new(move |v| light.set_value(v)));
    }

    pub fn observe_cursor(&self, cursor: &CursorNormalizedValue) {
        let light = self.clone();
        cursor.add_observer(Rc::new(move |v| light.set_cursor_value(v)));
    }
}

impl Light for RingLight {
    fn animation(&self) -> &LightAnimation {
        &self.animation
    }

    fn light_off(&self) {
        self.set_animation_state(AnimationState::Off);
        self.set_raw_value(0);
    }
}
