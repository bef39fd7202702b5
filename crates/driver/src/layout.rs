//! Standalone layout: one parameter per knob, published as absolute CCs.
//!
//! Per knob:
//! - turn: parameter, shown on the ring
//! - shift turn: colour, scrolled through the palette and shown on the shift ring
//! - click: fine sensitivity on/off
//! - double click: parameter back to its default
//! - long press: hold latch, shown with the configured animation
//!
//! Knobs past `knobs_per_bank` have no parameter: they ignore turns and stay dark.
//!
//! With the bank's shift side button held:
//! - click: next colour preset
//! - double click: first colour preset
//! - long press: dim the light to half brightness, or undo it

use log::debug;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use twister_library::animation::AnimationState;
use twister_library::button::PressedState;
use twister_library::color_supplier::OnOffColorSupplier;
use twister_library::cursor::CursorNormalizedValue;
use twister_library::knob::Knob;
use twister_library::lights::Light;
use twister_library::midi::{MidiInfo, NUM_BANKS, NUM_KNOBS, Side};
use twister_library::output::MidiOut;
use twister_library::palette::{LAST_HUE_INDEX, PARAMETER_COLORS};
use twister_library::scroll::{Scrollable, circular_scroll_forward};
use twister_library::value::ObservableValue;
use twister_library::ControlSurface;

/// Index of the side button used as shift, on the side without bank navigation.
const SHIFT_BUTTON_INDEX: usize = 2;

const DIMMED_BRIGHTNESS: f64 = 0.5;

pub(crate) struct LayoutOptions {
    pub hold_animation: AnimationState,
    pub knob_colors: Vec<u8>,
    pub bank_buttons: Side,
    pub knobs_per_bank: usize,
}

fn palette_position(index: u8) -> f64 {
    index as f64 / LAST_HUE_INDEX as f64
}

/// Eight colour presets, paged through one at a time.
struct ColorPresets {
    position: usize,
    color: ObservableValue,
}

impl ColorPresets {
    fn apply(&self) {
        self.color.set(palette_position(PARAMETER_COLORS[self.position]));
    }
}

impl Scrollable for ColorPresets {
    fn can_scroll_forward(&self) -> bool {
        self.position + 1 < PARAMETER_COLORS.len()
    }

    fn item_count(&self) -> usize {
        PARAMETER_COLORS.len()
    }

    fn scroll_forward(&mut self) {
        self.scroll_by(1);
    }

    fn scroll_by(&mut self, delta: i32) {
        let last = PARAMETER_COLORS.len() as i32 - 1;
        self.position = (self.position as i32 + delta).clamp(0, last) as usize;
        self.apply();
    }
}

pub(crate) struct StandaloneLayout {
    #[cfg(test)]
    params: Vec<ObservableValue>,
    #[cfg(test)]
    colors: Vec<ObservableValue>,
    published: MidiOut,
}

impl StandaloneLayout {
    pub(crate) fn build(surface: &mut ControlSurface, options: &LayoutOptions) -> Self {
        let shift_side = match options.bank_buttons {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        };

        let published = MidiOut::new();
        #[cfg(test)]
        let mut params = Vec::with_capacity(NUM_BANKS * NUM_KNOBS);
        #[cfg(test)]
        let mut colors = Vec::with_capacity(NUM_BANKS * NUM_KNOBS);

        for bank in 0..NUM_BANKS {
            let shift = surface
                .side_button_mut(bank, shift_side, SHIFT_BUTTON_INDEX)
                .pressed_state();
            let initial_color = options.knob_colors.get(bank).copied().unwrap_or(0);

            for index in 0..NUM_KNOBS {
                let knob = surface.knob_mut(bank, index);
                let param = ObservableValue::new(format!("param {}/{}", bank + 1, index + 1), 0.0);
                let color = ObservableValue::new(
                    format!("color {}/{}", bank + 1, index + 1),
                    palette_position(initial_color),
                );

                param.set_exists(index < options.knobs_per_bank);

                bind_parameter(knob, &param, &published, MidiInfo::new(bank as u8, index as u8));
                bind_color(knob, &color, &param);
                bind_gestures(knob, &param, &color, shift.clone(), options.hold_animation);

                #[cfg(test)]
                params.push(param);
                #[cfg(test)]
                colors.push(color);
            }
        }

        Self {
            #[cfg(test)]
            params,
            #[cfg(test)]
            colors,
            published,
        }
    }

    /// Parameter changes waiting to go out on the virtual port.
    pub(crate) fn published(&self) -> &MidiOut {
        &self.published
    }

    #[cfg(test)]
    pub(crate) fn param(&self, bank: usize, knob: usize) -> &ObservableValue {
        &self.params[bank * NUM_KNOBS + knob]
    }

    #[cfg(test)]
    pub(crate) fn color(&self, bank: usize, knob: usize) -> &ObservableValue {
        &self.colors[bank * NUM_KNOBS + knob]
    }
}

fn bind_parameter(knob: &mut Knob, param: &ObservableValue, published: &MidiOut, info: MidiInfo) {
    knob.set_binding(Rc::new(param.clone()));
    knob.ring_light().observe_value(param);

    let published = published.clone();
    param.add_observer(Rc::new(move |v| {
        published.send(info.message((v * 127.0).round() as u8))
    }));
}

fn bind_color(knob: &mut Knob, color: &ObservableValue, param: &ObservableValue) {
    knob.set_shift_binding(Rc::new(color.clone()));

    let colors = OnOffColorSupplier::default();
    colors.observe_palette_position(color);
    colors.observe_existence(param);
    knob.rgb_light().set_color_supplier(colors.supplier());

    let cursor = CursorNormalizedValue::new();
    cursor.set_count(LAST_HUE_INDEX as usize + 1);
    knob.shift_ring_light().observe_cursor(&cursor);
    color.add_observer(Rc::new(move |v| {
        cursor.set_index(Some((v * LAST_HUE_INDEX as f64).round() as usize))
    }));
}

fn bind_gestures(
    knob: &mut Knob,
    param: &ObservableValue,
    color: &ObservableValue,
    shift: PressedState,
    hold_animation: AnimationState,
) {
    let rgb = knob.rgb_light().clone();
    let sensitivity = knob.sensitivity();
    let presets = Rc::new(RefCell::new(ColorPresets {
        position: 0,
        color: color.clone(),
    }));
    let held = Rc::new(Cell::new(false));
    let dimmed = Rc::new(Cell::new(false));

    let button = knob.button_mut();
    button.set_shift_button(shift);

    button.add_clicked_observer(Rc::new(move || sensitivity.toggle()));

    let param = param.clone();
    button.add_double_clicked_observer(Rc::new(move || param.reset()));

    let light = rgb.clone();
    button.add_long_pressed_observer(Rc::new(move || {
        held.set(!held.get());
        debug!("hold {}", if held.get() { "on" } else { "off" });
        let state = if held.get() { hold_animation } else { AnimationState::Off };
        light.set_animation_state(state);
    }));

    let pager = presets.clone();
    button.add_shift_clicked_observer(Rc::new(move || {
        circular_scroll_forward(&mut *pager.borrow_mut())
    }));

    button.add_shift_double_clicked_observer(Rc::new(move || {
        let mut presets = presets.borrow_mut();
        let back = -(presets.position as i32);
        presets.scroll_by(back);
    }));

    button.add_shift_long_pressed_observer(Rc::new(move || {
        dimmed.set(!dimmed.get());
        if dimmed.get() {
            rgb.override_brightness(DIMMED_BRIGHTNESS);
        } else {
            rgb.reset_brightness();
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use twister_library::midi::CcMessage;
    use twister_library::SurfaceContext;

    fn layout() -> (ControlSurface, StandaloneLayout) {
        let mut surface = ControlSurface::new(SurfaceContext::default());
        let options = LayoutOptions {
            hold_animation: AnimationState::Strobe1_1,
            knob_colors: vec![115, 86, 51, 14],
            bank_buttons: Side::Left,
            knobs_per_bank: 12,
        };
        let layout = StandaloneLayout::build(&mut surface, &options);
        surface.out().drain();
        layout.published().drain();
        (surface, layout)
    }

    fn click(surface: &mut ControlSurface, at: Instant, status: u8, cc: u8) {
        surface.handle_midi(at, &[status, cc, 127]);
        surface.handle_midi(at + Duration::from_millis(30), &[status, cc, 0]);
    }

    #[test]
    fn test_turning_publishes_absolute_value() {
        let (mut surface, layout) = layout();
        // Knob 3 of bank 2.
        surface.handle_midi(Instant::now(), &[0xB0, 18, 64 + 127 / 2]);

        assert_eq!(layout.param(1, 2).get(), 63.0 / 127.0);
        assert_eq!(
            layout.published().drain(),
            vec![CcMessage { status: 0xB1, data1: 2, data2: 63 }]
        );
    }

    #[test]
    fn test_knobs_without_parameter_stay_dark() {
        let (mut surface, layout) = layout();
        surface.handle_midi(Instant::now(), &[0xB0, 12, 64 + 20]);

        assert!(!layout.param(0, 12).exists());
        assert_eq!(layout.param(0, 12).get(), 0.0);
        assert!(layout.published().is_empty());

        surface.update_hardware();
        assert_eq!(surface.knob(0, 12).rgb_light().last_sent_index(), Some(0));
        assert_eq!(surface.knob(0, 11).rgb_light().last_sent_index(), Some(115));

        // Brought back, it lights up in its bank colour again.
        layout.param(0, 12).set_exists(true);
        surface.update_hardware();
        assert_eq!(surface.knob(0, 12).rgb_light().last_sent_index(), Some(115));
    }

    #[test]
    fn test_click_and_double_click() {
        let (mut surface, layout) = layout();
        let t0 = Instant::now();
        surface.handle_midi(t0, &[0xB0, 0, 64 + 20]);

        click(&mut surface, t0, 0xB1, 0);
        assert!(surface.knob(0, 0).encoder().is_fine());

        click(&mut surface, t0 + Duration::from_millis(100), 0xB1, 0);
        assert_eq!(layout.param(0, 0).get(), 0.0);
        // The second click of the double click toggled back.
        assert!(!surface.knob(0, 0).encoder().is_fine());
    }

    #[test]
    fn test_long_press_toggles_hold_animation() {
        let (mut surface, _layout) = layout();
        let t0 = Instant::now();
        surface.handle_midi(t0, &[0xB1, 1, 127]);
        surface.handle_midi(t0 + Duration::from_millis(400), &[0xB1, 1, 0]);
        surface.handle_midi(t0 + Duration::from_millis(1000), &[0xB1, 1, 127]);
        surface.handle_midi(t0 + Duration::from_millis(1400), &[0xB1, 1, 0]);

        let animations: Vec<u8> = surface
            .out()
            .drain()
            .iter()
            .filter(|m| m.status == 0xB2 && m.data1 == 1)
            .map(|m| m.data2)
            .collect();
        assert_eq!(animations, vec![4, 0]);
    }

    #[test]
    fn test_shift_gestures_page_colors() {
        let (mut surface, layout) = layout();
        let t0 = Instant::now();
        // Hold right side button 3 of bank 1 as shift.
        surface.handle_midi(t0, &[0xB3, 13, 127]);

        let first = layout.color(0, 5).get();
        assert_eq!(first, palette_position(115));

        click(&mut surface, t0 + Duration::from_millis(10), 0xB1, 5);
        assert_eq!(layout.color(0, 5).get(), palette_position(PARAMETER_COLORS[1]));

        // A double click: the first click pages forward, then the double click resets.
        click(&mut surface, t0 + Duration::from_millis(100), 0xB1, 5);
        assert_eq!(layout.color(0, 5).get(), palette_position(PARAMETER_COLORS[0]));

        surface.update_hardware();
        let rgb = surface.knob(0, 5).rgb_light().last_sent_index();
        assert_eq!(rgb, Some(PARAMETER_COLORS[0]));
    }

    #[test]
    fn test_shift_encoder_moves_color_cursor() {
        let (mut surface, layout) = layout();
        let t0 = Instant::now();
        // Two fast turns down with the device's own shift held.
        surface.handle_midi(t0, &[0xB4, 0, 0]);
        surface.handle_midi(t0, &[0xB4, 0, 0]);

        assert_eq!(layout.color(0, 0).get(), 0.0);
        let ring = surface
            .out()
            .drain()
            .into_iter()
            .filter(|m| m.status == 0xB4)
            .last();
        // Cursor mode: the first palette position still shows a dot.
        assert_eq!(ring, Some(CcMessage { status: 0xB4, data1: 0, data2: 1 }));
    }
}
