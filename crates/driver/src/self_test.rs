use crate::error::DriverError;
use crate::send_all;
use midir::MidiOutputConnection;
use std::{thread, time};
use twister_library::animation::AnimationState;
use twister_library::lights::Light;
use twister_library::midi::NUM_KNOBS;
use twister_library::palette::LAST_HUE_INDEX;
use twister_library::ControlSurface;

pub(crate) fn self_test(
    surface: &ControlSurface,
    port: &mut MidiOutputConnection,
) -> Result<(), DriverError> {
    let knobs = move || surface.banks().iter().flat_map(|bank| bank.knobs());
    let hues = LAST_HUE_INDEX as usize + 1;

    // Rainbow wave across the knobs (12 frames, ~50ms each = 600ms)
    for frame in 0..12 {
        for (i, knob) in knobs().enumerate() {
            let index = ((i % NUM_KNOBS) * 8 + frame * 10) % hues;
            knob.rgb_light().set_raw_value(index as u8);
        }
        surface.update_hardware();
        send_all(port, surface.out())?;
        thread::sleep(time::Duration::from_millis(50));
    }

    // Ring chase, filling up then emptying (2 × 16 steps × 15ms = 480ms)
    for step in (0..=16).chain((0..16).rev()) {
        for knob in knobs() {
            knob.ring_light().set_value(step as f64 / 16.0);
        }
        send_all(port, surface.out())?;
        thread::sleep(time::Duration::from_millis(15));
    }

    // Let the firmware's own rainbow run for a moment (300ms)
    for knob in knobs() {
        knob.rgb_light().set_animation_state(AnimationState::Rainbow);
    }
    send_all(port, surface.out())?;
    thread::sleep(time::Duration::from_millis(300));

    surface.lights_off();
    send_all(port, surface.out())?;

    Ok(())
}
