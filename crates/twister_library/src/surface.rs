//! The whole device: four banks of knobs and side buttons behind one MIDI port.
//!
//! The surface is driven from a single-threaded loop. Inbound bytes go to
//! [`ControlSurface::handle_midi`], expired long presses are collected with
//! [`ControlSurface::poll_timers`], and [`ControlSurface::update_hardware`] runs
//! once per tick. Outbound messages queue on the shared [`MidiOut`].

use crate::bank::{BankController, LogNotifier, Notifier};
use crate::button::{Button, ButtonId, Gesture};
use crate::knob::Knob;
use crate::midi::{
    CcMessage, ControlAddress, NUM_BANKS, NUM_KNOBS, NUM_LEFT_SIDE_BUTTONS,
    NUM_RIGHT_SIDE_BUTTONS, Side,
};
use crate::output::MidiOut;
use crate::timer::TimerQueue;
use log::{debug, trace};
use std::rc::Rc;
use std::time::Instant;

/// What the surface needs from its host.
#[derive(Clone)]
pub struct SurfaceContext {
    pub out: MidiOut,
    pub notifier: Rc<dyn Notifier>,
}

impl Default for SurfaceContext {
    fn default() -> Self {
        Self {
            out: MidiOut::new(),
            notifier: Rc::new(LogNotifier),
        }
    }
}

/// One bank: 16 knobs plus three side buttons per column.
pub struct Bank {
    knobs: Vec<Knob>,
    left_side_buttons: Vec<Button>,
    right_side_buttons: Vec<Button>,
}

impl Bank {
    fn new(out: &MidiOut, bank: usize) -> Self {
        let side_buttons = |side: Side, count: usize| -> Vec<Button> {
            (0..count)
                .map(|index| Button::new(ButtonId::Side { bank, side, index }))
                .collect()
        };

        Self {
            knobs: (0..NUM_KNOBS).map(|knob| Knob::new(out, bank, knob)).collect(),
            left_side_buttons: side_buttons(Side::Left, NUM_LEFT_SIDE_BUTTONS),
            right_side_buttons: side_buttons(Side::Right, NUM_RIGHT_SIDE_BUTTONS),
        }
    }

    pub fn knobs(&self) -> &[Knob] {
        &self.knobs
    }

    pub fn knob(&self, index: usize) -> &Knob {
        &self.knobs[index]
    }

    pub fn knob_mut(&mut self, index: usize) -> &mut Knob {
        &mut self.knobs[index]
    }

    pub fn side_buttons(&self, side: Side) -> &[Button] {
        match side {
            Side::Left => &self.left_side_buttons,
            Side::Right => &self.right_side_buttons,
        }
    }

    pub fn side_button(&self, side: Side, index: usize) -> &Button {
        &self.side_buttons(side)[index]
    }

    pub fn side_button_mut(&mut self, side: Side, index: usize) -> &mut Button {
        match side {
            Side::Left => &mut self.left_side_buttons[index],
            Side::Right => &mut self.right_side_buttons[index],
        }
    }
}

pub struct ControlSurface {
    out: MidiOut,
    banks: Vec<Bank>,
    bank_controller: BankController,
    timers: TimerQueue<ButtonId>,
}

impl ControlSurface {
    /// Builds every bank. No bank is active until [`ControlSurface::activate`]
    /// is called, so nothing is sent while the host is still wiring bindings.
    pub fn new(context: SurfaceContext) -> Self {
        let SurfaceContext { out, notifier } = context;
        let banks = (0..NUM_BANKS).map(|bank| Bank::new(&out, bank)).collect();
        let bank_controller = BankController::new(out.clone(), notifier);

        Self {
            out,
            banks,
            bank_controller,
            timers: TimerQueue::new(),
        }
    }

    /// Selects the first bank.
    pub fn activate(&self) {
        self.bank_controller.set_active_bank(0);
    }

    pub fn out(&self) -> &MidiOut {
        &self.out
    }

    /// Shared handle to the active bank.
    pub fn bank_controller(&self) -> &BankController {
        &self.bank_controller
    }

    pub fn active_bank(&self) -> Option<usize> {
        self.bank_controller.active_bank()
    }

    pub fn set_active_bank(&self, index: usize) {
        self.bank_controller.set_active_bank(index);
    }

    pub fn set_popups_enabled(&self, enabled: bool) {
        self.bank_controller.set_popups_enabled(enabled);
    }

    pub fn banks(&self) -> &[Bank] {
        &self.banks
    }

    pub fn bank(&self, index: usize) -> &Bank {
        &self.banks[index]
    }

    pub fn bank_mut(&mut self, index: usize) -> &mut Bank {
        &mut self.banks[index]
    }

    pub fn knob(&self, bank: usize, knob: usize) -> &Knob {
        self.banks[bank].knob(knob)
    }

    pub fn knob_mut(&mut self, bank: usize, knob: usize) -> &mut Knob {
        self.banks[bank].knob_mut(knob)
    }

    pub fn side_button_mut(&mut self, bank: usize, side: Side, index: usize) -> &mut Button {
        self.banks[bank].side_button_mut(side, index)
    }

    pub fn button(&self, id: ButtonId) -> &Button {
        match id {
            ButtonId::Knob { bank, knob } => self.banks[bank].knob(knob).button(),
            ButtonId::Side { bank, side, index } => self.banks[bank].side_button(side, index),
        }
    }

    pub fn button_mut(&mut self, id: ButtonId) -> &mut Button {
        match id {
            ButtonId::Knob { bank, knob } => self.banks[bank].knob_mut(knob).button_mut(),
            ButtonId::Side { bank, side, index } => {
                self.banks[bank].side_button_mut(side, index)
            }
        }
    }

    /// Makes the side buttons of `side` navigate banks on every bank: previous,
    /// next, then back to the first bank.
    pub fn bind_bank_buttons(&mut self, side: Side) {
        for bank in &mut self.banks {
            let controller = self.bank_controller.clone();
            bank.side_button_mut(side, 0)
                .set_observer(Gesture::Click, false, Rc::new(move || controller.previous_bank()));

            let controller = self.bank_controller.clone();
            bank.side_button_mut(side, 1)
                .set_observer(Gesture::Click, false, Rc::new(move || controller.next_bank()));

            let controller = self.bank_controller.clone();
            bank.side_button_mut(side, 2)
                .set_observer(Gesture::Click, false, Rc::new(move || controller.set_active_bank(0)));
        }
    }

    pub fn set_sensitivity_all(&self, factor: f64) {
        for knob in self.all_knobs() {
            knob.encoder().set_sensitivity(factor);
        }
    }

    pub fn set_fine_sensitivity_all(&self, factor: f64) {
        for knob in self.all_knobs() {
            knob.encoder().set_fine_sensitivity(factor);
        }
    }

    /// Handles one inbound message. Timers due at `now` fire first, so a long
    /// press that has already elapsed is reported before a late release.
    ///
    /// Returns false for messages that are not for the surface.
    pub fn handle_midi(&mut self, now: Instant, bytes: &[u8]) -> bool {
        self.poll_timers(now);

        let Some(msg) = CcMessage::parse(bytes) else {
            trace!("ignoring non-CC message {bytes:02X?}");
            return false;
        };

        trace!("<- {:02X} {} {}", msg.status, msg.data1, msg.data2);

        if self.bank_controller.handle_message(&msg) {
            return true;
        }

        let Some(address) = ControlAddress::decode(msg.channel(), msg.data1) else {
            trace!("ignoring CC {msg:?}");
            return false;
        };

        match address {
            ControlAddress::Encoder { bank, knob } => {
                self.banks[bank].knob(knob).encoder().handle_value(msg.data2);
            }
            ControlAddress::ShiftEncoder { bank, knob } => {
                self.banks[bank].knob(knob).shift_encoder().handle_value(msg.data2);
            }
            ControlAddress::KnobButton { bank, knob } => {
                self.banks[bank]
                    .knob_mut(knob)
                    .button_mut()
                    .handle_value(now, msg.data2, &mut self.timers);
            }
            ControlAddress::SideButton { bank, side, index } => {
                self.banks[bank]
                    .side_button_mut(side, index)
                    .handle_value(now, msg.data2, &mut self.timers);
            }
        }
        true
    }

    /// Fires every long press due at `now`.
    pub fn poll_timers(&mut self, now: Instant) {
        while let Some((handle, id)) = self.timers.pop_expired(now) {
            self.button_mut(id).long_press_elapsed(handle);
        }
    }

    /// When the loop should wake up next for a long press, if one is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Pushes pending colour changes to the device.
    pub fn update_hardware(&self) {
        for knob in self.all_knobs() {
            knob.rgb_light().update_hardware();
        }
    }

    /// Turns every light off and resets all animations.
    pub fn lights_off(&self) {
        debug!("all lights off");
        for knob in self.all_knobs() {
            knob.lights_off();
        }
    }

    fn all_knobs(&self) -> impl Iterator<Item = &Knob> {
        self.banks.iter().flat_map(|bank| bank.knobs.iter())
    }
}
