//! Buttons and gesture recognition.
//!
//! A button turns raw press/release messages into clicks, double clicks and
//! long presses. Each gesture has a shifted variant that is used instead while
//! the button's shift modifier is held.

use crate::midi::{PRESSED_VALUE, RELEASED_VALUE, Side};
use crate::timer::{TimerHandle, TimerQueue};
use log::{debug, warn};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub const LONG_PRESS_DURATION: Duration = Duration::from_millis(250);
pub const DOUBLE_CLICK_DURATION: Duration = Duration::from_millis(300);

/// Identifies a button on the surface. Also the payload of its long press timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonId {
    Knob { bank: usize, knob: usize },
    Side { bank: usize, side: Side, index: usize },
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Knob { bank, knob } => write!(f, "knob button {}/{}", bank + 1, knob + 1),
            Self::Side { bank, side, index } => {
                write!(f, "{side:?} side button {}/{}", bank + 1, index + 1)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    Click,
    DoubleClick,
    LongPress,
}

impl Gesture {
    fn slot(self) -> usize {
        match self {
            Self::Click => 0,
            Self::DoubleClick => 1,
            Self::LongPress => 2,
        }
    }
}

pub type Observer = Rc<dyn Fn()>;

/// Callbacks for one gesture. The same callback (by reference) is only kept once.
#[derive(Default, Clone)]
pub struct ObserverSet {
    observers: Vec<Observer>,
}

impl ObserverSet {
    /// Returns false if the observer was already registered.
    pub fn add(&mut self, observer: Observer) -> bool {
        if self.observers.iter().any(|o| Rc::ptr_eq(o, &observer)) {
            return false;
        }
        self.observers.push(observer);
        true
    }

    /// Makes `observer` the only one.
    pub fn set(&mut self, observer: Observer) {
        self.observers.clear();
        self.observers.push(observer);
    }

    pub fn clear(&mut self) {
        self.observers.clear();
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer();
        }
    }
}

/// Read-only view of whether a button is held. Used to make one button the
/// shift modifier of others without sharing the button itself.
#[derive(Debug, Clone, Default)]
pub struct PressedState(Rc<Cell<bool>>);

impl PressedState {
    pub fn is_pressed(&self) -> bool {
        self.0.get()
    }
}

/// A knob button or side button.
pub struct Button {
    id: ButtonId,
    pressed: PressedState,
    press_time: Option<Instant>,
    long_press_timer: Option<TimerHandle>,
    last_click_release: Option<Instant>,
    shift: Option<PressedState>,
    observers: [ObserverSet; 3],
    shift_observers: [ObserverSet; 3],
}

impl Button {
    pub fn new(id: ButtonId) -> Self {
        Self {
            id,
            pressed: PressedState::default(),
            press_time: None,
            long_press_timer: None,
            last_click_release: None,
            shift: None,
            observers: Default::default(),
            shift_observers: Default::default(),
        }
    }

    pub fn id(&self) -> ButtonId {
        self.id
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed.is_pressed()
    }

    /// When the current press started, if the button is held.
    pub fn press_time(&self) -> Option<Instant> {
        self.press_time
    }

    pub fn pressed_state(&self) -> PressedState {
        self.pressed.clone()
    }

    /// Routes gestures to the shifted observers while `shift` is held.
    pub fn set_shift_button(&mut self, shift: PressedState) {
        self.shift = Some(shift);
    }

    pub fn clear_shift_button(&mut self) {
        self.shift = None;
    }

    pub fn observers_mut(&mut self, gesture: Gesture, shifted: bool) -> &mut ObserverSet {
        if shifted {
            &mut self.shift_observers[gesture.slot()]
        } else {
            &mut self.observers[gesture.slot()]
        }
    }

    pub fn add_observer(&mut self, gesture: Gesture, shifted: bool, observer: Observer) -> bool {
        self.observers_mut(gesture, shifted).add(observer)
    }

    pub fn set_observer(&mut self, gesture: Gesture, shifted: bool, observer: Observer) {
        self.observers_mut(gesture, shifted).set(observer);
    }

    pub fn clear_observers(&mut self, gesture: Gesture, shifted: bool) {
        self.observers_mut(gesture, shifted).clear();
    }

    /// Drops every observer of every gesture.
    pub fn clear_all_observers(&mut self) {
        for set in self.observers.iter_mut().chain(self.shift_observers.iter_mut()) {
            set.clear();
        }
    }

    pub fn add_clicked_observer(&mut self, observer: Observer) -> bool {
        self.add_observer(Gesture::Click, false, observer)
    }

    pub fn add_double_clicked_observer(&mut self, observer: Observer) -> bool {
        self.add_observer(Gesture::DoubleClick, false, observer)
    }

    pub fn add_long_pressed_observer(&mut self, observer: Observer) -> bool {
        self.add_observer(Gesture::LongPress, false, observer)
    }

    pub fn add_shift_clicked_observer(&mut self, observer: Observer) -> bool {
        self.add_observer(Gesture::Click, true, observer)
    }

    pub fn add_shift_double_clicked_observer(&mut self, observer: Observer) -> bool {
        self.add_observer(Gesture::DoubleClick, true, observer)
    }

    pub fn add_shift_long_pressed_observer(&mut self, observer: Observer) -> bool {
        self.add_observer(Gesture::LongPress, true, observer)
    }

    /// Handles a wire value for this button. Only the exact press and release
    /// values mean anything.
    pub fn handle_value(&mut self, now: Instant, value: u8, timers: &mut TimerQueue<ButtonId>) {
        match value {
            PRESSED_VALUE => self.press(now, timers),
            RELEASED_VALUE => self.release(now, timers),
            other => warn!("{}: unexpected value {other}", self.id),
        }
    }

    pub fn press(&mut self, now: Instant, timers: &mut TimerQueue<ButtonId>) {
        // One long press timer per button: a new press replaces any stale one.
        if let Some(stale) = self.long_press_timer.take() {
            timers.cancel(stale);
        }

        self.pressed.0.set(true);
        self.press_time = Some(now);
        self.long_press_timer = Some(timers.schedule(now, LONG_PRESS_DURATION, self.id));
    }

    pub fn release(&mut self, now: Instant, timers: &mut TimerQueue<ButtonId>) {
        if !self.is_pressed() {
            return;
        }

        self.pressed.0.set(false);
        self.press_time = None;

        let still_pending = match self.long_press_timer.take() {
            Some(handle) => timers.cancel(handle),
            None => false,
        };

        if !still_pending {
            // The long press already fired for this press.
            return;
        }

        let shifted = self.shift_held();
        self.notify(Gesture::Click, shifted);

        let double = self
            .last_click_release
            .is_some_and(|last| now.saturating_duration_since(last) < DOUBLE_CLICK_DURATION);
        if double {
            self.notify(Gesture::DoubleClick, shifted);
        }

        self.last_click_release = Some(now);
    }

    /// Called when a long press timer expires. Stale handles are ignored.
    pub fn long_press_elapsed(&mut self, handle: TimerHandle) {
        if self.long_press_timer != Some(handle) || !self.is_pressed() {
            return;
        }

        self.long_press_timer = None;
        let shifted = self.shift_held();
        self.notify(Gesture::LongPress, shifted);
    }

    fn shift_held(&self) -> bool {
        self.shift.as_ref().is_some_and(PressedState::is_pressed)
    }

    fn notify(&self, gesture: Gesture, shifted: bool) {
        debug!("{} {:?}{}", self.id, gesture, if shifted { " (shift)" } else { "" });
        let set = if shifted {
            &self.shift_observers[gesture.slot()]
        } else {
            &self.observers[gesture.slot()]
        };
        set.notify();
    }
}
