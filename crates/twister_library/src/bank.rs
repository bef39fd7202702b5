//! Active bank tracking.
//!
//! The device and the host both switch banks: the host sends a bank change
//! message, and the device's own bank buttons report one back. Either way the
//! controller ends up with the same index and shows at most one notification.

use crate::midi::{CcMessage, MidiChannel, NUM_BANKS, PRESSED_VALUE, bank_change_message};
use crate::output::MidiOut;
use log::{debug, info};
use std::cell::RefCell;
use std::rc::Rc;

/// Sink for short-lived notifications to the user.
pub trait Notifier {
    fn show(&self, message: &str);
}

/// Notifier that writes to the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, message: &str) {
        info!("{message}");
    }
}

struct BankState {
    active: Option<usize>,
    popups_enabled: bool,
}

/// Shared handle to the active bank. Clones control the same state, so gesture
/// callbacks can switch banks.
#[derive(Clone)]
pub struct BankController {
    state: Rc<RefCell<BankState>>,
    out: MidiOut,
    notifier: Rc<dyn Notifier>,
}

impl BankController {
    pub fn new(out: MidiOut, notifier: Rc<dyn Notifier>) -> Self {
        Self {
            state: Rc::new(RefCell::new(BankState {
                active: None,
                popups_enabled: false,
            })),
            out,
            notifier,
        }
    }

    /// `None` until the surface activates its first bank.
    pub fn active_bank(&self) -> Option<usize> {
        self.state.borrow().active
    }

    pub fn set_popups_enabled(&self, enabled: bool) {
        self.state.borrow_mut().popups_enabled = enabled;
    }

    pub fn popups_enabled(&self) -> bool {
        self.state.borrow().popups_enabled
    }

    /// Switches to `index` and tells the device.
    ///
    /// # Panics
    ///
    /// If `index` is not a valid bank.
    pub fn set_active_bank(&self, index: usize) {
        assert!(index < NUM_BANKS, "bank index {index} is invalid");

        if !self.record(index) {
            return;
        }

        self.out.send(bank_change_message(index));
        self.notify(index);
    }

    /// Does nothing on the last bank.
    pub fn next_bank(&self) {
        let next = self.active_bank().map_or(0, |bank| bank + 1);
        if next >= NUM_BANKS {
            return;
        }
        self.set_active_bank(next);
    }

    /// Does nothing on the first bank.
    pub fn previous_bank(&self) {
        match self.active_bank() {
            Some(bank) if bank > 0 => self.set_active_bank(bank - 1),
            _ => {}
        }
    }

    /// Listens for bank changes made on the device itself. Returns true if the
    /// message was a bank change.
    pub fn handle_message(&self, msg: &CcMessage) -> bool {
        let status = 0xB0 | MidiChannel::SYSTEM;
        if msg.status != status || msg.data1 as usize >= NUM_BANKS || msg.data2 != PRESSED_VALUE {
            return false;
        }

        let index = msg.data1 as usize;
        if self.record(index) {
            self.notify(index);
        }
        true
    }

    /// False if `index` was already active.
    fn record(&self, index: usize) -> bool {
        let mut state = self.state.borrow_mut();
        if state.active == Some(index) {
            return false;
        }
        state.active = Some(index);
        debug!("active bank {index}");
        true
    }

    fn notify(&self, index: usize) {
        if self.popups_enabled() {
            self.notifier.show(&format!("Twister Bank {}", index + 1));
        }
    }
}
