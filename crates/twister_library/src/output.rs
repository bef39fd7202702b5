use crate::midi::{CcMessage, MidiInfo};
use log::trace;
use std::cell::RefCell;
use std::rc::Rc;

/// Outbound wire buffer shared by every control on the surface.
///
/// Controls only ever append encoded messages here. The host drains the buffer
/// and writes it to the device port, so nothing in the library performs I/O.
#[derive(Clone, Default)]
pub struct MidiOut {
    pending: Rc<RefCell<Vec<CcMessage>>>,
}

impl MidiOut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&self, msg: CcMessage) {
        trace!("-> {:02X} {} {}", msg.status, msg.data1, msg.data2);
        self.pending.borrow_mut().push(msg);
    }

    pub fn send_cc(&self, info: MidiInfo, value: u8) {
        self.send(info.message(value));
    }

    /// Removes and returns everything queued so far, oldest first.
    pub fn drain(&self) -> Vec<CcMessage> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_buffer() {
        let out = MidiOut::new();
        let other = out.clone();
        other.send_cc(MidiInfo::new(1, 3), 200);
        assert!(!out.is_empty());
        assert_eq!(out.drain(), vec![CcMessage { status: 0xB1, data1: 3, data2: 127 }]);
        assert!(other.is_empty());
    }
}
