use crate::value::ValueObserver;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct CursorState {
    index: Option<usize>,
    count: usize,
    observers: Vec<ValueObserver>,
}

/// Turns a cursor position inside a bank of items into a normalized 0-1 value.
///
/// Observers receive -1 while there is no valid position (no items, or no
/// selection), which ring lights in cursor mode show as a hidden dot.
#[derive(Clone, Default)]
pub struct CursorNormalizedValue {
    state: Rc<RefCell<CursorState>>,
}

impl CursorNormalizedValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if this exact observer was already registered.
    pub fn add_observer(&self, observer: ValueObserver) -> bool {
        let mut state = self.state.borrow_mut();
        if state.observers.iter().any(|o| Rc::ptr_eq(o, &observer)) {
            return false;
        }
        state.observers.push(observer);
        true
    }

    pub fn set_index(&self, index: Option<usize>) {
        self.state.borrow_mut().index = index;
        self.notify();
    }

    pub fn set_count(&self, count: usize) {
        self.state.borrow_mut().count = count;
        self.notify();
    }

    pub fn value(&self) -> f64 {
        let state = self.state.borrow();
        match (state.index, state.count) {
            (None, _) | (_, 0) => -1.0,
            (Some(_), 1) => 0.0,
            (Some(index), count) => (index as f64 / (count - 1) as f64).clamp(0.0, 1.0),
        }
    }

    fn notify(&self) {
        let value = self.value();
        let observers = self.state.borrow().observers.clone();
        for observer in observers {
            observer(value);
        }
    }
}
