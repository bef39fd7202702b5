//! Binding targets and observable values.
//!
//! The surface never owns application state. Encoders push relative deltas into
//! a [`Target`], and lights follow an [`ObservableValue`] by registering a value
//! observer on it.

use log::{debug, trace};
use std::cell::RefCell;
use std::rc::Rc;

/// Something an encoder can be bound to.
pub trait Target {
    /// Applies a normalized relative adjustment.
    fn adjust(&self, delta: f64);

    /// Current normalized value, if the target has one.
    fn value(&self) -> Option<f64> {
        None
    }

    /// Whether the target currently exists on the host side.
    fn exists(&self) -> bool {
        true
    }
}

pub type ValueObserver = Rc<dyn Fn(f64)>;
pub type ExistsObserver = Rc<dyn Fn(bool)>;

struct Inner {
    name: String,
    value: f64,
    default: f64,
    exists: bool,
    observers: Vec<ValueObserver>,
    exists_observers: Vec<ExistsObserver>,
}

/// A shared, observable normalized value in [0, 1].
///
/// Cloning gives another handle to the same value.
#[derive(Clone)]
pub struct ObservableValue {
    inner: Rc<RefCell<Inner>>,
}

impl ObservableValue {
    pub fn new(name: impl Into<String>, default: f64) -> Self {
        let default = default.clamp(0.0, 1.0);
        Self {
            inner: Rc::new(RefCell::new(Inner {
                name: name.into(),
                value: default,
                default,
                exists: true,
                observers: Vec::new(),
                exists_observers: Vec::new(),
            })),
        }
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn get(&self) -> f64 {
        self.inner.borrow().value
    }

    /// Sets the value, clamped to [0, 1]. Observers only hear about real changes.
    pub fn set(&self, value: f64) {
        let value = value.clamp(0.0, 1.0);
        let observers = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            trace!("{} = {value:.4}", inner.name);
            inner.observers.clone()
        };

        for observer in observers {
            observer(value);
        }
    }

    pub fn reset(&self) {
        let default = self.inner.borrow().default;
        self.set(default);
    }

    pub fn exists(&self) -> bool {
        self.inner.borrow().exists
    }

    /// Marks the value as present or gone on the host side.
    pub fn set_exists(&self, exists: bool) {
        let observers = {
            let mut inner = self.inner.borrow_mut();
            if inner.exists == exists {
                return;
            }
            inner.exists = exists;
            debug!("{} {}", inner.name, if exists { "exists" } else { "is gone" });
            inner.exists_observers.clone()
        };

        for observer in observers {
            observer(exists);
        }
    }

    /// Like [`ObservableValue::add_observer`], for existence.
    pub fn add_exists_observer(&self, observer: ExistsObserver) -> bool {
        let exists = {
            let mut inner = self.inner.borrow_mut();
            if inner.exists_observers.iter().any(|o| Rc::ptr_eq(o, &observer)) {
                return false;
            }
            inner.exists_observers.push(observer.clone());
            inner.exists
        };
        observer(exists);
        true
    }

    /// Registers an observer and immediately tells it the current value.
    ///
    /// Returns false if this exact observer was already registered.
    pub fn add_observer(&self, observer: ValueObserver) -> bool {
        let value = {
            let mut inner = self.inner.borrow_mut();
            if inner.observers.iter().any(|o| Rc::ptr_eq(o, &observer)) {
                return false;
            }
            inner.observers.push(observer.clone());
            inner.value
        };
        observer(value);
        true
    }

    pub fn clear_observers(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.observers.clear();
        inner.exists_observers.clear();
    }
}

impl Target for ObservableValue {
    /// Ignored while the value does not exist.
    fn adjust(&self, delta: f64) {
        if !ObservableValue::exists(self) {
            return;
        }
        self.set(self.get() + delta);
    }

    fn value(&self) -> Option<f64> {
        Some(self.get())
    }

    fn exists(&self) -> bool {
        ObservableValue::exists(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_set_clamps_and_notifies_on_change() {
        let value = ObservableValue::new("volume", 0.5);
        let calls = Rc::new(Cell::new(0));
        let last = Rc::new(Cell::new(-1.0));

        let (c, l) = (calls.clone(), last.clone());
        assert!(value.add_observer(Rc::new(move |v| {
            c.set(c.get() + 1);
            l.set(v);
        })));
        assert_eq!(calls.get(), 1);
        assert_eq!(last.get(), 0.5);

        value.set(2.0);
        assert_eq!(value.get(), 1.0);
        assert_eq!(calls.get(), 2);

        value.set(1.0);
        assert_eq!(calls.get(), 2);

        value.reset();
        assert_eq!(last.get(), 0.5);
    }

    #[test]
    fn test_duplicate_observer_is_rejected() {
        let value = ObservableValue::new("pan", 0.0);
        let observer: ValueObserver = Rc::new(|_| {});
        assert!(value.add_observer(observer.clone()));
        assert!(!value.add_observer(observer));
    }

    #[test]
    fn test_adjust_through_target() {
        let value = ObservableValue::new("send", 0.2);
        let target: Rc<dyn Target> = Rc::new(value.clone());
        target.adjust(0.3);
        assert!((value.get() - 0.5).abs() < 1e-9);
        target.adjust(-4.0);
        assert_eq!(target.value(), Some(0.0));
        value.set_exists(false);
        assert!(!target.exists());
        target.adjust(0.5);
        assert_eq!(value.get(), 0.0);
    }

    #[test]
    fn test_existence_is_observable() {
        let value = ObservableValue::new("device param", 0.0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = seen.clone();
        assert!(value.add_exists_observer(Rc::new(move |e| s.borrow_mut().push(e))));
        value.set_exists(false);
        value.set_exists(false);
        value.set_exists(true);
        assert_eq!(*seen.borrow(), vec![true, false, true]);
    }
}
