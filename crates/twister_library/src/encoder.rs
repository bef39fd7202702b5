use crate::midi::MidiInfo;
use crate::value::Target;
use log::debug;
use std::cell::Cell;
use std::rc::Rc;

/// Wire value meaning "no movement" for a relative encoder.
pub const CENTER_VALUE: u8 = 64;
/// Encoder steps in one full rotation.
pub const FULL_ROTATION: f64 = 127.0;

pub const DEFAULT_SENSITIVITY: f64 = 1.0;
pub const DEFAULT_FINE_SENSITIVITY: f64 = 0.25;

/// Decodes a binary-offset relative value into a normalized delta.
pub fn decode_relative(value: u8) -> f64 {
    (value as f64 - CENTER_VALUE as f64) / FULL_ROTATION
}

/// Normal and fine sensitivity of one encoder.
///
/// Clones share state, so a gesture callback can hold one and toggle the
/// encoder it came from.
#[derive(Debug, Clone)]
pub struct Sensitivity {
    inner: Rc<SensitivityState>,
}

#[derive(Debug)]
struct SensitivityState {
    normal: Cell<f64>,
    fine: Cell<f64>,
    is_fine: Cell<bool>,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self {
            inner: Rc::new(SensitivityState {
                normal: Cell::new(DEFAULT_SENSITIVITY),
                fine: Cell::new(DEFAULT_FINE_SENSITIVITY),
                is_fine: Cell::new(false),
            }),
        }
    }
}

impl Sensitivity {
    /// Sets the regular factor. Takes effect at once if it is the active one.
    pub fn set_normal(&self, factor: f64) {
        self.inner.normal.set(factor);
    }

    /// Sets the fine factor. Takes effect at once if it is the active one.
    pub fn set_fine(&self, factor: f64) {
        self.inner.fine.set(factor);
    }

    pub fn toggle(&self) {
        self.inner.is_fine.set(!self.inner.is_fine.get());
        debug!("sensitivity {}", if self.is_fine() { "fine" } else { "normal" });
    }

    pub fn is_fine(&self) -> bool {
        self.inner.is_fine.get()
    }

    pub fn normal(&self) -> f64 {
        self.inner.normal.get()
    }

    pub fn fine(&self) -> f64 {
        self.inner.fine.get()
    }

    /// The scale applied to incoming deltas right now.
    pub fn effective(&self) -> f64 {
        if self.is_fine() { self.fine() } else { self.normal() }
    }
}

/// A relative encoder with normal and fine sensitivity.
pub struct Encoder {
    info: MidiInfo,
    sensitivity: Sensitivity,
    target: Option<Rc<dyn Target>>,
}

impl Encoder {
    pub fn new(info: MidiInfo) -> Self {
        Self {
            info,
            sensitivity: Sensitivity::default(),
            target: None,
        }
    }

    pub fn midi_info(&self) -> MidiInfo {
        self.info
    }

    pub fn sensitivity(&self) -> &Sensitivity {
        &self.sensitivity
    }

    pub fn set_sensitivity(&self, factor: f64) {
        self.sensitivity.set_normal(factor);
    }

    pub fn set_fine_sensitivity(&self, factor: f64) {
        self.sensitivity.set_fine(factor);
    }

    pub fn toggle_sensitivity(&self) {
        self.sensitivity.toggle();
    }

    pub fn is_fine(&self) -> bool {
        self.sensitivity.is_fine()
    }

    pub fn effective_sensitivity(&self) -> f64 {
        self.sensitivity.effective()
    }

    /// Binds the encoder to `target`, replacing any previous binding.
    pub fn set_binding(&mut self, target: Rc<dyn Target>) {
        self.target = Some(target);
    }

    pub fn clear_binding(&mut self) {
        self.target = None;
    }

    pub fn target(&self) -> Option<&Rc<dyn Target>> {
        self.target.as_ref()
    }

    /// Value of the bound target, if any.
    pub fn target_value(&self) -> Option<f64> {
        self.target.as_ref().and_then(|t| t.value())
    }

    /// Applies one wire value. Returns the adjustment forwarded, if any.
    pub fn handle_value(&self, value: u8) -> Option<f64> {
        let delta = decode_relative(value) * self.effective_sensitivity();
        if delta == 0.0 {
            return None;
        }

        let target = self.target.as_ref()?;
        target.adjust(delta);
        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ObservableValue;
    use approx::assert_relative_eq;

    fn bound_encoder(start: f64) -> (Encoder, ObservableValue) {
        let value = ObservableValue::new("param", start);
        let mut encoder = Encoder::new(MidiInfo::new(0, 0));
        encoder.set_binding(Rc::new(value.clone()));
        (encoder, value)
    }

    #[test]
    fn test_decode_relative() {
        assert_eq!(decode_relative(64), 0.0);
        assert_relative_eq!(decode_relative(65), 1.0 / 127.0);
        assert_relative_eq!(decode_relative(60), -4.0 / 127.0);
    }

    #[test]
    fn test_normal_and_fine_scaling() {
        let (encoder, value) = bound_encoder(0.5);

        encoder.handle_value(74);
        assert_relative_eq!(value.get(), 0.5 + 10.0 / 127.0);

        encoder.toggle_sensitivity();
        assert!(encoder.is_fine());
        encoder.handle_value(54);
        assert_relative_eq!(value.get(), 0.5 + 10.0 / 127.0 - 2.5 / 127.0);

        encoder.toggle_sensitivity();
        assert_eq!(encoder.effective_sensitivity(), 1.0);
    }

    #[test]
    fn test_shared_sensitivity_handle() {
        let (encoder, value) = bound_encoder(0.0);
        let handle = encoder.sensitivity().clone();
        handle.toggle();
        assert!(encoder.is_fine());
        encoder.handle_value(64 + 4);
        assert_relative_eq!(value.get(), 1.0 / 127.0);
    }

    #[test]
    fn test_setters_apply_to_active_scale() {
        let encoder = Encoder::new(MidiInfo::new(0, 0));
        encoder.set_fine_sensitivity(0.1);
        assert_eq!(encoder.effective_sensitivity(), 1.0);
        encoder.toggle_sensitivity();
        assert_eq!(encoder.effective_sensitivity(), 0.1);
        encoder.set_fine_sensitivity(0.5);
        assert_eq!(encoder.effective_sensitivity(), 0.5);
        encoder.set_sensitivity(2.0);
        assert_eq!(encoder.effective_sensitivity(), 0.5);
    }

    #[test]
    fn test_unbound_or_centered_does_nothing() {
        let encoder = Encoder::new(MidiInfo::new(0, 0));
        assert_eq!(encoder.handle_value(70), None);
        assert_eq!(encoder.target_value(), None);

        let (encoder, value) = bound_encoder(0.3);
        assert_eq!(encoder.handle_value(64), None);
        assert_eq!(value.get(), 0.3);
        assert_eq!(encoder.target_value(), Some(0.3));
    }
}
