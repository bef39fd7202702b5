use crate::lights::ColorSupplier;
use crate::palette::{self, Color};
use crate::value::ObservableValue;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct OnOff {
    on_color: Cell<Color>,
    off_color: Cell<Color>,
    is_on: Cell<bool>,
}

/// Colour that switches between an "on" and an "off" colour, e.g. to dim a
/// knob whose target does not exist. Off defaults to black.
#[derive(Debug, Clone, Default)]
pub struct OnOffColorSupplier {
    inner: Rc<OnOff>,
}

impl OnOffColorSupplier {
    pub fn new(on_color: Color) -> Self {
        Self::with_colors(on_color, Color::BLACK)
    }

    pub fn with_colors(on_color: Color, off_color: Color) -> Self {
        let supplier = Self::default();
        supplier.set_on_color(on_color);
        supplier.set_off_color(off_color);
        supplier
    }

    pub fn set_on_color(&self, color: Color) {
        self.inner.on_color.set(color);
    }

    pub fn set_off_color(&self, color: Color) {
        self.inner.off_color.set(color);
    }

    pub fn set_on(&self, on: bool) {
        self.inner.is_on.set(on);
    }

    pub fn is_on(&self) -> bool {
        self.inner.is_on.get()
    }

    pub fn get(&self) -> Color {
        if self.is_on() {
            self.inner.on_color.get()
        } else {
            self.inner.off_color.get()
        }
    }

    /// The on colour follows a normalized value spread over the hue ramp
    /// (palette 0-125).
    pub fn observe_palette_position(&self, value: &ObservableValue) {
        let this = self.clone();
        value.add_observer(Rc::new(move |v| {
            let index = (v * palette::LAST_HUE_INDEX as f64).round() as u8;
            this.set_on_color(palette::palette_color(index));
        }));
    }

    /// On while `target` exists.
    pub fn observe_existence(&self, target: &ObservableValue) {
        let this = self.clone();
        target.add_exists_observer(Rc::new(move |exists| this.set_on(exists)));
    }

    /// A supplier closure for [`crate::lights::RgbLight::set_color_supplier`].
    pub fn supplier(&self) -> ColorSupplier {
        let this = self.clone();
        Rc::new(move || this.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PALETTE;

    #[test]
    fn test_switches_colors() {
        let colors = OnOffColorSupplier::new(PALETTE[43]);
        let supplier = colors.supplier();
        assert_eq!(supplier(), Color::BLACK);

        colors.set_on(true);
        assert_eq!(supplier(), PALETTE[43]);

        colors.set_on_color(PALETTE[85]);
        assert_eq!(supplier(), PALETTE[85]);

        colors.set_on(false);
        colors.set_off_color(PALETTE[1]);
        assert_eq!(supplier(), PALETTE[1]);
    }

    #[test]
    fn test_follows_value_and_existence() {
        let colors = OnOffColorSupplier::default();
        let hue = ObservableValue::new("hue", 0.0);
        let param = ObservableValue::new("param", 0.5);
        colors.observe_palette_position(&hue);
        colors.observe_existence(&param);
        assert_eq!(colors.get(), PALETTE[0]);

        hue.set(1.0);
        assert_eq!(colors.get(), PALETTE[125]);

        param.set_exists(false);
        assert_eq!(colors.get(), Color::BLACK);
        param.set_exists(true);
        assert_eq!(colors.get(), PALETTE[125]);
    }
}
