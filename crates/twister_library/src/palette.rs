//! The Twister's fixed colour palette and colour quantization.
//!
//! The RGB lights cannot show arbitrary colours. They accept a palette index
//! (0-127) whose colours come straight from the device firmware. Index 0 turns
//! the override off and falls back to the "off colour" configured in the MIDI
//! Fighter Utility, 127 forces the configured "on colour". Index 126 should be an
//! override colour according to the manual, but a firmware bug makes it behave
//! like 127. The table keeps the firmware's entry for it regardless.

/// An 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = rgb(0, 0, 0);
    pub const WHITE: Color = rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a colour from 0-1 components, as hosts usually store them.
    pub fn from_rgb_f64(r: f64, g: f64, b: f64) -> Self {
        let to_byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgb(to_byte(r), to_byte(g), to_byte(b))
    }

    /// Hue and saturation, both in [0, 1]. Hue is 0 for desaturated colours.
    pub fn hue_saturation(&self) -> (f64, f64) {
        let (r, g, b) = (self.r as f64, self.g as f64, self.b as f64);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);

        if max == 0.0 || max == min {
            return (0.0, 0.0);
        }

        let range = max - min;
        let saturation = range / max;
        let red_c = (max - r) / range;
        let green_c = (max - g) / range;
        let blue_c = (max - b) / range;

        let hue = if r == max {
            blue_c - green_c
        } else if g == max {
            2.0 + red_c - blue_c
        } else {
            4.0 + green_c - red_c
        } / 6.0;

        let hue = if hue < 0.0 { hue + 1.0 } else { hue };
        (hue, saturation)
    }
}

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::rgb(r, g, b)
}

pub const PALETTE_SIZE: usize = 128;

/// Index that disables the override and shows the configured off colour.
pub const OFF_INDEX: u8 = 0;
/// Index that forces the configured on colour.
pub const ON_INDEX: u8 = 127;
/// Last index of the hue ramp.
pub const LAST_HUE_INDEX: u8 = 125;

/// All 128 colours from the device firmware, indexed by MIDI value.
///
/// 1 is pure blue, the ramp then runs through green (43), yellow (64), red (85)
/// and magenta (107) before returning towards blue at 125.
pub const PALETTE: [Color; PALETTE_SIZE] = [
    rgb(0, 0, 0), rgb(0, 0, 255), rgb(0, 21, 255), rgb(0, 34, 255), // 0-3
    rgb(0, 46, 255), rgb(0, 59, 255), rgb(0, 68, 255), rgb(0, 80, 255), // 4-7
    rgb(0, 93, 255), rgb(0, 106, 255), rgb(0, 119, 255), rgb(0, 127, 255), // 8-11
    rgb(0, 140, 255), rgb(0, 153, 255), rgb(0, 165, 255), rgb(0, 178, 255), // 12-15
    rgb(0, 191, 255), rgb(0, 199, 255), rgb(0, 212, 255), rgb(0, 225, 255), // 16-19
    rgb(0, 238, 255), rgb(0, 250, 255), rgb(0, 255, 250), rgb(0, 255, 237), // 20-23
    rgb(0, 255, 225), rgb(0, 255, 212), rgb(0, 255, 199), rgb(0, 255, 191), // 24-27
    rgb(0, 255, 178), rgb(0, 255, 165), rgb(0, 255, 153), rgb(0, 255, 140), // 28-31
    rgb(0, 255, 127), rgb(0, 255, 119), rgb(0, 255, 106), rgb(0, 255, 93), // 32-35
    rgb(0, 255, 80), rgb(0, 255, 67), rgb(0, 255, 59), rgb(0, 255, 46), // 36-39
    rgb(0, 255, 33), rgb(0, 255, 21), rgb(0, 255, 8), rgb(0, 255, 0), // 40-43
    rgb(12, 255, 0), rgb(25, 255, 0), rgb(38, 255, 0), rgb(51, 255, 0), // 44-47
    rgb(63, 255, 0), rgb(72, 255, 0), rgb(84, 255, 0), rgb(97, 255, 0), // 48-51
    rgb(110, 255, 0), rgb(123, 255, 0), rgb(131, 255, 0), rgb(144, 255, 0), // 52-55
    rgb(157, 255, 0), rgb(170, 255, 0), rgb(182, 255, 0), rgb(191, 255, 0), // 56-59
    rgb(203, 255, 0), rgb(216, 255, 0), rgb(229, 255, 0), rgb(242, 255, 0), // 60-63
    rgb(255, 255, 0), rgb(255, 246, 0), rgb(255, 233, 0), rgb(255, 220, 0), // 64-67
    rgb(255, 208, 0), rgb(255, 195, 0), rgb(255, 187, 0), rgb(255, 174, 0), // 68-71
    rgb(255, 161, 0), rgb(255, 148, 0), rgb(255, 135, 0), rgb(255, 127, 0), // 72-75
    rgb(255, 114, 0), rgb(255, 102, 0), rgb(255, 89, 0), rgb(255, 76, 0), // 76-79
    rgb(255, 63, 0), rgb(255, 55, 0), rgb(255, 42, 0), rgb(255, 29, 0), // 80-83
    rgb(255, 16, 0), rgb(255, 4, 0), rgb(255, 0, 4), rgb(255, 0, 16), // 84-87
    rgb(255, 0, 29), rgb(255, 0, 42), rgb(255, 0, 55), rgb(255, 0, 63), // 88-91
    rgb(255, 0, 76), rgb(255, 0, 89), rgb(255, 0, 102), rgb(255, 0, 114), // 92-95
    rgb(255, 0, 127), rgb(255, 0, 135), rgb(255, 0, 148), rgb(255, 0, 161), // 96-99
    rgb(255, 0, 174), rgb(255, 0, 186), rgb(255, 0, 195), rgb(255, 0, 208), // 100-103
    rgb(255, 0, 221), rgb(255, 0, 233), rgb(255, 0, 246), rgb(255, 0, 255), // 104-107
    rgb(242, 0, 255), rgb(229, 0, 255), rgb(216, 0, 255), rgb(204, 0, 255), // 108-111
    rgb(191, 0, 255), rgb(182, 0, 255), rgb(169, 0, 255), rgb(157, 0, 255), // 112-115
    rgb(144, 0, 255), rgb(131, 0, 255), rgb(123, 0, 255), rgb(110, 0, 255), // 116-119
    rgb(97, 0, 255), rgb(85, 0, 255), rgb(72, 0, 255), rgb(63, 0, 255), // 120-123
    rgb(50, 0, 255), rgb(38, 0, 255), rgb(25, 0, 255), rgb(240, 240, 225), // 124-127
];

/// Palette indices closest to the usual eight DAW parameter colours, tuned by eye.
pub const PARAMETER_COLORS: [u8; 8] = [86, 70, 64, 51, 37, 14, 111, 97];

/// Exact palette lookup.
pub fn palette_index(color: Color) -> Option<u8> {
    PALETTE.iter().position(|c| *c == color).map(|i| i as u8)
}

/// Palette colour at `index`, clamped into the table.
pub fn palette_color(index: u8) -> Color {
    PALETTE[(index as usize).min(PALETTE_SIZE - 1)]
}

/// Result of mapping a requested colour onto the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantized {
    pub index: u8,
    /// What the device will actually display.
    pub color: Color,
}

/// Maps any colour to a palette index. Never fails.
///
/// Exact palette entries keep their index. Everything else is placed on the hue
/// ramp, which is anchored so that hue 2/3 (blue) lands on index 1. Colours
/// without saturation cannot be shown and turn the override off.
pub fn quantize(color: Color) -> Quantized {
    if let Some(index) = palette_index(color) {
        return Quantized { index, color };
    }

    let (hue, saturation) = color.hue_saturation();

    if saturation <= 0.0 {
        return Quantized {
            index: OFF_INDEX,
            color: Color::BLACK,
        };
    }

    const BLUE_HUE: f64 = 2.0 / 3.0;
    let ramp = (125.0 * (BLUE_HUE - hue) + 1.0).round() as i64;
    let index = ramp.rem_euclid(126).clamp(0, LAST_HUE_INDEX as i64) as u8;

    Quantized { index, color }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_keeps_index() {
        assert_eq!(quantize(Color::rgb(0, 255, 0)).index, 43);
        assert_eq!(quantize(PALETTE[126]).index, 126);
        assert_eq!(quantize(PALETTE[127]).index, 127);
        for (i, color) in PALETTE.iter().enumerate() {
            assert_eq!(palette_index(*color), Some(i as u8));
        }
    }

    #[test]
    fn test_desaturated_turns_off() {
        let gray = quantize(Color::rgb(128, 128, 128));
        assert_eq!(gray.index, 0);
        assert_eq!(gray.color, Color::BLACK);
        assert_eq!(quantize(Color::WHITE).index, 0);
        assert_eq!(quantize(Color::BLACK).index, 0);
    }

    #[test]
    fn test_blue_hue_lands_near_start_of_ramp() {
        // Off-palette but still hue 2/3.
        let q = quantize(Color::rgb(10, 10, 200));
        assert_eq!(q.index, 1);
        assert_eq!(q.color, Color::rgb(10, 10, 200));
    }

    #[test]
    fn test_hue_ramp_follows_palette() {
        // A darker red sits on the red part of the ramp.
        let red = quantize(Color::rgb(200, 0, 0)).index;
        assert!((84..=86).contains(&red), "red mapped to {red}");

        let green = quantize(Color::rgb(0, 200, 0)).index;
        assert!((42..=44).contains(&green), "green mapped to {green}");

        let yellow = quantize(Color::rgb(200, 200, 0)).index;
        assert!((63..=65).contains(&yellow), "yellow mapped to {yellow}");
    }

    #[test]
    fn test_ramp_wraps_below_blue() {
        // Hue slightly above 2/3 wraps to the end of the ramp, never to 126.
        let q = quantize(Color::rgb(40, 0, 200));
        assert!(q.index <= LAST_HUE_INDEX);
        assert!(q.index >= 120, "violet-blue mapped to {}", q.index);
    }

    #[test]
    fn test_hue_saturation() {
        let (h, s) = Color::rgb(0, 0, 255).hue_saturation();
        assert!((h - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(s, 1.0);
        assert_eq!(Color::rgb(255, 0, 0).hue_saturation(), (0.0, 1.0));
        assert_eq!(Color::rgb(9, 9, 9).hue_saturation(), (0.0, 0.0));
    }

    #[test]
    fn test_from_rgb_f64() {
        assert_eq!(Color::from_rgb_f64(0.0, 1.0, 0.5), Color::rgb(0, 255, 128));
        assert_eq!(Color::from_rgb_f64(-1.0, 2.0, 0.0), Color::rgb(0, 255, 0));
    }
}
