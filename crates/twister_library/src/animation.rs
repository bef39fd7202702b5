use num_derive::FromPrimitive;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The animation states a light can be put in.
///
/// Declaration order matters: the strobe and pulse states are assigned
/// consecutive wire codes in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
pub enum AnimationState {
    Off = 0,
    Strobe8_1,
    Strobe4_1,
    Strobe2_1,
    Strobe1_1,
    Strobe1_2,
    Strobe1_4,
    Strobe1_8,
    Strobe1_16,
    Pulse8_1,
    Pulse4_1,
    Pulse2_1,
    Pulse1_1,
    Pulse1_2,
    Pulse1_4,
    Pulse1_8,
    Pulse1_16,
    Rainbow,
}

pub const NUM_ANIMATION_STATES: usize = 18;

const OFF_CODE: u8 = 0;
const RAINBOW_CODE: u8 = 127;

impl AnimationState {
    /// Every state in declaration order.
    pub fn all() -> impl Iterator<Item = AnimationState> {
        (0..NUM_ANIMATION_STATES).filter_map(<Self as num::FromPrimitive>::from_usize)
    }

    /// Human readable name, also used as the option string in settings.
    pub fn option_str(&self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Strobe8_1 => "Strobe 8/1",
            Self::Strobe4_1 => "Strobe 4/1",
            Self::Strobe2_1 => "Strobe 2/1",
            Self::Strobe1_1 => "Strobe 1/1",
            Self::Strobe1_2 => "Strobe 1/2",
            Self::Strobe1_4 => "Strobe 1/4",
            Self::Strobe1_8 => "Strobe 1/8",
            Self::Strobe1_16 => "Strobe 1/16",
            Self::Pulse8_1 => "Pulse 8/1",
            Self::Pulse4_1 => "Pulse 4/1",
            Self::Pulse2_1 => "Pulse 2/1",
            Self::Pulse1_1 => "Pulse 1/1",
            Self::Pulse1_2 => "Pulse 1/2",
            Self::Pulse1_4 => "Pulse 1/4",
            Self::Pulse1_8 => "Pulse 1/8",
            Self::Pulse1_16 => "Pulse 1/16",
            Self::Rainbow => "Rainbow",
        }
    }
}

impl fmt::Display for AnimationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown animation state {0:?}")]
pub struct UnknownAnimation(pub String);

impl FromStr for AnimationState {
    type Err = UnknownAnimation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .find(|state| state.option_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownAnimation(s.to_string()))
    }
}

/// Wire codes for every animation state of one light variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationTable {
    codes: [u8; NUM_ANIMATION_STATES],
}

impl AnimationTable {
    /// Off is always 0 and rainbow always 127. The sixteen strobe and pulse
    /// states take `start..start + 16` in declaration order.
    pub fn new(start: u8) -> Self {
        assert!(
            start >= 1 && start as usize + 16 <= RAINBOW_CODE as usize,
            "animation range starting at {start} overlaps the reserved codes"
        );

        let mut codes = [0u8; NUM_ANIMATION_STATES];
        let mut next = start;
        for state in AnimationState::all() {
            codes[state as usize] = match state {
                AnimationState::Off => OFF_CODE,
                AnimationState::Rainbow => RAINBOW_CODE,
                _ => {
                    let code = next;
                    next += 1;
                    code
                }
            };
        }

        Self { codes }
    }

    pub fn code(&self, state: AnimationState) -> u8 {
        self.codes[state as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_table() {
        let table = AnimationTable::new(1);
        assert_eq!(table.code(AnimationState::Off), 0);
        assert_eq!(table.code(AnimationState::Rainbow), 127);
        assert_eq!(table.code(AnimationState::Strobe8_1), 1);
        assert_eq!(table.code(AnimationState::Strobe1_16), 8);
        assert_eq!(table.code(AnimationState::Pulse8_1), 9);
        assert_eq!(table.code(AnimationState::Pulse1_16), 16);
    }

    #[test]
    fn test_ring_table() {
        let table = AnimationTable::new(49);
        assert_eq!(table.code(AnimationState::Strobe8_1), 49);
        assert_eq!(table.code(AnimationState::Pulse1_16), 64);
        assert_eq!(table.code(AnimationState::Off), 0);
        assert_eq!(table.code(AnimationState::Rainbow), 127);
    }

    #[test]
    fn test_codes_are_unique() {
        let table = AnimationTable::new(49);
        let mut codes: Vec<u8> = AnimationState::all().map(|s| table.code(s)).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), NUM_ANIMATION_STATES);
    }

    #[test]
    #[should_panic]
    fn test_table_cannot_overlap_rainbow() {
        AnimationTable::new(120);
    }

    #[test]
    fn test_option_strings() {
        assert_eq!(AnimationState::all().count(), NUM_ANIMATION_STATES);
        assert_eq!("Strobe 1/1".parse(), Ok(AnimationState::Strobe1_1));
        assert_eq!(" pulse 1/16 ".parse(), Ok(AnimationState::Pulse1_16));
        assert_eq!(AnimationState::Rainbow.to_string(), "Rainbow");
        assert!("Sparkle".parse::<AnimationState>().is_err());
    }
}
