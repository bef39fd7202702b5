use serde::Deserialize;
use twister_library::animation::AnimationState;
use twister_library::midi::{NUM_BANKS, NUM_KNOBS, Side};
use twister_library::palette::LAST_HUE_INDEX;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub(crate) struct Settings {
    pub client_name: String,
    /// Part of the Twister's port name, used for both input and output.
    pub device_port: String,
    /// Virtual output port on which knob values are published.
    pub virtual_port_name: String,
    pub sensitivity: f64,
    /// Scale used while a knob is in fine mode. Valid range: 0.01 to 1.
    pub fine_sensitivity: f64,
    /// Log a notification on every bank change.
    pub bank_popups: bool,
    /// Side buttons used for bank navigation. Valid values: "left", "right".
    pub bank_buttons: String,
    /// Animation of a latched knob's RGB light, e.g. "Strobe 1/1" or "Rainbow".
    pub hold_animation: String,
    /// Initial palette index per bank.
    pub knob_colors: Vec<u8>,
    /// Knobs per bank that get a parameter, counted from the top left. The
    /// rest stay dark.
    pub knobs_per_bank: usize,
    pub self_test: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client_name: "Twister Driver".to_string(),
            device_port: "Midi Fighter Twister".to_string(),
            virtual_port_name: "Twister Driver Out".to_string(),
            sensitivity: 1.0,
            fine_sensitivity: 0.25,
            bank_popups: false,
            bank_buttons: "left".to_string(),
            hold_animation: "Strobe 1/1".to_string(),
            // Violet, red, green, light blue
            knob_colors: vec![115, 86, 51, 14],
            knobs_per_bank: NUM_KNOBS,
            self_test: true,
        }
    }
}

pub(crate) fn parse_side(s: &str) -> Result<Side, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "left" => Ok(Side::Left),
        "right" => Ok(Side::Right),
        other => Err(format!("invalid bank_buttons={other:?} (expected: \"left\", \"right\")")),
    }
}

impl Settings {
    pub(crate) fn bank_button_side(&self) -> Result<Side, String> {
        parse_side(&self.bank_buttons)
    }

    pub(crate) fn hold_animation(&self) -> Result<AnimationState, String> {
        self.hold_animation.parse().map_err(|e| format!("{e}"))
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.client_name.is_empty() {
            return Err("Client name must not be empty".to_string());
        }

        if self.device_port.is_empty() {
            return Err("Device port must not be empty".to_string());
        }

        if self.virtual_port_name.is_empty() {
            return Err("Virtual port name must not be empty".to_string());
        }

        if !(self.sensitivity > 0.0) {
            return Err(format!("sensitivity must be positive (found {})", self.sensitivity));
        }

        if !(0.01..=1.0).contains(&self.fine_sensitivity) {
            return Err(format!(
                "fine_sensitivity must be between 0.01 and 1 (found {})",
                self.fine_sensitivity
            ));
        }

        let colors = self.knob_colors.len();
        if colors != NUM_BANKS {
            return Err(format!("There should be {NUM_BANKS} knob colors exactly (found {colors})"));
        }

        if self.knob_colors.iter().any(|c| *c > LAST_HUE_INDEX) {
            return Err(format!("Knob colors should be palette indices 0 to {LAST_HUE_INDEX}"));
        }

        if !(1..=NUM_KNOBS).contains(&self.knobs_per_bank) {
            return Err(format!(
                "knobs_per_bank must be between 1 and {NUM_KNOBS} (found {})",
                self.knobs_per_bank
            ));
        }

        self.bank_button_side()?;
        self.hold_animation()?;

        Ok(())
    }
}
