use midir::{MidiInput, MidiOutput};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DriverError {
    #[error("Couldn't initialise MIDI: {0}")]
    MidiInit(#[from] midir::InitError),
    #[error("Couldn't connect MIDI input: {0}")]
    InputConnect(#[from] midir::ConnectError<MidiInput>),
    #[error("Couldn't connect MIDI output: {0}")]
    OutputConnect(#[from] midir::ConnectError<MidiOutput>),
    #[error("Couldn't send to the Twister: {0}")]
    Send(#[from] midir::SendError),
    #[error("Couldn't read MIDI port info: {0}")]
    PortInfo(#[from] midir::PortInfoError),
    #[error("Couldn't install the Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),
    #[error("{0}")]
    Config(#[from] config::ConfigError),
    #[error("Couldn't find a MIDI {direction} port matching '{pattern}'")]
    PortNotFound {
        direction: &'static str,
        pattern: String,
    },
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}
