use std::str::FromStr;

use log::info;

use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayCommand {
    On,
    Off,
}

impl FromStr for RelayCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relay_on" => Ok(Self::On),
            "relay_off" => Ok(Self::Off),
            _ => Err(CommandError::Unknown(s.trim().to_string())),
        }
    }
}

pub trait Relay {
    fn set_state(&mut self, on: bool) -> anyhow::Result<()>;
}

/// Applies a command received from the command feed to the relay.
///
/// Unknown commands leave the relay untouched.
pub fn on_command<R: Relay>(relay: &mut R, cmd: &str) -> anyhow::Result<RelayCommand> {
    info!("Received command: {}", cmd.trim());

    let command: RelayCommand = cmd.parse()?;
    relay.set_state(command == RelayCommand::On)?;

    Ok(command)
}
