use crate::cli::{Commands, ConfigCommand};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    match command {
        Commands::Score { shared, .. } | Commands::Categorize { shared, .. } => {
            OutputMode::from_flag(shared.json)
        }
        Commands::Config { command } => match command {
            ConfigCommand::Show { json, .. } | ConfigCommand::Validate { json, .. } => {
                OutputMode::from_flag(*json)
            }
        },
    }
}
