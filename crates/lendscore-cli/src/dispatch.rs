use lendscore_engine::commands;
use lendscore_engine::commands::categorize::CategorizeRunOptions;
use lendscore_engine::commands::common::ConfigPaths;
use lendscore_engine::commands::config::ConfigRunOptions;
use lendscore_engine::commands::score::ScoreRunOptions;
use lendscore_engine::{EngineResult, SuccessEnvelope};

use crate::cli::{Cli, Commands, ConfigCommand, SharedArgs};

pub fn dispatch(cli: &Cli) -> EngineResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Score {
            path,
            loan_amount,
            loan_term,
            application_ref,
            shared,
        } => commands::score::run(ScoreRunOptions {
            path: Some(path.clone()),
            loan_amount: *loan_amount,
            loan_term: *loan_term,
            months_of_data: shared.months_of_data,
            application_ref: application_ref.clone(),
            config: config_paths(shared),
            stdin_override: None,
        }),
        Commands::Categorize { path, shared } => commands::categorize::run(CategorizeRunOptions {
            path: Some(path.clone()),
            months_of_data: shared.months_of_data,
            config: config_paths(shared),
            stdin_override: None,
        }),
        Commands::Config { command } => match command {
            ConfigCommand::Show { config, .. } => commands::config::show(ConfigRunOptions {
                config: ConfigPaths {
                    config_path: config.as_deref(),
                    ..ConfigPaths::default()
                },
            }),
            ConfigCommand::Validate { path, .. } => commands::config::validate(path),
        },
    }
}

fn config_paths(shared: &SharedArgs) -> ConfigPaths<'_> {
    ConfigPaths {
        config_path: shared.config.as_deref(),
        mapping_path: shared.pfc_mapping.as_deref(),
        home_override: None,
    }
}
