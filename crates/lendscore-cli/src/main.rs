mod cli;
mod dispatch;
mod output;
mod stdout_io;

use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use lendscore_engine::EngineError;
use stdout_io::write_stdout_text;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "LENDSCORE_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

const ROOT_HELP: &str = "lendscore - short-term lending decisions from bank transactions

Usage:
  lendscore <command>

Start here:
  lendscore score <path> --loan-amount 300 --loan-term 3
  lendscore categorize <path>
  lendscore config show

Run `lendscore --help` for every command.
";

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

fn run() -> Result<ExitCode, ExitCode> {
    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 {
        if write_stdout_text(ROOT_HELP).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let cli = match cli::Cli::try_parse() {
        Ok(value) => value,
        Err(err) => return handle_parse_error(&err, &raw_args),
    };
    let mode = output::mode_for_command(&cli.command);

    if let Err(error) = init_tracing(std::env::var(LOG_ENV_VAR).ok().as_deref()) {
        if output::print_failure(&error, mode).is_err() {
            return Err(ExitCode::from(2));
        }
        return Err(ExitCode::from(1));
    }

    match dispatch::dispatch(&cli) {
        Ok(success) => {
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(exit_code_for_error(&error))
        }
    }
}

fn handle_parse_error(err: &clap::Error, raw_args: &[String]) -> Result<ExitCode, ExitCode> {
    if matches!(
        err.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    ) {
        if write_stdout_text(&err.to_string()).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let clean_message = strip_clap_boilerplate(&err.to_string());
    let error =
        EngineError::invalid_argument_for_command(&clean_message, command_path_from_args(raw_args));
    if output::print_failure(&error, infer_requested_output_mode(raw_args)).is_err() {
        return Err(ExitCode::from(2));
    }
    Err(ExitCode::from(1))
}

/// Installs the stderr subscriber. Stdout carries only command output.
fn init_tracing(filter: Option<&str>) -> Result<(), EngineError> {
    let directives = filter.unwrap_or(DEFAULT_LOG_FILTER);
    let env_filter = EnvFilter::try_new(directives).map_err(|source| {
        EngineError::invalid_argument_with_recovery(
            &format!("{LOG_ENV_VAR} is not a valid log filter: {source}"),
            vec![format!(
                "Set {LOG_ENV_VAR} to a level such as `warn` or `lendscore_engine=debug`, or unset it."
            )],
        )
    })?;

    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init();
    Ok(())
}

/// Strips clap's trailing usage and "For more information" lines so the recovery steps are
/// the only guidance printed.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_start_matches("error: ").trim_end().to_string()
}

fn command_path_from_args(raw_args: &[String]) -> Option<&'static str> {
    let words = raw_args
        .iter()
        .skip(1)
        .filter(|value| !value.starts_with('-'))
        .map(String::as_str)
        .collect::<Vec<&str>>();

    match words.as_slice() {
        ["score", ..] => Some("score"),
        ["categorize", ..] => Some("categorize"),
        ["config", "show", ..] => Some("config show"),
        ["config", "validate", ..] => Some("config validate"),
        ["config", ..] => Some("config"),
        _ => None,
    }
}

fn infer_requested_output_mode(raw_args: &[String]) -> output::OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return output::OutputMode::Json;
    }
    output::OutputMode::Text
}

fn exit_code_for_error(error: &EngineError) -> ExitCode {
    if error.code.starts_with("internal_") {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

#[cfg(test)]
mod tests {
    use super::{command_path_from_args, init_tracing, strip_clap_boilerplate};

    #[test]
    fn clap_boilerplate_is_removed() {
        let message = "error: the following required arguments were not provided:\n  --loan-term <LOAN_TERM>\n\nUsage: lendscore score\n\nFor more information, try '--help'.";
        let cleaned = strip_clap_boilerplate(message);
        assert!(cleaned.starts_with("the following required arguments"));
        assert!(!cleaned.contains("Usage:"));
    }

    #[test]
    fn command_path_ignores_flags_and_values() {
        let args = ["lendscore", "config", "validate", "policy.json", "--json"]
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<String>>();
        assert_eq!(command_path_from_args(&args), Some("config validate"));

        let unknown = ["lendscore", "backtest"]
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<String>>();
        assert_eq!(command_path_from_args(&unknown), None);
    }

    #[test]
    fn bad_log_filter_is_invalid_argument() {
        let result = init_tracing(Some("lendscore_engine=verbose"));
        assert!(matches!(result, Err(ref error) if error.code == "invalid_argument"));
    }
}
