use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

pub(crate) const INPUT_HELP_COMMAND: &str = "lendscore score --help";

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct EngineError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl EngineError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `lendscore {cmd} --help` for usage."),
            None => "Run `lendscore --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    /// A request-level parameter outside the configured product bounds.
    pub fn invalid_request_field(field: &str, message: &str, allowed: Value) -> Self {
        Self::new(
            "invalid_argument",
            message,
            vec![
                format!("Adjust `{field}` to a value the product configuration allows."),
                "Run `lendscore config show` to inspect product bounds.".to_string(),
            ],
        )
        .with_data(json!({
            "field": field,
            "allowed": allowed,
        }))
    }

    pub fn invalid_input_format(message: &str, received_format: &str) -> Self {
        Self::new(
            "invalid_input_format",
            message,
            vec![
                "Provide transactions as a JSON array or a CSV file with a header row.".to_string(),
                format!("Run `{INPUT_HELP_COMMAND}` to review the transaction fields."),
            ],
        )
        .with_data(json!({
            "received_format": received_format,
            "supported_formats": ["json_array", "csv"],
        }))
    }

    pub fn input_schema_mismatch(
        required_headers: Vec<String>,
        optional_headers: Vec<String>,
        actual_headers: Vec<String>,
    ) -> Self {
        Self::new(
            "input_schema_mismatch",
            "CSV headers do not satisfy the transaction schema.",
            vec![
                "Include all required headers; optional headers may be omitted.".to_string(),
                "Do not include unknown headers.".to_string(),
                format!("Run `{INPUT_HELP_COMMAND}` to review required and optional fields."),
            ],
        )
        .with_data(json!({
            "required_headers": required_headers,
            "optional_headers": optional_headers,
            "actual_headers": actual_headers,
        }))
    }

    pub fn config_invalid(setting: &str, detail: &str) -> Self {
        Self::new(
            "config_invalid",
            &format!("Scoring configuration is invalid at `{setting}`: {detail}"),
            vec![
                format!("Fix `{setting}` in the configuration document."),
                "Run `lendscore config validate <path>` before scoring.".to_string(),
            ],
        )
        .with_data(json!({
            "setting": setting,
            "detail": detail,
        }))
    }

    pub fn config_unreadable(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "config_unreadable",
            &format!("Could not read scoring configuration `{location}`: {detail}"),
            vec![
                "Verify the path exists and contains a JSON configuration object.".to_string(),
                "Omit `--config` to use the built-in policy.".to_string(),
            ],
        )
        .with_data(json!({
            "path": location,
        }))
    }

    pub fn mapping_invalid(row: usize, field: &str, detail: &str) -> Self {
        Self::new(
            "mapping_invalid",
            &format!("Provider category mapping row {row} is invalid at `{field}`: {detail}"),
            vec![
                "Use internal category and subcategory names, e.g. `income,salary`.".to_string(),
                "Each subcategory must belong to the category named on the same row.".to_string(),
            ],
        )
        .with_data(json!({
            "row": row,
            "field": field,
            "detail": detail,
        }))
    }

    pub fn mapping_unreadable(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "mapping_unreadable",
            &format!("Could not read provider category mapping `{location}`: {detail}"),
            vec![
                "Provide a CSV with header `pfc_code,category,subcategory`.".to_string(),
                "Omit `--pfc-mapping` to categorize from patterns only.".to_string(),
            ],
        )
        .with_data(json!({
            "path": location,
        }))
    }

    pub fn pattern_invalid(pattern: &str, detail: &str) -> Self {
        Self::new(
            "pattern_invalid",
            &format!("Pattern `{pattern}` failed to compile: {detail}"),
            vec!["Correct the regular expression in the rule book.".to_string()],
        )
        .with_data(json!({
            "pattern": pattern,
        }))
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }

    pub fn internal_config_lock() -> Self {
        Self::new(
            "internal_config_lock",
            "Configuration snapshot lock was poisoned by a panicking writer.",
            vec!["Restart the process to rebuild the configuration snapshot.".to_string()],
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::EngineError;

    #[test]
    fn config_invalid_names_the_offending_setting() {
        let error = EngineError::config_invalid("decision.approve_min", "must exceed refer_min");
        assert_eq!(error.code, "config_invalid");
        assert!(error.message.contains("decision.approve_min"));
        assert_eq!(
            error
                .data
                .as_ref()
                .and_then(|data| data.get("setting"))
                .and_then(|value| value.as_str()),
            Some("decision.approve_min")
        );
    }

    #[test]
    fn command_scoped_invalid_argument_carries_hint() {
        let error = EngineError::invalid_argument_for_command("bad term", Some("score"));
        assert_eq!(error.recovery_steps.len(), 1);
        assert!(error.recovery_steps[0].contains("lendscore score --help"));
    }

    #[test]
    fn unreadable_config_mentions_path() {
        let error = EngineError::config_unreadable(Path::new("/tmp/missing.json"), "not found");
        assert!(error.message.contains("/tmp/missing.json"));
        assert_eq!(error.code, "config_unreadable");
    }
}
