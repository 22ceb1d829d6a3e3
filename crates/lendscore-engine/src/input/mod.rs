pub(crate) mod parse;
pub(crate) mod source;
pub(crate) mod validate;

pub use parse::parse_transactions;
pub use validate::{ValidatedBatch, validate_transactions};

use crate::EngineError;
use crate::error::INPUT_HELP_COMMAND;

const REQUIRED_FIELDS: [(&str, &str); 3] = [
    ("description", "string"),
    ("amount", "number"),
    ("date", "date"),
];

const OPTIONAL_FIELDS: [(&str, &str); 4] = [
    ("merchant_name", "string|null"),
    ("provider_category_primary", "string|null"),
    ("provider_category_detailed", "string|null"),
    ("running_balance", "number|null"),
];

pub fn required_field_names() -> Vec<&'static str> {
    REQUIRED_FIELDS.iter().map(|(name, _)| *name).collect()
}

pub fn optional_field_names() -> Vec<&'static str> {
    OPTIONAL_FIELDS.iter().map(|(name, _)| *name).collect()
}

pub(crate) fn invalid_input_error(message: &str) -> EngineError {
    EngineError::invalid_argument_with_recovery(
        message,
        vec![
            "Provide transactions as a JSON array or a CSV file with a header row.".to_string(),
            format!("Run `{INPUT_HELP_COMMAND}` to review the transaction fields."),
        ],
    )
}
