use std::collections::HashMap;

use serde_json::Value;

use crate::input::{invalid_input_error, optional_field_names, required_field_names};
use crate::transaction::RawTransaction;
use crate::{EngineError, EngineResult};

/// Parses a JSON array of transaction objects or a CSV document with a header row.
///
/// Structural problems with the document as a whole are errors. Problems with
/// individual records are left for [`crate::input::validate_transactions`].
pub fn parse_transactions(content: &str) -> EngineResult<Vec<RawTransaction>> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(invalid_input_error("Transaction source is empty."));
    }

    if looks_like_ndjson(trimmed) {
        return Err(EngineError::invalid_input_format(
            "NDJSON is not supported. Provide a JSON array or CSV.",
            "ndjson",
        ));
    }

    if trimmed.starts_with('[') {
        return parse_json_array(trimmed);
    }

    if looks_like_csv(trimmed) {
        return parse_csv(trimmed);
    }

    if serde_json::from_str::<Value>(trimmed).is_ok() {
        return Err(EngineError::invalid_input_format(
            "JSON input must be a top-level array of transaction objects.",
            "json_non_array",
        ));
    }

    Err(EngineError::invalid_input_format(
        "Unsupported transaction format. Provide a JSON array or CSV with headers.",
        "unknown",
    ))
}

fn parse_json_array(content: &str) -> EngineResult<Vec<RawTransaction>> {
    let parsed = serde_json::from_str::<Value>(content)
        .map_err(|_| invalid_input_error("Invalid JSON input. Provide a valid JSON array."))?;

    let Some(items) = parsed.as_array() else {
        return Err(invalid_input_error(
            "JSON input must be a top-level array of transaction objects.",
        ));
    };

    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let Some(object) = item.as_object() else {
            return Err(invalid_input_error(
                "JSON array entries must all be objects with transaction fields.",
            ));
        };

        rows.push(RawTransaction {
            description: read_optional_string(object.get("description")),
            amount: read_optional_string(object.get("amount")),
            date: read_optional_string(object.get("date")),
            merchant_name: read_optional_string(object.get("merchant_name")),
            provider_category_primary: read_optional_string(
                object.get("provider_category_primary"),
            ),
            provider_category_detailed: read_optional_string(
                object.get("provider_category_detailed"),
            ),
            running_balance: read_optional_string(object.get("running_balance")),
        });
    }

    Ok(rows)
}

fn parse_csv(content: &str) -> EngineResult<Vec<RawTransaction>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|_| invalid_input_error("CSV header row is missing or unreadable."))?
        .iter()
        .map(|value| value.trim().to_string())
        .collect::<Vec<String>>();

    if !headers_are_valid(&headers) {
        return Err(EngineError::input_schema_mismatch(
            to_owned(required_field_names()),
            to_owned(optional_field_names()),
            headers,
        ));
    }

    let index_by_name = headers
        .iter()
        .enumerate()
        .map(|(index, name)| (name.to_string(), index))
        .collect::<HashMap<String, usize>>();

    let mut rows = Vec::new();
    for result_row in reader.records() {
        let record =
            result_row.map_err(|_| invalid_input_error("CSV rows are malformed or not UTF-8."))?;

        rows.push(RawTransaction {
            description: value_for(&record, &index_by_name, "description"),
            amount: value_for(&record, &index_by_name, "amount"),
            date: value_for(&record, &index_by_name, "date"),
            merchant_name: value_for(&record, &index_by_name, "merchant_name"),
            provider_category_primary: value_for(
                &record,
                &index_by_name,
                "provider_category_primary",
            ),
            provider_category_detailed: value_for(
                &record,
                &index_by_name,
                "provider_category_detailed",
            ),
            running_balance: value_for(&record, &index_by_name, "running_balance"),
        });
    }

    Ok(rows)
}

fn value_for(
    record: &csv::StringRecord,
    index_by_name: &HashMap<String, usize>,
    field_name: &str,
) -> Option<String> {
    let index = index_by_name.get(field_name)?;
    let value = record.get(*index)?;
    Some(value.to_string())
}

fn read_optional_string(value: Option<&Value>) -> Option<String> {
    let current = value?;

    if current.is_null() {
        return None;
    }

    if let Some(string_value) = current.as_str() {
        return Some(string_value.to_string());
    }

    if let Some(number_value) = current.as_f64() {
        return Some(number_value.to_string());
    }

    Some(current.to_string())
}

fn looks_like_ndjson(content: &str) -> bool {
    let lines = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<&str>>();
    if lines.len() < 2 {
        return false;
    }

    lines.iter().all(|line| {
        serde_json::from_str::<Value>(line.trim())
            .map(|value| value.is_object())
            .unwrap_or(false)
    })
}

fn looks_like_csv(content: &str) -> bool {
    let Some(first_line) = content.lines().find(|line| !line.trim().is_empty()) else {
        return false;
    };
    first_line.contains(',')
}

fn headers_are_valid(actual_headers: &[String]) -> bool {
    let required_fields = required_field_names();
    let optional_fields = optional_field_names();

    let has_required = required_fields
        .iter()
        .all(|required| actual_headers.iter().any(|value| value == required));
    let all_known = actual_headers.iter().all(|header| {
        required_fields.contains(&header.as_str()) || optional_fields.contains(&header.as_str())
    });

    has_required && all_known
}

fn to_owned(values: Vec<&'static str>) -> Vec<String> {
    values.into_iter().map(str::to_string).collect()
}
