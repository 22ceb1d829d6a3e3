use crate::contracts::types::{InputSummary, TransactionIssue};
use crate::date::parse_transaction_date;
use crate::normalize::normalize_optional;
use crate::transaction::{RawTransaction, Transaction};

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBatch {
    pub transactions: Vec<Transaction>,
    pub issues: Vec<TransactionIssue>,
    pub summary: InputSummary,
}

/// Validates every record independently. A malformed required field leaves the record out of
/// `transactions`; a malformed optional field is reported and dropped while the record stays.
/// Neither aborts the rest of the batch.
pub fn validate_transactions(raw_rows: &[RawTransaction]) -> ValidatedBatch {
    let mut transactions = Vec::with_capacity(raw_rows.len());
    let mut issues = Vec::new();

    for (index, raw) in raw_rows.iter().enumerate() {
        let mut row_issues = Vec::new();

        let description = validate_description(index, raw.description.clone(), &mut row_issues);
        let amount = validate_amount(index, "amount", raw.amount.clone(), true, &mut row_issues);
        let date = validate_date(index, raw.date.clone(), &mut row_issues);
        let mut optional_issues = Vec::new();
        let running_balance = validate_amount(
            index,
            "running_balance",
            raw.running_balance.clone(),
            false,
            &mut optional_issues,
        );

        if !row_issues.is_empty() {
            issues.extend(row_issues);
            issues.extend(optional_issues);
            continue;
        }
        issues.extend(optional_issues);

        if let (Some(description), Some(amount), Some(date)) = (description, amount, date) {
            transactions.push(Transaction {
                index,
                description,
                amount,
                date,
                merchant_name: normalize_optional(raw.merchant_name.clone()),
                provider_category_primary: normalize_optional(
                    raw.provider_category_primary.clone(),
                ),
                provider_category_detailed: normalize_optional(
                    raw.provider_category_detailed.clone(),
                ),
                running_balance,
            });
        }
    }

    let rows_invalid = raw_rows.len() - transactions.len();

    ValidatedBatch {
        summary: InputSummary {
            rows_read: raw_rows.len(),
            rows_valid: transactions.len(),
            rows_invalid,
        },
        transactions,
        issues,
    }
}

fn validate_description(
    index: usize,
    value: Option<String>,
    issues: &mut Vec<TransactionIssue>,
) -> Option<String> {
    let normalized = normalize_optional(value);
    if normalized.is_none() {
        issues.push(TransactionIssue {
            index,
            field: "description".to_string(),
            code: "missing_required_field".to_string(),
            description: "description must be present and non-empty.".to_string(),
            expected: Some("non-empty string".to_string()),
            received: Some(String::new()),
        });
    }
    normalized
}

fn validate_date(
    index: usize,
    value: Option<String>,
    issues: &mut Vec<TransactionIssue>,
) -> Option<chrono::NaiveDate> {
    let Some(candidate) = normalize_optional(value) else {
        issues.push(TransactionIssue {
            index,
            field: "date".to_string(),
            code: "missing_required_field".to_string(),
            description: "date must be present and non-empty.".to_string(),
            expected: Some("YYYY-MM-DD or ISO-8601 datetime".to_string()),
            received: Some(String::new()),
        });
        return None;
    };

    let parsed = parse_transaction_date(&candidate);
    if parsed.is_none() {
        issues.push(TransactionIssue {
            index,
            field: "date".to_string(),
            code: "invalid_date".to_string(),
            description: format!("date must be an ISO-8601 calendar date; got \"{candidate}\""),
            expected: Some("YYYY-MM-DD or ISO-8601 datetime".to_string()),
            received: Some(candidate),
        });
    }
    parsed
}

fn validate_amount(
    index: usize,
    field: &str,
    value: Option<String>,
    required: bool,
    issues: &mut Vec<TransactionIssue>,
) -> Option<f64> {
    let Some(candidate) = normalize_optional(value) else {
        if required {
            issues.push(TransactionIssue {
                index,
                field: field.to_string(),
                code: "missing_required_field".to_string(),
                description: format!("{field} must be present and non-empty."),
                expected: Some("number (e.g. -42.15)".to_string()),
                received: Some(String::new()),
            });
        }
        return None;
    };

    let Ok(amount) = candidate.parse::<f64>() else {
        issues.push(invalid_number(index, field, candidate));
        return None;
    };

    if !amount.is_finite() {
        issues.push(invalid_number(index, field, candidate));
        return None;
    }

    if let Some(scale) = fractional_digits(&candidate)
        && scale > 2
    {
        issues.push(TransactionIssue {
            index,
            field: field.to_string(),
            code: "invalid_amount_scale".to_string(),
            description: format!(
                "{field} must use at most 2 decimal places; got {scale} decimal places."
            ),
            expected: Some("number with <= 2 decimal places (e.g. -42.15)".to_string()),
            received: Some(candidate),
        });
        return None;
    }

    Some(amount)
}

fn invalid_number(index: usize, field: &str, candidate: String) -> TransactionIssue {
    TransactionIssue {
        index,
        field: field.to_string(),
        code: "invalid_number".to_string(),
        description: format!("{field} must be numeric; got \"{candidate}\""),
        expected: Some("number (e.g. -42.15)".to_string()),
        received: Some(candidate),
    }
}

fn fractional_digits(value: &str) -> Option<usize> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (mantissa_raw, exponent_raw) = match trimmed.find(['e', 'E']) {
        Some(index) => (&trimmed[..index], Some(&trimmed[index + 1..])),
        None => (trimmed, None),
    };
    let exponent = if let Some(raw) = exponent_raw {
        raw.parse::<i32>().ok()?
    } else {
        0
    };

    let mantissa = mantissa_raw
        .strip_prefix('+')
        .or_else(|| mantissa_raw.strip_prefix('-'))
        .unwrap_or(mantissa_raw);
    if mantissa.is_empty() {
        return None;
    }

    let mut parts = mantissa.split('.');
    let whole = parts.next()?;
    let fractional = parts.next();
    if parts.next().is_some() {
        return None;
    }

    if !whole.chars().all(|character| character.is_ascii_digit()) {
        return None;
    }

    let base_scale = match fractional {
        Some(digits) => {
            if !digits.chars().all(|character| character.is_ascii_digit()) {
                return None;
            }
            if whole.is_empty() && digits.is_empty() {
                return None;
            }
            digits.len()
        }
        None => {
            if whole.is_empty() {
                return None;
            }
            0
        }
    };

    if exponent >= 0 {
        return Some(base_scale.saturating_sub(exponent as usize));
    }

    Some(base_scale.saturating_add(exponent.unsigned_abs() as usize))
}
