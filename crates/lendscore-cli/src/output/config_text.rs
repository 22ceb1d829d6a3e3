use std::io;

use serde_json::Value;

use super::format::{self, money, number, text};

pub fn render_config_show(data: &Value) -> io::Result<String> {
    let config = data
        .get("config")
        .ok_or_else(|| io::Error::other("config show output requires config"))?;

    let mut lines = vec![format!(
        "Scoring configuration {}",
        text(config.get("version"))
    )];
    lines.push(String::new());
    lines.extend(format::key_value_rows(
        &[
            ("Scoring source:", describe_source(data.get("scoring_source"))),
            ("Mapping source:", describe_source(data.get("mapping_source"))),
            ("Mapping entries:", number(data.get("mapping_entries"))),
            ("Rule groups:", number(data.get("rule_groups"))),
            (
                "Fuzzy matching:",
                match data.get("fuzzy_available").and_then(Value::as_bool) {
                    Some(true) => "available".to_string(),
                    _ => "unavailable".to_string(),
                },
            ),
        ],
        2,
    ));

    lines.push(String::new());
    lines.push("Hard declines:".to_string());
    lines.extend(format::key_value_rows(
        &[
            (
                "Min monthly income:",
                money(config.pointer("/hard_decline/min_monthly_income")),
            ),
            (
                "Max HCSTC lenders:",
                number(config.pointer("/hard_decline/max_active_hcstc_lenders")),
            ),
            (
                "Max gambling (%):",
                number(config.pointer("/hard_decline/max_gambling_percentage")),
            ),
            (
                "Max failed payments:",
                number(config.pointer("/hard_decline/max_failed_payments")),
            ),
        ],
        2,
    ));

    lines.push(String::new());
    lines.push("Decision bands:".to_string());
    lines.extend(format::key_value_rows(
        &[
            ("Approve at:", number(config.pointer("/decision/approve_min"))),
            ("Refer at:", number(config.pointer("/decision/refer_min"))),
        ],
        2,
    ));

    let terms = config
        .pointer("/product/available_terms")
        .and_then(Value::as_array)
        .map(|terms| {
            terms
                .iter()
                .map(|term| number(Some(term)))
                .collect::<Vec<String>>()
                .join(", ")
        })
        .unwrap_or_else(|| "-".to_string());
    lines.push(String::new());
    lines.push("Product:".to_string());
    lines.extend(format::key_value_rows(
        &[
            (
                "Amount range:",
                format!(
                    "{} - {}",
                    money(config.pointer("/product/min_loan_amount")),
                    money(config.pointer("/product/max_loan_amount"))
                ),
            ),
            ("Terms (months):", terms),
            (
                "Daily rate:",
                number(config.pointer("/product/daily_interest_rate")),
            ),
            (
                "Total cost cap:",
                number(config.pointer("/product/total_cost_cap")),
            ),
        ],
        2,
    ));

    lines.push(String::new());
    lines.push("Run `lendscore config show --json` for every threshold.".to_string());
    Ok(lines.join("\n"))
}

pub fn render_config_validate(data: &Value) -> io::Result<String> {
    let valid = data
        .get("valid")
        .and_then(Value::as_bool)
        .ok_or_else(|| io::Error::other("config validate output requires valid"))?;
    let verdict = if valid { "is valid" } else { "is invalid" };
    Ok(format!(
        "{} {verdict} (version {}).",
        text(data.get("source")),
        text(data.get("version"))
    ))
}

fn describe_source(source: Option<&Value>) -> String {
    let Some(source) = source.filter(|value| !value.is_null()) else {
        return "none".to_string();
    };
    let origin = text(source.get("origin")).replace('_', " ");
    match source.get("path").and_then(Value::as_str) {
        Some(path) => format!("{origin} ({path})"),
        None => origin,
    }
}
