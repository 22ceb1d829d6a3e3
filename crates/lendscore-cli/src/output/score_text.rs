use std::io;

use serde_json::Value;

use super::format::{self, Align, Column, money, number, string_list, text};

pub fn render_score(data: &Value) -> io::Result<String> {
    let decision = data
        .get("decision")
        .and_then(Value::as_str)
        .ok_or_else(|| io::Error::other("score output requires decision"))?;

    let score = match data.get("score") {
        Some(value) if value.get("status").and_then(Value::as_str) == Some("computed") => {
            number(value.get("value"))
        }
        _ => "not computed".to_string(),
    };

    let mut lines = vec![format!(
        "Application {}: {decision}",
        text(data.get("application_ref"))
    )];
    lines.push(String::new());
    let mut entries = vec![
        ("Score:", score),
        ("Risk level:", text(data.get("risk_level")).to_string()),
    ];
    if let Some(tier) = data.pointer("/score_breakdown/tier") {
        entries.push(("Tier:", text(Some(tier)).to_string()));
    }
    entries.push(("Config:", text(data.get("config_version")).to_string()));
    lines.extend(format::key_value_rows(&entries, 2));

    if let Some(offer) = data.get("loan_offer").filter(|offer| !offer.is_null()) {
        lines.push(String::new());
        lines.push("Loan offer:".to_string());
        lines.extend(render_offer(offer));
    }

    for (field, heading) in [
        ("decline_reasons", "Decline reasons:"),
        ("referral_reasons", "Referral reasons:"),
    ] {
        let reasons = data
            .get(field)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if !reasons.is_empty() {
            lines.push(String::new());
            lines.push(heading.to_string());
            for reason in &reasons {
                lines.push(format!("  - {}", text(reason.get("message"))));
            }
        }
    }

    if let Some(breakdown) = data.get("score_breakdown").filter(|value| !value.is_null()) {
        lines.push(String::new());
        lines.push("Score breakdown:".to_string());
        lines.extend(render_breakdown(breakdown));
    }

    let flags = string_list(data.get("risk_flags"));
    if !flags.is_empty() {
        lines.push(String::new());
        lines.push(format!("Risk flags: {}", flags.join(", ")));
    }

    lines.push(String::new());
    lines.push("Key metrics:".to_string());
    lines.extend(render_metrics(data.get("metrics").unwrap_or(&Value::Null)));

    lines.push(String::new());
    lines.extend(render_input_footer(data));

    let notes = string_list(data.get("processing_notes"));
    if !notes.is_empty() {
        lines.push(format!("Notes: {}", notes.join(", ")));
    }

    Ok(lines.join("\n"))
}

fn render_offer(offer: &Value) -> Vec<String> {
    let mut entries = vec![
        ("Amount:", money(offer.get("approved_amount"))),
        ("Term (months):", number(offer.get("approved_term"))),
        ("Monthly repayment:", money(offer.get("monthly_repayment"))),
        ("Total repayable:", money(offer.get("total_repayable"))),
        ("Total interest:", money(offer.get("total_interest"))),
        ("APR (%):", number(offer.get("apr"))),
    ];
    if offer.get("tier_adjusted").and_then(Value::as_bool) == Some(true) {
        entries.push(("Adjusted:", "reduced for risk tier".to_string()));
    }
    format::key_value_rows(&entries, 2)
}

fn render_breakdown(breakdown: &Value) -> Vec<String> {
    let columns = [
        Column {
            name: "Component",
            align: Align::Left,
        },
        Column {
            name: "Points",
            align: Align::Right,
        },
    ];
    let rows = [
        ("income quality", "/income_quality/total"),
        ("affordability", "/affordability/total"),
        ("account conduct", "/account_conduct/total"),
        ("risk indicators", "/risk_indicators/total"),
        ("total", "/total_score"),
    ]
    .iter()
    .map(|(label, pointer)| vec![(*label).to_string(), number(breakdown.pointer(pointer))])
    .collect::<Vec<Vec<String>>>();
    format::render_table(&columns, &rows, 2)
}

fn render_metrics(metrics: &Value) -> Vec<String> {
    let entries = [
        (
            "Effective income:",
            money(metrics.pointer("/income/effective_monthly_income")),
        ),
        (
            "Income stability:",
            number(metrics.pointer("/income/income_stability_score")),
        ),
        (
            "Essential spend:",
            money(metrics.pointer("/expenses/monthly_essential_total")),
        ),
        (
            "Debt payments:",
            money(metrics.pointer("/debt/monthly_debt_payments")),
        ),
        (
            "DTI (%):",
            number(metrics.pointer("/affordability/debt_to_income_ratio")),
        ),
        (
            "Disposable:",
            money(metrics.pointer("/affordability/monthly_disposable")),
        ),
        (
            "Max affordable:",
            money(metrics.pointer("/affordability/max_affordable_amount")),
        ),
        (
            "Gambling (%):",
            number(metrics.pointer("/risk/gambling_percentage")),
        ),
        (
            "Overdraft days:",
            number(metrics.pointer("/balance/days_in_overdraft")),
        ),
    ];
    format::key_value_rows(&entries, 2)
}

pub fn render_input_footer(data: &Value) -> Vec<String> {
    let mut lines = vec![format!(
        "Input: {} rows read, {} valid, {} invalid ({} {})",
        number(data.pointer("/input/rows_read")),
        number(data.pointer("/input/rows_valid")),
        number(data.pointer("/input/rows_invalid")),
        text(data.pointer("/source/kind")),
        text(data.pointer("/source/reference")),
    )];

    let issues = data
        .get("issues")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    for issue in issues.iter().take(10) {
        lines.push(format!(
            "  row {}: {} ({})",
            number(issue.get("index")),
            text(issue.get("description")),
            text(issue.get("field")),
        ));
    }
    if issues.len() > 10 {
        lines.push(format!("  ... {} more issues", issues.len() - 10));
    }
    lines
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::render_score;

    #[test]
    fn approve_renders_offer_and_breakdown() {
        let data = json!({
            "application_ref": "app_1",
            "decision": "APPROVE",
            "score": { "status": "computed", "value": 82.5 },
            "risk_level": "LOW",
            "score_breakdown": {
                "income_quality": { "total": 20.0 },
                "affordability": { "total": 30.0 },
                "account_conduct": { "total": 20.0 },
                "risk_indicators": { "total": 12.5 },
                "total_score": 82.5,
                "tier": "CLEAN"
            },
            "loan_offer": {
                "approved_amount": 300.0,
                "approved_term": 3,
                "monthly_repayment": 172.96,
                "total_repayable": 518.88,
                "total_interest": 218.88,
                "apr": 292.0,
                "tier_adjusted": false
            },
            "decline_reasons": [],
            "risk_flags": [],
            "processing_notes": [],
            "config_version": "scoring/v1",
            "metrics": { "income": { "effective_monthly_income": 1200.0 } },
            "input": { "rows_read": 3, "rows_valid": 3, "rows_invalid": 0 },
            "source": { "kind": "file", "reference": "rows.json" },
            "issues": []
        });

        let rendered = render_score(&data);
        assert!(rendered.is_ok());
        if let Ok(body) = rendered {
            assert!(body.starts_with("Application app_1: APPROVE"));
            assert!(body.contains("Score:       82.5"));
            assert!(body.contains("Monthly repayment:  172.96"));
            assert!(body.contains("Effective income:  1200.00"));
            assert!(body.contains("Input: 3 rows read, 3 valid, 0 invalid (file rows.json)"));
            assert!(!body.contains("Decline reasons:"));
        }
    }

    #[test]
    fn decline_renders_reasons_without_score() {
        let data = json!({
            "application_ref": "app_2",
            "decision": "DECLINE",
            "score": { "status": "not_computed" },
            "risk_level": "VERY_HIGH",
            "score_breakdown": null,
            "loan_offer": null,
            "decline_reasons": [
                { "code": "gambling_above_maximum", "message": "Gambling is 22.0% of income, above 15.0%." }
            ],
            "processing_notes": ["invalid_transactions_skipped=1"],
            "issues": [
                { "index": 4, "field": "date", "description": "date must use YYYY-MM-DD" }
            ]
        });

        let rendered = render_score(&data);
        assert!(rendered.is_ok());
        if let Ok(body) = rendered {
            assert!(body.contains("Score:       not computed"));
            assert!(body.contains("  - Gambling is 22.0% of income, above 15.0%."));
            assert!(body.contains("  row 4: date must use YYYY-MM-DD (date)"));
            assert!(body.contains("Notes: invalid_transactions_skipped=1"));
            assert!(!body.contains("Loan offer:"));
        }
    }

    #[test]
    fn refer_lists_referral_reasons() {
        let data = json!({
            "application_ref": "app_3",
            "decision": "REFER",
            "score": { "status": "computed", "value": 74.0 },
            "risk_level": "HIGH",
            "loan_offer": null,
            "decline_reasons": [],
            "referral_reasons": [
                { "code": "too_many_bank_charges", "message": "3 bank charges in the last 90 days exceeds the maximum 2." }
            ],
            "processing_notes": ["policy_rule_referral", "manual_review_required"]
        });

        let rendered = render_score(&data);
        assert!(rendered.is_ok());
        if let Ok(body) = rendered {
            assert!(body.contains("Referral reasons:"));
            assert!(body.contains("  - 3 bank charges in the last 90 days exceeds the maximum 2."));
            assert!(!body.contains("Decline reasons:"));
            assert!(body.contains("Notes: policy_rule_referral, manual_review_required"));
        }
    }

    #[test]
    fn missing_decision_is_an_error() {
        assert!(render_score(&json!({})).is_err());
    }
}
