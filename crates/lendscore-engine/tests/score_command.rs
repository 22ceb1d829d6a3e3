mod support;

use lendscore_engine::commands::common::ConfigPaths;
use lendscore_engine::commands::score::{self, ScoreRunOptions};
use serde_json::{Value, json};
use support::testkit::{gambling_applicant, rows_json, salaried_applicant, temp_home, transaction};

fn score_payload(home: &std::path::Path, rows: &[Value], amount: f64, term: u32) -> Value {
    let result = score::run(ScoreRunOptions {
        path: Some("-".to_string()),
        loan_amount: amount,
        loan_term: term,
        months_of_data: None,
        application_ref: Some("app_fixture".to_string()),
        config: ConfigPaths {
            home_override: Some(home),
            ..ConfigPaths::default()
        },
        stdin_override: Some(rows_json(rows)),
    });
    assert!(result.is_ok());
    if let Ok(envelope) = result {
        assert!(envelope.ok);
        assert_eq!(envelope.command, "score");
        return envelope.data;
    }
    Value::Null
}

#[test]
fn salaried_applicant_is_approved_with_offer() {
    let temp = temp_home("lendscore-score-approve");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let data = score_payload(&home, &salaried_applicant(), 500.0, 4);
        assert_eq!(data["application_ref"], json!("app_fixture"));
        assert_eq!(data["decision"], json!("APPROVE"));
        assert_eq!(data["risk_level"], json!("LOW"));
        assert_eq!(data["score"]["status"], json!("computed"));
        assert_eq!(data["score_breakdown"]["tier"], json!("CLEAN"));
        assert_eq!(data["risk_flags"], json!(["low_debt_management"]));
        assert_eq!(data["config_version"], json!("scoring/v1"));
        assert_eq!(
            data["stage_trail"],
            json!(["start", "hard_decline_check", "point_scoring", "approve"])
        );

        let offer = &data["loan_offer"];
        assert_eq!(offer["approved_amount"], json!(500.0));
        assert_eq!(offer["approved_term"], json!(4));
        assert_eq!(offer["total_interest"], json!(486.4));
        assert_eq!(offer["monthly_repayment"], json!(246.6));
        assert_eq!(offer["tier_adjusted"], json!(false));

        let metrics = &data["metrics"];
        assert_eq!(metrics["income"]["effective_monthly_income"], json!(2500.0));
        assert_eq!(metrics["income"]["income_stability_score"], json!(90.0));
        assert_eq!(metrics["income"]["has_verifiable_income"], json!(true));
        assert_eq!(metrics["expenses"]["monthly_housing"], json!(800.0));
        assert_eq!(metrics["expenses"]["monthly_essential_total"], json!(1190.0));
        assert_eq!(metrics["debt"]["monthly_debt_payments"], json!(120.0));
        assert_eq!(metrics["affordability"]["debt_to_income_ratio"], json!(4.8));
        assert_eq!(metrics["balance"]["days_in_overdraft"], json!(0));
        assert_eq!(metrics["risk"]["savings_behavior_score"], json!(3));
        let gambling = metrics["risk"]["gambling_percentage"].as_f64();
        assert!(gambling.is_some_and(|share| share.abs() < f64::EPSILON && share.is_sign_positive()));
        assert_eq!(data["referral_reasons"], json!([]));

        assert_eq!(data["input"]["rows_valid"], json!(21));
        assert_eq!(data["source"]["kind"], json!("stdin"));
        assert_eq!(data["config_source"]["origin"], json!("builtin"));
    }
}

#[test]
fn heavy_gambling_short_circuits_to_decline() {
    let temp = temp_home("lendscore-score-gambling");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let data = score_payload(&home, &gambling_applicant(), 500.0, 4);
        assert_eq!(data["decision"], json!("DECLINE"));
        assert_eq!(data["risk_level"], json!("VERY_HIGH"));
        assert_eq!(data["score"], json!({ "status": "not_computed" }));
        assert_eq!(data["score_breakdown"], Value::Null);
        assert_eq!(data["loan_offer"], Value::Null);
        assert_eq!(
            data["stage_trail"],
            json!(["start", "hard_decline_check", "decline"])
        );
        let reasons = data["decline_reasons"].as_array().cloned().unwrap_or_default();
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0]["code"], json!("gambling_above_maximum"));
        assert_eq!(reasons[0]["threshold"], json!(15.0));
    }
}

#[test]
fn malformed_rows_are_reported_and_skipped() {
    let temp = temp_home("lendscore-score-issues");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let mut rows = salaried_applicant();
        rows.push(json!({ "description": "BROKEN", "amount": "abc", "date": "2025-03-01" }));
        rows.push(transaction("NO DATE", 10.0, "03/01/2025"));
        let data = score_payload(&home, &rows, 500.0, 4);
        assert_eq!(data["input"]["rows_invalid"], json!(2));
        let issues = data["issues"].as_array().cloned().unwrap_or_default();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0]["index"], json!(21));
        assert_eq!(issues[0]["field"], json!("amount"));
        assert_eq!(issues[1]["field"], json!("date"));
        let notes = data["processing_notes"].as_array().cloned().unwrap_or_default();
        assert!(notes.contains(&json!("invalid_transactions_skipped=2")));
        assert_eq!(data["decision"], json!("APPROVE"));
    }
}

#[test]
fn loan_amount_outside_product_range_is_invalid_argument() {
    let temp = temp_home("lendscore-score-range");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let result = score::run(ScoreRunOptions {
            path: Some("-".to_string()),
            loan_amount: 5000.0,
            loan_term: 4,
            config: ConfigPaths {
                home_override: Some(&home),
                ..ConfigPaths::default()
            },
            stdin_override: Some(rows_json(&salaried_applicant())),
            ..ScoreRunOptions::default()
        });
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, "invalid_argument");
            assert!(error.message.contains("5000"));
        }
    }
}

#[test]
fn unavailable_term_and_months_are_rejected() {
    let temp = temp_home("lendscore-score-term");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        for (term, months) in [(12, None), (4, Some(0)), (4, Some(25))] {
            let result = score::run(ScoreRunOptions {
                path: Some("-".to_string()),
                loan_amount: 500.0,
                loan_term: term,
                months_of_data: months,
                config: ConfigPaths {
                    home_override: Some(&home),
                    ..ConfigPaths::default()
                },
                stdin_override: Some(rows_json(&salaried_applicant())),
                ..ScoreRunOptions::default()
            });
            assert!(matches!(result, Err(ref error) if error.code == "invalid_argument"));
        }
    }
}

#[test]
fn generated_application_ref_has_app_prefix() {
    let temp = temp_home("lendscore-score-ref");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let result = score::run(ScoreRunOptions {
            path: Some("-".to_string()),
            loan_amount: 500.0,
            loan_term: 4,
            config: ConfigPaths {
                home_override: Some(&home),
                ..ConfigPaths::default()
            },
            stdin_override: Some(rows_json(&salaried_applicant())),
            ..ScoreRunOptions::default()
        });
        assert!(result.is_ok());
        if let Ok(envelope) = result {
            let reference = envelope.data["application_ref"].as_str().unwrap_or_default();
            assert!(reference.starts_with("app_"));
        }
    }
}

fn decline_codes(data: &Value, field: &str) -> Vec<Value> {
    data[field]
        .as_array()
        .map(|reasons| reasons.iter().map(|reason| reason["code"].clone()).collect())
        .unwrap_or_default()
}

#[test]
fn lender_aliases_count_once_toward_the_hcstc_ceiling() {
    let temp = temp_home("lendscore-score-hcstc");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let mut rows = salaried_applicant();
        for (description, date) in [
            ("LENDING STREAM REPAYMENT", "2025-03-05"),
            ("LENDINGSTREAM", "2025-03-06"),
            ("DRAFTY LOAN REPAY", "2025-03-07"),
            ("MONEYBOAT", "2025-03-08"),
            ("QUIDMARKET LTD", "2025-03-09"),
            ("CASHFLOAT", "2025-03-10"),
            ("CREDITSPRING FEE", "2025-03-11"),
        ] {
            rows.push(transaction(description, 60.0, date));
        }
        let data = score_payload(&home, &rows, 500.0, 4);
        assert_eq!(data["metrics"]["debt"]["active_hcstc_count_90d"], json!(6));
        assert!(!decline_codes(&data, "decline_reasons").contains(&json!("too_many_hcstc_lenders")));

        rows.push(transaction("MR LENDER", 60.0, "2025-03-12"));
        let data = score_payload(&home, &rows, 500.0, 4);
        assert_eq!(data["metrics"]["debt"]["active_hcstc_count_90d"], json!(7));
        assert_eq!(data["decision"], json!("DECLINE"));
        assert_eq!(
            decline_codes(&data, "decline_reasons"),
            vec![json!("too_many_hcstc_lenders")]
        );
    }
}

#[test]
fn lookback_counts_include_the_cutoff_day() {
    let temp = temp_home("lendscore-score-lookback");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        // The latest row is the 2025-03-28 salary.
        let mut rows = salaried_applicant();
        rows.push(transaction("UNPAID ITEM CHARGE", 5.0, "2024-12-28"));
        rows.push(transaction("UNPAID ITEM CHARGE", 5.0, "2024-12-27"));
        rows.push(transaction("UNPAID DIRECT DEBIT", 95.0, "2025-02-11"));
        rows.push(transaction("UNPAID DIRECT DEBIT", 95.0, "2025-02-10"));
        let data = score_payload(&home, &rows, 500.0, 4);
        let risk = &data["metrics"]["risk"];
        assert_eq!(risk["bank_charges_count_90d"], json!(1));
        assert_eq!(risk["failed_payments_count_45d"], json!(1));
        assert_eq!(risk["failed_payments_count"], json!(2));
    }
}

#[test]
fn repeated_bank_charges_refer_an_approval() {
    let temp = temp_home("lendscore-score-charges");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let mut rows = salaried_applicant();
        for date in ["2025-03-04", "2025-03-11", "2025-03-18"] {
            rows.push(transaction("UNPAID ITEM CHARGE", 5.0, date));
        }
        let data = score_payload(&home, &rows, 500.0, 4);
        assert_eq!(data["metrics"]["risk"]["bank_charges_count_90d"], json!(3));
        assert_eq!(data["decision"], json!("REFER"));
        assert_eq!(data["score"]["status"], json!("computed"));
        assert_eq!(data["loan_offer"], Value::Null);
        assert_eq!(
            decline_codes(&data, "referral_reasons"),
            vec![json!("too_many_bank_charges")]
        );
        let notes = data["processing_notes"].as_array().cloned().unwrap_or_default();
        assert!(notes.ends_with(&[json!("policy_rule_referral"), json!("manual_review_required")]));
        assert_eq!(
            data["stage_trail"],
            json!(["start", "hard_decline_check", "point_scoring", "refer"])
        );
    }
}
