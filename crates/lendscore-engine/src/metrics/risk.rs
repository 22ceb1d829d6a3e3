use std::collections::BTreeSet;

use crate::categorize::category::Subcategory;
use crate::metrics::Ledger;
use crate::metrics::stats::{round1, round2};
use crate::metrics::types::{IncomeMetrics, RiskMetrics};

const FAILED_PAYMENT_DAYS: i64 = 45;
const BANK_CHARGE_DAYS: i64 = 90;
const GAMBLING_WITHOUT_INCOME: f64 = 100.0;

pub(crate) fn risk_metrics(ledger: &Ledger<'_>, income: &IncomeMetrics) -> RiskMetrics {
    let gambling_outflow = ledger
        .in_window()
        .filter(|(transaction, matched)| {
            matched.subcategory == Subcategory::Gambling && transaction.is_debit()
        })
        .fold(0.0, |total, (transaction, _)| total + transaction.amount);
    let monthly_gambling_outflow = gambling_outflow / ledger.months();
    let gambling_percentage = gambling_share(monthly_gambling_outflow, income.effective_monthly_income);

    let failed_payments_count = ledger
        .in_window()
        .filter(|(_, matched)| matched.subcategory == Subcategory::FailedPayments)
        .count();
    let failed_payments_count_45d = ledger
        .within_days(FAILED_PAYMENT_DAYS)
        .filter(|(_, matched)| matched.subcategory == Subcategory::FailedPayments)
        .count();
    let bank_charges_count_90d = ledger
        .within_days(BANK_CHARGE_DAYS)
        .filter(|(_, matched)| matched.subcategory == Subcategory::BankCharges)
        .count();
    let debt_collection_distinct = ledger
        .in_window()
        .filter(|(_, matched)| matched.subcategory == Subcategory::DebtCollection)
        .filter_map(|(_, matched)| matched.counterparty.as_deref())
        .collect::<BTreeSet<&str>>()
        .len();

    RiskMetrics {
        gambling_percentage,
        monthly_gambling_outflow: round2(monthly_gambling_outflow),
        failed_payments_count: count(failed_payments_count),
        failed_payments_count_45d: count(failed_payments_count_45d),
        bank_charges_count_90d: count(bank_charges_count_90d),
        debt_collection_distinct: count(debt_collection_distinct),
        savings_behavior_score: savings_behavior_score(ledger),
    }
}

fn gambling_share(monthly_outflow: f64, effective_income: f64) -> f64 {
    if effective_income <= 0.0 {
        return if monthly_outflow > 0.0 {
            GAMBLING_WITHOUT_INCOME
        } else {
            0.0
        };
    }
    round1(monthly_outflow / effective_income * 100.0)
}

/// 0 none, 1 any, 2 across two or more rolling months, 3 in every month of a multi-month window.
fn savings_behavior_score(ledger: &Ledger<'_>) -> u8 {
    let Some(window) = ledger.window() else {
        return 0;
    };
    let mut active_months = BTreeSet::new();
    let mut any = false;
    for (transaction, matched) in ledger.in_window() {
        if matched.subcategory != Subcategory::Savings {
            continue;
        }
        any = true;
        if let Some(slot) = window.rolling_month_index(transaction.date) {
            active_months.insert(slot);
        }
    }

    let span = active_months.len();
    let months = window.months as usize;
    if !any {
        0
    } else if months >= 2 && span == months {
        3
    } else if span >= 2 {
        2
    } else {
        1
    }
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
