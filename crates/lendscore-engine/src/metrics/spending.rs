use std::collections::{BTreeMap, BTreeSet};

use crate::categorize::category::{Category, Subcategory};
use crate::categorize::engine::CategoryMatch;
use crate::categorize::preprocess::canonical_lender;
use crate::config::scoring::ProductConfig;
use crate::metrics::stats::{round1, round2};
use crate::metrics::types::{AffordabilityMetrics, DebtMetrics, ExpenseMetrics, IncomeMetrics};
use crate::metrics::{Ledger, LoanRequest};
use crate::normalize::normalize_for_matching;
use crate::transaction::Transaction;

const RECENT_CREDIT_DAYS: i64 = 90;
const DTI_WITHOUT_INCOME: f64 = 100.0;

/// Net outflow per subcategory of `category`, never below zero.
fn net_outflows(ledger: &Ledger<'_>, category: Category) -> BTreeMap<Subcategory, f64> {
    let mut totals: BTreeMap<Subcategory, f64> = BTreeMap::new();
    for (transaction, matched) in ledger.in_window() {
        if matched.category == category {
            *totals.entry(matched.subcategory).or_default() += transaction.amount;
        }
    }
    totals
        .into_iter()
        .map(|(subcategory, total)| (subcategory, total.max(0.0) / ledger.months()))
        .collect()
}

pub(crate) fn expense_metrics(ledger: &Ledger<'_>) -> ExpenseMetrics {
    let by_subcategory = net_outflows(ledger, Category::Essential);
    let rent = by_subcategory.get(&Subcategory::Rent).copied().unwrap_or(0.0);
    let mortgage = by_subcategory
        .get(&Subcategory::Mortgage)
        .copied()
        .unwrap_or(0.0);
    let housing = rent.max(mortgage);
    let non_housing = by_subcategory
        .iter()
        .filter(|(subcategory, _)| !matches!(subcategory, Subcategory::Rent | Subcategory::Mortgage))
        .fold(0.0_f64, |sum, (_, total)| sum + total);

    let uncategorized_outflow = ledger
        .in_window()
        .filter(|(_, matched)| matched.subcategory == Subcategory::UnmatchedDebit)
        .fold(0.0, |sum, (transaction, _)| sum + transaction.abs_amount());

    ExpenseMetrics {
        monthly_by_subcategory: by_subcategory
            .into_iter()
            .map(|(subcategory, total)| (subcategory, round2(total)))
            .collect(),
        monthly_housing: round2(housing),
        monthly_essential_total: round2(non_housing + housing),
        monthly_uncategorized_outflow: round2(uncategorized_outflow / ledger.months()),
    }
}

pub(crate) fn debt_metrics(ledger: &Ledger<'_>) -> DebtMetrics {
    let by_subcategory = net_outflows(ledger, Category::Debt);
    let total = by_subcategory.values().fold(0.0_f64, |sum, total| sum + total);

    let recent_lenders = hcstc_lenders(ledger.within_days(RECENT_CREDIT_DAYS));
    let all_lenders = hcstc_lenders(ledger.all());
    let credit_providers = ledger
        .within_days(RECENT_CREDIT_DAYS)
        .filter(|(_, matched)| matched.category == Category::Debt)
        .filter_map(|(_, matched)| matched.counterparty.as_deref())
        .collect::<BTreeSet<&str>>();

    DebtMetrics {
        monthly_debt_payments: round2(total),
        monthly_by_subcategory: by_subcategory
            .into_iter()
            .map(|(subcategory, total)| (subcategory, round2(total)))
            .collect(),
        active_hcstc_count_90d: count(recent_lenders.len()),
        active_hcstc_count: count(all_lenders.len()),
        credit_providers_90d: count(credit_providers.len()),
        hcstc_lenders_90d: recent_lenders.into_iter().collect(),
    }
}

/// Distinct lenders seen through HCSTC repayments or recognized HCSTC disbursements.
fn hcstc_lenders<'a>(
    entries: impl Iterator<Item = (&'a Transaction, &'a CategoryMatch)>,
) -> BTreeSet<String> {
    entries
        .filter_map(|(transaction, matched)| match matched.subcategory {
            Subcategory::HcstcPayday => matched.counterparty.clone(),
            Subcategory::LoanDisbursement => {
                canonical_lender(&normalize_for_matching(&transaction.description))
                    .map(str::to_string)
            }
            _ => None,
        })
        .collect()
}

pub(crate) fn affordability_metrics(
    income: &IncomeMetrics,
    expenses: &ExpenseMetrics,
    debt: &DebtMetrics,
    product: &ProductConfig,
    request: LoanRequest,
) -> AffordabilityMetrics {
    let effective_income = income.effective_monthly_income;
    let monthly_disposable =
        effective_income - expenses.monthly_essential_total - debt.monthly_debt_payments;
    let estimated_repayment = product.monthly_repayment(request.loan_amount, request.loan_term);
    let stressed_monthly_disposable = effective_income
        - expenses.monthly_essential_total * product.expense_shock_buffer
        - debt.monthly_debt_payments
        - expenses.monthly_uncategorized_outflow;

    AffordabilityMetrics {
        debt_to_income_ratio: income_ratio(debt.monthly_debt_payments, effective_income),
        monthly_disposable: round2(monthly_disposable),
        estimated_repayment: round2(estimated_repayment),
        post_loan_disposable: round2(monthly_disposable - estimated_repayment),
        max_affordable_amount: product.max_affordable_amount(monthly_disposable, request.loan_term),
        projected_debt_to_income_ratio: income_ratio(
            debt.monthly_debt_payments + estimated_repayment,
            effective_income,
        ),
        stressed_monthly_disposable: round2(stressed_monthly_disposable),
    }
}

fn income_ratio(outgoing: f64, effective_income: f64) -> f64 {
    if effective_income <= 0.0 {
        DTI_WITHOUT_INCOME
    } else {
        round1(outgoing / effective_income * 100.0)
    }
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
