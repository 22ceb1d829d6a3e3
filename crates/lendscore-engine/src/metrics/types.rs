use std::collections::BTreeMap;

use serde::Serialize;

use crate::categorize::category::Subcategory;
use crate::date::ObservationWindow;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IncomeMetrics {
    pub monthly_income: f64,
    pub monthly_stable_income: f64,
    pub monthly_gig_income: f64,
    /// Weighted contribution of unmatched credits.
    pub monthly_uncategorized_income: f64,
    pub monthly_income_by_subcategory: BTreeMap<Subcategory, f64>,
    pub detected_monthly_income: f64,
    pub effective_monthly_income: f64,
    pub income_stability_score: f64,
    pub income_regularity_score: f64,
    pub has_verifiable_income: bool,
    pub income_source_count: u32,
    pub recurring_source_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExpenseMetrics {
    pub monthly_by_subcategory: BTreeMap<Subcategory, f64>,
    pub monthly_housing: f64,
    pub monthly_essential_total: f64,
    pub monthly_uncategorized_outflow: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DebtMetrics {
    pub monthly_debt_payments: f64,
    pub monthly_by_subcategory: BTreeMap<Subcategory, f64>,
    pub active_hcstc_count_90d: u32,
    pub active_hcstc_count: u32,
    pub credit_providers_90d: u32,
    pub hcstc_lenders_90d: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AffordabilityMetrics {
    pub debt_to_income_ratio: f64,
    pub monthly_disposable: f64,
    pub estimated_repayment: f64,
    pub post_loan_disposable: f64,
    pub max_affordable_amount: f64,
    /// Debt payments plus the requested repayment over income, in percent.
    pub projected_debt_to_income_ratio: f64,
    /// Disposable income with essentials scaled by the expense shock buffer and unmatched
    /// spending taken off.
    pub stressed_monthly_disposable: f64,
}

/// Absent when the input carried no running balances.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BalanceMetrics {
    pub average_balance: Option<f64>,
    pub minimum_balance: Option<f64>,
    pub days_in_overdraft: Option<u32>,
    pub overdraft_episodes: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RiskMetrics {
    pub gambling_percentage: f64,
    pub monthly_gambling_outflow: f64,
    pub failed_payments_count: u32,
    pub failed_payments_count_45d: u32,
    pub bank_charges_count_90d: u32,
    pub debt_collection_distinct: u32,
    pub savings_behavior_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialMetrics {
    pub months_of_data: u32,
    pub window: Option<ObservationWindow>,
    pub income: IncomeMetrics,
    pub expenses: ExpenseMetrics,
    pub debt: DebtMetrics,
    pub affordability: AffordabilityMetrics,
    pub balance: BalanceMetrics,
    pub risk: RiskMetrics,
}
