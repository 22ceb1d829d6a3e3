mod balance;
mod income;
mod risk;
mod spending;
pub(crate) mod stats;
pub mod types;

pub use types::{
    AffordabilityMetrics, BalanceMetrics, DebtMetrics, ExpenseMetrics, FinancialMetrics,
    IncomeMetrics, RiskMetrics,
};

use tracing::debug;

use crate::categorize::engine::{Categorization, CategoryMatch};
use crate::config::scoring::ScoringConfig;
use crate::date::ObservationWindow;
use crate::income::RecurrenceIndex;
use crate::transaction::Transaction;

/// The loan under consideration, used for repayment-dependent metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanRequest {
    pub loan_amount: f64,
    pub loan_term: u32,
}

/// Transactions paired with their classification, plus the window they are measured over.
pub(crate) struct Ledger<'a> {
    entries: Vec<(&'a Transaction, &'a CategoryMatch)>,
    window: Option<ObservationWindow>,
    months: f64,
    recurrence: &'a RecurrenceIndex,
}

impl<'a> Ledger<'a> {
    fn new(
        transactions: &'a [Transaction],
        categorization: &'a Categorization,
        months_of_data: u32,
    ) -> Self {
        let entries = transactions
            .iter()
            .filter_map(|transaction| {
                categorization
                    .match_for(transaction.index)
                    .map(|matched| (transaction, matched))
            })
            .collect();
        Self {
            entries,
            window: categorization.window,
            months: f64::from(months_of_data.max(1)),
            recurrence: &categorization.recurrence,
        }
    }

    pub(crate) fn all(&self) -> impl Iterator<Item = (&'a Transaction, &'a CategoryMatch)> + '_ {
        self.entries.iter().copied()
    }

    pub(crate) fn in_window(
        &self,
    ) -> impl Iterator<Item = (&'a Transaction, &'a CategoryMatch)> + '_ {
        self.entries.iter().copied().filter(move |(transaction, _)| {
            self.window
                .is_some_and(|window| window.contains(transaction.date))
        })
    }

    pub(crate) fn within_days(
        &self,
        days: i64,
    ) -> impl Iterator<Item = (&'a Transaction, &'a CategoryMatch)> + '_ {
        self.entries.iter().copied().filter(move |(transaction, _)| {
            self.window
                .is_some_and(|window| window.within_lookback(transaction.date, days))
        })
    }

    pub(crate) fn window(&self) -> Option<ObservationWindow> {
        self.window
    }

    pub(crate) fn months(&self) -> f64 {
        self.months
    }

    pub(crate) fn recurrence(&self) -> &RecurrenceIndex {
        self.recurrence
    }
}

/// Aggregates a categorized batch into the six metric groups the scoring engine reads.
#[derive(Debug, Clone, Copy)]
pub struct MetricsCalculator<'c> {
    config: &'c ScoringConfig,
}

impl<'c> MetricsCalculator<'c> {
    pub fn new(config: &'c ScoringConfig) -> Self {
        Self { config }
    }

    pub fn calculate(
        &self,
        transactions: &[Transaction],
        categorization: &Categorization,
        months_of_data: u32,
        request: LoanRequest,
    ) -> FinancialMetrics {
        let ledger = Ledger::new(transactions, categorization, months_of_data);
        let income = income::income_metrics(&ledger, &self.config.categorization);
        let expenses = spending::expense_metrics(&ledger);
        let debt = spending::debt_metrics(&ledger);
        let affordability = spending::affordability_metrics(
            &income,
            &expenses,
            &debt,
            &self.config.product,
            request,
        );
        let balance = balance::balance_metrics(&ledger);
        let risk = risk::risk_metrics(&ledger, &income);

        debug!(
            effective_income = income.effective_monthly_income,
            debt_payments = debt.monthly_debt_payments,
            essential = expenses.monthly_essential_total,
            dti = affordability.debt_to_income_ratio,
            "metrics calculated"
        );

        FinancialMetrics {
            months_of_data,
            window: ledger.window(),
            income,
            expenses,
            debt,
            affordability,
            balance,
            risk,
        }
    }
}
