use std::sync::Arc;

use serde_json::json;
use tracing::debug;
use ulid::Ulid;

use crate::categorize::{Categorization, TransactionCategorizer};
use crate::config::EngineConfig;
use crate::config::scoring::MAX_MONTHS_OF_DATA;
use crate::contracts::types::InputSummary;
use crate::input::validate_transactions;
use crate::metrics::{FinancialMetrics, LoanRequest, MetricsCalculator};
use crate::scoring::{ScoringEngine, ScoringResult};
use crate::transaction::{RawTransaction, Transaction};
use crate::{EngineError, EngineResult};

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRequest {
    pub transactions: Vec<RawTransaction>,
    pub loan_amount: f64,
    pub loan_term: u32,
    /// Falls back to `categorization.default_months_of_data`.
    pub months_of_data: Option<u32>,
    pub application_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    pub result: ScoringResult,
    pub metrics: FinancialMetrics,
    pub categorization: Categorization,
    pub input: InputSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorizeOutcome {
    pub categorization: Categorization,
    pub input: InputSummary,
    pub months_of_data: u32,
}

/// `transactions -> validate -> categorize -> metrics -> score` over one configuration snapshot.
#[derive(Debug, Clone)]
pub struct ScoringPipeline {
    config: Arc<EngineConfig>,
}

impl ScoringPipeline {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn run(&self, request: ScoreRequest) -> EngineResult<ScoreOutcome> {
        let scoring = self.config.scoring();
        let months_of_data = self.months_of_data(request.months_of_data)?;
        scoring.product.check_loan_amount(request.loan_amount)?;
        scoring.product.check_loan_term(request.loan_term)?;
        let application_ref = application_ref(request.application_ref);
        let loan = LoanRequest {
            loan_amount: request.loan_amount,
            loan_term: request.loan_term,
        };

        let (
            transactions,
            CategorizeOutcome {
                categorization,
                input,
                ..
            },
        ) = self.categorize_batch(&request.transactions, months_of_data);
        let metrics = MetricsCalculator::new(scoring).calculate(
            &transactions,
            &categorization,
            months_of_data,
            loan,
        );
        let mut result = ScoringEngine::new(scoring).score(&metrics, loan, &application_ref);
        result
            .processing_notes
            .splice(0..0, categorization.notes.iter().cloned());

        Ok(ScoreOutcome {
            result,
            metrics,
            categorization,
            input,
        })
    }

    pub fn categorize(
        &self,
        transactions: &[RawTransaction],
        months_of_data: Option<u32>,
    ) -> EngineResult<CategorizeOutcome> {
        let months_of_data = self.months_of_data(months_of_data)?;
        let (_, outcome) = self.categorize_batch(transactions, months_of_data);
        Ok(outcome)
    }

    fn categorize_batch(
        &self,
        transactions: &[RawTransaction],
        months_of_data: u32,
    ) -> (Vec<Transaction>, CategorizeOutcome) {
        let batch = validate_transactions(transactions);
        debug!(
            rows_read = batch.summary.rows_read,
            rows_invalid = batch.summary.rows_invalid,
            "input validated"
        );
        let categorization = TransactionCategorizer::new(&self.config).categorize(
            &batch.transactions,
            batch.issues,
            months_of_data,
        );
        (
            batch.transactions,
            CategorizeOutcome {
                categorization,
                input: batch.summary,
                months_of_data,
            },
        )
    }

    fn months_of_data(&self, requested: Option<u32>) -> EngineResult<u32> {
        let months = requested.unwrap_or(
            self.config
                .scoring()
                .categorization
                .default_months_of_data,
        );
        if (1..=MAX_MONTHS_OF_DATA).contains(&months) {
            return Ok(months);
        }
        Err(EngineError::invalid_request_field(
            "months_of_data",
            &format!("months_of_data {months} must be between 1 and {MAX_MONTHS_OF_DATA}."),
            json!({ "min": 1, "max": MAX_MONTHS_OF_DATA }),
        ))
    }
}

fn application_ref(requested: Option<String>) -> String {
    requested
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| format!("app_{}", Ulid::new()))
}
