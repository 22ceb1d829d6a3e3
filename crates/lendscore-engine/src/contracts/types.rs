use serde::Serialize;

use crate::categorize::{CategoryMatch, CategorySummary};
use crate::config::ConfigSource;
use crate::config::scoring::ScoringConfig;
use crate::date::ObservationWindow;
use crate::metrics::FinancialMetrics;
use crate::scoring::ScoringResult;

/// A transaction that could not be used, reported against its 0-based input position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionIssue {
    pub index: usize,
    pub field: String,
    pub code: String,
    pub description: String,
    pub expected: Option<String>,
    pub received: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InputSummary {
    pub rows_read: usize,
    pub rows_valid: usize,
    pub rows_invalid: usize,
}

/// Where the transactions came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputSource {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreData {
    #[serde(flatten)]
    pub result: ScoringResult,
    pub metrics: FinancialMetrics,
    pub category_summary: CategorySummary,
    pub issues: Vec<TransactionIssue>,
    pub input: InputSummary,
    pub source: InputSource,
    pub config_source: ConfigSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorizeData {
    pub months_of_data: u32,
    pub window: Option<ObservationWindow>,
    pub matches: Vec<CategoryMatch>,
    pub summary: CategorySummary,
    pub issues: Vec<TransactionIssue>,
    pub notes: Vec<String>,
    pub input: InputSummary,
    pub source: InputSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigShowData {
    pub config: ScoringConfig,
    pub scoring_source: ConfigSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping_source: Option<ConfigSource>,
    pub mapping_entries: usize,
    pub rule_groups: usize,
    pub fuzzy_available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigValidateData {
    pub valid: bool,
    pub version: String,
    pub source: String,
}
