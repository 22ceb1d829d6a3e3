use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::categorize::category::{Category, Subcategory};
use crate::categorize::matcher::{KEYWORD_CONFIDENCE, MatchMethod};
use crate::categorize::preprocess::{
    PreparedTransaction, TransferPair, TransferSettings, counterparty_identity,
    detect_transfer_pairs, prepare, provider_override,
};
use crate::categorize::summary::CategorySummary;
use crate::config::EngineConfig;
use crate::contracts::types::TransactionIssue;
use crate::date::ObservationWindow;
use crate::income::{
    CreditObservation, IncomeDetector, IncomeReason, IncomeVerdict, PatternEvidence,
    RecurrenceIndex,
};
use crate::transaction::Transaction;

pub const FUZZY_UNAVAILABLE_NOTE: &str = "fuzzy_matching_unavailable";

/// Final classification of one valid transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMatch {
    pub transaction_index: usize,
    pub category: Category,
    pub subcategory: Subcategory,
    pub confidence: f64,
    pub match_method: MatchMethod,
    pub matched_pattern: Option<String>,
    /// Canonical lender or sender fingerprint, used for distinct-counterparty metrics.
    pub counterparty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_verdict: Option<IncomeVerdict>,
}

impl CategoryMatch {
    pub fn counts_as_income(&self) -> bool {
        self.subcategory.counts_as_income()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Categorization {
    pub matches: Vec<CategoryMatch>,
    pub summary: CategorySummary,
    pub issues: Vec<TransactionIssue>,
    pub notes: Vec<String>,
    pub window: Option<ObservationWindow>,
    #[serde(skip)]
    pub recurrence: RecurrenceIndex,
}

impl Categorization {
    pub fn match_for(&self, transaction_index: usize) -> Option<&CategoryMatch> {
        self.matches
            .binary_search_by_key(&transaction_index, |matched| matched.transaction_index)
            .ok()
            .map(|position| &self.matches[position])
    }
}

/// Runs transfer pairing, provider overrides, the rule book and the income detector over a
/// validated batch.
#[derive(Debug, Clone, Copy)]
pub struct TransactionCategorizer<'c> {
    config: &'c EngineConfig,
}

impl<'c> TransactionCategorizer<'c> {
    pub fn new(config: &'c EngineConfig) -> Self {
        Self { config }
    }

    /// `transactions` must be in input order, as produced by validation.
    pub fn categorize(
        &self,
        transactions: &[Transaction],
        issues: Vec<TransactionIssue>,
        months_of_data: u32,
    ) -> Categorization {
        let settings = &self.config.scoring().categorization;
        let matcher = self.config.matcher();
        let prepared = prepare(transactions);
        let window = transactions
            .iter()
            .map(|transaction| transaction.date)
            .max()
            .map(|anchor| ObservationWindow::new(anchor, months_of_data));

        let pairs = detect_transfer_pairs(
            &prepared,
            matcher,
            self.config.rules(),
            TransferSettings {
                amount_tolerance: settings.transfer_amount_tolerance,
                window_days: settings.transfer_window_days,
            },
        );
        let paired = paired_indices(&pairs);

        let recurrence = window
            .map(|window| {
                RecurrenceIndex::build(
                    prepared
                        .iter()
                        .filter(|item| {
                            item.transaction.is_credit()
                                && !paired.contains(&item.transaction.index)
                        })
                        .map(|item| CreditObservation {
                            signature: &item.fingerprint,
                            date: item.transaction.date,
                            amount: item.transaction.amount,
                        }),
                    &window,
                    settings.recurrence_tolerance_pct,
                )
            })
            .unwrap_or_default();
        debug!(
            transactions = transactions.len(),
            transfer_pairs = pairs.len(),
            recurring_sources = recurrence.len(),
            "categorization preprocessing finished"
        );

        let detector = IncomeDetector::new(&recurrence);
        let matches = prepared
            .iter()
            .map(|item| self.classify(item, &paired, &detector))
            .collect::<Vec<CategoryMatch>>();
        let summary = CategorySummary::build(transactions, &matches);

        let mut notes = Vec::new();
        if !matcher.fuzzy_available() {
            warn!("fuzzy matching backend unavailable, keyword and regex stages only");
            notes.push(FUZZY_UNAVAILABLE_NOTE.to_string());
        }
        if !pairs.is_empty() {
            notes.push(format!("transfer_pairs_excluded={}", pairs.len()));
        }
        if summary.uncategorized_count > 0 {
            notes.push(format!(
                "uncategorized_transactions={}",
                summary.uncategorized_count
            ));
        }
        let skipped = skipped_rows(&issues, transactions);
        if skipped > 0 {
            notes.push(format!("invalid_transactions_skipped={skipped}"));
        }
        debug!(
            matched = matches.len(),
            uncategorized = summary.uncategorized_count,
            "categorization finished"
        );

        Categorization {
            matches,
            summary,
            issues,
            notes,
            window,
            recurrence,
        }
    }

    fn classify(
        &self,
        item: &PreparedTransaction<'_>,
        paired: &BTreeSet<usize>,
        detector: &IncomeDetector<'_>,
    ) -> CategoryMatch {
        let transaction = item.transaction;
        let counterparty = Some(counterparty_identity(item));

        if paired.contains(&transaction.index) {
            let income_verdict = transaction.is_credit().then(|| {
                detector.evaluate(transaction, &item.fingerprint, None, true)
            });
            return CategoryMatch {
                transaction_index: transaction.index,
                category: Category::Transfer,
                subcategory: Subcategory::Internal,
                confidence: KEYWORD_CONFIDENCE,
                match_method: MatchMethod::TransferPair,
                matched_pattern: None,
                counterparty,
                income_verdict,
            };
        }

        let claimed = provider_override(transaction, self.config.mapping())
            .map(|entry| {
                (
                    entry.subcategory,
                    KEYWORD_CONFIDENCE,
                    MatchMethod::ProviderOverride,
                    Some(entry.code.clone()),
                )
            })
            .or_else(|| {
                self.config
                    .matcher()
                    .classify(&item.text, transaction.amount, self.config.rules())
                    .map(|(group, hit)| {
                        (group.subcategory, hit.confidence, hit.method, Some(hit.pattern))
                    })
            });

        let Some((subcategory, confidence, method, pattern)) = claimed else {
            return self.unmatched(item, detector, counterparty);
        };

        let mut matched = CategoryMatch {
            transaction_index: transaction.index,
            category: subcategory.category(),
            subcategory,
            confidence,
            match_method: method,
            matched_pattern: pattern,
            counterparty,
            income_verdict: None,
        };

        if transaction.is_credit()
            && matches!(matched.category, Category::Income | Category::Transfer)
        {
            let verdict = detector.evaluate(
                transaction,
                &item.fingerprint,
                Some(PatternEvidence {
                    subcategory,
                    confidence,
                }),
                false,
            );
            if verdict.reason == IncomeReason::UnstablePatternUnconfirmed {
                matched.confidence = verdict.confidence;
            }
            matched.income_verdict = Some(verdict);
        }
        matched
    }

    fn unmatched(
        &self,
        item: &PreparedTransaction<'_>,
        detector: &IncomeDetector<'_>,
        counterparty: Option<String>,
    ) -> CategoryMatch {
        let transaction = item.transaction;
        let mut matched = CategoryMatch {
            transaction_index: transaction.index,
            category: Category::Uncategorized,
            subcategory: if transaction.is_credit() {
                Subcategory::UnmatchedCredit
            } else {
                Subcategory::UnmatchedDebit
            },
            confidence: 0.0,
            match_method: MatchMethod::None,
            matched_pattern: None,
            counterparty,
            income_verdict: None,
        };
        if !transaction.is_credit() {
            return matched;
        }

        let verdict = detector.evaluate(transaction, &item.fingerprint, None, false);
        if verdict.reason == IncomeReason::RecurringCredit {
            matched.category = Category::Income;
            matched.subcategory = Subcategory::OtherIncome;
            matched.confidence = verdict.confidence;
            matched.match_method = MatchMethod::Recurrence;
        }
        matched.income_verdict = Some(verdict);
        matched
    }
}

fn paired_indices(pairs: &[TransferPair]) -> BTreeSet<usize> {
    pairs
        .iter()
        .flat_map(|pair| [pair.first, pair.second])
        .collect()
}

/// Rows with issues that did not survive validation. Issues on optional fields keep the row.
fn skipped_rows(issues: &[TransactionIssue], kept: &[Transaction]) -> usize {
    let kept = kept
        .iter()
        .map(|transaction| transaction.index)
        .collect::<BTreeSet<usize>>();
    issues
        .iter()
        .map(|issue| issue.index)
        .filter(|index| !kept.contains(index))
        .collect::<BTreeSet<usize>>()
        .len()
}
