use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::categorize::category::Subcategory;
use crate::date::{ObservationWindow, month_key};
use crate::transaction::Transaction;

/// Confidence of a credit recognized only because it repeats.
/// Sits below the fuzzy floor so any pattern-backed verdict outranks it.
pub const RECURRING_CREDIT_CONFIDENCE: f64 = 0.65;
pub const UNCONFIRMED_PATTERN_PENALTY: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeReason {
    NotACredit,
    TransferOrRefund,
    PatternConfirmedByRecurrence,
    StablePattern,
    UnstablePatternUnconfirmed,
    RecurringCredit,
    NoIncomeSignal,
}

impl IncomeReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotACredit => "not_a_credit",
            Self::TransferOrRefund => "transfer_or_refund",
            Self::PatternConfirmedByRecurrence => "pattern_confirmed_by_recurrence",
            Self::StablePattern => "stable_pattern",
            Self::UnstablePatternUnconfirmed => "unstable_pattern_unconfirmed",
            Self::RecurringCredit => "recurring_credit",
            Self::NoIncomeSignal => "no_income_signal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IncomeVerdict {
    pub is_income: bool,
    pub confidence: f64,
    pub reason: IncomeReason,
}

impl IncomeVerdict {
    fn rejected(reason: IncomeReason) -> Self {
        Self {
            is_income: false,
            confidence: 0.0,
            reason,
        }
    }

    fn accepted(confidence: f64, reason: IncomeReason) -> Self {
        Self {
            is_income: true,
            confidence: round4(confidence.clamp(0.0, 1.0)),
            reason,
        }
    }
}

/// What the pattern matcher (or provider mapping) said about a credit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternEvidence {
    pub subcategory: Subcategory,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct CreditObservation<'a> {
    pub signature: &'a str,
    pub date: NaiveDate,
    pub amount: f64,
}

/// Sender signatures whose credits repeat across calendar months at a steady amount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecurrenceIndex {
    recurring: BTreeSet<String>,
}

impl RecurrenceIndex {
    /// A signature recurs when its in-window credits span at least two calendar months and
    /// every amount sits within `tolerance_pct` of the group median.
    pub fn build<'a>(
        credits: impl IntoIterator<Item = CreditObservation<'a>>,
        window: &ObservationWindow,
        tolerance_pct: f64,
    ) -> Self {
        let mut groups: BTreeMap<&str, (BTreeSet<(i32, u32)>, Vec<f64>)> = BTreeMap::new();
        for credit in credits {
            if credit.signature.is_empty() || !window.contains(credit.date) {
                continue;
            }
            let entry = groups.entry(credit.signature).or_default();
            entry.0.insert(month_key(credit.date));
            entry.1.push(credit.amount.abs());
        }

        let recurring = groups
            .into_iter()
            .filter(|(_, (months, amounts))| {
                months.len() >= 2 && amounts_are_steady(amounts, tolerance_pct)
            })
            .map(|(signature, _)| signature.to_string())
            .collect();
        Self { recurring }
    }

    pub fn is_recurring(&self, signature: &str) -> bool {
        self.recurring.contains(signature)
    }

    pub fn signatures(&self) -> impl Iterator<Item = &str> {
        self.recurring.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.recurring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recurring.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IncomeDetector<'a> {
    recurrence: &'a RecurrenceIndex,
}

impl<'a> IncomeDetector<'a> {
    pub fn new(recurrence: &'a RecurrenceIndex) -> Self {
        Self { recurrence }
    }

    pub fn evaluate(
        &self,
        transaction: &Transaction,
        signature: &str,
        pattern: Option<PatternEvidence>,
        in_transfer_pair: bool,
    ) -> IncomeVerdict {
        if !transaction.is_credit() {
            return IncomeVerdict::rejected(IncomeReason::NotACredit);
        }
        if in_transfer_pair
            || pattern.is_some_and(|evidence| evidence.subcategory.is_non_income_credit())
        {
            return IncomeVerdict::rejected(IncomeReason::TransferOrRefund);
        }

        let recurring = self.recurrence.is_recurring(signature);
        let income_pattern =
            pattern.filter(|evidence| evidence.subcategory.counts_as_income());

        match income_pattern {
            Some(evidence) if recurring => IncomeVerdict::accepted(
                evidence.confidence,
                IncomeReason::PatternConfirmedByRecurrence,
            ),
            Some(evidence) if evidence.subcategory.is_stable_income() => {
                IncomeVerdict::accepted(evidence.confidence, IncomeReason::StablePattern)
            }
            Some(evidence) => IncomeVerdict::accepted(
                evidence.confidence - UNCONFIRMED_PATTERN_PENALTY,
                IncomeReason::UnstablePatternUnconfirmed,
            ),
            None if recurring => {
                IncomeVerdict::accepted(RECURRING_CREDIT_CONFIDENCE, IncomeReason::RecurringCredit)
            }
            None => IncomeVerdict::rejected(IncomeReason::NoIncomeSignal),
        }
    }
}

fn amounts_are_steady(amounts: &[f64], tolerance_pct: f64) -> bool {
    let Some(median) = median(amounts) else {
        return false;
    };
    let allowed = median * tolerance_pct / 100.0 + 1e-9;
    amounts.iter().all(|amount| (amount - median).abs() <= allowed)
}

pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let middle = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        return Some((sorted[middle - 1] + sorted[middle]) / 2.0);
    }
    Some(sorted[middle])
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
