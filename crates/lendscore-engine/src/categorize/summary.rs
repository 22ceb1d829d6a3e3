use std::collections::BTreeMap;

use serde::Serialize;

use crate::categorize::category::{Category, Subcategory};
use crate::categorize::engine::CategoryMatch;
use crate::categorize::matcher::MatchMethod;
use crate::transaction::Transaction;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BucketStats {
    pub count: usize,
    /// Signed sum: credits negative, debits positive.
    pub total_amount: f64,
    /// Magnitude of money in.
    pub credit_total: f64,
    /// Magnitude of money out.
    pub debit_total: f64,
    pub transaction_refs: Vec<usize>,
}

impl BucketStats {
    fn record(&mut self, transaction: &Transaction) {
        self.count += 1;
        self.total_amount += transaction.amount;
        if transaction.is_credit() {
            self.credit_total += transaction.abs_amount();
        } else {
            self.debit_total += transaction.amount;
        }
        self.transaction_refs.push(transaction.index);
    }

    fn round_totals(&mut self) {
        self.total_amount = round2(self.total_amount);
        self.credit_total = round2(self.credit_total);
        self.debit_total = round2(self.debit_total);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategorySummary {
    pub categories: BTreeMap<Category, BTreeMap<Subcategory, BucketStats>>,
    pub excluded_transfer_pairs: BucketStats,
    pub transaction_count: usize,
    pub uncategorized_count: usize,
}

impl CategorySummary {
    /// `matches` must be aligned with `transactions` (same length, same order).
    pub fn build(transactions: &[Transaction], matches: &[CategoryMatch]) -> Self {
        let mut summary = Self {
            transaction_count: transactions.len(),
            ..Self::default()
        };

        for (transaction, matched) in transactions.iter().zip(matches) {
            if matched.match_method == MatchMethod::TransferPair {
                summary.excluded_transfer_pairs.record(transaction);
                continue;
            }
            if matched.category == Category::Uncategorized {
                summary.uncategorized_count += 1;
            }
            summary
                .categories
                .entry(matched.category)
                .or_default()
                .entry(matched.subcategory)
                .or_default()
                .record(transaction);
        }

        summary.excluded_transfer_pairs.round_totals();
        for buckets in summary.categories.values_mut() {
            for stats in buckets.values_mut() {
                stats.round_totals();
            }
        }
        summary
    }

    pub fn bucket(&self, subcategory: Subcategory) -> Option<&BucketStats> {
        self.categories
            .get(&subcategory.category())
            .and_then(|buckets| buckets.get(&subcategory))
    }

    pub fn buckets(&self) -> impl Iterator<Item = (Subcategory, &BucketStats)> {
        self.categories
            .values()
            .flat_map(|buckets| buckets.iter().map(|(subcategory, stats)| (*subcategory, stats)))
    }

    /// Credit and debit magnitudes over every categorized bucket, excluding transfer pairs.
    pub fn bucket_totals(&self) -> (f64, f64) {
        self.buckets().fold((0.0, 0.0), |(credits, debits), (_, stats)| {
            (credits + stats.credit_total, debits + stats.debit_total)
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::CategorySummary;
    use crate::categorize::category::{Category, Subcategory};
    use crate::categorize::engine::CategoryMatch;
    use crate::categorize::matcher::MatchMethod;
    use crate::transaction::Transaction;

    fn txn(index: usize, amount: f64) -> Transaction {
        Transaction {
            index,
            description: format!("ROW {index}"),
            amount,
            date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap_or_default(),
            merchant_name: None,
            provider_category_primary: None,
            provider_category_detailed: None,
            running_balance: None,
        }
    }

    fn matched(index: usize, subcategory: Subcategory, method: MatchMethod) -> CategoryMatch {
        CategoryMatch {
            transaction_index: index,
            category: subcategory.category(),
            subcategory,
            confidence: 0.95,
            match_method: method,
            matched_pattern: None,
            counterparty: None,
            income_verdict: None,
        }
    }

    #[test]
    fn pairs_are_kept_out_of_category_buckets() {
        let transactions = vec![txn(0, -1000.0), txn(1, -50.0), txn(2, 50.0), txn(3, 20.0)];
        let matches = vec![
            matched(0, Subcategory::Salary, MatchMethod::Keyword),
            matched(1, Subcategory::Internal, MatchMethod::TransferPair),
            matched(2, Subcategory::Internal, MatchMethod::TransferPair),
            matched(3, Subcategory::UnmatchedDebit, MatchMethod::None),
        ];
        let summary = CategorySummary::build(&transactions, &matches);

        assert_eq!(summary.excluded_transfer_pairs.count, 2);
        assert_eq!(summary.excluded_transfer_pairs.transaction_refs, vec![1, 2]);
        assert!(!summary.categories.contains_key(&Category::Transfer));
        assert_eq!(summary.uncategorized_count, 1);
        assert_eq!(summary.bucket(Subcategory::Salary).map(|b| b.count), Some(1));

        let (credits, debits) = summary.bucket_totals();
        assert!((credits - 1000.0).abs() < 1e-9);
        assert!((debits - 20.0).abs() < 1e-9);
    }
}
