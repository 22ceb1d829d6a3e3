use tracing::debug;

use crate::categorize::matcher::PatternMatcher;
use crate::categorize::rules::RuleBook;
use crate::config::mapping::{MappingEntry, ProviderCategoryMap};
use crate::normalize::{matching_text, normalize_for_matching, sender_signature};
use crate::transaction::Transaction;

/// A transaction with the text forms every later stage matches against.
#[derive(Debug, Clone)]
pub struct PreparedTransaction<'a> {
    pub transaction: &'a Transaction,
    /// Upper-cased description plus merchant name.
    pub text: String,
    /// Description with rail prefixes and references stripped.
    pub fingerprint: String,
}

pub fn prepare(transactions: &[Transaction]) -> Vec<PreparedTransaction<'_>> {
    transactions
        .iter()
        .map(|transaction| PreparedTransaction {
            transaction,
            text: matching_text(&transaction.description, transaction.merchant_name.as_deref()),
            fingerprint: fingerprint(&transaction.description),
        })
        .collect()
}

pub fn fingerprint(description: &str) -> String {
    sender_signature(description).unwrap_or_else(|| normalize_for_matching(description))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferSettings {
    pub amount_tolerance: f64,
    pub window_days: i64,
}

/// Two legs of an own-account movement, by transaction index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPair {
    pub first: usize,
    pub second: usize,
}

/// Greedy pairing in input order; a transaction joins at most one pair.
pub fn detect_transfer_pairs(
    prepared: &[PreparedTransaction<'_>],
    matcher: &PatternMatcher,
    rules: &RuleBook,
    settings: TransferSettings,
) -> Vec<TransferPair> {
    let transfer_like = prepared
        .iter()
        .map(|item| matcher.matches_any(&item.text, rules.transfer_groups()))
        .collect::<Vec<bool>>();
    let mut paired = vec![false; prepared.len()];
    let mut pairs = Vec::new();

    for left in 0..prepared.len() {
        if paired[left] {
            continue;
        }
        let candidate = (left + 1..prepared.len()).find(|right| {
            !paired[*right]
                && legs_match(&prepared[left], &prepared[*right], settings)
                && (transfer_like[left]
                    || transfer_like[*right]
                    || prepared[left].fingerprint == prepared[*right].fingerprint)
        });
        if let Some(right) = candidate {
            paired[left] = true;
            paired[right] = true;
            pairs.push(TransferPair {
                first: prepared[left].transaction.index,
                second: prepared[right].transaction.index,
            });
        }
    }

    debug!(pairs = pairs.len(), "transfer pair detection finished");
    pairs
}

fn legs_match(
    left: &PreparedTransaction<'_>,
    right: &PreparedTransaction<'_>,
    settings: TransferSettings,
) -> bool {
    let (a, b) = (left.transaction, right.transaction);
    let opposite = (a.is_credit() && b.is_debit()) || (a.is_debit() && b.is_credit());
    let balanced = (a.amount + b.amount).abs() <= settings.amount_tolerance + 1e-9;
    let close = (a.date - b.date).num_days().abs() <= settings.window_days;
    opposite && balanced && close
}

pub fn provider_override<'m>(
    transaction: &Transaction,
    mapping: Option<&'m ProviderCategoryMap>,
) -> Option<&'m MappingEntry> {
    mapping?.lookup(
        transaction.provider_category_primary.as_deref(),
        transaction.provider_category_detailed.as_deref(),
    )
}

/// Alias to canonical HCSTC lender name, longest alias first so that
/// `THE MONEY PLATFORM` is not read as the shorter `MONEY PLATFORM`.
const HCSTC_ALIASES: [(&str, &str); 25] = [
    ("THE MONEY PLATFORM", "The Money Platform"),
    ("LENDING STREAM", "Lending Stream"),
    ("MONEY PLATFORM", "The Money Platform"),
    ("LENDINGSTREAM", "Lending Stream"),
    ("118 118 MONEY", "118 118 Money"),
    ("POLAR CREDIT", "Polar Credit"),
    ("FAST LOAN UK", "Fast Loan UK"),
    ("CREDITSPRING", "CreditSpring"),
    ("FAIR FINANCE", "Fair Finance"),
    ("SALAD MONEY", "Salad Money"),
    ("POLARCREDIT", "Polar Credit"),
    ("LOANS 2 GO", "Loans 2 Go"),
    ("QUIDMARKET", "QuidMarket"),
    ("SALADMONEY", "Salad Money"),
    ("MONEYBOAT", "Moneyboat"),
    ("MR LENDER", "Mr Lender"),
    ("CASHFLOAT", "Cashfloat"),
    ("LOANS2GO", "Loans 2 Go"),
    ("MRLENDER", "Mr Lender"),
    ("CASHASAP", "CashASAP"),
    ("FASTLOAN", "Fast Loan UK"),
    ("L2G LOAN", "Loans 2 Go"),
    ("CONDUIT", "Conduit"),
    ("118118", "118 118 Money"),
    ("DRAFTY", "Drafty"),
];

pub fn canonical_lender(text: &str) -> Option<&'static str> {
    HCSTC_ALIASES
        .iter()
        .find(|(alias, _)| text.contains(alias))
        .map(|(_, canonical)| *canonical)
}

/// Counterparty identity: canonical lender when one is recognized, else the fingerprint.
pub fn counterparty_identity(item: &PreparedTransaction<'_>) -> String {
    canonical_lender(&item.text)
        .map(str::to_string)
        .unwrap_or_else(|| item.fingerprint.clone())
}
