use std::collections::{BTreeMap, BTreeSet};

use crate::categorize::category::Subcategory;
use crate::config::scoring::CategorizationSettings;
use crate::metrics::Ledger;
use crate::metrics::stats::{mean, round1, round2, sample_std_dev};
use crate::metrics::types::IncomeMetrics;

const STABILITY_BASE: f64 = 40.0;
const STABILITY_RECURRING_BONUS: f64 = 30.0;
const STABILITY_STABLE_SHARE_WEIGHT: f64 = 20.0;
const STABILITY_DIVERSITY_BONUS: f64 = 10.0;
const STABILITY_TRANSIENT_PENALTY: f64 = 20.0;
const NEUTRAL_REGULARITY: f64 = 50.0;

pub(crate) fn income_metrics(ledger: &Ledger<'_>, settings: &CategorizationSettings) -> IncomeMetrics {
    let months = ledger.months();
    let month_slots = ledger.window().map_or(0, |window| window.months as usize);

    let mut weighted_total = 0.0;
    let mut stable_total = 0.0;
    let mut gig_total = 0.0;
    let mut counted_total = 0.0;
    let mut uncategorized_weighted = 0.0;
    let mut detected_total = 0.0;
    let mut by_subcategory: BTreeMap<Subcategory, f64> = BTreeMap::new();
    let mut sources: BTreeSet<&str> = BTreeSet::new();
    let mut monthly_totals = vec![0.0; month_slots];
    let mut has_verifiable_income = false;

    for (transaction, matched) in ledger.in_window() {
        if !transaction.is_credit() {
            continue;
        }
        let amount = transaction.abs_amount();

        if matched.income_verdict.is_some_and(|verdict| verdict.is_income) {
            detected_total += amount;
        }

        if matched.subcategory == Subcategory::UnmatchedCredit {
            uncategorized_weighted += amount * settings.uncategorized_credit_weight;
            continue;
        }
        if !matched.counts_as_income() {
            continue;
        }

        let weight = if matched.subcategory == Subcategory::GigEconomy {
            gig_total += amount;
            settings.gig_income_weight
        } else {
            1.0
        };
        if matched.subcategory.is_stable_income() {
            stable_total += amount;
        }
        weighted_total += amount * weight;
        counted_total += amount;
        *by_subcategory.entry(matched.subcategory).or_default() += amount;
        if let Some(source) = matched.counterparty.as_deref() {
            sources.insert(source);
        }
        if matched.confidence >= settings.verified_income_confidence {
            has_verifiable_income = true;
        }
        if let Some(slot) = ledger
            .window()
            .and_then(|window| window.rolling_month_index(transaction.date))
            && let Some(total) = monthly_totals.get_mut(slot)
        {
            *total += amount;
        }
    }

    let monthly_income = (weighted_total + uncategorized_weighted) / months;
    let detected_monthly_income = detected_total / months;
    let recurring_source_count = sources
        .iter()
        .filter(|source| ledger.recurrence().is_recurring(source))
        .count();

    IncomeMetrics {
        monthly_income: round2(monthly_income),
        monthly_stable_income: round2(stable_total / months),
        monthly_gig_income: round2(gig_total / months),
        monthly_uncategorized_income: round2(uncategorized_weighted / months),
        monthly_income_by_subcategory: by_subcategory
            .into_iter()
            .map(|(subcategory, total)| (subcategory, round2(total / months)))
            .collect(),
        detected_monthly_income: round2(detected_monthly_income),
        effective_monthly_income: round2(monthly_income.min(detected_monthly_income)),
        income_stability_score: stability_score(
            sources.len(),
            recurring_source_count,
            stable_total,
            counted_total,
        ),
        income_regularity_score: regularity_score(&monthly_totals),
        has_verifiable_income,
        income_source_count: u32::try_from(sources.len()).unwrap_or(u32::MAX),
        recurring_source_count: u32::try_from(recurring_source_count).unwrap_or(u32::MAX),
    }
}

/// Zero when there is no counted income at all.
fn stability_score(
    source_count: usize,
    recurring_source_count: usize,
    stable_total: f64,
    counted_total: f64,
) -> f64 {
    if source_count == 0 || counted_total <= 0.0 {
        return 0.0;
    }
    let mut score = STABILITY_BASE;
    if recurring_source_count > 0 {
        score += STABILITY_RECURRING_BONUS;
    }
    score += STABILITY_STABLE_SHARE_WEIGHT * (stable_total / counted_total);
    if source_count >= 2 {
        score += STABILITY_DIVERSITY_BONUS;
    }
    if source_count == 1 && recurring_source_count == 0 {
        score -= STABILITY_TRANSIENT_PENALTY;
    }
    round1(score.clamp(0.0, 100.0))
}

fn regularity_score(monthly_totals: &[f64]) -> f64 {
    if monthly_totals.len() < 2 {
        return NEUTRAL_REGULARITY;
    }
    let (Some(center), Some(spread)) = (mean(monthly_totals), sample_std_dev(monthly_totals))
    else {
        return NEUTRAL_REGULARITY;
    };
    if center <= 0.0 {
        return NEUTRAL_REGULARITY;
    }
    round1((100.0 - spread / center * 100.0).clamp(0.0, 100.0))
}
