use crate::config::scoring::{ProductConfig, ScoringConfig, floor_to_step};
use crate::metrics::LoanRequest;
use crate::metrics::stats::round2;
use crate::scoring::types::{LoanOffer, RiskTier};

pub const BELOW_MINIMUM_NOTE: &str = "affordable_amount_below_minimum";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepaymentSchedule {
    pub monthly_repayment: f64,
    pub total_repayable: f64,
    pub total_interest: f64,
    pub apr: f64,
    pub daily_interest_rate: f64,
}

/// Daily simple interest over `term` months, capped at `total_cost_cap` of the principal.
pub fn repayment_schedule(amount: f64, term: u32, product: &ProductConfig) -> RepaymentSchedule {
    let days = f64::from(term) * product.days_per_month;
    if amount <= 0.0 || term == 0 {
        return RepaymentSchedule {
            monthly_repayment: 0.0,
            total_repayable: 0.0,
            total_interest: 0.0,
            apr: 0.0,
            daily_interest_rate: product.daily_interest_rate,
        };
    }
    let interest = product.interest_for(amount, term);
    let total = amount + interest;
    RepaymentSchedule {
        monthly_repayment: round2(total / f64::from(term)),
        total_repayable: round2(total),
        total_interest: round2(interest),
        apr: round2(interest / amount / days * 365.0 * 100.0),
        daily_interest_rate: product.daily_interest_rate,
    }
}

/// Outcome of sizing an offer for an approved application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfferOutcome {
    Offer(LoanOffer),
    /// Every cap applied, the amount fell under the product minimum.
    BelowMinimum { amount: f64 },
}

pub fn build_offer(
    config: &ScoringConfig,
    score: f64,
    tier: RiskTier,
    request: LoanRequest,
    max_affordable_amount: f64,
) -> OfferOutcome {
    let product = &config.product;
    let (limit_amount, limit_term) = config
        .score_limit_for(score)
        .map_or((0.0, 0), |limit| (limit.max_amount, limit.max_term));
    let adjustment = match tier {
        RiskTier::Clean => None,
        RiskTier::Watch => Some(config.tiers.watch),
        RiskTier::Flag => Some(config.tiers.flag),
    };

    let capped = request
        .loan_amount
        .min(product.max_loan_amount)
        .min(limit_amount)
        .min(max_affordable_amount);
    let factor = adjustment.map_or(1.0, |adjustment| adjustment.amount_factor);
    let amount = floor_to_step(capped * factor, product.amount_step);
    if amount < product.min_loan_amount {
        return OfferOutcome::BelowMinimum { amount };
    }

    let mut term = request.loan_term.min(limit_term);
    if let Some(adjustment) = adjustment {
        term = term.min(adjustment.max_term);
    }
    let term = available_term_at_most(product, term);
    let schedule = repayment_schedule(amount, term, product);

    OfferOutcome::Offer(LoanOffer {
        approved_amount: round2(amount),
        approved_term: term,
        monthly_repayment: schedule.monthly_repayment,
        total_repayable: schedule.total_repayable,
        total_interest: schedule.total_interest,
        apr: schedule.apr,
        daily_interest_rate: schedule.daily_interest_rate,
        tier_adjusted: adjustment.is_some(),
    })
}

/// Longest product term not above `term`, else the shortest product term.
fn available_term_at_most(product: &ProductConfig, term: u32) -> u32 {
    product
        .available_terms
        .iter()
        .copied()
        .filter(|candidate| *candidate <= term)
        .max()
        .or_else(|| product.available_terms.iter().copied().min())
        .unwrap_or(term)
}
