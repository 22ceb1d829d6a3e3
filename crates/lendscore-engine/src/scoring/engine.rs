use tracing::{debug, info};

use crate::config::scoring::{RuleAction, ScoringConfig};
use crate::metrics::stats::round1;
use crate::metrics::{FinancialMetrics, LoanRequest};
use crate::scoring::offer::{BELOW_MINIMUM_NOTE, OfferOutcome, build_offer};
use crate::scoring::types::{
    AccountConductPoints, AffordabilityPoints, Decision, DeclineCode, DeclineReason,
    IncomeQualityPoints, RiskFlag, RiskIndicatorPoints, RiskLevel, RiskTier, Score,
    ScoreBreakdown, ScoringResult, Stage,
};

pub const MANUAL_REVIEW_NOTE: &str = "manual_review_required";
pub const POLICY_REFERRAL_NOTE: &str = "policy_rule_referral";

#[derive(Debug, Default)]
struct RuleBreaches {
    decline: Vec<DeclineReason>,
    refer: Vec<DeclineReason>,
}

impl RuleBreaches {
    fn record(&mut self, action: RuleAction, reason: DeclineReason) {
        match action {
            RuleAction::Decline => self.decline.push(reason),
            RuleAction::Refer => self.refer.push(reason),
        }
    }
}

/// Turns a metric set into a decision: rule checks, banded points, tiering, offer.
#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine<'c> {
    config: &'c ScoringConfig,
}

impl<'c> ScoringEngine<'c> {
    pub fn new(config: &'c ScoringConfig) -> Self {
        Self { config }
    }

    pub fn score(
        &self,
        metrics: &FinancialMetrics,
        request: LoanRequest,
        application_ref: &str,
    ) -> ScoringResult {
        let mut trail = vec![Stage::Start, Stage::HardDeclineCheck];

        let RuleBreaches {
            decline: decline_reasons,
            refer: referral_reasons,
        } = self.rule_breaches(metrics);
        if !decline_reasons.is_empty() {
            trail.push(Stage::Decline);
            debug!(
                application_ref,
                reasons = decline_reasons.len(),
                "hard decline short-circuit"
            );
            let result = ScoringResult {
                application_ref: application_ref.to_string(),
                decision: Decision::Decline,
                score: Score::NotComputed,
                risk_level: RiskLevel::VeryHigh,
                score_breakdown: None,
                loan_offer: None,
                risk_flags: Vec::new(),
                decline_reasons,
                referral_reasons,
                processing_notes: Vec::new(),
                stage_trail: trail,
                config_version: self.config.version.clone(),
            };
            log_outcome(&result, None);
            return result;
        }

        trail.push(Stage::PointScoring);
        let breakdown = self.breakdown(metrics);
        let total = breakdown.total_score;
        let mut decision = self.decision_for(total);
        let mut processing_notes = Vec::new();
        let mut loan_offer = None;

        if decision == Decision::Approve && !referral_reasons.is_empty() {
            debug!(
                application_ref,
                reasons = referral_reasons.len(),
                "policy rules referred an approval"
            );
            decision = Decision::Refer;
            processing_notes.push(POLICY_REFERRAL_NOTE.to_string());
        }
        if decision == Decision::Approve {
            match build_offer(
                self.config,
                total,
                breakdown.tier,
                request,
                metrics.affordability.max_affordable_amount,
            ) {
                OfferOutcome::Offer(offer) => loan_offer = Some(offer),
                OfferOutcome::BelowMinimum { amount } => {
                    debug!(application_ref, amount, "offer below product minimum");
                    decision = Decision::Refer;
                    processing_notes.push(BELOW_MINIMUM_NOTE.to_string());
                }
            }
        }
        if decision == Decision::Refer {
            processing_notes.push(MANUAL_REVIEW_NOTE.to_string());
        }
        trail.push(match decision {
            Decision::Approve => Stage::Approve,
            Decision::Refer => Stage::Refer,
            Decision::Decline => Stage::Decline,
        });

        let result = ScoringResult {
            application_ref: application_ref.to_string(),
            decision,
            score: Score::Computed { value: total },
            risk_level: risk_level(decision, breakdown.tier),
            risk_flags: breakdown.risk_flags.clone(),
            score_breakdown: Some(breakdown),
            loan_offer,
            decline_reasons: Vec::new(),
            referral_reasons,
            processing_notes,
            stage_trail: trail,
            config_version: self.config.version.clone(),
        };
        log_outcome(&result, result.score_breakdown.as_ref().map(|b| b.tier));
        result
    }

    /// Hard declines always decline. Policy rules decline or refer per their configured action.
    fn rule_breaches(&self, metrics: &FinancialMetrics) -> RuleBreaches {
        let rules = &self.config.hard_decline;
        let mut breaches = RuleBreaches::default();

        let income = metrics.income.effective_monthly_income;
        if income < rules.min_monthly_income {
            breaches.decline.push(DeclineReason {
                code: DeclineCode::IncomeBelowMinimum,
                observed: income,
                threshold: rules.min_monthly_income,
                message: format!(
                    "Monthly income {income:.2} is below the minimum {:.2}.",
                    rules.min_monthly_income
                ),
            });
        }

        let lenders = metrics.debt.active_hcstc_count_90d;
        if lenders > rules.max_active_hcstc_lenders {
            breaches.decline.push(DeclineReason {
                code: DeclineCode::TooManyHcstcLenders,
                observed: f64::from(lenders),
                threshold: f64::from(rules.max_active_hcstc_lenders),
                message: format!(
                    "{lenders} active HCSTC lenders in the last 90 days exceeds the maximum {}.",
                    rules.max_active_hcstc_lenders
                ),
            });
        }

        let gambling = metrics.risk.gambling_percentage;
        if gambling > rules.max_gambling_percentage {
            breaches.decline.push(DeclineReason {
                code: DeclineCode::GamblingAboveMaximum,
                observed: gambling,
                threshold: rules.max_gambling_percentage,
                message: format!(
                    "Gambling at {gambling:.1}% of income exceeds the maximum {:.1}%.",
                    rules.max_gambling_percentage
                ),
            });
        }

        let failed = metrics.risk.failed_payments_count;
        if failed > rules.max_failed_payments {
            breaches.decline.push(DeclineReason {
                code: DeclineCode::TooManyFailedPayments,
                observed: f64::from(failed),
                threshold: f64::from(rules.max_failed_payments),
                message: format!(
                    "{failed} failed payments exceeds the maximum {}.",
                    rules.max_failed_payments
                ),
            });
        }

        self.policy_breaches(metrics, &mut breaches);
        breaches
    }

    fn policy_breaches(&self, metrics: &FinancialMetrics, breaches: &mut RuleBreaches) {
        let policy = &self.config.policy_rules;
        let affordability = &metrics.affordability;

        let rule = policy.no_verifiable_income_below;
        let income = metrics.income.effective_monthly_income;
        if !metrics.income.has_verifiable_income && income < rule.limit {
            breaches.record(
                rule.action,
                DeclineReason {
                    code: DeclineCode::NoVerifiableIncome,
                    observed: income,
                    threshold: rule.limit,
                    message: format!(
                        "No verifiable income and monthly income {income:.2} is below {:.2}.",
                        rule.limit
                    ),
                },
            );
        }

        let rule = policy.min_post_loan_disposable;
        let post_loan = affordability.post_loan_disposable;
        if post_loan < rule.limit {
            breaches.record(
                rule.action,
                DeclineReason {
                    code: DeclineCode::PostLoanDisposableBelowMinimum,
                    observed: post_loan,
                    threshold: rule.limit,
                    message: format!(
                        "Disposable income after the repayment {post_loan:.2} is below {:.2}.",
                        rule.limit
                    ),
                },
            );
        }

        let rule = policy.max_debt_collectors;
        let collectors = metrics.risk.debt_collection_distinct;
        if collectors > rule.limit {
            breaches.record(
                rule.action,
                DeclineReason {
                    code: DeclineCode::TooManyDebtCollectors,
                    observed: f64::from(collectors),
                    threshold: f64::from(rule.limit),
                    message: format!(
                        "{collectors} debt collection agencies exceeds the maximum {}.",
                        rule.limit
                    ),
                },
            );
        }

        let rule = policy.max_projected_dti;
        let projected = affordability.projected_debt_to_income_ratio;
        if projected > rule.limit {
            breaches.record(
                rule.action,
                DeclineReason {
                    code: DeclineCode::ProjectedDtiAboveMaximum,
                    observed: projected,
                    threshold: rule.limit,
                    message: format!(
                        "Debt-to-income with the new loan at {projected:.1}% exceeds {:.1}%.",
                        rule.limit
                    ),
                },
            );
        }

        let rule = policy.max_bank_charges_90d;
        let charges = metrics.risk.bank_charges_count_90d;
        if charges > rule.limit {
            breaches.record(
                rule.action,
                DeclineReason {
                    code: DeclineCode::TooManyBankCharges,
                    observed: f64::from(charges),
                    threshold: f64::from(rule.limit),
                    message: format!(
                        "{charges} bank charges in the last 90 days exceeds the maximum {}.",
                        rule.limit
                    ),
                },
            );
        }

        let rule = policy.max_credit_providers_90d;
        let providers = metrics.debt.credit_providers_90d;
        if providers > rule.limit {
            breaches.record(
                rule.action,
                DeclineReason {
                    code: DeclineCode::TooManyCreditProviders,
                    observed: f64::from(providers),
                    threshold: f64::from(rule.limit),
                    message: format!(
                        "{providers} credit providers in the last 90 days exceeds the maximum {}.",
                        rule.limit
                    ),
                },
            );
        }

        let rule = policy.min_stressed_disposable;
        let stressed = affordability.stressed_monthly_disposable;
        if stressed < rule.limit {
            breaches.record(
                rule.action,
                DeclineReason {
                    code: DeclineCode::StressedDisposableBelowMinimum,
                    observed: stressed,
                    threshold: rule.limit,
                    message: format!(
                        "Disposable income under expense shock {stressed:.2} is below {:.2}.",
                        rule.limit
                    ),
                },
            );
        }
    }

    pub fn breakdown(&self, metrics: &FinancialMetrics) -> ScoreBreakdown {
        let points = &self.config.points;

        let income_stability = points
            .income_stability
            .points_for(Some(metrics.income.income_stability_score));
        let income_regularity = points
            .income_regularity
            .points_for(Some(metrics.income.income_regularity_score));
        let income_verification = if metrics.income.has_verifiable_income {
            points.income_verification.verified
        } else {
            points.income_verification.unverified
        };
        let income_quality = IncomeQualityPoints {
            income_stability,
            income_regularity: round1(income_regularity),
            income_verification,
            total: round1(income_stability + income_regularity + income_verification),
        };

        let dti_ratio = points
            .dti_ratio
            .points_for(Some(metrics.affordability.debt_to_income_ratio));
        let disposable_income = points
            .disposable_income
            .points_for(Some(metrics.affordability.monthly_disposable));
        let post_loan_disposable = points
            .post_loan_disposable
            .points_for(Some(metrics.affordability.post_loan_disposable));
        let affordability = AffordabilityPoints {
            dti_ratio,
            disposable_income,
            post_loan_disposable: round1(post_loan_disposable),
            total: round1(dti_ratio + disposable_income + post_loan_disposable),
        };

        let failed_payments = points
            .failed_payments
            .points_for(Some(f64::from(metrics.risk.failed_payments_count)));
        let overdraft_days = points
            .overdraft_days
            .points_for(metrics.balance.days_in_overdraft.map(f64::from));
        let average_balance = points
            .average_balance
            .points_for(metrics.balance.average_balance);
        let account_conduct = AccountConductPoints {
            failed_payments,
            overdraft_days,
            average_balance,
            total: round1(failed_payments + overdraft_days + average_balance),
        };

        let gambling_percentage = points
            .gambling_percentage
            .points_for(Some(metrics.risk.gambling_percentage));
        let active_hcstc = points
            .active_hcstc
            .points_for(Some(f64::from(metrics.debt.active_hcstc_count_90d)));
        let risk_indicators = RiskIndicatorPoints {
            gambling_percentage,
            active_hcstc,
            total: round1(gambling_percentage + active_hcstc),
        };

        let raw_total = income_stability
            + income_regularity
            + income_verification
            + dti_ratio
            + disposable_income
            + post_loan_disposable
            + failed_payments
            + overdraft_days
            + average_balance
            + gambling_percentage
            + active_hcstc;
        let risk_flags = self.risk_flags(metrics);
        let tier = self.tier_for(risk_flags.len());

        ScoreBreakdown {
            income_quality,
            affordability,
            account_conduct,
            risk_indicators,
            total_score: round1(raw_total.clamp(0.0, 100.0)),
            risk_flags,
            tier,
        }
    }

    fn risk_flags(&self, metrics: &FinancialMetrics) -> Vec<RiskFlag> {
        let thresholds = &self.config.risk_flags;
        let mut flags = Vec::new();
        if metrics.income.income_stability_score < thresholds.min_income_stability {
            flags.push(RiskFlag::LowIncomeStability);
        }
        if metrics.debt.monthly_debt_payments < thresholds.min_monthly_debt_payments {
            flags.push(RiskFlag::LowDebtManagement);
        }
        if metrics.debt.credit_providers_90d < thresholds.min_credit_providers_90d {
            flags.push(RiskFlag::LowRecentCreditActivity);
        }
        if metrics.risk.savings_behavior_score < thresholds.min_savings_score {
            flags.push(RiskFlag::NoSavingsActivity);
        }
        flags
    }

    fn tier_for(&self, flag_count: usize) -> RiskTier {
        let tiers = &self.config.tiers;
        if flag_count >= tiers.flag_min_flags {
            RiskTier::Flag
        } else if flag_count >= tiers.watch_min_flags {
            RiskTier::Watch
        } else {
            RiskTier::Clean
        }
    }

    fn decision_for(&self, score: f64) -> Decision {
        let thresholds = &self.config.decision;
        if score >= thresholds.approve_min {
            Decision::Approve
        } else if score >= thresholds.refer_min {
            Decision::Refer
        } else {
            Decision::Decline
        }
    }
}

fn risk_level(decision: Decision, tier: RiskTier) -> RiskLevel {
    match (decision, tier) {
        (Decision::Approve, RiskTier::Clean) => RiskLevel::Low,
        (Decision::Approve, _) => RiskLevel::Medium,
        (Decision::Refer, _) => RiskLevel::High,
        (Decision::Decline, _) => RiskLevel::VeryHigh,
    }
}

fn log_outcome(result: &ScoringResult, tier: Option<RiskTier>) {
    info!(
        application_ref = %result.application_ref,
        decision = result.decision.as_str(),
        score = ?result.score.value(),
        tier = tier.map_or("none", RiskTier::as_str),
        "application scored"
    );
}

#[cfg(test)]
mod tests {
    use super::{MANUAL_REVIEW_NOTE, POLICY_REFERRAL_NOTE, ScoringEngine};
    use crate::config::scoring::{RuleAction, ScoringConfig};
    use crate::metrics::types::{
        AffordabilityMetrics, BalanceMetrics, DebtMetrics, ExpenseMetrics, IncomeMetrics,
        RiskMetrics,
    };
    use crate::metrics::{FinancialMetrics, LoanRequest};
    use crate::scoring::types::{
        Decision, DeclineCode, RiskFlag, RiskLevel, RiskTier, Score, ScoringResult, Stage,
    };

    fn healthy_metrics() -> FinancialMetrics {
        FinancialMetrics {
            months_of_data: 3,
            window: None,
            income: IncomeMetrics {
                monthly_income: 1200.0,
                effective_monthly_income: 1200.0,
                detected_monthly_income: 1200.0,
                income_stability_score: 85.0,
                income_regularity_score: 100.0,
                has_verifiable_income: true,
                income_source_count: 1,
                recurring_source_count: 1,
                ..IncomeMetrics::default()
            },
            expenses: ExpenseMetrics {
                monthly_essential_total: 600.0,
                ..ExpenseMetrics::default()
            },
            debt: DebtMetrics {
                monthly_debt_payments: 400.0,
                credit_providers_90d: 2,
                ..DebtMetrics::default()
            },
            affordability: AffordabilityMetrics {
                debt_to_income_ratio: 33.3,
                monthly_disposable: 200.0,
                estimated_repayment: 172.96,
                post_loan_disposable: 27.04,
                max_affordable_amount: 260.0,
                projected_debt_to_income_ratio: 47.7,
                stressed_monthly_disposable: 140.0,
            },
            balance: BalanceMetrics::default(),
            risk: RiskMetrics {
                savings_behavior_score: 2,
                ..RiskMetrics::default()
            },
        }
    }

    fn request() -> LoanRequest {
        LoanRequest {
            loan_amount: 300.0,
            loan_term: 3,
        }
    }

    #[test]
    fn healthy_applicant_is_approved_with_offer() {
        let config = ScoringConfig::default();
        let result = ScoringEngine::new(&config).score(&healthy_metrics(), request(), "app_test");
        assert_eq!(result.decision, Decision::Approve);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert!(result.score.value().is_some_and(|score| score >= 70.0));
        assert!(result.score_breakdown.is_some());
        if let Some(breakdown) = &result.score_breakdown {
            assert!((breakdown.affordability.dti_ratio - 15.0).abs() < 1e-9);
            assert_eq!(breakdown.tier, RiskTier::Clean);
        }
        assert!(result.loan_offer.is_some());
        if let Some(offer) = result.loan_offer {
            assert!((offer.approved_amount - 260.0).abs() < 1e-9);
            assert_eq!(offer.approved_term, 3);
            assert!(!offer.tier_adjusted);
        }
        assert_eq!(
            result.stage_trail,
            vec![
                Stage::Start,
                Stage::HardDeclineCheck,
                Stage::PointScoring,
                Stage::Approve
            ]
        );
    }

    #[test]
    fn gambling_breach_short_circuits() {
        let config = ScoringConfig::default();
        let mut metrics = healthy_metrics();
        metrics.risk.gambling_percentage = 22.0;
        let result = ScoringEngine::new(&config).score(&metrics, request(), "app_test");
        assert_eq!(result.decision, Decision::Decline);
        assert_eq!(result.score, Score::NotComputed);
        assert_eq!(result.risk_level, RiskLevel::VeryHigh);
        assert!(result.score_breakdown.is_none());
        assert!(result.loan_offer.is_none());
        assert_eq!(result.decline_reasons.len(), 1);
        assert_eq!(
            result.stage_trail,
            vec![Stage::Start, Stage::HardDeclineCheck, Stage::Decline]
        );
    }

    fn referral_codes(result: &ScoringResult) -> Vec<DeclineCode> {
        result
            .referral_reasons
            .iter()
            .map(|reason| reason.code)
            .collect()
    }

    fn assert_referred(result: &ScoringResult, code: DeclineCode) {
        assert_eq!(result.decision, Decision::Refer);
        assert_eq!(referral_codes(result), vec![code]);
        assert!(result.decline_reasons.is_empty());
        assert!(result.loan_offer.is_none());
        assert!(result.score.value().is_some());
        assert_eq!(result.risk_level, RiskLevel::High);
        assert!(
            result
                .processing_notes
                .iter()
                .any(|note| note == POLICY_REFERRAL_NOTE)
        );
        assert!(
            result
                .processing_notes
                .iter()
                .any(|note| note == MANUAL_REVIEW_NOTE)
        );
        assert_eq!(result.stage_trail.last(), Some(&Stage::Refer));
    }

    #[test]
    fn healthy_applicant_breaches_no_policy_rule() {
        let config = ScoringConfig::default();
        let result = ScoringEngine::new(&config).score(&healthy_metrics(), request(), "app_test");
        assert!(result.referral_reasons.is_empty());
        assert!(result.processing_notes.is_empty());
    }

    #[test]
    fn unverified_low_income_is_referred() {
        let mut config = ScoringConfig::default();
        config.hard_decline.min_monthly_income = 0.0;
        let mut metrics = healthy_metrics();
        metrics.income.has_verifiable_income = false;
        metrics.income.effective_monthly_income = 250.0;
        let result = ScoringEngine::new(&config).score(&metrics, request(), "app_test");
        assert!(referral_codes(&result).contains(&DeclineCode::NoVerifiableIncome));

        metrics.income.has_verifiable_income = true;
        let result = ScoringEngine::new(&config).score(&metrics, request(), "app_test");
        assert!(!referral_codes(&result).contains(&DeclineCode::NoVerifiableIncome));
    }

    #[test]
    fn negative_post_loan_disposable_is_referred() {
        let config = ScoringConfig::default();
        let mut metrics = healthy_metrics();
        metrics.affordability.post_loan_disposable = -12.5;
        let result = ScoringEngine::new(&config).score(&metrics, request(), "app_test");
        assert_referred(&result, DeclineCode::PostLoanDisposableBelowMinimum);
        assert!((result.referral_reasons[0].observed + 12.5).abs() < 1e-9);
    }

    #[test]
    fn more_than_three_debt_collectors_is_referred() {
        let config = ScoringConfig::default();
        let mut metrics = healthy_metrics();
        metrics.risk.debt_collection_distinct = 3;
        let result = ScoringEngine::new(&config).score(&metrics, request(), "app_test");
        assert_eq!(result.decision, Decision::Approve);

        metrics.risk.debt_collection_distinct = 4;
        let result = ScoringEngine::new(&config).score(&metrics, request(), "app_test");
        assert_referred(&result, DeclineCode::TooManyDebtCollectors);
    }

    #[test]
    fn projected_dti_above_ceiling_is_referred() {
        let config = ScoringConfig::default();
        let mut metrics = healthy_metrics();
        metrics.affordability.projected_debt_to_income_ratio = 85.0;
        let result = ScoringEngine::new(&config).score(&metrics, request(), "app_test");
        assert_eq!(result.decision, Decision::Approve);

        metrics.affordability.projected_debt_to_income_ratio = 85.1;
        let result = ScoringEngine::new(&config).score(&metrics, request(), "app_test");
        assert_referred(&result, DeclineCode::ProjectedDtiAboveMaximum);
    }

    #[test]
    fn three_bank_charges_in_ninety_days_is_referred() {
        let config = ScoringConfig::default();
        let mut metrics = healthy_metrics();
        metrics.risk.bank_charges_count_90d = 2;
        let result = ScoringEngine::new(&config).score(&metrics, request(), "app_test");
        assert_eq!(result.decision, Decision::Approve);

        metrics.risk.bank_charges_count_90d = 3;
        let result = ScoringEngine::new(&config).score(&metrics, request(), "app_test");
        assert_referred(&result, DeclineCode::TooManyBankCharges);
    }

    #[test]
    fn five_recent_credit_providers_is_referred() {
        let config = ScoringConfig::default();
        let mut metrics = healthy_metrics();
        metrics.debt.credit_providers_90d = 5;
        let result = ScoringEngine::new(&config).score(&metrics, request(), "app_test");
        assert_referred(&result, DeclineCode::TooManyCreditProviders);
    }

    #[test]
    fn negative_stressed_disposable_is_referred() {
        let config = ScoringConfig::default();
        let mut metrics = healthy_metrics();
        metrics.affordability.stressed_monthly_disposable = -32.96;
        let result = ScoringEngine::new(&config).score(&metrics, request(), "app_test");
        assert_referred(&result, DeclineCode::StressedDisposableBelowMinimum);
    }

    #[test]
    fn decline_action_short_circuits_a_policy_rule() {
        let mut config = ScoringConfig::default();
        config.policy_rules.max_bank_charges_90d.action = RuleAction::Decline;
        let mut metrics = healthy_metrics();
        metrics.risk.bank_charges_count_90d = 4;
        metrics.risk.debt_collection_distinct = 5;
        let result = ScoringEngine::new(&config).score(&metrics, request(), "app_test");
        assert_eq!(result.decision, Decision::Decline);
        assert_eq!(result.score, Score::NotComputed);
        assert_eq!(result.decline_reasons.len(), 1);
        assert_eq!(result.decline_reasons[0].code, DeclineCode::TooManyBankCharges);
        assert_eq!(referral_codes(&result), vec![DeclineCode::TooManyDebtCollectors]);
        assert_eq!(
            result.stage_trail,
            vec![Stage::Start, Stage::HardDeclineCheck, Stage::Decline]
        );
    }

    #[test]
    fn referral_never_lifts_a_score_decline() {
        let mut config = ScoringConfig::default();
        config.decision.approve_min = 99.0;
        config.decision.refer_min = 98.0;
        let mut metrics = healthy_metrics();
        metrics.risk.bank_charges_count_90d = 3;
        let result = ScoringEngine::new(&config).score(&metrics, request(), "app_test");
        assert_eq!(result.decision, Decision::Decline);
        assert_eq!(referral_codes(&result), vec![DeclineCode::TooManyBankCharges]);
        assert!(result.processing_notes.is_empty());
    }

    #[test]
    fn flags_drive_tier_without_changing_decision() {
        let config = ScoringConfig::default();
        let mut metrics = healthy_metrics();
        metrics.debt.credit_providers_90d = 0;
        metrics.risk.savings_behavior_score = 0;
        metrics.affordability.max_affordable_amount = 600.0;
        let result = ScoringEngine::new(&config).score(&metrics, request(), "app_test");
        assert_eq!(
            result.risk_flags,
            vec![
                RiskFlag::LowRecentCreditActivity,
                RiskFlag::NoSavingsActivity
            ]
        );
        assert_eq!(result.decision, Decision::Approve);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert!(result.loan_offer.is_some_and(|offer| offer.tier_adjusted));
    }

    #[test]
    fn stability_band_increase_never_lowers_income_points() {
        let config = ScoringConfig::default();
        let engine = ScoringEngine::new(&config);
        let mut previous = f64::MIN;
        for stability in [0.0, 49.9, 50.0, 66.0, 78.0, 90.0, 100.0] {
            let mut metrics = healthy_metrics();
            metrics.income.income_stability_score = stability;
            let points = engine.breakdown(&metrics).income_quality.total;
            assert!(points >= previous);
            previous = points;
        }
    }

    #[test]
    fn missing_balances_score_neutral_points() {
        let config = ScoringConfig::default();
        let breakdown = ScoringEngine::new(&config).breakdown(&healthy_metrics());
        assert!(
            (breakdown.account_conduct.overdraft_days - config.points.overdraft_days.neutral_points)
                .abs()
                < 1e-9
        );
        assert!(
            (breakdown.account_conduct.average_balance
                - config.points.average_balance.neutral_points)
                .abs()
                < 1e-9
        );
    }
}
