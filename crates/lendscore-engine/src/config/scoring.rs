use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::bands::{BandTable, LinearScale};
use crate::{EngineError, EngineResult};

/// Identifier of the built-in scoring policy. Carried on every result so a decision can be
/// traced back to the thresholds that produced it.
pub const SCORING_CONFIG_VERSION: &str = "scoring/v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub version: String,
    pub hard_decline: HardDeclineRules,
    pub policy_rules: PolicyRules,
    pub decision: DecisionThresholds,
    pub points: PointTables,
    pub risk_flags: RiskFlagThresholds,
    pub tiers: TierPolicy,
    pub score_limits: Vec<ScoreLimit>,
    pub product: ProductConfig,
    pub categorization: CategorizationSettings,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            version: SCORING_CONFIG_VERSION.to_string(),
            hard_decline: HardDeclineRules::default(),
            policy_rules: PolicyRules::default(),
            decision: DecisionThresholds::default(),
            points: PointTables::default(),
            risk_flags: RiskFlagThresholds::default(),
            tiers: TierPolicy::default(),
            score_limits: vec![
                ScoreLimit::new(75.0, 1500.0, 6),
                ScoreLimit::new(65.0, 1200.0, 6),
                ScoreLimit::new(55.0, 800.0, 5),
                ScoreLimit::new(45.0, 500.0, 4),
                ScoreLimit::new(35.0, 300.0, 3),
            ],
            product: ProductConfig::default(),
            categorization: CategorizationSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HardDeclineRules {
    pub min_monthly_income: f64,
    pub max_active_hcstc_lenders: u32,
    pub max_gambling_percentage: f64,
    pub max_failed_payments: u32,
}

impl Default for HardDeclineRules {
    fn default() -> Self {
        Self {
            min_monthly_income: 500.0,
            max_active_hcstc_lenders: 6,
            max_gambling_percentage: 15.0,
            max_failed_payments: 2,
        }
    }
}

/// What a breached policy rule does to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    /// Stop before point scoring, like a hard decline.
    Decline,
    /// Score as usual, then send an APPROVE to manual review.
    Refer,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyRule<T> {
    pub limit: T,
    pub action: RuleAction,
}

impl<T> PolicyRule<T> {
    pub const fn refer(limit: T) -> Self {
        Self {
            limit,
            action: RuleAction::Refer,
        }
    }
}

/// Affordability and conduct rules whose action is configurable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyRules {
    /// Breached when income is unverified and effective income is below the limit.
    pub no_verifiable_income_below: PolicyRule<f64>,
    pub min_post_loan_disposable: PolicyRule<f64>,
    pub max_debt_collectors: PolicyRule<u32>,
    /// Debt payments plus the requested repayment, as a percentage of income.
    pub max_projected_dti: PolicyRule<f64>,
    pub max_bank_charges_90d: PolicyRule<u32>,
    pub max_credit_providers_90d: PolicyRule<u32>,
    /// Disposable income after the expense shock buffer and unmatched spending.
    pub min_stressed_disposable: PolicyRule<f64>,
}

impl Default for PolicyRules {
    fn default() -> Self {
        Self {
            no_verifiable_income_below: PolicyRule::refer(300.0),
            min_post_loan_disposable: PolicyRule::refer(0.0),
            max_debt_collectors: PolicyRule::refer(3),
            max_projected_dti: PolicyRule::refer(85.0),
            max_bank_charges_90d: PolicyRule::refer(2),
            max_credit_providers_90d: PolicyRule::refer(4),
            min_stressed_disposable: PolicyRule::refer(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecisionThresholds {
    pub approve_min: f64,
    pub refer_min: f64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            approve_min: 70.0,
            refer_min: 45.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerificationPoints {
    pub verified: f64,
    pub unverified: f64,
}

impl Default for VerificationPoints {
    fn default() -> Self {
        Self {
            verified: 5.0,
            unverified: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PointTables {
    pub income_stability: BandTable,
    pub income_regularity: LinearScale,
    pub income_verification: VerificationPoints,
    pub dti_ratio: BandTable,
    pub disposable_income: BandTable,
    pub post_loan_disposable: LinearScale,
    pub failed_payments: BandTable,
    pub overdraft_days: BandTable,
    pub average_balance: BandTable,
    pub gambling_percentage: BandTable,
    pub active_hcstc: BandTable,
}

impl Default for PointTables {
    fn default() -> Self {
        Self {
            income_stability: BandTable::at_least(
                &[(90.0, 12.0), (78.0, 10.0), (66.0, 7.0), (50.0, 4.0)],
                0.0,
                4.0,
            ),
            income_regularity: LinearScale {
                max_points: 8.0,
                full_marks_at: 100.0,
                neutral_points: 4.0,
            },
            income_verification: VerificationPoints::default(),
            dti_ratio: BandTable::at_most(
                &[
                    (30.0, 18.0),
                    (40.0, 15.0),
                    (50.0, 12.0),
                    (60.0, 8.0),
                    (70.0, 4.0),
                    (100.0, 0.0),
                ],
                0.0,
                8.0,
            ),
            disposable_income: BandTable::at_least(
                &[
                    (200.0, 15.0),
                    (150.0, 13.0),
                    (100.0, 10.0),
                    (50.0, 6.0),
                    (25.0, 3.0),
                    (0.0, 0.0),
                ],
                0.0,
                6.0,
            ),
            post_loan_disposable: LinearScale {
                max_points: 12.0,
                full_marks_at: 50.0,
                neutral_points: 6.0,
            },
            failed_payments: BandTable::at_most(
                &[(0.0, 8.0), (1.0, 6.0), (2.0, 4.0), (3.0, 2.0)],
                0.0,
                4.0,
            ),
            overdraft_days: BandTable::at_most(&[(0.0, 7.0), (5.0, 5.0), (15.0, 3.0)], 0.0, 3.0),
            average_balance: BandTable::at_least(
                &[(500.0, 5.0), (200.0, 3.0), (0.0, 1.0)],
                0.0,
                2.0,
            ),
            gambling_percentage: BandTable::at_most(
                &[
                    (0.0, 5.0),
                    (2.0, 3.0),
                    (5.0, 0.0),
                    (10.0, -3.0),
                    (100.0, -5.0),
                ],
                -5.0,
                0.0,
            ),
            active_hcstc: BandTable::at_most(&[(0.0, 5.0), (1.0, 2.0)], 0.0, 2.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RiskFlagThresholds {
    pub min_income_stability: f64,
    pub min_monthly_debt_payments: f64,
    pub min_credit_providers_90d: u32,
    pub min_savings_score: u8,
}

impl Default for RiskFlagThresholds {
    fn default() -> Self {
        Self {
            min_income_stability: 50.0,
            min_monthly_debt_payments: 200.0,
            min_credit_providers_90d: 1,
            min_savings_score: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierAdjustment {
    pub amount_factor: f64,
    pub max_term: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TierPolicy {
    pub watch_min_flags: usize,
    pub flag_min_flags: usize,
    pub watch: TierAdjustment,
    pub flag: TierAdjustment,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            watch_min_flags: 2,
            flag_min_flags: 3,
            watch: TierAdjustment {
                amount_factor: 0.75,
                max_term: 6,
            },
            flag: TierAdjustment {
                amount_factor: 0.5,
                max_term: 4,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreLimit {
    pub min_score: f64,
    pub max_amount: f64,
    pub max_term: u32,
}

impl ScoreLimit {
    pub const fn new(min_score: f64, max_amount: f64, max_term: u32) -> Self {
        Self {
            min_score,
            max_amount,
            max_term,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProductConfig {
    pub min_loan_amount: f64,
    pub max_loan_amount: f64,
    pub available_terms: Vec<u32>,
    pub daily_interest_rate: f64,
    pub total_cost_cap: f64,
    pub days_per_month: f64,
    pub min_disposable_buffer: f64,
    pub amount_step: f64,
    /// Multiplier on essential spending for the stressed disposable figure.
    pub expense_shock_buffer: f64,
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self {
            min_loan_amount: 200.0,
            max_loan_amount: 1500.0,
            available_terms: vec![3, 4, 5, 6],
            daily_interest_rate: 0.008,
            total_cost_cap: 1.0,
            days_per_month: 30.4,
            min_disposable_buffer: 50.0,
            amount_step: 10.0,
            expense_shock_buffer: 1.1,
        }
    }
}

impl ProductConfig {
    pub fn check_loan_amount(&self, loan_amount: f64) -> EngineResult<()> {
        if loan_amount.is_finite()
            && loan_amount >= self.min_loan_amount
            && loan_amount <= self.max_loan_amount
        {
            return Ok(());
        }
        Err(EngineError::invalid_request_field(
            "loan_amount",
            &format!(
                "Loan amount {loan_amount} is outside the product range {}-{}.",
                self.min_loan_amount, self.max_loan_amount
            ),
            json!({
                "min": self.min_loan_amount,
                "max": self.max_loan_amount,
            }),
        ))
    }

    pub fn check_loan_term(&self, loan_term: u32) -> EngineResult<()> {
        if self.available_terms.contains(&loan_term) {
            return Ok(());
        }
        Err(EngineError::invalid_request_field(
            "loan_term",
            &format!("Loan term {loan_term} is not an available product term."),
            json!({ "available_terms": self.available_terms }),
        ))
    }

    /// Total interest on `amount` over `term` months, capped at `total_cost_cap` of principal.
    pub fn interest_for(&self, amount: f64, term: u32) -> f64 {
        let days = f64::from(term) * self.days_per_month;
        (amount * self.daily_interest_rate * days).min(amount * self.total_cost_cap)
    }

    pub fn monthly_repayment(&self, amount: f64, term: u32) -> f64 {
        if amount <= 0.0 || term == 0 {
            return 0.0;
        }
        (amount + self.interest_for(amount, term)) / f64::from(term)
    }

    /// Largest principal, in `amount_step` increments, whose repayment leaves at least
    /// `min_disposable_buffer` of `monthly_disposable`.
    pub fn max_affordable_amount(&self, monthly_disposable: f64, term: u32) -> f64 {
        if term == 0 || !monthly_disposable.is_finite() {
            return 0.0;
        }
        let headroom = monthly_disposable - self.min_disposable_buffer;
        if headroom <= 0.0 {
            return 0.0;
        }
        let days = f64::from(term) * self.days_per_month;
        let cost_factor = 1.0 + (self.daily_interest_rate * days).min(self.total_cost_cap);
        let principal = headroom * f64::from(term) / cost_factor;
        floor_to_step(principal, self.amount_step)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategorizationSettings {
    pub fuzzy_threshold: f64,
    pub fuzzy_min_keyword_len: usize,
    pub transfer_amount_tolerance: f64,
    pub transfer_window_days: i64,
    pub recurrence_tolerance_pct: f64,
    pub gig_income_weight: f64,
    pub uncategorized_credit_weight: f64,
    pub verified_income_confidence: f64,
    pub default_months_of_data: u32,
}

impl Default for CategorizationSettings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 80.0,
            fuzzy_min_keyword_len: 5,
            transfer_amount_tolerance: 0.01,
            transfer_window_days: 1,
            recurrence_tolerance_pct: 20.0,
            gig_income_weight: 0.7,
            uncategorized_credit_weight: 0.5,
            verified_income_confidence: 0.90,
            default_months_of_data: 3,
        }
    }
}

pub const MAX_MONTHS_OF_DATA: u32 = 24;

impl ScoringConfig {
    pub fn from_json_str(content: &str) -> EngineResult<Self> {
        let config = serde_json::from_str::<Self>(content)
            .map_err(|error| EngineError::config_invalid("document", &error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|error| EngineError::config_unreadable(path, &error.to_string()))?;
        Self::from_json_str(&content)
    }

    /// First score limit whose `min_score` the score reaches. Limits are kept highest first.
    pub fn score_limit_for(&self, score: f64) -> Option<&ScoreLimit> {
        self.score_limits.iter().find(|limit| score >= limit.min_score)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.version.trim().is_empty() {
            return Err(EngineError::config_invalid("version", "must not be empty"));
        }

        let hard = &self.hard_decline;
        non_negative("hard_decline.min_monthly_income", hard.min_monthly_income)?;
        non_negative(
            "hard_decline.max_gambling_percentage",
            hard.max_gambling_percentage,
        )?;

        let policy = &self.policy_rules;
        non_negative(
            "policy_rules.no_verifiable_income_below.limit",
            policy.no_verifiable_income_below.limit,
        )?;
        finite(
            "policy_rules.min_post_loan_disposable.limit",
            policy.min_post_loan_disposable.limit,
        )?;
        non_negative(
            "policy_rules.max_projected_dti.limit",
            policy.max_projected_dti.limit,
        )?;
        finite(
            "policy_rules.min_stressed_disposable.limit",
            policy.min_stressed_disposable.limit,
        )?;

        let decision = &self.decision;
        within("decision.approve_min", decision.approve_min, 0.0, 100.0)?;
        within("decision.refer_min", decision.refer_min, 0.0, 100.0)?;
        if decision.approve_min <= decision.refer_min {
            return Err(EngineError::config_invalid(
                "decision.approve_min",
                "must be greater than decision.refer_min",
            ));
        }

        self.validate_points()?;

        let flags = &self.risk_flags;
        non_negative("risk_flags.min_income_stability", flags.min_income_stability)?;
        non_negative(
            "risk_flags.min_monthly_debt_payments",
            flags.min_monthly_debt_payments,
        )?;

        let tiers = &self.tiers;
        if tiers.watch_min_flags == 0 || tiers.watch_min_flags >= tiers.flag_min_flags {
            return Err(EngineError::config_invalid(
                "tiers.watch_min_flags",
                "must be at least 1 and below tiers.flag_min_flags",
            ));
        }
        validate_tier("tiers.watch", tiers.watch)?;
        validate_tier("tiers.flag", tiers.flag)?;

        self.validate_score_limits()?;
        self.validate_product()?;
        self.validate_categorization()
    }

    fn validate_points(&self) -> EngineResult<()> {
        let points = &self.points;
        points.income_stability.validate("points.income_stability")?;
        points.income_regularity.validate("points.income_regularity")?;
        finite(
            "points.income_verification.verified",
            points.income_verification.verified,
        )?;
        finite(
            "points.income_verification.unverified",
            points.income_verification.unverified,
        )?;
        if points.income_verification.unverified > points.income_verification.verified {
            return Err(EngineError::config_invalid(
                "points.income_verification.unverified",
                "must not exceed the verified points",
            ));
        }
        points.dti_ratio.validate("points.dti_ratio")?;
        points.disposable_income.validate("points.disposable_income")?;
        points
            .post_loan_disposable
            .validate("points.post_loan_disposable")?;
        points.failed_payments.validate("points.failed_payments")?;
        points.overdraft_days.validate("points.overdraft_days")?;
        points.average_balance.validate("points.average_balance")?;
        points
            .gambling_percentage
            .validate("points.gambling_percentage")?;
        points.active_hcstc.validate("points.active_hcstc")
    }

    fn validate_score_limits(&self) -> EngineResult<()> {
        for (position, limit) in self.score_limits.iter().enumerate() {
            let path = format!("score_limits[{position}]");
            within(&format!("{path}.min_score"), limit.min_score, 0.0, 100.0)?;
            non_negative(&format!("{path}.max_amount"), limit.max_amount)?;
            if let Some(previous) = position.checked_sub(1).map(|p| self.score_limits[p])
                && limit.min_score >= previous.min_score
            {
                return Err(EngineError::config_invalid(
                    &format!("{path}.min_score"),
                    "score limits must be listed from the highest min_score down",
                ));
            }
        }
        Ok(())
    }

    fn validate_product(&self) -> EngineResult<()> {
        let product = &self.product;
        non_negative("product.min_loan_amount", product.min_loan_amount)?;
        non_negative("product.max_loan_amount", product.max_loan_amount)?;
        if product.min_loan_amount > product.max_loan_amount {
            return Err(EngineError::config_invalid(
                "product.min_loan_amount",
                "must not exceed product.max_loan_amount",
            ));
        }
        if product.available_terms.is_empty() || product.available_terms.contains(&0) {
            return Err(EngineError::config_invalid(
                "product.available_terms",
                "must list at least one term and no zero terms",
            ));
        }
        finite("product.daily_interest_rate", product.daily_interest_rate)?;
        if product.daily_interest_rate <= 0.0 {
            return Err(EngineError::config_invalid(
                "product.daily_interest_rate",
                "must be greater than zero",
            ));
        }
        positive("product.total_cost_cap", product.total_cost_cap)?;
        positive("product.days_per_month", product.days_per_month)?;
        non_negative("product.min_disposable_buffer", product.min_disposable_buffer)?;
        finite("product.expense_shock_buffer", product.expense_shock_buffer)?;
        if product.expense_shock_buffer < 1.0 {
            return Err(EngineError::config_invalid(
                "product.expense_shock_buffer",
                "must be at least 1",
            ));
        }
        positive("product.amount_step", product.amount_step)
    }

    fn validate_categorization(&self) -> EngineResult<()> {
        let settings = &self.categorization;
        within(
            "categorization.fuzzy_threshold",
            settings.fuzzy_threshold,
            0.0,
            100.0,
        )?;
        if settings.fuzzy_min_keyword_len == 0 {
            return Err(EngineError::config_invalid(
                "categorization.fuzzy_min_keyword_len",
                "must be at least 1",
            ));
        }
        non_negative(
            "categorization.transfer_amount_tolerance",
            settings.transfer_amount_tolerance,
        )?;
        if settings.transfer_window_days < 0 {
            return Err(EngineError::config_invalid(
                "categorization.transfer_window_days",
                "must not be negative",
            ));
        }
        within(
            "categorization.recurrence_tolerance_pct",
            settings.recurrence_tolerance_pct,
            0.0,
            100.0,
        )?;
        within(
            "categorization.gig_income_weight",
            settings.gig_income_weight,
            0.0,
            1.0,
        )?;
        within(
            "categorization.uncategorized_credit_weight",
            settings.uncategorized_credit_weight,
            0.0,
            1.0,
        )?;
        within(
            "categorization.verified_income_confidence",
            settings.verified_income_confidence,
            0.0,
            1.0,
        )?;
        if settings.default_months_of_data == 0
            || settings.default_months_of_data > MAX_MONTHS_OF_DATA
        {
            return Err(EngineError::config_invalid(
                "categorization.default_months_of_data",
                "must be between 1 and 24",
            ));
        }
        Ok(())
    }
}

pub(crate) fn floor_to_step(value: f64, step: f64) -> f64 {
    if value <= 0.0 || step <= 0.0 {
        return 0.0;
    }
    (value / step + 1e-9).floor() * step
}

fn validate_tier(setting: &str, tier: TierAdjustment) -> EngineResult<()> {
    if !tier.amount_factor.is_finite() || tier.amount_factor <= 0.0 || tier.amount_factor > 1.0 {
        return Err(EngineError::config_invalid(
            &format!("{setting}.amount_factor"),
            "must be within (0, 1]",
        ));
    }
    if tier.max_term == 0 {
        return Err(EngineError::config_invalid(
            &format!("{setting}.max_term"),
            "must be greater than zero",
        ));
    }
    Ok(())
}

fn finite(setting: &str, value: f64) -> EngineResult<()> {
    if value.is_finite() {
        return Ok(());
    }
    Err(EngineError::config_invalid(setting, "must be a finite number"))
}

fn non_negative(setting: &str, value: f64) -> EngineResult<()> {
    finite(setting, value)?;
    if value < 0.0 {
        return Err(EngineError::config_invalid(setting, "must not be negative"));
    }
    Ok(())
}

fn positive(setting: &str, value: f64) -> EngineResult<()> {
    finite(setting, value)?;
    if value <= 0.0 {
        return Err(EngineError::config_invalid(setting, "must be greater than zero"));
    }
    Ok(())
}

fn within(setting: &str, value: f64, min: f64, max: f64) -> EngineResult<()> {
    finite(setting, value)?;
    if value < min || value > max {
        return Err(EngineError::config_invalid(
            setting,
            &format!("must be between {min} and {max}"),
        ));
    }
    Ok(())
}
