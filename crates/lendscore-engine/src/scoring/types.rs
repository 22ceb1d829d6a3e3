use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approve,
    Refer,
    Decline,
}

impl Decision {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::Refer => "REFER",
            Self::Decline => "DECLINE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::VeryHigh => "VERY_HIGH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Clean,
    Watch,
    Flag,
}

impl RiskTier {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clean => "CLEAN",
            Self::Watch => "WATCH",
            Self::Flag => "FLAG",
        }
    }
}

/// Total score, or its absence when a hard decline stopped the run before point scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Score {
    Computed { value: f64 },
    NotComputed,
}

impl Score {
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Computed { value } => Some(value),
            Self::NotComputed => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    HardDeclineCheck,
    PointScoring,
    Approve,
    Refer,
    Decline,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::HardDeclineCheck => "hard_decline_check",
            Self::PointScoring => "point_scoring",
            Self::Approve => "approve",
            Self::Refer => "refer",
            Self::Decline => "decline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclineCode {
    IncomeBelowMinimum,
    TooManyHcstcLenders,
    GamblingAboveMaximum,
    TooManyFailedPayments,
    NoVerifiableIncome,
    PostLoanDisposableBelowMinimum,
    TooManyDebtCollectors,
    ProjectedDtiAboveMaximum,
    TooManyBankCharges,
    TooManyCreditProviders,
    StressedDisposableBelowMinimum,
}

impl DeclineCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IncomeBelowMinimum => "income_below_minimum",
            Self::TooManyHcstcLenders => "too_many_hcstc_lenders",
            Self::GamblingAboveMaximum => "gambling_above_maximum",
            Self::TooManyFailedPayments => "too_many_failed_payments",
            Self::NoVerifiableIncome => "no_verifiable_income",
            Self::PostLoanDisposableBelowMinimum => "post_loan_disposable_below_minimum",
            Self::TooManyDebtCollectors => "too_many_debt_collectors",
            Self::ProjectedDtiAboveMaximum => "projected_dti_above_maximum",
            Self::TooManyBankCharges => "too_many_bank_charges",
            Self::TooManyCreditProviders => "too_many_credit_providers",
            Self::StressedDisposableBelowMinimum => "stressed_disposable_below_minimum",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeclineReason {
    pub code: DeclineCode,
    pub observed: f64,
    pub threshold: f64,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFlag {
    LowIncomeStability,
    LowDebtManagement,
    LowRecentCreditActivity,
    NoSavingsActivity,
}

impl RiskFlag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LowIncomeStability => "low_income_stability",
            Self::LowDebtManagement => "low_debt_management",
            Self::LowRecentCreditActivity => "low_recent_credit_activity",
            Self::NoSavingsActivity => "no_savings_activity",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct IncomeQualityPoints {
    pub income_stability: f64,
    pub income_regularity: f64,
    pub income_verification: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AffordabilityPoints {
    pub dti_ratio: f64,
    pub disposable_income: f64,
    pub post_loan_disposable: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AccountConductPoints {
    pub failed_payments: f64,
    pub overdraft_days: f64,
    pub average_balance: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RiskIndicatorPoints {
    pub gambling_percentage: f64,
    pub active_hcstc: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub income_quality: IncomeQualityPoints,
    pub affordability: AffordabilityPoints,
    pub account_conduct: AccountConductPoints,
    pub risk_indicators: RiskIndicatorPoints,
    pub total_score: f64,
    pub risk_flags: Vec<RiskFlag>,
    pub tier: RiskTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoanOffer {
    pub approved_amount: f64,
    pub approved_term: u32,
    pub monthly_repayment: f64,
    pub total_repayable: f64,
    pub total_interest: f64,
    pub apr: f64,
    pub daily_interest_rate: f64,
    /// True when a WATCH or FLAG tier reduced the amount or term.
    pub tier_adjusted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringResult {
    pub application_ref: String,
    pub decision: Decision,
    pub score: Score,
    pub risk_level: RiskLevel,
    pub score_breakdown: Option<ScoreBreakdown>,
    pub loan_offer: Option<LoanOffer>,
    pub risk_flags: Vec<RiskFlag>,
    pub decline_reasons: Vec<DeclineReason>,
    /// Policy rules that sent the application to manual review.
    pub referral_reasons: Vec<DeclineReason>,
    pub processing_notes: Vec<String>,
    pub stage_trail: Vec<Stage>,
    pub config_version: String,
}
