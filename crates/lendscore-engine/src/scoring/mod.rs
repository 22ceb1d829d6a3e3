pub mod engine;
pub mod offer;
pub mod types;

pub use engine::ScoringEngine;
pub use offer::{RepaymentSchedule, repayment_schedule};
pub use types::{
    Decision, DeclineCode, DeclineReason, LoanOffer, RiskFlag, RiskLevel, RiskTier, Score,
    ScoreBreakdown, ScoringResult, Stage,
};
