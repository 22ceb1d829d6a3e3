pub mod detector;

pub use detector::{
    CreditObservation, IncomeDetector, IncomeReason, IncomeVerdict, PatternEvidence,
    RecurrenceIndex,
};
