pub mod category;
pub mod engine;
pub mod fuzzy;
pub mod matcher;
pub mod preprocess;
pub mod rules;
pub mod summary;

pub use category::{Category, Subcategory};
pub use engine::{Categorization, CategoryMatch, TransactionCategorizer};
pub use fuzzy::FuzzyBackend;
pub use matcher::{MatchMethod, PatternMatcher};
pub use rules::{Direction, RuleBook, RuleGroup};
pub use summary::{BucketStats, CategorySummary};
