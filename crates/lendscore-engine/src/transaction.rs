use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One transaction as supplied by the caller, before validation.
///
/// Every field is kept as optional text so a malformed record can be reported
/// against its position instead of failing the whole batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub description: Option<String>,
    pub amount: Option<String>,
    pub date: Option<String>,
    pub merchant_name: Option<String>,
    pub provider_category_primary: Option<String>,
    pub provider_category_detailed: Option<String>,
    pub running_balance: Option<String>,
}

impl RawTransaction {
    pub fn new(description: &str, amount: f64, date: &str) -> Self {
        Self {
            description: Some(description.to_string()),
            amount: Some(amount.to_string()),
            date: Some(date.to_string()),
            ..Self::default()
        }
    }

    pub fn with_merchant(mut self, merchant_name: &str) -> Self {
        self.merchant_name = Some(merchant_name.to_string());
        self
    }

    pub fn with_provider_codes(mut self, primary: Option<&str>, detailed: Option<&str>) -> Self {
        self.provider_category_primary = primary.map(str::to_string);
        self.provider_category_detailed = detailed.map(str::to_string);
        self
    }

    pub fn with_running_balance(mut self, balance: f64) -> Self {
        self.running_balance = Some(balance.to_string());
        self
    }
}

/// A validated transaction. Negative amounts are money in, positive amounts are money out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub index: usize,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub merchant_name: Option<String>,
    pub provider_category_primary: Option<String>,
    pub provider_category_detailed: Option<String>,
    pub running_balance: Option<f64>,
}

impl Transaction {
    pub fn is_credit(&self) -> bool {
        self.amount < 0.0
    }

    pub fn is_debit(&self) -> bool {
        self.amount > 0.0
    }

    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }
}
