use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Transfer,
    Income,
    Debt,
    Essential,
    Risk,
    Positive,
    Uncategorized,
}

impl Category {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Income => "income",
            Self::Debt => "debt",
            Self::Essential => "essential",
            Self::Risk => "risk",
            Self::Positive => "positive",
            Self::Uncategorized => "uncategorized",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "transfer" | "transfers" => Some(Self::Transfer),
            "income" => Some(Self::Income),
            "debt" => Some(Self::Debt),
            "essential" => Some(Self::Essential),
            "risk" => Some(Self::Risk),
            "positive" => Some(Self::Positive),
            "uncategorized" => Some(Self::Uncategorized),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subcategory {
    Internal,
    Refund,
    LoanDisbursement,
    Salary,
    Benefits,
    Pension,
    GigEconomy,
    Interest,
    OtherIncome,
    HcstcPayday,
    OtherLoans,
    CreditCards,
    Bnpl,
    Catalogue,
    Rent,
    Mortgage,
    CouncilTax,
    Utilities,
    Communications,
    Insurance,
    Transport,
    Groceries,
    Childcare,
    Gambling,
    BankCharges,
    FailedPayments,
    DebtCollection,
    Savings,
    UnmatchedCredit,
    UnmatchedDebit,
}

impl Subcategory {
    pub const ALL: [Subcategory; 30] = [
        Self::Internal,
        Self::Refund,
        Self::LoanDisbursement,
        Self::Salary,
        Self::Benefits,
        Self::Pension,
        Self::GigEconomy,
        Self::Interest,
        Self::OtherIncome,
        Self::HcstcPayday,
        Self::OtherLoans,
        Self::CreditCards,
        Self::Bnpl,
        Self::Catalogue,
        Self::Rent,
        Self::Mortgage,
        Self::CouncilTax,
        Self::Utilities,
        Self::Communications,
        Self::Insurance,
        Self::Transport,
        Self::Groceries,
        Self::Childcare,
        Self::Gambling,
        Self::BankCharges,
        Self::FailedPayments,
        Self::DebtCollection,
        Self::Savings,
        Self::UnmatchedCredit,
        Self::UnmatchedDebit,
    ];

    pub const fn category(self) -> Category {
        match self {
            Self::Internal => Category::Transfer,
            Self::Refund
            | Self::LoanDisbursement
            | Self::Salary
            | Self::Benefits
            | Self::Pension
            | Self::GigEconomy
            | Self::Interest
            | Self::OtherIncome => Category::Income,
            Self::HcstcPayday
            | Self::OtherLoans
            | Self::CreditCards
            | Self::Bnpl
            | Self::Catalogue => Category::Debt,
            Self::Rent
            | Self::Mortgage
            | Self::CouncilTax
            | Self::Utilities
            | Self::Communications
            | Self::Insurance
            | Self::Transport
            | Self::Groceries
            | Self::Childcare => Category::Essential,
            Self::Gambling | Self::BankCharges | Self::FailedPayments | Self::DebtCollection => {
                Category::Risk
            }
            Self::Savings => Category::Positive,
            Self::UnmatchedCredit | Self::UnmatchedDebit => Category::Uncategorized,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::Refund => "refund",
            Self::LoanDisbursement => "loan_disbursement",
            Self::Salary => "salary",
            Self::Benefits => "benefits",
            Self::Pension => "pension",
            Self::GigEconomy => "gig_economy",
            Self::Interest => "interest",
            Self::OtherIncome => "other_income",
            Self::HcstcPayday => "hcstc_payday",
            Self::OtherLoans => "other_loans",
            Self::CreditCards => "credit_cards",
            Self::Bnpl => "bnpl",
            Self::Catalogue => "catalogue",
            Self::Rent => "rent",
            Self::Mortgage => "mortgage",
            Self::CouncilTax => "council_tax",
            Self::Utilities => "utilities",
            Self::Communications => "communications",
            Self::Insurance => "insurance",
            Self::Transport => "transport",
            Self::Groceries => "groceries",
            Self::Childcare => "childcare",
            Self::Gambling => "gambling",
            Self::BankCharges => "bank_charges",
            Self::FailedPayments => "failed_payments",
            Self::DebtCollection => "debt_collection",
            Self::Savings => "savings",
            Self::UnmatchedCredit => "unmatched_credit",
            Self::UnmatchedDebit => "unmatched_debit",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let needle = value.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.as_str() == needle)
    }

    /// Income subcategories that count toward monthly income.
    pub const fn counts_as_income(self) -> bool {
        matches!(
            self,
            Self::Salary
                | Self::Benefits
                | Self::Pension
                | Self::GigEconomy
                | Self::Interest
                | Self::OtherIncome
        )
    }

    /// Stable sources keep their pattern confidence without recurrence evidence.
    pub const fn is_stable_income(self) -> bool {
        matches!(self, Self::Salary | Self::Benefits | Self::Pension)
    }

    /// Credits that look like income but never are.
    pub const fn is_non_income_credit(self) -> bool {
        matches!(self, Self::Internal | Self::Refund | Self::LoanDisbursement)
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, Subcategory};

    #[test]
    fn every_subcategory_round_trips_through_its_name() {
        for subcategory in Subcategory::ALL {
            assert_eq!(Subcategory::parse(subcategory.as_str()), Some(subcategory));
        }
    }

    #[test]
    fn parse_is_case_insensitive_and_rejects_unknown_names() {
        assert_eq!(Subcategory::parse(" Salary "), Some(Subcategory::Salary));
        assert_eq!(Subcategory::parse("lottery"), None);
        assert_eq!(Category::parse("RISK"), Some(Category::Risk));
        assert_eq!(Category::parse("expense"), None);
    }

    #[test]
    fn refunds_live_under_income_but_never_count() {
        assert_eq!(Subcategory::Refund.category(), Category::Income);
        assert!(!Subcategory::Refund.counts_as_income());
        assert!(Subcategory::Refund.is_non_income_credit());
        assert!(Subcategory::GigEconomy.counts_as_income());
        assert!(!Subcategory::GigEconomy.is_stable_income());
    }
}
