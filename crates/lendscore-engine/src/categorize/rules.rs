use regex::Regex;
use serde::Serialize;

use crate::categorize::category::{Category, Subcategory};
use crate::{EngineError, EngineResult};

/// Fixed evaluation order across category groups.
pub const CATEGORY_ORDER: [Category; 6] = [
    Category::Transfer,
    Category::Income,
    Category::Debt,
    Category::Essential,
    Category::Risk,
    Category::Positive,
];

/// Which side of the ledger a rule group may claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Credit,
    Debit,
    Any,
}

impl Direction {
    pub fn admits(self, amount: f64) -> bool {
        match self {
            Self::Credit => amount < 0.0,
            Self::Debit => amount > 0.0,
            Self::Any => true,
        }
    }
}

/// Static declaration of one rule group, compiled into a [`RuleGroup`].
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub subcategory: Subcategory,
    pub direction: Direction,
    pub keywords: &'static [&'static str],
    pub patterns: &'static [&'static str],
}

#[derive(Debug, Clone)]
pub struct RuleGroup {
    pub subcategory: Subcategory,
    pub direction: Direction,
    pub keywords: Vec<String>,
    pub patterns: Vec<Regex>,
}

impl RuleGroup {
    pub fn category(&self) -> Category {
        self.subcategory.category()
    }

    pub fn applies_to(&self, amount: f64) -> bool {
        self.direction.admits(amount)
    }
}

/// Ordered list of rule groups. Evaluation walks the list front to back, so the
/// declared order is the tie-break.
#[derive(Debug, Clone)]
pub struct RuleBook {
    groups: Vec<RuleGroup>,
}

impl RuleBook {
    pub fn builtin() -> EngineResult<Self> {
        Self::from_specs(BUILTIN_RULES)
    }

    pub fn from_specs(specs: &[RuleSpec]) -> EngineResult<Self> {
        let mut groups = Vec::with_capacity(specs.len());
        let mut last_rank = 0usize;

        for spec in specs {
            let category = spec.subcategory.category();
            let Some(rank) = CATEGORY_ORDER.iter().position(|value| *value == category) else {
                return Err(EngineError::config_invalid(
                    &format!("rules.{}", spec.subcategory.as_str()),
                    "uncategorized buckets cannot carry match rules",
                ));
            };
            if rank < last_rank {
                return Err(EngineError::config_invalid(
                    &format!("rules.{}", spec.subcategory.as_str()),
                    "rule groups must follow transfer, income, debt, essential, risk, positive order",
                ));
            }
            last_rank = rank;

            let patterns = spec
                .patterns
                .iter()
                .map(|pattern| {
                    Regex::new(pattern)
                        .map_err(|error| EngineError::pattern_invalid(pattern, &error.to_string()))
                })
                .collect::<EngineResult<Vec<Regex>>>()?;

            groups.push(RuleGroup {
                subcategory: spec.subcategory,
                direction: spec.direction,
                keywords: spec
                    .keywords
                    .iter()
                    .map(|keyword| keyword.to_uppercase())
                    .collect(),
                patterns,
            });
        }

        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[RuleGroup] {
        &self.groups
    }

    pub fn transfer_groups(&self) -> impl Iterator<Item = &RuleGroup> {
        self.groups
            .iter()
            .filter(|group| group.category() == Category::Transfer)
    }
}

pub const BUILTIN_RULES: &[RuleSpec] = &[
    RuleSpec {
        subcategory: Subcategory::Internal,
        direction: Direction::Any,
        keywords: &[
            "OWN ACCOUNT",
            "INTERNAL TRANSFER",
            "INTERNAL TFR",
            "FROM SAVINGS",
            "FROM CURRENT",
            "SELF TRANSFER",
            "MOVED FROM",
            "MOVED TO",
            "BETWEEN ACCOUNTS",
        ],
        patterns: &[
            r"(?i)own\s*account",
            r"(?i)internal\s*(transfer|tfr)",
            r"(?i)from\s*(savings|current)",
            r"(?i)between\s*accounts",
            r"(?i)self\s*transfer",
            r"(?i)(moved|move)\s*(from|to)\s*(savings|current)",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::Refund,
        direction: Direction::Credit,
        keywords: &[
            "REFUND",
            "REFUNDED",
            "REIMBURSEMENT",
            "CASHBACK",
            "CREDIT ADJUSTMENT",
        ],
        patterns: &[r"(?i)\brefund(ed)?\b", r"(?i)reimburse", r"(?i)cash\s*back"],
    },
    RuleSpec {
        subcategory: Subcategory::LoanDisbursement,
        direction: Direction::Credit,
        keywords: &[
            "LOAN DISBURSEMENT",
            "LOAN ADVANCE",
            "LOAN PAYOUT",
            "LENDABLE",
            "ZOPA",
            "LENDING STREAM",
            "DRAFTY",
            "MR LENDER",
            "MONEYBOAT",
            "CREDITSPRING",
            "CASHFLOAT",
            "QUIDMARKET",
            "LOANS 2 GO",
            "CASHASAP",
            "POLAR CREDIT",
            "118 118 MONEY",
            "THE MONEY PLATFORM",
            "FAST LOAN UK",
            "SALAD MONEY",
            "FAIR FINANCE",
        ],
        patterns: &[
            r"(?i)loan\s*(disbursement|advance|payout)",
            r"(?i)(loan|loans)\s*(reversal|refund)",
            r"(?i)lending\s*stream|mr\s*lender|loans\s*2\s*go|polar\s*credit|salad\s*money",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::Salary,
        direction: Direction::Credit,
        keywords: &[
            "SALARY",
            "WAGES",
            "WAGE",
            "PAYROLL",
            "NET PAY",
            "MONTHLY PAY",
            "PAYSLIP",
            "EMPLOYER",
        ],
        patterns: &[
            r"(?i)salary|wages|payroll|net\s*pay",
            r"(?i)\b(employer|company)\s*(payment|pay)\b",
            r"(?i)bacs\s*credit",
            r"(?i)monthly\s*pay",
            r"(?i)\b(ltd|plc|limited)\s*(credit|payment)",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::Benefits,
        direction: Direction::Credit,
        keywords: &[
            "UNIVERSAL CREDIT",
            "DWP",
            "HMRC",
            "CHILD BENEFIT",
            "PIP",
            "DLA",
            "ESA",
            "JSA",
            "PENSION CREDIT",
            "HOUSING BENEFIT",
            "TAX CREDIT",
            "WORKING TAX",
            "CHILD TAX",
            "CARERS ALLOWANCE",
            "ATTENDANCE ALLOWANCE",
            "MATERNITY ALLOWANCE",
        ],
        patterns: &[
            r"(?i)universal\s*credit",
            r"(?i)\buc\b",
            r"(?i)\bdwp\b",
            r"(?i)child\s*benefit",
            r"(?i)pension\s*credit",
            r"(?i)housing\s*benefit",
            r"(?i)tax\s*credit",
            r"(?i)carers?\s*allowance",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::Pension,
        direction: Direction::Credit,
        keywords: &[
            "STATE PENSION",
            "PENSION",
            "ANNUITY",
            "RETIREMENT",
            "SCOTTISH WIDOWS",
            "STANDARD LIFE",
            "ROYAL LONDON",
            "AEGON",
            "AVIVA",
        ],
        patterns: &[
            r"(?i)\bpension\b",
            r"(?i)annuity",
            r"(?i)retirement\s*(income|payment)",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::GigEconomy,
        direction: Direction::Credit,
        keywords: &[
            "UBER",
            "DELIVEROO",
            "JUST EAT",
            "BOLT",
            "LYFT",
            "FIVERR",
            "UPWORK",
            "EBAY",
            "VINTED",
            "DEPOP",
            "TASKRABBIT",
            "ETSY",
            "AMAZON FLEX",
        ],
        patterns: &[
            r"(?i)\buber\b",
            r"(?i)deliveroo",
            r"(?i)just\s*eat",
            r"(?i)fiverr",
            r"(?i)upwork",
            r"(?i)\bebay\b",
            r"(?i)vinted",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::Interest,
        direction: Direction::Credit,
        keywords: &["GROSS INTEREST", "CREDIT INTEREST", "INTEREST PAID", "INTEREST"],
        patterns: &[r"(?i)\binterest\s*(paid|earned|credit)\b", r"(?i)\bint\s*paid\b"],
    },
    RuleSpec {
        subcategory: Subcategory::HcstcPayday,
        direction: Direction::Debit,
        keywords: &[
            "LENDING STREAM",
            "DRAFTY",
            "MR LENDER",
            "MONEYBOAT",
            "CREDITSPRING",
            "CASHFLOAT",
            "QUIDMARKET",
            "LOANS 2 GO",
            "CASHASAP",
            "POLAR CREDIT",
            "118 118 MONEY",
            "THE MONEY PLATFORM",
            "FAST LOAN UK",
            "CONDUIT",
            "SALAD MONEY",
            "FAIR FINANCE",
        ],
        patterns: &[
            r"(?i)lending\s*stream",
            r"(?i)mr\s*lender",
            r"(?i)loans\s*2\s*go",
            r"(?i)polar\s*credit",
            r"(?i)118\s*118\s*money",
            r"(?i)(the\s*)?money\s*platform",
            r"(?i)fast\s*loan\s*uk",
            r"(?i)salad\s*money",
            r"(?i)fair\s*finance",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::OtherLoans,
        direction: Direction::Debit,
        keywords: &[
            "PERSONAL LOAN",
            "CAR FINANCE",
            "AUTO FINANCE",
            "VEHICLE FINANCE",
            "ZOPA",
            "NOVUNA",
            "FINIO LOANS",
            "EVLO",
            "EVERYDAY LOANS",
            "BAMBOO",
            "LIVELEND",
            "LOAN",
            "FINANCE",
        ],
        patterns: &[
            r"(?i)\bloan\s*(repayment|payment)?\b",
            r"(?i)\bhp\s*(payment|repayment)\b",
            r"(?i)finance\s*(payment|agreement)",
            r"(?i)everyday\s*loans?",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::CreditCards,
        direction: Direction::Debit,
        keywords: &[
            "VANQUIS",
            "AQUA",
            "CAPITAL ONE",
            "MARBLES",
            "ZABLE",
            "TYMIT",
            "FLUID CARD",
            "CHROME CARD",
            "BARCLAYCARD",
            "AMERICAN EXPRESS",
            "AMEX",
            "MBNA",
            "NEWDAY",
        ],
        patterns: &[
            r"(?i)capital\s*one",
            r"(?i)fluid\s*(card|credit|payment)",
            r"(?i)credit\s*card\s*(payment|minimum|balance)",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::Bnpl,
        direction: Direction::Debit,
        keywords: &[
            "KLARNA",
            "CLEARPAY",
            "ZILCH",
            "MONZO FLEX",
            "PAY IN 3",
            "RIVERTY",
            "PAYL8R",
        ],
        patterns: &[r"(?i)monzo\s*flex", r"(?i)paypal\s*pay\s*in\s*3"],
    },
    RuleSpec {
        subcategory: Subcategory::Catalogue,
        direction: Direction::Debit,
        keywords: &[
            "LITTLEWOODS",
            "JD WILLIAMS",
            "FREEMANS",
            "GRATTAN",
            "SIMPLY BE",
            "JACAMO",
            "AMBROSE WILSON",
            "FASHION WORLD",
            "CATALOGUE PAYMENT",
            "CATALOG PAYMENT",
        ],
        patterns: &[
            r"(?i)\bvery\s*(catalogue|account|payment)\b",
            r"(?i)\bstudio\s*(catalogue|account|payment)\b",
            r"(?i)jd\s*williams",
            r"(?i)catalogu?e?\s*(payment|account|credit)",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::Rent,
        direction: Direction::Debit,
        keywords: &[
            "RENT",
            "LANDLORD",
            "LETTING",
            "TENANCY",
            "HOUSING ASSOCIATION",
        ],
        patterns: &[
            r"(?i)\brent\b",
            r"(?i)letting\s*(agent|agency)",
            r"(?i)housing\s*association",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::Mortgage,
        direction: Direction::Debit,
        keywords: &["MORTGAGE", "HOME LOAN"],
        patterns: &[r"(?i)mortgage", r"(?i)home\s*loan", r"(?i)building\s*society"],
    },
    RuleSpec {
        subcategory: Subcategory::CouncilTax,
        direction: Direction::Debit,
        keywords: &[
            "COUNCIL TAX",
            "LOCAL AUTHORITY",
            "BOROUGH COUNCIL",
            "CITY COUNCIL",
            "DISTRICT COUNCIL",
            "COUNTY COUNCIL",
        ],
        patterns: &[
            r"(?i)council\s*tax",
            r"(?i)(borough|city|district|county)\s*council",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::Utilities,
        direction: Direction::Debit,
        keywords: &[
            "BRITISH GAS",
            "EDF",
            "EON",
            "E.ON",
            "SSE",
            "OCTOPUS ENERGY",
            "OCTOPUS",
            "BULB",
            "SCOTTISH POWER",
            "THAMES WATER",
            "SEVERN TRENT",
            "ANGLIAN WATER",
            "UNITED UTILITIES",
            "SOUTHERN WATER",
            "YORKSHIRE WATER",
            "ELECTRICITY",
            "ENERGY",
            "GAS",
            "WATER",
        ],
        patterns: &[
            r"(?i)british\s*gas",
            r"(?i)scottish\s*power",
            r"(?i)thames\s*water",
            r"(?i)severn\s*trent",
            r"(?i)\b(electricity|gas|water)\s*(bill|payment)\b",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::Communications,
        direction: Direction::Debit,
        keywords: &[
            "BT",
            "SKY DIGITAL",
            "SKY TV",
            "SKY BROADBAND",
            "SKY MOBILE",
            "VIRGIN MEDIA",
            "VODAFONE",
            "O2",
            "THREE",
            "TV LICENCE",
            "PLUSNET",
            "TALKTALK",
            "NOW TV",
            "NETFLIX",
            "DISNEY",
            "AMAZON PRIME",
            "SPOTIFY",
        ],
        patterns: &[
            r"(?i)\bbt\s*(broadband|phone|bill)\b",
            r"(?i)\bsky\s*(tv|broadband|bill|digital|mobile)\b",
            r"(?i)\bee\b",
            r"(?i)tv\s*lic(e|en)(s|c)e",
            r"(?i)mobile\s*(phone|contract|bill)",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::Insurance,
        direction: Direction::Debit,
        keywords: &[
            "INSURANCE",
            "AVIVA",
            "DIRECT LINE",
            "ADMIRAL",
            "RAC",
            "CHURCHILL",
            "HASTINGS",
            "MORE THAN",
            "SWINTON",
            "ESURE",
        ],
        patterns: &[
            r"(?i)insurance\s*(premium|payment)?",
            r"(?i)\baa\s*(insurance|breakdown|membership)\b",
            r"(?i)direct\s*line",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::Transport,
        direction: Direction::Debit,
        keywords: &[
            "SHELL",
            "ESSO",
            "TEXACO",
            "FUEL",
            "PETROL",
            "DIESEL",
            "TFL",
            "OYSTER",
            "NATIONAL RAIL",
            "TRAINLINE",
            "RAILCARD",
            "BUS PASS",
            "PARKING",
            "CONGESTION",
        ],
        patterns: &[
            r"(?i)\bbp\b",
            r"(?i)national\s*rail",
            r"(?i)congestion\s*charge",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::Groceries,
        direction: Direction::Debit,
        keywords: &[
            "TESCO",
            "SAINSBURY",
            "ASDA",
            "MORRISONS",
            "ALDI",
            "LIDL",
            "WAITROSE",
            "M&S FOOD",
            "MARKS SPENCER",
            "CO-OP",
            "COOP",
            "ICELAND",
            "FARMFOODS",
            "OCADO",
            "AMAZON FRESH",
        ],
        patterns: &[r"(?i)marks\s*(and|&)?\s*spencer", r"(?i)\bco-?op\b"],
    },
    RuleSpec {
        subcategory: Subcategory::Childcare,
        direction: Direction::Debit,
        keywords: &[
            "NURSERY",
            "CHILDCARE",
            "CHILDMINDER",
            "CRECHE",
            "PRESCHOOL",
            "AFTER SCHOOL",
            "BREAKFAST CLUB",
            "HOLIDAY CLUB",
            "NANNY",
        ],
        patterns: &[r"(?i)pre-?school", r"(?i)after\s*school"],
    },
    RuleSpec {
        subcategory: Subcategory::Gambling,
        direction: Direction::Any,
        keywords: &[
            "BET365",
            "BETFAIR",
            "WILLIAM HILL",
            "LADBROKES",
            "CORAL",
            "PADDY POWER",
            "BETFRED",
            "888",
            "888SPORT",
            "888CASINO",
            "888POKER",
            "POKERSTARS",
            "NATIONAL LOTTERY",
            "GROSVENOR CASINO",
            "TOMBOLA",
            "SKYBET",
            "SKY BET",
            "UNIBET",
            "BWIN",
            "BETWAY",
            "FANDUEL",
            "DRAFTKINGS",
            "CASUMO",
            "CASINO",
            "BINGO",
            "SLOTS",
            "POKER",
            "GAMBLING",
            "BETTING",
        ],
        patterns: &[
            r"(?i)bet365",
            r"(?i)william\s*hill",
            r"(?i)paddy\s*power",
            r"(?i)national\s*lottery",
            r"(?i)\blotto\b",
            r"(?i)\b888\s*(casino|poker|sport|ladies|bingo)",
            r"(?i)sky\s*bet",
            r"(?i)casino",
            r"(?i)gambling|betting",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::BankCharges,
        direction: Direction::Any,
        keywords: &[
            "UNPAID ITEM CHARGE",
            "UNPAID TRANSACTION FEE",
            "RETURNED ITEM FEE",
            "RETURNED DD FEE",
            "UNPAID DD CHARGE",
            "UNPAID SO CHARGE",
            "BOUNCE FEE",
            "RETURNED PAYMENT FEE",
            "INSUFFICIENT FUNDS FEE",
            "NSF FEE",
            "OVERDRAFT FEE",
            "PENALTY CHARGE",
            "UNPAID CHARGE",
        ],
        patterns: &[
            r"(?i)\b(unpaid|returned|bounced|failed|dishono(u)?red)\b.*\b(charge|fee)\b",
            r"(?i)\b(charge|fee)\b.*\b(unpaid|returned|bounced|failed|nsf|insufficient|dishono(u)?red)\b",
            r"(?i)\boverdraft\b.*\b(charge|fee)\b",
            r"(?i)\binsufficient\s*funds\b.*\b(charge|fee)\b",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::FailedPayments,
        direction: Direction::Any,
        keywords: &[
            "UNPAID DIRECT DEBIT",
            "UNPAID DD",
            "DD UNPAID",
            "RETURNED DIRECT DEBIT",
            "RETURNED DD",
            "DD RETURNED",
            "BOUNCED PAYMENT",
            "BOUNCED DD",
            "PAYMENT RETURNED",
            "PAYMENT BOUNCED",
            "PAYMENT FAILED",
            "FAILED DIRECT DEBIT",
            "FAILED DD",
            "DD FAILED",
            "DISHONOURED DD",
            "DISHONOURED DIRECT DEBIT",
            "DISHONOURED PAYMENT",
            "RETURNED PAYMENT",
        ],
        patterns: &[
            r"(?i)\b(unpaid|returned|bounced|failed|dishono(u)?red)\s+(direct\s*debit|dd|payment)\b",
            r"(?i)\b(direct\s*debit|dd|payment)\s+(unpaid|returned|bounced|failed|dishono(u)?red)\b",
            r"(?i)\binsufficient\s*funds?\s+(direct\s*debit|dd)\b",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::DebtCollection,
        direction: Direction::Any,
        keywords: &[
            "DEBT COLLECTION",
            "LOWELL",
            "CABOT",
            "INTRUM",
            "HOIST",
            "PAST DUE CREDIT",
            "ARROW GLOBAL",
            "LINK FINANCIAL",
            "MOORCROFT",
            "CAPQUEST",
            "MACKENZIE HALL",
            "BW LEGAL",
            "DEBT RECOVERY",
            "COLLECTIONS",
        ],
        patterns: &[
            r"(?i)debt\s*collect(ion|or)?",
            r"(?i)\bdca\b",
            r"(?i)arrow\s*global",
            r"(?i)debt\s*recovery",
        ],
    },
    RuleSpec {
        subcategory: Subcategory::Savings,
        direction: Direction::Any,
        keywords: &[
            "SAVINGS",
            "ISA",
            "MONEYBOX",
            "PLUM",
            "NUTMEG",
            "VANGUARD",
            "FIDELITY",
            "HARGREAVES",
            "AJ BELL",
            "PREMIUM BONDS",
            "NS&I",
            "INVESTMENT",
        ],
        patterns: &[
            r"(?i)\bsavings\b",
            r"(?i)\bisa\b",
            r"(?i)premium\s*bonds?",
            r"(?i)ns&?i\b",
        ],
    },
];
