use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::categorize::category::{Category, Subcategory};
use crate::{EngineError, EngineResult};

pub const MAPPING_HEADERS: [&str; 4] = ["pfc_code", "category", "subcategory", "description"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingEntry {
    pub code: String,
    pub category: Category,
    pub subcategory: Subcategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Provider category code to internal category lookup, keyed by upper-cased code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProviderCategoryMap {
    entries: BTreeMap<String, MappingEntry>,
}

#[derive(Debug, Deserialize)]
struct MappingRow {
    pfc_code: String,
    category: String,
    subcategory: String,
    #[serde(default)]
    description: Option<String>,
}

impl ProviderCategoryMap {
    pub fn from_csv_str(content: &str) -> EngineResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|error| EngineError::mapping_invalid(1, "header", &error.to_string()))?
            .iter()
            .map(str::to_string)
            .collect::<Vec<String>>();
        for required in &MAPPING_HEADERS[..3] {
            if !headers.iter().any(|header| header == required) {
                return Err(EngineError::mapping_invalid(
                    1,
                    required,
                    "required header is missing",
                ));
            }
        }
        if let Some(unknown) = headers
            .iter()
            .find(|header| !MAPPING_HEADERS.contains(&header.as_str()))
        {
            return Err(EngineError::mapping_invalid(1, unknown, "unknown header"));
        }

        let mut entries = BTreeMap::new();
        for (offset, result) in reader.deserialize::<MappingRow>().enumerate() {
            // Line numbers count the header as row 1.
            let row = offset + 2;
            let record =
                result.map_err(|error| EngineError::mapping_invalid(row, "row", &error.to_string()))?;
            let code = record.pfc_code.trim().to_uppercase();
            if code.is_empty() {
                continue;
            }

            let Some(category) = Category::parse(&record.category) else {
                return Err(EngineError::mapping_invalid(
                    row,
                    "category",
                    &format!("unknown category `{}`", record.category),
                ));
            };
            let Some(subcategory) = Subcategory::parse(&record.subcategory) else {
                return Err(EngineError::mapping_invalid(
                    row,
                    "subcategory",
                    &format!("unknown subcategory `{}`", record.subcategory),
                ));
            };
            if subcategory.category() != category {
                return Err(EngineError::mapping_invalid(
                    row,
                    "subcategory",
                    &format!(
                        "`{}` belongs to `{}`, not `{}`",
                        subcategory.as_str(),
                        subcategory.category().as_str(),
                        category.as_str()
                    ),
                ));
            }
            if entries.contains_key(&code) {
                return Err(EngineError::mapping_invalid(
                    row,
                    "pfc_code",
                    &format!("code `{code}` is mapped more than once"),
                ));
            }

            let description = record
                .description
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty());
            entries.insert(
                code.clone(),
                MappingEntry {
                    code,
                    category,
                    subcategory,
                    description,
                },
            );
        }

        Ok(Self { entries })
    }

    pub fn load_from_path(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|error| EngineError::mapping_unreadable(path, &error.to_string()))?;
        Self::from_csv_str(&content)
    }

    /// The detailed code is consulted before the primary one.
    pub fn lookup(&self, primary: Option<&str>, detailed: Option<&str>) -> Option<&MappingEntry> {
        [detailed, primary]
            .into_iter()
            .flatten()
            .map(|code| code.trim().to_uppercase())
            .filter(|code| !code.is_empty())
            .find_map(|code| self.entries.get(&code))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::ProviderCategoryMap;
    use crate::categorize::category::Subcategory;

    const SAMPLE: &str = "pfc_code,category,subcategory,description\n\
        INCOME_WAGES,income,salary,Payroll credits\n\
        LOAN_PAYMENTS,debt,other_loans,\n\
        LOAN_PAYMENTS_PAYDAY,debt,hcstc_payday,Payday lenders\n";

    #[test]
    fn detailed_code_wins_over_primary() {
        let map = ProviderCategoryMap::from_csv_str(SAMPLE);
        assert!(map.is_ok());
        if let Ok(map) = map {
            assert_eq!(map.len(), 3);
            let entry = map.lookup(Some("LOAN_PAYMENTS"), Some("loan_payments_payday"));
            assert_eq!(entry.map(|e| e.subcategory), Some(Subcategory::HcstcPayday));
            let entry = map.lookup(Some("LOAN_PAYMENTS"), Some("UNKNOWN"));
            assert_eq!(entry.map(|e| e.subcategory), Some(Subcategory::OtherLoans));
            assert!(map.lookup(None, None).is_none());
        }
    }

    #[test]
    fn mismatched_subcategory_reports_row() {
        let map = ProviderCategoryMap::from_csv_str(
            "pfc_code,category,subcategory\nA,income,salary\nB,debt,groceries\n",
        );
        assert!(map.is_err());
        if let Err(error) = map {
            assert_eq!(error.code, "mapping_invalid");
            assert!(error.message.contains("row 3"));
        }
    }

    #[test]
    fn unknown_names_and_headers_are_rejected() {
        assert!(ProviderCategoryMap::from_csv_str("pfc_code,category,subcategory\nA,expense,groceries\n").is_err());
        assert!(ProviderCategoryMap::from_csv_str("pfc_code,category\nA,income\n").is_err());
        assert!(
            ProviderCategoryMap::from_csv_str("pfc_code,category,subcategory,extra\nA,income,salary,x\n")
                .is_err()
        );
        assert!(
            ProviderCategoryMap::from_csv_str("pfc_code,category,subcategory\nA,income,salary\na,income,pension\n")
                .is_err()
        );
    }
}
