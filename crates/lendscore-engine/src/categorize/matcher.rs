use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::categorize::fuzzy::FuzzyBackend;
use crate::categorize::rules::{RuleBook, RuleGroup};

pub const KEYWORD_CONFIDENCE: f64 = 0.95;
pub const REGEX_CONFIDENCE: f64 = 0.90;
pub const FUZZY_FLOOR_CONFIDENCE: f64 = 0.70;
pub const FUZZY_CEILING_CONFIDENCE: f64 = 0.89;
/// Keywords this short must match a whole word.
pub const WHOLE_WORD_MAX_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Keyword,
    Regex,
    Fuzzy,
    ProviderOverride,
    Recurrence,
    TransferPair,
    None,
}

impl MatchMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Regex => "regex",
            Self::Fuzzy => "fuzzy",
            Self::ProviderOverride => "provider_override",
            Self::Recurrence => "recurrence",
            Self::TransferPair => "transfer_pair",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternHit {
    pub method: MatchMethod,
    pub confidence: f64,
    pub pattern: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherSettings {
    pub fuzzy_threshold: f64,
    pub fuzzy_min_keyword_len: usize,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 80.0,
            fuzzy_min_keyword_len: 5,
        }
    }
}

#[derive(Clone)]
pub struct PatternMatcher {
    settings: MatcherSettings,
    fuzzy: Option<Arc<dyn FuzzyBackend>>,
}

impl std::fmt::Debug for PatternMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternMatcher")
            .field("settings", &self.settings)
            .field("fuzzy_available", &self.fuzzy.is_some())
            .finish()
    }
}

impl PatternMatcher {
    pub fn new(settings: MatcherSettings, fuzzy: Option<Arc<dyn FuzzyBackend>>) -> Self {
        Self { settings, fuzzy }
    }

    pub fn fuzzy_available(&self) -> bool {
        self.fuzzy.is_some()
    }

    /// Runs keyword, regex and fuzzy stages against one group, stopping at the first hit.
    pub fn match_group(&self, text: &str, group: &RuleGroup) -> Option<PatternHit> {
        if let Some(keyword) = group
            .keywords
            .iter()
            .find(|keyword| contains_keyword(text, keyword))
        {
            return Some(PatternHit {
                method: MatchMethod::Keyword,
                confidence: KEYWORD_CONFIDENCE,
                pattern: keyword.clone(),
            });
        }

        if let Some(pattern) = group.patterns.iter().find(|regex| regex.is_match(text)) {
            return Some(PatternHit {
                method: MatchMethod::Regex,
                confidence: REGEX_CONFIDENCE,
                pattern: pattern.as_str().to_string(),
            });
        }

        self.fuzzy_hit(text, &group.keywords)
    }

    /// Walks the rule book in order and returns the first group admitting `amount` with a hit.
    pub fn classify<'a>(
        &self,
        text: &str,
        amount: f64,
        book: &'a RuleBook,
    ) -> Option<(&'a RuleGroup, PatternHit)> {
        book.groups()
            .iter()
            .filter(|group| group.applies_to(amount))
            .find_map(|group| self.match_group(text, group).map(|hit| (group, hit)))
    }

    pub fn matches_any<'a>(
        &self,
        text: &str,
        groups: impl IntoIterator<Item = &'a RuleGroup>,
    ) -> bool {
        groups
            .into_iter()
            .any(|group| self.match_group(text, group).is_some())
    }

    fn fuzzy_hit(&self, text: &str, keywords: &[String]) -> Option<PatternHit> {
        let backend = self.fuzzy.as_ref()?;
        let threshold = self.settings.fuzzy_threshold;
        let chars = text.chars().collect::<Vec<char>>();
        let starts = word_starts(&chars);
        let mut best: Option<(f64, &String)> = None;

        for keyword in keywords {
            let keyword_len = keyword.chars().count();
            if keyword_len < self.settings.fuzzy_min_keyword_len {
                continue;
            }
            // Windows open at a word start and span the keyword, so a keyword is never
            // scored against the tail of an unrelated word.
            let ratio = starts
                .iter()
                .filter(|start| **start + keyword_len <= chars.len())
                .map(|start| {
                    let window = chars[*start..*start + keyword_len].iter().collect::<String>();
                    backend.partial_ratio(keyword, &window)
                })
                .fold(0.0, f64::max);
            if ratio < threshold {
                continue;
            }
            if best.is_none_or(|(best_ratio, _)| ratio > best_ratio) {
                best = Some((ratio, keyword));
            }
        }

        best.map(|(ratio, keyword)| PatternHit {
            method: MatchMethod::Fuzzy,
            confidence: fuzzy_confidence(ratio, threshold),
            pattern: keyword.clone(),
        })
    }
}

fn word_starts(chars: &[char]) -> Vec<usize> {
    chars
        .iter()
        .enumerate()
        .filter(|(index, current)| {
            current.is_alphanumeric()
                && (*index == 0 || !chars[*index - 1].is_alphanumeric())
        })
        .map(|(index, _)| index)
        .collect()
}

/// Maps a ratio at or above `threshold` onto the fuzzy confidence range.
pub fn fuzzy_confidence(ratio: f64, threshold: f64) -> f64 {
    if threshold >= 100.0 {
        return FUZZY_CEILING_CONFIDENCE;
    }
    let span = FUZZY_CEILING_CONFIDENCE - FUZZY_FLOOR_CONFIDENCE;
    let scaled = FUZZY_FLOOR_CONFIDENCE + (ratio - threshold) / (100.0 - threshold) * span;
    round4(scaled.clamp(FUZZY_FLOOR_CONFIDENCE, FUZZY_CEILING_CONFIDENCE))
}

/// Keyword containment anchored at a word start: the keyword must open the text or follow
/// a non-alphanumeric character. Short keywords must also close the word, and a keyword
/// ending in a digit may not run on into further digits.
pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    if keyword.is_empty() {
        return false;
    }
    let whole_word = keyword.chars().count() <= WHOLE_WORD_MAX_LEN;
    let ends_in_digit = keyword.chars().next_back().is_some_and(|c| c.is_ascii_digit());
    text.match_indices(keyword).any(|(position, _)| {
        let opens_word = text[..position]
            .chars()
            .next_back()
            .is_none_or(|previous| !previous.is_alphanumeric());
        let next = text[position + keyword.len()..].chars().next();
        let closes_ok = match next {
            None => true,
            Some(next) if whole_word => !next.is_alphanumeric(),
            Some(next) => !(ends_in_digit && next.is_ascii_digit()),
        };
        opens_word && closes_ok
    })
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::{
        MatchMethod, MatcherSettings, PatternMatcher, contains_keyword, fuzzy_confidence,
    };
    use crate::categorize::category::Subcategory;
    use crate::categorize::fuzzy::default_backend;
    use crate::categorize::rules::RuleBook;

    fn matcher() -> PatternMatcher {
        PatternMatcher::new(MatcherSettings::default(), default_backend())
    }

    #[test]
    fn word_start_containment() {
        assert!(contains_keyword("SAINSBURYS S/MKTS", "SAINSBURY"));
        assert!(contains_keyword("CARD PAYMENT TO TESCO", "TESCO"));
        assert!(!contains_keyword("MONTHLY FEE", "EE"));
        assert!(contains_keyword("FEE EE MOBILE", "EE"));
        assert!(!contains_keyword("ANYTHING", ""));
    }

    #[test]
    fn short_and_numeric_keywords_must_close_the_word() {
        assert!(contains_keyword("888 CASINO", "888"));
        assert!(!contains_keyword("AMAZON MKTPLACE 888123", "888"));
        assert!(!contains_keyword("ISAAC PLUMBING LTD", "ISA"));
        assert!(!contains_keyword("PLUMBING SUPPLIES", "PLUM"));
        assert!(contains_keyword("PLUM FINTECH", "PLUM"));
        assert!(contains_keyword("STOCKS AND SHARES ISA", "ISA"));
        assert!(!contains_keyword("BET3650001", "BET365"));
        assert!(contains_keyword("BET365GAMES", "BET365"));
    }

    #[test]
    fn reference_numbers_and_trades_are_not_risk_or_savings() {
        let book = RuleBook::builtin();
        assert!(book.is_ok());
        if let Ok(book) = book {
            for text in [
                "AMAZON MKTPLACE 888123",
                "ISAAC PLUMBING LTD",
                "PLUMBING SUPPLIES",
            ] {
                let hit = matcher().classify(text, 1200.0, &book);
                assert!(
                    hit.as_ref().is_none_or(|(group, _)| {
                        group.subcategory != Subcategory::Gambling
                            && group.subcategory != Subcategory::Savings
                    }),
                    "{text} matched {:?}",
                    hit.map(|(group, hit)| (group.subcategory, hit.pattern))
                );
            }
        }
    }

    #[test]
    fn branded_888_is_still_gambling() {
        let book = RuleBook::builtin();
        assert!(book.is_ok());
        if let Ok(book) = book {
            let hit = matcher().classify("888SPORT", 25.0, &book);
            assert!(hit.is_some());
            if let Some((group, _)) = hit {
                assert_eq!(group.subcategory, Subcategory::Gambling);
            }
        }
    }

    #[test]
    fn keyword_beats_regex_inside_a_group() {
        let book = RuleBook::builtin();
        assert!(book.is_ok());
        if let Ok(book) = book {
            let hit = matcher().classify("ACME CORP SALARY", -2500.0, &book);
            assert!(hit.is_some());
            if let Some((group, hit)) = hit {
                assert_eq!(group.subcategory, Subcategory::Salary);
                assert_eq!(hit.method, MatchMethod::Keyword);
                assert!((hit.confidence - 0.95).abs() < f64::EPSILON);
                assert_eq!(hit.pattern, "SALARY");
            }
        }
    }

    #[test]
    fn direction_keeps_income_rules_off_debits() {
        let book = RuleBook::builtin();
        assert!(book.is_ok());
        if let Ok(book) = book {
            let hit = matcher().classify("SALARY ADVANCE REPAYMENT", 300.0, &book);
            assert!(
                hit.as_ref()
                    .is_none_or(|(group, _)| group.subcategory != Subcategory::Salary)
            );
        }
    }

    #[test]
    fn gambling_debit_is_a_risk_keyword_hit() {
        let book = RuleBook::builtin();
        assert!(book.is_ok());
        if let Ok(book) = book {
            let hit = matcher().classify("BET365", 50.0, &book);
            assert!(hit.is_some());
            if let Some((group, hit)) = hit {
                assert_eq!(group.subcategory, Subcategory::Gambling);
                assert!((hit.confidence - 0.95).abs() < f64::EPSILON);
            }
        }
    }

    #[test]
    fn regex_stage_catches_spacing_variants() {
        let book = RuleBook::builtin();
        assert!(book.is_ok());
        if let Ok(book) = book {
            let hit = matcher().classify("PAYPAL PAY  IN 3 INSTALMENT", 40.0, &book);
            assert!(hit.is_some());
            if let Some((group, hit)) = hit {
                assert_eq!(group.subcategory, Subcategory::Bnpl);
                assert_eq!(hit.method, MatchMethod::Regex);
            }
        }
    }

    #[cfg(feature = "fuzzy")]
    #[test]
    fn fuzzy_stage_recovers_typos() {
        let book = RuleBook::builtin();
        assert!(book.is_ok());
        if let Ok(book) = book {
            let hit = matcher().classify("LITTLEWOOD5 ONLINE", 60.0, &book);
            assert!(hit.is_some());
            if let Some((group, hit)) = hit {
                assert_eq!(group.subcategory, Subcategory::Catalogue);
                assert_eq!(hit.method, MatchMethod::Fuzzy);
                assert!(hit.confidence >= 0.70 && hit.confidence <= 0.89);
            }
        }
    }

    #[cfg(feature = "fuzzy")]
    #[test]
    fn short_text_is_not_fuzzy_matched_inside_longer_keywords() {
        let book = RuleBook::builtin();
        assert!(book.is_ok());
        if let Ok(book) = book {
            let hit = matcher().classify("RENT", 10.0, &book);
            assert!(hit.is_some());
            if let Some((group, hit)) = hit {
                assert_eq!(group.subcategory, Subcategory::Rent);
                assert_eq!(hit.method, MatchMethod::Keyword);
            }
        }
    }

    #[cfg(feature = "fuzzy")]
    #[test]
    fn fuzzy_windows_start_at_word_boundaries() {
        let book = RuleBook::builtin();
        assert!(book.is_ok());
        if let Ok(book) = book {
            for (text, amount) in [
                ("PLUMBING SUPPLIES", 120.0),
                ("GROSVENOR LEISURE", 80.0),
                ("PAYPAL PAYMENT 8881234567", 40.0),
            ] {
                let hit = matcher().classify(text, amount, &book);
                assert!(
                    hit.as_ref().is_none_or(|(_, hit)| hit.method != MatchMethod::Fuzzy),
                    "{text} fuzzy-matched {:?}",
                    hit.map(|(group, hit)| (group.subcategory, hit.pattern))
                );
            }
        }
    }

    #[test]
    fn plain_paypal_payment_is_not_buy_now_pay_later() {
        let book = RuleBook::builtin();
        assert!(book.is_ok());
        if let Ok(book) = book {
            let plain = matcher().classify("PAYPAL PAYMENT 8881234567", 40.0, &book);
            assert!(plain.is_none_or(|(group, _)| group.subcategory != Subcategory::Bnpl));

            let instalment = matcher().classify("PAYPAL PAY IN 3 INSTALMENT", 40.0, &book);
            assert!(instalment.is_some());
            if let Some((group, hit)) = instalment {
                assert_eq!(group.subcategory, Subcategory::Bnpl);
                assert_eq!(hit.method, MatchMethod::Keyword);
            }
        }
    }

    #[test]
    fn matcher_without_backend_skips_fuzzy() {
        let book = RuleBook::builtin();
        assert!(book.is_ok());
        if let Ok(book) = book {
            let plain = PatternMatcher::new(MatcherSettings::default(), None);
            assert!(!plain.fuzzy_available());
            assert!(plain.classify("LITTLEWOOD5 ONLINE", 60.0, &book).is_none());
        }
    }

    #[test]
    fn fuzzy_confidence_scales_between_floor_and_ceiling() {
        assert!((fuzzy_confidence(80.0, 80.0) - 0.70).abs() < 1e-9);
        assert!((fuzzy_confidence(100.0, 80.0) - 0.89).abs() < 1e-9);
        assert!((fuzzy_confidence(90.0, 80.0) - 0.795).abs() < 1e-9);
        assert!((fuzzy_confidence(100.0, 100.0) - 0.89).abs() < 1e-9);
    }
}
