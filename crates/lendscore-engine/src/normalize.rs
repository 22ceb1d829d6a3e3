/// Uppercases, trims and collapses internal whitespace. Punctuation survives so that
/// regex rules can still see separators such as `FP-` or `/`.
pub fn normalize_for_matching(value: &str) -> String {
    value
        .split_whitespace()
        .map(str::to_uppercase)
        .collect::<Vec<String>>()
        .join(" ")
}

/// Builds the single string the pattern matcher runs against: description first,
/// then the merchant name when it adds anything.
pub fn matching_text(description: &str, merchant_name: Option<&str>) -> String {
    let description = normalize_for_matching(description);
    let Some(merchant) = merchant_name.map(normalize_for_matching) else {
        return description;
    };
    if merchant.is_empty() || description.contains(&merchant) {
        return description;
    }
    if description.is_empty() {
        return merchant;
    }
    format!("{description} {merchant}")
}

/// Stable identity for "who sent or received this money".
///
/// Strips payment-rail prefixes, references and numbers so that
/// `FP-ACME CORP REF 88121` and `BGC ACME CORP 99102` share one signature.
pub fn sender_signature(value: &str) -> Option<String> {
    let normalized = normalize_text(value)?;
    let mut stable_tokens: Vec<String> = Vec::new();
    for token in normalized.split_whitespace() {
        if token.is_empty() || is_noise_token(token) || is_reference_token(token) {
            continue;
        }
        stable_tokens.push(token.to_string());
        if stable_tokens.len() == 4 {
            break;
        }
    }

    if stable_tokens.is_empty() {
        return None;
    }
    Some(stable_tokens.join(" "))
}

pub fn normalize_optional(value: Option<String>) -> Option<String> {
    let raw = value?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

fn normalize_text(value: &str) -> Option<String> {
    let mut output = String::new();
    let mut previous_space = false;
    for character in value.trim().chars() {
        if character.is_ascii_alphanumeric() {
            output.push(character.to_ascii_uppercase());
            previous_space = false;
        } else if !previous_space {
            output.push(' ');
            previous_space = true;
        }
    }

    let normalized = output.trim().to_string();
    if normalized.is_empty() {
        return None;
    }
    Some(normalized)
}

// Numbers and mixed codes carrying at least four digits are references, not names.
fn is_reference_token(token: &str) -> bool {
    let digits = token
        .chars()
        .filter(|character| character.is_ascii_digit())
        .count();
    digits == token.len() || digits >= 4
}

fn is_noise_token(token: &str) -> bool {
    matches!(
        token,
        "FP" | "FPI"
            | "FPO"
            | "BGC"
            | "BACS"
            | "SO"
            | "STO"
            | "DD"
            | "DDR"
            | "TFR"
            | "REF"
            | "CR"
            | "DR"
            | "POS"
            | "CARD"
            | "DEBIT"
            | "CREDIT"
            | "PAYMENT"
            | "FASTER"
            | "ONLINE"
            | "VIA"
    )
}

#[cfg(test)]
mod tests {
    use super::{matching_text, normalize_for_matching, sender_signature};

    #[test]
    fn matching_text_uppercases_and_collapses_whitespace() {
        assert_eq!(
            normalize_for_matching("  acme   corp\tsalary "),
            "ACME CORP SALARY"
        );
    }

    #[test]
    fn merchant_is_appended_only_when_it_adds_information() {
        assert_eq!(
            matching_text("card payment 1234", Some("Tesco Stores")),
            "CARD PAYMENT 1234 TESCO STORES"
        );
        assert_eq!(matching_text("TESCO STORES 3321", Some("tesco stores")), "TESCO STORES 3321");
        assert_eq!(matching_text("", Some("Netflix")), "NETFLIX");
    }

    #[test]
    fn signature_drops_rails_and_references() {
        assert_eq!(
            sender_signature("FP-ACME CORP REF 88121"),
            Some("ACME CORP".to_string())
        );
        assert_eq!(
            sender_signature("BGC ACME CORP 99102"),
            Some("ACME CORP".to_string())
        );
        assert_eq!(sender_signature("1234 5678"), None);
    }
}
