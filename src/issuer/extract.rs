//! Card-prefix extraction from free-form submissions.
//!
//! The default policy only looks at the line carrying a card-number label, so
//! dates, phone numbers and amounts elsewhere in the form are never mistaken
//! for a card prefix.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

/// Number of leading digits sent to the issuer directory.
pub const BIN_LENGTH: usize = 8;

/// Labels that introduce a card-number field. The label must be followed by
/// a separator or directly by the number itself.
static CARD_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        ^(?:💳\s*)?
        (?:
            (?:credit\s+)?card(?:\s*(?:number|num|no\.?|\#))?
          | carte(?:\s+(?:bancaire|de\s+cr[ée]dit))?
          | (?:num[ée]ro|n°)(?:\s*(?:de\s+)?carte(?:\s+(?:bancaire|de\s+cr[ée]dit))?)?
          | cc
          | pan
        )
        \s*(?:[:=\-]|\d)",
    )
    .unwrap()
});

/// Where the card prefix is taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BinPolicy {
    /// Digits of the first line labelled as a card number.
    #[default]
    LabeledLine,
    /// Every digit of the submission, in document order. Prone to false
    /// positives; only enabled on explicit request.
    WholeDocument,
}

impl FromStr for BinPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "labeled-line" | "labeled_line" | "line" => Ok(Self::LabeledLine),
            "whole-document" | "whole_document" | "document" => Ok(Self::WholeDocument),
            other => Err(format!(
                "unknown policy '{other}' (expected 'labeled-line' or 'whole-document')"
            )),
        }
    }
}

/// Whether a line starts with a card-number label.
pub fn is_card_line(line: &str) -> bool {
    CARD_LABEL.is_match(line.trim())
}

/// Derive the 8-digit issuer lookup key from the submission, if enough digits exist.
///
/// Digits are taken left to right; no checksum validation happens here.
pub fn extract_bin<S: AsRef<str>>(lines: &[S], policy: BinPolicy) -> Option<String> {
    match policy {
        BinPolicy::LabeledLine => lines
            .iter()
            .map(|line| line.as_ref())
            .find(|line| is_card_line(line))
            .and_then(|line| first_digits(line.chars())),
        BinPolicy::WholeDocument => {
            first_digits(lines.iter().flat_map(|line| line.as_ref().chars()))
        }
    }
}

fn first_digits(chars: impl Iterator<Item = char>) -> Option<String> {
    let bin: String = chars.filter(char::is_ascii_digit).take(BIN_LENGTH).collect();
    (bin.len() == BIN_LENGTH).then_some(bin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labeled_line_yields_first_eight_digits() {
        let lines = ["Card Number: 4539 1488 0343 6467"];
        assert_eq!(
            extract_bin(&lines, BinPolicy::LabeledLine).as_deref(),
            Some("45391488")
        );
    }

    #[test]
    fn earlier_phone_line_is_not_selected() {
        let lines = [
            "Phone: 06012345678",
            "Date: 12/05/2024",
            "Card Number: 4539 1488 0343 6467",
        ];
        assert_eq!(
            extract_bin(&lines, BinPolicy::LabeledLine).as_deref(),
            Some("45391488")
        );
    }

    #[test]
    fn whole_document_policy_picks_up_phone_digits() {
        let lines = ["Phone: 06012345678", "Card Number: 4539 1488 0343 6467"];
        assert_eq!(
            extract_bin(&lines, BinPolicy::WholeDocument).as_deref(),
            Some("06012345")
        );
    }

    #[test]
    fn french_labels_are_recognised() {
        assert!(is_card_line("Carte : 5132 8300 1234 5678"));
        assert!(is_card_line("Numéro de carte: 5132830012345678"));
        assert!(is_card_line("NUMERO CARTE - 5132830012345678"));
        assert!(is_card_line("💳 Carte bancaire: 5132 8300"));
        assert!(is_card_line("Carte de crédit = 5132 8300"));
        assert!(is_card_line("cc=4111111111111111"));
    }

    #[test]
    fn qualified_and_separator_free_labels_yield_a_bin() {
        let cases = [
            "Numéro de carte bancaire: 4539 1488 0343 6467",
            "Card number 4539 1488 0343 6467",
            "N° de carte bancaire : 4539148803436467",
            "Numéro: 4539 1488 0343 6467",
            "N°carte 4539148803436467",
            "Card #: 4539 1488 0343 6467",
            "Credit card number - 4539-1488-0343-6467",
        ];
        for line in cases {
            assert_eq!(
                extract_bin(&[line], BinPolicy::LabeledLine).as_deref(),
                Some("45391488"),
                "line: {line}"
            );
        }
    }

    #[test]
    fn other_numbered_fields_are_not_card_lines() {
        assert!(!is_card_line("Numéro de téléphone: 0601020304"));
        assert!(!is_card_line("Numéro client: 123456789"));
        assert!(!is_card_line("Card type: debit"));
        assert!(!is_card_line("CCV: 123"));
    }

    #[test]
    fn non_number_card_fields_are_not_labels() {
        assert!(!is_card_line("Card expiry: 12/27"));
        assert!(!is_card_line("Cardholder: Jean Dupont"));
        assert!(!is_card_line("Expiration: 12/27"));
        assert!(!is_card_line("Phone: 0601020304"));
    }

    #[test]
    fn too_few_digits_yields_none() {
        let lines = ["Card: 4539 148"];
        assert_eq!(extract_bin(&lines, BinPolicy::LabeledLine), None);
    }

    #[test]
    fn no_card_line_yields_none() {
        let lines = ["Nom: Jean", "Téléphone: 0601020304050607"];
        assert_eq!(extract_bin(&lines, BinPolicy::LabeledLine), None);
    }

    #[test]
    fn non_ascii_digits_are_ignored() {
        let lines = ["Card: ٤٥٣٩ 4539 1488 0343"];
        assert_eq!(
            extract_bin(&lines, BinPolicy::LabeledLine).as_deref(),
            Some("45391488")
        );
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!("labeled-line".parse::<BinPolicy>(), Ok(BinPolicy::LabeledLine));
        assert_eq!("Whole-Document".parse::<BinPolicy>(), Ok(BinPolicy::WholeDocument));
        assert!("everything".parse::<BinPolicy>().is_err());
    }
}
