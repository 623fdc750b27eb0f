//! Identifier normalisation, label formatting, and stable decision IDs.
//!
//! Grounded on `wf-lang`'s leaf formatting helpers (`explain::format`):
//! small, pure, heavily-tested functions with no knowledge of the rest of
//! the pipeline.

use std::fmt;

use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// DecisionId
// ---------------------------------------------------------------------------

/// A stable numeric ID for a decision or wait point, derived from a fixed,
/// documented hash of its label (never the host platform's
/// `DefaultHasher`, which is randomly seeded per process — see §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecisionId(pub u64);

impl DecisionId {
    /// Derive a decision ID from a label. SHA-256 of the UTF-8 label bytes,
    /// truncated to the first 8 bytes, big-endian.
    pub fn from_label(label: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(label.as_bytes());
        let digest = hasher.finalize();
        let bytes: [u8; 8] = digest[..8].try_into().expect("digest is at least 8 bytes");
        Self(u64::from_be_bytes(bytes))
    }
}

impl fmt::Display for DecisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifier case conversion
// ---------------------------------------------------------------------------

/// Convert a `camelCase` or `snake_case` identifier into space-separated,
/// title-cased words: `fetchOrderData` → `Fetch Order Data`,
/// `fetch_order_data` → `Fetch Order Data`.
///
/// Used by the renderer when `split_names_by_words` is enabled. The
/// transform is invertible (modulo case of the first letter) for any
/// identifier containing only ASCII letters and digits, which is what
/// the round-trip testable property in §8 requires.
pub fn split_words(identifier: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    let chars: Vec<char> = identifier.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_ascii_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            // Boundary before an uppercase letter when the previous char is
            // lowercase/digit, or when this starts a new word in an
            // acronym run (e.g. "HTTPServer" -> "HTTP Server").
            if prev.is_ascii_lowercase() || prev.is_ascii_digit() || next_is_lower {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .into_iter()
        .map(|w| title_case(&w))
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Format a raw identifier as a node label according to configuration:
/// either verbatim, or split into words when `split_names_by_words` is set.
pub fn format_label(identifier: &str, split_names_by_words: bool) -> String {
    if split_names_by_words {
        split_words(identifier)
    } else {
        identifier.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_id_stable_across_calls() {
        let a = DecisionId::from_label("HighValue");
        let b = DecisionId::from_label("HighValue");
        assert_eq!(a, b);
    }

    #[test]
    fn decision_id_differs_by_label() {
        assert_ne!(
            DecisionId::from_label("HighValue"),
            DecisionId::from_label("LowCredit")
        );
    }

    #[test]
    fn split_words_camel_case() {
        assert_eq!(split_words("fetchOrderData"), "Fetch Order Data");
    }

    #[test]
    fn split_words_snake_case() {
        assert_eq!(split_words("fetch_order_data"), "Fetch Order Data");
    }

    #[test]
    fn split_words_single_word() {
        assert_eq!(split_words("withdraw"), "Withdraw");
    }

    #[test]
    fn split_words_acronym_run() {
        assert_eq!(split_words("HTTPServer"), "HTTP Server");
    }

    #[test]
    fn format_label_verbatim_when_disabled() {
        assert_eq!(format_label("fetchOrderData", false), "fetchOrderData");
    }

    /// Inverse of `split_words`, used only to exercise the round-trip
    /// testable property from §8: title-cased words joined with spaces →
    /// camelCase.
    fn words_to_camel(label: &str) -> String {
        let mut out = String::new();
        for (i, word) in label.split(' ').enumerate() {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) if i == 0 => {
                    out.push(first.to_ascii_lowercase());
                    out.push_str(chars.as_str());
                }
                Some(first) => {
                    out.push(first);
                    out.push_str(chars.as_str());
                }
                None => {}
            }
        }
        out
    }

    #[test]
    fn round_trip_alnum_identifiers() {
        for ident in ["fetchOrderData", "withdrawFunds", "notifyAto", "processA1b2"] {
            let words = split_words(ident);
            assert_eq!(words_to_camel(&words), ident);
        }
    }
}
