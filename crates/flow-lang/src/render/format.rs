//! Small leaf formatters shared by the node/edge/path renderers — kept
//! separate and heavily tested the way `wf-lang::explain::format` does for
//! its own leaf helpers.

use crate::names::format_label;

/// Style directive colour strings. Fixed so rendered output is
/// byte-reproducible across implementations (the specification defers
/// these to the glossary but does not spell them out; recorded as a
/// DESIGN.md decision).
pub const SIGNAL_HANDLER_FILL: &str = "#cce5ff";
pub const SIGNAL_HANDLER_STROKE: &str = "#004085";
pub const EXTERNAL_SIGNAL_FILL: &str = "#fff3cd";
pub const EXTERNAL_SIGNAL_STROKE: &str = "#856404";
pub const UNRESOLVED_FILL: &str = "#ffe8a1";
pub const UNRESOLVED_STROKE: &str = "#b38600";

/// A node identifier safe to embed in the diagram DSL: the raw identifier
/// with any character outside `[A-Za-z0-9_]` replaced with `_`.
pub fn sanitize_id(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// A human-facing label, honoring `split_names_by_words`.
pub fn node_label(identifier: &str, split_names_by_words: bool) -> String {
    format_label(identifier, split_names_by_words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_non_word_chars() {
        assert_eq!(sanitize_id("ext_sig_ship-order"), "ext_sig_ship_order");
    }

    #[test]
    fn sanitize_is_identity_for_plain_identifiers() {
        assert_eq!(sanitize_id("withdraw_funds"), "withdraw_funds");
    }
}
