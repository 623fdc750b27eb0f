//! Validation-report output (§6): `Validation Warnings:` followed by one
//! `[severity] category: message (suggestion)` line per diagnostic — which
//! is exactly `Diagnostic`'s own `Display` impl.

use crate::validate::Diagnostic;

pub fn render(diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    out.push_str("Validation Warnings:\n");
    for d in diagnostics {
        out.push_str(&format!("{d}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::Severity;

    #[test]
    fn renders_header_and_lines() {
        let diags = vec![Diagnostic {
            severity: Severity::Warning,
            category: "unreachable-activity".to_string(),
            message: "activity `x` is not visited".to_string(),
            suggestion: "remove the dead call site".to_string(),
        }];
        let rendered = render(&diags);
        assert_eq!(
            rendered,
            "Validation Warnings:\n[warning] unreachable-activity: activity `x` is not visited (remove the dead call site)\n"
        );
    }

    #[test]
    fn renders_header_only_when_empty() {
        assert_eq!(render(&[]), "Validation Warnings:\n");
    }
}
