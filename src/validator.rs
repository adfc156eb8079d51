//! Post-transform validation and run metrics
//!
//! Both checks are non-fatal: findings are reported through the error hook
//! and recorded, never corrected, and the already-produced output is
//! returned regardless.

use crate::error::{ErrorContext, TransformError};
use crate::PluginOptions;
use regex::Regex;
use serde::Serialize;

/// Counters collected over one stylesheet run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransformMetrics {
    /// rre() occurrences transformed
    pub transformations: usize,

    /// Custom-property declarations injected into the base `:root`
    pub custom_properties: usize,

    /// Generated per-breakpoint `@media` blocks
    pub media_queries: usize,

    /// Generated `@custom-media` declarations
    pub custom_media: usize,

    /// Validation findings (zero when validation is disabled)
    pub validation_errors: usize,

    /// Wall-clock time for the whole transform
    pub execution_ms: u64,

    pub cache_hits: u64,
    pub cache_misses: u64,
}

/// One non-fatal validation finding.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub message: String,
}

pub struct Validator {
    custom_property_regex: Regex,
    name_regex: Regex,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            // Every custom-property declaration in the output, however named
            custom_property_regex: Regex::new(r"--([A-Za-z0-9_-]+)\s*:").unwrap(),
            // The shape a generated name must have
            name_regex: Regex::new(r"^[a-z][a-z0-9-]*$").unwrap(),
        }
    }

    /// Check brace/parenthesis balance and custom-property naming over the
    /// serialized output. Returns all findings; never fails.
    pub fn validate(&self, css: &str) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        self.check_balance(css, '{', '}', &mut issues);
        self.check_balance(css, '(', ')', &mut issues);
        self.check_custom_property_names(css, &mut issues);
        issues
    }

    fn check_balance(&self, css: &str, open: char, close: char, issues: &mut Vec<ValidationIssue>) {
        let opened = css.chars().filter(|&c| c == open).count();
        let closed = css.chars().filter(|&c| c == close).count();
        if opened != closed {
            issues.push(ValidationIssue {
                message: format!(
                    "unbalanced '{}'/'{}': {} opening, {} closing",
                    open, close, opened, closed
                ),
            });
        }
    }

    fn check_custom_property_names(&self, css: &str, issues: &mut Vec<ValidationIssue>) {
        for capture in self.custom_property_regex.captures_iter(css) {
            let name = &capture[1];
            if !self.name_regex.is_match(name) {
                issues.push(ValidationIssue {
                    message: format!("malformed custom property name '--{}'", name),
                });
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Run validation over serialized output, reporting findings through the
/// configured error hook (or the log) and counting them into the metrics.
pub fn validate_output(
    css: &str,
    filename: &str,
    options: &PluginOptions,
    metrics: &mut TransformMetrics,
) {
    let validator = Validator::new();
    let issues = validator.validate(css);
    metrics.validation_errors += issues.len();

    for issue in issues {
        let error = TransformError::validation(issue.message);
        let context = ErrorContext::new(filename, 0, 0);
        match &options.on_error {
            Some(hook) => hook(&error, &context),
            None => log::warn!("{}: {}", filename, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_output_is_clean() {
        let validator = Validator::new();
        let css = ":root {\n  --rre-font-size: 16px;\n}\n.a {\n  width: calc(100% - 4px);\n}\n";
        assert!(validator.validate(css).is_empty());
    }

    #[test]
    fn test_unbalanced_braces_reported() {
        let validator = Validator::new();
        let issues = validator.validate(".a { color: red;");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("unbalanced '{'/'}'"));
    }

    #[test]
    fn test_unbalanced_parens_reported() {
        let validator = Validator::new();
        let issues = validator.validate(".a { width: calc(100% - 4px; }");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("unbalanced '('/')'"));
    }

    #[test]
    fn test_malformed_custom_property_name_reported() {
        let validator = Validator::new();

        // Uppercase and leading-digit names violate the generated shape
        let issues = validator.validate(":root { --Rre-font: 16px; --9lives: 1px; }");
        assert_eq!(issues.len(), 2);

        let issues = validator.validate(":root { --rre-font-size: 16px; }");
        assert!(issues.is_empty());
    }

    #[test]
    fn test_validation_never_blocks() {
        // Multiple findings accumulate rather than short-circuiting
        let validator = Validator::new();
        let issues = validator.validate(":root { --BAD: calc(1px; ");
        assert!(issues.len() >= 2);
    }
}
