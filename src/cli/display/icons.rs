//! Status icons for CLI output

use crate::domain::validation::{Severity, ValidationResult};

/// Status icons for different states
pub struct StatusIcon;

impl StatusIcon {
    /// Check passed
    pub const SUCCESS: &'static str = "✓";

    /// Non-blocking finding
    pub const WARNING: &'static str = "⚠";

    /// Blocking finding
    pub const ERROR: &'static str = "✗";

    pub const HINT: &'static str = "💡";

    pub const FEATURED: &'static str = "★";

    pub fn get_severity_icon(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => Self::ERROR,
            Severity::Warning => Self::WARNING,
        }
    }

    /// Icon for an overall result: errors win over warnings.
    pub fn get_result_icon(result: &ValidationResult) -> &'static str {
        if !result.is_valid() {
            Self::ERROR
        } else if !result.warnings.is_empty() {
            Self::WARNING
        } else {
            Self::SUCCESS
        }
    }

    pub fn get_result_text(result: &ValidationResult) -> &'static str {
        if !result.is_valid() {
            "Invalid"
        } else if !result.warnings.is_empty() {
            "Valid with warnings"
        } else {
            "Valid"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::ValidationError;

    #[test]
    fn test_get_result_icon() {
        let clean = ValidationResult::from_findings(vec![], 10);
        let warned =
            ValidationResult::from_findings(vec![ValidationError::warning("cluster.description", "empty")], 10);
        let failed =
            ValidationResult::from_findings(vec![ValidationError::error("cluster.name", "empty")], 10);

        assert_eq!(StatusIcon::get_result_icon(&clean), StatusIcon::SUCCESS);
        assert_eq!(StatusIcon::get_result_icon(&warned), StatusIcon::WARNING);
        assert_eq!(StatusIcon::get_result_icon(&failed), StatusIcon::ERROR);
        assert_eq!(StatusIcon::get_result_text(&warned), "Valid with warnings");
    }
}
