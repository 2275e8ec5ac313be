//! Color theme for CLI output

use crate::domain::validation::Severity;
use comfy_table::Color as TableColor;

/// Color theme for table output
#[derive(Debug, Clone, Copy)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub error: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            error: TableColor::Red,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    pub fn get_severity_color(&self, severity: Severity) -> TableColor {
        match severity {
            Severity::Error => self.error,
            Severity::Warning => self.warning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme() {
        let theme = ColorTheme::default();
        assert_eq!(theme.success, TableColor::Green);
        assert_eq!(theme.warning, TableColor::Yellow);
        assert_eq!(theme.error, TableColor::Red);
    }

    #[test]
    fn test_get_severity_color() {
        let theme = ColorTheme::default();
        assert_eq!(theme.get_severity_color(Severity::Error), TableColor::Red);
        assert_eq!(theme.get_severity_color(Severity::Warning), TableColor::Yellow);
    }
}
