//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use crate::domain::validation::{ValidationError, ValidationResult};
use crate::domain::wizard::steps::review::ReviewSummary;
use crate::infrastructure::templates::TemplateInfo;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    fn finding_row(&self, index: usize, finding: &ValidationError) -> Vec<Cell> {
        let color = self.theme.get_severity_color(finding.severity);
        let field = match &finding.related_field {
            Some(related) => format!("{}\n{}", finding.field, related),
            None => finding.field.clone(),
        };
        let mut message = finding.message.clone();
        if let Some(suggestion) = &finding.suggestion {
            message.push_str(&format!("\n{} {}", StatusIcon::HINT, suggestion));
        }
        vec![
            Cell::new(index).set_alignment(CellAlignment::Right),
            Cell::new(format!(
                "{} {}",
                StatusIcon::get_severity_icon(finding.severity),
                finding.category
            ))
            .fg(color),
            Cell::new(field),
            Cell::new(message),
        ]
    }

    /// Render a gate or health check result: a status line, a findings
    /// table and the category summary.
    pub fn render_validation_result(&self, title: &str, result: &ValidationResult) -> String {
        let icon = StatusIcon::get_result_icon(result);
        let text = StatusIcon::get_result_text(result);
        let status = format!("{} {}", icon, text);
        let status = if !result.is_valid() {
            status.red()
        } else if !result.warnings.is_empty() {
            status.yellow()
        } else {
            status.green()
        };

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ {} {} ─╮\n",
            title,
            format!("[{} fields checked]", result.summary.fields_checked).bright_black()
        ));
        output.push_str(&format!("Status: {}\n", status));

        let findings: Vec<&ValidationError> =
            result.errors.iter().chain(result.warnings.iter()).collect();
        if !findings.is_empty() {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    Cell::new("#").set_alignment(CellAlignment::Right),
                    Cell::new("CATEGORY").set_alignment(CellAlignment::Left),
                    Cell::new("FIELD").set_alignment(CellAlignment::Left),
                    Cell::new("MESSAGE").set_alignment(CellAlignment::Left),
                ]);
            for (i, finding) in findings.into_iter().enumerate() {
                table.add_row(self.finding_row(i + 1, finding));
            }
            output.push_str(&table.to_string());
            output.push('\n');
        }

        output.push_str(&result.format_summary());
        output.push('\n');
        output
    }

    pub fn render_templates(&self, templates: &[TemplateInfo]) -> String {
        if templates.is_empty() {
            return "No cluster templates found".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("ID").set_alignment(CellAlignment::Left),
                Cell::new("NAME").set_alignment(CellAlignment::Left),
                Cell::new("NODES").set_alignment(CellAlignment::Center),
                Cell::new("DESCRIPTION").set_alignment(CellAlignment::Left),
            ]);

        for template in templates {
            let id = if template.featured {
                Cell::new(format!("{} {}", StatusIcon::FEATURED, template.id)).fg(self.theme.info)
            } else {
                Cell::new(&template.id)
            };
            table.add_row(vec![
                id,
                Cell::new(&template.name),
                Cell::new(template.node_count).set_alignment(CellAlignment::Center),
                Cell::new(&template.description).fg(self.theme.muted),
            ]);
        }

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ Cluster Templates {} ─╮\n",
            format!("[{} templates]", templates.len()).bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(&format!("Legend: {} Featured\n", StatusIcon::FEATURED.cyan()));
        output
    }

    /// Two-column digest of the assembled document.
    pub fn render_review(&self, summary: &ReviewSummary) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.add_row(vec![
            Cell::new(format!("📋 {}", summary.name)).fg(self.theme.info),
            Cell::new(format!("{} | {}", summary.description, summary.node_count)),
        ]);
        for (section, value) in &summary.sections {
            table.add_row(vec![Cell::new(section), Cell::new(value)]);
        }
        let nodes = summary
            .nodes
            .iter()
            .map(|n| format!("{} {} ({})", n.hostname, n.ip, n.role))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![Cell::new("Nodes"), Cell::new(nodes)]);

        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::ClusterDocument;
    use std::path::PathBuf;

    #[test]
    fn test_render_empty_templates() {
        let renderer = TableRenderer::new();
        assert!(renderer
            .render_templates(&[])
            .contains("No cluster templates found"));
    }

    #[test]
    fn test_render_templates() {
        let renderer = TableRenderer::new();
        let output = renderer.render_templates(&[TemplateInfo {
            id: "homelab".to_string(),
            name: "ztc-homelab".to_string(),
            description: "Two nodes".to_string(),
            node_count: 2,
            featured: true,
            path: PathBuf::from("templates/cluster-homelab.yaml"),
        }]);
        assert!(output.contains("homelab"));
        assert!(output.contains("Two nodes"));
    }

    #[test]
    fn test_render_validation_result_lists_findings() {
        let renderer = TableRenderer::new();
        let result = ValidationResult::from_findings(
            vec![
                ValidationError::error("cluster.name", "cluster name is required")
                    .with_suggestion("Use a short name"),
                ValidationError::warning("cluster.description", "description is empty"),
            ],
            23,
        );
        let output = renderer.render_validation_result("Schema Gate", &result);
        assert!(output.contains("cluster.name"));
        assert!(output.contains("Use a short name"));
        assert!(output.contains("cluster.description"));
        assert!(output.contains("23 fields checked"));
    }

    #[test]
    fn test_render_review() {
        let renderer = TableRenderer::new();
        let summary = ReviewSummary::from_document(&ClusterDocument::default());
        let output = renderer.render_review(&summary);
        assert!(output.contains("ztc-homelab"));
        assert!(output.contains("k3s-master 192.168.50.10 (master)"));
    }
}
