//! Validation commands: validate and health

use super::commands::WorkspaceArgs;
use super::display::TableRenderer;
use crate::domain::wizard::{BackgroundTask, SchemaHealthTask};
use crate::infrastructure::schema::SchemaGate;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug, Clone)]
pub struct ValidateCommand {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    /// Configuration file to validate (defaults to <workspace>/cluster.yaml)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Treat warnings as failures
    #[arg(long)]
    pub strict: bool,
}

impl ValidateCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let ws = self.workspace.resolve()?;
        let file = ws
            .settings
            .resolve_output_path(&ws.root, self.file.as_deref());
        if !file.is_file() {
            anyhow::bail!("❌ Configuration file not found: {}", file.display());
        }

        let gate = SchemaGate::new(&ws.schema_path);
        let result = gate.validate_file(&file).map_err(|e| {
            if e.is_tooling_fatal() {
                anyhow::anyhow!(
                    "❌ {}\n\n💡 Suggestion: check {} or run `ztc-wizard health`",
                    e,
                    ws.schema_path.display()
                )
            } else {
                anyhow::anyhow!("Failed to validate {}: {}", file.display(), e)
            }
        })?;

        let renderer = TableRenderer::new();
        println!(
            "{}",
            renderer.render_validation_result(&file.display().to_string(), &result)
        );

        if !result.is_valid() {
            anyhow::bail!("❌ {} validation error(s)", result.errors.len());
        }
        if self.strict && !result.warnings.is_empty() {
            anyhow::bail!("⚠ {} warning(s) in strict mode", result.warnings.len());
        }
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct HealthCommand {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
}

impl HealthCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let ws = self.workspace.resolve()?;
        let gate = Arc::new(SchemaGate::new(&ws.schema_path));
        let task = SchemaHealthTask::new(gate, ws.templates_dir.clone());
        let report = task.run().await;

        println!(
            "{}",
            TableRenderer::new().render_validation_result("Schema Health", &report.result)
        );
        if !report.result.is_valid() {
            anyhow::bail!("❌ Schema health check failed");
        }
        Ok(())
    }
}
