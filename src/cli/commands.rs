// CLI command definitions

use super::configure::{ConfigureCommand, TemplatesCommand};
use super::validate::{HealthCommand, ValidateCommand};
use crate::domain::config::WizardSettings;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ztc-wizard",
    version,
    about = "Configuration wizard for Zero Touch Cluster homelabs",
    long_about = "Walks through network, access, storage, HA and bundle settings and writes a schema-validated cluster.yaml"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Run the configuration wizard and write cluster.yaml
    Configure(ConfigureCommand),

    /// Validate an existing cluster.yaml against the schema
    Validate(ValidateCommand),

    /// List available cluster templates
    Templates(TemplatesCommand),

    /// Check the schema file and every template
    Health(HealthCommand),
}

/// Workspace options shared by every command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct WorkspaceArgs {
    /// Workspace directory holding schema/ and templates/
    /// If not specified, uses ZTC_WORKSPACE or the current directory
    #[arg(long, short = 'w', value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Wizard settings file (ztc-wizard.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Paths resolved from command line, settings file and environment.
#[derive(Debug, Clone)]
pub struct ResolvedWorkspace {
    pub settings: WizardSettings,
    pub root: PathBuf,
    pub schema_path: PathBuf,
    pub templates_dir: PathBuf,
}

impl WorkspaceArgs {
    pub fn resolve(&self) -> anyhow::Result<ResolvedWorkspace> {
        let settings = WizardSettings::load(self.config.as_deref())?;
        let root = settings.resolve_workspace(self.workspace.as_deref());
        Ok(ResolvedWorkspace {
            schema_path: settings.resolve_schema_path(&root),
            templates_dir: settings.resolve_templates_dir(&root),
            root,
            settings,
        })
    }
}
