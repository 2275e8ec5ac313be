//! Wizard commands: configure and templates

use super::commands::WorkspaceArgs;
use super::display::{StatusIcon, TableRenderer};
use crate::domain::config::{apply_dynamic_fields, parse_dynamic_fields, ClusterDocument};
use crate::domain::wizard::steps::review::ReviewSummary;
use crate::domain::wizard::{
    event_channel, run_event_loop, spawn_background, ConfigurationMode, FinishError,
    SchemaHealthTask, Session, StepPosition, WizardEvent, WizardOrchestrator, WizardReply,
};
use crate::infrastructure::constants::EVENT_CHANNEL_CAPACITY;
use crate::infrastructure::persistence::{DocumentStore, YamlDocumentStore};
use crate::infrastructure::schema::SchemaGate;
use crate::infrastructure::templates::{discover_templates, load_template};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Parser, Debug, Clone)]
pub struct ConfigureCommand {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    /// Template ID to start from (templates/cluster-<ID>.yaml)
    /// If not provided, built-in defaults are used
    #[arg(long, short = 't')]
    pub template: Option<String>,

    /// Configuration mode: simple or advanced
    /// If not specified, uses default_mode from the settings file
    #[arg(long, short = 'm')]
    pub mode: Option<String>,

    /// Output file (defaults to <workspace>/cluster.yaml)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Read wizard commands from stdin instead of accepting every step
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Field values to set before the wizard runs (-D key=value)
    ///
    /// Keys are document paths, for example:
    /// -Dcluster.name=lab -Dnetwork.subnet=10.0.0.0/24 -Dstorage.longhorn.enabled=true
    #[arg(short = 'D', value_name = "KEY=VALUE")]
    pub properties: Vec<String>,
}

impl ConfigureCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let ws = self.workspace.resolve()?;

        // Priority: --mode > settings file > simple
        let mode = match &self.mode {
            Some(raw) => raw.parse::<ConfigurationMode>()?,
            None => ws.settings.default_mode,
        };

        let (document, session) = match &self.template {
            Some(id) => {
                let document = load_template(&ws.templates_dir, id)
                    .map_err(|e| anyhow::anyhow!("Failed to load template '{}': {}", id, e))?;
                println!("✓ Loaded template: {}", id);
                (document, Session::new(mode).with_template(id.clone()))
            }
            None => {
                println!("ℹ️  No template specified, using default settings");
                (ClusterDocument::default(), Session::new(mode))
            }
        };

        let mut wizard = WizardOrchestrator::new(session, document)?;
        if !self.properties.is_empty() {
            let fields = parse_dynamic_fields(&self.properties)
                .map_err(|e| anyhow::anyhow!("Failed to parse field overrides: {}", e))?;
            apply_dynamic_fields(&fields, &mut wizard)?;
            println!("✓ Applied {} field override(s)", fields.len());
        }

        let output = ws
            .settings
            .resolve_output_path(&ws.root, self.output.as_deref());
        let gate = Arc::new(SchemaGate::new(&ws.schema_path));
        let store: Arc<dyn DocumentStore> = Arc::new(YamlDocumentStore::new(&output));

        println!(
            "🧭 {} mode: {}",
            mode.as_str(),
            wizard.visible_step_names().join(" → ")
        );

        let (events_tx, events_rx) = event_channel();
        let (replies_tx, replies_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let handle = tokio::spawn(run_event_loop(
            wizard,
            Arc::clone(&gate),
            store,
            events_rx,
            replies_tx,
        ));

        let saved = if self.interactive {
            let health = Arc::new(SchemaHealthTask::new(gate, ws.templates_dir.clone()));
            let input = BufReader::new(tokio::io::stdin());
            drive_interactive(input, events_tx, replies_rx, health).await?
        } else {
            drive_headless(events_tx, replies_rx).await?
        };

        let wizard = handle.await??;
        if saved {
            let renderer = TableRenderer::new();
            println!(
                "{}",
                renderer.render_review(&ReviewSummary::from_document(wizard.document()))
            );
            println!("✓ Configuration written to {}", output.display());
            Ok(())
        } else if self.interactive {
            println!("ℹ️  Wizard closed without writing a configuration");
            Ok(())
        } else {
            anyhow::bail!("❌ Configuration was not written")
        }
    }
}

// ============================================================================
// Drivers
// ============================================================================

/// Accept every step in order, then finish. Returns whether the document was
/// written.
async fn drive_headless(
    events: mpsc::Sender<WizardEvent>,
    mut replies: mpsc::Receiver<WizardReply>,
) -> anyhow::Result<bool> {
    loop {
        events.send(WizardEvent::Advance).await?;
        let Some(reply) = replies.recv().await else {
            return Ok(false);
        };
        let at_end = matches!(&reply, WizardReply::Advanced { outcome, .. } if !outcome.moved);
        if !print_reply(&reply) {
            events.send(WizardEvent::Quit).await?;
            return Ok(false);
        }
        if at_end {
            break;
        }
    }

    events.send(WizardEvent::Finish).await?;
    let saved = match replies.recv().await {
        Some(reply) => {
            print_reply(&reply);
            matches!(reply, WizardReply::Finished(_))
        }
        None => false,
    };
    if !saved {
        events.send(WizardEvent::Quit).await?;
    }
    Ok(saved)
}

/// Line commands understood by the interactive driver.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Set(String, String),
    Next,
    Back,
    Mode(Option<ConfigurationMode>),
    Finish,
    Health,
    Help,
    Quit,
}

const SHELL_HELP: &str = "Commands: set <key>=<value> | next | back | mode [simple|advanced] | finish | health | quit";

fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    match verb {
        "set" => {
            let fields = parse_dynamic_fields(&[rest.to_string()]).map_err(|e| e.to_string())?;
            let (key, value) = fields
                .into_iter()
                .next()
                .ok_or_else(|| "Usage: set <key>=<value>".to_string())?;
            Ok(ShellCommand::Set(key, value))
        }
        "next" | "n" => Ok(ShellCommand::Next),
        "back" | "b" => Ok(ShellCommand::Back),
        "mode" if rest.is_empty() => Ok(ShellCommand::Mode(None)),
        "mode" => rest
            .parse::<ConfigurationMode>()
            .map(|mode| ShellCommand::Mode(Some(mode)))
            .map_err(|e| e.to_string()),
        "finish" => Ok(ShellCommand::Finish),
        "health" => Ok(ShellCommand::Health),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "q" | "exit" => Ok(ShellCommand::Quit),
        other => Err(format!("Unknown command '{}'. {}", other, SHELL_HELP)),
    }
}

/// Read commands from `input` until the event loop stops. Pending replies
/// are printed before the next line is read; background reports are printed
/// as they arrive.
async fn drive_interactive<R>(
    input: R,
    events: mpsc::Sender<WizardEvent>,
    mut replies: mpsc::Receiver<WizardReply>,
    health: Arc<SchemaHealthTask>,
) -> anyhow::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    println!("{}", SHELL_HELP.bright_black());
    let mut lines = input.lines();
    let mut input_open = true;
    let mut saved = false;

    loop {
        tokio::select! {
            biased;

            reply = replies.recv() => {
                let Some(reply) = reply else {
                    break;
                };
                saved |= matches!(reply, WizardReply::Finished(_));
                print_reply(&reply);
            }
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    input_open = false;
                    if events.send(WizardEvent::Quit).await.is_err() {
                        break;
                    }
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let event = match parse_command(&line) {
                    Ok(ShellCommand::Set(key, value)) => WizardEvent::SetField { key, value },
                    Ok(ShellCommand::Next) => WizardEvent::Advance,
                    Ok(ShellCommand::Back) => WizardEvent::Retreat,
                    Ok(ShellCommand::Mode(Some(mode))) => WizardEvent::SetMode(mode),
                    Ok(ShellCommand::Mode(None)) => WizardEvent::ToggleMode,
                    Ok(ShellCommand::Finish) => WizardEvent::Finish,
                    Ok(ShellCommand::Quit) => WizardEvent::Quit,
                    Ok(ShellCommand::Health) => {
                        spawn_background(health.clone(), events.clone());
                        println!("⏳ Schema health check started");
                        continue;
                    }
                    Ok(ShellCommand::Help) => {
                        println!("{}", SHELL_HELP);
                        continue;
                    }
                    Err(msg) => {
                        println!("{} {}", StatusIcon::ERROR.red(), msg);
                        continue;
                    }
                };
                // The loop stops by itself after a successful finish.
                if events.send(event).await.is_err() {
                    debug!("Event loop closed, ignoring further input");
                    break;
                }
            }
        }
    }
    Ok(saved)
}

// ============================================================================
// Output
// ============================================================================

fn print_position(position: &StepPosition) {
    println!(
        "  {} {} ({}/{})",
        position.indicator,
        position.name.bold(),
        position.index + 1,
        position.total
    );
}

/// Print a reply. Returns false when the reply reports a failure.
fn print_reply(reply: &WizardReply) -> bool {
    let renderer = TableRenderer::new();
    match reply {
        WizardReply::FieldSet { key } => {
            println!("✓ Set {}", key);
            true
        }
        WizardReply::FieldRejected { key, reason } => {
            println!("{} {}: {}", StatusIcon::ERROR.red(), key, reason);
            false
        }
        WizardReply::Advanced { outcome, position } => {
            for warning in &outcome.warnings {
                println!("{} {}", StatusIcon::WARNING.yellow(), warning);
            }
            print_position(position);
            true
        }
        WizardReply::Blocked { error, position } => {
            println!(
                "{} Step '{}' is incomplete: {}",
                StatusIcon::ERROR.red(),
                position.name,
                error
            );
            if let Some(suggestion) = &error.suggestion {
                println!("   {} {}", StatusIcon::HINT, suggestion);
            }
            false
        }
        WizardReply::Retreated { moved, position } => {
            if !*moved {
                println!("ℹ️  Already at the first step");
            }
            print_position(position);
            true
        }
        WizardReply::ModeChanged {
            mode,
            steps,
            position,
        } => {
            println!("🧭 {} mode: {}", mode.as_str(), steps.join(" → "));
            print_position(position);
            true
        }
        WizardReply::Finished(report) => {
            println!(
                "{}",
                renderer.render_validation_result("Schema Gate", &report.result)
            );
            true
        }
        WizardReply::FinishFailed(FinishError::Schema(result)) => {
            println!("{}", renderer.render_validation_result("Schema Gate", result));
            false
        }
        WizardReply::FinishFailed(err) => {
            println!("{} {}", StatusIcon::ERROR.red(), err);
            false
        }
        WizardReply::Background(report) => {
            println!(
                "{}",
                renderer.render_validation_result(report.task, &report.result)
            );
            report.result.is_valid()
        }
        WizardReply::Failed(msg) => {
            println!("{} {}", StatusIcon::ERROR.red(), msg);
            false
        }
    }
}

// ============================================================================
// Templates
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct TemplatesCommand {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
}

impl TemplatesCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let ws = self.workspace.resolve()?;
        let templates = discover_templates(&ws.templates_dir).map_err(|e| {
            anyhow::anyhow!(
                "Failed to list templates in {}: {}",
                ws.templates_dir.display(),
                e
            )
        })?;
        println!("{}", TableRenderer::new().render_templates(&templates));
        Ok(())
    }
}
