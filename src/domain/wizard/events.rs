// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Event-driven front of the wizard.
//!
//! A presentation layer sends [`WizardEvent`]s and receives one
//! [`WizardReply`] per event. Events are handled one at a time. Background
//! work runs on the runtime and reports back as an ordinary event.

use super::orchestrator::{
    AdvanceOutcome, FinishError, FinishReport, StepPosition, WizardOrchestrator,
};
use super::step::ConfigurationMode;
use crate::domain::validation::{ErrorKind, ValidationError, ValidationResult};
use crate::infrastructure::constants::EVENT_CHANNEL_CAPACITY;
use crate::infrastructure::persistence::DocumentStore;
use crate::infrastructure::schema::SchemaGate;
use crate::shared::error::{Result, WizardError};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum WizardEvent {
    SetField { key: String, value: String },
    Advance,
    Retreat,
    ToggleMode,
    SetMode(ConfigurationMode),
    Finish,
    Background(BackgroundReport),
    Quit,
}

#[derive(Debug)]
pub enum WizardReply {
    FieldSet {
        key: String,
    },
    FieldRejected {
        key: String,
        reason: String,
    },
    Advanced {
        outcome: AdvanceOutcome,
        position: StepPosition,
    },
    Blocked {
        error: ValidationError,
        position: StepPosition,
    },
    Retreated {
        moved: bool,
        position: StepPosition,
    },
    ModeChanged {
        mode: ConfigurationMode,
        steps: Vec<&'static str>,
        position: StepPosition,
    },
    Finished(FinishReport),
    FinishFailed(FinishError),
    Background(BackgroundReport),
    Failed(String),
}

/// Outcome of a background task, delivered through the event channel.
#[derive(Debug, Clone)]
pub struct BackgroundReport {
    pub task: &'static str,
    pub result: ValidationResult,
}

#[async_trait]
pub trait BackgroundTask: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self) -> BackgroundReport;
}

pub fn event_channel() -> (mpsc::Sender<WizardEvent>, mpsc::Receiver<WizardEvent>) {
    mpsc::channel(EVENT_CHANNEL_CAPACITY)
}

/// Run `task` on the runtime and post its report back to the loop. The task
/// keeps running when the user navigates elsewhere.
pub fn spawn_background(
    task: Arc<dyn BackgroundTask>,
    events: mpsc::Sender<WizardEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let report = task.run().await;
        if events.send(WizardEvent::Background(report)).await.is_err() {
            debug!("Event loop gone before '{}' finished", task.name());
        }
    })
}

// ============================================================================
// Schema health check
// ============================================================================

pub struct SchemaHealthTask {
    gate: Arc<SchemaGate>,
    templates_dir: PathBuf,
}

impl SchemaHealthTask {
    pub fn new(gate: Arc<SchemaGate>, templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            gate,
            templates_dir: templates_dir.into(),
        }
    }
}

#[async_trait]
impl BackgroundTask for SchemaHealthTask {
    fn name(&self) -> &'static str {
        "schema-health"
    }

    async fn run(&self) -> BackgroundReport {
        let gate = Arc::clone(&self.gate);
        let dir = self.templates_dir.clone();
        let result = match tokio::task::spawn_blocking(move || gate.health_check(&dir)).await {
            Ok(result) => result,
            Err(e) => ValidationResult::from_findings(
                vec![ValidationError::error("schema", format!("health check aborted: {}", e))
                    .with_kind(ErrorKind::Tooling)],
                0,
            ),
        };
        BackgroundReport {
            task: self.name(),
            result,
        }
    }
}

// ============================================================================
// Loop
// ============================================================================

/// Process events until `Quit`, a successful finish, or the sender side
/// closes. Returns the orchestrator so callers can inspect the final state.
pub async fn run_event_loop(
    mut wizard: WizardOrchestrator,
    gate: Arc<SchemaGate>,
    store: Arc<dyn DocumentStore>,
    mut events: mpsc::Receiver<WizardEvent>,
    replies: mpsc::Sender<WizardReply>,
) -> Result<WizardOrchestrator> {
    info!("Wizard session {} started", wizard.session().id);

    while let Some(event) = events.recv().await {
        let (reply, done) = match event {
            WizardEvent::Quit => {
                info!("Wizard session {} quit", wizard.session().id);
                break;
            }
            WizardEvent::SetField { key, value } => match wizard.set_field(&key, &value) {
                Ok(()) => (WizardReply::FieldSet { key }, false),
                Err(e) => (
                    WizardReply::FieldRejected {
                        key,
                        reason: e.to_string(),
                    },
                    false,
                ),
            },
            WizardEvent::Advance => match wizard.advance() {
                Ok(outcome) => (
                    WizardReply::Advanced {
                        outcome,
                        position: wizard.position(),
                    },
                    false,
                ),
                Err(error) => (
                    WizardReply::Blocked {
                        error,
                        position: wizard.position(),
                    },
                    false,
                ),
            },
            WizardEvent::Retreat => {
                let moved = wizard.retreat();
                (
                    WizardReply::Retreated {
                        moved,
                        position: wizard.position(),
                    },
                    false,
                )
            }
            WizardEvent::ToggleMode => mode_reply(&mut wizard, None),
            WizardEvent::SetMode(mode) => mode_reply(&mut wizard, Some(mode)),
            WizardEvent::Finish => match wizard.finish(&gate, store.as_ref()) {
                Ok(report) => (WizardReply::Finished(report), true),
                Err(err) => (WizardReply::FinishFailed(err), false),
            },
            WizardEvent::Background(report) => {
                if !report.result.is_valid() {
                    warn!(
                        "Background task '{}' reported {} error(s)",
                        report.task,
                        report.result.errors.len()
                    );
                }
                (WizardReply::Background(report), false)
            }
        };

        replies
            .send(reply)
            .await
            .map_err(|_| WizardError::ChannelClosed)?;
        if done {
            break;
        }
    }

    Ok(wizard)
}

fn mode_reply(
    wizard: &mut WizardOrchestrator,
    mode: Option<ConfigurationMode>,
) -> (WizardReply, bool) {
    let outcome = match mode {
        Some(mode) => wizard.set_mode(mode).map(|_| mode),
        None => wizard.toggle_mode(),
    };
    let reply = match outcome {
        Ok(mode) => WizardReply::ModeChanged {
            mode,
            steps: wizard.visible_step_names(),
            position: wizard.position(),
        },
        Err(e) => WizardReply::Failed(e.to_string()),
    };
    (reply, false)
}
