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

//! Step state machine.
//!
//! The orchestrator owns the document and every step. Its position is an
//! index into the steps visible in the current mode. Moving forward
//! validates and applies the current step; moving back never validates.

use super::session::Session;
use super::step::{ConfigStep, ConfigurationMode, StepDefinition};
use super::steps::default_steps;
use crate::domain::config::ClusterDocument;
use crate::domain::validation::{ValidationError, ValidationResult};
use crate::infrastructure::persistence::DocumentStore;
use crate::infrastructure::schema::SchemaGate;
use crate::shared::error::{Result, WizardError};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Result of a successful forward move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceOutcome {
    /// False when already on the last visible step.
    pub moved: bool,
    pub warnings: Vec<ValidationError>,
}

/// Where the wizard stands, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPosition {
    pub name: &'static str,
    pub index: usize,
    pub total: usize,
    pub indicator: String,
}

#[derive(Debug, Clone)]
pub struct FinishReport {
    pub path: PathBuf,
    pub result: ValidationResult,
}

#[derive(Debug, Error)]
pub enum FinishError {
    #[error("finish is only available on the last step (currently on '{step}')")]
    NotOnLastStep { step: &'static str },

    #[error("step '{step}' is incomplete: {error}")]
    Step {
        step: &'static str,
        error: ValidationError,
    },

    #[error("configuration failed schema validation with {} error(s)", .0.errors.len())]
    Schema(ValidationResult),

    #[error(transparent)]
    Tooling(#[from] WizardError),
}

pub struct WizardOrchestrator {
    session: Session,
    document: ClusterDocument,
    steps: Vec<StepDefinition>,
    /// Indices into `steps` that are visible in the current mode.
    visible: Vec<usize>,
    current: usize,
}

impl fmt::Debug for WizardOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardOrchestrator")
            .field("session", &self.session.id)
            .field("mode", &self.mode())
            .field("steps", &self.steps)
            .field("visible", &self.visible)
            .field("current", &self.current)
            .finish()
    }
}

impl WizardOrchestrator {
    pub fn new(session: Session, document: ClusterDocument) -> Result<Self> {
        Self::with_steps(session, document, default_steps())
    }

    /// Initialize every step from the document and derive the visible set.
    pub fn with_steps(
        session: Session,
        document: ClusterDocument,
        steps: Vec<Box<dyn ConfigStep>>,
    ) -> Result<Self> {
        let steps: Vec<StepDefinition> = steps
            .into_iter()
            .map(|mut step| {
                step.init_with_config(&session, &document);
                StepDefinition::new(step)
            })
            .collect();

        let mut orchestrator = Self {
            session,
            document,
            steps,
            visible: Vec::new(),
            current: 0,
        };
        orchestrator.visible = orchestrator.visible_for(orchestrator.mode());
        if orchestrator.visible.is_empty() {
            return Err(WizardError::NoVisibleSteps(orchestrator.mode().to_string()));
        }
        orchestrator.enter_current();
        debug!(
            "Wizard {} initialized with {} of {} steps visible",
            orchestrator.session.id,
            orchestrator.visible.len(),
            orchestrator.steps.len()
        );
        Ok(orchestrator)
    }

    fn visible_for(&self, mode: ConfigurationMode) -> Vec<usize> {
        self.steps
            .iter()
            .enumerate()
            .filter(|(_, def)| def.step.should_show(mode))
            .map(|(i, _)| i)
            .collect()
    }

    fn enter_current(&mut self) {
        let idx = self.visible[self.current];
        self.steps[idx].step.on_enter(&self.document);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn mode(&self) -> ConfigurationMode {
        self.session.mode
    }

    pub fn document(&self) -> &ClusterDocument {
        &self.document
    }

    pub fn into_document(self) -> ClusterDocument {
        self.document
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_last_step(&self) -> bool {
        self.current + 1 == self.visible.len()
    }

    pub fn current_step(&self) -> &dyn ConfigStep {
        self.steps[self.visible[self.current]].step.as_ref()
    }

    pub fn current_step_name(&self) -> &'static str {
        self.steps[self.visible[self.current]].display_name(self.mode())
    }

    pub fn visible_step_names(&self) -> Vec<&'static str> {
        let mode = self.mode();
        self.visible
            .iter()
            .map(|&i| self.steps[i].display_name(mode))
            .collect()
    }

    pub fn position(&self) -> StepPosition {
        StepPosition {
            name: self.current_step_name(),
            index: self.current,
            total: self.visible.len(),
            indicator: self.step_indicator(),
        }
    }

    /// `●` done, `◐` current, `○` pending.
    pub fn step_indicator(&self) -> String {
        (0..self.visible.len())
            .map(|i| match i.cmp(&self.current) {
                std::cmp::Ordering::Less => "●",
                std::cmp::Ordering::Equal => "◐",
                std::cmp::Ordering::Greater => "○",
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    // ========================================================================
    // Field access, routed to the owning step whether visible or not
    // ========================================================================

    pub fn set_field(&mut self, key: &str, value: &str) -> Result<()> {
        let def = self
            .steps
            .iter_mut()
            .find(|def| def.step.owns_field(key))
            .ok_or_else(|| WizardError::UnknownField(key.to_string()))?;
        def.step.set_field(key, value)
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.steps.iter().find_map(|def| def.step.field(key))
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Validate and apply the current step, then move forward. On failure the
    /// position and the document are unchanged.
    pub fn advance(&mut self) -> std::result::Result<AdvanceOutcome, ValidationError> {
        let mode = self.mode();
        let idx = self.visible[self.current];
        let def = &self.steps[idx];
        let name = def.display_name(mode);

        if let Err(err) = def.step.validate(mode) {
            info!("Step '{}' blocked: {}", name, err);
            return Err(err);
        }

        // Apply to a scratch copy so a failing apply leaves the document intact.
        let mut candidate = self.document.clone();
        if let Err(err) = def.step.apply(&mut candidate) {
            warn!("Step '{}' failed to apply: {}", name, err);
            return Err(err);
        }
        self.document = candidate;
        let warnings = def.step.warnings(mode);

        let moved = !self.is_last_step();
        if moved {
            self.current += 1;
            self.enter_current();
        }
        debug!(
            "Advanced past '{}' to '{}' ({} warning(s))",
            name,
            self.current_step_name(),
            warnings.len()
        );
        Ok(AdvanceOutcome { moved, warnings })
    }

    /// Move back one step without validating. Returns false at the first step.
    pub fn retreat(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        self.enter_current();
        true
    }

    /// Switch mode and rebuild the visible list. Field values are kept.
    /// The current step stays current if still visible, otherwise the
    /// nearest visible step before it becomes current.
    pub fn set_mode(&mut self, mode: ConfigurationMode) -> Result<()> {
        if mode == self.mode() {
            return Ok(());
        }
        let visible = self.visible_for(mode);
        if visible.is_empty() {
            return Err(WizardError::NoVisibleSteps(mode.to_string()));
        }
        let anchor = self.visible[self.current];
        self.current = visible.iter().rposition(|&i| i <= anchor).unwrap_or(0);
        self.visible = visible;
        self.session.mode = mode;
        self.enter_current();
        info!(
            "Switched to {} mode, {} steps visible",
            mode,
            self.visible.len()
        );
        Ok(())
    }

    pub fn toggle_mode(&mut self) -> Result<ConfigurationMode> {
        let mode = self.mode().toggled();
        self.set_mode(mode)?;
        Ok(mode)
    }

    // ========================================================================
    // Commit
    // ========================================================================

    /// Validate and apply every visible step in order. On the first failure
    /// the failing step becomes current.
    pub fn assemble(&mut self) -> std::result::Result<Vec<ValidationError>, FinishError> {
        let mode = self.mode();
        let mut candidate = self.document.clone();
        let mut warnings = Vec::new();

        for (pos, &idx) in self.visible.iter().enumerate() {
            let def = &self.steps[idx];
            let outcome = def
                .step
                .validate(mode)
                .and_then(|_| def.step.apply(&mut candidate));
            if let Err(error) = outcome {
                let step = def.display_name(mode);
                self.current = pos;
                self.enter_current();
                return Err(FinishError::Step { step, error });
            }
            warnings.extend(def.step.warnings(mode));
        }

        self.document = candidate;
        Ok(warnings)
    }

    /// Assemble the document, run it through the schema gate and persist it
    /// only when the gate reports no errors. Only allowed from the last
    /// visible step.
    pub fn finish(
        &mut self,
        gate: &SchemaGate,
        store: &dyn DocumentStore,
    ) -> std::result::Result<FinishReport, FinishError> {
        if !self.is_last_step() {
            let step = self.current_step_name();
            info!("Finish refused on step '{}'", step);
            return Err(FinishError::NotOnLastStep { step });
        }
        self.assemble()?;
        let result = gate.validate_document(&self.document)?;
        if !result.is_valid() {
            warn!(
                "Schema gate rejected the document: {}",
                result.format_summary()
            );
            return Err(FinishError::Schema(result));
        }
        let path = store.save(&self.document, &self.session)?;
        info!("Configuration written to {}", path.display());
        Ok(FinishReport { path, result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::wizard::steps::{NetworkStep, ReviewStep};
    use crate::infrastructure::persistence::YamlDocumentStore;

    fn wizard(mode: ConfigurationMode) -> WizardOrchestrator {
        WizardOrchestrator::new(Session::new(mode), ClusterDocument::default()).unwrap()
    }

    #[test]
    fn test_visible_steps_per_mode() {
        assert_eq!(
            wizard(ConfigurationMode::Simple).visible_step_names(),
            vec!["Network Essentials", "SSH Setup", "Deploy Preview"]
        );
        assert_eq!(
            wizard(ConfigurationMode::Advanced).visible_step_names(),
            vec![
                "Network Configuration",
                "SSH Setup",
                "Storage Configuration",
                "High Availability",
                "Bundle Selection",
                "Final Review"
            ]
        );
    }

    #[test]
    fn test_no_visible_steps_is_an_error() {
        let err =
            WizardOrchestrator::with_steps(Session::default(), ClusterDocument::default(), vec![])
                .unwrap_err();
        assert!(matches!(err, WizardError::NoVisibleSteps(_)));
    }

    #[test]
    fn test_finish_requires_last_step() {
        let dir = tempfile::tempdir().unwrap();
        let store = YamlDocumentStore::new(dir.path().join("cluster.yaml"));
        let gate = SchemaGate::new(dir.path().join("unused-schema.json"));
        let mut wiz = wizard(ConfigurationMode::Advanced);

        match wiz.finish(&gate, &store) {
            Err(FinishError::NotOnLastStep { step }) => assert_eq!(step, "Network Configuration"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(wiz.current_index(), 0);
        assert!(!gate.is_loaded());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_advance_blocks_on_invalid_step() {
        let mut wiz = wizard(ConfigurationMode::Simple);
        wiz.set_field("cluster.name", "bad name!").unwrap();
        let err = wiz.advance().unwrap_err();
        assert_eq!(err.field, "cluster.name");
        assert_eq!(wiz.current_index(), 0);
        assert_eq!(wiz.document().cluster.name, "ztc-homelab");
    }

    #[test]
    fn test_advance_applies_and_clamps() {
        let mut wiz = wizard(ConfigurationMode::Simple);
        wiz.set_field("cluster.name", "lab").unwrap();
        assert!(wiz.advance().unwrap().moved);
        assert_eq!(wiz.document().cluster.name, "lab");
        assert!(wiz.advance().unwrap().moved);
        assert!(wiz.is_last_step());
        assert!(!wiz.advance().unwrap().moved);
        assert_eq!(wiz.current_index(), 2);
        assert_eq!(wiz.step_indicator(), "● ● ◐");
        let position = wiz.position();
        assert_eq!(position.name, "Deploy Preview");
        assert_eq!((position.index, position.total), (2, 3));
    }

    #[test]
    fn test_retreat_keeps_values() {
        let mut wiz = wizard(ConfigurationMode::Simple);
        assert!(!wiz.retreat());
        wiz.advance().unwrap();
        wiz.set_field("nodes.ssh.username", "root").unwrap();
        assert!(wiz.retreat());
        assert_eq!(wiz.current_index(), 0);
        assert_eq!(wiz.field("nodes.ssh.username"), Some("root"));
    }

    #[test]
    fn test_mode_switch_round_trip() {
        let mut wiz = wizard(ConfigurationMode::Simple);
        wiz.set_field("storage.longhorn.enabled", "true").unwrap();
        wiz.set_field("cluster.name", "kept").unwrap();
        let direct = wizard(ConfigurationMode::Simple).visible_step_names();

        wiz.set_mode(ConfigurationMode::Advanced).unwrap();
        wiz.set_mode(ConfigurationMode::Simple).unwrap();
        assert_eq!(wiz.visible_step_names(), direct);
        assert_eq!(wiz.field("storage.longhorn.enabled"), Some("true"));
        assert_eq!(wiz.field("cluster.name"), Some("kept"));
    }

    #[test]
    fn test_mode_switch_moves_to_preceding_visible_step() {
        let mut wiz = wizard(ConfigurationMode::Advanced);
        wiz.advance().unwrap();
        wiz.advance().unwrap();
        wiz.advance().unwrap();
        assert_eq!(wiz.current_step_name(), "High Availability");
        wiz.toggle_mode().unwrap();
        assert_eq!(wiz.current_step_name(), "SSH Setup");
        wiz.toggle_mode().unwrap();
        assert_eq!(wiz.current_step_name(), "SSH Setup");
    }

    #[test]
    fn test_hidden_values_not_required_until_visible() {
        let mut wiz = wizard(ConfigurationMode::Simple);
        wiz.set_field("storage.longhorn.enabled", "true").unwrap();
        wiz.set_field("storage.longhorn.replica_count", "42").unwrap();
        let warnings = wiz.assemble().unwrap();
        assert!(warnings.is_empty());
        assert!(!wiz.document().storage.longhorn.enabled);

        wiz.set_mode(ConfigurationMode::Advanced).unwrap();
        match wiz.assemble().unwrap_err() {
            FinishError::Step { step, error } => {
                assert_eq!(step, "Storage Configuration");
                assert_eq!(error.field, "storage.longhorn.replica_count");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(wiz.current_step_name(), "Storage Configuration");
    }

    #[test]
    fn test_unknown_field() {
        let mut wiz = wizard(ConfigurationMode::Simple);
        assert!(matches!(
            wiz.set_field("cluster.flavour", "x"),
            Err(WizardError::UnknownField(_))
        ));
    }

    #[test]
    fn test_custom_step_list() {
        let steps: Vec<Box<dyn ConfigStep>> =
            vec![Box::new(NetworkStep::default()), Box::new(ReviewStep::default())];
        let wiz =
            WizardOrchestrator::with_steps(Session::default(), ClusterDocument::default(), steps)
                .unwrap();
        assert_eq!(wiz.visible_len(), 2);
    }
}
