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

use super::fields::{find_spec, FieldSpec, FieldState};
use super::session::Session;
use crate::domain::config::ClusterDocument;
use crate::domain::validation::ValidationError;
use crate::shared::error::{Result, WizardError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigurationMode {
    #[default]
    Simple,
    Advanced,
}

impl ConfigurationMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Simple => Self::Advanced,
            Self::Advanced => Self::Simple,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for ConfigurationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigurationMode {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "advanced" => Ok(Self::Advanced),
            other => Err(WizardError::config_error(format!(
                "unknown configuration mode '{}', expected simple or advanced",
                other
            ))),
        }
    }
}

/// One configuration concern of the wizard.
///
/// A step owns its editable field values. It reads the document only in
/// [`init_with_config`](ConfigStep::init_with_config) and writes only its own
/// subtree in [`apply`](ConfigStep::apply).
pub trait ConfigStep: Send {
    /// Seed local fields from the document, falling back to defaults.
    fn init_with_config(&mut self, session: &Session, document: &ClusterDocument);

    /// Check the fields active in `mode`. Never touches the document.
    fn validate(&self, mode: ConfigurationMode) -> std::result::Result<(), ValidationError>;

    /// Merge local values into the document. Re-applying the same values
    /// yields the same document.
    fn apply(&self, document: &mut ClusterDocument) -> std::result::Result<(), ValidationError>;

    fn should_show(&self, mode: ConfigurationMode) -> bool;

    fn name(&self, mode: ConfigurationMode) -> &'static str;

    fn fields(&self) -> &'static [FieldSpec];

    fn state(&self) -> &FieldState;

    fn state_mut(&mut self) -> &mut FieldState;

    /// Advisory findings that do not block advancing.
    fn warnings(&self, _mode: ConfigurationMode) -> Vec<ValidationError> {
        Vec::new()
    }

    /// Called each time the step becomes current.
    fn on_enter(&mut self, _document: &ClusterDocument) {}

    fn owns_field(&self, key: &str) -> bool {
        find_spec(self.fields(), key).is_some()
    }

    fn set_field(&mut self, key: &str, value: &str) -> Result<()> {
        let spec = find_spec(self.fields(), key)
            .ok_or_else(|| WizardError::UnknownField(key.to_string()))?;
        let normalized = spec.normalize(value)?;
        self.state_mut().set(spec.key, normalized);
        Ok(())
    }

    fn field(&self, key: &str) -> Option<&str> {
        find_spec(self.fields(), key).map(|spec| self.state().get(spec.key))
    }

    fn active_fields(&self, mode: ConfigurationMode) -> Vec<&'static FieldSpec> {
        self.fields()
            .iter()
            .filter(|spec| spec.is_active(mode))
            .collect()
    }
}

/// A step plus its per-mode presentation metadata.
pub struct StepDefinition {
    pub step: Box<dyn ConfigStep>,
    pub simple_name: &'static str,
    pub advanced_name: &'static str,
    pub show_in_simple: bool,
}

impl StepDefinition {
    pub fn new(step: Box<dyn ConfigStep>) -> Self {
        Self {
            simple_name: step.name(ConfigurationMode::Simple),
            advanced_name: step.name(ConfigurationMode::Advanced),
            show_in_simple: step.should_show(ConfigurationMode::Simple),
            step,
        }
    }

    pub fn display_name(&self, mode: ConfigurationMode) -> &'static str {
        match mode {
            ConfigurationMode::Simple => self.simple_name,
            ConfigurationMode::Advanced => self.advanced_name,
        }
    }
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("simple_name", &self.simple_name)
            .field("advanced_name", &self.advanced_name)
            .field("show_in_simple", &self.show_in_simple)
            .finish()
    }
}

/// Validation error for the first active field whose check fails.
pub(crate) fn first_field_error<F>(
    step: &dyn ConfigStep,
    mode: ConfigurationMode,
    check: F,
) -> std::result::Result<(), ValidationError>
where
    F: Fn(&'static str, &str) -> Option<ValidationError>,
{
    for spec in step.active_fields(mode) {
        if let Some(err) = check(spec.key, step.state().get(spec.key)) {
            return Err(err);
        }
    }
    Ok(())
}
