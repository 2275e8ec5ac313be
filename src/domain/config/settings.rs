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

//! Tool settings read from `ztc-wizard.toml`.

use crate::domain::wizard::ConfigurationMode;
use crate::infrastructure::constants::{
    DEFAULT_OUTPUT_FILE, SCHEMA_RELATIVE_PATH, SETTINGS_FILE_NAME, TEMPLATES_DIR, WORKSPACE_ENV,
};
use crate::shared::error::{Result, WizardError};
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WizardSettings {
    pub workspace: Option<PathBuf>,
    pub schema_path: Option<PathBuf>,
    pub templates_dir: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub default_mode: ConfigurationMode,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            workspace: None,
            schema_path: None,
            templates_dir: None,
            output_path: None,
            default_mode: ConfigurationMode::Simple,
        }
    }
}

impl WizardSettings {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|e| {
            WizardError::config_error(format!(
                "Failed to read settings file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Load an explicit settings file, or `ztc-wizard.toml` from the
    /// current directory when present, or defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let local = Path::new(SETTINGS_FILE_NAME);
        if local.is_file() {
            tracing::debug!("Using settings from {}", local.display());
            return Self::from_file(local);
        }
        Ok(Self::default())
    }

    /// Command line > settings file > `ZTC_WORKSPACE` > current directory.
    pub fn resolve_workspace(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.workspace.clone())
            .or_else(|| std::env::var_os(WORKSPACE_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn resolve_schema_path(&self, workspace: &Path) -> PathBuf {
        self.schema_path
            .clone()
            .unwrap_or_else(|| workspace.join(SCHEMA_RELATIVE_PATH))
    }

    pub fn resolve_templates_dir(&self, workspace: &Path) -> PathBuf {
        self.templates_dir
            .clone()
            .unwrap_or_else(|| workspace.join(TEMPLATES_DIR))
    }

    pub fn resolve_output_path(&self, workspace: &Path, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.output_path.clone())
            .unwrap_or_else(|| workspace.join(DEFAULT_OUTPUT_FILE))
    }
}
