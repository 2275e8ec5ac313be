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

use std::path::PathBuf;
use thiserror::Error;
pub type Result<T> = std::result::Result<T, WizardError>;

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Schema file not found: {}", path.display())]
    SchemaNotFound { path: PathBuf },

    #[error("Invalid JSON in schema file {}: {reason}", path.display())]
    SchemaParse { path: PathBuf, reason: String },

    #[error("Failed to compile schema {}: {reason}", path.display())]
    SchemaCompile { path: PathBuf, reason: String },

    #[error("Template not found for ID '{id}': {}", path.display())]
    TemplateNotFound { id: String, path: PathBuf },

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidFieldValue { field: String, reason: String },

    #[error("Wizard has no visible steps for mode {0}")]
    NoVisibleSteps(String),

    #[error("Event channel closed")]
    ChannelClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl WizardError {
    pub fn config_error(context: impl Into<String>) -> Self {
        Self::ConfigError(context.into())
    }

    pub fn template_not_found(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::TemplateNotFound {
            id: id.into(),
            path: path.into(),
        }
    }

    pub fn invalid_field_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFieldValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Errors that block all forward progress and are reported as a single
    /// diagnostic instead of a field list.
    pub fn is_tooling_fatal(&self) -> bool {
        matches!(
            self,
            Self::SchemaNotFound { .. } | Self::SchemaParse { .. } | Self::SchemaCompile { .. }
        )
    }
}
