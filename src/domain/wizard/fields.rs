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

//! Declarative field tables and the editable values behind them.
//!
//! Each step publishes a static `[FieldSpec]` table. The `simple` flag
//! decides whether a field is active in Simple mode; every field is active
//! in Advanced mode.

use super::step::ConfigurationMode;
use crate::shared::error::{Result, WizardError};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Toggle,
    Select(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Dotted document path, also the `-D` override key.
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub simple: bool,
}

impl FieldSpec {
    pub const fn text(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Text,
            simple: false,
        }
    }

    pub const fn toggle(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Toggle,
            simple: false,
        }
    }

    pub const fn select(
        key: &'static str,
        label: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Select(options),
            simple: false,
        }
    }

    /// Mark the field as part of the Simple mode subset.
    pub const fn simple(self) -> Self {
        Self {
            simple: true,
            ..self
        }
    }

    pub fn is_active(&self, mode: ConfigurationMode) -> bool {
        self.simple || mode == ConfigurationMode::Advanced
    }

    /// Canonical stored form of raw input for this field.
    pub fn normalize(&self, raw: &str) -> Result<String> {
        let raw = raw.trim();
        match self.kind {
            FieldKind::Text => Ok(raw.to_string()),
            FieldKind::Toggle => parse_bool(raw).map(|b| b.to_string()).ok_or_else(|| {
                WizardError::invalid_field_value(
                    self.key,
                    format!("expected true or false, got '{}'", raw),
                )
            }),
            FieldKind::Select(options) => {
                if options.contains(&raw) {
                    Ok(raw.to_string())
                } else {
                    Err(WizardError::invalid_field_value(
                        self.key,
                        format!("expected one of [{}], got '{}'", options.join(", "), raw),
                    ))
                }
            }
        }
    }
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

pub fn find_spec<'a>(specs: &'a [FieldSpec], key: &str) -> Option<&'a FieldSpec> {
    specs.iter().find(|spec| spec.key == key)
}

/// Current values of a step's fields, keyed by field path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
    values: BTreeMap<&'static str, String>,
}

impl FieldState {
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or_default()
    }

    pub fn set(&mut self, key: &'static str, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    pub fn flag(&self, key: &str) -> bool {
        parse_bool(self.get(key)).unwrap_or(false)
    }

    pub fn set_flag(&mut self, key: &'static str, value: bool) {
        self.set(key, value.to_string());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }
}
