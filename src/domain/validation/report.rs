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

use crate::domain::config::ClusterDocument;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Summary bucket a finding is counted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Network,
    Storage,
    Nodes,
    Auth,
    Ha,
    Components,
    General,
}

impl Category {
    /// Derive the category from a dotted field path.
    pub fn from_field(field: &str) -> Self {
        let field = field.to_lowercase();
        if field.starts_with("cluster.ha_config") {
            Self::Ha
        } else if field.starts_with("network") {
            Self::Network
        } else if field.starts_with("storage") {
            Self::Storage
        } else if field.starts_with("nodes.ssh") {
            Self::Auth
        } else if field.starts_with("nodes") {
            Self::Nodes
        } else if field.starts_with("components") {
            Self::Components
        } else {
            Self::General
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Storage => "storage",
            Self::Nodes => "nodes",
            Self::Auth => "auth",
            Self::Ha => "ha",
            Self::Components => "components",
            Self::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which kind of constraint a finding violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Pattern,
    Required,
    Range,
    Enum,
    Type,
    Format,
    Consistency,
    Tooling,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_field: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub severity: Severity,
    pub category: Category,
    pub kind: ErrorKind,
}

impl ValidationError {
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field.into(), message.into(), Severity::Error)
    }

    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field.into(), message.into(), Severity::Warning)
    }

    fn new(field: String, message: String, severity: Severity) -> Self {
        let category = Category::from_field(&field);
        Self {
            field,
            related_field: None,
            message,
            suggestion: None,
            severity,
            category,
            kind: ErrorKind::Other,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_related(mut self, field: impl Into<String>) -> Self {
        self.related_field = Some(field.into());
        self
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.related_field {
            Some(related) => write!(f, "{} / {}: {}", self.field, related, self.message),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub total_errors: usize,
    pub total_warnings: usize,
    pub fields_checked: usize,
    pub categories: BTreeMap<Category, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
    pub summary: ValidationSummary,
}

impl ValidationResult {
    /// Split findings by severity. The result is valid when no error-level
    /// finding is present; warnings never block.
    pub fn from_findings(findings: Vec<ValidationError>, fields_checked: usize) -> Self {
        let mut categories = BTreeMap::new();
        let (warnings, errors): (Vec<_>, Vec<_>) =
            findings.into_iter().partition(ValidationError::is_warning);

        for finding in errors.iter().chain(warnings.iter()) {
            *categories.entry(finding.category).or_insert(0) += 1;
        }

        Self {
            valid: errors.is_empty(),
            summary: ValidationSummary {
                total_errors: errors.len(),
                total_warnings: warnings.len(),
                fields_checked,
                categories,
            },
            errors,
            warnings,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn format_errors(&self) -> String {
        if self.errors.is_empty() {
            return "No validation errors found".to_string();
        }
        let mut out = format!("Found {} validation error(s):\n", self.errors.len());
        for (i, err) in self.errors.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, format_single(err)));
        }
        out
    }

    pub fn format_warnings(&self) -> String {
        if self.warnings.is_empty() {
            return String::new();
        }
        let mut out = format!("Found {} warning(s):\n", self.warnings.len());
        for (i, warn) in self.warnings.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, format_single(warn)));
        }
        out
    }

    pub fn format_summary(&self) -> String {
        let status = if self.valid { "VALID" } else { "INVALID" };
        let mut out = format!(
            "Configuration {}: {} error(s), {} warning(s), ~{} field(s) checked",
            status,
            self.summary.total_errors,
            self.summary.total_warnings,
            self.summary.fields_checked
        );
        if !self.summary.categories.is_empty() {
            let parts: Vec<String> = self
                .summary
                .categories
                .iter()
                .map(|(category, count)| format!("{}: {}", category, count))
                .collect();
            out.push_str(&format!(" [{}]", parts.join(", ")));
        }
        out
    }
}

fn format_single(err: &ValidationError) -> String {
    match &err.suggestion {
        Some(suggestion) => format!("{}\n   Suggestion: {}", err, suggestion),
        None => err.to_string(),
    }
}

/// Rough count of fields the gate inspects for a document.
pub fn count_fields(document: &ClusterDocument) -> usize {
    let mut count = 10;
    count += document.nodes.cluster_nodes.len() * 3;

    let storage = &document.storage;
    if storage.local_path.enabled {
        count += 2;
    }
    if storage.longhorn.enabled {
        count += 5;
    }
    if storage.nfs.enabled {
        count += 4;
    }

    let components = &document.components;
    if components.argocd.enabled {
        count += 2;
    }
    if components.monitoring.enabled {
        count += 3;
    }
    if components.gitea.enabled {
        count += 2;
    }
    if components.minio.enabled {
        count += 4;
    }
    count
}
