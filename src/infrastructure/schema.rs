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

//! Schema gate: the final check a document passes before it is written.
//!
//! The JSON schema is compiled once per gate and shared by reference. Any
//! failure to read, parse or compile the schema is fatal for the caller.
//! Schema violations and document-level consistency findings are merged
//! into a single [`ValidationResult`].

use crate::domain::config::ClusterDocument;
use crate::domain::validation::report::count_fields;
use crate::domain::validation::{document_findings, ErrorKind, ValidationError, ValidationResult};
use crate::infrastructure::templates::template_files;
use crate::shared::error::{Result, WizardError};
use jsonschema::error::ValidationErrorKind;
use jsonschema::JSONSchema;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const ROOT_FIELD: &str = "(root)";

pub struct SchemaGate {
    path: PathBuf,
    compiled: OnceCell<JSONSchema>,
}

impl fmt::Debug for SchemaGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaGate")
            .field("path", &self.path)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl SchemaGate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            compiled: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.compiled.get().is_some()
    }

    /// Compile the schema on first use. Later calls return the same instance;
    /// a failed attempt is retried on the next call.
    pub fn load(&self) -> Result<&JSONSchema> {
        self.compiled.get_or_try_init(|| {
            let schema = read_schema_file(&self.path)?;
            let compiled =
                JSONSchema::compile(&schema).map_err(|e| WizardError::SchemaCompile {
                    path: self.path.clone(),
                    reason: e.to_string(),
                })?;
            info!("Compiled schema {}", self.path.display());
            Ok(compiled)
        })
    }

    // ========================================================================
    // Validation entry points
    // ========================================================================

    pub fn validate_document(&self, document: &ClusterDocument) -> Result<ValidationResult> {
        let instance = document.to_json_value()?;
        self.validate_value(&instance, Some(document))
    }

    /// Validate raw YAML. Keys missing from the text are reported as missing
    /// rather than filled with defaults. Unparsable YAML yields an invalid
    /// result with a single `yaml` finding.
    pub fn validate_yaml_str(&self, content: &str) -> Result<ValidationResult> {
        let instance: Value = match serde_yaml::from_str(content) {
            Ok(value) => value,
            Err(e) => {
                return Ok(ValidationResult::from_findings(
                    vec![ValidationError::error("yaml", format!("Invalid YAML syntax: {}", e))
                        .with_kind(ErrorKind::Format)
                        .with_suggestion("Check indentation and quoting in the document")],
                    0,
                ))
            }
        };
        let document = serde_json::from_value::<ClusterDocument>(instance.clone()).ok();
        self.validate_value(&instance, document.as_ref())
    }

    pub fn validate_file(&self, path: &Path) -> Result<ValidationResult> {
        let content = fs::read_to_string(path)?;
        self.validate_yaml_str(&content)
    }

    fn validate_value(
        &self,
        instance: &Value,
        document: Option<&ClusterDocument>,
    ) -> Result<ValidationResult> {
        let schema = self.load()?;
        let mut findings: Vec<ValidationError> = match schema.validate(instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.map(|e| schema_finding(&e)).collect(),
        };
        let fields_checked = match document {
            Some(doc) => {
                findings.extend(document_findings(doc));
                count_fields(doc)
            }
            None => 0,
        };

        let result = ValidationResult::from_findings(findings, fields_checked);
        debug!("Schema gate: {}", result.format_summary());
        Ok(result)
    }

    // ========================================================================
    // Health check
    // ========================================================================

    /// Check the schema file, its compilation and every template. Template
    /// problems are warnings; schema problems are errors.
    pub fn health_check(&self, templates_dir: &Path) -> ValidationResult {
        let mut findings = Vec::new();

        if let Err(e) = read_schema_file(&self.path) {
            findings.push(
                ValidationError::error("schema_file", e.to_string())
                    .with_kind(ErrorKind::Tooling)
                    .with_suggestion(
                        "Ensure cluster-schema.json exists and is readable in the schema/ directory",
                    ),
            );
        } else if let Err(e) = self.load() {
            findings.push(
                ValidationError::error("schema_compilation", e.to_string())
                    .with_kind(ErrorKind::Tooling)
                    .with_suggestion(
                        "Check the schema for unknown keywords or malformed patterns",
                    ),
            );
        }

        if findings.is_empty() {
            findings.extend(self.check_templates(templates_dir));
        }
        ValidationResult::from_findings(findings, 3)
    }

    fn check_templates(&self, templates_dir: &Path) -> Vec<ValidationError> {
        let files = match template_files(templates_dir) {
            Ok(files) => files,
            Err(e) => {
                return vec![ValidationError::warning(
                    "templates",
                    format!("Failed to load templates: {}", e),
                )
                .with_kind(ErrorKind::Tooling)
                .with_suggestion(
                    "Ensure the templates directory exists and contains cluster-*.yaml files",
                )]
            }
        };

        let mut findings = Vec::new();
        for (id, path) in files {
            let checked = fs::read_to_string(&path)
                .map_err(WizardError::from)
                .and_then(|content| self.validate_yaml_str(&content));
            match checked {
                Err(e) => findings.push(
                    ValidationError::warning(
                        format!("template_{}", id),
                        format!("Template {} failed to load: {}", id, e),
                    )
                    .with_kind(ErrorKind::Tooling)
                    .with_suggestion(format!("Check YAML syntax in {}", path.display())),
                ),
                Ok(result) if !result.is_valid() => findings.push(
                    ValidationError::warning(
                        format!("template_{}_schema", id),
                        format!(
                            "Template {} does not match schema ({} errors)",
                            id,
                            result.errors.len()
                        ),
                    )
                    .with_kind(ErrorKind::Tooling)
                    .with_suggestion(
                        "Update the template to match the current schema or fix its errors",
                    ),
                ),
                Ok(_) => {}
            }
        }
        findings
    }
}

fn read_schema_file(path: &Path) -> Result<Value> {
    if !path.is_file() {
        return Err(WizardError::SchemaNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| WizardError::SchemaParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

// ============================================================================
// Violation mapping
// ============================================================================

/// `/network/dns/domain` → `network.dns.domain`.
fn dotted(pointer: &str) -> String {
    pointer
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

fn schema_finding(error: &jsonschema::ValidationError<'_>) -> ValidationError {
    let parent = dotted(&error.instance_path.to_string());
    let field = match &error.kind {
        ValidationErrorKind::Required { property } => {
            let property = property
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| property.to_string());
            if parent.is_empty() {
                property
            } else {
                format!("{}.{}", parent, property)
            }
        }
        _ if parent.is_empty() => ROOT_FIELD.to_string(),
        _ => parent,
    };

    let kind = classify(&error.kind);
    let lowered = field.to_lowercase();
    let message = error.to_string();
    let finding = if lowered.contains("description") || lowered.contains("optional") {
        ValidationError::warning(field, message)
    } else {
        ValidationError::error(field, message)
    };
    let suggestion = suggestion_for(&lowered, kind, &error.kind);
    finding.with_kind(kind).with_suggestion(suggestion)
}

fn classify(kind: &ValidationErrorKind) -> ErrorKind {
    match kind {
        ValidationErrorKind::Pattern { .. } => ErrorKind::Pattern,
        ValidationErrorKind::Required { .. } => ErrorKind::Required,
        ValidationErrorKind::MinLength { limit } if *limit == 1 => ErrorKind::Required,
        ValidationErrorKind::Minimum { .. }
        | ValidationErrorKind::Maximum { .. }
        | ValidationErrorKind::ExclusiveMinimum { .. }
        | ValidationErrorKind::ExclusiveMaximum { .. }
        | ValidationErrorKind::MinLength { .. }
        | ValidationErrorKind::MaxLength { .. }
        | ValidationErrorKind::MinItems { .. }
        | ValidationErrorKind::MaxItems { .. }
        | ValidationErrorKind::MinProperties { .. }
        | ValidationErrorKind::MaxProperties { .. } => ErrorKind::Range,
        ValidationErrorKind::Enum { .. } | ValidationErrorKind::Constant { .. } => ErrorKind::Enum,
        ValidationErrorKind::Type { .. } => ErrorKind::Type,
        ValidationErrorKind::Format { .. } => ErrorKind::Format,
        _ => ErrorKind::Other,
    }
}

fn suggestion_for(field: &str, kind: ErrorKind, raw: &ValidationErrorKind) -> &'static str {
    let syntax = matches!(kind, ErrorKind::Pattern | ErrorKind::Format);
    match kind {
        ErrorKind::Pattern if field.ends_with("name") => {
            "Use letters, numbers, hyphens and underscores (e.g., 'ztc-homelab')"
        }
        _ if syntax && (field.contains("subnet") || field.contains("cidr")) => {
            "Use CIDR notation (e.g., '192.168.50.0/24')"
        }
        _ if syntax
            && (field.ends_with("ip")
                || field.contains("gateway")
                || field.contains("upstreams")) =>
        {
            "Provide a valid IPv4 address (e.g., '192.168.50.10')"
        }
        ErrorKind::Pattern if field.contains("domain") => {
            "Use a valid domain format (e.g., 'homelab.lan')"
        }
        ErrorKind::Pattern if field.contains("memory") || field.contains("size") => {
            "Use memory units like '4Gi', '512Mi', or '2048Mi'"
        }
        ErrorKind::Pattern if field.contains("cpu") => "Use CPU format like '2', '1.5', or '500m'",
        ErrorKind::Required => "This field is mandatory and cannot be empty",
        ErrorKind::Range => match raw {
            ValidationErrorKind::Maximum { .. }
            | ValidationErrorKind::ExclusiveMaximum { .. }
            | ValidationErrorKind::MaxLength { .. }
            | ValidationErrorKind::MaxItems { .. }
            | ValidationErrorKind::MaxProperties { .. } => {
                "Reduce the value to stay within the maximum"
            }
            _ => "Increase the value to meet the minimum requirement",
        },
        ErrorKind::Enum => "Use one of the allowed values specified in the schema",
        ErrorKind::Type => "Check the value type (string, number, boolean or list)",
        _ => "Check the JSON schema for valid values and format",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::write;
    use tempfile::TempDir;

    fn repo_gate() -> SchemaGate {
        SchemaGate::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("schema/cluster-schema.json"))
    }

    #[test]
    fn test_default_document_passes() {
        let gate = repo_gate();
        let result = gate.validate_document(&ClusterDocument::default()).unwrap();
        assert!(result.is_valid(), "{}", result.format_errors());
        assert!(result.warnings.is_empty());
        assert!(gate.is_loaded());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut doc = ClusterDocument::default();
        doc.cluster.name.clear();
        let result = repo_gate().validate_document(&doc).unwrap();
        assert!(!result.is_valid());
        let finding = result
            .errors
            .iter()
            .find(|e| e.field == "cluster.name")
            .unwrap();
        assert!(finding.suggestion.is_some());
    }

    #[test]
    fn test_description_findings_are_warnings() {
        let mut doc = ClusterDocument::default();
        doc.cluster.description.clear();
        let result = repo_gate().validate_document(&doc).unwrap();
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].field, "cluster.description");
    }

    #[test]
    fn test_consistency_findings_are_merged() {
        let mut doc = ClusterDocument::default();
        doc.network.pod_cidr = "192.168.50.128/25".to_string();
        let result = repo_gate().validate_document(&doc).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "network.subnet"
            && e.related_field.as_deref() == Some("network.pod_cidr")));
    }

    #[test]
    fn test_missing_keys_reported_from_yaml() {
        let result = repo_gate()
            .validate_yaml_str("cluster:\n  version: 1.0.0\n")
            .unwrap();
        assert!(!result.is_valid());
        let fields: Vec<_> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"cluster.name"));
        assert!(fields.contains(&"network"));
        assert!(result
            .errors
            .iter()
            .all(|e| e.kind == ErrorKind::Required));
    }

    #[test]
    fn test_invalid_yaml() {
        let result = repo_gate().validate_yaml_str("cluster: [").unwrap();
        assert!(!result.is_valid());
        assert_eq!(result.errors[0].field, "yaml");
    }

    #[test]
    fn test_missing_schema_is_fatal() {
        let gate = SchemaGate::new("/nonexistent/cluster-schema.json");
        let err = gate.validate_document(&ClusterDocument::default()).unwrap_err();
        assert!(err.is_tooling_fatal());
        assert!(!gate.is_loaded());
    }

    #[test]
    fn test_malformed_schema_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cluster-schema.json");
        write(&path, "{ \"type\": \"object\", }").unwrap();
        let err = SchemaGate::new(&path).load().unwrap_err();
        assert!(matches!(err, WizardError::SchemaParse { .. }));
    }

    #[test]
    fn test_health_check_on_repo_templates() {
        let templates = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
        let result = repo_gate().health_check(&templates);
        assert!(result.is_valid(), "{}", result.format_errors());
        assert!(result.warnings.is_empty(), "{}", result.format_warnings());
    }

    #[test]
    fn test_health_check_flags_missing_schema() {
        let dir = TempDir::new().unwrap();
        let result = SchemaGate::new(dir.path().join("missing.json")).health_check(dir.path());
        assert!(!result.is_valid());
        assert_eq!(result.errors[0].field, "schema_file");
    }

    #[test]
    fn test_dotted_paths() {
        assert_eq!(dotted("/network/dns/domain"), "network.dns.domain");
        assert_eq!(dotted(""), "");
        assert_eq!(dotted("/workloads/auto_deploy_bundles/0"), "workloads.auto_deploy_bundles.0");
    }
}
