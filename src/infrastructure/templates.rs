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

//! Cluster templates stored as `<templates>/cluster-<id>.yaml`.

use crate::domain::config::ClusterDocument;
use crate::infrastructure::constants::{TEMPLATE_EXTENSION, TEMPLATE_PREFIX};
use crate::shared::error::{Result, WizardError};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub node_count: usize,
    pub featured: bool,
    pub path: PathBuf,
}

impl TemplateInfo {
    fn from_document(id: String, path: PathBuf, document: Option<&ClusterDocument>) -> Self {
        let fallback = title_case(&id.replace('-', " "));
        let Some(doc) = document else {
            return Self {
                description: format!("Cluster template: {}", fallback),
                name: fallback,
                id,
                node_count: 0,
                featured: false,
                path,
            };
        };

        let cluster = &doc.cluster;
        let components = &doc.components;
        let node_count = doc.nodes.cluster_nodes.len();
        let featured = !cluster.name.is_empty()
            && !cluster.description.is_empty()
            && node_count > 0
            && !doc.storage.default_storage_class.is_empty()
            && (components.argocd.enabled || components.monitoring.enabled);

        Self {
            name: if cluster.name.is_empty() {
                fallback.clone()
            } else {
                cluster.name.clone()
            },
            description: if cluster.description.is_empty() {
                format!("Cluster template: {}", fallback)
            } else {
                cluster.description.clone()
            },
            id,
            node_count,
            featured,
            path,
        }
    }
}

fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn template_path(templates_dir: &Path, id: &str) -> PathBuf {
    templates_dir.join(format!("{}{}.{}", TEMPLATE_PREFIX, id, TEMPLATE_EXTENSION))
}

/// `(id, path)` for every `cluster-*.yaml` file, sorted by id.
pub fn template_files(templates_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !templates_dir.is_dir() {
        return Err(WizardError::config_error(format!(
            "templates directory not found: {}",
            templates_dir.display()
        )));
    }

    let suffix = format!(".{}", TEMPLATE_EXTENSION);
    let mut files = Vec::new();
    for entry in fs::read_dir(templates_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if let Some(id) = name
            .strip_prefix(TEMPLATE_PREFIX)
            .and_then(|rest| rest.strip_suffix(suffix.as_str()))
        {
            files.push((id.to_string(), entry.path()));
        }
    }
    files.sort();
    Ok(files)
}

/// List templates with their metadata. A file that fails to parse is still
/// listed with names derived from its id.
pub fn discover_templates(templates_dir: &Path) -> Result<Vec<TemplateInfo>> {
    let templates = template_files(templates_dir)?
        .into_iter()
        .map(|(id, path)| {
            let document = match ClusterDocument::from_file(&path) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    warn!("Template {} could not be parsed: {}", path.display(), e);
                    None
                }
            };
            TemplateInfo::from_document(id, path, document.as_ref())
        })
        .collect::<Vec<_>>();
    debug!(
        "Discovered {} template(s) in {}",
        templates.len(),
        templates_dir.display()
    );
    Ok(templates)
}

pub fn load_template(templates_dir: &Path, id: &str) -> Result<ClusterDocument> {
    let path = template_path(templates_dir, id);
    if !path.is_file() {
        return Err(WizardError::template_not_found(id, path));
    }
    ClusterDocument::from_file(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::write;
    use tempfile::TempDir;

    #[test]
    fn test_discovery_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        let doc = ClusterDocument::default().to_yaml().unwrap();
        write(dir.path().join("cluster-homelab.yaml"), &doc).unwrap();
        write(dir.path().join("cluster-edge-lab.yaml"), "cluster: [broken").unwrap();
        write(dir.path().join("notes.yaml"), &doc).unwrap();
        write(dir.path().join("cluster-old.yml"), &doc).unwrap();

        let templates = discover_templates(dir.path()).unwrap();
        assert_eq!(templates.len(), 2);

        assert_eq!(templates[0].id, "edge-lab");
        assert_eq!(templates[0].name, "Edge Lab");
        assert_eq!(templates[0].description, "Cluster template: Edge Lab");
        assert!(!templates[0].featured);

        assert_eq!(templates[1].id, "homelab");
        assert_eq!(templates[1].name, "ztc-homelab");
        assert_eq!(templates[1].node_count, 2);
        assert!(templates[1].featured);
    }

    #[test]
    fn test_load_missing_template() {
        let dir = TempDir::new().unwrap();
        let err = load_template(dir.path(), "nope").unwrap_err();
        assert!(matches!(err, WizardError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_missing_directory() {
        assert!(template_files(Path::new("/nonexistent/ztc/templates")).is_err());
    }
}
