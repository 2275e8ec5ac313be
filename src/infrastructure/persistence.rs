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
use crate::domain::wizard::Session;
use crate::infrastructure::constants::{DOCUMENT_TITLE, SCHEMA_MODELINE};
use crate::shared::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Destination for a document that passed the schema gate.
pub trait DocumentStore: Send + Sync {
    fn save(&self, document: &ClusterDocument, session: &Session) -> Result<PathBuf>;
}

/// Header comment lines followed by the YAML body.
pub fn render_document(document: &ClusterDocument, generated_at: DateTime<Utc>) -> Result<String> {
    let body = document.to_yaml()?;
    Ok(format!(
        "{}\n{}\n# Generated by ztc-wizard on {}\n\n{}",
        SCHEMA_MODELINE,
        DOCUMENT_TITLE,
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        body
    ))
}

#[derive(Debug, Clone)]
pub struct YamlDocumentStore {
    path: PathBuf,
}

impl YamlDocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for YamlDocumentStore {
    fn save(&self, document: &ClusterDocument, session: &Session) -> Result<PathBuf> {
        let content = render_document(document, Utc::now())?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, content)?;
        debug!(
            "Session {} saved {} bytes to {}",
            session.id,
            fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0),
            self.path.display()
        );
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_render_header() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let text = render_document(&ClusterDocument::default(), at).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], SCHEMA_MODELINE);
        assert_eq!(lines[1], DOCUMENT_TITLE);
        assert_eq!(lines[2], "# Generated by ztc-wizard on 2025-03-01T12:00:00Z");
        assert_eq!(lines[4], "cluster:");
    }

    #[test]
    fn test_save_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = YamlDocumentStore::new(dir.path().join("out/cluster.yaml"));
        let mut doc = ClusterDocument::default();
        doc.cluster.name = "saved".to_string();

        let path = store.save(&doc, &Session::default()).unwrap();
        assert_eq!(path, store.path());
        assert_eq!(ClusterDocument::from_file(&path).unwrap(), doc);
    }
}
