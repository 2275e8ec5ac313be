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

use super::rejected;
use crate::domain::config::{ClusterDocument, SshConf};
use crate::domain::validation::ssh::{
    validate_private_key_path, validate_public_key_path, validate_username,
};
use crate::domain::validation::ValidationError;
use crate::domain::wizard::fields::{FieldSpec, FieldState};
use crate::domain::wizard::session::Session;
use crate::domain::wizard::step::{first_field_error, ConfigStep, ConfigurationMode};

const PUBLIC_KEY: &str = "nodes.ssh.public_key_path";
const PRIVATE_KEY: &str = "nodes.ssh.private_key_path";
const USERNAME: &str = "nodes.ssh.username";

const FIELDS: &[FieldSpec] = &[
    FieldSpec::text(PUBLIC_KEY, "SSH Public Key Path").simple(),
    FieldSpec::text(PRIVATE_KEY, "SSH Private Key Path").simple(),
    FieldSpec::text(USERNAME, "SSH Username").simple(),
];

/// SSH access to the cluster nodes.
#[derive(Debug, Default)]
pub struct CredentialsStep {
    state: FieldState,
}

impl ConfigStep for CredentialsStep {
    fn init_with_config(&mut self, _session: &Session, document: &ClusterDocument) {
        let ssh = &document.nodes.ssh;
        let defaults = SshConf::default();
        let or_default = |value: &str, fallback: String| {
            if value.is_empty() {
                fallback
            } else {
                value.to_string()
            }
        };
        self.state.set(
            PUBLIC_KEY,
            or_default(&ssh.public_key_path, defaults.public_key_path),
        );
        self.state.set(
            PRIVATE_KEY,
            or_default(&ssh.private_key_path, defaults.private_key_path),
        );
        self.state
            .set(USERNAME, or_default(&ssh.username, defaults.username));
    }

    fn validate(&self, mode: ConfigurationMode) -> Result<(), ValidationError> {
        first_field_error(self, mode, |key, value| {
            let outcome = match key {
                PUBLIC_KEY => validate_public_key_path(value),
                PRIVATE_KEY => validate_private_key_path(value),
                USERNAME => validate_username(value),
                _ => Ok(()),
            };
            outcome.err().map(|invalid| rejected(key, invalid))
        })
    }

    fn apply(&self, document: &mut ClusterDocument) -> Result<(), ValidationError> {
        let ssh = &mut document.nodes.ssh;
        ssh.public_key_path = self.state.get(PUBLIC_KEY).to_string();
        ssh.private_key_path = self.state.get(PRIVATE_KEY).to_string();
        ssh.username = self.state.get(USERNAME).to_string();
        Ok(())
    }

    fn should_show(&self, _mode: ConfigurationMode) -> bool {
        true
    }

    fn name(&self, _mode: ConfigurationMode) -> &'static str {
        "SSH Setup"
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn state(&self) -> &FieldState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FieldState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_document_gets_defaults() {
        let mut doc = ClusterDocument::default();
        doc.nodes.ssh.username.clear();
        let mut step = CredentialsStep::default();
        step.init_with_config(&Session::default(), &doc);
        assert_eq!(step.field(USERNAME), Some("ubuntu"));
        assert!(step.validate(ConfigurationMode::Simple).is_ok());
    }

    #[test]
    fn test_reserved_username_blocks() {
        let mut step = CredentialsStep::default();
        step.init_with_config(&Session::default(), &ClusterDocument::default());
        step.set_field(USERNAME, "root").unwrap();
        let err = step.validate(ConfigurationMode::Simple).unwrap_err();
        assert_eq!(err.field, USERNAME);
        assert_eq!(err.category, crate::domain::validation::Category::Auth);
    }

    #[test]
    fn test_apply_writes_ssh_subtree_only() {
        let mut step = CredentialsStep::default();
        step.init_with_config(&Session::default(), &ClusterDocument::default());
        step.set_field(USERNAME, "ops").unwrap();
        let mut doc = ClusterDocument::default();
        let before = doc.clone();
        step.apply(&mut doc).unwrap();
        assert_eq!(doc.nodes.ssh.username, "ops");
        assert_eq!(doc.network, before.network);
        assert_eq!(doc.nodes.cluster_nodes, before.nodes.cluster_nodes);
    }
}
