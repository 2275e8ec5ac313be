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

use crate::domain::config::{ClusterDocument, NodeInfo};
use crate::domain::validation::ValidationError;
use crate::domain::wizard::fields::{FieldSpec, FieldState};
use crate::domain::wizard::session::Session;
use crate::domain::wizard::step::{ConfigStep, ConfigurationMode};

/// Read-only digest of the document shown before committing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSummary {
    pub name: String,
    pub description: String,
    pub node_count: String,
    /// `(section, value)` pairs in display order.
    pub sections: Vec<(String, String)>,
    pub nodes: Vec<NodeInfo>,
}

impl ReviewSummary {
    pub fn from_document(document: &ClusterDocument) -> Self {
        let network = &document.network;
        let storage = &document.storage;
        let providers: Vec<&str> = storage
            .enabled_backends()
            .iter()
            .map(|b| b.display_name())
            .collect();
        let ha = match &document.cluster.ha_config {
            Some(ha) if ha.enabled => {
                let lb = ha
                    .load_balancer
                    .as_ref()
                    .map(|lb| lb.kind.as_str())
                    .unwrap_or("none");
                format!("enabled, VIP {} via {}", ha.virtual_ip, lb)
            }
            _ => "disabled".to_string(),
        };
        let bundles = if document.workloads.auto_deploy_bundles.is_empty() {
            "none".to_string()
        } else {
            document.workloads.auto_deploy_bundles.join(", ")
        };

        let sections = vec![
            (
                "Network".to_string(),
                format!(
                    "{} via {} (pods {}, services {}, domain {})",
                    network.subnet,
                    network.gateway,
                    network.pod_cidr,
                    network.service_cidr,
                    network.dns.domain
                ),
            ),
            (
                "SSH".to_string(),
                format!(
                    "{} with {}",
                    document.nodes.ssh.username, document.nodes.ssh.public_key_path
                ),
            ),
            (
                "Storage".to_string(),
                format!(
                    "{} (default {})",
                    if providers.is_empty() {
                        "none".to_string()
                    } else {
                        providers.join(", ")
                    },
                    storage.default_storage_class
                ),
            ),
            ("High Availability".to_string(), ha),
            ("Bundles".to_string(), bundles),
        ];

        let nodes = document.node_list();
        Self {
            name: document.cluster.name.clone(),
            description: document.cluster.description.clone(),
            node_count: format!("{} nodes", nodes.len()),
            sections,
            nodes,
        }
    }
}

#[derive(Debug, Default)]
pub struct ReviewStep {
    state: FieldState,
    summary: ReviewSummary,
}

impl ReviewStep {
    pub fn summary(&self) -> &ReviewSummary {
        &self.summary
    }
}

impl ConfigStep for ReviewStep {
    fn init_with_config(&mut self, _session: &Session, document: &ClusterDocument) {
        self.summary = ReviewSummary::from_document(document);
    }

    fn validate(&self, _mode: ConfigurationMode) -> Result<(), ValidationError> {
        Ok(())
    }

    fn apply(&self, _document: &mut ClusterDocument) -> Result<(), ValidationError> {
        Ok(())
    }

    fn on_enter(&mut self, document: &ClusterDocument) {
        self.summary = ReviewSummary::from_document(document);
    }

    fn should_show(&self, _mode: ConfigurationMode) -> bool {
        true
    }

    fn name(&self, mode: ConfigurationMode) -> &'static str {
        match mode {
            ConfigurationMode::Simple => "Deploy Preview",
            ConfigurationMode::Advanced => "Final Review",
        }
    }

    fn fields(&self) -> &'static [FieldSpec] {
        &[]
    }

    fn state(&self) -> &FieldState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FieldState {
        &mut self.state
    }
}
