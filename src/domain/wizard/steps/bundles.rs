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
use crate::domain::validation::ValidationError;
use crate::domain::wizard::bundles::{find_bundle, BUNDLES};
use crate::domain::wizard::fields::{FieldSpec, FieldState};
use crate::domain::wizard::session::Session;
use crate::domain::wizard::step::{ConfigStep, ConfigurationMode};
use tracing::debug;

const SELECTION: &str = "workloads.auto_deploy_bundles";

// One toggle per catalog entry, keyed `workloads.bundles.<id>`.
const FIELDS: &[FieldSpec] = &[
    FieldSpec::toggle("workloads.bundles.starter", "Starter Bundle"),
    FieldSpec::toggle("workloads.bundles.monitoring", "Monitoring Bundle"),
    FieldSpec::toggle("workloads.bundles.productivity", "Productivity Bundle"),
    FieldSpec::toggle("workloads.bundles.security", "Security Bundle"),
];

fn toggle_key(bundle_id: &str) -> Option<&'static str> {
    FIELDS
        .iter()
        .map(|spec| spec.key)
        .find(|key| key.strip_prefix("workloads.bundles.") == Some(bundle_id))
}

/// Optional workload bundles deployed after the cluster comes up.
#[derive(Debug, Default)]
pub struct BundlesStep {
    state: FieldState,
}

impl BundlesStep {
    pub fn selected(&self) -> Vec<String> {
        BUNDLES
            .iter()
            .filter(|bundle| toggle_key(bundle.id).is_some_and(|key| self.state.flag(key)))
            .map(|bundle| bundle.id.to_string())
            .collect()
    }
}

impl ConfigStep for BundlesStep {
    fn init_with_config(&mut self, _session: &Session, document: &ClusterDocument) {
        for bundle in BUNDLES {
            if let Some(key) = toggle_key(bundle.id) {
                self.state.set_flag(key, bundle.recommended);
            }
        }
        for id in &document.workloads.auto_deploy_bundles {
            match (find_bundle(id), toggle_key(id)) {
                (Some(_), Some(key)) => self.state.set_flag(key, true),
                _ => debug!("Ignoring unknown bundle '{}' from template", id),
            }
        }
    }

    /// Bundle choice is optional.
    fn validate(&self, _mode: ConfigurationMode) -> Result<(), ValidationError> {
        Ok(())
    }

    fn apply(&self, document: &mut ClusterDocument) -> Result<(), ValidationError> {
        document.workloads.auto_deploy_bundles = self.selected();
        Ok(())
    }

    fn warnings(&self, _mode: ConfigurationMode) -> Vec<ValidationError> {
        if self.selected().is_empty() {
            vec![ValidationError::warning(
                SELECTION,
                "no workload bundles selected; the cluster will start without applications",
            )]
        } else {
            Vec::new()
        }
    }

    fn should_show(&self, mode: ConfigurationMode) -> bool {
        mode == ConfigurationMode::Advanced
    }

    fn name(&self, _mode: ConfigurationMode) -> &'static str {
        "Bundle Selection"
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
    fn test_template_selection_plus_recommended() {
        let mut doc = ClusterDocument::default();
        doc.workloads.auto_deploy_bundles = vec!["security".to_string(), "media".to_string()];
        let mut step = BundlesStep::default();
        step.init_with_config(&Session::default(), &doc);
        assert_eq!(step.selected(), vec!["starter", "security"]);
    }

    #[test]
    fn test_catalog_order_on_apply() {
        let mut step = BundlesStep::default();
        step.init_with_config(&Session::default(), &ClusterDocument::default());
        step.set_field("workloads.bundles.productivity", "true").unwrap();
        step.set_field("workloads.bundles.starter", "false").unwrap();
        step.set_field("workloads.bundles.monitoring", "on").unwrap();
        let mut doc = ClusterDocument::default();
        step.apply(&mut doc).unwrap();
        assert_eq!(doc.workloads.auto_deploy_bundles, vec!["monitoring", "productivity"]);
    }

    #[test]
    fn test_empty_selection_is_a_warning_only() {
        let mut step = BundlesStep::default();
        step.init_with_config(&Session::default(), &ClusterDocument::default());
        step.set_field("workloads.bundles.starter", "false").unwrap();
        assert!(step.validate(ConfigurationMode::Advanced).is_ok());
        let warnings = step.warnings(ConfigurationMode::Advanced);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, SELECTION);
    }

    #[test]
    fn test_every_catalog_bundle_has_a_toggle() {
        for bundle in BUNDLES {
            assert!(toggle_key(bundle.id).is_some(), "{}", bundle.id);
        }
    }
}
