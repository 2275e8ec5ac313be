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

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use ztc_wizard::domain::wizard::{
        event_channel, run_event_loop, spawn_background, FinishError, SchemaHealthTask,
        WizardEvent, WizardReply,
    };
    use ztc_wizard::infrastructure::templates::{discover_templates, load_template};
    use ztc_wizard::*;

    fn repo_path(relative: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join(relative)
    }

    fn gate() -> SchemaGate {
        SchemaGate::new(repo_path("schema/cluster-schema.json"))
    }

    fn wizard(mode: ConfigurationMode) -> WizardOrchestrator {
        WizardOrchestrator::new(Session::new(mode), ClusterDocument::default()).unwrap()
    }

    fn walk_to_last_step(wiz: &mut WizardOrchestrator) {
        while !wiz.is_last_step() {
            assert!(wiz.advance().unwrap().moved);
        }
    }

    #[test]
    fn test_valid_network_advances() {
        let mut wiz = wizard(ConfigurationMode::Advanced);
        wiz.set_field("network.subnet", "192.168.50.0/24").unwrap();
        wiz.set_field("network.gateway", "192.168.50.1").unwrap();
        wiz.set_field("network.pod_cidr", "10.42.0.0/16").unwrap();
        wiz.set_field("network.service_cidr", "10.43.0.0/16").unwrap();

        let outcome = wiz.advance().unwrap();
        assert!(outcome.moved);
        assert_eq!(wiz.current_step_name(), "SSH Setup");
        assert_eq!(wiz.document().network.pod_cidr, "10.42.0.0/16");
        assert_eq!(wiz.document().network.gateway, "192.168.50.1");
    }

    #[test]
    fn test_gate_reports_subnet_pod_conflict() {
        let mut document = ClusterDocument::default();
        document.network.pod_cidr = "192.168.50.128/25".to_string();

        let result = gate().validate_document(&document).unwrap();
        assert!(!result.is_valid());
        let conflict = result
            .errors
            .iter()
            .find(|e| e.field == "network.subnet")
            .unwrap();
        assert_eq!(conflict.related_field.as_deref(), Some("network.pod_cidr"));
    }

    #[test]
    fn test_overlapping_pod_cidr_blocks() {
        let mut wiz = wizard(ConfigurationMode::Advanced);
        wiz.set_field("network.subnet", "10.0.0.0/8").unwrap();
        wiz.set_field("network.gateway", "10.0.0.1").unwrap();
        wiz.set_field("network.pod_cidr", "10.42.0.0/16").unwrap();

        let err = wiz.advance().unwrap_err();
        assert_eq!(err.field, "network.subnet");
        assert_eq!(err.related_field.as_deref(), Some("network.pod_cidr"));
        assert!(err.message.contains("overlaps"));
        assert_eq!(wiz.current_index(), 0);
        assert_eq!(wiz.document().network.subnet, "192.168.50.0/24");
    }

    #[test]
    fn test_nfs_without_backend_blocks() {
        let mut wiz = wizard(ConfigurationMode::Advanced);
        wiz.advance().unwrap();
        wiz.advance().unwrap();
        assert_eq!(wiz.current_step_name(), "Storage Configuration");

        wiz.set_field("storage.local_path.enabled", "false").unwrap();
        wiz.set_field("storage.longhorn.enabled", "false").unwrap();
        wiz.set_field("storage.nfs.enabled", "true").unwrap();

        let err = wiz.advance().unwrap_err();
        assert_eq!(err.field, "storage.nfs.enabled");
        assert!(err.message.contains("backend"));
        assert_eq!(wiz.current_step_name(), "Storage Configuration");
        assert!(!wiz.document().storage.nfs.enabled);
    }

    #[test]
    fn test_gate_rejects_empty_name() {
        let mut document = ClusterDocument::default();
        document.cluster.name = String::new();

        let result = gate().validate_document(&document).unwrap();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "cluster.name"));
    }

    #[test]
    fn test_mode_switch_is_idempotent() {
        let mut wiz = wizard(ConfigurationMode::Simple);
        wiz.set_field("cluster.name", "edge-lab").unwrap();
        wiz.set_field("network.pod_cidr", "10.52.0.0/16").unwrap();
        let simple = wiz.visible_step_names();

        wiz.set_mode(ConfigurationMode::Advanced).unwrap();
        wiz.set_mode(ConfigurationMode::Advanced).unwrap();
        assert_eq!(wiz.visible_step_names().len(), 6);

        wiz.set_mode(ConfigurationMode::Simple).unwrap();
        assert_eq!(wiz.visible_step_names(), simple);
        assert_eq!(wiz.field("cluster.name"), Some("edge-lab"));
        assert_eq!(wiz.field("network.pod_cidr"), Some("10.52.0.0/16"));
    }

    #[test]
    fn test_finish_persists_valid_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = YamlDocumentStore::new(dir.path().join("out/cluster.yaml"));
        let mut wiz = wizard(ConfigurationMode::Advanced);
        wiz.set_field("cluster.name", "persisted").unwrap();
        wiz.set_field("workloads.bundles.monitoring", "true").unwrap();
        walk_to_last_step(&mut wiz);
        assert_eq!(wiz.current_step_name(), "Final Review");

        let report = wiz.finish(&gate(), &store).unwrap();
        assert!(report.result.is_valid());
        assert_eq!(report.path.as_path(), store.path());

        let written = std::fs::read_to_string(&report.path).unwrap();
        assert!(written.starts_with("# yaml-language-server: $schema="));
        let reloaded = ClusterDocument::from_yaml_str(&written).unwrap();
        assert_eq!(reloaded.cluster.name, "persisted");
        assert_eq!(
            reloaded.workloads.auto_deploy_bundles,
            vec!["starter", "monitoring"]
        );
    }

    #[test]
    fn test_rejected_finish_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = YamlDocumentStore::new(dir.path().join("cluster.yaml"));
        // Over-long names fail both the step validator and the schema.
        let mut wiz = wizard(ConfigurationMode::Simple);
        walk_to_last_step(&mut wiz);
        wiz.set_field("cluster.name", &"a".repeat(50)).unwrap();

        match wiz.finish(&gate(), &store) {
            Err(FinishError::Schema(result)) => {
                assert!(result.errors.iter().any(|e| e.field == "cluster.name"))
            }
            Err(FinishError::Step { error, .. }) => assert_eq!(error.field, "cluster.name"),
            other => panic!("unexpected finish outcome: {:?}", other.map(|r| r.path)),
        }
        assert!(!store.path().exists());
    }

    #[test]
    fn test_templates_seed_the_wizard() {
        let templates_dir = repo_path("templates");
        let templates = discover_templates(&templates_dir).unwrap();
        assert!(templates.iter().any(|t| t.id == "ha-lab"));

        let document = load_template(&templates_dir, "ha-lab").unwrap();
        let wiz = WizardOrchestrator::new(
            Session::new(ConfigurationMode::Advanced).with_template("ha-lab"),
            document,
        )
        .unwrap();
        assert_eq!(wiz.field("storage.longhorn.enabled"), Some("true"));
        assert_eq!(wiz.session().template_id.as_deref(), Some("ha-lab"));
    }

    #[tokio::test]
    async fn test_event_loop_drives_to_finish() {
        let dir = tempfile::tempdir().unwrap();
        let gate = Arc::new(gate());
        let store: Arc<dyn DocumentStore> =
            Arc::new(YamlDocumentStore::new(dir.path().join("cluster.yaml")));
        let (events, rx) = event_channel();
        let (reply_tx, mut replies) = mpsc::channel(16);

        let handle = tokio::spawn(run_event_loop(
            wizard(ConfigurationMode::Simple),
            gate.clone(),
            store,
            rx,
            reply_tx,
        ));

        events
            .send(WizardEvent::SetField {
                key: "cluster.name".to_string(),
                value: "loop-lab".to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(
            replies.recv().await,
            Some(WizardReply::FieldSet { .. })
        ));

        events
            .send(WizardEvent::SetField {
                key: "cluster.bogus".to_string(),
                value: "x".to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(
            replies.recv().await,
            Some(WizardReply::FieldRejected { .. })
        ));

        events.send(WizardEvent::Advance).await.unwrap();
        match replies.recv().await {
            Some(WizardReply::Advanced { position, .. }) => assert_eq!(position.index, 1),
            other => panic!("expected advance, got {:?}", other),
        }

        events.send(WizardEvent::Finish).await.unwrap();
        assert!(matches!(
            replies.recv().await,
            Some(WizardReply::FinishFailed(FinishError::NotOnLastStep { .. }))
        ));

        events.send(WizardEvent::Advance).await.unwrap();
        match replies.recv().await {
            Some(WizardReply::Advanced { position, .. }) => {
                assert_eq!(position.index, 2);
                assert_eq!(position.name, "Deploy Preview");
            }
            other => panic!("expected advance, got {:?}", other),
        }

        spawn_background(
            Arc::new(SchemaHealthTask::new(gate, repo_path("templates"))),
            events.clone(),
        );
        match replies.recv().await {
            Some(WizardReply::Background(report)) => assert!(report.result.is_valid()),
            other => panic!("expected background report, got {:?}", other),
        }

        events.send(WizardEvent::Finish).await.unwrap();
        match replies.recv().await {
            Some(WizardReply::Finished(report)) => assert!(report.path.exists()),
            other => panic!("expected finish, got {:?}", other),
        }

        let wiz = handle.await.unwrap().unwrap();
        assert_eq!(wiz.document().cluster.name, "loop-lab");
    }
}
