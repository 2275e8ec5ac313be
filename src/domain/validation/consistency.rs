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

//! Cross-field checks over an assembled document.

use super::ha::{validate_load_balancer_type, validate_virtual_ip};
use super::network::{check_network_overlap, validate_gateway_in_subnet};
use super::report::{Category, ErrorKind, ValidationError};
use super::storage::validate_replica_count;
use crate::domain::config::{ClusterDocument, HaConfig, StorageBackend, StorageConf};
use crate::infrastructure::constants::{LOAD_BALANCER_TYPES, NFS_BACKEND_CLASSES, STORAGE_CLASSES};

/// Storage providers must form a usable topology: something enabled, NFS
/// backed by a local or distributed provider, default class enabled.
pub fn check_storage_topology(storage: &StorageConf) -> Result<(), ValidationError> {
    let local_path = storage.is_enabled(StorageBackend::LocalPath);
    let longhorn = storage.is_enabled(StorageBackend::Longhorn);
    let nfs = storage.is_enabled(StorageBackend::Nfs);

    if !local_path && !longhorn && !nfs {
        return Err(ValidationError::error(
            "storage",
            "at least one storage provider must be enabled",
        )
        .with_kind(ErrorKind::Consistency)
        .with_suggestion("Enable local-path for single-node clusters or Longhorn for replicated storage"));
    }

    if nfs && !local_path && !longhorn {
        return Err(ValidationError::error(
            "storage.nfs.enabled",
            "NFS requires a backend provider (enable LocalPath or Longhorn)",
        )
        .with_related("storage.nfs.backend_storage_class")
        .with_kind(ErrorKind::Consistency)
        .with_suggestion("Enable local-path or longhorn to back the NFS share"));
    }

    if nfs {
        let class = storage.nfs.backend_storage_class.as_str();
        let backend = StorageBackend::from_class_name(class)
            .filter(|b| NFS_BACKEND_CLASSES.contains(&b.class_name()))
            .ok_or_else(|| {
                ValidationError::error(
                    "storage.nfs.backend_storage_class",
                    format!(
                        "unknown NFS backend storage class '{}' (expected one of: {})",
                        class,
                        NFS_BACKEND_CLASSES.join(", ")
                    ),
                )
                .with_kind(ErrorKind::Enum)
            })?;
        if !storage.is_enabled(backend) {
            return Err(ValidationError::error(
                "storage.nfs.backend_storage_class",
                format!("NFS backend storage class '{}' is not enabled", class),
            )
            .with_related("storage.nfs.enabled")
            .with_kind(ErrorKind::Consistency)
            .with_suggestion("Back NFS with an enabled local-path or longhorn provider"));
        }
    }

    let default_class = storage.default_storage_class.as_str();
    let backend = StorageBackend::from_class_name(default_class).ok_or_else(|| {
        ValidationError::error(
            "storage.default_storage_class",
            format!(
                "unknown default storage class '{}' (expected one of: {})",
                default_class,
                STORAGE_CLASSES.join(", ")
            ),
        )
        .with_kind(ErrorKind::Enum)
    })?;
    if !storage.is_enabled(backend) {
        return Err(ValidationError::error(
            "storage.default_storage_class",
            format!(
                "default storage class '{}' is not enabled",
                backend.class_name()
            ),
        )
        .with_kind(ErrorKind::Consistency)
        .with_suggestion(format!(
            "Enable {} or pick an enabled provider as the default",
            backend.display_name()
        )));
    }

    Ok(())
}

/// Enabled HA needs a virtual IP and a recognised load balancer. A disabled
/// or absent block is always consistent.
pub fn check_ha_consistency(ha: Option<&HaConfig>) -> Result<(), ValidationError> {
    let Some(ha) = ha.filter(|ha| ha.enabled) else {
        return Ok(());
    };

    if let Err(invalid) = validate_virtual_ip(&ha.virtual_ip) {
        return Err(
            ValidationError::error("cluster.ha_config.virtual_ip", invalid.message())
                .with_related("cluster.ha_config.enabled")
                .with_kind(ErrorKind::Consistency)
                .with_suggestion("Reserve an unused IPv4 address on the node subnet"),
        );
    }

    let lb_type = ha
        .load_balancer
        .as_ref()
        .map(|lb| lb.kind.as_str())
        .unwrap_or_default();
    if let Err(invalid) = validate_load_balancer_type(lb_type) {
        return Err(ValidationError::error(
            "cluster.ha_config.load_balancer.type",
            invalid.message(),
        )
        .with_related("cluster.ha_config.enabled")
        .with_kind(ErrorKind::Enum)
        .with_suggestion(format!("Use one of: {}", LOAD_BALANCER_TYPES.join(", "))));
    }

    Ok(())
}

pub fn missing_bundles_warning(document: &ClusterDocument) -> Option<ValidationError> {
    document
        .workloads
        .auto_deploy_bundles
        .is_empty()
        .then(|| {
            ValidationError::warning(
                "workloads.auto_deploy_bundles",
                "no workload bundles selected; the cluster will start without applications",
            )
            .with_category(Category::General)
            .with_suggestion("Select the 'starter' bundle for a minimal set of services")
        })
}

/// Every cross-field finding for a document, errors and warnings together.
pub fn document_findings(document: &ClusterDocument) -> Vec<ValidationError> {
    let mut findings = Vec::new();
    let network = &document.network;

    if let Err(conflict) =
        check_network_overlap(&network.subnet, &network.pod_cidr, &network.service_cidr)
    {
        findings.push(
            ValidationError::error(conflict.first.field(), conflict.message.clone())
                .with_related(conflict.second.field())
                .with_kind(ErrorKind::Consistency)
                .with_suggestion("Choose non-overlapping ranges, e.g. 10.42.0.0/16 for pods and 10.43.0.0/16 for services"),
        );
    }

    if let Err(invalid) = validate_gateway_in_subnet(&network.gateway, &network.subnet) {
        findings.push(
            ValidationError::error("network.gateway", invalid.message())
                .with_related("network.subnet")
                .with_kind(ErrorKind::Consistency),
        );
    }

    if let Err(err) = check_storage_topology(&document.storage) {
        findings.push(err);
    }

    let longhorn = &document.storage.longhorn;
    if longhorn.enabled && longhorn.replica_count > 0 {
        if let Ok(Some(advisory)) = validate_replica_count(&longhorn.replica_count.to_string()) {
            findings.push(ValidationError::warning(
                "storage.longhorn.replica_count",
                advisory,
            ));
        }
    }

    if let Err(err) = check_ha_consistency(document.cluster.ha_config.as_ref()) {
        findings.push(err);
    }

    findings.extend(missing_bundles_warning(document));
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{LoadBalancer, NfsConf};
    use crate::domain::validation::Severity;

    fn nfs_only() -> StorageConf {
        StorageConf {
            default_storage_class: "nfs-client".to_string(),
            local_path: Default::default(),
            longhorn: Default::default(),
            nfs: NfsConf {
                enabled: true,
                backend_storage_class: "local-path".to_string(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_nfs_without_backend_rejected() {
        let err = check_storage_topology(&nfs_only()).unwrap_err();
        assert!(err.message.contains("NFS requires a backend provider"));
        assert_eq!(err.category, Category::Storage);
    }

    #[test]
    fn test_nfs_with_backend_accepted() {
        let mut storage = nfs_only();
        storage.local_path.enabled = true;
        assert!(check_storage_topology(&storage).is_ok());
        storage.local_path.enabled = false;
        storage.longhorn.enabled = true;
        storage.nfs.backend_storage_class = "longhorn".to_string();
        assert!(check_storage_topology(&storage).is_ok());
    }

    #[test]
    fn test_nfs_backend_class_must_be_enabled() {
        let mut storage = nfs_only();
        storage.longhorn.enabled = true;
        storage.nfs.backend_storage_class = "local-path".to_string();
        let err = check_storage_topology(&storage).unwrap_err();
        assert_eq!(err.field, "storage.nfs.backend_storage_class");

        storage.nfs.backend_storage_class = "longhorn".to_string();
        assert!(check_storage_topology(&storage).is_ok());
    }

    #[test]
    fn test_unknown_storage_classes_rejected() {
        let mut storage = StorageConf::default();
        storage.default_storage_class = "ceph".to_string();
        let err = check_storage_topology(&storage).unwrap_err();
        assert_eq!(err.field, "storage.default_storage_class");
        assert_eq!(err.kind, ErrorKind::Enum);

        let mut storage = nfs_only();
        storage.local_path.enabled = true;
        storage.nfs.backend_storage_class = "nfs-client".to_string();
        let err = check_storage_topology(&storage).unwrap_err();
        assert_eq!(err.field, "storage.nfs.backend_storage_class");
        assert_eq!(err.kind, ErrorKind::Enum);
    }

    #[test]
    fn test_nothing_enabled_rejected() {
        let mut storage = StorageConf::default();
        storage.local_path.enabled = false;
        let err = check_storage_topology(&storage).unwrap_err();
        assert_eq!(err.message, "at least one storage provider must be enabled");
    }

    #[test]
    fn test_default_class_must_be_enabled() {
        let mut storage = StorageConf::default();
        storage.default_storage_class = "longhorn".to_string();
        let err = check_storage_topology(&storage).unwrap_err();
        assert_eq!(err.field, "storage.default_storage_class");
        assert_eq!(err.message, "default storage class 'longhorn' is not enabled");
    }

    #[test]
    fn test_ha_consistency() {
        assert!(check_ha_consistency(None).is_ok());

        let mut ha = HaConfig::default();
        assert!(check_ha_consistency(Some(&ha)).is_ok());

        ha.enabled = true;
        let err = check_ha_consistency(Some(&ha)).unwrap_err();
        assert_eq!(err.field, "cluster.ha_config.virtual_ip");
        assert_eq!(err.category, Category::Ha);

        ha.virtual_ip = "192.168.50.100".to_string();
        let err = check_ha_consistency(Some(&ha)).unwrap_err();
        assert_eq!(err.field, "cluster.ha_config.load_balancer.type");

        ha.load_balancer = Some(LoadBalancer {
            kind: "haproxy".to_string(),
            port: 6443,
        });
        assert!(check_ha_consistency(Some(&ha)).is_ok());
    }

    #[test]
    fn test_default_document_is_consistent() {
        let findings = document_findings(&ClusterDocument::default());
        assert!(findings.is_empty(), "{:?}", findings);
    }

    #[test]
    fn test_overlap_finding_names_both_fields() {
        let mut doc = ClusterDocument::default();
        doc.network.pod_cidr = "192.168.50.128/25".to_string();
        let findings = document_findings(&doc);
        let overlap = findings
            .iter()
            .find(|f| f.kind == ErrorKind::Consistency && f.field == "network.subnet")
            .unwrap();
        assert_eq!(overlap.related_field.as_deref(), Some("network.pod_cidr"));
    }

    #[test]
    fn test_empty_bundles_and_even_replicas_are_warnings() {
        let mut doc = ClusterDocument::default();
        doc.workloads.auto_deploy_bundles.clear();
        doc.storage.longhorn.enabled = true;
        doc.storage.longhorn.replica_count = 4;
        let findings = document_findings(&doc);
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.severity == Severity::Warning));
    }
}
