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

//! The cluster configuration document authored by the wizard.
//!
//! Field order in these structs is the key order of the persisted YAML.

use crate::shared::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::read_to_string;
use std::path::Path;

// ============================================================================
// Document root
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClusterDocument {
    pub cluster: ClusterMetadata,
    pub network: NetworkConf,
    pub nodes: NodesConf,
    pub storage: StorageConf,
    pub components: ComponentsConf,
    pub workloads: WorkloadsConf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment: Option<DeploymentConf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced: Option<AdvancedConf>,
}

impl Default for ClusterDocument {
    fn default() -> Self {
        Self {
            cluster: ClusterMetadata::default(),
            network: NetworkConf::default(),
            nodes: NodesConf::default(),
            storage: StorageConf::default(),
            components: ComponentsConf::default(),
            workloads: WorkloadsConf::default(),
            deployment: None,
            advanced: None,
        }
    }
}

impl ClusterDocument {
    /// Load a document from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// JSON form used by the schema gate.
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn node_list(&self) -> Vec<NodeInfo> {
        self.nodes
            .cluster_nodes
            .iter()
            .map(|(hostname, node)| NodeInfo {
                hostname: hostname.clone(),
                ip: node.ip.clone(),
                role: node.role.clone(),
            })
            .collect()
    }
}

/// Flattened node entry handed to downstream collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub hostname: String,
    pub ip: String,
    pub role: String,
}

// ============================================================================
// Cluster identity
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClusterMetadata {
    pub name: String,
    pub description: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ha_config: Option<HaConfig>,
}

impl Default for ClusterMetadata {
    fn default() -> Self {
        Self {
            name: "ztc-homelab".to_string(),
            description: "Zero Touch Cluster homelab".to_string(),
            version: "1.0.0".to_string(),
            ha_config: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct HaConfig {
    pub enabled: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub virtual_ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_balancer: Option<LoadBalancer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etcd_config: Option<EtcdConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LoadBalancer {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "is_zero_u16")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EtcdConfig {
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub snapshot_count: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub heartbeat_interval: String,
}

// ============================================================================
// Network
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConf {
    pub subnet: String,
    pub gateway: String,
    pub pod_cidr: String,
    pub service_cidr: String,
    pub dns: DnsConf,
}

impl Default for NetworkConf {
    fn default() -> Self {
        Self {
            subnet: "192.168.50.0/24".to_string(),
            gateway: "192.168.50.1".to_string(),
            pod_cidr: "10.42.0.0/16".to_string(),
            service_cidr: "10.43.0.0/16".to_string(),
            dns: DnsConf::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DnsConf {
    pub enabled: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub server_ip: String,
    pub domain: String,
    pub upstreams: Vec<String>,
}

impl Default for DnsConf {
    fn default() -> Self {
        Self {
            enabled: true,
            server_ip: String::new(),
            domain: "homelab.lan".to_string(),
            upstreams: vec!["1.1.1.1".to_string(), "8.8.8.8".to_string()],
        }
    }
}

// ============================================================================
// Nodes and access credentials
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NodesConf {
    pub ssh: SshConf,
    pub cluster_nodes: BTreeMap<String, ClusterNode>,
}

impl Default for NodesConf {
    fn default() -> Self {
        let mut cluster_nodes = BTreeMap::new();
        cluster_nodes.insert(
            "k3s-master".to_string(),
            ClusterNode::new("192.168.50.10", "master"),
        );
        cluster_nodes.insert(
            "k3s-worker-01".to_string(),
            ClusterNode::new("192.168.50.11", "worker"),
        );
        Self {
            ssh: SshConf::default(),
            cluster_nodes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SshConf {
    pub public_key_path: String,
    pub private_key_path: String,
    pub username: String,
}

impl Default for SshConf {
    fn default() -> Self {
        Self {
            public_key_path: "~/.ssh/id_ed25519.pub".to_string(),
            private_key_path: "~/.ssh/id_ed25519".to_string(),
            username: "ubuntu".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ClusterNode {
    pub ip: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<NodeResources>,
}

impl ClusterNode {
    pub fn new(ip: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            role: role.into(),
            resources: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct NodeResources {
    pub cpu: String,
    pub memory: String,
}

// ============================================================================
// Storage
// ============================================================================

/// Named storage implementations that can be enabled independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageBackend {
    LocalPath,
    Longhorn,
    Nfs,
}

impl StorageBackend {
    pub const ALL: [StorageBackend; 3] = [Self::LocalPath, Self::Longhorn, Self::Nfs];

    /// Storage class name the backend registers in the cluster.
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::LocalPath => "local-path",
            Self::Longhorn => "longhorn",
            Self::Nfs => "nfs-client",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::LocalPath => "LocalPath",
            Self::Longhorn => "Longhorn",
            Self::Nfs => "NFS",
        }
    }

    pub fn from_class_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.class_name() == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConf {
    pub default_storage_class: String,
    pub local_path: LocalPathConf,
    pub longhorn: LonghornConf,
    pub nfs: NfsConf,
}

impl Default for StorageConf {
    fn default() -> Self {
        Self {
            default_storage_class: StorageBackend::LocalPath.class_name().to_string(),
            local_path: LocalPathConf { enabled: true },
            longhorn: LonghornConf::default(),
            nfs: NfsConf::default(),
        }
    }
}

impl StorageConf {
    pub fn is_enabled(&self, backend: StorageBackend) -> bool {
        match backend {
            StorageBackend::LocalPath => self.local_path.enabled,
            StorageBackend::Longhorn => self.longhorn.enabled,
            StorageBackend::Nfs => self.nfs.enabled,
        }
    }

    pub fn enabled_backends(&self) -> Vec<StorageBackend> {
        StorageBackend::ALL
            .into_iter()
            .filter(|b| self.is_enabled(*b))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LocalPathConf {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LonghornConf {
    pub enabled: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub replica_count: u32,
    #[serde(skip_serializing_if = "LonghornStorageClass::is_empty")]
    pub storage_class: LonghornStorageClass,
    #[serde(skip_serializing_if = "LonghornSettings::is_empty")]
    pub settings: LonghornSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LonghornStorageClass {
    pub name: String,
    pub reclaim_policy: String,
}

impl LonghornStorageClass {
    fn is_empty(&self) -> bool {
        self.name.is_empty() && self.reclaim_policy.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LonghornSettings {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub backup_target: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub default_data_path: String,
}

impl LonghornSettings {
    fn is_empty(&self) -> bool {
        self.backup_target.is_empty() && self.default_data_path.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct NfsConf {
    pub enabled: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub backend_storage_class: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub storage_size: String,
    #[serde(skip_serializing_if = "NfsStorageClass::is_empty")]
    pub storage_class: NfsStorageClass,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct NfsStorageClass {
    pub name: String,
}

impl NfsStorageClass {
    fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

// ============================================================================
// Components
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ComponentsConf {
    pub sealed_secrets: ComponentToggle,
    pub argocd: ComponentToggle,
    pub monitoring: MonitoringConf,
    pub gitea: ComponentToggle,
    pub minio: MinioConf,
    pub homepage: ComponentToggle,
}

impl Default for ComponentsConf {
    fn default() -> Self {
        Self {
            sealed_secrets: ComponentToggle::enabled_in(""),
            argocd: ComponentToggle::enabled_in("argocd"),
            monitoring: MonitoringConf::default(),
            gitea: ComponentToggle::default(),
            minio: MinioConf::default(),
            homepage: ComponentToggle::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ComponentToggle {
    pub enabled: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

impl ComponentToggle {
    pub fn enabled_in(namespace: impl Into<String>) -> Self {
        Self {
            enabled: true,
            namespace: namespace.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitoringConf {
    pub enabled: bool,
    pub namespace: String,
    pub components: MonitoringComponents,
}

impl Default for MonitoringConf {
    fn default() -> Self {
        Self {
            enabled: true,
            namespace: "monitoring".to_string(),
            components: MonitoringComponents {
                prometheus: true,
                grafana: true,
                alertmanager: false,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct MonitoringComponents {
    pub prometheus: bool,
    pub grafana: bool,
    pub alertmanager: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct MinioConf {
    pub enabled: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub storage_class: String,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub replicas: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub storage_size: String,
}

// ============================================================================
// Workloads
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkloadsConf {
    pub auto_deploy_bundles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates: Option<WorkloadTemplates>,
}

impl Default for WorkloadsConf {
    fn default() -> Self {
        Self {
            auto_deploy_bundles: vec!["starter".to_string()],
            templates: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct WorkloadTemplates {
    pub default_storage_class: String,
    pub default_memory_limit: String,
    pub default_cpu_limit: String,
}

// ============================================================================
// Deployment and advanced settings (carried through unchanged)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct DeploymentConf {
    pub phases: DeploymentPhases,
    pub options: DeploymentOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct DeploymentPhases {
    pub infrastructure: bool,
    pub secrets: bool,
    pub networking: bool,
    pub storage: bool,
    pub system_components: bool,
    pub gitops: bool,
    pub workloads: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct DeploymentOptions {
    pub wait_for_ready: bool,
    pub timeout_minutes: u32,
    pub retry_failed: bool,
    pub backup_on_success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AdvancedConf {
    pub kubernetes: KubernetesConf,
    pub security: SecurityConf,
    pub backup: BackupConf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct KubernetesConf {
    pub version: String,
    pub container_runtime: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SecurityConf {
    pub auto_generate_passwords: bool,
    pub password_length: u32,
    pub enable_rbac: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct BackupConf {
    pub auto_backup_secrets: bool,
    pub backup_location: String,
    pub retention_days: u32,
}

fn is_zero_u16(value: &u16) -> bool {
    *value == 0
}

fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}
