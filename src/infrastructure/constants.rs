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

/// Workspace layout
pub const WORKSPACE_ENV: &str = "ZTC_WORKSPACE";
pub const SETTINGS_FILE_NAME: &str = "ztc-wizard.toml";
pub const SCHEMA_RELATIVE_PATH: &str = "schema/cluster-schema.json";
pub const TEMPLATES_DIR: &str = "templates";
pub const DEFAULT_OUTPUT_FILE: &str = "cluster.yaml";

/// Template files are named `cluster-<id>.yaml`
pub const TEMPLATE_PREFIX: &str = "cluster-";
pub const TEMPLATE_EXTENSION: &str = "yaml";

/// Header lines written above the generated document
pub const SCHEMA_MODELINE: &str = "# yaml-language-server: $schema=./schema/cluster-schema.json";
pub const DOCUMENT_TITLE: &str = "# Zero Touch Cluster Configuration";

/// Select field choices
pub const LOAD_BALANCER_TYPES: &[&str] = &["kube-vip", "haproxy", "nginx"];
pub const STORAGE_CLASSES: &[&str] = &["local-path", "longhorn", "nfs-client"];
pub const RECLAIM_POLICIES: &[&str] = &["Retain", "Delete"];
pub const NFS_BACKEND_CLASSES: &[&str] = &["local-path", "longhorn"];

/// Values seeded into Longhorn fields when the document leaves them empty.
pub struct LonghornDefaults {
    pub namespace: &'static str,
    pub replica_count: u32,
    pub storage_class: &'static str,
    pub reclaim_policy: &'static str,
    pub data_path: &'static str,
}

pub const LONGHORN_DEFAULTS: LonghornDefaults = LonghornDefaults {
    namespace: "longhorn-system",
    replica_count: 3,
    storage_class: "longhorn",
    reclaim_policy: "Retain",
    data_path: "/var/lib/longhorn",
};

pub struct NfsDefaults {
    pub namespace: &'static str,
    pub backend_storage_class: &'static str,
    pub storage_size: &'static str,
    pub storage_class: &'static str,
}

pub const NFS_DEFAULTS: NfsDefaults = NfsDefaults {
    namespace: "nfs-system",
    backend_storage_class: "local-path",
    storage_size: "100Gi",
    storage_class: "nfs-client",
};

/// Event loop channel depth
pub const EVENT_CHANNEL_CAPACITY: usize = 32;
