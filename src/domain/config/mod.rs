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

//! Configuration domain

pub mod document;
pub mod dynamic;
pub mod settings;

pub use self::document::{
    AdvancedConf, ClusterDocument, ClusterMetadata, ClusterNode, ComponentToggle, ComponentsConf,
    DeploymentConf, DnsConf, EtcdConfig, HaConfig, LoadBalancer, LocalPathConf, LonghornConf,
    LonghornSettings, LonghornStorageClass, MinioConf, MonitoringConf, NetworkConf, NfsConf,
    NfsStorageClass, NodeInfo, NodeResources, NodesConf, SshConf, StorageBackend, StorageConf,
    WorkloadsConf,
};
pub use self::dynamic::{apply_dynamic_fields, parse_dynamic_fields};
pub use self::settings::WizardSettings;
