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
use crate::domain::config::{ClusterDocument, StorageConf};
use crate::domain::validation::consistency::check_storage_topology;
use crate::domain::validation::storage::{
    parse_replica_count, validate_path, validate_replica_count, validate_storage_size,
};
use crate::domain::validation::ValidationError;
use crate::domain::wizard::fields::{FieldSpec, FieldState};
use crate::domain::wizard::session::Session;
use crate::domain::wizard::step::{ConfigStep, ConfigurationMode};
use crate::infrastructure::constants::{
    LONGHORN_DEFAULTS, NFS_BACKEND_CLASSES, NFS_DEFAULTS, RECLAIM_POLICIES, STORAGE_CLASSES,
};

const DEFAULT_CLASS: &str = "storage.default_storage_class";
const LOCAL_PATH_ENABLED: &str = "storage.local_path.enabled";
const LONGHORN_ENABLED: &str = "storage.longhorn.enabled";
const LONGHORN_NAMESPACE: &str = "storage.longhorn.namespace";
const LONGHORN_REPLICAS: &str = "storage.longhorn.replica_count";
const LONGHORN_CLASS: &str = "storage.longhorn.storage_class.name";
const LONGHORN_RECLAIM: &str = "storage.longhorn.storage_class.reclaim_policy";
const LONGHORN_BACKUP: &str = "storage.longhorn.settings.backup_target";
const LONGHORN_DATA_PATH: &str = "storage.longhorn.settings.default_data_path";
const NFS_ENABLED: &str = "storage.nfs.enabled";
const NFS_NAMESPACE: &str = "storage.nfs.namespace";
const NFS_BACKEND: &str = "storage.nfs.backend_storage_class";
const NFS_SIZE: &str = "storage.nfs.storage_size";
const NFS_CLASS: &str = "storage.nfs.storage_class.name";

const FIELDS: &[FieldSpec] = &[
    FieldSpec::select(DEFAULT_CLASS, "Default Storage Class", STORAGE_CLASSES),
    FieldSpec::toggle(LOCAL_PATH_ENABLED, "Enable LocalPath (built-in k3s storage)"),
    FieldSpec::toggle(LONGHORN_ENABLED, "Enable Longhorn (distributed block storage)"),
    FieldSpec::text(LONGHORN_NAMESPACE, "Longhorn Namespace"),
    FieldSpec::text(LONGHORN_REPLICAS, "Replica Count"),
    FieldSpec::text(LONGHORN_CLASS, "Storage Class Name"),
    FieldSpec::select(LONGHORN_RECLAIM, "Reclaim Policy", RECLAIM_POLICIES),
    FieldSpec::text(LONGHORN_BACKUP, "Backup Target (optional)"),
    FieldSpec::text(LONGHORN_DATA_PATH, "Data Path"),
    FieldSpec::toggle(NFS_ENABLED, "Enable NFS (network file system)"),
    FieldSpec::text(NFS_NAMESPACE, "NFS Namespace"),
    FieldSpec::select(NFS_BACKEND, "Backend Storage Class", NFS_BACKEND_CLASSES),
    FieldSpec::text(NFS_SIZE, "Storage Size"),
    FieldSpec::text(NFS_CLASS, "NFS Storage Class Name"),
];

fn or_default(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Storage providers and the default storage class.
#[derive(Debug, Default)]
pub struct StorageStep {
    state: FieldState,
    /// Storage section as it was when the step was seeded.
    base: StorageConf,
}

impl StorageStep {
    /// Write field values over `storage`. Provider details are written only
    /// for enabled providers.
    fn write_into(&self, storage: &mut StorageConf) -> Result<(), ValidationError> {
        let s = &self.state;
        storage.default_storage_class = s.get(DEFAULT_CLASS).to_string();
        storage.local_path.enabled = s.flag(LOCAL_PATH_ENABLED);

        storage.longhorn.enabled = s.flag(LONGHORN_ENABLED);
        if storage.longhorn.enabled {
            let longhorn = &mut storage.longhorn;
            longhorn.namespace = s.get(LONGHORN_NAMESPACE).to_string();
            longhorn.replica_count = parse_replica_count(s.get(LONGHORN_REPLICAS))
                .map_err(|invalid| rejected(LONGHORN_REPLICAS, invalid))?;
            longhorn.storage_class.name = s.get(LONGHORN_CLASS).to_string();
            longhorn.storage_class.reclaim_policy = s.get(LONGHORN_RECLAIM).to_string();
            longhorn.settings.backup_target = s.get(LONGHORN_BACKUP).to_string();
            longhorn.settings.default_data_path = s.get(LONGHORN_DATA_PATH).to_string();
        }

        storage.nfs.enabled = s.flag(NFS_ENABLED);
        if storage.nfs.enabled {
            let nfs = &mut storage.nfs;
            nfs.namespace = s.get(NFS_NAMESPACE).to_string();
            nfs.backend_storage_class = s.get(NFS_BACKEND).to_string();
            nfs.storage_size = s.get(NFS_SIZE).to_string();
            nfs.storage_class.name = s.get(NFS_CLASS).to_string();
        }
        Ok(())
    }
}

impl ConfigStep for StorageStep {
    fn init_with_config(&mut self, _session: &Session, document: &ClusterDocument) {
        let storage = &document.storage;
        self.base = storage.clone();

        let s = &mut self.state;
        s.set(
            DEFAULT_CLASS,
            or_default(&storage.default_storage_class, STORAGE_CLASSES[0]),
        );
        s.set_flag(LOCAL_PATH_ENABLED, storage.local_path.enabled);

        let longhorn = &storage.longhorn;
        s.set_flag(LONGHORN_ENABLED, longhorn.enabled);
        s.set(
            LONGHORN_NAMESPACE,
            or_default(&longhorn.namespace, LONGHORN_DEFAULTS.namespace),
        );
        let replicas = if longhorn.replica_count == 0 {
            LONGHORN_DEFAULTS.replica_count
        } else {
            longhorn.replica_count
        };
        s.set(LONGHORN_REPLICAS, replicas.to_string());
        s.set(
            LONGHORN_CLASS,
            or_default(&longhorn.storage_class.name, LONGHORN_DEFAULTS.storage_class),
        );
        s.set(
            LONGHORN_RECLAIM,
            or_default(
                &longhorn.storage_class.reclaim_policy,
                LONGHORN_DEFAULTS.reclaim_policy,
            ),
        );
        s.set(LONGHORN_BACKUP, longhorn.settings.backup_target.clone());
        s.set(
            LONGHORN_DATA_PATH,
            or_default(
                &longhorn.settings.default_data_path,
                LONGHORN_DEFAULTS.data_path,
            ),
        );

        let nfs = &storage.nfs;
        s.set_flag(NFS_ENABLED, nfs.enabled);
        s.set(NFS_NAMESPACE, or_default(&nfs.namespace, NFS_DEFAULTS.namespace));
        s.set(
            NFS_BACKEND,
            or_default(&nfs.backend_storage_class, NFS_DEFAULTS.backend_storage_class),
        );
        s.set(NFS_SIZE, or_default(&nfs.storage_size, NFS_DEFAULTS.storage_size));
        s.set(
            NFS_CLASS,
            or_default(&nfs.storage_class.name, NFS_DEFAULTS.storage_class),
        );
    }

    fn validate(&self, _mode: ConfigurationMode) -> Result<(), ValidationError> {
        if self.state.flag(LONGHORN_ENABLED) {
            validate_replica_count(self.state.get(LONGHORN_REPLICAS))
                .map_err(|invalid| rejected(LONGHORN_REPLICAS, invalid))?;
            validate_path(self.state.get(LONGHORN_DATA_PATH))
                .map_err(|invalid| rejected(LONGHORN_DATA_PATH, invalid))?;
        }
        if self.state.flag(NFS_ENABLED) {
            validate_storage_size(self.state.get(NFS_SIZE))
                .map_err(|invalid| rejected(NFS_SIZE, invalid))?;
        }

        let mut candidate = self.base.clone();
        self.write_into(&mut candidate)?;
        check_storage_topology(&candidate)
    }

    fn apply(&self, document: &mut ClusterDocument) -> Result<(), ValidationError> {
        self.write_into(&mut document.storage)
    }

    fn warnings(&self, _mode: ConfigurationMode) -> Vec<ValidationError> {
        if !self.state.flag(LONGHORN_ENABLED) {
            return Vec::new();
        }
        match validate_replica_count(self.state.get(LONGHORN_REPLICAS)) {
            Ok(Some(advisory)) => vec![ValidationError::warning(LONGHORN_REPLICAS, advisory)],
            _ => Vec::new(),
        }
    }

    fn should_show(&self, mode: ConfigurationMode) -> bool {
        mode == ConfigurationMode::Advanced
    }

    fn name(&self, _mode: ConfigurationMode) -> &'static str {
        "Storage Configuration"
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
