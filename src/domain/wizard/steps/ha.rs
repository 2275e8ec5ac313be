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
use crate::domain::config::{ClusterDocument, EtcdConfig, HaConfig, LoadBalancer};
use crate::domain::validation::ha::{
    validate_etcd_snapshot_count, validate_heartbeat_interval, validate_load_balancer_port,
    validate_load_balancer_type, validate_virtual_ip,
};
use crate::domain::validation::{Check, ValidationError};
use crate::domain::wizard::fields::{FieldSpec, FieldState};
use crate::domain::wizard::session::Session;
use crate::domain::wizard::step::{ConfigStep, ConfigurationMode};
use crate::infrastructure::constants::LOAD_BALANCER_TYPES;

const ENABLED: &str = "cluster.ha_config.enabled";
const VIRTUAL_IP: &str = "cluster.ha_config.virtual_ip";
const LB_TYPE: &str = "cluster.ha_config.load_balancer.type";
const LB_PORT: &str = "cluster.ha_config.load_balancer.port";
const SNAPSHOT_COUNT: &str = "cluster.ha_config.etcd_config.snapshot_count";
const HEARTBEAT: &str = "cluster.ha_config.etcd_config.heartbeat_interval";

const FIELDS: &[FieldSpec] = &[
    FieldSpec::toggle(ENABLED, "Enable High Availability"),
    FieldSpec::text(VIRTUAL_IP, "Virtual IP Address"),
    FieldSpec::select(LB_TYPE, "Load Balancer Type", LOAD_BALANCER_TYPES),
    FieldSpec::text(LB_PORT, "Load Balancer Port (optional)"),
    FieldSpec::text(SNAPSHOT_COUNT, "Etcd Snapshot Count (optional)"),
    FieldSpec::text(HEARTBEAT, "Etcd Heartbeat Interval (optional)"),
];

/// Multi-master control plane settings.
#[derive(Debug, Default)]
pub struct HaStep {
    state: FieldState,
    had_block: bool,
}

impl HaStep {
    fn build(&self) -> HaConfig {
        let s = &self.state;
        let port = s.get(LB_PORT).parse::<u16>().unwrap_or(0);
        let snapshot_count = s.get(SNAPSHOT_COUNT).parse::<u32>().unwrap_or(0);
        let heartbeat_interval = s.get(HEARTBEAT).to_string();
        let etcd_config = (snapshot_count > 0 || !heartbeat_interval.is_empty()).then(|| {
            EtcdConfig {
                snapshot_count,
                heartbeat_interval,
            }
        });

        HaConfig {
            enabled: s.flag(ENABLED),
            virtual_ip: s.get(VIRTUAL_IP).to_string(),
            load_balancer: Some(LoadBalancer {
                kind: s.get(LB_TYPE).to_string(),
                port,
            }),
            etcd_config,
        }
    }
}

impl ConfigStep for HaStep {
    fn init_with_config(&mut self, _session: &Session, document: &ClusterDocument) {
        let ha = document.cluster.ha_config.clone();
        self.had_block = ha.is_some();
        let ha = ha.unwrap_or_default();
        let lb = ha.load_balancer.unwrap_or_default();
        let etcd = ha.etcd_config.unwrap_or_default();

        let s = &mut self.state;
        s.set_flag(ENABLED, ha.enabled);
        s.set(VIRTUAL_IP, ha.virtual_ip);
        s.set(
            LB_TYPE,
            if lb.kind.is_empty() {
                LOAD_BALANCER_TYPES[0].to_string()
            } else {
                lb.kind
            },
        );
        s.set(
            LB_PORT,
            if lb.port > 0 {
                lb.port.to_string()
            } else {
                String::new()
            },
        );
        s.set(
            SNAPSHOT_COUNT,
            if etcd.snapshot_count > 0 {
                etcd.snapshot_count.to_string()
            } else {
                String::new()
            },
        );
        s.set(HEARTBEAT, etcd.heartbeat_interval);
    }

    fn validate(&self, _mode: ConfigurationMode) -> Result<(), ValidationError> {
        if !self.state.flag(ENABLED) {
            return Ok(());
        }
        // Template-seeded values bypass select normalization.
        let checks: [(&str, fn(&str) -> Check); 5] = [
            (VIRTUAL_IP, validate_virtual_ip),
            (LB_TYPE, validate_load_balancer_type),
            (LB_PORT, validate_load_balancer_port),
            (SNAPSHOT_COUNT, validate_etcd_snapshot_count),
            (HEARTBEAT, validate_heartbeat_interval),
        ];
        for (key, check) in checks {
            check(self.state.get(key)).map_err(|invalid| {
                rejected(key, invalid).with_related(ENABLED)
            })?;
        }
        Ok(())
    }

    fn apply(&self, document: &mut ClusterDocument) -> Result<(), ValidationError> {
        document.cluster.ha_config = if self.state.flag(ENABLED) {
            Some(self.build())
        } else if self.had_block {
            Some(HaConfig {
                enabled: false,
                ..Default::default()
            })
        } else {
            None
        };
        Ok(())
    }

    fn should_show(&self, mode: ConfigurationMode) -> bool {
        mode == ConfigurationMode::Advanced
    }

    fn name(&self, _mode: ConfigurationMode) -> &'static str {
        "High Availability"
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

    fn seeded(doc: &ClusterDocument) -> HaStep {
        let mut step = HaStep::default();
        step.init_with_config(&Session::default(), doc);
        step
    }

    #[test]
    fn test_disabled_ignores_dependent_fields() {
        let mut step = seeded(&ClusterDocument::default());
        step.set_field(VIRTUAL_IP, "bogus").unwrap();
        assert!(step.validate(ConfigurationMode::Advanced).is_ok());

        let mut doc = ClusterDocument::default();
        step.apply(&mut doc).unwrap();
        assert!(doc.cluster.ha_config.is_none());
    }

    #[test]
    fn test_enabled_requires_ipv4_vip() {
        let mut step = seeded(&ClusterDocument::default());
        step.set_field(ENABLED, "true").unwrap();
        let err = step.validate(ConfigurationMode::Advanced).unwrap_err();
        assert_eq!(err.field, VIRTUAL_IP);

        step.set_field(VIRTUAL_IP, "::1").unwrap();
        assert!(step.validate(ConfigurationMode::Advanced).is_err());

        step.set_field(VIRTUAL_IP, "192.168.50.100").unwrap();
        step.set_field(LB_PORT, "443").unwrap();
        let err = step.validate(ConfigurationMode::Advanced).unwrap_err();
        assert_eq!(err.field, LB_PORT);

        step.set_field(LB_PORT, "6443").unwrap();
        step.set_field(HEARTBEAT, "100ms").unwrap();
        assert!(step.validate(ConfigurationMode::Advanced).is_ok());
    }

    #[test]
    fn test_apply_builds_block() {
        let mut step = seeded(&ClusterDocument::default());
        step.set_field(ENABLED, "yes").unwrap();
        step.set_field(VIRTUAL_IP, "192.168.50.100").unwrap();
        step.set_field(SNAPSHOT_COUNT, "10000").unwrap();
        let mut doc = ClusterDocument::default();
        step.apply(&mut doc).unwrap();

        let ha = doc.cluster.ha_config.unwrap();
        assert!(ha.enabled);
        assert_eq!(ha.load_balancer.unwrap().kind, "kube-vip");
        assert_eq!(ha.etcd_config.unwrap().snapshot_count, 10000);
    }

    #[test]
    fn test_lb_type_is_restricted() {
        let mut step = seeded(&ClusterDocument::default());
        assert!(step.set_field(LB_TYPE, "metallb").is_err());
        assert!(step.set_field(LB_TYPE, "haproxy").is_ok());
    }

    #[test]
    fn test_seeded_unknown_lb_type_rejected() {
        let mut doc = ClusterDocument::default();
        doc.cluster.ha_config = Some(HaConfig {
            enabled: true,
            virtual_ip: "192.168.50.100".to_string(),
            load_balancer: Some(LoadBalancer {
                kind: "metallb".to_string(),
                port: 0,
            }),
            etcd_config: None,
        });
        let step = seeded(&doc);
        let err = step.validate(ConfigurationMode::Advanced).unwrap_err();
        assert_eq!(err.field, LB_TYPE);
        assert_eq!(err.related_field.as_deref(), Some(ENABLED));
    }

    #[test]
    fn test_disabling_keeps_an_explicit_block() {
        let mut doc = ClusterDocument::default();
        doc.cluster.ha_config = Some(HaConfig {
            enabled: true,
            virtual_ip: "192.168.50.100".to_string(),
            ..Default::default()
        });
        let mut step = seeded(&doc);
        step.set_field(ENABLED, "false").unwrap();
        step.apply(&mut doc).unwrap();
        let ha = doc.cluster.ha_config.unwrap();
        assert!(!ha.enabled);
        assert!(ha.virtual_ip.is_empty());
    }
}
