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
use crate::domain::config::ClusterDocument;
use crate::domain::validation::network::{
    check_network_overlap, split_upstreams, validate_cluster_name, validate_dns_domain,
    validate_dns_upstreams, validate_gateway, validate_gateway_in_subnet, validate_pod_cidr,
    validate_service_cidr, validate_subnet,
};
use crate::domain::validation::{Check, ErrorKind, ValidationError};
use crate::domain::wizard::fields::{FieldSpec, FieldState};
use crate::domain::wizard::session::Session;
use crate::domain::wizard::step::{first_field_error, ConfigStep, ConfigurationMode};

const NAME: &str = "cluster.name";
const DESCRIPTION: &str = "cluster.description";
const SUBNET: &str = "network.subnet";
const GATEWAY: &str = "network.gateway";
const POD_CIDR: &str = "network.pod_cidr";
const SERVICE_CIDR: &str = "network.service_cidr";
const DNS_ENABLED: &str = "network.dns.enabled";
const DNS_DOMAIN: &str = "network.dns.domain";
const DNS_UPSTREAMS: &str = "network.dns.upstreams";

const FIELDS: &[FieldSpec] = &[
    FieldSpec::text(NAME, "Cluster Name").simple(),
    FieldSpec::text(DESCRIPTION, "Description"),
    FieldSpec::text(SUBNET, "Network Subnet").simple(),
    FieldSpec::text(GATEWAY, "Gateway IP").simple(),
    FieldSpec::text(POD_CIDR, "Pod CIDR"),
    FieldSpec::text(SERVICE_CIDR, "Service CIDR"),
    FieldSpec::toggle(DNS_ENABLED, "Enable Cluster DNS"),
    FieldSpec::text(DNS_DOMAIN, "DNS Domain").simple(),
    FieldSpec::text(DNS_UPSTREAMS, "DNS Upstreams"),
];

/// Cluster identity and address plan.
#[derive(Debug, Default)]
pub struct NetworkStep {
    state: FieldState,
}

impl NetworkStep {
    fn validator(key: &str) -> Option<fn(&str) -> Check> {
        let check: fn(&str) -> Check = match key {
            NAME => validate_cluster_name,
            SUBNET => validate_subnet,
            GATEWAY => validate_gateway,
            POD_CIDR => validate_pod_cidr,
            SERVICE_CIDR => validate_service_cidr,
            DNS_DOMAIN => validate_dns_domain,
            DNS_UPSTREAMS => validate_dns_upstreams,
            _ => return None,
        };
        Some(check)
    }
}

impl ConfigStep for NetworkStep {
    fn init_with_config(&mut self, _session: &Session, document: &ClusterDocument) {
        let network = &document.network;
        self.state.set(NAME, document.cluster.name.clone());
        self.state.set(DESCRIPTION, document.cluster.description.clone());
        self.state.set(SUBNET, network.subnet.clone());
        self.state.set(GATEWAY, network.gateway.clone());
        self.state.set(POD_CIDR, network.pod_cidr.clone());
        self.state.set(SERVICE_CIDR, network.service_cidr.clone());
        self.state.set_flag(DNS_ENABLED, network.dns.enabled);
        self.state.set(DNS_DOMAIN, network.dns.domain.clone());
        self.state.set(DNS_UPSTREAMS, network.dns.upstreams.join(","));
    }

    fn validate(&self, mode: ConfigurationMode) -> Result<(), ValidationError> {
        first_field_error(self, mode, |key, value| {
            let check = Self::validator(key)?;
            check(value).err().map(|invalid| rejected(key, invalid))
        })?;

        // Cross-field rules apply to whatever values the step holds,
        // including ones hidden in the current mode.
        let subnet = self.state.get(SUBNET);
        if let Err(invalid) = validate_gateway_in_subnet(self.state.get(GATEWAY), subnet) {
            return Err(ValidationError::error(GATEWAY, invalid.message())
                .with_related(SUBNET)
                .with_kind(ErrorKind::Consistency)
                .with_suggestion(format!("Pick a gateway address inside {}", subnet)));
        }

        check_network_overlap(
            subnet,
            self.state.get(POD_CIDR),
            self.state.get(SERVICE_CIDR),
        )
        .map_err(|conflict| {
            ValidationError::error(conflict.first.field(), conflict.message.clone())
                .with_related(conflict.second.field())
                .with_kind(ErrorKind::Consistency)
                .with_suggestion("Keep the node subnet, pod CIDR and service CIDR disjoint")
        })
    }

    fn apply(&self, document: &mut ClusterDocument) -> Result<(), ValidationError> {
        document.cluster.name = self.state.get(NAME).to_string();
        document.cluster.description = self.state.get(DESCRIPTION).to_string();

        let network = &mut document.network;
        network.subnet = self.state.get(SUBNET).to_string();
        network.gateway = self.state.get(GATEWAY).to_string();
        network.pod_cidr = self.state.get(POD_CIDR).to_string();
        network.service_cidr = self.state.get(SERVICE_CIDR).to_string();
        network.dns.enabled = self.state.flag(DNS_ENABLED);
        network.dns.domain = self.state.get(DNS_DOMAIN).to_string();
        network.dns.upstreams = split_upstreams(self.state.get(DNS_UPSTREAMS));
        Ok(())
    }

    fn should_show(&self, _mode: ConfigurationMode) -> bool {
        true
    }

    fn name(&self, mode: ConfigurationMode) -> &'static str {
        match mode {
            ConfigurationMode::Simple => "Network Essentials",
            ConfigurationMode::Advanced => "Network Configuration",
        }
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
