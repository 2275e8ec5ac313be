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

//! Concrete wizard steps, in the order the wizard walks them.

pub mod bundles;
pub mod credentials;
pub mod ha;
pub mod network;
pub mod review;
pub mod storage;

pub use self::bundles::BundlesStep;
pub use self::credentials::CredentialsStep;
pub use self::ha::HaStep;
pub use self::network::NetworkStep;
pub use self::review::ReviewStep;
pub use self::storage::StorageStep;

use super::step::ConfigStep;
use crate::domain::validation::{ErrorKind, Invalid, ValidationError};

pub fn default_steps() -> Vec<Box<dyn ConfigStep>> {
    vec![
        Box::new(NetworkStep::default()),
        Box::new(CredentialsStep::default()),
        Box::new(StorageStep::default()),
        Box::new(HaStep::default()),
        Box::new(BundlesStep::default()),
        Box::new(ReviewStep::default()),
    ]
}

/// Wrap a field validator rejection as a step error with a hint.
pub(crate) fn rejected(key: &str, invalid: Invalid) -> ValidationError {
    let kind = if invalid.message().contains("required") {
        ErrorKind::Required
    } else if invalid.message().contains("between") || invalid.message().contains("too ") {
        ErrorKind::Range
    } else {
        ErrorKind::Format
    };
    let err = ValidationError::error(key, invalid.message()).with_kind(kind);
    match hint_for(key) {
        Some(hint) => err.with_suggestion(hint),
        None => err,
    }
}

fn hint_for(key: &str) -> Option<&'static str> {
    let hint = match key {
        "cluster.name" => "Use letters, numbers, hyphens and underscores (e.g., 'ztc-homelab')",
        "network.subnet" => "Use CIDR notation (e.g., '192.168.50.0/24')",
        "network.gateway" => "Use the router address inside the subnet (e.g., '192.168.50.1')",
        "network.pod_cidr" => "Use a private /16 such as '10.42.0.0/16'",
        "network.service_cidr" => "Use a private /16 such as '10.43.0.0/16'",
        "network.dns.domain" => "Use a valid domain format (e.g., 'homelab.lan')",
        "network.dns.upstreams" => "List up to 5 resolvers, comma separated (e.g., '1.1.1.1,8.8.8.8')",
        "nodes.ssh.username" => "Use a regular login such as 'ubuntu'",
        "nodes.ssh.public_key_path" => "Point at the .pub file, e.g. '~/.ssh/id_ed25519.pub'",
        "nodes.ssh.private_key_path" => "Point at the private key, e.g. '~/.ssh/id_ed25519'",
        "storage.longhorn.replica_count" => "Use an odd number between 1 and 10",
        "storage.nfs.storage_size" => "Use a size between 1Gi and 1Ti (e.g., '100Gi')",
        "cluster.ha_config.virtual_ip" => "Reserve an unused IPv4 address on the node subnet",
        "cluster.ha_config.load_balancer.port" => "Use an unprivileged port such as 6443",
        _ => return None,
    };
    Some(hint)
}
