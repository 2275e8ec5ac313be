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

use super::{Check, Invalid};
use crate::infrastructure::constants::LOAD_BALANCER_TYPES;
use once_cell::sync::Lazy;
use regex::Regex;
use std::net::IpAddr;

static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:ns|us|µs|ms|s|m|h)$").expect("duration pattern"));

pub const MIN_LB_PORT: u16 = 1024;
pub const MAX_SNAPSHOT_COUNT: u32 = 100_000;

pub fn validate_virtual_ip(value: &str) -> Check {
    let value = value.trim();
    if value.is_empty() {
        return Err(Invalid::new("virtual IP is required for HA configuration"));
    }
    match value.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => Ok(()),
        Ok(IpAddr::V6(_)) => Err(Invalid::new("virtual IP must be an IPv4 address")),
        Err(_) => Err(Invalid::new("virtual IP must be a valid IP address")),
    }
}

pub fn validate_load_balancer_type(value: &str) -> Check {
    if LOAD_BALANCER_TYPES.contains(&value.trim()) {
        Ok(())
    } else {
        Err(Invalid::new(format!(
            "load balancer type must be one of: {}",
            LOAD_BALANCER_TYPES.join(", ")
        )))
    }
}

/// Optional; when set must be an unprivileged port.
pub fn validate_load_balancer_port(value: &str) -> Check {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    let port: i64 = value
        .parse()
        .map_err(|_| Invalid::new("load balancer port must be a valid number"))?;
    if !(1..=65535).contains(&port) {
        return Err(Invalid::new("load balancer port must be between 1 and 65535"));
    }
    if port < i64::from(MIN_LB_PORT) {
        return Err(Invalid::new(
            "load balancer port should be above 1024 to avoid system ports",
        ));
    }
    Ok(())
}

pub fn validate_etcd_snapshot_count(value: &str) -> Check {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    let count: i64 = value
        .parse()
        .map_err(|_| Invalid::new("etcd snapshot count must be a valid number"))?;
    if count <= 0 {
        return Err(Invalid::new("etcd snapshot count must be a positive number"));
    }
    if count > i64::from(MAX_SNAPSHOT_COUNT) {
        return Err(Invalid::new(
            "etcd snapshot count should be reasonable (max 100,000)",
        ));
    }
    Ok(())
}

pub fn validate_heartbeat_interval(value: &str) -> Check {
    let value = value.trim();
    if value.is_empty() || DURATION_RE.is_match(value) {
        Ok(())
    } else {
        Err(Invalid::new(
            "etcd heartbeat interval must be a valid duration (e.g., 100ms, 1s)",
        ))
    }
}
