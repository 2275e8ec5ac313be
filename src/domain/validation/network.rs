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

//! Cluster identity and network validators.

use super::{Check, Invalid};
use ipnet::{IpNet, Ipv4Net};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::net::IpAddr;

static CLUSTER_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("cluster name pattern"));

static DNS_DOMAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("dns domain pattern"));

pub const MAX_CLUSTER_NAME_LEN: usize = 50;
pub const MAX_DNS_DOMAIN_LEN: usize = 100;
pub const MAX_DNS_UPSTREAMS: usize = 5;
/// Longest prefix accepted for pod and service ranges.
pub const MAX_CLUSTER_CIDR_PREFIX: u8 = 24;

static PRIVATE_RANGES: Lazy<[Ipv4Net; 3]> = Lazy::new(|| {
    [
        Ipv4Net::new([10, 0, 0, 0].into(), 8).expect("10/8"),
        Ipv4Net::new([172, 16, 0, 0].into(), 12).expect("172.16/12"),
        Ipv4Net::new([192, 168, 0, 0].into(), 16).expect("192.168/16"),
    ]
});

pub fn validate_cluster_name(value: &str) -> Check {
    if value.is_empty() {
        return Err(Invalid::new("cluster name is required"));
    }
    if value.len() > MAX_CLUSTER_NAME_LEN {
        return Err(Invalid::new("cluster name must be less than 50 characters"));
    }
    if !CLUSTER_NAME_RE.is_match(value) {
        return Err(Invalid::new(
            "cluster name can only contain letters, numbers, hyphens, and underscores",
        ));
    }
    Ok(())
}

/// Parse `a.b.c.d/len`, keeping host bits out of the result.
pub fn parse_cidr(value: &str) -> Option<IpNet> {
    value.trim().parse::<IpNet>().ok().map(|net| net.trunc())
}

pub fn validate_subnet(value: &str) -> Check {
    if value.is_empty() {
        return Err(Invalid::new("network subnet is required"));
    }
    if parse_cidr(value).is_none() {
        return Err(Invalid::new(
            "invalid network subnet format (use CIDR notation like 192.168.50.0/24)",
        ));
    }
    Ok(())
}

pub fn validate_gateway(value: &str) -> Check {
    if value.is_empty() {
        return Err(Invalid::new("gateway IP is required"));
    }
    let ip: IpAddr = value
        .parse()
        .map_err(|_| Invalid::new("invalid gateway IP address"))?;
    if ip.is_loopback() || ip.is_multicast() {
        return Err(Invalid::new("gateway IP cannot be loopback or multicast"));
    }
    Ok(())
}

pub fn validate_pod_cidr(value: &str) -> Check {
    validate_cluster_cidr(value, "pod CIDR", "10.42.0.0/16")
}

pub fn validate_service_cidr(value: &str) -> Check {
    validate_cluster_cidr(value, "service CIDR", "10.43.0.0/16")
}

fn validate_cluster_cidr(value: &str, label: &str, example: &str) -> Check {
    if value.is_empty() {
        return Err(Invalid::new(format!("{} is required", label)));
    }
    let net = parse_cidr(value).ok_or_else(|| {
        Invalid::new(format!(
            "invalid {} format (use CIDR notation like {})",
            label, example
        ))
    })?;
    if net.prefix_len() > MAX_CLUSTER_CIDR_PREFIX {
        return Err(Invalid::new(format!(
            "{} is too small (use /24 or larger network)",
            label
        )));
    }
    if !is_private_network(net.network()) {
        return Err(Invalid::new(format!(
            "{} should use private IP ranges (10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16)",
            label
        )));
    }
    Ok(())
}

/// RFC 1918 membership; IPv6 is never considered private here.
pub fn is_private_network(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => PRIVATE_RANGES.iter().any(|range| range.contains(&v4)),
        IpAddr::V6(_) => false,
    }
}

pub fn validate_dns_domain(value: &str) -> Check {
    if value.is_empty() {
        return Err(Invalid::new("DNS domain is required"));
    }
    if value.len() > MAX_DNS_DOMAIN_LEN {
        return Err(Invalid::new("DNS domain must be less than 100 characters"));
    }
    if !DNS_DOMAIN_RE.is_match(value) {
        return Err(Invalid::new("invalid DNS domain format (e.g., homelab.lan)"));
    }
    Ok(())
}

/// Split a comma separated upstream list, dropping blanks.
pub fn split_upstreams(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn validate_dns_upstreams(value: &str) -> Check {
    let upstreams = split_upstreams(value);
    for upstream in &upstreams {
        let ip: IpAddr = upstream
            .parse()
            .map_err(|_| Invalid::new(format!("invalid DNS upstream IP address: {}", upstream)))?;
        if ip.is_loopback() && upstream != "127.0.0.1" {
            return Err(Invalid::new(format!(
                "DNS upstream {}: loopback addresses other than 127.0.0.1 not recommended",
                upstream
            )));
        }
        if ip.is_multicast() {
            return Err(Invalid::new(format!(
                "DNS upstream {}: multicast addresses not allowed",
                upstream
            )));
        }
    }
    if upstreams.len() > MAX_DNS_UPSTREAMS {
        return Err(Invalid::new("too many DNS upstreams (maximum 5 recommended)"));
    }
    Ok(())
}

/// Skips when either side is empty or unparsable; the field validators
/// report those.
pub fn validate_gateway_in_subnet(gateway: &str, subnet: &str) -> Check {
    let Ok(gateway_ip) = gateway.trim().parse::<IpAddr>() else {
        return Ok(());
    };
    let Some(subnet_net) = parse_cidr(subnet) else {
        return Ok(());
    };
    if !subnet_net.contains(&gateway_ip) {
        return Err(Invalid::new(format!(
            "gateway IP {} must be within the network subnet {}",
            gateway_ip, subnet_net
        )));
    }
    Ok(())
}

// ============================================================================
// Range overlap
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkRole {
    Subnet,
    PodCidr,
    ServiceCidr,
}

impl NetworkRole {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Subnet => "network.subnet",
            Self::PodCidr => "network.pod_cidr",
            Self::ServiceCidr => "network.service_cidr",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapConflict {
    pub first: NetworkRole,
    pub second: NetworkRole,
    pub message: String,
}

impl fmt::Display for OverlapConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for OverlapConflict {}

/// Two ranges overlap iff either base address falls inside the other.
pub fn networks_overlap(a: &IpNet, b: &IpNet) -> bool {
    a.contains(&b.network()) || b.contains(&a.network())
}

/// Pairwise overlap check over the three cluster ranges. Empty or
/// unparsable inputs are skipped; the first conflicting pair is reported.
pub fn check_network_overlap(
    subnet: &str,
    pod_cidr: &str,
    service_cidr: &str,
) -> Result<(), OverlapConflict> {
    let subnet = parse_cidr(subnet);
    let pod = parse_cidr(pod_cidr);
    let service = parse_cidr(service_cidr);

    let pairs = [
        (
            NetworkRole::Subnet,
            subnet,
            NetworkRole::PodCidr,
            pod,
            "pod CIDR overlaps with network subnet",
        ),
        (
            NetworkRole::Subnet,
            subnet,
            NetworkRole::ServiceCidr,
            service,
            "service CIDR overlaps with network subnet",
        ),
        (
            NetworkRole::PodCidr,
            pod,
            NetworkRole::ServiceCidr,
            service,
            "pod CIDR and service CIDR overlap",
        ),
    ];

    for (first, a, second, b, message) in pairs {
        if let (Some(a), Some(b)) = (a, b) {
            if networks_overlap(&a, &b) {
                return Err(OverlapConflict {
                    first,
                    second,
                    message: message.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_name() {
        assert!(validate_cluster_name("ztc-homelab_01").is_ok());
        assert_eq!(
            validate_cluster_name("").unwrap_err().message(),
            "cluster name is required"
        );
        assert!(validate_cluster_name(&"a".repeat(50)).is_ok());
        assert!(validate_cluster_name(&"a".repeat(51)).is_err());
        assert!(validate_cluster_name("home lab").is_err());
        assert!(validate_cluster_name("lab.local").is_err());
    }

    #[test]
    fn test_subnet_and_gateway_syntax() {
        assert!(validate_subnet("192.168.50.0/24").is_ok());
        assert!(validate_subnet("192.168.50.0").is_err());
        assert!(validate_subnet("192.168.300.0/24").is_err());
        assert!(validate_gateway("192.168.50.1").is_ok());
        assert!(validate_gateway("127.0.0.1").is_err());
        assert!(validate_gateway("224.0.0.1").is_err());
        assert!(validate_gateway("not-an-ip").is_err());
    }

    #[test]
    fn test_cluster_cidrs() {
        assert!(validate_pod_cidr("10.42.0.0/16").is_ok());
        assert!(validate_service_cidr("172.20.0.0/24").is_ok());
        assert_eq!(
            validate_pod_cidr("10.42.0.0/25").unwrap_err().message(),
            "pod CIDR is too small (use /24 or larger network)"
        );
        assert!(validate_service_cidr("8.8.0.0/16").is_err());
        assert!(validate_pod_cidr("172.32.0.0/16").is_err());
        assert!(validate_pod_cidr("10.42.0.0").is_err());
        assert!(validate_pod_cidr("").is_err());
    }

    #[test]
    fn test_dns_domain() {
        assert!(validate_dns_domain("homelab.lan").is_ok());
        assert!(validate_dns_domain("cluster.example.com").is_ok());
        assert!(validate_dns_domain("localhost").is_err());
        assert!(validate_dns_domain("lab.x").is_err());
        assert!(validate_dns_domain(&format!("{}.lan", "a".repeat(100))).is_err());
    }

    #[test]
    fn test_dns_upstreams() {
        assert!(validate_dns_upstreams("").is_ok());
        assert!(validate_dns_upstreams("1.1.1.1, 8.8.8.8").is_ok());
        assert!(validate_dns_upstreams("127.0.0.1").is_ok());
        assert!(validate_dns_upstreams("127.0.0.2").is_err());
        assert!(validate_dns_upstreams("224.0.0.251").is_err());
        assert!(validate_dns_upstreams("1.1.1.1,dns.google").is_err());
        assert!(validate_dns_upstreams("1.1.1.1,1.0.0.1,8.8.8.8,8.8.4.4,9.9.9.9").is_ok());
        assert!(validate_dns_upstreams("1.1.1.1,1.0.0.1,8.8.8.8,8.8.4.4,9.9.9.9,149.112.112.112").is_err());
    }

    #[test]
    fn test_gateway_in_subnet() {
        for host in ["192.168.50.1", "192.168.50.128", "192.168.50.254"] {
            assert!(validate_gateway_in_subnet(host, "192.168.50.0/24").is_ok());
        }
        let err = validate_gateway_in_subnet("192.168.51.1", "192.168.50.0/24").unwrap_err();
        assert!(err.message().contains("192.168.50.0/24"));
        // unparsable sides are left to the field validators
        assert!(validate_gateway_in_subnet("", "192.168.50.0/24").is_ok());
        assert!(validate_gateway_in_subnet("192.168.51.1", "bogus").is_ok());
    }

    #[test]
    fn test_default_ranges_do_not_overlap() {
        assert!(check_network_overlap("192.168.50.0/24", "10.42.0.0/16", "10.43.0.0/16").is_ok());
    }

    #[test]
    fn test_overlap_reports_conflicting_pair() {
        let conflict =
            check_network_overlap("192.168.50.0/24", "192.168.50.128/25", "10.43.0.0/16")
                .unwrap_err();
        assert_eq!(conflict.first, NetworkRole::Subnet);
        assert_eq!(conflict.second, NetworkRole::PodCidr);
        assert_eq!(conflict.message, "pod CIDR overlaps with network subnet");

        let conflict =
            check_network_overlap("192.168.50.0/24", "10.42.0.0/16", "10.0.0.0/8").unwrap_err();
        assert_eq!(
            (conflict.first, conflict.second),
            (NetworkRole::PodCidr, NetworkRole::ServiceCidr)
        );

        let conflict =
            check_network_overlap("10.0.0.0/8", "172.16.0.0/16", "10.43.0.0/16").unwrap_err();
        assert_eq!(conflict.second, NetworkRole::ServiceCidr);
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = parse_cidr("10.0.0.0/8").unwrap();
        let b = parse_cidr("10.42.7.0/24").unwrap();
        assert!(networks_overlap(&a, &b));
        assert!(networks_overlap(&b, &a));
        let c = parse_cidr("10.43.0.0/16").unwrap();
        let d = parse_cidr("10.42.0.0/16").unwrap();
        assert!(!networks_overlap(&c, &d));
    }

    #[test]
    fn test_overlap_skips_unparsable() {
        assert!(check_network_overlap("", "192.168.50.0/25", "bogus").is_ok());
    }

    #[test]
    fn test_host_bits_are_masked() {
        let net = parse_cidr("192.168.50.77/24").unwrap();
        assert_eq!(net.to_string(), "192.168.50.0/24");
    }
}
