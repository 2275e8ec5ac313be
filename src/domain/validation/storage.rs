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

//! Storage field validators.

use super::{Check, Invalid};
use once_cell::sync::Lazy;
use regex::Regex;

static SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)([KMGT]?i?)$").expect("storage size pattern"));

const GIB: u64 = 1024 * 1024 * 1024;
pub const MIN_STORAGE_BYTES: u64 = GIB;
pub const MAX_STORAGE_BYTES: u64 = 1024 * GIB;

pub const MIN_REPLICAS: u32 = 1;
pub const MAX_REPLICAS: u32 = 10;

/// Parse a quantity such as `10Gi` or `500M` into bytes. A bare number is
/// taken as bytes.
pub fn parse_storage_size(value: &str) -> Result<u64, Invalid> {
    let caps = SIZE_RE
        .captures(value)
        .ok_or_else(|| Invalid::new("invalid storage size format"))?;
    let magnitude: u64 = caps[1]
        .parse()
        .map_err(|e| Invalid::new(format!("invalid storage size number: {}", e)))?;
    let multiplier: u64 = match &caps[2] {
        "Ki" => 1 << 10,
        "Mi" => 1 << 20,
        "Gi" => 1 << 30,
        "Ti" => 1 << 40,
        "K" => 1_000,
        "M" => 1_000_000,
        "G" => 1_000_000_000,
        "T" => 1_000_000_000_000,
        "" => 1,
        other => return Err(Invalid::new(format!("unknown storage unit '{}'", other))),
    };
    magnitude
        .checked_mul(multiplier)
        .ok_or_else(|| Invalid::new("storage size too large (maximum 1Ti for homelab)"))
}

pub fn validate_storage_size(value: &str) -> Check {
    if value.is_empty() {
        return Err(Invalid::new("storage size is required"));
    }
    let bytes = parse_storage_size(value)?;
    if bytes < MIN_STORAGE_BYTES {
        return Err(Invalid::new(
            "storage size too small (minimum 1Gi required)",
        ));
    }
    if bytes > MAX_STORAGE_BYTES {
        return Err(Invalid::new(
            "storage size too large (maximum 1Ti for homelab)",
        ));
    }
    Ok(())
}

pub fn parse_replica_count(value: &str) -> Result<u32, Invalid> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Invalid::new("replica count is required"));
    }
    value
        .parse::<u32>()
        .map_err(|_| Invalid::new("replica count must be a number"))
}

/// Accepts 1..=10. An even count above two passes with an advisory
/// message since odd counts keep quorum.
pub fn validate_replica_count(value: &str) -> Result<Option<String>, Invalid> {
    let count = parse_replica_count(value)?;
    if !(MIN_REPLICAS..=MAX_REPLICAS).contains(&count) {
        return Err(Invalid::new("replica count must be between 1 and 10"));
    }
    if count > 2 && count % 2 == 0 {
        return Ok(Some(format!(
            "replica count {}: odd numbers recommended for better quorum (try {} or {})",
            count,
            count - 1,
            count + 1
        )));
    }
    Ok(None)
}

/// Optional absolute path.
pub fn validate_path(value: &str) -> Check {
    if value.is_empty() || value.starts_with('/') {
        Ok(())
    } else {
        Err(Invalid::new("path must start with /"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_storage_size_units() {
        assert_eq!(parse_storage_size("10Gi").unwrap(), 10 * GIB);
        assert_eq!(parse_storage_size("2G").unwrap(), 2_000_000_000);
        assert_eq!(parse_storage_size("1024").unwrap(), 1024);
        assert!(parse_storage_size("10GB").is_err());
        assert!(parse_storage_size("-1Gi").is_err());
    }

    #[test]
    fn test_storage_size_bounds() {
        assert!(validate_storage_size("10Gi").is_ok());
        assert!(validate_storage_size("1Gi").is_ok());
        assert!(validate_storage_size("1Ti").is_ok());
        assert!(validate_storage_size("100Gi").is_ok());
        assert!(validate_storage_size("500Mi").is_err());
        assert!(validate_storage_size("2Ti").is_err());
        assert!(validate_storage_size("").is_err());
        assert!(validate_storage_size("invalid").is_err());
    }

    #[test]
    fn test_replica_count_range() {
        for n in 1..=10 {
            assert!(validate_replica_count(&n.to_string()).is_ok(), "{}", n);
        }
        assert!(validate_replica_count("0").is_err());
        assert!(validate_replica_count("11").is_err());
        assert!(validate_replica_count("three").is_err());
        assert!(validate_replica_count("").is_err());
    }

    #[test]
    fn test_even_replica_count_warns() {
        let advisory = validate_replica_count("4").unwrap().unwrap();
        assert!(advisory.contains("try 3 or 5"));
        assert_eq!(validate_replica_count("2").unwrap(), None);
        assert_eq!(validate_replica_count("3").unwrap(), None);
    }

    #[test]
    fn test_path() {
        assert!(validate_path("").is_ok());
        assert!(validate_path("/var/lib/longhorn").is_ok());
        assert!(validate_path("var/lib").is_err());
    }
}
