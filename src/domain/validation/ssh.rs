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

//! Access credential validators.

use super::{Check, Invalid};
use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("username pattern"));

pub const MAX_USERNAME_LEN: usize = 32;

pub const RESERVED_USERNAMES: &[&str] = &[
    "root",
    "admin",
    "administrator",
    "daemon",
    "bin",
    "sys",
    "sync",
    "games",
    "man",
    "lp",
    "mail",
    "news",
    "uucp",
    "proxy",
    "www-data",
    "backup",
    "list",
    "irc",
    "gnats",
    "nobody",
];

/// Expand a leading `~/` using `HOME`. Other paths are returned unchanged.
pub fn expand_home(path: &str) -> String {
    match (path.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
        _ => path.to_string(),
    }
}

pub fn validate_public_key_path(value: &str) -> Check {
    if value.trim().is_empty() {
        return Err(Invalid::new("SSH public key path is required"));
    }
    let expanded = expand_home(value);
    if !expanded.ends_with(".pub") && !expanded.contains("id_") {
        return Err(Invalid::new(
            "SSH public key path should end with .pub or contain 'id_'",
        ));
    }
    if expanded.contains("..") {
        return Err(Invalid::new("SSH public key path cannot contain '..'"));
    }
    Ok(())
}

pub fn validate_private_key_path(value: &str) -> Check {
    if value.trim().is_empty() {
        return Err(Invalid::new("SSH private key path is required"));
    }
    let expanded = expand_home(value);
    if expanded.ends_with(".pub") {
        return Err(Invalid::new(
            "SSH private key path should not end with .pub (that's for public keys)",
        ));
    }
    if !expanded.contains("id_") && !expanded.contains("ssh") {
        return Err(Invalid::new(
            "SSH private key path should contain 'id_' or 'ssh'",
        ));
    }
    if expanded.contains("..") {
        return Err(Invalid::new("SSH private key path cannot contain '..'"));
    }
    Ok(())
}

pub fn validate_username(value: &str) -> Check {
    let value = value.trim();
    if value.is_empty() {
        return Err(Invalid::new("SSH username is required"));
    }
    if value.len() > MAX_USERNAME_LEN {
        return Err(Invalid::new("SSH username must be 32 characters or less"));
    }
    if !USERNAME_RE.is_match(value) {
        return Err(Invalid::new(
            "SSH username can only contain letters, numbers, underscores, and hyphens",
        ));
    }
    if value.starts_with('-') {
        return Err(Invalid::new("SSH username cannot start with a hyphen"));
    }
    if value.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(Invalid::new("SSH username cannot start with a number"));
    }
    let lowered = value.to_lowercase();
    if RESERVED_USERNAMES.contains(&lowered.as_str()) {
        return Err(Invalid::new(
            "SSH username cannot be a reserved system username",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("ubuntu").is_ok());
        assert!(validate_username("ops_user-2").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username(&"u".repeat(33)).is_err());
        assert!(validate_username("-ops").is_err());
        assert!(validate_username("2ops").is_err());
        assert!(validate_username("ops.user").is_err());
    }

    #[test]
    fn test_reserved_usernames_case_insensitive() {
        for name in ["root", "Root", "ADMIN", "nobody", "www-data"] {
            assert_eq!(
                validate_username(name).unwrap_err().message(),
                "SSH username cannot be a reserved system username"
            );
        }
    }

    #[test]
    fn test_public_key_path() {
        assert!(validate_public_key_path("~/.ssh/id_ed25519.pub").is_ok());
        assert!(validate_public_key_path("/keys/cluster.pub").is_ok());
        assert!(validate_public_key_path("/keys/id_rsa").is_ok());
        assert!(validate_public_key_path("/keys/cluster.key").is_err());
        assert!(validate_public_key_path("/keys/../id_rsa.pub").is_err());
        assert!(validate_public_key_path("  ").is_err());
    }

    #[test]
    fn test_private_key_path() {
        assert!(validate_private_key_path("~/.ssh/id_ed25519").is_ok());
        assert!(validate_private_key_path("/etc/ssh/cluster_key").is_ok());
        assert!(validate_private_key_path("~/.ssh/id_ed25519.pub").is_err());
        assert!(validate_private_key_path("/keys/cluster.key").is_err());
        assert!(validate_private_key_path("/etc/ssh/../id_rsa").is_err());
    }

    #[test]
    fn test_expand_home_leaves_absolute_paths() {
        assert_eq!(expand_home("/etc/ssh/key"), "/etc/ssh/key");
        assert!(!expand_home("~/.ssh/id_rsa").starts_with("~/") || std::env::var("HOME").is_err());
    }
}
