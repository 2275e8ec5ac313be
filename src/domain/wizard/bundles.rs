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

//! Workload bundle catalog.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bundle {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub services: &'static [&'static str],
    pub resources: &'static str,
    pub recommended: bool,
}

pub const BUNDLES: &[Bundle] = &[
    Bundle {
        id: "starter",
        name: "Starter Bundle",
        description: "Essential homelab services: Homepage dashboard + Uptime Kuma monitoring",
        services: &["homepage", "uptime-kuma"],
        resources: "192Mi RAM, 2Gi storage",
        recommended: true,
    },
    Bundle {
        id: "monitoring",
        name: "Monitoring Bundle",
        description: "Complete monitoring solution",
        services: &["uptime-kuma", "homepage"],
        resources: "192Mi RAM, 3Gi storage",
        recommended: false,
    },
    Bundle {
        id: "productivity",
        name: "Productivity Bundle",
        description: "Development and automation toolkit",
        services: &["code-server", "n8n"],
        resources: "1Gi RAM, 15Gi storage",
        recommended: false,
    },
    Bundle {
        id: "security",
        name: "Security Bundle",
        description: "Professional password management",
        services: &["vaultwarden"],
        resources: "128Mi RAM, 5Gi storage",
        recommended: false,
    },
];

pub fn find_bundle(id: &str) -> Option<&'static Bundle> {
    BUNDLES.iter().find(|bundle| bundle.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog() {
        assert_eq!(BUNDLES.len(), 4);
        assert_eq!(
            BUNDLES.iter().filter(|b| b.recommended).map(|b| b.id).collect::<Vec<_>>(),
            vec!["starter"]
        );
        assert_eq!(find_bundle("security").unwrap().services, &["vaultwarden"]);
        assert!(find_bundle("media").is_none());
    }
}
