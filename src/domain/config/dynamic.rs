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

//! `key=value` overrides passed with `-D` on the command line.

use crate::domain::wizard::WizardOrchestrator;
use crate::shared::error::{Result, WizardError};
use std::collections::BTreeMap;
use tracing::debug;

/// Parse `key=value` pairs. The value may itself contain `=`; later
/// occurrences of a key win.
pub fn parse_dynamic_fields(entries: &[String]) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();

    for entry in entries {
        let (key, value) = entry.split_once('=').ok_or_else(|| {
            WizardError::config_error(format!(
                "Invalid field format: '{}'. Expected 'key=value'",
                entry
            ))
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(WizardError::config_error(format!(
                "Empty key in field: '{}'",
                entry
            )));
        }

        map.insert(key.to_string(), value.trim().to_string());
    }

    Ok(map)
}

/// Route each override to the step that owns the field. Stops at the first
/// unknown key or rejected value.
pub fn apply_dynamic_fields(
    fields: &BTreeMap<String, String>,
    wizard: &mut WizardOrchestrator,
) -> Result<()> {
    for (key, value) in fields {
        wizard.set_field(key, value)?;
        debug!("Set {} = {}", key, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::ClusterDocument;
    use crate::domain::wizard::{ConfigurationMode, Session};

    fn entries(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_pairs() {
        let map = parse_dynamic_fields(&entries(&[
            "cluster.name = lab ",
            "network.dns.upstreams=1.1.1.1,9.9.9.9",
            "cluster.description=a=b",
        ]))
        .unwrap();
        assert_eq!(map["cluster.name"], "lab");
        assert_eq!(map["network.dns.upstreams"], "1.1.1.1,9.9.9.9");
        assert_eq!(map["cluster.description"], "a=b");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_dynamic_fields(&entries(&["cluster.name"])).is_err());
        assert!(parse_dynamic_fields(&entries(&["=lab"])).is_err());
    }

    #[test]
    fn test_apply_routes_to_steps() {
        let mut wizard = WizardOrchestrator::new(
            Session::new(ConfigurationMode::Simple),
            ClusterDocument::default(),
        )
        .unwrap();
        let map =
            parse_dynamic_fields(&entries(&["cluster.name=lab", "storage.nfs.enabled=true"]))
                .unwrap();
        apply_dynamic_fields(&map, &mut wizard).unwrap();
        assert_eq!(wizard.field("cluster.name"), Some("lab"));
        assert_eq!(wizard.field("storage.nfs.enabled"), Some("true"));

        let bad = parse_dynamic_fields(&entries(&["nodes.ssh.shell=zsh"])).unwrap();
        assert!(matches!(
            apply_dynamic_fields(&bad, &mut wizard),
            Err(WizardError::UnknownField(_))
        ));
    }
}
