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

use super::step::ConfigurationMode;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub mode: ConfigurationMode,
    /// Template the document was seeded from, if any.
    pub template_id: Option<String>,
}

impl Session {
    pub fn new(mode: ConfigurationMode) -> Self {
        let started_at = Utc::now();
        Self {
            id: format!("ztc-{}", started_at.timestamp()),
            started_at,
            mode,
            template_id: None,
        }
    }

    pub fn with_template(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ConfigurationMode::Simple)
    }
}
