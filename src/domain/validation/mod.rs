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

//! Field validators, cross-field checks and result reporting.
//!
//! Field validators take the raw text an operator typed and return
//! [`Check`]; they never touch the document. Cross-field checks in
//! [`consistency`] work on the assembled document.

pub mod consistency;
pub mod ha;
pub mod network;
pub mod report;
pub mod ssh;
pub mod storage;

use thiserror::Error;

pub use self::consistency::{
    check_ha_consistency, check_storage_topology, document_findings, missing_bundles_warning,
};
pub use self::network::{check_network_overlap, NetworkRole, OverlapConflict};
pub use self::report::{
    Category, ErrorKind, Severity, ValidationError, ValidationResult, ValidationSummary,
};

/// Rejection produced by a single-field validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Invalid(pub String);

impl Invalid {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

pub type Check = std::result::Result<(), Invalid>;
