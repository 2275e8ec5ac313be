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

//! Step orchestration for the configuration wizard.

pub mod bundles;
pub mod events;
pub mod fields;
pub mod orchestrator;
pub mod session;
pub mod step;
pub mod steps;

pub use self::bundles::{find_bundle, Bundle, BUNDLES};
pub use self::events::{
    event_channel, run_event_loop, spawn_background, BackgroundReport, BackgroundTask,
    SchemaHealthTask, WizardEvent, WizardReply,
};
pub use self::fields::{FieldKind, FieldSpec, FieldState};
pub use self::orchestrator::{
    AdvanceOutcome, FinishError, FinishReport, StepPosition, WizardOrchestrator,
};
pub use self::session::Session;
pub use self::step::{ConfigStep, ConfigurationMode, StepDefinition};
pub use self::steps::default_steps;
