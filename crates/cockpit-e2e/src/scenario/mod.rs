//! Declarative scenario setup.
//!
//! A scenario describes the backend state a UI test needs (deploy a
//! process definition, start instances of it) as plain data, separate from
//! executing it:
//!
//! ```ignore
//! let scenario = combine([
//!     operation("deployment", "create", [json!({ "deploymentName": "p", "files": [...] })]),
//!     operation("process-definition", "start", [
//!         json!({ "key": "p", "businessKey": "Instance1" }),
//!         json!({ "key": "p", "businessKey": "Instance2" }),
//!     ]),
//! ]);
//! ScenarioRunner::new(backend).run(&scenario).await?;
//! ```
//!
//! Payload order is preserved exactly and duplicates are kept: later calls
//! usually depend on earlier ones having completed.

mod resource;
mod runner;

#[cfg(feature = "rest")]
pub mod rest;

pub use resource::{file_payload, read_resource, ResourceDir, DEFAULT_RESOURCE_DIR};
pub use runner::{
    BackendClient, CallRecord, MockBackend, RecordedCall, RunState, ScenarioReport,
    ScenarioRunner,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One category of backend call with the payloads to issue, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    resource: String,
    action: String,
    payloads: Vec<Value>,
}

impl Operation {
    /// Resource name, e.g. `deployment`
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Action name, e.g. `create`
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Payloads in issue order
    #[must_use]
    pub fn payloads(&self) -> &[Value] {
        &self.payloads
    }

    /// `resource.action`, used in logs and reports
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}.{}", self.resource, self.action)
    }
}

/// Describe one backend call category. Pure; nothing is sent.
pub fn operation(
    resource: impl Into<String>,
    action: impl Into<String>,
    payloads: impl IntoIterator<Item = Value>,
) -> Operation {
    Operation {
        resource: resource.into(),
        action: action.into(),
        payloads: payloads.into_iter().collect(),
    }
}

/// An ordered, append-only sequence of operations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    operations: Vec<Operation>,
}

impl From<Operation> for Scenario {
    fn from(operation: Operation) -> Self {
        Self {
            operations: vec![operation],
        }
    }
}

/// Concatenate operations (or whole scenarios) preserving call order
pub fn combine<I, P>(parts: I) -> Scenario
where
    I: IntoIterator<Item = P>,
    P: Into<Scenario>,
{
    parts
        .into_iter()
        .fold(Scenario::default(), |scenario, part| scenario.then(part))
}

impl Scenario {
    /// Create an empty scenario
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation or another scenario
    #[must_use]
    pub fn then(mut self, part: impl Into<Self>) -> Self {
        self.operations.extend(part.into().operations);
        self
    }

    /// Operations in declaration order
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Whether the scenario issues no calls at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.call_count() == 0
    }

    /// Total number of calls across all operations
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.operations.iter().map(|op| op.payloads.len()).sum()
    }

    /// Flatten into the exact call sequence a runner issues
    pub fn calls(&self) -> impl Iterator<Item = Call<'_>> + '_ {
        self.operations
            .iter()
            .enumerate()
            .flat_map(|(operation_index, op)| {
                op.payloads
                    .iter()
                    .enumerate()
                    .map(move |(payload_index, payload)| Call {
                        resource: &op.resource,
                        action: &op.action,
                        payload,
                        operation_index,
                        payload_index,
                    })
            })
    }
}

/// A single backend call within a scenario
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Call<'a> {
    /// Resource name
    pub resource: &'a str,
    /// Action name
    pub action: &'a str,
    /// Payload sent with the call
    pub payload: &'a Value,
    /// Position of the operation in the scenario
    pub operation_index: usize,
    /// Position of the payload within its operation
    pub payload_index: usize,
}
