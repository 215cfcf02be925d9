//! Preconditions for the suspension tests.
//!
//! One deployment of `suspension-process.bpmn` and three running instances,
//! so the diagram shows instance badges that can then be suspended.

use crate::result::E2eResult;
use crate::scenario::{combine, file_payload, operation, ResourceDir, Scenario};
use serde_json::json;

/// Process definition key declared in `suspension-process.bpmn`
pub const PROCESS_KEY: &str = "suspension-process";

/// Fixture file holding the process definition
pub const PROCESS_RESOURCE: &str = "suspension-process.bpmn";

/// Business keys of the started instances, in start order
pub const BUSINESS_KEYS: [&str; 3] = ["Instance1", "Instance2", "myBusinessKey"];

/// Deploy the suspension process, then start one instance per business key
///
/// # Errors
///
/// Fails if the BPMN fixture cannot be read.
pub fn setup1(resources: &ResourceDir) -> E2eResult<Scenario> {
    let content = resources.read(PROCESS_RESOURCE)?;

    Ok(combine([
        operation(
            "deployment",
            "create",
            [json!({
                "deploymentName": PROCESS_KEY,
                "files": [file_payload(PROCESS_RESOURCE, content)]
            })],
        ),
        operation(
            "process-definition",
            "start",
            BUSINESS_KEYS
                .iter()
                .map(|business_key| json!({ "key": PROCESS_KEY, "businessKey": business_key })),
        ),
    ]))
}
