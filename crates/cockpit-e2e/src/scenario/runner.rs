//! Scenario execution.
//!
//! [`ScenarioRunner`] issues every call of a [`Scenario`] against a
//! [`BackendClient`], one at a time and in declaration order. The first
//! failing call aborts the run: the remaining payloads of its operation and
//! all later operations are skipped.

use super::Scenario;
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use uuid::Uuid;

/// Capability to issue one backend call
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Issue `resource.action` with `payload`, returning the response body
    async fn call(&self, resource: &str, action: &str, payload: &Value) -> E2eResult<Value>;
}

#[async_trait]
impl<B: BackendClient + ?Sized> BackendClient for &B {
    async fn call(&self, resource: &str, action: &str, payload: &Value) -> E2eResult<Value> {
        (**self).call(resource, action, payload).await
    }
}

#[async_trait]
impl<B: BackendClient + ?Sized> BackendClient for Box<B> {
    async fn call(&self, resource: &str, action: &str, payload: &Value) -> E2eResult<Value> {
        (**self).call(resource, action, payload).await
    }
}

/// Lifecycle of a runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// Nothing issued yet
    NotRun,
    /// Calls are being issued
    Running,
    /// Every call succeeded
    Complete,
    /// A call failed and the run was aborted
    Failed,
}

/// Outcome of one successful call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    /// Resource name
    pub resource: String,
    /// Action name
    pub action: String,
    /// Position of the operation in the scenario
    pub operation_index: usize,
    /// Position of the payload within its operation
    pub payload_index: usize,
    /// Response body
    pub response: Value,
    /// Wall time of the call
    pub duration_ms: u64,
}

/// Record of a completed scenario run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Unique run id
    pub run_id: String,
    /// When the first call was issued
    pub started_at: DateTime<Utc>,
    /// When the last call returned
    pub finished_at: DateTime<Utc>,
    /// One record per call, in issue order
    pub calls: Vec<CallRecord>,
}

impl ScenarioReport {
    /// Time spent inside backend calls, summed over all calls
    #[must_use]
    pub fn total_duration_ms(&self) -> u64 {
        self.calls.iter().map(|c| c.duration_ms).sum()
    }

    /// Wall time from the first call to the end of the last one
    #[must_use]
    pub fn wall_time_ms(&self) -> u64 {
        (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }

    /// Responses of all calls to `resource.action`, in issue order
    pub fn responses_for<'a>(
        &'a self,
        resource: &'a str,
        action: &'a str,
    ) -> impl Iterator<Item = &'a Value> + 'a {
        self.calls
            .iter()
            .filter(move |c| c.resource == resource && c.action == action)
            .map(|c| &c.response)
    }
}

/// Executes a scenario once against a backend
#[derive(Debug)]
pub struct ScenarioRunner<B> {
    backend: B,
    state: RunState,
}

impl<B: BackendClient> ScenarioRunner<B> {
    /// Create a runner over a backend
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            state: RunState::NotRun,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// The backend calls are issued against
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Issue every call of the scenario, strictly in order.
    ///
    /// # Errors
    ///
    /// [`E2eError::SetupFailed`] wrapping the first failing call;
    /// [`E2eError::InvalidState`] if this runner has already run.
    pub async fn run(&mut self, scenario: &Scenario) -> E2eResult<ScenarioReport> {
        if self.state != RunState::NotRun {
            return Err(E2eError::InvalidState {
                message: format!("scenario runner already used ({:?})", self.state),
            });
        }
        self.state = RunState::Running;

        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let mut calls = Vec::with_capacity(scenario.call_count());
        tracing::info!(
            %run_id,
            operations = scenario.operations().len(),
            calls = scenario.call_count(),
            "scenario started"
        );

        for call in scenario.calls() {
            tracing::debug!(
                resource = call.resource,
                action = call.action,
                payload_index = call.payload_index,
                "issuing call"
            );
            let started = Instant::now();
            match self
                .backend
                .call(call.resource, call.action, call.payload)
                .await
            {
                Ok(response) => calls.push(CallRecord {
                    resource: call.resource.to_string(),
                    action: call.action.to_string(),
                    operation_index: call.operation_index,
                    payload_index: call.payload_index,
                    response,
                    duration_ms: started.elapsed().as_millis() as u64,
                }),
                Err(source) => {
                    self.state = RunState::Failed;
                    tracing::debug!(
                        %run_id,
                        resource = call.resource,
                        action = call.action,
                        payload_index = call.payload_index,
                        error = %source,
                        "scenario aborted"
                    );
                    return Err(E2eError::SetupFailed {
                        resource: call.resource.to_string(),
                        action: call.action.to_string(),
                        payload_index: call.payload_index,
                        source: Box::new(source),
                    });
                }
            }
        }

        self.state = RunState::Complete;
        tracing::info!(%run_id, calls = calls.len(), "scenario complete");
        Ok(ScenarioReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            calls,
        })
    }
}

/// A call received by [`MockBackend`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedCall {
    /// Resource name
    pub resource: String,
    /// Action name
    pub action: String,
    /// Payload as received
    pub payload: Value,
}

/// In-memory backend recording every call it receives
#[derive(Debug, Default)]
pub struct MockBackend {
    received: Mutex<Vec<RecordedCall>>,
    responses: HashMap<String, Value>,
    fail_at: Option<usize>,
}

impl MockBackend {
    /// Create a backend that accepts everything and answers `null`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the n-th call (0-based) with a 500
    #[must_use]
    pub const fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Answer every `resource.action` call with `response`
    #[must_use]
    pub fn with_response(mut self, resource: &str, action: &str, response: Value) -> Self {
        let _ = self
            .responses
            .insert(format!("{resource}.{action}"), response);
        self
    }

    /// Calls received so far, including a failed one
    #[must_use]
    pub fn received(&self) -> Vec<RecordedCall> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl BackendClient for MockBackend {
    async fn call(&self, resource: &str, action: &str, payload: &Value) -> E2eResult<Value> {
        let index = {
            let mut received = self.received.lock().unwrap_or_else(PoisonError::into_inner);
            received.push(RecordedCall {
                resource: resource.to_string(),
                action: action.to_string(),
                payload: payload.clone(),
            });
            received.len() - 1
        };
        if self.fail_at == Some(index) {
            return Err(E2eError::backend(Some(500), "mock failure"));
        }
        Ok(self
            .responses
            .get(&format!("{resource}.{action}"))
            .cloned()
            .unwrap_or(Value::Null))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::scenario::{combine, operation};
    use serde_json::json;

    fn setup() -> Scenario {
        combine([
            operation("deployment", "create", [json!({"deploymentName": "d"})]),
            operation(
                "process-definition",
                "start",
                [
                    json!({"key": "p", "businessKey": "Instance1"}),
                    json!({"key": "p", "businessKey": "Instance2"}),
                    json!({"key": "p", "businessKey": "myBusinessKey"}),
                ],
            ),
        ])
    }

    mod run_tests {
        use super::*;

        #[tokio::test]
        async fn test_calls_issued_in_declaration_order() {
            let backend = MockBackend::new();
            let mut runner = ScenarioRunner::new(&backend);
            let report = runner.run(&setup()).await.unwrap();

            let received = backend.received();
            let labels: Vec<String> = received
                .iter()
                .map(|c| format!("{}.{}", c.resource, c.action))
                .collect();
            assert_eq!(
                labels,
                vec![
                    "deployment.create",
                    "process-definition.start",
                    "process-definition.start",
                    "process-definition.start"
                ]
            );
            let keys: Vec<&str> = received[1..]
                .iter()
                .map(|c| c.payload["businessKey"].as_str().unwrap())
                .collect();
            assert_eq!(keys, vec!["Instance1", "Instance2", "myBusinessKey"]);
            assert_eq!(report.calls.len(), 4);
            assert_eq!(runner.state(), RunState::Complete);
        }

        #[tokio::test]
        async fn test_report_carries_responses() {
            let backend = MockBackend::new()
                .with_response("deployment", "create", json!({"id": "dep-1"}));
            let mut runner = ScenarioRunner::new(&backend);
            let report = runner.run(&setup()).await.unwrap();

            let deployments: Vec<&Value> = report.responses_for("deployment", "create").collect();
            assert_eq!(deployments, vec![&json!({"id": "dep-1"})]);
            assert_eq!(report.responses_for("process-definition", "start").count(), 3);
            assert!(report.finished_at >= report.started_at);
            assert!(!report.run_id.is_empty());
        }

        #[tokio::test]
        async fn test_empty_scenario_completes() {
            let mut runner = ScenarioRunner::new(MockBackend::new());
            let report = runner.run(&Scenario::new()).await.unwrap();
            assert!(report.calls.is_empty());
            assert_eq!(runner.state(), RunState::Complete);
        }
    }

    mod report_tests {
        use super::*;

        fn record(duration_ms: u64) -> CallRecord {
            CallRecord {
                resource: "process-definition".to_string(),
                action: "start".to_string(),
                operation_index: 0,
                payload_index: 0,
                response: Value::Null,
                duration_ms,
            }
        }

        #[test]
        fn test_call_time_and_wall_time_are_distinct() {
            let started_at = Utc::now();
            let report = ScenarioReport {
                run_id: "r".to_string(),
                started_at,
                finished_at: started_at + chrono::Duration::milliseconds(250),
                calls: vec![record(40), record(60)],
            };
            assert_eq!(report.total_duration_ms(), 100);
            assert_eq!(report.wall_time_ms(), 250);
        }
    }

    mod failure_tests {
        use super::*;

        #[tokio::test]
        async fn test_failed_deployment_aborts_everything_after() {
            let backend = MockBackend::new().failing_at(0);
            let mut runner = ScenarioRunner::new(&backend);
            let err = runner.run(&setup()).await.unwrap_err();

            assert!(matches!(
                err,
                E2eError::SetupFailed { ref resource, payload_index: 0, .. } if resource == "deployment"
            ));
            assert_eq!(backend.received().len(), 1);
            assert_eq!(runner.state(), RunState::Failed);
        }

        #[tokio::test]
        async fn test_failed_payload_skips_rest_of_operation() {
            // 0 = deploy, 1 = Instance1, 2 = Instance2 fails
            let backend = MockBackend::new().failing_at(2);
            let mut runner = ScenarioRunner::new(&backend);
            let err = runner.run(&setup()).await.unwrap_err();

            match err {
                E2eError::SetupFailed {
                    resource,
                    action,
                    payload_index,
                    source,
                } => {
                    assert_eq!(resource, "process-definition");
                    assert_eq!(action, "start");
                    assert_eq!(payload_index, 1);
                    assert!(matches!(*source, E2eError::Backend { status: Some(500), .. }));
                }
                other => panic!("unexpected error: {other}"),
            }
            assert_eq!(backend.received().len(), 3);
        }
    }

    mod state_tests {
        use super::*;

        #[tokio::test]
        async fn test_runner_starts_not_run() {
            let runner = ScenarioRunner::new(MockBackend::new());
            assert_eq!(runner.state(), RunState::NotRun);
        }

        #[tokio::test]
        async fn test_runner_runs_once() {
            let backend = MockBackend::new();
            let mut runner = ScenarioRunner::new(&backend);
            runner.run(&setup()).await.unwrap();

            let err = runner.run(&setup()).await.unwrap_err();
            assert!(matches!(err, E2eError::InvalidState { .. }));
            assert_eq!(backend.received().len(), 4);
        }

        #[tokio::test]
        async fn test_failed_runner_cannot_rerun() {
            let mut runner = ScenarioRunner::new(MockBackend::new().failing_at(0));
            assert!(runner.run(&setup()).await.is_err());
            assert!(matches!(
                runner.run(&setup()).await.unwrap_err(),
                E2eError::InvalidState { .. }
            ));
        }

        #[tokio::test]
        async fn test_boxed_backend() {
            let backend: Box<dyn BackendClient> = Box::new(MockBackend::new());
            let mut runner = ScenarioRunner::new(backend);
            assert_eq!(runner.run(&setup()).await.unwrap().calls.len(), 4);
        }
    }
}
