//! Runs the suspension setup against a local recording engine stub.

#![allow(clippy::unwrap_used)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use cockpit_e2e::scenario::rest::RestBackend;
use cockpit_e2e::suites::suspension::{self, BUSINESS_KEYS, PROCESS_KEY};
use cockpit_e2e::{E2eError, ResourceDir, RunState, ScenarioRunner};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct Received {
    method: Method,
    path: String,
    content_type: String,
    body: Bytes,
}

impl Received {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

#[derive(Clone, Default)]
struct EngineStub {
    received: Arc<Mutex<Vec<Received>>>,
    fail_path: Option<String>,
}

async fn record(
    State(stub): State<EngineStub>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let path = uri.path().to_string();
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let index = {
        let mut received = stub.received.lock().unwrap();
        received.push(Received {
            method,
            path: path.clone(),
            content_type,
            body,
        });
        received.len()
    };

    if stub.fail_path.as_deref() == Some(path.as_str()) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "type": "ProcessEngineException", "message": "boom" })),
        );
    }
    (StatusCode::OK, Json(json!({ "id": format!("id-{index}") })))
}

/// Serve the stub on an ephemeral port; returns the REST root URL.
async fn spawn(stub: EngineStub) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(record).with_state(stub);
    let _handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}/engine-rest")
}

mod setup1 {
    use super::*;

    #[tokio::test]
    async fn test_deploys_then_starts_three_instances() {
        let stub = EngineStub::default();
        let base_url = spawn(stub.clone()).await;

        let scenario = suspension::setup1(&ResourceDir::default()).unwrap();
        let mut runner = ScenarioRunner::new(RestBackend::new(base_url));
        let report = runner.run(&scenario).await.unwrap();

        assert_eq!(runner.state(), RunState::Complete);
        assert_eq!(report.calls.len(), 4);

        let received = stub.received.lock().unwrap().clone();
        let paths: Vec<&str> = received.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "/engine-rest/deployment/create",
                "/engine-rest/process-definition/key/suspension-process/start",
                "/engine-rest/process-definition/key/suspension-process/start",
                "/engine-rest/process-definition/key/suspension-process/start",
            ]
        );
        assert!(received.iter().all(|r| r.method == Method::POST));
    }

    #[tokio::test]
    async fn test_deployment_uploads_bundled_bpmn() {
        let stub = EngineStub::default();
        let base_url = spawn(stub.clone()).await;

        let scenario = suspension::setup1(&ResourceDir::default()).unwrap();
        let _ = ScenarioRunner::new(RestBackend::new(base_url))
            .run(&scenario)
            .await
            .unwrap();

        let deployment = stub.received.lock().unwrap()[0].clone();
        assert!(deployment.content_type.starts_with("multipart/form-data"));
        let body = String::from_utf8_lossy(&deployment.body);
        let bpmn =
            String::from_utf8(cockpit_e2e::read_resource(suspension::PROCESS_RESOURCE).unwrap())
                .unwrap();
        assert!(body.contains("name=\"deployment-name\""));
        assert!(body.contains(PROCESS_KEY));
        assert!(body.contains(&bpmn));
    }

    #[tokio::test]
    async fn test_non_utf8_fixture_uploaded_byte_for_byte() {
        let bpmn: &[u8] = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n\
            <definitions name=\"Pr\xfcfung\"/>\n";
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(suspension::PROCESS_RESOURCE), bpmn).unwrap();

        let stub = EngineStub::default();
        let base_url = spawn(stub.clone()).await;

        let scenario = suspension::setup1(&ResourceDir::new(dir.path())).unwrap();
        let _ = ScenarioRunner::new(RestBackend::new(base_url))
            .run(&scenario)
            .await
            .unwrap();

        let deployment = stub.received.lock().unwrap()[0].clone();
        assert!(deployment
            .body
            .windows(bpmn.len())
            .any(|window| window == bpmn));
    }

    #[tokio::test]
    async fn test_business_keys_sent_in_order() {
        let stub = EngineStub::default();
        let base_url = spawn(stub.clone()).await;

        let scenario = suspension::setup1(&ResourceDir::default()).unwrap();
        let report = ScenarioRunner::new(RestBackend::new(base_url))
            .run(&scenario)
            .await
            .unwrap();

        let received = stub.received.lock().unwrap().clone();
        let keys: Vec<String> = received[1..]
            .iter()
            .map(|r| r.json()["businessKey"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(keys, BUSINESS_KEYS);

        let ids: Vec<&Value> = report
            .responses_for("process-definition", "start")
            .collect();
        assert_eq!(ids, vec![&json!({"id": "id-2"}), &json!({"id": "id-3"}), &json!({"id": "id-4"})]);
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn test_failed_deployment_aborts_remaining_calls() {
        let stub = EngineStub {
            fail_path: Some("/engine-rest/deployment/create".to_string()),
            ..EngineStub::default()
        };
        let base_url = spawn(stub.clone()).await;

        let scenario = suspension::setup1(&ResourceDir::default()).unwrap();
        let mut runner = ScenarioRunner::new(RestBackend::new(base_url));
        let err = runner.run(&scenario).await.unwrap_err();

        assert_eq!(runner.state(), RunState::Failed);
        match err {
            E2eError::SetupFailed {
                resource,
                action,
                payload_index,
                source,
            } => {
                assert_eq!(resource, "deployment");
                assert_eq!(action, "create");
                assert_eq!(payload_index, 0);
                assert!(matches!(
                    *source,
                    E2eError::Backend {
                        status: Some(500),
                        ..
                    }
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(stub.received.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_fixture_fails_before_any_call() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = suspension::setup1(&ResourceDir::new(dir.path())).unwrap_err();
        assert!(matches!(err, E2eError::ResourceNotFound { .. }));
    }
}
