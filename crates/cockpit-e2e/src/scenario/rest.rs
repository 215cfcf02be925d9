//! Engine REST backend.
//!
//! Maps scenario calls onto the engine's REST API. Planning a request
//! ([`plan_request`]) is pure; [`RestBackend`] only sends what was planned.

use super::runner::BackendClient;
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::fmt;
use std::time::Duration;

/// Default request timeout (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// HTTP method of a planned request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestMethod {
    /// POST
    Post,
    /// PUT
    Put,
}

impl fmt::Display for RestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Post => f.write_str("POST"),
            Self::Put => f.write_str("PUT"),
        }
    }
}

/// A file inside a deployment
///
/// Deserialized from `{name, content}` (text) or `{name, contentBase64}`
/// (arbitrary bytes); exactly one of the two must be present.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawDeploymentFile")]
pub struct DeploymentFile {
    /// File name, e.g. `suspension-process.bpmn`
    pub name: String,
    /// Raw file content
    pub content: Vec<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDeploymentFile {
    name: String,
    content: Option<String>,
    content_base64: Option<String>,
}

impl TryFrom<RawDeploymentFile> for DeploymentFile {
    type Error = String;

    fn try_from(raw: RawDeploymentFile) -> Result<Self, Self::Error> {
        let content = match (raw.content, raw.content_base64) {
            (Some(text), None) => text.into_bytes(),
            (None, Some(encoded)) => STANDARD
                .decode(encoded)
                .map_err(|e| format!("file {}: invalid contentBase64: {e}", raw.name))?,
            _ => {
                return Err(format!(
                    "file {}: exactly one of `content` or `contentBase64` is required",
                    raw.name
                ))
            }
        };
        Ok(Self {
            name: raw.name,
            content,
        })
    }
}

/// Payload of `deployment.create`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRequest {
    /// Deployment name
    pub deployment_name: String,
    /// Files to deploy
    #[serde(default)]
    pub files: Vec<DeploymentFile>,
    /// Skip the deployment if nothing changed
    #[serde(default)]
    pub enable_duplicate_filtering: bool,
    /// Only redeploy changed resources
    #[serde(default)]
    pub deploy_changed_only: bool,
    /// Tenant to deploy for
    #[serde(default)]
    pub tenant_id: Option<String>,
}

impl DeploymentRequest {
    fn into_form(self) -> Form {
        let mut form = Form::new().text("deployment-name", self.deployment_name);
        if self.enable_duplicate_filtering {
            form = form.text("enable-duplicate-filtering", "true");
        }
        if self.deploy_changed_only {
            form = form.text("deploy-changed-only", "true");
        }
        if let Some(tenant_id) = self.tenant_id {
            form = form.text("tenant-id", tenant_id);
        }
        for file in self.files {
            let part = Part::bytes(file.content).file_name(file.name.clone());
            form = form.part(file.name, part);
        }
        form
    }
}

/// Body of a planned request
#[derive(Debug, Clone, PartialEq)]
pub enum RestBody {
    /// JSON document
    Json(Value),
    /// Multipart deployment upload
    Deployment(DeploymentRequest),
}

/// A request ready to send, relative to the engine REST root
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    /// HTTP method
    pub method: RestMethod,
    /// Path segments below the REST root
    pub path: Vec<String>,
    /// Request body
    pub body: RestBody,
}

impl RestRequest {
    /// `/`-joined path, for logs
    #[must_use]
    pub fn path_string(&self) -> String {
        self.path.join("/")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartInstance {
    key: Option<String>,
    id: Option<String>,
    business_key: Option<String>,
    variables: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuspendDefinition {
    key: String,
    #[serde(default)]
    include_process_instances: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuspendJobDefinitions {
    process_definition_key: Option<String>,
    process_definition_id: Option<String>,
    #[serde(default)]
    include_jobs: bool,
}

fn parse<T: DeserializeOwned>(resource: &str, action: &str, payload: &Value) -> E2eResult<T> {
    serde_json::from_value(payload.clone())
        .map_err(|e| E2eError::invalid_payload(resource, action, e.to_string()))
}

fn segments(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_string()).collect()
}

/// Map a scenario call onto an engine REST request.
///
/// # Errors
///
/// [`E2eError::UnsupportedOperation`] for unknown `resource.action` pairs,
/// [`E2eError::InvalidPayload`] when required fields are missing.
pub fn plan_request(resource: &str, action: &str, payload: &Value) -> E2eResult<RestRequest> {
    match (resource, action) {
        ("deployment", "create") => Ok(RestRequest {
            method: RestMethod::Post,
            path: segments(&["deployment", "create"]),
            body: RestBody::Deployment(parse(resource, action, payload)?),
        }),
        ("process-definition", "start") => {
            let start: StartInstance = parse(resource, action, payload)?;
            let path = match (start.id, start.key) {
                (Some(id), _) => vec!["process-definition".to_string(), id, "start".to_string()],
                (None, Some(key)) => vec![
                    "process-definition".to_string(),
                    "key".to_string(),
                    key,
                    "start".to_string(),
                ],
                (None, None) => {
                    return Err(E2eError::invalid_payload(
                        resource,
                        action,
                        "either `key` or `id` is required",
                    ))
                }
            };
            let mut body = Map::new();
            if let Some(business_key) = start.business_key {
                let _ = body.insert("businessKey".to_string(), Value::String(business_key));
            }
            if let Some(variables) = start.variables {
                let _ = body.insert("variables".to_string(), variables);
            }
            Ok(RestRequest {
                method: RestMethod::Post,
                path,
                body: RestBody::Json(Value::Object(body)),
            })
        }
        ("process-definition", "suspend") => {
            let suspend: SuspendDefinition = parse(resource, action, payload)?;
            Ok(RestRequest {
                method: RestMethod::Put,
                path: vec![
                    "process-definition".to_string(),
                    "key".to_string(),
                    suspend.key,
                    "suspended".to_string(),
                ],
                body: RestBody::Json(json!({
                    "suspended": true,
                    "includeProcessInstances": suspend.include_process_instances,
                })),
            })
        }
        ("job-definition", "suspend") => {
            let suspend: SuspendJobDefinitions = parse(resource, action, payload)?;
            let mut body = json!({ "suspended": true, "includeJobs": suspend.include_jobs });
            match (suspend.process_definition_key, suspend.process_definition_id) {
                (Some(key), _) => body["processDefinitionKey"] = Value::String(key),
                (None, Some(id)) => body["processDefinitionId"] = Value::String(id),
                (None, None) => {
                    return Err(E2eError::invalid_payload(
                        resource,
                        action,
                        "either `processDefinitionKey` or `processDefinitionId` is required",
                    ))
                }
            }
            Ok(RestRequest {
                method: RestMethod::Put,
                path: segments(&["job-definition", "suspended"]),
                body: RestBody::Json(body),
            })
        }
        _ => Err(E2eError::UnsupportedOperation {
            resource: resource.to_string(),
            action: action.to_string(),
        }),
    }
}

/// Backend that issues scenario calls against the engine REST API
#[derive(Debug, Clone)]
pub struct RestBackend {
    base_url: String,
    client: reqwest::Client,
}

impl RestBackend {
    /// Create a backend for the REST root, e.g. `http://localhost:8080/engine-rest`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS))
    }

    /// Create a backend with a custom request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self::with_client(base_url, client)
    }

    /// Create a backend with a custom reqwest client
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Returns the REST root.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &[String]) -> E2eResult<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| E2eError::Config {
            message: format!("invalid REST url {}: {e}", self.base_url),
        })?;
        {
            let mut segments = url.path_segments_mut().map_err(|()| E2eError::Config {
                message: format!("REST url {} cannot have a path", self.base_url),
            })?;
            let _ = segments.pop_if_empty().extend(path);
        }
        Ok(url)
    }

    /// Send a planned request and decode the response body.
    ///
    /// # Errors
    ///
    /// [`E2eError::Backend`] on transport failure or non-success status.
    pub async fn send(&self, request: RestRequest) -> E2eResult<Value> {
        let url = self.url(&request.path)?;
        let builder = match request.method {
            RestMethod::Post => self.client.post(url),
            RestMethod::Put => self.client.put(url),
        };
        let builder = match request.body {
            RestBody::Json(body) => builder.json(&body),
            RestBody::Deployment(deployment) => builder.multipart(deployment.into_form()),
        };

        let resp = builder
            .send()
            .await
            .map_err(|e| E2eError::backend(None, e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| E2eError::backend(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            return Err(E2eError::backend(Some(status.as_u16()), body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl BackendClient for RestBackend {
    async fn call(&self, resource: &str, action: &str, payload: &Value) -> E2eResult<Value> {
        let request = plan_request(resource, action, payload)?;
        tracing::debug!(
            method = ?request.method,
            path = %request.path_string(),
            "engine request"
        );
        self.send(request).await
    }
}
