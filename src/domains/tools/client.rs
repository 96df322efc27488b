//! HTTP tool client - invoke a remote registry as if it were local.
//!
//! Talks to a server exposing `POST /api/tools/{name}` and `GET /api/tools`
//! (see `core::transport::http`). [`HttpToolClient::call_tool`] folds every
//! failure into an [`InvokeResult`]; [`HttpToolClient::list_tools`] returns
//! `Err` on transport failures, HTTP errors and timeouts. Callers handle
//! errors for discovery but only inspect the result for invocation.

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use super::error::ClientError;
use super::mcp::{McpCallResult, McpToolInfo};
use super::result::{InvokeFailure, InvokeResult};
use super::schema::ValidationIssue;
use crate::core::config::ClientConfig;

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Header carrying the caller's trace id.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Options for [`HttpToolClient`].
#[derive(Debug, Clone)]
pub struct HttpClientOptions {
    /// Extra headers sent with every request.
    pub headers: Vec<(String, String)>,

    /// Applied to each request as a whole (connect, send and body read).
    pub timeout: Duration,

    /// Sent as `x-trace-id` when set.
    pub trace_id: Option<String>,
}

impl Default for HttpClientOptions {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            trace_id: None,
        }
    }
}

impl HttpClientOptions {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

impl From<&ClientConfig> for HttpClientOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            headers: Vec::new(),
            timeout: Duration::from_millis(config.timeout_ms),
            trace_id: config.trace_id.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ToolListing {
    #[serde(default)]
    tools: Vec<McpToolInfo>,
}

/// Client bound to one tool server.
#[derive(Debug, Clone)]
pub struct HttpToolClient {
    base_url: Url,
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpToolClient {
    /// Build a client for `base_url`.
    ///
    /// Fails if the URL cannot carry a path or a header is malformed.
    pub fn new(base_url: &str, options: HttpClientOptions) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        let mut headers = HeaderMap::new();
        for (name, value) in &options.headers {
            headers.insert(header_name(name)?, header_value(value)?);
        }
        if let Some(trace_id) = &options.trace_id {
            headers.insert(HeaderName::from_static(TRACE_ID_HEADER), header_value(trace_id)?);
        }

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            base_url,
            http,
            timeout: options.timeout,
        })
    }

    /// Build a client from the `client` section of the configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(&config.base_url, HttpClientOptions::from(config))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Invoke a remote tool. Never returns an error; failures are encoded in
    /// the result.
    #[instrument(skip(self, input), fields(base_url = %self.base_url))]
    pub async fn call_tool(&self, name: &str, input: Value) -> InvokeResult {
        let attempt = tokio::time::timeout(self.timeout, self.send_call(name, input)).await;
        match attempt {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!("Remote tool call failed: {}", e);
                InvokeResult::failure(e.to_string())
            }
            Err(_) => {
                warn!("Remote tool call timed out: {}", name);
                InvokeResult::failure(self.timeout_error().to_string())
            }
        }
    }

    /// List the remote server's tools.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn list_tools(&self) -> Result<Vec<McpToolInfo>, ClientError> {
        tokio::time::timeout(self.timeout, self.fetch_listing())
            .await
            .map_err(|_| self.timeout_error())?
    }

    async fn send_call(&self, name: &str, input: Value) -> Result<InvokeResult, ClientError> {
        let url = self.endpoint(&["api", "tools", name])?;
        debug!("POST {}", url);

        let response = self
            .http
            .post(url)
            .json(&json!({ "input": input }))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Ok(match failure_from_body(&body) {
                Some(failure) => InvokeResult::Failure(failure),
                None => InvokeResult::failure(status_error(status).to_string()),
            });
        }

        let wire: McpCallResult = serde_json::from_str(&body)?;
        Ok(wire.into())
    }

    async fn fetch_listing(&self) -> Result<Vec<McpToolInfo>, ClientError> {
        let url = self.endpoint(&["api", "tools"])?;
        debug!("GET {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let body = response.text().await?;
        let listing: ToolListing = serde_json::from_str(&body)?;
        Ok(listing.tools)
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn timeout_error(&self) -> ClientError {
        ClientError::Timeout(self.timeout.as_millis())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn status_error(status: StatusCode) -> ClientError {
    ClientError::status(status.as_u16(), status.canonical_reason().unwrap_or_default())
}

/// Failure carried by an error response body, if it has a string `error`.
///
/// Any JSON object qualifies, so bodies from proxies and auth middleware
/// without an `ok` flag keep their message.
fn failure_from_body(body: &str) -> Option<InvokeFailure> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?.as_str()?.to_string();
    let issues = value
        .get("validation_errors")
        .or_else(|| value.get("validationErrors"))
        .and_then(|v| serde_json::from_value::<Vec<ValidationIssue>>(v.clone()).ok())
        .unwrap_or_default();
    Some(InvokeFailure::with_issues(error, issues))
}

fn header_name(name: &str) -> Result<HeaderName, ClientError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| ClientError::InvalidHeader(format!("{}: {}", name, e)))
}

fn header_value(value: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(value).map_err(|e| ClientError::InvalidHeader(e.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::core::transport::{HttpConfig, http::build_router};
    use crate::core::McpServer;
    use crate::domains::tools::definitions::register_builtin_tools;
    use crate::domains::tools::error::BoxError;
    use crate::domains::tools::{ToolContract, ToolRegistry, schema};
    use axum::extract::Path;
    use axum::http::{HeaderMap as RequestHeaders, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::sync::Arc;

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn spawn_tool_server() -> String {
        let registry = Arc::new(ToolRegistry::new());
        register_builtin_tools(&registry).unwrap();
        registry
            .register_tool(
                ToolContract::<Value, Value>::new("slow", schema::any(), schema::any()),
                |_: Value| async {
                    tokio::time::sleep(Duration::from_millis(300)).await;
                    Ok::<_, BoxError>(json!({}))
                },
            )
            .unwrap();
        let server = McpServer::new(Config::default(), registry);
        spawn(build_router(server, &HttpConfig::default())).await
    }

    fn client(base_url: &str) -> HttpToolClient {
        HttpToolClient::new(base_url, HttpClientOptions::default()).unwrap()
    }

    #[tokio::test]
    async fn test_call_tool_round_trip() {
        let base = spawn_tool_server().await;
        let result = client(&base)
            .call_tool("math.add", json!({ "a": 5, "b": 3 }))
            .await;
        assert_eq!(result, InvokeResult::Success(json!({ "sum": 8 })));
    }

    #[tokio::test]
    async fn test_call_tool_validation_failure() {
        let base = spawn_tool_server().await;
        let result = client(&base)
            .call_tool("math.add", json!({ "a": "five", "b": 3 }))
            .await;

        assert_eq!(result.error(), Some("Input validation failed"));
        assert_eq!(result.validation_errors()[0].path[0].to_string(), "a");
    }

    #[tokio::test]
    async fn test_call_tool_not_found() {
        let base = spawn_tool_server().await;
        let result = client(&base).call_tool("nope", json!({})).await;
        assert_eq!(result.error(), Some("Tool \"nope\" not found"));
    }

    #[tokio::test]
    async fn test_call_tool_timeout_is_a_result() {
        let base = spawn_tool_server().await;
        let client = HttpToolClient::new(
            &base,
            HttpClientOptions::default().with_timeout(Duration::from_millis(50)),
        )
        .unwrap();

        let result = client.call_tool("slow", json!({})).await;
        assert_eq!(result.error(), Some("Request timeout after 50ms"));
    }

    #[tokio::test]
    async fn test_list_tools_timeout_is_an_error() {
        let app = Router::new().route(
            "/api/tools",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                Json(json!({ "tools": [] }))
            }),
        );
        let base = spawn(app).await;
        let client = HttpToolClient::new(
            &base,
            HttpClientOptions::default().with_timeout(Duration::from_millis(50)),
        )
        .unwrap();

        let err = client.list_tools().await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout(50)));
        assert_eq!(err.to_string(), "Request timeout after 50ms");
    }

    #[tokio::test]
    async fn test_list_tools_round_trip() {
        let base = spawn_tool_server().await;
        let tools = client(&base).list_tools().await.unwrap();

        let mut names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["echo", "math.add", "slow"]);
        let add = tools.iter().find(|t| t.name == "math.add").unwrap();
        assert_eq!(add.input_schema["required"], json!(["a", "b"]));
    }

    #[tokio::test]
    async fn test_list_tools_missing_field_is_empty() {
        let app = Router::new().route("/api/tools", get(|| async { Json(json!({})) }));
        let base = spawn(app).await;
        assert!(client(&base).list_tools().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_tools_tolerates_missing_schema() {
        let app = Router::new().route(
            "/api/tools",
            get(|| async {
                Json(json!({
                    "tools": [
                        { "name": "bare" },
                        { "name": "echo", "input_schema": { "type": "object" } }
                    ]
                }))
            }),
        );
        let base = spawn(app).await;

        let tools = client(&base).list_tools().await.unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "bare");
        assert!(tools[0].input_schema.is_null());
        assert_eq!(tools[1].input_schema["type"], "object");
    }

    #[tokio::test]
    async fn test_http_error_without_body() {
        let app = Router::new()
            .route(
                "/api/tools/{name}",
                post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
            )
            .route("/api/tools", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let base = spawn(app).await;
        let client = client(&base);

        let result = client.call_tool("echo", json!({})).await;
        assert_eq!(result.error(), Some("HTTP 502: Bad Gateway"));

        let err = client.list_tools().await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
    }

    #[tokio::test]
    async fn test_error_body_without_ok_flag() {
        let app = Router::new().route(
            "/api/tools/{name}",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": "Unauthorized: missing token" })),
                )
            }),
        );
        let base = spawn(app).await;

        let result = client(&base).call_tool("echo", json!({ "text": "hi" })).await;
        assert_eq!(result.error(), Some("Unauthorized: missing token"));
        assert!(result.validation_errors().is_empty());
    }

    #[tokio::test]
    async fn test_error_body_with_camel_case_issues() {
        let app = Router::new().route(
            "/api/tools/{name}",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "Input validation failed",
                        "validationErrors": [{ "path": ["text"], "message": "Required" }]
                    })),
                )
            }),
        );
        let base = spawn(app).await;

        let result = client(&base).call_tool("echo", json!({})).await;
        assert_eq!(result.error(), Some("Input validation failed"));
        assert_eq!(result.validation_errors()[0].message, "Required");
    }

    #[tokio::test]
    async fn test_connection_failure_is_a_result() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = client(&format!("http://{}", addr))
            .call_tool("echo", json!({ "text": "hi" }))
            .await;
        assert!(!result.is_ok());
        assert!(!result.error().unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_headers_trace_id_and_encoded_name() {
        let app = Router::new().route(
            "/api/tools/{name}",
            post(
                |Path(name): Path<String>, headers: RequestHeaders, Json(body): Json<Value>| async move {
                    let header = |key: &str| {
                        headers
                            .get(key)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string)
                    };
                    Json(json!({
                        "ok": true,
                        "result": {
                            "name": name,
                            "trace": header(TRACE_ID_HEADER),
                            "tenant": header("x-tenant"),
                            "input": body["input"],
                        }
                    }))
                },
            ),
        );
        let base = spawn(app).await;
        let client = HttpToolClient::new(
            &format!("{}/", base),
            HttpClientOptions::default()
                .with_header("x-tenant", "acme")
                .with_trace_id("trace-42"),
        )
        .unwrap();

        let result = client.call_tool("a b/c", json!({ "k": 1 })).await;
        assert_eq!(
            result,
            InvokeResult::Success(json!({
                "name": "a b/c",
                "trace": "trace-42",
                "tenant": "acme",
                "input": { "k": 1 }
            }))
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpToolClient::new("not a url", HttpClientOptions::default()).unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }

    #[test]
    fn test_options_from_config() {
        let config = ClientConfig {
            base_url: "http://localhost:9000".to_string(),
            timeout_ms: 1500,
            trace_id: Some("t".to_string()),
        };
        let client = HttpToolClient::from_config(&config).unwrap();
        assert_eq!(client.timeout(), Duration::from_millis(1500));
        assert_eq!(client.base_url().as_str(), "http://localhost:9000/");
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(HttpClientOptions::default().timeout, Duration::from_millis(30_000));
    }
}
