/*
[INPUT]:  HTTP configuration (base URL, endpoint paths, timeouts)
[OUTPUT]: Configured reqwest client and normalized JSON responses
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::envelope::{error_message, normalize_response};
use super::{BackendError, Result};

const ERROR_BODY_MAX_CHARS: usize = 200;

/// How the nonce endpoint expects the address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonceMethod {
    /// `GET {nonce}?address=...`
    Get,
    /// `POST {nonce}` with `{"address": ...}`
    #[default]
    Post,
}

/// Backend endpoint paths, joined under the base URL's path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub nonce: String,
    pub nonce_method: NonceMethod,
    pub login: String,
    pub register: String,
    pub logout: String,
    pub profile: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            nonce: "/api/auth/nonce".to_string(),
            nonce_method: NonceMethod::Post,
            login: "/api/auth/login".to_string(),
            register: "/api/auth/register".to_string(),
            logout: "/api/auth/logout".to_string(),
            profile: "/api/auth/me".to_string(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub endpoints: Endpoints,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            endpoints: Endpoints::default(),
        }
    }
}

/// HTTP client for the EventPass auth backend
#[derive(Debug, Clone)]
pub struct BackendClient {
    http_client: Client,
    base_url: Url,
    endpoints: Endpoints,
}

impl BackendClient {
    /// Create a new client with default configuration
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(ClientConfig::default(), base_url)
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig, base_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: directory_url(base_url)?,
            endpoints: config.endpoints,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Build request builder for an endpoint path
    pub(crate) fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        // Relative join keeps a path prefix such as `https://host/backend`
        let url = self.base_url.join(endpoint.trim_start_matches('/'))?;
        debug!(%method, %url, "backend request");
        Ok(self.http_client.request(method, url))
    }

    /// Send a request and return its normalized JSON body.
    ///
    /// Non-2xx statuses become `BackendError::Api`; an empty 2xx body is `Null`.
    pub(crate) async fn send_json(&self, builder: RequestBuilder) -> Result<Value> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|body| body.as_object().and_then(error_message))
                .unwrap_or_else(|| fallback_error_text(status.canonical_reason(), &text));
            debug!(status = status.as_u16(), %message, "backend returned error status");
            return Err(BackendError::api_error(status, message));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        let body: Value = serde_json::from_str(&text)?;
        normalize_response(body)
    }
}

/// Parse `base_url` so that its path ends with `/`
fn directory_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn fallback_error_text(reason: Option<&str>, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return reason.unwrap_or("request failed").to_string();
    }
    body.chars().take(ERROR_BODY_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_client_rejects_invalid_base_url() {
        let err = BackendClient::new("not a url").unwrap_err();
        assert!(matches!(err, BackendError::UrlParse(_)));
    }

    #[test]
    fn test_base_url_path_prefix_is_kept() {
        let client = BackendClient::new("https://events.example/backend").unwrap();
        assert_eq!(client.base_url().as_str(), "https://events.example/backend/");

        let builder = client.request(Method::POST, "/api/auth/nonce").unwrap();
        let request = builder.build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://events.example/backend/api/auth/nonce"
        );
    }

    #[test]
    fn test_bare_host_base_url() {
        let client = BackendClient::new("http://localhost:3000").unwrap();
        let request = client.request(Method::GET, "/api/auth/me").unwrap().build().unwrap();
        assert_eq!(request.url().as_str(), "http://localhost:3000/api/auth/me");
    }

    #[test]
    fn test_endpoints_default_paths() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.nonce, "/api/auth/nonce");
        assert_eq!(endpoints.nonce_method, NonceMethod::Post);
        assert_eq!(endpoints.profile, "/api/auth/me");
    }

    #[test]
    fn test_endpoints_partial_deserialize_keeps_defaults() {
        let endpoints: Endpoints =
            serde_json::from_value(serde_json::json!({"login": "/v2/login", "nonce_method": "get"}))
                .unwrap();
        assert_eq!(endpoints.login, "/v2/login");
        assert_eq!(endpoints.nonce_method, NonceMethod::Get);
        assert_eq!(endpoints.register, "/api/auth/register");
    }

    #[tokio::test]
    async fn test_send_json_maps_error_status_with_backend_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/boom"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"success": false, "message": "Invalid signature"})),
            )
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        let builder = client.request(Method::GET, "/boom").unwrap();
        match client.send_json(builder).await.unwrap_err() {
            BackendError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid signature");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_json_plain_text_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        let builder = client.request(Method::GET, "/down").unwrap();
        let err = client.send_json(builder).await.unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("maintenance"));
    }

    #[tokio::test]
    async fn test_send_json_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(serde_json::json!({})),
            )
            .mount(&server)
            .await;

        let config = ClientConfig {
            timeout: Duration::from_millis(50),
            ..ClientConfig::default()
        };
        let client = BackendClient::with_config(config, &server.uri()).unwrap();
        let builder = client.request(Method::GET, "/slow").unwrap();
        let err = client.send_json(builder).await.unwrap_err();
        assert!(err.is_timeout());
        assert!(err.is_transport());
    }
}
