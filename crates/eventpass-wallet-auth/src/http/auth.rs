/*
[INPUT]:  Wallet addresses, signed challenge bodies, bearer tokens
[OUTPUT]: Normalized backend responses for nonce/login/register/logout/me
[POS]:    HTTP layer - auth endpoints
[UPDATE]: When adding auth endpoints or changing request shapes
*/

use reqwest::Method;
use serde_json::Value;

use crate::http::{BackendClient, NonceMethod, Result};
use crate::types::{LoginRequest, NonceRequest, RegisterRequest};

impl BackendClient {
    /// Request a one-time challenge for `address`
    ///
    /// POST {nonce} `{address}` or GET {nonce}?address=..., per `Endpoints::nonce_method`
    pub async fn request_nonce(&self, address: &str) -> Result<Value> {
        let endpoint = self.endpoints().nonce.clone();
        let builder = match self.endpoints().nonce_method {
            NonceMethod::Post => self
                .request(Method::POST, &endpoint)?
                .json(&NonceRequest {
                    address: address.to_string(),
                }),
            NonceMethod::Get => self
                .request(Method::GET, &endpoint)?
                .query(&[("address", address)]),
        };
        self.send_json(builder).await
    }

    /// Exchange a signed challenge for a session
    ///
    /// POST {login}
    pub async fn login(&self, body: &LoginRequest) -> Result<Value> {
        let endpoint = self.endpoints().login.clone();
        let builder = self.request(Method::POST, &endpoint)?.json(body);
        self.send_json(builder).await
    }

    /// Create an account from a signed challenge plus profile fields
    ///
    /// POST {register}
    pub async fn register(&self, body: &RegisterRequest) -> Result<Value> {
        let endpoint = self.endpoints().register.clone();
        let builder = self.request(Method::POST, &endpoint)?.json(body);
        self.send_json(builder).await
    }

    /// Invalidate the session token server-side
    ///
    /// POST {logout}
    pub async fn logout(&self, token: &str) -> Result<()> {
        let endpoint = self.endpoints().logout.clone();
        let builder = self.request(Method::POST, &endpoint)?.bearer_auth(token);
        self.send_json(builder).await.map(|_| ())
    }

    /// Fetch the profile bound to `token`
    ///
    /// GET {profile}
    pub async fn fetch_profile(&self, token: &str) -> Result<Value> {
        let endpoint = self.endpoints().profile.clone();
        let builder = self.request(Method::GET, &endpoint)?.bearer_auth(token);
        self.send_json(builder).await
    }
}

#[cfg(test)]
mod tests {
    use crate::http::{BackendClient, ClientConfig, Endpoints, NonceMethod};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_request_nonce_post_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/nonce"))
            .and(body_json(serde_json::json!({"address": "0xabc"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": {"message": "m", "nonce": "n", "timestamp": 1},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        let body = client.request_nonce("0xabc").await.unwrap();
        assert_eq!(body["nonce"], "n");
        assert!(body.get("success").is_none());
    }

    #[tokio::test]
    async fn test_request_nonce_get_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nonce"))
            .and(query_param("address", "0xabc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "m", "nonce": "n", "timestamp": 1,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = ClientConfig {
            endpoints: Endpoints {
                nonce: "/nonce".to_string(),
                nonce_method: NonceMethod::Get,
                ..Endpoints::default()
            },
            ..ClientConfig::default()
        };
        let client = BackendClient::with_config(config, &server.uri()).unwrap();
        let body = client.request_nonce("0xabc").await.unwrap();
        assert_eq!(body["message"], "m");
    }

    #[tokio::test]
    async fn test_logout_sends_bearer_and_accepts_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri()).unwrap();
        client.logout("tok").await.unwrap();
    }
}
