//! HTTP client wrapper for the Deribit public API.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::de::DeserializeOwned;

use super::api_types::{RpcEnvelope, RpcErrorResponse};
use super::error::DeribitError;
use crate::infrastructure::metrics::{self, Endpoint, Outcome};

/// HTTP client for unauthenticated Deribit endpoints.
#[derive(Debug, Clone)]
pub struct DeribitHttpClient {
    client: Client,
}

impl DeribitHttpClient {
    /// Create a client with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, DeribitError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeribitError::Network(e.to_string()))?;

        Ok(Self { client })
    }

    /// GET `url` with `query` and return the JSON-RPC `result`.
    pub async fn get_result<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, DeribitError> {
        let started = Instant::now();
        let result = self.request(url, query).await;

        let outcome = if result.is_ok() {
            Outcome::Success
        } else {
            Outcome::Failure
        };
        metrics::record_request(endpoint, outcome, started.elapsed());

        result
    }

    async fn request<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, DeribitError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| DeribitError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DeribitError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<RpcErrorResponse>(&body) {
                Ok(err) => format!("{} (code {})", err.error.message, err.error.code),
                Err(_) => body,
            };
            return Err(DeribitError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: RpcEnvelope<T> =
            serde_json::from_str(&body).map_err(|e| DeribitError::JsonParse(e.to_string()))?;

        if let Some(error) = envelope.error {
            return Err(DeribitError::Api {
                code: error.code,
                message: error.message,
            });
        }

        envelope
            .result
            .ok_or_else(|| DeribitError::JsonParse("response has no result".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn client_and_server() -> (DeribitHttpClient, MockServer) {
        let server = MockServer::start().await;
        let client = DeribitHttpClient::new(Duration::from_secs(5)).unwrap();
        (client, server)
    }

    #[tokio::test]
    async fn returns_result_payload() {
        let (client, server) = client_and_server().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/public/test"))
            .and(query_param("currency", "BTC"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "result": { "ok": true }
            })))
            .mount(&server)
            .await;

        let value: Value = client
            .get_result(
                Endpoint::Instruments,
                &format!("{}/api/v2/public/test", server.uri()),
                &[("currency", "BTC".to_string())],
            )
            .await
            .unwrap();

        assert_eq!(value, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn error_body_is_surfaced_with_status() {
        let (client, server) = client_and_server().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "jsonrpc": "2.0",
                "error": { "code": 10_020, "message": "instrument_not_found" }
            })))
            .mount(&server)
            .await;

        let err = client
            .get_result::<Value>(Endpoint::TradeHistory, &server.uri(), &[])
            .await
            .unwrap_err();

        match err {
            DeribitError::Status { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("instrument_not_found"));
                assert!(message.contains("10020"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_error_body_is_kept_raw() {
        let (client, server) = client_and_server().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = client
            .get_result::<Value>(Endpoint::TradeHistory, &server.uri(), &[])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DeribitError::Status { status: 502, ref message } if message == "Bad Gateway"
        ));
    }

    #[tokio::test]
    async fn rpc_error_with_success_status() {
        let (client, server) = client_and_server().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": { "code": -32602, "message": "Invalid params" }
            })))
            .mount(&server)
            .await;

        let err = client
            .get_result::<Value>(Endpoint::TradeHistory, &server.uri(), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, DeribitError::Api { code: -32602, .. }));
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let (client, server) = client_and_server().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client
            .get_result::<Value>(Endpoint::Instruments, &server.uri(), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, DeribitError::JsonParse(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let client = DeribitHttpClient::new(Duration::from_secs(1)).unwrap();
        let err = client
            .get_result::<Value>(Endpoint::Instruments, "http://127.0.0.1:1/api", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, DeribitError::Network(_)));
    }
}
