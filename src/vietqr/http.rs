use std::future::Future;

use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, error, warn};

use crate::utils::http::get_http_client;
use crate::utils::timing::log_api_timing;
use crate::vietqr::types::ResponseEnvelope;

const ERROR_BODY_LOG_LIMIT: usize = 800;

/// GET/POST against the VietQR endpoints. Implementations never fail: transport
/// problems come back as an envelope with `code == "ERROR"`.
pub trait ApiTransport: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = ResponseEnvelope> + Send;

    fn post<B>(&self, url: &str, body: &B) -> impl Future<Output = ResponseEnvelope> + Send
    where
        B: Serialize + Sync;
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: get_http_client().clone(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl ApiTransport for HttpClient {
    async fn get(&self, url: &str) -> ResponseEnvelope {
        log_api_timing("GET", url, send_for_envelope(self.client.get(url), url)).await
    }

    async fn post<B>(&self, url: &str, body: &B) -> ResponseEnvelope
    where
        B: Serialize + Sync,
    {
        debug!("POST {url}");
        log_api_timing(
            "POST",
            url,
            send_for_envelope(self.client.post(url).json(body), url),
        )
        .await
    }
}

fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

async fn send_for_envelope(request: RequestBuilder, url: &str) -> ResponseEnvelope {
    let response = match request.send().await {
        Ok(response) => response,
        Err(err) => {
            error!(
                "VietQR request to {url} failed: {err} (timeout={}, connect={})",
                err.is_timeout(),
                err.is_connect()
            );
            let message = err.to_string();
            return ResponseEnvelope::transport_error(
                message.clone(),
                Some(JsonValue::String(message)),
            );
        }
    };

    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            error!("Failed to read VietQR response from {url}: {err}");
            let message = err.to_string();
            return ResponseEnvelope::transport_error(
                message.clone(),
                Some(JsonValue::String(message)),
            );
        }
    };

    if !status.is_success() {
        let message = format!("Request failed with status code {}", status.as_u16());
        error!(
            "VietQR request to {url} returned {status}: {}",
            truncate_for_log(&body, ERROR_BODY_LOG_LIMIT)
        );
        let detail = serde_json::from_str::<JsonValue>(&body)
            .ok()
            .filter(|value| !value.is_null())
            .unwrap_or_else(|| JsonValue::String(message.clone()));
        return ResponseEnvelope::transport_error(message, Some(detail));
    }

    if body.trim().is_empty() {
        warn!("Empty response data received from {url}");
        return ResponseEnvelope::transport_error("Empty response received", None);
    }

    match serde_json::from_str::<ResponseEnvelope>(&body) {
        Ok(envelope) => envelope,
        Err(err) => {
            error!(
                "Unparseable VietQR response from {url}: {err}; body={}",
                truncate_for_log(&body, ERROR_BODY_LOG_LIMIT)
            );
            ResponseEnvelope::transport_error(
                format!("Invalid response body: {err}"),
                Some(JsonValue::String(truncate_for_log(&body, ERROR_BODY_LOG_LIMIT))),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vietqr::types::ERROR_CODE;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // A fresh client per test; pooled connections must not outlive a test runtime.
    fn client() -> HttpClient {
        HttpClient::with_client(Client::new())
    }

    #[tokio::test]
    async fn get_returns_remote_body_unchanged() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/banks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "00",
                "desc": "Get Bank list successful! Total 2 banks",
                "data": [{"name": "VietinBank", "bin": "970415"}]
            })))
            .mount(&server)
            .await;

        let envelope = client()
            .get(&format!("{}/v2/banks", server.uri()))
            .await;

        assert!(envelope.is_success());
        assert_eq!(envelope.desc, "Get Bank list successful! Total 2 banks");
        assert_eq!(envelope.banks().unwrap()[0].bin, "970415");
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/generate"))
            .and(body_json(json!({"accountNo": "123"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "00",
                "desc": "ok",
                "data": {"qrDataURL": "data:image/png;base64,AA=="}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let envelope = client()
            .post(
                &format!("{}/v2/generate", server.uri()),
                &json!({"accountNo": "123"}),
            )
            .await;

        assert_eq!(envelope.qr_data_url(), Some("data:image/png;base64,AA=="));
    }

    #[tokio::test]
    async fn non_success_status_keeps_remote_body_as_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/generate"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"code": "21", "desc": "bad"})),
            )
            .mount(&server)
            .await;

        let envelope = client()
            .post(&format!("{}/v2/generate", server.uri()), &json!({}))
            .await;

        assert_eq!(envelope.code, ERROR_CODE);
        assert_eq!(envelope.desc, "Request failed with status code 400");
        assert_eq!(envelope.error, Some(json!({"code": "21", "desc": "bad"})));
    }

    #[tokio::test]
    async fn non_success_status_without_body_uses_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let envelope = client().get(&server.uri()).await;

        assert_eq!(envelope.code, ERROR_CODE);
        assert_eq!(
            envelope.error,
            Some(json!("Request failed with status code 503"))
        );
    }

    #[tokio::test]
    async fn empty_body_is_an_error_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let envelope = client().post(&server.uri(), &json!({})).await;

        assert_eq!(envelope.code, ERROR_CODE);
        assert_eq!(envelope.desc, "Empty response received");
    }

    #[tokio::test]
    async fn garbage_body_is_an_error_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let envelope = client().get(&server.uri()).await;

        assert_eq!(envelope.code, ERROR_CODE);
        assert!(envelope.desc.starts_with("Invalid response body"));
    }

    #[tokio::test]
    async fn transport_failure_becomes_error_envelope() {
        // Port 1 on loopback refuses connections.
        let envelope = client().get("http://127.0.0.1:1/v2/banks").await;

        assert_eq!(envelope.code, ERROR_CODE);
        assert!(!envelope.desc.is_empty());
        assert!(envelope.error.is_some());
    }
}
