//! PostgREST-backed data access.
//!
//! The LST store is only reachable through PostgREST's auto-generated REST
//! interface, so the handle here is an HTTP client bound to the PostgREST
//! base URL. Query functions in [`queries`] take it as their first argument.

pub mod models;
pub mod queries;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::errors::AppError;

/// Handle to the PostgREST service.
#[derive(Debug, Clone)]
pub struct Postgrest {
    client: reqwest::Client,
    base_url: String,
}

/// Error body PostgREST returns for failed requests.
#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

impl Postgrest {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub(crate) fn patch(&self, path: &str) -> RequestBuilder {
        self.client.patch(self.url(path))
    }

    pub(crate) fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }
}

/// Send a request and turn transport failures and PostgREST error bodies into [`AppError`].
///
/// `context` prefixes transport error messages, e.g. "Failed to fetch LST data".
pub(crate) async fn send(request: RequestBuilder, context: &str) -> Result<Response, AppError> {
    let response = request
        .send()
        .await
        .map_err(|e| AppError::ExternalServiceError(format!("{}: {}", context, e)))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body: Option<PostgrestErrorBody> = serde_json::from_str(&text).ok();
    let (code, message) = match body {
        Some(b) => {
            let message = b
                .message
                .or(b.details)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            (b.code, message)
        }
        None if text.is_empty() => (None, format!("HTTP {}", status.as_u16())),
        None => (None, text),
    };

    Err(AppError::Upstream {
        status: status.as_u16(),
        code,
        message: format!("{}: {}", context, message),
    })
}

/// [`send`] and decode the JSON body.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    context: &str,
) -> Result<T, AppError> {
    let response = send(request, context).await?;
    response
        .json()
        .await
        .map_err(|e| AppError::ExternalServiceError(format!("{}: invalid JSON: {}", context, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_url_joins_without_double_slash() {
        let db = Postgrest::new("http://localhost:3001/");
        assert_eq!(db.url("/lst_statistics"), "http://localhost:3001/lst_statistics");
        assert_eq!(db.url("rpc/x"), "http://localhost:3001/rpc/x");
    }

    #[tokio::test]
    async fn test_send_maps_postgrest_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lst_tr_sf_data"))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "code": "23505",
                "message": "duplicate key value violates unique constraint",
                "details": null,
                "hint": null
            })))
            .mount(&server)
            .await;

        let db = Postgrest::new(&server.uri());
        let err = send(db.post("lst_tr_sf_data"), "Failed to insert LST data")
            .await
            .unwrap_err();

        match err {
            AppError::Upstream {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 409);
                assert_eq!(code.as_deref(), Some("23505"));
                assert!(message.starts_with("Failed to insert LST data: duplicate key"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_plain_text_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lst_statistics"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let db = Postgrest::new(&server.uri());
        let err = send(db.get("lst_statistics"), "Failed to fetch LST statistics")
            .await
            .unwrap_err();

        match err {
            AppError::Upstream { status, code, .. } => {
                assert_eq!(status, 502);
                assert!(code.is_none());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_unreachable_is_external_service_error() {
        // Nothing listens on port 9 (discard) in the test environment
        let db = Postgrest::new("http://127.0.0.1:9");
        let err = send(db.get("lst_statistics"), "Failed to fetch LST statistics")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExternalServiceError(msg) if msg.starts_with("Failed to fetch LST statistics")));
    }
}
