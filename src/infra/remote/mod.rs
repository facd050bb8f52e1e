//! reqwest adapter for the remote content API.
//!
//! [`RemoteApi`] implements every adapter trait in `application::repos`. Paths are joined beneath the
//! configured base URL (`…/api/v1/`); the health check lives at the API origin.

mod repos;

use std::time::Instant;

use metrics::{counter, histogram};
use quire_api_types::ErrorResponse;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url, header::AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::application::repos::{AccessToken, RepoError};
use crate::config::ApiSettings;
use crate::infra::error::InfraError;
use crate::infra::telemetry::{UPSTREAM_REQUEST_MS, UPSTREAM_REQUESTS_TOTAL};

const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct RemoteApi {
    client: Client,
    base: Url,
}

impl RemoteApi {
    pub fn new(settings: &ApiSettings) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(settings.timeout)
            .build()
            .map_err(|err| InfraError::configuration(format!("failed to build http client: {err}")))?;

        Ok(Self {
            client,
            base: settings.base_url.clone(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("quire/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve `path` beneath the base URL. A leading `/` escapes to the API origin.
    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, RepoError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|err| RepoError::invalid_input(format!("bad upstream path `{path}`: {err}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        token: Option<&AccessToken>,
    ) -> Result<RequestBuilder, RepoError> {
        let url = self.url(path, query)?;
        let mut request = self.client.request(method, url);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose()));
        }
        Ok(request)
    }

    /// Send `request` and return the raw body of a successful response.
    async fn execute(&self, request: RequestBuilder) -> Result<bytes::Bytes, RepoError> {
        let request = request
            .build()
            .map_err(|err| RepoError::invalid_input(err.to_string()))?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        let started = Instant::now();

        let result = self.client.execute(request).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        histogram!(UPSTREAM_REQUEST_MS, "method" => method.to_string()).record(elapsed_ms);

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                counter!(UPSTREAM_REQUESTS_TOTAL, "method" => method.to_string(), "outcome" => "unavailable")
                    .increment(1);
                debug!(
                    target = "quire::infra::remote",
                    method = %method,
                    path = %path,
                    elapsed_ms,
                    error = %err,
                    "upstream request failed"
                );
                return Err(RepoError::unavailable(err));
            }
        };

        let status = response.status();
        let body = response.bytes().await.map_err(RepoError::unavailable)?;
        debug!(
            target = "quire::infra::remote",
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms,
            "upstream request"
        );

        let outcome = if status.is_success() { "ok" } else { "error" };
        counter!(UPSTREAM_REQUESTS_TOTAL, "method" => method.to_string(), "outcome" => outcome)
            .increment(1);

        if status.is_success() {
            Ok(body)
        } else {
            Err(status_error(status, &body))
        }
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RepoError> {
        let body = self.execute(request).await?;
        decode(&body)
    }

    async fn unit(&self, request: RequestBuilder) -> Result<(), RepoError> {
        self.execute(request).await.map(|_| ())
    }

    async fn get_value(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&AccessToken>,
    ) -> Result<Value, RepoError> {
        let request = self.request(Method::GET, path, query, token)?;
        self.json(request).await
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, RepoError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|err| RepoError::Decode(err.to_string()))
}

/// Map a non-success status onto [`RepoError`], pulling a message out of the body when possible.
fn status_error(status: StatusCode, body: &[u8]) -> RepoError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RepoError::Unauthorized,
        StatusCode::NOT_FOUND => RepoError::NotFound,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            RepoError::Unavailable(error_message(status, body))
        }
        _ => RepoError::Rejected {
            status: status.as_u16(),
            message: error_message(status, body),
        },
    }
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(parsed) = serde_json::from_slice::<ErrorResponse>(body)
        && let Some(text) = parsed.text()
    {
        return text.to_string();
    }

    let raw = String::from_utf8_lossy(body);
    let raw = raw.trim();
    if raw.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("upstream error")
            .to_string()
    } else {
        raw.chars().take(MAX_ERROR_BODY_CHARS).collect()
    }
}

/// Single entities come back bare or wrapped in `{"<key>": …}` / `{"data": …}`.
fn unwrap_entity(value: Value, key: &str) -> Value {
    match value {
        Value::Object(mut map) => {
            if let Some(inner @ Value::Object(_)) = map.remove(key) {
                return inner;
            }
            if let Some(inner @ Value::Object(_)) = map.remove("data") {
                return inner;
            }
            Value::Object(map)
        }
        other => other,
    }
}

fn entity<T: DeserializeOwned>(value: Value, key: &str) -> Result<T, RepoError> {
    serde_json::from_value(unwrap_entity(value, key)).map_err(|err| RepoError::Decode(err.to_string()))
}

/// `total` from a listing envelope, falling back to the number of items received.
fn listing_total(value: &Value, received: usize) -> u64 {
    value
        .get("total")
        .or_else(|| value.get("data").and_then(|data| data.get("total")))
        .and_then(Value::as_u64)
        .unwrap_or(received as u64)
}
