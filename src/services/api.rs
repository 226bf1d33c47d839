use log::{error, warn};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Everything that can go wrong talking to the newspaper API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No response at all.
    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Error status with a message the server meant for the user.
    #[error("API rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    /// Error status with an empty or unreadable body.
    #[error("API returned {status} without a readable error")]
    Status { status: u16 },
    /// The bearer token was refused.
    #[error("API rejected the session token")]
    Unauthorized,
    /// Success status but the body was not the expected shape.
    #[error("unexpected API response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Server-supplied text when there is one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Rejected { message, .. } => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_value(self.body.clone()).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Pull the user-facing message out of an error body.
///
/// The API answers `{"error": ...}`; DRF's own auth layer uses `detail`, and
/// serializer failures come back as `{"field": ["message", ...]}`.
pub fn error_message(body: &Value) -> Option<String> {
    let fields = body.as_object()?;

    for key in ["error", "message", "detail"] {
        if let Some(text) = fields.get(key).and_then(Value::as_str) {
            if !text.trim().is_empty() {
                return Some(text.to_string());
            }
        }
    }

    fields.values().find_map(|value| match value {
        Value::Array(items) => items.iter().find_map(Value::as_str).map(str::to_string),
        _ => None,
    })
}

/// Single request helper for every call to the API: bearer header, JSON in
/// and out, error-body extraction.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(concat!("samaachar-web/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(ApiClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Reply, ClientError> {
        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!("✗ {} {} failed: {}", method, path, e);
            ClientError::Transport(e)
        })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<Value>(&text).ok();

        // A 401 on an anonymous call (login) is a wrong password, not a dead session.
        if status == StatusCode::UNAUTHORIZED && token.is_some() {
            warn!("{} {} → 401, token refused", method, path);
            return Err(ClientError::Unauthorized);
        }

        if !status.is_success() {
            warn!("{} {} → {}", method, path, status);
            return Err(match body.as_ref().and_then(error_message) {
                Some(message) => ClientError::Rejected {
                    status: status.as_u16(),
                    message,
                },
                None => ClientError::Status {
                    status: status.as_u16(),
                },
            });
        }

        Ok(Reply {
            status: status.as_u16(),
            body: body.unwrap_or(Value::Null),
        })
    }

    pub async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        self.execute(Method::GET, path, token, None).await?.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn error_messages_prefer_error_then_detail_then_fields() {
        assert_eq!(
            error_message(&json!({ "error": "Plan not found" })),
            Some("Plan not found".into())
        );
        assert_eq!(
            error_message(&json!({ "detail": "Given token not valid" })),
            Some("Given token not valid".into())
        );
        assert_eq!(
            error_message(&json!({ "username": ["Username already exists"] })),
            Some("Username already exists".into())
        );
        assert_eq!(error_message(&json!({ "error": "" })), None);
        assert_eq!(error_message(&json!(["nope"])), None);
        assert_eq!(error_message(&json!("plain")), None);
    }

    #[tokio::test]
    async fn execute_sends_bearer_and_json() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/customer/subscribe/")
                .header("authorization", "Bearer tok-1")
                .json_body(json!({ "plan_id": 5 }));
            then.status(201).json_body(json!({ "message": "Subscription request sent" }));
        });

        let api = ApiClient::new(&format!("{}/", server.base_url())).unwrap();
        let reply = api
            .execute(
                Method::POST,
                "/api/customer/subscribe/",
                Some("tok-1"),
                Some(&json!({ "plan_id": 5 })),
            )
            .await
            .unwrap();

        mock.assert();
        assert_eq!(reply.status, 201);
        assert_eq!(reply.body["message"], "Subscription request sent");
    }

    #[tokio::test]
    async fn error_statuses_map_onto_the_taxonomy() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.path("/structured");
            then.status(404).json_body(json!({ "error": "Not found" }));
        });
        server.mock(|when, then| {
            when.path("/bare");
            then.status(500).body("<html>oops</html>");
        });
        server.mock(|when, then| {
            when.path("/expired");
            then.status(401).json_body(json!({ "detail": "Token expired" }));
        });

        let api = ApiClient::new(&server.base_url()).unwrap();

        let err = api.fetch::<Value>("/structured", Some("t")).await.unwrap_err();
        assert_eq!(err.user_message("Action failed"), "Not found");

        let err = api.fetch::<Value>("/bare", Some("t")).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 500 }));
        assert_eq!(err.user_message("Action failed"), "Action failed");

        let err = api.fetch::<Value>("/expired", Some("t")).await.unwrap_err();
        assert!(err.is_unauthorized());

        // Without a token a 401 is an ordinary rejection.
        let err = api.fetch::<Value>("/expired", None).await.unwrap_err();
        assert_eq!(err.user_message("fallback"), "Token expired");
    }

    #[tokio::test]
    async fn transport_failures_use_the_fallback() {
        let api = ApiClient::new("http://127.0.0.1:1").unwrap();
        let err = api.fetch::<Value>("/api/plans/", None).await.unwrap_err();

        assert!(matches!(err, ClientError::Transport(_)));
        assert_eq!(err.user_message("Failed to load data"), "Failed to load data");
    }

    #[tokio::test]
    async fn unexpected_shapes_are_decode_errors() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.path("/api/plans/");
            then.status(200).json_body(json!({ "results": [] }));
        });

        let api = ApiClient::new(&server.base_url()).unwrap();
        let err = api.fetch::<Vec<Value>>("/api/plans/", None).await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
