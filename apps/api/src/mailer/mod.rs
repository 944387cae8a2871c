//! Transactional email over an HTTP email API (Resend-compatible).
//!
//! Transient transport failures are retried up to twice with linearly increasing
//! delay (1s, then 2s). Anything the API itself rejects fails immediately.

pub mod handlers;

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_EMAIL_API_URL: &str = "https://api.resend.com/emails";
pub const DEFAULT_FROM: &str = "no-reply@vitae.local";
const MAX_RETRIES: u32 = 2;
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum MailError {
    #[error("EMAIL_API_KEY is not configured")]
    MissingApiKey,

    #[error("No recipients given")]
    NoRecipients,

    /// Connection, timeout, or request-level failure. Worth retrying.
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl MailError {
    pub fn is_transient(&self) -> bool {
        matches!(self, MailError::Network(_))
    }
}

impl From<reqwest::Error> for MailError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() || e.is_request() {
            MailError::Network(e.to_string())
        } else {
            MailError::Http(e)
        }
    }
}

/// Runs `op`, retrying transient failures with a 1s, 2s, ... delay.
pub async fn retry_transient<T, F, Fut>(mut op: F) -> Result<T, MailError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, MailError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < MAX_RETRIES => {
                attempt += 1;
                let delay = RETRY_BASE_DELAY * attempt;
                warn!(
                    "Email send attempt {} failed ({}), retrying after {}ms...",
                    attempt,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct EmailClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl EmailClient {
    pub fn new(api_url: String, api_key: Option<String>, from: String) -> Result<Self, MailError> {
        Ok(Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(MailError::Http)?,
            api_url,
            api_key,
            from,
        })
    }

    /// Sends `message`, returning the provider's message id.
    pub async fn send(&self, message: &EmailMessage) -> Result<String, MailError> {
        let api_key = self.api_key.as_deref().ok_or(MailError::MissingApiKey)?;
        if message.to.iter().all(|r| r.trim().is_empty()) {
            return Err(MailError::NoRecipients);
        }

        let id = retry_transient(|| self.send_once(api_key, message)).await?;
        info!(id = %id, recipients = message.to.len(), "Email sent");
        Ok(id)
    }

    async fn send_once(&self, api_key: &str, message: &EmailMessage) -> Result<String, MailError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&SendRequest {
                from: &self.from,
                to: &message.to,
                subject: &message.subject,
                html: &message.html,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(MailError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let sent: SendResponse = response.json().await?;
        Ok(sent.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers_from_transient_failures() {
        let attempts = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result = retry_transient(|| async {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(MailError::Network("connection reset".to_string()))
            } else {
                Ok("sent")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "sent");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        // 1s + 2s of backoff
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up_after_two_retries() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), MailError> = retry_transient(|| async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(MailError::Network("timed out".to_string()))
        })
        .await;

        assert!(matches!(result, Err(MailError::Network(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_does_not_retry_api_errors() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), MailError> = retry_transient(|| async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(MailError::Api {
                status: 422,
                message: "invalid from".to_string(),
            })
        })
        .await;

        assert!(matches!(result, Err(MailError::Api { status: 422, .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    async fn spawn_provider(status: StatusCode, body: Value, hits: Arc<AtomicU32>) -> String {
        let app = Router::new().route(
            "/emails",
            post(move || {
                let body = body.clone();
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    (status, Json(body))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/emails")
    }

    fn make_message() -> EmailMessage {
        EmailMessage {
            to: vec!["ada@example.com".to_string()],
            subject: "Your resume".to_string(),
            html: "<p>Attached.</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_returns_provider_id() {
        let hits = Arc::new(AtomicU32::new(0));
        let url = spawn_provider(StatusCode::OK, json!({ "id": "msg_123" }), hits.clone()).await;
        let client = EmailClient::new(url, Some("key".to_string()), DEFAULT_FROM.to_string()).unwrap();

        assert_eq!(client.send(&make_message()).await.unwrap(), "msg_123");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_send_rejection_is_not_retried() {
        let hits = Arc::new(AtomicU32::new(0));
        let url = spawn_provider(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "message": "Invalid `to` field" }),
            hits.clone(),
        )
        .await;
        let client = EmailClient::new(url, Some("key".to_string()), DEFAULT_FROM.to_string()).unwrap();

        let err = client.send(&make_message()).await.unwrap_err();
        assert!(matches!(err, MailError::Api { status: 422, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_send_requires_api_key_and_recipients() {
        let client = EmailClient::new(
            "http://127.0.0.1:9/emails".to_string(),
            None,
            DEFAULT_FROM.to_string(),
        )
        .unwrap();
        assert!(matches!(
            client.send(&make_message()).await,
            Err(MailError::MissingApiKey)
        ));

        let client = EmailClient::new(
            "http://127.0.0.1:9/emails".to_string(),
            Some("key".to_string()),
            DEFAULT_FROM.to_string(),
        )
        .unwrap();
        let mut message = make_message();
        message.to = vec![" ".to_string()];
        assert!(matches!(
            client.send(&message).await,
            Err(MailError::NoRecipients)
        ));
    }
}
