//! Sendsay JSON API client.
//!
//! A `login` action yields a session token that is cached and sent as
//! `Authorization: sendsay session="<token>"`. When Sendsay reports an auth
//! error the session is dropped and the action is retried once with a fresh
//! login. Payloads are masked with [`sanitize`] before they are logged.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::config::SendsayConfig;
use crate::domain::email::{sanitize, IssueRequest, MemberUpdate};
use crate::domain::foundation::DomainError;
use crate::ports::Mailer;

const SERVICE: &str = "Sendsay";

/// Outcome of one authenticated call.
enum Reply {
    Ok(Value),
    AuthExpired,
}

pub struct SendsayMailer {
    api_url: String,
    login: String,
    sublogin: String,
    password: SecretString,
    session: RwLock<Option<String>>,
    http_client: reqwest::Client,
}

impl SendsayMailer {
    pub fn new(config: &SendsayConfig) -> Result<Self, DomainError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| DomainError::external(SERVICE, format!("Failed to build client: {}", e)))?;

        Ok(Self {
            api_url: config.api_url.clone(),
            login: config.login.trim().to_string(),
            sublogin: config.sublogin.clone(),
            password: config.password.clone(),
            session: RwLock::new(None),
            http_client,
        })
    }

    async fn post_json(&self, body: &Value, session: Option<&str>) -> Result<Value, DomainError> {
        let mut request = self.http_client.post(&self.api_url).json(body);
        if let Some(session) = session {
            request = request.header(
                reqwest::header::AUTHORIZATION,
                format!("sendsay session=\"{}\"", session),
            );
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::external(SERVICE, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(%status, error = %error_text, "Sendsay HTTP error");
            return Err(DomainError::external(SERVICE, format!("Sendsay: HTTP {}", status)));
        }

        response.json().await.map_err(|e| {
            DomainError::external(SERVICE, format!("Failed to parse Sendsay response: {}", e))
        })
    }

    async fn fresh_session(&self) -> Result<String, DomainError> {
        let body = json!({
            "action": "login",
            "login": self.login,
            "sublogin": self.sublogin,
            "passwd": self.password.expose_secret(),
        });
        tracing::debug!(request = %sanitize(&body), "Sendsay login");

        let data = self.post_json(&body, None).await?;
        let token = data
            .get("session")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        match token {
            Some(token) => {
                *self.session.write().await = Some(token.clone());
                Ok(token)
            }
            None => {
                tracing::error!(response = %sanitize(&data), "Sendsay login rejected");
                Err(DomainError::external(SERVICE, "Sendsay login returned no session"))
            }
        }
    }

    async fn session(&self) -> Result<String, DomainError> {
        if let Some(token) = self.session.read().await.clone() {
            return Ok(token);
        }
        self.fresh_session().await
    }

    async fn call_once(&self, body: &Value, session: &str) -> Result<Reply, DomainError> {
        let data = self.post_json(body, Some(session)).await?;
        let errors = error_ids(&data);
        if errors.is_empty() {
            return Ok(Reply::Ok(data));
        }
        if errors.iter().any(|id| id.starts_with("error/auth")) {
            return Ok(Reply::AuthExpired);
        }
        tracing::error!(response = %sanitize(&data), "Sendsay API error");
        Err(DomainError::external(
            SERVICE,
            format!("Sendsay API error: {}", errors.join(", ")),
        ))
    }

    /// Runs an action, re-authenticating once if the session has expired.
    async fn call(&self, body: Value) -> Result<Value, DomainError> {
        let action = body.get("action").and_then(Value::as_str).unwrap_or_default().to_string();
        tracing::debug!(action = %action, request = %sanitize(&body), "Sendsay request");

        let session = self.session().await?;
        let data = match self.call_once(&body, &session).await? {
            Reply::Ok(data) => data,
            Reply::AuthExpired => {
                tracing::info!(action = %action, "Sendsay session expired, logging in again");
                *self.session.write().await = None;
                let session = self.fresh_session().await?;
                match self.call_once(&body, &session).await? {
                    Reply::Ok(data) => data,
                    Reply::AuthExpired => {
                        return Err(DomainError::external(SERVICE, "Sendsay rejected a fresh session"))
                    }
                }
            }
        };

        tracing::info!(action = %action, response = %sanitize(&data), "Sendsay response");
        Ok(data)
    }
}

/// Error ids from a Sendsay `errors` array.
fn error_ids(data: &Value) -> Vec<String> {
    data.get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .map(|e| {
                    e.get("id")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| e.to_string())
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl Mailer for SendsayMailer {
    fn is_enabled(&self) -> bool {
        !self.login.is_empty()
    }

    async fn set_member(&self, member: &MemberUpdate) -> Result<(), DomainError> {
        self.call(member.to_request()).await.map(|_| ())
    }

    async fn send(&self, issue: &IssueRequest) -> Result<(), DomainError> {
        self.call(issue.to_request()).await.map(|_| ())
    }
}
