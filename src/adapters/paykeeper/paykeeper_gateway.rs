//! PayKeeper REST client.
//!
//! Every call authenticates with HTTP basic auth. Invoice creation first
//! fetches a short-lived security token and sends it with the form.
//!
//! # Configuration
//!
//! ```ignore
//! let gateway = PaykeeperGateway::new(config.paykeeper.clone())?;
//! ```

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;

use crate::config::PaykeeperConfig;
use crate::domain::foundation::DomainError;
use crate::ports::{Invoice, InvoiceRequest, PaymentGateway};

const SERVICE: &str = "PayKeeper";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InvoiceResponse {
    invoice_id: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct InvoiceInfoResponse {
    status: Option<String>,
}

pub struct PaykeeperGateway {
    config: PaykeeperConfig,
    http_client: reqwest::Client,
}

impl PaykeeperGateway {
    pub fn new(config: PaykeeperConfig) -> Result<Self, DomainError> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::external(SERVICE, format!("Failed to build client: {}", e)))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.server_url.trim_end_matches('/'), endpoint)
    }

    fn get(&self, endpoint: &str) -> reqwest::RequestBuilder {
        self.http_client
            .get(self.url(endpoint))
            .basic_auth(&self.config.username, Some(self.config.password.expose_secret()))
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
        action: &str,
    ) -> Result<T, DomainError> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(%status, error = %error_text, action, "PayKeeper request failed");
            return Err(DomainError::external(
                SERVICE,
                format!("PayKeeper {} failed: HTTP {}", action, status),
            ));
        }

        response.json().await.map_err(|e| {
            DomainError::external(SERVICE, format!("Failed to parse PayKeeper response: {}", e))
        })
    }

    async fn security_token(&self) -> Result<String, DomainError> {
        let response = self
            .get(&self.config.token_endpoint)
            .send()
            .await
            .map_err(|e| DomainError::external(SERVICE, e.to_string()))?;

        let body: TokenResponse = Self::read_json(response, "token").await?;
        body.token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DomainError::external(SERVICE, "Token missing from PayKeeper response"))
    }
}

/// Invoice ids come back as strings or bare numbers depending on the build.
fn invoice_id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl PaymentGateway for PaykeeperGateway {
    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<Invoice, DomainError> {
        let token = self.security_token().await?;

        let params = [
            ("pay_amount", request.amount.to_decimal_string()),
            ("clientid", request.client_id.clone()),
            ("client_email", request.client_email.clone()),
            ("client_phone", request.client_phone.clone().unwrap_or_default()),
            ("orderid", request.order_id.clone()),
            ("service_name", request.service_name.clone()),
            ("token", token),
        ];

        let response = self
            .http_client
            .post(self.url(&self.config.create_invoice_endpoint))
            .basic_auth(&self.config.username, Some(self.config.password.expose_secret()))
            .form(&params)
            .send()
            .await
            .map_err(|e| DomainError::external(SERVICE, e.to_string()))?;

        let body: InvoiceResponse = Self::read_json(response, "create_invoice").await?;
        let invoice_id = body
            .invoice_id
            .as_ref()
            .and_then(invoice_id_text)
            .ok_or_else(|| DomainError::external(SERVICE, "Invoice id missing from PayKeeper response"))?;

        let payment_url = self.config.bill_url(&invoice_id);
        tracing::info!(
            invoice_id = %invoice_id,
            order_id = %request.order_id,
            amount = %request.amount,
            "PayKeeper invoice created"
        );

        Ok(Invoice {
            invoice_id,
            payment_url,
        })
    }

    async fn invoice_status(&self, invoice_id: &str) -> Result<String, DomainError> {
        let response = self
            .get(&self.config.invoice_info_endpoint)
            .query(&[("id", invoice_id)])
            .send()
            .await
            .map_err(|e| DomainError::external(SERVICE, e.to_string()))?;

        let body: InvoiceInfoResponse = Self::read_json(response, "invoice_status").await?;
        body.status
            .ok_or_else(|| DomainError::external(SERVICE, "Status missing from PayKeeper response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ErrorCode, Money};
    use secrecy::SecretString;
    use wiremock::matchers::{body_string_contains, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer) -> PaykeeperGateway {
        PaykeeperGateway::new(PaykeeperConfig {
            enabled: true,
            server_url: server.uri(),
            username: "admin".to_string(),
            password: SecretString::new("pw".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    fn request() -> InvoiceRequest {
        InvoiceRequest {
            amount: Money::from_kopecks(150_000),
            service_name: "Кардиошкола".to_string(),
            client_id: "Анна Петрова".to_string(),
            client_email: "anna@clinic.ru".to_string(),
            client_phone: None,
            order_id: "ORD000042".to_string(),
        }
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/info/settings/token/"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "tok-1" })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn create_invoice_posts_form_with_token() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("POST"))
            .and(path("/change/invoice/preview/"))
            .and(body_string_contains("token=tok-1"))
            .and(body_string_contains("pay_amount=1500.00"))
            .and(body_string_contains("orderid=ORD000042"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "invoice_id": "777" })))
            .mount(&server)
            .await;

        let invoice = gateway(&server).create_invoice(&request()).await.unwrap();
        assert_eq!(invoice.invoice_id, "777");
        assert_eq!(invoice.payment_url, format!("{}/bill/777/", server.uri()));
    }

    #[tokio::test]
    async fn numeric_invoice_id_is_accepted() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("POST"))
            .and(path("/change/invoice/preview/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "invoice_id": 9001 })))
            .mount(&server)
            .await;

        let invoice = gateway(&server).create_invoice(&request()).await.unwrap();
        assert_eq!(invoice.invoice_id, "9001");
    }

    #[tokio::test]
    async fn missing_token_is_an_external_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/info/settings/token/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = gateway(&server).create_invoice(&request()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ExternalServiceError);
    }

    #[tokio::test]
    async fn http_failure_is_an_external_error() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("POST"))
            .and(path("/change/invoice/preview/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = gateway(&server).create_invoice(&request()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ExternalServiceError);
    }

    #[tokio::test]
    async fn invoice_status_reads_status_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/info/invoice/byid/"))
            .and(query_param("id", "777"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "paid" })))
            .mount(&server)
            .await;

        assert_eq!(gateway(&server).invoice_status("777").await.unwrap(), "paid");
    }

    #[test]
    fn invoice_id_text_rejects_empty_values() {
        assert_eq!(invoice_id_text(&Value::String(String::new())), None);
        assert_eq!(invoice_id_text(&Value::Null), None);
        assert_eq!(invoice_id_text(&serde_json::json!(12)), Some("12".to_string()));
    }
}
