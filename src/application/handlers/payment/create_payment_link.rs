//! CreatePaymentLinkHandler - Command handler that opens a payment for a paid event.

use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::domain::event::Event;
use crate::domain::foundation::{non_empty, PaymentId, UserId};
use crate::domain::payment::{
    metadata_keys, NewPayment, Payment, PaymentError, PaymentSystem, DEFAULT_CURRENCY,
};
use crate::domain::user::User;
use crate::ports::{EventRepository, InvoiceRequest, PaymentGateway, PaymentRepository, UserRepository};

/// Where test-payment links point and the key that signs them.
#[derive(Debug, Clone)]
pub struct PaymentLinkSettings {
    pub app_url: String,
    pub app_key: String,
}

impl PaymentLinkSettings {
    /// `{app_url}/payment/{id}/process?token={secure_token}`.
    pub fn test_url(&self, payment: &Payment) -> String {
        format!(
            "{}/payment/{}/process?token={}",
            self.app_url.trim_end_matches('/'),
            payment.id,
            payment.secure_token(&self.app_key)
        )
    }
}

#[derive(Debug, Clone)]
pub struct CreatePaymentLinkCommand {
    pub event: Event,
    pub user: User,
    /// Merged into the payment metadata.
    pub additional: Map<String, Value>,
}

/// Request from the payment page: the event by slug, the buyer by id.
#[derive(Debug, Clone)]
pub struct CreatePaymentForSlugCommand {
    pub slug: String,
    pub user_id: UserId,
    pub return_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentLink {
    pub payment_id: PaymentId,
    pub payment_url: String,
}

pub struct CreatePaymentLinkHandler {
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    events: Arc<dyn EventRepository>,
    users: Arc<dyn UserRepository>,
    settings: PaymentLinkSettings,
}

impl CreatePaymentLinkHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        events: Arc<dyn EventRepository>,
        users: Arc<dyn UserRepository>,
        settings: PaymentLinkSettings,
    ) -> Self {
        Self {
            payments,
            gateway,
            events,
            users,
            settings,
        }
    }

    pub async fn handle_for_slug(
        &self,
        cmd: CreatePaymentForSlugCommand,
    ) -> Result<PaymentLink, PaymentError> {
        let event = self
            .events
            .find_by_slug(&cmd.slug)
            .await?
            .ok_or(PaymentError::EventNotFound)?;
        let user = self
            .users
            .find_by_id(cmd.user_id)
            .await?
            .ok_or(PaymentError::UserNotFound)?;

        let mut additional = Map::new();
        if let Some(url) = non_empty(cmd.return_url.as_deref()) {
            additional.insert(metadata_keys::RETURN_URL.into(), json!(url));
        }
        self.handle(CreatePaymentLinkCommand {
            event,
            user,
            additional,
        })
        .await
    }

    pub async fn handle(&self, cmd: CreatePaymentLinkCommand) -> Result<PaymentLink, PaymentError> {
        let CreatePaymentLinkCommand {
            event,
            user,
            additional,
        } = cmd;

        let amount = match event.price {
            Some(price) if event.requires_payment() => price,
            _ => return Err(PaymentError::EventNotPaid),
        };
        let system = if self.gateway.is_enabled() {
            PaymentSystem::Paykeeper
        } else {
            PaymentSystem::Test
        };

        let mut metadata = Map::new();
        metadata.insert(metadata_keys::EVENT_TITLE.into(), json!(event.title));
        metadata.insert(metadata_keys::EVENT_SLUG.into(), json!(event.slug));
        metadata.insert(metadata_keys::USER_EMAIL.into(), json!(user.email));
        metadata.insert(metadata_keys::USER_NAME.into(), json!(user.display_name()));
        metadata.extend(additional);

        let mut payment = self
            .payments
            .create(&NewPayment {
                user_id: user.id,
                event_id: event.id,
                amount,
                currency: DEFAULT_CURRENCY.to_string(),
                payment_system: system,
                description: event.payment_description(),
                metadata,
            })
            .await?;
        tracing::info!(payment_id = %payment.id, event_id = %event.id, user_id = %user.id, system = system.as_str(), "Payment created");

        let payment_url = match system {
            PaymentSystem::Paykeeper => self.invoice_url(&mut payment, &user).await?,
            _ => self.settings.test_url(&payment),
        };

        Ok(PaymentLink {
            payment_id: payment.id,
            payment_url,
        })
    }

    /// Issues a gateway invoice. The payment stays pending when the gateway fails.
    async fn invoice_url(&self, payment: &mut Payment, user: &User) -> Result<String, PaymentError> {
        let order_id = payment.order_reference();
        payment.order_id = Some(order_id.clone());
        self.payments.update(payment).await?;

        let client_phone = payment
            .metadata
            .get(metadata_keys::USER_DATA)
            .and_then(|data| data.get("phone"))
            .and_then(Value::as_str)
            .and_then(|p| non_empty(Some(p)))
            .or_else(|| non_empty(user.phone.as_deref()));

        let request = InvoiceRequest {
            amount: payment.amount,
            service_name: payment.description.clone().unwrap_or_default(),
            client_id: payment
                .metadata_str(metadata_keys::USER_NAME)
                .map(str::to_string)
                .unwrap_or_else(|| user.display_name()),
            client_email: user.email.clone(),
            client_phone,
            order_id,
        };

        match self.gateway.create_invoice(&request).await {
            Ok(invoice) => {
                payment.external_id = Some(invoice.invoice_id.clone());
                self.payments.update(payment).await?;
                tracing::info!(payment_id = %payment.id, invoice_id = %invoice.invoice_id, "PayKeeper invoice created");
                Ok(invoice.payment_url)
            }
            Err(e) => {
                tracing::warn!(payment_id = %payment.id, "PayKeeper invoice failed: {}", e);
                Err(PaymentError::Gateway(e.message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryEventRepository, InMemoryPayments, InMemoryUsers, StubPaymentGateway};
    use crate::domain::event::sample_event;
    use crate::domain::foundation::Money;
    use crate::domain::payment::PaymentStatus;
    use crate::domain::user::sample_user;

    fn paid_event() -> Event {
        let mut e = sample_event(3, "paid");
        e.is_paid = true;
        e.price = Some(Money::from_rubles(1500));
        e
    }

    fn settings() -> PaymentLinkSettings {
        PaymentLinkSettings {
            app_url: "https://portal.test/".into(),
            app_key: "key".into(),
        }
    }

    fn handler(payments: Arc<InMemoryPayments>, gateway: Arc<StubPaymentGateway>) -> CreatePaymentLinkHandler {
        CreatePaymentLinkHandler::new(
            payments,
            gateway,
            Arc::new(InMemoryEventRepository::new().with_event(paid_event())),
            Arc::new(InMemoryUsers::new().with_user(sample_user(7, "buyer@clinic.ru"))),
            settings(),
        )
    }

    fn command() -> CreatePaymentLinkCommand {
        CreatePaymentLinkCommand {
            event: paid_event(),
            user: sample_user(7, "buyer@clinic.ru"),
            additional: Map::new(),
        }
    }

    #[tokio::test]
    async fn gateway_invoice_is_stored_on_payment() {
        let payments = Arc::new(InMemoryPayments::new());
        let gateway = Arc::new(StubPaymentGateway::new());
        let link = handler(payments.clone(), gateway.clone()).handle(command()).await.unwrap();

        assert_eq!(link.payment_url, "https://pay.example.test/bill/inv-1/");
        let stored = payments.all().remove(0);
        assert_eq!(stored.status, PaymentStatus::Pending);
        assert_eq!(stored.payment_system, PaymentSystem::Paykeeper);
        assert_eq!(stored.order_id.as_deref(), Some("ORD000001"));
        assert_eq!(stored.external_id.as_deref(), Some("inv-1"));
        assert_eq!(stored.metadata_str("event_slug"), Some("paid"));

        let request = &gateway.requests()[0];
        assert_eq!(request.order_id, "ORD000001");
        assert_eq!(request.amount, Money::from_rubles(1500));
    }

    #[tokio::test]
    async fn disabled_gateway_gives_signed_test_link() {
        let payments = Arc::new(InMemoryPayments::new());
        let link = handler(payments.clone(), Arc::new(StubPaymentGateway::disabled()))
            .handle(command())
            .await
            .unwrap();

        let stored = payments.all().remove(0);
        assert_eq!(stored.payment_system, PaymentSystem::Test);
        assert_eq!(
            link.payment_url,
            format!("https://portal.test/payment/1/process?token={}", stored.secure_token("key"))
        );
    }

    #[tokio::test]
    async fn gateway_failure_gives_no_link() {
        let payments = Arc::new(InMemoryPayments::new());
        let err = handler(payments.clone(), Arc::new(StubPaymentGateway::failing()))
            .handle(command())
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Gateway(_)));

        let stored = payments.all().remove(0);
        assert_eq!(stored.payment_system, PaymentSystem::Paykeeper);
        assert_eq!(stored.status, PaymentStatus::Pending);
        assert_eq!(stored.external_id, None);
    }

    #[tokio::test]
    async fn free_event_is_rejected() {
        let mut cmd = command();
        cmd.event.is_paid = false;
        let err = handler(Arc::new(InMemoryPayments::new()), Arc::new(StubPaymentGateway::new()))
            .handle(cmd)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::EventNotPaid));
    }

    #[tokio::test]
    async fn phone_from_form_data_wins() {
        let gateway = Arc::new(StubPaymentGateway::new());
        let mut cmd = command();
        cmd.additional
            .insert("user_data".into(), json!({ "phone": "+7 900 111-22-33" }));
        handler(Arc::new(InMemoryPayments::new()), gateway.clone())
            .handle(cmd)
            .await
            .unwrap();
        assert_eq!(gateway.requests()[0].client_phone.as_deref(), Some("+7 900 111-22-33"));
    }

    #[tokio::test]
    async fn slug_lookup_stores_return_url() {
        let payments = Arc::new(InMemoryPayments::new());
        handler(payments.clone(), Arc::new(StubPaymentGateway::new()))
            .handle_for_slug(CreatePaymentForSlugCommand {
                slug: "paid".into(),
                user_id: UserId::new(7),
                return_url: Some("https://portal.test/events/paid".into()),
            })
            .await
            .unwrap();
        assert_eq!(
            payments.all()[0].metadata_str("return_url"),
            Some("https://portal.test/events/paid")
        );
    }
}
