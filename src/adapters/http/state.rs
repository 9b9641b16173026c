//! Shared application state for the HTTP adapters.

use std::sync::Arc;

use crate::application::handlers::access::{ListRegistrationsHandler, ManageAccessGrantsHandler};
use crate::application::handlers::catalog::{
    CategoryCatalog, LibraryCatalog, PartnerCatalog, SpeakerCatalog,
};
use crate::application::handlers::events::{
    GetEventHandler, ListEventsHandler, ManageEventsHandler, ViewEventHandler,
};
use crate::application::handlers::notifications::ManageNotificationsHandler;
use crate::application::handlers::payment::{
    CancelPaymentHandler, CheckPaymentStatusHandler, CreatePaymentLinkHandler,
    GrantEventAccessHandler, PaymentLinkSettings, ProcessCallbackHandler,
    ProcessTestPaymentHandler,
};
use crate::application::handlers::registration::{CheckUserEmailHandler, RegisterForEventHandler};
use crate::application::handlers::users::{
    GetProfileHandler, LoginHandler, ManageProfileHandler, ManageUsersHandler, MyEventsHandler,
    SignUpHandler,
};
use crate::application::handlers::webhook::HandlePayKeeperNotificationHandler;
use crate::application::services::{CrmSync, EventMailer};
use crate::domain::foundation::LocalOffset;
use crate::domain::webhook::WebhookVerifier;
use crate::ports::{
    AccessGrantRepository, CategoryRepository, EventRepository, LibraryRepository,
    NotificationRepository, PartnerRepository, PasswordHasher, PaymentGateway, PaymentRepository,
    RegistrationListing, SpeakerRepository, TokenIssuer, UserRepository,
};

/// Repositories, integrations and settings shared by every request.
///
/// Cloned per request; handlers are built on demand from the Arc'd ports.
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<dyn EventRepository>,
    pub users: Arc<dyn UserRepository>,
    pub grants: Arc<dyn AccessGrantRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub registrations: Arc<dyn RegistrationListing>,
    pub categories: Arc<CategoryRepository>,
    pub speakers: Arc<SpeakerRepository>,
    pub partners: Arc<PartnerRepository>,
    pub library: Arc<LibraryRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub crm: Arc<CrmSync>,
    pub mailer: Arc<EventMailer>,
    pub webhook_verifier: WebhookVerifier,
    pub payment_links: PaymentLinkSettings,
    pub offset: LocalOffset,
}

impl AppState {
    // Events

    pub fn list_events_handler(&self) -> ListEventsHandler {
        ListEventsHandler::new(self.events.clone(), self.offset)
    }

    pub fn get_event_handler(&self) -> GetEventHandler {
        GetEventHandler::new(self.events.clone(), self.grants.clone(), self.offset)
    }

    pub fn view_event_handler(&self) -> ViewEventHandler {
        ViewEventHandler::new(self.events.clone(), self.grants.clone(), self.offset)
    }

    pub fn manage_events_handler(&self) -> ManageEventsHandler {
        ManageEventsHandler::new(self.events.clone())
    }

    // Registration

    pub fn register_handler(&self) -> RegisterForEventHandler {
        RegisterForEventHandler::new(
            self.events.clone(),
            self.users.clone(),
            self.grants.clone(),
            self.hasher.clone(),
            self.crm.clone(),
            self.mailer.clone(),
            Arc::new(self.create_payment_link_handler()),
            self.offset,
        )
    }

    pub fn check_email_handler(&self) -> CheckUserEmailHandler {
        CheckUserEmailHandler::new(self.users.clone())
    }

    // Payments

    pub fn create_payment_link_handler(&self) -> CreatePaymentLinkHandler {
        CreatePaymentLinkHandler::new(
            self.payments.clone(),
            self.gateway.clone(),
            self.events.clone(),
            self.users.clone(),
            self.payment_links.clone(),
        )
    }

    pub fn payment_status_handler(&self) -> CheckPaymentStatusHandler {
        CheckPaymentStatusHandler::new(
            self.payments.clone(),
            self.gateway.clone(),
            self.payment_links.app_key.clone(),
        )
    }

    pub fn cancel_payment_handler(&self) -> CancelPaymentHandler {
        CancelPaymentHandler::new(self.payments.clone(), self.payment_links.app_key.clone())
    }

    pub fn grant_access_handler(&self) -> GrantEventAccessHandler {
        GrantEventAccessHandler::new(
            self.events.clone(),
            self.users.clone(),
            self.grants.clone(),
            self.mailer.clone(),
        )
    }

    pub fn process_callback_handler(&self) -> ProcessCallbackHandler {
        ProcessCallbackHandler::new(self.payments.clone(), Arc::new(self.grant_access_handler()))
    }

    pub fn process_test_payment_handler(&self) -> ProcessTestPaymentHandler {
        ProcessTestPaymentHandler::new(
            self.payments.clone(),
            Arc::new(self.process_callback_handler()),
            self.payment_links.app_key.clone(),
        )
    }

    pub fn paykeeper_webhook_handler(&self) -> HandlePayKeeperNotificationHandler {
        HandlePayKeeperNotificationHandler::new(
            self.webhook_verifier.clone(),
            self.payments.clone(),
            self.users.clone(),
            self.notifications.clone(),
            Arc::new(self.grant_access_handler()),
            self.crm.clone(),
            self.mailer.clone(),
        )
    }

    // Users

    pub fn login_handler(&self) -> LoginHandler {
        LoginHandler::new(self.users.clone(), self.hasher.clone(), self.tokens.clone())
    }

    pub fn sign_up_handler(&self) -> SignUpHandler {
        SignUpHandler::new(self.users.clone(), self.hasher.clone(), self.tokens.clone())
    }

    pub fn profile_handler(&self) -> GetProfileHandler {
        GetProfileHandler::new(self.users.clone(), self.grants.clone(), self.events.clone())
    }

    pub fn manage_profile_handler(&self) -> ManageProfileHandler {
        ManageProfileHandler::new(self.users.clone(), self.hasher.clone())
    }

    pub fn my_events_handler(&self) -> MyEventsHandler {
        MyEventsHandler::new(self.grants.clone(), self.events.clone(), self.offset)
    }

    pub fn manage_users_handler(&self) -> ManageUsersHandler {
        ManageUsersHandler::new(
            self.users.clone(),
            self.grants.clone(),
            self.events.clone(),
            self.hasher.clone(),
        )
    }

    pub fn access_grants_handler(&self) -> ManageAccessGrantsHandler {
        ManageAccessGrantsHandler::new(self.users.clone(), self.events.clone(), self.grants.clone())
    }

    pub fn list_registrations_handler(&self) -> ListRegistrationsHandler {
        ListRegistrationsHandler::new(self.registrations.clone())
    }

    pub fn notifications_handler(&self) -> ManageNotificationsHandler {
        ManageNotificationsHandler::new(self.notifications.clone())
    }

    // Catalog

    pub fn category_catalog(&self) -> CategoryCatalog {
        CategoryCatalog::new(self.categories.clone())
    }

    pub fn speaker_catalog(&self) -> SpeakerCatalog {
        SpeakerCatalog::new(self.speakers.clone())
    }

    pub fn partner_catalog(&self) -> PartnerCatalog {
        PartnerCatalog::new(self.partners.clone())
    }

    pub fn library_catalog(&self) -> LibraryCatalog {
        LibraryCatalog::new(self.library.clone())
    }
}
