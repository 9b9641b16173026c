//! RegisterForEventHandler - Command handler behind the event page form.
//!
//! An authenticated visitor using the fast path (or any visitor of an
//! on-demand recording) skips the profile form. Guests either name an
//! existing account by email or get a new account with a generated password.
//! Paid events end in a payment link instead of access.

use serde_json::{json, Map};
use std::sync::Arc;

use crate::application::handlers::payment::{CreatePaymentLinkCommand, CreatePaymentLinkHandler};
use crate::application::services::{CrmSync, EventMailer};
use crate::domain::access::AccessGrant;
use crate::domain::event::Event;
use crate::domain::foundation::{non_empty, LocalOffset, RoleSet, Role, Timestamp, UserId};
use crate::domain::payment::metadata_keys;
use crate::domain::registration::{
    GuestProfile, GuestRegistration, RegistrationError, RegistrationForm, RegistrationOutcome,
    MSG_ALREADY_REGISTERED, MSG_FAST_SUCCESS, MSG_GUEST_SUCCESS,
};
use crate::domain::user::{generate_password, NewUser, User};
use crate::ports::{AccessGrantRepository, EventRepository, PasswordHasher, UserRepository};

#[derive(Debug, Clone)]
pub struct RegisterForEventCommand {
    pub slug: String,
    pub actor: Option<UserId>,
    pub form: RegistrationForm,
    /// Where the payment page sends the buyer back to.
    pub return_url: Option<String>,
}

pub struct RegisterForEventHandler {
    events: Arc<dyn EventRepository>,
    users: Arc<dyn UserRepository>,
    grants: Arc<dyn AccessGrantRepository>,
    hasher: Arc<dyn PasswordHasher>,
    crm: Arc<CrmSync>,
    mailer: Arc<EventMailer>,
    payment_links: Arc<CreatePaymentLinkHandler>,
    offset: LocalOffset,
}

/// Account the registration is made for, plus what a new account needs mailed.
struct Registrant {
    user: User,
    password: Option<String>,
    is_new: bool,
}

impl RegisterForEventHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        events: Arc<dyn EventRepository>,
        users: Arc<dyn UserRepository>,
        grants: Arc<dyn AccessGrantRepository>,
        hasher: Arc<dyn PasswordHasher>,
        crm: Arc<CrmSync>,
        mailer: Arc<EventMailer>,
        payment_links: Arc<CreatePaymentLinkHandler>,
        offset: LocalOffset,
    ) -> Self {
        Self {
            events,
            users,
            grants,
            hasher,
            crm,
            mailer,
            payment_links,
            offset,
        }
    }

    pub async fn handle(&self, cmd: RegisterForEventCommand) -> Result<RegistrationOutcome, RegistrationError> {
        let event = self
            .events
            .find_by_slug(&cmd.slug)
            .await?
            .ok_or(RegistrationError::EventNotFound)?;
        if let Some(block) = event.registration_block(self.offset.today()) {
            tracing::info!(event_id = %event.id, reason = %block, "Registration blocked");
            return Err(RegistrationError::Blocked(block));
        }

        match cmd.actor {
            Some(actor) if cmd.form.fast || event.is_on_demand => {
                self.register_actor(&event, actor, &cmd).await
            }
            _ => self.register_guest(&event, &cmd).await,
        }
    }

    async fn register_actor(
        &self,
        event: &Event,
        actor: UserId,
        cmd: &RegisterForEventCommand,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        let user = self
            .users
            .find_by_id(actor)
            .await?
            .ok_or(RegistrationError::UnknownEmail)?;
        if self.grants.has_access(event.id, user.id, Timestamp::now()).await? {
            return Ok(RegistrationOutcome::registered(MSG_ALREADY_REGISTERED));
        }

        self.crm.sync_registration(event, &user, &cmd.form.crm_payload()).await;

        let registrant = Registrant {
            user,
            password: None,
            is_new: false,
        };
        if event.requires_payment() && !event.is_on_demand {
            return self.start_payment(event, &registrant, cmd).await;
        }
        self.grant_free(event, &registrant).await?;
        Ok(RegistrationOutcome::registered(MSG_FAST_SUCCESS))
    }

    async fn register_guest(
        &self,
        event: &Event,
        cmd: &RegisterForEventCommand,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        let registrant = match cmd.form.validate_guest()? {
            GuestRegistration::Existing { email } => Registrant {
                user: self
                    .users
                    .find_by_email(&email)
                    .await?
                    .ok_or(RegistrationError::UnknownEmail)?,
                password: None,
                is_new: false,
            },
            GuestRegistration::New(profile) => self.create_account(profile).await?,
        };

        if self
            .grants
            .has_access(event.id, registrant.user.id, Timestamp::now())
            .await?
        {
            return Ok(RegistrationOutcome::registered(MSG_ALREADY_REGISTERED));
        }

        self.crm
            .sync_registration(event, &registrant.user, &cmd.form.crm_payload())
            .await;

        if event.requires_payment() && !event.is_on_demand {
            return self.start_payment(event, &registrant, cmd).await;
        }
        self.grant_free(event, &registrant).await?;
        Ok(RegistrationOutcome::registered(MSG_GUEST_SUCCESS))
    }

    async fn create_account(&self, profile: GuestProfile) -> Result<Registrant, RegistrationError> {
        if self.users.find_by_email(&profile.email).await?.is_some() {
            return Err(RegistrationError::UserExists);
        }

        let password = generate_password();
        let password_hash = self.hasher.hash(&password)?;
        let user = self
            .users
            .create(&NewUser {
                first_name: profile.first_name,
                last_name: profile.last_name,
                middle_name: profile.middle_name,
                email: profile.email,
                phone: Some(profile.phone),
                company: None,
                position: None,
                specialization: profile.specialization,
                city: Some(profile.city),
                password_hash,
                email_verified_at: Some(Timestamp::now()),
                roles: RoleSet::new([Role::User]),
            })
            .await?;
        tracing::info!(user_id = %user.id, "Account created during registration");

        Ok(Registrant {
            user,
            password: Some(password),
            is_new: true,
        })
    }

    async fn grant_free(&self, event: &Event, registrant: &Registrant) -> Result<(), RegistrationError> {
        let grant = AccessGrant::free(event.id, registrant.user.id, Timestamp::now());
        if self.grants.attach(&grant).await? {
            tracing::info!(event_id = %event.id, user_id = %registrant.user.id, "Free access granted");
        }
        self.mailer
            .send_registration(
                event,
                &registrant.user,
                registrant.password.as_deref().unwrap_or_default(),
                registrant.is_new,
            )
            .await;
        Ok(())
    }

    async fn start_payment(
        &self,
        event: &Event,
        registrant: &Registrant,
        cmd: &RegisterForEventCommand,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        let mut additional = Map::new();
        if let Some(url) = non_empty(cmd.return_url.as_deref()) {
            additional.insert(metadata_keys::RETURN_URL.into(), json!(url));
        }
        additional.insert(metadata_keys::USER_DATA.into(), cmd.form.user_data());
        if let Some(password) = &registrant.password {
            additional.insert(metadata_keys::GENERATED_PASSWORD.into(), json!(password));
        }
        additional.insert(metadata_keys::IS_NEW_USER.into(), json!(registrant.is_new));

        let link = self
            .payment_links
            .handle(CreatePaymentLinkCommand {
                event: event.clone(),
                user: registrant.user.clone(),
                additional,
            })
            .await?;
        Ok(RegistrationOutcome::PaymentRequired {
            payment_id: link.payment_id,
            payment_url: link.payment_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::Argon2PasswordHasher;
    use crate::adapters::memory::{
        InMemoryAccessGrants, InMemoryEventRepository, InMemoryPayments, InMemoryUsers,
        RecordingCrm, RecordingMailer, StubPaymentGateway,
    };
    use crate::application::handlers::payment::PaymentLinkSettings;
    use crate::application::services::MailSettings;
    use crate::domain::crm::CrmSettings;
    use crate::domain::event::{sample_event, RegistrationBlock};
    use crate::domain::foundation::{EventId, Money};
    use crate::domain::user::sample_user;

    struct Fixture {
        users: Arc<InMemoryUsers>,
        grants: Arc<InMemoryAccessGrants>,
        payments: Arc<InMemoryPayments>,
        crm: Arc<RecordingCrm>,
        mailer: Arc<RecordingMailer>,
        handler: RegisterForEventHandler,
    }

    fn paid_event(id: i64, slug: &str) -> Event {
        let mut event = sample_event(id, slug);
        event.is_paid = true;
        event.price = Some(Money::from_rubles(1500));
        event
    }

    fn fixture(events: Vec<Event>) -> Fixture {
        let repo = events
            .into_iter()
            .fold(InMemoryEventRepository::new(), |repo, e| repo.with_event(e));
        let events: Arc<InMemoryEventRepository> = Arc::new(repo);
        let users = Arc::new(InMemoryUsers::new().with_user(sample_user(7, "member@clinic.ru")));
        let grants = Arc::new(InMemoryAccessGrants::new());
        let payments = Arc::new(InMemoryPayments::new());
        let crm = Arc::new(RecordingCrm::new());
        let mailer = Arc::new(RecordingMailer::new());
        let event_mailer = Arc::new(EventMailer::new(
            mailer.clone(),
            MailSettings {
                registration_draft: Some("55".into()),
                ..Default::default()
            },
        ));
        let payment_links = Arc::new(CreatePaymentLinkHandler::new(
            payments.clone(),
            Arc::new(StubPaymentGateway::disabled()),
            events.clone(),
            users.clone(),
            PaymentLinkSettings {
                app_url: "https://portal.test".into(),
                app_key: "key".into(),
            },
        ));
        let handler = RegisterForEventHandler::new(
            events,
            users.clone(),
            grants.clone(),
            Arc::new(Argon2PasswordHasher::fast()),
            Arc::new(CrmSync::new(crm.clone(), CrmSettings::default(), LocalOffset::moscow())),
            event_mailer,
            payment_links,
            LocalOffset::moscow(),
        );
        Fixture {
            users,
            grants,
            payments,
            crm,
            mailer,
            handler,
        }
    }

    fn command(slug: &str, actor: Option<i64>, form: RegistrationForm) -> RegisterForEventCommand {
        RegisterForEventCommand {
            slug: slug.to_string(),
            actor: actor.map(UserId::new),
            form,
            return_url: Some("https://portal.test/events/x".into()),
        }
    }

    fn new_guest(email: &str) -> RegistrationForm {
        RegistrationForm {
            first_name: Some("Иван".into()),
            last_name: Some("Сидоров".into()),
            email: Some(email.into()),
            phone: Some("+79991112233".into()),
            city: Some("Казань".into()),
            ..Default::default()
        }
    }

    fn fast() -> RegistrationForm {
        RegistrationForm {
            fast: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn fast_path_grants_free_access() {
        let f = fixture(vec![sample_event(1, "free")]);
        let outcome = f.handler.handle(command("free", Some(7), fast())).await.unwrap();

        assert_eq!(outcome, RegistrationOutcome::registered(MSG_FAST_SUCCESS));
        assert_eq!(f.grants.all().len(), 1);
        assert!(f.crm.methods().contains(&"crm.contact.add"));
        assert_eq!(f.mailer.issues().len(), 1);
    }

    #[tokio::test]
    async fn fast_path_reports_existing_access() {
        let f = fixture(vec![sample_event(1, "free")]);
        f.handler.handle(command("free", Some(7), fast())).await.unwrap();
        let again = f.handler.handle(command("free", Some(7), fast())).await.unwrap();

        assert_eq!(again, RegistrationOutcome::registered(MSG_ALREADY_REGISTERED));
        assert_eq!(f.mailer.issues().len(), 1);
    }

    #[tokio::test]
    async fn fast_path_on_paid_event_returns_payment_link() {
        let f = fixture(vec![paid_event(2, "paid")]);
        let outcome = f.handler.handle(command("paid", Some(7), fast())).await.unwrap();

        match outcome {
            RegistrationOutcome::PaymentRequired { payment_url, .. } => {
                assert!(payment_url.starts_with("https://portal.test/payment/"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(f.grants.all().is_empty());
        let payment = f.payments.all().remove(0);
        assert!(!payment.is_new_user());
        assert_eq!(
            payment.metadata_str(metadata_keys::RETURN_URL),
            Some("https://portal.test/events/x")
        );
    }

    #[tokio::test]
    async fn on_demand_paid_event_is_free() {
        let mut event = paid_event(2, "recording");
        event.is_on_demand = true;
        let f = fixture(vec![event]);
        let outcome = f.handler.handle(command("recording", Some(7), RegistrationForm::default())).await.unwrap();
        assert_eq!(outcome, RegistrationOutcome::registered(MSG_FAST_SUCCESS));
        assert!(f.payments.all().is_empty());
    }

    #[tokio::test]
    async fn blocked_event_is_rejected() {
        let mut event = sample_event(1, "closed");
        event.registration_enabled = false;
        let f = fixture(vec![event]);
        let err = f.handler.handle(command("closed", Some(7), fast())).await.unwrap_err();
        assert!(matches!(err, RegistrationError::Blocked(RegistrationBlock::RegistrationDisabled)));
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let f = fixture(vec![]);
        let err = f.handler.handle(command("missing", None, fast())).await.unwrap_err();
        assert!(matches!(err, RegistrationError::EventNotFound));
    }

    #[tokio::test]
    async fn new_guest_gets_account_and_password_mail() {
        let f = fixture(vec![sample_event(1, "free")]);
        let outcome = f
            .handler
            .handle(command("free", None, new_guest("Ivan@Clinic.ru")))
            .await
            .unwrap();

        assert_eq!(outcome, RegistrationOutcome::registered(MSG_GUEST_SUCCESS));
        let user = f.users.all().into_iter().find(|u| u.email == "ivan@clinic.ru").unwrap();
        assert!(user.email_verified_at.is_some());
        assert!(user.password_hash.starts_with("$argon2id$"));
        let issue = f.mailer.issues().remove(0);
        assert_eq!(issue.email, "ivan@clinic.ru");
        assert!(issue.extra["password"].as_str().map_or(false, |p| p.len() == 12));
    }

    #[tokio::test]
    async fn new_guest_with_taken_email_is_rejected() {
        let f = fixture(vec![sample_event(1, "free")]);
        let err = f
            .handler
            .handle(command("free", None, new_guest("member@clinic.ru")))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::UserExists));
    }

    #[tokio::test]
    async fn existing_guest_must_have_account() {
        let f = fixture(vec![sample_event(1, "free")]);
        let form = RegistrationForm {
            existing_user: true,
            email: Some("ghost@clinic.ru".into()),
            ..Default::default()
        };
        let err = f.handler.handle(command("free", None, form)).await.unwrap_err();
        assert!(matches!(err, RegistrationError::UnknownEmail));
    }

    #[tokio::test]
    async fn existing_guest_is_registered() {
        let f = fixture(vec![sample_event(1, "free")]);
        let form = RegistrationForm {
            existing_user: true,
            email: Some("Member@Clinic.ru".into()),
            ..Default::default()
        };
        f.handler.handle(command("free", None, form)).await.unwrap();
        let grant = f.grants.all().remove(0);
        assert_eq!(grant.event_id, EventId::new(1));
        assert_eq!(grant.user_id, UserId::new(7));
    }

    #[tokio::test]
    async fn new_guest_on_paid_event_carries_password_in_payment() {
        let f = fixture(vec![paid_event(2, "paid")]);
        f.handler
            .handle(command("paid", None, new_guest("buyer@clinic.ru")))
            .await
            .unwrap();

        let payment = f.payments.all().remove(0);
        assert!(payment.is_new_user());
        assert_eq!(payment.generated_password().map(str::len), Some(12));
        assert_eq!(
            payment.metadata[metadata_keys::USER_DATA]["city"],
            serde_json::json!("Казань")
        );
        assert!(f.mailer.issues().is_empty());
    }
}
