use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::request::{self, FlashMessage, FromRequest, Outcome, Request};
use rocket::response::{Flash, Redirect};
use rocket_dyn_templates::{context, Template};
use uuid::Uuid;

use crate::models::{ActionForm, Complaint, Role, Session};
use crate::services::{
    Action, ActionError, ApiClient, CsrfService, DashboardController, DashboardRegistry,
    SharedSessionStore,
};
use crate::utils::{FlashView, Notification};

pub const SESSION_COOKIE: &str = "samaachar_sid";

/// Outcome of checking a session against a role-bound route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// No usable session: go log in.
    Login,
    /// Logged in as someone else: go home.
    Home,
}

pub fn check_access(session: Option<&Session>, required: Role, now: DateTime<Utc>) -> Access {
    match session {
        Some(session) if session.is_expired(now) => Access::Login,
        Some(session) if session.role == required => Access::Granted,
        Some(_) => Access::Home,
        None => Access::Login,
    }
}

/// The cookie's session id and whatever the store holds for it.
fn stored_session(req: &Request<'_>, store: &SharedSessionStore) -> Option<(Uuid, Session)> {
    let id = req
        .cookies()
        .get_private(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())?;

    store.get(&id).map(|session| (id, session))
}

/// A session the guards found expired: forget it like a logout would.
fn forget(req: &Request<'_>, store: &SharedSessionStore, id: &Uuid) {
    match req.rocket().state::<DashboardRegistry>() {
        Some(registry) => {
            end_session(req.cookies(), store, registry, id);
        }
        None => {
            store.clear(id);
        }
    }
}

/// Begin a session: store it and hand the browser its id.
pub fn start_session(cookies: &CookieJar<'_>, store: &SharedSessionStore, session: Session) -> Uuid {
    let id = Uuid::new_v4();
    store.set(id, session);
    cookies.add_private(
        Cookie::build((SESSION_COOKIE, id.to_string()))
            .http_only(true)
            .same_site(SameSite::Lax),
    );
    id
}

/// Drop every trace of a session at once.
pub fn end_session(
    cookies: &CookieJar<'_>,
    store: &SharedSessionStore,
    registry: &DashboardRegistry,
    id: &Uuid,
) -> Option<Session> {
    registry.evict(id);
    cookies.remove_private(SESSION_COOKIE);
    store.clear(id)
}

/// Any logged-in user whose token has not expired.
pub struct SessionGuard {
    pub id: Uuid,
    pub session: Session,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SessionGuard {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(store) = req.rocket().state::<SharedSessionStore>() else {
            return Outcome::Error((Status::InternalServerError, ()));
        };

        match stored_session(req, store) {
            Some((id, session)) if !session.is_expired(Utc::now()) => {
                Outcome::Success(SessionGuard { id, session })
            }
            Some((id, session)) => {
                info!("session of {} expired", session.username);
                forget(req, store, &id);
                Outcome::Error((Status::Unauthorized, ()))
            }
            None => Outcome::Error((Status::Unauthorized, ())),
        }
    }
}

/// Marker for the role a route requires.
pub trait RequiredRole: Send + Sync + 'static {
    const ROLE: Role;
}

pub mod role {
    use super::RequiredRole;
    use crate::models::Role;

    pub struct Manager;
    pub struct Customer;
    pub struct Delivery;
    pub struct Cse;
    pub struct SubscriptionManager;

    impl RequiredRole for Manager {
        const ROLE: Role = Role::Manager;
    }

    impl RequiredRole for Customer {
        const ROLE: Role = Role::Customer;
    }

    impl RequiredRole for Delivery {
        const ROLE: Role = Role::Delivery;
    }

    impl RequiredRole for Cse {
        const ROLE: Role = Role::Cse;
    }

    impl RequiredRole for SubscriptionManager {
        const ROLE: Role = Role::SubscriptionManager;
    }
}

/// A logged-in user whose role is `R`. Re-checked on every request.
///
/// Fails with 401 when there is no usable session and 403 when the role is
/// wrong; the catchers turn those into redirects to `/login` and `/`.
pub struct RoleGuard<R: RequiredRole> {
    pub id: Uuid,
    pub session: Session,
    _role: PhantomData<R>,
}

#[rocket::async_trait]
impl<'r, R: RequiredRole> FromRequest<'r> for RoleGuard<R> {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(store) = req.rocket().state::<SharedSessionStore>() else {
            return Outcome::Error((Status::InternalServerError, ()));
        };

        let current = stored_session(req, store);
        match check_access(current.as_ref().map(|(_, s)| s), R::ROLE, Utc::now()) {
            Access::Granted => match current {
                Some((id, session)) => Outcome::Success(RoleGuard {
                    id,
                    session,
                    _role: PhantomData,
                }),
                None => Outcome::Error((Status::Unauthorized, ())),
            },
            Access::Home => Outcome::Error((Status::Forbidden, ())),
            Access::Login => {
                if let Some((id, _)) = current {
                    forget(req, store, &id);
                }
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}

/// Everything a dashboard route needs: the checked session, its controller
/// and the form token.
pub struct Dashboard<'r, R: RequiredRole> {
    pub id: Uuid,
    pub session: Session,
    pub controller: Arc<DashboardController>,
    pub csrf_token: String,
    csrf: &'r CsrfService,
    store: &'r SharedSessionStore,
    registry: &'r DashboardRegistry,
    cookies: &'r CookieJar<'r>,
    _role: PhantomData<R>,
}

#[rocket::async_trait]
impl<'r, R: RequiredRole> FromRequest<'r> for Dashboard<'r, R> {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let guard = match req.guard::<RoleGuard<R>>().await {
            Outcome::Success(guard) => guard,
            Outcome::Error(e) => return Outcome::Error(e),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let rocket = req.rocket();
        let (Some(api), Some(csrf), Some(store), Some(registry)) = (
            rocket.state::<ApiClient>(),
            rocket.state::<CsrfService>(),
            rocket.state::<SharedSessionStore>(),
            rocket.state::<DashboardRegistry>(),
        ) else {
            return Outcome::Error((Status::InternalServerError, ()));
        };

        Outcome::Success(Dashboard {
            controller: registry.controller_for(guard.id, &guard.session, api),
            csrf_token: csrf.issue(&guard.id),
            id: guard.id,
            session: guard.session,
            csrf,
            store,
            registry,
            cookies: req.cookies(),
            _role: PhantomData,
        })
    }
}

impl<'r, R: RequiredRole> Dashboard<'r, R> {
    pub fn path(&self) -> &'static str {
        R::ROLE.dashboard_path()
    }

    /// The API refused the token: forget the session and send the user to
    /// log in again.
    pub fn expire(self) -> Flash<Redirect> {
        info!("session of {} expired, logging out", self.session.username);
        end_session(self.cookies, self.store, self.registry, &self.id);
        Notification::error("Session expired. Login again.").redirect("/login")
    }

    /// Render `template` with the current dashboard state.
    pub async fn render(
        self,
        template: &'static str,
        flash: Option<FlashMessage<'_>>,
    ) -> Result<Template, Flash<Redirect>> {
        let state = match self.controller.view().await {
            Ok(state) => state,
            Err(_) => return Err(self.expire()),
        };

        let flash = flash
            .map(FlashView::from)
            .or_else(|| state.load_notice().map(FlashView::from));
        let complaints: Vec<_> = state.complaints.iter().map(Complaint::row).collect();

        Ok(Template::render(
            template,
            context! {
                session: self.session.view(),
                csrf_token: &self.csrf_token,
                flash,
                route: state.route_summary(),
                pending_requests: state.pending_requests(),
                complaints,
                state: &*state,
            },
        ))
    }

    /// Check the form token, then run the action and come back to the
    /// dashboard with its notification.
    pub async fn perform(
        self,
        csrf_token: &str,
        action: Result<Action, String>,
    ) -> Flash<Redirect> {
        let back = self.path();

        if !self.csrf.verify(&self.id, csrf_token) {
            return Notification::error("Your form has expired. Please try again.").redirect(back);
        }

        let action = match action {
            Ok(action) => action,
            Err(message) => return Notification::warning(message).redirect(back),
        };

        match self.controller.mutate(action).await {
            Ok(ack) => ack.notification.redirect(back),
            Err(ActionError::Unauthorized) => self.expire(),
            Err(err) => err.notification().redirect(back),
        }
    }

    pub async fn submit<F: ActionForm>(self, form: F) -> Flash<Redirect> {
        let csrf_token = form.csrf_token().to_string();
        self.perform(&csrf_token, form.into_action()).await
    }
}
