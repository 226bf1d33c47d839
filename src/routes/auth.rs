use log::{info, warn};
use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::{context, Template};
use uuid::Uuid;
use validator::Validate;

use crate::guards::{end_session, start_session, SessionGuard, SESSION_COOKIE};
use crate::models::{CsrfForm, LoginForm, RegisterForm};
use crate::services::{ApiClient, AuthService, CsrfService, DashboardRegistry, SharedSessionStore};
use crate::utils::{first_error, FlashView, Notification};

/// Roles offered on the registration form, as the API names them.
const REGISTER_ROLES: [(&str, &str); 5] = [
    ("customer", "Customer"),
    ("delivery", "Delivery Person"),
    ("cse", "Customer Service Executive"),
    ("sm", "Subscription Manager"),
    ("manager", "Manager"),
];

/// --------------------
/// Login
/// --------------------
#[get("/login")]
pub fn login_page(
    session: Option<SessionGuard>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Redirect> {
    if let Some(current) = session {
        return Err(Redirect::to(current.session.role.dashboard_path()));
    }

    Ok(Template::render(
        "login",
        context! { flash: flash.map(FlashView::from) },
    ))
}

#[post("/login", data = "<form>")]
pub async fn login(
    form: Form<LoginForm>,
    api: &State<ApiClient>,
    store: &State<SharedSessionStore>,
    registry: &State<DashboardRegistry>,
    cookies: &CookieJar<'_>,
) -> Flash<Redirect> {
    if let Err(errors) = form.validate() {
        return Notification::warning(first_error(&errors, "Please enter username and password"))
            .redirect("/login");
    }

    let session = match AuthService::login(api, &form).await {
        Ok(session) => session,
        Err(err) => return Notification::error(err.to_string()).redirect("/login"),
    };

    // A new login in the same browser replaces whatever session it held.
    if let Some(previous) = cookies
        .get_private(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
    {
        end_session(cookies, store, registry, &previous);
    }

    let dashboard = session.role.dashboard_path();
    let welcome = format!("Welcome, {}", session.username);
    start_session(cookies, store, session);

    Notification::success(welcome).redirect(dashboard)
}

/// --------------------
/// Register
/// --------------------
#[get("/register")]
pub fn register_page(flash: Option<FlashMessage<'_>>) -> Template {
    Template::render(
        "register",
        context! {
            flash: flash.map(FlashView::from),
            roles: REGISTER_ROLES,
        },
    )
}

#[post("/register", data = "<form>")]
pub async fn register(form: Form<RegisterForm>, api: &State<ApiClient>) -> Flash<Redirect> {
    if let Err(errors) = form.validate() {
        return Notification::warning(first_error(&errors, "Registration failed"))
            .redirect("/register");
    }

    match AuthService::register(api, &form).await {
        Ok(_) => Notification::success("Registration successful! Please log in.").redirect("/login"),
        Err(err) => Notification::error(err.to_string()).redirect("/register"),
    }
}

/// --------------------
/// Logout
/// --------------------
/// Purely local: the API keeps no server-side session to invalidate. A bad
/// form token is logged but never keeps the session alive.
#[post("/logout", data = "<form>")]
pub fn logout(
    session: Option<SessionGuard>,
    form: Form<CsrfForm>,
    csrf: &State<CsrfService>,
    store: &State<SharedSessionStore>,
    registry: &State<DashboardRegistry>,
    cookies: &CookieJar<'_>,
) -> Flash<Redirect> {
    let Some(current) = session else {
        cookies.remove_private(SESSION_COOKIE);
        return Notification::info("You are logged out").redirect("/login");
    };

    if !csrf.verify(&current.id, &form.csrf_token) {
        warn!("logout of {} without a valid form token", current.session.username);
    }

    end_session(cookies, store, registry, &current.id);
    info!("{} logged out", current.session.username);

    Notification::success("You are logged out").redirect("/login")
}
