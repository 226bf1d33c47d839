use rocket::request::FlashMessage;
use rocket::State;
use rocket_dyn_templates::{context, Template};

use crate::guards::SessionGuard;
use crate::services::CsrfService;
use crate::utils::FlashView;

/// Landing page. Also where role mismatches and unrecognized roles end up.
#[get("/")]
pub fn index(
    session: Option<SessionGuard>,
    csrf: &State<CsrfService>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let csrf_token = session.as_ref().map(|current| csrf.issue(&current.id));

    Template::render(
        "home",
        context! {
            session: session.map(|current| current.session.view()),
            csrf_token,
            flash: flash.map(FlashView::from),
        },
    )
}
