use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket_dyn_templates::Template;

use crate::guards::{role, Dashboard};
use crate::models::CsrfForm;
use crate::services::Action;

#[get("/delivery")]
pub async fn dashboard(
    dashboard: Dashboard<'_, role::Delivery>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Flash<Redirect>> {
    dashboard.render("delivery", flash).await
}

#[post("/delivery/stops/<id>/delivered", data = "<form>")]
pub async fn mark_delivered(
    id: i64,
    dashboard: Dashboard<'_, role::Delivery>,
    form: Form<CsrfForm>,
) -> Flash<Redirect> {
    dashboard
        .perform(&form.csrf_token, Ok(Action::MarkDelivered { stop_id: id }))
        .await
}
