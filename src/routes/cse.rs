use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket_dyn_templates::Template;

use crate::guards::{role, Dashboard};
use crate::models::{ReplyForm, StatusForm};

#[get("/cse")]
pub async fn dashboard(
    dashboard: Dashboard<'_, role::Cse>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Flash<Redirect>> {
    dashboard.render("cse", flash).await
}

#[post("/cse/complaints/<id>/status", data = "<form>")]
pub async fn set_status(
    id: i64,
    dashboard: Dashboard<'_, role::Cse>,
    form: Form<StatusForm>,
) -> Flash<Redirect> {
    let form = form.into_inner();
    let csrf_token = form.csrf_token.clone();
    dashboard.perform(&csrf_token, form.action(id)).await
}

#[post("/cse/complaints/<id>/reply", data = "<form>")]
pub async fn reply(
    id: i64,
    dashboard: Dashboard<'_, role::Cse>,
    form: Form<ReplyForm>,
) -> Flash<Redirect> {
    let form = form.into_inner();
    let csrf_token = form.csrf_token.clone();
    dashboard.perform(&csrf_token, form.action(id)).await
}
