use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket_dyn_templates::Template;

use crate::guards::{role, Dashboard};
use crate::models::{ChangeForm, ComplaintForm, PauseForm, SubscribeForm};

type CustomerDashboard<'r> = Dashboard<'r, role::Customer>;

#[get("/customer")]
pub async fn dashboard(
    dashboard: CustomerDashboard<'_>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Flash<Redirect>> {
    dashboard.render("customer", flash).await
}

#[post("/customer/subscribe", data = "<form>")]
pub async fn subscribe(
    dashboard: CustomerDashboard<'_>,
    form: Form<SubscribeForm>,
) -> Flash<Redirect> {
    dashboard.submit(form.into_inner()).await
}

#[post("/customer/change-request", data = "<form>")]
pub async fn change_request(
    dashboard: CustomerDashboard<'_>,
    form: Form<ChangeForm>,
) -> Flash<Redirect> {
    dashboard.submit(form.into_inner()).await
}

#[post("/customer/pause-request", data = "<form>")]
pub async fn pause_request(
    dashboard: CustomerDashboard<'_>,
    form: Form<PauseForm>,
) -> Flash<Redirect> {
    dashboard.submit(form.into_inner()).await
}

#[post("/customer/complaints", data = "<form>")]
pub async fn file_complaint(
    dashboard: CustomerDashboard<'_>,
    form: Form<ComplaintForm>,
) -> Flash<Redirect> {
    dashboard.submit(form.into_inner()).await
}
