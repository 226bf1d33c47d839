use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket_dyn_templates::Template;

use crate::guards::{role, Dashboard};
use crate::models::CsrfForm;
use crate::services::Action;

type ManagerDashboard<'r> = Dashboard<'r, role::Manager>;

#[get("/manager")]
pub async fn dashboard(
    dashboard: ManagerDashboard<'_>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Flash<Redirect>> {
    dashboard.render("manager", flash).await
}

/// Printable monthly commission report.
#[get("/manager/commission-report")]
pub async fn commission_report(
    dashboard: ManagerDashboard<'_>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Flash<Redirect>> {
    dashboard.render("commission_report", flash).await
}

#[post("/manager/bills/generate", data = "<form>")]
pub async fn generate_bills(dashboard: ManagerDashboard<'_>, form: Form<CsrfForm>) -> Flash<Redirect> {
    dashboard
        .perform(&form.csrf_token, Ok(Action::GenerateBills))
        .await
}

#[post("/manager/bills/<id>/paid", data = "<form>")]
pub async fn mark_paid(
    id: i64,
    dashboard: ManagerDashboard<'_>,
    form: Form<CsrfForm>,
) -> Flash<Redirect> {
    dashboard
        .perform(&form.csrf_token, Ok(Action::MarkBillPaid { bill_id: id }))
        .await
}

#[post("/manager/commission/compute", data = "<form>")]
pub async fn compute_commission(
    dashboard: ManagerDashboard<'_>,
    form: Form<CsrfForm>,
) -> Flash<Redirect> {
    dashboard
        .perform(&form.csrf_token, Ok(Action::ComputeCommission))
        .await
}

#[post("/manager/reminders", data = "<form>")]
pub async fn send_reminders(dashboard: ManagerDashboard<'_>, form: Form<CsrfForm>) -> Flash<Redirect> {
    dashboard
        .perform(&form.csrf_token, Ok(Action::SendReminders))
        .await
}
