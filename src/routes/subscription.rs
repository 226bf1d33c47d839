use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket_dyn_templates::Template;

use crate::guards::{role, Dashboard};
use crate::models::{CsrfForm, Decision, PlanForm, RequestKind};
use crate::services::Action;

type SubscriptionDashboard<'r> = Dashboard<'r, role::SubscriptionManager>;

#[get("/subscription")]
pub async fn dashboard(
    dashboard: SubscriptionDashboard<'_>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Flash<Redirect>> {
    dashboard.render("subscription", flash).await
}

/// --------------------
/// Plans
/// --------------------
#[post("/subscription/plans", data = "<form>")]
pub async fn create_plan(
    dashboard: SubscriptionDashboard<'_>,
    form: Form<PlanForm>,
) -> Flash<Redirect> {
    dashboard
        .perform(&form.csrf_token, form.draft().map(Action::CreatePlan))
        .await
}

#[post("/subscription/plans/<id>", data = "<form>")]
pub async fn update_plan(
    id: i64,
    dashboard: SubscriptionDashboard<'_>,
    form: Form<PlanForm>,
) -> Flash<Redirect> {
    let action = form
        .draft()
        .map(|draft| Action::UpdatePlan { plan_id: id, draft });
    dashboard.perform(&form.csrf_token, action).await
}

#[post("/subscription/plans/<id>/delete", data = "<form>")]
pub async fn delete_plan(
    id: i64,
    dashboard: SubscriptionDashboard<'_>,
    form: Form<CsrfForm>,
) -> Flash<Redirect> {
    dashboard
        .perform(&form.csrf_token, Ok(Action::DeletePlan { plan_id: id }))
        .await
}

/// --------------------
/// Requests
/// --------------------
#[post("/subscription/requests/<kind>/<id>/<decision>", data = "<form>")]
pub async fn resolve(
    kind: RequestKind,
    id: i64,
    decision: Decision,
    dashboard: SubscriptionDashboard<'_>,
    form: Form<CsrfForm>,
) -> Flash<Redirect> {
    let action = Action::Resolve {
        kind,
        request_id: id,
        decision,
    };
    dashboard.perform(&form.csrf_token, Ok(action)).await
}

/// --------------------
/// Bills
/// --------------------
#[post("/subscription/bills/generate", data = "<form>")]
pub async fn generate_bills(
    dashboard: SubscriptionDashboard<'_>,
    form: Form<CsrfForm>,
) -> Flash<Redirect> {
    dashboard
        .perform(&form.csrf_token, Ok(Action::GenerateBills))
        .await
}

#[post("/subscription/bills/<id>/paid", data = "<form>")]
pub async fn mark_paid(
    id: i64,
    dashboard: SubscriptionDashboard<'_>,
    form: Form<CsrfForm>,
) -> Flash<Redirect> {
    dashboard
        .perform(&form.csrf_token, Ok(Action::MarkBillPaid { bill_id: id }))
        .await
}
