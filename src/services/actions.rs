use chrono::NaiveDate;
use reqwest::Method;
use serde_json::{json, Value};

use crate::models::{
    ChangeAction, ComplaintStatus, ComputedCommission, Decision, DeliveryReceipt, PlanDraft,
    RequestKind,
};
use crate::services::api::Reply;
use crate::utils::{money, Notification};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Subscribe,
    RequestChange,
    RequestPause,
    FileComplaint,
    MarkDelivered,
    SetComplaintStatus,
    ReplyComplaint,
    CreatePlan,
    UpdatePlan,
    DeletePlan,
    Resolve,
    GenerateBills,
    MarkBillPaid,
    ComputeCommission,
    SendReminders,
}

/// One state-changing call against the API.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Subscribe {
        plan_id: i64,
    },
    RequestChange {
        plan_id: i64,
        action: ChangeAction,
        effective_date: NaiveDate,
    },
    RequestPause {
        subscription_id: Option<i64>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: String,
    },
    FileComplaint {
        message: String,
    },
    MarkDelivered {
        stop_id: i64,
    },
    SetComplaintStatus {
        complaint_id: i64,
        status: ComplaintStatus,
        reply: Option<String>,
    },
    ReplyComplaint {
        complaint_id: i64,
        reply: String,
    },
    CreatePlan(PlanDraft),
    UpdatePlan {
        plan_id: i64,
        draft: PlanDraft,
    },
    DeletePlan {
        plan_id: i64,
    },
    Resolve {
        kind: RequestKind,
        request_id: i64,
        decision: Decision,
    },
    GenerateBills,
    MarkBillPaid {
        bill_id: i64,
    },
    ComputeCommission,
    SendReminders,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Subscribe { .. } => ActionKind::Subscribe,
            Action::RequestChange { .. } => ActionKind::RequestChange,
            Action::RequestPause { .. } => ActionKind::RequestPause,
            Action::FileComplaint { .. } => ActionKind::FileComplaint,
            Action::MarkDelivered { .. } => ActionKind::MarkDelivered,
            Action::SetComplaintStatus { .. } => ActionKind::SetComplaintStatus,
            Action::ReplyComplaint { .. } => ActionKind::ReplyComplaint,
            Action::CreatePlan(_) => ActionKind::CreatePlan,
            Action::UpdatePlan { .. } => ActionKind::UpdatePlan,
            Action::DeletePlan { .. } => ActionKind::DeletePlan,
            Action::Resolve { .. } => ActionKind::Resolve,
            Action::GenerateBills => ActionKind::GenerateBills,
            Action::MarkBillPaid { .. } => ActionKind::MarkBillPaid,
            Action::ComputeCommission => ActionKind::ComputeCommission,
            Action::SendReminders => ActionKind::SendReminders,
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Action::SetComplaintStatus { .. } | Action::UpdatePlan { .. } => Method::PUT,
            Action::DeletePlan { .. } => Method::DELETE,
            _ => Method::POST,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Action::Subscribe { .. } => "/api/customer/subscribe/".into(),
            Action::RequestChange { .. } => "/api/customer/change-request/".into(),
            Action::RequestPause { .. } => "/api/customer/pause-request/".into(),
            Action::FileComplaint { .. } => "/api/customer/complaints/".into(),
            Action::MarkDelivered { stop_id } => format!("/api/delivery/mark/{}/", stop_id),
            Action::SetComplaintStatus { complaint_id, .. } => {
                format!("/api/cse/complaints/{}/", complaint_id)
            }
            Action::ReplyComplaint { complaint_id, .. } => {
                format!("/api/cse/complaints/{}/reply/", complaint_id)
            }
            Action::CreatePlan(_) => "/api/plans/add/".into(),
            Action::UpdatePlan { plan_id, .. } => format!("/api/plans/update/{}/", plan_id),
            Action::DeletePlan { plan_id } => format!("/api/plans/delete/{}/", plan_id),
            Action::Resolve {
                kind,
                request_id,
                decision,
            } => format!(
                "/api/sm/requests/{}/{}/{}/",
                kind.as_str(),
                request_id,
                decision.as_str()
            ),
            Action::GenerateBills => "/api/manager/generate-bills/".into(),
            Action::MarkBillPaid { bill_id } => {
                format!("/api/manager/bills/{}/mark-paid/", bill_id)
            }
            Action::ComputeCommission => "/api/manager/compute-commission/".into(),
            Action::SendReminders => "/api/manager/send-reminders/".into(),
        }
    }

    pub fn body(&self) -> Option<Value> {
        match self {
            Action::Subscribe { plan_id } => Some(json!({ "plan_id": plan_id })),
            Action::RequestChange {
                plan_id,
                action,
                effective_date,
            } => Some(json!({
                "plan_id": plan_id,
                "action": action,
                "effective_date": effective_date,
            })),
            Action::RequestPause {
                subscription_id,
                start_date,
                end_date,
                reason,
            } => {
                let mut body = json!({
                    "start_date": start_date,
                    "end_date": end_date,
                    "reason": reason,
                });
                if let Some(id) = subscription_id {
                    body["subscription_id"] = json!(id);
                }
                Some(body)
            }
            Action::FileComplaint { message } => Some(json!({ "message": message })),
            Action::SetComplaintStatus { status, reply, .. } => {
                let mut body = json!({ "status": status.as_str() });
                if let Some(reply) = reply {
                    body["reply"] = json!(reply);
                }
                Some(body)
            }
            Action::ReplyComplaint { reply, .. } => Some(json!({ "reply": reply })),
            Action::CreatePlan(draft) | Action::UpdatePlan { draft, .. } => {
                serde_json::to_value(draft).ok()
            }
            _ => None,
        }
    }

    /// Shown when the API gives no message of its own.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Action::Subscribe { .. } => "Failed to send request",
            Action::RequestChange { .. } => "Failed to send change request",
            Action::RequestPause { .. } => "Failed to send pause request",
            Action::FileComplaint { .. } => "Failed to submit complaint",
            Action::MarkDelivered { .. } => "Failed to mark as delivered",
            Action::SetComplaintStatus { .. } => "Failed to update complaint",
            Action::ReplyComplaint { .. } => "Failed to send reply",
            Action::CreatePlan(_) | Action::UpdatePlan { .. } => "Failed to save plan",
            Action::DeletePlan { .. } => "Failed to delete plan",
            Action::Resolve { .. } => "Action failed",
            Action::GenerateBills => "Failed to generate bills",
            Action::MarkBillPaid { .. } => "Failed to mark paid",
            Action::ComputeCommission => "Failed to compute commission",
            Action::SendReminders => "Failed to send reminders",
        }
    }

    /// Notification for a successful reply.
    pub fn acknowledge(&self, reply: &Reply) -> Notification {
        match self {
            Action::Subscribe { .. } if reply.status == 201 => {
                Notification::success("Request sent to Subscription Manager")
            }
            Action::Subscribe { .. } => Notification::info("Already subscribed or request exists"),
            Action::RequestChange { .. } => Notification::success("Change request sent"),
            Action::RequestPause { .. } => Notification::success("Pause request sent"),
            Action::FileComplaint { .. } => Notification::success("Complaint submitted"),
            Action::MarkDelivered { .. } => {
                let receipt: DeliveryReceipt = reply.json().unwrap_or_default();
                Notification::success(format!(
                    "Delivered! Commission: {}",
                    money(receipt.commission)
                ))
            }
            Action::SetComplaintStatus { status, .. } => {
                Notification::success(format!("Complaint marked {}", status.label()))
            }
            Action::ReplyComplaint { .. } => Notification::success("Reply sent"),
            Action::CreatePlan(_) | Action::UpdatePlan { .. } => Notification::success("Plan saved"),
            Action::DeletePlan { .. } => Notification::success("Plan deleted"),
            Action::Resolve { kind, decision, .. } => Notification::success(format!(
                "{} request {}",
                capitalize(kind.as_str()),
                decision.past_tense()
            )),
            Action::GenerateBills => Notification::success("Bills generated for this month"),
            Action::MarkBillPaid { bill_id } => {
                Notification::success(format!("Bill #{} marked paid", bill_id))
            }
            Action::ComputeCommission => {
                let computed: ComputedCommission = reply.json().unwrap_or_default();
                Notification::success(format!(
                    "Commission computed. Total: {}",
                    money(computed.total())
                ))
            }
            Action::SendReminders => Notification::success("Reminders queued"),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::response::NotificationLevel;

    fn reply(status: u16, body: Value) -> Reply {
        Reply { status, body }
    }

    #[test]
    fn resolve_targets_the_kind_and_decision() {
        let action = Action::Resolve {
            kind: RequestKind::Pause,
            request_id: 7,
            decision: Decision::Approve,
        };
        assert_eq!(action.method(), Method::POST);
        assert_eq!(action.path(), "/api/sm/requests/pause/7/approve/");
        assert_eq!(action.body(), None);
        assert_eq!(
            action.acknowledge(&reply(200, json!({}))).message,
            "Pause request approved"
        );
        assert_eq!(action.failure_message(), "Action failed");
    }

    #[test]
    fn subscribe_distinguishes_created_from_existing() {
        let action = Action::Subscribe { plan_id: 5 };
        assert_eq!(action.body(), Some(json!({ "plan_id": 5 })));

        let created = action.acknowledge(&reply(201, json!({})));
        assert_eq!(created.level, NotificationLevel::Success);
        assert_eq!(created.message, "Request sent to Subscription Manager");

        let existing = action.acknowledge(&reply(200, json!({ "message": "Already" })));
        assert_eq!(existing.level, NotificationLevel::Info);
    }

    #[test]
    fn mark_delivered_reports_the_commission() {
        let action = Action::MarkDelivered { stop_id: 12 };
        assert_eq!(action.path(), "/api/delivery/mark/12/");

        let notice = action.acknowledge(&reply(200, json!({ "commission": "2.50" })));
        assert_eq!(notice.message, "Delivered! Commission: ₹2.50");

        let notice = action.acknowledge(&reply(200, Value::Null));
        assert_eq!(notice.message, "Delivered! Commission: ₹0.00");
    }

    #[test]
    fn compute_commission_sums_the_reply() {
        let notice = Action::ComputeCommission.acknowledge(&reply(
            200,
            json!({ "ravi": 120.5, "meena": 80.25 }),
        ));
        assert_eq!(notice.message, "Commission computed. Total: ₹200.75");

        let notice = Action::ComputeCommission.acknowledge(&reply(
            200,
            json!({ "ravi": "120.50", "meena": "80.25" }),
        ));
        assert_eq!(notice.message, "Commission computed. Total: ₹200.75");
    }

    #[test]
    fn plan_edits_use_put_and_delete() {
        let draft = PlanDraft {
            title: "Morning Daily".into(),
            price: 199.0,
            description: String::new(),
        };
        let update = Action::UpdatePlan {
            plan_id: 3,
            draft: draft.clone(),
        };
        assert_eq!(update.method(), Method::PUT);
        assert_eq!(update.path(), "/api/plans/update/3/");
        assert_eq!(update.body(), Some(json!(draft)));

        let delete = Action::DeletePlan { plan_id: 3 };
        assert_eq!(delete.method(), Method::DELETE);
        assert_eq!(delete.path(), "/api/plans/delete/3/");
    }

    #[test]
    fn optional_fields_are_left_out() {
        let status = Action::SetComplaintStatus {
            complaint_id: 4,
            status: ComplaintStatus::InProgress,
            reply: None,
        };
        assert_eq!(status.method(), Method::PUT);
        assert_eq!(status.body(), Some(json!({ "status": "in_progress" })));

        let pause = Action::RequestPause {
            subscription_id: None,
            start_date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 5).unwrap(),
            reason: "travel".into(),
        };
        assert_eq!(
            pause.body(),
            Some(json!({
                "start_date": "2025-12-01",
                "end_date": "2025-12-05",
                "reason": "travel"
            }))
        );
    }
}
