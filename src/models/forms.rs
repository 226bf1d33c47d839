use serde::Serialize;
use validator::Validate;

use crate::models::{ChangeAction, ComplaintStatus, PlanDraft};
use crate::services::Action;
use crate::utils::{first_error, parse_date};

/// --------------------
/// Authentication
/// --------------------
#[derive(Debug, FromForm, Validate, Serialize)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Please enter username and password"))]
    pub username: String,
    #[validate(length(min = 1, message = "Please enter username and password"))]
    pub password: String,
}

#[derive(Debug, FromForm, Validate, Serialize)]
pub struct RegisterForm {
    #[validate(custom = "crate::utils::validate_username")]
    pub username: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Choose a role"))]
    pub role: String,
}

/// --------------------
/// Dashboard actions
/// --------------------

/// Every mutating form carries the session's CSRF token.
pub trait ActionForm {
    fn csrf_token(&self) -> &str;
    fn into_action(self) -> Result<Action, String>;
}

#[derive(Debug, FromForm)]
pub struct CsrfForm {
    pub csrf_token: String,
}

#[derive(Debug, FromForm)]
pub struct SubscribeForm {
    pub csrf_token: String,
    pub plan_id: i64,
}

impl ActionForm for SubscribeForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    fn into_action(self) -> Result<Action, String> {
        Ok(Action::Subscribe {
            plan_id: self.plan_id,
        })
    }
}

#[derive(Debug, FromForm)]
pub struct ChangeForm {
    pub csrf_token: String,
    pub plan_id: i64,
    pub action: ChangeAction,
    pub effective_date: String,
}

impl ActionForm for ChangeForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    fn into_action(self) -> Result<Action, String> {
        Ok(Action::RequestChange {
            plan_id: self.plan_id,
            action: self.action,
            effective_date: parse_date(&self.effective_date, "effective date")?,
        })
    }
}

#[derive(Debug, FromForm)]
pub struct PauseForm {
    pub csrf_token: String,
    pub subscription_id: Option<i64>,
    pub start_date: String,
    pub end_date: String,
    pub reason: String,
}

impl ActionForm for PauseForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    fn into_action(self) -> Result<Action, String> {
        let start_date = parse_date(&self.start_date, "start date")?;
        let end_date = parse_date(&self.end_date, "end date")?;
        if end_date < start_date {
            return Err("End date must be on or after the start date".to_string());
        }

        Ok(Action::RequestPause {
            subscription_id: self.subscription_id,
            start_date,
            end_date,
            reason: self.reason.trim().to_string(),
        })
    }
}

#[derive(Debug, FromForm)]
pub struct ComplaintForm {
    pub csrf_token: String,
    pub message: String,
}

impl ActionForm for ComplaintForm {
    fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    fn into_action(self) -> Result<Action, String> {
        let message = self.message.trim();
        if message.is_empty() {
            return Err("Please describe the problem".to_string());
        }
        Ok(Action::FileComplaint {
            message: message.to_string(),
        })
    }
}

#[derive(Debug, FromForm)]
pub struct StatusForm {
    pub csrf_token: String,
    pub status: ComplaintStatus,
    pub reply: Option<String>,
}

impl StatusForm {
    pub fn action(self, complaint_id: i64) -> Result<Action, String> {
        let reply = self
            .reply
            .map(|reply| reply.trim().to_string())
            .filter(|reply| !reply.is_empty());
        Ok(Action::SetComplaintStatus {
            complaint_id,
            status: self.status,
            reply,
        })
    }
}

#[derive(Debug, FromForm)]
pub struct ReplyForm {
    pub csrf_token: String,
    pub reply: String,
}

impl ReplyForm {
    pub fn action(self, complaint_id: i64) -> Result<Action, String> {
        let reply = self.reply.trim();
        if reply.is_empty() {
            return Err("Reply cannot be empty".to_string());
        }
        Ok(Action::ReplyComplaint {
            complaint_id,
            reply: reply.to_string(),
        })
    }
}

#[derive(Debug, FromForm)]
pub struct PlanForm {
    pub csrf_token: String,
    pub title: String,
    pub price: f64,
    pub description: String,
}

impl PlanForm {
    pub fn draft(&self) -> Result<PlanDraft, String> {
        let draft = PlanDraft {
            title: self.title.trim().to_string(),
            price: self.price,
            description: self.description.trim().to_string(),
        };
        draft
            .validate()
            .map_err(|errors| first_error(&errors, "Failed to save plan"))?;
        Ok(draft)
    }
}
