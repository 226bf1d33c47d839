use chrono::NaiveDate;
use rocket::request::FromParam;
use serde::{Deserialize, Serialize};

/// The three customer asks a subscription manager resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Subscribe,
    Change,
    Pause,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Subscribe => "subscribe",
            RequestKind::Change => "change",
            RequestKind::Pause => "pause",
        }
    }
}

impl<'a> FromParam<'a> for RequestKind {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        match param {
            "subscribe" => Ok(RequestKind::Subscribe),
            "change" => Ok(RequestKind::Change),
            "pause" => Ok(RequestKind::Pause),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            Decision::Approve => "approved",
            Decision::Reject => "rejected",
        }
    }
}

impl<'a> FromParam<'a> for Decision {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        match param {
            "approve" => Ok(Decision::Approve),
            "reject" => Ok(Decision::Reject),
            other => Err(other),
        }
    }
}

/// Tri-state resolution: `approved` is null until a manager decides, once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Pending,
    Approved,
    Rejected,
}

impl From<Option<bool>> for Resolution {
    fn from(approved: Option<bool>) -> Self {
        match approved {
            None => Resolution::Pending,
            Some(true) => Resolution::Approved,
            Some(false) => Resolution::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub id: i64,
    pub customer: i64,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub plan: i64,
    #[serde(default)]
    pub plan_title: Option<String>,
    #[serde(default)]
    pub approved: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Add,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: i64,
    pub customer: i64,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub plan: i64,
    #[serde(default)]
    pub plan_title: Option<String>,
    pub action: ChangeAction,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub approved: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauseRequest {
    pub id: i64,
    pub customer: i64,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub subscription: Option<i64>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub approved: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

pub trait Resolvable {
    fn approved(&self) -> Option<bool>;

    fn resolution(&self) -> Resolution {
        Resolution::from(self.approved())
    }

    fn is_pending(&self) -> bool {
        self.approved().is_none()
    }
}

impl Resolvable for SubscribeRequest {
    fn approved(&self) -> Option<bool> {
        self.approved
    }
}

impl Resolvable for ChangeRequest {
    fn approved(&self) -> Option<bool> {
        self.approved
    }
}

impl Resolvable for PauseRequest {
    fn approved(&self) -> Option<bool> {
        self.approved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_approval_is_pending() {
        let request: PauseRequest = serde_json::from_value(json!({
            "id": 7,
            "customer": 3,
            "customer_name": "asha",
            "start_date": "2025-12-01",
            "end_date": "2025-12-10",
            "reason": "travelling",
            "approved": null,
            "created_at": "2025-11-20T08:15:00Z"
        }))
        .unwrap();

        assert!(request.is_pending());
        assert_eq!(request.resolution(), Resolution::Pending);
    }

    #[test]
    fn resolutions_map_from_tri_state() {
        assert_eq!(Resolution::from(Some(true)), Resolution::Approved);
        assert_eq!(Resolution::from(Some(false)), Resolution::Rejected);
    }

    #[test]
    fn path_segments_parse() {
        assert_eq!(RequestKind::from_param("pause"), Ok(RequestKind::Pause));
        assert_eq!(RequestKind::from_param("renew"), Err("renew"));
        assert_eq!(Decision::from_param("reject"), Ok(Decision::Reject));
        assert!(Decision::from_param("maybe").is_err());
    }
}
