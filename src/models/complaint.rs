use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Open,
    #[field(value = "in_progress")]
    InProgress,
    Closed,
}

impl ComplaintStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintStatus::Open => "open",
            ComplaintStatus::InProgress => "in_progress",
            ComplaintStatus::Closed => "closed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ComplaintStatus::Open => "open",
            ComplaintStatus::InProgress => "in progress",
            ComplaintStatus::Closed => "closed",
        }
    }

    /// Statuses the desk may move to from here; never backwards.
    pub fn next(self) -> &'static [ComplaintStatus] {
        match self {
            ComplaintStatus::Open => &[ComplaintStatus::InProgress, ComplaintStatus::Closed],
            ComplaintStatus::InProgress => &[ComplaintStatus::Closed],
            ComplaintStatus::Closed => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: i64,
    pub customer: i64,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub message: String,
    pub status: ComplaintStatus,
    #[serde(default)]
    pub last_reply: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Complaint plus the transitions offered for it, for the desk table.
#[derive(Debug, Clone, Serialize)]
pub struct ComplaintRow<'a> {
    #[serde(flatten)]
    pub complaint: &'a Complaint,
    pub next: &'static [ComplaintStatus],
}

impl Complaint {
    pub fn row(&self) -> ComplaintRow<'_> {
        ComplaintRow {
            complaint: self,
            next: self.status.next(),
        }
    }
}
