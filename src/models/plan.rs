use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::de::decimal;

fn active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: i64,
    pub title: String,
    #[serde(deserialize_with = "decimal")]
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default = "active")]
    pub is_active: bool,
}

/// Body of a plan create/update request.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct PlanDraft {
    #[validate(length(min = 1, message = "Plan title is required"))]
    pub title: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    pub description: String,
}
