use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who the API says the user is. Anything unrecognized lands on `Unknown`
/// and is dispatched to the home page instead of failing the login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Manager,
    Customer,
    Delivery,
    Cse,
    SubscriptionManager,
    Unknown,
}

impl Role {
    pub fn from_wire(raw: &str) -> Role {
        match raw.trim().to_ascii_lowercase().as_str() {
            "manager" => Role::Manager,
            "customer" => Role::Customer,
            "delivery" => Role::Delivery,
            "cse" => Role::Cse,
            "subscription" | "sm" | "subscription_manager" => Role::SubscriptionManager,
            _ => Role::Unknown,
        }
    }

    /// Landing view after login.
    pub fn dashboard_path(self) -> &'static str {
        match self {
            Role::Manager => "/manager",
            Role::Customer => "/customer",
            Role::Delivery => "/delivery",
            Role::Cse => "/cse",
            Role::SubscriptionManager => "/subscription",
            Role::Unknown => "/",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Manager => "Manager",
            Role::Customer => "Customer",
            Role::Delivery => "Delivery Person",
            Role::Cse => "Customer Service Executive",
            Role::SubscriptionManager => "Subscription Manager",
            Role::Unknown => "Guest",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub username: String,
    pub user_id: i64,
    /// Decoded from the token when it is a JWT; opaque tokens never expire locally.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            username: self.username.clone(),
            user_id: self.user_id,
            role: self.role,
            role_label: self.role.label(),
            dashboard: self.role.dashboard_path(),
        }
    }
}

/// What templates may see of a session. The token stays server-side.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub username: String,
    pub user_id: i64,
    pub role: Role,
    pub role_label: &'static str,
    pub dashboard: &'static str,
}
