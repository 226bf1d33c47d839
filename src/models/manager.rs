use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::utils::de::decimal;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ManagerStats {
    #[serde(default)]
    pub customers: u64,
    #[serde(default, alias = "subscriptions")]
    pub active_subscriptions: u64,
    #[serde(default)]
    pub plans: u64,
    #[serde(default)]
    pub delivery_persons: u64,
    #[serde(default, deserialize_with = "decimal")]
    pub dues: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A delivery assignment as the manager's listing shows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedDelivery {
    pub id: i64,
    #[serde(default)]
    pub delivery_person_name: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "decimal")]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionLine {
    #[serde(default)]
    pub delivery_person_id: Option<i64>,
    pub delivery_person_name: String,
    #[serde(default)]
    pub total_deliveries: u64,
    #[serde(default, deserialize_with = "decimal")]
    pub total_value: f64,
    #[serde(default, deserialize_with = "decimal")]
    pub commission_percentage: f64,
    #[serde(default, deserialize_with = "decimal")]
    pub commission_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionReport {
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub report_date: String,
    #[serde(default)]
    pub delivery_persons: Vec<CommissionLine>,
    #[serde(default, deserialize_with = "decimal")]
    pub total_commission: f64,
}

/// One amount of a compute-commission reply, number or decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Default)]
#[serde(transparent)]
pub struct Amount(#[serde(deserialize_with = "decimal")] pub f64);

/// Reply to compute-commission: delivery person → amount, in server order.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(transparent)]
pub struct ComputedCommission(pub IndexMap<String, Amount>);

impl ComputedCommission {
    pub fn total(&self) -> f64 {
        self.0.values().map(|amount| amount.0).sum()
    }
}
