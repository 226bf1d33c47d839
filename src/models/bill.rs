use serde::{Deserialize, Serialize};

use crate::utils::de::decimal;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: i64,
    pub customer: i64,
    #[serde(default)]
    pub customer_name: Option<String>,
    /// `YYYY-MM`
    pub month: String,
    #[serde(deserialize_with = "decimal")]
    pub total_amount: f64,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Bill {
    /// The current-month endpoint answers `{}` when nothing is billed yet.
    pub fn from_current_month(value: serde_json::Value) -> Result<Option<Bill>, serde_json::Error> {
        match &value {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::Object(fields) if fields.is_empty() => Ok(None),
            _ => serde_json::from_value(value).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_current_month_means_no_bill() {
        assert_eq!(Bill::from_current_month(json!({})).unwrap(), None);
        assert_eq!(Bill::from_current_month(json!(null)).unwrap(), None);
    }

    #[test]
    fn current_month_bill_parses() {
        let bill = Bill::from_current_month(json!({
            "id": 31,
            "customer": 4,
            "month": "2025-11",
            "total_amount": "450.00",
            "is_paid": false
        }))
        .unwrap()
        .unwrap();

        assert_eq!(bill.total_amount, 450.0);
        assert!(!bill.is_paid);
    }
}
