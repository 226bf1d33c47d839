use serde::{Deserialize, Serialize};

use crate::utils::de::{decimal, labels};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Delivered,
}

/// One point on today's route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: i64,
    #[serde(default)]
    pub house_number: Option<String>,
    #[serde(default)]
    pub customer: Option<i64>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default, alias = "address_line")]
    pub address: String,
    #[serde(default, deserialize_with = "labels")]
    pub publications: Vec<String>,
    #[serde(default)]
    pub status: DeliveryStatus,
    #[serde(default)]
    pub sequence: i64,
    #[serde(default, deserialize_with = "decimal")]
    pub commission: f64,
}

impl Stop {
    pub fn is_delivered(&self) -> bool {
        self.status == DeliveryStatus::Delivered
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeliveryStats {
    #[serde(default)]
    pub total_deliveries: u64,
    #[serde(default, deserialize_with = "decimal")]
    pub total_commission: f64,
}

/// Reply to mark-delivered; the API computes the stop's commission.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct DeliveryReceipt {
    #[serde(default, deserialize_with = "decimal")]
    pub commission: f64,
}

/// Route counters shown above the stop table.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct RouteSummary {
    pub pending: usize,
    pub delivered: usize,
    pub commission: f64,
}

impl RouteSummary {
    pub fn of(stops: &[Stop]) -> Self {
        stops.iter().fold(RouteSummary::default(), |mut summary, stop| {
            if stop.is_delivered() {
                summary.delivered += 1;
                summary.commission += stop.commission;
            } else {
                summary.pending += 1;
            }
            summary
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stops_read_the_route_serializer_shape() {
        let stop: Stop = serde_json::from_value(json!({
            "id": 12,
            "publications": ["The Hindu", "Sakal"],
            "status": "pending",
            "address_line": "14 MG Road"
        }))
        .unwrap();

        assert_eq!(stop.address, "14 MG Road");
        assert_eq!(stop.sequence, 0);
        assert!(!stop.is_delivered());
    }

    #[test]
    fn summary_counts_only_delivered_commission() {
        let stops: Vec<Stop> = serde_json::from_value(json!([
            { "id": 1, "status": "delivered", "commission": "2.50" },
            { "id": 2, "status": "pending", "commission": 4 },
            { "id": 3, "status": "delivered", "commission": 1.25 }
        ]))
        .unwrap();

        let summary = RouteSummary::of(&stops);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.commission, 3.75);
    }
}
