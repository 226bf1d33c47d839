use std::collections::HashMap;

use rocket_dyn_templates::tera::{self, Value};

/// Rupee amount with two decimals, the way every dashboard shows money.
pub fn money(amount: f64) -> String {
    format!("₹{:.2}", amount)
}

/// Tera filter: `{{ bill.total_amount | money }}`.
pub fn money_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let amount = match value {
        Value::Number(number) => number.as_f64().unwrap_or_default(),
        Value::String(text) => text.trim().parse().unwrap_or_default(),
        Value::Null => 0.0,
        other => {
            return Err(tera::Error::msg(format!(
                "money filter expects a number, got {}",
                other
            )));
        }
    };

    Ok(Value::String(money(amount)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn money_rounds_to_paise() {
        assert_eq!(money(2.5), "₹2.50");
        assert_eq!(money(0.0), "₹0.00");
        assert_eq!(money(199.999), "₹200.00");
    }

    #[test]
    fn money_filter_handles_strings_and_numbers() {
        let args = HashMap::new();
        assert_eq!(money_filter(&json!(12.5), &args).unwrap(), json!("₹12.50"));
        assert_eq!(money_filter(&json!("7.1"), &args).unwrap(), json!("₹7.10"));
        assert!(money_filter(&json!([1]), &args).is_err());
    }
}
