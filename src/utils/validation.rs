use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use validator::{ValidationError, ValidationErrors};

// Same rule the accounts backend applies to usernames.
static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]{1,150}$").expect("static username pattern"));

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static date pattern"));

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if USERNAME.is_match(username) {
        Ok(())
    } else {
        let mut error = ValidationError::new("username");
        error.message =
            Some("Usernames may only contain letters, digits and @/./+/-/_ characters".into());
        Err(error)
    }
}

/// Parse a `YYYY-MM-DD` form value.
pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    if !ISO_DATE.is_match(value) {
        return Err(format!("Enter the {} as YYYY-MM-DD", field));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| format!("{} is not a valid date", value))
}

/// First human-readable message out of a failed `validate()` call.
pub fn first_error(errors: &ValidationErrors, fallback: &str) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(name, _)| *name);

    fields
        .into_iter()
        .flat_map(|(_, errors)| errors.iter())
        .find_map(|error| error.message.as_ref().map(|message| message.to_string()))
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_follow_account_rules() {
        assert!(validate_username("asha.k+route7").is_ok());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn dates_must_be_iso() {
        assert_eq!(
            parse_date("2025-11-20", "start date"),
            Ok(NaiveDate::from_ymd_opt(2025, 11, 20).unwrap())
        );
        assert_eq!(
            parse_date("20/11/2025", "start date"),
            Err("Enter the start date as YYYY-MM-DD".to_string())
        );
        assert!(parse_date("2025-02-30", "start date").is_err());
    }
}
