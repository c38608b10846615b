//! Shared helpers for command handlers.

use std::io::IsTerminal;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Parse an RFC 3339 timestamp, or a bare `YYYY-MM-DD` taken as UTC midnight.
pub fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, CliError> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| CliError::Validation {
            field: field.into(),
            reason: format!("'{raw}' is not an RFC 3339 timestamp or YYYY-MM-DD date"),
        })
}

/// Parse a `--metadata` payload. Must be a JSON object.
pub fn parse_metadata(raw: &str) -> Result<serde_json::Value, CliError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| CliError::Validation {
            field: "metadata".into(),
            reason: format!("invalid JSON: {e}"),
        })?;
    if !value.is_object() {
        return Err(CliError::Validation {
            field: "metadata".into(),
            reason: "must be a JSON object".into(),
        });
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_accept_rfc3339_and_dates() {
        let at = parse_timestamp("expires_at", "2031-05-01T12:30:00+02:00").unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2031, 5, 1, 10, 30, 0).unwrap());

        let day = parse_timestamp("expires_at", "2031-05-01").unwrap();
        assert_eq!(day, Utc.with_ymd_and_hms(2031, 5, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn garbage_timestamp_is_a_validation_error() {
        let err = parse_timestamp("expires_at", "next tuesday").unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "expires_at"));
    }

    #[test]
    fn metadata_must_be_an_object() {
        assert!(parse_metadata(r#"{"match":"m-1"}"#).is_ok());
        assert!(parse_metadata("[1,2]").is_err());
        assert!(parse_metadata("{oops").is_err());
    }

    #[test]
    fn yes_flag_skips_prompt() {
        assert!(confirm("Expire?", "coupons expire", true).unwrap());
    }
}
