//! Reminders - dated notes attached to a game, optionally scoped to one party.

use super::{GameId, PartyId, ReminderId};
use crate::errors::{Error, Result};
use chrono::NaiveDate;

/// Longest message a reminder may carry, in characters.
pub const MAX_REMINDER_MESSAGE_LEN: usize = 1000;

/// A dated message about a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    /// Stable identifier
    pub id: ReminderId,
    /// Day the reminder is due
    pub date: NaiveDate,
    /// Message text, non-empty
    pub message: String,
    /// Owning game
    pub game_id: GameId,
    /// Owning party when the reminder is party-scoped
    pub party_id: Option<PartyId>,
}

/// Parses a `YYYY-MM-DD` date, rejecting impossible calendar dates.
pub fn parse_reminder_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| Error::InvalidReminder {
        message: format!("'{value}' is not a valid date: {e}"),
    })
}

/// Trims and validates a reminder message.
pub fn validate_reminder_message(message: &str) -> Result<String> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidReminder {
            message: "message cannot be empty".to_string(),
        });
    }
    let len = trimmed.chars().count();
    if len > MAX_REMINDER_MESSAGE_LEN {
        return Err(Error::InvalidReminder {
            message: format!("message is {len} characters, limit is {MAX_REMINDER_MESSAGE_LEN}"),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reminder_date() {
        assert_eq!(
            parse_reminder_date("2024-02-29").ok(),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert!(matches!(
            parse_reminder_date("2023-02-29"),
            Err(Error::InvalidReminder { .. })
        ));
        assert!(parse_reminder_date("tomorrow").is_err());
    }

    #[test]
    fn test_message_bounds() {
        assert!(validate_reminder_message("   ").is_err());
        assert!(validate_reminder_message(&"x".repeat(MAX_REMINDER_MESSAGE_LEN)).is_ok());
        assert!(validate_reminder_message(&"x".repeat(MAX_REMINDER_MESSAGE_LEN + 1)).is_err());
        assert_eq!(
            validate_reminder_message("  buy DLC ").ok(),
            Some("buy DLC".to_string())
        );
    }
}
