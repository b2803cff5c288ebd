//! Utility functions for the voting service

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use uuid::Uuid;

/// Generate a new unique vote ID
pub fn generate_vote_id() -> Uuid {
    Uuid::new_v4()
}

/// Generate a new unique submission ID
pub fn generate_submission_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Calculate the absolute difference between two ratings
pub fn rating_difference(rating1: f64, rating2: f64) -> f64 {
    (rating1 - rating2).abs()
}

/// Split a display name into an optional upper line and a main line.
///
/// "Lionel Andrés Messi" becomes `(Some("LIONEL"), "ANDRÉS MESSI")`, while a
/// single-word name such as "Pelé" becomes `(None, "PELÉ")`.
pub fn split_display_name(name: &str) -> (Option<String>, String) {
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_uppercase();
    let rest = parts.collect::<Vec<_>>().join(" ").to_uppercase();

    if rest.is_empty() {
        (None, first)
    } else {
        (Some(first), rest)
    }
}

/// Full years between `birthdate` and `today`
pub fn age_on(birthdate: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - birthdate.year();
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_ids() {
        assert_ne!(generate_vote_id(), generate_vote_id());
        assert_ne!(generate_submission_id(), generate_submission_id());
    }

    #[test]
    fn test_rating_difference() {
        assert_eq!(rating_difference(1500.0, 1400.0), 100.0);
        assert_eq!(rating_difference(1400.0, 1500.0), 100.0);
        assert_eq!(rating_difference(1500.0, 1500.0), 0.0);
    }

    #[test]
    fn test_split_display_name() {
        assert_eq!(
            split_display_name("Lionel Andrés Messi"),
            (Some("LIONEL".to_string()), "ANDRÉS MESSI".to_string())
        );
        assert_eq!(split_display_name("Pelé"), (None, "PELÉ".to_string()));
        assert_eq!(
            split_display_name("  Zinedine   Zidane "),
            (Some("ZINEDINE".to_string()), "ZIDANE".to_string())
        );
        assert_eq!(split_display_name(""), (None, String::new()));
    }

    #[test]
    fn test_age_on() {
        let birthdate = NaiveDate::from_ymd_opt(1987, 6, 24).unwrap();

        let day_before = NaiveDate::from_ymd_opt(2024, 6, 23).unwrap();
        assert_eq!(age_on(birthdate, day_before), 36);

        let birthday = NaiveDate::from_ymd_opt(2024, 6, 24).unwrap();
        assert_eq!(age_on(birthdate, birthday), 37);

        let before_birth = NaiveDate::from_ymd_opt(1980, 1, 1).unwrap();
        assert_eq!(age_on(birthdate, before_birth), 0);
    }
}
