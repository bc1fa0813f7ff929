use chrono::{DateTime, NaiveDate, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (read as midnight UTC).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Lenient about zero padding, matching the `dob` field rule.
pub fn parse_dob(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn instants_accept_dates_and_timestamps() {
        assert!(parse_instant("2024-05-01").is_some());
        assert!(parse_instant("2024-05-01T10:00:00Z").is_some());
        assert!(parse_instant("yesterday").is_none());
    }

    #[test]
    fn dob_tolerates_missing_padding() {
        let date = parse_dob("1999-3-7").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (1999, 3, 7));
    }
}
