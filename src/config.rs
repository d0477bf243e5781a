use chrono::{DateTime, Duration, Utc};
use regex::Regex;

use crate::error::{Error, Result};

pub const DEFAULT_KEEP: usize = 3;
pub const DEFAULT_OLDER_THAN: &str = "1w";
pub const DEFAULT_DELETE_AFTER: &str = "24h";
pub const DEFAULT_DELETION_PATTERN: &str = "^[a-z0-9]{40}$";
pub const DEFAULT_REPO_PATH: &str = ".";

/// Parse a human duration such as `30m`, `24h` or `1w`.
pub fn parse_duration(value: &str) -> Result<Duration> {
    let std = humantime::parse_duration(value).map_err(|source| Error::InvalidDuration {
        value: value.to_string(),
        source,
    })?;
    Duration::from_std(std).map_err(|_| Error::DurationOutOfRange(value.to_string()))
}

/// The instant `older_than` before `now`.
pub fn older_than(value: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let age = parse_duration(value)?;
    now.checked_sub_signed(age)
        .ok_or_else(|| Error::DurationOutOfRange(value.to_string()))
}

pub fn deletion_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Join `key=value` labels into a selector, `None` when there are none.
pub fn label_selector(labels: &[String]) -> Option<String> {
    if labels.is_empty() {
        None
    } else {
        Some(labels.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("1s").unwrap(), Duration::seconds(1));
        assert_eq!(parse_duration("24h").unwrap(), Duration::hours(24));
        assert_eq!(parse_duration("1w").unwrap(), Duration::weeks(1));
        assert!(matches!(
            parse_duration("soon"),
            Err(Error::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_older_than() {
        let now = Utc::now();
        assert_eq!(
            older_than(DEFAULT_OLDER_THAN, now).unwrap(),
            now - Duration::weeks(1)
        );
    }

    #[test]
    fn test_default_deletion_pattern() {
        let re = deletion_pattern(DEFAULT_DELETION_PATTERN).unwrap();
        assert!(re.is_match("108f2be974f8e1e5fec8bc759ecf824e81565747"));
        assert!(!re.is_match("108f2be974f8e1e5fec8bc759ecf824e81565747-debug"));
        assert!(!re.is_match("latest"));
        assert!(matches!(
            deletion_pattern("(["),
            Err(Error::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_label_selector() {
        assert_eq!(label_selector(&[]), None);
        assert_eq!(
            label_selector(&["app=web".to_string(), "tier=frontend".to_string()]),
            Some("app=web,tier=frontend".to_string())
        );
    }
}
