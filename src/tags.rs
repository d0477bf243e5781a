use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::debug;

use crate::types::TagEventHistory;

/// How an image tag is compared against a git commit or tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOption {
    Exact,
    Prefix,
}

impl MatchOption {
    fn matches(self, tag: &str, value: &str) -> bool {
        match self {
            MatchOption::Exact => tag == value,
            MatchOption::Prefix => tag.starts_with(value),
        }
    }
}

/// Combine an image stream name and a tag the way workloads reference it.
pub fn image_stream_tag_name(image_stream: &str, tag: &str) -> String {
    format!("{}:{}", image_stream, tag)
}

/// Image tags matching any of `values`, value-major.
///
/// Not deduplicated: a tag matched by two values is returned twice. With
/// [`MatchOption::Prefix`] a `<hash>-debug` tag matches its base hash.
pub fn matching_tags(values: &[String], tags: &[String], option: MatchOption) -> Vec<String> {
    debug!(
        "Matching {} image tags against {} values ({:?})",
        tags.len(),
        values.len(),
        option
    );
    let mut matches = Vec::new();
    for value in values {
        for tag in tags {
            if option.matches(tag, value) {
                debug!("Found matching tag {} for {}", tag, value);
                matches.push(tag.clone());
            }
        }
    }
    matches
}

/// Tags from `all` that are not in `active`, order preserved.
pub fn inactive_tags(all: &[String], active: &[String]) -> Vec<String> {
    all.iter()
        .filter(|tag| !active.contains(tag))
        .cloned()
        .collect()
}

/// Candidates that match none of `references`.
pub fn orphan_tags(
    references: &[String],
    candidates: &[String],
    option: MatchOption,
) -> Vec<String> {
    debug!(
        "Filtering {} image tags by {} references",
        candidates.len(),
        references.len()
    );
    candidates
        .iter()
        .filter(|tag| !references.iter().any(|value| option.matches(tag, value)))
        .cloned()
        .collect()
}

pub fn filter_by_regex(tags: &[String], pattern: &Regex) -> Vec<String> {
    debug!("Filtering image tags with pattern {}", pattern);
    tags.iter()
        .filter(|tag| {
            let matched = pattern.is_match(tag);
            debug!("Image tag {} matched: {}", tag, matched);
            matched
        })
        .cloned()
        .collect()
}

/// Tags whose last event happened strictly before `older_than`.
pub fn filter_by_age(histories: &[TagEventHistory], older_than: DateTime<Utc>) -> Vec<String> {
    histories
        .iter()
        .filter(|history| {
            history
                .last_updated()
                .is_some_and(|updated| updated < older_than)
        })
        .map(|history| history.tag.clone())
        .collect()
}

/// Drop the first `keep` tags and return the rest.
///
/// `tags` must already be ordered by retention priority, newest first.
pub fn limit_tags(tags: &[String], keep: usize) -> Vec<String> {
    if tags.len() > keep {
        tags[keep..].to_vec()
    } else {
        Vec::new()
    }
}
