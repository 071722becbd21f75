//! Query-string parameters for list endpoints.
//!
//! Nested filters flatten to dotted keys (`created_at.after`) and list
//! filters to comma-joined values (`status.in=pending,won`).
use std::fmt::Display;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{Record, Wire};

/// Ordered `(key, value)` pairs ready for a URL query string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: impl Display) -> &mut Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn push_opt(&mut self, key: &str, value: Option<impl Display>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Pushes `key=a,b,c`; nothing for an empty list.
    pub fn push_list<I>(&mut self, key: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let joined = values
            .into_iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join(",");
        if !joined.is_empty() {
            self.push(key, joined);
        }
        self
    }

    /// Pushes every bound of `range` as `<prefix>.<bound>`.
    pub fn push_time_range(&mut self, prefix: &str, range: &TimeRange) -> &mut Self {
        let bounds = [
            ("after", range.after),
            ("before", range.before),
            ("on_or_after", range.on_or_after),
            ("on_or_before", range.on_or_before),
        ];
        for (bound, value) in bounds {
            self.push_opt(&format!("{prefix}.{bound}"), value.map(format_timestamp));
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }
}

/// Filter on a timestamp field. Every bound is optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
    pub on_or_after: Option<DateTime<Utc>>,
    pub on_or_before: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn is_empty(&self) -> bool {
        self.after.is_none()
            && self.before.is_none()
            && self.on_or_after.is_none()
            && self.on_or_before.is_none()
    }
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Request parameters of a list endpoint.
///
/// The pager only touches the cursor; every other parameter is sent unchanged
/// on each page.
pub trait ListParams: Clone + Send + Sync {
    fn cursor(&self) -> Option<&str>;

    fn set_cursor(&mut self, cursor: Option<String>);

    fn to_query(&self) -> Query;
}

/// A record served by a list endpoint.
pub trait Resource: Record + Wire + Send + Sync {
    /// Path of the collection, relative to the API base URL.
    const LIST_PATH: &'static str;

    type ListParams: ListParams;
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn time_range_flattens_to_dotted_keys() {
        let range = TimeRange {
            after: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            on_or_before: Some(Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()),
            ..TimeRange::default()
        };
        let mut query = Query::new();
        query.push_time_range("created_at", &range);

        assert_eq!(
            query.pairs(),
            &[
                (
                    "created_at.after".to_string(),
                    "2024-01-01T00:00:00Z".to_string()
                ),
                (
                    "created_at.on_or_before".to_string(),
                    "2024-02-29T23:59:59Z".to_string()
                ),
            ]
        );
    }

    #[test]
    fn lists_are_comma_joined_and_empty_lists_skipped() {
        let mut query = Query::new();
        query
            .push_list("status.in", ["pending_reviewing", "won"])
            .push_list("category.in", Vec::<String>::new());

        assert_eq!(query.get("status.in"), Some("pending_reviewing,won"));
        assert_eq!(query.get("category.in"), None);
        assert_eq!(query.pairs().len(), 1);
    }

    #[test]
    fn optional_values_are_skipped_when_none() {
        let mut query = Query::new();
        query
            .push_opt("cursor", None::<&str>)
            .push_opt("limit", Some(25))
            .push("account_id", "account_1");

        assert_eq!(
            query.into_pairs(),
            vec![
                ("limit".to_string(), "25".to_string()),
                ("account_id".to_string(), "account_1".to_string()),
            ]
        );
    }

    #[test]
    fn empty_time_range() {
        assert!(TimeRange::default().is_empty());
        let mut query = Query::new();
        query.push_time_range("created_at", &TimeRange::default());
        assert!(query.pairs().is_empty());
    }
}
