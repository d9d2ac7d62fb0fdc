use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::parser::ParsedItem;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: Option<String>,
    pub url: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub feed_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(no title)")
    }
}

/// A post waiting to be stored.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: Option<String>,
    pub url: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub feed_id: i64,
}

impl NewPost {
    /// Build a post from a parsed item. An unparseable publish date becomes
    /// `None`; it never rejects the item.
    pub fn from_item(feed_id: i64, item: &ParsedItem) -> Self {
        Self {
            title: Some(item.title.clone()),
            url: item.link.clone(),
            description: Some(item.description.clone()),
            published_at: parse_published_at(&item.pub_date),
            feed_id,
        }
    }
}

/// Result of an insert keyed on post URL.
#[derive(Debug, Clone)]
pub struct InsertOutcome {
    /// `false` when a post with the same URL was already stored
    pub inserted: bool,
    pub post: Post,
}

/// A post joined with the name of the feed it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWithFeed {
    pub post: Post,
    pub feed_name: String,
}

/// Parse a feed publish date permissively.
///
/// Tries RFC 2822 (the RSS format), RFC 3339, then a few layouts seen in the
/// wild. Naive timestamps are taken as UTC.
pub fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc2822() {
        let dt = parse_published_at("Mon, 01 Jan 2024 12:30:00 GMT").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc2822_with_offset() {
        let dt = parse_published_at("Mon, 23 Dec 2024 12:30:00 +0800").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 12, 23, 4, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_published_at("2024-03-05T08:00:00+01:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 5, 7, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_layouts() {
        assert_eq!(
            parse_published_at("2024-03-05 08:00:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap())
        );
        assert_eq!(
            parse_published_at("2024-03-05"),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_unparseable_date_is_none() {
        assert_eq!(parse_published_at("sometime last week"), None);
        assert_eq!(parse_published_at("   "), None);
    }

    #[test]
    fn test_from_item_keeps_item_with_bad_date() {
        let item = ParsedItem {
            title: "Hello".into(),
            link: "https://example.com/hello".into(),
            description: "World".into(),
            pub_date: "not a date".into(),
        };

        let post = NewPost::from_item(7, &item);
        assert_eq!(post.feed_id, 7);
        assert_eq!(post.url, "https://example.com/hello");
        assert_eq!(post.title.as_deref(), Some("Hello"));
        assert!(post.published_at.is_none());
    }
}
