use html_escape::decode_html_entities;
use quick_xml::events::Event;
use quick_xml::Reader;
use rss::Channel;

use crate::app::{GatorError, Result};

/// Channel-level metadata plus the items that passed validation.
#[derive(Debug, Clone)]
pub struct ParsedChannel {
    pub title: String,
    pub link: String,
    pub description: String,
    pub items: Vec<ParsedItem>,
}

/// An item carrying all four required fields.
///
/// `pub_date` is the raw string from the document; it is only known to be
/// non-empty, not parseable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: String,
}

#[derive(Clone)]
pub struct FeedParser;

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse an RSS 2.0 document.
    ///
    /// Fails with [`GatorError::InvalidFeed`] when the root element is not
    /// `<rss>`, the channel is missing, or its title, link or description is
    /// blank. Items missing any of title, link, description or pubDate are
    /// dropped.
    pub fn parse(&self, body: &[u8]) -> Result<ParsedChannel> {
        require_rss_root(body)?;

        let channel =
            Channel::read_from(body).map_err(|e| GatorError::InvalidFeed(e.to_string()))?;

        let title = decode_html_entities(&required(channel.title(), "channel title")?).to_string();
        let link = required(channel.link(), "channel link")?;
        let description = required(channel.description(), "channel description")?;

        let total = channel.items().len();
        let items: Vec<ParsedItem> = channel
            .items()
            .iter()
            .filter_map(|item| {
                Some(ParsedItem {
                    title: decode_html_entities(&non_blank(item.title())?).to_string(),
                    link: non_blank(item.link())?.trim().to_string(),
                    description: non_blank(item.description())?,
                    pub_date: non_blank(item.pub_date())?.trim().to_string(),
                })
            })
            .collect();

        if items.len() < total {
            tracing::debug!(
                "Dropped {} of {} items from {} (missing title, link, description or pubDate)",
                total - items.len(),
                total,
                link
            );
        }

        Ok(ParsedChannel {
            title,
            link,
            description,
            items,
        })
    }
}

/// `rss::Channel` also accepts RSS 1.0 (`<rdf:RDF>`) roots; only RSS 2.0
/// documents are feeds here.
fn require_rss_root(body: &[u8]) -> Result<()> {
    let mut reader = Reader::from_reader(body);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "rss" {
                    return Ok(());
                }
                return Err(GatorError::InvalidFeed(format!(
                    "expected <rss> root element, found <{}>",
                    name
                )));
            }
            Ok(Event::Eof) => {
                return Err(GatorError::InvalidFeed("missing <rss> root element".into()))
            }
            Err(e) => return Err(GatorError::InvalidFeed(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.to_string())
}

fn required(value: &str, field: &str) -> Result<String> {
    non_blank(Some(value)).ok_or_else(|| GatorError::InvalidFeed(format!("missing {}", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Boot.dev Blog</title>
    <link>https://blog.boot.dev/</link>
    <description>Recent content on Boot.dev Blog</description>
    <item>
      <title>Test Item 1</title>
      <link>https://example.com/item1</link>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
      <description>This is item 1</description>
    </item>
    <item>
      <title>Test Item 2</title>
      <link>https://example.com/item2</link>
      <pubDate>Tue, 02 Jan 2024 00:00:00 GMT</pubDate>
      <description>This is item 2</description>
    </item>
  </channel>
</rss>"#;

    fn item(title: &str, link: Option<&str>) -> String {
        let link = link
            .map(|l| format!("<link>{}</link>", l))
            .unwrap_or_default();
        format!(
            "<item><title>{}</title>{}<description>d</description><pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate></item>",
            title, link
        )
    }

    fn channel(items: &str) -> String {
        format!(
            r#"<rss version="2.0"><channel><title>T</title><link>https://example.com/</link><description>D</description>{}</channel></rss>"#,
            items
        )
    }

    #[test]
    fn test_parse_rss() {
        let parser = FeedParser::new();
        let parsed = parser.parse(RSS_SAMPLE.as_bytes()).unwrap();

        assert_eq!(parsed.title, "Boot.dev Blog");
        assert_eq!(parsed.link, "https://blog.boot.dev/");
        assert_eq!(parsed.description, "Recent content on Boot.dev Blog");
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].title, "Test Item 1");
        assert_eq!(parsed.items[0].link, "https://example.com/item1");
        assert_eq!(parsed.items[1].pub_date, "Tue, 02 Jan 2024 00:00:00 GMT");
    }

    #[test]
    fn test_items_without_link_are_dropped() {
        let items = [
            item("a", Some("https://example.com/a")),
            item("b", None),
            item("c", Some("https://example.com/c")),
            item("d", None),
            item("e", Some("https://example.com/e")),
        ]
        .concat();

        let parsed = FeedParser::new().parse(channel(&items).as_bytes()).unwrap();

        let titles: Vec<&str> = parsed.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "c", "e"]);
    }

    #[test]
    fn test_items_with_blank_fields_are_dropped() {
        let items = concat!(
            "<item><title>  </title><link>https://example.com/1</link><description>d</description><pubDate>x</pubDate></item>",
            "<item><title>t</title><link>https://example.com/2</link><description>d</description></item>",
            "<item><title>t</title><link>https://example.com/3</link><pubDate>x</pubDate></item>",
            "<item><title>t</title><link>https://example.com/4</link><description>d</description><pubDate>garbage</pubDate></item>",
        );

        let parsed = FeedParser::new().parse(channel(items).as_bytes()).unwrap();

        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].link, "https://example.com/4");
        assert_eq!(parsed.items[0].pub_date, "garbage");
    }

    #[test]
    fn test_channel_without_items() {
        let parsed = FeedParser::new().parse(channel("").as_bytes()).unwrap();
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn test_blank_channel_title_is_invalid() {
        let doc = r#"<rss version="2.0"><channel><title> </title><link>https://example.com/</link><description>D</description></channel></rss>"#;
        let err = FeedParser::new().parse(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, GatorError::InvalidFeed(_)));
    }

    #[test]
    fn test_missing_channel_description_is_invalid() {
        let doc = r#"<rss version="2.0"><channel><title>T</title><link>https://example.com/</link></channel></rss>"#;
        let err = FeedParser::new().parse(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, GatorError::InvalidFeed(_)));
    }

    #[test]
    fn test_missing_channel_is_invalid() {
        let err = FeedParser::new()
            .parse(br#"<rss version="2.0"></rss>"#)
            .unwrap_err();
        assert!(matches!(err, GatorError::InvalidFeed(_)));
    }

    #[test]
    fn test_not_xml_is_invalid() {
        let err = FeedParser::new()
            .parse(b"<html><body>nope</body></html>")
            .unwrap_err();
        assert!(matches!(err, GatorError::InvalidFeed(_)));

        let err = FeedParser::new().parse(b"").unwrap_err();
        assert!(matches!(err, GatorError::InvalidFeed(_)));
    }

    #[test]
    fn test_decodes_html_entities() {
        let items = "<item><title>Tom &amp;amp; Jerry</title><link>https://example.com/tj</link><description>d</description><pubDate>x</pubDate></item>";
        let parsed = FeedParser::new().parse(channel(items).as_bytes()).unwrap();
        assert_eq!(parsed.items[0].title, "Tom & Jerry");
    }

    #[test]
    fn test_description_and_link_keep_escaped_markup() {
        let items = "<item><title>t</title><link>https://example.com/?a=1&amp;amp;b=2</link><description>&amp;lt;div&amp;gt;</description><pubDate>x</pubDate></item>";
        let parsed = FeedParser::new().parse(channel(items).as_bytes()).unwrap();

        assert_eq!(parsed.items[0].link, "https://example.com/?a=1&amp;b=2");
        assert_eq!(parsed.items[0].description, "&lt;div&gt;");
    }

    #[test]
    fn test_rdf_document_is_invalid() {
        let doc = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/">
  <channel><title>T</title><link>https://example.com/</link><description>D</description></channel>
  <item><title>a</title><link>https://example.com/a</link><description>d</description><pubDate>x</pubDate></item>
</rdf:RDF>"#;

        let err = FeedParser::new().parse(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, GatorError::InvalidFeed(msg) if msg.contains("rdf:RDF")));
    }
}
