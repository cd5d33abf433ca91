use crate::{
    fetcher::errors::SourceError,
    normalizer::{RawItem, text::html_to_text},
};

/// Parse a feed document into raw items. RSS is tried first, then Atom.
pub fn parse_feed(body: &[u8]) -> Result<Vec<RawItem>, SourceError> {
    let rss_err = match rss::Channel::read_from(body) {
        Ok(channel) => return Ok(channel.items().iter().map(rss_item).collect()),
        Err(e) => e,
    };

    match atom_syndication::Feed::read_from(body) {
        Ok(feed) => Ok(feed.entries().iter().map(atom_entry).collect()),
        Err(atom_err) => Err(SourceError::Parse(format!(
            "not rss ({rss_err}) and not atom ({atom_err})"
        ))),
    }
}

fn rss_item(item: &rss::Item) -> RawItem {
    let snippet_source = item.description().or(item.content());

    RawItem {
        title: item.title().map(str::to_string),
        link: item.link().map(str::to_string),
        content_snippet: snippet_source.map(html_to_text),
        content: None,
        content_encoded: item.content().map(str::to_string),
        description: item.description().map(str::to_string),
        pub_date: item.pub_date().map(str::to_string),
        author: item.author().map(str::to_string),
        creator: item
            .dublin_core_ext()
            .and_then(|dc| dc.creators().first())
            .cloned(),
        enclosure_url: item
            .enclosure()
            .filter(|e| e.mime_type().is_empty() || e.mime_type().starts_with("image/"))
            .map(|e| e.url().to_string()),
        media_content_url: media_url(item, "content"),
        media_thumbnail_url: media_url(item, "thumbnail"),
    }
}

fn media_url(item: &rss::Item, name: &str) -> Option<String> {
    let media = item.extensions().get("media")?;

    if let Some(url) = media
        .get(name)
        .into_iter()
        .flatten()
        .find_map(|ext| ext.attrs().get("url"))
    {
        return Some(url.clone());
    }

    // <media:group> wraps content and thumbnails in some feeds
    media
        .get("group")
        .into_iter()
        .flatten()
        .flat_map(|group| group.children().get(name).into_iter().flatten())
        .find_map(|ext| ext.attrs().get("url"))
        .cloned()
}

fn atom_entry(entry: &atom_syndication::Entry) -> RawItem {
    let summary = entry.summary().map(|s| s.as_str().to_string());
    let content = entry.content().and_then(|c| c.value()).map(str::to_string);

    let link = entry
        .links()
        .iter()
        .find(|l| l.rel() == "alternate")
        .or_else(|| entry.links().first())
        .map(|l| l.href().to_string());

    let date = entry.published().unwrap_or(entry.updated());

    RawItem {
        title: Some(entry.title().to_string()),
        link,
        content_snippet: summary.as_deref().or(content.as_deref()).map(html_to_text),
        content,
        content_encoded: None,
        description: summary,
        pub_date: Some(date.to_rfc3339()),
        author: entry.authors().first().map(|a| a.name().to_string()),
        creator: None,
        enclosure_url: None,
        media_content_url: None,
        media_thumbnail_url: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"
     xmlns:dc="http://purl.org/dc/elements/1.1/"
     xmlns:media="http://search.yahoo.com/mrss/"
     xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Example Wire</title>
    <link>https://example.com</link>
    <description>News</description>
    <item>
      <title>Fed Hikes Interest Rates</title>
      <link>https://example.com/fed</link>
      <description><![CDATA[<p>Markets &amp; banks react</p>]]></description>
      <content:encoded><![CDATA[<p>Full text</p><img src="https://cdn.example.com/inline.jpg">]]></content:encoded>
      <pubDate>Tue, 10 Jun 2025 08:00:00 GMT</pubDate>
      <dc:creator>Jane Doe</dc:creator>
      <media:thumbnail url="https://cdn.example.com/thumb.jpg"/>
    </item>
    <item>
      <title>Second story</title>
      <link>https://example.com/second</link>
      <enclosure url="https://cdn.example.com/second.jpg" length="100" type="image/jpeg"/>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Atom</title>
  <id>urn:example</id>
  <updated>2025-06-10T09:00:00Z</updated>
  <entry>
    <title>Chip maker unveils new processor</title>
    <id>urn:example:1</id>
    <link rel="related" href="https://example.com/related"/>
    <link rel="alternate" href="https://example.com/chip"/>
    <updated>2025-06-10T09:00:00Z</updated>
    <published>2025-06-10T07:30:00Z</published>
    <summary type="html">&lt;p&gt;Faster &lt;b&gt;cores&lt;/b&gt;&lt;/p&gt;</summary>
    <author><name>John Roe</name></author>
  </entry>
</feed>"#;

    #[test]
    fn parses_rss_items() {
        let items = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.title.as_deref(), Some("Fed Hikes Interest Rates"));
        assert_eq!(first.link.as_deref(), Some("https://example.com/fed"));
        assert_eq!(first.content_snippet.as_deref(), Some("Markets & banks react"));
        assert_eq!(first.creator.as_deref(), Some("Jane Doe"));
        assert_eq!(
            first.pub_date.as_deref(),
            Some("Tue, 10 Jun 2025 08:00:00 GMT")
        );
        assert!(first.content_encoded.as_deref().unwrap().contains("inline.jpg"));
        assert_eq!(
            first.media_thumbnail_url.as_deref(),
            Some("https://cdn.example.com/thumb.jpg")
        );

        assert_eq!(
            items[1].enclosure_url.as_deref(),
            Some("https://cdn.example.com/second.jpg")
        );
    }

    #[test]
    fn parses_atom_entries() {
        let items = parse_feed(ATOM.as_bytes()).unwrap();
        assert_eq!(items.len(), 1);

        let entry = &items[0];
        assert_eq!(entry.title.as_deref(), Some("Chip maker unveils new processor"));
        assert_eq!(entry.link.as_deref(), Some("https://example.com/chip"));
        assert_eq!(entry.content_snippet.as_deref(), Some("Faster cores"));
        assert_eq!(entry.author.as_deref(), Some("John Roe"));
        assert_eq!(entry.pub_date.as_deref(), Some("2025-06-10T07:30:00+00:00"));
    }

    #[test]
    fn rejects_documents_that_are_not_feeds() {
        let err = parse_feed(b"<html><body>not a feed</body></html>").unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
