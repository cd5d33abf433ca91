#![no_main]

use chrono::Utc;
use libfuzzer_sys::fuzz_target;

use feedwire::config::FeedSource;
use feedwire::fetcher::{parse_feed, pipeline::process_response};
use feedwire::normalizer::normalize;

fuzz_target!(|data: &[u8]| {
    // Decode the way a fetched body is decoded, then parse
    let response = process_response(
        url::Url::parse("https://example.com/feed.xml").unwrap(),
        reqwest::StatusCode::OK,
        bytes::Bytes::copy_from_slice(data),
        "application/rss+xml",
    );

    // Neither parsing nor normalizing may panic, whatever the input
    if let Ok(items) = parse_feed(response.body_utf8.as_bytes()) {
        let source = FeedSource::new("Fuzz", "https://example.com/feed.xml", "general");
        for item in &items {
            let _ = normalize(item, &source, Utc::now());
        }
    }
});
