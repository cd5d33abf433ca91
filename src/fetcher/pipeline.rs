use crate::fetcher::types::{Charset, FeedResponse};
use bytes::Bytes;
use chrono::Utc;
use encoding_rs::Encoding;
use regex::Regex;
use reqwest::StatusCode;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static XML_DECL_ENCODING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<\?xml\s[^>]*?encoding\s*=\s*["']([^"']+)["']"#).unwrap()
});

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

pub fn process_response(
    url_final: Url,
    status: StatusCode,
    body_bytes: Bytes,
    content_type: &str,
) -> FeedResponse {
    let charset = detect_charset(content_type, &body_bytes);
    let body_utf8 = relabel_xml_declaration(decode_to_utf8(&body_bytes, &charset));

    FeedResponse {
        url_final,
        status,
        body_raw: body_bytes,
        body_utf8,
        charset,
        fetched_at: Utc::now(),
    }
}

fn charset_from_label(label: &str) -> Option<Charset> {
    Encoding::for_label(label.trim().to_lowercase().as_bytes()).map(Charset::from_encoding)
}

pub(crate) fn detect_charset(content_type: &str, body_bytes: &[u8]) -> Charset {
    // 1. Content-Type header
    if let Some(charset) = CHARSET_REGEX
        .captures(content_type)
        .and_then(|caps| caps.get(1))
        .and_then(|m| charset_from_label(m.as_str()))
    {
        return charset;
    }

    // 2. Byte order mark
    if let Some((encoding, _)) = Encoding::for_bom(body_bytes) {
        return Charset::from_encoding(encoding);
    }

    // 3. XML declaration, or <meta charset> for feeds served as HTML, in the first 4KB
    let search_bytes = &body_bytes[..body_bytes.len().min(4096)];
    let search_str = String::from_utf8_lossy(search_bytes);

    for regex in [&*XML_DECL_ENCODING_REGEX, &*META_CHARSET_REGEX] {
        if let Some(charset) = regex
            .captures(&search_str)
            .and_then(|caps| caps.get(1))
            .and_then(|m| charset_from_label(m.as_str()))
        {
            return charset;
        }
    }

    // 4. Heuristic detection
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(search_bytes, false);
    Charset::from_encoding(detector.guess(None, true))
}

/// Decode to UTF-8. Malformed sequences become U+FFFD rather than failing the
/// whole feed over one bad byte.
pub(crate) fn decode_to_utf8(body_bytes: &[u8], charset: &Charset) -> String {
    let encoding = charset.encoding();
    let (decoded, _encoding, had_errors) = encoding.decode(body_bytes);

    if had_errors {
        debug!(
            encoding = encoding.name(),
            "feed body contained malformed sequences"
        );
    }

    decoded.into_owned()
}

/// The body is UTF-8 now, so the prolog must say so or the XML reader will
/// decode it a second time using the original label.
pub(crate) fn relabel_xml_declaration(body: String) -> String {
    let Some(range) = XML_DECL_ENCODING_REGEX
        .captures(&body)
        .and_then(|caps| caps.get(1))
        .filter(|m| m.start() < 256 && !m.as_str().eq_ignore_ascii_case("utf-8"))
        .map(|m| m.range())
    else {
        return body;
    };

    let mut relabelled = body;
    relabelled.replace_range(range, "UTF-8");
    relabelled
}
