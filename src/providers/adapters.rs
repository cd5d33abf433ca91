use chrono::{Duration, Utc};
use serde_json::Value;

use crate::providers::{CanonicalFields, ProviderAdapter, ProviderEndpoint};

/// First non-empty string among the given JSON pointers.
fn pick(raw: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .filter_map(|p| raw.pointer(p).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn list(body: &Value, key: &str) -> Vec<Value> {
    body.get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Where one provider keeps each canonical field, as JSON pointers in
/// order of preference. Title and url are required.
struct FieldMap {
    title: &'static [&'static str],
    source: &'static [&'static str],
    default_source: &'static str,
    summary: &'static [&'static str],
    url: &'static [&'static str],
    image: &'static [&'static str],
    published: &'static [&'static str],
}

impl FieldMap {
    fn apply(&self, raw: &Value) -> Option<CanonicalFields> {
        Some(CanonicalFields {
            title: pick(raw, self.title)?,
            url: pick(raw, self.url)?,
            source_name: pick(raw, self.source).unwrap_or_else(|| self.default_source.to_string()),
            summary: pick(raw, self.summary).unwrap_or_default(),
            image_url: pick(raw, self.image),
            published_at: pick(raw, self.published),
        })
    }
}

macro_rules! base_url_ctor {
    ($ty:ident, $default:expr) => {
        impl $ty {
            pub fn new() -> Self {
                Self::with_base_url($default)
            }

            pub fn with_base_url(base_url: impl Into<String>) -> Self {
                Self {
                    base_url: base_url.into().trim_end_matches('/').to_string(),
                }
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

#[derive(Debug, Clone)]
pub struct NewsApiOrg {
    base_url: String,
}

base_url_ctor!(NewsApiOrg, "https://newsapi.org");

impl ProviderAdapter for NewsApiOrg {
    fn name(&self) -> &'static str {
        "NewsAPI.org"
    }

    fn endpoints(&self, api_key: &str) -> Vec<ProviderEndpoint> {
        let yesterday = (Utc::now() - Duration::days(1)).format("%Y-%m-%d").to_string();
        vec![
            ProviderEndpoint::new(
                "Business Headlines",
                format!("{}/v2/top-headlines", self.base_url),
                &[
                    ("category", "business"),
                    ("language", "en"),
                    ("pageSize", "15"),
                    ("apiKey", api_key),
                ],
            ),
            ProviderEndpoint::new(
                "Everything Business",
                format!("{}/v2/everything", self.base_url),
                &[
                    ("q", "business OR finance OR economy OR market"),
                    ("language", "en"),
                    ("sortBy", "publishedAt"),
                    ("pageSize", "10"),
                    ("from", &yesterday),
                    ("apiKey", api_key),
                ],
            ),
        ]
    }

    fn articles(&self, body: &Value) -> Vec<Value> {
        list(body, "articles")
    }

    fn normalize(&self, raw: &Value) -> Option<CanonicalFields> {
        FieldMap {
            title: &["/title"],
            source: &["/source/name"],
            default_source: "Unknown",
            summary: &["/description", "/content"],
            url: &["/url"],
            image: &["/urlToImage"],
            published: &["/publishedAt"],
        }
        .apply(raw)
    }
}

#[derive(Debug, Clone)]
pub struct GNews {
    base_url: String,
}

base_url_ctor!(GNews, "https://gnews.io");

impl ProviderAdapter for GNews {
    fn name(&self) -> &'static str {
        "GNews API"
    }

    fn endpoints(&self, api_key: &str) -> Vec<ProviderEndpoint> {
        let url = format!("{}/api/v4/top-headlines", self.base_url);
        [("Business News", "business", "15"), ("Technology News", "technology", "10")]
            .into_iter()
            .map(|(name, category, max)| {
                ProviderEndpoint::new(
                    name,
                    url.clone(),
                    &[
                        ("category", category),
                        ("lang", "en"),
                        ("country", "us"),
                        ("max", max),
                        ("apikey", api_key),
                    ],
                )
            })
            .collect()
    }

    fn articles(&self, body: &Value) -> Vec<Value> {
        list(body, "articles")
    }

    fn normalize(&self, raw: &Value) -> Option<CanonicalFields> {
        FieldMap {
            title: &["/title"],
            source: &["/source/name"],
            default_source: "GNews",
            summary: &["/description"],
            url: &["/url"],
            image: &["/image"],
            published: &["/publishedAt"],
        }
        .apply(raw)
    }
}

#[derive(Debug, Clone)]
pub struct NewsDataIo {
    base_url: String,
}

base_url_ctor!(NewsDataIo, "https://newsdata.io");

impl ProviderAdapter for NewsDataIo {
    fn name(&self) -> &'static str {
        "NewsData.io"
    }

    fn endpoints(&self, api_key: &str) -> Vec<ProviderEndpoint> {
        let url = format!("{}/api/1/news", self.base_url);
        [("Business Headlines", "business", "15"), ("Technology Headlines", "technology", "10")]
            .into_iter()
            .map(|(name, category, size)| {
                ProviderEndpoint::new(
                    name,
                    url.clone(),
                    &[
                        ("apikey", api_key),
                        ("category", category),
                        ("language", "en"),
                        ("country", "us"),
                        ("size", size),
                    ],
                )
            })
            .collect()
    }

    fn articles(&self, body: &Value) -> Vec<Value> {
        list(body, "results")
    }

    fn normalize(&self, raw: &Value) -> Option<CanonicalFields> {
        FieldMap {
            title: &["/title"],
            source: &["/source_id"],
            default_source: "NewsData",
            summary: &["/description", "/content"],
            url: &["/link"],
            image: &["/image_url"],
            published: &["/pubDate"],
        }
        .apply(raw)
    }
}

#[derive(Debug, Clone)]
pub struct TheNewsApi {
    base_url: String,
}

base_url_ctor!(TheNewsApi, "https://api.thenewsapi.com");

impl ProviderAdapter for TheNewsApi {
    fn name(&self) -> &'static str {
        "TheNewsAPI.com"
    }

    fn endpoints(&self, api_key: &str) -> Vec<ProviderEndpoint> {
        let url = format!("{}/v1/news/top", self.base_url);
        [("Business News", "business", "15"), ("Technology News", "tech", "10")]
            .into_iter()
            .map(|(name, categories, limit)| {
                ProviderEndpoint::new(
                    name,
                    url.clone(),
                    &[
                        ("api_token", api_key),
                        ("categories", categories),
                        ("language", "en"),
                        ("limit", limit),
                    ],
                )
            })
            .collect()
    }

    fn articles(&self, body: &Value) -> Vec<Value> {
        list(body, "data")
    }

    fn normalize(&self, raw: &Value) -> Option<CanonicalFields> {
        FieldMap {
            title: &["/title"],
            source: &["/source"],
            default_source: "TheNewsAPI",
            summary: &["/description", "/snippet"],
            url: &["/url"],
            image: &["/image_url"],
            published: &["/published_at"],
        }
        .apply(raw)
    }
}
