use std::path::Path;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::ConfigError;

/// One configured feed. `category` is the static label attached to every item
/// from this feed; it is independent of the per-item classifier domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
    pub category: String,
}

impl FeedSource {
    pub fn new(name: &str, url: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            category: category.to_string(),
        }
    }
}

/// The feeds ingested when no `FEEDS_FILE` is configured.
pub fn default_sources() -> Vec<FeedSource> {
    vec![
        // Indian news
        FeedSource::new(
            "Times of India - Top Stories",
            "https://timesofindia.indiatimes.com/rssfeedstopstories.cms",
            "general",
        ),
        FeedSource::new(
            "NDTV - Top Stories",
            "https://feeds.feedburner.com/ndtvnews-top-stories",
            "general",
        ),
        FeedSource::new("Indian Express", "https://indianexpress.com/feed/", "general"),
        FeedSource::new("The Hindu", "https://www.thehindu.com/rssfeeds/", "general"),
        // Business & finance
        FeedSource::new(
            "Business Insider",
            "https://markets.businessinsider.com/rss/news",
            "business",
        ),
        FeedSource::new(
            "Economic Times - Business",
            "https://economictimes.indiatimes.com/rssfeedstopstories.cms",
            "business",
        ),
        FeedSource::new(
            "Moneycontrol - Business",
            "https://www.moneycontrol.com/rss/business.xml",
            "finance",
        ),
        FeedSource::new(
            "Bloomberg Markets",
            "https://feeds.bloomberg.com/markets/news.rss",
            "finance",
        ),
        // Technology & AI
        FeedSource::new(
            "TechCrunch AI",
            "https://techcrunch.com/tag/artificial-intelligence/feed/",
            "technology",
        ),
        FeedSource::new(
            "MIT Technology Review",
            "https://www.technologyreview.com/feed/",
            "technology",
        ),
        FeedSource::new(
            "The Verge",
            "https://www.theverge.com/rss/index.xml",
            "technology",
        ),
        FeedSource::new("Wired", "https://www.wired.com/feed/rss", "technology"),
        // Research
        FeedSource::new("arXiv AI", "https://arxiv.org/rss/cs.AI", "research"),
        FeedSource::new(
            "arXiv Machine Learning",
            "https://arxiv.org/rss/cs.LG",
            "research",
        ),
        // Startups & entrepreneurship
        FeedSource::new("YourStory", "https://yourstory.com/feed", "startups"),
        FeedSource::new("Inc.com", "https://www.inc.com/rss/", "entrepreneurship"),
        // Marketing & strategy
        FeedSource::new(
            "Harvard Business Review",
            "https://feeds.hbr.org/harvardbusiness",
            "marketing",
        ),
        FeedSource::new("Marketing Land", "https://marketingland.com/feed", "marketing"),
    ]
}

/// Read a JSON array of `{name, url, category}` objects.
pub fn load_sources_file(path: &Path) -> Result<Vec<FeedSource>, ConfigError> {
    let sources_error = |reason: String| ConfigError::Sources {
        path: path.display().to_string(),
        reason,
    };

    let raw = std::fs::read_to_string(path).map_err(|e| sources_error(e.to_string()))?;
    let sources: Vec<FeedSource> =
        serde_json::from_str(&raw).map_err(|e| sources_error(e.to_string()))?;

    if sources.is_empty() {
        return Err(sources_error("no feed sources listed".to_string()));
    }
    if let Some(bad) = sources.iter().find(|s| url::Url::parse(&s.url).is_err()) {
        return Err(sources_error(format!("invalid url for '{}': {}", bad.name, bad.url)));
    }

    Ok(sources)
}
