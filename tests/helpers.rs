#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use chrono::{DateTime, TimeZone, Utc};

use feedwire::{
    api,
    app_state::AppState,
    config::{Config, FeedSource, FetchSettings},
    entities::NewArticle,
    repositories::ArticleRepository,
};

pub const MEMORY_DB: &str = "sqlite::memory:";

/// Build an RSS 2.0 document from `(title, link, pubDate)` triples.
pub fn rss_feed(items: &[(&str, &str, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(title, link, date)| {
            format!(
                "<item><title>{title}</title><link>{link}</link>\
                 <description>{title} in detail</description><pubDate>{date}</pubDate></item>"
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Fixture</title><link>https://example.com</link>
<description>Fixture feed</description>{items}</channel></rss>"#
    )
}

pub fn test_config(sources: Vec<FeedSource>) -> Config {
    Config::new(MEMORY_DB, "127.0.0.1:0")
        .with_sources(sources)
        .with_fetch(FetchSettings {
            timeout: Duration::from_secs(5),
            concurrency: 3,
            delay: Duration::ZERO,
        })
}

/// App state over a fresh in-memory store. No validator, no news providers.
pub async fn test_state(sources: Vec<FeedSource>) -> (AppState, ArticleRepository) {
    let repository = ArticleRepository::open(MEMORY_DB).await.unwrap();
    let state = AppState::from_config(&test_config(sources), repository.clone()).unwrap();
    (state, repository)
}

pub async fn test_app(sources: Vec<FeedSource>) -> (Router, ArticleRepository) {
    let (state, repository) = test_state(sources).await;
    (api::router(state), repository)
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
}

pub fn article(link: &str, title: &str, category: &str, published: DateTime<Utc>) -> NewArticle {
    NewArticle {
        title: title.to_string(),
        link: link.to_string(),
        content: format!("{title} full story"),
        summary: format!("{title} full story"),
        publication_date: published,
        source_name: "Fixture Wire".to_string(),
        category: category.to_string(),
        image_url: None,
        author: None,
        domains: vec![category.to_string()],
        read_minutes: 2,
    }
}

/// Store an article ingested `age_days` ago.
pub async fn seed(repository: &ArticleRepository, article: &NewArticle, age_days: i64) {
    let created_at = Utc::now() - chrono::Duration::days(age_days);
    assert!(repository.insert_at(article, created_at).await.unwrap());
}
