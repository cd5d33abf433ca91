pub mod api;
pub mod app_state;
pub mod briefing;
pub mod classifier;
pub mod config;
pub mod enhance;
pub mod entities;
pub mod fetcher;
pub mod health;
pub mod ingest;
pub mod jobs;
pub mod normalizer;
pub mod providers;
pub mod query;
pub mod repositories;
pub mod telemetry;
