pub mod cleanup;
pub mod enhance;
pub mod ingest;

pub use cleanup::CleanupJob;
pub use enhance::EnhanceJob;
pub use ingest::IngestJob;
