pub mod config;
pub mod dispatcher;
pub mod enrichment;
pub mod error;
pub mod export;
pub mod ingestion;
pub mod reports;
pub mod resolver;
pub mod segment;
pub mod server;
