use thiserror::Error;

#[derive(Error, Debug)]
pub enum RadarError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("Malformed file: {0}")]
    MalformedFile(String),

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("No parseable CSV files found in {0}")]
    NoInputFiles(String),

    #[error("No rows matched segment {0}")]
    EmptyReport(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Pergunta nao reconhecida")]
    UnknownQuestion,
}

pub type Result<T> = std::result::Result<T, RadarError>;
