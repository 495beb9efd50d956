use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LOOKUP_URL: &str =
    "https://servicodados.ibge.gov.br/api/v1/localidades/municipios";

/// Runtime configuration. Every flag can also come from the environment
/// (or a `.env` file loaded at startup).
#[derive(Parser, Debug, Clone)]
#[command(name = "empresa-radar")]
#[command(about = "Company registry enrichment and report server")]
pub struct Config {
    /// Interface to bind the HTTP server to
    #[arg(long, env = "SERVER_HOST", default_value = "localhost")]
    pub host: String,

    #[arg(long, env = "SERVER_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Directory scanned for `*.csv` company files
    #[arg(long, env = "DATA_DIR", default_value = "dataset_empresa")]
    pub data_dir: PathBuf,

    /// Spreadsheet written by the export report
    #[arg(long, env = "EXPORT_FILE", default_value = "analise_empresas.xlsx")]
    pub export_file: PathBuf,

    /// Base URL of the municipality lookup service; the id is appended as a path segment
    #[arg(long, env = "LOOKUP_URL", default_value = DEFAULT_LOOKUP_URL)]
    pub lookup_url: String,

    /// Maximum in-flight municipality lookups per enrichment pass
    #[arg(long, env = "LOOKUP_CONCURRENCY", default_value_t = default_concurrency())]
    pub lookup_concurrency: usize,

    #[arg(long, env = "LOOKUP_TIMEOUT_SECS", default_value_t = 10)]
    pub lookup_timeout_secs: u64,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    /// Concurrency limit, never below one.
    pub fn effective_concurrency(&self) -> usize {
        self.lookup_concurrency.max(1)
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["empresa-radar"]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_dir, PathBuf::from("dataset_empresa"));
        assert_eq!(config.export_file, PathBuf::from("analise_empresas.xlsx"));
        assert!(config.effective_concurrency() >= 1);
    }

    #[test]
    fn test_flags_override() {
        let config = Config::parse_from([
            "empresa-radar",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--lookup-concurrency",
            "0",
        ]);
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.effective_concurrency(), 1);
    }
}
