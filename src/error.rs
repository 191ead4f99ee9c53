#[derive(Debug, thiserror::Error)]
pub enum RoiError {
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse date: {0}")]
    ParseDateError(#[from] chrono::ParseError),
    #[error("Failed to convert date: {0}")]
    DateConversionError(String),
    #[error("Serde YAML Error: {0}")]
    SerdeYamlError(#[from] serde_yaml::Error),
    #[error("Serde JSON Error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("HTTP Error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("CSV Error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Configuration Error: {0}")]
    ConfigError(String),
    #[error("Failed to initialise tracing: {0}")]
    TracingInit(String),
}
