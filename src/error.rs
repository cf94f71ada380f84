use thiserror::Error;

/// Errors surfaced to callers of the extraction API.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Network failure or fetch timeout
    #[error("Failed to fetch URL: {0}")]
    FetchError(#[from] reqwest::Error),

    /// The page answered with a non-success status
    #[error("Fetching {url} returned HTTP {status}")]
    HttpStatus { status: u16, url: String },

    /// The URL could not be used for an import
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No strategy produced a recipe that passes the quality gate
    #[error("Could not read a recipe from this page (tried: {})", attempted.join(", "))]
    Unsupported { attempted: Vec<String> },

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

impl ExtractionError {
    /// True when the page could not be reached, as opposed to reached but not understood.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ExtractionError::FetchError(_) | ExtractionError::HttpStatus { .. }
        )
    }
}

/// Why a single strategy produced nothing. Logged, never returned to callers.
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("strategy does not apply to this page: {0}")]
    NotApplicable(String),

    #[error("malformed structured data: {0}")]
    Malformed(String),
}
