use thiserror::Error;

#[derive(Error, Debug)]
pub enum IncomeSeriesError {
    #[error("Malformed upstream payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[cfg(feature = "argyle")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[cfg(feature = "argyle")]
    #[error("Argyle API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, IncomeSeriesError>;
