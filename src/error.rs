use ::scraper::error::SelectorErrorKind;
use std::num::{ParseFloatError, ParseIntError};

/// All errors that can occur during DiveMeets scraping operations.
#[derive(thiserror::Error, Debug)]
pub enum DiveMeetsError {
    /// HTTP request failed (network, DNS, TLS, timeout, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Server returned a non-success HTTP status code.
    #[error("unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Failed to read the response body as text.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// A CSS selector string could not be parsed.
    #[error("invalid CSS selector: {0}")]
    Selector(String),

    /// Failed to parse an integer from scraped text.
    #[error("failed to parse integer: {0}")]
    IntParse(#[from] ParseIntError),

    /// Failed to parse a decimal score from scraped text.
    #[error("failed to parse number: {0}")]
    FloatParse(#[from] ParseFloatError),

    /// An expected HTML element was not found on the page.
    #[error("expected element not found: {context}")]
    ElementNotFound { context: &'static str },
}

impl<'a> From<SelectorErrorKind<'a>> for DiveMeetsError {
    fn from(err: SelectorErrorKind<'a>) -> Self {
        DiveMeetsError::Selector(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DiveMeetsError>;
