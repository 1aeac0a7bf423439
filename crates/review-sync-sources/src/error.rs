use thiserror::Error;

/// Failure while fetching or decoding feedback pages. Any of these is
/// fatal to the current run: a partial crawl result is never trusted.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("feedback endpoint request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feedback endpoint returned status {status} for {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("malformed feedback payload: {0}")]
    Malformed(String),
}
