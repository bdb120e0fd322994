use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid selector, can't scrape with it. Selector: {0}")]
    ParseInvalidSelector(String),
    #[error("Invalid pattern, can't scan the payload with it. Pattern: {0}")]
    ParseInvalidPattern(String),
    #[error("The page is missing an expected element: {0}")]
    ParseMissingElement(&'static str),

    #[error("Batch size has to be a positive integer, got {0}.")]
    InvalidBatchSize(usize),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
