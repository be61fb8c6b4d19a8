#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    #[error("indexer request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("indexer returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("indexer query error: {0}")]
    GraphQl(String),
    #[error("unexpected indexer payload: {0}")]
    Decode(String),
    #[error("indexer response missing `{0}`")]
    MissingField(&'static str),
}

pub type IndexerResult<T> = Result<T, IndexerError>;
