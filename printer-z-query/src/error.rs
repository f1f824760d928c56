//! Error types for query framing and tokenizing

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("no complete {{{code}!...}} frame in input")]
    Incomplete { code: String },

    #[error("response body exceeds {limit} bytes")]
    FrameTooLarge { limit: usize },

    #[error("invalid query code: {0:?}")]
    InvalidCode(String),

    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    #[error("dangling escape at end of input")]
    DanglingEscape,

    #[error("{0}")]
    Utf8(#[from] std::str::Utf8Error),
}
