use std::io::Error as IoError;
use thiserror::Error;

pub type TrieResult<T> = Result<T, TrieError>;

#[derive(Debug, Error)]
pub enum TrieError {
    #[error("IO Error: {0}")]
    Io(#[from] IoError),

    #[error("Invalid Argument: {0}")]
    InvalidArgument(&'static str),

    #[error("Index {index} out of bounds for size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("Element lies outside the sub-trie prefix")]
    OutsidePrefix,

    #[error("Element cannot be serialized")]
    NotSerializable,

    #[error("Mutation of an immutable store")]
    Immutable,

    #[error("Unsupported Configuration: {0}")]
    UnsupportedConfiguration(&'static str),

    #[error("Malformed Stream: {0}")]
    MalformedStream(&'static str),

    #[error("Capacity Exhausted: store is capped at {cap} nodes")]
    CapacityExhausted { cap: usize },
}

impl PartialEq<Self> for TrieError {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
