//! Error types for searcher construction and stream I/O.

use thiserror::Error;

/// Raised at searcher construction time. Never raised by a search call —
/// once a `Searcher` exists it is infallible to use.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignedHashError {
    #[error("sequence matcher must have at least one position")]
    EmptySequence,
    #[error("hash size hint {hint} out of range, must satisfy |hint| <= 28")]
    InvalidHashSizeHint { hint: i32 },
    #[error("byte matcher accepts no byte")]
    EmptyByteClass,
}

/// Opaque I/O failure surfaced by a [`crate::window::WindowReader`].
///
/// The core never performs I/O itself; this type exists so stream search
/// callers and `WindowReader` implementors have a concrete error to
/// propagate through `search_forward_stream`/`search_backward_stream`.
#[derive(Debug, Error)]
#[error("window reader I/O error: {0}")]
pub struct IoError(pub String);

impl IoError {
    pub fn new(reason: impl Into<String>) -> Self {
        IoError(reason.into())
    }
}
