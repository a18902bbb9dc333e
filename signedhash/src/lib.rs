//! # signedhash
//!
//! Sublinear byte-sequence search using a signed, hashed q-gram shift
//! table (SignedHash), with automatic fallback to Shift-Or for patterns
//! too short or too unprofitable to hash.
//!
//! A pattern is a [`SequenceMatcher`]: an ordered sequence of
//! [`ByteMatcher`] predicates, each accepting either a single byte or an
//! arbitrary class of bytes. [`Searcher`] pre-processes a
//! `SequenceMatcher` once (lazily, via [`std::sync::OnceLock`]) and then
//! answers forward and backward searches over both flat byte arrays and
//! windowed streams ([`WindowReader`]).
//!
//! ## Usage
//!
//! ```rust
//! use signedhash::Searcher;
//!
//! let searcher = Searcher::new_from_bytes(b"needle", 0).unwrap();
//! let haystack = b"find the needle in the haystack";
//! assert_eq!(searcher.search_forward_array(haystack, 0, haystack.len()), Some(9));
//! ```
//!
//! Patterns with per-position byte classes are built directly from
//! [`ByteMatcher`]s:
//!
//! ```rust
//! use signedhash::{ByteMatcher, SequenceMatcher, Searcher};
//!
//! let seq = SequenceMatcher::new(vec![
//!     ByteMatcher::single(b'A'),
//!     ByteMatcher::set([b'B', b'C']).unwrap(),
//! ]).unwrap();
//! let searcher = Searcher::new_from_matcher(seq, 0).unwrap();
//! assert_eq!(searcher.search_forward_array(b"xxACxx", 0, 5), Some(2));
//! ```

pub use signedhash_pattern_macro::BytePattern;

mod byte_matcher;
mod error;
mod fallback;
mod hash;
mod loops;
mod permutation;
mod search_info;
mod sequence_matcher;
mod searcher;
mod window;

pub use byte_matcher::ByteMatcher;
pub use error::{IoError, SignedHashError};
pub use hash::{DEFAULT_POWER_TWO_SIZE, HASH_MULTIPLY, MAX_POWER_TWO_SIZE, MIN_POWER_TWO_SIZE, Q};
pub use searcher::Searcher;
pub use sequence_matcher::SequenceMatcher;
pub use window::{VecWindowReader, Window, WindowReader};

/// Implemented by `#[derive(BytePattern)]`. Generates a compile-time
/// [`SequenceMatcher`] from a `#[pattern(bytes = "...")]` attribute, so
/// call sites never pay the construction cost of building a
/// `SequenceMatcher` by hand for a fixed, known-at-compile-time pattern.
pub trait BytePattern {
    /// The literal bytes provided to `#[pattern(bytes = "...")]`.
    const BYTES: &'static [u8];

    /// Builds the `SequenceMatcher` this pattern describes. Called at
    /// most once per [`Searcher`] thanks to its own memoization; the
    /// derive macro does no caching of its own.
    fn sequence() -> SequenceMatcher;
}
