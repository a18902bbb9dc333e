//! The public search API: constructs a [`SequenceMatcher`], lazily
//! pre-processes it into forward/backward [`SearchInfo`], and dispatches
//! each search call to the SignedHash loops or the ShiftOr fallback.

use std::sync::OnceLock;

use crate::error::{IoError, SignedHashError};
use crate::fallback::ShiftOr;
use crate::hash::MAX_POWER_TWO_SIZE;
use crate::loops;
use crate::search_info::{self, SearchInfo};
use crate::sequence_matcher::SequenceMatcher;
use crate::window::WindowReader;

/// A prepared search over one [`SequenceMatcher`]. Construction validates
/// the pattern and hash-size hint; every search call afterward is
/// infallible except for stream I/O errors. Pre-processing is lazy and
/// memoized with single-initialization semantics, so a `Searcher` is safe
/// to share across threads for concurrent read-only searches once
/// constructed.
pub struct Searcher {
    sequence: SequenceMatcher,
    hash_size_hint: i32,
    forward_info: OnceLock<Option<SearchInfo>>,
    backward_info: OnceLock<Option<SearchInfo>>,
    forward_fallback: OnceLock<ShiftOr>,
    backward_fallback: OnceLock<ShiftOr>,
}

impl Searcher {
    /// Builds a searcher over an already-constructed [`SequenceMatcher`].
    ///
    /// `hash_size_hint` semantics: `> 0` pins `HASH_SIZE` exactly; `= 0`
    /// picks it automatically up to `MAX_POWER_TWO_SIZE`; `< 0` picks
    /// automatically but caps at `-hash_size_hint`. Errors if
    /// `|hash_size_hint| > 28`.
    pub fn new_from_matcher(
        sequence: SequenceMatcher,
        hash_size_hint: i32,
    ) -> Result<Self, SignedHashError> {
        if hash_size_hint.unsigned_abs() > MAX_POWER_TWO_SIZE {
            return Err(SignedHashError::InvalidHashSizeHint {
                hint: hash_size_hint,
            });
        }
        Ok(Searcher {
            sequence,
            hash_size_hint,
            forward_info: OnceLock::new(),
            backward_info: OnceLock::new(),
            forward_fallback: OnceLock::new(),
            backward_fallback: OnceLock::new(),
        })
    }

    /// Convenience constructor for a literal byte pattern (no classes).
    pub fn new_from_bytes(bytes: &[u8], hash_size_hint: i32) -> Result<Self, SignedHashError> {
        let sequence = SequenceMatcher::from_bytes(bytes)?;
        Self::new_from_matcher(sequence, hash_size_hint)
    }

    /// The pattern this searcher was built from.
    pub fn sequence(&self) -> &SequenceMatcher {
        &self.sequence
    }

    /// Forces forward pre-processing now rather than on first search.
    pub fn prepare_forward(&self) {
        self.forward_info();
    }

    /// Forces backward pre-processing now rather than on first search.
    pub fn prepare_backward(&self) {
        self.backward_info();
    }

    fn forward_info(&self) -> &Option<SearchInfo> {
        self.forward_info
            .get_or_init(|| search_info::prepare_forward(&self.sequence, self.hash_size_hint))
    }

    fn backward_info(&self) -> &Option<SearchInfo> {
        self.backward_info
            .get_or_init(|| search_info::prepare_backward(&self.sequence, self.hash_size_hint))
    }

    fn forward_fallback(&self) -> &ShiftOr {
        self.forward_fallback
            .get_or_init(|| ShiftOr::new_forward(&self.sequence))
    }

    fn backward_fallback(&self) -> &ShiftOr {
        self.backward_fallback
            .get_or_init(|| ShiftOr::new_backward(&self.sequence))
    }

    /// First match position in `[from, min(to, data.len() - L)]`, or
    /// `None`.
    pub fn search_forward_array(&self, data: &[u8], from: usize, to: usize) -> Option<usize> {
        match self.forward_info() {
            Some(info) => loops::forward_array(&self.sequence, info, data, from, to),
            None => {
                log::debug!("forward array search using ShiftOr fallback");
                self.forward_fallback().search_forward(data, from, to)
            }
        }
    }

    /// Rightmost match position in `[from, to]`, scanning in decreasing
    /// order, or `None`.
    pub fn search_backward_array(&self, data: &[u8], from: usize, to: usize) -> Option<usize> {
        match self.backward_info() {
            Some(info) => loops::backward_array(&self.sequence, info, data, from, to),
            None => {
                log::debug!("backward array search using ShiftOr fallback");
                self.backward_fallback().search_backward(data, from, to)
            }
        }
    }

    /// Stream counterpart of [`search_forward_array`](Self::search_forward_array).
    pub fn search_forward_stream(
        &self,
        reader: &mut dyn WindowReader,
        from: u64,
        to: u64,
    ) -> Result<Option<u64>, IoError> {
        match self.forward_info() {
            Some(info) => loops::forward_stream(&self.sequence, info, reader, from, to),
            None => {
                log::debug!("forward stream search using ShiftOr fallback");
                self.forward_fallback().search_forward_stream(reader, from, to)
            }
        }
    }

    /// Stream counterpart of [`search_backward_array`](Self::search_backward_array).
    pub fn search_backward_stream(
        &self,
        reader: &mut dyn WindowReader,
        from: u64,
        to: u64,
    ) -> Result<Option<u64>, IoError> {
        match self.backward_info() {
            Some(info) => loops::backward_stream(&self.sequence, info, reader, from, to),
            None => {
                log::debug!("backward stream search using ShiftOr fallback");
                self.backward_fallback()
                    .search_backward_stream(reader, from, to)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_matcher::ByteMatcher;
    use crate::window::VecWindowReader;

    #[test]
    fn invalid_hash_size_hint_rejected() {
        assert!(Searcher::new_from_bytes(b"abcd", 29).is_err());
        assert!(Searcher::new_from_bytes(b"abcd", -29).is_err());
        assert!(Searcher::new_from_bytes(b"abcd", 28).is_ok());
    }

    #[test]
    fn empty_sequence_rejected_at_construction() {
        assert!(SequenceMatcher::from_bytes(b"").is_err());
    }

    // Pattern shorter than Q uses the fallback.
    #[test]
    fn short_pattern_uses_fallback() {
        let s = Searcher::new_from_bytes(b"fgh", 0).unwrap();
        let data = b"abcdefghij";
        assert_eq!(s.search_forward_array(data, 0, data.len()), Some(5));
    }

    #[test]
    fn forward_and_backward_agree_on_lazy_pattern() {
        let s = Searcher::new_from_bytes(b"lazy", 0).unwrap();
        let data = b"The quick brown fox jumps over the lazy dog";
        assert_eq!(s.search_forward_array(data, 0, data.len()), Some(35));
        assert_eq!(s.search_backward_array(data, 0, 42), Some(35));
    }

    // A match surrounded by long zero runs: shift table stays sparse,
    // non-max entries are only the terminal-aligned q-gram buckets.
    #[test]
    fn deadbeef_in_zero_padding() {
        let mut data = vec![0u8; 1024];
        data.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        data.extend(vec![0u8; 1024]);
        let s = Searcher::new_from_bytes(&[0xDE, 0xAD, 0xBE, 0xEF], 0).unwrap();
        assert_eq!(s.search_forward_array(&data, 0, data.len()), Some(1024));
    }

    // Byte class at an interior position: the search must find the first
    // position where any class member completes the match.
    #[test]
    fn interior_byte_class_finds_first_accepting_member() {
        let seq = SequenceMatcher::new(vec![
            ByteMatcher::single(b'A'),
            ByteMatcher::single(b'B'),
            ByteMatcher::set([b'C', b'D', b'E']).unwrap(),
            ByteMatcher::single(b'F'),
        ])
        .unwrap();
        let s = Searcher::new_from_matcher(seq, 0).unwrap();
        let data = b"ABZFABCEABDF";
        assert_eq!(s.search_forward_array(data, 0, data.len()), Some(8));
    }

    // A pattern that never matches still terminates cleanly.
    #[test]
    fn long_pattern_with_no_match_returns_none() {
        let s = Searcher::new_from_bytes(&[0xFFu8; 32], 0).unwrap();
        let data = vec![0u8; 10_000];
        assert_eq!(s.search_forward_array(&data, 0, data.len()), None);
    }

    // Match straddling stream windows must still be found.
    #[test]
    fn stream_search_finds_match_straddling_windows() {
        let mut data = vec![0u8; 100];
        let pattern = b"needle1234";
        data[5..5 + pattern.len()].copy_from_slice(pattern);
        let s = Searcher::new_from_bytes(pattern, 0).unwrap();
        let mut reader = VecWindowReader::new(data.clone(), 7);
        let found = s
            .search_forward_stream(&mut reader, 0, data.len() as u64 - 1)
            .unwrap();
        assert_eq!(found, Some(5));
    }

    #[test]
    fn array_and_stream_search_agree() {
        let data: Vec<u8> = (0..500u32).map(|i| (i % 251) as u8).collect();
        let pattern = &data[123..123 + 9];
        let s = Searcher::new_from_bytes(pattern, 0).unwrap();
        let array_result = s.search_forward_array(&data, 0, data.len());
        for window_size in [4usize, 7, 16, 64] {
            let mut reader = VecWindowReader::new(data.clone(), window_size);
            let stream_result = s
                .search_forward_stream(&mut reader, 0, data.len() as u64 - 1)
                .unwrap();
            assert_eq!(stream_result, array_result.map(|v| v as u64));
        }
    }

    #[test]
    fn backward_array_and_stream_agree() {
        let data: Vec<u8> = (0..500u32).map(|i| (i % 251) as u8).collect();
        let pattern = &data[123..123 + 9];
        let s = Searcher::new_from_bytes(pattern, 0).unwrap();
        let array_result = s.search_backward_array(&data, 0, data.len() - 1);
        for window_size in [4usize, 7, 16, 64] {
            let mut reader = VecWindowReader::new(data.clone(), window_size);
            let stream_result = s
                .search_backward_stream(&mut reader, 0, data.len() as u64 - 1)
                .unwrap();
            assert_eq!(stream_result, array_result.map(|v| v as u64));
        }
    }

    #[test]
    fn from_greater_than_to_is_no_match() {
        let s = Searcher::new_from_bytes(b"abcd", 0).unwrap();
        assert_eq!(s.search_forward_array(b"abcdabcd", 5, 2), None);
        assert_eq!(s.search_backward_array(b"abcdabcd", 5, 2), None);
    }

    #[test]
    fn empty_data_is_no_match() {
        let s = Searcher::new_from_bytes(b"abcd", 0).unwrap();
        assert_eq!(s.search_forward_array(b"", 0, 0), None);
    }

    #[test]
    fn explicit_hash_size_hint_is_respected() {
        let s = Searcher::new_from_bytes(b"abcdefghijklmnop", 8).unwrap();
        s.prepare_forward();
        let data = b"xxxabcdefghijklmnopxxx";
        assert_eq!(s.search_forward_array(data, 0, data.len()), Some(3));
    }

    #[test]
    fn repeated_forward_search_is_monotonic() {
        let s = Searcher::new_from_bytes(b"ab", 0).unwrap();
        let data = b"ababababab";
        let mut positions = Vec::new();
        let mut from = 0;
        while let Some(pos) = s.search_forward_array(data, from, data.len()) {
            positions.push(pos);
            from = pos + 1;
        }
        assert_eq!(positions, vec![0, 2, 4, 6, 8]);
    }
}
