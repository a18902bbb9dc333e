//! Pre-processing: turns a [`SequenceMatcher`] into a signed shift table
//! and hash parameters for one search direction.
//!
//! This is the heaviest piece of the algorithm. The table-size selection
//! (load-factor guarded qgram-start scan), `HASH_SIZE` selection, and the
//! fill/negate passes are implemented here for both directions.

use crate::hash::{
    hash, MAX_POWER_TWO_SIZE, MIN_POWER_TWO_SIZE, Q,
};
use crate::permutation::QgramKeys;
use crate::sequence_matcher::SequenceMatcher;

/// Pre-computed shift table and hash parameters for one search direction.
/// `None` (never constructed — the caller sees `Option<SearchInfo>`)
/// denotes "pattern unsearchable by SignedHash; use the ShiftOr
/// fallback."
#[derive(Debug)]
pub struct SearchInfo {
    shifts: Box<[i32]>,
    hash_shift: u32,
    max_search_shift: i32,
}

impl SearchInfo {
    #[inline]
    pub fn hash_shift(&self) -> u32 {
        self.hash_shift
    }

    #[inline]
    pub fn max_search_shift(&self) -> i32 {
        self.max_search_shift
    }

    /// Looks up the signed shift for a packed q-gram key.
    #[inline(always)]
    pub fn shift_for(&self, key: u32) -> i32 {
        self.shifts[hash(key, self.hash_shift)]
    }

    #[cfg(test)]
    pub(crate) fn table_len(&self) -> usize {
        self.shifts.len()
    }
}

fn effective_max_power_two(power_two_size: i32) -> u32 {
    if power_two_size > 0 {
        power_two_size as u32
    } else if power_two_size < 0 {
        (-power_two_size) as u32
    } else {
        MAX_POWER_TWO_SIZE
    }
}

fn ceil_log2(n: u64) -> u32 {
    if n <= 1 {
        return 0;
    }
    64 - (n - 1).leading_zeros()
}

fn resolve_hash_size(power_two_size: i32, effective_max: u32, total_qgrams: u64) -> u32 {
    if power_two_size > 0 {
        return power_two_size as u32;
    }
    ceil_log2(total_qgrams.max(1)).clamp(MIN_POWER_TWO_SIZE, effective_max)
}

fn qgram_product(seq: &SequenceMatcher, start: usize) -> u64 {
    (0..Q)
        .map(|k| seq.num_bytes_at(start + k) as u64)
        .product()
}

fn qgram_keys_at(seq: &SequenceMatcher, start: usize) -> QgramKeys<'_> {
    QgramKeys::new([
        seq.matcher_at(start).accepted_bytes(),
        seq.matcher_at(start + 1).accepted_bytes(),
        seq.matcher_at(start + 2).accepted_bytes(),
        seq.matcher_at(start + 3).accepted_bytes(),
    ])
}

/// Forward pre-processing.
pub fn prepare_forward(seq: &SequenceMatcher, power_two_size: i32) -> Option<SearchInfo> {
    let l = seq.len();
    if l < Q {
        log::debug!("pattern length {l} < Q={Q}, forward SignedHash unsearchable");
        return None;
    }

    let effective_max = effective_max_power_two(power_two_size);
    let max_table_size = 1u64 << effective_max;

    // Step A — qgram-start scan, walking from L-Q down to 0.
    let mut total_qgrams: u64 = 0;
    let mut qgram_start: usize = 0;
    for p in (0..=(l - Q)).rev() {
        let product = qgram_product(seq, p);
        let candidate = total_qgrams + product;
        if candidate / 4 >= max_table_size {
            qgram_start = p + 1;
            break;
        }
        total_qgrams = candidate;
        qgram_start = p;
    }

    // Step B — HASH_SIZE.
    let hash_size = resolve_hash_size(power_two_size, effective_max, total_qgrams);

    // Step C — max shift gate.
    let max_search_shift = (l - Q - qgram_start + 1) as i32;
    log::debug!(
        "forward prep: L={l} qgram_start={qgram_start} hash_size={hash_size} max_search_shift={max_search_shift}"
    );
    if max_search_shift < 2 {
        log::debug!("forward SignedHash unsearchable: max_search_shift < 2");
        return None;
    }

    // Step D — fill table with interior shifts.
    let table_size = 1usize << hash_size;
    let mut shifts = vec![max_search_shift; table_size];
    let hash_shift = 64 - hash_size;

    // max_search_shift >= 2 guarantees qgram_start + Q - 1 <= l - 2, so
    // this range is always non-empty here.
    for e in (qgram_start + Q - 1)..=(l - 2) {
        let start = e + 1 - Q;
        let current_shift = (l - 1 - e) as i32;
        for key in qgram_keys_at(seq, start) {
            let h = hash(key, hash_shift);
            if current_shift < shifts[h] {
                shifts[h] = current_shift;
            }
        }
    }

    // Step E — negate terminal q-gram buckets.
    let terminal_start = l - Q;
    for key in qgram_keys_at(seq, terminal_start) {
        let h = hash(key, hash_shift);
        if shifts[h] > 0 {
            shifts[h] = -shifts[h];
        }
    }

    Some(SearchInfo {
        shifts: shifts.into_boxed_slice(),
        hash_shift,
        max_search_shift,
    })
}

/// Backward pre-processing. The mirror of [`prepare_forward`]:
/// the qgram-start scan walks increasing instead of decreasing, the
/// terminal q-gram sits at pattern start instead of pattern end, and
/// shifts measure distance from pattern start instead of distance to
/// pattern end.
pub fn prepare_backward(seq: &SequenceMatcher, power_two_size: i32) -> Option<SearchInfo> {
    let l = seq.len();
    if l < Q {
        log::debug!("pattern length {l} < Q={Q}, backward SignedHash unsearchable");
        return None;
    }

    let effective_max = effective_max_power_two(power_two_size);
    let max_table_size = 1u64 << effective_max;

    // Step A — qgram-start scan, walking from 0 up to L-Q.
    let mut total_qgrams: u64 = 0;
    let mut qgram_end_cutoff: usize = l - Q + 1;
    for s in 0..=(l - Q) {
        let product = qgram_product(seq, s);
        let candidate = total_qgrams + product;
        if candidate / 4 >= max_table_size {
            qgram_end_cutoff = s;
            break;
        }
        total_qgrams = candidate;
    }

    // Step B — HASH_SIZE.
    let hash_size = resolve_hash_size(power_two_size, effective_max, total_qgrams);

    // Step C — max shift gate. The count of valid start positions
    // [0, qgram_end_cutoff) mirrors forward's [qgram_start, L-Q].
    let max_search_shift = qgram_end_cutoff as i32;
    log::debug!(
        "backward prep: L={l} qgram_end_cutoff={qgram_end_cutoff} hash_size={hash_size} max_search_shift={max_search_shift}"
    );
    if max_search_shift < 2 {
        log::debug!("backward SignedHash unsearchable: max_search_shift < 2");
        return None;
    }

    // Step D — fill table with interior shifts: start positions
    // 1..qgram_end_cutoff, shift equals the start position itself.
    let table_size = 1usize << hash_size;
    let mut shifts = vec![max_search_shift; table_size];
    let hash_shift = 64 - hash_size;

    for s in 1..qgram_end_cutoff {
        let current_shift = s as i32;
        for key in qgram_keys_at(seq, s) {
            let h = hash(key, hash_shift);
            if current_shift < shifts[h] {
                shifts[h] = current_shift;
            }
        }
    }

    // Step E — negate terminal q-gram buckets (start position 0).
    for key in qgram_keys_at(seq, 0) {
        let h = hash(key, hash_shift);
        if shifts[h] > 0 {
            shifts[h] = -shifts[h];
        }
    }

    Some(SearchInfo {
        shifts: shifts.into_boxed_slice(),
        hash_shift,
        max_search_shift,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_matcher::ByteMatcher;

    #[test]
    fn too_short_pattern_is_unsearchable() {
        let s = SequenceMatcher::from_bytes(b"ab").unwrap();
        assert!(prepare_forward(&s, 0).is_none());
        assert!(prepare_backward(&s, 0).is_none());
    }

    #[test]
    fn minimal_q_length_pattern_is_unsearchable() {
        // L == Q gives MAX_SEARCH_SHIFT == 1 < 2.
        let s = SequenceMatcher::from_bytes(b"abcd").unwrap();
        assert!(prepare_forward(&s, 0).is_none());
        assert!(prepare_backward(&s, 0).is_none());
    }

    #[test]
    fn terminal_qgram_is_negative() {
        let s = SequenceMatcher::from_bytes(b"deadbeef").unwrap();
        let info = prepare_forward(&s, 0).unwrap();
        let terminal_key = crate::hash::pack_qgram(b'b', b'e', b'e', b'f');
        assert!(info.shift_for(terminal_key) < 0);
    }

    #[test]
    fn backward_terminal_qgram_is_negative() {
        let s = SequenceMatcher::from_bytes(b"deadbeef").unwrap();
        let info = prepare_backward(&s, 0).unwrap();
        let terminal_key = crate::hash::pack_qgram(b'd', b'e', b'a', b'd');
        assert!(info.shift_for(terminal_key) < 0);
    }

    #[test]
    fn unseen_qgram_keeps_max_search_shift() {
        let s = SequenceMatcher::from_bytes(b"abcdefghij").unwrap();
        let info = prepare_forward(&s, 0).unwrap();
        let never_seen = crate::hash::pack_qgram(0, 0, 0, 0);
        assert_eq!(info.shift_for(never_seen), info.max_search_shift());
    }

    #[test]
    fn explicit_hash_size_hint_is_honored() {
        let s = SequenceMatcher::from_bytes(b"abcdefghij").unwrap();
        let info = prepare_forward(&s, 6).unwrap();
        assert_eq!(info.table_len(), 1 << 6);
    }

    #[test]
    fn byte_class_permutations_all_produce_shifts() {
        // Positions [A, B, {C,D,E}, F]: the interior q-gram at the class
        // position must produce shifts for all three permutations.
        let s = SequenceMatcher::new(vec![
            ByteMatcher::single(b'A'),
            ByteMatcher::single(b'B'),
            ByteMatcher::set([b'C', b'D', b'E']).unwrap(),
            ByteMatcher::single(b'F'),
            ByteMatcher::single(b'X'),
            ByteMatcher::single(b'Y'),
        ])
        .unwrap();
        let info = prepare_forward(&s, 0).unwrap();
        for c in [b'C', b'D', b'E'] {
            let key = crate::hash::pack_qgram(b'A', b'B', c, b'F');
            assert!(info.shift_for(key) > 0);
        }
    }
}
