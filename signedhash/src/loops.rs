//! The SignedHash inner search loops: one forward/backward pair over a
//! flat byte array, one pair over a [`WindowReader`] stream. The array
//! loops are the reference shape; the stream loops add the q-gram
//! straddle logic for when a q-gram crosses a window boundary.

use crate::error::IoError;
use crate::hash::{pack_qgram, Q};
use crate::search_info::SearchInfo;
use crate::sequence_matcher::SequenceMatcher;
use crate::window::WindowReader;

// ---------------------------------------------------------------------------
// Array loops
// ---------------------------------------------------------------------------

/// Cursor aligned to the end of a potential match. Returns the first
/// match start position in `[from, min(to, data.len() - L)]`.
pub fn forward_array(
    seq: &SequenceMatcher,
    info: &SearchInfo,
    data: &[u8],
    from: usize,
    to: usize,
) -> Option<usize> {
    let l = seq.len();
    if l > data.len() || from > to {
        return None;
    }
    let last_pattern_pos = l - 1;
    let search_end = to.saturating_add(last_pattern_pos).min(data.len() - 1);
    let search_start = from.saturating_add(last_pattern_pos);
    if search_start > search_end {
        return None;
    }

    let mut i = search_start;
    while i <= search_end {
        let key = pack_qgram(data[i - 3], data[i - 2], data[i - 1], data[i]);
        let s = info.shift_for(key);
        if s <= 0 {
            let start = i - last_pattern_pos;
            // SAFETY: start + l <= data.len() since i <= search_end <= data.len() - 1
            // and start == i - (l - 1).
            if unsafe { seq.matches_unchecked(data, start) } {
                return Some(start);
            }
        }
        i += s.unsigned_abs() as usize;
    }
    None
}

/// Cursor aligned to the start of a potential match. Returns the first
/// match found scanning `[from, to]` in decreasing order — i.e. the
/// rightmost match at or below `to`.
pub fn backward_array(
    seq: &SequenceMatcher,
    info: &SearchInfo,
    data: &[u8],
    from: usize,
    to: usize,
) -> Option<usize> {
    let l = seq.len();
    if l > data.len() || from > to {
        return None;
    }
    let search_end = to.min(data.len() - l);
    let search_start = from;
    if search_start > search_end {
        return None;
    }

    let mut i = search_end;
    loop {
        let key = pack_qgram(data[i], data[i + 1], data[i + 2], data[i + 3]);
        let s = info.shift_for(key);
        if s <= 0 {
            // SAFETY: i <= search_end <= data.len() - l.
            if unsafe { seq.matches_unchecked(data, i) } {
                return Some(i);
            }
        }
        let step = s.unsigned_abs() as usize;
        match i.checked_sub(step) {
            Some(new_i) if new_i >= search_start => i = new_i,
            _ => return None,
        }
    }
}

// ---------------------------------------------------------------------------
// Stream loops
// ---------------------------------------------------------------------------

/// Reads the four bytes of the q-gram ending at absolute position `i`
/// through a [`WindowReader`], taking the fast path when the whole
/// q-gram lies in the window covering `i`, and falling back to
/// individual `read_byte` calls when it straddles a window boundary.
fn forward_qgram(reader: &mut dyn WindowReader, i: u64) -> Result<Option<u32>, IoError> {
    let last_byte;
    let o;
    {
        let window = match reader.window_for(i)? {
            Some(w) => w,
            None => return Ok(None),
        };
        o = reader.offset_in_window(i);
        if o >= Q - 1 {
            let bytes = &window.array()[o - 3..=o];
            return Ok(Some(pack_qgram(bytes[0], bytes[1], bytes[2], bytes[3])));
        }
        last_byte = window.array()[o];
    }
    let mut earlier = [0u8; 3];
    for k in 0..3u64 {
        let pos = i - (3 - k);
        let b = reader.read_byte(pos)?;
        if b < 0 {
            return Ok(None);
        }
        earlier[k as usize] = b as u8;
    }
    Ok(Some(pack_qgram(earlier[0], earlier[1], earlier[2], last_byte)))
}

/// Mirror of [`forward_qgram`] for the backward direction: the q-gram at
/// position `i` spans `[i, i+3]`; the straddle happens at the *forward*
/// edge of the window (`o + Q > window.valid_len()`).
fn backward_qgram(reader: &mut dyn WindowReader, i: u64) -> Result<Option<u32>, IoError> {
    let mut bytes = [0u8; 4];
    let available;
    {
        let window = match reader.window_for(i)? {
            Some(w) => w,
            None => return Ok(None),
        };
        let o = reader.offset_in_window(i);
        let valid_len = window.valid_len();
        if o + Q <= valid_len {
            let slice = &window.array()[o..o + Q];
            return Ok(Some(pack_qgram(slice[0], slice[1], slice[2], slice[3])));
        }
        let in_window = valid_len - o;
        bytes[..in_window].copy_from_slice(&window.array()[o..valid_len]);
        available = in_window;
    }
    for (idx, slot) in bytes.iter_mut().enumerate().skip(available) {
        let b = reader.read_byte(i + idx as u64)?;
        if b < 0 {
            return Ok(None);
        }
        *slot = b as u8;
    }
    Ok(Some(pack_qgram(bytes[0], bytes[1], bytes[2], bytes[3])))
}

/// Verifies a candidate match byte-by-byte through the reader. Simpler
/// than routing through windows since verification is comparatively
/// rare once the shift table has filtered candidates.
fn matches_stream(
    seq: &SequenceMatcher,
    reader: &mut dyn WindowReader,
    start: u64,
) -> Result<bool, IoError> {
    for j in 0..seq.len() {
        let b = reader.read_byte(start + j as u64)?;
        if b < 0 {
            return Ok(false);
        }
        if !seq.matcher_at(j).matches(b as u8) {
            return Ok(false);
        }
    }
    Ok(true)
}

pub fn forward_stream(
    seq: &SequenceMatcher,
    info: &SearchInfo,
    reader: &mut dyn WindowReader,
    from: u64,
    to: u64,
) -> Result<Option<u64>, IoError> {
    if from > to {
        return Ok(None);
    }
    let l = seq.len() as u64;
    let last_pattern_pos = l - 1;
    let search_end = to.saturating_add(last_pattern_pos);
    let mut i = from.saturating_add(last_pattern_pos);

    loop {
        if i > search_end {
            return Ok(None);
        }
        let key = match forward_qgram(reader, i)? {
            Some(k) => k,
            None => return Ok(None),
        };
        let s = info.shift_for(key);
        if s <= 0 {
            let start = i - last_pattern_pos;
            if matches_stream(seq, reader, start)? {
                return Ok(Some(start));
            }
        }
        i += s.unsigned_abs() as u64;
    }
}

pub fn backward_stream(
    seq: &SequenceMatcher,
    info: &SearchInfo,
    reader: &mut dyn WindowReader,
    from: u64,
    to: u64,
) -> Result<Option<u64>, IoError> {
    if from > to {
        return Ok(None);
    }
    let l = seq.len() as u64;
    let length = reader.length()?;
    if length < l {
        return Ok(None);
    }
    let search_end = to.min(length - l);
    let search_start = from;
    if search_start > search_end {
        return Ok(None);
    }

    let mut i = search_end;
    loop {
        let key = match backward_qgram(reader, i)? {
            Some(k) => k,
            None => return Ok(None),
        };
        let s = info.shift_for(key);
        if s <= 0 && matches_stream(seq, reader, i)? {
            return Ok(Some(i));
        }
        let step = s.unsigned_abs() as u64;
        match i.checked_sub(step) {
            Some(new_i) if new_i >= search_start => i = new_i,
            _ => return Ok(None),
        }
    }
}
