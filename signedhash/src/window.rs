//! Windowed byte-stream abstraction.
//!
//! The SignedHash stream loops (see [`crate::searcher`]) never see a whole
//! source at once; they pull fixed-size [`Window`]s through a
//! [`WindowReader`] and handle the case where a q-gram straddles two of
//! them. File I/O, memory mapping, and caching policy are external
//! collaborators — this module only defines the interface the core
//! consumes and one in-memory implementation used by tests and the demo.

use crate::error::IoError;

/// A bounded view onto a contiguous region of a byte stream, exposed as a
/// flat array. Bytes outside `[0, valid_len)` are undefined.
#[derive(Debug, Clone)]
pub struct Window {
    array: Box<[u8]>,
    start: u64,
    valid_len: usize,
}

impl Window {
    pub fn new(array: Box<[u8]>, start: u64, valid_len: usize) -> Self {
        debug_assert!(valid_len <= array.len());
        Window {
            array,
            start,
            valid_len,
        }
    }

    /// The underlying byte array. Only `[0, valid_len())` is meaningful.
    #[inline]
    pub fn array(&self) -> &[u8] {
        &self.array
    }

    /// Absolute start position of this window in the source.
    #[inline]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Number of valid bytes in this window (`<= array().len()`).
    #[inline]
    pub fn valid_len(&self) -> usize {
        self.valid_len
    }

    /// Absolute end position, one past the last valid byte.
    #[inline]
    pub fn end(&self) -> u64 {
        self.start + self.valid_len as u64
    }

    #[inline]
    pub fn contains(&self, pos: u64) -> bool {
        pos >= self.start && pos < self.end()
    }
}

/// Stateful byte-stream source yielding fixed-size [`Window`]s.
///
/// `window_for` is the only potentially blocking call (it may perform
/// I/O); everything else is expected to be served from whatever the last
/// fetched window cached. A `None` return from `window_for` is the
/// "past end" sentinel, distinct from an I/O error.
pub trait WindowReader {
    /// The window containing absolute position `pos`, or `None` if `pos`
    /// is at or past the end of the source.
    fn window_for(&mut self, pos: u64) -> Result<Option<&Window>, IoError>;

    /// `pos - window.start()` for the window that covers `pos`. Callers
    /// only invoke this right after a successful `window_for(pos)`.
    fn offset_in_window(&self, pos: u64) -> usize;

    /// A single byte at absolute position `pos`, or a negative sentinel
    /// if `pos` is past the end of the source.
    fn read_byte(&mut self, pos: u64) -> Result<i16, IoError>;

    /// Total source length, if known. Unbounded/unknown-length sources
    /// may need to read to end-of-stream before this resolves.
    fn length(&mut self) -> Result<u64, IoError>;

    /// Release any resources (file handles, caches) held by the reader.
    fn close(&mut self);
}

/// In-memory [`WindowReader`] over an owned buffer, split into fixed-size
/// windows. Exists for tests and the demo binary to exercise the stream
/// search path without an external file-reader crate.
pub struct VecWindowReader {
    data: Vec<u8>,
    window_size: usize,
    current: Option<Window>,
}

impl VecWindowReader {
    pub fn new(data: Vec<u8>, window_size: usize) -> Self {
        assert!(window_size > 0, "window_size must be positive");
        VecWindowReader {
            data,
            window_size,
            current: None,
        }
    }

    fn window_start(&self, pos: u64) -> u64 {
        (pos / self.window_size as u64) * self.window_size as u64
    }
}

impl WindowReader for VecWindowReader {
    fn window_for(&mut self, pos: u64) -> Result<Option<&Window>, IoError> {
        if pos >= self.data.len() as u64 {
            self.current = None;
            return Ok(None);
        }
        let needs_refetch = match &self.current {
            Some(w) => !w.contains(pos),
            None => true,
        };
        if needs_refetch {
            let start = self.window_start(pos);
            let start_usize = start as usize;
            let end_usize = (start_usize + self.window_size).min(self.data.len());
            let valid_len = end_usize - start_usize;
            let mut buf = vec![0u8; self.window_size];
            buf[..valid_len].copy_from_slice(&self.data[start_usize..end_usize]);
            self.current = Some(Window::new(buf.into_boxed_slice(), start, valid_len));
        }
        Ok(self.current.as_ref())
    }

    fn offset_in_window(&self, pos: u64) -> usize {
        (pos - self.window_start(pos)) as usize
    }

    fn read_byte(&mut self, pos: u64) -> Result<i16, IoError> {
        match self.data.get(pos as usize) {
            Some(&b) => Ok(b as i16),
            None => Ok(-1),
        }
    }

    fn length(&mut self) -> Result<u64, IoError> {
        Ok(self.data.len() as u64)
    }

    fn close(&mut self) {
        self.current = None;
    }
}
