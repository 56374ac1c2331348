//! Storage strategies for the growable field buffer.
//!
//! The growable parser copies field bytes out of each input chunk into a
//! buffer it owns, so a field may span any number of `parse` calls. Where
//! that buffer lives is up to the [`Storage`] strategy:
//!
//! - [`Heap`] grows a `Vec<u8>` with fallible reservation.
//! - [`Arena`] writes into a fixed caller-provided slice and never touches
//!   the heap. Running out of room is an [`AllocError`], not a panic.
//!
//! Appends are all-or-nothing. A failed append leaves the buffer exactly as
//! it was, which is what makes a storage fault resumable.

use crate::error::AllocError;

/// Backing store for the bytes of the field being assembled.
pub trait Storage {
    /// Bytes appended since the last [`clear`](Self::clear).
    fn as_slice(&self) -> &[u8];

    /// Append `bytes`, or leave the buffer untouched and fail.
    fn try_extend(&mut self, bytes: &[u8]) -> Result<(), AllocError>;

    /// Append a single byte, or leave the buffer untouched and fail.
    #[inline]
    fn try_push(&mut self, byte: u8) -> Result<(), AllocError> {
        self.try_extend(&[byte])
    }

    /// Drop the content, keeping any capacity.
    fn clear(&mut self);

    /// Number of buffered bytes.
    #[inline]
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Check if nothing is buffered.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Heap storage with fallible growth.
#[derive(Debug, Clone, Default)]
pub struct Heap {
    bytes: Vec<u8>,
}

impl Heap {
    /// Create an empty buffer. Nothing is allocated until the first append.
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Create a buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Bytes the buffer can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }
}

impl Storage for Heap {
    #[inline]
    fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    fn try_extend(&mut self, bytes: &[u8]) -> Result<(), AllocError> {
        self.bytes.try_reserve(bytes.len()).map_err(|_| AllocError {
            requested: self.bytes.len().saturating_add(bytes.len()),
        })?;
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    #[inline]
    fn clear(&mut self) {
        self.bytes.clear();
    }
}

/// Fixed-capacity storage over caller memory. Never allocates.
///
/// ```
/// use sacsv_core::storage::{Arena, Storage};
///
/// let mut backing = [0u8; 4];
/// let mut arena = Arena::new(&mut backing);
/// arena.try_extend(b"abc").unwrap();
/// assert!(arena.try_extend(b"de").is_err());
/// assert_eq!(arena.as_slice(), b"abc");
/// ```
#[derive(Debug)]
pub struct Arena<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> Arena<'a> {
    /// Use `buf` as the whole capacity.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    /// Total capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }
}

impl Storage for Arena<'_> {
    #[inline]
    fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    #[inline]
    fn try_extend(&mut self, bytes: &[u8]) -> Result<(), AllocError> {
        let end = self.len + bytes.len();
        if end > self.buf.len() {
            return Err(AllocError { requested: end });
        }
        self.buf[self.len..end].copy_from_slice(bytes);
        self.len = end;
        Ok(())
    }

    #[inline]
    fn clear(&mut self) {
        self.len = 0;
    }
}
