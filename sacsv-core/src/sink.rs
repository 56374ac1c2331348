//! Field sinks: where the bytes of the field being assembled go.
//!
//! The transition engine reads its input through a sink and writes decoded
//! field bytes back into it. Positions handed to the sink are indexes into
//! [`Sink::input`].
//!
//! - [`GrowableSink`] reads from the caller's chunk and copies into a
//!   [`Storage`] it does not share with the caller.
//! - [`InPlaceSink`] reads from and writes to the same caller buffer. Bytes
//!   are written at or before the byte currently being read, so decoding
//!   compacts the field in place (`""` shrinks to `"`) without ever
//!   clobbering input that has not been read yet.

use std::ops::Range;

use crate::error::AllocError;
use crate::storage::Storage;

/// The contract the transition engine drives.
pub(crate) trait Sink {
    /// Input visible to the engine in this call.
    fn input(&self) -> &[u8];

    /// Start a new field whose content begins at input position `at`.
    fn open(&mut self, at: usize);

    /// Append a byte that is not copied from the input, such as the single
    /// quote decoded from `""` or a CR that turned out to be literal.
    fn append(&mut self, byte: u8) -> Result<(), AllocError>;

    /// Append the input bytes in `run`.
    fn append_run(&mut self, run: Range<usize>) -> Result<(), AllocError>;

    /// Decoded bytes of the open field.
    #[cfg(test)]
    fn pending(&self) -> &[u8];

    /// Forget the open field.
    fn reset(&mut self);
}

/// Sink copying into session-owned storage.
pub(crate) struct GrowableSink<'a, S> {
    input: &'a [u8],
    storage: &'a mut S,
}

impl<'a, S: Storage> GrowableSink<'a, S> {
    pub(crate) fn new(input: &'a [u8], storage: &'a mut S) -> Self {
        Self { input, storage }
    }
}

impl<S: Storage> Sink for GrowableSink<'_, S> {
    #[inline]
    fn input(&self) -> &[u8] {
        self.input
    }

    #[inline]
    fn open(&mut self, _at: usize) {
        debug_assert!(self.storage.is_empty());
    }

    #[inline]
    fn append(&mut self, byte: u8) -> Result<(), AllocError> {
        self.storage.try_push(byte)
    }

    #[inline]
    fn append_run(&mut self, run: Range<usize>) -> Result<(), AllocError> {
        self.storage.try_extend(&self.input[run])
    }

    #[cfg(test)]
    fn pending(&self) -> &[u8] {
        self.storage.as_slice()
    }

    #[inline]
    fn reset(&mut self) {
        self.storage.clear();
    }
}

/// Location of the open field inside an in-place buffer.
///
/// `start..end` holds the decoded bytes; `end` never passes the next unread
/// input byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FieldSpan {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

/// Sink decoding into the caller's own buffer.
pub(crate) struct InPlaceSink<'a> {
    buf: &'a mut [u8],
    field: &'a mut FieldSpan,
}

impl<'a> InPlaceSink<'a> {
    pub(crate) fn new(buf: &'a mut [u8], field: &'a mut FieldSpan) -> Self {
        Self { buf, field }
    }
}

impl Sink for InPlaceSink<'_> {
    #[inline]
    fn input(&self) -> &[u8] {
        self.buf
    }

    #[inline]
    fn open(&mut self, at: usize) {
        self.field.start = at;
        self.field.end = at;
    }

    #[inline]
    fn append(&mut self, byte: u8) -> Result<(), AllocError> {
        self.buf[self.field.end] = byte;
        self.field.end += 1;
        Ok(())
    }

    #[inline]
    fn append_run(&mut self, run: Range<usize>) -> Result<(), AllocError> {
        let len = run.len();
        // Nothing has been compacted yet: the bytes are already in place.
        if run.start != self.field.end {
            self.buf.copy_within(run, self.field.end);
        }
        self.field.end += len;
        Ok(())
    }

    #[cfg(test)]
    fn pending(&self) -> &[u8] {
        &self.buf[self.field.start..self.field.end]
    }

    #[inline]
    fn reset(&mut self) {
        self.field.end = self.field.start;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Heap;

    #[test]
    fn test_growable_copies_runs() {
        let mut heap = Heap::new();
        let mut sink = GrowableSink::new(b"abc,def", &mut heap);
        sink.open(4);
        sink.append_run(4..7).unwrap();
        sink.append(b'!').unwrap();
        assert_eq!(sink.pending(), b"def!");
        sink.reset();
        assert_eq!(sink.pending(), b"");
    }

    #[test]
    fn test_in_place_without_compaction() {
        let mut buf = *b"abc,def";
        let mut field = FieldSpan::default();
        let mut sink = InPlaceSink::new(&mut buf, &mut field);
        sink.open(4);
        sink.append_run(4..7).unwrap();
        assert_eq!(sink.pending(), b"def");
        assert_eq!(field, FieldSpan { start: 4, end: 7 });
    }

    #[test]
    fn test_in_place_compacts_doubled_quote() {
        // "a""b" decodes to a"b, written over the input.
        let mut buf = *b"\"a\"\"b\"";
        let mut field = FieldSpan::default();
        let mut sink = InPlaceSink::new(&mut buf, &mut field);
        sink.open(1);
        sink.append_run(1..2).unwrap();
        sink.append(b'"').unwrap();
        sink.append_run(4..5).unwrap();
        assert_eq!(sink.pending(), b"a\"b");
        assert_eq!(&buf[1..4], b"a\"b");
    }
}
