//! Zero-allocation parser decoding into the caller's buffer.
//!
//! [`InPlaceParser`] borrows the whole document mutably for its lifetime and
//! decodes each field over its own input bytes: quotes are dropped and `""`
//! is compacted to `"` by shifting the rest of the field left. Nothing is
//! ever allocated.
//!
//! Once a field is delivered, the part of the buffer in front of the read
//! position is split off and handed out for good, so field slices live as
//! long as the buffer borrow (`'buf`), not just for the callback:
//!
//! ```
//! use sacsv_core::{Abort, ErrorCode, FieldHandler, Handler, InPlaceParser, KeepGoing};
//!
//! #[derive(Default)]
//! struct Collect<'a> {
//!     fields: Vec<&'a [u8]>,
//! }
//!
//! impl Handler for Collect<'_> {
//!     type Signal = KeepGoing;
//!     type Fault = std::convert::Infallible;
//!
//!     fn start_row(&mut self) -> Result<KeepGoing, Self::Fault> { Ok(KeepGoing) }
//!     fn end_row(&mut self) -> Result<KeepGoing, Self::Fault> { Ok(KeepGoing) }
//!     fn error(&mut self, _: ErrorCode) -> Abort { Abort }
//! }
//!
//! impl<'a> FieldHandler<'a> for Collect<'a> {
//!     fn field(&mut self, value: &'a [u8]) -> Result<KeepGoing, Self::Fault> {
//!         self.fields.push(value);
//!         Ok(KeepGoing)
//!     }
//! }
//!
//! let mut buf = b"\"a\"\"b\",c\r\n".to_vec();
//! let mut collect = Collect::default();
//! let mut parser = InPlaceParser::new(&mut buf);
//! assert!(parser.finish(&mut collect).unwrap());
//! assert_eq!(collect.fields, [&b"a\"b"[..], b"c"]);
//! ```
//!
//! The parser keeps its own read position. [`parse_until`] consumes up to an
//! offset, so the same buffer can be fed in pieces as it fills up.
//!
//! [`parse_until`]: InPlaceParser::parse_until

use std::mem;

use tracing::debug;

use crate::class::ScanMode;
use crate::error::{ErrorCode, Fault};
use crate::handler::FieldHandler;
use crate::machine::{Emit, Machine, State};
use crate::parser::{answer, report, Feed};
use crate::sink::{FieldSpan, InPlaceSink};

/// Streaming parser that decodes fields in place.
#[derive(Debug)]
pub struct InPlaceParser<'buf> {
    /// Buffer from the last delivered field's end on.
    rest: &'buf mut [u8],
    /// Offset of `rest[0]` in the whole buffer.
    offset: usize,
    /// Next unread byte, relative to `rest`.
    cursor: usize,
    /// Field being decoded, relative to `rest`.
    field: FieldSpan,
    machine: Machine,
}

impl<'buf> InPlaceParser<'buf> {
    /// Parse the document held in `buf`.
    pub fn new(buf: &'buf mut [u8]) -> Self {
        Self {
            rest: buf,
            offset: 0,
            cursor: 0,
            field: FieldSpan::default(),
            machine: Machine::new(ScanMode::default()),
        }
    }

    /// Choose the run scanner.
    pub fn scan_mode(mut self, mode: ScanMode) -> Self {
        self.machine.set_scan_mode(mode);
        self
    }

    /// Current state of the machine.
    #[inline]
    pub fn state(&self) -> State {
        self.machine.state()
    }

    /// Decoded bytes of the field in flight.
    #[inline]
    pub fn pending(&self) -> &[u8] {
        &self.rest[self.field.start..self.field.end]
    }

    /// The syntax error that stopped this session, if any.
    #[inline]
    pub fn error(&self) -> Option<ErrorCode> {
        self.machine.error()
    }

    /// Offset of the next unread byte in the buffer.
    #[inline]
    pub fn position(&self) -> usize {
        self.offset + self.cursor
    }

    /// Length of the whole buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.offset + self.rest.len()
    }

    /// Check if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse up to the end of the buffer.
    pub fn parse<H: FieldHandler<'buf>>(&mut self, handler: &mut H) -> Result<Feed, Fault<H::Fault>> {
        self.parse_until(handler, self.len())
    }

    /// Parse from the current position up to buffer offset `end`.
    ///
    /// `end` is clamped to the unread part of the buffer. The returned
    /// [`Feed::consumed`] (and [`Fault::consumed`]) is an offset into the
    /// whole buffer.
    pub fn parse_until<H: FieldHandler<'buf>>(
        &mut self,
        handler: &mut H,
        end: usize,
    ) -> Result<Feed, Fault<H::Fault>> {
        let end = end.clamp(self.position(), self.len());
        loop {
            let window = end - self.offset;
            let mut pos = self.cursor;
            let step = {
                let mut sink = InPlaceSink::new(&mut self.rest[..window], &mut self.field);
                self.machine.step(&mut sink, &mut pos)
            };
            self.cursor = pos;
            let emit = match step {
                Ok(Some(emit)) => emit,
                Ok(None) => {
                    return Ok(Feed {
                        completed: self.machine.state() != State::Error,
                        consumed: self.position(),
                    })
                }
                // In-place decoding never allocates.
                Err(error) => {
                    debug!(%error, position = self.position(), "in-place sink fault");
                    return Err(Fault::alloc(error, self.position()));
                }
            };
            if !self.deliver(handler, emit)? {
                return Ok(Feed {
                    completed: false,
                    consumed: self.position(),
                });
            }
        }
    }

    /// Parse whatever is left of the buffer, then close the document.
    ///
    /// Same contract as [`Parser::finish`](crate::Parser::finish).
    pub fn finish<H: FieldHandler<'buf>>(&mut self, handler: &mut H) -> Result<bool, Fault<H::Fault>> {
        if self.position() < self.len() && !self.parse(handler)?.completed {
            return Ok(false);
        }
        loop {
            let step = {
                let mut sink = InPlaceSink::new(&mut self.rest[..], &mut self.field);
                self.machine.finish_step(&mut sink)
            };
            let emit = match step {
                Ok(Some(emit)) => emit,
                Ok(None) => return Ok(self.machine.state() != State::Error),
                Err(error) => {
                    debug!(%error, "in-place sink fault while finishing");
                    return Err(Fault::alloc(error, self.position()));
                }
            };
            if !self.deliver(handler, emit)? {
                return Ok(false);
            }
        }
    }

    fn deliver<H: FieldHandler<'buf>>(&mut self, handler: &mut H, emit: Emit) -> Result<bool, Fault<H::Fault>> {
        match emit {
            Emit::StartRow => answer(handler.start_row(), self.position()),
            Emit::EndRow => answer(handler.end_row(), self.position()),
            Emit::Field => {
                let value = self.take_field();
                answer(handler.field(value), self.position())
            }
            Emit::Error(code) => {
                let consumed = self.position();
                Ok(report(handler, code, consumed))
            }
        }
    }

    /// Split off everything before the read position and return the
    /// completed field inside it.
    fn take_field(&mut self) -> &'buf [u8] {
        let rest = mem::take(&mut self.rest);
        let (head, tail) = rest.split_at_mut(self.cursor);
        self.rest = tail;
        self.offset += self.cursor;
        self.cursor = 0;

        let FieldSpan { start, end } = mem::take(&mut self.field);
        let head: &'buf [u8] = head;
        &head[start..end]
    }
}
