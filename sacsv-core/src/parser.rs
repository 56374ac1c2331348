//! Resumable parser over independently owned chunks.
//!
//! [`Parser`] copies field bytes into a buffer it owns, so each chunk only
//! has to live for the duration of its `parse` call:
//!
//! ```text
//! chunk 0 ──parse──▶ ┌────────┐──start_row / field / end_row──▶ handler
//! chunk 1 ──parse──▶ │ Parser │
//!    ...             │ state  │◀──────────── Signal ───────────────┘
//!      ───finish───▶ │ buffer │
//!                    └────────┘
//! ```
//!
//! Feeding a document in one call or split at any byte produces the same
//! events. When a handler stops, aborts or fails, or the buffer cannot
//! grow, `parse` reports how much of the chunk it consumed; the rest of the
//! chunk is fed again later.
//!
//! ```
//! use sacsv_core::{handler_fn, Control, Event, Parser};
//!
//! let mut rows = 0;
//! let mut handler = handler_fn(|event: Event<'_>| {
//!     if event == Event::EndRow {
//!         rows += 1;
//!     }
//!     Control::KeepGoing
//! });
//!
//! let mut parser = Parser::new();
//! for chunk in [&b"a,\"b"[..], b"\"\r", b"\nc,d"] {
//!     assert!(parser.parse(&mut handler, chunk).unwrap().completed);
//! }
//! assert!(parser.finish(&mut handler).unwrap());
//! drop(handler);
//! assert_eq!(rows, 2);
//! ```

use tracing::{debug, trace};

use crate::class::ScanMode;
use crate::error::{ErrorCode, Fault};
use crate::handler::{FieldHandler, Handler};
use crate::machine::{Emit, Machine, State};
use crate::signal::{proceeds, Signal};
use crate::sink::GrowableSink;
use crate::storage::{Heap, Storage};

/// Outcome of a `parse` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Feed {
    /// The whole input was consumed with no stop, abort or syntax error.
    pub completed: bool,
    /// Resume position: how far into the input consumption got. Bytes from
    /// here on have not been looked at as far as the session is concerned.
    pub consumed: usize,
}

/// Default capacity for [`Parser::new`]'s field buffer.
pub const DEFAULT_CAPACITY: usize = 64;

/// Streaming parser with a session-owned field buffer.
#[derive(Debug, Clone)]
pub struct Parser<S = Heap> {
    machine: Machine,
    storage: S,
}

impl Parser<Heap> {
    /// Create a parser with a heap buffer of [`DEFAULT_CAPACITY`] bytes.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a parser whose heap buffer starts with `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_storage(Heap::with_capacity(capacity))
    }
}

impl Default for Parser<Heap> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Storage> Parser<S> {
    /// Create a parser over the given storage strategy.
    ///
    /// Any bytes already in `storage` are discarded.
    pub fn with_storage(mut storage: S) -> Self {
        storage.clear();
        Self {
            machine: Machine::new(ScanMode::default()),
            storage,
        }
    }

    /// Choose the run scanner.
    pub fn scan_mode(mut self, mode: ScanMode) -> Self {
        self.machine.set_scan_mode(mode);
        self
    }

    /// The run scanner in use.
    #[inline]
    pub fn current_scan_mode(&self) -> ScanMode {
        self.machine.scan_mode()
    }

    /// Current state of the machine.
    #[inline]
    pub fn state(&self) -> State {
        self.machine.state()
    }

    /// Decoded bytes of the field in flight.
    #[inline]
    pub fn pending(&self) -> &[u8] {
        self.storage.as_slice()
    }

    /// The syntax error that stopped this session, if any.
    #[inline]
    pub fn error(&self) -> Option<ErrorCode> {
        self.machine.error()
    }

    /// The storage strategy.
    #[inline]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Return to the initial state, dropping the field in flight and any
    /// error.
    pub fn reset(&mut self) {
        self.machine.reset();
        self.storage.clear();
    }

    /// Feed the next chunk of the document.
    ///
    /// Returns `completed: false` when the handler stopped or aborted, or the
    /// document is malformed (the handler's `error` was called, now or in an
    /// earlier call). A fault from the storage or the handler comes back as
    /// `Err`, with the resume position in [`Fault::consumed`].
    pub fn parse<H>(&mut self, handler: &mut H, input: &[u8]) -> Result<Feed, Fault<H::Fault>>
    where
        H: Handler + for<'f> FieldHandler<'f>,
    {
        let mut pos = 0;
        loop {
            let mut sink = GrowableSink::new(input, &mut self.storage);
            let emit = match self.machine.step(&mut sink, &mut pos) {
                Ok(Some(emit)) => emit,
                Ok(None) => {
                    return Ok(Feed {
                        completed: self.machine.state() != State::Error,
                        consumed: pos,
                    })
                }
                Err(error) => {
                    debug!(%error, consumed = pos, state = ?self.machine.state(), "field buffer fault");
                    return Err(Fault::alloc(error, pos));
                }
            };
            if !self.deliver(handler, emit, pos)? {
                return Ok(Feed {
                    completed: false,
                    consumed: pos,
                });
            }
        }
    }

    /// Signal the end of the document.
    ///
    /// Delivers the last field and `end_row` if a record is still open, and
    /// checks the document did not end mid-structure. Returns `false` on a
    /// syntax error or if the handler stopped; after a stop, calling
    /// `finish` again delivers the remaining events.
    pub fn finish<H>(&mut self, handler: &mut H) -> Result<bool, Fault<H::Fault>>
    where
        H: Handler + for<'f> FieldHandler<'f>,
    {
        loop {
            let mut sink = GrowableSink::new(&[], &mut self.storage);
            let emit = match self.machine.finish_step(&mut sink) {
                Ok(Some(emit)) => emit,
                Ok(None) => return Ok(self.machine.state() != State::Error),
                Err(error) => {
                    debug!(%error, "field buffer fault while finishing");
                    return Err(Fault::alloc(error, 0));
                }
            };
            if !self.deliver(handler, emit, 0)? {
                return Ok(false);
            }
        }
    }

    fn deliver<H>(&mut self, handler: &mut H, emit: Emit, consumed: usize) -> Result<bool, Fault<H::Fault>>
    where
        H: Handler + for<'f> FieldHandler<'f>,
    {
        match emit {
            Emit::StartRow => answer(handler.start_row(), consumed),
            Emit::EndRow => answer(handler.end_row(), consumed),
            Emit::Field => {
                let result = handler.field(self.storage.as_slice());
                self.storage.clear();
                answer(result, consumed)
            }
            Emit::Error(code) => Ok(report(handler, code, consumed)),
        }
    }
}

/// Parse a complete document in one call: `parse` followed by `finish`.
pub fn parse_all<H>(handler: &mut H, input: &[u8]) -> Result<bool, Fault<H::Fault>>
where
    H: Handler + for<'f> FieldHandler<'f>,
{
    let mut parser = Parser::new();
    if !parser.parse(handler, input)?.completed {
        return Ok(false);
    }
    parser.finish(handler)
}

/// Turn a callback's answer into "keep going?".
#[inline]
pub(crate) fn answer<S: Signal, E>(result: Result<S, E>, consumed: usize) -> Result<bool, Fault<E>> {
    match result {
        Ok(signal) => {
            let go = proceeds(signal);
            if !go {
                trace!(consumed, control = ?signal.control(), "handler interrupted parsing");
            }
            Ok(go)
        }
        Err(error) => {
            trace!(consumed, "handler failed");
            Err(Fault::handler(error, consumed))
        }
    }
}

/// Hand a syntax error to the handler. Parsing never continues.
pub(crate) fn report<H: Handler>(handler: &mut H, code: ErrorCode, consumed: usize) -> bool {
    debug!(%code, consumed, "syntax error");
    handler.error(code);
    false
}
