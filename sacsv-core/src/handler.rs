//! The callback contract.
//!
//! The parser pushes four kinds of events to an integrator-supplied
//! handler. Row and error callbacks live on [`Handler`]; the field callback
//! lives on [`FieldHandler`] because it is the only one borrowing data, and
//! how long that borrow lasts depends on the parser:
//!
//! - [`Parser`](crate::Parser) needs `H: for<'f> FieldHandler<'f>`. The field
//!   bytes sit in the parser's own buffer and are cleared right after the
//!   call.
//! - [`InPlaceParser<'buf>`](crate::InPlaceParser) needs
//!   `H: FieldHandler<'buf>`. Fields are decoded into the caller's buffer and
//!   stay readable for as long as that buffer is borrowed.
//!
//! Callbacks return a [`Signal`] or a fault of the handler's own type. A
//! fault propagates out of `parse` with the event counted as delivered.
//!
//! For quick consumers, [`handler_fn`] turns a closure over [`Event`] into a
//! handler.

use std::convert::Infallible;

use crate::error::ErrorCode;
use crate::signal::{Abort, Control, Signal};

/// Row and error callbacks.
pub trait Handler {
    /// What row and field callbacks return.
    type Signal: Signal;
    /// Error a callback may fail with. Use [`Infallible`] if none.
    type Fault;

    /// A record begins.
    fn start_row(&mut self) -> Result<Self::Signal, Self::Fault>;

    /// The record that began with the last `start_row` is complete.
    fn end_row(&mut self) -> Result<Self::Signal, Self::Fault>;

    /// The document is malformed. Called at most once per session; parsing
    /// never continues afterwards.
    fn error(&mut self, code: ErrorCode) -> Abort;
}

/// Field callback, for fields borrowed for `'f`.
pub trait FieldHandler<'f>: Handler {
    /// A decoded field of the current record.
    fn field(&mut self, value: &'f [u8]) -> Result<Self::Signal, Self::Fault>;
}

impl<H: Handler + ?Sized> Handler for &mut H {
    type Signal = H::Signal;
    type Fault = H::Fault;

    #[inline]
    fn start_row(&mut self) -> Result<Self::Signal, Self::Fault> {
        (**self).start_row()
    }

    #[inline]
    fn end_row(&mut self) -> Result<Self::Signal, Self::Fault> {
        (**self).end_row()
    }

    #[inline]
    fn error(&mut self, code: ErrorCode) -> Abort {
        (**self).error(code)
    }
}

impl<'f, H: FieldHandler<'f> + ?Sized> FieldHandler<'f> for &mut H {
    #[inline]
    fn field(&mut self, value: &'f [u8]) -> Result<Self::Signal, Self::Fault> {
        (**self).field(value)
    }
}

/// A parser event, as seen by closure handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event<'a> {
    /// A record begins.
    StartRow,
    /// A decoded field.
    Field(&'a [u8]),
    /// A record ends.
    EndRow,
    /// The document is malformed. The closure's answer is ignored.
    Error(ErrorCode),
}

impl Event<'_> {
    /// Check if this is the error event.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Event::Error(_))
    }
}

/// Handler built from a closure. See [`handler_fn`].
#[derive(Debug, Clone)]
pub struct FnHandler<F> {
    f: F,
}

/// Turn a closure into a handler.
///
/// ```
/// use sacsv_core::{handler_fn, Control, Event, Parser};
///
/// let mut fields = Vec::new();
/// let mut handler = handler_fn(|event: Event<'_>| {
///     if let Event::Field(value) = event {
///         fields.push(value.to_vec());
///     }
///     Control::KeepGoing
/// });
///
/// let mut parser = Parser::new();
/// assert!(parser.parse(&mut handler, b"a,b\r\n").unwrap().completed);
/// assert_eq!(fields, vec![b"a".to_vec(), b"b".to_vec()]);
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: FnMut(Event<'_>) -> Control,
{
    FnHandler { f }
}

impl<F> Handler for FnHandler<F>
where
    F: FnMut(Event<'_>) -> Control,
{
    type Signal = Control;
    type Fault = Infallible;

    #[inline]
    fn start_row(&mut self) -> Result<Control, Infallible> {
        Ok((self.f)(Event::StartRow))
    }

    #[inline]
    fn end_row(&mut self) -> Result<Control, Infallible> {
        Ok((self.f)(Event::EndRow))
    }

    #[inline]
    fn error(&mut self, code: ErrorCode) -> Abort {
        (self.f)(Event::Error(code));
        Abort
    }
}

impl<'f, F> FieldHandler<'f> for FnHandler<F>
where
    F: FnMut(Event<'_>) -> Control,
{
    #[inline]
    fn field(&mut self, value: &'f [u8]) -> Result<Control, Infallible> {
        Ok((self.f)(Event::Field(value)))
    }
}
