//! Error codes and faults.
//!
//! Two different things can go wrong while parsing:
//!
//! - **Syntax errors** are part of the document. They are reported once
//!   through [`Handler::error`](crate::Handler::error) with an
//!   [`ErrorCode`], after which the session is stuck in the error state.
//! - **Faults** come from outside the grammar: a storage strategy that
//!   cannot grow, or a handler callback that fails. They propagate out of
//!   `parse`/`finish` as [`Fault`] and leave the session resumable at
//!   [`Fault::consumed`].

use thiserror::Error;

/// Syntax error codes.
///
/// A plain `u8` enum rather than a message string: errors are handed to the
/// callback by value and never allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[repr(u8)]
pub enum ErrorCode {
    /// A quote inside an unquoted field
    #[error("double quote found in unquoted field")]
    MisplacedDoubleQuotes = 1,
    /// Something other than `,` or CR after a closing quote
    #[error("text found after closing quote")]
    TextAfterClosingQuotes,
    /// CR after a closing quote not followed by LF
    #[error("line feed expected after carriage return")]
    UnfinishedCrlf,
    /// A record terminator with no field before it
    #[error("record has no fields")]
    NoFieldsInRecord,
    /// The document ended inside a quoted field.
    ///
    /// Only ever raised by `finish`; parsing a chunk never produces it.
    #[error("quoted field is not terminated")]
    UnterminatedQuotedField,
}

impl ErrorCode {
    /// Short, stable name of the code.
    pub fn message(self) -> &'static str {
        match self {
            Self::MisplacedDoubleQuotes => "misplaced double quotes",
            Self::TextAfterClosingQuotes => "text after closing quotes",
            Self::UnfinishedCrlf => "unfinished crlf",
            Self::NoFieldsInRecord => "no fields in record",
            Self::UnterminatedQuotedField => "unterminated quoted field",
        }
    }
}

/// A storage strategy could not provide the requested capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("field buffer could not grow to {requested} bytes")]
pub struct AllocError {
    /// Total length the buffer needed to hold.
    pub requested: usize,
}

/// What interrupted a chunk.
#[derive(Debug, Error)]
pub enum FaultKind<E> {
    /// The field buffer could not grow.
    #[error(transparent)]
    Alloc(#[from] AllocError),
    /// The handler returned an error from one of its callbacks.
    #[error("event handler failed")]
    Handler(E),
}

/// A fault that interrupted `parse` or `finish`.
///
/// Every event delivered before the fault stays delivered, and no byte
/// before [`consumed`](Self::consumed) needs to be fed again. Calling `parse`
/// again with the input starting at `consumed` continues exactly where the
/// fault hit.
#[derive(Debug, Error)]
#[error("{kind} (resume at byte {consumed})")]
pub struct Fault<E> {
    /// Cause of the interruption.
    #[source]
    pub kind: FaultKind<E>,
    /// Resume position, relative to the start of the span given to `parse`
    /// (absolute buffer offset for the in-place parser).
    pub consumed: usize,
}

impl<E> Fault<E> {
    pub(crate) fn alloc(error: AllocError, consumed: usize) -> Self {
        Self {
            kind: FaultKind::Alloc(error),
            consumed,
        }
    }

    pub(crate) fn handler(error: E, consumed: usize) -> Self {
        Self {
            kind: FaultKind::Handler(error),
            consumed,
        }
    }

    /// Whether the fault came from the storage strategy.
    pub fn is_alloc(&self) -> bool {
        matches!(self.kind, FaultKind::Alloc(_))
    }

    /// The handler's own error, if the handler caused the fault.
    pub fn into_handler_error(self) -> Option<E> {
        match self.kind {
            FaultKind::Handler(error) => Some(error),
            FaultKind::Alloc(_) => None,
        }
    }
}
