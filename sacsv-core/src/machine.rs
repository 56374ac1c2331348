//! The transition engine.
//!
//! An explicit state tag plus a dispatch loop. All progress lives in
//! [`Machine::state`] and the sink's pending bytes, so the engine can stop
//! after any event and pick up again from a different chunk with no call
//! stack to rebuild.
//!
//! # Dialect
//!
//! ```text
//! record  = field *("," field) CR LF
//! field   = quoted / unquoted
//! quoted  = DQUOTE *(any byte except DQUOTE / DQUOTE DQUOTE) DQUOTE
//! unquoted= *(any byte except "," / DQUOTE / CR LF)
//! ```
//!
//! A lone LF is field data. A lone CR is field data too, except right after
//! a closing quote where only CR LF may follow. A CR LF with nothing before
//! it in the record is an error, not an empty field.
//!
//! # Stepping
//!
//! [`Machine::step`] consumes input until it has one event to report, then
//! returns it with the state already moved past that event. The driver
//! delivers the event; if the handler pauses, the next `step` simply
//! continues from the new state. Sink faults return before any state change,
//! so the failing byte is retried on resume.

use crate::class::{classify, Class, ScanMode};
use crate::error::{AllocError, ErrorCode};
use crate::sink::Sink;

/// Parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum State {
    /// Nothing consumed yet.
    Begin,
    /// Between records.
    StartOfRow,
    /// `start_row` delivered, first byte of the record not consumed yet.
    FirstFieldPending,
    /// CR as the very first byte of a record.
    PendingRowTerminatorAtRowStart,
    /// After a delimiter, before the first byte of the next field.
    StartOfField,
    /// Inside a quoted field.
    InQuotedField,
    /// Quote seen inside a quoted field: either an escape or the close.
    InQuote,
    /// Inside an unquoted field.
    InUnquotedField,
    /// CR seen inside a field: literal unless LF follows.
    PendingRowTerminatorMidField,
    /// CR seen right after a closing quote: LF must follow.
    RequireLineFeed,
    /// Last field of a record delivered, `end_row` not yet delivered.
    EndOfRow,
    /// A syntax error was reported. Sticky until reset.
    Error,
}

/// Event the engine asks the driver to deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Emit {
    StartRow,
    /// The sink's pending bytes form a complete field.
    Field,
    EndRow,
    Error(ErrorCode),
}

/// State machine core shared by both drivers.
#[derive(Debug, Clone)]
pub(crate) struct Machine {
    state: State,
    error: Option<ErrorCode>,
    scan: ScanMode,
}

impl Machine {
    pub(crate) fn new(scan: ScanMode) -> Self {
        Self {
            state: State::Begin,
            error: None,
            scan,
        }
    }

    #[inline]
    pub(crate) fn state(&self) -> State {
        self.state
    }

    #[inline]
    pub(crate) fn error(&self) -> Option<ErrorCode> {
        self.error
    }

    #[inline]
    pub(crate) fn scan_mode(&self) -> ScanMode {
        self.scan
    }

    #[inline]
    pub(crate) fn set_scan_mode(&mut self, scan: ScanMode) {
        self.scan = scan;
    }

    pub(crate) fn reset(&mut self) {
        self.state = State::Begin;
        self.error = None;
    }

    fn fail<K: Sink>(&mut self, sink: &mut K, code: ErrorCode) -> Emit {
        sink.reset();
        self.state = State::Error;
        self.error = Some(code);
        Emit::Error(code)
    }

    /// Consume input from `*pos` until the next event or the end of
    /// `sink.input()`. `Ok(None)` means the input is exhausted (or the
    /// session is in the error state).
    pub(crate) fn step<K: Sink>(
        &mut self,
        sink: &mut K,
        pos: &mut usize,
    ) -> Result<Option<Emit>, AllocError> {
        macro_rules! next_byte {
            () => {
                match sink.input().get(*pos) {
                    Some(&byte) => classify(byte),
                    None => return Ok(None),
                }
            };
        }

        loop {
            match self.state {
                State::Error => return Ok(None),

                State::EndOfRow => {
                    self.state = State::StartOfRow;
                    return Ok(Some(Emit::EndRow));
                }

                State::Begin | State::StartOfRow => {
                    next_byte!();
                    self.state = State::FirstFieldPending;
                    return Ok(Some(Emit::StartRow));
                }

                State::FirstFieldPending => {
                    if next_byte!() == Class::Cr {
                        sink.open(*pos);
                        *pos += 1;
                        self.state = State::PendingRowTerminatorAtRowStart;
                    } else {
                        self.state = State::StartOfField;
                    }
                }

                State::StartOfField => match next_byte!() {
                    Class::Comma => {
                        sink.open(*pos);
                        *pos += 1;
                        return Ok(Some(Emit::Field));
                    }
                    Class::Quote => {
                        *pos += 1;
                        sink.open(*pos);
                        self.state = State::InQuotedField;
                    }
                    Class::Cr => {
                        sink.open(*pos);
                        *pos += 1;
                        self.state = State::PendingRowTerminatorMidField;
                    }
                    Class::Lf | Class::Ordinary => {
                        sink.open(*pos);
                        self.state = State::InUnquotedField;
                    }
                },

                State::PendingRowTerminatorAtRowStart => {
                    if next_byte!() == Class::Lf {
                        *pos += 1;
                        return Ok(Some(self.fail(sink, ErrorCode::NoFieldsInRecord)));
                    }
                    // The CR was data after all; the byte is read again as
                    // field content.
                    sink.append(b'\r')?;
                    self.state = State::InUnquotedField;
                }

                State::InUnquotedField => {
                    let class = next_byte!();
                    let run = self.scan.unquoted_run(&sink.input()[*pos..]);
                    if run > 0 {
                        sink.append_run(*pos..*pos + run)?;
                        *pos += run;
                        continue;
                    }
                    *pos += 1;
                    match class {
                        Class::Comma => {
                            self.state = State::StartOfField;
                            return Ok(Some(Emit::Field));
                        }
                        Class::Quote => {
                            return Ok(Some(self.fail(sink, ErrorCode::MisplacedDoubleQuotes)));
                        }
                        _ => {
                            debug_assert_eq!(class, Class::Cr);
                            self.state = State::PendingRowTerminatorMidField;
                        }
                    }
                }

                State::InQuotedField => {
                    next_byte!();
                    let run = self.scan.quoted_run(&sink.input()[*pos..]);
                    if run > 0 {
                        sink.append_run(*pos..*pos + run)?;
                        *pos += run;
                        continue;
                    }
                    *pos += 1;
                    self.state = State::InQuote;
                }

                State::InQuote => match next_byte!() {
                    Class::Quote => {
                        sink.append(b'"')?;
                        *pos += 1;
                        self.state = State::InQuotedField;
                    }
                    Class::Comma => {
                        *pos += 1;
                        self.state = State::StartOfField;
                        return Ok(Some(Emit::Field));
                    }
                    Class::Cr => {
                        *pos += 1;
                        self.state = State::RequireLineFeed;
                    }
                    Class::Lf | Class::Ordinary => {
                        *pos += 1;
                        return Ok(Some(self.fail(sink, ErrorCode::TextAfterClosingQuotes)));
                    }
                },

                State::PendingRowTerminatorMidField => {
                    if next_byte!() == Class::Lf {
                        *pos += 1;
                        self.state = State::EndOfRow;
                        return Ok(Some(Emit::Field));
                    }
                    sink.append(b'\r')?;
                    self.state = State::InUnquotedField;
                }

                State::RequireLineFeed => {
                    let class = next_byte!();
                    *pos += 1;
                    if class != Class::Lf {
                        return Ok(Some(self.fail(sink, ErrorCode::UnfinishedCrlf)));
                    }
                    self.state = State::EndOfRow;
                    return Ok(Some(Emit::Field));
                }
            }
        }
    }

    /// Close the document. Called repeatedly until it returns `Ok(None)`.
    pub(crate) fn finish_step<K: Sink>(&mut self, sink: &mut K) -> Result<Option<Emit>, AllocError> {
        match self.state {
            State::StartOfRow | State::Error => Ok(None),

            State::Begin | State::FirstFieldPending => {
                Ok(Some(self.fail(sink, ErrorCode::NoFieldsInRecord)))
            }

            State::EndOfRow => {
                self.state = State::StartOfRow;
                Ok(Some(Emit::EndRow))
            }

            State::PendingRowTerminatorAtRowStart | State::PendingRowTerminatorMidField => {
                sink.append(b'\r')?;
                self.state = State::EndOfRow;
                Ok(Some(Emit::Field))
            }

            State::StartOfField | State::InQuote | State::InUnquotedField => {
                self.state = State::EndOfRow;
                Ok(Some(Emit::Field))
            }

            State::InQuotedField => Ok(Some(self.fail(sink, ErrorCode::UnterminatedQuotedField))),

            State::RequireLineFeed => Ok(Some(self.fail(sink, ErrorCode::UnfinishedCrlf))),
        }
    }
}
