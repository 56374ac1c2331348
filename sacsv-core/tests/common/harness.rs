//! Recording handler and resumption drivers
//!
//! [`Recorder`] logs every event and can be told to stop, abort or fail at
//! its Nth callback. The drivers feed a document, resume after every
//! interruption from the reported position, and finish it, so a test only
//! has to compare the final log with an uninterrupted run.

use sacsv_core::{
    Abort, AllocError, Control, ErrorCode, FieldHandler, Handler, Heap, InPlaceParser, Parser,
    Storage,
};

/// Interruptions a driver tolerates before declaring the parse stuck.
const MAX_RESUMES: usize = 64;

/// Owned copy of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    StartRow,
    Field(Vec<u8>),
    EndRow,
    Error(ErrorCode),
}

/// Render events as `{` start_row, `[..]` field, `}` end_row, `!Code` error.
pub fn render(records: &[Record]) -> String {
    let mut out = String::new();
    for record in records {
        match record {
            Record::StartRow => out.push('{'),
            Record::EndRow => out.push('}'),
            Record::Field(value) => {
                out.push('[');
                out.push_str(&String::from_utf8_lossy(value));
                out.push(']');
            }
            Record::Error(code) => {
                out.push('!');
                out.push_str(&format!("{:?}", code));
            }
        }
    }
    out
}

/// What the recorder does at its injection point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Stop,
    Abort,
    Fail,
}

/// Fault raised by a recorder told to [`Response::Fail`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injected {
    pub call: usize,
}

/// Handler recording every event.
#[derive(Debug, Default)]
pub struct Recorder {
    pub records: Vec<Record>,
    calls: usize,
    inject: Option<(Response, usize)>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder answering `response` to its `at`-th callback (0-based).
    pub fn injecting(response: Response, at: usize) -> Self {
        Self {
            inject: Some((response, at)),
            ..Self::default()
        }
    }

    pub fn log(&self) -> String {
        render(&self.records)
    }

    pub fn errors(&self) -> Vec<ErrorCode> {
        self.records
            .iter()
            .filter_map(|r| match r {
                Record::Error(code) => Some(*code),
                _ => None,
            })
            .collect()
    }

    /// Number of callbacks received so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    fn answer(&mut self) -> Result<Control, Injected> {
        let call = self.calls;
        self.calls += 1;
        match self.inject {
            Some((response, at)) if at == call => match response {
                Response::Stop => Ok(Control::Stop),
                Response::Abort => Ok(Control::Abort),
                Response::Fail => Err(Injected { call }),
            },
            _ => Ok(Control::KeepGoing),
        }
    }
}

impl Handler for Recorder {
    type Signal = Control;
    type Fault = Injected;

    fn start_row(&mut self) -> Result<Control, Injected> {
        self.records.push(Record::StartRow);
        self.answer()
    }

    fn end_row(&mut self) -> Result<Control, Injected> {
        self.records.push(Record::EndRow);
        self.answer()
    }

    fn error(&mut self, code: ErrorCode) -> Abort {
        self.records.push(Record::Error(code));
        let _ = self.answer();
        Abort
    }
}

impl<'f> FieldHandler<'f> for Recorder {
    fn field(&mut self, value: &'f [u8]) -> Result<Control, Injected> {
        self.records.push(Record::Field(value.to_vec()));
        self.answer()
    }
}

/// Heap storage whose `fail_at`-th append (0-based) fails once.
#[derive(Debug)]
pub struct FlakyStorage {
    inner: Heap,
    calls: usize,
    fail_at: usize,
}

impl FlakyStorage {
    pub fn failing_at(fail_at: usize) -> Self {
        Self {
            inner: Heap::new(),
            calls: 0,
            fail_at,
        }
    }

    /// Whether the injected failure has happened.
    pub fn tripped(&self) -> bool {
        self.calls > self.fail_at
    }
}

impl Storage for FlakyStorage {
    fn as_slice(&self) -> &[u8] {
        self.inner.as_slice()
    }

    fn try_extend(&mut self, bytes: &[u8]) -> Result<(), AllocError> {
        let call = self.calls;
        self.calls += 1;
        if call == self.fail_at {
            return Err(AllocError {
                requested: self.inner.len() + bytes.len(),
            });
        }
        self.inner.try_extend(bytes)
    }

    fn clear(&mut self) {
        self.inner.clear();
    }
}

/// Feed `chunks` in order, resuming each one after every interruption,
/// then finish the document if `finish` is set.
///
/// Returns `false` once a syntax error is reported.
pub fn drive_chunks<S: Storage>(
    parser: &mut Parser<S>,
    handler: &mut Recorder,
    chunks: &[&[u8]],
    finish: bool,
) -> bool {
    let mut resumes = 0;
    for chunk in chunks {
        let mut rest = *chunk;
        loop {
            let consumed = match parser.parse(handler, rest) {
                Ok(feed) if feed.completed => break,
                Ok(feed) => feed.consumed,
                Err(fault) => fault.consumed,
            };
            if parser.error().is_some() {
                return false;
            }
            rest = &rest[consumed..];
            resumes += 1;
            assert!(resumes < MAX_RESUMES, "parse is not making progress");
        }
    }
    if !finish {
        return true;
    }
    loop {
        if let Ok(true) = parser.finish(handler) {
            return true;
        }
        if parser.error().is_some() {
            return false;
        }
        resumes += 1;
        assert!(resumes < MAX_RESUMES, "finish is not making progress");
    }
}

/// Parse `buf` in place, first up to `cut` then to the end, resuming after
/// every interruption, then finish it.
///
/// Returns `false` once a syntax error is reported.
pub fn drive_in_place(buf: &mut [u8], cut: usize, handler: &mut Recorder) -> bool {
    let len = buf.len();
    let mut parser = InPlaceParser::new(buf);
    let mut resumes = 0;
    for end in [cut, len] {
        loop {
            if let Ok(feed) = parser.parse_until(handler, end) {
                if feed.completed {
                    assert_eq!(feed.consumed, end);
                    break;
                }
            }
            if parser.error().is_some() {
                return false;
            }
            resumes += 1;
            assert!(resumes < MAX_RESUMES, "parse_until is not making progress");
        }
    }
    loop {
        if let Ok(true) = parser.finish(handler) {
            return true;
        }
        if parser.error().is_some() {
            return false;
        }
        resumes += 1;
        assert!(resumes < MAX_RESUMES, "finish is not making progress");
    }
}
