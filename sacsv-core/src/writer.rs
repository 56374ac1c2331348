//! CSV serializer.
//!
//! [`Generator`] writes records in exactly the dialect the parsers read:
//! fields separated by `,`, records terminated by CR LF, and a field quoted
//! only when it has to be (it contains `,`, `"`, CR or LF, or it is the
//! lone empty field of a record, which would otherwise serialize as a bare
//! CR LF).
//!
//! ```
//! use sacsv_core::Generator;
//!
//! let mut out = Generator::new();
//! out.write_row([&b"id"[..], b"say \"hi\""]);
//! out.write_row([&b"1"[..], b"a,b"]);
//! assert_eq!(out.as_bytes(), b"id,\"say \"\"hi\"\"\"\r\n1,\"a,b\"\r\n");
//! ```

use memchr::memchr;

/// Record writer into a growable byte buffer.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    out: Vec<u8>,
    /// Offset where the current record begins.
    row_start: usize,
    fields: usize,
    rows: usize,
}

#[inline]
fn needs_quotes(field: &[u8]) -> bool {
    field.iter().any(|&b| matches!(b, b',' | b'"' | b'\r' | b'\n'))
}

impl Generator {
    /// Create a generator with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator appending to `out`.
    pub fn with_buffer(out: Vec<u8>) -> Self {
        Self {
            row_start: out.len(),
            out,
            fields: 0,
            rows: 0,
        }
    }

    /// Append a field to the current record.
    pub fn field(&mut self, value: &[u8]) -> &mut Self {
        if self.fields > 0 {
            self.out.push(b',');
        }
        self.fields += 1;

        if !needs_quotes(value) {
            self.out.extend_from_slice(value);
            return self;
        }

        self.out.reserve(value.len() + 2);
        self.out.push(b'"');
        let mut rest = value;
        while let Some(i) = memchr(b'"', rest) {
            self.out.extend_from_slice(&rest[..=i]);
            self.out.push(b'"');
            rest = &rest[i + 1..];
        }
        self.out.extend_from_slice(rest);
        self.out.push(b'"');
        self
    }

    /// Terminate the current record.
    ///
    /// A record with a single empty field is written as `""` so that it
    /// reads back as one empty field and not as an empty record.
    pub fn end_row(&mut self) -> &mut Self {
        if self.out.len() == self.row_start {
            self.out.extend_from_slice(b"\"\"");
        }
        self.out.extend_from_slice(b"\r\n");
        self.row_start = self.out.len();
        self.fields = 0;
        self.rows += 1;
        self
    }

    /// Write a whole record.
    pub fn write_row<I, F>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = F>,
        F: AsRef<[u8]>,
    {
        for value in fields {
            self.field(value.as_ref());
        }
        self.end_row()
    }

    /// Records written so far.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The bytes written so far.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.out
    }

    /// Take the buffer.
    pub fn into_inner(self) -> Vec<u8> {
        self.out
    }
}
