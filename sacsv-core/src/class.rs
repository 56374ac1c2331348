//! Byte classification and run scanning.
//!
//! The transition engine never looks at raw bytes directly. Every byte is
//! mapped to a [`Class`], and runs of bytes that cannot change the machine
//! state are skipped in one step by a scanner.
//!
//! Two scanners exist and must stay observationally identical:
//!
//! - [`ScanMode::Batched`] uses `memchr` to find the next structural byte
//!   with wide comparisons.
//! - [`ScanMode::Scalar`] walks the classification table one byte at a time.
//!
//! Scanning only reports where a run ends. It never consumes anything; the
//! engine decides what to do with the run, so the batched scanner cannot
//! fire an event for a byte the engine has not reached.

/// Syntactic class of a single input byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Class {
    /// `,` field delimiter
    Comma,
    /// `"` field quote
    Quote,
    /// `\r`, first half of the record terminator
    Cr,
    /// `\n`, second half of the record terminator (literal on its own)
    Lf,
    /// Anything else
    Ordinary,
}

const fn build_table() -> [Class; 256] {
    let mut table = [Class::Ordinary; 256];
    table[b',' as usize] = Class::Comma;
    table[b'"' as usize] = Class::Quote;
    table[b'\r' as usize] = Class::Cr;
    table[b'\n' as usize] = Class::Lf;
    table
}

static CLASSES: [Class; 256] = build_table();

/// Classify one byte.
#[inline]
pub fn classify(byte: u8) -> Class {
    CLASSES[byte as usize]
}

/// Strategy used to skip over runs of field content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScanMode {
    /// Find the next structural byte with `memchr`.
    #[default]
    Batched,
    /// Classify byte by byte.
    Scalar,
}

impl ScanMode {
    /// Length of the leading run of `bytes` that is plain content inside an
    /// unquoted field.
    ///
    /// A lone LF is field data, so the run stops only at a comma, a quote or
    /// a CR.
    #[inline]
    pub fn unquoted_run(self, bytes: &[u8]) -> usize {
        match self {
            Self::Batched => memchr::memchr3(b',', b'"', b'\r', bytes).unwrap_or(bytes.len()),
            Self::Scalar => bytes
                .iter()
                .position(|&b| matches!(classify(b), Class::Comma | Class::Quote | Class::Cr))
                .unwrap_or(bytes.len()),
        }
    }

    /// Length of the leading run of `bytes` that is plain content inside a
    /// quoted field. Only a quote ends it.
    #[inline]
    pub fn quoted_run(self, bytes: &[u8]) -> usize {
        match self {
            Self::Batched => memchr::memchr(b'"', bytes).unwrap_or(bytes.len()),
            Self::Scalar => bytes
                .iter()
                .position(|&b| classify(b) == Class::Quote)
                .unwrap_or(bytes.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify(b','), Class::Comma);
        assert_eq!(classify(b'"'), Class::Quote);
        assert_eq!(classify(b'\r'), Class::Cr);
        assert_eq!(classify(b'\n'), Class::Lf);
        assert_eq!(classify(b'a'), Class::Ordinary);
        assert_eq!(classify(0), Class::Ordinary);
        assert_eq!(classify(0xFF), Class::Ordinary);
    }

    #[test]
    fn test_unquoted_run_keeps_line_feeds() {
        for mode in [ScanMode::Batched, ScanMode::Scalar] {
            assert_eq!(mode.unquoted_run(b"ab\ncd,ef"), 5);
            assert_eq!(mode.unquoted_run(b"abc\r\n"), 3);
            assert_eq!(mode.unquoted_run(b"x\"y"), 1);
            assert_eq!(mode.unquoted_run(b"plain"), 5);
            assert_eq!(mode.unquoted_run(b""), 0);
        }
    }

    #[test]
    fn test_quoted_run_stops_only_at_quote() {
        for mode in [ScanMode::Batched, ScanMode::Scalar] {
            assert_eq!(mode.quoted_run(b"a,b\r\nc\"d"), 6);
            assert_eq!(mode.quoted_run(b"\""), 0);
            assert_eq!(mode.quoted_run(b"no quote"), 8);
        }
    }

    #[test]
    fn test_modes_agree_on_every_byte() {
        // One structural byte at every offset of a long run.
        let base = vec![b'x'; 70];
        for special in [b',', b'"', b'\r', b'\n', b'y'] {
            for at in 0..base.len() {
                let mut bytes = base.clone();
                bytes[at] = special;
                assert_eq!(
                    ScanMode::Batched.unquoted_run(&bytes),
                    ScanMode::Scalar.unquoted_run(&bytes),
                    "unquoted run, byte {special} at {at}"
                );
                assert_eq!(
                    ScanMode::Batched.quoted_run(&bytes),
                    ScanMode::Scalar.quoted_run(&bytes),
                    "quoted run, byte {special} at {at}"
                );
            }
        }
    }
}
