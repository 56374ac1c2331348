//! Read CSV from stdin, one record per line, and print it as a table.
//!
//! Lines may end in LF or CR LF; each is fed to the parser followed by
//! CR LF. Input ends at EOF or at the first blank line.
//!
//! Run with: cargo run --example table < data.csv
//! Set RUST_LOG=sacsv_core=debug to see parser diagnostics.

use std::convert::Infallible;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use sacsv_core::{Abort, ErrorCode, FieldHandler, Handler, KeepGoing, Parser};
use tracing_subscriber::EnvFilter;

#[derive(Default)]
struct Table {
    rows: Vec<Vec<String>>,
    error: Option<ErrorCode>,
}

impl Handler for Table {
    type Signal = KeepGoing;
    type Fault = Infallible;

    fn start_row(&mut self) -> Result<KeepGoing, Infallible> {
        self.rows.push(Vec::new());
        Ok(KeepGoing)
    }

    fn end_row(&mut self) -> Result<KeepGoing, Infallible> {
        Ok(KeepGoing)
    }

    fn error(&mut self, code: ErrorCode) -> Abort {
        self.error = Some(code);
        Abort
    }
}

impl<'f> FieldHandler<'f> for Table {
    fn field(&mut self, value: &'f [u8]) -> Result<KeepGoing, Infallible> {
        if let Some(row) = self.rows.last_mut() {
            row.push(String::from_utf8_lossy(value).into_owned());
        }
        Ok(KeepGoing)
    }
}

fn print_rule(out: &mut impl Write, widths: &[usize]) -> io::Result<()> {
    for &width in widths {
        write!(out, "+{}", "-".repeat(width))?;
    }
    writeln!(out, "+")
}

fn print_row(out: &mut impl Write, row: &[String], widths: &[usize]) -> io::Result<()> {
    for (col, &width) in widths.iter().enumerate() {
        let cell = row.get(col).map(String::as_str).unwrap_or("");
        write!(out, "|{:>width$}", cell.escape_debug().to_string(), width = width)?;
    }
    writeln!(out, "|")
}

fn print_table(rows: &[Vec<String>]) -> io::Result<()> {
    let mut widths: Vec<usize> = Vec::new();
    for row in rows {
        if row.len() > widths.len() {
            widths.resize(row.len(), 0);
        }
        for (col, cell) in row.iter().enumerate() {
            widths[col] = widths[col].max(cell.escape_debug().count());
        }
    }

    let mut out = io::stdout().lock();
    let Some((header, body)) = rows.split_first() else {
        return Ok(());
    };
    print_rule(&mut out, &widths)?;
    print_row(&mut out, header, &widths)?;
    if !body.is_empty() {
        print_rule(&mut out, &widths)?;
    }
    for row in body {
        print_row(&mut out, row, &widths)?;
    }
    print_rule(&mut out, &widths)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut table = Table::default();
    let mut parser = Parser::new();

    for line in io::stdin().lock().split(b'\n') {
        let mut line = match line {
            Ok(line) => line,
            Err(err) => {
                eprintln!("read error: {}", err);
                return ExitCode::FAILURE;
            }
        };
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.is_empty() {
            break;
        }

        for (chunk, caret) in [(&line[..], true), (&b"\r\n"[..], false)] {
            let feed = match parser.parse(&mut table, chunk) {
                Ok(feed) => feed,
                Err(fault) => {
                    eprintln!("parser fault: {}", fault);
                    return ExitCode::FAILURE;
                }
            };
            if !feed.completed {
                let code = table.error.map(ErrorCode::message).unwrap_or("unknown error");
                eprintln!("Parse error!");
                eprintln!("{}", String::from_utf8_lossy(&line));
                let column = if caret { feed.consumed.saturating_sub(1) } else { line.len() };
                eprintln!("{}^----- {}", " ".repeat(column), code);
                return ExitCode::FAILURE;
            }
        }
    }

    match parser.finish(&mut table) {
        Ok(true) => {}
        // Nothing was entered.
        Ok(false) if table.rows.is_empty() => return ExitCode::SUCCESS,
        Ok(false) => {
            let code = table.error.map(ErrorCode::message).unwrap_or("unknown error");
            eprintln!("Parse error at end of input: {}", code);
            return ExitCode::FAILURE;
        }
        Err(fault) => {
            eprintln!("parser fault: {}", fault);
            return ExitCode::FAILURE;
        }
    }

    match print_table(&table.rows) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("write error: {}", err);
            ExitCode::FAILURE
        }
    }
}
