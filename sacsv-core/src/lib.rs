//! SACSV Core Parser
//!
//! Streaming, event-based parser for CSV records terminated by CR LF.
//! Emits `start_row` / `field` / `end_row` events to a handler without
//! building rows or tables.
//!
//! A document may arrive in any number of chunks split at any byte; the
//! events are the same as for one contiguous buffer. Handlers can pause or
//! abandon the parse after any event, and a failing allocation or handler
//! leaves the session resumable from the exact byte it stopped at.
//!
//! # Architecture
//!
//! - **class.rs** - Byte classes and the scalar/batched run scanners
//! - **machine.rs** - Transition engine: explicit state tag + dispatch loop
//! - **sink.rs** - Where field bytes go: growable copy or in-place decode
//! - **storage.rs** - Growable buffer strategies (heap, fixed arena)
//! - **parser.rs** - Resumable driver over independent chunks
//! - **in_place.rs** - Zero-allocation driver over one caller buffer
//! - **handler.rs** - Callback contract, closure adapter
//! - **signal.rs** - Keep-going / stop / abort control signals
//! - **fingerprint.rs** - Session equality and hashing
//! - **writer.rs** - Serializer for the same dialect
//! - **error.rs** - Syntax error codes and resumable faults

pub mod class;
pub mod error;
pub mod fingerprint;
pub mod handler;
pub mod in_place;
mod machine;
pub mod parser;
pub mod signal;
mod sink;
pub mod storage;
pub mod writer;

pub use class::{classify, Class, ScanMode};
pub use error::{AllocError, ErrorCode, Fault, FaultKind};
pub use fingerprint::Fingerprint;
pub use handler::{handler_fn, Event, FieldHandler, FnHandler, Handler};
pub use in_place::InPlaceParser;
pub use machine::State;
pub use parser::{parse_all, Feed, Parser, DEFAULT_CAPACITY};
pub use signal::{Abort, Control, KeepGoing, Signal, Stop};
pub use storage::{Arena, Heap, Storage};
pub use writer::Generator;
