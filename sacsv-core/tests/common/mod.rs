//! Test infrastructure for the SACSV parser
//!
//! Provides fixture loading, a recording handler with fault injection, and
//! seeded document generation.

#![allow(dead_code)]

mod generators;
mod harness;
mod loader;

pub use generators::{document, split, Gen};
pub use harness::{
    drive_chunks, drive_in_place, render, FlakyStorage, Injected, Record, Recorder, Response,
};
pub use loader::{load_fixtures_by_name, ConversionCase, ErrorCase};
