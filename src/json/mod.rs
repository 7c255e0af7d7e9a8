//! JSON helpers

pub mod diagnostics;

pub use diagnostics::ImportParseError;
