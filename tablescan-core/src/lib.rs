//! Table Scan Core - Fundamental types
//!
//! This crate provides the core types used throughout Table Scan:
//! - `Value`: Numbers and text written to devices
//! - `Command`: The scan command tree (Set, Wait, Loop, Parallel, ...)
//! - `CommandSequence`: Compiled output with text, JSON and SCN rendering
//! - `ScanError`: Structured errors

pub mod number;
mod value;
mod error;
mod seconds;
mod command;
mod sequence;
pub mod scn;

pub use value::{quote, Value};
pub use error::{codes, ErrorContext, ScanError};
pub use seconds::{parse_seconds, SecondsError};
pub use command::{
    format_block, Command, Comment, Comparison, Delay, Include, Log, Loop, Parallel, Readback,
    Set, Wait, ON_ERROR_CONTINUE,
};
pub use sequence::CommandSequence;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Command, CommandSequence, Comment, Comparison, Delay, Include, Log, Loop, Parallel,
        Readback, ScanError, Set, Value, Wait,
    };
    pub use crate::error::codes;
}
