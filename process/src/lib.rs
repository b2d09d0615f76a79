//! Asynchronous library to run local programs with piped input.
//!
//! The core concept of this library is to simplify the execution of
//! local programs, following these rules:
//!
//! 1. Programs are executed asynchronously, using the [tokio] async
//! runtime.
//!
//! 2. A [`Command`] is either a program spawned directly from its
//! path and arguments, or a shell command line executed by the
//! platform shell (`sh -c` or `cmd /C`).
//!
//! 3. Input is written to the standard input channel of the process,
//! output and error channels are captured, and a non-zero exit status
//! code is an error.

mod command;
mod error;
mod output;

#[doc(inline)]
pub use crate::{
    command::Command,
    error::{Error, Result},
    output::Output,
};
