//! # Output
//!
//! Module dedicated to command output. It only exposes an [`Output`]
//! struct, holding both captured channels of a finished process.

use crate::{Error, Result};

/// Captured output of a process that exited successfully.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Output {
    /// Bytes written by the process on its standard output.
    pub stdout: Vec<u8>,

    /// Bytes written by the process on its standard error.
    pub stderr: Vec<u8>,
}

impl Output {
    /// Reads the standard output as string lossy.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Returns the first line of the standard output, without its
    /// line ending, or `None` if the output is empty.
    pub fn first_line(&self) -> Option<String> {
        String::from_utf8_lossy(&self.stdout)
            .lines()
            .next()
            .map(ToOwned::to_owned)
    }
}

impl From<Output> for Vec<u8> {
    fn from(output: Output) -> Self {
        output.stdout
    }
}

impl TryFrom<Output> for String {
    type Error = Error;

    fn try_from(output: Output) -> Result<Self> {
        String::from_utf8(output.stdout).map_err(Error::ParseOutputAsUtf8StringError)
    }
}

#[cfg(test)]
mod tests {
    use super::Output;

    #[test]
    fn first_line() {
        let output = Output {
            stdout: b"secret\nignored\n".to_vec(),
            stderr: Vec::new(),
        };
        assert_eq!(output.first_line().as_deref(), Some("secret"));

        assert_eq!(Output::default().first_line(), None);
    }
}
