use std::{
    ffi::OsString,
    fmt,
    io::ErrorKind,
    path::{Path, PathBuf},
    process::Stdio,
};

use tokio::{io::AsyncWriteExt as _, process::Command as AsyncCommand};
use tracing::{debug, info};

use crate::{Error, Output, Result};

/// The command structure.
///
/// A command is a program and its arguments. Commands built with
/// [`Command::shell`] run a command line through the platform shell
/// and keep the original line, which is how they are (de)serialized.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "String", into = "String")
)]
pub struct Command {
    program: PathBuf,
    args: Vec<OsString>,
    line: Option<String>,
}

impl Command {
    /// Creates a command spawning the given program directly.
    ///
    /// The program is either a path to an executable or a bare name
    /// looked up in the `PATH` environment variable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            line: None,
        }
    }

    /// Creates a command running the given line through the platform
    /// shell.
    pub fn shell(line: impl ToString) -> Self {
        let line = line.to_string();
        let (shell, arg) = shell();

        Self {
            program: shell.into(),
            args: vec![arg.into(), line.clone().into()],
            line: Some(line),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Returns `true` if the command has nothing to run.
    pub fn is_empty(&self) -> bool {
        match &self.line {
            Some(line) => line.trim().is_empty(),
            None => self.program.as_os_str().is_empty(),
        }
    }

    /// Resolves the program to the path of an existing executable.
    ///
    /// Paths containing a separator are checked as is, bare names are
    /// searched in the `PATH` environment variable.
    pub fn resolve(&self) -> Result<PathBuf> {
        which::which(&self.program)
            .map_err(|err| Error::FindProgramError(err, self.program.display().to_string()))
    }

    pub async fn run(&self) -> Result<Output> {
        self.run_with([]).await
    }

    /// Run the command with the given input.
    ///
    /// If the given input is empty, the command inherits the standard
    /// input of the parent. Otherwise the input is piped to the
    /// standard input channel, which is closed once written. Output
    /// channels are read while the input is written.
    pub async fn run_with(&self, input: impl AsRef<[u8]>) -> Result<Output> {
        info!(cmd = %self, "run command");

        let program = self.resolve()?;
        debug!(?program, "program resolved");

        let input = input.as_ref();

        let stdin = if input.is_empty() {
            debug!("inherit stdin from parent");
            Stdio::inherit()
        } else {
            debug!("stdin piped");
            Stdio::piped()
        };

        let mut child = AsyncCommand::new(&program)
            .args(&self.args)
            .stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| Error::SpawnProcessError(err, self.to_string()))?;

        let stdin = if input.is_empty() {
            None
        } else {
            Some(child.stdin.take().ok_or(Error::GetStdinError)?)
        };

        // the process may fill its output pipes before reading its
        // whole input, so both sides are driven together
        let write = async move {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };

            match stdin.write_all(input).await {
                Ok(()) => Ok(()),
                // the process exited before reading everything, its
                // exit status tells what happened
                Err(err) if err.kind() == ErrorKind::BrokenPipe => {
                    debug!("process closed its standard input early");
                    Ok(())
                }
                Err(err) => Err(Error::WriteStdinError(err)),
            }
        };

        let (written, output) = tokio::join!(write, child.wait_with_output());
        written?;

        let output =
            output.map_err(|err| Error::WaitForExitStatusCodeError(err, self.to_string()))?;

        let code = output
            .status
            .code()
            .ok_or_else(|| Error::GetExitStatusCodeNotAvailableError(self.to_string()))?;

        if code == 0 {
            debug!(code, "command gracefully exited");
        } else {
            let cmd = self.to_string();
            let err = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(code, %err, "command ungracefully exited");
            return Err(Error::GetExitStatusCodeNonZeroError(cmd, code, err));
        }

        Ok(Output {
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(line) = &self.line {
            return write!(f, "{line}");
        }

        write!(f, "{}", self.program.display())?;

        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }

        Ok(())
    }
}

impl From<String> for Command {
    fn from(line: String) -> Self {
        Self::shell(line)
    }
}

impl From<&str> for Command {
    fn from(line: &str) -> Self {
        Self::shell(line)
    }
}

impl From<Command> for String {
    fn from(cmd: Command) -> Self {
        match cmd.line {
            Some(line) => line,
            None => cmd.to_string(),
        }
    }
}

fn shell() -> (&'static str, &'static str) {
    #[cfg(windows)]
    let windows = !std::env::var("MSYSTEM")
        .map(|env| env.starts_with("MINGW"))
        .unwrap_or_default();
    #[cfg(not(windows))]
    let windows = false;

    if windows {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    }
}
