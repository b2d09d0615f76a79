//! Module dedicated to the local binary transport configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::ValidationError;

/// The local binary transport configuration.
///
/// The binary is any `sendmail`-compatible program (`ssmtp`,
/// `msmtp`, `sendmail`…) reading a message on its standard input.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LocalBinaryConfig {
    /// The path to the binary. `~` and environment variables are
    /// expanded.
    pub path: PathBuf,

    /// Arguments given to the binary before the recipients.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl LocalBinaryConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ValidationError::EmptyFieldError("local binary path"));
        }
        Ok(())
    }
}
