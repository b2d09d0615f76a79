//! Shell-like expansion of `~` and environment variables in
//! configured paths.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Expands the given path, falling back to the path as is when it
/// cannot be expanded.
pub fn path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    let Some(path_str) = path.to_str() else {
        warn!(?path, "cannot expand path: cannot convert path to string");
        return path.to_owned();
    };

    match shellexpand::full(path_str) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(err) => {
            warn!(path = path_str, "cannot expand path: {err}");
            debug!("{err:?}");
            path.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{env, path::PathBuf};

    #[test]
    fn expand_home_dir() {
        let home = env::var("HOME").unwrap();
        assert_eq!(super::path("~/.mailer"), PathBuf::from(home).join(".mailer"));
    }

    #[test]
    fn keep_unknown_variable() {
        assert_eq!(
            super::path("$MAILER_UNDEFINED_VARIABLE/sendmail"),
            PathBuf::from("$MAILER_UNDEFINED_VARIABLE/sendmail")
        );
    }
}
