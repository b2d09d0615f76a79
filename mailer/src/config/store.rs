use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::{
    legacy::{self, LegacyConfig},
    wizard::{self, Prompt},
    ConfigFile, Error, Result, SCHEMA_VERSION,
};
use crate::expand;

const CONFIG_HEADER: &str = "# mailer configuration, see `mailer --configure`\n";

/// What to do when the configuration file is in the legacy format.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MigrationPolicy {
    /// Migrate the legacy file in memory, without rewriting it.
    #[default]
    Auto,

    /// Refuse to load the legacy file until it is explicitly
    /// migrated.
    Disabled,
}

/// The configuration store.
///
/// All configuration file accesses go through the store: loading,
/// migrating and saving.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigStore {
    path: PathBuf,
    policy: MigrationPolicy,
}

impl ConfigStore {
    /// Creates a store for the given configuration file path. `~` and
    /// environment variables are expanded.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: expand::path(path),
            policy: MigrationPolicy::default(),
        }
    }

    /// Creates a store for the default configuration file path.
    pub fn from_default_path() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    /// Returns `<user config dir>/mailer/config.yaml`.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or(Error::GetConfigDirError)?;
        Ok(dir.join("mailer").join("config.yaml"))
    }

    pub fn with_migration_policy(mut self, policy: MigrationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn migration_policy(&self) -> MigrationPolicy {
        self.policy
    }

    fn read(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(Error::ReadMissingConfigError(self.path.clone()))
            }
            Err(err) => Err(Error::ReadConfigError(err, self.path.clone())),
        }
    }

    /// Loads and validates the configuration.
    ///
    /// A legacy configuration is migrated in memory when the
    /// migration policy allows it. The file itself is never written.
    pub fn load(&self) -> Result<ConfigFile> {
        let path = &self.path;
        debug!(?path, "load configuration");

        let content = self.read()?;

        if is_legacy(&content) {
            if self.policy == MigrationPolicy::Disabled {
                return Err(Error::MigrationRequiredError(path.clone()));
            }

            warn!(?path, "legacy configuration, run `mailer --migrate` to convert it");
            return self.migrate_content(&content);
        }

        let config: ConfigFile = serde_yaml::from_str(&content)
            .map_err(|err| Error::ParseConfigError(err, path.clone()))?;

        if config.version != SCHEMA_VERSION {
            return Err(Error::UnsupportedVersionError(config.version, path.clone()));
        }

        config
            .validate()
            .map_err(|err| Error::InvalidConfigError(err, path.clone()))?;

        Ok(config)
    }

    /// Saves the given configuration.
    ///
    /// The document is written to a temporary file next to the
    /// configuration file, synced, then renamed over it: readers see
    /// either the previous document or the new one.
    pub fn save(&self, config: &ConfigFile) -> Result<()> {
        config.validate().map_err(Error::ValidateConfigError)?;

        let mut config = config.clone();
        config.version = SCHEMA_VERSION;

        let yaml = serde_yaml::to_string(&config).map_err(Error::SerializeConfigError)?;

        let path = &self.path;
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_owned(),
            _ => PathBuf::from("."),
        };

        fs::create_dir_all(&dir).map_err(|err| Error::CreateConfigDirError(err, dir.clone()))?;

        let mut file =
            NamedTempFile::new_in(&dir).map_err(|err| Error::CreateTempFileError(err, dir))?;
        let tmp_path = file.path().to_owned();

        let write = |file: &mut NamedTempFile| -> io::Result<()> {
            file.write_all(CONFIG_HEADER.as_bytes())?;
            file.write_all(yaml.as_bytes())?;
            file.as_file().sync_all()
        };

        write(&mut file).map_err(|err| Error::WriteTempFileError(err, tmp_path))?;

        file.persist(path)
            .map_err(|err| Error::PersistConfigError(err.error, path.clone()))?;

        info!(?path, kind = %config.transport.kind(), "configuration saved");
        Ok(())
    }

    /// Converts the legacy configuration file into the current format.
    ///
    /// The legacy file is kept next to the new one with a `.v1.bak`
    /// extension.
    pub fn migrate(&self) -> Result<ConfigFile> {
        let path = &self.path;
        info!(?path, "migrate legacy configuration");

        let content = self.read()?;

        if !is_legacy(&content) {
            return Err(Error::MigrateNonLegacyConfigError(path.clone()));
        }

        let config = self.migrate_content(&content)?;

        let backup_path = self.backup_path();
        fs::copy(path, &backup_path)
            .map_err(|err| Error::BackupConfigError(err, backup_path.clone()))?;
        debug!(?backup_path, "legacy configuration backed up");

        self.save(&config)?;

        Ok(config)
    }

    /// Returns the path of the OAuth 2.0 token file written next to
    /// legacy YAML configurations.
    pub fn token_path(&self) -> PathBuf {
        self.path.with_extension("token")
    }

    fn migrate_content(&self, content: &str) -> Result<ConfigFile> {
        let path = &self.path;

        self.read_legacy(content)
            .and_then(|legacy| legacy::migrate(&legacy))
            .map_err(|err| Error::MigrateConfigError(err, path.clone()))
    }

    fn read_legacy(&self, content: &str) -> legacy::Result<LegacyConfig> {
        if LegacyConfig::is_legacy(content) {
            return LegacyConfig::parse(content);
        }

        let legacy = LegacyConfig::parse_yaml(content)?;
        let token_path = self.token_path();

        match fs::read_to_string(&token_path) {
            Ok(token) => {
                debug!(?token_path, "read legacy token file");
                legacy.with_token_file(&token)
            }
            Err(err) => {
                debug!(?token_path, "cannot read legacy token file: {err}");
                Ok(legacy)
            }
        }
    }

    /// Returns the path of the legacy configuration backup.
    pub fn backup_path(&self) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(".v1.bak");
        path.into()
    }

    /// Prompts the configuration, then saves it.
    ///
    /// Values of the current configuration, when it can be loaded, are
    /// proposed as defaults.
    pub fn interactive_configure(&self, prompt: &mut impl Prompt) -> Result<ConfigFile> {
        let existing = match self.load() {
            Ok(config) => Some(config),
            Err(err) => {
                debug!("cannot load existing configuration: {err}");
                None
            }
        };

        let config = wizard::configure(prompt, existing.as_ref())?;
        self.save(&config)?;

        Ok(config)
    }
}

fn is_legacy(content: &str) -> bool {
    LegacyConfig::is_legacy(content) || LegacyConfig::is_legacy_yaml(content)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::ConfigStore;

    #[test]
    fn backup_path() {
        let store = ConfigStore::new("/tmp/mailer/config");
        assert_eq!(store.backup_path(), PathBuf::from("/tmp/mailer/config.v1.bak"));
    }

    #[test]
    fn token_path() {
        let store = ConfigStore::new("/tmp/mailer/mail.yaml");
        assert_eq!(store.token_path(), PathBuf::from("/tmp/mailer/mail.token"));
    }

    #[test]
    fn default_path() {
        if let Ok(path) = ConfigStore::default_path() {
            assert!(path.ends_with("mailer/config.yaml"));
        }
    }
}
