//! Configuration for one CLI run.
//!
//! The configuration comes from the first of `--config`, `zfl/config.toml`
//! under the working directory, and `config.toml` in the per-user config
//! directory. Without any of them the defaults apply.
//!
//! Source refs name the input file as given on the command line unless the
//! configuration pins `[parse] file_name`.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use zfl::{ZflError, config::AppConfig, source::DEFAULT_FILE_NAME};

/// Project-local configuration, relative to the working directory.
const LOCAL_CONFIG: &str = "zfl/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),
}

impl From<ConfigError> for ZflError {
    fn from(err: ConfigError) -> Self {
        ZflError::Config(err.to_string())
    }
}

/// Where the configuration of a run is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`; it is an error for the file to be missing.
    Explicit(PathBuf),
    Local(PathBuf),
    User(PathBuf),
    Default,
}

impl ConfigSource {
    /// First applicable source for this machine and working directory.
    pub fn locate(explicit: Option<&Path>) -> Self {
        let user = ProjectDirs::from("com", "zfl", "zfl")
            .map(|dirs| dirs.config_dir().join("config.toml"));
        if user.is_none() {
            debug!("Could not determine the user config directory");
        }
        Self::locate_in(explicit, Path::new(LOCAL_CONFIG), user.as_deref())
    }

    fn locate_in(explicit: Option<&Path>, local: &Path, user: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return ConfigSource::Explicit(path.to_path_buf());
        }
        if local.is_file() {
            return ConfigSource::Local(local.to_path_buf());
        }
        match user {
            Some(path) if path.is_file() => ConfigSource::User(path.to_path_buf()),
            _ => ConfigSource::Default,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Explicit(path) | ConfigSource::Local(path) | ConfigSource::User(path) => {
                Some(path)
            }
            ConfigSource::Default => None,
        }
    }

    /// Read and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ZflError::Config`] when the file is missing, is not valid
    /// TOML for [`AppConfig`], or holds a negative layout spacing.
    pub fn load(&self) -> Result<AppConfig, ZflError> {
        let Some(path) = self.path() else {
            debug!("No configuration file found, using defaults");
            return Ok(AppConfig::default());
        };
        info!(source:? = self; "Loading configuration");

        let content = fs::read_to_string(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ConfigError::MissingFile(path.to_path_buf()).into(),
            _ => ZflError::Io(err),
        })?;
        let config: AppConfig = toml::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        config.layout().validate()?;
        Ok(config)
    }
}

/// Configuration for processing `input`.
///
/// # Errors
///
/// See [`ConfigSource::load`].
pub fn load(explicit: Option<&Path>, input: &str) -> Result<AppConfig, ZflError> {
    let config = ConfigSource::locate(explicit).load()?;
    Ok(name_source_refs(config, input))
}

/// Point source refs at `input` unless the configuration names a file.
fn name_source_refs(config: AppConfig, input: &str) -> AppConfig {
    if config.parse().file_name() == DEFAULT_FILE_NAME {
        config.with_file_name(input)
    } else {
        debug!(file_name = config.parse().file_name(); "Keeping configured file name");
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_explicit_path_wins_even_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let local = write(dir.path(), "local.toml", "");
        let explicit = dir.path().join("missing.toml");

        let source = ConfigSource::locate_in(Some(&explicit), &local, None);
        assert_eq!(source, ConfigSource::Explicit(explicit.clone()));

        let err = source.load().unwrap_err();
        assert!(matches!(err, ZflError::Config(_)));
        assert!(err.to_string().contains("Missing configuration file"));
    }

    #[test]
    fn test_local_before_user_before_default() {
        let dir = tempfile::tempdir().unwrap();
        let user = write(dir.path(), "user.toml", "");
        let local = dir.path().join("local.toml");

        assert_eq!(
            ConfigSource::locate_in(None, &local, Some(&user)),
            ConfigSource::User(user.clone())
        );

        write(dir.path(), "local.toml", "");
        assert_eq!(
            ConfigSource::locate_in(None, &local, Some(&user)),
            ConfigSource::Local(local.clone())
        );

        let nowhere = dir.path().join("nowhere.toml");
        assert_eq!(
            ConfigSource::locate_in(None, &nowhere, Some(&nowhere)),
            ConfigSource::Default
        );
        assert_eq!(ConfigSource::Default.load().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_load_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "config.toml",
            r#"
[parse]
file_name = "flows/orders.zfl"

[layout]
rank_spacing = 240.0
canvas_padding = 0.0
"#,
        );

        let config = ConfigSource::Explicit(path).load().unwrap();
        assert_eq!(config.parse().file_name(), "flows/orders.zfl");
        assert_eq!(config.layout().rank_spacing(), 240.0);
        assert_eq!(config.layout().canvas_padding(), 0.0);
        assert_eq!(config.layout().node_spacing(), 80.0);
    }

    #[test]
    fn test_invalid_files_are_config_errors() {
        let dir = tempfile::tempdir().unwrap();

        let broken = write(dir.path(), "broken.toml", "[layout\nrank_spacing = 1");
        let err = ConfigSource::Local(broken).load().unwrap_err();
        assert!(err.to_string().contains("broken.toml"), "{err}");

        let negative = write(dir.path(), "negative.toml", "[layout]\nnode_spacing = -5.0\n");
        let err = ConfigSource::User(negative).load().unwrap_err();
        assert!(err.to_string().contains("layout.node_spacing"), "{err}");
    }

    #[test]
    fn test_source_refs_name_the_input_unless_pinned() {
        let config = name_source_refs(AppConfig::default(), "demos/simple.zfl");
        assert_eq!(config.parse().file_name(), "demos/simple.zfl");

        let pinned: AppConfig = toml::from_str("[parse]\nfile_name = \"flow.zfl\"\n").unwrap();
        let config = name_source_refs(pinned, "demos/simple.zfl");
        assert_eq!(config.parse().file_name(), "flow.zfl");
        assert_eq!(config.layout(), AppConfig::default().layout());
    }
}
