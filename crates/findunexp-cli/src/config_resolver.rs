//! Locating and loading `findunexp.toml`.
//!
//! Lookup order:
//!
//! 1. `--config <FILE>`
//! 2. `findunexp.toml`, then `.findunexp.toml`, in the working directory
//! 3. `config.toml` in the global directory (`$FINDUNEXP_CONFIG_DIR`, else
//!    `~/.findunexp/`)
//!
//! With none of these present the built-in defaults apply.

use anyhow::{Context, Result};
use findunexp_core::Config;
use std::path::{Path, PathBuf};

const LOCAL_NAMES: [&str; 2] = ["findunexp.toml", ".findunexp.toml"];
const GLOBAL_NAME: &str = "config.toml";
const CONFIG_DIR_VAR: &str = "FINDUNEXP_CONFIG_DIR";

/// Origin of the configuration in effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given on the command line; not checked for existence.
    Explicit(PathBuf),
    /// Found in the working directory.
    Local(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Builtin,
}

impl ConfigSource {
    /// File to load, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Local(p) | Self::Global(p) => Some(p),
            Self::Builtin => None,
        }
    }
}

/// Finds the config file for a run started in `cwd`.
#[must_use]
pub fn locate(cwd: &Path, explicit: Option<&Path>) -> ConfigSource {
    locate_in(cwd, explicit, global_dir().as_deref())
}

fn locate_in(cwd: &Path, explicit: Option<&Path>, global: Option<&Path>) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = LOCAL_NAMES
        .iter()
        .map(|name| cwd.join(name))
        .find(|p| p.is_file())
    {
        tracing::debug!("Found local config: {}", found.display());
        return ConfigSource::Local(found);
    }

    match global.map(|dir| dir.join(GLOBAL_NAME)) {
        Some(p) if p.is_file() => {
            tracing::debug!("Found global config: {}", p.display());
            ConfigSource::Global(p)
        }
        _ => ConfigSource::Builtin,
    }
}

fn global_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_VAR) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => home::home_dir().map(|h| h.join(".findunexp")),
    }
}

/// Loads the configuration named by `source`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load(source: &ConfigSource) -> Result<Config> {
    let Some(path) = source.path() else {
        return Ok(Config::default());
    };
    if matches!(source, ConfigSource::Global(_)) {
        tracing::info!("Using global config: {}", path.display());
    }
    Config::from_file(path).with_context(|| format!("Failed to load {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use findunexp_core::ReportFormat;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_path_wins_and_is_not_checked() {
        let cwd = TempDir::new().unwrap();
        fs::write(cwd.path().join("findunexp.toml"), "").unwrap();

        let source = locate_in(cwd.path(), Some(Path::new("/missing.toml")), None);
        assert_eq!(source, ConfigSource::Explicit(PathBuf::from("/missing.toml")));
        assert!(load(&source).is_err());
    }

    #[test]
    fn plain_name_preferred_over_dotfile() {
        let cwd = TempDir::new().unwrap();
        fs::write(cwd.path().join(".findunexp.toml"), "").unwrap();
        assert_eq!(
            locate_in(cwd.path(), None, None),
            ConfigSource::Local(cwd.path().join(".findunexp.toml"))
        );

        fs::write(cwd.path().join("findunexp.toml"), "").unwrap();
        assert_eq!(
            locate_in(cwd.path(), None, None),
            ConfigSource::Local(cwd.path().join("findunexp.toml"))
        );
    }

    #[test]
    fn global_used_only_without_local_config() {
        let cwd = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        assert_eq!(
            locate_in(cwd.path(), None, Some(global.path())),
            ConfigSource::Builtin
        );

        fs::write(global.path().join("config.toml"), "").unwrap();
        assert_eq!(
            locate_in(cwd.path(), None, Some(global.path())),
            ConfigSource::Global(global.path().join("config.toml"))
        );

        fs::write(cwd.path().join("findunexp.toml"), "").unwrap();
        assert!(matches!(
            locate_in(cwd.path(), None, Some(global.path())),
            ConfigSource::Local(_)
        ));
    }

    #[test]
    fn builtin_loads_defaults() {
        let config = load(&ConfigSource::Builtin).unwrap();
        assert_eq!(config.scan.import_pattern, ".*");
        assert_eq!(config.output.format, ReportFormat::Text);
    }

    #[test]
    fn loads_file_contents() {
        let cwd = TempDir::new().unwrap();
        let path = cwd.path().join("findunexp.toml");
        fs::write(&path, "[scan]\nimport_pattern = \"^net/\"\n\n[output]\nformat = \"json\"\n").unwrap();

        let config = load(&ConfigSource::Local(path)).unwrap();
        assert_eq!(config.scan.import_pattern, "^net/");
        assert_eq!(config.output.format, ReportFormat::Json);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let cwd = TempDir::new().unwrap();
        let path = cwd.path().join("findunexp.toml");
        fs::write(&path, "[scan\n").unwrap();

        let err = load(&ConfigSource::Local(path)).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load"));
    }
}
