//! XDG-compliant location of the configuration file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::{APP_NAME, AppConfig};

/// File name used inside the configuration directory.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Resolved application paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// The TOML configuration file.
    pub config_file: PathBuf,
}

impl AppPaths {
    /// Discover application paths, optionally overriding the config file location.
    ///
    /// An override naming a directory resolves to `config.toml` inside it.
    pub fn discover(override_path: Option<PathBuf>) -> Result<Self> {
        let config_file = match override_path {
            Some(path) => {
                let expanded = expand_path(path)?;
                if expanded.is_dir() {
                    expanded.join(CONFIG_FILENAME)
                } else {
                    expanded
                }
            }
            None => default_config_dir()?.join(CONFIG_FILENAME),
        };

        if config_file.parent().is_none() {
            return Err(anyhow!("invalid config file path: {config_file:?}"));
        }

        Ok(Self { config_file })
    }

    /// Directory holding the config file.
    #[must_use]
    pub fn config_dir(&self) -> Option<&Path> {
        self.config_file.parent()
    }
}

impl std::fmt::Display for AppPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "config: {}", self.config_file.display())
    }
}

/// Expand a PathBuf, resolving ~ and environment variables.
pub fn expand_path(path: PathBuf) -> Result<PathBuf> {
    if let Some(text) = path.to_str() {
        expand_str_path(text)
    } else {
        Ok(path)
    }
}

/// Expand a string path, resolving ~ and environment variables.
pub fn expand_str_path(text: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(text).context("expanding path")?;
    Ok(PathBuf::from(expanded.to_string()))
}

/// Get the default configuration directory (XDG_CONFIG_HOME or fallback).
pub fn default_config_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir).join(APP_NAME));
    }

    if let Some(dir) = dirs::config_dir() {
        return Ok(dir.join(APP_NAME));
    }

    dirs::home_dir()
        .map(|home| home.join(".config").join(APP_NAME))
        .ok_or_else(|| anyhow!("unable to determine configuration directory"))
}

/// Write the default configuration file to the specified path.
pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {parent:?}"))?;
    }

    let toml_str = toml::to_string_pretty(&AppConfig::default())
        .context("serializing default config to TOML")?;
    let mut body = default_config_header(path);
    body.push_str(&toml_str);
    fs::write(path, body).with_context(|| format!("writing config file to {}", path.display()))?;
    log::info!("wrote default config to {}", path.display());
    Ok(())
}

fn default_config_header(path: &Path) -> String {
    format!(
        "# Configuration for {APP_NAME}\n# File: {}\n\n",
        path.display()
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn directory_override_resolves_to_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = AppPaths::discover(Some(dir.path().to_path_buf())).expect("discover");
        assert_eq!(paths.config_file, dir.path().join(CONFIG_FILENAME));
        assert_eq!(paths.config_dir(), Some(dir.path()));
    }

    #[test]
    fn file_override_is_kept() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("custom.toml");
        let paths = AppPaths::discover(Some(file.clone())).expect("discover");
        assert_eq!(paths.config_file, file);
        assert_eq!(paths.to_string(), format!("config: {}", file.display()));
    }

    #[test]
    fn default_config_round_trips_through_loader() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("a").join("b").join(CONFIG_FILENAME);
        write_default_config(&file).expect("write");

        let body = fs::read_to_string(&file).expect("read");
        assert!(body.contains(&format!("# File: {}", file.display())));

        let loaded = AppConfig::load_from_path(&file).expect("load");
        assert_eq!(loaded.parser.begin, "[");
        assert_eq!(loaded.parser.end, "]");
        assert!(loaded.parser.strict);
    }

    #[test]
    fn unset_variables_fail_to_expand() {
        assert!(expand_str_path("$TINYTOOLS_PATHS_TEST_UNSET_VAR/x").is_err());
        assert_eq!(
            expand_str_path("/plain/path").expect("expand"),
            PathBuf::from("/plain/path")
        );
    }
}
