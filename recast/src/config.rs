use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_FILENAME, DEFAULT_EXCLUDE_FOLDERS, DEFAULT_FORMAT_CALLS, DEFAULT_MIN_DUPLICATES,
    DEFAULT_RECOVERY_METHOD,
};
use crate::error::{RecastError, Result};

#[derive(Debug, Deserialize, Default, Clone)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default)]
    /// The main configuration section.
    pub recast: RecastConfig,
    /// The path to the configuration file this was loaded from.
    /// Set during `load_from_path`, `None` if using defaults or programmatic config.
    #[serde(skip)]
    pub config_file_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
/// Options of the `[recast]` section. Every key is optional.
pub struct RecastConfig {
    /// Rule ids to run. All rules when absent.
    pub rules: Option<Vec<String>>,
    /// Rule ids to skip, applied after `rules`.
    pub ignore: Option<Vec<String>>,
    /// Calls whose first argument is never extracted as a constant.
    pub format_calls: Option<Vec<String>>,
    /// Occurrences needed before a literal is extracted.
    pub min_duplicates: Option<usize>,
    /// Method invoked on the exception in an otherwise empty handler.
    pub recovery_method: Option<String>,
    /// Folders to skip when looking for unit files.
    pub exclude_folders: Option<Vec<String>>,
}

impl RecastConfig {
    /// Whether the rule with `id` should run.
    #[must_use]
    pub fn is_rule_enabled(&self, id: &str) -> bool {
        let selected = self
            .rules
            .as_ref()
            .map_or(true, |rules| rules.iter().any(|r| r.eq_ignore_ascii_case(id)));
        let ignored = self
            .ignore
            .as_ref()
            .is_some_and(|ignore| ignore.iter().any(|r| r.eq_ignore_ascii_case(id)));
        selected && !ignored
    }

    /// Whether `name` is a logging or formatting call.
    #[must_use]
    pub fn is_format_call(&self, name: &str) -> bool {
        match &self.format_calls {
            Some(calls) => calls.iter().any(|c| c == name),
            None => DEFAULT_FORMAT_CALLS.contains(&name),
        }
    }

    /// Effective duplicate threshold, never below 2.
    #[must_use]
    pub fn min_duplicates(&self) -> usize {
        self.min_duplicates.unwrap_or(DEFAULT_MIN_DUPLICATES).max(2)
    }

    /// Effective recovery method name.
    #[must_use]
    pub fn recovery_method(&self) -> &str {
        self.recovery_method
            .as_deref()
            .unwrap_or(DEFAULT_RECOVERY_METHOD)
    }

    /// Effective folder exclusions.
    #[must_use]
    pub fn exclude_folders(&self) -> Vec<String> {
        self.exclude_folders.clone().unwrap_or_else(|| {
            DEFAULT_EXCLUDE_FOLDERS
                .iter()
                .map(|s| (*s).to_owned())
                .collect()
        })
    }
}

impl Config {
    /// Loads configuration from the current directory upwards.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file exists but cannot be read or
    /// parsed.
    pub fn load() -> Result<Self> {
        Self::load_from_path(Path::new("."))
    }

    /// Loads configuration starting from a specific path and traversing up.
    /// The first `.recast.toml` found wins; defaults apply when none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file found cannot be read or parsed.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut current = path.to_path_buf();
        if current.is_file() {
            current.pop();
        }

        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                let content = fs::read_to_string(&candidate).map_err(|source| RecastError::Io {
                    path: candidate.clone(),
                    source,
                })?;
                let mut config =
                    toml::from_str::<Config>(&content).map_err(|source| RecastError::Config {
                        path: candidate.clone(),
                        source,
                    })?;
                tracing::debug!(path = %candidate.display(), "loaded configuration");
                config.config_file_path = Some(candidate);
                return Ok(config);
            }

            if !current.pop() {
                break;
            }
        }

        Ok(Config::default())
    }
}
