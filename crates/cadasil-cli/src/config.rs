//! Dashboard configuration.
//!
//! Settings come from a TOML file and are then overridden by environment
//! variables (a `.env` file is loaded into the environment by the binary).
//! The file is looked up in this order:
//! - the `--config` path
//! - `cadasil.toml` in the working directory
//! - `cadasil.toml` in the platform config folder (`~/.config/cadasil/` on Linux)

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use cadasil_ingest::{
    DelimitedFileSource, IngestError, RecordSource, RedcapClient, RedcapSettings, SupabaseClient,
    SupabaseSettings,
};
use cadasil_model::{AgeRange, FilterState, ModelError};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

const APP_QUALIFIER: &str = "org";
const APP_ORG: &str = "cadasil";
const APP_NAME: &str = "cadasil";
pub const CONFIG_FILENAME: &str = "cadasil.toml";

pub const ENV_SOURCE: &str = "CADASIL_SOURCE";
pub const ENV_REDCAP_URL: &str = "REDCAP_URL";
pub const ENV_REDCAP_TOKEN: &str = "REDCAP_API_TOKEN";
pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_KEY: &str = "SUPABASE_ANON_KEY";
pub const ENV_SUPABASE_TABLE: &str = "SUPABASE_TABLE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value '{value}' for {name}")]
    InvalidValue { name: &'static str, value: String },

    #[error("invalid default filters: {0}")]
    Filters(#[from] ModelError),

    #[error("source is csv but no export path was given (use --csv or [source] path)")]
    MissingCsvPath,

    #[error(transparent)]
    Client(#[from] IngestError),
}

/// Which loader feeds the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Redcap,
    Supabase,
    Csv,
}

impl SourceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Redcap => "redcap",
            Self::Supabase => "supabase",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "redcap" => Ok(Self::Redcap),
            "supabase" => Ok(Self::Supabase),
            "csv" | "file" => Ok(Self::Csv),
            _ => Err(ConfigError::InvalidValue {
                name: ENV_SOURCE,
                value: s.to_string(),
            }),
        }
    }
}

/// `[source]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub kind: SourceKind,
    /// Export read when `kind = "csv"`.
    pub path: Option<PathBuf>,
}

/// `[filters]` section: the filters a session starts with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterDefaults {
    pub age_min: f64,
    pub age_max: f64,
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self {
            age_min: AgeRange::DEFAULT_MIN,
            age_max: AgeRange::DEFAULT_MAX,
        }
    }
}

impl FilterDefaults {
    pub fn to_filter_state(self) -> Result<FilterState, ConfigError> {
        let range = AgeRange::new(self.age_min, self.age_max)?;
        Ok(FilterState::default().with_age_range(range))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceSettings,
    pub redcap: RedcapSettings,
    pub supabase: SupabaseSettings,
    pub filters: FilterDefaults,
}

impl Config {
    /// Loads the first config file found, or defaults when there is none.
    ///
    /// An explicit path must exist. A file that exists but does not parse is
    /// always an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        for path in default_locations() {
            match fs::read_to_string(&path) {
                Ok(content) => {
                    info!(path = %path.display(), "loaded config file");
                    return Self::from_toml(&content, &path);
                }
                Err(error) if error.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "no config file");
                }
                Err(source) => return Err(ConfigError::Read { path, source }),
            }
        }
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies environment overrides from the process environment.
    pub fn apply_process_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env(|name| std::env::var(name).ok())
    }

    /// Applies overrides looked up through `lookup`. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(kind) = get(ENV_SOURCE) {
            self.source.kind = kind.parse()?;
        }
        if let Some(url) = get(ENV_REDCAP_URL) {
            self.redcap.url = Some(url);
        }
        if let Some(token) = get(ENV_REDCAP_TOKEN) {
            self.redcap.token = Some(token);
        }
        if let Some(url) = get(ENV_SUPABASE_URL) {
            self.supabase.url = Some(url);
        }
        if let Some(key) = get(ENV_SUPABASE_KEY) {
            self.supabase.anon_key = Some(key);
        }
        if let Some(table) = get(ENV_SUPABASE_TABLE) {
            self.supabase.table = Some(table);
        }
        Ok(())
    }

    /// Builds the loader selected by `[source] kind`.
    pub fn record_source(&self) -> Result<Box<dyn RecordSource>, ConfigError> {
        let source: Box<dyn RecordSource> = match self.source.kind {
            SourceKind::Redcap => Box::new(RedcapClient::new(self.redcap.clone())?),
            SourceKind::Supabase => Box::new(SupabaseClient::new(self.supabase.clone())?),
            SourceKind::Csv => {
                let path = self.source.path.clone().ok_or(ConfigError::MissingCsvPath)?;
                Box::new(DelimitedFileSource::new(path))
            }
        };
        debug!(source = source.name(), "selected data source");
        Ok(source)
    }
}

/// Candidate config files, most specific first.
pub fn default_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(CONFIG_FILENAME)];
    if let Some(dirs) = ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME) {
        locations.push(dirs.config_dir().join(CONFIG_FILENAME));
    }
    locations
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml(
            "[source]\nkind = \"supabase\"\n\n[filters]\nage_min = 18\n",
            Path::new("cadasil.toml"),
        )
        .unwrap();
        assert_eq!(config.source.kind, SourceKind::Supabase);
        assert_eq!(config.filters.age_min, 18.0);
        assert_eq!(config.filters.age_max, AgeRange::DEFAULT_MAX);
        assert_eq!(config.redcap, RedcapSettings::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let err = Config::from_toml("[source\nkind = 3", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = Config::from_toml(
            "[redcap]\nurl = \"https://old.example.org\"\ntoken = \"old\"\n",
            Path::new("cadasil.toml"),
        )
        .unwrap();
        let env: HashMap<&str, &str> = [
            (ENV_SOURCE, "csv"),
            (ENV_REDCAP_TOKEN, "new-token"),
            (ENV_SUPABASE_TABLE, "registro"),
            (ENV_SUPABASE_URL, "   "),
        ]
        .into_iter()
        .collect();
        config
            .apply_env(|name| env.get(name).map(ToString::to_string))
            .unwrap();
        assert_eq!(config.source.kind, SourceKind::Csv);
        assert_eq!(config.redcap.url.as_deref(), Some("https://old.example.org"));
        assert_eq!(config.redcap.token.as_deref(), Some("new-token"));
        assert_eq!(config.supabase.table(), "registro");
        assert_eq!(config.supabase.url, None);
    }

    #[test]
    fn unknown_source_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env(|name| (name == ENV_SOURCE).then(|| "oracle".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: ENV_SOURCE, .. }));
    }

    #[test]
    fn csv_source_needs_a_path() {
        let mut config = Config::default();
        config.source.kind = SourceKind::Csv;
        assert!(matches!(config.record_source(), Err(ConfigError::MissingCsvPath)));

        config.source.path = Some(PathBuf::from("registro.csv"));
        assert_eq!(config.record_source().unwrap().name(), "csv");
        assert_eq!(Config::default().record_source().unwrap().name(), "redcap");
    }

    #[test]
    fn inverted_default_ages_are_rejected() {
        let defaults = FilterDefaults {
            age_min: 70.0,
            age_max: 20.0,
        };
        assert!(matches!(defaults.to_filter_state(), Err(ConfigError::Filters(_))));
    }
}
