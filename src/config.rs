// SecureValues — Provider configuration
//
// Describes where the native library lives and how to talk to it. The
// library itself never reads the environment; the embedding application
// (or the CLI) builds a `ProviderConfig` and hands it to the provider.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Constants ───────────────────────────────────────────────────────────────

/// Logical name of the native library, before platform decoration.
pub const DEFAULT_LIBRARY_NAME: &str = "secure-values";

/// Exported symbol implementing the secret lookup.
pub const DEFAULT_ENTRY_SYMBOL: &str = "secure_values_get";

/// Size of the buffer handed to the native call.
pub const DEFAULT_MAX_SECRET_LEN: usize = 4096;

/// Upper bound accepted for `max_secret_len`.
pub const MAX_SECRET_LEN_LIMIT: usize = 64 * 1024;

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// ─── Config ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Logical library name, decorated per platform
    /// (`libsecure-values.so`, `libsecure-values.dylib`, `secure-values.dll`).
    pub library_name: String,

    /// Exact library file to open. When set, no searching happens.
    pub library_path: Option<PathBuf>,

    /// Directories probed, in order, for the decorated library file.
    pub search_dirs: Vec<PathBuf>,

    /// Fall back to the system loader's search path after `search_dirs`.
    pub system_search: bool,

    pub entry_symbol: String,

    /// Capacity of the buffer the native call writes into. Replies that
    /// report a longer secret are rejected.
    pub max_secret_len: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            library_name: DEFAULT_LIBRARY_NAME.to_string(),
            library_path: None,
            search_dirs: Vec::new(),
            system_search: true,
            entry_symbol: DEFAULT_ENTRY_SYMBOL.to_string(),
            max_secret_len: DEFAULT_MAX_SECRET_LEN,
        }
    }
}

impl ProviderConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    pub fn with_system_search(mut self, enabled: bool) -> Self {
        self.system_search = enabled;
        self
    }

    pub fn with_entry_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.entry_symbol = symbol.into();
        self
    }

    pub fn with_max_secret_len(mut self, len: usize) -> Self {
        self.max_secret_len = len;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.library_name.trim().is_empty() {
            return Err(ConfigError::Invalid("library_name must not be empty".into()));
        }
        if self.library_name.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "library_name `{}` must be a bare name; use library_path for files",
                self.library_name
            )));
        }
        if self.entry_symbol.is_empty() || self.entry_symbol.contains('\0') {
            return Err(ConfigError::Invalid(
                "entry_symbol must be a non-empty symbol name".into(),
            ));
        }
        if self.max_secret_len == 0 || self.max_secret_len > MAX_SECRET_LEN_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_secret_len must be between 1 and {} (got {})",
                MAX_SECRET_LEN_LIMIT, self.max_secret_len
            )));
        }
        if self.library_path.is_none() && self.search_dirs.is_empty() && !self.system_search {
            return Err(ConfigError::Invalid(
                "no library location: set library_path, search_dirs, or system_search".into(),
            ));
        }
        Ok(())
    }

    /// Platform-specific file name for `library_name`.
    pub fn library_filename(&self) -> OsString {
        libloading::library_filename(&self.library_name)
    }

    /// Paths handed to the dynamic loader, in the order they are tried.
    pub fn candidates(&self) -> Vec<PathBuf> {
        if let Some(path) = &self.library_path {
            return vec![path.clone()];
        }

        let filename = self.library_filename();
        let mut candidates: Vec<PathBuf> = self
            .search_dirs
            .iter()
            .map(|dir| dir.join(&filename))
            .collect();
        if self.system_search {
            candidates.push(PathBuf::from(filename));
        }
        candidates
    }

    /// Human-readable name used in errors and logs.
    pub fn display_name(&self) -> String {
        match &self.library_path {
            Some(path) => path.display().to_string(),
            None => self.library_name.clone(),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
