//! Runtime configuration.
//!
//! Defaults are compiled in. An optional `.env` file and the process
//! environment override them; CLI flags override both.
//!
//! | Variable                 | Default          |
//! |--------------------------|------------------|
//! | `VOLREG2ITK_SUFFIX`      | `_mc4d_itk.txt`  |
//! | `VOLREG2ITK_OUTPUT_DIR`  | current dir      |
//! | `VOLREG2ITK_PORT`        | `3000`           |

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Suffix appended to the input stem to name the ITK output.
pub const DEFAULT_SUFFIX: &str = "_mc4d_itk.txt";

/// HTTP port for `serve`.
pub const DEFAULT_PORT: u16 = 3000;

/// Upload limit for the HTTP service (16 MB).
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub const ENV_SUFFIX: &str = "VOLREG2ITK_SUFFIX";
pub const ENV_OUTPUT_DIR: &str = "VOLREG2ITK_OUTPUT_DIR";
pub const ENV_PORT: &str = "VOLREG2ITK_PORT";

/// Effective settings for the CLI and server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverterConfig {
    /// Output file suffix.
    pub suffix: String,
    /// Output directory. `None` means the current working directory.
    pub output_dir: Option<PathBuf>,
    /// HTTP port.
    pub port: u16,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            output_dir: None,
            port: DEFAULT_PORT,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl ConverterConfig {
    /// Load `.env` (if present) and apply environment overrides.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(suffix) = lookup(ENV_SUFFIX).filter(|s| !s.is_empty()) {
            config.suffix = suffix;
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR).filter(|s| !s.is_empty()) {
            config.output_dir = Some(PathBuf::from(dir));
        }
        if let Some(port) = lookup(ENV_PORT).and_then(|p| p.trim().parse().ok()) {
            config.port = port;
        }

        config
    }

    /// Override the suffix if one is given.
    pub fn with_suffix(mut self, suffix: Option<String>) -> Self {
        if let Some(s) = suffix {
            self.suffix = s;
        }
        self
    }

    /// Override the output directory if one is given.
    pub fn with_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        if dir.is_some() {
            self.output_dir = dir;
        }
        self
    }
}
