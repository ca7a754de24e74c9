//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`PBT_ROOT_FOLDER`)
//! 3. TOML config file (`root_folder` key)
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable config file is never fatal; defaults apply.

use crate::kinematics::{TIME_COLUMN, Y_AXIS_LABEL};
use crate::metrics::MetricPalette;
use crate::storage::FileStore;
use crate::{Error, Result};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "PBT_ROOT_FOLDER";

pub const DEFAULT_PORT: u16 = 5731;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 512;

const DATABASE_FILE: &str = "pbt.db";
const VIDEO_DIR: &str = "videos";
const DATA_DIR: &str = "data";

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional; anything missing falls back to a built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database, videos and CSV data
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub bind_address: Option<String>,

    /// Identity reported for the signed-in operator
    #[serde(default)]
    pub operator: Option<String>,

    /// Bearer token required on API routes; unset disables the check
    #[serde(default)]
    pub operator_token: Option<String>,

    /// Largest accepted upload request, in megabytes
    #[serde(default)]
    pub max_upload_mb: Option<usize>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    /// Load the explicit file if given, else the platform default location.
    /// Missing or broken files yield defaults with a warning.
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => return Self::default(),
            },
        };

        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded config file: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Default config file location for the platform (`<config_dir>/pbt/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pbt").join("config.toml"))
}

/// Resolve the root folder using CLI > env > TOML > compiled default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("pbt"))
        .unwrap_or_else(|| PathBuf::from("./pbt_data"))
}

/// Socket address to listen on; `bind` is an IPv4 or IPv6 address
pub fn listen_address(bind: &str, port: u16) -> Result<SocketAddr> {
    let ip: IpAddr = bind
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .parse()
        .map_err(|_| Error::Config(format!("Invalid bind address '{}'", bind)))?;
    Ok(SocketAddr::new(ip, port))
}

/// Runtime configuration handed to every flow at construction
///
/// Holds the storage layout, metric palette and chart labels that the
/// dashboard would otherwise keep as module-level constants.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub root_folder: PathBuf,
    pub database_path: PathBuf,
    pub video_dir: PathBuf,
    pub data_dir: PathBuf,
    pub palette: MetricPalette,
    pub time_column: String,
    pub y_axis_label: String,
    pub max_upload_bytes: usize,
    pub operator: Option<String>,
    pub operator_token: Option<String>,
}

impl DashboardConfig {
    /// Standard layout under `root_folder` with default palette and labels
    pub fn for_root(root_folder: impl Into<PathBuf>) -> Self {
        let root_folder = root_folder.into();
        Self {
            database_path: root_folder.join(DATABASE_FILE),
            video_dir: root_folder.join(VIDEO_DIR),
            data_dir: root_folder.join(DATA_DIR),
            root_folder,
            palette: MetricPalette::kinovea(),
            time_column: TIME_COLUMN.to_string(),
            y_axis_label: Y_AXIS_LABEL.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            operator: None,
            operator_token: None,
        }
    }

    /// Layout under `root_folder`, with operator and upload settings from TOML
    pub fn from_toml(root_folder: impl Into<PathBuf>, toml: &TomlConfig) -> Self {
        let mut config = Self::for_root(root_folder);
        if let Some(mb) = toml.max_upload_mb {
            config.max_upload_bytes = mb.saturating_mul(1024 * 1024);
        }
        config.operator = toml.operator.clone();
        config.operator_token = toml.operator_token.clone().filter(|t| !t.is_empty());
        config
    }

    pub fn file_store(&self) -> FileStore {
        FileStore::new(&self.video_dir, &self.data_dir)
    }

    /// Create the root, video and data directories if missing
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        std::fs::create_dir_all(&self.video_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}
