use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

/// Environment variable pointing at the settings file.
pub const SETTINGS_ENV: &str = "LOTTIX_SETTINGS";

pub const MIN_PREVIEW_SIZE: u32 = 30;
pub const MAX_PREVIEW_SIZE: u32 = 300;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to access settings {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to encode settings for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

impl Theme {
    pub fn is_dark(&self, system_prefers_dark: bool) -> bool {
        match self {
            Theme::System => system_prefers_dark,
            Theme::Light => false,
            Theme::Dark => true,
        }
    }
}

/// Which discovered animations the popup lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PreviewMode {
    #[default]
    All,
    /// Packaged `.lottie` only.
    Lottie,
    /// Raw `.json` only.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DownloadSizeMode {
    #[default]
    Original,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Grid,
    List,
}

/// User preferences, stored under the same keys the extension uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    /// Preview edge length in pixels.
    pub default_lottie_size: u32,
    pub preview_mode: PreviewMode,
    pub autoplay: bool,
    pub download_size_mode: DownloadSizeMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_download_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_download_height: Option<u32>,
    pub default_layout: Layout,
    pub grid_rows: u32,
    pub expand_on_click: bool,
    /// Gates the edit affordances. The engine itself ignores it.
    pub enable_basic_editor: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            default_lottie_size: 100,
            preview_mode: PreviewMode::All,
            autoplay: true,
            download_size_mode: DownloadSizeMode::Original,
            custom_download_width: Some(300),
            custom_download_height: Some(300),
            default_layout: Layout::Grid,
            grid_rows: 6,
            expand_on_click: false,
            enable_basic_editor: true,
        }
    }
}

impl Settings {
    /// Reads settings from `path`. A missing file means defaults.
    #[instrument(level = "debug")]
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No settings file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let settings: Settings =
            serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(settings.normalized())
    }

    /// Settings from the file named by `LOTTIX_SETTINGS`, or defaults.
    pub fn from_env() -> Result<Self, SettingsError> {
        match std::env::var_os(SETTINGS_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let text = serde_json::to_string_pretty(&self.for_storage()).map_err(|source| {
            SettingsError::Encode {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, text).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Clamps values the options page would never produce.
    pub fn normalized(mut self) -> Self {
        self.default_lottie_size = self
            .default_lottie_size
            .clamp(MIN_PREVIEW_SIZE, MAX_PREVIEW_SIZE);
        self.grid_rows = self.grid_rows.max(1);
        self
    }

    /// Custom download sizes are only stored while custom sizing is selected.
    fn for_storage(&self) -> Self {
        let mut stored = self.clone();
        if stored.download_size_mode == DownloadSizeMode::Original {
            stored.custom_download_width = None;
            stored.custom_download_height = None;
        }
        stored
    }

    /// Target width for downloads, when resizing applies.
    pub fn download_width(&self) -> Option<u32> {
        match self.download_size_mode {
            DownloadSizeMode::Custom => self.custom_download_width.filter(|w| *w > 0),
            DownloadSizeMode::Original => None,
        }
    }
}
