// MangaShelf - platform/config.rs
//
// Platform-specific configuration, data directory resolution, and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::browse::BrowseConfig;
use crate::core::sort::{self, SortRule};
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for MangaShelf data and configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/mangashelf/ or %APPDATA%\MangaShelf\config\)
    pub config_dir: PathBuf,

    /// Data directory holding the default library file.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        }
    }

    /// Default location of the library file.
    pub fn library_file(&self) -> PathBuf {
        self.data_dir.join(constants::LIBRARY_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored so a newer config file still loads in
/// an older binary.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[library]` section.
    pub library: LibrarySection,
    /// `[ui]` section.
    pub ui: UiSection,
    /// `[browse]` section.
    pub browse: BrowseSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[library]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LibrarySection {
    /// Library JSON file. Empty = built-in sample collection.
    pub path: Option<String>,
    /// Show adult-tagged entries.
    pub show_adult: Option<bool>,
}

/// `[ui]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// Theme: "fluent" or "pink".
    pub theme: Option<String>,
    pub dark_mode: Option<bool>,
    /// Layout density: "comfortable" or "compact".
    pub density: Option<String>,
    /// Sort rules, e.g. "date_added:desc,title:asc".
    pub sort: Option<String>,
}

/// `[browse]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct BrowseSection {
    /// Maximum recursion depth for media scans.
    pub max_depth: Option<usize>,
    /// Maximum items per listing or scan.
    pub max_items: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Library --
    /// Library file. None = use the sample collection.
    pub library_path: Option<PathBuf>,
    pub show_adult: bool,

    // -- UI --
    /// Lower-case theme name, one of "fluent" or "pink".
    pub theme: String,
    pub dark_mode: bool,
    /// Lower-case density name, one of "comfortable" or "compact".
    pub density: String,
    pub sort_rules: Vec<SortRule>,

    // -- Browse --
    pub browse_max_depth: usize,
    pub browse_max_items: usize,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            show_adult: false,
            theme: "fluent".to_string(),
            dark_mode: false,
            density: "comfortable".to_string(),
            sort_rules: sort::default_rules(),
            browse_max_depth: constants::DEFAULT_BROWSE_MAX_DEPTH,
            browse_max_items: constants::DEFAULT_BROWSE_MAX_ITEMS,
            log_level: None,
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Browse limits with the default include/exclude patterns.
    pub fn browse_config(&self) -> BrowseConfig {
        BrowseConfig {
            max_depth: self.browse_max_depth,
            max_items: self.browse_max_items,
            ..BrowseConfig::default()
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
/// If the file is unparseable, returns defaults with a warning so the
/// application still starts but the user is informed.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            let err = ConfigError::Io {
                path: config_path.clone(),
                source: e,
            };
            let msg = format!("{err}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let err = ConfigError::TomlParse {
                path: config_path.clone(),
                source: e,
            };
            let msg = format!("{err}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let config = validate(raw, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

/// Validate each field against named constants, accumulating all warnings.
fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- Library --
    if let Some(path) = raw.library.path {
        if !path.trim().is_empty() {
            config.library_path = Some(PathBuf::from(path));
        }
    }
    if let Some(show) = raw.library.show_adult {
        config.show_adult = show;
    }

    // -- UI: theme --
    if let Some(theme) = raw.ui.theme {
        match theme.to_lowercase().as_str() {
            t @ ("fluent" | "pink") => config.theme = t.to_string(),
            other => warnings.push(format!(
                "[ui] theme = \"{other}\" is not recognised. Expected \"fluent\" or \"pink\". Using default (fluent).",
            )),
        }
    }

    if let Some(dark) = raw.ui.dark_mode {
        config.dark_mode = dark;
    }

    // -- UI: density --
    if let Some(density) = raw.ui.density {
        match density.to_lowercase().as_str() {
            d @ ("comfortable" | "compact") => config.density = d.to_string(),
            other => warnings.push(format!(
                "[ui] density = \"{other}\" is not recognised. Expected \"comfortable\" or \"compact\". Using default (comfortable).",
            )),
        }
    }

    // -- UI: sort --
    if let Some(spec) = raw.ui.sort {
        match sort::parse_sort_rules(&spec) {
            Ok(rules) => config.sort_rules = rules,
            Err(e) => warnings.push(format!(
                "[ui] sort: {e}. Using default ({}).",
                constants::DEFAULT_SORT
            )),
        }
    }

    // -- Browse: max_depth --
    if let Some(depth) = raw.browse.max_depth {
        if (1..=constants::ABSOLUTE_MAX_BROWSE_DEPTH).contains(&depth) {
            config.browse_max_depth = depth;
        } else {
            let err = ConfigError::ValueOutOfRange {
                field: "browse.max_depth".to_string(),
                value: depth.to_string(),
                expected: format!("1-{}", constants::ABSOLUTE_MAX_BROWSE_DEPTH),
            };
            warnings.push(format!(
                "{err}. Using default ({}).",
                constants::DEFAULT_BROWSE_MAX_DEPTH
            ));
        }
    }

    // -- Browse: max_items --
    if let Some(items) = raw.browse.max_items {
        if (constants::MIN_BROWSE_MAX_ITEMS..=constants::ABSOLUTE_MAX_BROWSE_ITEMS).contains(&items)
        {
            config.browse_max_items = items;
        } else {
            let err = ConfigError::ValueOutOfRange {
                field: "browse.max_items".to_string(),
                value: items.to_string(),
                expected: format!(
                    "{}-{}",
                    constants::MIN_BROWSE_MAX_ITEMS,
                    constants::ABSOLUTE_MAX_BROWSE_ITEMS
                ),
            };
            warnings.push(format!(
                "{err}. Using default ({}).",
                constants::DEFAULT_BROWSE_MAX_ITEMS
            ));
        }
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level);
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default ({}).",
                constants::DEFAULT_LOG_LEVEL
            ));
        }
    }

    // -- Logging: file --
    if let Some(file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file);
        }
    }

    config
}
