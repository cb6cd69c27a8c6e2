//! Persistent application configuration model and defaults.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::languages::{SourceLanguage, TargetLanguage};

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "PAPERTRANS_CONFIG";
pub const DEFAULT_BAIDU_ENDPOINT: &str = "https://fanyi-api.baidu.com/api/trans/vip/translate";

/// Root configuration persisted to `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Config {
    #[serde(default)]
    /// Language selection and request shaping.
    pub translation: TranslationConfig,
    #[serde(default)]
    /// Baidu Translate credentials and endpoint.
    pub baidu: BaiduConfig,
    #[serde(default)]
    /// PDF export layout.
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Translation preferences persisted between sessions.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct TranslationConfig {
    #[serde(default)]
    pub source_language: SourceLanguage,
    #[serde(default)]
    pub target_language: TargetLanguage,
    /// Upper bound on characters sent per translation request.
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

/// Baidu Translate account settings.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct BaiduConfig {
    #[serde(default)]
    pub app_id: String,
    /// Left empty when the secret lives in the system keyring.
    #[serde(default)]
    pub secret_key: String,
    /// Read the secret from the system keyring. A `secret_key` set here is
    /// saved into the keyring on first use.
    #[serde(default)]
    pub use_keyring: bool,
    #[serde(default = "default_baidu_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// PDF export preferences.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ExportConfig {
    /// TrueType font used for exported text. Required for CJK output.
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    #[serde(default = "default_font_size_pt")]
    pub font_size_pt: f32,
    #[serde(default = "default_export_title")]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_max_chunk_chars() -> usize {
    1800
}

fn default_requests_per_second() -> u32 {
    1
}

fn default_baidu_endpoint() -> String {
    DEFAULT_BAIDU_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_font_size_pt() -> f32 {
    12.0
}

fn default_export_title() -> String {
    "Academic Paper Translation".to_string()
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_language: SourceLanguage::default(),
            target_language: TargetLanguage::default(),
            max_chunk_chars: default_max_chunk_chars(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

impl Default for BaiduConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            secret_key: String::new(),
            use_keyring: false,
            endpoint: default_baidu_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            font_size_pt: default_font_size_pt(),
            title: default_export_title(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// Parsed level filter; unknown names fall back to `Debug`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level
            .trim()
            .parse::<log::LevelFilter>()
            .unwrap_or(log::LevelFilter::Debug)
    }
}

impl BaiduConfig {
    /// Whether enough is configured to register the Baidu service.
    pub fn is_configured(&self) -> bool {
        !self.app_id.trim().is_empty() && (self.use_keyring || !self.secret_key.trim().is_empty())
    }
}

/// Clamps numeric settings into supported ranges.
pub fn sanitize_config(config: Config) -> Config {
    let endpoint = if config.baidu.endpoint.trim().is_empty() {
        default_baidu_endpoint()
    } else {
        config.baidu.endpoint.trim().to_string()
    };
    let font_size_pt = if config.export.font_size_pt.is_finite() {
        config.export.font_size_pt.clamp(6.0, 48.0)
    } else {
        default_font_size_pt()
    };

    Config {
        translation: TranslationConfig {
            max_chunk_chars: config.translation.max_chunk_chars.clamp(200, 6000),
            requests_per_second: config.translation.requests_per_second.clamp(1, 100),
            ..config.translation
        },
        baidu: BaiduConfig {
            endpoint,
            timeout_secs: config.baidu.timeout_secs.clamp(1, 120),
            ..config.baidu
        },
        export: ExportConfig {
            font_size_pt,
            ..config.export
        },
        logging: config.logging,
    }
}

/// Resolves the config file path from the environment or the user config dir.
pub fn default_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("papertrans")
        .join("config.toml")
}

/// Reads `path`, writing defaults first when it does not exist. Parse
/// errors fall back to defaults so a broken file never blocks startup.
pub fn load_or_create_config(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        info!(
            "Config file not found. Creating default config. path={}",
            path.display()
        );
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                format!("failed to create config dir {}: {err}", parent.display())
            })?;
        }
        let default_text = toml::to_string(&Config::default())
            .map_err(|err| format!("failed to serialize default config: {err}"))?;
        std::fs::write(path, default_text)
            .map_err(|err| format!("failed to write {}: {err}", path.display()))?;
    }

    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    let config = toml::from_str::<Config>(&content).unwrap_or_else(|err| {
        warn!(
            "Failed to parse {}; using defaults: {}",
            path.display(),
            err
        );
        Config::default()
    });
    Ok(sanitize_config(config))
}
