use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub colors: ColorsConfig,
    pub ui: UiConfig,
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    /// Models that reject the `temperature` field.
    pub temperature_excluded_models: Vec<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ColorsConfig {
    pub background: String,
    pub text: String,
    pub text_selection: String,
    pub button: String,
    pub button_hover: String,
    pub button_active: String,
    pub button_text: String,
    pub code: String,
    pub heading: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub font_family: String,
    pub font_size: u16,
    pub border_radius: f32,
    pub padding: u16,
    /// Render markdown markers as styles instead of plain text.
    pub markdown: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "gpt-3.5-turbo".to_string(),
            temperature_excluded_models: vec!["o1".to_string(), "claude-3".to_string()],
            timeout_secs: 30,
        }
    }
}

impl Default for ColorsConfig {
    fn default() -> Self {
        ColorsConfig {
            background: "#1e1e1e".to_string(),
            text: "#ffffff".to_string(),
            text_selection: "#3584e4".to_string(),
            button: "#2d2d2d".to_string(),
            button_hover: "#3d3d3d".to_string(),
            button_active: "#4d4d4d".to_string(),
            button_text: "#ffffff".to_string(),
            code: "#9cdcfe".to_string(),
            heading: "#e5c07b".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            font_family: "Ubuntu Mono".to_string(),
            font_size: 16,
            border_radius: 6.0,
            padding: 8,
            markdown: true,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            width: 600,
            height: 60,
            min_width: 300,
            min_height: 40,
            max_width: 1600,
            max_height: 900,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(&Self::get_config_path())
    }

    /// Loads the config at `path`, writing the defaults there on first run.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match Self::read(path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("{:#}. Using defaults.", e),
            }
            return Config::default();
        }

        let config = Config::default();
        match config.save_to(path) {
            Ok(()) => tracing::info!("wrote default config to {}", path.display()),
            Err(e) => tracing::warn!("could not write default config: {:#}", e),
        }
        config
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Error reading {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Error parsing {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    pub fn get_config_path() -> PathBuf {
        if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home).join(".config/linchat/config.toml")
        } else {
            PathBuf::from("config.toml")
        }
    }
}

/// Parses `#rrggbb` or `#rrggbbaa` into normalized RGBA components.
pub fn parse_hex_color(hex: &str) -> Option<[f32; 4]> {
    let digits = hex.trim().strip_prefix('#')?;
    if !(digits.len() == 6 || digits.len() == 8)
        || !digits.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return None;
    }

    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .ok()
            .map(|v| v as f32 / 255.0)
    };

    let alpha = if digits.len() == 8 { channel(6)? } else { 1.0 };
    Some([channel(0)?, channel(2)?, channel(4)?, alpha])
}
