use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ai::provider::Provider;
use crate::credentials::{GITHUB_TOKEN, GITHUB_USERNAME};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RxConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub line_numbers: bool,
    #[serde(default = "default_tab_width")]
    pub tab_width: u8,
    #[serde(default)]
    pub theme: ThemeMode,
}

/// [layout] section: initial pane widths and drag bounds, in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_left")]
    pub left: f64,
    #[serde(default = "default_center")]
    pub center: f64,
    #[serde(default = "default_min_left")]
    pub min_left: f64,
    #[serde(default = "default_max_left")]
    pub max_left: f64,
    #[serde(default = "default_min_center")]
    pub min_center: f64,
    #[serde(default = "default_max_center")]
    pub max_center: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_provider")]
    pub provider: Provider,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_chat_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_tab_width() -> u8 {
    4
}

fn default_left() -> f64 {
    15.0
}

fn default_center() -> f64 {
    50.0
}

fn default_min_left() -> f64 {
    15.0
}

fn default_max_left() -> f64 {
    35.0
}

fn default_min_center() -> f64 {
    30.0
}

fn default_max_center() -> f64 {
    60.0
}

fn default_api_url() -> String {
    crate::github::DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_provider() -> Provider {
    Provider::OpenAi
}

fn default_model() -> String {
    "gpt-4-turbo".into()
}

fn default_chat_timeout_secs() -> u64 {
    120
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            line_numbers: true,
            tab_width: default_tab_width(),
            theme: ThemeMode::default(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            left: default_left(),
            center: default_center(),
            min_left: default_min_left(),
            max_left: default_max_left(),
            min_center: default_min_center(),
            max_center: default_max_center(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            timeout_secs: default_chat_timeout_secs(),
        }
    }
}

/// Load config by merging global defaults with a working-directory override.
/// Priority: `./.rx.toml` > global `~/.config/rx/config.toml` > built-in defaults.
/// Merging is deep: individual fields within sections override independently.
pub fn load_config(work_dir: &Path) -> RxConfig {
    let global_path = global_config_path();
    let local_path = work_dir.join(".rx.toml");
    load_config_from(global_path.as_deref(), &local_path)
}

/// `~/.config/rx/config.toml`
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("rx").join("config.toml"))
}

fn read_table(path: &Path) -> Option<toml::map::Map<String, toml::Value>> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<toml::Table>(&content) {
        Ok(t) => Some(t),
        Err(e) => {
            tracing::warn!(path = %path.display(), "ignoring malformed config: {e}");
            None
        }
    }
}

fn load_config_from(global: Option<&Path>, local: &Path) -> RxConfig {
    let global_table = global.and_then(read_table);
    let local_table = read_table(local);

    let merged = match (global_table, local_table) {
        (Some(mut global), Some(local)) => {
            deep_merge(&mut global, local);
            toml::Value::Table(global)
        }
        (Some(global), None) => toml::Value::Table(global),
        (None, Some(local)) => toml::Value::Table(local),
        (None, None) => return RxConfig::default(),
    };

    merged.try_into().unwrap_or_else(|e| {
        tracing::warn!("config has invalid values, using defaults: {e}");
        RxConfig::default()
    })
}

/// Recursively merge `overlay` into `base`. Overlay values win; nested tables are merged recursively.
fn deep_merge(
    base: &mut toml::map::Map<String, toml::Value>,
    overlay: toml::map::Map<String, toml::Value>,
) {
    for (key, value) in overlay {
        match (base.get_mut(&key), &value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table.clone());
            }
            _ => {
                base.insert(key, value);
            }
        }
    }
}

/// Save config, normally to [`global_config_path`].
pub fn save_config(path: &Path, config: &RxConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Settings item types for the settings overlay UI.
#[derive(Debug, Clone)]
pub enum SettingsItem {
    SectionHeader(String),
    BoolToggle {
        label: String,
        get: fn(&RxConfig) -> bool,
        set: fn(&mut RxConfig, bool),
    },
    /// A credential value edited as free text
    Credential {
        label: String,
        key: &'static str,
        secret: bool,
    },
    Action {
        label: String,
        action: SettingsAction,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    Save,
    ClearCredentials,
}

impl SettingsItem {
    pub fn is_selectable(&self) -> bool {
        !matches!(self, SettingsItem::SectionHeader(_))
    }
}

/// Build the list of settings items for the settings overlay.
pub fn settings_items() -> Vec<SettingsItem> {
    let mut items = vec![
        SettingsItem::SectionHeader("GitHub".into()),
        SettingsItem::Credential {
            label: "Username".into(),
            key: GITHUB_USERNAME,
            secret: false,
        },
        SettingsItem::Credential {
            label: "Personal access token".into(),
            key: GITHUB_TOKEN,
            secret: true,
        },
        SettingsItem::SectionHeader("AI provider API keys".into()),
    ];
    for provider in Provider::ALL {
        items.push(SettingsItem::Credential {
            label: provider.name().into(),
            key: provider.credential_key(),
            secret: true,
        });
    }
    items.extend([
        SettingsItem::SectionHeader("Display".into()),
        SettingsItem::BoolToggle {
            label: "Line numbers".into(),
            get: |c| c.display.line_numbers,
            set: |c, v| c.display.line_numbers = v,
        },
        SettingsItem::BoolToggle {
            label: "Light theme".into(),
            get: |c| c.display.theme == ThemeMode::Light,
            set: |c, v| {
                c.display.theme = if v { ThemeMode::Light } else { ThemeMode::Dark }
            },
        },
        SettingsItem::SectionHeader("".into()),
        SettingsItem::Action {
            label: "Save settings".into(),
            action: SettingsAction::Save,
        },
        SettingsItem::Action {
            label: "Clear settings".into(),
            action: SettingsAction::ClearCredentials,
        },
    ]);
    items
}

/// Mask a secret for display, keeping the last four characters
pub fn mask_secret(value: &str) -> String {
    let count = value.chars().count();
    if count == 0 {
        return String::new();
    }
    if count <= 4 {
        return "•".repeat(count);
    }
    let tail: String = value.chars().skip(count - 4).collect();
    format!("{}{}", "•".repeat(count.min(12) - 4), tail)
}
