use crate::events::AppEvent;
use async_channel::Sender;
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, DeserializeFromStr, serde_as};
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

/// Sentinel `custom` path that writes and opens the default config.
pub const SETUP_COMMAND: &str = "corona-setup";

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Launch,
    Url,
    Folder,
    Command,
    Clipboard,
    Custom,
    #[default]
    #[strum(to_string = "none", serialize = "")]
    None,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct NodeConfig {
    pub id: Option<String>,
    #[serde(default)]
    pub label: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub action: ActionKind,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub children: Vec<NodeConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Appearance {
    pub ui_scale: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub center_text: String,
    pub particles_enabled: bool,
    pub node_size: f64,
    pub dwell_ms: u64,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            ui_scale: 1.0,
            inner_radius: 40.0,
            outer_radius: 220.0,
            center_text: String::new(),
            particles_enabled: true,
            node_size: 64.0,
            dwell_ms: 500,
        }
    }
}

impl Appearance {
    /// Replaces unusable values with defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.ui_scale.is_finite() && self.ui_scale > 0.0) {
            log::warn!("Invalid ui_scale {}, using {}", self.ui_scale, defaults.ui_scale);
            self.ui_scale = defaults.ui_scale;
        }
        if !(self.inner_radius.is_finite() && self.inner_radius >= 0.0) {
            self.inner_radius = defaults.inner_radius;
        }
        if !(self.outer_radius.is_finite() && self.outer_radius > 0.0) {
            self.outer_radius = defaults.outer_radius;
        }
        if !(self.node_size.is_finite() && self.node_size > 0.0) {
            self.node_size = defaults.node_size;
        }
        self
    }

    pub fn dwell_duration(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    pub fn dead_zone_radius(&self) -> f64 {
        self.inner_radius * self.ui_scale
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub appearance: Appearance,
    #[serde(default)]
    pub items: Vec<NodeConfig>,
}

impl Config {
    /// First-run tree: a single node that writes the default config.
    pub fn setup() -> Self {
        Self {
            appearance: Appearance {
                center_text: "corona".to_string(),
                ..Appearance::default()
            },
            items: vec![NodeConfig {
                id: Some("setup".to_string()),
                label: "Setup".to_string(),
                icon: Some("preferences-system".to_string()),
                action: ActionKind::Custom,
                path: SETUP_COMMAND.to_string(),
                ..NodeConfig::default()
            }],
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "corona", "corona").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("CORONA")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config: Config = s.try_deserialize()?;
    config.appearance = config.appearance.sanitized();
    Ok(config)
}

pub fn load_or_setup(path: &Path) -> Config {
    if !path.exists() {
        log::info!("No config at {}, starting with the setup menu", path.display());
        return Config::setup();
    }

    match load_config(path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load {}: {}", path.display(), e);
            Config::setup()
        }
    }
}

pub fn write_default_config(path: &Path) -> std::io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(path, DEFAULT_CONFIG)?;
    }
    Ok(path.to_path_buf())
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

pub async fn run_async_watcher(config_path: PathBuf, tx: Sender<AppEvent>) {
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let touches_config = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                ) && event
                    .paths
                    .iter()
                    .any(|p| p.file_name() == config_path.file_name());

                if touches_config && tx.send(AppEvent::ConfigReload).await.is_err() {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}
