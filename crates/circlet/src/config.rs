use crate::events::AppEvent;
use crate::menu::{IconRef, ItemId, MenuConfig, MenuItem};
use async_channel::Sender;
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ItemConfig {
    pub id: ItemId,
    pub icon: IconRef,
    #[serde(default)]
    pub children: Vec<ItemConfig>,
}

impl ItemConfig {
    pub fn to_item(&self) -> MenuItem {
        MenuItem::new(self.id, self.icon.clone())
            .with_children(self.children.iter().map(ItemConfig::to_item).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub items: Vec<ItemConfig>,
    #[serde(default)]
    pub menu: MenuConfig,
    /// Directory holding the main button's Lottie glyphs.
    pub assets_dir: Option<PathBuf>,
}

impl Config {
    pub fn menu_items(&self) -> Vec<MenuItem> {
        self.items.iter().map(ItemConfig::to_item).collect()
    }

    pub fn assets_dir(&self) -> Option<PathBuf> {
        self.assets_dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join("glyphs")))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "circlet", "circlet")
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let dirs = project_dirs().ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&get_config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("CIRCLET"))
        .build()?;

    Ok(s.try_deserialize()?)
}

/// The configuration shipped with the binary.
pub fn default_config() -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
        .build()?;

    Ok(s.try_deserialize()?)
}

/// Loads the user's configuration, falling back to the shipped one when there is none or
/// it cannot be read.
pub fn load_or_default() -> Config {
    match get_config_path() {
        Ok(path) => load_or_default_from(&path),
        Err(e) => {
            log::error!("{}, using defaults", e);
            shipped()
        }
    }
}

pub fn load_or_default_from(path: &Path) -> Config {
    if !path.exists() {
        log::info!("No config at {}, using defaults", path.display());
        return shipped();
    }

    match load_config_from(path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load config, using defaults: {}", e);
            shipped()
        }
    }
}

fn shipped() -> Config {
    default_config().unwrap_or_else(|e| {
        log::error!("Shipped config is invalid: {}", e);
        Config::default()
    })
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
        log::info!("Wrote default config to {}", path.display());
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let Some(config_dir) = config_path.parent().map(PathBuf::from) else {
        return;
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
    log::debug!("Watching {}", config_path.display());

    while let Ok(res) = bridge_rx.recv().await {
        let event: notify::Event = match res {
            Ok(event) => event,
            Err(e) => {
                log::error!("Watch error: {}", e);
                continue;
            }
        };
        let touches_config = matches!(
            event.kind,
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
        ) && event.paths.iter().any(|p| p == &config_path);

        if touches_config && tx.send(AppEvent::ConfigReload).await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::gate::ClosingPolicy;
    use crate::menu::model::validate_items;
    use crate::menu::widget::HintPolicy;
    use crate::menu::Color;
    use std::time::Duration;

    #[test]
    fn test_shipped_config_is_valid() {
        let config = default_config().unwrap();
        let items = config.menu_items();
        assert_eq!(items.len(), 9);
        assert!(validate_items(&items).is_ok());
        assert_eq!(items[2].children.len(), 2);
        assert_eq!(config.menu.closing, ClosingPolicy::All);
        assert_eq!(config.menu.hint, HintPolicy::Once);
        assert_eq!(config.menu.appearance.focused_background, Color::rgb(60, 109, 240));
        assert_eq!(config.menu.timing.rotation, Duration::from_millis(100));
    }

    #[test]
    fn test_item_tree_conversion() {
        let config: Config = serde_json::from_str(
            r#"{
                "items": [
                    { "id": 1, "icon": "a" },
                    { "id": 2, "icon": "b", "children": [{ "id": 20, "icon": "c" }] },
                    { "id": 3, "icon": "d" }
                ]
            }"#,
        )
        .unwrap();

        let items = config.menu_items();
        assert_eq!(items[1].id, ItemId::new(2));
        assert_eq!(items[1].children[0].icon, IconRef::new("c"));
        assert!(!items[0].has_children());
        assert_eq!(config.menu, MenuConfig::default());
    }

    #[test]
    fn test_menu_enums_deserialization() {
        let cases = vec![
            ("\"none\"", ClosingPolicy::None),
            ("\"submenuOnly\"", ClosingPolicy::SubmenuOnly),
            ("\"SUBMENU_ONLY\"", ClosingPolicy::SubmenuOnly),
            ("\"menu_only\"", ClosingPolicy::MenuOnly),
            ("\"All\"", ClosingPolicy::All),
            ("\"allAtTheSameTime\"", ClosingPolicy::AllAtTheSameTime),
        ];
        for (json, expected) in cases {
            let deserialized: ClosingPolicy = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }

        let hint: HintPolicy = serde_json::from_str("\"NEVER\"").unwrap();
        assert_eq!(hint, HintPolicy::Never);
    }

    #[test]
    fn test_partial_wobble_table_in_toml() {
        let s = config::Config::builder()
            .add_source(config::File::from_str(
                "[menu.timing.open_wobble]\ndegrees = 4.5\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: Config = s.try_deserialize().unwrap();
        assert_eq!(config.menu.timing.open_wobble.degrees, 4.5);
        assert_eq!(config.menu.timing.open_wobble.swing, Duration::from_millis(200));
    }

    #[test]
    fn test_missing_file_falls_back_to_shipped() {
        let config = load_or_default_from(Path::new("/nonexistent/circlet/config.toml"));
        assert_eq!(config, default_config().unwrap());
    }

    #[test]
    fn test_explicit_assets_dir_wins() {
        let config = Config {
            assets_dir: Some(PathBuf::from("/opt/glyphs")),
            ..Config::default()
        };
        assert_eq!(config.assets_dir(), Some(PathBuf::from("/opt/glyphs")));
    }
}
