use crate::assets::GlyphAssets;
use crate::config::{self, Config};
use crate::events::{AppEvent, MenuEvent};
use crate::menu::{CircleMenu, HostFrame, MenuError, Outcome};
use crate::sys::command::Command;
use async_channel::Receiver;
use std::path::Path;

/// Owns the menu on the control thread and feeds it the daemon's events.
pub struct App {
    menu: CircleMenu,
    events: Receiver<MenuEvent>,
}

impl App {
    pub fn new(config: &Config, host: HostFrame) -> Result<Self, MenuError> {
        let (tx, events) = async_channel::unbounded();
        let mut menu = CircleMenu::new(config.menu).with_events(tx);
        menu.attach(host)?;
        menu.set_items(config.menu_items())?;
        if let Some(dir) = config.assets_dir() {
            menu.set_glyphs(GlyphAssets::load(&dir));
        }
        Ok(Self { menu, events })
    }

    pub fn menu(&self) -> &CircleMenu {
        &self.menu
    }

    /// Handles one event and returns the menu events it produced.
    pub fn update(&mut self, event: AppEvent) -> Vec<MenuEvent> {
        match event {
            AppEvent::Command(Command::Reload) | AppEvent::ConfigReload => {
                self.apply_config(&config::load_or_default());
            }
            AppEvent::Command(command) => {
                // failures were already logged by the menu
                if let Ok(outcome) = self.dispatch(command) {
                    log::debug!("{} -> {:?}", command, outcome);
                }
            }
            AppEvent::Frame(elapsed) => {
                if !self.menu.is_idle() {
                    self.menu.advance(elapsed);
                }
            }
        }
        self.drain()
    }

    /// Reloads from `path`, falling back to the shipped configuration like startup does.
    pub fn reload_from(&mut self, path: &Path) {
        self.apply_config(&config::load_or_default_from(path));
    }

    pub fn apply_config(&mut self, config: &Config) {
        let diff = self.menu.update_config(config.menu);
        if self.menu.set_items(config.menu_items()).is_err() {
            log::warn!("Keeping the previous menu items");
        }
        if let Some(dir) = config.assets_dir() {
            self.menu.set_glyphs(GlyphAssets::load(&dir));
        }
        log::info!("Configuration reloaded ({} appearance changes)", diff.appearance.len());
    }

    fn dispatch(&mut self, command: Command) -> Result<Outcome, MenuError> {
        match command {
            Command::Main => self.menu.on_main_button_tap(),
            Command::Open => self.menu.open_menu(),
            Command::Close => self.menu.close_menu(),
            Command::Swipe(direction) => self.menu.on_swipe(direction),
            Command::Tap(slot) => self.menu.on_item_tap(slot),
            Command::Sub(index) => self.menu.on_submenu_tap(index),
            Command::Backdrop => self.menu.on_backdrop_tap(),
            Command::Reload => Ok(Outcome::Completed),
        }
    }

    fn drain(&self) -> Vec<MenuEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            match event {
                MenuEvent::ItemSelected(id) => log::info!("Item {} selected", id),
                other => log::debug!("{:?}", other),
            }
            out.push(event);
        }
        out
    }
}
