use crate::menu::{ItemId, RotateDirection, SlotId};
use crate::sys::command::Command;
use std::time::Duration;

/// Everything the background services hand to the control thread.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Command(Command),
    /// Wall time elapsed since the previous frame.
    Frame(Duration),
    ConfigReload,
}

/// Observable output of a [`crate::menu::CircleMenu`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    ItemSelected(ItemId),
    MenuOpened,
    MenuClosed,
    Rotated(RotateDirection),
    SubmenuOpened(SlotId),
    SubmenuClosed(SlotId),
}
