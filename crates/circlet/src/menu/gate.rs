use crate::menu::state::MenuState;
use crate::menu::LAST_VISIBLE_INDEX;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum::{Display as StrumDisplay, EnumCount, EnumIter, EnumString, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter, EnumCount)]
#[strum(serialize_all = "snake_case")]
pub enum InputSource {
    MainButton,
    Swipe,
    RingButtons,
    Backdrop,
}

impl InputSource {
    pub fn as_index(&self) -> usize {
        *self as usize
    }
}

/// What a backdrop tap does under the configured [`ClosingPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackdropAction {
    CloseSubmenu,
    CloseMenu,
    Nothing,
}

/// Which layers a tap on the backdrop closes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    SerializeDisplay,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum ClosingPolicy {
    #[default]
    #[strum(to_string = "none")]
    None,
    #[strum(to_string = "submenuOnly", serialize = "submenu_only")]
    SubmenuOnly,
    #[strum(to_string = "menuOnly", serialize = "menu_only")]
    MenuOnly,
    /// One layer per tap, the submenu first.
    #[strum(to_string = "all")]
    All,
    /// A single tap closes the submenu and the menu together.
    #[strum(to_string = "allAtTheSameTime", serialize = "all_at_the_same_time")]
    AllAtTheSameTime,
}

impl ClosingPolicy {
    pub fn resolve(&self, submenu_open: bool) -> BackdropAction {
        match (self, submenu_open) {
            (Self::SubmenuOnly | Self::All, true) => BackdropAction::CloseSubmenu,
            (Self::AllAtTheSameTime, true) => BackdropAction::CloseMenu,
            (Self::MenuOnly | Self::All | Self::AllAtTheSameTime, false) => BackdropAction::CloseMenu,
            _ => BackdropAction::Nothing,
        }
    }
}

/// Per-source input switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionGate {
    enabled: [bool; InputSource::COUNT],
}

impl Default for InteractionGate {
    fn default() -> Self {
        let mut gate = Self {
            enabled: [false; InputSource::COUNT],
        };
        gate.resume(MenuState::Closed, ClosingPolicy::default());
        gate
    }
}

impl InteractionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_enabled(&mut self, source: InputSource, enabled: bool) {
        self.enabled[source.as_index()] = enabled;
    }

    pub fn is_enabled(&self, source: InputSource) -> bool {
        self.enabled[source.as_index()]
    }

    /// Shuts every source while a composite sequence runs.
    pub fn suspend(&mut self) {
        log::trace!("Input suspended");
        self.enabled = [false; InputSource::COUNT];
    }

    /// Re-opens the sources that make sense in the settled `state`.
    pub fn resume(&mut self, state: MenuState, policy: ClosingPolicy) {
        let open = matches!(state, MenuState::Open | MenuState::SubmenuOpen(_));
        for source in InputSource::iter() {
            let enabled = match source {
                InputSource::MainButton => !state.is_transitioning(),
                InputSource::Swipe => state == MenuState::Open,
                InputSource::RingButtons => open,
                InputSource::Backdrop => open && policy != ClosingPolicy::None,
            };
            self.set_enabled(source, enabled);
        }
        log::trace!("Input resumed for {:?}: {:?}", state, self.enabled);
    }

    /// Ring indices whose buttons may take taps. The wrap point and the two edge indices
    /// flanking it only ever hold slots in transit.
    pub fn is_tappable_position(position: usize) -> bool {
        (1..LAST_VISIBLE_INDEX).contains(&position)
    }
}
