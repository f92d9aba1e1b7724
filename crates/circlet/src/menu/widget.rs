use crate::assets::GlyphAssets;
use crate::events::MenuEvent;
use crate::menu::choreography::{Choreographer, Choreography, Effect, SubmenuSpec, Timing, Track};
use crate::menu::gate::{BackdropAction, ClosingPolicy, InputSource, InteractionGate};
use crate::menu::geometry::{
    submenu_indicator_position, submenu_positions, HostFrame, Layout, Placement, RingGeometry,
};
use crate::menu::model::{validate_items, IconRef, ItemId, MenuError, MenuItem};
use crate::menu::slot::{Slot, SlotId, SlotRing, SwipeDirection};
use crate::menu::state::{MenuState, Plan, PlanContext, Rejection, Request};
use crate::menu::theme::{Appearance, AppearanceChange, SlotStyle};
use crate::menu::{MAIN_BUTTON_ID, MAX_CHILDREN, SLOT_COUNT, WRAP_INDEX};
use async_channel::Sender;
use circlet_motion::{Channel, Event, Point, Sequence, SequenceId, Sequencer, Stage};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt::Debug;
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumString};

/// When the hint flourish plays after the menu opens.
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
    StrumDisplay,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum HintPolicy {
    Never,
    /// Only the first time per widget.
    #[default]
    Once,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub appearance: Appearance,
    pub layout: Layout,
    pub timing: Timing,
    /// What a tap on the backdrop closes.
    pub closing: ClosingPolicy,
    pub hint: HintPolicy,
}

/// What changed between two [`MenuConfig`]s.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigDiff {
    pub appearance: Vec<AppearanceChange>,
    pub geometry: bool,
    pub timing: bool,
    pub closing: bool,
    pub hint: bool,
}

impl ConfigDiff {
    pub fn is_empty(&self) -> bool {
        self.appearance.is_empty() && !self.geometry && !self.timing && !self.closing && !self.hint
    }
}

impl MenuConfig {
    pub fn diff(&self, next: &MenuConfig) -> ConfigDiff {
        ConfigDiff {
            appearance: self.appearance.diff(&next.appearance),
            geometry: self.layout != next.layout,
            timing: self.timing != next.timing,
            closing: self.closing != next.closing,
            hint: self.hint != next.hint,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A transition is running; the menu settles once the sequence finishes.
    Started(SequenceId),
    /// Handled on the spot.
    Completed,
    Ignored(Rejection),
}

/// Order of the menu view relative to the backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stacking {
    #[default]
    MenuAboveBackdrop,
    MenuBelowBackdrop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmenuButton {
    pub index: usize,
    pub id: ItemId,
    pub icon: IconRef,
    enabled: bool,
    style: SlotStyle,
}

impl SubmenuButton {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn style(&self) -> SlotStyle {
        self.style
    }
}

/// The open submenu and the buttons it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct Submenu {
    pub owner: SlotId,
    pub ring_index: usize,
    pub buttons: Vec<SubmenuButton>,
}

fn fail<T>(error: MenuError) -> Result<T, MenuError> {
    log::error!("{}", error);
    Err(error)
}

/// A radial menu: a main toggle button, a ring of six reusable slots and at most one
/// submenu column.
///
/// The widget is driven from a single control thread. Inputs start composite sequences;
/// [`CircleMenu::advance`] runs them and commits the settled state once they finish.
pub struct CircleMenu {
    config: MenuConfig,
    geometry: RingGeometry,
    host: Option<HostFrame>,
    placement: Option<Placement>,
    items: Vec<MenuItem>,
    pending_items: Option<Vec<MenuItem>>,
    slots: SlotRing,
    state: MenuState,
    gate: InteractionGate,
    submenu: Option<Submenu>,
    sequencer: Sequencer<Track, Effect>,
    stage: Stage<Track>,
    in_flight: Option<(SequenceId, Plan)>,
    backdrop_visible: bool,
    stacking: Stacking,
    hint: Option<SlotId>,
    hint_shown: bool,
    main_open: bool,
    glyphs: GlyphAssets,
    events: Option<Sender<MenuEvent>>,
}

impl CircleMenu {
    pub fn new(config: MenuConfig) -> Self {
        let mut menu = Self {
            geometry: RingGeometry::new(&config.layout),
            config,
            host: None,
            placement: None,
            items: Vec::new(),
            pending_items: None,
            slots: SlotRing::new(),
            state: MenuState::Closed,
            gate: InteractionGate::new(),
            submenu: None,
            sequencer: Sequencer::new(),
            stage: Stage::new(),
            in_flight: None,
            backdrop_visible: false,
            stacking: Stacking::default(),
            hint: None,
            hint_shown: false,
            main_open: false,
            glyphs: GlyphAssets::default(),
            events: None,
        };
        menu.gate.resume(MenuState::Closed, menu.config.closing);
        menu.restyle();
        menu.snap_to_rest();
        menu
    }

    pub fn with_events(mut self, events: Sender<MenuEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn attach(&mut self, host: HostFrame) -> Result<(), MenuError> {
        if self.host.is_some() {
            return fail(MenuError::AlreadyAttached);
        }
        self.host = Some(host);
        self.placement = Some(Placement::new(&self.config.layout, &host));
        self.snap_to_rest();
        log::info!("Circle menu attached to {:?}", host.safe_area);
        Ok(())
    }

    /// Replaces the ring items. While the menu is not closed the new list waits and takes
    /// over once the menu has closed.
    pub fn set_items(&mut self, items: Vec<MenuItem>) -> Result<(), MenuError> {
        if let Err(e) = validate_items(&items) {
            return fail(e);
        }
        if self.state == MenuState::Closed {
            log::debug!("Menu items replaced ({} items)", items.len());
            self.items = items;
            self.restyle();
        } else {
            log::debug!("Menu is {:?}, new items wait for it to close", self.state);
            self.pending_items = Some(items);
        }
        Ok(())
    }

    pub fn set_glyphs(&mut self, glyphs: GlyphAssets) {
        self.glyphs = glyphs;
    }

    pub fn open_menu(&mut self) -> Result<Outcome, MenuError> {
        self.ensure_attached("opening the menu")?;
        if self.items.is_empty() {
            return fail(MenuError::NoItems);
        }
        Ok(self.request(Request::Open))
    }

    pub fn close_menu(&mut self) -> Result<Outcome, MenuError> {
        self.ensure_attached("closing the menu")?;
        Ok(self.request(Request::Close))
    }

    pub fn on_main_button_tap(&mut self) -> Result<Outcome, MenuError> {
        self.ensure_attached("main button taps")?;
        if !self.gate.is_enabled(InputSource::MainButton) {
            return Ok(self.ignore(Rejection::InputDisabled, "main button tap"));
        }
        self.emit(MenuEvent::ItemSelected(MAIN_BUTTON_ID));
        if self.main_open {
            self.close_menu()
        } else {
            self.open_menu()
        }
    }

    pub fn on_swipe(&mut self, direction: SwipeDirection) -> Result<Outcome, MenuError> {
        self.ensure_attached("swipes")?;
        if !self.gate.is_enabled(InputSource::Swipe) {
            return Ok(self.ignore(Rejection::InputDisabled, direction));
        }
        Ok(self.request(Request::Rotate(direction.normalize())))
    }

    /// Reports the item bound to `slot` and toggles its submenu when it has one.
    pub fn on_item_tap(&mut self, slot: SlotId) -> Result<Outcome, MenuError> {
        self.ensure_attached("item taps")?;
        let Some(tapped) = self.slots.get(slot) else {
            return fail(MenuError::UnknownSlot(slot));
        };
        if !self.gate.is_enabled(InputSource::RingButtons) || !tapped.is_enabled() {
            return Ok(self.ignore(Rejection::InputDisabled, slot));
        }
        let Some(item) = self.item_for(slot) else {
            return Ok(self.ignore(Rejection::NoItem, slot));
        };

        let (id, has_children) = (item.id, item.has_children());
        self.emit(MenuEvent::ItemSelected(id));
        if !has_children {
            return Ok(Outcome::Completed);
        }
        Ok(self.request(Request::ToggleSubmenu(slot)))
    }

    pub fn on_submenu_tap(&mut self, index: usize) -> Result<Outcome, MenuError> {
        self.ensure_attached("submenu taps")?;
        if !self.gate.is_enabled(InputSource::RingButtons) {
            return Ok(self.ignore(Rejection::InputDisabled, index));
        }
        let Some(submenu) = self.submenu.as_ref() else {
            return Ok(self.ignore(Rejection::NoSubmenu, index));
        };
        let Some(button) = submenu.buttons.get(index) else {
            return Ok(self.ignore(Rejection::NoSubmenuButton, index));
        };
        if !button.enabled {
            return Ok(self.ignore(Rejection::InputDisabled, index));
        }

        self.emit(MenuEvent::ItemSelected(button.id));
        Ok(Outcome::Completed)
    }

    pub fn on_backdrop_tap(&mut self) -> Result<Outcome, MenuError> {
        self.ensure_attached("backdrop taps")?;
        if !self.gate.is_enabled(InputSource::Backdrop) {
            return Ok(self.ignore(Rejection::InputDisabled, "backdrop tap"));
        }
        match self.config.closing.resolve(self.submenu.is_some()) {
            BackdropAction::CloseSubmenu => Ok(self.request(Request::CloseSubmenu)),
            BackdropAction::CloseMenu => Ok(self.request(Request::Close)),
            BackdropAction::Nothing => Ok(self.ignore(Rejection::PolicyIgnores, "backdrop tap")),
        }
    }

    /// Runs the animation clock forward. Returns whether a sequence is still running.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        for event in self.sequencer.advance(elapsed, &mut self.stage) {
            match event {
                Event::Effect { effect, .. } => self.apply_effect(effect),
                Event::Finished(id) => {
                    if let Some((_, plan)) = self.in_flight.take_if(|(running, _)| *running == id) {
                        self.finish(plan);
                    }
                }
            }
        }
        !self.sequencer.is_idle()
    }

    pub fn update_config(&mut self, config: MenuConfig) -> ConfigDiff {
        let diff = self.config.diff(&config);
        if diff.is_empty() {
            return diff;
        }
        self.config = config;

        if diff.geometry {
            self.geometry = RingGeometry::new(&self.config.layout);
            if let Some(host) = self.host {
                self.placement = Some(Placement::new(&self.config.layout, &host));
            }
            if !self.state.is_transitioning() {
                self.snap_to_rest();
            }
        }
        if !diff.appearance.is_empty() {
            self.restyle();
        }
        if diff.closing && !self.state.is_transitioning() {
            if self.submenu.is_some() {
                self.stacking = self.submenu_stacking();
            }
            self.gate.resume(self.state, self.config.closing);
            self.refresh_enabled();
        }
        log::info!("Menu configuration updated: {:?}", diff);
        diff
    }

    fn ensure_attached(&self, operation: &'static str) -> Result<(), MenuError> {
        match self.host {
            Some(_) => Ok(()),
            None => fail(MenuError::NotAttached(operation)),
        }
    }

    fn ignore(&self, rejection: Rejection, input: impl Debug) -> Outcome {
        log::debug!("Ignoring {:?} while {:?}: {}", input, self.state, rejection);
        Outcome::Ignored(rejection)
    }

    fn emit(&self, event: MenuEvent) {
        log::debug!("Menu event: {:?}", event);
        if let Some(events) = &self.events
            && let Err(e) = events.try_send(event)
        {
            log::warn!("Dropped menu event: {}", e);
        }
    }

    fn request(&mut self, request: Request) -> Outcome {
        let has_children = match request {
            Request::ToggleSubmenu(slot) => self.item_for(slot).is_some_and(MenuItem::has_children),
            _ => false,
        };
        let context = PlanContext {
            item_count: self.items.len(),
            has_children,
        };
        match self.state.plan(request, context) {
            Ok(plan) => Outcome::Started(self.begin(plan)),
            Err(rejection) => self.ignore(rejection, request),
        }
    }

    fn choreographer(&self) -> Choreographer<'_> {
        Choreographer::new(&self.config.layout, &self.geometry, &self.config.timing)
    }

    fn begin(&mut self, plan: Plan) -> SequenceId {
        self.gate.suspend();
        self.state = plan.in_flight();

        let sequence = match plan {
            Plan::Open => {
                self.slots.bind_for_open(self.items.len());
                self.main_open = true;
                self.backdrop_visible = true;
                let hint = self.hint_target();
                self.choreographer().open(hint)
            }
            Plan::Close { submenu } => {
                self.main_open = false;
                self.backdrop_visible = false;
                let spec = submenu.and_then(|owner| self.submenu_spec(owner));
                self.choreographer().close(&self.slots.positions(), spec)
            }
            Plan::Rotate(direction) => {
                if self.slots.rotate(direction, self.items.len()).is_none() {
                    log::warn!("Ring has no bound edge item to rotate {}", direction);
                }
                self.choreographer().rotate(direction, &self.slots.positions())
            }
            Plan::OpenSubmenu(owner) => {
                self.attach_submenu(owner);
                self.submenu_sequence(owner, |c, spec| c.submenu_open(spec))
            }
            Plan::CloseSubmenu(owner) => {
                self.submenu_sequence(owner, |c, spec| c.submenu_close(spec))
            }
            Plan::SwitchSubmenu { from, to } => {
                match (self.submenu_spec(from), self.submenu_spec(to)) {
                    (Some(from), Some(to)) => self.choreographer().switch_submenu(&from, &to),
                    _ => Sequence::empty(),
                }
            }
        };

        self.restyle();
        self.refresh_enabled();
        let id = self.sequencer.start(sequence);
        log::debug!("{:?} started as {}", plan, id);
        self.in_flight = Some((id, plan));
        id
    }

    fn submenu_sequence(
        &self,
        owner: SlotId,
        build: impl FnOnce(&Choreographer<'_>, &SubmenuSpec) -> Choreography,
    ) -> Choreography {
        match self.submenu_spec(owner) {
            Some(spec) => build(&self.choreographer(), &spec),
            None => Sequence::empty(),
        }
    }

    fn finish(&mut self, plan: Plan) {
        self.state = plan.settled();
        match plan {
            Plan::Open => self.emit(MenuEvent::MenuOpened),
            Plan::Close { .. } => {
                self.slots.reset_home();
                self.submenu = None;
                self.stacking = Stacking::MenuAboveBackdrop;
                if let Some(items) = self.pending_items.take() {
                    log::info!("Applying {} queued menu items", items.len());
                    self.items = items;
                }
                self.emit(MenuEvent::MenuClosed);
            }
            Plan::Rotate(direction) => {
                self.slots.park_lookahead(self.items.len());
                self.emit(MenuEvent::Rotated(direction));
            }
            Plan::OpenSubmenu(owner) | Plan::SwitchSubmenu { to: owner, .. } => {
                self.emit(MenuEvent::SubmenuOpened(owner))
            }
            Plan::CloseSubmenu(_) => {}
        }

        self.restyle();
        self.gate.resume(self.state, self.config.closing);
        self.refresh_enabled();
        self.snap_to_rest();
        log::debug!("Menu settled in {:?}", self.state);
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::SubmenuDetached(owner) => self.detach_submenu(owner),
            Effect::SubmenuAttached(owner) => self.attach_submenu(owner),
            Effect::HintBegan(slot) => self.hint = Some(slot),
            Effect::HintEnded => {
                self.hint = None;
                self.hint_shown = true;
            }
        }
    }

    fn submenu_spec(&self, owner: SlotId) -> Option<SubmenuSpec> {
        let slot = self.slots.get(owner)?;
        let item = self.item_for(owner)?;
        Some(SubmenuSpec {
            owner,
            ring_index: slot.position(),
            count: item.children.len(),
        })
    }

    fn attach_submenu(&mut self, owner: SlotId) {
        let Some(spec) = self.submenu_spec(owner) else {
            log::warn!("Slot {} has no submenu to attach", owner);
            return;
        };
        let buttons = match self.item_for(owner) {
            Some(item) => item
                .children
                .iter()
                .enumerate()
                .map(|(index, child)| SubmenuButton {
                    index,
                    id: child.id,
                    icon: child.icon.clone(),
                    enabled: false,
                    style: SlotStyle::resolve(&self.config.appearance, false),
                })
                .collect(),
            None => Vec::new(),
        };

        log::debug!("Attaching {} submenu buttons to slot {}", buttons.len(), owner);
        self.submenu = Some(Submenu {
            owner,
            ring_index: spec.ring_index,
            buttons,
        });
        if let Some(slot) = self.slots.get_mut(owner) {
            slot.set_pressed(true);
        }
        self.stacking = self.submenu_stacking();
        self.restyle();
    }

    /// Under [`ClosingPolicy::None`] the backdrop cannot close anything, so the menu goes
    /// below it while a submenu is open.
    fn submenu_stacking(&self) -> Stacking {
        match self.config.closing {
            ClosingPolicy::None => Stacking::MenuBelowBackdrop,
            _ => Stacking::MenuAboveBackdrop,
        }
    }

    fn detach_submenu(&mut self, owner: SlotId) {
        if self.submenu.as_ref().is_some_and(|s| s.owner == owner) {
            self.submenu = None;
        }
        if let Some(slot) = self.slots.get_mut(owner) {
            slot.set_pressed(false);
        }
        self.stacking = Stacking::MenuAboveBackdrop;
        self.restyle();
        self.emit(MenuEvent::SubmenuClosed(owner));
    }

    fn hint_target(&self) -> Option<SlotId> {
        let allowed = match self.config.hint {
            HintPolicy::Never => false,
            HintPolicy::Once => !self.hint_shown,
            HintPolicy::Always => true,
        };
        if !allowed {
            return None;
        }
        let slot = self.slots.slot_at(1)?;
        self.item_for(slot)
            .filter(|item| item.has_children())
            .map(|_| slot)
    }

    fn restyle(&mut self) {
        self.slots.restyle(&self.config.appearance, &self.items);
        let style = SlotStyle::resolve(&self.config.appearance, false);
        if let Some(submenu) = self.submenu.as_mut() {
            for button in &mut submenu.buttons {
                button.style = style;
            }
        }
    }

    /// Pushes the gate onto the individual buttons. While the menu sits below the backdrop
    /// only the submenu owner and the submenu buttons are reachable.
    fn refresh_enabled(&mut self) {
        let buried = self.stacking == Stacking::MenuBelowBackdrop;
        if buried {
            self.gate.set_enabled(InputSource::MainButton, false);
        }
        let owner = self.submenu.as_ref().map(|s| s.owner);
        let ring = self.gate.is_enabled(InputSource::RingButtons);
        for slot in self.slots.iter_mut() {
            let enabled = ring
                && InteractionGate::is_tappable_position(slot.position())
                && slot.item().is_some()
                && (!buried || owner == Some(slot.id()));
            slot.set_enabled(enabled);
        }
        if let Some(submenu) = self.submenu.as_mut() {
            for button in &mut submenu.buttons {
                button.enabled = ring;
            }
        }
    }

    fn submenu_points(&self) -> Vec<Point> {
        match &self.submenu {
            Some(submenu) => submenu_positions(
                &self.config.layout,
                self.geometry.button(submenu.ring_index),
                submenu.ring_index,
                submenu.buttons.len(),
            ),
            None => Vec::new(),
        }
    }

    /// Puts every track on the resting value of the current state.
    fn snap_to_rest(&mut self) {
        let closed = self.state == MenuState::Closed;
        let points = self.submenu_points();
        let parked = self
            .submenu
            .as_ref()
            .zip(points.last())
            .map(|(s, last)| (s.owner, submenu_indicator_position(&self.config.layout, *last)));

        let rest: Vec<_> = self
            .slots
            .iter()
            .map(|slot| {
                let position = if closed { WRAP_INDEX } else { slot.position() };
                let indicator = match parked {
                    Some((owner, point)) if owner == slot.id() => point,
                    _ => self.geometry.indicator(position),
                };
                (slot.id(), self.geometry.button(position), indicator)
            })
            .collect();
        for (slot, button, indicator) in rest {
            self.stage.set(Track::Button(slot), Channel::Position, button);
            self.stage.set(Track::Indicator(slot), Channel::Position, indicator);
        }

        self.stage.set(Track::Ring, Channel::Rotation, 0.0);
        self.stage.set(Track::MainButton, Channel::Scale, 1.0);
        let backdrop = if self.backdrop_visible { 1.0 } else { 0.0 };
        self.stage.set(Track::Backdrop, Channel::Opacity, backdrop);
        self.stage.remove(Track::HintShadow);

        for (i, point) in points.iter().enumerate() {
            self.stage.set(Track::Submenu(i), Channel::Position, *point);
            self.stage.set(Track::Submenu(i), Channel::Opacity, 1.0);
        }
        for i in points.len()..MAX_CHILDREN {
            self.stage.remove(Track::Submenu(i));
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    pub fn is_attached(&self) -> bool {
        self.host.is_some()
    }

    pub fn is_idle(&self) -> bool {
        self.sequencer.is_idle()
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn slots(&self) -> &SlotRing {
        &self.slots
    }

    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slots.get(id)
    }

    pub fn item_for(&self, slot: SlotId) -> Option<&MenuItem> {
        self.slots
            .get(slot)
            .and_then(Slot::item)
            .and_then(|i| self.items.get(i))
    }

    /// Ids bound at each ring index, wrap point last.
    pub fn ring_items(&self) -> [Option<ItemId>; SLOT_COUNT] {
        self.slots
            .bindings()
            .map(|bound| bound.and_then(|i| self.items.get(i)).map(|item| item.id))
    }

    pub fn geometry(&self) -> &RingGeometry {
        &self.geometry
    }

    pub fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }

    /// Presentation values for a renderer.
    pub fn stage(&self) -> &Stage<Track> {
        &self.stage
    }

    /// Where `slot` is drawn right now, in menu space.
    pub fn presented_position(&self, slot: SlotId) -> Option<Point> {
        self.stage.position(Track::Button(slot))
    }

    pub fn presented_in_host(&self, slot: SlotId) -> Option<Point> {
        let placement = self.placement.as_ref()?;
        self.presented_position(slot).map(|p| placement.to_host(p))
    }

    pub fn submenu(&self) -> Option<&Submenu> {
        self.submenu.as_ref()
    }

    pub fn submenu_buttons(&self) -> &[SubmenuButton] {
        self.submenu
            .as_ref()
            .map(|s| s.buttons.as_slice())
            .unwrap_or_default()
    }

    /// Where submenu button `index` is drawn, in submenu area space.
    pub fn submenu_button_position(&self, index: usize) -> Option<Point> {
        let placement = self.placement.as_ref()?;
        self.submenu.as_ref()?.buttons.get(index)?;
        self.stage
            .position(Track::Submenu(index))
            .map(|p| placement.to_submenu_area(p))
    }

    pub fn submenu_button_opacity(&self, index: usize) -> Option<f64> {
        self.submenu.as_ref()?.buttons.get(index)?;
        self.stage.scalar(Track::Submenu(index), Channel::Opacity)
    }

    pub fn is_backdrop_visible(&self) -> bool {
        self.backdrop_visible
    }

    pub fn stacking(&self) -> Stacking {
        self.stacking
    }

    pub fn is_input_enabled(&self, source: InputSource) -> bool {
        self.gate.is_enabled(source)
    }

    /// Slot currently showing the hint flourish.
    pub fn hint_slot(&self) -> Option<SlotId> {
        self.hint
    }

    /// Lottie glyph for the main button's current toggle state.
    pub fn main_glyph(&self) -> Option<&serde_json::Value> {
        if self.main_open {
            self.glyphs.open()
        } else {
            self.glyphs.close()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::slot::RotateDirection;
    use crate::menu::state::SubmenuTransition;
    use crate::menu::LAST_VISIBLE_INDEX;
    use circlet_motion::Rect;

    const TICK: Duration = Duration::from_millis(16);

    fn host() -> HostFrame {
        HostFrame::new(Rect::new(0.0, 0.0, 390.0, 844.0))
    }

    fn items(count: i64) -> Vec<MenuItem> {
        (0..count)
            .map(|i| MenuItem::new(i, format!("icon-{i}")))
            .collect()
    }

    fn with_children(count: i64, parent: usize, children: i64) -> Vec<MenuItem> {
        let mut set = items(count);
        let kids = (0..children)
            .map(|c| MenuItem::new(100 + 10 * parent as i64 + c + 1, "child"))
            .collect();
        set[parent] = MenuItem::new(parent as i64, "parent").with_children(kids);
        set
    }

    fn menu(set: Vec<MenuItem>) -> CircleMenu {
        let config = MenuConfig {
            hint: HintPolicy::Never,
            ..MenuConfig::default()
        };
        menu_with(config, set)
    }

    fn menu_with(config: MenuConfig, set: Vec<MenuItem>) -> CircleMenu {
        let mut menu = CircleMenu::new(config);
        menu.attach(host()).unwrap();
        menu.set_items(set).unwrap();
        menu
    }

    fn settle(menu: &mut CircleMenu) {
        for _ in 0..1000 {
            if !menu.advance(TICK) {
                return;
            }
        }
        panic!("menu never settled");
    }

    fn opened(set: Vec<MenuItem>) -> CircleMenu {
        let mut menu = menu(set);
        menu.open_menu().unwrap();
        settle(&mut menu);
        assert_eq!(menu.state(), MenuState::Open);
        menu
    }

    fn opened_closing_all(set: Vec<MenuItem>) -> CircleMenu {
        let config = MenuConfig {
            hint: HintPolicy::Never,
            closing: ClosingPolicy::All,
            ..MenuConfig::default()
        };
        let mut menu = menu_with(config, set);
        menu.open_menu().unwrap();
        settle(&mut menu);
        menu
    }

    fn id(v: i64) -> Option<ItemId> {
        Some(ItemId::new(v))
    }

    fn drain(rx: &async_channel::Receiver<MenuEvent>) -> Vec<MenuEvent> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn test_operations_require_attach() {
        let mut menu = CircleMenu::new(MenuConfig::default());
        assert!(menu.set_items(items(5)).is_ok());
        assert_eq!(
            menu.open_menu(),
            Err(MenuError::NotAttached("opening the menu"))
        );
        assert!(matches!(menu.on_swipe(SwipeDirection::Left), Err(MenuError::NotAttached(_))));

        menu.attach(host()).unwrap();
        assert_eq!(menu.attach(host()), Err(MenuError::AlreadyAttached));
    }

    #[test]
    fn test_set_items_bounds_keep_prior_state() {
        let mut menu = menu(items(5));
        for n in 3..=9 {
            assert!(menu.set_items(items(n)).is_ok());
            assert_eq!(menu.items().len(), n as usize);
        }
        for n in [0, 1, 2, 10, 12] {
            assert_eq!(menu.set_items(items(n)), Err(MenuError::ItemCount(n as usize)));
            assert_eq!(menu.items().len(), 9);
        }
        assert!(menu.set_items(with_children(4, 1, 6)).is_err());
        assert_eq!(menu.items().len(), 9);
    }

    #[test]
    fn test_open_without_items_fails() {
        let mut menu = CircleMenu::new(MenuConfig::default());
        menu.attach(host()).unwrap();
        assert_eq!(menu.open_menu(), Err(MenuError::NoItems));
        assert_eq!(menu.state(), MenuState::Closed);
    }

    #[test]
    fn test_open_lands_slots_on_ring() {
        let mut menu = menu(items(9));
        let outcome = menu.open_menu().unwrap();
        assert!(matches!(outcome, Outcome::Started(_)));
        assert_eq!(menu.state(), MenuState::Opening);
        assert!(menu.is_backdrop_visible());

        settle(&mut menu);

        assert_eq!(menu.state(), MenuState::Open);
        for slot in menu.slots().iter() {
            assert_eq!(
                menu.presented_position(slot.id()),
                Some(menu.geometry().button(slot.position()))
            );
        }
        assert_eq!(menu.ring_items(), [id(4), id(3), id(2), id(1), id(0), id(5)]);
    }

    #[test]
    fn test_three_items_fill_the_middle() {
        let menu = opened(items(3));
        assert_eq!(menu.ring_items(), [None, id(2), id(1), id(0), None, None]);
    }

    #[test]
    fn test_four_items_duplicate_first() {
        let menu = opened(items(4));
        let ring = menu.ring_items();
        assert_eq!(ring[0], id(0));
        assert_eq!(ring[LAST_VISIBLE_INDEX], id(0));
        assert_eq!(ring[WRAP_INDEX], id(0));
    }

    #[test]
    fn test_open_then_close_restores_slots() {
        let mut menu = menu(items(7));
        let before = menu.slots().clone();

        menu.open_menu().unwrap();
        settle(&mut menu);
        menu.close_menu().unwrap();
        settle(&mut menu);

        assert_eq!(menu.state(), MenuState::Closed);
        assert_eq!(menu.slots(), &before);
        for slot in menu.slots().iter() {
            assert_eq!(
                menu.presented_position(slot.id()),
                Some(menu.geometry().wrap_button())
            );
        }
        assert!(!menu.is_backdrop_visible());
    }

    #[test]
    fn test_redundant_open_and_close_are_ignored() {
        let mut menu = menu(items(5));
        assert_eq!(menu.close_menu(), Ok(Outcome::Ignored(Rejection::AlreadyClosed)));
        menu.open_menu().unwrap();
        assert_eq!(menu.open_menu(), Ok(Outcome::Ignored(Rejection::AlreadyOpen)));
        settle(&mut menu);
        assert_eq!(menu.open_menu(), Ok(Outcome::Ignored(Rejection::AlreadyOpen)));
    }

    #[test]
    fn test_gate_closed_while_sequence_runs() {
        let mut menu = menu(items(6));
        menu.open_menu().unwrap();
        menu.advance(TICK);

        for source in [
            InputSource::MainButton,
            InputSource::Swipe,
            InputSource::RingButtons,
            InputSource::Backdrop,
        ] {
            assert!(!menu.is_input_enabled(source), "{source} open mid-flight");
        }
        assert_eq!(
            menu.on_swipe(SwipeDirection::Right),
            Ok(Outcome::Ignored(Rejection::InputDisabled))
        );
        assert!(menu.slots().iter().all(|s| !s.is_enabled()));

        settle(&mut menu);
        assert!(menu.is_input_enabled(InputSource::Swipe));
    }

    #[test]
    fn test_only_inner_positions_take_taps() {
        let menu = opened(items(9));
        for slot in menu.slots().iter() {
            assert_eq!(
                slot.is_enabled(),
                (1..=3).contains(&slot.position()),
                "slot at {}",
                slot.position()
            );
        }
    }

    #[test]
    fn test_swipe_right_on_nine_items() {
        let mut menu = opened(items(9));
        let before = menu.ring_items();

        menu.on_swipe(SwipeDirection::Right).unwrap();
        assert!(matches!(menu.state(), MenuState::Rotating(RotateDirection::Right)));
        settle(&mut menu);

        let after = menu.ring_items();
        assert_eq!(after[3], before[4]);
        assert_eq!(after[LAST_VISIBLE_INDEX], id(8));
        assert_eq!(menu.state(), MenuState::Open);
    }

    #[test]
    fn test_rotation_round_trip_restores_bindings() {
        for k in 1..=4 {
            let mut menu = opened(items(8));
            let before = menu.slots().clone();
            for direction in [SwipeDirection::Up, SwipeDirection::Down] {
                for _ in 0..k {
                    menu.on_swipe(direction).unwrap();
                    settle(&mut menu);
                }
            }
            assert_eq!(menu.slots(), &before, "{k} steps each way");
        }
    }

    #[test]
    fn test_swipe_ignored_with_three_items() {
        let mut menu = opened(items(3));
        assert_eq!(
            menu.on_swipe(SwipeDirection::Left),
            Ok(Outcome::Ignored(Rejection::TooFewItems))
        );
    }

    #[test]
    fn test_item_tap_reports_selection() {
        let (tx, rx) = async_channel::unbounded();
        let mut menu = opened(items(5)).with_events(tx);
        let slot = menu.slots().slot_at(2).unwrap();

        assert_eq!(menu.on_item_tap(slot), Ok(Outcome::Completed));
        assert_eq!(drain(&rx), vec![MenuEvent::ItemSelected(ItemId::new(2))]);

        let edge = menu.slots().slot_at(0).unwrap();
        assert_eq!(
            menu.on_item_tap(edge),
            Ok(Outcome::Ignored(Rejection::InputDisabled))
        );
        assert_eq!(
            menu.on_item_tap(SlotId::new(9)),
            Err(MenuError::UnknownSlot(SlotId::new(9)))
        );
    }

    #[test]
    fn test_submenu_opens_children_in_order() {
        let (tx, rx) = async_channel::unbounded();
        let mut menu = opened(with_children(5, 2, 3)).with_events(tx);
        let owner = menu.slots().slot_at(2).unwrap();

        menu.on_item_tap(owner).unwrap();
        let ids: Vec<_> = menu.submenu_buttons().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![ItemId::new(121), ItemId::new(122), ItemId::new(123)]);

        let fade = menu.config().timing.submenu_fade;
        menu.advance(fade + Duration::from_millis(10));
        assert_eq!(menu.submenu_button_opacity(0), Some(1.0));
        assert!(menu.submenu_button_opacity(1).is_some_and(|o| o < 1.0));
        assert_eq!(menu.submenu_button_opacity(2), None);

        settle(&mut menu);
        assert_eq!(menu.state(), MenuState::SubmenuOpen(owner));
        assert!(menu.slot(owner).is_some_and(Slot::is_pressed));

        for index in 0..3 {
            assert_eq!(menu.on_submenu_tap(index), Ok(Outcome::Completed));
        }
        assert_eq!(
            drain(&rx),
            vec![
                MenuEvent::ItemSelected(ItemId::new(2)),
                MenuEvent::SubmenuOpened(owner),
                MenuEvent::ItemSelected(ItemId::new(121)),
                MenuEvent::ItemSelected(ItemId::new(122)),
                MenuEvent::ItemSelected(ItemId::new(123)),
            ]
        );
    }

    #[test]
    fn test_submenu_toggle_returns_to_open() {
        let mut menu = opened(with_children(6, 2, 2));
        let owner = menu.slots().slot_at(2).unwrap();

        menu.on_item_tap(owner).unwrap();
        settle(&mut menu);
        menu.on_item_tap(owner).unwrap();
        assert_eq!(
            menu.state(),
            MenuState::SubmenuTransition(SubmenuTransition::Closing(owner))
        );
        settle(&mut menu);

        assert_eq!(menu.state(), MenuState::Open);
        assert!(menu.submenu_buttons().is_empty());
        assert!(menu.slot(owner).is_some_and(|s| !s.is_pressed()));
    }

    #[test]
    fn test_switching_submenus_composes_close_then_open() {
        let mut set = with_children(5, 2, 2);
        set[3] = MenuItem::new(3, "other").with_children(vec![MenuItem::new(50, "x")]);
        let (tx, rx) = async_channel::unbounded();
        let mut menu = opened_closing_all(set).with_events(tx);
        let first = menu.slots().slot_at(2).unwrap();
        let second = menu.slots().slot_at(1).unwrap();

        menu.on_item_tap(first).unwrap();
        settle(&mut menu);
        drain(&rx);

        menu.on_item_tap(second).unwrap();
        assert_eq!(menu.submenu().map(|s| s.owner), Some(first));
        settle(&mut menu);

        assert_eq!(menu.state(), MenuState::SubmenuOpen(second));
        let ids: Vec<_> = menu.submenu_buttons().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![ItemId::new(50)]);
        assert_eq!(
            drain(&rx),
            vec![
                MenuEvent::ItemSelected(ItemId::new(3)),
                MenuEvent::SubmenuClosed(first),
                MenuEvent::SubmenuOpened(second),
            ]
        );
    }

    #[test]
    fn test_swipe_blocked_while_submenu_open() {
        let mut menu = opened(with_children(6, 2, 1));
        menu.on_item_tap(menu.slots().slot_at(2).unwrap()).unwrap();
        settle(&mut menu);
        assert_eq!(
            menu.on_swipe(SwipeDirection::Left),
            Ok(Outcome::Ignored(Rejection::InputDisabled))
        );
    }

    #[test]
    fn test_backdrop_policies() {
        let owner_index = 2;
        let run = |policy: ClosingPolicy| {
            let config = MenuConfig {
                closing: policy,
                hint: HintPolicy::Never,
                ..MenuConfig::default()
            };
            let mut menu = menu_with(config, with_children(5, owner_index, 2));
            menu.open_menu().unwrap();
            settle(&mut menu);
            let owner = menu.slots().slot_at(2).unwrap();
            menu.on_item_tap(owner).unwrap();
            settle(&mut menu);
            let outcome = menu.on_backdrop_tap().unwrap();
            settle(&mut menu);
            (outcome, menu.state())
        };

        let (outcome, state) = run(ClosingPolicy::None);
        assert_eq!(outcome, Outcome::Ignored(Rejection::InputDisabled));
        assert!(matches!(state, MenuState::SubmenuOpen(_)));

        let (_, state) = run(ClosingPolicy::SubmenuOnly);
        assert_eq!(state, MenuState::Open);

        let (_, state) = run(ClosingPolicy::All);
        assert_eq!(state, MenuState::Open);

        let (_, state) = run(ClosingPolicy::AllAtTheSameTime);
        assert_eq!(state, MenuState::Closed);

        let (outcome, state) = run(ClosingPolicy::MenuOnly);
        assert_eq!(outcome, Outcome::Ignored(Rejection::PolicyIgnores));
        assert!(matches!(state, MenuState::SubmenuOpen(_)));
    }

    #[test]
    fn test_policy_none_stacks_menu_below_backdrop() {
        let mut menu = opened(with_children(5, 2, 2));
        let owner = menu.slots().slot_at(2).unwrap();
        menu.on_item_tap(owner).unwrap();
        assert_eq!(menu.stacking(), Stacking::MenuBelowBackdrop);
        settle(&mut menu);
        menu.on_item_tap(owner).unwrap();
        settle(&mut menu);
        assert_eq!(menu.stacking(), Stacking::MenuAboveBackdrop);
    }

    #[test]
    fn test_main_glyph_follows_toggle_state() {
        let mut menu = menu(items(5));
        assert_eq!(menu.main_glyph(), None);

        let open = serde_json::json!({ "nm": "open" });
        let close = serde_json::json!({ "nm": "close" });
        menu.set_glyphs(GlyphAssets::new(Some(open.clone()), Some(close.clone())));
        assert_eq!(menu.main_glyph(), Some(&close));

        menu.open_menu().unwrap();
        assert_eq!(menu.main_glyph(), Some(&open));
        settle(&mut menu);
        menu.close_menu().unwrap();
        assert_eq!(menu.main_glyph(), Some(&close));
    }

    #[test]
    fn test_host_positions_need_attach() {
        let mut menu = CircleMenu::new(MenuConfig::default());
        let slot = SlotId::new(0);
        assert!(!menu.is_attached());
        assert_eq!(menu.presented_in_host(slot), None);

        menu.attach(host()).unwrap();
        assert!(menu.is_attached());
        let placement = *menu.placement().unwrap();
        assert_eq!(
            menu.presented_in_host(slot),
            Some(placement.to_host(menu.geometry().button(WRAP_INDEX)))
        );
    }

    #[test]
    fn test_submenu_buttons_rest_in_submenu_area() {
        let mut menu = opened(with_children(5, 2, 3));
        let owner = menu.slots().slot_at(2).unwrap();
        menu.on_item_tap(owner).unwrap();
        settle(&mut menu);

        let placement = *menu.placement().unwrap();
        let expected = submenu_positions(&menu.config().layout, menu.geometry().button(2), 2, 3);
        for (i, point) in expected.iter().enumerate() {
            assert_eq!(
                menu.submenu_button_position(i),
                Some(placement.to_submenu_area(*point))
            );
        }
        assert_eq!(menu.submenu_button_position(3), None);
    }

    #[test]
    fn test_buried_menu_only_reaches_owner_and_submenu() {
        let mut menu = opened(with_children(5, 2, 2));
        let owner = menu.slots().slot_at(2).unwrap();
        let other = menu.slots().slot_at(1).unwrap();
        menu.on_item_tap(owner).unwrap();
        settle(&mut menu);

        assert!(!menu.is_input_enabled(InputSource::MainButton));
        assert!(menu.slot(other).is_some_and(|s| !s.is_enabled()));
        assert_eq!(
            menu.on_item_tap(other),
            Ok(Outcome::Ignored(Rejection::InputDisabled))
        );
        assert_eq!(
            menu.on_main_button_tap(),
            Ok(Outcome::Ignored(Rejection::InputDisabled))
        );
        assert_eq!(menu.state(), MenuState::SubmenuOpen(owner));

        assert_eq!(menu.on_submenu_tap(0), Ok(Outcome::Completed));
        menu.on_item_tap(owner).unwrap();
        settle(&mut menu);
        assert_eq!(menu.state(), MenuState::Open);
        assert!(menu.is_input_enabled(InputSource::MainButton));
        assert!(menu.slot(other).is_some_and(|s| s.is_enabled()));
    }

    #[test]
    fn test_close_with_submenu_closes_both() {
        let (tx, rx) = async_channel::unbounded();
        let mut menu = opened_closing_all(with_children(5, 2, 2)).with_events(tx);
        let owner = menu.slots().slot_at(2).unwrap();
        menu.on_item_tap(owner).unwrap();
        settle(&mut menu);
        drain(&rx);

        menu.on_main_button_tap().unwrap();
        settle(&mut menu);

        assert_eq!(menu.state(), MenuState::Closed);
        assert!(menu.submenu().is_none());
        assert_eq!(
            drain(&rx),
            vec![
                MenuEvent::ItemSelected(MAIN_BUTTON_ID),
                MenuEvent::SubmenuClosed(owner),
                MenuEvent::MenuClosed,
            ]
        );
    }

    #[test]
    fn test_main_button_toggles_menu() {
        let (tx, rx) = async_channel::unbounded();
        let mut menu = menu(items(5)).with_events(tx);

        menu.on_main_button_tap().unwrap();
        settle(&mut menu);
        assert_eq!(menu.state(), MenuState::Open);
        menu.on_main_button_tap().unwrap();
        settle(&mut menu);
        assert_eq!(menu.state(), MenuState::Closed);

        assert_eq!(
            drain(&rx),
            vec![
                MenuEvent::ItemSelected(MAIN_BUTTON_ID),
                MenuEvent::MenuOpened,
                MenuEvent::ItemSelected(MAIN_BUTTON_ID),
                MenuEvent::MenuClosed,
            ]
        );
    }

    #[test]
    fn test_items_set_while_open_wait_for_close() {
        let mut menu = opened(items(5));
        menu.set_items(items(8)).unwrap();
        assert_eq!(menu.items().len(), 5);
        menu.close_menu().unwrap();
        settle(&mut menu);
        assert_eq!(menu.items().len(), 8);
    }

    #[test]
    fn test_hint_plays_once() {
        let config = MenuConfig {
            hint: HintPolicy::Once,
            ..MenuConfig::default()
        };
        // slot at ring index 1 holds item 3 after opening
        let mut menu = menu_with(config, with_children(5, 3, 2));

        menu.open_menu().unwrap();
        let mut seen = false;
        while menu.advance(TICK) {
            seen |= menu.hint_slot().is_some();
        }
        assert!(seen);
        assert_eq!(menu.hint_slot(), None);

        menu.close_menu().unwrap();
        settle(&mut menu);
        menu.open_menu().unwrap();
        while menu.advance(TICK) {
            assert_eq!(menu.hint_slot(), None);
        }
    }

    #[test]
    fn test_update_config_reports_diff() {
        let mut menu = opened(items(5));
        let mut next = *menu.config();
        next.layout.radius = 120.0;
        next.appearance.focused_icon = crate::menu::Color::rgb(0, 0, 0);

        let diff = menu.update_config(next);

        assert!(diff.geometry);
        assert_eq!(diff.appearance.len(), 1);
        assert!(!diff.timing);
        let slot = menu.slots().slot_at(2).unwrap();
        assert_eq!(
            menu.presented_position(slot),
            Some(menu.geometry().button(2))
        );
        assert!(menu.update_config(next).is_empty());
    }

    #[test]
    fn test_menu_config_deserializes() {
        let config: MenuConfig = serde_json::from_str(
            r##"{
                "closing": "allAtTheSameTime",
                "hint": "always",
                "layout": { "radius": 110.0 },
                "appearance": { "blackout": "#00000080" },
                "timing": { "rotation": 150 }
            }"##,
        )
        .unwrap();
        assert_eq!(config.closing, ClosingPolicy::AllAtTheSameTime);
        assert_eq!(config.hint, HintPolicy::Always);
        assert_eq!(config.layout.radius, 110.0);
        assert_eq!(config.layout.menu_size, 300.0);
        assert_eq!(config.timing.rotation, Duration::from_millis(150));
    }
}
