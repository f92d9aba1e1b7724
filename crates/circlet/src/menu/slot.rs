use crate::menu::model::MenuItem;
use crate::menu::theme::{Appearance, SlotStyle};
use crate::menu::{LAST_VISIBLE_INDEX, SLOT_COUNT, VISIBLE_COUNT, WRAP_INDEX};
use derive_more::{Display, From, Into};
use serde_with::DeserializeFromStr;
use strum::{Display as StrumDisplay, EnumIter, EnumString};

/// Index of one of the six reusable ring buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
pub struct SlotId(usize);

impl SlotId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Direction of an already classified swipe gesture.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, DeserializeFromStr, EnumString, EnumIter, StrumDisplay,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum SwipeDirection {
    #[strum(serialize = "left", serialize = "l")]
    Left,
    #[strum(serialize = "right", serialize = "r")]
    Right,
    #[strum(serialize = "up", serialize = "u")]
    Up,
    #[strum(serialize = "down", serialize = "d")]
    Down,
}

impl SwipeDirection {
    /// Downward swipes turn the ring left; every other direction turns it right.
    pub fn normalize(self) -> RotateDirection {
        match self {
            Self::Left | Self::Down => RotateDirection::Left,
            Self::Right | Self::Up => RotateDirection::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum RotateDirection {
    /// Every slot moves one ring index up; a new item enters at index 0.
    Left,
    /// Every slot moves one ring index down; a new item enters at the last visible index.
    Right,
}

/// Runtime state of one ring button.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    id: SlotId,
    position: usize,
    item: Option<usize>,
    pressed: bool,
    enabled: bool,
    style: SlotStyle,
}

impl Slot {
    pub fn id(&self) -> SlotId {
        self.id
    }

    /// Ring index this slot rests on, `WRAP_INDEX` for the hidden staging point.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Index of the bound item in the active item list.
    pub fn item(&self) -> Option<usize> {
        self.item
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn style(&self) -> SlotStyle {
        self.style
    }

    pub fn is_on_wrap(&self) -> bool {
        self.position == WRAP_INDEX
    }

    pub(crate) fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// The six ring buttons. Positions always form a bijection with the ring indices.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotRing {
    slots: Vec<Slot>,
}

impl Default for SlotRing {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotRing {
    pub fn new() -> Self {
        let slots = (0..SLOT_COUNT)
            .map(|i| Slot {
                id: SlotId(i),
                position: Self::home_position(SlotId(i)),
                item: None,
                pressed: false,
                enabled: false,
                style: SlotStyle::default(),
            })
            .collect();
        Self { slots }
    }

    /// Ring index a slot rests on while the menu is closed and right after it opens.
    pub fn home_position(id: SlotId) -> usize {
        if id.0 < VISIBLE_COUNT {
            LAST_VISIBLE_INDEX - id.0
        } else {
            WRAP_INDEX
        }
    }

    pub fn reset_home(&mut self) {
        for slot in &mut self.slots {
            slot.position = Self::home_position(slot.id);
            slot.item = None;
            slot.pressed = false;
        }
    }

    /// Binds the item list onto the home layout.
    ///
    /// Three items fill ring indices 3, 2, 1 and leave both edges empty. Four items fill
    /// the whole ring, wrapping item 0 around onto index 0 and the wrap point as well.
    /// Larger lists bind in index order and leave the rest to rotation.
    pub fn bind_for_open(&mut self, count: usize) {
        self.reset_home();
        match count {
            3 => {
                for (item, slot) in self.slots[1..=3].iter_mut().enumerate() {
                    slot.item = Some(item);
                }
            }
            4 => {
                for (item, slot) in self.slots[..4].iter_mut().enumerate() {
                    slot.item = Some(item);
                }
                self.slots[LAST_VISIBLE_INDEX].item = Some(0);
            }
            n => {
                for (item, slot) in self.slots.iter_mut().take(n).enumerate() {
                    slot.item = Some(item);
                }
            }
        }
        self.park_lookahead(count);
    }

    pub fn slot_at(&self, position: usize) -> Option<SlotId> {
        self.slots
            .iter()
            .find(|slot| slot.position == position)
            .map(|slot| slot.id)
    }

    pub fn item_at(&self, position: usize) -> Option<usize> {
        self.slots
            .iter()
            .find(|slot| slot.position == position)
            .and_then(|slot| slot.item)
    }

    /// Moves every slot one ring index in `direction` and rebinds the slot entering the
    /// visible ring. Returns that slot, or `None` when the ring has nothing bound to rotate
    /// from.
    pub fn rotate(&mut self, direction: RotateDirection, count: usize) -> Option<SlotId> {
        if count == 0 {
            return None;
        }
        let (entry, incoming) = match direction {
            RotateDirection::Left => (0, (self.item_at(0)? + 1) % count),
            RotateDirection::Right => {
                let last = self.item_at(LAST_VISIBLE_INDEX)?;
                (LAST_VISIBLE_INDEX, (last + count - 1) % count)
            }
        };

        let mut entered = None;
        for slot in &mut self.slots {
            slot.position = match direction {
                RotateDirection::Left if slot.position == WRAP_INDEX => 0,
                RotateDirection::Left => slot.position + 1,
                RotateDirection::Right if slot.position == 0 => WRAP_INDEX,
                RotateDirection::Right => slot.position - 1,
            };
            if slot.position == entry {
                slot.item = Some(incoming);
                entered = Some(slot.id);
            }
        }
        entered
    }

    /// Binds the wrap slot to the item a left rotation would bring in next. Four items
    /// leave the wrap slot holding a duplicate of the item at index 0 instead.
    pub fn park_lookahead(&mut self, count: usize) {
        let lookahead = match (count, self.item_at(0)) {
            (4, Some(first)) => Some(first),
            (n, Some(first)) if n > 4 => Some((first + 1) % n),
            _ => None,
        };
        if let Some(slot) = self.slots.iter_mut().find(|s| s.position == WRAP_INDEX) {
            slot.item = lookahead;
        }
    }

    /// Re-resolves every slot's colours. A slot is drawn focused while it is pressed and
    /// its item owns a submenu.
    pub fn restyle(&mut self, appearance: &Appearance, items: &[MenuItem]) {
        for slot in &mut self.slots {
            let has_children = slot
                .item
                .and_then(|i| items.get(i))
                .is_some_and(MenuItem::has_children);
            slot.style = SlotStyle::resolve(appearance, slot.pressed && has_children);
        }
    }

    pub fn get(&self, id: SlotId) -> Option<&Slot> {
        self.slots.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: SlotId) -> Option<&mut Slot> {
        self.slots.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Slot> {
        self.slots.iter_mut()
    }

    pub fn positions(&self) -> Vec<(SlotId, usize)> {
        self.slots.iter().map(|slot| (slot.id, slot.position)).collect()
    }

    /// Item indices in ring order, wrap point last.
    pub fn bindings(&self) -> [Option<usize>; SLOT_COUNT] {
        let mut out = [None; SLOT_COUNT];
        for slot in &self.slots {
            out[slot.position] = slot.item;
        }
        out
    }
}
