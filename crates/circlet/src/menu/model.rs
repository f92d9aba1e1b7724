use crate::menu::slot::SlotId;
use crate::menu::{MAX_CHILDREN, MAX_ITEMS, MIN_ITEMS};
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct ItemId(i64);

impl ItemId {
    /// Reported when the main toggle button is tapped.
    pub const MAIN_BUTTON: ItemId = ItemId(100);

    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

/// Opaque icon reference, resolved by whatever renders the menu.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    Deref,
    From,
    Into,
    AsRef,
)]
#[serde(transparent)]
pub struct IconRef(String);

impl IconRef {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl From<&str> for IconRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub id: ItemId,
    pub icon: IconRef,
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    pub fn new(id: impl Into<ItemId>, icon: impl Into<IconRef>) -> Self {
        Self {
            id: id.into(),
            icon: icon.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<MenuItem>) -> Self {
        self.children = children;
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MenuError {
    #[error("Menu must contain {MIN_ITEMS} - {MAX_ITEMS} items, got {0}")]
    ItemCount(usize),
    #[error("Submenu of item {id} has {count} children, no more than {MAX_CHILDREN} allowed")]
    TooManyChildren { id: ItemId, count: usize },
    #[error("Submenu item {0} must not have children of its own")]
    NestedSubmenu(ItemId),
    #[error("Duplicate item id {0}")]
    DuplicateId(ItemId),
    #[error("Menu has no items")]
    NoItems,
    #[error("Menu is already attached")]
    AlreadyAttached,
    #[error("Menu must be attached before {0}")]
    NotAttached(&'static str),
    #[error("Slot {0} does not exist")]
    UnknownSlot(SlotId),
}

/// Checks every precondition of an item set without touching any menu state.
pub fn validate_items(items: &[MenuItem]) -> Result<(), MenuError> {
    if !(MIN_ITEMS..=MAX_ITEMS).contains(&items.len()) {
        return Err(MenuError::ItemCount(items.len()));
    }
    ensure_unique(items)?;

    for item in items {
        if item.children.len() > MAX_CHILDREN {
            return Err(MenuError::TooManyChildren {
                id: item.id,
                count: item.children.len(),
            });
        }
        if let Some(nested) = item.children.iter().find(|c| c.has_children()) {
            return Err(MenuError::NestedSubmenu(nested.id));
        }
        ensure_unique(&item.children)?;
    }
    Ok(())
}

fn ensure_unique(items: &[MenuItem]) -> Result<(), MenuError> {
    let mut seen = HashSet::new();
    match items.iter().find(|item| !seen.insert(item.id)) {
        Some(dup) => Err(MenuError::DuplicateId(dup.id)),
        None => Ok(()),
    }
}
