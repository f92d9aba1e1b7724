use std::f64::consts::{PI, TAU};

pub mod choreography;
pub mod gate;
pub mod geometry;
pub mod model;
pub mod slot;
pub mod state;
pub mod theme;
pub mod widget;

pub use gate::{InputSource, InteractionGate};
pub use geometry::{HostFrame, Layout, Placement, RingGeometry};
pub use model::{IconRef, ItemId, MenuError, MenuItem};
pub use slot::{RotateDirection, Slot, SlotId, SlotRing, SwipeDirection};
pub use state::{MenuState, Plan, Rejection, Request};
pub use theme::{Appearance, Color};
pub use widget::{CircleMenu, MenuConfig, Outcome};

pub const MIN_ITEMS: usize = 3;
pub const MAX_ITEMS: usize = 9;
pub const MAX_CHILDREN: usize = 5;
pub const VISIBLE_COUNT: usize = 5;
pub const SLOT_COUNT: usize = VISIBLE_COUNT + 1;
pub const WRAP_INDEX: usize = VISIBLE_COUNT; // hidden staging point
pub const LAST_VISIBLE_INDEX: usize = VISIBLE_COUNT - 1;

pub const START_ANGLE: f64 = -55.0 * PI / 180.0;
pub const ANGLE_STEP: f64 = TAU / MAX_ITEMS as f64;
pub const WRAP_ANGLE: f64 = PI / 4.0;

pub const MAIN_BUTTON_ID: ItemId = ItemId::MAIN_BUTTON;
