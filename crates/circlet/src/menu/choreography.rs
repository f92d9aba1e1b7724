//! Composite animation sequences for every menu transition.
//!
//! Nothing here touches menu state: each builder turns a plan plus the current layout into a
//! [`Sequence`] whose tagged nodes report back the points at which the widget must update
//! its logical model.

use crate::menu::geometry::{submenu_indicator_position, submenu_positions, Layout, RingGeometry};
use crate::menu::slot::{RotateDirection, SlotId};
use crate::menu::{VISIBLE_COUNT, WRAP_INDEX};
use circlet_motion::{Easing, Sequence, Step};
use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use std::time::Duration;

/// Presentation tracks driven by the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Track {
    /// The whole ring of buttons; only ever rotated.
    Ring,
    MainButton,
    Backdrop,
    Button(SlotId),
    Indicator(SlotId),
    /// Submenu button by child index.
    Submenu(usize),
    HintShadow,
}

/// Points inside a composite where the logical model changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    SubmenuDetached(SlotId),
    SubmenuAttached(SlotId),
    HintBegan(SlotId),
    HintEnded,
}

pub type Choreography = Sequence<Track, Effect>;

/// Two chained springs: swing the ring out by `degrees`, then settle back to rest.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wobble {
    pub degrees: f64,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub swing: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub settle: Duration,
    pub swing_velocity: f64,
    pub settle_velocity: f64,
}

impl Wobble {
    pub fn open() -> Self {
        Self {
            degrees: 6.0,
            swing: Duration::from_millis(200),
            settle: Duration::from_millis(700),
            swing_velocity: 8.0,
            settle_velocity: 4.0,
        }
    }

    pub fn swipe() -> Self {
        Self {
            degrees: 2.0,
            swing: Duration::from_millis(200),
            settle: Duration::from_millis(600),
            swing_velocity: 7.0,
            settle_velocity: 4.0,
        }
    }
}

/// A wobble table where missing keys keep the preset's values.
#[serde_as]
#[derive(Deserialize, Default)]
#[serde(default)]
struct WobblePatch {
    degrees: Option<f64>,
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    swing: Option<Duration>,
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    settle: Option<Duration>,
    swing_velocity: Option<f64>,
    settle_velocity: Option<f64>,
}

impl WobblePatch {
    fn onto(self, base: Wobble) -> Wobble {
        Wobble {
            degrees: self.degrees.unwrap_or(base.degrees),
            swing: self.swing.unwrap_or(base.swing),
            settle: self.settle.unwrap_or(base.settle),
            swing_velocity: self.swing_velocity.unwrap_or(base.swing_velocity),
            settle_velocity: self.settle_velocity.unwrap_or(base.settle_velocity),
        }
    }
}

fn open_wobble<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Wobble, D::Error> {
    WobblePatch::deserialize(deserializer).map(|patch| patch.onto(Wobble::open()))
}

fn swipe_wobble<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Wobble, D::Error> {
    WobblePatch::deserialize(deserializer).map(|patch| patch.onto(Wobble::swipe()))
}

#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// One ring index of the open cascade or the close walk.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub unfurl_step: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub rotation: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub hint: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub submenu_fade: Duration,
    /// Each half of the main button press.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub bounce: Duration,
    #[serde(deserialize_with = "open_wobble")]
    pub open_wobble: Wobble,
    #[serde(deserialize_with = "swipe_wobble")]
    pub swipe_wobble: Wobble,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            unfurl_step: Duration::from_millis(50),
            rotation: Duration::from_millis(100),
            hint: Duration::from_millis(400),
            submenu_fade: Duration::from_millis(100),
            bounce: Duration::from_millis(100),
            open_wobble: Wobble::open(),
            swipe_wobble: Wobble::swipe(),
        }
    }
}

const BOUNCE_SCALE: f64 = 0.85;

/// The submenu a composite opens or closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmenuSpec {
    pub owner: SlotId,
    /// Ring index of the owner slot.
    pub ring_index: usize,
    pub count: usize,
}

pub struct Choreographer<'a> {
    layout: &'a Layout,
    geometry: &'a RingGeometry,
    timing: &'a Timing,
}

impl<'a> Choreographer<'a> {
    pub fn new(layout: &'a Layout, geometry: &'a RingGeometry, timing: &'a Timing) -> Self {
        Self {
            layout,
            geometry,
            timing,
        }
    }

    /// Slot and indicator both head for ring index `position`.
    fn travel(
        &self,
        slot: SlotId,
        position: usize,
        duration: Duration,
        delay: Duration,
    ) -> [Choreography; 2] {
        [
            Sequence::step(
                Step::move_to(Track::Button(slot), self.geometry.button(position), duration)
                    .delayed(delay),
            ),
            Sequence::step(
                Step::move_to(Track::Indicator(slot), self.geometry.indicator(position), duration)
                    .delayed(delay),
            ),
        ]
    }

    pub fn bounce(&self) -> Choreography {
        Sequence::then([
            Sequence::step(Step::scale_to(Track::MainButton, BOUNCE_SCALE, self.timing.bounce)),
            Sequence::step(Step::scale_to(Track::MainButton, 1.0, self.timing.bounce)),
        ])
    }

    fn backdrop(&self, opacity: f64) -> Choreography {
        Sequence::step(Step::fade_to(Track::Backdrop, opacity, self.timing.unfurl_step))
    }

    /// Open cascade. At step `i` every slot `j <= i` advances to ring index `i - j`, so slot
    /// `j` walks the ring from index 0 until it reaches its home index. Each ring index is
    /// a cascade of the slots passing over it, one step apart.
    pub fn unfurl(&self) -> Choreography {
        let step = self.timing.unfurl_step;
        let mut cascades = Vec::new();
        for index in 0..VISIBLE_COUNT {
            let lead = step * index as u32;
            let walkers = 0..VISIBLE_COUNT - index;
            let buttons = walkers.clone().map(|j| {
                Step::move_to(Track::Button(SlotId::new(j)), self.geometry.button(index), step)
                    .delayed(lead)
            });
            let indicators = walkers.map(|j| {
                Step::move_to(Track::Indicator(SlotId::new(j)), self.geometry.indicator(index), step)
                    .delayed(lead)
            });
            cascades.push(Sequence::cascade(buttons, step));
            cascades.push(Sequence::cascade(indicators, step));
        }
        Sequence::join(cascades)
    }

    pub fn wobble(&self, wobble: &Wobble, sign: f64) -> Choreography {
        let angle = sign * wobble.degrees.to_radians();
        Sequence::then([
            Sequence::step(Step::rotate_to(Track::Ring, angle, wobble.swing).eased(Easing::Spring {
                velocity: wobble.swing_velocity,
            })),
            Sequence::step(Step::rotate_to(Track::Ring, 0.0, wobble.settle).eased(Easing::Spring {
                velocity: wobble.settle_velocity,
            })),
        ])
    }

    /// Bounce, unfurl and wobble, followed by the hint flourish on `hint` if given.
    pub fn open(&self, hint: Option<SlotId>) -> Choreography {
        let reveal = Sequence::join([self.bounce(), self.backdrop(1.0), self.unfurl()]);
        let mut sequence = reveal.and_then(self.wobble(&self.timing.open_wobble, -1.0));
        if let Some(slot) = hint {
            sequence = sequence.and_then(self.hint(slot));
        }
        sequence
    }

    /// Every visible slot steps one index down per step, index 0 dropping onto the wrap
    /// point, until the whole ring rests there.
    pub fn collapse(&self, positions: &[(SlotId, usize)]) -> Choreography {
        let step = self.timing.unfurl_step;
        let mut moves = Vec::new();
        for &(slot, start) in positions.iter().filter(|(_, p)| *p != WRAP_INDEX) {
            for k in 0..=start {
                let target = if k == start { WRAP_INDEX } else { start - k - 1 };
                moves.extend(self.travel(slot, target, step, step * k as u32));
            }
        }
        Sequence::join(moves)
    }

    pub fn close(&self, positions: &[(SlotId, usize)], submenu: Option<SubmenuSpec>) -> Choreography {
        let mut parts = vec![self.bounce(), self.backdrop(0.0), self.collapse(positions)];
        // the collapse already walks the owner's indicator home
        if let Some(spec) = submenu {
            let fade = self.fade_out_children(&spec);
            parts.push(fade.on_complete(Effect::SubmenuDetached(spec.owner)));
        }
        Sequence::join(parts)
    }

    /// Moves every slot to its already committed ring index, then wobbles the ring.
    pub fn rotate(&self, direction: RotateDirection, positions: &[(SlotId, usize)]) -> Choreography {
        let moves = positions
            .iter()
            .flat_map(|&(slot, position)| {
                self.travel(slot, position, self.timing.rotation, Duration::ZERO)
            });
        let sign = match direction {
            RotateDirection::Left => -1.0,
            RotateDirection::Right => 1.0,
        };
        Sequence::join(moves).and_then(self.wobble(&self.timing.swipe_wobble, sign))
    }

    /// Places the children above the owner and fades them in one after another, while the
    /// owner's indicator parks above the last of them.
    pub fn submenu_open(&self, spec: &SubmenuSpec) -> Choreography {
        let owner = self.geometry.button(spec.ring_index);
        let points = submenu_positions(self.layout, owner, spec.ring_index, spec.count);
        let fade = self.timing.submenu_fade;

        let placed = points.iter().enumerate().map(|(i, point)| {
            Sequence::step(
                Step::move_to(Track::Submenu(i), *point, Duration::ZERO).starting_at(*point),
            )
        });
        let fades = (0..spec.count).map(|i| {
            Sequence::step(Step::fade_to(Track::Submenu(i), 1.0, fade).starting_at(0.0))
        });

        let mut parts: Vec<Choreography> = placed.collect();
        parts.push(Sequence::then(fades));
        if let Some(last) = points.last() {
            parts.push(Sequence::step(Step::move_to(
                Track::Indicator(spec.owner),
                submenu_indicator_position(self.layout, *last),
                fade,
            )));
        }
        Sequence::join(parts)
    }

    /// Fades the children out last to first and returns the owner's indicator to the ring.
    pub fn submenu_close(&self, spec: &SubmenuSpec) -> Choreography {
        Sequence::join([
            self.fade_out_children(spec),
            Sequence::step(Step::move_to(
                Track::Indicator(spec.owner),
                self.geometry.indicator(spec.ring_index),
                self.timing.submenu_fade,
            )),
        ])
        .on_complete(Effect::SubmenuDetached(spec.owner))
    }

    fn fade_out_children(&self, spec: &SubmenuSpec) -> Choreography {
        let fade = self.timing.submenu_fade;
        Sequence::then(
            (0..spec.count)
                .rev()
                .map(|i| Sequence::step(Step::fade_to(Track::Submenu(i), 0.0, fade))),
        )
    }

    pub fn switch_submenu(&self, from: &SubmenuSpec, to: &SubmenuSpec) -> Choreography {
        Sequence::then([
            self.submenu_close(from),
            Sequence::signal(Effect::SubmenuAttached(to.owner)),
            self.submenu_open(to),
        ])
    }

    /// Lifts the slot at ring index 1 and its indicator while a shadow copy drops away, then
    /// settles everything back.
    pub fn hint(&self, slot: SlotId) -> Choreography {
        let duration = self.timing.hint;
        let padding = self.layout.hint_padding;
        let button = self.geometry.button(1);
        let indicator = self.geometry.indicator(1);

        let shift = |dy: f64| {
            Sequence::join([
                Sequence::step(Step::move_to(Track::Button(slot), button.offset(0.0, -dy), duration)),
                Sequence::step(Step::move_to(
                    Track::Indicator(slot),
                    indicator.offset(0.0, -dy),
                    duration,
                )),
                Sequence::step(Step::move_to(Track::HintShadow, button.offset(0.0, dy), duration)),
            ])
        };

        Sequence::then([
            Sequence::signal(Effect::HintBegan(slot)),
            Sequence::join([
                Sequence::step(Step::fade_to(Track::HintShadow, 1.0, Duration::ZERO).starting_at(1.0)),
                Sequence::step(
                    Step::move_to(Track::HintShadow, button, Duration::ZERO).starting_at(button),
                ),
            ]),
            shift(padding),
            shift(0.0),
            Sequence::step(Step::fade_to(Track::HintShadow, 0.0, Duration::ZERO)),
            Sequence::signal(Effect::HintEnded),
        ])
    }
}
