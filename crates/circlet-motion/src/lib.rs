//! Headless animation sequencing.
//!
//! Animations are described as a tree of [`Sequence`] nodes built from two combinators:
//! [`Sequence::then`] (each child starts once the previous one completed) and
//! [`Sequence::join`] (children start together, the node completes with the last one).
//! A [`Sequencer`] runs any number of such trees against a [`Stage`], the presentation
//! layer a renderer reads every frame, and is driven by explicit elapsed time.

pub mod easing;
pub mod point;
pub mod sequence;
pub mod sequencer;
pub mod stage;
pub mod step;

pub use easing::Easing;
pub use point::{Point, Rect, Size};
pub use sequence::Sequence;
pub use sequencer::{Event, SequenceId, Sequencer};
pub use stage::{Channel, Stage, Value};
pub use step::Step;
