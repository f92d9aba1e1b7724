use crate::easing::Easing;
use crate::point::Point;
use crate::stage::{Channel, Value};
use std::time::Duration;

/// A single primitive animation: drive one channel of one track towards `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<K> {
    pub target: K,
    pub channel: Channel,
    pub to: Value,
    /// Explicit start value. When absent the step starts from whatever the stage holds at
    /// the moment the step starts (after its delay).
    pub from: Option<Value>,
    pub duration: Duration,
    pub delay: Duration,
    pub easing: Easing,
}

impl<K> Step<K> {
    pub fn new(target: K, channel: Channel, to: impl Into<Value>, duration: Duration) -> Self {
        Self {
            target,
            channel,
            to: to.into(),
            from: None,
            duration,
            delay: Duration::ZERO,
            easing: Easing::default(),
        }
    }

    pub fn move_to(target: K, point: Point, duration: Duration) -> Self {
        Self::new(target, Channel::Position, point, duration)
    }

    pub fn rotate_to(target: K, radians: f64, duration: Duration) -> Self {
        Self::new(target, Channel::Rotation, radians, duration)
    }

    pub fn fade_to(target: K, opacity: f64, duration: Duration) -> Self {
        Self::new(target, Channel::Opacity, opacity, duration)
    }

    pub fn scale_to(target: K, scale: f64, duration: Duration) -> Self {
        Self::new(target, Channel::Scale, scale, duration)
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn starting_at(mut self, value: impl Into<Value>) -> Self {
        self.from = Some(value.into());
        self
    }

    pub fn eased(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn total(&self) -> Duration {
        self.delay + self.duration
    }
}
