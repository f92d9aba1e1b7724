use crate::point::Point;
use std::collections::HashMap;
use std::hash::Hash;
use strum::Display;

/// Animatable property of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Channel {
    Position,
    Rotation,
    Opacity,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Point(Point),
    Scalar(f64),
}

impl Value {
    /// Interpolates towards `to`. Values of different kinds jump straight to `to`.
    pub fn lerp(self, to: Value, t: f64) -> Value {
        match (self, to) {
            (Self::Point(a), Self::Point(b)) => Self::Point(a.lerp(b, t)),
            (Self::Scalar(a), Self::Scalar(b)) => Self::Scalar(a + (b - a) * t),
            (_, to) => to,
        }
    }

    pub fn as_point(&self) -> Option<Point> {
        match self {
            Self::Point(p) => Some(*p),
            Self::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Point(_) => None,
        }
    }
}

impl From<Point> for Value {
    fn from(p: Point) -> Self {
        Self::Point(p)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

/// Presentation layer: the current animated value of every (track, channel) pair.
#[derive(Debug, Clone)]
pub struct Stage<K> {
    values: HashMap<(K, Channel), Value>,
}

impl<K> Default for Stage<K> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> Stage<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, track: K, channel: Channel) -> Option<Value> {
        self.values.get(&(track, channel)).copied()
    }

    pub fn set(&mut self, track: K, channel: Channel, value: impl Into<Value>) {
        self.values.insert((track, channel), value.into());
    }

    pub fn position(&self, track: K) -> Option<Point> {
        self.get(track, Channel::Position)
            .and_then(|v| v.as_point())
    }

    pub fn scalar(&self, track: K, channel: Channel) -> Option<f64> {
        self.get(track, channel).and_then(|v| v.as_scalar())
    }

    /// Drops every channel of `track`.
    pub fn remove(&mut self, track: K) {
        self.values.retain(|(k, _), _| *k != track);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
