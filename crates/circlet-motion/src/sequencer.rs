use crate::sequence::Sequence;
use crate::stage::{Stage, Value};
use crate::step::Step;
use derive_more::Display;
use std::hash::Hash;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("seq#{_0}")]
pub struct SequenceId(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Event<E> {
    /// A tagged node inside `sequence` completed.
    Effect { sequence: SequenceId, effect: E },
    /// The whole composite completed. Emitted exactly once, after all of its effects.
    Finished(SequenceId),
}

enum Node<K, E> {
    Step {
        step: Step<K>,
        elapsed: Duration,
        from: Option<Value>,
        done: bool,
    },
    Then {
        children: Vec<Node<K, E>>,
        current: usize,
    },
    Join {
        children: Vec<Node<K, E>>,
        done: bool,
    },
    Tagged {
        inner: Box<Node<K, E>>,
        effect: Option<E>,
    },
}

impl<K: Copy + Eq + Hash, E> Node<K, E> {
    fn build(sequence: Sequence<K, E>) -> Self {
        match sequence {
            Sequence::Step(step) => Self::Step {
                step,
                elapsed: Duration::ZERO,
                from: None,
                done: false,
            },
            Sequence::Then(children) => Self::Then {
                children: children.into_iter().map(Self::build).collect(),
                current: 0,
            },
            Sequence::Join(children) => Self::Join {
                children: children.into_iter().map(Self::build).collect(),
                done: false,
            },
            Sequence::Tagged(inner, effect) => Self::Tagged {
                inner: Box::new(Self::build(*inner)),
                effect: Some(effect),
            },
        }
    }

    fn is_done(&self) -> bool {
        match self {
            Self::Step { done, .. } | Self::Join { done, .. } => *done,
            Self::Then { children, current } => *current >= children.len(),
            Self::Tagged { effect, .. } => effect.is_none(),
        }
    }

    /// Moves the node forward by `dt`. Returns the part of `dt` left over once the node
    /// completes, or `None` while it is still running.
    fn advance(&mut self, dt: Duration, stage: &mut Stage<K>, out: &mut Vec<E>) -> Option<Duration> {
        match self {
            Self::Step {
                step,
                elapsed,
                from,
                done,
            } => {
                if *done {
                    return Some(dt);
                }
                *elapsed += dt;
                if *elapsed < step.delay {
                    return None;
                }

                let start = *from.get_or_insert_with(|| {
                    let start = step
                        .from
                        .or_else(|| stage.get(step.target, step.channel))
                        .unwrap_or(step.to);
                    if start.as_point().is_some() != step.to.as_point().is_some() {
                        log::debug!(
                            "Cannot blend {} from {:?}, jumping to {:?}",
                            step.channel,
                            start,
                            step.to
                        );
                    }
                    start
                });
                let active = *elapsed - step.delay;
                let progress = if step.duration.is_zero() {
                    1.0
                } else {
                    active.as_secs_f64() / step.duration.as_secs_f64()
                };
                if active >= step.duration {
                    stage.set(step.target, step.channel, step.to);
                } else {
                    stage.set(
                        step.target,
                        step.channel,
                        start.lerp(step.to, step.easing.apply(progress)),
                    );
                }

                if active >= step.duration {
                    *done = true;
                    Some(active - step.duration)
                } else {
                    None
                }
            }
            Self::Then { children, current } => {
                let mut budget = dt;
                while let Some(child) = children.get_mut(*current) {
                    budget = child.advance(budget, stage, out)?;
                    *current += 1;
                }
                Some(budget)
            }
            Self::Join { children, done } => {
                if *done {
                    return Some(dt);
                }
                let mut leftover = dt;
                let mut pending = false;
                for child in children.iter_mut().filter(|c| !c.is_done()) {
                    match child.advance(dt, stage, out) {
                        Some(left) => leftover = leftover.min(left),
                        None => pending = true,
                    }
                }
                if pending {
                    None
                } else {
                    *done = true;
                    Some(leftover)
                }
            }
            Self::Tagged { inner, effect } => {
                let left = inner.advance(dt, stage, out)?;
                if let Some(effect) = effect.take() {
                    out.push(effect);
                }
                Some(left)
            }
        }
    }
}

/// Runs composite sequences against a [`Stage`].
///
/// Nothing happens on [`Sequencer::start`]; all progress, including effects of
/// zero-length nodes, is reported by the next [`Sequencer::advance`].
pub struct Sequencer<K, E> {
    running: Vec<(SequenceId, Node<K, E>)>,
    next_id: u64,
}

impl<K, E> Default for Sequencer<K, E> {
    fn default() -> Self {
        Self {
            running: Vec::new(),
            next_id: 1,
        }
    }
}

impl<K: Copy + Eq + Hash, E> Sequencer<K, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, sequence: Sequence<K, E>) -> SequenceId {
        let id = SequenceId(self.next_id);
        self.next_id += 1;
        log::trace!("Starting {} ({} steps)", id, sequence.step_count());
        self.running.push((id, Node::build(sequence)));
        id
    }

    pub fn advance(&mut self, dt: Duration, stage: &mut Stage<K>) -> Vec<Event<E>> {
        let mut events = Vec::new();
        let mut finished = Vec::new();

        for (id, node) in self.running.iter_mut() {
            let mut effects = Vec::new();
            let result = node.advance(dt, stage, &mut effects);
            events.extend(effects.into_iter().map(|effect| Event::Effect {
                sequence: *id,
                effect,
            }));
            if result.is_some() {
                events.push(Event::Finished(*id));
                finished.push(*id);
            }
        }

        self.running.retain(|(id, _)| !finished.contains(id));
        events
    }

    pub fn is_running(&self, id: SequenceId) -> bool {
        self.running.iter().any(|(running, _)| *running == id)
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_empty()
    }
}
