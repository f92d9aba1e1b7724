use crate::step::Step;
use std::time::Duration;

/// Declarative animation tree.
///
/// `E` is the completion effect type: a [`Sequence::Tagged`] node hands its effect back to
/// the caller once everything below it has completed.
#[derive(Debug, Clone)]
pub enum Sequence<K, E> {
    Step(Step<K>),
    /// Children run one after another, each starting when the previous one completed.
    Then(Vec<Sequence<K, E>>),
    /// Children start together; the node completes when the last child does.
    Join(Vec<Sequence<K, E>>),
    Tagged(Box<Sequence<K, E>>, E),
}

impl<K, E> Sequence<K, E> {
    pub fn step(step: Step<K>) -> Self {
        Self::Step(step)
    }

    pub fn then(children: impl IntoIterator<Item = Sequence<K, E>>) -> Self {
        Self::Then(children.into_iter().collect())
    }

    pub fn join(children: impl IntoIterator<Item = Sequence<K, E>>) -> Self {
        Self::Join(children.into_iter().collect())
    }

    /// Completes as soon as it is reached.
    pub fn empty() -> Self {
        Self::Join(Vec::new())
    }

    /// Emits `effect` as soon as it is reached.
    pub fn signal(effect: E) -> Self {
        Self::empty().on_complete(effect)
    }

    /// Fan-out where step `i` starts `stagger * i` after the first.
    pub fn cascade(steps: impl IntoIterator<Item = Step<K>>, stagger: Duration) -> Self {
        Self::Join(
            steps
                .into_iter()
                .enumerate()
                .map(|(i, step)| {
                    let delay = step.delay + stagger * i as u32;
                    Self::Step(step.delayed(delay))
                })
                .collect(),
        )
    }

    pub fn on_complete(self, effect: E) -> Self {
        Self::Tagged(Box::new(self), effect)
    }

    pub fn and_then(self, next: Sequence<K, E>) -> Self {
        match self {
            Self::Then(mut children) => {
                children.push(next);
                Self::Then(children)
            }
            other => Self::Then(vec![other, next]),
        }
    }

    /// Nominal running time, assuming nothing waits on anything outside the tree.
    pub fn duration(&self) -> Duration {
        match self {
            Self::Step(step) => step.total(),
            Self::Then(children) => children.iter().map(Self::duration).sum(),
            Self::Join(children) => children
                .iter()
                .map(Self::duration)
                .max()
                .unwrap_or_default(),
            Self::Tagged(inner, _) => inner.duration(),
        }
    }

    pub fn step_count(&self) -> usize {
        match self {
            Self::Step(_) => 1,
            Self::Then(children) | Self::Join(children) => {
                children.iter().map(Self::step_count).sum()
            }
            Self::Tagged(inner, _) => inner.step_count(),
        }
    }
}
