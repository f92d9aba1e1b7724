use crate::menu::slot::{RotateDirection, SlotId};
use crate::menu::MIN_ITEMS;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmenuTransition {
    Opening(SlotId),
    Closing(SlotId),
    /// The submenu of `from` fades out, then the one of `to` fades in.
    Switching { from: SlotId, to: SlotId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MenuState {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
    Rotating(RotateDirection),
    SubmenuOpen(SlotId),
    SubmenuTransition(SubmenuTransition),
}

impl MenuState {
    /// Whether a composite sequence is running.
    pub fn is_transitioning(&self) -> bool {
        matches!(
            self,
            Self::Opening | Self::Closing | Self::Rotating(_) | Self::SubmenuTransition(_)
        )
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed | Self::Opening | Self::Closing)
    }

    pub fn submenu_owner(&self) -> Option<SlotId> {
        match self {
            Self::SubmenuOpen(owner) => Some(*owner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Open,
    Close,
    Rotate(RotateDirection),
    /// Tap on a ring slot whose item may own a submenu.
    ToggleSubmenu(SlotId),
    CloseSubmenu,
}

/// What [`MenuState::plan`] needs to know about the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlanContext {
    pub item_count: usize,
    /// Whether the item behind the slot of a [`Request::ToggleSubmenu`] has children.
    pub has_children: bool,
}

/// A legal transition, ready to be turned into a composite sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Open,
    /// Closes the menu, fading out `submenu` at the same time when one is open.
    Close { submenu: Option<SlotId> },
    Rotate(RotateDirection),
    OpenSubmenu(SlotId),
    CloseSubmenu(SlotId),
    SwitchSubmenu { from: SlotId, to: SlotId },
}

impl Plan {
    /// State held while the plan's sequence runs.
    pub fn in_flight(&self) -> MenuState {
        match *self {
            Self::Open => MenuState::Opening,
            Self::Close { .. } => MenuState::Closing,
            Self::Rotate(direction) => MenuState::Rotating(direction),
            Self::OpenSubmenu(slot) => MenuState::SubmenuTransition(SubmenuTransition::Opening(slot)),
            Self::CloseSubmenu(slot) => MenuState::SubmenuTransition(SubmenuTransition::Closing(slot)),
            Self::SwitchSubmenu { from, to } => {
                MenuState::SubmenuTransition(SubmenuTransition::Switching { from, to })
            }
        }
    }

    /// State committed once the sequence completes.
    pub fn settled(&self) -> MenuState {
        match *self {
            Self::Open | Self::Rotate(_) | Self::CloseSubmenu(_) => MenuState::Open,
            Self::Close { .. } => MenuState::Closed,
            Self::OpenSubmenu(slot) | Self::SwitchSubmenu { to: slot, .. } => {
                MenuState::SubmenuOpen(slot)
            }
        }
    }
}

/// Reason a request was dropped without doing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Rejection {
    AlreadyOpen,
    AlreadyClosed,
    Busy,
    NotOpen,
    TooFewItems,
    SubmenuOpen,
    NoChildren,
    NoSubmenu,
    InputDisabled,
    NoItem,
    PolicyIgnores,
    NoSubmenuButton,
}

impl MenuState {
    pub fn plan(self, request: Request, context: PlanContext) -> Result<Plan, Rejection> {
        use MenuState::*;

        match (self, request) {
            (Open | Opening | SubmenuOpen(_), Request::Open) => Err(Rejection::AlreadyOpen),
            (Closed | Closing, Request::Close) => Err(Rejection::AlreadyClosed),

            (Closed, Request::Open) => Ok(Plan::Open),
            (Closed, Request::CloseSubmenu) => Err(Rejection::NoSubmenu),
            (Closed, _) => Err(Rejection::NotOpen),

            (Open, Request::Close) => Ok(Plan::Close { submenu: None }),
            (Open, Request::Rotate(_)) if context.item_count <= MIN_ITEMS => {
                Err(Rejection::TooFewItems)
            }
            (Open, Request::Rotate(direction)) => Ok(Plan::Rotate(direction)),
            (Open, Request::ToggleSubmenu(slot)) if context.has_children => {
                Ok(Plan::OpenSubmenu(slot))
            }
            (Open, Request::ToggleSubmenu(_)) => Err(Rejection::NoChildren),
            (Open, Request::CloseSubmenu) => Err(Rejection::NoSubmenu),

            (SubmenuOpen(owner), Request::Close) => Ok(Plan::Close {
                submenu: Some(owner),
            }),
            (SubmenuOpen(_), Request::Rotate(_)) => Err(Rejection::SubmenuOpen),
            (SubmenuOpen(owner), Request::ToggleSubmenu(slot)) if slot == owner => {
                Ok(Plan::CloseSubmenu(owner))
            }
            (SubmenuOpen(owner), Request::ToggleSubmenu(slot)) if context.has_children => {
                Ok(Plan::SwitchSubmenu {
                    from: owner,
                    to: slot,
                })
            }
            (SubmenuOpen(_), Request::ToggleSubmenu(_)) => Err(Rejection::NoChildren),
            (SubmenuOpen(owner), Request::CloseSubmenu) => Ok(Plan::CloseSubmenu(owner)),

            (Opening | Closing | Rotating(_) | SubmenuTransition(_), _) => Err(Rejection::Busy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(item_count: usize, has_children: bool) -> PlanContext {
        PlanContext {
            item_count,
            has_children,
        }
    }

    fn slot(i: usize) -> SlotId {
        SlotId::new(i)
    }

    #[test]
    fn test_open_close_cycle() {
        let plan = MenuState::Closed.plan(Request::Open, ctx(5, false)).unwrap();
        assert_eq!(plan.in_flight(), MenuState::Opening);
        assert_eq!(plan.settled(), MenuState::Open);

        let plan = MenuState::Open.plan(Request::Close, ctx(5, false)).unwrap();
        assert_eq!(plan, Plan::Close { submenu: None });
        assert_eq!(plan.settled(), MenuState::Closed);
    }

    #[test]
    fn test_redundant_requests_are_noops() {
        let c = ctx(5, false);
        assert_eq!(MenuState::Open.plan(Request::Open, c), Err(Rejection::AlreadyOpen));
        assert_eq!(MenuState::Opening.plan(Request::Open, c), Err(Rejection::AlreadyOpen));
        assert_eq!(MenuState::Closed.plan(Request::Close, c), Err(Rejection::AlreadyClosed));
        assert_eq!(MenuState::Closing.plan(Request::Close, c), Err(Rejection::AlreadyClosed));
    }

    #[test]
    fn test_requests_in_flight_are_busy() {
        let c = ctx(5, true);
        for state in [
            MenuState::Opening,
            MenuState::Closing,
            MenuState::Rotating(RotateDirection::Left),
            MenuState::SubmenuTransition(SubmenuTransition::Opening(slot(1))),
        ] {
            assert_eq!(
                state.plan(Request::ToggleSubmenu(slot(2)), c),
                Err(Rejection::Busy),
                "{state:?}"
            );
            assert_eq!(
                state.plan(Request::Rotate(RotateDirection::Right), c),
                Err(Rejection::Busy)
            );
        }
    }

    #[test]
    fn test_rotation_preconditions() {
        let right = Request::Rotate(RotateDirection::Right);
        assert_eq!(MenuState::Open.plan(right, ctx(3, false)), Err(Rejection::TooFewItems));
        assert_eq!(MenuState::Closed.plan(right, ctx(6, false)), Err(Rejection::NotOpen));
        assert_eq!(
            MenuState::SubmenuOpen(slot(2)).plan(right, ctx(6, false)),
            Err(Rejection::SubmenuOpen)
        );
        let plan = MenuState::Open.plan(right, ctx(4, false)).unwrap();
        assert_eq!(plan.in_flight(), MenuState::Rotating(RotateDirection::Right));
        assert_eq!(plan.settled(), MenuState::Open);
    }

    #[test]
    fn test_submenu_toggle_and_switch() {
        let open = MenuState::Open
            .plan(Request::ToggleSubmenu(slot(2)), ctx(5, true))
            .unwrap();
        assert_eq!(open.settled(), MenuState::SubmenuOpen(slot(2)));

        let toggle = MenuState::SubmenuOpen(slot(2))
            .plan(Request::ToggleSubmenu(slot(2)), ctx(5, true))
            .unwrap();
        assert_eq!(toggle, Plan::CloseSubmenu(slot(2)));
        assert_eq!(toggle.settled(), MenuState::Open);

        let switch = MenuState::SubmenuOpen(slot(2))
            .plan(Request::ToggleSubmenu(slot(3)), ctx(5, true))
            .unwrap();
        assert_eq!(
            switch,
            Plan::SwitchSubmenu {
                from: slot(2),
                to: slot(3)
            }
        );
        assert_eq!(switch.settled(), MenuState::SubmenuOpen(slot(3)));

        assert_eq!(
            MenuState::Open.plan(Request::ToggleSubmenu(slot(1)), ctx(5, false)),
            Err(Rejection::NoChildren)
        );
    }

    #[test]
    fn test_close_takes_submenu_along() {
        let plan = MenuState::SubmenuOpen(slot(1))
            .plan(Request::Close, ctx(5, true))
            .unwrap();
        assert_eq!(
            plan,
            Plan::Close {
                submenu: Some(slot(1))
            }
        );
        assert_eq!(plan.settled(), MenuState::Closed);
    }
}
