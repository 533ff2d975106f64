#![forbid(unsafe_code)]

//! Per-panel visibility state machine.
//!
//! Panels move through `Hidden → Showing → Shown → Hiding → Hidden` and
//! never skip a phase. The transiting phases (`Showing`, `Hiding`) double as
//! an advisory lock: every navigation entry point checks them before
//! touching the panel.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Visibility phase of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum PanelState {
    /// Inactive and not on screen.
    #[default]
    Hidden,
    /// Show transition in progress.
    Showing,
    /// Fully visible and interactive.
    Shown,
    /// Hide transition in progress.
    Hiding,
}

/// Direction of a visual transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum TransitionDirection {
    Show,
    Hide,
}

impl PanelState {
    /// `Shown` or `Showing`.
    #[inline]
    #[must_use]
    pub const fn is_displayed(self) -> bool {
        matches!(self, Self::Shown | Self::Showing)
    }

    /// `Showing` or `Hiding`.
    #[inline]
    #[must_use]
    pub const fn is_transiting(self) -> bool {
        matches!(self, Self::Showing | Self::Hiding)
    }

    /// Whether a transition in `direction` may start from this state.
    ///
    /// Shows start only from `Hidden`, hides only from `Shown`.
    #[inline]
    #[must_use]
    pub const fn can_begin(self, direction: TransitionDirection) -> bool {
        match direction {
            TransitionDirection::Show => matches!(self, Self::Hidden),
            TransitionDirection::Hide => matches!(self, Self::Shown),
        }
    }

    /// The state that follows this one in the cycle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Hidden => Self::Showing,
            Self::Showing => Self::Shown,
            Self::Shown => Self::Hiding,
            Self::Hiding => Self::Hidden,
        }
    }

    /// The direction this state is transiting in, if any.
    #[must_use]
    pub const fn direction(self) -> Option<TransitionDirection> {
        match self {
            Self::Showing => Some(TransitionDirection::Show),
            Self::Hiding => Some(TransitionDirection::Hide),
            Self::Hidden | Self::Shown => None,
        }
    }
}

impl fmt::Display for PanelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hidden => "hidden",
            Self::Showing => "showing",
            Self::Shown => "shown",
            Self::Hiding => "hiding",
        };
        f.write_str(name)
    }
}

impl fmt::Display for TransitionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Show => f.write_str("show"),
            Self::Hide => f.write_str("hide"),
        }
    }
}
