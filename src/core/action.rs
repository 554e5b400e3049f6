//! Player actions evaluated by the odds engine.
//!
//! A round offers the player four candidate actions. Each maps to one
//! outcome distribution in `OddsEngine::distribution_for_action`:
//! - `Stay`: keep the current total, the opponent plays out its stance
//! - `Hit`: draw one card uniformly from the remaining deck, then stay
//! - `ForceDraw`: a compelled single draw (Curse, a random-draw trump);
//!   same draw math as `Hit`, reported separately so callers can weigh a
//!   forced draw they cannot decline
//! - `IntentionalBust`: draw aiming past the target, conditioned on busting

use serde::{Deserialize, Serialize};

/// A candidate player action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    /// Keep the current total.
    Stay,
    /// Draw one card voluntarily.
    Hit,
    /// Draw one card because an effect compels it.
    ForceDraw,
    /// Draw a card that busts, relying on the both-bust rule.
    IntentionalBust,
}

impl Action {
    /// Every action, in evaluation order.
    pub const ALL: [Action; 4] = [
        Action::Stay,
        Action::Hit,
        Action::ForceDraw,
        Action::IntentionalBust,
    ];

    /// Does this action draw a card for the player?
    #[must_use]
    pub const fn draws(self) -> bool {
        !matches!(self, Action::Stay)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Action::Stay => "STAY",
            Action::Hit => "HIT",
            Action::ForceDraw => "FORCE_DRAW",
            Action::IntentionalBust => "INTENTIONAL_BUST",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_stay_keeps_hand() {
        let drawing: Vec<_> = Action::ALL.iter().filter(|a| a.draws()).collect();
        assert_eq!(drawing.len(), 3);
        assert!(!Action::Stay.draws());
    }

    #[test]
    fn test_display() {
        assert_eq!(Action::IntentionalBust.to_string(), "INTENTIONAL_BUST");
        assert_eq!(Action::Hit.to_string(), "HIT");
    }
}
