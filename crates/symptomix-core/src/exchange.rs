//! Per-submission state machine.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::error::Result;
use crate::message::Reply;

/// State of one submission.
///
/// `Idle → Pending → Rendered | ErrorRendered`. Both terminal states are
/// absorbing; a new submission starts its own machine at `Idle`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ExchangeState {
    #[default]
    Idle,
    Pending,
    Rendered,
    ErrorRendered,
}

impl ExchangeState {
    /// Request sent, placeholder shown.
    pub fn send(self) -> Self {
        match self {
            Self::Idle => Self::Pending,
            other => other,
        }
    }

    /// Backend outcome arrived.
    ///
    /// Only `Pending` reacts; every other state is left untouched.
    pub fn complete(self, outcome: &Result<Reply>) -> Self {
        match (self, outcome) {
            (Self::Pending, Ok(_)) => Self::Rendered,
            (Self::Pending, Err(_)) => Self::ErrorRendered,
            (other, _) => other,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rendered | Self::ErrorRendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SymptomixError;

    #[test]
    fn test_happy_path() {
        let state = ExchangeState::default().send();
        assert_eq!(state, ExchangeState::Pending);
        let state = state.complete(&Ok(Reply::new("ok")));
        assert_eq!(state, ExchangeState::Rendered);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_failure_path() {
        let state = ExchangeState::Idle
            .send()
            .complete(&Err(SymptomixError::transport("refused")));
        assert_eq!(state, ExchangeState::ErrorRendered);
    }

    #[test]
    fn test_terminal_states_are_absorbing() {
        let rendered = ExchangeState::Rendered;
        assert_eq!(rendered.send(), rendered);
        assert_eq!(
            rendered.complete(&Err(SymptomixError::Cancelled)),
            rendered
        );

        let failed = ExchangeState::ErrorRendered;
        assert_eq!(failed.complete(&Ok(Reply::new("late"))), failed);
    }

    #[test]
    fn test_idle_ignores_completion() {
        assert_eq!(
            ExchangeState::Idle.complete(&Ok(Reply::new("x"))),
            ExchangeState::Idle
        );
        assert_eq!(ExchangeState::ErrorRendered.to_string(), "error-rendered");
    }
}
