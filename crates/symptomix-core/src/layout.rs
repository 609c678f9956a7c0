//! View layout state.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Layout of the chat view.
///
/// Starts `Centered` (empty, nothing submitted yet) and moves to `Active` on
/// the first non-empty submission. There is no way back.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LayoutState {
    #[default]
    Centered,
    Active,
}

impl LayoutState {
    /// Moves to `Active`. Returns true only when this call made the transition.
    pub fn activate(&mut self) -> bool {
        let changed = *self == Self::Centered;
        *self = Self::Active;
        changed
    }

    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}
