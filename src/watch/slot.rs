//! Per-kind rebuild coalescing.
//!
//! ```text
//!   Idle ──change──▶ Building ──change──▶ BuildingDirty ◀─┐
//!    ▲                  │                    │   └change──┘
//!    └────done──────────┘◀───done (rerun)────┘
//! ```
//!
//! Changes that arrive while a build runs collapse into exactly one
//! follow-up build, however many there were.

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Idle,
    Building,
    BuildingDirty,
}

/// Rebuild state of one asset kind.
#[derive(Debug)]
pub struct RebuildSlot {
    state: Mutex<SlotState>,
}

impl Default for RebuildSlot {
    fn default() -> Self {
        Self {
            state: Mutex::new(SlotState::Idle),
        }
    }
}

impl RebuildSlot {
    #[cfg(test)]
    pub fn state(&self) -> SlotState {
        *self.state.lock()
    }

    /// A change arrived. Returns `true` when the caller must start a build.
    pub fn request(&self) -> bool {
        let mut state = self.state.lock();
        match *state {
            SlotState::Idle => {
                *state = SlotState::Building;
                true
            }
            SlotState::Building | SlotState::BuildingDirty => {
                *state = SlotState::BuildingDirty;
                false
            }
        }
    }

    /// The running build finished, successfully or not. Returns `true`
    /// when the caller must run one more build.
    pub fn finish(&self) -> bool {
        let mut state = self.state.lock();
        match *state {
            SlotState::BuildingDirty => {
                *state = SlotState::Building;
                true
            }
            SlotState::Building | SlotState::Idle => {
                *state = SlotState::Idle;
                false
            }
        }
    }
}
