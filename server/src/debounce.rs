//! Filtering of the engine's duplicated status notifications
//!
//! After a map load the engine announces PreGame -> Playing once too early
//! and then again for real. The counter below steps on every such pair and
//! only the second one of a cycle counts as a confirmed restart.

use warmup_shared::{GameStatus, RESTART_CONFIRMATIONS};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestartDebouncer {
    count: u8,
}

impl RestartDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    /// Records a status change. The counter cycles back to 1 instead of
    /// growing past the threshold.
    pub fn observe(&mut self, previous: GameStatus, current: GameStatus) {
        if previous == GameStatus::PreGame && current == GameStatus::Playing {
            if self.count >= RESTART_CONFIRMATIONS {
                self.count = 1;
            } else {
                self.count += 1;
            }
        }
    }

    /// Whether a Playing notification should be acted upon right now.
    pub fn is_confirmed(&self) -> bool {
        self.count == RESTART_CONFIRMATIONS
    }
}
