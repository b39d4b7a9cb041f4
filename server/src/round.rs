//! Round state machine
//!
//! ```text
//!  Unknown ──▶ PendingWarmup ──▶ Warmup ──▶ PendingLive ──▶ Live ──▶ WasLive
//!                   ▲                                        │          │
//!                   └────────────────────────────────────────┴──────────┘
//! ```
//!
//! The pending states mean a restart has been requested and the engine has
//! not yet confirmed it. Only a debounced Playing notification moves a
//! pending state to its stable counterpart.

use crate::debounce::RestartDebouncer;
use log::info;
use std::fmt;
use warmup_shared::GameStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundState {
    #[default]
    Unknown,
    PendingWarmup,
    Warmup,
    PendingLive,
    /// A live round that has ended but whose map has not restarted yet
    WasLive,
    Live,
}

impl RoundState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::PendingWarmup => "NEXT_WARMUP",
            Self::Warmup => "WARMUP",
            Self::PendingLive => "NEXT_LIVE",
            Self::WasLive => "PREVIOUS_LIVE",
            Self::Live => "LIVE",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::PendingWarmup | Self::PendingLive)
    }
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the controller must do after a confirmed Playing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundAction {
    None,
    /// Snapshot and override settings, request a restart, then `begin_warmup`.
    EnterWarmup,
    /// Broadcast the message; the state has already advanced.
    Announce(&'static str),
}

pub const WARMUP_ANNOUNCEMENT: &str = "WARMUP";
pub const LIVE_ANNOUNCEMENT: &str = "LIVE GL&HF";

#[derive(Debug, Clone, Default)]
pub struct RoundMachine {
    state: RoundState,
    debouncer: RestartDebouncer,
}

impl RoundMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn debouncer(&self) -> &RestartDebouncer {
        &self.debouncer
    }

    pub fn observe_status(&mut self, previous: GameStatus, current: GameStatus) {
        self.debouncer.observe(previous, current);
    }

    pub fn restart_confirmed(&self) -> bool {
        self.debouncer.is_confirmed()
    }

    /// Advances the machine on a confirmed Playing notification.
    pub fn on_playing(&mut self) -> RoundAction {
        match self.state {
            RoundState::PendingWarmup => {
                self.transition(RoundState::Warmup);
                RoundAction::Announce(WARMUP_ANNOUNCEMENT)
            }
            RoundState::PendingLive => {
                self.transition(RoundState::Live);
                RoundAction::Announce(LIVE_ANNOUNCEMENT)
            }
            RoundState::Unknown | RoundState::Live | RoundState::WasLive => {
                RoundAction::EnterWarmup
            }
            RoundState::Warmup => RoundAction::None,
        }
    }

    /// A live round reached its end screen.
    pub fn on_round_end(&mut self) {
        if self.state == RoundState::Live {
            self.transition(RoundState::WasLive);
        }
    }

    pub fn begin_warmup(&mut self) {
        self.transition(RoundState::PendingWarmup);
    }

    pub fn begin_live(&mut self) {
        self.transition(RoundState::PendingLive);
    }

    fn transition(&mut self, next: RoundState) {
        info!("Round state {} -> {}", self.state, next);
        self.state = next;
    }
}
