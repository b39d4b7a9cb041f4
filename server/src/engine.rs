//! Adapter boundary between the controller and the game engine
//!
//! Everything the controller needs from the host engine goes through the
//! [`Engine`] trait. Every call returns an explicit `Result` so callers can
//! log a failure once and treat it as a no-op for that unit of work.

use crate::host::HostEvent;
use thiserror::Error;
use warmup_shared::{PlayerId, Rotation, Team, Transform, Vec3};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("player {0} has no vehicle")]
    NoVehicle(PlayerId),

    #[error("console command '{command}' failed: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("engine unavailable: {0}")]
    Unavailable(String),
}

/// Snapshot of the engine-side view of one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub team: Team,
    pub alive: bool,
    pub connected: bool,
}

/// A capturable objective. `team` is `None` while the point is neutral.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPoint {
    pub position: Vec3,
    pub team: Option<Team>,
}

pub trait Engine {
    /// Ids of every player the engine knows, connected or not.
    fn players(&self) -> Vec<PlayerId>;

    fn player(&self, id: PlayerId) -> Result<PlayerInfo, EngineError>;

    /// Position and rotation of the vehicle (or soldier/camera) the player controls.
    fn vehicle_transform(&self, id: PlayerId) -> Result<Transform, EngineError>;

    fn set_vehicle_position(&mut self, id: PlayerId, position: Vec3) -> Result<(), EngineError>;

    fn set_vehicle_rotation(&mut self, id: PlayerId, rotation: Rotation)
        -> Result<(), EngineError>;

    /// Runs a remote-console command (`"<name>"` reads, `"<name> <value>"` writes)
    /// and returns the raw response.
    fn rcon_invoke(&mut self, command: &str) -> Result<String, EngineError>;

    fn map_name(&self) -> Result<String, EngineError>;

    fn team_name(&self, team: Team) -> Result<String, EngineError>;

    fn control_points(&self) -> Result<Vec<ControlPoint>, EngineError>;

    /// Sends a message to every player.
    fn broadcast(&mut self, message: &str);

    /// Callbacks the engine produced as a consequence of earlier requests,
    /// for example the status changes following a map restart.
    fn next_event(&mut self) -> Option<HostEvent> {
        None
    }
}
