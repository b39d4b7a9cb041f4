use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum number of ready players (both teams together) before a round can go live.
pub const READY_QUORUM: usize = 2;
/// Consecutive PreGame -> Playing notifications the engine emits per real restart.
pub const RESTART_CONFIRMATIONS: u8 = 2;
/// Vertical offset applied to a spawn point when the map has no waypoints.
pub const SPAWN_NUDGE_HEIGHT: f32 = 3.0;
/// Orientation used with the spawn nudge: looking straight down.
pub const NUDGE_ROTATION: Rotation = Rotation::new(0.0, -90.0, 0.0);
/// Orientation of a parked freecam: looking at the sky.
pub const SKYWARD_ROTATION: Rotation = Rotation::new(0.0, 90.0, 0.0);
pub const DEFAULT_STREAMER_PREFIX: &str = "STREAM";

/// Engine-assigned player index. Negative ids denote the server itself in chat.
pub type PlayerId = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
}

impl Team {
    /// Maps an engine team index. Index 1 is the first team; anything else is
    /// treated as the second, matching how the engine reports players.
    pub fn from_index(index: i32) -> Self {
        if index == 1 {
            Team::A
        } else {
            Team::B
        }
    }

    pub fn index(&self) -> i32 {
        match self {
            Team::A => 1,
            Team::B => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(&self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn floor(&self) -> Vec3 {
        Vec3::new(self.x.floor(), self.y.floor(), self.z.floor())
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Rotation triple in the engine's own component order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Rotation {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Orientation as written down in waypoint tables.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Heading {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Heading {
    pub const fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    /// The engine expects `(roll, pitch, -yaw)` for a stored `(yaw, pitch, roll)`.
    pub fn to_engine(&self) -> Rotation {
        Rotation::new(self.roll, self.pitch, -self.yaw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Rotation,
}

impl Transform {
    pub fn new(position: Vec3, rotation: Rotation) -> Self {
        Self {
            position,
            rotation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    EndGame,
    PreGame,
    Paused,
    RestartServer,
    NotConnected,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Playing => "Playing",
            Self::EndGame => "EndGame",
            Self::PreGame => "PreGame",
            Self::Paused => "Paused",
            Self::RestartServer => "RestartServer",
            Self::NotConnected => "NotConnected",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "playing" => Ok(Self::Playing),
            "endgame" => Ok(Self::EndGame),
            "pregame" => Ok(Self::PreGame),
            "paused" => Ok(Self::Paused),
            "restartserver" => Ok(Self::RestartServer),
            "notconnected" => Ok(Self::NotConnected),
            other => Err(format!("unknown game status '{}'", other)),
        }
    }
}

/// Marker the engine prepends to messages from dead players.
pub const DEAD_PREFIX: &str = "*\u{a7}1DEAD\u{a7}0*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatChannel {
    Global,
    Team,
    Squad,
    Commander,
    ServerMessage,
}

impl ChatChannel {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Global | Self::ServerMessage => "",
            Self::Team => "HUD_TEXT_CHAT_TEAM",
            Self::Squad => "HUD_TEXT_CHAT_SQUAD",
            Self::Commander => "HUD_TEXT_CHAT_COMMANDER",
        }
    }

    /// Removes the channel marker and the dead marker, then surrounding whitespace.
    pub fn strip_prefix<'a>(&self, text: &'a str) -> &'a str {
        let text = text.strip_prefix(self.prefix()).unwrap_or(text);
        let text = text.trim_start();
        text.strip_prefix(DEAD_PREFIX).unwrap_or(text).trim()
    }
}
