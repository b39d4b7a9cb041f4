//! Per-player readiness tracking
//!
//! This module keeps one record per connected player:
//! - Team membership as last reported by the engine
//! - Readiness (not ready, ready, or streaming and therefore exempt)
//! - Spawn count within the current round
//!
//! The registry is the only owner of player records. Team balance and quorum
//! are computed from it by [`ReadinessRegistry::tally`].

use log::info;
use std::collections::HashMap;
use thiserror::Error;
use warmup_shared::{PlayerId, Team};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("player {0} is not registered")]
    UnknownPlayer(PlayerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    NotReady,
    Ready,
    /// Exempt from readiness gating and camera correction
    Streaming,
}

impl Readiness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotReady => "NOT_READY",
            Self::Ready => "READY",
            Self::Streaming => "STREAM",
        }
    }
}

/// State of one connected player
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub team: Team,
    pub name: String,
    pub readiness: Readiness,
    /// Spawns since the start of the current round
    pub spawn_count: u32,
}

impl PlayerRecord {
    pub fn new(id: PlayerId, team: Team, name: String) -> Self {
        Self {
            id,
            team,
            name,
            readiness: Readiness::NotReady,
            spawn_count: 0,
        }
    }
}

/// Ready/not-ready head counts for one team, streamers excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamTally {
    pub ready: usize,
    pub not_ready: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub team_a: TeamTally,
    pub team_b: TeamTally,
}

impl Tally {
    pub fn team(&self, team: Team) -> &TeamTally {
        match team {
            Team::A => &self.team_a,
            Team::B => &self.team_b,
        }
    }

    fn team_mut(&mut self, team: Team) -> &mut TeamTally {
        match team {
            Team::A => &mut self.team_a,
            Team::B => &mut self.team_b,
        }
    }

    /// True when nobody is unready, at least `quorum` players are ready and
    /// both teams have the same number of ready players.
    pub fn can_go_live(&self, quorum: usize) -> bool {
        if self.team_a.not_ready > 0 || self.team_b.not_ready > 0 {
            return false;
        }
        if self.team_a.ready + self.team_b.ready < quorum {
            return false;
        }
        self.team_a.ready == self.team_b.ready
    }
}

/// Player names grouped the way the status report lists them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    pub team_a_ready: Vec<String>,
    pub team_a_not_ready: Vec<String>,
    pub team_b_ready: Vec<String>,
    pub team_b_not_ready: Vec<String>,
    pub streaming: Vec<String>,
}

/// Maps connected player ids to their readiness records
#[derive(Debug, Clone)]
pub struct ReadinessRegistry {
    players: HashMap<PlayerId, PlayerRecord>,
    streamer_prefix: String,
}

impl ReadinessRegistry {
    pub fn new(streamer_prefix: impl Into<String>) -> Self {
        Self {
            players: HashMap::new(),
            streamer_prefix: streamer_prefix.into(),
        }
    }

    /// Registers a player. Names carrying the streamer prefix start as
    /// streaming. A repeated connect for the same id replaces the record.
    pub fn on_connect(&mut self, id: PlayerId, team: Team, name: &str) -> &PlayerRecord {
        let mut record = PlayerRecord::new(id, team, name.to_string());
        if name.starts_with(&self.streamer_prefix) {
            record.readiness = Readiness::Streaming;
        }
        info!(
            "Player {} '{}' registered on team {:?} as {}",
            id,
            name,
            team,
            record.readiness.as_str()
        );
        self.players.insert(id, record);
        &self.players[&id]
    }

    /// Returns true if the player was registered.
    pub fn on_disconnect(&mut self, id: PlayerId) -> bool {
        if let Some(record) = self.players.remove(&id) {
            info!("Player {} '{}' unregistered", id, record.name);
            true
        } else {
            false
        }
    }

    /// Returns true if the team actually changed.
    pub fn set_team(&mut self, id: PlayerId, team: Team) -> Result<bool, RegistryError> {
        let record = self.get_mut(id)?;
        let changed = record.team != team;
        record.team = team;
        Ok(changed)
    }

    pub fn set_readiness(&mut self, id: PlayerId, readiness: Readiness) -> Result<(), RegistryError> {
        self.get_mut(id)?.readiness = readiness;
        Ok(())
    }

    /// Returns the spawn count after the increment.
    pub fn increment_spawn(&mut self, id: PlayerId) -> Result<u32, RegistryError> {
        let record = self.get_mut(id)?;
        record.spawn_count += 1;
        Ok(record.spawn_count)
    }

    /// Zeroes every spawn count. With `clear_readiness`, ready players become
    /// not ready again. Streaming players keep their readiness either way.
    pub fn reset_round(&mut self, clear_readiness: bool) {
        for record in self.players.values_mut() {
            record.spawn_count = 0;
            if clear_readiness && record.readiness == Readiness::Ready {
                record.readiness = Readiness::NotReady;
            }
        }
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.players.get(&id)
    }

    fn get_mut(&mut self, id: PlayerId) -> Result<&mut PlayerRecord, RegistryError> {
        self.players
            .get_mut(&id)
            .ok_or(RegistryError::UnknownPlayer(id))
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    pub fn ids(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self.players.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        for record in self.players.values() {
            match record.readiness {
                Readiness::Streaming => continue,
                Readiness::Ready => tally.team_mut(record.team).ready += 1,
                Readiness::NotReady => tally.team_mut(record.team).not_ready += 1,
            }
        }
        tally
    }

    /// Groups names for the status report, ordered by player id.
    pub fn roster(&self) -> Roster {
        let mut roster = Roster::default();
        for id in self.ids() {
            let record = &self.players[&id];
            let name = record.name.clone();
            match (record.readiness, record.team) {
                (Readiness::Streaming, _) => roster.streaming.push(name),
                (Readiness::Ready, Team::A) => roster.team_a_ready.push(name),
                (Readiness::NotReady, Team::A) => roster.team_a_not_ready.push(name),
                (Readiness::Ready, Team::B) => roster.team_b_ready.push(name),
                (Readiness::NotReady, Team::B) => roster.team_b_not_ready.push(name),
            }
        }
        roster
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
