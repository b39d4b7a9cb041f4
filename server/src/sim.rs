//! In-memory engine
//!
//! Stands in for the game server in the binary and in tests. Settings are
//! stored as raw strings and answered the way the remote console does, with
//! a trailing newline. Callbacks that a real server would emit after a
//! request (the status changes of a map restart) are queued and handed out
//! through [`Engine::next_event`].

use crate::engine::{ControlPoint, Engine, EngineError, PlayerInfo};
use crate::host::HostEvent;
use crate::script::ScriptCommand;
use crate::warmup::RESTART_COMMAND;
use log::{debug, info};
use rand::Rng;
use std::collections::{BTreeMap, HashSet, VecDeque};
use warmup_shared::{GameStatus, PlayerId, Rotation, Team, Transform, Vec3};

/// Spread applied around a team's base spawn point.
const SPAWN_JITTER: f32 = 4.0;

#[derive(Debug, Clone)]
struct SimPlayer {
    info: PlayerInfo,
    transform: Transform,
}

#[derive(Debug)]
pub struct SimEngine {
    map: String,
    team_names: (String, String),
    settings: BTreeMap<String, String>,
    failing_reads: HashSet<String>,
    players: BTreeMap<PlayerId, SimPlayer>,
    control_points: Vec<ControlPoint>,
    events: VecDeque<HostEvent>,
    rcon_log: Vec<String>,
    broadcasts: Vec<String>,
    position_writes: usize,
    fail_moves: bool,
}

impl SimEngine {
    /// A server on `map` with vehicles off, freecam allowed and the stock
    /// values of every setting the warmup overrides.
    pub fn new(map: &str) -> Self {
        let settings = [
            ("sv.noVehicles", "1"),
            ("sv.allowFreeCam", "1"),
            ("sv.spawnTime", "15"),
            ("sv.soldierFriendlyFire", "100"),
            ("sv.manDownTime", "15"),
            ("sv.timeBeforeRestartMap", "30"),
            ("sv.startDelay", "15"),
            ("sv.endDelay", "15"),
            ("sv.endOfRoundDelay", "15"),
            ("sv.ticketRatio", "100"),
            ("sv.timeLimit", "0"),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

        Self {
            map: map.to_string(),
            team_names: ("US".to_string(), "MEC".to_string()),
            settings,
            failing_reads: HashSet::new(),
            players: BTreeMap::new(),
            control_points: Vec::new(),
            events: VecDeque::new(),
            rcon_log: Vec::new(),
            broadcasts: Vec::new(),
            position_writes: 0,
            fail_moves: false,
        }
    }

    pub fn set_setting(&mut self, name: &str, value: &str) {
        self.settings.insert(name.to_string(), value.to_string());
    }

    pub fn setting(&self, name: &str) -> Option<&str> {
        self.settings.get(name).map(String::as_str)
    }

    /// Makes every later read of `name` fail.
    pub fn fail_reads_of(&mut self, name: &str) {
        self.failing_reads.insert(name.to_string());
    }

    /// Makes every later position and rotation write fail.
    pub fn fail_moves(&mut self, fail: bool) {
        self.fail_moves = fail;
    }

    /// Every remote-console command received, in order.
    pub fn rcon_log(&self) -> &[String] {
        &self.rcon_log
    }

    pub fn broadcasts(&self) -> &[String] {
        &self.broadcasts
    }

    pub fn clear_broadcasts(&mut self) {
        self.broadcasts.clear();
    }

    /// Successful position writes so far.
    pub fn position_writes(&self) -> usize {
        self.position_writes
    }

    pub fn set_map(&mut self, map: &str) {
        self.map = map.to_string();
    }

    pub fn set_team_names(&mut self, a: &str, b: &str) {
        self.team_names = (a.to_string(), b.to_string());
    }

    pub fn set_control_points(&mut self, points: Vec<ControlPoint>) {
        self.control_points = points;
    }

    /// Adds a connected player who has not spawned yet.
    pub fn add_player(&mut self, id: PlayerId, name: &str, team: Team) {
        let player = SimPlayer {
            info: PlayerInfo {
                id,
                name: name.to_string(),
                team,
                alive: false,
                connected: true,
            },
            transform: Transform::default(),
        };
        self.players.insert(id, player);
    }

    pub fn remove_player(&mut self, id: PlayerId) {
        self.players.remove(&id);
    }

    pub fn set_team(&mut self, id: PlayerId, team: Team) {
        if let Some(player) = self.players.get_mut(&id) {
            player.info.team = team;
        }
    }

    pub fn set_connected(&mut self, id: PlayerId, connected: bool) {
        if let Some(player) = self.players.get_mut(&id) {
            player.info.connected = connected;
        }
    }

    /// Moves a player without counting a write.
    pub fn place_player(&mut self, id: PlayerId, position: Vec3) {
        if let Some(player) = self.players.get_mut(&id) {
            player.transform.position = position;
        }
    }

    /// Brings a player to life near their team's base.
    pub fn spawn_player(&mut self, id: PlayerId) {
        let mut rng = rand::thread_rng();
        if let Some(player) = self.players.get_mut(&id) {
            let base = match player.info.team {
                Team::A => Vec3::new(-240.0, 156.0, 60.0),
                Team::B => Vec3::new(-130.0, 156.0, -30.0),
            };
            player.info.alive = true;
            player.transform = Transform::new(
                base.offset(Vec3::new(
                    rng.gen_range(-SPAWN_JITTER..SPAWN_JITTER),
                    0.0,
                    rng.gen_range(-SPAWN_JITTER..SPAWN_JITTER),
                )),
                Rotation::default(),
            );
        }
    }

    pub fn kill_player(&mut self, id: PlayerId) {
        if let Some(player) = self.players.get_mut(&id) {
            player.info.alive = false;
        }
    }

    pub fn push_event(&mut self, event: HostEvent) {
        self.events.push_back(event);
    }

    /// Queues the status callbacks of a map restart. The server reports the
    /// PreGame to Playing transition twice, and only the second is real.
    pub fn queue_restart(&mut self) {
        for _ in 0..2 {
            self.push_event(HostEvent::GameStatusChanged {
                status: GameStatus::PreGame,
            });
            self.push_event(HostEvent::GameStatusChanged {
                status: GameStatus::Playing,
            });
        }
    }

    /// Queues the callbacks of a server coming up with its first map.
    pub fn boot(&mut self) {
        info!("Simulated server starting on {}", self.map);
        self.queue_restart();
    }

    /// Applies one scripted change and queues the callback it causes.
    pub fn apply(&mut self, command: ScriptCommand) {
        debug!("Script {:?}", command);
        match command {
            ScriptCommand::Connect { id, team, name } => {
                self.add_player(id, &name, team);
                self.push_event(HostEvent::PlayerConnect { id });
            }
            ScriptCommand::Disconnect { id } => {
                self.remove_player(id);
                self.push_event(HostEvent::PlayerDisconnect { id });
            }
            ScriptCommand::Team { id, team } => {
                self.set_team(id, team);
                self.push_event(HostEvent::PlayerChangeTeam { id });
            }
            ScriptCommand::Chat { id, channel, text } => {
                self.push_event(HostEvent::ChatMessage {
                    id,
                    channel,
                    text: format!("{}{}", channel.prefix(), text),
                });
            }
            ScriptCommand::Spawn { id } => {
                self.spawn_player(id);
                self.push_event(HostEvent::PlayerSpawn { id });
            }
            ScriptCommand::Death { id } => {
                self.kill_player(id);
                self.push_event(HostEvent::PlayerDeath { id });
            }
            ScriptCommand::Status { status } => {
                self.push_event(HostEvent::GameStatusChanged { status });
            }
            ScriptCommand::Map { name } => {
                self.set_map(&name);
                self.queue_restart();
            }
            ScriptCommand::Restart => self.queue_restart(),
            ScriptCommand::Console { module, args } => {
                self.push_event(HostEvent::Console { module, args });
            }
        }
    }

    fn player_mut(&mut self, id: PlayerId) -> Result<&mut SimPlayer, EngineError> {
        self.players
            .get_mut(&id)
            .ok_or(EngineError::PlayerNotFound(id))
    }
}

impl Engine for SimEngine {
    fn players(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    fn player(&self, id: PlayerId) -> Result<PlayerInfo, EngineError> {
        self.players
            .get(&id)
            .map(|player| player.info.clone())
            .ok_or(EngineError::PlayerNotFound(id))
    }

    fn vehicle_transform(&self, id: PlayerId) -> Result<Transform, EngineError> {
        self.players
            .get(&id)
            .map(|player| player.transform)
            .ok_or(EngineError::PlayerNotFound(id))
    }

    fn set_vehicle_position(&mut self, id: PlayerId, position: Vec3) -> Result<(), EngineError> {
        let fail = self.fail_moves;
        let player = self.player_mut(id)?;
        if fail {
            return Err(EngineError::NoVehicle(id));
        }
        player.transform.position = position;
        self.position_writes += 1;
        Ok(())
    }

    fn set_vehicle_rotation(
        &mut self,
        id: PlayerId,
        rotation: Rotation,
    ) -> Result<(), EngineError> {
        let fail = self.fail_moves;
        let player = self.player_mut(id)?;
        if fail {
            return Err(EngineError::NoVehicle(id));
        }
        player.transform.rotation = rotation;
        Ok(())
    }

    fn rcon_invoke(&mut self, command: &str) -> Result<String, EngineError> {
        let command = command.trim();
        self.rcon_log.push(command.to_string());

        if command == RESTART_COMMAND {
            self.queue_restart();
            return Ok(String::new());
        }

        let failed = |reason: &str| EngineError::CommandFailed {
            command: command.to_string(),
            reason: reason.to_string(),
        };
        match command.split_once(char::is_whitespace) {
            Some((name, value)) => match self.settings.get_mut(name) {
                Some(slot) => {
                    *slot = value.trim().to_string();
                    Ok(String::new())
                }
                None => Err(failed("unknown setting")),
            },
            None if self.failing_reads.contains(command) => Err(failed("read refused")),
            None => self
                .settings
                .get(command)
                .map(|value| format!("{}\n", value))
                .ok_or_else(|| failed("unknown setting")),
        }
    }

    fn map_name(&self) -> Result<String, EngineError> {
        Ok(self.map.clone())
    }

    fn team_name(&self, team: Team) -> Result<String, EngineError> {
        Ok(match team {
            Team::A => self.team_names.0.clone(),
            Team::B => self.team_names.1.clone(),
        })
    }

    fn control_points(&self) -> Result<Vec<ControlPoint>, EngineError> {
        Ok(self.control_points.clone())
    }

    fn broadcast(&mut self, message: &str) {
        info!("[broadcast] {}", message);
        self.broadcasts.push(message.to_string());
    }

    fn next_event(&mut self) -> Option<HostEvent> {
        self.events.pop_front()
    }
}
