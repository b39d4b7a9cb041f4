//! Warmup controller
//!
//! Ties the registry, round machine, settings manager and spawn relocator
//! to engine callbacks. All state lives in one [`WarmupModule`] value owned
//! by the host; handlers run to completion one at a time.

use crate::commands::{exec_subcommand, parse_enable, ChatCommand, ConsoleContext, Handler, Subcommand};
use crate::config::WarmupConfig;
use crate::engine::Engine;
use crate::host::{HostEvent, StatusTracker};
use crate::module::{HostModule, ModuleState, TimerSchedule};
use crate::registry::{Readiness, ReadinessRegistry, RegistryError};
use crate::report::compose_report;
use crate::round::{RoundAction, RoundMachine, RoundState};
use crate::settings::SettingsManager;
use crate::spawn::SpawnRelocator;
use log::{debug, error, info, warn};
use warmup_shared::{ChatChannel, GameStatus, PlayerId, Rotation, Team, READY_QUORUM};

pub const DESCRIPTION: &str = "Warmup";
pub const RESTART_COMMAND: &str = "admin.restartMap";
/// Setting that is 0 when the server runs with vehicles.
pub const NO_VEHICLES_SETTING: &str = "sv.noVehicles";
const FALLBACK_NAME: &str = "UnknownPlayer";
/// Orientation applied by `/set_pos`, for checking the engine's axis order.
const PROBE_ROTATION: Rotation = Rotation::new(30.0, 90.0, 10.0);

const COMMANDS: &[(Subcommand, Handler<WarmupModule>)] = &[(Subcommand::Enable, WarmupModule::cmd_enable)];

pub struct WarmupModule {
    state: ModuleState,
    enabled: bool,
    schedule: TimerSchedule,
    registry: ReadinessRegistry,
    round: RoundMachine,
    settings: SettingsManager,
    relocator: SpawnRelocator,
    current_map: String,
    team_names: (String, String),
}

impl WarmupModule {
    pub fn new(config: &WarmupConfig) -> Self {
        Self {
            state: ModuleState::Loaded,
            enabled: true,
            schedule: TimerSchedule {
                initial_delay: config.initial_delay(),
                interval: config.sample_interval(),
            },
            registry: ReadinessRegistry::new(config.streamer_prefix.clone()),
            round: RoundMachine::new(),
            settings: SettingsManager::new(config.changed_variables.clone()),
            relocator: SpawnRelocator::new(config.waypoints.clone()),
            current_map: String::new(),
            team_names: ("US".to_string(), "MEC".to_string()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn round_state(&self) -> RoundState {
        self.round.state()
    }

    pub fn registry(&self) -> &ReadinessRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &SettingsManager {
        &self.settings
    }

    pub fn restart_count(&self) -> u8 {
        self.round.debouncer().count()
    }

    pub fn team_names(&self) -> (&str, &str) {
        (&self.team_names.0, &self.team_names.1)
    }

    fn cmd_enable(&mut self, ctx: &mut ConsoleContext, args: &str) {
        match parse_enable(args) {
            Ok(value) => {
                self.enabled = value != 0;
                ctx.write(&format!("{} set to enabled? {}\n", DESCRIPTION, value));
            }
            Err(e) => ctx.write(&format!("Error: {}\n", e)),
        }
    }

    /// The server runs warmup only without vehicles; a vehicle test server
    /// keeps the module off for the whole process.
    fn vehicles_disabled(&mut self, engine: &mut dyn Engine) -> bool {
        match engine.rcon_invoke(NO_VEHICLES_SETTING) {
            Ok(raw) => match raw.trim().parse::<i64>() {
                Ok(no_vehicles) => {
                    info!("NoVehicles? {}", no_vehicles);
                    no_vehicles != 0
                }
                Err(_) => {
                    error!("Unexpected {} value '{}'", NO_VEHICLES_SETTING, raw.trim());
                    false
                }
            },
            Err(e) => {
                error!("Failed to read {}: {}", NO_VEHICLES_SETTING, e);
                false
            }
        }
    }

    fn on_connect(&mut self, engine: &mut dyn Engine, id: PlayerId) {
        let (name, team) = match engine.player(id) {
            Ok(info) => (info.name, info.team),
            Err(e) => {
                warn!("Player {} connected but engine lookup failed: {}", id, e);
                (FALLBACK_NAME.to_string(), Team::from_index(0))
            }
        };
        self.registry.on_connect(id, team, &name);
    }

    fn on_disconnect(&mut self, engine: &mut dyn Engine, id: PlayerId) {
        if self.registry.on_disconnect(id) {
            // the leaver may have been the last one holding the round back
            self.check_state(engine);
        }
    }

    fn on_team_change(&mut self, engine: &mut dyn Engine, id: PlayerId) -> Result<(), RegistryError> {
        match engine.player(id) {
            Ok(info) => {
                info!("Player {} changed team to {:?}", id, info.team);
                self.registry.set_team(id, info.team)?;
                self.check_state(engine);
            }
            Err(e) => error!("Failed to read team of player {}: {}", id, e),
        }
        Ok(())
    }

    fn on_chat(
        &mut self,
        engine: &mut dyn Engine,
        status: &StatusTracker,
        id: PlayerId,
        channel: ChatChannel,
        text: &str,
    ) -> Result<(), RegistryError> {
        if id < 0 {
            return Ok(());
        }
        debug!("Player {} said '{}' on {:?}", id, text, channel);

        let command = match ChatCommand::parse(channel, text) {
            Some(command) => command,
            None => return Ok(()),
        };

        match command {
            ChatCommand::Ready => self.set_readiness(engine, status, id, Readiness::Ready)?,
            ChatCommand::NotReady => self.set_readiness(engine, status, id, Readiness::NotReady)?,
            ChatCommand::Stream => self.set_readiness(engine, status, id, Readiness::Streaming)?,
            ChatCommand::MapName => match engine.map_name() {
                Ok(map) => info!("DUMP mapname: '{}'", map),
                Err(e) => error!("Failed to read map name: {}", e),
            },
            ChatCommand::Pos(comment) => {
                if let Some(message) = self.dump_pos(engine, id, &comment) {
                    engine.broadcast(&message);
                }
            }
            ChatCommand::Disable => {
                if self.enabled {
                    self.switch_to_live(engine);
                    self.enabled = false;
                }
            }
            ChatCommand::Help => {
                info!("{} commands: [/ready; /r; /notready; /nr; /stream]", DESCRIPTION);
                info!(
                    "{} test commands: [/pos <description> - report position to add; /disable - disable module]",
                    DESCRIPTION
                );
            }
            ChatCommand::SetPos => {
                if self.enabled && self.round.state() == RoundState::Warmup {
                    if let Err(e) = engine.set_vehicle_rotation(id, PROBE_ROTATION) {
                        error!("Failed to rotate player {}: {}", id, e);
                    }
                    self.dump_pos(engine, id, "");
                }
            }
        }
        Ok(())
    }

    fn set_readiness(
        &mut self,
        engine: &mut dyn Engine,
        status: &StatusTracker,
        id: PlayerId,
        readiness: Readiness,
    ) -> Result<(), RegistryError> {
        self.registry.set_readiness(id, readiness)?;
        self.check_state(engine);
        self.print_state(engine, status);
        Ok(())
    }

    /// Formats the player's transform as a waypoint literal.
    fn dump_pos(&self, engine: &mut dyn Engine, id: PlayerId, comment: &str) -> Option<String> {
        match engine.vehicle_transform(id) {
            Ok(transform) => {
                let p = transform.position;
                let r = transform.rotation;
                let message = format!(
                    "DUMP pos: '(({}.0, {}.0, {}.0), ({}.0, {:?}, {:?})), # {}'",
                    p.x as i64, p.y as i64, p.z as i64, r.x as i64, r.y, r.z, comment
                );
                info!("{}", message);
                Some(message)
            }
            Err(e) => {
                error!("Failed to get position of player {}: {}", id, e);
                None
            }
        }
    }

    fn on_spawn(&mut self, engine: &mut dyn Engine, id: PlayerId) -> Result<(), RegistryError> {
        if self.round.state() != RoundState::Warmup || !self.enabled {
            return Ok(());
        }

        let spawns = self.registry.increment_spawn(id)?;
        self.fix_player_team(engine, id, spawns)?;

        match self.relocator.relocate(engine, id) {
            Ok(destination) => debug!("Moved player {} to {}", id, destination.position),
            Err(e) => error!("Failed to move player {}: {}", id, e),
        }
        Ok(())
    }

    /// The engine does not report every team switch, so the first spawn of
    /// a round re-reads the team. Later spawns are trusted.
    fn fix_player_team(
        &mut self,
        engine: &mut dyn Engine,
        id: PlayerId,
        spawns: u32,
    ) -> Result<(), RegistryError> {
        if spawns > 1 {
            return Ok(());
        }
        match engine.player(id) {
            Ok(info) => {
                if self.registry.set_team(id, info.team)? {
                    info!("Corrected team of player {} to {:?}", id, info.team);
                    self.check_state(engine);
                }
            }
            Err(e) => error!("Failed to read team of player {}: {}", id, e),
        }
        Ok(())
    }

    fn on_status_changed(&mut self, engine: &mut dyn Engine, status: &StatusTracker) {
        let (previous, current) = (status.previous(), status.current());
        self.round.observe_status(previous, current);
        info!(
            "{} status {} -> {} state: {} started: {} restarts: {}",
            DESCRIPTION,
            previous,
            current,
            self.round.state(),
            status.round_started(),
            self.round.debouncer().count()
        );

        if current == GameStatus::EndGame {
            self.round.on_round_end();
        }
        if current != GameStatus::Playing {
            debug!("Not playing, ignoring {}", current);
            return;
        }
        if !self.enabled {
            return;
        }
        if !status.round_started() {
            info!("Round not started");
            return;
        }
        if !self.round.restart_confirmed() {
            info!("Waiting for restart confirmation");
            return;
        }

        match self.round.on_playing() {
            RoundAction::EnterWarmup => self.switch_to_warmup(engine),
            RoundAction::Announce(message) => engine.broadcast(message),
            RoundAction::None => {}
        }

        self.refresh_map(engine);
        self.registry
            .reset_round(self.round.state() == RoundState::Live);
        self.sync_teams(engine);
    }

    fn refresh_map(&mut self, engine: &mut dyn Engine) {
        let map = match engine.map_name() {
            Ok(map) => map,
            Err(e) => {
                error!("Failed to read map name: {}", e);
                return;
            }
        };
        if self.current_map != map {
            for team in [Team::A, Team::B] {
                match engine.team_name(team) {
                    Ok(name) => match team {
                        Team::A => self.team_names.0 = name,
                        Team::B => self.team_names.1 = name,
                    },
                    Err(e) => error!("Failed to read name of team {:?}: {}", team, e),
                }
            }
            info!(
                "Map {} teams {} vs {}",
                map, self.team_names.0, self.team_names.1
            );
        }
        self.relocator.set_map(&map);
        self.current_map = map;
    }

    /// Pulls every registered player's team from the engine.
    fn sync_teams(&mut self, engine: &mut dyn Engine) {
        for id in engine.players() {
            if !self.registry.contains(id) {
                continue;
            }
            match engine.player(id) {
                Ok(info) => {
                    let _ = self.registry.set_team(id, info.team);
                }
                Err(e) => error!("Failed to read team of player {}: {}", id, e),
            }
        }
    }

    /// Moves to live once every non-streaming player is ready, the quorum is
    /// met and both teams have the same number of ready players.
    pub fn check_state(&mut self, engine: &mut dyn Engine) {
        if !self.enabled || self.round.state() != RoundState::Warmup {
            return;
        }
        let tally = self.registry.tally();
        debug!("Readiness tally {:?}", tally);
        if tally.can_go_live(READY_QUORUM) {
            self.switch_to_live(engine);
        }
    }

    fn switch_to_warmup(&mut self, engine: &mut dyn Engine) {
        info!("Switching to warmup");
        self.settings.enter_warmup(engine);
        restart_map(engine);
        self.round.begin_warmup();
    }

    fn switch_to_live(&mut self, engine: &mut dyn Engine) {
        info!("Switching to live");
        self.settings.restore(engine);
        restart_map(engine);
        self.round.begin_live();
    }

    /// Broadcasts the readiness report. Silent while live, disabled, or not playing.
    pub fn print_state(&self, engine: &mut dyn Engine, status: &StatusTracker) {
        if !self.is_running() || !status.game_playing() || !self.enabled {
            return;
        }
        if self.round.state() == RoundState::Live {
            return;
        }
        let lines = compose_report(self.team_names(), &self.registry.roster(), self.round.state());
        for line in lines {
            engine.broadcast(&line);
        }
    }
}

fn restart_map(engine: &mut dyn Engine) {
    info!("Requesting map restart");
    if let Err(e) = engine.rcon_invoke(RESTART_COMMAND) {
        error!("Failed to restart map: {}", e);
    }
}

impl HostModule for WarmupModule {
    fn name(&self) -> &'static str {
        "warmup"
    }

    fn init(&mut self, engine: &mut dyn Engine) -> bool {
        if !self.vehicles_disabled(engine) {
            self.enabled = false;
            warn!("{} stays off: server allows vehicles", DESCRIPTION);
            return false;
        }
        self.state = ModuleState::Running;
        info!("{} running", DESCRIPTION);
        true
    }

    fn shutdown(&mut self) {
        self.state = ModuleState::Shutdown;
        info!("{} shut down", DESCRIPTION);
    }

    fn state(&self) -> ModuleState {
        self.state
    }

    fn schedule(&self) -> TimerSchedule {
        self.schedule
    }

    fn on_event(
        &mut self,
        engine: &mut dyn Engine,
        status: &StatusTracker,
        event: &HostEvent,
    ) -> Result<(), RegistryError> {
        if !self.is_running() {
            return Ok(());
        }
        match event {
            HostEvent::PlayerConnect { id } => self.on_connect(engine, *id),
            HostEvent::PlayerDisconnect { id } => self.on_disconnect(engine, *id),
            HostEvent::PlayerChangeTeam { id } => self.on_team_change(engine, *id)?,
            HostEvent::ChatMessage { id, channel, text } => {
                self.on_chat(engine, status, *id, *channel, text)?
            }
            HostEvent::PlayerSpawn { id } => self.on_spawn(engine, *id)?,
            HostEvent::GameStatusChanged { .. } => self.on_status_changed(engine, status),
            HostEvent::PlayerDeath { .. } | HostEvent::Console { .. } => {}
        }
        Ok(())
    }

    fn on_timer(&mut self, engine: &mut dyn Engine, status: &StatusTracker) {
        self.print_state(engine, status);
    }

    fn exec_console(&mut self, ctx: &mut ConsoleContext, args: &str) {
        exec_subcommand(self, COMMANDS, ctx, args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimEngine;
    use std::collections::BTreeMap;

    fn config() -> WarmupConfig {
        WarmupConfig {
            changed_variables: BTreeMap::from([("sv.spawnTime".to_string(), 1)]),
            ..WarmupConfig::default()
        }
    }

    fn engine() -> SimEngine {
        let mut engine = SimEngine::new("dalian_plant");
        engine.set_setting("sv.noVehicles", "1");
        engine.set_setting("sv.spawnTime", "15");
        engine
    }

    fn running(engine: &mut SimEngine) -> WarmupModule {
        let mut module = WarmupModule::new(&config());
        assert!(module.init(engine));
        module
    }

    fn playing() -> StatusTracker {
        let mut status = StatusTracker::new();
        status.update(GameStatus::PreGame);
        status.update(GameStatus::Playing);
        status
    }

    fn connect(module: &mut WarmupModule, engine: &mut SimEngine, id: PlayerId, name: &str, team: Team) {
        engine.add_player(id, name, team);
        module
            .on_event(engine, &playing(), &HostEvent::PlayerConnect { id })
            .unwrap();
    }

    fn chat(module: &mut WarmupModule, engine: &mut SimEngine, id: PlayerId, text: &str) {
        module
            .on_event(
                engine,
                &playing(),
                &HostEvent::ChatMessage {
                    id,
                    channel: ChatChannel::Global,
                    text: text.to_string(),
                },
            )
            .unwrap();
    }

    /// Drives the module into Warmup through two confirmed restarts.
    fn into_warmup(module: &mut WarmupModule, engine: &mut SimEngine) {
        let mut status = StatusTracker::new();
        for _ in 0..4 {
            status.update(GameStatus::PreGame);
            module
                .on_event(engine, &status, &HostEvent::GameStatusChanged { status: GameStatus::PreGame })
                .unwrap();
            status.update(GameStatus::Playing);
            module
                .on_event(engine, &status, &HostEvent::GameStatusChanged { status: GameStatus::Playing })
                .unwrap();
        }
        assert_eq!(module.round_state(), RoundState::Warmup);
    }

    #[test]
    fn test_init_disabled_with_vehicles() {
        let mut engine = engine();
        engine.set_setting("sv.noVehicles", "0");
        let mut module = WarmupModule::new(&config());
        assert!(!module.init(&mut engine));
        assert!(!module.is_enabled());
        assert_eq!(module.state(), ModuleState::Loaded);

        engine.add_player(1, "Alice", Team::A);
        module
            .on_event(&mut engine, &playing(), &HostEvent::PlayerConnect { id: 1 })
            .unwrap();
        assert!(module.registry().is_empty());
    }

    #[test]
    fn test_handlers_ignored_after_shutdown() {
        let mut engine = engine();
        let mut module = running(&mut engine);
        module.shutdown();
        connect(&mut module, &mut engine, 1, "Alice", Team::A);
        assert!(module.registry().is_empty());
    }

    #[test]
    fn test_connect_reads_engine() {
        let mut engine = engine();
        let mut module = running(&mut engine);
        connect(&mut module, &mut engine, 4, "STREAMcast", Team::B);

        let record = module.registry().get(4).unwrap();
        assert_eq!(record.team, Team::B);
        assert_eq!(record.readiness, Readiness::Streaming);
    }

    #[test]
    fn test_first_warmup_cycle() {
        let mut engine = engine();
        let mut module = running(&mut engine);
        into_warmup(&mut module, &mut engine);

        assert_eq!(engine.setting("sv.spawnTime"), Some("1"));
        assert_eq!(module.settings().snapshot().unwrap()["sv.spawnTime"], 15);
        assert!(engine.broadcasts().contains(&"WARMUP".to_string()));
        assert_eq!(
            engine
                .rcon_log()
                .iter()
                .filter(|c| c.as_str() == RESTART_COMMAND)
                .count(),
            1
        );
    }

    #[test]
    fn test_ready_players_go_live() {
        let mut engine = engine();
        let mut module = running(&mut engine);
        into_warmup(&mut module, &mut engine);
        connect(&mut module, &mut engine, 1, "Alice", Team::A);
        connect(&mut module, &mut engine, 2, "Bob", Team::B);

        chat(&mut module, &mut engine, 1, "/ready");
        assert_eq!(module.round_state(), RoundState::Warmup);

        chat(&mut module, &mut engine, 2, "/r");
        assert_eq!(module.round_state(), RoundState::PendingLive);
        assert_eq!(engine.setting("sv.spawnTime"), Some("15"));
    }

    #[test]
    fn test_unbalanced_teams_stay_in_warmup() {
        let mut engine = engine();
        let mut module = running(&mut engine);
        into_warmup(&mut module, &mut engine);
        connect(&mut module, &mut engine, 1, "Alice", Team::A);
        connect(&mut module, &mut engine, 2, "Anna", Team::A);
        connect(&mut module, &mut engine, 3, "Bob", Team::B);

        for id in 1..=3 {
            chat(&mut module, &mut engine, id, "/ready");
        }
        assert_eq!(module.round_state(), RoundState::Warmup);

        // the extra player steps aside as a streamer and the teams balance
        chat(&mut module, &mut engine, 2, "/stream");
        assert_eq!(module.round_state(), RoundState::PendingLive);
    }

    #[test]
    fn test_disconnect_can_unblock_live() {
        let mut engine = engine();
        let mut module = running(&mut engine);
        into_warmup(&mut module, &mut engine);
        connect(&mut module, &mut engine, 1, "Alice", Team::A);
        connect(&mut module, &mut engine, 2, "Bob", Team::B);
        connect(&mut module, &mut engine, 3, "Idle", Team::B);
        chat(&mut module, &mut engine, 1, "/ready");
        chat(&mut module, &mut engine, 2, "/ready");
        assert_eq!(module.round_state(), RoundState::Warmup);

        engine.remove_player(3);
        module
            .on_event(&mut engine, &playing(), &HostEvent::PlayerDisconnect { id: 3 })
            .unwrap();
        assert_eq!(module.round_state(), RoundState::PendingLive);
    }

    #[test]
    fn test_chat_from_unknown_player_errors() {
        let mut engine = engine();
        let mut module = running(&mut engine);
        let result = module.on_event(
            &mut engine,
            &playing(),
            &HostEvent::ChatMessage {
                id: 9,
                channel: ChatChannel::Global,
                text: "/ready".to_string(),
            },
        );
        assert_eq!(result, Err(RegistryError::UnknownPlayer(9)));
    }

    #[test]
    fn test_server_messages_ignored() {
        let mut engine = engine();
        let mut module = running(&mut engine);
        let result = module.on_event(
            &mut engine,
            &playing(),
            &HostEvent::ChatMessage {
                id: -1,
                channel: ChatChannel::ServerMessage,
                text: "/ready".to_string(),
            },
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_disabled_module_ignores_readiness() {
        let mut engine = engine();
        let mut module = running(&mut engine);
        into_warmup(&mut module, &mut engine);
        connect(&mut module, &mut engine, 1, "Alice", Team::A);
        connect(&mut module, &mut engine, 2, "Bob", Team::B);

        let mut ctx = ConsoleContext::new();
        module.exec_console(&mut ctx, "enable 0");
        let restarts = engine.rcon_log().iter().filter(|c| c.as_str() == RESTART_COMMAND).count();

        chat(&mut module, &mut engine, 1, "/ready");
        chat(&mut module, &mut engine, 2, "/ready");
        assert_eq!(module.round_state(), RoundState::Warmup);
        assert_eq!(engine.setting("sv.spawnTime"), Some("1"));
        assert_eq!(
            engine.rcon_log().iter().filter(|c| c.as_str() == RESTART_COMMAND).count(),
            restarts
        );

        // readiness is still recorded and counts once re-enabled
        module.exec_console(&mut ctx, "enable 1");
        module.check_state(&mut engine);
        assert_eq!(module.round_state(), RoundState::PendingLive);
    }

    #[test]
    fn test_pos_dump_keeps_fractional_rotation() {
        let mut engine = engine();
        let mut module = running(&mut engine);
        connect(&mut module, &mut engine, 1, "Alice", Team::A);
        engine.place_player(1, warmup_shared::Vec3::new(10.0, 20.0, 30.0));
        engine
            .set_vehicle_rotation(1, Rotation::new(162.0, -12.5, 3.0))
            .unwrap();

        chat(&mut module, &mut engine, 1, "/pos");
        let last = engine.broadcasts().last().unwrap();
        assert!(last.starts_with("DUMP pos: '((10.0, 20.0, 30.0), (162.0, -12.5, 3.0)), # '"));
    }

    #[test]
    fn test_disable_returns_to_live() {
        let mut engine = engine();
        let mut module = running(&mut engine);
        into_warmup(&mut module, &mut engine);
        connect(&mut module, &mut engine, 1, "Alice", Team::A);

        chat(&mut module, &mut engine, 1, "/disable");
        assert!(!module.is_enabled());
        assert_eq!(module.round_state(), RoundState::PendingLive);
        assert_eq!(engine.setting("sv.spawnTime"), Some("15"));
    }

    #[test]
    fn test_spawn_only_relocates_during_warmup() {
        let mut engine = engine();
        let mut module = running(&mut engine);
        connect(&mut module, &mut engine, 1, "Alice", Team::A);
        engine.spawn_player(1);
        let before = engine.position_writes();

        module
            .on_event(&mut engine, &playing(), &HostEvent::PlayerSpawn { id: 1 })
            .unwrap();
        assert_eq!(engine.position_writes(), before);
        assert_eq!(module.registry().get(1).unwrap().spawn_count, 0);
    }

    #[test]
    fn test_spawn_fixes_team_once() {
        let mut engine = engine();
        let mut module = running(&mut engine);
        into_warmup(&mut module, &mut engine);
        connect(&mut module, &mut engine, 1, "Alice", Team::A);

        engine.set_team(1, Team::B);
        engine.spawn_player(1);
        module
            .on_event(&mut engine, &playing(), &HostEvent::PlayerSpawn { id: 1 })
            .unwrap();
        assert_eq!(module.registry().get(1).unwrap().team, Team::B);
        assert_eq!(module.registry().get(1).unwrap().spawn_count, 1);

        engine.set_team(1, Team::A);
        module
            .on_event(&mut engine, &playing(), &HostEvent::PlayerSpawn { id: 1 })
            .unwrap();
        assert_eq!(module.registry().get(1).unwrap().team, Team::B);
    }

    #[test]
    fn test_spawn_failure_is_not_fatal() {
        let mut engine = engine();
        let mut module = running(&mut engine);
        into_warmup(&mut module, &mut engine);
        connect(&mut module, &mut engine, 1, "Alice", Team::A);
        engine.spawn_player(1);
        engine.fail_moves(true);

        let result = module.on_event(&mut engine, &playing(), &HostEvent::PlayerSpawn { id: 1 });
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_report_suppressed_when_live_or_disabled() {
        let mut engine = engine();
        let mut module = running(&mut engine);
        into_warmup(&mut module, &mut engine);
        connect(&mut module, &mut engine, 1, "Alice", Team::A);

        engine.clear_broadcasts();
        module.on_timer(&mut engine, &playing());
        assert_eq!(engine.broadcasts().len(), 3);
        assert_eq!(engine.broadcasts()[0], "Team US: R() NR(Alice)");

        engine.clear_broadcasts();
        module.on_timer(&mut engine, &StatusTracker::new());
        assert!(engine.broadcasts().is_empty());

        let mut ctx = ConsoleContext::new();
        module.exec_console(&mut ctx, "enable 0");
        assert_eq!(ctx.output(), "Warmup set to enabled? 0\n");
        module.on_timer(&mut engine, &playing());
        assert!(engine.broadcasts().is_empty());
    }

    #[test]
    fn test_enable_command_errors() {
        let mut engine = engine();
        let mut module = running(&mut engine);

        let mut ctx = ConsoleContext::new();
        module.exec_console(&mut ctx, "enable");
        assert_eq!(ctx.output(), "Error: no argument (0 or 1) specified\n");

        let mut ctx = ConsoleContext::new();
        module.exec_console(&mut ctx, "enable on");
        assert_eq!(ctx.output(), "Error: 'on' is not an integer\n");
        assert!(module.is_enabled());
    }

    #[test]
    fn test_pos_dump_broadcasts_literal() {
        let mut engine = engine();
        let mut module = running(&mut engine);
        connect(&mut module, &mut engine, 1, "Alice", Team::A);
        engine.place_player(1, warmup_shared::Vec3::new(-186.4, 156.9, 44.0));

        chat(&mut module, &mut engine, 1, "/pos Hotel corridor");
        let last = engine.broadcasts().last().unwrap();
        assert!(last.starts_with("DUMP pos: '((-186.0, 156.0, 44.0), (0.0, 0.0, 0.0)), # hotel corridor'"));
    }
}
