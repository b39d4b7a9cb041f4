//! Freecam correction for dead and spectating players
//!
//! The engine cannot restrict free camera use to selected players, and
//! turning it off mid-round also cuts off players already using it. Instead,
//! dead players' cameras are parked at a holding point. Players whose name
//! carries the streamer prefix are left alone.
//!
//! Two holding policies share the same scan:
//! - [`FreecamPolicy::MapCentroid`]: a fixed height above the middle of the
//!   map's captured objectives, enforced on every timer tick
//! - [`FreecamPolicy::RelativeOnDeath`]: a fixed offset applied once when the
//!   player dies

use crate::commands::{exec_subcommand, parse_enable, parse_height, ConsoleContext, Handler, Subcommand};
use crate::config::{FreecamConfig, FreecamPolicy};
use crate::engine::{ControlPoint, Engine, EngineError};
use crate::host::{HostEvent, StatusTracker};
use crate::module::{HostModule, ModuleState, TimerSchedule};
use crate::registry::RegistryError;
use log::{debug, error, info, warn};
use warmup_shared::{GameStatus, PlayerId, Vec3, SKYWARD_ROTATION};

pub const DESCRIPTION: &str = "StreamFreecam";
/// Engine setting that reports whether free camera is allowed at all.
pub const ALLOW_FREECAM_SETTING: &str = "sv.allowFreeCam";

const COMMANDS: &[(Subcommand, Handler<FreecamModule>)] = &[
    (Subcommand::Enable, FreecamModule::cmd_enable),
    (Subcommand::Height, FreecamModule::cmd_height),
];

/// Midpoint of the bounding box around every owned objective, floored so
/// the target compares equal to what the engine reports back.
pub fn map_centroid(points: &[ControlPoint]) -> Option<Vec3> {
    let mut owned = points
        .iter()
        .filter(|point| point.team.is_some())
        .map(|point| point.position);
    let first = owned.next()?;
    let (min, max) = owned.fold((first, first), |(min, max), p| {
        (
            Vec3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
            Vec3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
        )
    });
    Some(
        Vec3::new(
            (min.x + max.x) / 2.0,
            (min.y + max.y) / 2.0,
            (min.z + max.z) / 2.0,
        )
        .floor(),
    )
}

/// What one scan did, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub moved: usize,
    pub already_parked: usize,
    pub exempt: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct FreecamCorrector {
    policy: FreecamPolicy,
    height: f32,
    streamer_prefix: String,
    current_map: String,
    centroid: Option<Vec3>,
}

impl FreecamCorrector {
    pub fn new(policy: FreecamPolicy, height: f32, streamer_prefix: impl Into<String>) -> Self {
        Self {
            policy,
            height,
            streamer_prefix: streamer_prefix.into(),
            current_map: String::new(),
            centroid: None,
        }
    }

    pub fn policy(&self) -> FreecamPolicy {
        self.policy
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn set_height(&mut self, height: f32) {
        self.height = height;
    }

    pub fn is_exempt(&self, name: &str) -> bool {
        name.starts_with(&self.streamer_prefix)
    }

    /// Recomputes the centroid when the map changed since the last call.
    pub fn refresh_map(&mut self, engine: &dyn Engine) -> Result<(), EngineError> {
        if engine.map_name()? == self.current_map {
            return Ok(());
        }
        self.load_map(engine)
    }

    /// Recomputes the centroid unconditionally. Objectives are only reliable
    /// once the map has finished loading, so this runs on every map load.
    pub fn load_map(&mut self, engine: &dyn Engine) -> Result<(), EngineError> {
        let map = engine.map_name()?;
        let points = engine.control_points()?;
        self.centroid = map_centroid(&points);
        info!(
            "Freecam holding area for {}: {:?} from {} control points",
            map,
            self.centroid,
            points.len()
        );
        self.current_map = map;
        Ok(())
    }

    /// Where parked cameras are held. Without objectives the map origin is used.
    pub fn holding_point(&self) -> Vec3 {
        let centre = self.centroid.unwrap_or_default();
        Vec3::new(centre.x, self.height, centre.z).floor()
    }

    /// Parks every dead, fully connected, non-exempt player. Only the
    /// centroid policy scans; the relative policy acts on death instead.
    pub fn scan(&self, engine: &mut dyn Engine) -> ScanReport {
        let mut report = ScanReport::default();
        if self.policy != FreecamPolicy::MapCentroid {
            return report;
        }
        let target = self.holding_point();

        for id in engine.players() {
            let info = match engine.player(id) {
                Ok(info) => info,
                Err(e) => {
                    error!("Failed to check player {}: {}", id, e);
                    report.failed += 1;
                    continue;
                }
            };
            if !info.connected || info.alive {
                continue;
            }
            if self.is_exempt(&info.name) {
                report.exempt += 1;
                continue;
            }
            match park(engine, id, target) {
                Ok(true) => report.moved += 1,
                Ok(false) => report.already_parked += 1,
                Err(e) => {
                    error!("Failed to move player '{}': {}", info.name, e);
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Shifts a freshly dead player's camera once. Returns whether it moved.
    pub fn on_death(&self, engine: &mut dyn Engine, id: PlayerId) -> Result<bool, EngineError> {
        let offset = match self.policy {
            FreecamPolicy::RelativeOnDeath(offset) => offset,
            FreecamPolicy::MapCentroid => return Ok(false),
        };
        let info = engine.player(id)?;
        if info.alive {
            debug!("Player {} is alive, not moving", id);
            return Ok(false);
        }
        if self.is_exempt(&info.name) {
            return Ok(false);
        }
        let current = engine.vehicle_transform(id)?;
        engine.set_vehicle_position(id, current.position.offset(offset))?;
        Ok(true)
    }
}

/// Writes the target only when the camera is somewhere else.
fn park(engine: &mut dyn Engine, id: PlayerId, target: Vec3) -> Result<bool, EngineError> {
    let current = engine.vehicle_transform(id)?;
    if current.position == target {
        return Ok(false);
    }
    engine.set_vehicle_position(id, target)?;
    engine.set_vehicle_rotation(id, SKYWARD_ROTATION)?;
    Ok(true)
}

pub struct FreecamModule {
    state: ModuleState,
    enabled: bool,
    /// Cached engine freecam switch, refreshed on status changes only.
    freecam_allowed: bool,
    schedule: TimerSchedule,
    corrector: FreecamCorrector,
}

impl FreecamModule {
    pub fn new(config: &FreecamConfig) -> Self {
        Self {
            state: ModuleState::Loaded,
            enabled: true,
            freecam_allowed: false,
            schedule: TimerSchedule {
                initial_delay: config.initial_delay(),
                interval: config.sample_interval(),
            },
            corrector: FreecamCorrector::new(
                config.policy,
                config.height,
                config.streamer_prefix.clone(),
            ),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn freecam_allowed(&self) -> bool {
        self.freecam_allowed
    }

    pub fn corrector(&self) -> &FreecamCorrector {
        &self.corrector
    }

    fn is_active(&self) -> bool {
        self.is_running() && self.enabled && self.freecam_allowed
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

    fn cmd_height(&mut self, ctx: &mut ConsoleContext, args: &str) {
        match parse_height(args) {
            Ok(height) => {
                self.corrector.set_height(height);
                ctx.write(&format!("{} height set to {}\n", DESCRIPTION, height));
            }
            Err(e) => ctx.write(&format!("Error: {}\n", e)),
        }
    }

    /// Querying the switch is expensive, so it is only re-read here.
    fn probe_engine(&mut self, engine: &mut dyn Engine, map_loaded: bool) {
        self.freecam_allowed = match engine.rcon_invoke(ALLOW_FREECAM_SETTING) {
            Ok(raw) => raw == "1\n",
            Err(e) => {
                warn!("Failed to read {}: {}", ALLOW_FREECAM_SETTING, e);
                false
            }
        };
        let refreshed = if map_loaded {
            self.corrector.load_map(engine)
        } else {
            self.corrector.refresh_map(engine)
        };
        if let Err(e) = refreshed {
            error!("Failed to refresh freecam holding area: {}", e);
        }
        debug!("Freecam allowed: {}", self.freecam_allowed);
    }
}

impl HostModule for FreecamModule {
    fn name(&self) -> &'static str {
        "stream_freecam"
    }

    fn init(&mut self, engine: &mut dyn Engine) -> bool {
        self.state = ModuleState::Running;
        self.probe_engine(engine, false);
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
            HostEvent::GameStatusChanged { .. } => {
                let map_loaded = status.previous() == GameStatus::PreGame && status.game_playing();
                self.probe_engine(engine, map_loaded)
            }
            HostEvent::PlayerDeath { id } if self.is_active() => {
                if let Err(e) = self.corrector.on_death(engine, *id) {
                    error!("Failed to move dead player {}: {}", id, e);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_timer(&mut self, engine: &mut dyn Engine, status: &StatusTracker) {
        if !self.is_active() || !status.game_playing() {
            return;
        }
        let report = self.corrector.scan(engine);
        if report.moved > 0 || report.failed > 0 {
            debug!("Freecam scan {:?}", report);
        }
    }

    fn exec_console(&mut self, ctx: &mut ConsoleContext, args: &str) {
        exec_subcommand(self, COMMANDS, ctx, args);
    }
}
