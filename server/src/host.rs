//! Host runtime: event dispatch, game status tracking and module timers

use crate::commands::{split_subcommand, ConsoleContext};
use crate::config::Config;
use crate::engine::Engine;
use crate::freecam::FreecamModule;
use crate::module::HostModule;
use crate::timer::RecurringTimer;
use crate::warmup::WarmupModule;
use log::{debug, error, info};
use tokio::sync::mpsc;
use warmup_shared::{ChatChannel, GameStatus, PlayerId};

/// Callbacks delivered by the engine, plus console commands.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    PlayerConnect { id: PlayerId },
    PlayerDisconnect { id: PlayerId },
    PlayerChangeTeam { id: PlayerId },
    ChatMessage {
        id: PlayerId,
        channel: ChatChannel,
        text: String,
    },
    PlayerSpawn { id: PlayerId },
    PlayerDeath { id: PlayerId },
    GameStatusChanged { status: GameStatus },
    /// `<module> <subcommand> <args>` from the remote console
    Console { module: String, args: String },
}

/// Game status as seen by the host, updated before modules are notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTracker {
    previous: GameStatus,
    current: GameStatus,
    round_started: bool,
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusTracker {
    pub fn new() -> Self {
        Self {
            previous: GameStatus::NotConnected,
            current: GameStatus::NotConnected,
            round_started: false,
        }
    }

    /// A round counts as started once Playing follows PreGame; the end
    /// screen clears it.
    pub fn update(&mut self, status: GameStatus) {
        self.previous = self.current;
        self.current = status;
        match status {
            GameStatus::Playing if self.previous == GameStatus::PreGame => {
                self.round_started = true
            }
            GameStatus::EndGame => self.round_started = false,
            _ => {}
        }
    }

    pub fn previous(&self) -> GameStatus {
        self.previous
    }

    pub fn current(&self) -> GameStatus {
        self.current
    }

    pub fn game_playing(&self) -> bool {
        self.current == GameStatus::Playing
    }

    pub fn round_started(&self) -> bool {
        self.round_started
    }
}

/// Work sent into the host loop from outside.
pub enum HostCommand<E> {
    Event(HostEvent),
    /// Direct access to the engine, for drivers that simulate it
    Engine(Box<dyn FnOnce(&mut E) + Send>),
    Shutdown,
}

pub struct Host<E: Engine> {
    engine: E,
    status: StatusTracker,
    warmup: WarmupModule,
    freecam: FreecamModule,
}

impl<E: Engine> Host<E> {
    pub fn new(engine: E, config: &Config) -> Self {
        Self {
            engine,
            status: StatusTracker::new(),
            warmup: WarmupModule::new(&config.warmup),
            freecam: FreecamModule::new(&config.freecam),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn status(&self) -> &StatusTracker {
        &self.status
    }

    pub fn warmup(&self) -> &WarmupModule {
        &self.warmup
    }

    pub fn freecam(&self) -> &FreecamModule {
        &self.freecam
    }

    fn modules(&mut self) -> [&mut dyn HostModule; 2] {
        [&mut self.warmup, &mut self.freecam]
    }

    pub fn init(&mut self) {
        for module in [&mut self.warmup as &mut dyn HostModule, &mut self.freecam] {
            let started = module.init(&mut self.engine);
            info!("Module {} started: {}", module.name(), started);
        }
    }

    pub fn shutdown(&mut self) {
        for module in self.modules() {
            module.shutdown();
        }
    }

    /// Delivers one event to every module, then any callbacks the engine
    /// queued in response. Returns console output for console events.
    pub fn dispatch(&mut self, event: HostEvent) -> Option<String> {
        let output = self.deliver(&event);
        while let Some(follow_up) = self.engine.next_event() {
            debug!("Engine callback {:?}", follow_up);
            self.deliver(&follow_up);
        }
        output
    }

    fn deliver(&mut self, event: &HostEvent) -> Option<String> {
        if let HostEvent::GameStatusChanged { status } = event {
            self.status.update(*status);
        }
        if let HostEvent::Console { module, args } = event {
            return Some(self.exec_console(module, args));
        }

        let status = self.status;
        for module in [&mut self.warmup as &mut dyn HostModule, &mut self.freecam] {
            if let Err(e) = module.on_event(&mut self.engine, &status, event) {
                error!("Module {} failed on {:?}: {}", module.name(), event, e);
            }
        }
        None
    }

    fn exec_console(&mut self, module: &str, args: &str) -> String {
        let mut ctx = ConsoleContext::new();
        match self.modules().into_iter().find(|m| m.name() == module) {
            Some(target) => target.exec_console(&mut ctx, args),
            None => ctx.write(&format!("Error: unknown module '{}'\n", module)),
        }
        ctx.into_output()
    }

    pub fn tick_warmup(&mut self) {
        let status = self.status;
        self.warmup.on_timer(&mut self.engine, &status);
        self.pump_engine();
    }

    pub fn tick_freecam(&mut self) {
        let status = self.status;
        self.freecam.on_timer(&mut self.engine, &status);
        self.pump_engine();
    }

    /// Delivers callbacks the engine queued outside of event dispatch.
    pub fn pump_engine(&mut self) {
        while let Some(event) = self.engine.next_event() {
            if let Some(output) = self.deliver(&event) {
                info!("{}", output.trim_end());
            }
        }
    }

    /// Runs until a shutdown command, a closed channel, or Ctrl-C. Module
    /// timers are cancelled before returning, so no tick fires afterwards.
    pub async fn run(&mut self, mut rx: mpsc::Receiver<HostCommand<E>>) {
        let warmup_schedule = self.warmup.schedule();
        let freecam_schedule = self.freecam.schedule();
        let mut warmup_timer = RecurringTimer::start(warmup_schedule);
        let mut freecam_timer = RecurringTimer::start(freecam_schedule);

        self.pump_engine();
        info!("Host started");

        loop {
            tokio::select! {
                command = rx.recv() => {
                    match command {
                        Some(HostCommand::Event(event)) => {
                            if let Some(output) = self.dispatch(event) {
                                print!("{}", output);
                            }
                        }
                        Some(HostCommand::Engine(apply)) => {
                            apply(&mut self.engine);
                            self.pump_engine();
                        }
                        Some(HostCommand::Shutdown) | None => {
                            info!("Host shutting down");
                            break;
                        }
                    }
                }
                _ = warmup_timer.tick() => {
                    if !warmup_timer.is_cancelled() {
                        self.tick_warmup();
                    }
                }
                _ = freecam_timer.tick() => {
                    if !freecam_timer.is_cancelled() {
                        self.tick_freecam();
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl+C, shutting down gracefully...");
                    break;
                }
            }
        }

        warmup_timer.cancel();
        freecam_timer.cancel();
        self.shutdown();
    }
}

/// Splits a console line `"<module> <subcommand> <args>"` into an event.
pub fn console_event(line: &str) -> HostEvent {
    let (module, args) = split_subcommand(line);
    HostEvent::Console {
        module: module.to_string(),
        args: args.to_string(),
    }
}
