//! Lifecycle shared by the host-loaded modules

use crate::commands::ConsoleContext;
use crate::engine::Engine;
use crate::host::{HostEvent, StatusTracker};
use crate::registry::RegistryError;
use std::time::Duration;

/// Handlers do nothing unless the module is `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleState {
    #[default]
    Loaded,
    Running,
    Shutdown,
}

/// When a module's recurring timer first fires and how often it repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSchedule {
    pub initial_delay: Duration,
    pub interval: Duration,
}

pub trait HostModule {
    /// Name the module's console commands are registered under.
    fn name(&self) -> &'static str;

    /// Returns false if the module decided not to run in this process.
    fn init(&mut self, engine: &mut dyn Engine) -> bool;

    fn shutdown(&mut self);

    fn state(&self) -> ModuleState;

    fn is_running(&self) -> bool {
        self.state() == ModuleState::Running
    }

    fn schedule(&self) -> TimerSchedule;

    fn on_event(
        &mut self,
        engine: &mut dyn Engine,
        status: &StatusTracker,
        event: &HostEvent,
    ) -> Result<(), RegistryError>;

    fn on_timer(&mut self, engine: &mut dyn Engine, status: &StatusTracker);

    fn exec_console(&mut self, ctx: &mut ConsoleContext, args: &str);
}
