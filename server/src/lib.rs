//! # Warmup Server Library
//!
//! Server-side round control for competitive matches. Between rounds the
//! server runs a warmup: settings are relaxed, spawns are moved to practice
//! positions, and players declare themselves ready. Once both sides are
//! ready the original settings come back and the map restarts into a live
//! round. A second module keeps dead players' free cameras parked away from
//! the action so they cannot scout for their team.
//!
//! ## Core Responsibilities
//!
//! ### Round Control
//! The warmup module follows the engine's game status notifications and
//! moves through warmup and live rounds:
//! - Readiness tracking per player, with streamers excluded from counts
//! - Settings snapshot before warmup and restore before going live
//! - Debouncing of the duplicate status notifications a restart produces
//! - Periodic readiness reports broadcast to every player
//!
//! ### Spawn Relocation
//! During warmup every spawn is moved, either through a per-map waypoint
//! table or by a small upward nudge on maps without one.
//!
//! ### Freecam Correction
//! Dead players' cameras are held at a fixed point above the middle of the
//! map's objectives, or shifted once at death, depending on configuration.
//!
//! ## Architecture Design
//!
//! ### Single Event Loop
//! All engine callbacks, console commands and timer ticks are handled one at
//! a time on a single task. Modules own their state outright and never
//! share it, so no locking is involved.
//!
//! ### Engine Boundary
//! Everything the modules need from the game server goes through the
//! [`engine::Engine`] trait. Each call returns a `Result`; failures are
//! logged once and the affected unit of work is skipped. [`sim::SimEngine`]
//! implements the trait in memory for the binary and the tests.
//!
//! ## Module Organization
//!
//! - `engine`, `sim`: the adapter trait and the in-memory engine
//! - `host`, `module`, `timer`: event dispatch, lifecycle, recurring timers
//! - `registry`, `round`, `debounce`, `settings`, `spawn`, `report`: warmup parts
//! - `warmup`, `freecam`: the two modules
//! - `commands`, `script`: console/chat parsing and scripted input
//! - `config`: JSON configuration with defaults
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use tokio::sync::mpsc;
//! use warmup_server::config::Config;
//! use warmup_server::host::Host;
//! use warmup_server::sim::SimEngine;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut engine = SimEngine::new("strike_at_karkand");
//!     // Queue the status callbacks of the first map load
//!     engine.boot();
//!
//!     let mut host = Host::new(engine, &Config::default());
//!     host.init();
//!
//!     // Events and engine changes arrive through the channel until it closes
//!     let (_tx, rx) = mpsc::channel(16);
//!     host.run(rx).await;
//! }
//! ```

pub mod commands;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod freecam;
pub mod host;
pub mod module;
pub mod registry;
pub mod report;
pub mod round;
pub mod script;
pub mod settings;
pub mod sim;
pub mod spawn;
pub mod timer;
pub mod warmup;
