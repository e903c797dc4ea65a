//! # Skirmish
//!
//! A multiplayer arena match engine with pluggable win conditions.
//!
//! Many independent match instances ("arenas") run side by side inside a
//! shared host environment, each walking a lobby → fight → end → reset
//! lifecycle under a pluggable win-condition engine (a [`Goal`]). The
//! engine is single-threaded and tick-driven: external triggers (player
//! actions, world events, expired timers) are sequenced by the workflow
//! orchestrator, and everything the engine wants done in the world comes
//! back out as arena events.
//!
//! ## Quick start
//!
//! Implement [`Goal`] for your win condition, then:
//!
//! ```no_run
//! use skirmish::prelude::*;
//! # struct MyGoal;
//! # impl Goal for MyGoal {
//! #     fn name(&self) -> &str { "MyGoal" }
//! #     fn check_end(&self, _: &Arena, _: &PlayerRegistry) -> bool { false }
//! #     fn commit_player_death(&mut self, _: &mut GoalContext<'_>, _: PlayerId, _: bool, _: &DeathInfo) {}
//! #     fn parse_leave(&mut self, _: PlayerId) {}
//! #     fn reset(&mut self, _: bool) {}
//! #     fn timed_end(&self, _: &Arena, _: &PlayerRegistry, _: &mut Scores) {}
//! # }
//!
//! let mut host = ArenaHost::new();
//! host.load_arena(
//!     "castle",
//!     ArenaConfig::default(),
//!     Box::new(MyGoal),
//!     vec![
//!         SpawnDescriptor::new("lounge", Location::new("event", 0.0, 64.0, 0.0)),
//!         SpawnDescriptor::new("spectator", Location::new("event", 8.0, 64.0, 0.0)),
//!         SpawnDescriptor::new("spawn", Location::new("event", 16.0, 64.0, 0.0)).with_team("red"),
//!         SpawnDescriptor::new("spawn", Location::new("event", 24.0, 64.0, 0.0)).with_team("blue"),
//!     ],
//! ).unwrap();
//!
//! host.join("castle", PlayerId(1), "alice", None, InventorySnapshot::empty()).unwrap();
//! host.ready("castle", PlayerId(1)).unwrap();
//! loop {
//!     host.tick();
//!     for _event in host.drain_events("castle") {
//!         // teleport / broadcast / persist...
//!     }
//! }
//! ```

mod error;
pub mod host;
pub mod timed_end;
pub mod workflow;

pub use error::SkirmishError;
pub use host::{ArenaHost, HostError};
pub use workflow::Workflow;

// Re-export the engine crates so one dependency is enough.
pub use skirmish_arena::{
    Arena, ArenaConfig, ArenaError, ArenaEvent, ArenaPhase, ArenaPlayer, ArenaTask, ArenaTeam,
    BlockTracker, ConfigError, Goal, GoalContext, GoalError, GoalSettings, HookVerdict, LifeMap,
    PlayerRegistry, PlayerStatus, Scores, TaskKind, TeamColor, TeamSpec, queries,
};
pub use skirmish_core::{
    BlockDescriptor, BlockInfo, BlockPos, ClassSpec, DamageCause, DeathInfo, InventorySnapshot,
    ItemInfo, Location, LocationParseError, Offset, PlayerId, SpawnDescriptor, SpawnNodeError,
    StatKind, StatSheet,
};
pub use skirmish_spawn::{
    DistributionMode, SpawnAssignment, SpawnError, SpawnRegistry, TeamSpawnRequest, nearest_block,
};
pub use skirmish_tick::{TaskHandle, TickScheduler};

/// The commonly-needed names in one import.
pub mod prelude {
    pub use crate::{
        Arena, ArenaConfig, ArenaEvent, ArenaHost, ArenaPhase, DamageCause, DeathInfo, Goal,
        GoalContext, GoalSettings, HookVerdict, InventorySnapshot, LifeMap, Location, PlayerId,
        PlayerRegistry, PlayerStatus, Scores, SkirmishError, SpawnDescriptor, StatKind,
        TeamColor,
    };
}
