//! Core data types for Skirmish.
//!
//! Everything in this crate is plain data: identities, world positions,
//! spawn and block descriptors, statistics sheets, death information and
//! inventory snapshots. The match engine (`skirmish-arena`) and the
//! managers built on top of it share these types; none of them carry any
//! behavior beyond construction, comparison and (de)serialization.

mod block;
mod death;
mod ids;
mod items;
mod location;
mod spawn;
mod stats;

pub use block::{BlockDescriptor, BlockInfo};
pub use death::{DamageCause, DeathInfo};
pub use ids::PlayerId;
pub use items::{ClassSpec, InventorySnapshot, ItemInfo};
pub use location::{BlockPos, Location, LocationParseError, Offset};
pub use spawn::{
    EXIT, LOUNGE, SPAWN, SPECTATOR, SpawnDescriptor, SpawnNodeError,
};
pub use stats::{StatKind, StatSheet};
