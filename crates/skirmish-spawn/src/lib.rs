//! Spawn resolution and distribution for Skirmish.
//!
//! Each arena owns one [`SpawnRegistry`] holding the spawn descriptors its
//! configuration declared. The registry answers two questions for the
//! match engine:
//!
//! - **Resolution** — "where does (name, team, class) teleport to?",
//!   walking the identity triple from most specific to least specific and
//!   then through a caller-supplied fallback chain.
//! - **Distribution** — "place this team's members across its spawn
//!   points", round-robin over declaration order so no point is doubled up
//!   while unused candidates remain.
//!
//! # Key types
//!
//! - [`SpawnRegistry`] — per-arena descriptor store
//! - [`DistributionMode`] — deterministic round-robin or shuffled
//! - [`SpawnError`] — registration/distribution failures

mod distribution;
mod error;
mod registry;

pub use distribution::{DistributionMode, SpawnAssignment, TeamSpawnRequest};
pub use error::SpawnError;
pub use registry::SpawnRegistry;

use skirmish_core::{BlockDescriptor, BlockPos};

/// Returns the registered block closest to `from` by squared Euclidean
/// distance. Ties are broken by declaration order (the earlier descriptor
/// wins); candidates in another world never match.
///
/// Block-based goals use this to decide which physical object a player
/// actually interacted with.
pub fn nearest_block<'a>(
    blocks: &'a [BlockDescriptor],
    from: &BlockPos,
) -> Option<&'a BlockDescriptor> {
    let mut best: Option<(&'a BlockDescriptor, f64)> = None;
    for block in blocks {
        let dist = block.pos.distance_squared(from);
        if dist.is_infinite() {
            continue;
        }
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((block, dist)),
        }
    }
    best.map(|(block, _)| block)
}
