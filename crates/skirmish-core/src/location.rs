//! World positions.
//!
//! Two flavors: [`Location`] is a full entity position (continuous
//! coordinates plus view angles), [`BlockPos`] is an integer block
//! coordinate. Both carry the world name, and distance queries across
//! worlds are treated as infinitely far apart rather than an error —
//! "nearest" lookups simply never pick a candidate in another world.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A full entity position: world, continuous coordinates and view angles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
}

impl Location {
    /// Creates a location with zeroed view angles.
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Squared Euclidean distance to `other`.
    ///
    /// Returns `f64::INFINITY` when the worlds differ.
    pub fn distance_squared(&self, other: &Location) -> f64 {
        if self.world != other.world {
            return f64::INFINITY;
        }
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Returns this location shifted by `offset`.
    pub fn offset_by(&self, offset: &Offset) -> Location {
        Location {
            world: self.world.clone(),
            x: self.x + offset.x,
            y: self.y + offset.y,
            z: self.z + offset.z,
            yaw: self.yaw,
            pitch: self.pitch,
        }
    }

    /// The block coordinate this location falls into.
    pub fn block_pos(&self) -> BlockPos {
        BlockPos {
            world: self.world.clone(),
            x: self.x.floor() as i32,
            y: self.y.floor() as i32,
            z: self.z.floor() as i32,
        }
    }

    /// Parses the compact config form `world,x,y,z[,yaw,pitch]`.
    pub fn parse_compact(input: &str) -> Result<Location, LocationParseError> {
        let parts: Vec<&str> = input.split(',').map(str::trim).collect();
        if parts.len() != 4 && parts.len() != 6 {
            return Err(LocationParseError::WrongFieldCount(parts.len()));
        }
        let num = |s: &str| -> Result<f64, LocationParseError> {
            s.parse()
                .map_err(|_| LocationParseError::BadNumber(s.to_string()))
        };
        let mut loc = Location::new(parts[0], num(parts[1])?, num(parts[2])?, num(parts[3])?);
        if parts.len() == 6 {
            loc.yaw = num(parts[4])? as f32;
            loc.pitch = num(parts[5])? as f32;
        }
        Ok(loc)
    }

    /// Renders the compact config form parsed by [`Location::parse_compact`].
    pub fn to_compact(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.world, self.x, self.y, self.z, self.yaw, self.pitch
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({:.1},{:.1},{:.1})",
            self.world, self.x, self.y, self.z
        )
    }
}

/// Error parsing the compact `world,x,y,z[,yaw,pitch]` form.
#[derive(Debug, thiserror::Error)]
pub enum LocationParseError {
    /// The input did not have 4 or 6 comma-separated fields.
    #[error("expected 4 or 6 comma-separated fields, got {0}")]
    WrongFieldCount(usize),

    /// A coordinate field was not a number.
    #[error("invalid coordinate '{0}'")]
    BadNumber(String),
}

// ---------------------------------------------------------------------------
// BlockPos
// ---------------------------------------------------------------------------

/// An integer block coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub world: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(world: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    /// Squared Euclidean distance to `other`.
    ///
    /// Returns `f64::INFINITY` when the worlds differ.
    pub fn distance_squared(&self, other: &BlockPos) -> f64 {
        if self.world != other.world {
            return f64::INFINITY;
        }
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        let dz = (self.z - other.z) as f64;
        dx * dx + dy * dy + dz * dz
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{},{})", self.world, self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Offset
// ---------------------------------------------------------------------------

/// A relative displacement applied to a spawn location on teleport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Offset {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_squared_same_world() {
        let a = Location::new("event", 0.0, 0.0, 0.0);
        let b = Location::new("event", 3.0, 4.0, 0.0);
        assert_eq!(a.distance_squared(&b), 25.0);
    }

    #[test]
    fn test_distance_squared_cross_world_is_infinite() {
        let a = Location::new("event", 0.0, 0.0, 0.0);
        let b = Location::new("lobby", 0.0, 0.0, 0.0);
        assert_eq!(a.distance_squared(&b), f64::INFINITY);
    }

    #[test]
    fn test_block_pos_distance_squared() {
        let a = BlockPos::new("event", 0, 0, 0);
        let b = BlockPos::new("event", 1, 2, 2);
        assert_eq!(a.distance_squared(&b), 9.0);
    }

    #[test]
    fn test_parse_compact_full_form() {
        let loc = Location::parse_compact("event,3459,62,104,-90.5,-1.65").unwrap();
        assert_eq!(loc.world, "event");
        assert_eq!(loc.x, 3459.0);
        assert_eq!(loc.yaw, -90.5);
        assert_eq!(loc.pitch, -1.65);
    }

    #[test]
    fn test_parse_compact_short_form_defaults_angles() {
        let loc = Location::parse_compact("event,1,2,3").unwrap();
        assert_eq!(loc.yaw, 0.0);
        assert_eq!(loc.pitch, 0.0);
    }

    #[test]
    fn test_parse_compact_rejects_wrong_field_count() {
        assert!(Location::parse_compact("event,1,2").is_err());
        assert!(Location::parse_compact("event,1,2,3,4").is_err());
    }

    #[test]
    fn test_parse_compact_rejects_bad_number() {
        assert!(Location::parse_compact("event,one,2,3").is_err());
    }

    #[test]
    fn test_compact_round_trip() {
        let loc = Location::new("event", 1.5, 64.0, -3.25);
        let parsed = Location::parse_compact(&loc.to_compact()).unwrap();
        assert_eq!(parsed, loc);
    }

    #[test]
    fn test_offset_by() {
        let loc = Location::new("event", 1.0, 2.0, 3.0);
        let shifted = loc.offset_by(&Offset::new(0.5, 0.0, -1.0));
        assert_eq!(shifted.x, 1.5);
        assert_eq!(shifted.z, 2.0);
        assert_eq!(shifted.world, "event");
    }

    #[test]
    fn test_block_pos_of_location_floors() {
        let loc = Location::new("event", 1.9, -0.1, 3.0);
        let pos = loc.block_pos();
        assert_eq!((pos.x, pos.y, pos.z), (1, -1, 3));
    }
}
