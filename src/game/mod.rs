use crate::model;
use std::collections::{HashMap, HashSet};

mod coordinate;
mod tile;
mod map;
mod unit;
mod effect;
mod cost;
mod movement;
mod reach;
mod engine;
pub use self::coordinate::*;
pub use self::tile::*;
pub use self::map::*;
pub use self::unit::*;
pub use self::effect::*;
pub use self::cost::*;
pub use self::movement::*;
pub use self::reach::*;
pub use self::engine::*;

pub type UnitId = usize;
pub type TileId = usize;
pub type SegmentId = usize;
pub type WarpGroupId = u32;
pub use crate::model::{Grouping, TerrainTypeId};

/// One tile of one map segment. Neighbor links and terrain references are
/// fixed at map construction; the annotation sets are rebuilt once per solve.
#[derive(Clone, Debug)]
pub struct Tile {
    pub coordinate: Coordinate,
    pub terrain: TerrainTypeId,
    pub segment: SegmentId,
    pub neighbors: Vec<TileId>,
    pub warp_group: Option<WarpGroupId>,
    pub occupant: Option<UnitId>,
    pub obstructed_by: HashSet<UnitId>,
    pub cost_affected_by: HashSet<UnitId>,
}

/// Rectangular tile grid with its own pixel dimensions. Segments are
/// stitched edge-to-edge horizontally; `x_offset` makes global coordinates
/// contiguous across the seams.
#[derive(Clone, Debug)]
pub struct Segment {
    pub width: i32,
    pub height: i32,
    pub px_width: u32,
    pub px_height: u32,
    pub x_offset: i32,
}

#[derive(Clone, Debug)]
pub struct Map {
    pub name: String,
    pub segments: Vec<Segment>,
    pub terrain: model::TerrainCatalog,
    tiles: Vec<Tile>,
    index: HashMap<Coordinate, TileId>,
    warp_groups: HashMap<WarpGroupId, Vec<TileId>>,
}

/// Roster entry. Built once per request from catalog lookups, mutated in
/// place by effect application and range solving, never persisted.
#[derive(Clone, Debug)]
pub struct Unit {
    pub name: String,
    pub affiliation: model::Affiliation,
    /// The unit occupies footprint x footprint tiles, anchored at `origin`.
    pub footprint: u32,
    pub origin: Coordinate,
    pub movement_type: String,
    pub stats: Stats,
    pub inventory: Vec<Option<model::Item>>,
    pub skills: Vec<Skill>,
    pub statuses: Vec<String>,
    pub movement_range: HashSet<Coordinate>,
    pub attack_range: HashSet<Coordinate>,
    pub utility_range: HashSet<Coordinate>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Skill {
    pub name: String,
    pub effect: Option<Effect>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats(pub HashMap<String, Stat>);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub base: i32,
    pub modifiers: Vec<Modifier>,
}

/// One named contribution to a stat, keyed by the skill that granted it so
/// duplicate sources stay distinguishable in the breakdown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub source: String,
    pub value: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("terrain {terrain:?} has no cost for movement type {movement_type:?}")]
    UnmatchedMovementType { terrain: String, movement_type: String },
    #[error("no stat named {stat:?}")]
    UnmatchedStat { stat: String },
    #[error("no tile at {0}")]
    TileOutOfBounds(Coordinate),
    #[error("warp group {0} has no exit to leave from")]
    BadWarpGroup(WarpGroupId),
    #[error("skill {skill:?}: {source}")]
    Skill {
        skill: String,
        #[source]
        source: Box<EngineError>,
    },
    #[error("resolving unit {name:?}: {source}")]
    Unit {
        name: String,
        #[source]
        source: Box<EngineError>,
    },
}

impl EngineError {
    pub fn in_skill(self, skill: &str) -> EngineError {
        EngineError::Skill { skill: skill.into(), source: Box::new(self) }
    }
    pub fn in_unit(self, name: &str) -> EngineError {
        EngineError::Unit { name: name.into(), source: Box::new(self) }
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("segment {0} is {1} tiles high, expected {2}")]
    SegmentHeightMismatch(SegmentId, i32, i32),
    #[error("no tile authored at {0}")]
    MissingTile(Coordinate),
    #[error("tile authored twice at {0}")]
    DuplicateTile(Coordinate),
    #[error("tile at {0} outside every segment")]
    TileOutsideSegments(Coordinate),
    #[error("warp group {0} needs both an entrance and an exit")]
    BadWarpGroup(WarpGroupId),
    #[error(transparent)]
    Catalog(#[from] model::CatalogError),
}
