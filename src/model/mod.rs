mod catalog;
pub use self::catalog::*;

use std::collections::{HashMap, HashSet};

/// Terrain costs at or above this value cannot be entered by that movement type.
pub const IMPASSABLE_COST: u32 = 99;
/// Hard cap on configured item reach, keeps the projection walk bounded.
pub const MAX_ITEM_RANGE: u32 = 15;
/// A configured maximum at or above this targets the whole map.
pub const WHOLE_MAP_RANGE: u32 = 99;

pub type Grouping = u32;

#[derive(PartialEq, Eq, Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub enum WarpKind {
    #[default]
    None,
    Entrance, Exit, Dual
}

impl WarpKind {
    pub fn is_entrance(&self) -> bool {
        matches!(self, WarpKind::Entrance | WarpKind::Dual)
    }
    pub fn is_exit(&self) -> bool {
        matches!(self, WarpKind::Exit | WarpKind::Dual)
    }
}

/// Immutable terrain definition shared by many tiles.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TerrainType {
    pub name: String,
    /// Movement-type key to cost. Missing keys are an authoring error.
    pub costs: HashMap<String, u32>,
    #[serde(default)]
    pub warp: WarpKind,
    /// Only meaningful for Entrance/Dual terrain.
    #[serde(default)]
    pub warp_cost: u32,
    #[serde(default)]
    pub cannot_stop: bool,
    #[serde(default)]
    pub blocks_items: bool,
    /// Affiliation groupings allowed on this terrain; empty means unrestricted.
    #[serde(default)]
    pub restricted_to: Vec<Grouping>,
    /// Generic terrain categories targeted by skill effects.
    #[serde(default)]
    pub groupings: HashSet<Grouping>,
}

impl TerrainType {
    pub fn new(name: &str, costs: &[(&str, u32)]) -> TerrainType {
        TerrainType {
            name: name.into(),
            costs: costs.iter().map(|&(k, v)| (k.into(), v)).collect(),
            warp: WarpKind::None,
            warp_cost: 0,
            cannot_stop: false,
            blocks_items: false,
            restricted_to: Vec::new(),
            groupings: HashSet::new(),
        }
    }
    pub fn cost_for(&self, movement_type: &str) -> Option<u32> {
        self.costs.get(movement_type).copied()
    }
}

#[derive(PartialEq, Eq, Copy, Clone, Debug, Serialize, Deserialize, enum_iterator::Sequence)]
pub enum RangeShape {
    Standard, Square, Cross, Saltire, Star
}

impl RangeShape {
    /// Shapes whose farthest tiles sit at twice the configured maximum
    /// in Manhattan terms (box corners and diagonals).
    pub fn is_symmetric(&self) -> bool {
        matches!(self, RangeShape::Square | RangeShape::Saltire | RangeShape::Star)
    }
}

#[derive(PartialEq, Eq, Copy, Clone, Debug, Serialize, Deserialize)]
pub struct RangeProfile {
    pub min: u32,
    pub max: u32,
    pub shape: RangeShape,
    /// Adjacent tiles count even when below the configured minimum.
    pub melee_override: bool,
}

impl RangeProfile {
    pub fn standard(min: u32, max: u32) -> RangeProfile {
        RangeProfile { min, max, shape: RangeShape::Standard, melee_override: false }
    }
    pub fn targets_whole_map(&self) -> bool {
        self.max >= WHOLE_MAP_RANGE
    }
    /// Configured maximum clamped to the projection cap, whole-map aside.
    pub fn capped_max(&self) -> u32 {
        if self.targets_whole_map() { self.max } else { self.max.min(MAX_ITEM_RANGE) }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub category: String,
    pub range: Option<RangeProfile>,
    pub usable: bool,
    /// None means unlimited; Some(0) is use-exhausted.
    pub uses_left: Option<u32>,
    pub deals_damage: bool,
}

impl Item {
    pub fn weapon(name: &str, category: &str, range: RangeProfile) -> Item {
        Item {
            name: name.into(),
            category: category.into(),
            range: Some(range),
            usable: true,
            uses_left: None,
            deals_damage: true,
        }
    }
    pub fn staff(name: &str, range: RangeProfile) -> Item {
        Item { deals_damage: false, ..Item::weapon(name, "Staff", range) }
    }
    pub fn projects(&self) -> bool {
        self.usable && self.uses_left != Some(0) && self.range.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affiliation {
    pub name: String,
    /// Numeric category deciding ally/enemy relationships.
    pub grouping: Grouping,
}

impl Affiliation {
    pub fn new(name: &str, grouping: Grouping) -> Affiliation {
        Affiliation { name: name.into(), grouping }
    }
    pub fn allied_with(&self, other: &Affiliation) -> bool {
        self.grouping == other.grouping
    }
}
