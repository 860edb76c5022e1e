use crate::game::*;
use crate::model::{Grouping, IMPASSABLE_COST, TerrainType};
use std::collections::HashSet;

/// Per-unit movement context, collected from the unit's skills once before
/// its flood fill runs.
#[derive(Clone, Debug, Default)]
pub struct ActiveOverrides {
    pub cost_sets: Vec<(Vec<Grouping>, u32, bool)>,
    pub cost_mods: Vec<(Vec<Grouping>, i32)>,
    pub ignore_affiliations: bool,
    pub movement_override: Option<i32>,
    pub teleport_targets: HashSet<Coordinate>,
}

impl ActiveOverrides {
    pub fn for_unit(unit_id: UnitId, roster: &[Unit], map: &Map) -> ActiveOverrides {
        let unit = &roster[unit_id];
        let mut overrides = ActiveOverrides::default();
        for effect in unit.skills.iter().filter_map(|s| s.effect.as_ref()) {
            if let Some((groupings, cost, allow_impassable)) = effect.cost_set() {
                overrides.cost_sets.push((groupings.to_vec(), cost, allow_impassable));
            }
            if let Some((groupings, delta)) = effect.cost_modifier() {
                overrides.cost_mods.push((groupings.to_vec(), delta));
            }
            if effect.ignores_affiliations() {
                overrides.ignore_affiliations = true;
            }
            if let Some(value) = effect.movement_override() {
                overrides.movement_override = Some(value);
            }
            if let Some((radius, same_affiliation)) = effect.warp_to_units() {
                for (other_id, other) in roster.iter().enumerate() {
                    if other_id == unit_id {
                        continue;
                    }
                    if other.affiliation.allied_with(&unit.affiliation) != same_affiliation {
                        continue;
                    }
                    overrides
                        .teleport_targets
                        .extend(map.tiles_within(&other.origin, radius));
                }
            }
        }
        overrides
    }

    fn matching_set(&self, terrain: &TerrainType, impassable: bool) -> Option<u32> {
        self.cost_sets
            .iter()
            .find(|(groupings, _, allow_impassable)| {
                groupings.iter().any(|g| terrain.groupings.contains(g))
                    && (!impassable || *allow_impassable)
            })
            .map(|&(_, cost, _)| cost)
    }

    fn modifier_shift(&self, terrain: &TerrainType) -> i32 {
        self.cost_mods
            .iter()
            .filter(|(groupings, _)| groupings.iter().any(|g| terrain.groupings.contains(g)))
            .map(|&(_, delta)| delta)
            .sum()
    }
}

/// Cost of stepping onto `tile` for `mover`, with effect overrides layered
/// over the terrain table. Values at or above `IMPASSABLE_COST` terminate
/// the path; the starting tile is never charged by the solver.
pub fn step_cost(
    map: &Map,
    tile: &Tile,
    mover: &Unit,
    roster: &[Unit],
    overrides: &ActiveOverrides,
) -> Result<u32, EngineError> {
    let terrain = map.terrain_at(tile);
    let base = terrain.cost_for(&mover.movement_type).ok_or_else(|| {
        EngineError::UnmatchedMovementType {
            terrain: terrain.name.clone(),
            movement_type: mover.movement_type.clone(),
        }
    })?;
    let impassable = base >= IMPASSABLE_COST;

    let mut cost = match overrides.matching_set(terrain, impassable) {
        Some(set) => set as i32,
        None if impassable => base as i32,
        None => base as i32 + overrides.modifier_shift(terrain),
    };

    // An allied occupant carrying an ally-cost effect undercuts the terrain.
    if let Some(occupant_id) = tile.occupant {
        if tile.cost_affected_by.contains(&occupant_id) {
            let occupant = &roster[occupant_id];
            if occupant.affiliation.allied_with(&mover.affiliation) {
                let floor = occupant
                    .skills
                    .iter()
                    .filter_map(|s| s.effect.as_ref().and_then(Effect::ally_cost))
                    .min();
                if let Some(floor) = floor {
                    cost = cost.min(floor as i32);
                }
            }
        }
    }

    Ok(cost.max(0) as u32)
}

/// Warp cost for stepping through an entrance, resolved with the same
/// SET/MODIFIER precedence as ordinary terrain cost.
pub fn warp_cost(map: &Map, tile: &Tile, overrides: &ActiveOverrides) -> u32 {
    let terrain = map.terrain_at(tile);
    let base = terrain.warp_cost as i32;
    let cost = match overrides.matching_set(terrain, false) {
        Some(set) => set as i32,
        None => base + overrides.modifier_shift(terrain),
    };
    cost.max(0) as u32
}
