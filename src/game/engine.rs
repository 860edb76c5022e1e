//! One-shot batch resolution. Effects are evaluated in a documented order:
//! roster order, then skill-list order within a unit; stat-affecting effects
//! run in a first pass and obstruction/cost marking in a second, so radius
//! effects read final stat values. Movement overrides and teleport targets
//! are consumed later, during each unit's own solve.

use crate::game::*;
use tracing::{debug, warn};

/// Resolves the whole request: clears per-solve state, applies every skill
/// effect, then computes movement, attack and utility ranges for each unit
/// in roster order. The first failing unit aborts the batch, wrapped with
/// enough context to name the unit and skill at fault.
pub fn resolve(map: &mut Map, roster: &mut [Unit]) -> Result<(), EngineError> {
    map.clear_annotations();
    for unit in roster.iter_mut() {
        unit.stats.clear_modifiers();
        unit.clear_ranges();
    }
    map.place_roster(roster)?;

    apply_stat_effects(roster)?;
    mark_tiles(map, roster);

    for unit_id in 0..roster.len() {
        debug!(unit = %roster[unit_id].name, "resolving ranges");
        if let Err(error) = resolve_unit(map, roster, unit_id) {
            let wrapped = error.in_unit(&roster[unit_id].name);
            warn!(%wrapped, "range resolution failed");
            return Err(wrapped);
        }
    }
    Ok(())
}

fn apply_stat_effects(roster: &mut [Unit]) -> Result<(), EngineError> {
    for unit_id in 0..roster.len() {
        for skill_index in 0..roster[unit_id].skills.len() {
            let skill = roster[unit_id].skills[skill_index].clone();
            let Some(effect) = &skill.effect else {
                continue;
            };
            for (target, stat, value) in effect.stat_changes(unit_id, roster) {
                roster[target]
                    .stats
                    .add_modifier(&stat, &skill.name, value)
                    .map_err(|e| e.in_skill(&skill.name).in_unit(&roster[unit_id].name))?;
            }
        }
    }
    Ok(())
}

/// Second effect pass: writes the per-solve tile annotations the solvers
/// read back later.
fn mark_tiles(map: &mut Map, roster: &[Unit]) {
    for (unit_id, unit) in roster.iter().enumerate() {
        for effect in unit.skills.iter().filter_map(|s| s.effect.as_ref()) {
            if let Some(radius) = effect.obstruct_radius() {
                for coordinate in map.tiles_within(&unit.origin, radius) {
                    if let Some(tile) = map.tile_at_mut(&coordinate) {
                        tile.obstructed_by.insert(unit_id);
                    }
                }
            }
            if effect.ally_cost().is_some() {
                for (dx, dy) in unit.footprint_offsets() {
                    if let Some(tile) = map.tile_at_mut(&unit.origin.offset(dx, dy)) {
                        tile.cost_affected_by.insert(unit_id);
                    }
                }
            }
        }
    }
}

fn resolve_unit(map: &Map, roster: &mut [Unit], unit_id: UnitId) -> Result<(), EngineError> {
    let overrides = ActiveOverrides::for_unit(unit_id, roster, map);
    let mut movement = movement_range(map, unit_id, roster, &overrides)?;
    // Teleport targets bypass the flood fill entirely.
    movement.extend(overrides.teleport_targets.iter().copied());
    let (attack, utility) = project_ranges(map, &roster[unit_id], &movement);

    let unit = &mut roster[unit_id];
    unit.movement_range = movement;
    unit.attack_range = attack;
    unit.utility_range = utility;
    Ok(())
}

/// Ascii picture of one unit's resolved ranges, for the debug binary and
/// eyeball tests. `@` origin, `M` movement, `A` attack, `U` utility,
/// `#` item-blocking terrain.
pub fn ascii_ranges(map: &Map, unit: &Unit) -> String {
    let mut rows = Vec::new();
    for y in 1..=map.height() {
        let mut row = String::new();
        for x in 1..=map.width() {
            let coordinate = Coordinate::new(x, y);
            let glyph = if coordinate == unit.origin {
                '@'
            } else if unit.movement_range.contains(&coordinate) {
                'M'
            } else if unit.attack_range.contains(&coordinate) {
                'A'
            } else if unit.utility_range.contains(&coordinate) {
                'U'
            } else {
                match map.tile_at(&coordinate) {
                    Some(tile) if map.terrain_at(tile).blocks_items => '#',
                    Some(_) => '.',
                    None => ' ',
                }
            };
            row.push(glyph);
        }
        rows.push(row);
    }
    rows.push(format!("{}: @origin Mmove Aattack Uutility", unit.name));
    rows.join("\n")
}
