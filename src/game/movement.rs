use crate::game::*;
use crate::model::IMPASSABLE_COST;
use std::collections::{HashMap, HashSet, VecDeque};

/// One worklist entry: where the footprint anchor sits, what every footprint
/// cell still has to spend, and which anchors this particular path already
/// crossed. Different paths may re-reach a tile with different budgets; the
/// union of everything recordable is the answer.
struct PathState {
    anchor: Coordinate,
    budgets: Vec<i32>,
    visited: HashSet<Coordinate>,
    last_warp_exit: Option<Coordinate>,
}

struct StepInfo {
    costs: Vec<u32>,
    can_stop: bool,
    blocked_by_enemy: bool,
    obstructed: bool,
}

/// Full set of anchor coordinates the unit can move to, starting from its
/// current footprint with its full movement value.
pub fn movement_range(
    map: &Map,
    unit_id: UnitId,
    roster: &[Unit],
    overrides: &ActiveOverrides,
) -> Result<HashSet<Coordinate>, EngineError> {
    let unit = &roster[unit_id];
    let budget = match overrides.movement_override {
        Some(value) => value,
        None => unit.stats.value("Mov")?,
    };
    let offsets = unit.footprint_offsets();

    let mut result = HashSet::new();
    result.insert(unit.origin);

    // Pareto frontier of budget vectors per (anchor, warp-exit) key: a path
    // dominated on every cell cannot reach anything a kept path cannot.
    let mut frontier: HashMap<(Coordinate, Option<Coordinate>), Vec<Vec<i32>>> = HashMap::new();
    let mut queue = VecDeque::new();

    let initial = PathState {
        anchor: unit.origin,
        budgets: vec![budget; offsets.len()],
        visited: HashSet::from([unit.origin]),
        last_warp_exit: None,
    };
    frontier.insert((unit.origin, None), vec![initial.budgets.clone()]);
    queue.push_back(initial);

    while let Some(state) = queue.pop_front() {
        warp_fan_out(
            map, unit_id, roster, overrides, &offsets, &state, &mut result, &mut frontier,
            &mut queue,
        )?;

        for direction in enum_iterator::all::<Direction>() {
            let next = state.anchor.step(direction);
            if state.visited.contains(&next) {
                continue;
            }
            let Some(step) =
                evaluate_footprint(map, &next, &offsets, unit_id, roster, overrides)?
            else {
                continue;
            };

            let Some(budgets) = spend(&state.budgets, &step.costs) else {
                continue;
            };
            if step.blocked_by_enemy {
                continue;
            }
            if step.can_stop {
                result.insert(next);
            }
            if step.obstructed {
                // Entry is allowed; continuing past is not.
                continue;
            }
            push_state(&state, next, budgets, None, &mut frontier, &mut queue);
        }
    }

    Ok(result)
}

/// Validates the whole footprint at `anchor`. None means the path dies here:
/// off the grid, impassable for some cell, or terrain the unit's affiliation
/// may not enter.
fn evaluate_footprint(
    map: &Map,
    anchor: &Coordinate,
    offsets: &[(i32, i32)],
    unit_id: UnitId,
    roster: &[Unit],
    overrides: &ActiveOverrides,
) -> Result<Option<StepInfo>, EngineError> {
    let unit = &roster[unit_id];
    let mut info = StepInfo {
        costs: Vec::with_capacity(offsets.len()),
        can_stop: true,
        blocked_by_enemy: false,
        obstructed: false,
    };

    for &(dx, dy) in offsets {
        let Some(tile) = map.tile_at(&anchor.offset(dx, dy)) else {
            return Ok(None);
        };
        let terrain = map.terrain_at(tile);

        if !terrain.restricted_to.is_empty()
            && !terrain.restricted_to.contains(&unit.affiliation.grouping)
        {
            return Ok(None);
        }

        let cost = step_cost(map, tile, unit, roster, overrides)?;
        if cost >= IMPASSABLE_COST {
            return Ok(None);
        }
        info.costs.push(cost);

        if terrain.cannot_stop {
            info.can_stop = false;
        }
        if let Some(occupant) = tile.occupant {
            if occupant != unit_id
                && !roster[occupant].affiliation.allied_with(&unit.affiliation)
                && !overrides.ignore_affiliations
            {
                info.blocked_by_enemy = true;
            }
        }
        if tile.obstructs(unit, roster) {
            info.obstructed = true;
        }
    }

    Ok(Some(info))
}

fn spend(budgets: &[i32], costs: &[u32]) -> Option<Vec<i32>> {
    budgets
        .iter()
        .zip(costs)
        .map(|(&b, &c)| {
            let left = b - c as i32;
            if left < 0 { None } else { Some(left) }
        })
        .collect()
}

fn push_state(
    from: &PathState,
    anchor: Coordinate,
    budgets: Vec<i32>,
    warp_exit: Option<Coordinate>,
    frontier: &mut HashMap<(Coordinate, Option<Coordinate>), Vec<Vec<i32>>>,
    queue: &mut VecDeque<PathState>,
) {
    let last_warp_exit = warp_exit.or(from.last_warp_exit);
    let known = frontier.entry((anchor, last_warp_exit)).or_default();
    if known.iter().any(|seen| dominates(seen, &budgets)) {
        return;
    }
    known.retain(|seen| !dominates(&budgets, seen));
    known.push(budgets.clone());

    let mut visited = from.visited.clone();
    visited.insert(anchor);
    queue.push_back(PathState { anchor, budgets, visited, last_warp_exit });
}

fn dominates(a: &[i32], b: &[i32]) -> bool {
    a.iter().zip(b).all(|(x, y)| x >= y)
}

/// Entering any entrance of a warp group permits leaving at any exit of the
/// same group, at the group's resolved warp cost, in any footprint rotation
/// around the exit anchor. The exit just used does not warp straight back.
fn warp_fan_out(
    map: &Map,
    unit_id: UnitId,
    roster: &[Unit],
    overrides: &ActiveOverrides,
    offsets: &[(i32, i32)],
    state: &PathState,
    result: &mut HashSet<Coordinate>,
    frontier: &mut HashMap<(Coordinate, Option<Coordinate>), Vec<Vec<i32>>>,
    queue: &mut VecDeque<PathState>,
) -> Result<(), EngineError> {
    let Some(tile) = map.tile_at(&state.anchor) else {
        return Ok(());
    };
    let Some(group) = tile.warp_group else {
        return Ok(());
    };
    if !map.terrain_at(tile).warp.is_entrance() {
        return Ok(());
    }
    if state.last_warp_exit == Some(state.anchor) {
        return Ok(());
    }

    let cost = warp_cost(map, tile, overrides);
    let exits: Vec<Coordinate> = map
        .warp_exits(group)
        .into_iter()
        .map(|id| map.get(id).coordinate)
        .filter(|&exit| exit != state.anchor)
        .collect();
    if exits.is_empty() {
        return Err(EngineError::BadWarpGroup(group));
    }

    for exit in exits {
        for &(dx, dy) in offsets {
            let landing = exit.offset(-dx, -dy);
            if state.visited.contains(&landing) {
                continue;
            }
            let Some(step) =
                evaluate_footprint(map, &landing, offsets, unit_id, roster, overrides)?
            else {
                continue;
            };
            let Some(budgets) = spend(&state.budgets, &vec![cost; offsets.len()]) else {
                continue;
            };
            if step.blocked_by_enemy {
                continue;
            }
            if step.can_stop {
                result.insert(landing);
            }
            if step.obstructed {
                continue;
            }
            push_state(state, landing, budgets, Some(exit), frontier, queue);
        }
    }
    Ok(())
}
