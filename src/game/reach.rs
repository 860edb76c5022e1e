use crate::game::*;
use crate::model::{Item, RangeProfile, RangeShape};
use std::collections::{HashMap, HashSet, VecDeque};

/// Projection fans out from a tile along the four quadrants; within one
/// quadrant only its two cardinal directions are walked, so every recorded
/// path is monotone and its length equals the Manhattan distance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, enum_iterator::Sequence)]
pub enum Quadrant {
    NorthEast, NorthWest, SouthEast, SouthWest
}

impl Quadrant {
    pub fn deltas(&self) -> [(i32, i32); 2] {
        match self {
            Quadrant::NorthEast => [(1, 0), (0, -1)],
            Quadrant::NorthWest => [(-1, 0), (0, -1)],
            Quadrant::SouthEast => [(1, 0), (0, 1)],
            Quadrant::SouthWest => [(-1, 0), (0, 1)],
        }
    }
}

/// Attack and utility tiles for a unit, projected from every tile of its
/// movement range. Damaging items feed the first set, non-damaging the
/// second; a tile never enters both from the same item.
pub fn project_ranges(
    map: &Map,
    unit: &Unit,
    movement: &HashSet<Coordinate>,
) -> (HashSet<Coordinate>, HashSet<Coordinate>) {
    let mut attack = HashSet::new();
    let mut utility = HashSet::new();

    let mut walked_items: Vec<&Item> = Vec::new();
    for item in unit.items().filter(|i| i.projects()) {
        let Some(profile) = &item.range else {
            continue;
        };
        if profile.targets_whole_map() {
            // Whole-map items skip the geometric walk entirely.
            let target = if item.deals_damage { &mut attack } else { &mut utility };
            for tile in map.iter() {
                if movement.contains(&tile.coordinate) || map.terrain_at(tile).blocks_items {
                    continue;
                }
                target.insert(tile.coordinate);
            }
        } else {
            walked_items.push(item);
        }
    }

    let limit = walked_items
        .iter()
        .filter_map(|i| i.range.as_ref())
        .map(walk_limit)
        .max()
        .unwrap_or(0);
    if limit == 0 {
        return (attack, utility);
    }

    for &from in movement {
        let reached = quadrant_walk(map, &from, limit);
        for (&candidate, &steps) in &reached {
            if movement.contains(&candidate) {
                continue;
            }
            let dx = candidate.x - from.x;
            let dy = candidate.y - from.y;
            for item in &walked_items {
                let profile = match &item.range {
                    Some(p) => p,
                    None => continue,
                };
                if in_shape(profile, dx, dy, steps) {
                    if item.deals_damage {
                        attack.insert(candidate);
                    } else {
                        utility.insert(candidate);
                    }
                }
            }
        }
    }

    (attack, utility)
}

/// Symmetric shapes reach their farthest tiles at twice the configured
/// maximum in Manhattan terms (box corners, diagonal ends).
fn walk_limit(profile: &RangeProfile) -> u32 {
    let max = profile.capped_max();
    if profile.shape.is_symmetric() { max * 2 } else { max }
}

/// Minimum monotone path length to every tile reachable from `from` within
/// `limit` steps. Terrain that blocks item ranges is recorded as a target
/// but never walked through.
fn quadrant_walk(map: &Map, from: &Coordinate, limit: u32) -> HashMap<Coordinate, u32> {
    let mut reached: HashMap<Coordinate, u32> = HashMap::new();
    for quadrant in enum_iterator::all::<Quadrant>() {
        let mut seen = HashSet::from([*from]);
        let mut queue = VecDeque::from([(*from, 0u32)]);
        while let Some((coordinate, steps)) = queue.pop_front() {
            if steps == limit {
                continue;
            }
            for (dx, dy) in quadrant.deltas() {
                let next = coordinate.offset(dx, dy);
                if !seen.insert(next) {
                    continue;
                }
                let Some(tile) = map.tile_at(&next) else {
                    continue;
                };
                reached
                    .entry(next)
                    .and_modify(|s| *s = (*s).min(steps + 1))
                    .or_insert(steps + 1);
                if !map.terrain_at(tile).blocks_items {
                    queue.push_back((next, steps + 1));
                }
            }
        }
    }
    reached
}

fn in_shape(profile: &RangeProfile, dx: i32, dy: i32, steps: u32) -> bool {
    let min = profile.min;
    let max = profile.capped_max();
    let ax = dx.unsigned_abs();
    let ay = dy.unsigned_abs();
    let distance = ax + ay;

    let in_band = |d: u32| d >= min && d <= max;

    match profile.shape {
        // The melee override admits adjacent tiles below the minimum; it
        // belongs to the standard band only, not the geometric shapes.
        RangeShape::Standard => {
            (in_band(distance) && in_band(steps))
                || (profile.melee_override && distance == 1 && steps == 1)
        }
        RangeShape::Square => ax <= max && ay <= max && (ax >= min || ay >= min),
        RangeShape::Cross => (ax == 0) != (ay == 0) && in_band(ax.max(ay)),
        RangeShape::Saltire => ax == ay && ax != 0 && in_band(ax),
        RangeShape::Star => {
            let on_axis = (ax == 0) != (ay == 0) && in_band(ax.max(ay));
            let on_diagonal = ax == ay && ax != 0 && in_band(ax);
            on_axis || on_diagonal
        }
    }
}

#[cfg(test)]
mod test {
    use crate::game::*;
    use crate::model::*;
    use std::collections::HashSet;

    fn open_map(width: i32, height: i32) -> Map {
        let terrain = vec![TerrainType::new("Plains", &[("Foot", 1)])];
        let segments = vec![SegmentSpec {
            width,
            height,
            px_width: width as u32 * 32,
            px_height: height as u32 * 32,
        }];
        let tiles = (1..=height)
            .flat_map(|y| (1..=width).map(move |x| TileSpec::plain(x, y, "Plains")))
            .collect();
        Map::new(segments, terrain, tiles).unwrap()
    }

    fn armed(name: &str, origin: Coordinate, item: Item) -> Unit {
        let mut unit = Unit::on_foot(name, origin, 0);
        unit.inventory = vec![Some(item)];
        unit
    }

    fn coords(raw: &[(i32, i32)]) -> HashSet<Coordinate> {
        raw.iter().map(Coordinate::from).collect()
    }

    #[test]
    fn cross_shape_follows_the_axes() {
        let map = open_map(9, 9);
        let profile = RangeProfile {
            min: 1,
            max: 2,
            shape: RangeShape::Cross,
            melee_override: false,
        };
        let unit = armed("Ballista", Coordinate::new(5, 5), Item::weapon("Bolt", "Siege", profile));
        let movement = coords(&[(5, 5)]);
        let (attack, utility) = project_ranges(&map, &unit, &movement);

        assert!(utility.is_empty());
        for included in [(5, 6), (5, 7), (6, 5), (7, 5), (4, 5), (5, 4)] {
            assert!(attack.contains(&Coordinate::from(&included)), "{:?}", included);
        }
        assert!(!attack.contains(&Coordinate::new(6, 6)), "off-axis");
        assert!(!attack.contains(&Coordinate::new(5, 9)), "out of range");
    }

    #[test]
    fn standard_bow_skips_adjacent_without_melee_override() {
        let map = open_map(7, 7);
        let bow = Item::weapon("Iron Bow", "Bow", RangeProfile::standard(2, 2));
        let unit = armed("Shamir", Coordinate::new(4, 4), bow);
        let movement = coords(&[(4, 4)]);
        let (attack, _) = project_ranges(&map, &unit, &movement);

        assert!(attack.contains(&Coordinate::new(4, 6)));
        assert!(attack.contains(&Coordinate::new(5, 5)));
        assert!(!attack.contains(&Coordinate::new(4, 5)));

        let mut close_counter = RangeProfile::standard(2, 2);
        close_counter.melee_override = true;
        let unit = armed("Shamir", Coordinate::new(4, 4), Item::weapon("Parthia", "Bow", close_counter));
        let (attack, _) = project_ranges(&map, &unit, &movement);
        assert!(attack.contains(&Coordinate::new(4, 5)));
    }

    #[test]
    fn melee_override_only_applies_to_standard_ranges() {
        let map = open_map(9, 9);
        let profile = RangeProfile {
            min: 2,
            max: 3,
            shape: RangeShape::Cross,
            melee_override: true,
        };
        let unit =
            armed("Ballista", Coordinate::new(5, 5), Item::weapon("Bolt", "Siege", profile));
        let movement = coords(&[(5, 5)]);
        let (attack, _) = project_ranges(&map, &unit, &movement);

        assert!(attack.contains(&Coordinate::new(5, 7)));
        assert!(!attack.contains(&Coordinate::new(5, 6)), "below the axis minimum");
    }

    #[test]
    fn square_shape_is_a_box() {
        let map = open_map(7, 7);
        let profile = RangeProfile {
            min: 1,
            max: 1,
            shape: RangeShape::Square,
            melee_override: false,
        };
        let unit = armed("Gambit", Coordinate::new(4, 4), Item::weapon("Onslaught", "Gambit", profile));
        let movement = coords(&[(4, 4)]);
        let (attack, _) = project_ranges(&map, &unit, &movement);

        assert_eq!(attack.len(), 8);
        assert!(attack.contains(&Coordinate::new(5, 5)), "box corner");
        assert!(attack.contains(&Coordinate::new(3, 4)));
    }

    #[test]
    fn saltire_and_star_shapes() {
        let map = open_map(9, 9);
        let saltire = RangeProfile {
            min: 1,
            max: 2,
            shape: RangeShape::Saltire,
            melee_override: false,
        };
        let unit =
            armed("Hero", Coordinate::new(5, 5), Item::weapon("Sunburst", "Spell", saltire));
        let movement = coords(&[(5, 5)]);
        let (attack, _) = project_ranges(&map, &unit, &movement);
        assert!(attack.contains(&Coordinate::new(6, 6)));
        assert!(attack.contains(&Coordinate::new(3, 3)));
        assert!(!attack.contains(&Coordinate::new(5, 6)));

        let star = RangeProfile { shape: RangeShape::Star, ..saltire };
        let unit = armed("Hero", Coordinate::new(5, 5), Item::weapon("Starfall", "Spell", star));
        let (attack, _) = project_ranges(&map, &unit, &movement);
        assert!(attack.contains(&Coordinate::new(6, 6)));
        assert!(attack.contains(&Coordinate::new(5, 6)));
        assert!(!attack.contains(&Coordinate::new(6, 7)));
    }

    #[test]
    fn blocking_terrain_stops_projection_through_it() {
        let mut wall = TerrainType::new("Wall", &[("Foot", IMPASSABLE_COST)]);
        wall.blocks_items = true;
        let terrain = vec![TerrainType::new("Plains", &[("Foot", 1)]), wall];
        let segments = vec![SegmentSpec { width: 5, height: 1, px_width: 160, px_height: 32 }];
        let tiles = vec![
            TileSpec::plain(1, 1, "Plains"),
            TileSpec::plain(2, 1, "Wall"),
            TileSpec::plain(3, 1, "Plains"),
            TileSpec::plain(4, 1, "Plains"),
            TileSpec::plain(5, 1, "Plains"),
        ];
        let map = Map::new(segments, terrain, tiles).unwrap();

        let bow = Item::weapon("Longbow", "Bow", RangeProfile::standard(1, 3));
        let unit = armed("Ashe", Coordinate::new(1, 1), bow);
        let movement = coords(&[(1, 1)]);
        let (attack, _) = project_ranges(&map, &unit, &movement);

        // The wall itself can be targeted; everything behind it cannot.
        assert!(attack.contains(&Coordinate::new(2, 1)));
        assert!(!attack.contains(&Coordinate::new(3, 1)));
        assert!(!attack.contains(&Coordinate::new(4, 1)));
    }

    #[test]
    fn whole_map_staff_reaches_everything_unblocked() {
        let map = open_map(4, 4);
        let staff = Item::staff("Fortify", RangeProfile::standard(1, WHOLE_MAP_RANGE));
        let unit = armed("Mercedes", Coordinate::new(1, 1), staff);
        let movement = coords(&[(1, 1), (2, 1)]);
        let (attack, utility) = project_ranges(&map, &unit, &movement);

        assert!(attack.is_empty());
        assert_eq!(utility.len(), 16 - movement.len());
        assert!(!utility.contains(&Coordinate::new(1, 1)));
    }

    #[test]
    fn damaging_and_utility_items_feed_separate_sets() {
        let map = open_map(5, 5);
        let mut unit = Unit::on_foot("Linhardt", Coordinate::new(3, 3), 0);
        unit.inventory = vec![
            Some(Item::weapon("Iron Sword", "Sword", RangeProfile::standard(1, 1))),
            Some(Item::staff("Heal", RangeProfile::standard(1, 2))),
        ];
        let movement = coords(&[(3, 3)]);
        let (attack, utility) = project_ranges(&map, &unit, &movement);

        assert!(attack.contains(&Coordinate::new(3, 4)));
        assert!(!attack.contains(&Coordinate::new(3, 5)));
        assert!(utility.contains(&Coordinate::new(3, 5)));
        assert!(utility.contains(&Coordinate::new(3, 4)));
    }

    #[test]
    fn exhausted_items_do_not_project() {
        let map = open_map(3, 3);
        let mut spent = Item::staff("Warp", RangeProfile::standard(1, 2));
        spent.uses_left = Some(0);
        let unit = armed("Manuela", Coordinate::new(2, 2), spent);
        let movement = coords(&[(2, 2)]);
        let (attack, utility) = project_ranges(&map, &unit, &movement);
        assert!(attack.is_empty());
        assert!(utility.is_empty());
    }

    #[test]
    fn projection_happens_from_every_movement_tile() {
        let map = open_map(6, 1);
        let sword = Item::weapon("Iron Sword", "Sword", RangeProfile::standard(1, 1));
        let unit = armed("Felix", Coordinate::new(1, 1), sword);
        let movement = coords(&[(1, 1), (2, 1), (3, 1)]);
        let (attack, _) = project_ranges(&map, &unit, &movement);
        assert_eq!(attack, coords(&[(4, 1)]));
    }
}
