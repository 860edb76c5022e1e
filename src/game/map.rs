use crate::game::*;
use crate::model::{self, TerrainCatalog, TerrainType, WarpKind};
use crate::util::*;
use std::collections::HashMap;

/// Construction input for one rectangular segment.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub width: i32,
    pub height: i32,
    #[serde(rename = "pxWidth")]
    pub px_width: u32,
    #[serde(rename = "pxHeight")]
    pub px_height: u32,
}

/// Construction input for one tile, in global coordinates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TileSpec {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub terrain: String,
    #[serde(rename = "warpGroup", default)]
    pub warp_group: Option<WarpGroupId>,
}

impl TileSpec {
    pub fn plain(x: i32, y: i32, terrain: &str) -> TileSpec {
        TileSpec { x, y, terrain: terrain.into(), warp_group: None }
    }
    pub fn warp(x: i32, y: i32, terrain: &str, group: WarpGroupId) -> TileSpec {
        TileSpec { x, y, terrain: terrain.into(), warp_group: Some(group) }
    }
}

impl Map {
    pub fn new(
        segments: Vec<SegmentSpec>,
        terrain: Vec<TerrainType>,
        tiles: Vec<TileSpec>,
    ) -> Result<Map, MapError> {
        let catalog = TerrainCatalog::build(terrain)?;

        // Segments share one row count; widths accumulate into x offsets.
        let height = segments.first().map(|s| s.height).unwrap_or(0);
        let mut placed = Vec::new();
        let mut x_offset = 0;
        for (id, spec) in segments.iter().enumerate() {
            if spec.height != height {
                return Err(MapError::SegmentHeightMismatch(id, spec.height, height));
            }
            placed.push(Segment {
                width: spec.width,
                height: spec.height,
                px_width: spec.px_width,
                px_height: spec.px_height,
                x_offset,
            });
            x_offset += spec.width;
        }
        let total_width = x_offset;

        let segment_of = |c: &Coordinate| -> Option<SegmentId> {
            if c.y < 1 || c.y > height {
                return None;
            }
            placed
                .iter()
                .enumerate()
                .filter(|(_, s)| c.x > s.x_offset && c.x <= s.x_offset + s.width)
                .only()
                .map(|(id, _)| id)
        };

        let mut arena: Vec<Tile> = Vec::with_capacity(tiles.len());
        let mut index = HashMap::new();
        for spec in &tiles {
            let coordinate = Coordinate::new(spec.x, spec.y);
            let segment =
                segment_of(&coordinate).ok_or(MapError::TileOutsideSegments(coordinate))?;
            let terrain = catalog.id_of(&spec.terrain)?;
            let tile_id = arena.len();
            if index.insert(coordinate, tile_id).is_some() {
                return Err(MapError::DuplicateTile(coordinate));
            }
            let mut tile = Tile::new(coordinate, terrain, segment);
            tile.warp_group = spec.warp_group;
            arena.push(tile);
        }

        // Every segment cell must be authored.
        for y in 1..=height {
            for x in 1..=total_width {
                let coordinate = Coordinate::new(x, y);
                if !index.contains_key(&coordinate) {
                    return Err(MapError::MissingTile(coordinate));
                }
            }
        }

        // Neighbor links are fixed here and never recomputed.
        for tile_id in 0..arena.len() {
            let neighbors: Vec<TileId> = arena[tile_id]
                .coordinate
                .neighbors()
                .filter_map(|c| index.get(&c).copied())
                .collect();
            arena[tile_id].neighbors = neighbors;
        }

        let mut warp_groups: HashMap<WarpGroupId, Vec<TileId>> = HashMap::new();
        for (tile_id, tile) in arena.iter().enumerate() {
            if let Some(group) = tile.warp_group {
                warp_groups.entry(group).or_default().push(tile_id);
            }
        }
        for (&group, members) in &warp_groups {
            let entrances: Vec<TileId> = members
                .iter()
                .copied()
                .filter(|&id| catalog.get(arena[id].terrain).warp.is_entrance())
                .collect();
            if entrances.is_empty() {
                return Err(MapError::BadWarpGroup(group));
            }
            // Each entrance needs an exit on some other tile; a lone Dual
            // tile has nowhere to leave to.
            for &entrance in &entrances {
                let has_exit = members
                    .iter()
                    .any(|&id| id != entrance && catalog.get(arena[id].terrain).warp.is_exit());
                if !has_exit {
                    return Err(MapError::BadWarpGroup(group));
                }
            }
        }

        Ok(Map {
            name: String::new(),
            segments: placed,
            terrain: catalog,
            tiles: arena,
            index,
            warp_groups,
        })
    }

    pub fn width(&self) -> i32 {
        self.segments.iter().map(|s| s.width).sum()
    }
    pub fn height(&self) -> i32 {
        self.segments.first().map(|s| s.height).unwrap_or(0)
    }

    pub fn tile_at(&self, coordinate: &Coordinate) -> Option<&Tile> {
        self.index.get(coordinate).map(|&id| &self.tiles[id])
    }
    pub fn tile_at_mut(&mut self, coordinate: &Coordinate) -> Option<&mut Tile> {
        match self.index.get(coordinate) {
            Some(&id) => Some(&mut self.tiles[id]),
            None => None,
        }
    }
    pub fn get(&self, tile_id: TileId) -> &Tile {
        &self.tiles[tile_id]
    }
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }
    pub fn terrain_at(&self, tile: &Tile) -> &TerrainType {
        self.terrain.get(tile.terrain)
    }

    /// Coordinates of every tile within `radius` Manhattan steps of `center`,
    /// the center included.
    pub fn tiles_within(&self, center: &Coordinate, radius: u32) -> Vec<Coordinate> {
        let r = radius as i32;
        let mut result = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                if dx.abs() + dy.abs() > r {
                    continue;
                }
                let candidate = center.offset(dx, dy);
                if self.index.contains_key(&candidate) {
                    result.push(candidate);
                }
            }
        }
        result
    }

    /// Exit tiles of a warp group, anchor-ordered for deterministic fan-out.
    pub fn warp_exits(&self, group: WarpGroupId) -> Vec<TileId> {
        let mut exits: Vec<TileId> = self
            .warp_groups
            .get(&group)
            .into_iter()
            .flatten()
            .copied()
            .filter(|&id| self.terrain.get(self.tiles[id].terrain).warp.is_exit())
            .collect();
        exits.sort_by_key(|&id| self.tiles[id].coordinate);
        exits
    }

    pub fn clear_annotations(&mut self) {
        for tile in &mut self.tiles {
            tile.clear_annotations();
        }
    }

    /// Rebuilds tile occupancy from the roster. Every footprint cell of
    /// every unit must land on an authored tile.
    pub fn place_roster(&mut self, roster: &[Unit]) -> Result<(), EngineError> {
        for (unit_id, unit) in roster.iter().enumerate() {
            for offset in unit.footprint_offsets() {
                let coordinate = unit.origin.offset(offset.0, offset.1);
                match self.index.get(&coordinate) {
                    Some(&tile_id) => self.tiles[tile_id].occupant = Some(unit_id),
                    None => {
                        return Err(
                            EngineError::TileOutOfBounds(coordinate).in_unit(&unit.name)
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

// JSON fixture format, used by tests and the debug binary. Production
// callers hand the engine a pre-built map and roster.

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("fixture parse error")]
    Text(#[from] serde_json::Error),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Effect(#[from] EffectError),
}

#[derive(Serialize, Deserialize)]
struct JsonFixture {
    name: String,
    terrain: Vec<TerrainType>,
    segments: Vec<SegmentSpec>,
    #[serde(rename = "mapData")]
    map_data: Vec<TileSpec>,
    #[serde(default)]
    units: Vec<JsonUnit>,
}

#[derive(Serialize, Deserialize)]
struct JsonUnit {
    name: String,
    x: i32,
    y: i32,
    affiliation: String,
    grouping: Grouping,
    #[serde(rename = "movementType")]
    movement_type: String,
    #[serde(default)]
    stats: HashMap<String, i32>,
    #[serde(default)]
    items: Vec<model::Item>,
    #[serde(default)]
    skills: Vec<model::SkillDef>,
}

impl JsonUnit {
    fn as_unit(&self) -> Result<Unit, EffectError> {
        let mut unit = Unit::on_foot(&self.name, Coordinate::new(self.x, self.y), 0);
        unit.affiliation = model::Affiliation::new(&self.affiliation, self.grouping);
        unit.movement_type = self.movement_type.clone();
        for (stat, &base) in &self.stats {
            unit.stats.insert_base(stat, base);
        }
        unit.inventory = self.items.iter().cloned().map(Some).collect();
        unit.skills = self
            .skills
            .iter()
            .map(Skill::from_def)
            .collect::<Result<_, _>>()?;
        Ok(unit)
    }
}

impl Map {
    pub fn from_json(data: &str) -> Result<(Map, Vec<Unit>), FixtureError> {
        let fixture: JsonFixture = serde_json::from_str(data)?;
        let mut map = Map::new(fixture.segments, fixture.terrain, fixture.map_data)?;
        map.name = fixture.name;
        let roster = fixture
            .units
            .iter()
            .map(JsonUnit::as_unit)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((map, roster))
    }
}

#[cfg(test)]
mod test {
    use crate::game::*;
    use crate::model::*;
    const CROSSING_MAP: &str = include_str!("../../data/maps/crossing.json");

    fn plains_terrain() -> Vec<TerrainType> {
        vec![TerrainType::new("Plains", &[("Foot", 1)])]
    }

    fn full_grid(width: i32, height: i32) -> Vec<TileSpec> {
        (1..=height)
            .flat_map(|y| (1..=width).map(move |x| TileSpec::plain(x, y, "Plains")))
            .collect()
    }

    #[test]
    fn read_fixture() {
        let (map, roster) = Map::from_json(CROSSING_MAP).unwrap();
        assert_eq!(map.name, "Crossing");
        assert_eq!(map.width(), 7);
        assert_eq!(map.height(), 5);
        assert!(!roster.is_empty());
        assert_eq!(roster[0].movement_type, "Foot");
    }

    #[test]
    fn segments_stitch_contiguously() {
        let segments = vec![
            SegmentSpec { width: 2, height: 3, px_width: 64, px_height: 96 },
            SegmentSpec { width: 3, height: 3, px_width: 96, px_height: 96 },
        ];
        let map = Map::new(segments, plains_terrain(), full_grid(5, 3)).unwrap();
        assert_eq!(map.width(), 5);
        assert_eq!(map.tile_at(&Coordinate::new(3, 1)).unwrap().segment, 1);
        assert_eq!(map.tile_at(&Coordinate::new(2, 1)).unwrap().segment, 0);
        assert_eq!(map.segments[1].x_offset, 2);
    }

    #[test]
    fn mismatched_segment_heights_rejected() {
        let segments = vec![
            SegmentSpec { width: 2, height: 3, px_width: 64, px_height: 96 },
            SegmentSpec { width: 2, height: 4, px_width: 64, px_height: 128 },
        ];
        let result = Map::new(segments, plains_terrain(), Vec::new());
        assert_eq!(result.unwrap_err(), MapError::SegmentHeightMismatch(1, 4, 3));
    }

    #[test]
    fn missing_tile_rejected() {
        let segments = vec![SegmentSpec { width: 2, height: 2, px_width: 64, px_height: 64 }];
        let mut tiles = full_grid(2, 2);
        tiles.pop();
        let result = Map::new(segments, plains_terrain(), tiles);
        assert_eq!(result.unwrap_err(), MapError::MissingTile(Coordinate::new(2, 2)));
    }

    #[test]
    fn one_sided_warp_group_rejected() {
        let mut gate = TerrainType::new("Gate", &[("Foot", 1)]);
        gate.warp = WarpKind::Entrance;
        let terrain = vec![TerrainType::new("Plains", &[("Foot", 1)]), gate];
        let segments = vec![SegmentSpec { width: 2, height: 1, px_width: 64, px_height: 32 }];
        let tiles = vec![
            TileSpec::warp(1, 1, "Gate", 7),
            TileSpec::plain(2, 1, "Plains"),
        ];
        let result = Map::new(segments, terrain, tiles);
        assert_eq!(result.unwrap_err(), MapError::BadWarpGroup(7));
    }

    #[test]
    fn solitary_dual_warp_tile_rejected() {
        let mut rift = TerrainType::new("Rift", &[("Foot", 1)]);
        rift.warp = WarpKind::Dual;
        let terrain = vec![TerrainType::new("Plains", &[("Foot", 1)]), rift];
        let segments = vec![SegmentSpec { width: 3, height: 1, px_width: 96, px_height: 32 }];
        let tiles = vec![
            TileSpec::plain(1, 1, "Plains"),
            TileSpec::plain(2, 1, "Plains"),
            TileSpec::warp(3, 1, "Rift", 4),
        ];
        // The single tile is both entrance and exit, so entering it would
        // leave a unit with nowhere to warp to.
        let result = Map::new(segments, terrain, tiles);
        assert_eq!(result.unwrap_err(), MapError::BadWarpGroup(4));
    }

    #[test]
    fn neighbors_fixed_at_construction() {
        let segments = vec![SegmentSpec { width: 3, height: 3, px_width: 96, px_height: 96 }];
        let map = Map::new(segments, plains_terrain(), full_grid(3, 3)).unwrap();
        let corner = map.tile_at(&Coordinate::new(1, 1)).unwrap();
        assert_eq!(corner.neighbors.len(), 2);
        let center = map.tile_at(&Coordinate::new(2, 2)).unwrap();
        assert_eq!(center.neighbors.len(), 4);
    }

    #[test]
    fn tiles_within_radius() {
        let segments = vec![SegmentSpec { width: 5, height: 5, px_width: 160, px_height: 160 }];
        let map = Map::new(segments, plains_terrain(), full_grid(5, 5)).unwrap();
        let near = map.tiles_within(&Coordinate::new(1, 1), 1);
        assert_eq!(near.len(), 3);
        let around_center = map.tiles_within(&Coordinate::new(3, 3), 2);
        assert_eq!(around_center.len(), 13);
    }
}
