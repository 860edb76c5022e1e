//! Serializable view of a resolved batch. Sets are flattened into sorted
//! vectors so two captures of the same resolution compare equal byte for
//! byte, in both the text and binary encodings.

use crate::game::{Coordinate, Map, Unit};
use serde::{Deserialize, Serialize};

pub const VERSION: &str = "0.1";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StatSnapshot {
    pub name: String,
    pub base: i32,
    pub modifiers: Vec<(String, i32)>,
    pub total: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UnitSnapshot {
    pub name: String,
    pub affiliation: String,
    pub origin: Coordinate,
    pub stats: Vec<StatSnapshot>,
    pub statuses: Vec<String>,
    pub movement_range: Vec<Coordinate>,
    pub attack_range: Vec<Coordinate>,
    pub utility_range: Vec<Coordinate>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ResolutionSnapshot {
    pub version: String,
    pub map: String,
    pub width: i32,
    pub height: i32,
    pub units: Vec<UnitSnapshot>,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Text parse error")]
    TextError(#[from] serde_json::Error),
    #[error("Binary parse error")]
    BinaryError(#[from] postcard::Error),
}

impl ResolutionSnapshot {
    pub fn capture(map: &Map, roster: &[Unit]) -> Self {
        ResolutionSnapshot {
            version: VERSION.into(),
            map: map.name.clone(),
            width: map.width(),
            height: map.height(),
            units: roster.iter().map(UnitSnapshot::capture).collect(),
        }
    }
    pub fn from_text(text: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(text)?)
    }
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(postcard::from_bytes(bytes)?)
    }
    pub fn as_text(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
    pub fn as_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(postcard::to_allocvec(self)?)
    }
}

impl UnitSnapshot {
    pub fn capture(unit: &Unit) -> Self {
        let mut stats: Vec<StatSnapshot> = unit
            .stats
            .iter()
            .map(|(name, stat)| StatSnapshot {
                name: name.clone(),
                base: stat.base,
                modifiers: stat.modifiers.iter().map(|m| (m.source.clone(), m.value)).collect(),
                total: stat.total(),
            })
            .collect();
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        UnitSnapshot {
            name: unit.name.clone(),
            affiliation: unit.affiliation.name.clone(),
            origin: unit.origin,
            stats,
            statuses: unit.statuses.clone(),
            movement_range: sorted(&unit.movement_range),
            attack_range: sorted(&unit.attack_range),
            utility_range: sorted(&unit.utility_range),
        }
    }
}

fn sorted(set: &std::collections::HashSet<Coordinate>) -> Vec<Coordinate> {
    let mut coordinates: Vec<Coordinate> = set.iter().copied().collect();
    coordinates.sort();
    coordinates
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::game::{self, Coordinate, SegmentSpec, TileSpec};
    use crate::model::TerrainType;

    fn resolved() -> (game::Map, Vec<game::Unit>) {
        let terrain = vec![TerrainType::new("Plains", &[("Foot", 1)])];
        let segments = vec![SegmentSpec { width: 3, height: 3, px_width: 96, px_height: 96 }];
        let tiles = (1..=3)
            .flat_map(|y| (1..=3).map(move |x| TileSpec::plain(x, y, "Plains")))
            .collect();
        let mut map = game::Map::new(segments, terrain, tiles).unwrap();
        let mut roster = vec![game::Unit::on_foot("Recruit", Coordinate::new(2, 2), 1)];
        game::resolve(&mut map, &mut roster).unwrap();
        (map, roster)
    }

    #[test]
    fn capture_round_trips_both_encodings() {
        let (map, roster) = resolved();
        let snapshot = ResolutionSnapshot::capture(&map, &roster);

        let text = snapshot.as_text().unwrap();
        assert_eq!(ResolutionSnapshot::from_text(&text).unwrap(), snapshot);

        let bytes = snapshot.as_bytes().unwrap();
        assert_eq!(ResolutionSnapshot::from_bytes(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn capture_is_deterministic() {
        let (map, roster) = resolved();
        let first = ResolutionSnapshot::capture(&map, &roster).as_text().unwrap();
        let second = ResolutionSnapshot::capture(&map, &roster).as_text().unwrap();
        assert_eq!(first, second);

        let snapshot = ResolutionSnapshot::capture(&map, &roster);
        let movement = &snapshot.units[0].movement_range;
        assert!(movement.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
