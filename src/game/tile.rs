use crate::game::*;
use std::collections::HashSet;

impl Tile {
    pub fn new(coordinate: Coordinate, terrain: TerrainTypeId, segment: SegmentId) -> Tile {
        Tile {
            coordinate,
            terrain,
            segment,
            neighbors: Vec::new(),
            warp_group: None,
            occupant: None,
            obstructed_by: HashSet::new(),
            cost_affected_by: HashSet::new(),
        }
    }

    /// Drops everything rebuilt per solve: occupancy and effect annotations.
    pub fn clear_annotations(&mut self) {
        self.occupant = None;
        self.obstructed_by.clear();
        self.cost_affected_by.clear();
    }

    /// Obstruction allows movement onto this tile but not through it.
    /// It only binds units the obstructor is not allied with.
    pub fn obstructs(&self, mover: &Unit, roster: &[Unit]) -> bool {
        self.obstructed_by
            .iter()
            .any(|&id| !roster[id].affiliation.allied_with(&mover.affiliation))
    }
}
