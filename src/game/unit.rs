use crate::game::*;
use crate::model;
use std::collections::HashSet;

impl Stats {
    pub fn insert_base(&mut self, name: &str, base: i32) {
        self.0.insert(name.into(), Stat { base, modifiers: Vec::new() });
    }
    pub fn get(&self, name: &str) -> Option<&Stat> {
        self.0.get(name)
    }
    /// Final value: base plus every named modifier.
    pub fn value(&self, name: &str) -> Result<i32, EngineError> {
        self.0
            .get(name)
            .map(Stat::total)
            .ok_or_else(|| EngineError::UnmatchedStat { stat: name.into() })
    }
    /// Adds a contribution keyed by its source skill. Unknown stat names are
    /// an authoring error.
    pub fn add_modifier(&mut self, name: &str, source: &str, value: i32) -> Result<(), EngineError> {
        let stat = self
            .0
            .get_mut(name)
            .ok_or_else(|| EngineError::UnmatchedStat { stat: name.into() })?;
        stat.modifiers.push(Modifier { source: source.into(), value });
        Ok(())
    }
    /// Drops every modifier, leaving base values. Run before each batch so
    /// effect contributions never accumulate across requests.
    pub fn clear_modifiers(&mut self) {
        for stat in self.0.values_mut() {
            stat.modifiers.clear();
        }
    }
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Stat)> {
        self.0.iter()
    }
}

impl Stat {
    pub fn total(&self) -> i32 {
        self.base + self.modifiers.iter().map(|m| m.value).sum::<i32>()
    }
}

impl Unit {
    /// Bare single-tile foot unit; fixture loading and tests flesh it out.
    pub fn on_foot(name: &str, origin: Coordinate, mov: i32) -> Unit {
        let mut stats = Stats::default();
        stats.insert_base("Mov", mov);
        stats.insert_base("HP", 20);
        stats.insert_base("Max HP", 20);
        Unit {
            name: name.into(),
            affiliation: model::Affiliation::new("Player", 0),
            footprint: 1,
            origin,
            movement_type: "Foot".into(),
            stats,
            inventory: Vec::new(),
            skills: Vec::new(),
            statuses: Vec::new(),
            movement_range: HashSet::new(),
            attack_range: HashSet::new(),
            utility_range: HashSet::new(),
        }
    }

    /// Cell offsets of the n x n footprint, anchored at the origin.
    pub fn footprint_offsets(&self) -> Vec<(i32, i32)> {
        let n = self.footprint.max(1) as i32;
        (0..n).flat_map(|dy| (0..n).map(move |dx| (dx, dy))).collect()
    }

    /// First non-empty inventory slot; slot order decides what is equipped.
    pub fn equipped_item(&self) -> Option<&model::Item> {
        self.inventory.iter().flatten().next()
    }

    pub fn items(&self) -> impl Iterator<Item = &model::Item> {
        self.inventory.iter().flatten()
    }

    /// Current HP as a percentage of max, for HP-gated effects. None when
    /// either stat is missing; gates simply stay closed then.
    pub fn hp_percent(&self) -> Option<i32> {
        let current = self.stats.get("HP")?.total();
        let max = self.stats.get("Max HP")?.total();
        if max <= 0 {
            return None;
        }
        Some(current * 100 / max)
    }

    pub fn clear_ranges(&mut self) {
        self.movement_range.clear();
        self.attack_range.clear();
        self.utility_range.clear();
    }
}

#[cfg(test)]
mod test {
    use crate::game::*;
    use crate::model::{Item, RangeProfile};

    #[test]
    fn modifiers_are_additive_and_attributed() {
        let mut unit = Unit::on_foot("Ferdinand", Coordinate::new(1, 1), 6);
        unit.stats.insert_base("Str", 12);
        unit.stats.add_modifier("Str", "Death Blow", 2).unwrap();
        unit.stats.add_modifier("Str", "Defiant Crit", -1).unwrap();

        assert_eq!(unit.stats.value("Str").unwrap(), 13);
        let breakdown = &unit.stats.get("Str").unwrap().modifiers;
        assert_eq!(breakdown.len(), 2);
        assert!(breakdown.iter().any(|m| m.source == "Death Blow" && m.value == 2));
        assert!(breakdown.iter().any(|m| m.source == "Defiant Crit" && m.value == -1));
    }

    #[test]
    fn unknown_stat_is_fatal() {
        let mut unit = Unit::on_foot("Bernadetta", Coordinate::new(1, 1), 5);
        let err = unit.stats.add_modifier("Luk", "Lucky Seven", 7).unwrap_err();
        assert!(matches!(err, EngineError::UnmatchedStat { stat } if stat == "Luk"));
    }

    #[test]
    fn footprint_offsets_cover_the_square() {
        let mut unit = Unit::on_foot("Demonic Beast", Coordinate::new(4, 4), 4);
        unit.footprint = 2;
        let offsets = unit.footprint_offsets();
        assert_eq!(offsets, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn equipped_item_skips_empty_slots() {
        let mut unit = Unit::on_foot("Ashe", Coordinate::new(1, 1), 5);
        unit.inventory = vec![
            None,
            Some(Item::weapon("Iron Bow", "Bow", RangeProfile::standard(2, 2))),
        ];
        assert_eq!(unit.equipped_item().unwrap().name, "Iron Bow");
    }

    #[test]
    fn hp_percent_rounds_down() {
        let mut unit = Unit::on_foot("Dedue", Coordinate::new(1, 1), 4);
        unit.stats.insert_base("HP", 13);
        unit.stats.insert_base("Max HP", 40);
        assert_eq!(unit.hp_percent(), Some(32));
    }
}
