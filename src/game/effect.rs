use crate::game::*;
use crate::model::{Grouping, SkillDef};

/// Configuration errors are fatal at effect construction: they point at a
/// content-authoring mistake, not a runtime condition.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum EffectError {
    #[error("unknown effect kind {0:?}")]
    UnknownKind(String),
    #[error("effect {kind:?} takes {expected} parameters, got {got}")]
    WrongArity { kind: String, expected: usize, got: usize },
    #[error("effect {kind:?}: {value:?} is not a number")]
    BadNumber { kind: String, value: String },
    #[error("effect {kind:?}: unexpected token {value:?}")]
    BadFlag { kind: String, value: String },
    #[error("effect {kind:?}: {stats} stats against {values} values")]
    MismatchedLists { kind: String, stats: usize, values: usize },
}

/// Closed set of skill-effect variants. Each is immutable once parsed and
/// implements only the capabilities relevant to it; the engine asks through
/// the accessor methods below.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Unconditional stat modifiers on the owner.
    StatBonus { stats: Vec<String>, values: Vec<i32> },
    /// Stat modifiers gated on the owner's HP percentage.
    HpThresholdBonus { threshold: i32, at_most: bool, stats: Vec<String>, values: Vec<i32> },
    /// Stat modifiers on roster units within a radius of the owner.
    RadiusAura { radius: u32, same_affiliation: bool, stats: Vec<String>, values: Vec<i32> },
    /// Stat modifiers gated on the owner's equipped item category.
    EquippedCategoryBonus { categories: Vec<String>, stats: Vec<String>, values: Vec<i32> },
    /// Fixed movement cost on terrain belonging to any listed grouping.
    TerrainCostSet { groupings: Vec<Grouping>, cost: u32, allow_impassable: bool },
    /// Additive movement cost shift on terrain in any listed grouping.
    TerrainCostModifier { groupings: Vec<Grouping>, delta: i32 },
    /// Carried by an occupant: allies passing through pay at most this much.
    AllyCostSet { cost: u32 },
    /// Marks tiles around the owner as obstructing for non-allies.
    ObstructRadius { radius: u32 },
    /// Overrides the owner's full movement value.
    MovementSet { value: i32 },
    /// The owner moves through hostile occupants as if allied.
    IgnoreAffiliations,
    /// Injects the radius around qualifying units as reachable tiles.
    WarpToUnits { radius: u32, same_affiliation: bool },
}

impl Effect {
    pub fn parse(kind: &str, params: &[String]) -> Result<Effect, EffectError> {
        let arity = |expected: usize| -> Result<(), EffectError> {
            if params.len() != expected {
                Err(EffectError::WrongArity { kind: kind.into(), expected, got: params.len() })
            } else {
                Ok(())
            }
        };

        match kind {
            "stat-bonus" => {
                arity(2)?;
                let (stats, values) = parallel_stats(kind, &params[0], &params[1])?;
                Ok(Effect::StatBonus { stats, values })
            }
            "hp-threshold-bonus" => {
                arity(4)?;
                let threshold = number(kind, &params[0])?;
                let at_most = match params[1].as_str() {
                    "<=" => true,
                    ">=" => false,
                    other => {
                        return Err(EffectError::BadFlag { kind: kind.into(), value: other.into() });
                    }
                };
                let (stats, values) = parallel_stats(kind, &params[2], &params[3])?;
                Ok(Effect::HpThresholdBonus { threshold, at_most, stats, values })
            }
            "radius-aura" => {
                arity(4)?;
                let radius = unsigned(kind, &params[0])?;
                let same_affiliation = affiliation_flag(kind, &params[1])?;
                let (stats, values) = parallel_stats(kind, &params[2], &params[3])?;
                Ok(Effect::RadiusAura { radius, same_affiliation, stats, values })
            }
            "equipped-category-bonus" => {
                arity(3)?;
                let categories = list(&params[0]);
                let (stats, values) = parallel_stats(kind, &params[1], &params[2])?;
                Ok(Effect::EquippedCategoryBonus { categories, stats, values })
            }
            "terrain-cost-set" => {
                arity(3)?;
                let groupings = grouping_list(kind, &params[0])?;
                let cost = unsigned(kind, &params[1])?;
                let allow_impassable = match params[2].as_str() {
                    "override-impassable" => true,
                    "respect-impassable" => false,
                    other => {
                        return Err(EffectError::BadFlag { kind: kind.into(), value: other.into() });
                    }
                };
                Ok(Effect::TerrainCostSet { groupings, cost, allow_impassable })
            }
            "terrain-cost-modifier" => {
                arity(2)?;
                let groupings = grouping_list(kind, &params[0])?;
                let delta = number(kind, &params[1])?;
                Ok(Effect::TerrainCostModifier { groupings, delta })
            }
            "ally-cost-set" => {
                arity(1)?;
                Ok(Effect::AllyCostSet { cost: unsigned(kind, &params[0])? })
            }
            "obstruct-radius" => {
                arity(1)?;
                Ok(Effect::ObstructRadius { radius: unsigned(kind, &params[0])? })
            }
            "movement-set" => {
                arity(1)?;
                Ok(Effect::MovementSet { value: number(kind, &params[0])? })
            }
            "ignore-affiliations" => {
                arity(0)?;
                Ok(Effect::IgnoreAffiliations)
            }
            "warp-to-units" => {
                arity(2)?;
                let radius = unsigned(kind, &params[0])?;
                let same_affiliation = affiliation_flag(kind, &params[1])?;
                Ok(Effect::WarpToUnits { radius, same_affiliation })
            }
            other => Err(EffectError::UnknownKind(other.into())),
        }
    }

    /// Stat contributions this effect grants right now, as
    /// (target unit, stat name, value) triples. Gates that do not hold
    /// produce nothing.
    pub fn stat_changes(&self, owner: UnitId, roster: &[Unit]) -> Vec<(UnitId, String, i32)> {
        let unit = &roster[owner];
        let spread = |stats: &[String], values: &[i32], target: UnitId| {
            stats
                .iter()
                .zip(values)
                .map(|(s, &v)| (target, s.clone(), v))
                .collect::<Vec<_>>()
        };

        match self {
            Effect::StatBonus { stats, values } => spread(stats, values, owner),
            Effect::HpThresholdBonus { threshold, at_most, stats, values } => {
                let holds = match unit.hp_percent() {
                    Some(pct) if *at_most => pct <= *threshold,
                    Some(pct) => pct >= *threshold,
                    None => false,
                };
                if holds { spread(stats, values, owner) } else { Vec::new() }
            }
            Effect::RadiusAura { radius, same_affiliation, stats, values } => roster
                .iter()
                .enumerate()
                .filter(|&(id, other)| {
                    id != owner
                        && other.affiliation.allied_with(&unit.affiliation) == *same_affiliation
                        && unit.origin.manhattan_distance(&other.origin) <= *radius
                })
                .flat_map(|(id, _)| spread(stats, values, id))
                .collect(),
            Effect::EquippedCategoryBonus { categories, stats, values } => {
                match unit.equipped_item() {
                    Some(item) if categories.contains(&item.category) => {
                        spread(stats, values, owner)
                    }
                    _ => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }

    pub fn ignores_affiliations(&self) -> bool {
        matches!(self, Effect::IgnoreAffiliations)
    }
    pub fn movement_override(&self) -> Option<i32> {
        match self {
            Effect::MovementSet { value } => Some(*value),
            _ => None,
        }
    }
    pub fn obstruct_radius(&self) -> Option<u32> {
        match self {
            Effect::ObstructRadius { radius } => Some(*radius),
            _ => None,
        }
    }
    pub fn ally_cost(&self) -> Option<u32> {
        match self {
            Effect::AllyCostSet { cost } => Some(*cost),
            _ => None,
        }
    }
    pub fn cost_set(&self) -> Option<(&[Grouping], u32, bool)> {
        match self {
            Effect::TerrainCostSet { groupings, cost, allow_impassable } => {
                Some((groupings, *cost, *allow_impassable))
            }
            _ => None,
        }
    }
    pub fn cost_modifier(&self) -> Option<(&[Grouping], i32)> {
        match self {
            Effect::TerrainCostModifier { groupings, delta } => Some((groupings, *delta)),
            _ => None,
        }
    }
    pub fn warp_to_units(&self) -> Option<(u32, bool)> {
        match self {
            Effect::WarpToUnits { radius, same_affiliation } => {
                Some((*radius, *same_affiliation))
            }
            _ => None,
        }
    }
}

impl Skill {
    pub fn from_def(def: &SkillDef) -> Result<Skill, EffectError> {
        let effect = match &def.kind {
            Some(kind) => Some(Effect::parse(kind, &def.params)?),
            None => None,
        };
        Ok(Skill { name: def.name.clone(), effect })
    }
}

fn list(raw: &str) -> Vec<String> {
    raw.split(';').map(|s| s.trim().to_owned()).filter(|s| !s.is_empty()).collect()
}

fn number(kind: &str, raw: &str) -> Result<i32, EffectError> {
    raw.trim()
        .parse()
        .map_err(|_| EffectError::BadNumber { kind: kind.into(), value: raw.into() })
}

fn unsigned(kind: &str, raw: &str) -> Result<u32, EffectError> {
    raw.trim()
        .parse()
        .map_err(|_| EffectError::BadNumber { kind: kind.into(), value: raw.into() })
}

fn grouping_list(kind: &str, raw: &str) -> Result<Vec<Grouping>, EffectError> {
    list(raw).iter().map(|g| unsigned(kind, g)).collect()
}

fn affiliation_flag(kind: &str, raw: &str) -> Result<bool, EffectError> {
    match raw {
        "same" => Ok(true),
        "other" => Ok(false),
        other => Err(EffectError::BadFlag { kind: kind.into(), value: other.into() }),
    }
}

fn parallel_stats(
    kind: &str,
    raw_stats: &str,
    raw_values: &str,
) -> Result<(Vec<String>, Vec<i32>), EffectError> {
    let stats = list(raw_stats);
    let values = list(raw_values)
        .iter()
        .map(|v| number(kind, v))
        .collect::<Result<Vec<_>, _>>()?;
    if stats.len() != values.len() {
        return Err(EffectError::MismatchedLists {
            kind: kind.into(),
            stats: stats.len(),
            values: values.len(),
        });
    }
    Ok((stats, values))
}
