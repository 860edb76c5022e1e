use crate::model::{Grouping, TerrainType};
use std::collections::HashMap;

pub type TerrainTypeId = usize;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown terrain type {0:?}")]
    UnknownTerrain(String),
    #[error("duplicate terrain type {0:?}")]
    DuplicateTerrain(String),
}

/// Read-only name lookup over the terrain definitions handed in by the
/// ingestion layer. Tiles reference terrain by id, never by ownership.
#[derive(Clone, Debug, Default)]
pub struct TerrainCatalog {
    types: Vec<TerrainType>,
    by_name: HashMap<String, TerrainTypeId>,
}

impl TerrainCatalog {
    pub fn build(types: Vec<TerrainType>) -> Result<TerrainCatalog, CatalogError> {
        let mut by_name = HashMap::new();
        for (id, terrain) in types.iter().enumerate() {
            if by_name.insert(terrain.name.clone(), id).is_some() {
                return Err(CatalogError::DuplicateTerrain(terrain.name.clone()));
            }
        }
        Ok(TerrainCatalog { types, by_name })
    }
    pub fn id_of(&self, name: &str) -> Result<TerrainTypeId, CatalogError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| CatalogError::UnknownTerrain(name.into()))
    }
    pub fn get(&self, id: TerrainTypeId) -> &TerrainType {
        &self.types[id]
    }
    pub fn iter(&self) -> impl Iterator<Item = &TerrainType> {
        self.types.iter()
    }
    pub fn grouping_members(&self, grouping: Grouping) -> impl Iterator<Item = TerrainTypeId> + '_ {
        self.types
            .iter()
            .enumerate()
            .filter(move |(_, t)| t.groupings.contains(&grouping))
            .map(|(id, _)| id)
    }
}

/// Raw skill definition as authored: a kind tag plus free-text parameters.
/// Parsed into an effect instance at catalog build time; parse failures are
/// fatal for the definition (see `game::effect`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkillDef {
    pub name: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub params: Vec<String>,
}

impl SkillDef {
    pub fn plain(name: &str) -> SkillDef {
        SkillDef { name: name.into(), kind: None, params: Vec::new() }
    }
    pub fn with_effect(name: &str, kind: &str, params: &[&str]) -> SkillDef {
        SkillDef {
            name: name.into(),
            kind: Some(kind.into()),
            params: params.iter().map(|&p| p.into()).collect(),
        }
    }
}
