use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Closed set of point-of-interest categories; drives marker colour and glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Accommodation,
    Dining,
    Recreation,
    Wellness,
    Golf,
    RealEstate,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Accommodation,
        Category::Dining,
        Category::Recreation,
        Category::Wellness,
        Category::Golf,
        Category::RealEstate,
    ];

    pub fn color(self) -> Color {
        match self {
            Category::Accommodation => Color::srgb_u8(0xa8, 0x61, 0x1a),
            Category::Dining => Color::srgb_u8(0xc4, 0x84, 0x2d),
            Category::Recreation => Color::srgb_u8(0x45, 0x6a, 0x4b),
            Category::Wellness => Color::srgb_u8(0x7a, 0x9a, 0x6d),
            Category::Golf => Color::srgb_u8(0x3d, 0x5c, 0x3a),
            Category::RealEstate => Color::srgb_u8(0x8b, 0x73, 0x55),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// A point of interest on the map. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub title: String,
    pub eyebrow: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image: String,
    #[serde(default)]
    pub gallery: Vec<String>,
    /// Terrain-local position. Only `x` and `z` are used for placement; the
    /// height comes from the terrain.
    pub position: AreaPosition,
    pub category: Category,
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("malformed areas dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate area id '{0}'")]
    DuplicateId(String),
    #[error("area '{0}' has a non-finite position")]
    InvalidPosition(String),
}

/// Ordered list of areas, loaded from `assets/data/areas.json`.
#[derive(Asset, Resource, TypePath, Debug, Clone, Default, Serialize, Deserialize)]
pub struct AreaCatalog {
    pub areas: Vec<Area>,
}

impl AreaCatalog {
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let catalog: AreaCatalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), DatasetError> {
        let mut seen = HashSet::new();
        for area in &self.areas {
            if !seen.insert(area.id.as_str()) {
                return Err(DatasetError::DuplicateId(area.id.clone()));
            }
            let p = area.position;
            if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
                return Err(DatasetError::InvalidPosition(area.id.clone()));
            }
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Area> {
        self.areas.get(index)
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLED: &str = include_str!("../../../assets/data/areas.json");

    #[test]
    fn bundled_dataset_parses() {
        let catalog = AreaCatalog::from_json_str(BUNDLED).unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog.areas.iter().all(|a| !a.title.is_empty()));
    }

    #[test]
    fn realestate_uses_page_spelling() {
        let json = r#"{"areas":[{"id":"a","title":"A","eyebrow":"E","description":"D",
            "image":"i.jpg","position":{"x":0.0,"y":0.0,"z":0.0},"category":"realestate"}]}"#;
        let catalog = AreaCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog.areas[0].category, Category::RealEstate);
        assert!(catalog.areas[0].gallery.is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let area = r#"{"id":"dup","title":"A","eyebrow":"E","description":"D",
            "image":"i.jpg","position":{"x":0.0,"y":0.0,"z":0.0},"category":"golf"}"#;
        let json = format!(r#"{{"areas":[{area},{area}]}}"#);
        assert!(matches!(
            AreaCatalog::from_json_str(&json),
            Err(DatasetError::DuplicateId(id)) if id == "dup"
        ));
    }

    #[test]
    fn unknown_category_is_a_parse_error() {
        let json = r#"{"areas":[{"id":"a","title":"A","eyebrow":"E","description":"D",
            "image":"i.jpg","position":{"x":0.0,"y":0.0,"z":0.0},"category":"casino"}]}"#;
        assert!(matches!(AreaCatalog::from_json_str(json), Err(DatasetError::Parse(_))));
    }
}
