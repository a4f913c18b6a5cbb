use bevy::prelude::*;
use constants::terrain::{
    FEATURES, LAND_MASK_INNER, LAND_MASK_OUTER, MACRO_RELIEF, MICRO_DETAIL, NoiseLayer,
    RIDGE, RadialFeature, TERRAIN_H, TERRAIN_W,
};

use super::noise::{fractal_sum, fractal_sum_bound};

pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// The terrain height field.
///
/// One instance is shared by mesh displacement and every runtime query
/// (cloud shadows, marker stems) so both always agree on the surface.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct TerrainShape {
    pub width: f64,
    pub depth: f64,
    pub land_mask: (f64, f64),
    pub macro_relief: NoiseLayer,
    pub micro_detail: NoiseLayer,
    pub ridge: NoiseLayer,
    pub features: Vec<RadialFeature>,
}

impl Default for TerrainShape {
    fn default() -> Self {
        Self {
            width: TERRAIN_W,
            depth: TERRAIN_H,
            land_mask: (LAND_MASK_INNER, LAND_MASK_OUTER),
            macro_relief: MACRO_RELIEF,
            micro_detail: MICRO_DETAIL,
            ridge: RIDGE,
            features: FEATURES.to_vec(),
        }
    }
}

impl TerrainShape {
    /// World position to terrain UV; the terrain is centred on the origin.
    pub fn uv(&self, x: f64, z: f64) -> (f64, f64) {
        (x / self.width + 0.5, z / self.depth + 0.5)
    }

    /// Coastline weight: 1 inland, smoothly falling to 0 towards the map border.
    pub fn land_mask(&self, u: f64, v: f64) -> f64 {
        let cx = (u - 0.5) * 2.0;
        let cy = (v - 0.5) * 2.0;
        let edge = cx.abs().max(cy.abs());
        (1.0 - smoothstep(self.land_mask.0, self.land_mask.1, edge)).max(0.0)
    }

    fn layer(layer: &NoiseLayer, x: f64, z: f64) -> f64 {
        fractal_sum(
            x * layer.frequency + layer.offset,
            z * layer.frequency + layer.offset,
            layer.octaves,
        )
    }

    fn feature(feature: &RadialFeature, u: f64, v: f64) -> f64 {
        let distance = (u - feature.center_u).hypot(v - feature.center_v);
        (1.0 - distance * feature.falloff).max(0.0) * feature.peak
    }

    /// Terrain elevation at world `(x, z)`.
    pub fn height(&self, x: f64, z: f64) -> f64 {
        let (u, v) = self.uv(x, z);
        let mask = self.land_mask(u, v);

        let mut h = Self::layer(&self.macro_relief, x, z) * self.macro_relief.amplitude;
        h += Self::layer(&self.micro_detail, x, z) * self.micro_detail.amplitude;
        h += (Self::layer(&self.ridge, x, z) - 0.5).abs() * self.ridge.amplitude;
        for feature in &self.features {
            h += Self::feature(feature, u, v);
        }

        h * mask
    }

    /// Single precision convenience for render-side callers.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        self.height(x as f64, z as f64) as f32
    }

    /// Analytic upper bound of [`Self::height`].
    pub fn max_height(&self) -> f64 {
        let relief = fractal_sum_bound(self.macro_relief.octaves) * self.macro_relief.amplitude;
        let detail = fractal_sum_bound(self.micro_detail.octaves) * self.micro_detail.amplitude;
        let ridge = 0.5 * self.ridge.amplitude;
        let features: f64 = self.features.iter().map(|f| f.peak).sum();
        relief + detail + ridge + features
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width as f32 * 0.5, self.depth as f32 * 0.5)
    }
}
