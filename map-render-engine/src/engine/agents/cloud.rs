use bevy::prelude::*;
use constants::agents::*;
use constants::terrain::{TERRAIN_H, TERRAIN_W};
use rand::Rng;

use super::AgentSpawn;
use crate::engine::terrain::TerrainShape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudKind {
    /// Low puffy clouds that cast a shadow on the terrain.
    Cumulus,
    /// High, wide, thin and slow. No shadow.
    Nimbostratus,
}

/// Per-cloud traits rolled once at build time and kept across recycles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudProfile {
    pub kind: CloudKind,
    pub width: f32,
    pub depth: f32,
    pub density: f32,
    pub altitude: f32,
    pub speed: f32,
    /// Scatter over the map on first spawn instead of entering from the west.
    pub start_on_map: bool,
}

impl CloudProfile {
    pub fn roll_cumulus<R: Rng + ?Sized>(index: usize, rng: &mut R) -> Self {
        let size_roll = rng.r#gen::<f32>();
        let (width, density) = if size_roll < 0.35 {
            (0.012 + rng.r#gen::<f32>() * 0.015, 0.2 + rng.r#gen::<f32>() * 0.15)
        } else if size_roll < 0.75 {
            (0.03 + rng.r#gen::<f32>() * 0.03, 0.3 + rng.r#gen::<f32>() * 0.15)
        } else {
            (0.06 + rng.r#gen::<f32>() * 0.04, 0.4 + rng.r#gen::<f32>() * 0.2)
        };
        let depth = width * (0.5 + rng.r#gen::<f32>() * 0.4);
        let altitude = 0.04 + rng.r#gen::<f32>() * 0.04;
        let speed = 0.0008 + rng.r#gen::<f32>() * 0.002;

        Self {
            kind: CloudKind::Cumulus,
            width,
            depth,
            density,
            altitude,
            speed,
            start_on_map: index < CUMULUS_ON_MAP,
        }
    }

    pub fn roll_nimbostratus<R: Rng + ?Sized>(index: usize, rng: &mut R) -> Self {
        let width = 0.15 + rng.r#gen::<f32>() * 0.15;
        let depth = width * (0.3 + rng.r#gen::<f32>() * 0.2);
        let density = 0.08 + rng.r#gen::<f32>() * 0.1;
        let altitude = 0.1 + rng.r#gen::<f32>() * 0.06;
        let speed = 0.0003 + rng.r#gen::<f32>() * 0.0005;

        Self {
            kind: CloudKind::Nimbostratus,
            width,
            depth,
            density,
            altitude,
            speed,
            start_on_map: index < NIMBOSTRATUS_ON_MAP,
        }
    }

    pub fn casts_shadow(&self) -> bool {
        self.kind == CloudKind::Cumulus
    }

    pub fn opacity(&self) -> f32 {
        match self.kind {
            CloudKind::Cumulus => self.density * CLOUD_OPACITY_FACTOR,
            CloudKind::Nimbostratus => self.density,
        }
    }

    pub fn shadow_opacity(&self) -> f32 {
        (self.density * CLOUD_SHADOW_SCALE).min(CLOUD_SHADOW_MAX_ALPHA)
    }
}

/// Respawn rule. The first spawn of an on-map cloud scatters it over the
/// terrain; every other spawn enters just past the western edge.
pub fn reset_cloud<R: Rng + ?Sized>(profile: &CloudProfile, first: bool, rng: &mut R) -> AgentSpawn {
    let w = TERRAIN_W as f32;
    let h = TERRAIN_H as f32;

    let (x, z) = match (profile.kind, first && profile.start_on_map) {
        (CloudKind::Cumulus, true) => (
            (rng.r#gen::<f32>() - 0.5) * w * 0.8,
            (rng.r#gen::<f32>() - 0.5) * h * 0.8,
        ),
        (CloudKind::Cumulus, false) => (
            -(w * 0.5 + rng.r#gen::<f32>() * 0.08),
            (rng.r#gen::<f32>() - 0.5) * h * 0.9,
        ),
        (CloudKind::Nimbostratus, true) => (
            (rng.r#gen::<f32>() - 0.5) * w,
            (rng.r#gen::<f32>() - 0.5) * h,
        ),
        (CloudKind::Nimbostratus, false) => (
            -(w * 0.6 + rng.r#gen::<f32>() * 0.1),
            (rng.r#gen::<f32>() - 0.5) * h,
        ),
    };

    let drift = match profile.kind {
        CloudKind::Cumulus => 0.0004,
        CloudKind::Nimbostratus => 0.0001,
    };

    AgentSpawn {
        position: Vec3::new(x, profile.altitude, z),
        velocity: Vec3::new(profile.speed, 0.0, (rng.r#gen::<f32>() - 0.5) * drift),
    }
}

/// True once the cloud has drifted past the eastern recycle line.
pub fn needs_recycle(position: Vec3) -> bool {
    position.x > TERRAIN_W as f32 * CLOUD_RECYCLE_X_FACTOR
}

#[derive(Debug, Clone)]
pub struct Cloud {
    pub profile: CloudProfile,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Ground shadow position, tracking the terrain under the cloud.
    pub shadow: Option<Vec3>,
    /// Which procedural sprite this cloud draws with.
    pub sprite: usize,
}

impl Cloud {
    pub fn spawn<R: Rng + ?Sized>(
        profile: CloudProfile,
        sprite: usize,
        shape: &TerrainShape,
        rng: &mut R,
    ) -> Self {
        let AgentSpawn { position, velocity } = reset_cloud(&profile, true, rng);
        let mut cloud = Self {
            profile,
            position,
            velocity,
            shadow: None,
            sprite,
        };
        cloud.place_shadow(shape);
        cloud
    }

    fn place_shadow(&mut self, shape: &TerrainShape) {
        self.shadow = self.profile.casts_shadow().then(|| {
            let ground = shape.height_at(self.position.x, self.position.z);
            Vec3::new(self.position.x, ground + CLOUD_SHADOW_LIFT, self.position.z)
        });
    }

    /// Advance one frame, re-projecting the shadow onto the terrain.
    /// Returns true when the cloud was recycled.
    pub fn step<R: Rng + ?Sized>(&mut self, dt: f32, shape: &TerrainShape, rng: &mut R) -> bool {
        self.position += self.velocity * dt;
        self.place_shadow(shape);

        if needs_recycle(self.position) {
            let AgentSpawn { position, velocity } = reset_cloud(&self.profile, false, rng);
            self.position = position;
            self.velocity = velocity;
            self.place_shadow(shape);
            return true;
        }
        false
    }
}
