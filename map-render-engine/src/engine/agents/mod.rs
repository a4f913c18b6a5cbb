//! Animated ambient agents: birds circling the map and drifting clouds.
//!
//! Agents are created once per view and recycled in place. Every random
//! draw goes through an injected [`rand::Rng`] so resets are reproducible
//! under a seeded generator.

use bevy::prelude::*;

/// Bird flock spawn, flight and recycle rules.
pub mod bird;

/// Cumulus and nimbostratus cloud populations with terrain shadows.
pub mod cloud;

/// Procedural soft cloud sprite rasters.
pub mod cloud_raster;

pub use bird::Bird;
pub use cloud::Cloud;

/// Fresh origin and velocity produced by an agent reset rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSpawn {
    pub position: Vec3,
    pub velocity: Vec3,
}
