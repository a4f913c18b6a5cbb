use std::f32::consts::TAU;

use bevy::prelude::*;
use constants::agents::*;
use rand::Rng;

use super::AgentSpawn;

/// Respawn a bird on a ring around the map centre, flying towards a random
/// point near the middle.
pub fn reset_bird<R: Rng + ?Sized>(rng: &mut R) -> AgentSpawn {
    let angle = rng.r#gen::<f32>() * TAU;
    let radius = BIRD_SPAWN_RADIUS_MIN + rng.r#gen::<f32>() * BIRD_SPAWN_RADIUS_SPAN;
    let position = Vec3::new(
        angle.cos() * radius,
        BIRD_ALTITUDE_MIN + rng.r#gen::<f32>() * BIRD_ALTITUDE_SPAN,
        angle.sin() * radius,
    );

    let speed = BIRD_SPEED_MIN + rng.r#gen::<f32>() * BIRD_SPEED_SPAN;
    let target = Vec3::new(
        (rng.r#gen::<f32>() - 0.5) * BIRD_TARGET_SPAN,
        BIRD_TARGET_ALTITUDE_MIN + rng.r#gen::<f32>() * BIRD_TARGET_ALTITUDE_SPAN,
        (rng.r#gen::<f32>() - 0.5) * BIRD_TARGET_SPAN,
    );

    AgentSpawn {
        position,
        velocity: (target - position).normalize_or_zero() * speed,
    }
}

/// True once the bird has left the flight radius.
pub fn needs_recycle(position: Vec3) -> bool {
    position.length() > BIRD_RECYCLE_RADIUS
}

#[derive(Debug, Clone)]
pub struct Bird {
    /// Stable phase seed so the flock flaps out of sync.
    pub id: u32,
    pub position: Vec3,
    pub velocity: Vec3,
    pub scale: f32,
    /// Current wing rotation about the body axis; the right wing mirrors it.
    pub flap: f32,
    /// Current body roll.
    pub sway: f32,
}

impl Bird {
    pub fn spawn<R: Rng + ?Sized>(id: u32, rng: &mut R) -> Self {
        let scale = BIRD_SCALE_MIN + rng.r#gen::<f32>() * BIRD_SCALE_SPAN;
        let AgentSpawn { position, velocity } = reset_bird(rng);
        Self {
            id,
            position,
            velocity,
            scale,
            flap: 0.0,
            sway: 0.0,
        }
    }

    /// Advance one frame. Returns true when the bird was recycled.
    pub fn step<R: Rng + ?Sized>(&mut self, dt: f32, elapsed: f32, rng: &mut R) -> bool {
        self.position += self.velocity * dt;
        self.flap = (elapsed * BIRD_FLAP_RATE + self.id as f32 * BIRD_FLAP_PHASE).sin()
            * BIRD_FLAP_AMPLITUDE;
        self.sway = (elapsed * BIRD_SWAY_RATE + self.id as f32).sin() * BIRD_SWAY_AMPLITUDE;

        if needs_recycle(self.position) {
            let AgentSpawn { position, velocity } = reset_bird(rng);
            self.position = position;
            self.velocity = velocity;
            return true;
        }
        false
    }

    /// Body orientation: nose along the velocity, rolled by the sway.
    pub fn rotation(&self) -> Quat {
        let heading = match Dir3::new(self.velocity) {
            Ok(dir) => Transform::IDENTITY.looking_to(dir, Vec3::Y).rotation,
            Err(_) => Quat::IDENTITY,
        };
        heading * Quat::from_rotation_z(self.sway)
    }
}
