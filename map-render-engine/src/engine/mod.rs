pub mod agents;
pub mod animation;
pub mod assets;
pub mod camera;
pub mod core;
pub mod scene;
pub mod systems;
pub mod terrain;
