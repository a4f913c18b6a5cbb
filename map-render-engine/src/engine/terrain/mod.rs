//! Procedural terrain: noise, height field, edge fade and mesh construction.
//!
//! Everything here is pure CPU code with no ECS state, so the same height
//! field can displace the mesh at build time and answer queries per frame.

/// Deterministic lattice value noise and its fractal sum.
pub mod noise;

/// Terrain height field combining noise layers, radial features and the coastline mask.
pub mod height;

/// Radial alpha raster blending the terrain border into the background.
pub mod edge_fade;

/// Displaced grid mesh with smooth normals and faded vertex alpha.
pub mod mesh;

pub use edge_fade::EdgeFadeMask;
pub use height::TerrainShape;
pub use mesh::TerrainGrid;
