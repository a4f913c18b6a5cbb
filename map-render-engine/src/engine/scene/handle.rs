use bevy::prelude::*;
use constants::agents::{BIRD_COUNT, CLOUD_RASTER_VARIANTS, CUMULUS_COUNT, NIMBOSTRATUS_COUNT};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::markers::{MarkerPlacement, MarkerState};
use super::settings::{ViewId, ViewSettings};
use crate::engine::agents::cloud::CloudProfile;
use crate::engine::agents::{Bird, Cloud};
use crate::engine::assets::{AreaCatalog, MapTextureSlot};
use crate::engine::camera::MapCamera;
use crate::engine::terrain::TerrainShape;
use crate::tools::interaction::PointerState;

/// Per-view clock and frame loop switch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewClock {
    pub elapsed: f32,
    pub delta: f32,
    running: bool,
}

impl Default for ViewClock {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            delta: 0.0,
            running: true,
        }
    }
}

impl ViewClock {
    pub fn tick(&mut self, delta: f32) {
        self.delta = delta.max(0.0);
        self.elapsed += self.delta;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop scheduling frames for this view. Irreversible.
    pub fn cancel(&mut self) {
        self.running = false;
    }
}

/// Bevy entities and GPU assets owned by one view, released on teardown.
#[derive(Debug, Clone, Default)]
pub struct SceneParts {
    pub camera: Option<Entity>,
    pub ui_root: Option<Entity>,
    pub overlay: Vec<Entity>,
    pub terrain: Option<Entity>,
    pub terrain_material: Option<Handle<StandardMaterial>>,
    pub ocean: Option<Entity>,
    pub ocean_material: Option<Handle<StandardMaterial>>,
    pub sun: Option<Entity>,
    pub fill: Option<Entity>,
    pub markers: Vec<MarkerParts>,
    pub birds: Vec<BirdParts>,
    pub clouds: Vec<CloudParts>,
    pub meshes: Vec<Handle<Mesh>>,
    pub materials: Vec<Handle<StandardMaterial>>,
    pub images: Vec<Handle<Image>>,
}

impl SceneParts {
    /// Top-level entities of the view. Despawning these removes their children.
    pub fn root_entities(&self) -> Vec<Entity> {
        let mut roots: Vec<Entity> = [self.camera, self.ui_root, self.terrain, self.ocean, self.sun, self.fill]
            .into_iter()
            .flatten()
            .collect();
        for marker in &self.markers {
            roots.extend([marker.visual, marker.stem, marker.glow]);
        }
        roots.extend(self.birds.iter().map(|bird| bird.body));
        for cloud in &self.clouds {
            roots.push(cloud.cloud);
            roots.extend(cloud.shadow);
        }
        roots
    }
}

#[derive(Debug, Clone)]
pub struct MarkerParts {
    pub visual: Entity,
    pub stem: Entity,
    pub glow: Entity,
    pub glow_material: Handle<StandardMaterial>,
    pub label: Entity,
}

#[derive(Debug, Clone)]
pub struct BirdParts {
    pub body: Entity,
    pub left_wing: Entity,
    pub right_wing: Entity,
}

#[derive(Debug, Clone)]
pub struct CloudParts {
    pub cloud: Entity,
    pub shadow: Option<Entity>,
}

/// Live state of one rendered map view.
///
/// Input handlers write `camera` and `pointer`; the frame update writes the
/// agents, markers and `hovered`. No field has two writers in a frame.
#[derive(Component, Debug, Clone)]
pub struct SceneHandle {
    pub view: ViewId,
    pub settings: ViewSettings,
    /// Bumped on every rebuild of this view.
    pub generation: u32,
    pub camera: MapCamera,
    pub pointer: PointerState,
    /// Window-space pixel rect this view renders into.
    pub viewport: Rect,
    pub markers: Vec<MarkerState>,
    pub birds: Vec<Bird>,
    pub clouds: Vec<Cloud>,
    pub hovered: Option<usize>,
    pub selected: Option<usize>,
    pub clock: ViewClock,
    pub rng: StdRng,
    pub map: MapTextureSlot,
    pub parts: SceneParts,
}

impl SceneHandle {
    /// Populate the simulation state of a view: markers for every area and
    /// the bird and cloud pools. No entities are spawned here.
    pub fn new(
        view: ViewId,
        settings: ViewSettings,
        catalog: &AreaCatalog,
        shape: &TerrainShape,
        mut rng: StdRng,
    ) -> Self {
        let markers = catalog
            .areas
            .iter()
            .enumerate()
            .map(|(index, area)| {
                MarkerState::new(index, area.category, MarkerPlacement::for_area(area, shape))
            })
            .collect();

        let birds = (0..BIRD_COUNT as u32).map(|id| Bird::spawn(id, &mut rng)).collect();

        let mut clouds = Vec::with_capacity(CUMULUS_COUNT + NIMBOSTRATUS_COUNT);
        for i in 0..CUMULUS_COUNT {
            let profile = CloudProfile::roll_cumulus(i, &mut rng);
            clouds.push(Cloud::spawn(profile, i % CLOUD_RASTER_VARIANTS, shape, &mut rng));
        }
        for i in 0..NIMBOSTRATUS_COUNT {
            let profile = CloudProfile::roll_nimbostratus(i, &mut rng);
            clouds.push(Cloud::spawn(profile, i % CLOUD_RASTER_VARIANTS, shape, &mut rng));
        }

        Self {
            view,
            settings,
            generation: 0,
            camera: MapCamera::new(shape.half_extents()),
            pointer: PointerState::default(),
            viewport: Rect::default(),
            markers,
            birds,
            clouds,
            hovered: None,
            selected: None,
            clock: ViewClock::default(),
            rng,
            map: MapTextureSlot::default(),
            parts: SceneParts::default(),
        }
    }

    pub fn with_seed(
        view: ViewId,
        settings: ViewSettings,
        catalog: &AreaCatalog,
        shape: &TerrainShape,
        seed: u64,
    ) -> Self {
        Self::new(view, settings, catalog, shape, StdRng::seed_from_u64(seed))
    }

    pub fn viewport_size(&self) -> Vec2 {
        self.viewport.size()
    }

    pub fn aspect_ratio(&self) -> f32 {
        let size = self.viewport_size();
        if size.y > 0.0 { size.x / size.y } else { 0.0 }
    }

    pub fn area_id<'a>(&self, catalog: &'a AreaCatalog, marker: Option<usize>) -> Option<&'a str> {
        let marker = self.markers.get(marker?)?;
        catalog.get(marker.area).map(|area| area.id.as_str())
    }
}
