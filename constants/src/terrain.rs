/// Terrain width along world X.
pub const TERRAIN_W: f64 = 0.4;

/// Terrain depth along world Z.
pub const TERRAIN_H: f64 = 0.27;

/// Land mask smoothstep band, in Chebyshev distance from the centre (0 = centre, 1 = edge).
pub const LAND_MASK_INNER: f64 = 0.55;
pub const LAND_MASK_OUTER: f64 = 0.95;

/// Supported mesh subdivisions per axis.
pub const SEGMENT_OPTIONS: &[u32] = &[128, 256, 512];
pub const DEFAULT_SEGMENTS: u32 = 256;
pub const SPLIT_RIGHT_SEGMENTS: u32 = 512;

/// Ocean plane size and elevation just under sea level.
pub const OCEAN_SIZE: f32 = 2.0;
pub const OCEAN_Y: f32 = -0.002;

/// Edge fade raster resolution and its radial band, as fractions of the raster size.
pub const EDGE_FADE_SIZE: usize = 512;
pub const EDGE_FADE_INNER: f64 = 0.2;
pub const EDGE_FADE_OUTER: f64 = 0.5;

/// Fractal noise layer sampled at `(x * frequency + offset, z * frequency + offset)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseLayer {
    pub frequency: f64,
    pub offset: f64,
    pub octaves: u32,
    pub amplitude: f64,
}

/// Cone-shaped bump centred at a UV coordinate:
/// `max(0, 1 - distance * falloff) * peak`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialFeature {
    pub name: &'static str,
    pub center_u: f64,
    pub center_v: f64,
    pub falloff: f64,
    pub peak: f64,
}

pub const MACRO_RELIEF: NoiseLayer = NoiseLayer {
    frequency: 25.0,
    offset: 0.0,
    octaves: 5,
    amplitude: 0.025,
};

pub const MICRO_DETAIL: NoiseLayer = NoiseLayer {
    frequency: 60.0,
    offset: 10.0,
    octaves: 3,
    amplitude: 0.008,
};

/// Ridge layer contributes `|fractal - 0.5| * amplitude`.
pub const RIDGE: NoiseLayer = NoiseLayer {
    frequency: 40.0,
    offset: 5.0,
    octaves: 4,
    amplitude: 0.02,
};

pub const FEATURES: &[RadialFeature] = &[
    RadialFeature {
        name: "center mountain",
        center_u: 0.45,
        center_v: 0.45,
        falloff: 4.0,
        peak: 0.02,
    },
    RadialFeature {
        name: "snow mountain",
        center_u: 0.65,
        center_v: 0.2,
        falloff: 3.5,
        peak: 0.018,
    },
    RadialFeature {
        name: "forest",
        center_u: 0.25,
        center_v: 0.35,
        falloff: 3.0,
        peak: 0.005,
    },
];
