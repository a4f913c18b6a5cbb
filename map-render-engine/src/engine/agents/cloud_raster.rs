use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use rand::Rng;

/// Alpha stops of each soft blob, `(offset along radius, alpha)`.
const BLOB_STOPS: [(f32, f32); 4] = [(0.0, 0.5), (0.3, 0.25), (0.65, 0.06), (1.0, 0.0)];

/// Alpha stops of the round mask trimming the sprite, relative to `0.48 * size`.
const MASK_STOPS: [(f32, f32); 3] = [(0.0, 1.0), (0.5, 0.8), (1.0, 0.0)];

fn ramp(stops: &[(f32, f32)], t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    for pair in stops.windows(2) {
        let (t0, a0) = pair[0];
        let (t1, a1) = pair[1];
        if t <= t1 {
            return a0 + (a1 - a0) * ((t - t0) / (t1 - t0));
        }
    }
    stops[stops.len() - 1].1
}

/// Soft cumulus alpha raster: 10 to 17 overlapping radial blobs composited
/// over each other, then trimmed by a round mask.
pub fn cloud_alpha<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Vec<f32> {
    let s = size as f32;
    let blob_count = 10 + rng.gen_range(0..8);
    let blobs: Vec<(Vec2, f32)> = (0..blob_count)
        .map(|_| {
            let centre = Vec2::new(
                s * 0.2 + rng.r#gen::<f32>() * s * 0.6,
                s * 0.2 + rng.r#gen::<f32>() * s * 0.6,
            );
            let radius = s * 0.08 + rng.r#gen::<f32>() * s * 0.18;
            (centre, radius)
        })
        .collect();

    let middle = Vec2::splat(s * 0.5);
    let mask_radius = s * 0.48;
    let mut alpha = vec![0.0; size * size];

    for row in 0..size {
        for col in 0..size {
            let p = Vec2::new(col as f32 + 0.5, row as f32 + 0.5);
            let mut a = 0.0;
            for (centre, radius) in &blobs {
                let src = ramp(&BLOB_STOPS, p.distance(*centre) / radius);
                a = src + a * (1.0 - src);
            }
            a *= ramp(&MASK_STOPS, p.distance(middle) / mask_radius);
            alpha[row * size + col] = a;
        }
    }
    alpha
}

/// Tint an alpha raster into an sRGB texture.
pub fn cloud_image(alpha: &[f32], size: usize, tint: [u8; 3]) -> Image {
    let mut data = Vec::with_capacity(size * size * 4);
    for a in alpha {
        data.extend_from_slice(&tint);
        data.push((a.clamp(0.0, 1.0) * 255.0).round() as u8);
    }
    Image::new(
        Extent3d {
            width: size as u32,
            height: size as u32,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn sprite_is_dense_inside_and_clear_at_corners() {
        let size = 32;
        let alpha = cloud_alpha(size, &mut StdRng::seed_from_u64(5));
        assert_eq!(alpha.len(), size * size);
        assert_eq!(alpha[0], 0.0);
        assert_eq!(alpha[size * size - 1], 0.0);
        assert!(alpha.iter().all(|a| (0.0..=1.0).contains(a)));
        assert!(alpha.iter().cloned().fold(0.0, f32::max) > 0.01);
    }

    #[test]
    fn image_has_tint_and_alpha_channels() {
        let image = cloud_image(&[1.0], 1, [10, 20, 30]);
        assert_eq!(image.data.as_deref(), Some(&[10u8, 20, 30, 255][..]));
    }
}
