use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use bevy::prelude::*;
use constants::markers::*;
use serde::{Deserialize, Serialize};

use crate::engine::assets::{Area, Category};
use crate::engine::terrain::TerrainShape;

/// Visual style of every marker in a view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerStyle {
    /// Spinning procedural glyph inside two rings, one glyph per category.
    #[default]
    Rune,
    /// Static pin with a ground ring.
    Pin,
}

impl MarkerStyle {
    pub fn spins(self) -> bool {
        matches!(self, MarkerStyle::Rune)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Snowflake,
    Tree,
    Flame,
    Sun,
    Pentagram,
    /// Rings only.
    Plain,
}

impl Glyph {
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Accommodation => Glyph::Flame,
            Category::Dining => Glyph::Sun,
            Category::Recreation => Glyph::Tree,
            Category::Wellness => Glyph::Snowflake,
            Category::Golf => Glyph::Pentagram,
            Category::RealEstate => Glyph::Plain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PartShape {
    /// Flat box: `length` along local X, `width` along local Z.
    Bar { length: f32, width: f32 },
    /// Ring lying in the XZ plane.
    Ring { radius: f32, tube: f32 },
    Sphere { radius: f32 },
    /// Cone with its tip towards +Y.
    Cone { radius: f32, height: f32 },
    Frustum { top: f32, bottom: f32, height: f32 },
    /// Flat teardrop pointing towards -Z.
    Flame { size: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PartTint {
    Category,
    White,
}

/// One primitive of a marker visual, relative to the marker origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPart {
    pub shape: PartShape,
    pub translation: Vec3,
    pub rotation: Quat,
    pub tint: PartTint,
    pub opacity: f32,
}

impl MarkerPart {
    fn new(shape: PartShape, tint: PartTint, opacity: f32) -> Self {
        Self {
            shape,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            tint,
            opacity,
        }
    }

    fn white(shape: PartShape) -> Self {
        Self::new(shape, PartTint::White, 0.95)
    }

    fn at(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    fn yaw(mut self, angle: f32) -> Self {
        self.rotation = Quat::from_rotation_y(angle);
        self
    }
}

/// Primitive recipe of the marker visual for a category in the given style.
pub fn marker_parts(style: MarkerStyle, category: Category) -> Vec<MarkerPart> {
    match style {
        MarkerStyle::Rune => rune_parts(Glyph::for_category(category)),
        MarkerStyle::Pin => pin_parts(),
    }
}

fn rune_parts(glyph: Glyph) -> Vec<MarkerPart> {
    let s = RUNE_RADIUS;
    let bar = |length: f32, width: f32| PartShape::Bar { length, width };

    let mut parts = vec![
        MarkerPart::new(PartShape::Ring { radius: s * 1.4, tube: 0.0001 }, PartTint::Category, 0.9),
        MarkerPart::new(PartShape::Ring { radius: s * 0.85, tube: 0.00006 }, PartTint::Category, 0.5),
    ];

    match glyph {
        Glyph::Snowflake => {
            for i in 0..3 {
                let angle = i as f32 * PI / 3.0;
                parts.push(MarkerPart::white(bar(s * 2.0, 0.00025)).yaw(angle));
                for sign in [1.0, -1.0] {
                    let offset = Vec3::new(angle.cos(), 0.0, angle.sin()) * s * 0.55 * sign;
                    parts.push(
                        MarkerPart::white(bar(s * 0.45, 0.0002))
                            .at(offset)
                            .yaw(angle + FRAC_PI_4 * sign),
                    );
                }
            }
        }
        Glyph::Tree => {
            parts.push(
                MarkerPart::white(PartShape::Frustum { top: 0.00015, bottom: 0.0002, height: s * 0.8 })
                    .at(Vec3::Y * -s * 0.1),
            );
            parts.push(
                MarkerPart::white(PartShape::Cone { radius: s * 0.7, height: s * 0.9 })
                    .at(Vec3::Y * s * 0.35),
            );
            parts.push(
                MarkerPart::white(PartShape::Cone { radius: s * 0.45, height: s * 0.65 })
                    .at(Vec3::Y * s * 0.75),
            );
        }
        Glyph::Flame => {
            parts.push(MarkerPart::white(PartShape::Flame { size: s }).at(Vec3::Y * RUNE_THICKNESS * 0.5));
        }
        Glyph::Sun => {
            parts.push(MarkerPart::white(PartShape::Sphere { radius: s * 0.25 }));
            for i in 0..8 {
                let angle = i as f32 * FRAC_PI_4;
                let offset = Vec3::new(angle.cos(), 0.0, angle.sin()) * s * 0.65;
                parts.push(MarkerPart::white(bar(s * 0.55, 0.0002)).at(offset).yaw(angle));
            }
        }
        Glyph::Pentagram => {
            let points: Vec<Vec2> = (0..5)
                .map(|i| {
                    let a = i as f32 * TAU / 5.0 - FRAC_PI_2;
                    Vec2::new(a.cos(), a.sin()) * s
                })
                .collect();
            for i in 0..5 {
                let p1 = points[i];
                let p2 = points[(i + 2) % 5];
                let d = p2 - p1;
                let mid = (p1 + p2) * 0.5;
                parts.push(
                    MarkerPart::white(bar(d.length(), 0.00025))
                        .at(Vec3::new(mid.x, 0.0, mid.y))
                        .yaw(-d.y.atan2(d.x)),
                );
            }
            parts.push(MarkerPart::white(PartShape::Sphere { radius: s * 0.1 }));
        }
        Glyph::Plain => {}
    }

    parts
}

fn pin_parts() -> Vec<MarkerPart> {
    let s = RUNE_RADIUS;
    vec![
        MarkerPart::new(PartShape::Ring { radius: s * 1.2, tube: 0.0001 }, PartTint::Category, 0.9),
        MarkerPart::new(PartShape::Cone { radius: s * 0.35, height: s * 1.6 }, PartTint::Category, 0.95)
            .at(Vec3::Y * s * 0.8),
        MarkerPart::white(PartShape::Sphere { radius: s * 0.55 }).at(Vec3::Y * s * 1.8),
    ]
}

/// Flame outline in the XZ plane, tip towards -Z, sampled from four quadratic curves.
pub fn flame_outline(size: f32, samples_per_curve: usize) -> Vec<Vec2> {
    let s = size;
    let curves = [
        (Vec2::new(0.0, 1.1), Vec2::new(0.45, 0.3), Vec2::new(0.3, -0.2)),
        (Vec2::new(0.3, -0.2), Vec2::new(0.15, -0.6), Vec2::new(0.0, -0.7)),
        (Vec2::new(0.0, -0.7), Vec2::new(-0.15, -0.6), Vec2::new(-0.3, -0.2)),
        (Vec2::new(-0.3, -0.2), Vec2::new(-0.45, 0.3), Vec2::new(0.0, 1.1)),
    ];
    let n = samples_per_curve.max(1);
    let mut outline = Vec::with_capacity(curves.len() * n);
    for (p0, c, p1) in curves {
        for k in 0..n {
            let t = k as f32 / n as f32;
            let p = p0 * (1.0 - t) * (1.0 - t) + c * 2.0 * (1.0 - t) * t + p1 * t * t;
            // Shape Y maps onto -Z once laid flat.
            outline.push(Vec2::new(p.x * s, -p.y * s));
        }
    }
    outline
}

/// Where a marker and its stem and label sit for an area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPlacement {
    pub ground: f32,
    pub anchor: Vec3,
    pub label: Vec3,
}

impl MarkerPlacement {
    /// Anchors on the terrain under the area's `x`/`z`; the stored `y` is ignored.
    pub fn for_area(area: &Area, shape: &TerrainShape) -> Self {
        let (x, z) = (area.position.x, area.position.z);
        let ground = shape.height_at(x, z);
        let anchor = Vec3::new(x, ground + MARKER_LIFT, z);
        Self {
            ground,
            anchor,
            label: anchor + Vec3::Y * LABEL_LIFT,
        }
    }

    pub fn stem_height(&self) -> f32 {
        self.anchor.y - self.ground
    }

    pub fn stem_center(&self) -> Vec3 {
        Vec3::new(self.anchor.x, self.ground + self.stem_height() * 0.5, self.anchor.z)
    }
}

/// Live per-marker state animated by the frame loop.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerState {
    pub area: usize,
    pub category: Category,
    pub placement: MarkerPlacement,
    pub label_opacity: f32,
    pub glow_opacity: f32,
    /// Rune yaw in radians.
    pub spin: f32,
}

impl MarkerState {
    pub fn new(area: usize, category: Category, placement: MarkerPlacement) -> Self {
        Self {
            area,
            category,
            placement,
            label_opacity: 0.0,
            glow_opacity: GLOW_INITIAL,
            spin: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::areas::AreaPosition;

    fn area(x: f32, y: f32, z: f32) -> Area {
        Area {
            id: "test".into(),
            title: "Test".into(),
            eyebrow: String::new(),
            description: String::new(),
            tags: vec![],
            image: String::new(),
            gallery: vec![],
            position: AreaPosition { x, y, z },
            category: Category::Golf,
        }
    }

    #[test]
    fn placement_ignores_stored_height() {
        let shape = TerrainShape::default();
        let a = MarkerPlacement::for_area(&area(0.02, 5.0, -0.01), &shape);
        let b = MarkerPlacement::for_area(&area(0.02, -3.0, -0.01), &shape);
        assert_eq!(a, b);
        assert!((a.anchor.y - (shape.height_at(0.02, -0.01) + MARKER_LIFT)).abs() < 1e-7);
        assert!((a.stem_height() - MARKER_LIFT).abs() < 1e-6);
        assert!(a.label.y > a.anchor.y);
    }

    #[test]
    fn every_rune_has_two_rings() {
        for category in Category::ALL {
            let parts = marker_parts(MarkerStyle::Rune, category);
            let rings = parts
                .iter()
                .filter(|p| matches!(p.shape, PartShape::Ring { .. }))
                .count();
            assert_eq!(rings, 2, "{category:?}");
        }
    }

    #[test]
    fn glyph_part_counts() {
        let count = |g| rune_parts(g).len() - 2;
        assert_eq!(count(Glyph::Snowflake), 9);
        assert_eq!(count(Glyph::Tree), 3);
        assert_eq!(count(Glyph::Flame), 1);
        assert_eq!(count(Glyph::Sun), 9);
        assert_eq!(count(Glyph::Pentagram), 6);
        assert_eq!(count(Glyph::Plain), 0);
    }

    #[test]
    fn pentagram_bars_join_star_points() {
        let parts = rune_parts(Glyph::Pentagram);
        for part in parts.iter().filter(|p| matches!(p.shape, PartShape::Bar { .. })) {
            let PartShape::Bar { length, .. } = part.shape else { unreachable!() };
            let half = part.rotation * Vec3::X * length * 0.5;
            for end in [part.translation + half, part.translation - half] {
                let r = Vec2::new(end.x, end.z).length();
                assert!((r - RUNE_RADIUS).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn only_runes_spin() {
        assert!(MarkerStyle::Rune.spins());
        assert!(!MarkerStyle::Pin.spins());
    }

    #[test]
    fn flame_tip_points_away_from_camera() {
        let outline = flame_outline(1.0, 8);
        assert_eq!(outline.len(), 32);
        assert!((outline[0] - Vec2::new(0.0, -1.1)).length() < 1e-6);
    }
}
