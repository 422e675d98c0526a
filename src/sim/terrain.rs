//! Static hill terrain
//!
//! Three overlapping ridges drawn as layered hills. Actors stand on the
//! nearest ridge beneath their feet; meteors burst on the highest one.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::curve::{CubicSegment, Curve, PathError, SampleCache, sample_y};

/// Front hill (lowest on screen)
pub const RIDGE_FRONT: [Vec2; 7] = [
    Vec2::new(0.0, 560.0),
    Vec2::new(260.0, 520.0),
    Vec2::new(520.0, 590.0),
    Vec2::new(780.0, 560.0),
    Vec2::new(1040.0, 530.0),
    Vec2::new(1120.0, 585.0),
    Vec2::new(1200.0, 580.0),
];

/// Middle hill
pub const RIDGE_MIDDLE: [Vec2; 7] = [
    Vec2::new(0.0, 520.0),
    Vec2::new(220.0, 450.0),
    Vec2::new(420.0, 560.0),
    Vec2::new(640.0, 520.0),
    Vec2::new(860.0, 480.0),
    Vec2::new(1040.0, 560.0),
    Vec2::new(1200.0, 530.0),
];

/// Back hill (highest on screen)
pub const RIDGE_BACK: [Vec2; 7] = [
    Vec2::new(0.0, 500.0),
    Vec2::new(200.0, 430.0),
    Vec2::new(400.0, 530.0),
    Vec2::new(600.0, 480.0),
    Vec2::new(800.0, 430.0),
    Vec2::new(1000.0, 520.0),
    Vec2::new(1200.0, 470.0),
];

/// Spacing along a ridge between grass tufts
pub const GRASS_SPACING: f32 = 80.0;
/// Distance kept clear of each ridge end
pub const GRASS_MARGIN: f32 = 40.0;

/// Build a curve from a start point followed by (control, control, end) triples
pub fn curve_from_points(points: &[Vec2]) -> Curve {
    let segments = match points.split_first() {
        Some((&start, rest)) => {
            let mut current = start;
            rest.chunks_exact(3)
                .map(|c| {
                    let seg = CubicSegment::new(current, c[0], c[1], c[2]);
                    current = c[2];
                    seg
                })
                .collect()
        }
        None => Vec::new(),
    };
    Curve::from_segments(segments)
}

/// A terrain curve paired with its sample cache
#[derive(Debug, Clone)]
pub struct Ridge {
    pub curve: Curve,
    cache: SampleCache,
}

impl Ridge {
    pub fn new(curve: Curve) -> Self {
        Self {
            curve,
            cache: SampleCache::new(),
        }
    }

    /// Surface height at `x` (memoized)
    pub fn height_at(&mut self, x: f32) -> Option<f32> {
        sample_y(&self.curve, x, &mut self.cache)
    }

    pub fn cached_samples(&self) -> usize {
        self.cache.len()
    }
}

/// Surface heights of every ridge at `x`, skipping degenerate ones
pub fn heights_at(ridges: &mut [Ridge], x: f32) -> Vec<f32> {
    ridges.iter_mut().filter_map(|r| r.height_at(x)).collect()
}

/// The surface an object at `feet_y` would land on
///
/// Picks the largest y not above `feet_y + tolerance`: the nearest surface
/// approached from above.
pub fn ground_below(ridges: &mut [Ridge], x: f32, feet_y: f32, tolerance: f32) -> Option<f32> {
    heights_at(ridges, x)
        .into_iter()
        .filter(|&y| y <= feet_y + tolerance)
        .reduce(f32::max)
}

/// Highest ridge point (smallest y) at `x`
pub fn crest_at(ridges: &mut [Ridge], x: f32) -> Option<f32> {
    heights_at(ridges, x).into_iter().reduce(f32::min)
}

/// A decorative grass tuft placed on a ridge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrassTuft {
    pub pos: Vec2,
    /// Surface direction at the tuft (radians)
    pub angle: f32,
}

/// The layered hills every scene is played on
#[derive(Debug, Clone)]
pub struct Terrain {
    ridges: Vec<Ridge>,
}

impl Terrain {
    /// The standard three hills, front to back
    pub fn hills() -> Self {
        Self::from_curves(vec![
            curve_from_points(&RIDGE_FRONT),
            curve_from_points(&RIDGE_MIDDLE),
            curve_from_points(&RIDGE_BACK),
        ])
    }

    pub fn from_curves(curves: Vec<Curve>) -> Self {
        Self {
            ridges: curves.into_iter().map(Ridge::new).collect(),
        }
    }

    /// Terrain from SVG path data, one path per ridge
    pub fn from_paths(paths: &[&str]) -> Result<Self, PathError> {
        let curves = paths
            .iter()
            .map(|d| Curve::parse(d))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_curves(curves))
    }

    pub fn ridges(&self) -> &[Ridge] {
        &self.ridges
    }

    pub fn ridges_mut(&mut self) -> &mut [Ridge] {
        &mut self.ridges
    }

    pub fn crest_at(&mut self, x: f32) -> Option<f32> {
        crest_at(&mut self.ridges, x)
    }

    pub fn ground_below(&mut self, x: f32, feet_y: f32, tolerance: f32) -> Option<f32> {
        ground_below(&mut self.ridges, x, feet_y, tolerance)
    }

    /// Tufts every `GRASS_SPACING` along each ridge
    pub fn grass_tufts(&self) -> Vec<GrassTuft> {
        let mut tufts = Vec::new();
        for ridge in &self.ridges {
            let len = ridge.curve.total_length();
            let mut d = GRASS_MARGIN;
            while d < len - GRASS_MARGIN {
                if let (Some(pos), Some(angle)) =
                    (ridge.curve.point_at_length(d), ridge.curve.tangent_angle_at(d))
                {
                    tufts.push(GrassTuft { pos, angle });
                }
                d += GRASS_SPACING;
            }
        }
        tufts
    }
}

impl Default for Terrain {
    fn default() -> Self {
        Self::hills()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_match_path_data() {
        let parsed = Terrain::from_paths(&[
            "M0,560 C260,520 520,590 780,560 C1040,530 1120,585 1200,580",
            "M0,520 C220,450 420,560 640,520 C860,480 1040,560 1200,530",
            "M0,500 C200,430 400,530 600,480 C800,430 1000,520 1200,470",
        ])
        .unwrap();
        let built = Terrain::hills();
        for (a, b) in parsed.ridges().iter().zip(built.ridges()) {
            assert_eq!(a.curve.segments(), b.curve.segments());
        }
    }

    #[test]
    fn test_ground_below_picks_nearest_surface() {
        let mut terrain = Terrain::hills();
        // At x=0 the ridges sit at roughly 560, 520 and 500
        let feet_between = terrain.ground_below(0.0, 530.0, 2.0).unwrap();
        assert!((feet_between - 520.0).abs() < 2.0);
        let feet_low = terrain.ground_below(0.0, 600.0, 2.0).unwrap();
        assert!((feet_low - 560.0).abs() < 2.0);
        assert_eq!(terrain.ground_below(0.0, 400.0, 2.0), None);
    }

    #[test]
    fn test_crest_is_highest_ridge() {
        let mut terrain = Terrain::hills();
        let crest = terrain.crest_at(0.0).unwrap();
        assert!((crest - 500.0).abs() < 2.0);
    }

    #[test]
    fn test_ridge_cache_fills_once_per_key() {
        let mut terrain = Terrain::hills();
        terrain.crest_at(100.2);
        terrain.crest_at(99.9);
        for ridge in terrain.ridges() {
            assert_eq!(ridge.cached_samples(), 1);
        }
    }

    #[test]
    fn test_grass_tufts_spaced_along_ridges() {
        let terrain = Terrain::hills();
        let tufts = terrain.grass_tufts();
        // Each ridge is a bit longer than 1200 units
        assert!(tufts.len() >= 3 * 14);
        for t in &tufts {
            assert!(t.pos.x >= 0.0 && t.pos.x <= 1200.0);
            assert!(t.angle.abs() < std::f32::consts::FRAC_PI_2);
        }
    }
}
