//! Spherical helpers for overlay geometry (arcs between two places).

use super::Vec3;

/// Geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// Point on the unit sphere.
    pub fn to_unit(self) -> Vec3 {
        let lon = self.lon.to_radians();
        let lat = self.lat.to_radians();
        Vec3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
    }

    pub fn from_unit(v: Vec3) -> Self {
        let v = v.normalize();
        Self::new(
            v.y.atan2(v.x).to_degrees(),
            v.z.clamp(-1.0, 1.0).asin().to_degrees(),
        )
    }
}

/// Central angle between two positions, in radians.
pub fn angular_distance(a: LonLat, b: LonLat) -> f64 {
    let (ua, ub) = (a.to_unit(), b.to_unit());
    ua.cross(ub).length().atan2(ua.dot(ub))
}

/// Point at fraction `t` along the great circle from `a` to `b`.
pub fn interpolate_great_circle(a: LonLat, b: LonLat, t: f64) -> LonLat {
    let d = angular_distance(a, b);
    if d.abs() < 1e-12 {
        return a;
    }
    let (ua, ub) = (a.to_unit(), b.to_unit());
    let sin_d = d.sin();
    let wa = ((1.0 - t) * d).sin() / sin_d;
    let wb = (t * d).sin() / sin_d;
    LonLat::from_unit(ua.scale(wa) + ub.scale(wb))
}

/// Great-circle polyline from `a` to `b` with `segments + 1` vertices.
pub fn great_arc(a: LonLat, b: LonLat, segments: usize) -> Vec<LonLat> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| interpolate_great_circle(a, b, i as f64 / segments as f64))
        .collect()
}
