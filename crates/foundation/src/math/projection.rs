//! Named map projections from geographic degrees to screen pixels.
//!
//! Screen space has `y` growing downwards. `translate` is the pixel position
//! of `center`; `scale` is pixels per radian.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::LonLat;

/// Latitude limit of the square Web-Mercator world.
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ProjectionKind {
    Equirectangular,
    Mercator,
    Orthographic,
}

impl ProjectionKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "equirectangular" => Some(Self::Equirectangular),
            "mercator" => Some(Self::Mercator),
            "orthographic" => Some(Self::Orthographic),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Equirectangular => "equirectangular",
            Self::Mercator => "mercator",
            Self::Orthographic => "orthographic",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    pub kind: ProjectionKind,
    pub scale: f64,
    pub translate: [f64; 2],
    /// Ignored by the orthographic projection, which is positioned by `rotation`.
    pub center: LonLat,
    /// `[lambda, phi]` rotation in degrees, applied before projecting.
    pub rotation: [f64; 2],
}

impl Projection {
    pub fn new(kind: ProjectionKind) -> Self {
        Self {
            kind,
            scale: 150.0,
            translate: [480.0, 250.0],
            center: LonLat::new(0.0, 0.0),
            rotation: [0.0, 0.0],
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        ProjectionKind::from_name(name).map(Self::new)
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_translate(mut self, translate: [f64; 2]) -> Self {
        self.translate = translate;
        self
    }

    pub fn with_center(mut self, center: LonLat) -> Self {
        self.center = center;
        self
    }

    pub fn with_rotation(mut self, rotation: [f64; 2]) -> Self {
        self.rotation = rotation;
        self
    }

    /// Projects `p` to pixels. `None` when the point is not visible
    /// (orthographic back hemisphere) or not finite.
    pub fn project(&self, p: LonLat) -> Option<[f64; 2]> {
        if !p.is_finite() {
            return None;
        }
        let [tx, ty] = self.translate;
        let s = self.scale;
        match self.kind {
            ProjectionKind::Equirectangular => {
                let lambda = wrap_degrees(p.lon + self.rotation[0]).to_radians();
                let x = tx + s * (lambda - self.center.lon.to_radians());
                let y = ty - s * (p.lat.to_radians() - self.center.lat.to_radians());
                Some([x, y])
            }
            ProjectionKind::Mercator => {
                let lambda = wrap_degrees(p.lon + self.rotation[0]).to_radians();
                let x = tx + s * (lambda - self.center.lon.to_radians());
                let y = ty - s * (mercator_y(p.lat) - mercator_y(self.center.lat));
                Some([x, y])
            }
            ProjectionKind::Orthographic => {
                let (lambda0, phi0) = self.ortho_origin();
                let lambda = p.lon.to_radians();
                let phi = p.lat.to_radians();
                let cos_c =
                    phi0.sin() * phi.sin() + phi0.cos() * phi.cos() * (lambda - lambda0).cos();
                if cos_c < 0.0 {
                    return None;
                }
                let x = phi.cos() * (lambda - lambda0).sin();
                let y = phi0.cos() * phi.sin() - phi0.sin() * phi.cos() * (lambda - lambda0).cos();
                Some([tx + s * x, ty - s * y])
            }
        }
    }

    /// Inverse of [`Projection::project`].
    pub fn invert(&self, xy: [f64; 2]) -> Option<LonLat> {
        if !xy[0].is_finite() || !xy[1].is_finite() || self.scale == 0.0 {
            return None;
        }
        let [tx, ty] = self.translate;
        let s = self.scale;
        let out = match self.kind {
            ProjectionKind::Equirectangular => {
                let lambda = self.center.lon.to_radians() + (xy[0] - tx) / s;
                let phi = self.center.lat.to_radians() + (ty - xy[1]) / s;
                if phi.abs() > FRAC_PI_2 + 1e-12 {
                    return None;
                }
                LonLat::new(
                    wrap_degrees(lambda.to_degrees() - self.rotation[0]),
                    phi.to_degrees(),
                )
            }
            ProjectionKind::Mercator => {
                let lambda = self.center.lon.to_radians() + (xy[0] - tx) / s;
                let m = mercator_y(self.center.lat) + (ty - xy[1]) / s;
                let phi = 2.0 * m.exp().atan() - FRAC_PI_2;
                LonLat::new(
                    wrap_degrees(lambda.to_degrees() - self.rotation[0]),
                    phi.to_degrees(),
                )
            }
            ProjectionKind::Orthographic => {
                let (lambda0, phi0) = self.ortho_origin();
                let x = (xy[0] - tx) / s;
                let y = (ty - xy[1]) / s;
                let rho = (x * x + y * y).sqrt();
                if rho > 1.0 + 1e-12 {
                    return None;
                }
                if rho < 1e-15 {
                    return Some(LonLat::new(lambda0.to_degrees(), phi0.to_degrees()));
                }
                let c = rho.min(1.0).asin();
                let phi = (c.cos() * phi0.sin() + y * c.sin() * phi0.cos() / rho)
                    .clamp(-1.0, 1.0)
                    .asin();
                let lambda = lambda0
                    + (x * c.sin()).atan2(rho * c.cos() * phi0.cos() - y * c.sin() * phi0.sin());
                LonLat::new(wrap_degrees(lambda.to_degrees()), phi.to_degrees())
            }
        };
        Some(out)
    }

    fn ortho_origin(&self) -> (f64, f64) {
        (
            (-self.rotation[0]).to_radians(),
            (-self.rotation[1]).to_radians(),
        )
    }
}

/// Wraps a longitude into `[-180, 180)`.
pub fn wrap_degrees(deg: f64) -> f64 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

fn mercator_y(lat_deg: f64) -> f64 {
    let phi = lat_deg
        .clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT)
        .to_radians();
    (FRAC_PI_4 + phi * 0.5).tan().ln()
}
