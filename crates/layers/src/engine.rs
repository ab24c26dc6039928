//! Geometry engine: projection plus path generation over decoded features.

use std::f64::consts::PI;
use std::fmt::Write;

use foundation::Aabb2;
use foundation::math::{LonLat, Projection, ProjectionKind};
use formats::{Geometry, Position};
use options::format_number;

/// Radius of the marker drawn for point geometries.
pub const POINT_RADIUS: f64 = 4.5;

/// Projection and path services used by capability handlers.
pub trait GeometryEngine {
    fn projection(&self) -> &Projection;

    fn project(&self, p: LonLat) -> Option<[f64; 2]> {
        self.projection().project(p)
    }

    fn invert(&self, xy: [f64; 2]) -> Option<LonLat> {
        self.projection().invert(xy)
    }

    /// SVG path data for `geometry`; `None` when nothing is visible.
    fn path(&self, geometry: &Geometry) -> Option<String>;

    /// Screen-space centroid of the projected geometry.
    fn centroid(&self, geometry: &Geometry) -> Option<[f64; 2]>;

    /// Screen-space bounds of the projected geometry.
    fn bounds(&self, geometry: &Geometry) -> Option<Aabb2>;
}

/// Default [`GeometryEngine`] over a [`Projection`].
///
/// Points the projection clips (the far side of an orthographic globe) are
/// dropped vertex by vertex; a line or ring that loses vertices is split
/// into separate subpaths at the gap. Segments that jump across the
/// projection's seam are split the same way.
#[derive(Debug, Clone, PartialEq)]
pub struct Cartographer {
    projection: Projection,
}

impl Cartographer {
    pub fn new(projection: Projection) -> Self {
        Self { projection }
    }

    fn pos(&self, p: Position) -> Option<[f64; 2]> {
        self.projection.project(LonLat::new(p[0], p[1]))
    }

    /// Widest horizontal step that still counts as a continuous segment.
    fn seam_width(&self) -> f64 {
        match self.projection.kind {
            ProjectionKind::Orthographic => f64::INFINITY,
            _ => self.projection.scale * PI,
        }
    }

    /// Projects a polyline, splitting it into runs at clipped vertices and
    /// seam crossings.
    fn runs(&self, line: &[Position]) -> Vec<Vec<[f64; 2]>> {
        let seam = self.seam_width();
        let mut runs: Vec<Vec<[f64; 2]>> = Vec::new();
        let mut current: Vec<[f64; 2]> = Vec::new();
        for p in line {
            match self.pos(*p) {
                Some(xy) => {
                    if let Some(prev) = current.last()
                        && (xy[0] - prev[0]).abs() > seam
                    {
                        runs.push(std::mem::take(&mut current));
                    }
                    current.push(xy);
                }
                None => {
                    if !current.is_empty() {
                        runs.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }

    fn write_line(&self, out: &mut String, line: &[Position], close: bool) {
        let runs = self.runs(line);
        let whole = runs.len() == 1 && runs[0].len() == line.len();
        for run in runs {
            for (i, [x, y]) in run.iter().enumerate() {
                let cmd = if i == 0 { 'M' } else { 'L' };
                let _ = write!(out, "{cmd}{},{}", coord(*x), coord(*y));
            }
            if close && whole {
                out.push('Z');
            }
        }
    }

    fn write_point(&self, out: &mut String, p: Position) {
        let Some([x, y]) = self.pos(p) else {
            return;
        };
        let r = POINT_RADIUS;
        let _ = write!(
            out,
            "M{},{}m0,{r}a{r},{r} 0 1,1 0,{}a{r},{r} 0 1,1 0,{r}Z",
            coord(x),
            coord(y),
            -2.0 * r,
        );
    }
}

impl GeometryEngine for Cartographer {
    fn projection(&self) -> &Projection {
        &self.projection
    }

    fn path(&self, geometry: &Geometry) -> Option<String> {
        let mut out = String::new();
        match geometry {
            Geometry::Point(p) => self.write_point(&mut out, *p),
            Geometry::MultiPoint(ps) => {
                for p in ps {
                    self.write_point(&mut out, *p);
                }
            }
            Geometry::LineString(line) => self.write_line(&mut out, line, false),
            Geometry::MultiLineString(lines) => {
                for line in lines {
                    self.write_line(&mut out, line, false);
                }
            }
            Geometry::Polygon(rings) => {
                for ring in rings {
                    self.write_line(&mut out, ring, true);
                }
            }
            Geometry::MultiPolygon(polygons) => {
                for ring in polygons.iter().flatten() {
                    self.write_line(&mut out, ring, true);
                }
            }
            Geometry::Null => {}
        }
        (!out.is_empty()).then_some(out)
    }

    fn centroid(&self, geometry: &Geometry) -> Option<[f64; 2]> {
        let rings: Vec<&Vec<Position>> = match geometry {
            Geometry::Polygon(rings) => rings.iter().collect(),
            Geometry::MultiPolygon(polygons) => polygons.iter().flatten().collect(),
            Geometry::LineString(line) => return self.line_centroid(std::slice::from_ref(line)),
            Geometry::MultiLineString(lines) => return self.line_centroid(lines),
            _ => return self.mean(geometry),
        };

        // Shoelace over every ring. Holes wind the other way, so their
        // signed area subtracts.
        let mut area = 0.0;
        let mut cx = 0.0;
        let mut cy = 0.0;
        for ring in rings {
            let projected: Vec<[f64; 2]> = ring.iter().filter_map(|p| self.pos(*p)).collect();
            for pair in projected.windows(2) {
                let [x0, y0] = pair[0];
                let [x1, y1] = pair[1];
                let cross = x0 * y1 - x1 * y0;
                area += cross;
                cx += (x0 + x1) * cross;
                cy += (y0 + y1) * cross;
            }
        }
        if area.abs() < 1e-9 {
            return self.mean(geometry);
        }
        Some([cx / (3.0 * area), cy / (3.0 * area)])
    }

    fn bounds(&self, geometry: &Geometry) -> Option<Aabb2> {
        Aabb2::from_points(geometry.positions().into_iter().filter_map(|p| self.pos(p)))
    }
}

impl Cartographer {
    fn mean(&self, geometry: &Geometry) -> Option<[f64; 2]> {
        let projected: Vec<[f64; 2]> = geometry
            .positions()
            .into_iter()
            .filter_map(|p| self.pos(p))
            .collect();
        if projected.is_empty() {
            return None;
        }
        let n = projected.len() as f64;
        let (sx, sy) = projected
            .iter()
            .fold((0.0, 0.0), |(sx, sy), [x, y]| (sx + x, sy + y));
        Some([sx / n, sy / n])
    }

    /// Length-weighted midpoint of every projected segment.
    fn line_centroid(&self, lines: &[Vec<Position>]) -> Option<[f64; 2]> {
        let mut total = 0.0;
        let mut cx = 0.0;
        let mut cy = 0.0;
        for line in lines {
            for run in self.runs(line) {
                for pair in run.windows(2) {
                    let [x0, y0] = pair[0];
                    let [x1, y1] = pair[1];
                    let len = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
                    total += len;
                    cx += (x0 + x1) * 0.5 * len;
                    cy += (y0 + y1) * 0.5 * len;
                }
            }
        }
        if total <= 0.0 {
            return self.mean(&Geometry::MultiLineString(lines.to_vec()));
        }
        Some([cx / total, cy / total])
    }
}

/// Screen coordinate text: rounded to thousandths, integral values bare.
pub fn coord(v: f64) -> String {
    format_number((v * 1000.0).round() / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::{Cartographer, GeometryEngine, coord};
    use formats::Geometry;
    use foundation::math::{Projection, ProjectionKind};
    use pretty_assertions::assert_eq;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    /// One degree per pixel, origin at (0, 0).
    fn flat() -> Cartographer {
        Cartographer::new(
            Projection::new(ProjectionKind::Equirectangular)
                .with_scale(180.0 / std::f64::consts::PI)
                .with_translate([0.0, 0.0]),
        )
    }

    fn square(x: f64, y: f64, size: f64) -> Vec<[f64; 2]> {
        vec![
            [x, y],
            [x + size, y],
            [x + size, y + size],
            [x, y + size],
            [x, y],
        ]
    }

    #[test]
    fn polygon_path_is_closed() {
        let d = flat()
            .path(&Geometry::Polygon(vec![square(0.0, 0.0, 10.0)]))
            .expect("path");
        assert_eq!(d, "M0,0L10,0L10,-10L0,-10L0,0Z");
    }

    #[test]
    fn point_path_draws_a_marker() {
        let d = flat().path(&Geometry::Point([1.0, 2.0])).expect("path");
        assert!(d.starts_with("M1,-2m0,4.5a4.5,4.5"));
        assert!(d.ends_with('Z'));
    }

    #[test]
    fn null_geometry_has_no_path() {
        assert_eq!(flat().path(&Geometry::Null), None);
    }

    #[test]
    fn centroid_is_area_weighted() {
        let engine = flat();
        let c = engine
            .centroid(&Geometry::MultiPolygon(vec![
                vec![square(0.0, 0.0, 10.0)],
                vec![square(20.0, 0.0, 1.0)],
            ]))
            .expect("centroid");
        // The big square dominates: 100 vs 1 unit of area.
        assert_close(c[0], (5.0 * 100.0 + 20.5) / 101.0, 1e-9);
        assert_close(c[1], -(5.0 * 100.0 + 0.5) / 101.0, 1e-9);
    }

    #[test]
    fn centroid_falls_back_to_mean_for_degenerate_rings() {
        let c = flat()
            .centroid(&Geometry::Polygon(vec![vec![
                [0.0, 0.0],
                [4.0, 0.0],
                [0.0, 0.0],
                [0.0, 0.0],
            ]]))
            .expect("centroid");
        assert_close(c[0], 1.0, 1e-9);
        assert_close(c[1], 0.0, 1e-9);
    }

    #[test]
    fn line_centroid_is_the_midpoint() {
        let c = flat()
            .centroid(&Geometry::LineString(vec![[0.0, 0.0], [10.0, 0.0]]))
            .expect("centroid");
        assert_close(c[0], 5.0, 1e-9);
    }

    #[test]
    fn seam_crossings_split_the_path() {
        let d = flat()
            .path(&Geometry::LineString(vec![[170.0, 0.0], [190.0, 0.0]]))
            .expect("path");
        assert_eq!(d, "M170,0M-170,0");
    }

    #[test]
    fn orthographic_back_side_is_dropped() {
        let engine = Cartographer::new(
            Projection::new(ProjectionKind::Orthographic).with_translate([0.0, 0.0]),
        );
        assert_eq!(engine.path(&Geometry::Point([180.0, 0.0])), None);
        let bounds = engine
            .bounds(&Geometry::MultiPoint(vec![[0.0, 0.0], [180.0, 0.0]]))
            .expect("bounds");
        assert_eq!(bounds.min, [0.0, 0.0]);
    }

    #[test]
    fn coordinates_are_rounded() {
        assert_eq!(coord(1.23456), "1.235");
        assert_eq!(coord(-0.0004), "0");
        assert_eq!(coord(480.0), "480");
    }
}
