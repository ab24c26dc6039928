/// Axis-aligned bounding box in screen space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Smallest box containing every finite point, or `None` when there is none.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = [f64; 2]>,
    {
        let mut out: Option<Aabb2> = None;
        for p in points {
            if !p[0].is_finite() || !p[1].is_finite() {
                continue;
            }
            match out.as_mut() {
                Some(b) => b.extend(p),
                None => out = Some(Aabb2::new(p, p)),
            }
        }
        out
    }

    pub fn extend(&mut self, p: [f64; 2]) {
        self.min[0] = self.min[0].min(p[0]);
        self.min[1] = self.min[1].min(p[1]);
        self.max[0] = self.max[0].max(p[0]);
        self.max[1] = self.max[1].max(p[1]);
    }

    pub fn union(self, other: Aabb2) -> Aabb2 {
        let mut out = self;
        out.extend(other.min);
        out.extend(other.max);
        out
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    pub fn center(&self) -> [f64; 2] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb2;

    #[test]
    fn from_points_skips_non_finite() {
        let b = Aabb2::from_points([[1.0, 2.0], [f64::NAN, 0.0], [-3.0, 5.0]]).expect("bounds");
        assert_eq!(b.min, [-3.0, 2.0]);
        assert_eq!(b.max, [1.0, 5.0]);
        assert_eq!(b.center(), [-1.0, 3.5]);
    }

    #[test]
    fn from_points_empty_is_none() {
        assert!(Aabb2::from_points(Vec::new()).is_none());
    }

    #[test]
    fn union_covers_both() {
        let a = Aabb2::new([0.0, 0.0], [1.0, 1.0]);
        let b = Aabb2::new([2.0, -1.0], [3.0, 0.5]);
        let u = a.union(b);
        assert_eq!(u.min, [0.0, -1.0]);
        assert_eq!(u.max, [3.0, 1.0]);
        assert_eq!(u.width(), 3.0);
        assert_eq!(u.height(), 2.0);
    }
}
