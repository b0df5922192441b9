use rand::Rng;

/// A point in 3D space.
pub type Point = [f64; 3];

/// Axis-aligned bounding box in 3D space.
///
/// Boxes produced by a tree build satisfy `min <= max` on every axis. Child nodes carry
/// clipped copies of their parent's box, so a node's box may be larger than the points
/// it actually holds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Computes the tight bounds of `points`.
    ///
    /// Points are visited in pairs: the smaller coordinate of a pair is only compared against
    /// the running minimum and the larger only against the running maximum. An empty slice
    /// yields the default box.
    pub fn from_points(points: &[Point]) -> Self {
        if points.is_empty() {
            return Self::default();
        }

        let mut min = [f64::MAX; 3];
        let mut max = [f64::MIN; 3];

        let mut pairs = points.chunks_exact(2);
        for pair in &mut pairs {
            let (a, b) = (&pair[0], &pair[1]);
            for axis in 0..3 {
                let (lo, hi) = if a[axis] > b[axis] { (b[axis], a[axis]) } else { (a[axis], b[axis]) };
                if lo < min[axis] { min[axis] = lo; }
                if hi > max[axis] { max[axis] = hi; }
            }
        }

        // odd trailing point
        if let [last] = pairs.remainder() {
            for axis in 0..3 {
                if last[axis] < min[axis] { min[axis] = last[axis]; }
                if last[axis] > max[axis] { max[axis] = last[axis]; }
            }
        }

        Self { min, max }
    }

    /// Extent of the box along each axis.
    pub fn size(&self) -> Point {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    pub fn center(&self) -> Point {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }

    /// Returns the point on or inside the box closest to `p`.
    pub fn closest_point(&self, p: &Point) -> Point {
        [
            p[0].max(self.min[0]).min(self.max[0]),
            p[1].max(self.min[1]).min(self.max[1]),
            p[2].max(self.min[2]).min(self.max[2]),
        ]
    }

    /// Squared distance from `p` to the box, zero when `p` is inside.
    pub fn distance_sq(&self, p: &Point) -> f64 {
        distance_sq(&self.closest_point(p), p)
    }

    pub fn contains(&self, p: &Point) -> bool {
        p[0] >= self.min[0] && p[0] <= self.max[0] &&
        p[1] >= self.min[1] && p[1] <= self.max[1] &&
        p[2] >= self.min[2] && p[2] <= self.max[2]
    }

    /// Inclusive overlap test; boxes that only share a face intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.max[0] >= other.min[0] && self.min[0] <= other.max[0] &&
        self.max[1] >= other.min[1] && self.min[1] <= other.max[1] &&
        self.max[2] >= other.min[2] && self.min[2] <= other.max[2]
    }

    /// Copy of the box with `max[axis]` replaced by `value`.
    pub fn clip_max(&self, axis: usize, value: f64) -> Self {
        let mut clipped = *self;
        clipped.max[axis] = value;
        clipped
    }

    /// Copy of the box with `min[axis]` replaced by `value`.
    pub fn clip_min(&self, axis: usize, value: f64) -> Self {
        let mut clipped = *self;
        clipped.min[axis] = value;
        clipped
    }

    /// Samples `count` points uniformly inside the box.
    pub fn random_points<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Point> {
        let size = self.size();
        (0..count)
            .map(|_| {
                [
                    self.min[0] + rng.r#gen::<f64>() * size[0],
                    self.min[1] + rng.r#gen::<f64>() * size[1],
                    self.min[2] + rng.r#gen::<f64>() * size[2],
                ]
            })
            .collect()
    }
}

/// Squared euclidean distance between two points.
#[inline]
pub fn distance_sq(a: &Point, b: &Point) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}
