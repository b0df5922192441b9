use crate::bounds::{distance_sq, BoundingBox, Point};
use crate::error::{KdError, Result};
use crate::kdtree::KdTree;
use crate::query::{KdQuery, RangeHit};

/// A query region for [`KdQuery::range`].
pub trait Region {
    /// Reference point used to track the closest bound point of queued nodes.
    fn center(&self) -> Point;

    /// Whether the region may overlap `bounds`. Must not return `false` for a box that
    /// contains a matching point.
    fn intersects(&self, bounds: &BoundingBox) -> bool;

    fn contains(&self, point: &Point) -> bool;
}

/// A closed ball, used for radius queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    center: Point,
    radius: f64,
    radius_sq: f64,
}

impl Sphere {
    pub fn new(center: Point, radius: f64) -> Result<Self> {
        if radius.is_nan() || radius < 0.0 {
            return Err(KdError::InvalidRadius(radius));
        }
        Ok(Sphere {
            center,
            radius,
            radius_sq: radius * radius,
        })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Region for Sphere {
    fn center(&self) -> Point {
        self.center
    }

    fn intersects(&self, bounds: &BoundingBox) -> bool {
        bounds.distance_sq(&self.center) <= self.radius_sq
    }

    fn contains(&self, point: &Point) -> bool {
        distance_sq(point, &self.center) <= self.radius_sq
    }
}

impl Region for BoundingBox {
    fn center(&self) -> Point {
        BoundingBox::center(self)
    }

    fn intersects(&self, bounds: &BoundingBox) -> bool {
        BoundingBox::intersects(self, bounds)
    }

    fn contains(&self, point: &Point) -> bool {
        BoundingBox::contains(self, point)
    }
}

impl KdQuery {
    /// Collects every point inside `region`, in traversal order.
    pub fn range<R: Region + ?Sized>(&mut self, tree: &KdTree, region: &R) -> Vec<RangeHit> {
        let mut hits = Vec::new();
        self.range_into(tree, region, &mut hits);
        hits
    }

    /// Appends every point inside `region` to `hits`.
    pub fn range_into<R: Region + ?Sized>(&mut self, tree: &KdTree, region: &R, hits: &mut Vec<RangeHit>) {
        self.reset();
        if tree.is_empty() {
            return;
        }

        let points = tree.points();
        let permutation = tree.permutation();
        let center = region.center();
        let before = hits.len();

        self.push_to_queue(tree.root_id(), tree.root().bounds.closest_point(&center));

        while let Ok(pending) = self.pop_from_queue() {
            self.visited += 1;
            let node = tree.node(pending.node);
            if !region.intersects(&node.bounds) {
                continue;
            }

            match node.children() {
                Some(children) => {
                    for child in children {
                        let child_node = tree.node(child);
                        if child_node.count() > 0 {
                            self.push_to_queue(child, child_node.bounds.closest_point(&center));
                        }
                    }
                }
                None => {
                    for &index in &permutation[node.start..node.end] {
                        let point = points[index];
                        if region.contains(&point) {
                            hits.push(RangeHit { index, point });
                        }
                    }
                }
            }
        }

        tracing::trace!(visited = self.visited, found = hits.len() - before, "range query");
    }

    /// All points within `radius` of `center`, boundary included.
    pub fn radius(&mut self, tree: &KdTree, center: Point, radius: f64) -> Result<Vec<RangeHit>> {
        let sphere = Sphere::new(center, radius)?;
        Ok(self.range(tree, &sphere))
    }

    /// All points inside the axis-aligned box `min..=max`.
    pub fn interval(&mut self, tree: &KdTree, min: Point, max: Point) -> Vec<RangeHit> {
        self.range(tree, &BoundingBox::new(min, max))
    }
}
