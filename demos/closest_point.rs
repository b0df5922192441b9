//! Builds a small tree, moves a point, rebuilds and queries it.
//!
//! Run with `RUST_LOG=kdthree=trace` to see the build and query events.
use kdthree::{BoundingBox, KdQuery, KdTree};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let bounds = BoundingBox::new([-1.0, -1.0, -1.0], [1.0, 1.0, 1.0]);
    let mut rng = StdRng::seed_from_u64(42);
    let points = bounds.random_points(1000, &mut rng);

    let mut tree = KdTree::from_points(&points, 8)?;
    let mut query = KdQuery::new();
    let target = [0.25, -0.5, 0.75];

    if let Some(hit) = query.closest_point(&tree, target) {
        println!("closest to {:?}: #{} at {:?} (d = {:.4})", target, hit.index, tree.points()[hit.index], hit.distance_sq.sqrt());
    }

    // Move point 0 onto the target and rebuild in place
    tree.points_mut()[0] = target;
    tree.rebuild();

    for n in query.k_nearest(&tree, target, 4)? {
        println!("#{:4} d = {:.4}", n.index, n.distance_sq.sqrt());
    }

    let hits = query.radius(&tree, target, 0.2)?;
    println!("{} points within 0.2 of {:?}", hits.len(), target);

    Ok(())
}
