use kdthree::{par_k_nearest, BoundingBox, BuildParams, KdTree, PivotRule};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() {
    // Initialize Rayon explicitly so thread creation (clone3) happens
    // before the heavy queries we want to profile.
    rayon::ThreadPoolBuilder::new().build_global().unwrap();

    let bounds = BoundingBox::new([0.0, 0.0, 0.0], [100.0, 100.0, 100.0]);
    let mut rng = StdRng::seed_from_u64(123456789);

    // A million points gives a deep enough tree to get a good profile
    let points = bounds.random_points(1_000_000, &mut rng);
    let queries = bounds.random_points(200_000, &mut rng);

    let mut tree = KdTree::with_params(BuildParams {
        pivot_rule: PivotRule::SlidingMidpoint,
        ..BuildParams::default()
    })
    .unwrap();
    tree.build(&points);

    // Hot path
    let results = par_k_nearest(&tree, &queries, 8).unwrap();
    println!("{} queries, {} neighbors", results.len(), results.iter().map(Vec::len).sum::<usize>());
}
