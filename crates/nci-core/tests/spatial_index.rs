use nalgebra::Point3;
use ncikit::core::collections::SpatialIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_cloud(rng: &mut StdRng, count: usize, extent: f64) -> Vec<Point3<f64>> {
    (0..count)
        .map(|_| {
            Point3::new(
                rng.gen_range(-extent..extent),
                rng.gen_range(-extent..extent),
                rng.gen_range(-extent..extent),
            )
        })
        .collect()
}

#[test]
fn grid_queries_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let points = random_cloud(&mut rng, 500, 15.0);

    for cell_size in [1.0, 3.7, 6.5] {
        let index = SpatialIndex::new(points.clone(), cell_size);
        for _ in 0..50 {
            let center = random_cloud(&mut rng, 1, 18.0)[0];
            let radius = rng.gen_range(0.5..8.0);

            let expected: Vec<usize> = points
                .iter()
                .enumerate()
                .filter(|(_, p)| (*p - center).norm_squared() <= radius * radius)
                .map(|(i, _)| i)
                .collect();
            assert_eq!(index.within(&center, radius), expected);
        }
    }
}

#[test]
fn squared_distances_are_reported_with_hits() {
    let mut rng = StdRng::seed_from_u64(42);
    let points = random_cloud(&mut rng, 200, 5.0);
    let index = SpatialIndex::new(points.clone(), 2.0);
    let center = Point3::origin();

    index.each_within(&center, 4.0, |i, dist_sq| {
        assert!((dist_sq - (points[i] - center).norm_squared()).abs() < 1e-12);
        assert!(dist_sq <= 16.0);
    });
}
