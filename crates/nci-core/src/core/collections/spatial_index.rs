use nalgebra::{Point3, Vector3};

/// Sentinel value indicating the end of a cell's linked list.
const SENTINEL: u32 = u32::MAX;

/// Upper bound on grid cells per indexed point before the cells are coarsened.
const MAX_CELLS_PER_POINT: usize = 8;
const MIN_CELL_BUDGET: usize = 4096;

/// A uniform grid over a fixed set of points answering fixed-radius queries.
///
/// Each point is binned into the cubic cell obtained by flooring its offset from
/// the bounding-box origin divided by the cell size. A query visits the cells
/// overlapping the cube of side `2 * radius` around the query point, so a radius
/// up to the cell size touches the 3x3x3 neighborhood and a larger radius widens
/// the neighborhood instead of missing points. Every point within `radius` is
/// reported exactly once, with its squared distance.
///
/// Very sparse point sets coarsen the grid so the number of cells stays
/// proportional to the number of points.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    /// Side length of each cubic cell.
    cell_size: f64,
    /// Minimum corner of the bounding box.
    origin: Point3<f64>,
    /// Number of cells along x, y and z.
    dims: Vector3<usize>,
    /// First point of each cell. Size = number of cells.
    head: Vec<u32>,
    /// Next point in the same cell. Size = number of points.
    next: Vec<u32>,
    points: Vec<Point3<f64>>,
}

impl SpatialIndex {
    /// Builds an index over `points`.
    ///
    /// # Arguments
    ///
    /// * `points` - Points to index; their positions in this vector are the reported indices.
    /// * `cell_size` - Requested cell edge length, normally the largest query radius.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not a positive finite number.
    pub fn new(points: Vec<Point3<f64>>, cell_size: f64) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "Cell size must be positive"
        );

        if points.is_empty() {
            return Self {
                cell_size,
                origin: Point3::origin(),
                dims: Vector3::zeros(),
                head: Vec::new(),
                next: Vec::new(),
                points,
            };
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
        for p in &points {
            min = min.inf(p);
            max = max.sup(p);
        }
        let extent = max - min;

        let budget = (points.len() * MAX_CELLS_PER_POINT).max(MIN_CELL_BUDGET);
        let mut cell_size = cell_size;
        let mut dims = Self::dims_for(&extent, cell_size);
        while dims.x.saturating_mul(dims.y).saturating_mul(dims.z) > budget {
            cell_size *= 2.0;
            dims = Self::dims_for(&extent, cell_size);
        }

        let total_cells = dims.x * dims.y * dims.z;
        let mut head = vec![SENTINEL; total_cells];
        let mut next = vec![SENTINEL; points.len()];

        for (i, p) in points.iter().enumerate() {
            let [x, y, z] = Self::cell_coords(p, &min, cell_size, &dims);
            let cell = x + y * dims.x + z * dims.x * dims.y;
            next[i] = head[cell];
            head[cell] = i as u32;
        }

        Self {
            cell_size,
            origin: min,
            dims,
            head,
            next,
            points,
        }
    }

    /// Builds an index from separate coordinate arrays of equal length.
    pub fn from_coords(x: &[f64], y: &[f64], z: &[f64], cell_size: f64) -> Self {
        debug_assert!(x.len() == y.len() && y.len() == z.len());
        let points = x
            .iter()
            .zip(y)
            .zip(z)
            .map(|((&x, &y), &z)| Point3::new(x, y, z))
            .collect();
        Self::new(points, cell_size)
    }

    fn dims_for(extent: &Vector3<f64>, cell_size: f64) -> Vector3<usize> {
        extent.map(|e| (e / cell_size).floor() as usize + 1)
    }

    fn cell_coords(
        p: &Point3<f64>,
        origin: &Point3<f64>,
        cell_size: f64,
        dims: &Vector3<usize>,
    ) -> [usize; 3] {
        let offset = p - origin;
        [0, 1, 2].map(|axis| {
            let cell = (offset[axis] / cell_size).floor();
            (cell.max(0.0) as usize).min(dims[axis] - 1)
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Effective cell size after any coarsening.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn point(&self, index: usize) -> Point3<f64> {
        self.points[index]
    }

    /// Reports every indexed point within `radius` of `center`.
    ///
    /// # Arguments
    ///
    /// * `center` - Query position.
    /// * `radius` - Inclusive search radius.
    /// * `callback` - Invoked once per hit with the point index and squared distance.
    pub fn each_within(
        &self,
        center: &Point3<f64>,
        radius: f64,
        mut callback: impl FnMut(usize, f64),
    ) {
        if self.points.is_empty() || radius < 0.0 || !radius.is_finite() {
            return;
        }

        let radius_sq = radius * radius;
        let offset = center - self.origin;
        let mut lo = [0usize; 3];
        let mut hi = [0usize; 3];
        for axis in 0..3 {
            let low = ((offset[axis] - radius) / self.cell_size).floor();
            let high = ((offset[axis] + radius) / self.cell_size).floor();
            let last = (self.dims[axis] - 1) as f64;
            if high < 0.0 || low > last {
                return;
            }
            lo[axis] = low.max(0.0) as usize;
            hi[axis] = high.min(last) as usize;
        }

        for z in lo[2]..=hi[2] {
            for y in lo[1]..=hi[1] {
                let row = y * self.dims.x + z * self.dims.x * self.dims.y;
                for x in lo[0]..=hi[0] {
                    let mut item = self.head[row + x];
                    while item != SENTINEL {
                        let index = item as usize;
                        let dist_sq = (self.points[index] - center).norm_squared();
                        if dist_sq <= radius_sq {
                            callback(index, dist_sq);
                        }
                        item = self.next[index];
                    }
                }
            }
        }
    }

    /// Indices of all points within `radius` of `center`, ascending.
    pub fn within(&self, center: &Point3<f64>, radius: f64) -> Vec<usize> {
        let mut hits = Vec::new();
        self.each_within(center, radius, |index, _| hits.push(index));
        hits.sort_unstable();
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn brute_force(points: &[Point3<f64>], center: &Point3<f64>, radius: f64) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(_, p)| (*p - center).norm_squared() <= radius * radius)
            .map(|(i, _)| i)
            .collect()
    }

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
    fn random_cloud_queries_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        let points = random_cloud(&mut rng, 500, 20.0);
        let index = SpatialIndex::new(points.clone(), 4.0);

        for _ in 0..100 {
            let center = Point3::new(
                rng.gen_range(-25.0..25.0),
                rng.gen_range(-25.0..25.0),
                rng.gen_range(-25.0..25.0),
            );
            let radius = rng.gen_range(0.0..4.0);
            assert_eq!(index.within(&center, radius), brute_force(&points, &center, radius));
        }
    }

    #[test]
    fn radius_larger_than_cell_size_widens_neighborhood() {
        let mut rng = StdRng::seed_from_u64(11);
        let points = random_cloud(&mut rng, 300, 15.0);
        let index = SpatialIndex::new(points.clone(), 1.5);

        for radius in [2.0, 5.0, 9.5] {
            let center = Point3::new(1.0, -2.0, 0.5);
            assert_eq!(index.within(&center, radius), brute_force(&points, &center, radius));
        }
    }

    #[test]
    fn each_within_reports_every_hit_once_with_squared_distance() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(10.0, 10.0, 10.0),
        ];
        let index = SpatialIndex::new(points, 2.0);
        let mut hits = Vec::new();
        index.each_within(&Point3::origin(), 2.0, |i, d2| hits.push((i, d2)));
        hits.sort_by_key(|&(i, _)| i);
        assert_eq!(hits, vec![(0, 0.0), (1, 1.0), (2, 4.0)]);
    }

    #[test]
    fn queries_far_outside_the_bounding_box_find_nothing() {
        let index = SpatialIndex::new(vec![Point3::new(0.0, 0.0, 0.0)], 3.0);
        assert!(index.within(&Point3::new(100.0, 0.0, 0.0), 5.0).is_empty());
        assert_eq!(index.within(&Point3::new(-2.0, 0.0, 0.0), 2.5), vec![0]);
    }

    #[test]
    fn empty_index_answers_every_query_with_nothing() {
        let index = SpatialIndex::new(Vec::new(), 1.0);
        assert!(index.is_empty());
        assert!(index.within(&Point3::origin(), 100.0).is_empty());
    }

    #[test]
    fn sparse_clouds_coarsen_cells_without_losing_points() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(5000.0, 5000.0, 5000.0)];
        let index = SpatialIndex::new(points, 0.5);
        assert!(index.cell_size() > 0.5);
        assert_eq!(index.within(&Point3::new(4999.0, 5000.0, 5000.0), 1.0), vec![1]);
    }

    #[test]
    fn from_coords_matches_point_constructor() {
        let index = SpatialIndex::from_coords(&[0.0, 3.0], &[0.0, 0.0], &[0.0, 4.0], 5.0);
        assert_eq!(index.len(), 2);
        assert_eq!(index.point(1), Point3::new(3.0, 0.0, 4.0));
        assert_eq!(index.within(&Point3::origin(), 5.0), vec![0, 1]);
    }

    #[test]
    #[should_panic(expected = "Cell size must be positive")]
    fn non_positive_cell_size_panics() {
        SpatialIndex::new(vec![Point3::origin()], 0.0);
    }
}
