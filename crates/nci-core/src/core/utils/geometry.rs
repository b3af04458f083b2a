use nalgebra::{Point3, Unit, Vector3};

const DEGENERATE_LENGTH: f64 = 1e-8;

/// Angle between two vectors in degrees, or `None` if either is degenerate.
pub fn vector_angle(u: &Vector3<f64>, v: &Vector3<f64>) -> Option<f64> {
    let denom = u.norm() * v.norm();
    if denom < DEGENERATE_LENGTH {
        return None;
    }
    let cos = (u.dot(v) / denom).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// Angle `a`-`vertex`-`b` in degrees, or `None` if a point coincides with the vertex.
pub fn angle(a: &Point3<f64>, vertex: &Point3<f64>, b: &Point3<f64>) -> Option<f64> {
    vector_angle(&(a - vertex), &(b - vertex))
}

/// Arithmetic mean of the points, or `None` for an empty slice.
pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

/// Normal of the best plane through a closed polygon (Newell's method).
///
/// Returns `None` for fewer than three points or a collinear polygon.
pub fn plane_normal(points: &[Point3<f64>]) -> Option<Unit<Vector3<f64>>> {
    if points.len() < 3 {
        return None;
    }
    let mut normal = Vector3::zeros();
    for (i, current) in points.iter().enumerate() {
        let next = &points[(i + 1) % points.len()];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    Unit::try_new(normal, DEGENERATE_LENGTH)
}

/// Normal of the plane spanned by `center`, `a` and `b`.
pub fn triangle_normal(
    center: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
) -> Option<Unit<Vector3<f64>>> {
    Unit::try_new((a - center).cross(&(b - center)), DEGENERATE_LENGTH)
}

/// Angle in degrees (0 to 90) between the direction `center -> target` and the
/// plane with the given normal through `center`.
pub fn out_of_plane_angle(
    normal: &Unit<Vector3<f64>>,
    center: &Point3<f64>,
    target: &Point3<f64>,
) -> Option<f64> {
    let direction = target - center;
    let length = direction.norm();
    if length < DEGENERATE_LENGTH {
        return None;
    }
    let sine = (normal.dot(&direction) / length).abs().min(1.0);
    Some(sine.asin().to_degrees())
}

/// Largest absolute distance of any point from the plane through `center`.
pub fn max_plane_deviation(
    points: &[Point3<f64>],
    center: &Point3<f64>,
    normal: &Unit<Vector3<f64>>,
) -> f64 {
    points
        .iter()
        .map(|p| normal.dot(&(p - center)).abs())
        .fold(0.0, f64::max)
}

/// Distance from `point` to its projection onto the plane through `plane_center`,
/// measured within the plane from `plane_center`.
pub fn lateral_offset(
    point: &Point3<f64>,
    plane_center: &Point3<f64>,
    normal: &Unit<Vector3<f64>>,
) -> f64 {
    let v = point - plane_center;
    let projected = v - normal.into_inner() * normal.dot(&v);
    projected.norm()
}

/// Shortest distance from `point` to the segment `start`-`end`.
pub fn point_segment_distance(point: &Point3<f64>, start: &Point3<f64>, end: &Point3<f64>) -> f64 {
    let segment = end - start;
    let length_sq = segment.norm_squared();
    if length_sq < DEGENERATE_LENGTH {
        return (point - start).norm();
    }
    let t = ((point - start).dot(&segment) / length_sq).clamp(0.0, 1.0);
    (point - (start + segment * t)).norm()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn angle_measures_degrees_at_vertex() {
        let vertex = Point3::origin();
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::new(0.0, 2.0, 0.0);
        assert!((angle(&a, &vertex, &b).unwrap() - 90.0).abs() < EPS);
        let c = Point3::new(-3.0, 0.0, 0.0);
        assert!((angle(&a, &vertex, &c).unwrap() - 180.0).abs() < EPS);
        assert!(angle(&vertex, &vertex, &a).is_none());
    }

    #[test]
    fn centroid_averages_points() {
        let points = [Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, -2.0)];
        assert_eq!(centroid(&points), Some(Point3::new(1.0, 2.0, -1.0)));
        assert_eq!(centroid(&[]), None);
    }

    #[test]
    fn plane_normal_of_hexagon_is_z_axis() {
        let hexagon: Vec<Point3<f64>> = (0..6)
            .map(|i| {
                let t = (i as f64) * std::f64::consts::PI / 3.0;
                Point3::new(1.4 * t.cos(), 1.4 * t.sin(), 2.0)
            })
            .collect();
        let normal = plane_normal(&hexagon).unwrap();
        assert!((normal.z.abs() - 1.0).abs() < EPS);
        let center = centroid(&hexagon).unwrap();
        assert!(max_plane_deviation(&hexagon, &center, &normal) < EPS);
    }

    #[test]
    fn plane_normal_rejects_degenerate_input() {
        let line = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert!(plane_normal(&line).is_none());
        assert!(plane_normal(&line[..2]).is_none());
    }

    #[test]
    fn out_of_plane_angle_is_zero_in_plane_and_ninety_along_normal() {
        let normal = Unit::new_normalize(Vector3::z());
        let center = Point3::origin();
        let in_plane = out_of_plane_angle(&normal, &center, &Point3::new(1.0, 1.0, 0.0)).unwrap();
        let along = out_of_plane_angle(&normal, &center, &Point3::new(0.0, 0.0, -2.0)).unwrap();
        assert!(in_plane.abs() < EPS);
        assert!((along - 90.0).abs() < EPS);
    }

    #[test]
    fn lateral_offset_ignores_height_above_plane() {
        let normal = Unit::new_normalize(Vector3::z());
        let offset = lateral_offset(&Point3::new(3.0, 4.0, 7.0), &Point3::origin(), &normal);
        assert!((offset - 5.0).abs() < EPS);
    }

    #[test]
    fn point_segment_distance_clamps_to_endpoints() {
        let start = Point3::new(0.0, 0.0, 0.0);
        let end = Point3::new(4.0, 0.0, 0.0);
        assert!((point_segment_distance(&Point3::new(2.0, 1.5, 0.0), &start, &end) - 1.5).abs() < EPS);
        assert!((point_segment_distance(&Point3::new(-3.0, 4.0, 0.0), &start, &end) - 5.0).abs() < EPS);
        assert!((point_segment_distance(&Point3::new(1.0, 1.0, 0.0), &start, &start) - 2f64.sqrt()).abs() < EPS);
    }
}
