use nalgebra::{Point3, Vector3};

/// Rounds `value` to `places` decimal places, half away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

/// Smallest distance between any point of `first` and any point of `second`
/// shifted by `offset`. `None` if either set is empty.
pub fn min_pairwise_distance(
    first: &[Point3<f64>],
    second: &[Point3<f64>],
    offset: &Vector3<f64>,
) -> Option<f64> {
    first
        .iter()
        .flat_map(|p1| second.iter().map(move |p2| (p2 + offset - p1).norm_squared()))
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(f64::sqrt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_keeps_requested_places() {
        assert_eq!(round_to(2.499_96, 4), 2.5);
        assert_eq!(round_to(-1.234_56, 2), -1.23);
        assert_eq!(round_to(3.0, 4), 3.0);
    }

    #[test]
    fn centroid_averages_points() {
        let points = [Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, -2.0)];
        assert_eq!(centroid(&points), Some(Point3::new(1.0, 2.0, -1.0)));
        assert_eq!(centroid(&[]), None);
    }

    #[test]
    fn min_pairwise_distance_applies_offset_to_second_set() {
        let a = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let b = [Point3::new(0.0, 0.0, 0.0)];
        let d = min_pairwise_distance(&a, &b, &Vector3::new(3.0, 0.0, 0.0)).unwrap();
        assert!((d - 2.0).abs() < 1e-12);
        assert!(min_pairwise_distance(&a, &[], &Vector3::zeros()).is_none());
    }
}
