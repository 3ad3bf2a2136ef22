use nalgebra::{Matrix3, Point3, Rotation3, Unit, Vector3};

/// Cartesian axis used by axis-angle rotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit_vector(self) -> Unit<Vector3<f64>> {
        match self {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        }
    }
}

pub fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    nalgebra::distance(a, b)
}

/// Angle in radians at `vertex` formed by `a` and `b`.
pub fn angle(a: &Point3<f64>, vertex: &Point3<f64>, b: &Point3<f64>) -> Option<f64> {
    let u = a - vertex;
    let v = b - vertex;
    if u.norm() == 0.0 || v.norm() == 0.0 {
        return None;
    }
    Some(u.angle(&v))
}

pub fn rotation_about_axis(axis: Axis, angle_radians: f64) -> Matrix3<f64> {
    Rotation3::from_axis_angle(&axis.unit_vector(), angle_radians).into_inner()
}

/// Rounds a value to `places` decimal places; `None` leaves it untouched.
pub fn round_to_places(value: f64, places: Option<u32>) -> f64 {
    match places {
        Some(places) => {
            let factor = 10f64.powi(places as i32);
            (value * factor).round() / factor
        }
        None => value,
    }
}

pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

/// Root-mean-square deviation between two equally sized point sets, without superposition.
pub fn calculate_rmsd(a: &[Point3<f64>], b: &[Point3<f64>]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let sum_sq: f64 = a
        .iter()
        .zip(b)
        .map(|(p, q)| (p - q).norm_squared())
        .sum();
    Some((sum_sq / a.len() as f64).sqrt())
}

/// Optimal rotation (Kabsch) that superposes centred `mobile` onto centred `target`.
pub fn kabsch_rotation(mobile: &[Vector3<f64>], target: &[Vector3<f64>]) -> Option<Matrix3<f64>> {
    if mobile.len() != target.len() || mobile.is_empty() {
        return None;
    }
    let covariance = mobile
        .iter()
        .zip(target)
        .fold(Matrix3::zeros(), |acc, (p, q)| acc + p * q.transpose());
    let svd = covariance.svd(true, true);
    let u = svd.u?;
    let v_t = svd.v_t?;
    let v = v_t.transpose();
    let d = (v * u.transpose()).determinant().signum();
    let correction = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, d));
    Some(v * correction * u.transpose())
}

/// RMSD after centring both sets and applying the optimal rotation to `mobile`.
pub fn superposed_rmsd(mobile: &[Point3<f64>], target: &[Point3<f64>]) -> Option<f64> {
    let mobile_center = centroid(mobile)?;
    let target_center = centroid(target)?;
    let centred_mobile: Vec<Vector3<f64>> = mobile.iter().map(|p| p - mobile_center).collect();
    let centred_target: Vec<Vector3<f64>> = target.iter().map(|p| p - target_center).collect();
    let rotation = kabsch_rotation(&centred_mobile, &centred_target)?;
    let rotated: Vec<Point3<f64>> = centred_mobile
        .iter()
        .map(|v| Point3::from(rotation * v))
        .collect();
    let reference: Vec<Point3<f64>> = centred_target.iter().map(|v| Point3::from(*v)).collect();
    calculate_rmsd(&rotated, &reference)
}

/// Every unordered pair of items, each pair yielded once in input order.
pub fn pairwise<T: Copy>(items: &[T]) -> impl Iterator<Item = (T, T)> + '_ {
    items
        .iter()
        .enumerate()
        .flat_map(move |(i, &a)| items[i + 1..].iter().map(move |&b| (a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn distance_is_exact_for_pythagorean_quadruple() {
        let d = distance(&Point3::origin(), &Point3::new(3.0, 4.0, 12.0));
        assert_eq!(d, 13.0);
    }

    #[test]
    fn angle_between_perpendicular_vectors_is_right_angle() {
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::new(0.0, 1.0, 0.0);
        assert_close(angle(&a, &Point3::origin(), &b).unwrap(), FRAC_PI_2);
        assert!(angle(&a, &a, &b).is_none());
    }

    #[test]
    fn rotation_about_z_maps_x_to_y() {
        let m = rotation_about_axis(Axis::Z, FRAC_PI_2);
        let v = m * Vector3::new(1.0, 0.0, 0.0);
        assert_close(v.x, 0.0);
        assert_close(v.y, 1.0);
        assert_close(v.z, 0.0);
    }

    #[test]
    fn round_to_places_is_idempotent() {
        let once = round_to_places(1.23456789, Some(3));
        assert_eq!(once, 1.235);
        assert_eq!(round_to_places(once, Some(3)), once);
        assert_eq!(round_to_places(1.23456789, None), 1.23456789);
        assert_eq!(round_to_places(-2.5, Some(0)), -3.0);
    }

    #[test]
    fn calculate_rmsd_of_shifted_set_equals_shift() {
        let a = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)];
        let b: Vec<_> = a.iter().map(|p| p + Vector3::new(2.0, 0.0, 0.0)).collect();
        assert_close(calculate_rmsd(&a, &b).unwrap(), 2.0);
        assert!(calculate_rmsd(&a, &b[..1]).is_none());
        assert!(calculate_rmsd(&[], &[]).is_none());
    }

    #[test]
    fn superposed_rmsd_removes_rigid_motion() {
        let a = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.5, 0.0, 0.0),
            Point3::new(1.5, 2.0, 0.0),
            Point3::new(0.0, 2.0, 1.0),
        ];
        let rot = rotation_about_axis(Axis::Y, PI / 3.0);
        let b: Vec<_> = a
            .iter()
            .map(|p| Point3::from(rot * p.coords + Vector3::new(5.0, -3.0, 2.0)))
            .collect();
        assert!(calculate_rmsd(&a, &b).unwrap() > 1.0);
        assert!(superposed_rmsd(&a, &b).unwrap() < 1e-6);
    }

    #[test]
    fn pairwise_yields_every_unordered_pair_once() {
        let pairs: Vec<_> = pairwise(&[1, 2, 3]).collect();
        assert_eq!(pairs, vec![(1, 2), (1, 3), (2, 3)]);
        assert_eq!(pairwise::<i32>(&[]).count(), 0);
        assert_eq!(pairwise(&[7]).count(), 0);
    }

    #[test]
    fn centroid_of_empty_set_is_none() {
        assert!(centroid(&[]).is_none());
        let c = centroid(&[Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, 6.0)]).unwrap();
        assert_eq!(c, Point3::new(1.0, 2.0, 3.0));
    }
}
