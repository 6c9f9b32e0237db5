use nalgebra::{Point3, Vector3};

/// Vector pointing from `p` to `q`.
#[inline]
pub fn distance_vector(p: &Point3<f64>, q: &Point3<f64>) -> Vector3<f64> {
    q - p
}

#[inline]
pub fn norm(v: &Vector3<f64>) -> f64 {
    v.norm()
}

#[inline]
pub fn distance(p: &Point3<f64>, q: &Point3<f64>) -> f64 {
    norm(&distance_vector(p, q))
}

/// Angle in degrees at `p2` between the rays `p2 -> p1` and `p2 -> p3`.
///
/// The cosine is clamped to `[-1, 1]` before `acos`, so nearly collinear rays never
/// produce NaN from rounding overshoot. A zero-length ray has no direction and yields NaN,
/// which compares false against any threshold.
#[inline]
pub fn angle_at_vertex(p1: &Point3<f64>, p2: &Point3<f64>, p3: &Point3<f64>) -> f64 {
    let d21 = distance_vector(p2, p1);
    let d23 = distance_vector(p2, p3);
    let cosine = d21.dot(&d23) / (norm(&d21) * norm(&d23));
    cosine.clamp(-1.0, 1.0).acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn distance_vector_is_antisymmetric() {
        let p = Point3::new(1.0, -2.0, 0.5);
        let q = Point3::new(-3.0, 4.0, 2.0);
        assert_eq!(distance_vector(&p, &q), -distance_vector(&q, &p));
        assert_eq!(distance_vector(&p, &q), Vector3::new(-4.0, 6.0, 1.5));
    }

    #[test]
    fn norm_is_zero_only_for_zero_vector() {
        assert_eq!(norm(&Vector3::zeros()), 0.0);
        assert!(norm(&Vector3::new(0.0, 1e-12, 0.0)) > 0.0);
        assert!(f64_approx_equal(norm(&Vector3::new(3.0, 4.0, 0.0)), 5.0));
    }

    #[test]
    fn distance_matches_euclidean_formula() {
        let p = Point3::new(0.0, 0.0, 0.0);
        let q = Point3::new(1.0, 2.0, 2.0);
        assert!(f64_approx_equal(distance(&p, &q), 3.0));
    }

    #[test]
    fn right_angle_is_ninety_degrees() {
        let angle = angle_at_vertex(
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::origin(),
            &Point3::new(0.0, 2.0, 0.0),
        );
        assert!(f64_approx_equal(angle, 90.0));
    }

    #[test]
    fn angle_is_symmetric_under_swapping_outer_points() {
        let p1 = Point3::new(1.0, 0.3, -0.2);
        let p2 = Point3::new(0.1, 0.1, 0.1);
        let p3 = Point3::new(-0.4, 1.2, 0.7);
        assert!(f64_approx_equal(
            angle_at_vertex(&p1, &p2, &p3),
            angle_at_vertex(&p3, &p2, &p1)
        ));
    }

    #[test]
    fn coincident_rays_give_zero_degrees() {
        let p = Point3::new(0.3, 0.7, -1.1);
        let vertex = Point3::new(2.0, 2.0, 2.0);
        let angle = angle_at_vertex(&p, &vertex, &p);
        assert!(!angle.is_nan());
        assert!(angle.abs() < 1e-5);
    }

    #[test]
    fn opposite_rays_give_one_hundred_eighty_degrees() {
        let exact = angle_at_vertex(
            &Point3::new(-1.0, 0.0, 0.0),
            &Point3::origin(),
            &Point3::new(2.0, 0.0, 0.0),
        );
        assert!(f64_approx_equal(exact, 180.0));

        let rounded = angle_at_vertex(
            &Point3::new(-0.1, -0.1, -0.1),
            &Point3::origin(),
            &Point3::new(0.3, 0.3, 0.3),
        );
        assert!(!rounded.is_nan());
        assert!((rounded - 180.0).abs() < 1e-5);
    }

    #[test]
    fn angle_stays_within_valid_range_for_nearly_collinear_points() {
        let center = Point3::new(1.0 / 3.0, 1.0 / 7.0, 1.0 / 11.0);
        for step in 1..50 {
            let s = step as f64 * 0.1;
            let p1 = center + Vector3::new(s, s * 3.0, s / 7.0);
            let p3 = center + Vector3::new(s, s * 3.0, s / 7.0) * 2.5;
            let angle = angle_at_vertex(&p1, &center, &p3);
            assert!((0.0..=180.0).contains(&angle), "angle {angle} out of range");
        }
    }

    #[test]
    fn zero_length_ray_yields_nan() {
        let p = Point3::new(1.0, 1.0, 1.0);
        assert!(angle_at_vertex(&p, &p, &Point3::origin()).is_nan());
    }
}
