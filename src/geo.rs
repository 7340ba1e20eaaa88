//! Conversion between geographic coordinates and points on a sphere.
//!
//! The globe uses Earth's convention with +Y as the polar axis: latitude is measured from the
//! equator and longitude from the prime meridian, which sits on the +X side of the sphere.
//! Neither conversion fails. Malformed input maps to the origin of the coordinate system so
//! that a bad frame renders slightly wrong instead of halting the animation.

use serde::{Deserialize, Serialize};

/// Radius of the globe the host renders and ray-casts against.
pub const GLOBE_RADIUS: f64 = 1.0;

/// A location on Earth's surface, in degrees.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Great-circle angle between two points, in degrees.
    #[must_use]
    pub fn angular_distance(&self, other: &GeoPoint) -> f64 {
        let a = to_sphere(self.lat, self.lng, GLOBE_RADIUS);
        let b = to_sphere(other.lat, other.lng, GLOBE_RADIUS);
        // Unit vectors, so the dot product is the cosine of the angle.
        a.dot(&b).clamp(-1.0, 1.0).acos().to_degrees()
    }
}

/// A point in the globe's Cartesian frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpherePoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SpherePoint {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    #[must_use]
    pub fn dot(&self, other: &SpherePoint) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

impl From<[f64; 3]> for SpherePoint {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<SpherePoint> for [f64; 3] {
    fn from(point: SpherePoint) -> Self {
        [point.x, point.y, point.z]
    }
}

/// Converts latitude/longitude in degrees to a point on a sphere of `radius`.
///
/// If either coordinate is not finite the pair is replaced by `(0, 0)`, and a non-finite
/// radius is replaced by `1`.
#[must_use]
pub fn to_sphere(lat: f64, lng: f64, radius: f64) -> SpherePoint {
    let (lat, lng) = if lat.is_finite() && lng.is_finite() {
        (lat, lng)
    } else {
        (0.0, 0.0)
    };
    let radius = if radius.is_finite() { radius } else { 1.0 };

    let phi = (90.0 - lat).to_radians();
    let theta = (lng + 180.0).to_radians();

    SpherePoint {
        x: -(radius * phi.sin() * theta.cos()),
        y: radius * phi.cos(),
        z: radius * phi.sin() * theta.sin(),
    }
}

/// Converts a point on a sphere of `radius` back to latitude/longitude in degrees.
///
/// Returns `(0, 0)` for non-finite coordinates or a radius that is not a positive finite
/// number. Points slightly off the sphere are projected onto it. Longitude at the poles is
/// meaningless and comes back as whatever `atan2` yields.
#[must_use]
pub fn to_geo(point: &SpherePoint, radius: f64) -> GeoPoint {
    if !point.is_finite() || !radius.is_finite() || radius <= 0.0 {
        return GeoPoint::default();
    }

    let phi = (point.y / radius).clamp(-1.0, 1.0).acos();
    let theta = point.z.atan2(-point.x);

    GeoPoint {
        lat: 90.0 - phi.to_degrees(),
        lng: wrap_longitude(theta.to_degrees() - 180.0),
    }
}

/// `to_sphere` taking a `GeoPoint`.
#[must_use]
pub fn compute_sphere_position(geo: GeoPoint, radius: f64) -> SpherePoint {
    to_sphere(geo.lat, geo.lng, radius)
}

/// `to_geo` under its host-facing name.
#[must_use]
pub fn compute_geo_position(point: &SpherePoint, radius: f64) -> GeoPoint {
    to_geo(point, radius)
}

/// Maps any longitude into `[-180, 180)`.
fn wrap_longitude(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn longitude_difference(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn known_positions() {
        // Prime meridian on the equator faces +X.
        let p = to_sphere(0.0, 0.0, 1.0);
        assert_abs_diff_eq!(p.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.z, 0.0, epsilon = 1e-12);

        let north = to_sphere(90.0, 0.0, 2.0);
        assert_abs_diff_eq!(north.y, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(north.x, 0.0, epsilon = 1e-12);

        let east = to_sphere(0.0, 90.0, 1.0);
        assert_abs_diff_eq!(east.z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn positions_lie_on_the_sphere() {
        let p = to_sphere(30.5928, 114.3055, 1.01);
        assert_abs_diff_eq!(p.length(), 1.01, epsilon = 1e-12);
    }

    #[test]
    fn round_trip() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..1000 {
            let lat = rng.random_range(-89.0..=89.0);
            let lng = rng.random_range(-180.0..=180.0);
            let geo = to_geo(&to_sphere(lat, lng, 1.0), 1.0);
            assert_abs_diff_eq!(geo.lat, lat, epsilon = 1e-6);
            assert!(longitude_difference(geo.lng, lng) < 1e-6, "{lng} -> {}", geo.lng);
        }
    }

    #[test]
    fn round_trip_at_other_radii() {
        for radius in [0.5, 1.01, 6371.0] {
            let geo = to_geo(&to_sphere(-33.87, 151.21, radius), radius);
            assert_abs_diff_eq!(geo.lat, -33.87, epsilon = 1e-9);
            assert_abs_diff_eq!(geo.lng, 151.21, epsilon = 1e-9);
        }
    }

    #[test]
    fn invalid_coordinates_default_to_origin() {
        assert_eq!(to_sphere(f64::NAN, 5.0, 1.0), to_sphere(0.0, 0.0, 1.0));
        assert_eq!(to_sphere(5.0, f64::INFINITY, 1.0), to_sphere(0.0, 0.0, 1.0));
        assert_eq!(to_sphere(0.0, 0.0, f64::NAN), to_sphere(0.0, 0.0, 1.0));
    }

    #[test]
    fn degenerate_inverse_input() {
        let origin = GeoPoint::default();
        let p = to_sphere(10.0, 20.0, 1.0);
        assert_eq!(to_geo(&p, 0.0), origin);
        assert_eq!(to_geo(&p, -1.0), origin);
        assert_eq!(to_geo(&p, f64::NAN), origin);
        assert_eq!(to_geo(&SpherePoint::new(f64::NAN, 0.0, 0.0), 1.0), origin);
    }

    #[test]
    fn points_off_the_sphere_do_not_produce_nan() {
        // A marker at altitude 1.01 read back against the unit globe.
        let marker = to_sphere(90.0, 0.0, 1.01);
        let geo = to_geo(&marker, 1.0);
        assert!(geo.is_finite());
        assert_abs_diff_eq!(geo.lat, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn angular_distance_between_points() {
        let equator = GeoPoint::new(0.0, 0.0);
        assert_abs_diff_eq!(
            equator.angular_distance(&GeoPoint::new(90.0, 0.0)),
            90.0,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            equator.angular_distance(&GeoPoint::new(0.0, 180.0)),
            180.0,
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(equator.angular_distance(&equator), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn host_facing_names_match() {
        let geo = GeoPoint::new(48.85, 2.35);
        let point = compute_sphere_position(geo, 1.0);
        assert_eq!(point, to_sphere(48.85, 2.35, 1.0));
        assert_eq!(compute_geo_position(&point, 1.0), to_geo(&point, 1.0));
        let array: [f64; 3] = point.into();
        assert_eq!(SpherePoint::from(array), point);
    }
}
