use std::f64::consts::PI;

/// Earth radius used by the map projection (meters).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Spherical Mercator forward transform, `(lat, lon)` in degrees to planar `(x, y)`.
///
/// The `y` scale is taken as `x / lon` rather than the radius itself. The two only
/// differ by the constant `PI / 180`, but at `lon == 0` the ratio is `0 / 0` and `y`
/// comes out NaN. Callers must not project points on the prime meridian.
pub fn project(lat: f64, lon: f64) -> (f64, f64) {
    let x = EARTH_RADIUS_M * lon.to_radians();
    let scale = x / lon;
    let y = 180.0 / PI * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln() * scale;
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn projects_aarhus_center() {
        let (x, y) = project(56.1572, 10.2107);
        assert!(close(x, 1_136_649.924_642_878), "x = {x}");
        assert!(close(y, 7_589_773.588_907_95), "y = {y}");
    }

    #[test]
    fn x_is_antisymmetric_in_longitude() {
        let (east, _) = project(56.1572, 10.2107);
        let (west, _) = project(56.1572, -10.2107);
        assert!(close(east, -west));
        assert!(east > 0.0);
    }

    #[test]
    fn repeated_calls_agree() {
        let first = project(56.13, 10.18);
        for _ in 0..4 {
            assert_eq!(project(56.13, 10.18), first);
        }
    }

    #[test]
    fn scale_ratio_is_radius_per_degree() {
        for lon in [-179.5, -10.2107, 0.25, 10.18, 120.0] {
            let x = EARTH_RADIUS_M * f64::to_radians(lon);
            assert!(close(x / lon, EARTH_RADIUS_M * PI / 180.0), "lon = {lon}");
        }
    }

    #[test]
    fn equator_maps_to_zero_y() {
        let (_, y) = project(0.0, 10.0);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn prime_meridian_is_undefined() {
        let (x, y) = project(56.0, 0.0);
        assert_eq!(x, 0.0);
        assert!(y.is_nan());
    }
}
