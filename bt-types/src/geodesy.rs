//! Great-circle distance between two lat/lng points.

/// Mean Earth radius used throughout this codebase's distance math (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Haversine distance between two points given in degrees, in kilometers.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        assert_eq!(haversine_km(50.0, 11.0, 50.0, 11.0), 0.0);
    }

    #[test]
    fn close_points_under_100m() {
        let d = haversine_km(50.0, 11.0, 50.0, 11.001399);
        assert!(d < 0.1, "expected < 0.1km, got {d}");
    }

    #[test]
    fn points_just_over_100m() {
        let d = haversine_km(50.0, 11.0, 50.0, 11.0013991);
        assert!(d > 0.1, "expected > 0.1km, got {d}");
    }
}
