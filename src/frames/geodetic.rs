use serde::{Deserialize, Serialize};

use crate::ephemeris::{DegenerateInput, Vector3};

/// Positions closer to the Earth's centre than this (km) have no meaningful projection.
pub const MIN_RADIUS_KM: f64 = 1e-3;

// WGS-84 constants
const WGS84_A_KM: f64 = 6378.137;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);

/// IUGG mean Earth radius.
pub const MEAN_EARTH_RADIUS_KM: f64 = 6371.0088;

const MAX_ITERATIONS: usize = 10;
const LATITUDE_TOLERANCE_RAD: f64 = 1e-12;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Ellipsoid {
    #[default]
    Wgs84,
    Sphere,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, utoipa::ToSchema)]
pub struct GeodeticLocation {
    /// Degrees, [-90, 90]
    pub latitude: f64,
    /// Degrees, (-180, 180]
    pub longitude: f64,
    /// Kilometers above the reference surface
    pub altitude: f64,
    pub ellipsoid: Ellipsoid,
}

pub fn ecef_to_geodetic(
    ecef: &Vector3,
    ellipsoid: Ellipsoid,
) -> Result<GeodeticLocation, DegenerateInput> {
    if !ecef.is_finite() {
        return Err(DegenerateInput::NonFinite("position"));
    }
    let radius = ecef.norm();
    if !radius.is_finite() {
        return Err(DegenerateInput::NonFinite("position"));
    }
    if radius < MIN_RADIUS_KM {
        return Err(DegenerateInput::NearOrigin(radius));
    }

    let mut longitude = ecef.y.atan2(ecef.x);
    // atan2 yields -pi for y == -0.0
    if longitude <= -std::f64::consts::PI {
        longitude += std::f64::consts::TAU;
    }
    let p = ecef.x.hypot(ecef.y);

    let (latitude, altitude) = match ellipsoid {
        Ellipsoid::Sphere => (ecef.z.atan2(p), radius - MEAN_EARTH_RADIUS_KM),
        Ellipsoid::Wgs84 => wgs84_latitude_altitude(p, ecef.z),
    };

    Ok(GeodeticLocation {
        latitude: latitude.to_degrees(),
        longitude: longitude.to_degrees(),
        altitude,
        ellipsoid,
    })
}

fn wgs84_latitude_altitude(p: f64, z: f64) -> (f64, f64) {
    let mut lat = z.atan2(p * (1.0 - WGS84_E2));
    for _ in 0..MAX_ITERATIONS {
        let sin_lat = lat.sin();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let next = (z + WGS84_E2 * n * sin_lat).atan2(p);
        let done = (next - lat).abs() < LATITUDE_TOLERANCE_RAD;
        lat = next;
        if done {
            break;
        }
    }

    let (sin_lat, cos_lat) = lat.sin_cos();
    // valid at the poles, unlike p / cos(lat) - N
    let altitude =
        p * cos_lat + z * sin_lat - WGS84_A_KM * (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    (lat, altitude)
}
