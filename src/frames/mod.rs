//! ECI to Earth-fixed to geodetic conversion.
//!
//! Everything here is a pure function of its inputs: the rotation angle depends
//! only on the epoch, and the projection only on the Earth-fixed position.

mod geodetic;
mod rotation;

use serde::Deserialize;

use crate::ephemeris::{DegenerateInput, Epoch, Vector3};

pub use geodetic::{ecef_to_geodetic, Ellipsoid, GeodeticLocation};
pub use rotation::{earth_rotation_angle, eci_to_ecef, eci_to_ecef_velocity, RotationModel};

/// Earth orientation and shape used for every conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct FrameModel {
    #[serde(default)]
    pub rotation: RotationModel,
    #[serde(default)]
    pub ellipsoid: Ellipsoid,
}

/// Geodetic location of an ECI position (km) observed at `epoch`.
pub fn to_geodetic(
    epoch: Epoch,
    position_eci: &Vector3,
    model: FrameModel,
) -> Result<GeodeticLocation, DegenerateInput> {
    if !position_eci.is_finite() {
        return Err(DegenerateInput::NonFinite("position"));
    }
    let angle = earth_rotation_angle(epoch.datetime(), model.rotation);
    let ecef = eci_to_ecef(position_eci, angle);
    ecef_to_geodetic(&ecef, model.ellipsoid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};
    use std::f64::consts::TAU;

    /// Instant at which the Earth rotation angle is (numerically) zero.
    fn zero_rotation_epoch() -> Epoch {
        // ERA(J2000) = 0.7790572732640 turns; the next zero crossing is
        // (1 - 0.7790572732640) / 1.00273781191135448 days later.
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let days: f64 = (1.0 - 0.779_057_273_264_0) / 1.002_737_811_911_354_48;
        let micros = (days * 86_400e6).round() as i64;
        Epoch::from(j2000 + chrono::Duration::microseconds(micros))
    }

    #[test]
    fn equatorial_position_at_zero_rotation() {
        let epoch = zero_rotation_epoch();
        let angle = earth_rotation_angle(epoch.datetime(), RotationModel::EarthRotationAngle);
        let angle = angle.min(TAU - angle);
        assert!(angle < 1e-8, "angle = {angle}");

        let geo = to_geodetic(epoch, &Vector3::new(6778.137, 0.0, 0.0), FrameModel::default())
            .unwrap();
        assert_relative_eq!(geo.latitude, 0.0, epsilon = 1e-9);
        assert_relative_eq!(geo.longitude, 0.0, epsilon = 1e-5);
        assert_relative_eq!(geo.altitude, 400.0, epsilon = 1e-6);
    }

    #[test]
    fn polar_position_ignores_rotation() {
        let model = FrameModel::default();
        for hour in [0, 6, 13, 21] {
            let epoch = Epoch::from(Utc.with_ymd_and_hms(2024, 3, 8, hour, 0, 0).unwrap());
            let geo = to_geodetic(epoch, &Vector3::new(0.0, 0.0, 6800.0), model).unwrap();
            assert_relative_eq!(geo.latitude, 90.0, epsilon = 1e-9);
            let geo = to_geodetic(epoch, &Vector3::new(0.0, 0.0, -6800.0), model).unwrap();
            assert_relative_eq!(geo.latitude, -90.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn longitude_drifts_west_with_earth_rotation() {
        let model = FrameModel::default();
        let r = Vector3::new(6778.0, 0.0, 0.0);
        let t = Utc.with_ymd_and_hms(2024, 3, 8, 12, 0, 0).unwrap();
        let a = to_geodetic(Epoch::from(t), &r, model).unwrap();
        let b = to_geodetic(Epoch::from(t + chrono::Duration::hours(1)), &r, model).unwrap();
        let drift = (a.longitude - b.longitude).rem_euclid(360.0);
        assert_relative_eq!(drift, 15.041, epsilon = 0.01);
    }

    #[test]
    fn same_inputs_same_output() {
        let epoch = Epoch::parse("2024-047T12:00:00.000Z").unwrap();
        let r = Vector3::new(-4604.4616, -4126.6137, 2649.1391);
        let model = FrameModel {
            rotation: RotationModel::Gmst1982,
            ellipsoid: Ellipsoid::Sphere,
        };
        assert_eq!(to_geodetic(epoch, &r, model), to_geodetic(epoch, &r, model));
        let geo = to_geodetic(epoch, &r, model).unwrap();
        assert!((-90.0..=90.0).contains(&geo.latitude));
        assert!(geo.longitude > -180.0 && geo.longitude <= 180.0);
        assert!(geo.altitude > 300.0 && geo.altitude < 450.0);
    }

    #[test]
    fn degenerate_positions_are_errors() {
        let epoch = Epoch::parse("2024-047T12:00:00.000Z").unwrap();
        let model = FrameModel::default();
        assert!(matches!(
            to_geodetic(epoch, &Vector3::default(), model),
            Err(DegenerateInput::NearOrigin(_))
        ));
        assert_eq!(
            to_geodetic(epoch, &Vector3::new(1.0, f64::INFINITY, 0.0), model),
            Err(DegenerateInput::NonFinite("position"))
        );
    }
}
