use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::f64::consts::TAU;

use crate::ephemeris::Vector3;

pub const EARTH_ROTATION_RAD_S: f64 = 7.292_115e-5;

/// 2000-01-01T12:00:00 UTC as a Unix timestamp.
const J2000_UNIX_SECONDS: i64 = 946_728_000;
const SECONDS_PER_DAY: f64 = 86_400.0;

// IERS 2000 Earth rotation angle: theta = 2pi * (ERA_AT_J2000 + ERA_RATE * Du)
const ERA_AT_J2000: f64 = 0.779_057_273_264_0;
const ERA_RATE_EXCESS: f64 = 0.002_737_811_911_354_48;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RotationModel {
    /// Linear IERS 2000 Earth rotation angle.
    #[default]
    EarthRotationAngle,
    /// IAU-82 Greenwich mean sidereal time.
    Gmst1982,
}

/// Days since J2000.0, treating UTC as UT1.
pub fn days_since_j2000(epoch: DateTime<Utc>) -> f64 {
    let seconds = (epoch.timestamp() - J2000_UNIX_SECONDS) as f64
        + f64::from(epoch.timestamp_subsec_micros()) * 1e-6;
    seconds / SECONDS_PER_DAY
}

/// Angle in radians, in [0, 2pi), between the inertial x axis and the Greenwich meridian.
pub fn earth_rotation_angle(epoch: DateTime<Utc>, model: RotationModel) -> f64 {
    match model {
        RotationModel::EarthRotationAngle => {
            let du = days_since_j2000(epoch);
            // whole days contribute whole turns, keep only the fraction
            let turns = du.fract() + ERA_AT_J2000 + ERA_RATE_EXCESS * du;
            (turns * TAU).rem_euclid(TAU)
        }
        RotationModel::Gmst1982 => {
            let years = sgp4::julian_years_since_j2000(&epoch.naive_utc());
            sgp4::iau_epoch_to_sidereal_time(years).rem_euclid(TAU)
        }
    }
}

/// Rotates an inertial position by `-angle` about the polar axis.
pub fn eci_to_ecef(position: &Vector3, angle: f64) -> Vector3 {
    let (sin_a, cos_a) = angle.sin_cos();
    Vector3::new(
        position.x * cos_a + position.y * sin_a,
        -position.x * sin_a + position.y * cos_a,
        position.z,
    )
}

/// Earth-fixed velocity, removing the frame's own rotation (omega x r).
pub fn eci_to_ecef_velocity(position: &Vector3, velocity: &Vector3, angle: f64) -> Vector3 {
    let pos = eci_to_ecef(position, angle);
    let rotated = eci_to_ecef(velocity, angle);
    Vector3::new(
        rotated.x + EARTH_ROTATION_RAD_S * pos.y,
        rotated.y - EARTH_ROTATION_RAD_S * pos.x,
        rotated.z,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};
    use std::f64::consts::FRAC_PI_2;

    fn j2000() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn era_at_j2000() {
        let angle = earth_rotation_angle(j2000(), RotationModel::EarthRotationAngle);
        assert_relative_eq!(angle, ERA_AT_J2000 * TAU, epsilon = 1e-12);
        // 280.46 degrees
        assert_relative_eq!(angle.to_degrees(), 280.46, epsilon = 0.01);
    }

    #[test]
    fn era_advances_one_sidereal_day() {
        let start = j2000() + Duration::days(9000);
        let sidereal_day = Duration::milliseconds(86_164_091);
        let a = earth_rotation_angle(start, RotationModel::EarthRotationAngle);
        let b = earth_rotation_angle(start + sidereal_day, RotationModel::EarthRotationAngle);
        let diff = (b - a).rem_euclid(TAU);
        assert!(diff < 1e-6 || TAU - diff < 1e-6, "diff = {diff}");
    }

    #[test]
    fn era_is_in_range() {
        let epoch = Utc.with_ymd_and_hms(1987, 6, 30, 3, 15, 0).unwrap();
        let angle = earth_rotation_angle(epoch, RotationModel::EarthRotationAngle);
        assert!((0.0..TAU).contains(&angle));
    }

    #[test]
    fn models_agree_within_a_degree() {
        let epoch = Utc.with_ymd_and_hms(2024, 2, 16, 12, 0, 0).unwrap();
        let era = earth_rotation_angle(epoch, RotationModel::EarthRotationAngle);
        let gmst = earth_rotation_angle(epoch, RotationModel::Gmst1982);
        let diff = (era - gmst).rem_euclid(TAU);
        let diff = diff.min(TAU - diff);
        assert!(diff.to_degrees() < 1.0, "diff = {} deg", diff.to_degrees());
    }

    #[test]
    fn zero_rotation_is_identity() {
        let r = Vector3::new(6778.0, -120.0, 42.0);
        let out = eci_to_ecef(&r, 0.0);
        assert_relative_eq!(out.x, r.x);
        assert_relative_eq!(out.y, r.y);
        assert_relative_eq!(out.z, r.z);
    }

    #[test]
    fn quarter_turn_moves_x_to_negative_y() {
        let out = eci_to_ecef(&Vector3::new(1.0, 0.0, 5.0), FRAC_PI_2);
        assert_relative_eq!(out.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(out.y, -1.0, epsilon = 1e-12);
        assert_relative_eq!(out.z, 5.0);
    }

    #[test]
    fn rotation_preserves_magnitude() {
        let r = Vector3::new(-4604.4616, -4126.6137, 2649.1391);
        let out = eci_to_ecef(&r, 1.234);
        assert_relative_eq!(out.norm(), r.norm(), epsilon = 1e-9);
    }

    #[test]
    fn geostationary_velocity_is_nearly_zero_in_ecef() {
        let radius = 42_164.0;
        let r = Vector3::new(radius, 0.0, 0.0);
        let v = Vector3::new(0.0, EARTH_ROTATION_RAD_S * radius, 0.0);
        let out = eci_to_ecef_velocity(&r, &v, 0.0);
        assert!(out.norm() < 1e-9, "ecef speed = {}", out.norm());
    }
}
