use super::error::DegenerateInput;
use super::types::Vector3;

/// Instantaneous speed in km/s from an ECI velocity vector.
pub fn speed(velocity: &Vector3) -> Result<f64, DegenerateInput> {
    let speed = velocity.norm();
    if !velocity.is_finite() || !speed.is_finite() {
        return Err(DegenerateInput::NonFinite("velocity"));
    }
    Ok(speed)
}
