use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::epoch::Epoch;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length; only infinite when the true length exceeds `f64::MAX`.
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y).hypot(self.z)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One trajectory sample: ECI position (km) and velocity (km/s) at an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StateVector {
    pub epoch: Epoch,
    pub position: Vector3,
    pub velocity: Vector3,
}

/// `id` and `version` attributes of the `<oem>` element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct FormatInfo {
    pub id: Option<String>,
    pub version: Option<String>,
}

pub(crate) type Fields = BTreeMap<String, String>;

/// Non-numeric parts of an OEM document, resolved once at parse time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct DocumentMetadata {
    pub format: Option<FormatInfo>,
    pub header: BTreeMap<String, String>,
    pub segment_metadata: BTreeMap<String, String>,
    pub comments: Vec<String>,
}

impl DocumentMetadata {
    pub fn header(&self) -> &Fields {
        &self.header
    }

    pub fn segment_metadata(&self) -> &Fields {
        &self.segment_metadata
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.header.get(key).map(String::as_str)
    }

    pub fn segment_value(&self, key: &str) -> Option<&str> {
        self.segment_metadata.get(key).map(String::as_str)
    }
}
