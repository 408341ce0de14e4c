use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use utoipa::openapi::schema::{ObjectBuilder, Schema, Type};
use utoipa::openapi::RefOr;

use super::error::EpochError;

/// Day-of-year timestamp layout used by OEM documents, e.g. `2024-047T12:00:00.000Z`.
pub const EPOCH_FORMAT: &str = "%Y-%jT%H:%M:%S%.fZ";

const MILLIS_FORMAT: &str = "%Y-%jT%H:%M:%S%.3fZ";
const MICROS_FORMAT: &str = "%Y-%jT%H:%M:%S%.6fZ";

/// A UTC instant with microsecond precision.
///
/// Remembers whether it was written with millisecond or microsecond digits so
/// that formatting reproduces the input. Comparison ignores that.
#[derive(Debug, Clone, Copy)]
pub struct Epoch {
    instant: DateTime<Utc>,
    precision: Precision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Precision {
    Millis,
    Micros,
}

impl Epoch {
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        let instant = datetime.trunc_subsecs(6);
        let precision = if instant.timestamp_subsec_micros() % 1000 == 0 {
            Precision::Millis
        } else {
            Precision::Micros
        };
        Epoch { instant, precision }
    }

    pub fn parse(text: &str) -> Result<Self, EpochError> {
        let text = text.trim();
        let naive = NaiveDateTime::parse_from_str(text, EPOCH_FORMAT).map_err(|_| EpochError {
            value: text.to_string(),
        })?;
        let mut epoch = Epoch::from_datetime(naive.and_utc());
        if fraction_digits(text) > 3 {
            epoch.precision = Precision::Micros;
        }
        Ok(epoch)
    }

    pub fn datetime(&self) -> DateTime<Utc> {
        self.instant
    }

    /// Signed distance from `reference` to this epoch.
    pub fn delta_from(&self, reference: DateTime<Utc>) -> TimeDelta {
        self.instant - reference
    }
}

fn fraction_digits(text: &str) -> usize {
    text.rsplit_once('.')
        .map_or(0, |(_, fraction)| {
            fraction.bytes().take_while(u8::is_ascii_digit).count()
        })
}

impl PartialEq for Epoch {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant
    }
}

impl Eq for Epoch {}

impl PartialOrd for Epoch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Epoch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant.cmp(&other.instant)
    }
}

impl Hash for Epoch {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.instant.hash(state);
    }
}

impl From<DateTime<Utc>> for Epoch {
    fn from(datetime: DateTime<Utc>) -> Self {
        Epoch::from_datetime(datetime)
    }
}

impl FromStr for Epoch {
    type Err = EpochError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Epoch::parse(s)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = match self.precision {
            Precision::Millis => MILLIS_FORMAT,
            Precision::Micros => MICROS_FORMAT,
        };
        write!(f, "{}", self.instant.format(format))
    }
}

impl utoipa::PartialSchema for Epoch {
    fn schema() -> RefOr<Schema> {
        ObjectBuilder::new()
            .schema_type(Type::String)
            .description(Some("Day-of-year UTC timestamp, e.g. 2024-047T12:00:00.000Z"))
            .into()
    }
}

impl utoipa::ToSchema for Epoch {}

impl Serialize for Epoch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Epoch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Epoch::parse(&s).map_err(serde::de::Error::custom)
    }
}
