use thiserror::Error;

use super::epoch::Epoch;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid epoch '{value}', expected YYYY-DDDThh:mm:ss.fffZ")]
pub struct EpochError {
    pub value: String,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("missing <{0}> element")]
    MissingElement(&'static str),
    #[error("state vector {index}: missing {field}")]
    MissingField { index: usize, field: &'static str },
    #[error("state vector {index}: {source}")]
    InvalidEpoch { index: usize, source: EpochError },
    #[error("state vector {index}: invalid {field} '{value}'")]
    InvalidNumber {
        index: usize,
        field: &'static str,
        value: String,
    },
    #[error("state vector {index}: {field} is not finite")]
    NonFinite { index: usize, field: &'static str },
    #[error("state vector {index}: epoch {epoch} does not follow {previous}")]
    NotIncreasing {
        index: usize,
        epoch: Epoch,
        previous: Epoch,
    },
    #[error("document contains no state vectors")]
    Empty,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid query parameter: {0}")]
    InvalidParameter(String),
    #[error("no state vector at epoch {0}")]
    NotFound(Epoch),
    #[error("ephemeris is empty")]
    Empty,
}

impl From<EpochError> for QueryError {
    fn from(err: EpochError) -> Self {
        QueryError::InvalidParameter(err.to_string())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum DegenerateInput {
    #[error("{0} has a non-finite component")]
    NonFinite(&'static str),
    #[error("position magnitude {0} km is too close to the origin")]
    NearOrigin(f64),
}
