mod epoch;
mod error;
pub mod kinematics;
mod parsing;
mod series;
mod types;

pub use epoch::{Epoch, EPOCH_FORMAT};
pub use error::{DegenerateInput, EpochError, ParseError, QueryError};
pub use parsing::parse;
pub use series::EphemerisSeries;
pub use types::{DocumentMetadata, StateVector, Vector3};

#[cfg(test)]
pub(crate) use parsing::tests::SAMPLE as SAMPLE_DOCUMENT;
