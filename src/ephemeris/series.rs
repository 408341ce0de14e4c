use chrono::{DateTime, Utc};

use super::epoch::Epoch;
use super::error::{ParseError, QueryError};
use super::types::StateVector;

/// Chronologically ordered, immutable sequence of state vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisSeries {
    vectors: Vec<StateVector>,
}

impl EphemerisSeries {
    /// Builds a series, rejecting empty input and epochs that do not strictly increase.
    pub fn new(vectors: Vec<StateVector>) -> Result<Self, ParseError> {
        if vectors.is_empty() {
            return Err(ParseError::Empty);
        }
        if let Some(i) = vectors.windows(2).position(|w| w[1].epoch <= w[0].epoch) {
            return Err(ParseError::NotIncreasing {
                index: i + 1,
                epoch: vectors[i + 1].epoch,
                previous: vectors[i].epoch,
            });
        }
        Ok(Self { vectors })
    }

    /// Number of state vectors, at least one.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn all(&self) -> &[StateVector] {
        &self.vectors
    }

    /// First and last epochs of the series.
    pub fn span(&self) -> Option<(Epoch, Epoch)> {
        Some((self.vectors.first()?.epoch, self.vectors.last()?.epoch))
    }

    pub fn range(
        &self,
        offset: Option<i64>,
        limit: Option<i64>,
    ) -> Result<&[StateVector], QueryError> {
        let offset = non_negative("offset", offset)?.unwrap_or(0);
        let limit = non_negative("limit", limit)?;

        let start = offset.min(self.vectors.len());
        let end = match limit {
            Some(limit) => start.saturating_add(limit).min(self.vectors.len()),
            None => self.vectors.len(),
        };
        Ok(&self.vectors[start..end])
    }

    pub fn by_epoch(&self, epoch: Epoch) -> Result<&StateVector, QueryError> {
        self.vectors
            .binary_search_by(|v| v.epoch.cmp(&epoch))
            .map(|i| &self.vectors[i])
            .map_err(|_| QueryError::NotFound(epoch))
    }

    /// The vector closest in time to `reference`; the earlier one wins a tie.
    pub fn nearest(&self, reference: DateTime<Utc>) -> Result<&StateVector, QueryError> {
        let after = self
            .vectors
            .partition_point(|v| v.epoch.datetime() < reference);

        let candidate = match (after.checked_sub(1), self.vectors.get(after)) {
            (None, next) => next,
            (Some(i), None) => self.vectors.get(i),
            (Some(i), Some(next)) => {
                let prev = &self.vectors[i];
                let to_prev = reference - prev.epoch.datetime();
                let to_next = next.epoch.delta_from(reference);
                if to_prev <= to_next {
                    Some(prev)
                } else {
                    Some(next)
                }
            }
        };
        candidate.ok_or(QueryError::Empty)
    }
}

fn non_negative(name: &str, value: Option<i64>) -> Result<Option<usize>, QueryError> {
    match value {
        None => Ok(None),
        Some(v) if v < 0 => Err(QueryError::InvalidParameter(format!(
            "{name} must not be negative, got {v}"
        ))),
        Some(v) => Ok(Some(usize::try_from(v).unwrap_or(usize::MAX))),
    }
}
