use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use utoipa::ToSchema;

use crate::ephemeris::{self, DocumentMetadata, EphemerisSeries, Epoch, ParseError};

/// A fully parsed document, never modified after construction.
#[derive(Debug)]
pub struct Snapshot {
    pub series: EphemerisSeries,
    pub metadata: DocumentMetadata,
    pub source: String,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SnapshotSummary {
    pub source: String,
    pub loaded_at: DateTime<Utc>,
    pub state_vectors: usize,
    pub first_epoch: Option<Epoch>,
    pub last_epoch: Option<Epoch>,
    pub object_name: Option<String>,
}

impl Snapshot {
    pub fn from_document(document: &str, source: impl Into<String>) -> Result<Self, ParseError> {
        let (series, metadata) = ephemeris::parse(document)?;
        Ok(Self {
            series,
            metadata,
            source: source.into(),
            loaded_at: Utc::now(),
        })
    }

    pub fn summary(&self) -> SnapshotSummary {
        let span = self.series.span();
        SnapshotSummary {
            source: self.source.clone(),
            loaded_at: self.loaded_at,
            state_vectors: self.series.len(),
            first_epoch: span.map(|(first, _)| first),
            last_epoch: span.map(|(_, last)| last),
            object_name: self.metadata.segment_value("OBJECT_NAME").map(String::from),
        }
    }
}

/// Holds the current snapshot. Readers clone the `Arc` and never block a refresh
/// for longer than that clone.
#[derive(Debug, Default)]
pub struct EphemerisStore {
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl EphemerisStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(snapshot))),
        }
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        guard.clone()
    }

    /// Replaces the current snapshot; in-flight readers keep the one they hold.
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(snapshot.clone());
        snapshot
    }
}
