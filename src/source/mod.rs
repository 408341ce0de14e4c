mod error;
mod loader;
mod store;

pub use error::SourceError;
pub use loader::{DocumentLoader, DocumentSource};
pub use store::{EphemerisStore, Snapshot, SnapshotSummary};
