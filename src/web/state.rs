use std::sync::Arc;

use crate::frames::FrameModel;
use crate::source::{DocumentLoader, EphemerisStore, Snapshot};

use super::api::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct AppState {
    pub frames: FrameModel,
    pub store: Arc<EphemerisStore>,
    pub loader: Arc<DocumentLoader>,
}

impl AppState {
    /// The snapshot current at the time of the call.
    pub fn snapshot(&self) -> ApiResult<Arc<Snapshot>> {
        self.store.snapshot().ok_or(ApiError::Unavailable)
    }
}
