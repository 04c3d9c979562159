use std::sync::Arc;

use crate::config::Config;
use crate::handlers::artifact::ArtifactStore;
use crate::vietqr::types::TransferParameters;
use crate::vietqr::VietQr;

/// Read-only after startup; cloned into every command task.
#[derive(Clone)]
pub struct AppState {
    pub vietqr: Arc<VietQr>,
    pub artifacts: ArtifactStore,
    pub defaults: Arc<TransferParameters>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        AppState {
            vietqr: Arc::new(VietQr::new(config.credentials.clone(), config.endpoints())),
            artifacts: ArtifactStore::new(config.tmp_dir.clone(), config.cleanup_delay),
            defaults: Arc::new(config.default_transfer.clone()),
        }
    }
}
