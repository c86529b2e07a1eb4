use crate::auth::IdentityVerifier;
use crate::config::ServiceConfig;
use crate::store::CertificateStore;
use std::sync::Arc;

/// Shared handles injected into every handler as `web::Data<AppState>`.
///
/// Built once in `main.rs`; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CertificateStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(
        store: impl CertificateStore + 'static,
        verifier: impl IdentityVerifier + 'static,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store: Arc::new(store),
            verifier: Arc::new(verifier),
            config: Arc::new(config),
        }
    }
}
