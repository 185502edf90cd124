use std::sync::Arc;

use service::auth::AuthService;
use service::catalog::CatalogService;
use service::downloads::DownloadService;
use service::leads::LeadService;
use service::Services;

/// Shared handler state.
#[derive(Clone)]
pub struct ServerState {
    pub catalog: CatalogService,
    pub leads: LeadService,
    pub downloads: DownloadService,
    pub auth: Arc<AuthService>,
    /// Mark the admin cookie `Secure` (set when served over https).
    pub secure_cookies: bool,
}

impl ServerState {
    pub fn new(services: Services) -> Self {
        Self {
            catalog: services.catalog,
            leads: services.leads,
            downloads: services.downloads,
            auth: services.auth,
            secure_cookies: false,
        }
    }

    pub fn with_secure_cookies(mut self, on: bool) -> Self {
        self.secure_cookies = on;
        self
    }
}
