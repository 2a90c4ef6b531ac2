//! Session provider adapters.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::session::SessionProvider;
use crate::config::{AuthBackend, AuthSettings};

use super::error::InfraError;
use super::hosted::HostedCtx;

mod memory;
mod rest;

pub use memory::MemorySessionProvider;
pub(crate) use rest::METRIC_AUTH_REQUESTS;
pub use rest::RestSessionProvider;

pub fn build_session_provider(
    settings: &AuthSettings,
) -> Result<Arc<dyn SessionProvider>, InfraError> {
    match &settings.backend {
        AuthBackend::Memory { users } => {
            if users.is_empty() {
                warn!(
                    target: "blogcraft::auth",
                    "memory auth has no users configured; nobody can sign in"
                );
            }
            info!(
                target: "blogcraft::auth",
                backend = "memory",
                users = users.len(),
                "session provider ready"
            );
            Ok(Arc::new(MemorySessionProvider::new(users)))
        }
        AuthBackend::Remote(remote) => {
            let ctx = HostedCtx::new(&remote.url, &remote.anon_key, remote.timeout)?;
            info!(
                target: "blogcraft::auth",
                backend = "remote",
                url = %remote.url,
                "session provider ready"
            );
            Ok(Arc::new(RestSessionProvider::new(ctx)))
        }
    }
}
