//! Post store adapters.

use std::sync::Arc;

use tracing::info;

use crate::application::repos::PostStore;
use crate::config::StoreSettings;

use super::error::InfraError;
use super::hosted::HostedCtx;

mod memory;
mod rest;

pub use memory::MemoryPostStore;
pub(crate) use rest::METRIC_STORE_REQUESTS;
pub use rest::RestPostStore;

pub fn build_post_store(settings: &StoreSettings) -> Result<Arc<dyn PostStore>, InfraError> {
    match settings {
        StoreSettings::Memory => {
            info!(target: "blogcraft::store", backend = "memory", "post store ready");
            Ok(Arc::new(MemoryPostStore::new()))
        }
        StoreSettings::Remote { remote, table } => {
            let ctx = HostedCtx::new(&remote.url, &remote.anon_key, remote.timeout)?;
            info!(
                target: "blogcraft::store",
                backend = "remote",
                url = %remote.url,
                table = %table,
                "post store ready"
            );
            Ok(Arc::new(RestPostStore::new(ctx, table.clone())))
        }
    }
}
