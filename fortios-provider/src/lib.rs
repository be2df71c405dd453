//! FortiOS Provider
//!
//! Manages FortiGate configuration objects through the FortiOS REST API.
//!
//! ## Module Structure
//!
//! - `config` - Connection settings (file + environment)
//! - `client` - REST client trait and HTTPS implementation
//! - `resources` - Object type registry
//! - `provider` - FortiosProvider implementation
//! - `schemas` - Field descriptor tables, one per object type
//! - `utils` - mkey helpers

pub mod client;
pub mod config;
pub mod provider;
pub mod resources;
pub mod schemas;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export main types
pub use client::{ClientError, HttpClient, RestClient};
pub use config::{ConfigError, ProviderConfig};
pub use provider::FortiosProvider;

use fortios_core::provider::{BoxFuture, Provider, ProviderResult, ResourceType};
use fortios_core::resource::{Resource, ResourceId, State};

use resources::resource_types;

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl Provider for FortiosProvider {
    fn name(&self) -> &'static str {
        "fortios"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        resource_types()
    }

    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
        vdom: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.map(|s| s.to_string());
        let vdom = vdom.map(|s| s.to_string());
        Box::pin(async move {
            self.read_resource(&id, identifier.as_deref(), vdom.as_deref())
                .await
        })
    }

    fn read_data_source(
        &self,
        id: &ResourceId,
        key: &str,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let key = key.to_string();
        Box::pin(async move { FortiosProvider::read_data_source(self, &id, &key).await })
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.create_resource(resource).await })
    }

    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        _from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        let to = to.clone();
        Box::pin(async move { self.update_resource(id, &identifier, to).await })
    }

    fn delete(
        &self,
        id: &ResourceId,
        identifier: &str,
        vdom: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<()>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        let vdom = vdom.map(|s| s.to_string());
        Box::pin(async move {
            self.delete_resource(&id, &identifier, vdom.as_deref())
                .await
        })
    }
}
