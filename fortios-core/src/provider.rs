//! Provider - Trait abstracting object operations
//!
//! A Provider turns CRUD requests on typed resources into calls against a
//! device API. Each object type it handles is described by a `ResourceType`.

use std::future::Future;
use std::pin::Pin;

use crate::resource::{Resource, ResourceId, State};
use crate::schema::ResourceSchema;

/// Error type for Provider operations
#[derive(Debug)]
pub struct ProviderError {
    pub message: String,
    pub resource_id: Option<ResourceId>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref id) = self.resource_id {
            write!(f, "[{}.{}] {}", id.resource_type, id.name, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            resource_id: None,
            cause: None,
        }
    }

    pub fn for_resource(mut self, id: ResourceId) -> Self {
        self.resource_id = Some(id);
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Definition of object types that a Provider can handle
pub trait ResourceType: Send + Sync {
    /// Object type name (e.g., "firewall_address")
    fn name(&self) -> &str;

    /// Field descriptor table for this object type
    fn schema(&self) -> ResourceSchema;

    /// Whether the type is also exported as a read-only data source
    fn is_data_source(&self) -> bool {
        false
    }
}

/// Main Provider trait
///
/// All operations are async and involve side effects on the device.
pub trait Provider: Send + Sync {
    /// Name of this Provider (e.g., "fortios")
    fn name(&self) -> &'static str;

    /// List of object types this Provider can handle
    fn resource_types(&self) -> Vec<Box<dyn ResourceType>>;

    /// Get the current state of an object
    ///
    /// `vdom` overrides the provider's default virtual domain.
    /// Returns `State::not_found()` if the object does not exist or no
    /// identifier is known yet.
    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
        vdom: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<State>>;

    /// Look up an object as a data source; a missing object is an error
    fn read_data_source(&self, id: &ResourceId, key: &str)
    -> BoxFuture<'_, ProviderResult<State>>;

    /// Create an object
    ///
    /// Returns State with identifier set to the device-side key
    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>>;

    /// Update an object in place
    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>>;

    /// Delete an object
    fn delete(
        &self,
        id: &ResourceId,
        identifier: &str,
        vdom: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<()>>;
}

/// Provider implementation for Box<dyn Provider>
/// This enables dynamic dispatch for Providers
impl Provider for Box<dyn Provider> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        (**self).resource_types()
    }

    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
        vdom: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).read(id, identifier, vdom)
    }

    fn read_data_source(
        &self,
        id: &ResourceId,
        key: &str,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).read_data_source(id, key)
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).create(resource)
    }

    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).update(id, identifier, from, to)
    }

    fn delete(
        &self,
        id: &ResourceId,
        identifier: &str,
        vdom: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<()>> {
        (**self).delete(id, identifier, vdom)
    }
}
