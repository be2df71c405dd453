//! FortiOS Provider implementation
//!
//! Dispatches CRUD requests through the generic field mapper to the
//! FortiOS REST API. Object types differ only in their schema config.

use std::collections::HashMap;
use std::sync::Arc;

use fortios_core::mapper::{Record, to_record, to_state};
use fortios_core::provider::{ProviderError, ProviderResult};
use fortios_core::resource::{Resource, ResourceId, State, Value};
use fortios_core::schema::AttributeType;

use crate::client::{ClientError, HttpClient, RestClient};
use crate::config::ProviderConfig;
use crate::resources::get_resource_config;
use crate::schemas::{FortiosSchemaConfig, ResourceKind};
use crate::utils::{join_errors, json_to_mkey, mkey_to_value, value_to_mkey};

/// Attribute carrying a per-resource vdom override
const VDOM_ATTRIBUTE: &str = "vdomparam";

/// FortiOS Provider
pub struct FortiosProvider {
    client: Arc<dyn RestClient>,
    /// Default vdom for every call
    vdom: Option<String>,
}

impl FortiosProvider {
    /// Create a provider talking HTTPS to the configured device
    pub fn new(config: &ProviderConfig) -> Result<Self, ClientError> {
        let client = HttpClient::new(config)?;
        Ok(Self {
            client: Arc::new(client),
            vdom: config.vdom.clone(),
        })
    }

    /// Create a provider on top of an existing client
    pub fn with_client(client: Arc<dyn RestClient>, vdom: Option<String>) -> Self {
        Self { client, vdom }
    }

    fn resource_config(&self, id: &ResourceId) -> ProviderResult<FortiosSchemaConfig> {
        get_resource_config(&id.resource_type).ok_or_else(|| {
            ProviderError::new(format!("Unknown resource type: {}", id.resource_type))
                .for_resource(id.clone())
        })
    }

    fn effective_vdom<'a>(&'a self, vdom: Option<&'a str>) -> Option<&'a str> {
        vdom.or(self.vdom.as_deref())
    }

    /// Read an object from the device
    pub async fn read_resource(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
        vdom: Option<&str>,
    ) -> ProviderResult<State> {
        let config = self.resource_config(id)?;
        let mkey = match (config.kind, identifier) {
            (ResourceKind::Singleton, _) => None,
            (ResourceKind::Collection { .. }, Some(mkey)) => Some(mkey),
            (ResourceKind::Collection { .. }, None) => return Ok(State::not_found(id.clone())),
        };

        log::debug!("reading {} {}", config.api_name, mkey.unwrap_or(config.path));
        let record = self
            .client
            .read(config.path, mkey, self.effective_vdom(vdom))
            .await
            .map_err(|e| {
                ProviderError::new(format!(
                    "Error reading {} resource: {}",
                    config.api_name, e
                ))
                .for_resource(id.clone())
                .with_cause(e)
            })?;

        let Some(record) = record else {
            log::warn!(
                "{} resource {} not found, removing from state",
                config.api_name,
                mkey.unwrap_or(config.path)
            );
            return Ok(State::not_found(id.clone()));
        };

        let mut attributes = self.record_to_attributes(&config, &record, id)?;
        if let (ResourceKind::Collection { mkey: key }, Some(mkey)) = (config.kind, mkey) {
            attributes
                .entry(key.to_string())
                .or_insert_with(|| mkey_to_value(mkey, has_integer_mkey(&config)));
        }
        if let Some(vdom) = vdom {
            attributes.insert(VDOM_ATTRIBUTE.to_string(), Value::String(vdom.to_string()));
        }

        let identifier = match config.kind {
            ResourceKind::Collection { mkey: key } => attributes
                .get(key)
                .and_then(value_to_mkey)
                .or_else(|| mkey.map(|m| m.to_string())),
            ResourceKind::Singleton => Some(config.resource_type().to_string()),
        };

        let state = State::existing(id.clone(), attributes);
        Ok(match identifier {
            Some(identifier) => state.with_identifier(identifier),
            None => state,
        })
    }

    /// Look up an object as a data source. A missing object is an error.
    pub async fn read_data_source(&self, id: &ResourceId, key: &str) -> ProviderResult<State> {
        let config = self.resource_config(id)?;
        let Some(schema) = config.data_source_schema() else {
            return Err(ProviderError::new(format!(
                "{} is not available as a data source",
                id.resource_type
            ))
            .for_resource(id.clone()));
        };
        if let ResourceKind::Collection { mkey } = config.kind {
            let lookup = HashMap::from([(
                mkey.to_string(),
                mkey_to_value(key, has_integer_mkey(&config)),
            )]);
            schema.validate(&lookup).map_err(|errors| {
                ProviderError::new(format!(
                    "Invalid key '{}' for {} data source: {}",
                    key,
                    config.api_name,
                    join_errors(&errors)
                ))
                .for_resource(id.clone())
            })?;
        }

        let state = self.read_resource(id, Some(key), None).await?;
        if !state.exists {
            return Err(ProviderError::new(format!(
                "Error reading {} data source: {} not found",
                config.api_name, key
            ))
            .for_resource(id.clone()));
        }
        Ok(state)
    }

    /// Create an object and read it back
    pub async fn create_resource(&self, resource: Resource) -> ProviderResult<State> {
        let id = resource.id.clone();
        let config = self.resource_config(&id)?;
        let body = self.build_body(&config, &resource, "creating")?;
        let vdom = vdom_override(&resource.attributes);

        log::debug!("creating {} {}", config.api_name, id);
        let identifier = match config.kind {
            ResourceKind::Collection { mkey } => {
                let response = self
                    .client
                    .create(config.path, body, self.effective_vdom(vdom))
                    .await
                    .map_err(|e| wrap_client_error(&config, "creating", &id, e))?;
                response
                    .get("mkey")
                    .and_then(json_to_mkey)
                    .or_else(|| resource.attributes.get(mkey).and_then(value_to_mkey))
                    .ok_or_else(|| {
                        ProviderError::new(format!(
                            "Error creating {} resource: no mkey returned",
                            config.api_name
                        ))
                        .for_resource(id.clone())
                    })?
            }
            ResourceKind::Singleton => {
                self.client
                    .update(config.path, None, body, self.effective_vdom(vdom))
                    .await
                    .map_err(|e| wrap_client_error(&config, "creating", &id, e))?;
                config.resource_type().to_string()
            }
        };

        self.read_resource(&id, Some(&identifier), vdom).await
    }

    /// Update an object in place and read it back
    pub async fn update_resource(
        &self,
        id: ResourceId,
        identifier: &str,
        to: Resource,
    ) -> ProviderResult<State> {
        let config = self.resource_config(&id)?;
        let body = self.build_body(&config, &to, "updating")?;
        let vdom = vdom_override(&to.attributes);

        log::debug!("updating {} {}", config.api_name, identifier);
        let mkey = match config.kind {
            ResourceKind::Collection { .. } => Some(identifier),
            ResourceKind::Singleton => None,
        };
        let response = self
            .client
            .update(config.path, mkey, body, self.effective_vdom(vdom))
            .await
            .map_err(|e| wrap_client_error(&config, "updating", &id, e))?;

        // Renaming an object changes its mkey
        let identifier = match config.kind {
            ResourceKind::Collection { mkey } => response
                .get("mkey")
                .and_then(json_to_mkey)
                .or_else(|| to.attributes.get(mkey).and_then(value_to_mkey))
                .unwrap_or_else(|| identifier.to_string()),
            ResourceKind::Singleton => config.resource_type().to_string(),
        };

        self.read_resource(&id, Some(&identifier), vdom).await
    }

    /// Delete an object. Singletons are reset to device defaults instead.
    pub async fn delete_resource(
        &self,
        id: &ResourceId,
        identifier: &str,
        vdom: Option<&str>,
    ) -> ProviderResult<()> {
        let config = self.resource_config(id)?;
        let vdom = self.effective_vdom(vdom);

        log::debug!("deleting {} {}", config.api_name, identifier);
        match config.kind {
            ResourceKind::Collection { .. } => {
                match self.client.delete(config.path, identifier, vdom).await {
                    Ok(()) => Ok(()),
                    Err(ClientError::Api { status: 404, .. }) => {
                        log::warn!(
                            "{} resource {} already deleted",
                            config.api_name,
                            identifier
                        );
                        Ok(())
                    }
                    Err(e) => Err(wrap_client_error(&config, "deleting", id, e)),
                }
            }
            ResourceKind::Singleton => {
                let empty: HashMap<String, Value> = HashMap::new();
                let body = to_record(&config.schema.attributes, &empty, true).map_err(|e| {
                    ProviderError::new(format!(
                        "Error deleting {} resource: {}",
                        config.api_name, e
                    ))
                    .for_resource(id.clone())
                })?;
                self.client
                    .update(config.path, None, body, vdom)
                    .await
                    .map(|_| ())
                    .map_err(|e| wrap_client_error(&config, "deleting", id, e))
            }
        }
    }

    /// Validate desired attributes and build the request body
    fn build_body(
        &self,
        config: &FortiosSchemaConfig,
        resource: &Resource,
        action: &str,
    ) -> ProviderResult<Record> {
        config
            .schema
            .validate(&resource.attributes)
            .map_err(|errors| {
                ProviderError::new(format!(
                    "Error {} {} resource: invalid attributes: {}",
                    action,
                    config.api_name,
                    join_errors(&errors)
                ))
                .for_resource(resource.id.clone())
            })?;

        to_record(&config.schema.attributes, &resource.attributes, false).map_err(|e| {
            ProviderError::new(format!(
                "Error {} {} resource: {}",
                action, config.api_name, e
            ))
            .for_resource(resource.id.clone())
        })
    }

    fn record_to_attributes(
        &self,
        config: &FortiosSchemaConfig,
        record: &Record,
        id: &ResourceId,
    ) -> ProviderResult<HashMap<String, Value>> {
        let mut attributes = HashMap::new();
        to_state(&config.schema.attributes, record, &mut attributes).map_err(|errors| {
            ProviderError::new(format!(
                "Error reading {} resource: {}",
                config.api_name,
                join_errors(&errors)
            ))
            .for_resource(id.clone())
        })?;
        Ok(attributes)
    }
}

fn vdom_override(attributes: &HashMap<String, Value>) -> Option<&str> {
    attributes
        .get(VDOM_ATTRIBUTE)
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty())
}

fn wrap_client_error(
    config: &FortiosSchemaConfig,
    action: &str,
    id: &ResourceId,
    e: ClientError,
) -> ProviderError {
    ProviderError::new(format!(
        "Error {} {} resource: {}",
        action, config.api_name, e
    ))
    .for_resource(id.clone())
    .with_cause(e)
}

/// Whether the mkey attribute of a collection is an integer
fn has_integer_mkey(config: &FortiosSchemaConfig) -> bool {
    match config.kind {
        ResourceKind::Collection { mkey } => config
            .schema
            .get(mkey)
            .is_some_and(|a| matches!(a.attr_type.base(), AttributeType::Int)),
        ResourceKind::Singleton => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryClient;
    use serde_json::json;

    fn provider(client: &Arc<MemoryClient>) -> FortiosProvider {
        FortiosProvider::with_client(client.clone(), Some("root".to_string()))
    }

    fn string(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[tokio::test]
    async fn create_then_read_collection_object() {
        let client = Arc::new(MemoryClient::new());
        let provider = provider(&client);

        let resource = Resource::new("firewall_address", "web")
            .with_attribute("name", string("web-srv"))
            .with_attribute("subnet", string("10.1.2.0/24"));
        let state = provider.create_resource(resource).await.unwrap();

        assert!(state.exists);
        assert_eq!(state.identifier.as_deref(), Some("web-srv"));
        assert_eq!(state.attributes["subnet"], string("10.1.2.0/24"));

        let stored = client.object("firewall/address", Some("web-srv")).unwrap();
        assert_eq!(stored["subnet"], json!("10.1.2.0 255.255.255.0"));
        assert_eq!(client.last_vdom().as_deref(), Some("root"));
    }

    #[tokio::test]
    async fn device_assigned_mkey_is_used() {
        let client = Arc::new(MemoryClient::new());
        let provider = provider(&client);

        let resource = Resource::new("firewall_dnstranslation", "dns1")
            .with_attribute("src", string("1.1.1.1"))
            .with_attribute("dst", string("2.2.2.2"))
            .with_attribute("netmask", string("255.255.255.0"));
        let state = provider.create_resource(resource).await.unwrap();

        assert_eq!(state.identifier.as_deref(), Some("1"));
        assert_eq!(state.attributes["fosid"], Value::Int(1));
    }

    #[tokio::test]
    async fn read_missing_object_is_not_found() {
        let client = Arc::new(MemoryClient::new());
        let provider = provider(&client);
        let id = ResourceId::new("firewall_address", "gone");

        let state = provider.read_resource(&id, Some("gone"), None).await.unwrap();
        assert!(!state.exists);

        let state = provider.read_resource(&id, None, None).await.unwrap();
        assert!(!state.exists);
    }

    #[tokio::test]
    async fn data_source_requires_existing_object() {
        let client = Arc::new(MemoryClient::new());
        client.insert(
            "router/prefix-list",
            Some("pl1"),
            json!({"name": "pl1", "rule": [{"id": 1, "action": "permit", "prefix": "10.0.0.0/8"}]}),
        );
        let provider = provider(&client);

        let id = ResourceId::new("router_prefix_list", "lookup");
        let state = provider.read_data_source(&id, "pl1").await.unwrap();
        assert_eq!(state.identifier.as_deref(), Some("pl1"));

        let err = provider.read_data_source(&id, "pl2").await.unwrap_err();
        assert!(err.message.contains("pl2 not found"));

        let id = ResourceId::new("firewall_addrgrp", "lookup");
        assert!(provider.read_data_source(&id, "grp").await.is_err());
    }

    #[tokio::test]
    async fn update_renames_collection_object() {
        let client = Arc::new(MemoryClient::new());
        client.insert(
            "firewall/address",
            Some("old"),
            json!({"name": "old", "subnet": "10.0.0.0 255.0.0.0"}),
        );
        let provider = provider(&client);
        let id = ResourceId::new("firewall_address", "web");
        let current = provider.read_resource(&id, Some("old"), None).await.unwrap();

        let to = Resource::new("firewall_address", "web")
            .with_attribute("name", string("new"))
            .with_attribute("subnet", string("10.0.0.0/8"));
        let state = provider
            .update_resource(id, current.identifier.as_deref().unwrap(), to)
            .await
            .unwrap();

        assert_eq!(state.identifier.as_deref(), Some("new"));
        assert!(client.object("firewall/address", Some("old")).is_none());
    }

    #[tokio::test]
    async fn singleton_lifecycle() {
        let client = Arc::new(MemoryClient::new());
        client.insert("switch-controller/storm-control", None, json!({"rate": 500}));
        let provider = provider(&client);

        let resource = Resource::new("switch_controller_storm_control", "storm")
            .with_attribute("rate", Value::Int(1000))
            .with_attribute("broadcast", string("enable"));
        let state = provider.create_resource(resource).await.unwrap();
        assert_eq!(
            state.identifier.as_deref(),
            Some("switch_controller_storm_control")
        );
        assert_eq!(state.attributes["rate"], Value::Int(1000));

        provider
            .delete_resource(&state.id, "switch_controller_storm_control", None)
            .await
            .unwrap();
        let body = client.last_body().unwrap();
        assert_eq!(body["rate"], json!(null));
        assert_eq!(body["broadcast"], json!(null));
        assert!(body.get("vdomparam").is_none());
    }

    #[tokio::test]
    async fn vdomparam_overrides_default_vdom() {
        let client = Arc::new(MemoryClient::new());
        let provider = provider(&client);

        let resource = Resource::new("firewall_address", "web")
            .with_attribute("name", string("web"))
            .with_attribute("vdomparam", string("customer1"));
        let state = provider.create_resource(resource).await.unwrap();

        assert_eq!(client.last_vdom().as_deref(), Some("customer1"));
        assert_eq!(state.attributes["vdomparam"], string("customer1"));
        let stored = client.object("firewall/address", Some("web")).unwrap();
        assert!(stored.get("vdomparam").is_none());
    }

    #[tokio::test]
    async fn invalid_attributes_never_reach_the_device() {
        let client = Arc::new(MemoryClient::new());
        let provider = provider(&client);

        let resource = Resource::new("firewall_address", "web")
            .with_attribute("name", string("web"))
            .with_attribute("color", Value::Int(99));
        let err = provider.create_resource(resource).await.unwrap_err();

        assert!(err.message.starts_with("Error creating FirewallAddress resource"));
        assert!(client.last_body().is_none());
    }

    #[tokio::test]
    async fn deleting_a_missing_object_succeeds() {
        let client = Arc::new(MemoryClient::new());
        client.insert("firewall/address", Some("web"), json!({"name": "web"}));
        let provider = provider(&client);

        let id = ResourceId::new("firewall_address", "old");
        provider.delete_resource(&id, "old", None).await.unwrap();

        let id = ResourceId::new("firewall_address", "web");
        provider.delete_resource(&id, "web", None).await.unwrap();
        assert!(client.object("firewall/address", Some("web")).is_none());
    }

    #[tokio::test]
    async fn client_errors_are_wrapped() {
        let client = Arc::new(MemoryClient::new());
        client.fail_requests();
        let provider = provider(&client);

        let id = ResourceId::new("firewall_address", "web");
        let err = provider.delete_resource(&id, "web", None).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "[firewall_address.web] Error deleting FirewallAddress resource: API returned status 500: internal error"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn mapping_errors_are_reported_on_read() {
        let client = Arc::new(MemoryClient::new());
        client.insert(
            "firewall/address",
            Some("web"),
            json!({"name": "web", "color": "blue", "comment": ["x"]}),
        );
        let provider = provider(&client);

        let id = ResourceId::new("firewall_address", "web");
        let err = provider.read_resource(&id, Some("web"), None).await.unwrap_err();
        assert!(err.message.contains("color"));
        assert!(err.message.contains("comment"));
    }

    #[tokio::test]
    async fn integer_mkey_lookup() {
        let client = Arc::new(MemoryClient::new());
        client.insert(
            "firewall/dnstranslation",
            Some("4"),
            json!({"src": "1.1.1.1", "dst": "2.2.2.2"}),
        );
        let provider = provider(&client);

        let id = ResourceId::new("firewall_dnstranslation", "lookup");
        let state = provider.read_data_source(&id, "4").await.unwrap();
        assert_eq!(state.attributes["fosid"], Value::Int(4));

        let err = provider.read_data_source(&id, "four").await.unwrap_err();
        assert!(err.message.starts_with("Invalid key 'four'"));
        let err = provider.read_data_source(&id, "-1").await.unwrap_err();
        assert!(err.message.contains("fosid"));
    }

    #[test]
    fn integer_mkey_detection() {
        let dns = get_resource_config("firewall_dnstranslation").unwrap();
        assert!(has_integer_mkey(&dns));
        let address = get_resource_config("firewall_address").unwrap();
        assert!(!has_integer_mkey(&address));
    }
}
