//! Object type registry
//!
//! Wraps every schema config in a `ResourceType` and resolves object types
//! by name for the provider.

use fortios_core::provider::ResourceType;
use fortios_core::schema::ResourceSchema;

use crate::schemas::{self, FortiosSchemaConfig};

/// `ResourceType` backed by a schema config
pub struct FortiosResourceType {
    config: FortiosSchemaConfig,
}

impl ResourceType for FortiosResourceType {
    fn name(&self) -> &str {
        self.config.resource_type()
    }

    fn schema(&self) -> ResourceSchema {
        self.config.schema.clone()
    }

    fn is_data_source(&self) -> bool {
        self.config.data_source
    }
}

/// Returns all resource types supported by this provider
pub fn resource_types() -> Vec<Box<dyn ResourceType>> {
    schemas::configs()
        .into_iter()
        .map(|config| Box::new(FortiosResourceType { config }) as Box<dyn ResourceType>)
        .collect()
}

/// Get the schema config for an object type
pub fn get_resource_config(resource_type: &str) -> Option<FortiosSchemaConfig> {
    schemas::configs()
        .into_iter()
        .find(|c| c.resource_type() == resource_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_types_follow_configs() {
        let types = resource_types();
        assert_eq!(types.len(), schemas::configs().len());

        let dns = types.iter().find(|t| t.name() == "system_dns").unwrap();
        assert!(dns.is_data_source());
        assert_eq!(dns.schema().resource_type, "system_dns");

        let addrgrp = types.iter().find(|t| t.name() == "firewall_addrgrp").unwrap();
        assert!(!addrgrp.is_data_source());
    }

    #[test]
    fn unknown_type_has_no_config() {
        assert!(get_resource_config("firewall_policy").is_none());
    }
}
