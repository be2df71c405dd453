//! FortiOS object type schemas
//!
//! One module per object type. Each exposes a `*_config()` function that
//! pairs the descriptor table with the REST metadata needed to dispatch it.

pub mod firewall_address;
pub mod firewall_addrgrp;
pub mod firewall_dnstranslation;
pub mod router_access_list;
pub mod router_prefix_list;
pub mod switch_controller_storm_control;
pub mod system_dns;
pub mod system_vdom_netflow;

use fortios_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

/// How instances of an object type are addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Table of instances keyed by the `mkey` attribute (state name)
    Collection { mkey: &'static str },
    /// Exactly one instance per vdom; created and deleted by updating it
    Singleton,
}

/// FortiOS schema configuration
pub struct FortiosSchemaConfig {
    /// Name used in error messages (e.g., "FirewallAddress")
    pub api_name: &'static str,
    /// CMDB path (e.g., "firewall/address")
    pub path: &'static str,
    pub kind: ResourceKind,
    /// Also exported as a read-only data source
    pub data_source: bool,
    pub schema: ResourceSchema,
}

impl FortiosSchemaConfig {
    pub fn resource_type(&self) -> &str {
        &self.schema.resource_type
    }

    /// Data source flavour of the schema; `None` if the type is not exported
    /// as a data source
    pub fn data_source_schema(&self) -> Option<ResourceSchema> {
        if !self.data_source {
            return None;
        }
        let key = match self.kind {
            ResourceKind::Collection { mkey } => mkey,
            // singletons are looked up without a key
            ResourceKind::Singleton => "",
        };
        Some(self.schema.as_data_source(key))
    }
}

/// Returns every schema config this provider serves
pub fn configs() -> Vec<FortiosSchemaConfig> {
    vec![
        firewall_dnstranslation::firewall_dnstranslation_config(),
        router_prefix_list::router_prefix_list_config(),
        router_access_list::router_access_list_config(),
        firewall_address::firewall_address_config(),
        firewall_addrgrp::firewall_addrgrp_config(),
        system_vdom_netflow::system_vdom_netflow_config(),
        switch_controller_storm_control::switch_controller_storm_control_config(),
        system_dns::system_dns_config(),
    ]
}

/// Per-resource vdom override, never sent to the device
pub fn vdomparam() -> AttributeSchema {
    AttributeSchema::new("vdomparam", AttributeType::String)
        .host_only()
        .string_len_between(1, 31)
        .with_description("Virtual domain the object lives in. Overrides the provider default.")
}

/// Interface selection used by objects that originate traffic
pub(crate) fn interface_select_method() -> AttributeSchema {
    AttributeSchema::new(
        "interface_select_method",
        types::enumeration(&["auto", "sdwan", "specify"]),
    )
    .computed()
    .with_description("How the outgoing interface is selected.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn resource_types_are_unique() {
        let configs = configs();
        let names: HashSet<&str> = configs.iter().map(|c| c.resource_type()).collect();
        assert_eq!(names.len(), configs.len());
    }

    #[test]
    fn every_type_accepts_vdomparam() {
        for config in configs() {
            let attr = config
                .schema
                .get("vdomparam")
                .unwrap_or_else(|| panic!("{} has no vdomparam", config.resource_type()));
            assert!(attr.provider_name.is_none());
        }
    }

    #[test]
    fn collection_mkeys_exist_in_schema() {
        for config in configs() {
            if let ResourceKind::Collection { mkey } = config.kind {
                let attr = config.schema.get(mkey).unwrap_or_else(|| {
                    panic!("{} has no mkey {}", config.resource_type(), mkey)
                });
                assert!(attr.provider_name.is_some());
            }
        }
    }

    #[test]
    fn data_source_schema_requires_only_the_key() {
        let config = firewall_address::firewall_address_config();
        let schema = config.data_source_schema().unwrap();
        for attr in &schema.attributes {
            if attr.name == "name" {
                assert!(attr.required && !attr.computed);
            } else {
                assert!(!attr.required && attr.computed, "{}", attr.name);
            }
        }

        let dns = system_dns::system_dns_config().data_source_schema().unwrap();
        assert!(dns.attributes.iter().all(|a| a.computed && !a.required));

        let addrgrp = firewall_addrgrp::firewall_addrgrp_config();
        assert!(addrgrp.data_source_schema().is_none());
    }
}
