//! firewall_dnstranslation schema definition
//!
//! CMDB path: firewall/dnstranslation

use fortios_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::{FortiosSchemaConfig, ResourceKind, vdomparam};

/// Returns the schema config for firewall_dnstranslation
pub fn firewall_dnstranslation_config() -> FortiosSchemaConfig {
    FortiosSchemaConfig {
        api_name: "FirewallDnstranslation",
        path: "firewall/dnstranslation",
        kind: ResourceKind::Collection { mkey: "fosid" },
        data_source: true,
        schema: ResourceSchema::new("firewall_dnstranslation")
            .with_description("Rewrite IP addresses in DNS responses.")
            .attribute(
                AttributeSchema::new("fosid", AttributeType::Int)
                    .with_provider_name("id")
                    .int_between(0, 4294967295)
                    .computed()
                    .with_description("Entry ID."),
            )
            .attribute(
                AttributeSchema::new("src", types::ipv4_address())
                    .computed()
                    .with_description("IPv4 address or subnet on the internal network to compare with the resolved address in DNS query replies."),
            )
            .attribute(
                AttributeSchema::new("dst", types::ipv4_address())
                    .computed()
                    .with_description("IPv4 address or subnet on the external network to substitute for the resolved address."),
            )
            .attribute(
                AttributeSchema::new("netmask", types::ipv4_netmask())
                    .computed()
                    .with_description("Netmask of the src and dst addresses."),
            )
            .attribute(vdomparam()),
    }
}
