//! system_dns schema definition
//!
//! CMDB path: system/dns (singleton)
//!
//! Older firmware reports the cache settings as numeric strings, so those
//! fields carry `Transform::IntCoerce`.

use fortios_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};
use fortios_core::transform::Transform;

use super::{FortiosSchemaConfig, ResourceKind, interface_select_method, vdomparam};

fn domain_fields() -> Vec<AttributeSchema> {
    vec![
        AttributeSchema::new("domain", AttributeType::String)
            .string_len_between(0, 127)
            .with_description("DNS search domain list separated by space."),
    ]
}

/// Returns the schema config for system_dns
pub fn system_dns_config() -> FortiosSchemaConfig {
    FortiosSchemaConfig {
        api_name: "SystemDns",
        path: "system/dns",
        kind: ResourceKind::Singleton,
        data_source: true,
        schema: ResourceSchema::new("system_dns")
            .with_description("Configure DNS.")
            .attribute(
                AttributeSchema::new("primary", types::ipv4_address())
                    .required()
                    .with_description("Primary DNS server IP address."),
            )
            .attribute(
                AttributeSchema::new("secondary", types::ipv4_address())
                    .computed()
                    .with_description("Secondary DNS server IP address."),
            )
            .attribute(
                AttributeSchema::new("ip6_primary", AttributeType::String)
                    .computed()
                    .with_description("Primary DNS server IPv6 address."),
            )
            .attribute(
                AttributeSchema::new("ip6_secondary", AttributeType::String)
                    .computed()
                    .with_description("Secondary DNS server IPv6 address."),
            )
            .attribute(
                AttributeSchema::new("domain", AttributeType::Block(domain_fields()))
                    .with_description("Search suffix list for hostname lookup."),
            )
            .attribute(
                AttributeSchema::new("timeout", AttributeType::Int)
                    .int_between(1, 10)
                    .computed()
                    .with_description("DNS query timeout interval in seconds."),
            )
            .attribute(
                AttributeSchema::new("retry", AttributeType::Int)
                    .int_between(0, 5)
                    .computed()
                    .with_description("Number of times to retry."),
            )
            .attribute(
                AttributeSchema::new("dns_cache_limit", AttributeType::Int)
                    .with_transform(Transform::IntCoerce)
                    .computed()
                    .with_description("Maximum number of records in the DNS cache."),
            )
            .attribute(
                AttributeSchema::new("dns_cache_ttl", AttributeType::Int)
                    .int_between(60, 86400)
                    .with_transform(Transform::IntCoerce)
                    .computed()
                    .with_description("Duration in seconds that the DNS cache retains information."),
            )
            .attribute(
                AttributeSchema::new("cache_notfound_responses", types::enable_disable())
                    .computed()
                    .with_description("Enable/disable response from the DNS server when a record is not in cache."),
            )
            .attribute(
                AttributeSchema::new("source_ip", types::ipv4_address())
                    .computed()
                    .with_description("IP address used by the DNS server as its source IP."),
            )
            .attribute(interface_select_method())
            .attribute(
                AttributeSchema::new("interface", AttributeType::String)
                    .string_len_between(0, 15)
                    .computed()
                    .with_description("Specify outgoing interface to reach server."),
            )
            .attribute(vdomparam()),
    }
}
