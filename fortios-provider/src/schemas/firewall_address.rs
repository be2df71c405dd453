//! firewall_address schema definition
//!
//! CMDB path: firewall/address

use fortios_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};
use fortios_core::transform::Transform;

use super::{FortiosSchemaConfig, ResourceKind, vdomparam};

const ADDRESS_TYPES: &[&str] = &[
    "ipmask",
    "iprange",
    "fqdn",
    "geography",
    "wildcard",
    "dynamic",
    "interface-subnet",
    "mac",
];

/// Returns the schema config for firewall_address
pub fn firewall_address_config() -> FortiosSchemaConfig {
    FortiosSchemaConfig {
        api_name: "FirewallAddress",
        path: "firewall/address",
        kind: ResourceKind::Collection { mkey: "name" },
        data_source: true,
        schema: ResourceSchema::new("firewall_address")
            .with_description("Configure IPv4 addresses.")
            .attribute(
                AttributeSchema::new("name", AttributeType::String)
                    .required()
                    .string_len_between(0, 79)
                    .with_description("Address name."),
            )
            .attribute(
                AttributeSchema::new("uuid", AttributeType::String)
                    .computed()
                    .with_description("Universally Unique Identifier (read-only)."),
            )
            .attribute(
                AttributeSchema::new("subnet", types::cidr())
                    .with_transform(Transform::IpMask)
                    .computed()
                    .with_description("IP address and subnet mask of address."),
            )
            .attribute(
                AttributeSchema::new("type", types::enumeration(ADDRESS_TYPES))
                    .computed()
                    .with_description("Type of address."),
            )
            .attribute(
                AttributeSchema::new("start_ip", types::ipv4_address())
                    .computed()
                    .with_description("First IP address (inclusive) in the range for the address."),
            )
            .attribute(
                AttributeSchema::new("end_ip", types::ipv4_address())
                    .computed()
                    .with_description("Final IP address (inclusive) in the range for the address."),
            )
            .attribute(
                AttributeSchema::new("fqdn", AttributeType::String)
                    .string_len_between(0, 255)
                    .with_description("Fully Qualified Domain Name address."),
            )
            .attribute(
                AttributeSchema::new("country", AttributeType::String)
                    .string_len_between(0, 2)
                    .with_description("IP addresses associated to a specific country."),
            )
            .attribute(
                AttributeSchema::new("comment", AttributeType::String)
                    .string_len_between(0, 255)
                    .with_description("Comment."),
            )
            .attribute(
                AttributeSchema::new("associated_interface", AttributeType::String)
                    .string_len_between(0, 35)
                    .computed()
                    .with_description("Network interface associated with address."),
            )
            .attribute(
                AttributeSchema::new("color", AttributeType::Int)
                    .int_between(0, 32)
                    .computed()
                    .with_description("Color of icon on the GUI."),
            )
            .attribute(
                AttributeSchema::new("allow_routing", types::enable_disable())
                    .computed()
                    .with_description("Enable/disable use of this address in the static route configuration."),
            )
            .attribute(
                AttributeSchema::new("visibility", types::enable_disable())
                    .computed()
                    .with_description("Enable/disable address visibility in the GUI."),
            )
            .attribute(vdomparam()),
    }
}
