//! firewall_addrgrp schema definition
//!
//! CMDB path: firewall/addrgrp

use fortios_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};
use fortios_core::transform::Transform;

use super::{FortiosSchemaConfig, ResourceKind, vdomparam};

fn name_list() -> AttributeType {
    AttributeType::List(Box::new(AttributeType::String))
}

/// Returns the schema config for firewall_addrgrp
pub fn firewall_addrgrp_config() -> FortiosSchemaConfig {
    FortiosSchemaConfig {
        api_name: "FirewallAddrgrp",
        path: "firewall/addrgrp",
        kind: ResourceKind::Collection { mkey: "name" },
        data_source: false,
        schema: ResourceSchema::new("firewall_addrgrp")
            .with_description("Configure IPv4 address groups.")
            .attribute(
                AttributeSchema::new("name", AttributeType::String)
                    .required()
                    .string_len_between(0, 79)
                    .with_description("Address group name."),
            )
            .attribute(
                AttributeSchema::new("uuid", AttributeType::String)
                    .computed()
                    .with_description("Universally Unique Identifier (read-only)."),
            )
            .attribute(
                AttributeSchema::new("member", name_list())
                    .required()
                    .with_transform(Transform::NameList)
                    .with_description("Address objects contained within the group."),
            )
            .attribute(
                AttributeSchema::new("exclude", types::enable_disable())
                    .computed()
                    .with_description("Enable/disable address exclusion."),
            )
            .attribute(
                AttributeSchema::new("exclude_member", name_list())
                    .with_transform(Transform::NameList)
                    .with_description("Address exclusion member."),
            )
            .attribute(
                AttributeSchema::new("comment", AttributeType::String)
                    .string_len_between(0, 255)
                    .with_description("Comment."),
            )
            .attribute(
                AttributeSchema::new("color", AttributeType::Int)
                    .int_between(0, 32)
                    .computed()
                    .with_description("Color of icon on the GUI."),
            )
            .attribute(
                AttributeSchema::new("visibility", types::enable_disable())
                    .computed()
                    .with_description("Enable/disable address visibility in the GUI."),
            )
            .attribute(vdomparam()),
    }
}
