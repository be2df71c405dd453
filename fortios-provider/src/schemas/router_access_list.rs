//! router_access_list schema definition
//!
//! CMDB path: router/access-list

use fortios_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};
use fortios_core::transform::Transform;

use super::{FortiosSchemaConfig, ResourceKind, vdomparam};

fn rule_fields() -> Vec<AttributeSchema> {
    vec![
        AttributeSchema::new("id", AttributeType::Int)
            .int_between(0, 4294967295)
            .computed()
            .with_description("Rule ID."),
        AttributeSchema::new("action", types::enumeration(&["permit", "deny"]))
            .computed()
            .with_description("Permit or deny this IP address and netmask prefix."),
        AttributeSchema::new("prefix", types::cidr())
            .with_transform(Transform::IpMask)
            .computed()
            .with_description("IPv4 prefix to define regular filter criteria."),
        AttributeSchema::new("wildcard", AttributeType::String)
            .computed()
            .with_description("Wildcard to define Cisco-style wildcard filter criteria."),
        AttributeSchema::new("exact_match", types::enable_disable())
            .computed()
            .with_description("Enable/disable exact match."),
        AttributeSchema::new("flags", AttributeType::Int)
            .int_between(0, 4294967295)
            .computed()
            .with_description("Flags."),
    ]
}

/// Returns the schema config for router_access_list
pub fn router_access_list_config() -> FortiosSchemaConfig {
    FortiosSchemaConfig {
        api_name: "RouterAccessList",
        path: "router/access-list",
        kind: ResourceKind::Collection { mkey: "name" },
        data_source: false,
        schema: ResourceSchema::new("router_access_list")
            .with_description("Configure access lists.")
            .attribute(
                AttributeSchema::new("name", AttributeType::String)
                    .required()
                    .string_len_between(0, 35)
                    .with_description("Name."),
            )
            .attribute(
                AttributeSchema::new("comments", AttributeType::String)
                    .string_len_between(0, 127)
                    .with_description("Comment."),
            )
            .attribute(
                AttributeSchema::new("rule", AttributeType::Block(rule_fields()))
                    .with_description("Rule."),
            )
            .attribute(vdomparam()),
    }
}
