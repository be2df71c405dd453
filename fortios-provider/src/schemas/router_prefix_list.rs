//! router_prefix_list schema definition
//!
//! CMDB path: router/prefix-list

use fortios_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

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
        AttributeSchema::new("prefix", AttributeType::String)
            .computed()
            .with_description("IPv4 prefix to define regular filter criteria, such as \"any\" or subnets."),
        AttributeSchema::new("ge", AttributeType::Int)
            .int_between(0, 32)
            .computed()
            .with_description("Minimum prefix length to be matched."),
        AttributeSchema::new("le", AttributeType::Int)
            .int_between(0, 32)
            .computed()
            .with_description("Maximum prefix length to be matched."),
        AttributeSchema::new("flags", AttributeType::Int)
            .int_between(0, 4294967295)
            .computed()
            .with_description("Flags."),
    ]
}

/// Returns the schema config for router_prefix_list
pub fn router_prefix_list_config() -> FortiosSchemaConfig {
    FortiosSchemaConfig {
        api_name: "RouterPrefixList",
        path: "router/prefix-list",
        kind: ResourceKind::Collection { mkey: "name" },
        data_source: true,
        schema: ResourceSchema::new("router_prefix_list")
            .with_description("Configure IPv4 prefix lists.")
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
                    .with_description("IPv4 prefix list rule."),
            )
            .attribute(vdomparam()),
    }
}
