//! system_vdom_netflow schema definition
//!
//! CMDB path: system/vdom-netflow (singleton)

use fortios_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::{FortiosSchemaConfig, ResourceKind, interface_select_method, vdomparam};

fn collector_fields() -> Vec<AttributeSchema> {
    vec![
        AttributeSchema::new("id", AttributeType::Int)
            .int_between(0, 6)
            .computed()
            .with_description("ID."),
        AttributeSchema::new("collector_ip", AttributeType::String)
            .string_len_between(0, 255)
            .with_description("Collector IP."),
        AttributeSchema::new("collector_port", AttributeType::Int)
            .int_between(0, 65535)
            .computed()
            .with_description("NetFlow collector port number."),
        AttributeSchema::new("source_ip", AttributeType::String)
            .string_len_between(0, 63)
            .computed()
            .with_description("Source IP address for communication with the NetFlow agent."),
        interface_select_method(),
        AttributeSchema::new("interface", AttributeType::String)
            .string_len_between(0, 15)
            .computed()
            .with_description("Specify outgoing interface to reach server."),
    ]
}

/// Returns the schema config for system_vdom_netflow
pub fn system_vdom_netflow_config() -> FortiosSchemaConfig {
    FortiosSchemaConfig {
        api_name: "SystemVdomNetflow",
        path: "system/vdom-netflow",
        kind: ResourceKind::Singleton,
        data_source: false,
        schema: ResourceSchema::new("system_vdom_netflow")
            .with_description("Configure NetFlow per VDOM.")
            .attribute(
                AttributeSchema::new("vdom_netflow", types::enable_disable())
                    .computed()
                    .with_description("Enable/disable NetFlow per VDOM."),
            )
            .attribute(
                AttributeSchema::new("collector_ip", AttributeType::String)
                    .computed()
                    .with_description("NetFlow collector IP address."),
            )
            .attribute(
                AttributeSchema::new("collector_port", AttributeType::Int)
                    .int_between(0, 65535)
                    .computed()
                    .with_description("NetFlow collector port number."),
            )
            .attribute(
                AttributeSchema::new("source_ip", AttributeType::String)
                    .computed()
                    .with_description("Source IP address for communication with the NetFlow agent."),
            )
            .attribute(interface_select_method())
            .attribute(
                AttributeSchema::new("interface", AttributeType::String)
                    .string_len_between(0, 15)
                    .computed()
                    .with_description("Specify outgoing interface to reach server."),
            )
            .attribute(
                AttributeSchema::new("collectors", AttributeType::Block(collector_fields()))
                    .with_description("NetFlow collectors."),
            )
            .attribute(vdomparam()),
    }
}
