//! switch_controller_storm_control schema definition
//!
//! CMDB path: switch-controller/storm-control (singleton)

use fortios_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::{FortiosSchemaConfig, ResourceKind, vdomparam};

/// Returns the schema config for switch_controller_storm_control
pub fn switch_controller_storm_control_config() -> FortiosSchemaConfig {
    FortiosSchemaConfig {
        api_name: "SwitchControllerStormControl",
        path: "switch-controller/storm-control",
        kind: ResourceKind::Singleton,
        data_source: false,
        schema: ResourceSchema::new("switch_controller_storm_control")
            .with_description("Configure FortiSwitch storm control.")
            .attribute(
                AttributeSchema::new("rate", AttributeType::Int)
                    .int_between(1, 10000000)
                    .computed()
                    .with_description("Rate in packets per second at which storm traffic is controlled."),
            )
            .attribute(
                AttributeSchema::new("unknown_unicast", types::enable_disable())
                    .computed()
                    .with_description("Enable/disable storm control to drop unknown unicast traffic."),
            )
            .attribute(
                AttributeSchema::new("unknown_multicast", types::enable_disable())
                    .computed()
                    .with_description("Enable/disable storm control to drop unknown multicast traffic."),
            )
            .attribute(
                AttributeSchema::new("broadcast", types::enable_disable())
                    .computed()
                    .with_description("Enable/disable storm control to drop broadcast traffic."),
            )
            .attribute(vdomparam()),
    }
}
