//! Connection and LAG schemas

use dxform_core::resource::Value;
use dxform_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use super::{arn, computed_string, tags, timeouts, types};

pub fn connection() -> ResourceSchema {
    ResourceSchema::new("dx_connection")
        .with_description("A dedicated Direct Connect connection")
        .attribute(AttributeSchema::new("name", AttributeType::String).required())
        .attribute(
            AttributeSchema::new("bandwidth", types::bandwidth())
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("location", AttributeType::String)
                .required()
                .force_new()
                .with_description("Location code, e.g. EqDC2"),
        )
        .attribute(
            AttributeSchema::new("provider_name", AttributeType::String)
                .computed()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("request_macsec", AttributeType::Bool)
                .force_new()
                .with_default(Value::Bool(false)),
        )
        .attribute(AttributeSchema::new("encryption_mode", types::encryption_mode()).computed())
        .attribute(
            AttributeSchema::new("skip_destroy", AttributeType::Bool)
                .with_default(Value::Bool(false))
                .with_description("Forget the connection on destroy instead of deleting it"),
        )
        .attribute(tags())
        .attribute(timeouts())
        .attribute(arn())
        .attribute(computed_string("aws_device"))
        .attribute(computed_string("has_logical_redundancy"))
        .attribute(AttributeSchema::new("jumbo_frame_capable", AttributeType::Bool).read_only())
        .attribute(AttributeSchema::new("macsec_capable", AttributeType::Bool).read_only())
        .attribute(computed_string("owner_account_id"))
        .attribute(computed_string("partner_name"))
        .attribute(computed_string("port_encryption_status"))
        .attribute(AttributeSchema::new("vlan_id", AttributeType::Int).read_only())
}

pub fn connection_association() -> ResourceSchema {
    ResourceSchema::new("dx_connection_association")
        .with_description("Membership of a connection in a LAG")
        .attribute(
            AttributeSchema::new("connection_id", AttributeType::String)
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("lag_id", AttributeType::String)
                .required()
                .force_new(),
        )
        .attribute(timeouts())
}

pub fn connection_confirmation() -> ResourceSchema {
    ResourceSchema::new("dx_connection_confirmation")
        .with_description("Acceptance of a hosted connection")
        .attribute(
            AttributeSchema::new("connection_id", AttributeType::String)
                .required()
                .force_new(),
        )
        .attribute(timeouts())
}

pub fn lag() -> ResourceSchema {
    ResourceSchema::new("dx_lag")
        .with_description("A link aggregation group of dedicated connections")
        .attribute(AttributeSchema::new("name", AttributeType::String).required())
        .attribute(
            AttributeSchema::new("connections_bandwidth", types::bandwidth())
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("location", AttributeType::String)
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("connection_id", AttributeType::String)
                .force_new()
                .with_description("Existing connection to migrate into the LAG"),
        )
        .attribute(
            AttributeSchema::new("force_destroy", AttributeType::Bool)
                .with_default(Value::Bool(false))
                .with_description("Delete member connections when the LAG is destroyed"),
        )
        .attribute(
            AttributeSchema::new("provider_name", AttributeType::String)
                .computed()
                .force_new(),
        )
        .attribute(tags())
        .attribute(timeouts())
        .attribute(arn())
        .attribute(computed_string("has_logical_redundancy"))
        .attribute(AttributeSchema::new("jumbo_frame_capable", AttributeType::Bool).read_only())
        .attribute(computed_string("owner_account_id"))
}
