//! Data source schemas

use dxform_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types as core_types};

use super::{arn, computed_string, types};

pub fn connection() -> ResourceSchema {
    ResourceSchema::data_source("dx_connection")
        .attribute(AttributeSchema::new("name", AttributeType::String).required())
        .attribute(arn())
        .attribute(computed_string("aws_device"))
        .attribute(computed_string("bandwidth"))
        .attribute(computed_string("location"))
        .attribute(computed_string("owner_account_id"))
        .attribute(computed_string("partner_name"))
        .attribute(computed_string("provider_name"))
        .attribute(AttributeSchema::new("vlan_id", AttributeType::Int).read_only())
        .attribute(AttributeSchema::new("tags", core_types::tags()).read_only())
}

pub fn gateway() -> ResourceSchema {
    ResourceSchema::data_source("dx_gateway")
        .attribute(AttributeSchema::new("name", AttributeType::String).required())
        .attribute(computed_string("amazon_side_asn"))
        .attribute(computed_string("owner_account_id"))
}

pub fn lag() -> ResourceSchema {
    ResourceSchema::data_source("dx_lag")
        .attribute(AttributeSchema::new("name", AttributeType::String).required())
        .attribute(arn())
        .attribute(computed_string("connections_bandwidth"))
        .attribute(computed_string("location"))
        .attribute(computed_string("owner_account_id"))
        .attribute(computed_string("provider_name"))
        .attribute(AttributeSchema::new("jumbo_frame_capable", AttributeType::Bool).read_only())
        .attribute(AttributeSchema::new("tags", core_types::tags()).read_only())
}

pub fn location() -> ResourceSchema {
    ResourceSchema::data_source("dx_location")
        .attribute(AttributeSchema::new("location_code", AttributeType::String).required())
        .attribute(computed_string("location_name"))
        .attribute(AttributeSchema::new("available_macsec_port_speeds", types::strings()).read_only())
        .attribute(AttributeSchema::new("available_port_speeds", types::strings()).read_only())
        .attribute(AttributeSchema::new("available_providers", types::strings()).read_only())
}

pub fn locations() -> ResourceSchema {
    ResourceSchema::data_source("dx_locations")
        .attribute(AttributeSchema::new("location_codes", types::strings()).read_only())
}
