//! Virtual interface and BGP peer schemas
//!
//! The nine virtual interface resources share one builder: the interface kind
//! decides gateway attachments and MTU rules, the role decides whether the
//! resource creates the interface, allocates it for another account, or
//! accepts it.

use dxform_core::resource::Value;
use dxform_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use super::{arn, computed_string, tags, timeouts, types};
use crate::resources::{ResourceKind, VifKind, VifRole};

fn required_new(name: &str, attr_type: AttributeType) -> AttributeSchema {
    AttributeSchema::new(name, attr_type).required().force_new()
}

fn computed_new(name: &str) -> AttributeSchema {
    AttributeSchema::new(name, AttributeType::String)
        .computed()
        .force_new()
}

pub fn virtual_interface(kind: VifKind, role: VifRole) -> ResourceSchema {
    let schema = ResourceSchema::new(ResourceKind::VirtualInterface(kind, role).name())
        .attribute(timeouts())
        .attribute(arn())
        .attribute(computed_string("aws_device"))
        .attribute(computed_string("amazon_side_asn"));

    if role == VifRole::Accepter {
        return accepter(schema, kind);
    }

    let mut schema = schema
        .attribute(required_new("connection_id", AttributeType::String))
        .attribute(required_new("name", AttributeType::String))
        .attribute(required_new("vlan", types::vlan()))
        .attribute(required_new("bgp_asn", AttributeType::Int))
        .attribute(required_new("address_family", types::address_family()))
        .attribute(computed_new("amazon_address"))
        .attribute(computed_new("customer_address"))
        .attribute(computed_new("bgp_auth_key").sensitive())
        .attribute(AttributeSchema::new("jumbo_frame_capable", AttributeType::Bool).read_only());

    schema = match kind {
        VifKind::Public => schema.attribute(required_new("route_filter_prefixes", types::prefixes())),
        VifKind::Private | VifKind::Transit => {
            let mtu_type = if kind == VifKind::Private {
                types::private_mtu()
            } else {
                types::transit_mtu()
            };
            let mut mtu = AttributeSchema::new("mtu", mtu_type).with_default(Value::Int(1500));
            if role == VifRole::Hosted {
                mtu = mtu.force_new();
            }
            schema.attribute(mtu)
        }
    };

    match role {
        VifRole::Owned => {
            schema = schema.attribute(tags());
            match kind {
                VifKind::Private => {
                    schema = schema
                        .attribute(
                            AttributeSchema::new("dx_gateway_id", AttributeType::String)
                                .force_new()
                                .conflicts_with(&["vpn_gateway_id"]),
                        )
                        .attribute(
                            AttributeSchema::new("vpn_gateway_id", AttributeType::String)
                                .force_new()
                                .conflicts_with(&["dx_gateway_id"]),
                        )
                        .attribute(AttributeSchema::new("sitelink_enabled", AttributeType::Bool));
                }
                VifKind::Transit => {
                    schema = schema
                        .attribute(required_new("dx_gateway_id", AttributeType::String))
                        .attribute(AttributeSchema::new("sitelink_enabled", AttributeType::Bool));
                }
                VifKind::Public => {}
            }
        }
        VifRole::Hosted => {
            schema = schema
                .attribute(required_new("owner_account_id", AttributeType::String))
                .with_description("Virtual interface allocated to another account");
        }
        VifRole::Accepter => {}
    }

    schema
}

fn accepter(schema: ResourceSchema, kind: VifKind) -> ResourceSchema {
    let schema = schema
        .with_description("Acceptance of a hosted virtual interface")
        .attribute(required_new("virtual_interface_id", AttributeType::String))
        .attribute(tags());

    match kind {
        VifKind::Private => schema
            .attribute(
                AttributeSchema::new("dx_gateway_id", AttributeType::String)
                    .force_new()
                    .conflicts_with(&["vpn_gateway_id"]),
            )
            .attribute(
                AttributeSchema::new("vpn_gateway_id", AttributeType::String)
                    .force_new()
                    .conflicts_with(&["dx_gateway_id"]),
            ),
        VifKind::Transit => schema.attribute(required_new("dx_gateway_id", AttributeType::String)),
        VifKind::Public => schema,
    }
}

pub fn bgp_peer() -> ResourceSchema {
    ResourceSchema::new("dx_bgp_peer")
        .with_description("An additional BGP peer on a virtual interface")
        .attribute(required_new("virtual_interface_id", AttributeType::String))
        .attribute(required_new("address_family", types::address_family()))
        .attribute(required_new("bgp_asn", AttributeType::Int))
        .attribute(computed_new("amazon_address"))
        .attribute(computed_new("customer_address"))
        .attribute(computed_new("bgp_auth_key").sensitive())
        .attribute(timeouts())
        .attribute(computed_string("bgp_peer_id"))
        .attribute(computed_string("bgp_status"))
        .attribute(computed_string("aws_device"))
}
