//! Direct Connect objects as seen by the provider
//!
//! These mirror the AWS shapes closely but own their data and use typed state
//! enums, so handlers and tests never touch SDK types.

use std::collections::HashMap;
use std::fmt;

/// Declare a state enum backed by AWS wire strings.
///
/// Values AWS may add later land in `Unknown` and keep their wire form.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            Unknown(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Unknown(s) => s,
                }
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                match s {
                    $($wire => Self::$variant,)+
                    other => Self::Unknown(other.to_string()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(
    /// Lifecycle of a dedicated or hosted connection
    ConnectionState {
        Ordering => "ordering",
        Requested => "requested",
        Pending => "pending",
        Available => "available",
        Down => "down",
        Deleting => "deleting",
        Deleted => "deleted",
        Rejected => "rejected",
    }
);

wire_enum!(
    LagState {
        Requested => "requested",
        Pending => "pending",
        Available => "available",
        Down => "down",
        Deleting => "deleting",
        Deleted => "deleted",
    }
);

wire_enum!(
    GatewayState {
        Pending => "pending",
        Available => "available",
        Deleting => "deleting",
        Deleted => "deleted",
    }
);

wire_enum!(
    GatewayAssociationState {
        Associating => "associating",
        Associated => "associated",
        Disassociating => "disassociating",
        Disassociated => "disassociated",
        Updating => "updating",
    }
);

wire_enum!(
    GatewayAssociationProposalState {
        Requested => "requested",
        Accepted => "accepted",
        Deleted => "deleted",
    }
);

wire_enum!(
    VirtualInterfaceState {
        Confirming => "confirming",
        Verifying => "verifying",
        Pending => "pending",
        Available => "available",
        Down => "down",
        Deleting => "deleting",
        Deleted => "deleted",
        Rejected => "rejected",
    }
);

wire_enum!(
    BgpPeerState {
        Verifying => "verifying",
        Pending => "pending",
        Available => "available",
        Deleting => "deleting",
        Deleted => "deleted",
    }
);

/// Kind of virtual interface, as reported in `virtualInterfaceType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualInterfaceType {
    Private,
    Public,
    Transit,
}

impl VirtualInterfaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VirtualInterfaceType::Private => "private",
            VirtualInterfaceType::Public => "public",
            VirtualInterfaceType::Transit => "transit",
        }
    }
}

impl fmt::Display for VirtualInterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Tags = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct MacSecKey {
    pub secret_arn: Option<String>,
    pub ckn: Option<String>,
    pub state: Option<String>,
    pub start_on: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub connection_id: String,
    pub connection_name: Option<String>,
    pub connection_state: ConnectionState,
    pub bandwidth: Option<String>,
    pub location: Option<String>,
    pub owner_account: Option<String>,
    pub partner_name: Option<String>,
    pub provider_name: Option<String>,
    pub region: Option<String>,
    pub lag_id: Option<String>,
    pub aws_device: Option<String>,
    pub has_logical_redundancy: Option<String>,
    pub jumbo_frame_capable: Option<bool>,
    pub macsec_capable: Option<bool>,
    pub encryption_mode: Option<String>,
    pub port_encryption_status: Option<String>,
    pub vlan: i32,
    pub macsec_keys: Vec<MacSecKey>,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lag {
    pub lag_id: String,
    pub lag_name: Option<String>,
    pub lag_state: LagState,
    pub connections_bandwidth: Option<String>,
    pub number_of_connections: i32,
    pub location: Option<String>,
    pub owner_account: Option<String>,
    pub provider_name: Option<String>,
    pub region: Option<String>,
    pub aws_device: Option<String>,
    pub has_logical_redundancy: Option<String>,
    pub jumbo_frame_capable: Option<bool>,
    pub allows_hosted_connections: bool,
    pub connections: Vec<Connection>,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gateway {
    pub direct_connect_gateway_id: String,
    pub direct_connect_gateway_name: Option<String>,
    pub amazon_side_asn: Option<i64>,
    pub owner_account: Option<String>,
    pub direct_connect_gateway_state: GatewayState,
    pub state_change_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssociatedGateway {
    pub id: Option<String>,
    pub gateway_type: Option<String>,
    pub owner_account: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayAssociation {
    pub association_id: String,
    pub association_state: GatewayAssociationState,
    pub direct_connect_gateway_id: Option<String>,
    pub direct_connect_gateway_owner_account: Option<String>,
    pub associated_gateway: Option<AssociatedGateway>,
    pub allowed_prefixes: Vec<String>,
    pub state_change_error: Option<String>,
}

impl GatewayAssociation {
    pub fn associated_gateway_id(&self) -> Option<&str> {
        self.associated_gateway.as_ref()?.id.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayAssociationProposal {
    pub proposal_id: String,
    pub proposal_state: GatewayAssociationProposalState,
    pub direct_connect_gateway_id: Option<String>,
    pub direct_connect_gateway_owner_account: Option<String>,
    pub associated_gateway: Option<AssociatedGateway>,
    pub existing_allowed_prefixes: Vec<String>,
    pub requested_allowed_prefixes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BgpPeer {
    pub bgp_peer_id: Option<String>,
    pub asn: i64,
    pub address_family: Option<String>,
    pub amazon_address: Option<String>,
    pub customer_address: Option<String>,
    pub auth_key: Option<String>,
    pub bgp_peer_state: BgpPeerState,
    pub bgp_status: Option<String>,
    pub aws_device: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VirtualInterface {
    pub virtual_interface_id: String,
    pub virtual_interface_name: Option<String>,
    /// Raw type string; compare with [`VirtualInterfaceType::as_str`]
    pub virtual_interface_type: Option<String>,
    pub virtual_interface_state: VirtualInterfaceState,
    pub connection_id: Option<String>,
    pub owner_account: Option<String>,
    pub region: Option<String>,
    pub vlan: i32,
    pub asn: i64,
    pub amazon_side_asn: Option<i64>,
    pub address_family: Option<String>,
    pub amazon_address: Option<String>,
    pub customer_address: Option<String>,
    pub auth_key: Option<String>,
    pub mtu: Option<i32>,
    pub jumbo_frame_capable: Option<bool>,
    pub site_link_enabled: Option<bool>,
    pub virtual_gateway_id: Option<String>,
    pub direct_connect_gateway_id: Option<String>,
    pub aws_device: Option<String>,
    pub route_filter_prefixes: Vec<String>,
    pub bgp_peers: Vec<BgpPeer>,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub location_code: String,
    pub location_name: Option<String>,
    pub region: Option<String>,
    pub available_port_speeds: Vec<String>,
    pub available_providers: Vec<String>,
    pub available_macsec_port_speeds: Vec<String>,
}

/// Result of associating a MACsec key with a connection
#[derive(Debug, Clone, PartialEq)]
pub struct MacSecAssociation {
    pub connection_id: Option<String>,
    pub keys: Vec<MacSecKey>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateConnectionInput {
    pub connection_name: String,
    pub bandwidth: String,
    pub location: String,
    pub lag_id: Option<String>,
    pub provider_name: Option<String>,
    pub request_macsec: bool,
    pub tags: Tags,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateConnectionInput {
    pub connection_id: String,
    pub connection_name: Option<String>,
    pub encryption_mode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateLagInput {
    pub lag_name: String,
    pub location: String,
    pub connections_bandwidth: String,
    pub number_of_connections: i32,
    pub connection_id: Option<String>,
    pub provider_name: Option<String>,
    pub tags: Tags,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatewayAssociationFilter {
    pub association_id: Option<String>,
    pub direct_connect_gateway_id: Option<String>,
    pub associated_gateway_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateGatewayAssociationInput {
    pub direct_connect_gateway_id: String,
    pub gateway_id: String,
    pub add_allowed_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateGatewayAssociationInput {
    pub association_id: String,
    pub add_allowed_prefixes: Vec<String>,
    pub remove_allowed_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceptProposalInput {
    pub direct_connect_gateway_id: String,
    pub proposal_id: String,
    pub associated_gateway_owner_account: String,
    pub override_allowed_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateProposalInput {
    pub direct_connect_gateway_id: String,
    pub direct_connect_gateway_owner_account: String,
    pub gateway_id: String,
    pub add_allowed_prefixes: Vec<String>,
}

/// Parameters shared by create and allocate calls for all interface kinds
#[derive(Debug, Clone, PartialEq)]
pub struct NewVirtualInterface {
    pub interface_type: VirtualInterfaceType,
    pub name: String,
    pub vlan: i32,
    pub asn: i64,
    pub address_family: Option<String>,
    pub amazon_address: Option<String>,
    pub customer_address: Option<String>,
    pub auth_key: Option<String>,
    pub mtu: Option<i32>,
    pub virtual_gateway_id: Option<String>,
    pub direct_connect_gateway_id: Option<String>,
    pub route_filter_prefixes: Vec<String>,
    pub site_link_enabled: Option<bool>,
    pub tags: Tags,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateVirtualInterfaceInput {
    pub virtual_interface_id: String,
    pub name: Option<String>,
    pub mtu: Option<i32>,
    pub site_link_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewBgpPeer {
    pub asn: i64,
    pub address_family: Option<String>,
    pub amazon_address: Option<String>,
    pub customer_address: Option<String>,
    pub auth_key: Option<String>,
}
