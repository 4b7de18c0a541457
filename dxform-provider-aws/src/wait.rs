//! Waiters for asynchronous Direct Connect state transitions
//!
//! Each waiter pairs a status probe with the pending and target states of one
//! transition and blocks until it completes or times out.

use std::time::Duration;

use dxform_core::waiter::StateChangeConf;

use crate::api::{
    BgpPeer, BgpPeerState, Connection, ConnectionState, Gateway, GatewayAssociation,
    GatewayAssociationState, GatewayState, LagState, VirtualInterface, VirtualInterfaceState,
};
use crate::client::AwsClient;
use crate::error::{DxError, Result};
use crate::status;

pub const CONNECTION_DELETED_TIMEOUT: Duration = Duration::from_secs(10 * 60);

const VIRTUAL_INTERFACE_DELAY: Duration = Duration::from_secs(10);
const VIRTUAL_INTERFACE_MIN_TIMEOUT: Duration = Duration::from_secs(5);

fn conf(pending: &[&str], target: &[&str], timeout: Duration) -> StateChangeConf {
    StateChangeConf::new(pending, target, timeout)
}

fn interface_conf(pending: &[&str], target: &[&str], timeout: Duration) -> StateChangeConf {
    conf(pending, target, timeout)
        .with_delay(VIRTUAL_INTERFACE_DELAY)
        .with_min_timeout(VIRTUAL_INTERFACE_MIN_TIMEOUT)
}

pub async fn connection_confirmed(
    client: &AwsClient,
    id: &str,
    timeout: Duration,
) -> Result<Option<Connection>> {
    let conf = client.tune(conf(
        &[
            ConnectionState::Pending.as_str(),
            ConnectionState::Ordering.as_str(),
            ConnectionState::Requested.as_str(),
        ],
        &[ConnectionState::Available.as_str()],
        timeout,
    ));
    log::info!("waiting for Direct Connect Connection ({}) to be confirmed", id);
    conf.wait(|| status::connection_state(client, id))
        .await
        .map_err(|e| DxError::wait("Connection confirm", id, e))
}

pub async fn connection_deleted(client: &AwsClient, id: &str, timeout: Duration) -> Result<()> {
    let conf = client.tune(conf(
        &[
            ConnectionState::Pending.as_str(),
            ConnectionState::Ordering.as_str(),
            ConnectionState::Available.as_str(),
            ConnectionState::Requested.as_str(),
            ConnectionState::Deleting.as_str(),
        ],
        &[],
        timeout,
    ));
    log::info!("waiting for Direct Connect Connection ({}) to be deleted", id);
    conf.wait(|| status::connection_state(client, id))
        .await
        .map(|_| ())
        .map_err(|e| DxError::wait("Connection delete", id, e))
}

pub async fn lag_deleted(client: &AwsClient, id: &str, timeout: Duration) -> Result<()> {
    let conf = client.tune(conf(
        &[
            LagState::Available.as_str(),
            LagState::Requested.as_str(),
            LagState::Pending.as_str(),
            LagState::Deleting.as_str(),
        ],
        &[],
        timeout,
    ));
    log::info!("waiting for Direct Connect LAG ({}) to be deleted", id);
    conf.wait(|| status::lag_state(client, id))
        .await
        .map(|_| ())
        .map_err(|e| DxError::wait("LAG delete", id, e))
}

pub async fn gateway_created(
    client: &AwsClient,
    id: &str,
    timeout: Duration,
) -> Result<Option<Gateway>> {
    let conf = client.tune(conf(
        &[GatewayState::Pending.as_str()],
        &[GatewayState::Available.as_str()],
        timeout,
    ));
    log::info!("waiting for Direct Connect Gateway ({}) to be available", id);
    conf.wait(|| status::gateway_state(client, id))
        .await
        .map_err(|e| DxError::wait("Gateway create", id, e))
}

pub async fn gateway_deleted(client: &AwsClient, id: &str, timeout: Duration) -> Result<()> {
    let conf = client.tune(conf(
        &[
            GatewayState::Pending.as_str(),
            GatewayState::Available.as_str(),
            GatewayState::Deleting.as_str(),
        ],
        &[],
        timeout,
    ));
    log::info!("waiting for Direct Connect Gateway ({}) to be deleted", id);
    conf.wait(|| status::gateway_state(client, id))
        .await
        .map(|_| ())
        .map_err(|e| DxError::wait("Gateway delete", id, e))
}

pub async fn gateway_association_created(
    client: &AwsClient,
    association_id: &str,
    timeout: Duration,
) -> Result<Option<GatewayAssociation>> {
    let conf = client.tune(conf(
        &[GatewayAssociationState::Associating.as_str()],
        &[GatewayAssociationState::Associated.as_str()],
        timeout,
    ));
    log::info!(
        "waiting for Direct Connect Gateway Association ({}) to be associated",
        association_id
    );
    conf.wait(|| status::gateway_association_state(client, association_id))
        .await
        .map_err(|e| DxError::wait("Gateway Association create", association_id, e))
}

pub async fn gateway_association_updated(
    client: &AwsClient,
    association_id: &str,
    timeout: Duration,
) -> Result<Option<GatewayAssociation>> {
    let conf = client.tune(conf(
        &[GatewayAssociationState::Updating.as_str()],
        &[GatewayAssociationState::Associated.as_str()],
        timeout,
    ));
    log::info!(
        "waiting for Direct Connect Gateway Association ({}) update",
        association_id
    );
    conf.wait(|| status::gateway_association_state(client, association_id))
        .await
        .map_err(|e| DxError::wait("Gateway Association update", association_id, e))
}

pub async fn gateway_association_deleted(
    client: &AwsClient,
    association_id: &str,
    timeout: Duration,
) -> Result<()> {
    let conf = client.tune(conf(
        &[GatewayAssociationState::Disassociating.as_str()],
        &[],
        timeout,
    ));
    log::info!(
        "waiting for Direct Connect Gateway Association ({}) to be deleted",
        association_id
    );
    conf.wait(|| status::gateway_association_state(client, association_id))
        .await
        .map(|_| ())
        .map_err(|e| DxError::wait("Gateway Association delete", association_id, e))
}

/// Which side of a virtual interface is waiting for it to come up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceWait {
    /// Owner-created private or transit interface
    Owned,
    /// Owner-created public interface; AWS verifies its prefixes first
    OwnedPublic,
    /// Hosted interface, from the allocating account
    Hosted,
    /// Hosted interface, from the accepting account
    Accepter,
}

impl InterfaceWait {
    fn pending(self) -> Vec<&'static str> {
        match self {
            InterfaceWait::Owned | InterfaceWait::Hosted => vec!["pending"],
            InterfaceWait::OwnedPublic => vec!["pending", "verifying"],
            InterfaceWait::Accepter => vec!["confirming", "pending"],
        }
    }

    fn target(self) -> Vec<&'static str> {
        match self {
            InterfaceWait::Hosted => vec!["available", "confirming", "down"],
            _ => vec!["available", "down"],
        }
    }
}

pub async fn virtual_interface_available(
    client: &AwsClient,
    id: &str,
    side: InterfaceWait,
    timeout: Duration,
) -> Result<Option<VirtualInterface>> {
    let conf = client.tune(interface_conf(&side.pending(), &side.target(), timeout));
    log::info!("waiting for Direct Connect Virtual Interface ({}) to be available", id);
    conf.wait(|| status::virtual_interface_state(client, id))
        .await
        .map_err(|e| DxError::wait("Virtual Interface", id, e))
}

pub async fn virtual_interface_deleted(
    client: &AwsClient,
    id: &str,
    timeout: Duration,
) -> Result<()> {
    let conf = client.tune(interface_conf(
        &[
            VirtualInterfaceState::Available.as_str(),
            VirtualInterfaceState::Confirming.as_str(),
            VirtualInterfaceState::Deleting.as_str(),
            VirtualInterfaceState::Down.as_str(),
            VirtualInterfaceState::Pending.as_str(),
            VirtualInterfaceState::Rejected.as_str(),
            VirtualInterfaceState::Verifying.as_str(),
        ],
        &[VirtualInterfaceState::Deleted.as_str()],
        timeout,
    ));
    log::info!("waiting for Direct Connect Virtual Interface ({}) to be deleted", id);
    conf.wait(|| status::virtual_interface_state(client, id))
        .await
        .map(|_| ())
        .map_err(|e| DxError::wait("Virtual Interface delete", id, e))
}

pub async fn bgp_peer_available(
    client: &AwsClient,
    virtual_interface_id: &str,
    address_family: &str,
    asn: i64,
    timeout: Duration,
) -> Result<Option<BgpPeer>> {
    let conf = client.tune(interface_conf(
        &[BgpPeerState::Pending.as_str()],
        &[
            BgpPeerState::Available.as_str(),
            BgpPeerState::Verifying.as_str(),
        ],
        timeout,
    ));
    log::info!(
        "waiting for BGP peer ({} {} {}) to be available",
        virtual_interface_id,
        address_family,
        asn
    );
    conf.wait(|| status::bgp_peer_state(client, virtual_interface_id, address_family, asn))
        .await
        .map_err(|e| DxError::wait("BGP Peer create", virtual_interface_id, e))
}

pub async fn bgp_peer_deleted(
    client: &AwsClient,
    virtual_interface_id: &str,
    address_family: &str,
    asn: i64,
    timeout: Duration,
) -> Result<()> {
    let conf = client.tune(interface_conf(
        &[
            BgpPeerState::Available.as_str(),
            BgpPeerState::Deleting.as_str(),
            BgpPeerState::Pending.as_str(),
        ],
        &[BgpPeerState::Deleted.as_str()],
        timeout,
    ));
    log::info!(
        "waiting for BGP peer ({} {} {}) to be deleted",
        virtual_interface_id,
        address_family,
        asn
    );
    conf.wait(|| status::bgp_peer_state(client, virtual_interface_id, address_family, asn))
        .await
        .map(|_| ())
        .map_err(|e| DxError::wait("BGP Peer delete", virtual_interface_id, e))
}
