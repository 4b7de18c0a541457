//! Status probes
//!
//! A probe performs one finder call and reports what it saw as an
//! [`Observed`] value for the waiter: the object and its state, `gone` when
//! the finder says not found, or a sentinel state. Other errors pass through
//! unchanged. Probes never retry.

use dxform_core::waiter::Observed;

use crate::api::{
    BgpPeer, Connection, Gateway, GatewayAssociation, Lag, VirtualInterface,
    VirtualInterfaceState,
};
use crate::client::AwsClient;
use crate::error::{DxError, Result};
use crate::find;

/// Sentinel reported by interface and peer probes once the object is gone
pub const DELETED: &str = "deleted";

fn observe<T>(
    result: Result<T>,
    state_of: impl FnOnce(&T) -> String,
    missing: impl FnOnce() -> Observed<T>,
) -> Result<Observed<T>> {
    match result {
        Ok(object) => {
            let state = state_of(&object);
            Ok(Observed::found(object, state))
        }
        Err(e) if e.is_not_found() => Ok(missing()),
        Err(e) => Err(e),
    }
}

pub async fn connection_state(client: &AwsClient, id: &str) -> Result<Observed<Connection>> {
    observe(
        find::find_connection_by_id(client, id).await,
        |c| c.connection_state.to_string(),
        Observed::gone,
    )
}

pub async fn lag_state(client: &AwsClient, id: &str) -> Result<Observed<Lag>> {
    observe(
        find::find_lag_by_id(client, id).await,
        |l| l.lag_state.to_string(),
        Observed::gone,
    )
}

pub async fn gateway_state(client: &AwsClient, id: &str) -> Result<Observed<Gateway>> {
    observe(
        find::find_gateway_by_id(client, id).await,
        |g| g.direct_connect_gateway_state.to_string(),
        Observed::gone,
    )
}

pub async fn gateway_association_state(
    client: &AwsClient,
    association_id: &str,
) -> Result<Observed<GatewayAssociation>> {
    observe(
        find::find_gateway_association_by_id(client, association_id).await,
        |a| a.association_state.to_string(),
        Observed::gone,
    )
}

pub async fn virtual_interface_state(
    client: &AwsClient,
    id: &str,
) -> Result<Observed<VirtualInterface>> {
    observe(
        find::find_virtual_interface_by_id(client, id).await,
        |v| v.virtual_interface_state.to_string(),
        || Observed::sentinel(VirtualInterfaceState::Deleted.as_str()),
    )
}

/// State of one BGP peer.
///
/// Reads the owning interface; a missing interface or peer is reported as
/// the `deleted` sentinel. More than one interface in the response is an
/// error.
pub async fn bgp_peer_state(
    client: &AwsClient,
    virtual_interface_id: &str,
    address_family: &str,
    asn: i64,
) -> Result<Observed<BgpPeer>> {
    match find::find_bgp_peer(client, virtual_interface_id, address_family, asn).await {
        Ok(peer) => {
            let state = peer.bgp_peer_state.to_string();
            Ok(Observed::found(peer, state))
        }
        Err(e @ DxError::TooManyResults(_)) => Err(e),
        Err(e) if e.is_not_found() => Ok(Observed::sentinel(DELETED)),
        Err(e) => Err(e),
    }
}
