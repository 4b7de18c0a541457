//! Finders
//!
//! Each finder issues one describe call and returns exactly one object or a
//! typed error: [`DxError::NotFound`]/[`DxError::EmptyResult`] when the object
//! is missing or in a terminal state, [`DxError::TooManyResults`] when the
//! call matched more than one.

use crate::api::{
    ApiResult, BgpPeer, BgpPeerState, Connection, ConnectionState, Gateway,
    GatewayAssociation, GatewayAssociationFilter, GatewayAssociationProposal,
    GatewayAssociationProposalState, GatewayAssociationState, GatewayState, Lag, LagState,
    Location, MacSecKey, VirtualInterface, VirtualInterfaceState,
};
use crate::client::AwsClient;
use crate::error::{DxError, Result, is_not_found_api_error};

/// Map well-known not-found API errors to [`DxError::NotFound`]
fn describe<T>(result: ApiResult<T>) -> Result<T> {
    result.map_err(|e| {
        if is_not_found_api_error(&e) {
            DxError::NotFound(e.to_string())
        } else {
            DxError::Api(e)
        }
    })
}

/// Exactly one item, or a typed error
pub fn single<T>(mut items: Vec<T>) -> Result<T> {
    match items.len() {
        0 => Err(DxError::EmptyResult),
        1 => Ok(items.remove(0)),
        n => Err(DxError::TooManyResults(n)),
    }
}

fn terminal(kind: &str, id: &str, state: &str) -> DxError {
    DxError::NotFound(format!("Direct Connect {} ({}) is {}", kind, id, state))
}

pub async fn find_connection_by_id(client: &AwsClient, id: &str) -> Result<Connection> {
    let connection = single(describe(client.dxconn.describe_connections(Some(id)).await)?)?;

    match connection.connection_state {
        ConnectionState::Deleted | ConnectionState::Rejected => Err(terminal(
            "Connection",
            id,
            connection.connection_state.as_str(),
        )),
        _ => Ok(connection),
    }
}

pub async fn find_connections(client: &AwsClient) -> Result<Vec<Connection>> {
    describe(client.dxconn.describe_connections(None).await)
}

pub async fn find_lag_by_id(client: &AwsClient, id: &str) -> Result<Lag> {
    let lag = single(describe(client.dxconn.describe_lags(Some(id)).await)?)?;

    if lag.lag_state == LagState::Deleted {
        return Err(terminal("LAG", id, lag.lag_state.as_str()));
    }
    Ok(lag)
}

pub async fn find_lags(client: &AwsClient) -> Result<Vec<Lag>> {
    describe(client.dxconn.describe_lags(None).await)
}

pub async fn find_gateway_by_id(client: &AwsClient, id: &str) -> Result<Gateway> {
    let gateway = single(describe(client.dxconn.describe_gateways(Some(id)).await)?)?;

    if gateway.direct_connect_gateway_state == GatewayState::Deleted {
        return Err(terminal(
            "Gateway",
            id,
            gateway.direct_connect_gateway_state.as_str(),
        ));
    }
    Ok(gateway)
}

pub async fn find_gateways(client: &AwsClient) -> Result<Vec<Gateway>> {
    describe(client.dxconn.describe_gateways(None).await)
}

async fn find_gateway_association(
    client: &AwsClient,
    filter: GatewayAssociationFilter,
) -> Result<GatewayAssociation> {
    let association = single(describe(
        client
            .dxconn
            .describe_gateway_associations(filter)
            .await,
    )?)?;

    if association.association_state == GatewayAssociationState::Disassociated {
        return Err(terminal(
            "Gateway Association",
            &association.association_id,
            association.association_state.as_str(),
        ));
    }
    Ok(association)
}

pub async fn find_gateway_association_by_id(
    client: &AwsClient,
    association_id: &str,
) -> Result<GatewayAssociation> {
    let association = find_gateway_association(
        client,
        GatewayAssociationFilter {
            association_id: Some(association_id.to_string()),
            ..Default::default()
        },
    )
    .await?;

    // Eventual consistency: a stale listing may return another association
    if association.association_id != association_id {
        return Err(DxError::NotFound(format!(
            "Direct Connect Gateway Association ({}) not found",
            association_id
        )));
    }
    Ok(association)
}

pub async fn find_gateway_association_by_gateway_ids(
    client: &AwsClient,
    dx_gateway_id: &str,
    associated_gateway_id: &str,
) -> Result<GatewayAssociation> {
    let association = find_gateway_association(
        client,
        GatewayAssociationFilter {
            direct_connect_gateway_id: Some(dx_gateway_id.to_string()),
            associated_gateway_id: Some(associated_gateway_id.to_string()),
            ..Default::default()
        },
    )
    .await?;

    if association.direct_connect_gateway_id.as_deref() != Some(dx_gateway_id)
        || association.associated_gateway_id() != Some(associated_gateway_id)
    {
        return Err(DxError::NotFound(format!(
            "Direct Connect Gateway Association ({}/{}) not found",
            dx_gateway_id, associated_gateway_id
        )));
    }
    Ok(association)
}

pub async fn find_gateway_association_proposal_by_id(
    client: &AwsClient,
    proposal_id: &str,
) -> Result<GatewayAssociationProposal> {
    let proposal = single(describe(
        client
            .dxconn
            .describe_gateway_association_proposals(proposal_id)
            .await,
    )?)?;

    if proposal.proposal_state == GatewayAssociationProposalState::Deleted {
        return Err(terminal(
            "Gateway Association Proposal",
            proposal_id,
            proposal.proposal_state.as_str(),
        ));
    }
    if proposal.proposal_id != proposal_id {
        return Err(DxError::NotFound(format!(
            "Direct Connect Gateway Association Proposal ({}) not found",
            proposal_id
        )));
    }
    Ok(proposal)
}

pub async fn find_virtual_interface_by_id(
    client: &AwsClient,
    id: &str,
) -> Result<VirtualInterface> {
    let vif = single(describe(
        client.dxconn.describe_virtual_interfaces(Some(id)).await,
    )?)?;

    match vif.virtual_interface_state {
        VirtualInterfaceState::Deleted | VirtualInterfaceState::Rejected => Err(terminal(
            "Virtual Interface",
            id,
            vif.virtual_interface_state.as_str(),
        )),
        _ => Ok(vif),
    }
}

/// The BGP peer of `address_family` and `asn` on a virtual interface
pub async fn find_bgp_peer(
    client: &AwsClient,
    virtual_interface_id: &str,
    address_family: &str,
    asn: i64,
) -> Result<BgpPeer> {
    let vif = find_virtual_interface_by_id(client, virtual_interface_id).await?;

    let peer = vif
        .bgp_peers
        .into_iter()
        .find(|p| p.address_family.as_deref() == Some(address_family) && p.asn == asn)
        .ok_or_else(|| {
            DxError::NotFound(format!(
                "Direct Connect BGP Peer ({} {} {}) not found",
                virtual_interface_id, address_family, asn
            ))
        })?;

    if peer.bgp_peer_state == BgpPeerState::Deleted {
        return Err(terminal(
            "BGP Peer",
            peer.bgp_peer_id.as_deref().unwrap_or(virtual_interface_id),
            peer.bgp_peer_state.as_str(),
        ));
    }
    Ok(peer)
}

/// The MACsec key identified by `secret_arn` on a connection
pub async fn find_macsec_key(
    client: &AwsClient,
    connection_id: &str,
    secret_arn: &str,
) -> Result<MacSecKey> {
    let connection = find_connection_by_id(client, connection_id).await?;

    connection
        .macsec_keys
        .into_iter()
        .find(|k| k.secret_arn.as_deref() == Some(secret_arn))
        .ok_or_else(|| {
            DxError::NotFound(format!(
                "MACsec key {} not associated with connection {}",
                secret_arn, connection_id
            ))
        })
}

pub async fn find_locations(client: &AwsClient) -> Result<Vec<Location>> {
    describe(client.dxconn.describe_locations().await)
}

pub async fn find_location_by_code(client: &AwsClient, code: &str) -> Result<Location> {
    let matches: Vec<Location> = find_locations(client)
        .await?
        .into_iter()
        .filter(|l| l.location_code == code)
        .collect();
    single(matches)
}
