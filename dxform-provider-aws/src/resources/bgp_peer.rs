//! `dx_bgp_peer`: additional BGP sessions on a virtual interface

use dxform_core::resource::{Resource, ResourceId, State};

use crate::api::{BgpPeer, NewBgpPeer};
use crate::client::{AwsClient, Timeouts};
use crate::error::{Result, ignore_messages, messages};
use crate::find;
use crate::id::{bgp_peer_create_resource_id, bgp_peer_parse_resource_id};
use crate::wait;

use super::attrs::{StateBuilder, identifier, missing, optional_str, required_int, required_str};

pub async fn create(client: &AwsClient, resource: &Resource, timeouts: Timeouts) -> Result<State> {
    let attrs = &resource.attributes;
    let vif_id = required_str(attrs, "virtual_interface_id")?;
    let address_family = required_str(attrs, "address_family")?;
    let asn = required_int(attrs, "bgp_asn")?;

    log::debug!(
        "creating BGP peer ({} {} {})",
        vif_id,
        address_family,
        asn
    );
    client
        .dxconn
        .create_bgp_peer(
            &vif_id,
            NewBgpPeer {
                asn,
                address_family: Some(address_family.clone()),
                amazon_address: optional_str(attrs, "amazon_address"),
                customer_address: optional_str(attrs, "customer_address"),
                auth_key: optional_str(attrs, "bgp_auth_key"),
            },
        )
        .await?;

    let id = bgp_peer_create_resource_id(&vif_id, &address_family, asn);
    wait::bgp_peer_available(client, &vif_id, &address_family, asn, timeouts.create).await?;

    refresh(client, &resource.id, &id, true).await
}

pub async fn read(client: &AwsClient, prior: &State) -> Result<State> {
    refresh(client, &prior.id, identifier(prior)?, false).await
}

async fn refresh(client: &AwsClient, id: &ResourceId, peer_id: &str, is_new: bool) -> Result<State> {
    let (vif_id, address_family, asn) = bgp_peer_parse_resource_id(peer_id)?;
    match find::find_bgp_peer(client, &vif_id, &address_family, asn).await {
        Ok(peer) => Ok(to_state(id, peer_id, &vif_id, &peer)),
        Err(e) => missing(id, peer_id, e, is_new),
    }
}

fn to_state(id: &ResourceId, peer_id: &str, vif_id: &str, peer: &BgpPeer) -> State {
    StateBuilder::new()
        .str("virtual_interface_id", vif_id)
        .opt_str("address_family", peer.address_family.as_deref())
        .int("bgp_asn", peer.asn)
        .opt_str("amazon_address", peer.amazon_address.as_deref())
        .opt_str("customer_address", peer.customer_address.as_deref())
        .opt_str("bgp_auth_key", peer.auth_key.as_deref())
        .opt_str("bgp_peer_id", peer.bgp_peer_id.as_deref())
        .opt_str("bgp_status", peer.bgp_status.as_deref())
        .opt_str("aws_device", peer.aws_device.as_deref())
        .build(id, peer_id)
}

pub async fn delete(client: &AwsClient, state: &State, timeouts: Timeouts) -> Result<()> {
    let (vif_id, address_family, asn) = bgp_peer_parse_resource_id(identifier(state)?)?;
    let customer_address = optional_str(&state.attributes, "customer_address");

    log::debug!("deleting BGP peer ({} {} {})", vif_id, address_family, asn);
    match client
        .dxconn
        .delete_bgp_peer(&vif_id, asn, customer_address.as_deref())
        .await
    {
        // The interface's own peer goes away with the interface
        Err(e) if e.message_contains(messages::LAST_BGP_PEER) => {
            log::info!(
                "BGP peer ({} {} {}) is the last on its interface; leaving it to the interface",
                vif_id,
                address_family,
                asn
            );
            return Ok(());
        }
        result => ignore_messages(result, &[messages::DOES_NOT_EXIST])?,
    }

    wait::bgp_peer_deleted(client, &vif_id, &address_family, asn, timeouts.delete).await
}
