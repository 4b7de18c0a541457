//! `dx_gateway_association`
//!
//! Associates a Direct Connect gateway with a virtual private gateway or
//! transit gateway. When the associated gateway belongs to another account,
//! the association is created by accepting that account's proposal instead.
//!
//! State is keyed by `{dx_gateway_id}/{associated_gateway_id}`; the AWS
//! association ID is kept in `dx_gateway_association_id` and used for every
//! lookup once known.

use std::collections::BTreeSet;

use dxform_core::resource::{Resource, ResourceId, State};

use crate::api::{
    AcceptProposalInput, CreateGatewayAssociationInput, GatewayAssociation,
    UpdateGatewayAssociationInput,
};
use crate::client::{AwsClient, Timeouts};
use crate::error::{DxError, Result, ignore_messages, messages};
use crate::find;
use crate::id::{gateway_association_create_resource_id, gateway_association_parse_resource_id};
use crate::wait;

use super::attrs::{StateBuilder, identifier, missing, optional_str, required_str, string_list};

pub const CONFIG_ONLY: &[&str] = &[
    "associated_gateway_owner_account_id",
    "proposal_id",
    "timeouts",
];

pub async fn create(client: &AwsClient, resource: &Resource, timeouts: Timeouts) -> Result<State> {
    let attrs = &resource.attributes;
    let dx_gateway_id = required_str(attrs, "dx_gateway_id")?;
    let allowed_prefixes = string_list(attrs, "allowed_prefixes");

    let association = match optional_str(attrs, "associated_gateway_owner_account_id") {
        Some(owner_account) => {
            let proposal_id = required_str(attrs, "proposal_id")?;
            log::debug!(
                "accepting Direct Connect Gateway Association Proposal ({})",
                proposal_id
            );
            client
                .dxconn
                .accept_gateway_association_proposal(AcceptProposalInput {
                    direct_connect_gateway_id: dx_gateway_id.clone(),
                    proposal_id,
                    associated_gateway_owner_account: owner_account,
                    override_allowed_prefixes: allowed_prefixes,
                })
                .await?
        }
        None => {
            let gateway_id = required_str(attrs, "associated_gateway_id")?;
            log::debug!(
                "creating Direct Connect Gateway Association ({}/{})",
                dx_gateway_id,
                gateway_id
            );
            client
                .dxconn
                .create_gateway_association(CreateGatewayAssociationInput {
                    direct_connect_gateway_id: dx_gateway_id.clone(),
                    gateway_id,
                    add_allowed_prefixes: allowed_prefixes,
                })
                .await?
        }
    };

    let association_id = association.association_id.clone();
    let Some(gateway_id) = association.associated_gateway_id() else {
        return Err(DxError::NotFound(format!(
            "Direct Connect Gateway Association ({}) has no associated gateway",
            association_id
        )));
    };
    let id = gateway_association_create_resource_id(&dx_gateway_id, gateway_id);
    log::info!(
        "created Direct Connect Gateway Association ({}) as {}",
        association_id,
        id
    );

    wait::gateway_association_created(client, &association_id, timeouts.create).await?;

    match find::find_gateway_association_by_id(client, &association_id).await {
        Ok(a) => Ok(to_state(&resource.id, &id, &a)),
        Err(e) => missing(&resource.id, &id, e, true),
    }
}

pub async fn read(client: &AwsClient, prior: &State) -> Result<State> {
    let id = identifier(prior)?;
    let result = match optional_str(&prior.attributes, "dx_gateway_association_id") {
        Some(association_id) => find::find_gateway_association_by_id(client, &association_id).await,
        None => {
            let (dx_gateway_id, gateway_id) = gateway_association_parse_resource_id(id)?;
            find::find_gateway_association_by_gateway_ids(client, &dx_gateway_id, &gateway_id).await
        }
    };
    match result {
        Ok(a) => Ok(to_state(&prior.id, id, &a)),
        Err(e) => missing(&prior.id, id, e, false),
    }
}

fn to_state(id: &ResourceId, identifier: &str, a: &GatewayAssociation) -> State {
    let gateway = a.associated_gateway.as_ref();
    StateBuilder::new()
        .str("dx_gateway_association_id", &a.association_id)
        .opt_str("dx_gateway_id", a.direct_connect_gateway_id.as_deref())
        .opt_str(
            "dx_gateway_owner_account_id",
            a.direct_connect_gateway_owner_account.as_deref(),
        )
        .opt_str("associated_gateway_id", a.associated_gateway_id())
        .opt_str(
            "associated_gateway_type",
            gateway.and_then(|g| g.gateway_type.as_deref()),
        )
        .list("allowed_prefixes", &a.allowed_prefixes)
        .build(id, identifier)
}

/// Prefixes to add and to remove to turn `old` into `new`
fn prefix_changes(old: &[String], new: &[String]) -> (Vec<String>, Vec<String>) {
    let old: BTreeSet<&String> = old.iter().collect();
    let new: BTreeSet<&String> = new.iter().collect();
    let add = new.difference(&old).map(|p| p.to_string()).collect();
    let remove = old.difference(&new).map(|p| p.to_string()).collect();
    (add, remove)
}

pub async fn update(
    client: &AwsClient,
    from: &State,
    to: &Resource,
    timeouts: Timeouts,
) -> Result<State> {
    let association_id = required_str(&from.attributes, "dx_gateway_association_id")?;

    // allowed_prefixes is computed; leaving it out keeps whatever AWS chose
    if to.attributes.contains_key("allowed_prefixes") {
        let (add, remove) = prefix_changes(
            &string_list(&from.attributes, "allowed_prefixes"),
            &string_list(&to.attributes, "allowed_prefixes"),
        );
        if !add.is_empty() || !remove.is_empty() {
            log::debug!(
                "updating Direct Connect Gateway Association ({}): +{:?} -{:?}",
                association_id,
                add,
                remove
            );
            client
                .dxconn
                .update_gateway_association(UpdateGatewayAssociationInput {
                    association_id: association_id.clone(),
                    add_allowed_prefixes: add,
                    remove_allowed_prefixes: remove,
                })
                .await?;
            wait::gateway_association_updated(client, &association_id, timeouts.update).await?;
        }
    }

    let id = identifier(from)?;
    match find::find_gateway_association_by_id(client, &association_id).await {
        Ok(a) => Ok(to_state(&to.id, id, &a)),
        Err(e) => missing(&to.id, id, e, true),
    }
}

pub async fn delete(client: &AwsClient, state: &State, timeouts: Timeouts) -> Result<()> {
    let association_id = required_str(&state.attributes, "dx_gateway_association_id")?;
    log::debug!("deleting Direct Connect Gateway Association ({})", association_id);
    ignore_messages(
        client.dxconn.delete_gateway_association(&association_id).await,
        &[messages::DOES_NOT_EXIST],
    )?;
    wait::gateway_association_deleted(client, &association_id, timeouts.delete).await
}

/// Import by `{dx_gateway_id}/{associated_gateway_id}`
pub async fn import(client: &AwsClient, id: &ResourceId, import_id: &str) -> Result<State> {
    let (dx_gateway_id, gateway_id) = gateway_association_parse_resource_id(import_id)?;
    let association =
        find::find_gateway_association_by_gateway_ids(client, &dx_gateway_id, &gateway_id).await?;
    Ok(to_state(id, import_id, &association))
}
