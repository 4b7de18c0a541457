//! `dx_gateway_association_proposal`
//!
//! A proposal disappears once the gateway owner accepts it. As long as the
//! association it asked for exists, the proposal is kept in state so that
//! accepting it does not cause a replacement.

use dxform_core::resource::{Resource, ResourceId, State};

use crate::api::{CreateProposalInput, GatewayAssociationProposal};
use crate::client::AwsClient;
use crate::error::{DxError, Result, ignore_messages, messages};
use crate::find;

use super::attrs::{StateBuilder, identifier, missing, optional_str, required_str, string_list};

pub async fn create(client: &AwsClient, resource: &Resource) -> Result<State> {
    let attrs = &resource.attributes;
    let input = CreateProposalInput {
        direct_connect_gateway_id: required_str(attrs, "dx_gateway_id")?,
        direct_connect_gateway_owner_account: required_str(attrs, "dx_gateway_owner_account_id")?,
        gateway_id: required_str(attrs, "associated_gateway_id")?,
        add_allowed_prefixes: string_list(attrs, "allowed_prefixes"),
    };

    log::debug!(
        "creating Direct Connect Gateway Association Proposal ({}/{})",
        input.direct_connect_gateway_id,
        input.gateway_id
    );
    let proposal_id = client
        .dxconn
        .create_gateway_association_proposal(input)
        .await?;
    log::info!(
        "created Direct Connect Gateway Association Proposal ({})",
        proposal_id
    );

    match find::find_gateway_association_proposal_by_id(client, &proposal_id).await {
        Ok(p) => Ok(to_state(&resource.id, &p)),
        Err(e) => missing(&resource.id, &proposal_id, e, true),
    }
}

pub async fn read(client: &AwsClient, prior: &State) -> Result<State> {
    let proposal_id = identifier(prior)?;
    match find::find_gateway_association_proposal_by_id(client, proposal_id).await {
        Ok(p) => Ok(to_state(&prior.id, &p)),
        Err(e) if e.is_not_found() => {
            let dx_gateway_id = optional_str(&prior.attributes, "dx_gateway_id");
            let gateway_id = optional_str(&prior.attributes, "associated_gateway_id");
            let (Some(dx_gateway_id), Some(gateway_id)) = (dx_gateway_id, gateway_id) else {
                return missing(&prior.id, proposal_id, e, false);
            };
            match find::find_gateway_association_by_gateway_ids(client, &dx_gateway_id, &gateway_id)
                .await
            {
                Ok(_) => {
                    log::debug!(
                        "Direct Connect Gateway Association Proposal ({}) was accepted; keeping state",
                        proposal_id
                    );
                    Ok(prior.clone())
                }
                Err(e) => missing(&prior.id, proposal_id, e, false),
            }
        }
        Err(e) => Err(e),
    }
}

fn to_state(id: &ResourceId, p: &GatewayAssociationProposal) -> State {
    let gateway = p.associated_gateway.as_ref();
    StateBuilder::new()
        .opt_str("dx_gateway_id", p.direct_connect_gateway_id.as_deref())
        .opt_str(
            "dx_gateway_owner_account_id",
            p.direct_connect_gateway_owner_account.as_deref(),
        )
        .opt_str("associated_gateway_id", gateway.and_then(|g| g.id.as_deref()))
        .opt_str(
            "associated_gateway_owner_account_id",
            gateway.and_then(|g| g.owner_account.as_deref()),
        )
        .opt_str(
            "associated_gateway_type",
            gateway.and_then(|g| g.gateway_type.as_deref()),
        )
        .list("allowed_prefixes", &p.requested_allowed_prefixes)
        .build(id, &p.proposal_id)
}

pub async fn delete(client: &AwsClient, state: &State) -> Result<()> {
    let proposal_id = identifier(state)?;
    log::debug!(
        "deleting Direct Connect Gateway Association Proposal ({})",
        proposal_id
    );
    ignore_messages(
        client
            .dxconn
            .delete_gateway_association_proposal(proposal_id)
            .await,
        &[messages::PROPOSAL_NOT_FOUND],
    )
}

/// Import by proposal ID, or by `{proposal_id}/{dx_gateway_id}/{associated_gateway_id}`
/// for proposals that were already accepted
pub async fn import(client: &AwsClient, id: &ResourceId, import_id: &str) -> Result<State> {
    let parts: Vec<&str> = import_id.split('/').collect();
    let prior = match parts.as_slice() {
        [proposal_id] if !proposal_id.is_empty() => {
            State::existing(id.clone(), Default::default()).with_identifier(*proposal_id)
        }
        [proposal_id, dx_gateway_id, gateway_id]
            if parts.iter().all(|p| !p.is_empty()) =>
        {
            StateBuilder::new()
                .str("dx_gateway_id", *dx_gateway_id)
                .str("associated_gateway_id", *gateway_id)
                .build(id, *proposal_id)
        }
        _ => {
            return Err(DxError::InvalidId {
                id: import_id.to_string(),
                message: "expected PROPOSAL-ID or PROPOSAL-ID/DX-GATEWAY-ID/ASSOCIATED-GATEWAY-ID"
                    .to_string(),
            });
        }
    };

    let state = read(client, &prior).await?;
    if !state.exists {
        return Err(DxError::NotFound(format!(
            "Direct Connect Gateway Association Proposal ({}) not found",
            import_id
        )));
    }
    Ok(state)
}
