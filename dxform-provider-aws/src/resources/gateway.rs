//! `dx_gateway`

use dxform_core::resource::{Resource, ResourceId, State};

use crate::api::Gateway;
use crate::arn::gateway_arn;
use crate::client::{AwsClient, Timeouts};
use crate::error::{Result, ignore_messages, messages};
use crate::find;
use crate::wait;

use super::attrs::{StateBuilder, identifier, missing, optional_str, required_int, required_str};

pub async fn create(client: &AwsClient, resource: &Resource, timeouts: Timeouts) -> Result<State> {
    let name = required_str(&resource.attributes, "name")?;
    let asn = required_int(&resource.attributes, "amazon_side_asn")?;

    log::debug!("creating Direct Connect Gateway {} (ASN {})", name, asn);
    let gateway_id = client.dxconn.create_gateway(&name, asn).await?;
    log::info!("created Direct Connect Gateway ({})", gateway_id);

    wait::gateway_created(client, &gateway_id, timeouts.create).await?;
    refresh(client, &resource.id, &gateway_id, true).await
}

pub async fn read(client: &AwsClient, prior: &State) -> Result<State> {
    refresh(client, &prior.id, identifier(prior)?, false).await
}

async fn refresh(client: &AwsClient, id: &ResourceId, gateway_id: &str, is_new: bool) -> Result<State> {
    match find::find_gateway_by_id(client, gateway_id).await {
        Ok(gateway) => Ok(to_state(client, id, &gateway)),
        Err(e) => missing(id, gateway_id, e, is_new),
    }
}

fn to_state(client: &AwsClient, id: &ResourceId, g: &Gateway) -> State {
    let account = g.owner_account.as_deref().unwrap_or_default();
    let mut builder = StateBuilder::new()
        .str(
            "arn",
            gateway_arn(&client.partition, account, &g.direct_connect_gateway_id),
        )
        .opt_str("name", g.direct_connect_gateway_name.as_deref())
        .opt_str("owner_account_id", g.owner_account.as_deref());
    // The ASN is declared as a string to carry 4-byte values
    if let Some(asn) = g.amazon_side_asn {
        builder = builder.str("amazon_side_asn", asn.to_string());
    }
    builder.build(id, &g.direct_connect_gateway_id)
}

pub async fn update(client: &AwsClient, from: &State, to: &Resource) -> Result<State> {
    let gateway_id = identifier(from)?;
    if let Some(name) = optional_str(&to.attributes, "name")
        && Some(name.as_str()) != from.attributes.get("name").and_then(|v| v.as_str())
    {
        log::debug!("renaming Direct Connect Gateway ({}) to {}", gateway_id, name);
        client.dxconn.update_gateway(gateway_id, &name).await?;
    }
    refresh(client, &to.id, gateway_id, true).await
}

pub async fn delete(client: &AwsClient, state: &State, timeouts: Timeouts) -> Result<()> {
    let gateway_id = identifier(state)?;
    log::debug!("deleting Direct Connect Gateway ({})", gateway_id);
    ignore_messages(
        client.dxconn.delete_gateway(gateway_id).await,
        &[messages::DOES_NOT_EXIST],
    )?;
    wait::gateway_deleted(client, gateway_id, timeouts.delete).await
}
