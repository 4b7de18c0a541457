//! `dx_lag`
//!
//! AWS requires at least one connection to create a LAG. When no existing
//! `connection_id` is given, AWS provisions a placeholder connection with the
//! LAG, and that connection is deleted again right after creation.

use dxform_core::resource::{Resource, ResourceId, State};

use crate::api::{CreateLagInput, Lag};
use crate::arn::lag_arn;
use crate::client::{AwsClient, Timeouts};
use crate::error::{Result, ignore_messages, messages};
use crate::find;
use crate::wait;

use super::attrs::{
    StateBuilder, bool_or, identifier, missing, optional_str, required_str, tags,
};
use super::connection::delete_connection;
use super::tags::update_tags;

pub const CONFIG_ONLY: &[&str] = &["connection_id", "force_destroy", "timeouts"];

pub async fn create(client: &AwsClient, resource: &Resource) -> Result<State> {
    let attrs = &resource.attributes;
    let connection_id = optional_str(attrs, "connection_id");
    let input = CreateLagInput {
        lag_name: required_str(attrs, "name")?,
        location: required_str(attrs, "location")?,
        connections_bandwidth: required_str(attrs, "connections_bandwidth")?,
        number_of_connections: 1,
        connection_id: connection_id.clone(),
        provider_name: optional_str(attrs, "provider_name"),
        tags: tags(attrs),
    };

    log::debug!("creating Direct Connect LAG {}", input.lag_name);
    let lag_id = client.dxconn.create_lag(input).await?;
    log::info!("created Direct Connect LAG ({})", lag_id);

    if connection_id.is_none() {
        let lag = find::find_lag_by_id(client, &lag_id).await?;
        for connection in &lag.connections {
            log::debug!(
                "deleting placeholder connection ({}) of LAG ({})",
                connection.connection_id,
                lag_id
            );
            delete_connection(
                client,
                &connection.connection_id,
                wait::CONNECTION_DELETED_TIMEOUT,
            )
            .await?;
        }
    }

    refresh(client, &resource.id, &lag_id, true).await
}

pub async fn read(client: &AwsClient, prior: &State) -> Result<State> {
    refresh(client, &prior.id, identifier(prior)?, false).await
}

async fn refresh(client: &AwsClient, id: &ResourceId, lag_id: &str, is_new: bool) -> Result<State> {
    match find::find_lag_by_id(client, lag_id).await {
        Ok(lag) => Ok(to_state(client, id, &lag)),
        Err(e) => missing(id, lag_id, e, is_new),
    }
}

fn to_state(client: &AwsClient, id: &ResourceId, lag: &Lag) -> State {
    let region = lag.region.as_deref().unwrap_or(&client.region);
    let account = lag.owner_account.as_deref().unwrap_or_default();
    StateBuilder::new()
        .str("arn", lag_arn(&client.partition, region, account, &lag.lag_id))
        .opt_str("name", lag.lag_name.as_deref())
        .opt_str("connections_bandwidth", lag.connections_bandwidth.as_deref())
        .opt_str("location", lag.location.as_deref())
        .opt_str("owner_account_id", lag.owner_account.as_deref())
        .opt_str("provider_name", lag.provider_name.as_deref())
        .opt_str("has_logical_redundancy", lag.has_logical_redundancy.as_deref())
        .opt_bool("jumbo_frame_capable", lag.jumbo_frame_capable)
        .tags(&lag.tags)
        .build(id, &lag.lag_id)
}

pub async fn update(client: &AwsClient, from: &State, to: &Resource) -> Result<State> {
    let lag_id = identifier(from)?;

    if let Some(name) = optional_str(&to.attributes, "name")
        && Some(name.as_str()) != from.attributes.get("name").and_then(|v| v.as_str())
    {
        log::debug!("renaming Direct Connect LAG ({}) to {}", lag_id, name);
        client.dxconn.update_lag(lag_id, &name).await?;
    }

    let old_tags = tags(&from.attributes);
    let new_tags = tags(&to.attributes);
    if old_tags != new_tags
        && let Some(arn) = from.attributes.get("arn").and_then(|v| v.as_str())
    {
        update_tags(client, arn, &old_tags, &new_tags).await?;
    }

    refresh(client, &to.id, lag_id, true).await
}

pub async fn delete(client: &AwsClient, state: &State, timeouts: Timeouts) -> Result<()> {
    let lag_id = identifier(state)?;

    if bool_or(&state.attributes, "force_destroy", false) {
        match find::find_lag_by_id(client, lag_id).await {
            Ok(lag) => {
                for connection in &lag.connections {
                    delete_connection(
                        client,
                        &connection.connection_id,
                        wait::CONNECTION_DELETED_TIMEOUT,
                    )
                    .await?;
                }
            }
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(e),
        }
    } else if let Some(connection_id) = optional_str(&state.attributes, "connection_id") {
        log::debug!(
            "disassociating Direct Connect Connection ({}) from LAG ({})",
            connection_id,
            lag_id
        );
        ignore_messages(
            client
                .dxconn
                .disassociate_connection_from_lag(&connection_id, lag_id)
                .await,
            &[messages::CONNECTION_HAS_NO_LAG, messages::CONNECTION_NOT_FOUND],
        )?;
    }

    log::debug!("deleting Direct Connect LAG ({})", lag_id);
    ignore_messages(
        client.dxconn.delete_lag(lag_id).await,
        &[messages::LAG_NOT_FOUND],
    )?;
    wait::lag_deleted(client, lag_id, timeouts.delete).await
}
