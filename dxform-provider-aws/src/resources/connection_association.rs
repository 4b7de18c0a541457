//! `dx_connection_association`: membership of a connection in a LAG

use dxform_core::resource::{Resource, ResourceId, State};

use crate::client::AwsClient;
use crate::error::{DxError, Result, ignore_messages, messages};
use crate::find;
use crate::id::{connection_association_create_resource_id, connection_association_parse_resource_id};

use super::attrs::{StateBuilder, identifier, missing, required_str};

pub async fn create(client: &AwsClient, resource: &Resource) -> Result<State> {
    let connection_id = required_str(&resource.attributes, "connection_id")?;
    let lag_id = required_str(&resource.attributes, "lag_id")?;

    log::debug!(
        "associating Direct Connect Connection ({}) with LAG ({})",
        connection_id,
        lag_id
    );
    client
        .dxconn
        .associate_connection_with_lag(&connection_id, &lag_id)
        .await?;

    let id = connection_association_create_resource_id(&connection_id, &lag_id);
    refresh(client, &resource.id, &id, true).await
}

pub async fn read(client: &AwsClient, prior: &State) -> Result<State> {
    refresh(client, &prior.id, identifier(prior)?, false).await
}

async fn refresh(client: &AwsClient, id: &ResourceId, association_id: &str, is_new: bool) -> Result<State> {
    let (connection_id, lag_id) = connection_association_parse_resource_id(association_id)?;

    let result = find::find_connection_by_id(client, &connection_id)
        .await
        .and_then(|c| {
            if c.lag_id.as_deref() == Some(lag_id.as_str()) {
                Ok(c)
            } else {
                Err(DxError::NotFound(format!(
                    "Direct Connect Connection ({}) is not a member of LAG ({})",
                    connection_id, lag_id
                )))
            }
        });
    match result {
        Ok(_) => Ok(StateBuilder::new()
            .str("connection_id", connection_id)
            .str("lag_id", lag_id)
            .build(id, association_id)),
        Err(e) => missing(id, association_id, e, is_new),
    }
}

pub async fn delete(client: &AwsClient, state: &State) -> Result<()> {
    let (connection_id, lag_id) = connection_association_parse_resource_id(identifier(state)?)?;
    log::debug!(
        "disassociating Direct Connect Connection ({}) from LAG ({})",
        connection_id,
        lag_id
    );
    ignore_messages(
        client
            .dxconn
            .disassociate_connection_from_lag(&connection_id, &lag_id)
            .await,
        &[messages::CONNECTION_HAS_NO_LAG, messages::CONNECTION_NOT_FOUND],
    )
}
