//! `dx_connection_confirmation`: accept a hosted connection
//!
//! Confirmation cannot be undone, so deleting the resource only forgets it.

use dxform_core::resource::{Resource, ResourceId, State};

use crate::client::{AwsClient, Timeouts};
use crate::error::Result;
use crate::find;
use crate::wait;

use super::attrs::{StateBuilder, identifier, missing, required_str};

pub async fn create(client: &AwsClient, resource: &Resource, timeouts: Timeouts) -> Result<State> {
    let connection_id = required_str(&resource.attributes, "connection_id")?;

    log::debug!("confirming Direct Connect Connection ({})", connection_id);
    client.dxconn.confirm_connection(&connection_id).await?;
    wait::connection_confirmed(client, &connection_id, timeouts.create).await?;

    refresh(client, &resource.id, &connection_id, true).await
}

pub async fn read(client: &AwsClient, prior: &State) -> Result<State> {
    refresh(client, &prior.id, identifier(prior)?, false).await
}

async fn refresh(client: &AwsClient, id: &ResourceId, connection_id: &str, is_new: bool) -> Result<State> {
    match find::find_connection_by_id(client, connection_id).await {
        Ok(c) => Ok(StateBuilder::new()
            .str("connection_id", &c.connection_id)
            .build(id, &c.connection_id)),
        Err(e) => missing(id, connection_id, e, is_new),
    }
}

pub fn delete(state: &State) {
    log::warn!(
        "{} only forgets the confirmation of {}; the connection is left in place",
        state.id,
        state.identifier.as_deref().unwrap_or_default()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ConnectionState;
    use crate::testing::{MockDirectConnect, connection, test_client};
    use dxform_core::resource::Value;

    #[tokio::test]
    async fn confirm_waits_for_available() {
        let mock = MockDirectConnect::default();
        mock.put_connection(connection("dxcon-1", ConnectionState::Ordering));
        // confirm sets available; the first probe still sees ordering
        mock.script("dxcon-1", &["ordering", "available"]);
        let client = test_client(mock.clone());

        let resource = Resource::new("dx_connection_confirmation", "c")
            .with_attribute("connection_id", Value::from("dxcon-1"));
        let state = create(&client, &resource, Timeouts::minutes(1, 1, 1))
            .await
            .unwrap();

        assert_eq!(state.identifier.as_deref(), Some("dxcon-1"));
        assert_eq!(mock.call_count("ConfirmConnection"), 1);
    }

    #[tokio::test]
    async fn confirming_a_missing_connection_fails() {
        let mock = MockDirectConnect::default();
        let client = test_client(mock);
        let resource = Resource::new("dx_connection_confirmation", "c")
            .with_attribute("connection_id", Value::from("dxcon-404"));
        assert!(create(&client, &resource, Timeouts::minutes(1, 1, 1)).await.is_err());
    }
}
