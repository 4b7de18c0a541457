//! `dx_connection`

use dxform_core::resource::{Resource, ResourceId, State};

use crate::api::{Connection, CreateConnectionInput, UpdateConnectionInput};
use crate::arn::connection_arn;
use crate::client::{AwsClient, Timeouts};
use crate::error::{Result, ignore_messages, messages};
use crate::find;
use crate::wait;

use super::attrs::{
    StateBuilder, bool_or, identifier, missing, optional_str, required_str, tags,
};
use super::tags::update_tags;

pub const CONFIG_ONLY: &[&str] = &["request_macsec", "skip_destroy", "timeouts"];

pub async fn create(client: &AwsClient, resource: &Resource) -> Result<State> {
    let attrs = &resource.attributes;
    let input = CreateConnectionInput {
        connection_name: required_str(attrs, "name")?,
        bandwidth: required_str(attrs, "bandwidth")?,
        location: required_str(attrs, "location")?,
        lag_id: None,
        provider_name: optional_str(attrs, "provider_name"),
        request_macsec: bool_or(attrs, "request_macsec", false),
        tags: tags(attrs),
    };

    log::debug!("creating Direct Connect Connection {}", input.connection_name);
    let connection_id = client.dxconn.create_connection(input).await?;
    log::info!("created Direct Connect Connection ({})", connection_id);

    // A new connection is still being provisioned, so the mode is applied
    // without waiting for it to settle.
    if let Some(mode) = optional_str(attrs, "encryption_mode") {
        client
            .dxconn
            .update_connection(UpdateConnectionInput {
                connection_id: connection_id.clone(),
                connection_name: None,
                encryption_mode: Some(mode),
            })
            .await?;
    }

    refresh(client, &resource.id, &connection_id, true).await
}

pub async fn read(client: &AwsClient, prior: &State) -> Result<State> {
    refresh(client, &prior.id, identifier(prior)?, false).await
}

async fn refresh(
    client: &AwsClient,
    id: &ResourceId,
    connection_id: &str,
    is_new: bool,
) -> Result<State> {
    match find::find_connection_by_id(client, connection_id).await {
        Ok(connection) => Ok(to_state(client, id, &connection)),
        Err(e) => missing(id, connection_id, e, is_new),
    }
}

fn to_state(client: &AwsClient, id: &ResourceId, c: &Connection) -> State {
    let region = c.region.as_deref().unwrap_or(&client.region);
    let account = c.owner_account.as_deref().unwrap_or_default();
    StateBuilder::new()
        .str(
            "arn",
            connection_arn(&client.partition, region, account, &c.connection_id),
        )
        .opt_str("name", c.connection_name.as_deref())
        .opt_str("bandwidth", c.bandwidth.as_deref())
        .opt_str("location", c.location.as_deref())
        .opt_str("aws_device", c.aws_device.as_deref())
        .opt_str("has_logical_redundancy", c.has_logical_redundancy.as_deref())
        .opt_bool("jumbo_frame_capable", c.jumbo_frame_capable)
        .opt_bool("macsec_capable", c.macsec_capable)
        .opt_str("encryption_mode", c.encryption_mode.as_deref())
        .opt_str("port_encryption_status", c.port_encryption_status.as_deref())
        .opt_str("owner_account_id", c.owner_account.as_deref())
        .opt_str("partner_name", c.partner_name.as_deref())
        .opt_str("provider_name", c.provider_name.as_deref())
        .int("vlan_id", i64::from(c.vlan))
        .tags(&c.tags)
        .build(id, &c.connection_id)
}

pub async fn update(
    client: &AwsClient,
    from: &State,
    to: &Resource,
    timeouts: Timeouts,
) -> Result<State> {
    let connection_id = identifier(from)?;
    let name = optional_str(&to.attributes, "name")
        .filter(|n| Some(n.as_str()) != from.attributes.get("name").and_then(|v| v.as_str()));
    let encryption_mode = optional_str(&to.attributes, "encryption_mode").filter(|m| {
        Some(m.as_str()) != from.attributes.get("encryption_mode").and_then(|v| v.as_str())
    });

    if name.is_some() || encryption_mode.is_some() {
        let wait_for_mode = encryption_mode.is_some();
        log::debug!("updating Direct Connect Connection ({})", connection_id);
        client
            .dxconn
            .update_connection(UpdateConnectionInput {
                connection_id: connection_id.to_string(),
                connection_name: name,
                encryption_mode,
            })
            .await?;
        if wait_for_mode {
            wait::connection_confirmed(client, connection_id, timeouts.update).await?;
        }
    }

    let old_tags = tags(&from.attributes);
    let new_tags = tags(&to.attributes);
    if old_tags != new_tags
        && let Some(arn) = from.attributes.get("arn").and_then(|v| v.as_str())
    {
        update_tags(client, arn, &old_tags, &new_tags).await?;
    }

    refresh(client, &to.id, connection_id, true).await
}

pub async fn delete(client: &AwsClient, state: &State, timeouts: Timeouts) -> Result<()> {
    let connection_id = identifier(state)?;
    if bool_or(&state.attributes, "skip_destroy", false) {
        log::info!(
            "retaining Direct Connect Connection ({}) because skip_destroy is set",
            connection_id
        );
        return Ok(());
    }
    delete_connection(client, connection_id, timeouts.delete).await
}

/// Delete a connection and wait until it is gone
pub(crate) async fn delete_connection(
    client: &AwsClient,
    connection_id: &str,
    timeout: std::time::Duration,
) -> Result<()> {
    log::debug!("deleting Direct Connect Connection ({})", connection_id);
    ignore_messages(
        client.dxconn.delete_connection(connection_id).await,
        &[messages::CONNECTION_NOT_FOUND],
    )?;
    wait::connection_deleted(client, connection_id, timeout).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ConnectionState;
    use crate::testing::{ACCOUNT_ID, MockDirectConnect, connection, test_client};
    use dxform_core::resource::Value;

    fn declared() -> Resource {
        Resource::new("dx_connection", "primary")
            .with_attribute("name", Value::from("tf-dx-connection"))
            .with_attribute("bandwidth", Value::from("1Gbps"))
            .with_attribute("location", Value::from("EqDC2"))
    }

    #[tokio::test]
    async fn create_reads_back_the_connection() {
        let mock = MockDirectConnect::default();
        let client = test_client(mock.clone());

        let state = create(&client, &declared()).await.unwrap();

        let id = state.identifier.clone().unwrap();
        assert!(state.exists);
        assert_eq!(state.attributes["bandwidth"], Value::from("1Gbps"));
        assert_eq!(state.attributes["name"], Value::from("tf-dx-connection"));
        assert_eq!(
            state.attributes["arn"],
            Value::from(format!(
                "arn:aws:directconnect:us-west-2:{}:dxcon/{}",
                ACCOUNT_ID, id
            ))
        );
        assert_eq!(mock.call_count("UpdateConnection"), 0);
    }

    #[tokio::test]
    async fn create_applies_encryption_mode() {
        let mock = MockDirectConnect::default();
        let client = test_client(mock.clone());
        let resource = declared().with_attribute("encryption_mode", Value::from("must_encrypt"));

        let state = create(&client, &resource).await.unwrap();

        assert_eq!(state.attributes["encryption_mode"], Value::from("must_encrypt"));
        assert_eq!(mock.call_count("UpdateConnection"), 1);
    }

    #[tokio::test]
    async fn read_drops_deleted_connection() {
        let mock = MockDirectConnect::default();
        mock.put_connection(connection("dxcon-1", ConnectionState::Deleted));
        let client = test_client(mock);

        let prior = State::existing(ResourceId::new("dx_connection", "primary"), Default::default())
            .with_identifier("dxcon-1");
        let state = read(&client, &prior).await.unwrap();
        assert!(!state.exists);
    }

    #[tokio::test]
    async fn update_encryption_mode_waits_for_confirmation() {
        let mock = MockDirectConnect::default();
        mock.put_connection(connection("dxcon-1", ConnectionState::Available));
        mock.script("dxcon-1", &["pending", "available"]);
        let client = test_client(mock.clone());

        let from = to_state(
            &client,
            &ResourceId::new("dx_connection", "primary"),
            &mock.connection("dxcon-1").unwrap(),
        );
        let to = declared()
            .with_attribute("name", Value::from("dxcon-1-name"))
            .with_attribute("encryption_mode", Value::from("should_encrypt"));

        let state = update(&client, &from, &to, Timeouts::minutes(1, 1, 1))
            .await
            .unwrap();

        assert_eq!(state.attributes["encryption_mode"], Value::from("should_encrypt"));
        assert_eq!(mock.call_count("UpdateConnection"), 1);
        assert!(mock.call_count("DescribeConnections") >= 3);
    }

    #[tokio::test]
    async fn skip_destroy_leaves_connection_in_place() {
        let mock = MockDirectConnect::default();
        mock.put_connection(connection("dxcon-1", ConnectionState::Available));
        let client = test_client(mock.clone());

        let mut state = State::existing(ResourceId::new("dx_connection", "primary"), Default::default())
            .with_identifier("dxcon-1");
        state
            .attributes
            .insert("skip_destroy".to_string(), Value::Bool(true));

        delete(&client, &state, Timeouts::minutes(1, 1, 1)).await.unwrap();
        assert_eq!(mock.call_count("DeleteConnection"), 0);
        assert_eq!(
            mock.connection("dxcon-1").unwrap().connection_state,
            ConnectionState::Available
        );
    }

    #[tokio::test]
    async fn delete_tolerates_missing_connection() {
        let mock = MockDirectConnect::default();
        let client = test_client(mock.clone());
        let state = State::existing(ResourceId::new("dx_connection", "primary"), Default::default())
            .with_identifier("dxcon-404");

        delete(&client, &state, Timeouts::minutes(1, 1, 1)).await.unwrap();
        assert_eq!(mock.call_count("DeleteConnection"), 1);
    }
}
