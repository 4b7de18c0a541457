//! `dx_macsec_key_association`
//!
//! The key is given either as a Secrets Manager secret or as a CKN/CAK pair,
//! which AWS stores in a new secret. Either way the association is keyed by
//! the secret ARN and the connection ID.

use dxform_core::resource::{Resource, ResourceId, State};

use crate::api::MacSecKey;
use crate::client::AwsClient;
use crate::error::{DxError, Result, ignore_messages, messages};
use crate::find;
use crate::id::{macsec_key_association_create_resource_id, macsec_key_association_parse_resource_id};

use super::attrs::{StateBuilder, identifier, missing, optional_str, required_str};

pub const CONFIG_ONLY: &[&str] = &["cak", "timeouts"];

pub async fn create(client: &AwsClient, resource: &Resource) -> Result<State> {
    let attrs = &resource.attributes;
    let connection_id = required_str(attrs, "connection_id")?;
    let secret_arn = optional_str(attrs, "secret_arn");
    let ckn = optional_str(attrs, "ckn");
    let cak = optional_str(attrs, "cak");

    log::debug!(
        "associating MACsec key with Direct Connect Connection ({})",
        connection_id
    );
    let association = client
        .dxconn
        .associate_macsec_key(
            &connection_id,
            secret_arn.as_deref(),
            ckn.as_deref(),
            cak.as_deref(),
        )
        .await?;

    let key = association
        .keys
        .iter()
        .find(|k| match (&secret_arn, &ckn) {
            (Some(arn), _) => k.secret_arn.as_ref() == Some(arn),
            (None, Some(ckn)) => k.ckn.as_ref() == Some(ckn),
            (None, None) => false,
        })
        .and_then(|k| k.secret_arn.clone())
        .ok_or_else(|| {
            DxError::NotFound(format!(
                "MACsec key association response for {} has no matching key",
                connection_id
            ))
        })?;

    let id = macsec_key_association_create_resource_id(&key, &connection_id);
    log::info!("associated MACsec key {}", id);
    refresh(client, &resource.id, &id, true).await
}

pub async fn read(client: &AwsClient, prior: &State) -> Result<State> {
    refresh(client, &prior.id, identifier(prior)?, false).await
}

async fn refresh(client: &AwsClient, id: &ResourceId, association_id: &str, is_new: bool) -> Result<State> {
    let (secret_arn, connection_id) = macsec_key_association_parse_resource_id(association_id)?;
    match find::find_macsec_key(client, &connection_id, &secret_arn).await {
        Ok(key) => Ok(to_state(id, association_id, &connection_id, &key)),
        Err(e) => missing(id, association_id, e, is_new),
    }
}

fn to_state(id: &ResourceId, association_id: &str, connection_id: &str, key: &MacSecKey) -> State {
    StateBuilder::new()
        .str("connection_id", connection_id)
        .opt_str("secret_arn", key.secret_arn.as_deref())
        .opt_str("ckn", key.ckn.as_deref())
        .opt_str("start_on", key.start_on.as_deref())
        .opt_str("state", key.state.as_deref())
        .build(id, association_id)
}

pub async fn delete(client: &AwsClient, state: &State) -> Result<()> {
    let (secret_arn, connection_id) = macsec_key_association_parse_resource_id(identifier(state)?)?;
    log::debug!(
        "disassociating MACsec key {} from Direct Connect Connection ({})",
        secret_arn,
        connection_id
    );
    ignore_messages(
        client
            .dxconn
            .disassociate_macsec_key(&connection_id, &secret_arn)
            .await,
        messages::NOT_FOUND,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ConnectionState;
    use crate::testing::{MockDirectConnect, connection, test_client};
    use dxform_core::resource::Value;

    fn mock_with_connection() -> MockDirectConnect {
        let mock = MockDirectConnect::default();
        let mut conn = connection("dxcon-1", ConnectionState::Available);
        conn.macsec_capable = Some(true);
        mock.put_connection(conn);
        mock
    }

    #[tokio::test]
    async fn ckn_and_cak_resolve_to_the_stored_secret() {
        let mock = mock_with_connection();
        let client = test_client(mock.clone());
        let ckn = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

        let resource = Resource::new("dx_macsec_key_association", "k")
            .with_attribute("connection_id", Value::from("dxcon-1"))
            .with_attribute("ckn", Value::from(ckn))
            .with_attribute("cak", Value::from("abcdef0123456789abcdef0123456789"));

        let state = create(&client, &resource).await.unwrap();

        let arn = format!(
            "arn:aws:secretsmanager:us-west-2:123456789012:secret:directconnect!{}",
            ckn
        );
        assert_eq!(
            state.identifier.as_deref(),
            Some(format!("{}_dxcon-1", arn).as_str())
        );
        assert_eq!(state.attributes["secret_arn"], Value::from(arn));
        assert_eq!(state.attributes["state"], Value::from("associated"));
        assert!(!state.attributes.contains_key("cak"));

        delete(&client, &state).await.unwrap();
        assert!(mock.connection("dxcon-1").unwrap().macsec_keys.is_empty());
        assert!(!read(&client, &state).await.unwrap().exists);
    }

    #[tokio::test]
    async fn secret_arn_is_used_as_given() {
        let mock = mock_with_connection();
        let client = test_client(mock);
        let arn = "arn:aws:secretsmanager:us-west-2:123456789012:secret:my_key-AbCdEf";

        let resource = Resource::new("dx_macsec_key_association", "k")
            .with_attribute("connection_id", Value::from("dxcon-1"))
            .with_attribute("secret_arn", Value::from(arn));

        let state = create(&client, &resource).await.unwrap();
        assert_eq!(state.attributes["secret_arn"], Value::from(arn));
        assert_eq!(state.attributes["connection_id"], Value::from("dxcon-1"));
    }
}
