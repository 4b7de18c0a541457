//! Data sources
//!
//! Lookups by name must match exactly one object; zero or several matches
//! are errors that say which.

use dxform_core::resource::{Resource, State};

use crate::api::{ConnectionState, GatewayState, LagState};
use crate::arn::{connection_arn, lag_arn};
use crate::client::AwsClient;
use crate::error::{DxError, Result};
use crate::find;

use super::attrs::{StateBuilder, required_str};

/// The single match of a lookup, with errors naming what was searched for
fn one<T>(kind: &str, query: &str, items: Vec<T>) -> Result<T> {
    match find::single(items) {
        Err(DxError::EmptyResult) => Err(DxError::NotFound(format!(
            "no Direct Connect {} matched {}",
            kind, query
        ))),
        Err(DxError::TooManyResults(n)) => Err(DxError::Validation(vec![format!(
            "{} Direct Connect {}s matched {}; use a more specific search",
            n, kind, query
        )])),
        other => other,
    }
}

pub async fn connection(client: &AwsClient, resource: &Resource) -> Result<State> {
    let name = required_str(&resource.attributes, "name")?;
    let matches = find::find_connections(client)
        .await?
        .into_iter()
        .filter(|c| c.connection_name.as_deref() == Some(name.as_str()))
        .filter(|c| {
            !matches!(
                c.connection_state,
                ConnectionState::Deleted | ConnectionState::Rejected
            )
        })
        .collect();
    let c = one("Connection", &format!("name {}", name), matches)?;

    let region = c.region.as_deref().unwrap_or(&client.region);
    let account = c.owner_account.as_deref().unwrap_or_default();
    Ok(StateBuilder::new()
        .str("name", name)
        .str(
            "arn",
            connection_arn(&client.partition, region, account, &c.connection_id),
        )
        .opt_str("aws_device", c.aws_device.as_deref())
        .opt_str("bandwidth", c.bandwidth.as_deref())
        .opt_str("location", c.location.as_deref())
        .opt_str("owner_account_id", c.owner_account.as_deref())
        .opt_str("partner_name", c.partner_name.as_deref())
        .opt_str("provider_name", c.provider_name.as_deref())
        .int("vlan_id", i64::from(c.vlan))
        .tags(&c.tags)
        .build(&resource.id, &c.connection_id))
}

pub async fn gateway(client: &AwsClient, resource: &Resource) -> Result<State> {
    let name = required_str(&resource.attributes, "name")?;
    let matches = find::find_gateways(client)
        .await?
        .into_iter()
        .filter(|g| g.direct_connect_gateway_name.as_deref() == Some(name.as_str()))
        .filter(|g| g.direct_connect_gateway_state != GatewayState::Deleted)
        .collect();
    let g = one("Gateway", &format!("name {}", name), matches)?;

    let mut b = StateBuilder::new()
        .str("name", name)
        .opt_str("owner_account_id", g.owner_account.as_deref());
    if let Some(asn) = g.amazon_side_asn {
        b = b.str("amazon_side_asn", asn.to_string());
    }
    Ok(b.build(&resource.id, &g.direct_connect_gateway_id))
}

pub async fn lag(client: &AwsClient, resource: &Resource) -> Result<State> {
    let name = required_str(&resource.attributes, "name")?;
    let matches = find::find_lags(client)
        .await?
        .into_iter()
        .filter(|l| l.lag_name.as_deref() == Some(name.as_str()))
        .filter(|l| l.lag_state != LagState::Deleted)
        .collect();
    let l = one("LAG", &format!("name {}", name), matches)?;

    let region = l.region.as_deref().unwrap_or(&client.region);
    let account = l.owner_account.as_deref().unwrap_or_default();
    Ok(StateBuilder::new()
        .str("name", name)
        .str("arn", lag_arn(&client.partition, region, account, &l.lag_id))
        .opt_str("connections_bandwidth", l.connections_bandwidth.as_deref())
        .opt_str("location", l.location.as_deref())
        .opt_str("owner_account_id", l.owner_account.as_deref())
        .opt_str("provider_name", l.provider_name.as_deref())
        .opt_bool("jumbo_frame_capable", l.jumbo_frame_capable)
        .tags(&l.tags)
        .build(&resource.id, &l.lag_id))
}

pub async fn location(client: &AwsClient, resource: &Resource) -> Result<State> {
    let code = required_str(&resource.attributes, "location_code")?;
    let location = find::find_location_by_code(client, &code).await?;
    Ok(StateBuilder::new()
        .str("location_code", &location.location_code)
        .opt_str("location_name", location.location_name.as_deref())
        .list(
            "available_macsec_port_speeds",
            &location.available_macsec_port_speeds,
        )
        .list("available_port_speeds", &location.available_port_speeds)
        .list("available_providers", &location.available_providers)
        .build(&resource.id, &location.location_code))
}

/// Every location code in the provider's region
pub async fn locations(client: &AwsClient, resource: &Resource) -> Result<State> {
    let codes: Vec<String> = find::find_locations(client)
        .await?
        .into_iter()
        .map(|l| l.location_code)
        .collect();
    Ok(StateBuilder::new()
        .list("location_codes", &codes)
        .build(&resource.id, &client.region))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Location;
    use crate::testing::{self, MockDirectConnect, test_client};
    use dxform_core::resource::Value;

    fn lookup(resource_type: &str, key: &str, value: &str) -> Resource {
        Resource::new(resource_type, "lookup")
            .with_attribute(key, Value::from(value))
            .with_read_only(true)
    }

    fn location_fixture(code: &str) -> Location {
        Location {
            location_code: code.to_string(),
            location_name: Some(format!("{} facility", code)),
            region: Some("us-west-2".to_string()),
            available_port_speeds: vec!["1Gbps".to_string(), "10Gbps".to_string()],
            available_providers: vec!["Equinix".to_string()],
            available_macsec_port_speeds: vec!["10Gbps".to_string()],
        }
    }

    #[tokio::test]
    async fn connection_by_name() {
        let mock = MockDirectConnect::default();
        let mut c = testing::connection("dxcon-1", ConnectionState::Available);
        c.connection_name = Some("primary".to_string());
        mock.put_connection(c);
        mock.put_connection(testing::connection("dxcon-2", ConnectionState::Available));
        let client = test_client(mock);

        let state = connection(&client, &lookup("dx_connection", "name", "primary"))
            .await
            .unwrap();
        assert_eq!(state.identifier.as_deref(), Some("dxcon-1"));
        assert_eq!(state.attributes["bandwidth"], Value::from("1Gbps"));
    }

    #[tokio::test]
    async fn ambiguous_gateway_name_is_an_error() {
        let mock = MockDirectConnect::default();
        for id in ["dxgw-1", "dxgw-2"] {
            let mut g = testing::gateway(id, GatewayState::Available);
            g.direct_connect_gateway_name = Some("shared".to_string());
            mock.put_gateway(g);
        }
        let client = test_client(mock);

        let err = gateway(&client, &lookup("dx_gateway", "name", "shared"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("2 Direct Connect Gateways matched"));
    }

    #[tokio::test]
    async fn missing_lag_is_not_found() {
        let mock = MockDirectConnect::default();
        mock.put_lag(testing::lag("dxlag-1", LagState::Available));
        let client = test_client(mock);

        let err = lag(&client, &lookup("dx_lag", "name", "nope")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn location_and_locations() {
        let mock = MockDirectConnect::default();
        mock.put_location(location_fixture("EqDC2"));
        mock.put_location(location_fixture("CSOW"));
        let client = test_client(mock);

        let state = location(&client, &lookup("dx_location", "location_code", "CSOW"))
            .await
            .unwrap();
        assert_eq!(
            state.attributes["available_macsec_port_speeds"],
            Value::List(vec![Value::from("10Gbps")])
        );

        let all = locations(&client, &Resource::new("dx_locations", "all").with_read_only(true))
            .await
            .unwrap();
        assert_eq!(
            all.attributes["location_codes"],
            Value::List(vec![Value::from("EqDC2"), Value::from("CSOW")])
        );
    }
}
