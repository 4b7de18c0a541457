//! dxform AWS Direct Connect provider
//!
//! Manages Direct Connect connections, LAGs, gateways, gateway associations,
//! virtual interfaces, BGP peers and MACsec keys, plus read-only lookups of
//! connections, gateways, LAGs and locations.

pub mod api;
pub mod arn;
pub mod client;
pub mod config;
pub mod error;
pub mod find;
pub mod id;
pub mod resources;
pub mod schemas;
pub mod sdk;
pub mod status;
pub mod validation;
pub mod wait;

#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use dxform_core::provider::{BoxFuture, Provider, ProviderError, ProviderResult, ResourceType};
use dxform_core::resource::{Resource, ResourceId, State};

use crate::api::DirectConnectApi;
use crate::client::{AwsClient, TimeoutOverrides};
use crate::config::ProviderConfig;
use crate::error::DxError;
use crate::resources::{DataSourceKind, ResourceKind};
use crate::sdk::SdkDirectConnect;

/// AWS Direct Connect provider
pub struct DirectConnectProvider {
    client: AwsClient,
}

impl DirectConnectProvider {
    /// Build a provider from the SDK's credential chain and `config`
    pub async fn new(config: &ProviderConfig) -> Result<Self, DxError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        let region = sdk_config
            .region()
            .map(|r| r.to_string())
            .ok_or_else(|| DxError::MissingAttribute("region".to_string()))?;
        let partition = config.partition(&region);
        log::debug!("using region {} in partition {}", region, partition);

        let client = AwsClient::new(
            Arc::new(SdkDirectConnect::from_conf(&sdk_config)),
            region,
            partition,
        )
        .with_timeouts(TimeoutOverrides::from_config(&config.timeouts)?)
        .with_poll_interval(config.poll_interval()?);

        Ok(Self { client })
    }

    /// Build a provider over any [`DirectConnectApi`] implementation
    pub fn with_api(
        api: Arc<dyn DirectConnectApi>,
        region: impl Into<String>,
        partition: impl Into<String>,
    ) -> Self {
        Self::from_client(AwsClient::new(api, region, partition))
    }

    pub fn from_client(client: AwsClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &AwsClient {
        &self.client
    }

    fn kind(id: &ResourceId) -> ProviderResult<ResourceKind> {
        ResourceKind::from_name(&id.resource_type).ok_or_else(|| {
            ProviderError::new(format!("Unknown resource type: {}", id.resource_type))
                .for_resource(id.clone())
        })
    }

    /// Fill in schema defaults and check the declared attributes
    fn prepare(kind: ResourceKind, resource: &Resource) -> ProviderResult<Resource> {
        let schema = kind.schema();
        let mut resource = resource.clone();
        schema.apply_defaults(&mut resource.attributes);
        schema.validate(&resource.attributes).map_err(|errors| {
            DxError::Validation(errors.iter().map(ToString::to_string).collect())
                .into_provider_error("validation", &resource.id)
        })?;
        Ok(resource)
    }
}

impl Provider for DirectConnectProvider {
    fn name(&self) -> &'static str {
        "aws"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        let mut types: Vec<Box<dyn ResourceType>> = ResourceKind::all()
            .iter()
            .map(|k| Box::new(*k) as Box<dyn ResourceType>)
            .collect();
        types.extend(
            DataSourceKind::all()
                .iter()
                .map(|k| Box::new(*k) as Box<dyn ResourceType>),
        );
        types
    }

    fn read<'a>(&'a self, prior: &'a State) -> BoxFuture<'a, ProviderResult<State>> {
        Box::pin(async move {
            let kind = Self::kind(&prior.id)?;
            if prior.identifier.is_none() {
                return Ok(State::not_found(prior.id.clone()));
            }
            kind.read(&self.client, prior)
                .await
                .map_err(|e| e.into_provider_error("read", &prior.id))
        })
    }

    fn read_data_source<'a>(
        &'a self,
        resource: &'a Resource,
    ) -> BoxFuture<'a, ProviderResult<State>> {
        Box::pin(async move {
            let kind = DataSourceKind::from_name(&resource.id.resource_type).ok_or_else(|| {
                ProviderError::new(format!(
                    "Unknown data source: {}",
                    resource.id.resource_type
                ))
                .for_resource(resource.id.clone())
            })?;
            let schema = kind.schema();
            schema.validate(&resource.attributes).map_err(|errors| {
                DxError::Validation(errors.iter().map(ToString::to_string).collect())
                    .into_provider_error("validation", &resource.id)
            })?;
            kind.read(&self.client, resource)
                .await
                .map_err(|e| e.into_provider_error("read", &resource.id))
        })
    }

    fn create<'a>(&'a self, resource: &'a Resource) -> BoxFuture<'a, ProviderResult<State>> {
        Box::pin(async move {
            let kind = Self::kind(&resource.id)?;
            let resource = Self::prepare(kind, resource)?;
            kind.create(&self.client, &resource)
                .await
                .map_err(|e| e.into_provider_error("create", &resource.id))
        })
    }

    fn update<'a>(
        &'a self,
        from: &'a State,
        to: &'a Resource,
    ) -> BoxFuture<'a, ProviderResult<State>> {
        Box::pin(async move {
            let kind = Self::kind(&to.id)?;
            let to = Self::prepare(kind, to)?;
            kind.update(&self.client, from, &to)
                .await
                .map_err(|e| e.into_provider_error("update", &to.id))
        })
    }

    fn delete<'a>(&'a self, state: &'a State) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(async move {
            let kind = Self::kind(&state.id)?;
            kind.delete(&self.client, state)
                .await
                .map_err(|e| e.into_provider_error("delete", &state.id))
        })
    }

    fn import<'a>(
        &'a self,
        id: &'a ResourceId,
        import_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<State>> {
        Box::pin(async move {
            let kind = Self::kind(id)?;
            kind.import(&self.client, id, import_id)
                .await
                .map_err(|e| e.into_provider_error("import", id))
        })
    }
}
