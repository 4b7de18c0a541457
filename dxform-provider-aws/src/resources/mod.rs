//! Direct Connect resources
//!
//! [`ResourceKind`] names every managed resource type and dispatches to the
//! handler module that implements it. Handlers share one calling convention,
//! and those that wait also take the effective [`Timeouts`]:
//!
//! - `create(client, resource)` issues the create call, waits for the object
//!   to settle, then reads it back (missing is an error here)
//! - `read(client, prior)` refreshes state; a missing object yields
//!   `State::not_found`
//! - `update(client, from, to)` applies in-place changes
//! - `delete(client, state)` tolerates already-deleted objects
//!
//! [`DataSourceKind`] does the same for read-only lookups.

pub mod attrs;
pub mod bgp_peer;
pub mod connection;
pub mod connection_association;
pub mod connection_confirmation;
pub mod data_sources;
pub mod gateway;
pub mod gateway_association;
pub mod gateway_association_proposal;
pub mod lag;
pub mod macsec_key_association;
pub mod tags;
pub mod virtual_interface;

use dxform_core::provider::ResourceType;
use dxform_core::resource::{Resource, ResourceId, State};
use dxform_core::schema::ResourceSchema;

use crate::api::VirtualInterfaceType;
use crate::client::{AwsClient, Timeouts};
use crate::error::Result;
use crate::schemas;

/// Kind of virtual interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VifKind {
    Private,
    Public,
    Transit,
}

impl VifKind {
    pub fn interface_type(self) -> VirtualInterfaceType {
        match self {
            VifKind::Private => VirtualInterfaceType::Private,
            VifKind::Public => VirtualInterfaceType::Public,
            VifKind::Transit => VirtualInterfaceType::Transit,
        }
    }
}

/// Which account's view of a virtual interface a resource manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VifRole {
    /// Created by and for the connection owner
    Owned,
    /// Allocated by the connection owner for another account
    Hosted,
    /// Accepted by the account a hosted interface was allocated to
    Accepter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Connection,
    ConnectionAssociation,
    ConnectionConfirmation,
    Lag,
    Gateway,
    GatewayAssociation,
    GatewayAssociationProposal,
    VirtualInterface(VifKind, VifRole),
    BgpPeer,
    MacSecKeyAssociation,
}

const ALL_RESOURCES: [ResourceKind; 18] = [
    ResourceKind::Connection,
    ResourceKind::ConnectionAssociation,
    ResourceKind::ConnectionConfirmation,
    ResourceKind::Lag,
    ResourceKind::Gateway,
    ResourceKind::GatewayAssociation,
    ResourceKind::GatewayAssociationProposal,
    ResourceKind::VirtualInterface(VifKind::Private, VifRole::Owned),
    ResourceKind::VirtualInterface(VifKind::Public, VifRole::Owned),
    ResourceKind::VirtualInterface(VifKind::Transit, VifRole::Owned),
    ResourceKind::VirtualInterface(VifKind::Private, VifRole::Hosted),
    ResourceKind::VirtualInterface(VifKind::Public, VifRole::Hosted),
    ResourceKind::VirtualInterface(VifKind::Transit, VifRole::Hosted),
    ResourceKind::VirtualInterface(VifKind::Private, VifRole::Accepter),
    ResourceKind::VirtualInterface(VifKind::Public, VifRole::Accepter),
    ResourceKind::VirtualInterface(VifKind::Transit, VifRole::Accepter),
    ResourceKind::BgpPeer,
    ResourceKind::MacSecKeyAssociation,
];

impl ResourceKind {
    pub fn all() -> &'static [ResourceKind] {
        &ALL_RESOURCES
    }

    pub fn name(&self) -> &'static str {
        use VifKind::*;
        use VifRole::*;
        match self {
            ResourceKind::Connection => "dx_connection",
            ResourceKind::ConnectionAssociation => "dx_connection_association",
            ResourceKind::ConnectionConfirmation => "dx_connection_confirmation",
            ResourceKind::Lag => "dx_lag",
            ResourceKind::Gateway => "dx_gateway",
            ResourceKind::GatewayAssociation => "dx_gateway_association",
            ResourceKind::GatewayAssociationProposal => "dx_gateway_association_proposal",
            ResourceKind::VirtualInterface(Private, Owned) => "dx_private_virtual_interface",
            ResourceKind::VirtualInterface(Public, Owned) => "dx_public_virtual_interface",
            ResourceKind::VirtualInterface(Transit, Owned) => "dx_transit_virtual_interface",
            ResourceKind::VirtualInterface(Private, Hosted) => {
                "dx_hosted_private_virtual_interface"
            }
            ResourceKind::VirtualInterface(Public, Hosted) => "dx_hosted_public_virtual_interface",
            ResourceKind::VirtualInterface(Transit, Hosted) => {
                "dx_hosted_transit_virtual_interface"
            }
            ResourceKind::VirtualInterface(Private, Accepter) => {
                "dx_hosted_private_virtual_interface_accepter"
            }
            ResourceKind::VirtualInterface(Public, Accepter) => {
                "dx_hosted_public_virtual_interface_accepter"
            }
            ResourceKind::VirtualInterface(Transit, Accepter) => {
                "dx_hosted_transit_virtual_interface_accepter"
            }
            ResourceKind::BgpPeer => "dx_bgp_peer",
            ResourceKind::MacSecKeyAssociation => "dx_macsec_key_association",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name)
    }

    pub fn schema(&self) -> ResourceSchema {
        match self {
            ResourceKind::Connection => schemas::connection::connection(),
            ResourceKind::ConnectionAssociation => schemas::connection::connection_association(),
            ResourceKind::ConnectionConfirmation => {
                schemas::connection::connection_confirmation()
            }
            ResourceKind::Lag => schemas::connection::lag(),
            ResourceKind::Gateway => schemas::gateway::gateway(),
            ResourceKind::GatewayAssociation => schemas::gateway::gateway_association(),
            ResourceKind::GatewayAssociationProposal => {
                schemas::gateway::gateway_association_proposal()
            }
            ResourceKind::VirtualInterface(kind, role) => {
                schemas::virtual_interface::virtual_interface(*kind, *role)
            }
            ResourceKind::BgpPeer => schemas::virtual_interface::bgp_peer(),
            ResourceKind::MacSecKeyAssociation => schemas::macsec::macsec_key_association(),
        }
    }

    pub fn default_timeouts(&self) -> Timeouts {
        match self {
            ResourceKind::GatewayAssociation => Timeouts::minutes(30, 30, 30),
            _ => Timeouts::minutes(10, 10, 10),
        }
    }

    /// Declared attributes that no read can recover; they are kept in state
    /// as configured
    pub fn config_only(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Connection => connection::CONFIG_ONLY,
            ResourceKind::Lag => lag::CONFIG_ONLY,
            ResourceKind::GatewayAssociation => gateway_association::CONFIG_ONLY,
            ResourceKind::MacSecKeyAssociation => macsec_key_association::CONFIG_ONLY,
            _ => &["timeouts"],
        }
    }

    pub async fn create(&self, client: &AwsClient, resource: &Resource) -> Result<State> {
        let timeouts = client.timeouts(self.default_timeouts(), &resource.attributes)?;
        let mut state = match self {
            ResourceKind::Connection => connection::create(client, resource).await,
            ResourceKind::ConnectionAssociation => {
                connection_association::create(client, resource).await
            }
            ResourceKind::ConnectionConfirmation => {
                connection_confirmation::create(client, resource, timeouts).await
            }
            ResourceKind::Lag => lag::create(client, resource).await,
            ResourceKind::Gateway => gateway::create(client, resource, timeouts).await,
            ResourceKind::GatewayAssociation => {
                gateway_association::create(client, resource, timeouts).await
            }
            ResourceKind::GatewayAssociationProposal => {
                gateway_association_proposal::create(client, resource).await
            }
            ResourceKind::VirtualInterface(kind, role) => {
                virtual_interface::create(client, *kind, *role, resource, timeouts).await
            }
            ResourceKind::BgpPeer => bgp_peer::create(client, resource, timeouts).await,
            ResourceKind::MacSecKeyAssociation => {
                macsec_key_association::create(client, resource).await
            }
        }?;
        attrs::carry(&mut state, &resource.attributes, self.config_only());
        Ok(state)
    }

    pub async fn read(&self, client: &AwsClient, prior: &State) -> Result<State> {
        let mut state = match self {
            ResourceKind::Connection => connection::read(client, prior).await,
            ResourceKind::ConnectionAssociation => {
                connection_association::read(client, prior).await
            }
            ResourceKind::ConnectionConfirmation => {
                connection_confirmation::read(client, prior).await
            }
            ResourceKind::Lag => lag::read(client, prior).await,
            ResourceKind::Gateway => gateway::read(client, prior).await,
            ResourceKind::GatewayAssociation => gateway_association::read(client, prior).await,
            ResourceKind::GatewayAssociationProposal => {
                gateway_association_proposal::read(client, prior).await
            }
            ResourceKind::VirtualInterface(kind, role) => {
                virtual_interface::read(client, *kind, *role, prior).await
            }
            ResourceKind::BgpPeer => bgp_peer::read(client, prior).await,
            ResourceKind::MacSecKeyAssociation => {
                macsec_key_association::read(client, prior).await
            }
        }?;
        if state.exists {
            attrs::carry(&mut state, &prior.attributes, self.config_only());
        }
        Ok(state)
    }

    pub async fn update(&self, client: &AwsClient, from: &State, to: &Resource) -> Result<State> {
        let timeouts = client.timeouts(self.default_timeouts(), &to.attributes)?;
        let mut state = match self {
            ResourceKind::Connection => connection::update(client, from, to, timeouts).await,
            ResourceKind::Lag => lag::update(client, from, to).await,
            ResourceKind::Gateway => gateway::update(client, from, to).await,
            ResourceKind::GatewayAssociation => {
                gateway_association::update(client, from, to, timeouts).await
            }
            ResourceKind::VirtualInterface(kind, role) => {
                virtual_interface::update(client, *kind, *role, from, to, timeouts).await
            }
            // Everything else is replaced on change; only local settings such
            // as timeouts can differ here
            _ => self.read(client, from).await,
        }?;
        for name in self.config_only() {
            match to.attributes.get(*name) {
                Some(value) => {
                    state.attributes.insert(name.to_string(), value.clone());
                }
                None => {
                    state.attributes.remove(*name);
                }
            }
        }
        Ok(state)
    }

    pub async fn delete(&self, client: &AwsClient, state: &State) -> Result<()> {
        let timeouts = client.timeouts(self.default_timeouts(), &state.attributes)?;
        match self {
            ResourceKind::Connection => connection::delete(client, state, timeouts).await,
            ResourceKind::ConnectionAssociation => {
                connection_association::delete(client, state).await
            }
            ResourceKind::ConnectionConfirmation => {
                connection_confirmation::delete(state);
                Ok(())
            }
            ResourceKind::Lag => lag::delete(client, state, timeouts).await,
            ResourceKind::Gateway => gateway::delete(client, state, timeouts).await,
            ResourceKind::GatewayAssociation => {
                gateway_association::delete(client, state, timeouts).await
            }
            ResourceKind::GatewayAssociationProposal => {
                gateway_association_proposal::delete(client, state).await
            }
            ResourceKind::VirtualInterface(kind, role) => {
                virtual_interface::delete(client, *kind, *role, state, timeouts).await
            }
            ResourceKind::BgpPeer => bgp_peer::delete(client, state, timeouts).await,
            ResourceKind::MacSecKeyAssociation => {
                macsec_key_association::delete(client, state).await
            }
        }
    }

    pub async fn import(
        &self,
        client: &AwsClient,
        id: &ResourceId,
        import_id: &str,
    ) -> Result<State> {
        match self {
            ResourceKind::GatewayAssociation => {
                gateway_association::import(client, id, import_id).await
            }
            ResourceKind::GatewayAssociationProposal => {
                gateway_association_proposal::import(client, id, import_id).await
            }
            _ => {
                let prior = State::existing(id.clone(), Default::default())
                    .with_identifier(import_id);
                let state = self.read(client, &prior).await?;
                if !state.exists {
                    return Err(crate::error::DxError::NotFound(format!(
                        "cannot import non-existent remote object {} ({})",
                        self.name(),
                        import_id
                    )));
                }
                Ok(state)
            }
        }
    }
}

impl ResourceType for ResourceKind {
    fn name(&self) -> &'static str {
        ResourceKind::name(self)
    }

    fn schema(&self) -> ResourceSchema {
        ResourceKind::schema(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSourceKind {
    Connection,
    Gateway,
    Lag,
    Location,
    Locations,
}

const ALL_DATA_SOURCES: [DataSourceKind; 5] = [
    DataSourceKind::Connection,
    DataSourceKind::Gateway,
    DataSourceKind::Lag,
    DataSourceKind::Location,
    DataSourceKind::Locations,
];

impl DataSourceKind {
    pub fn all() -> &'static [DataSourceKind] {
        &ALL_DATA_SOURCES
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataSourceKind::Connection => "dx_connection",
            DataSourceKind::Gateway => "dx_gateway",
            DataSourceKind::Lag => "dx_lag",
            DataSourceKind::Location => "dx_location",
            DataSourceKind::Locations => "dx_locations",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name)
    }

    pub fn schema(&self) -> ResourceSchema {
        match self {
            DataSourceKind::Connection => schemas::data_sources::connection(),
            DataSourceKind::Gateway => schemas::data_sources::gateway(),
            DataSourceKind::Lag => schemas::data_sources::lag(),
            DataSourceKind::Location => schemas::data_sources::location(),
            DataSourceKind::Locations => schemas::data_sources::locations(),
        }
    }

    pub async fn read(&self, client: &AwsClient, resource: &Resource) -> Result<State> {
        match self {
            DataSourceKind::Connection => data_sources::connection(client, resource).await,
            DataSourceKind::Gateway => data_sources::gateway(client, resource).await,
            DataSourceKind::Lag => data_sources::lag(client, resource).await,
            DataSourceKind::Location => data_sources::location(client, resource).await,
            DataSourceKind::Locations => data_sources::locations(client, resource).await,
        }
    }
}

impl ResourceType for DataSourceKind {
    fn name(&self) -> &'static str {
        DataSourceKind::name(self)
    }

    fn schema(&self) -> ResourceSchema {
        DataSourceKind::schema(self)
    }
}
