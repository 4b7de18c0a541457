//! In-memory Direct Connect for tests
//!
//! [`MockDirectConnect`] keeps objects in maps and imitates the parts of AWS
//! behaviour handlers rely on: generated IDs, terminal states after delete,
//! not-found error messages. State sequences can be scripted per object ID;
//! each describe of that object consumes the next scripted state, and an
//! empty string removes the object.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::api::*;
use crate::client::AwsClient;
use crate::error::messages;

pub const ACCOUNT_ID: &str = "123456789012";
pub const REGION: &str = "us-west-2";

#[derive(Default)]
struct Inner {
    connections: BTreeMap<String, Connection>,
    lags: BTreeMap<String, Lag>,
    gateways: BTreeMap<String, Gateway>,
    associations: BTreeMap<String, GatewayAssociation>,
    proposals: BTreeMap<String, GatewayAssociationProposal>,
    interfaces: BTreeMap<String, VirtualInterface>,
    locations: Vec<Location>,
    scripts: HashMap<String, VecDeque<String>>,
    failures: HashMap<&'static str, VecDeque<ApiError>>,
    calls: Vec<&'static str>,
    ignore_association_filter: bool,
    ignore_virtual_interface_filter: bool,
    next_id: u32,
}

impl Inner {
    fn call(&mut self, operation: &'static str) -> ApiResult<()> {
        self.calls.push(operation);
        match self.failures.get_mut(operation).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    /// Next scripted state for `id`; `Some("")` means the object is gone
    fn advance(&mut self, id: &str) -> Option<String> {
        self.scripts.get_mut(id).and_then(VecDeque::pop_front)
    }

    fn advance_connection(&mut self, id: &str) {
        if let Some(state) = self.advance(id) {
            if state.is_empty() {
                self.connections.remove(id);
            } else if let Some(c) = self.connections.get_mut(id) {
                c.connection_state = ConnectionState::from(state.as_str());
            }
        }
    }

    fn advance_lag(&mut self, id: &str) {
        if let Some(state) = self.advance(id) {
            if state.is_empty() {
                self.lags.remove(id);
            } else if let Some(l) = self.lags.get_mut(id) {
                l.lag_state = LagState::from(state.as_str());
            }
        }
    }

    fn advance_gateway(&mut self, id: &str) {
        if let Some(state) = self.advance(id) {
            if state.is_empty() {
                self.gateways.remove(id);
            } else if let Some(g) = self.gateways.get_mut(id) {
                g.direct_connect_gateway_state = GatewayState::from(state.as_str());
            }
        }
    }

    fn advance_association(&mut self, id: &str) {
        if let Some(state) = self.advance(id) {
            if state.is_empty() {
                self.associations.remove(id);
            } else if let Some(a) = self.associations.get_mut(id) {
                a.association_state = GatewayAssociationState::from(state.as_str());
            }
        }
    }

    fn advance_interface(&mut self, id: &str) {
        if let Some(state) = self.advance(id) {
            if state.is_empty() {
                self.interfaces.remove(id);
            } else if let Some(v) = self.interfaces.get_mut(id) {
                v.virtual_interface_state = VirtualInterfaceState::from(state.as_str());
            }
        }
        let peer_ids: Vec<String> = self
            .interfaces
            .get(id)
            .map(|v| v.bgp_peers.iter().filter_map(|p| p.bgp_peer_id.clone()).collect())
            .unwrap_or_default();
        for peer_id in peer_ids {
            if let Some(state) = self.advance(&peer_id)
                && let Some(v) = self.interfaces.get_mut(id)
            {
                if state.is_empty() {
                    v.bgp_peers
                        .retain(|p| p.bgp_peer_id.as_deref() != Some(peer_id.as_str()));
                } else if let Some(p) = v
                    .bgp_peers
                    .iter_mut()
                    .find(|p| p.bgp_peer_id.as_deref() == Some(peer_id.as_str()))
                {
                    p.bgp_peer_state = BgpPeerState::from(state.as_str());
                }
            }
        }
    }

    fn lag_with_members(&self, lag: &Lag) -> Lag {
        let mut lag = lag.clone();
        lag.connections = self
            .connections
            .values()
            .filter(|c| c.lag_id.as_deref() == Some(lag.lag_id.as_str()))
            .cloned()
            .collect();
        lag.number_of_connections = lag.connections.len() as i32;
        lag
    }

    fn find_tagged(&mut self, arn: &str) -> Option<&mut Tags> {
        let id = arn.rsplit('/').next()?;
        if let Some(c) = self.connections.get_mut(id) {
            return Some(&mut c.tags);
        }
        if let Some(l) = self.lags.get_mut(id) {
            return Some(&mut l.tags);
        }
        self.interfaces.get_mut(id).map(|v| &mut v.tags)
    }
}

fn client_error(operation: &'static str, message: String) -> ApiError {
    ApiError::new(operation, Some("DirectConnectClientException"), message)
}

/// Scriptable in-memory implementation of [`DirectConnectApi`]
#[derive(Clone, Default)]
pub struct MockDirectConnect {
    inner: Arc<Mutex<Inner>>,
}

impl MockDirectConnect {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Queue states for the object `id`, consumed one per describe
    pub fn script(&self, id: &str, states: &[&str]) {
        self.lock()
            .scripts
            .entry(id.to_string())
            .or_default()
            .extend(states.iter().map(|s| s.to_string()));
    }

    /// Make the next call of `operation` fail with `err`
    pub fn fail_next(&self, operation: &'static str, err: ApiError) {
        self.lock()
            .failures
            .entry(operation)
            .or_default()
            .push_back(err);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.lock().calls.iter().filter(|c| **c == operation).count()
    }

    /// Describe calls return every association, as a stale listing would
    pub fn ignore_association_filter(&self) {
        self.lock().ignore_association_filter = true;
    }

    /// Describe calls return every interface regardless of the requested ID
    pub fn ignore_virtual_interface_filter(&self) {
        self.lock().ignore_virtual_interface_filter = true;
    }

    pub fn put_connection(&self, connection: Connection) {
        self.lock()
            .connections
            .insert(connection.connection_id.clone(), connection);
    }

    pub fn put_lag(&self, lag: Lag) {
        self.lock().lags.insert(lag.lag_id.clone(), lag);
    }

    pub fn put_gateway(&self, gateway: Gateway) {
        self.lock()
            .gateways
            .insert(gateway.direct_connect_gateway_id.clone(), gateway);
    }

    pub fn put_gateway_association(&self, association: GatewayAssociation) {
        self.lock()
            .associations
            .insert(association.association_id.clone(), association);
    }

    pub fn put_proposal(&self, proposal: GatewayAssociationProposal) {
        self.lock()
            .proposals
            .insert(proposal.proposal_id.clone(), proposal);
    }

    pub fn put_virtual_interface(&self, vif: VirtualInterface) {
        self.lock()
            .interfaces
            .insert(vif.virtual_interface_id.clone(), vif);
    }

    pub fn put_location(&self, location: Location) {
        self.lock().locations.push(location);
    }

    pub fn connection(&self, id: &str) -> Option<Connection> {
        self.lock().connections.get(id).cloned()
    }

    pub fn lag(&self, id: &str) -> Option<Lag> {
        let inner = self.lock();
        inner.lags.get(id).map(|l| inner.lag_with_members(l))
    }

    pub fn gateway_association(&self, id: &str) -> Option<GatewayAssociation> {
        self.lock().associations.get(id).cloned()
    }

    pub fn proposal(&self, id: &str) -> Option<GatewayAssociationProposal> {
        self.lock().proposals.get(id).cloned()
    }

    pub fn virtual_interface(&self, id: &str) -> Option<VirtualInterface> {
        self.lock().interfaces.get(id).cloned()
    }
}

#[async_trait]
impl DirectConnectApi for MockDirectConnect {
    async fn describe_connections(
        &self,
        connection_id: Option<&str>,
    ) -> ApiResult<Vec<Connection>> {
        let mut inner = self.lock();
        inner.call("DescribeConnections")?;
        match connection_id {
            Some(id) => {
                inner.advance_connection(id);
                match inner.connections.get(id) {
                    Some(c) => Ok(vec![c.clone()]),
                    None => Err(client_error(
                        "DescribeConnections",
                        format!("{} {}", messages::CONNECTION_NOT_FOUND, id),
                    )),
                }
            }
            None => Ok(inner.connections.values().cloned().collect()),
        }
    }

    async fn create_connection(&self, input: CreateConnectionInput) -> ApiResult<String> {
        let mut inner = self.lock();
        inner.call("CreateConnection")?;
        let id = inner.next_id("dxcon");
        let mut conn = connection(&id, ConnectionState::Available);
        conn.connection_name = Some(input.connection_name);
        conn.bandwidth = Some(input.bandwidth);
        conn.location = Some(input.location);
        conn.lag_id = input.lag_id;
        conn.provider_name = input.provider_name;
        conn.macsec_capable = Some(input.request_macsec);
        conn.tags = input.tags;
        inner.connections.insert(id.clone(), conn);
        Ok(id)
    }

    async fn update_connection(&self, input: UpdateConnectionInput) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("UpdateConnection")?;
        let conn = inner
            .connections
            .get_mut(&input.connection_id)
            .ok_or_else(|| {
                client_error(
                    "UpdateConnection",
                    format!("{} {}", messages::CONNECTION_NOT_FOUND, input.connection_id),
                )
            })?;
        if let Some(name) = input.connection_name {
            conn.connection_name = Some(name);
        }
        if let Some(mode) = input.encryption_mode {
            conn.encryption_mode = Some(mode);
        }
        Ok(())
    }

    async fn delete_connection(&self, connection_id: &str) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("DeleteConnection")?;
        match inner.connections.get_mut(connection_id) {
            Some(c) => {
                c.connection_state = ConnectionState::Deleted;
                c.lag_id = None;
                Ok(())
            }
            None => Err(client_error(
                "DeleteConnection",
                format!("{} {}", messages::CONNECTION_NOT_FOUND, connection_id),
            )),
        }
    }

    async fn confirm_connection(&self, connection_id: &str) -> ApiResult<ConnectionState> {
        let mut inner = self.lock();
        inner.call("ConfirmConnection")?;
        match inner.connections.get_mut(connection_id) {
            Some(c) => {
                c.connection_state = ConnectionState::Available;
                Ok(ConnectionState::Pending)
            }
            None => Err(client_error(
                "ConfirmConnection",
                format!("{} {}", messages::CONNECTION_NOT_FOUND, connection_id),
            )),
        }
    }

    async fn associate_connection_with_lag(
        &self,
        connection_id: &str,
        lag_id: &str,
    ) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("AssociateConnectionWithLag")?;
        if !inner.lags.contains_key(lag_id) {
            return Err(client_error(
                "AssociateConnectionWithLag",
                format!("{} {}", messages::LAG_NOT_FOUND, lag_id),
            ));
        }
        match inner.connections.get_mut(connection_id) {
            Some(c) => {
                c.lag_id = Some(lag_id.to_string());
                Ok(())
            }
            None => Err(client_error(
                "AssociateConnectionWithLag",
                format!("{} {}", messages::CONNECTION_NOT_FOUND, connection_id),
            )),
        }
    }

    async fn disassociate_connection_from_lag(
        &self,
        connection_id: &str,
        lag_id: &str,
    ) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("DisassociateConnectionFromLag")?;
        match inner.connections.get_mut(connection_id) {
            Some(c) if c.lag_id.as_deref() == Some(lag_id) => {
                c.lag_id = None;
                Ok(())
            }
            Some(_) => Err(client_error(
                "DisassociateConnectionFromLag",
                format!("Connection {} {}", connection_id, messages::CONNECTION_HAS_NO_LAG),
            )),
            None => Err(client_error(
                "DisassociateConnectionFromLag",
                format!("{} {}", messages::CONNECTION_NOT_FOUND, connection_id),
            )),
        }
    }

    async fn describe_lags(&self, lag_id: Option<&str>) -> ApiResult<Vec<Lag>> {
        let mut inner = self.lock();
        inner.call("DescribeLags")?;
        match lag_id {
            Some(id) => {
                inner.advance_lag(id);
                match inner.lags.get(id) {
                    Some(l) => Ok(vec![inner.lag_with_members(l)]),
                    None => Ok(vec![]),
                }
            }
            None => Ok(inner
                .lags
                .values()
                .map(|l| inner.lag_with_members(l))
                .collect()),
        }
    }

    async fn create_lag(&self, input: CreateLagInput) -> ApiResult<String> {
        let mut inner = self.lock();
        inner.call("CreateLag")?;
        let lag_id = inner.next_id("dxlag");
        let mut l = lag(&lag_id, LagState::Available);
        l.lag_name = Some(input.lag_name);
        l.location = Some(input.location.clone());
        l.connections_bandwidth = Some(input.connections_bandwidth.clone());
        l.provider_name = input.provider_name;
        l.tags = input.tags;
        inner.lags.insert(lag_id.clone(), l);

        match input.connection_id {
            Some(conn_id) => {
                if let Some(c) = inner.connections.get_mut(&conn_id) {
                    c.lag_id = Some(lag_id.clone());
                }
            }
            None => {
                for _ in 0..input.number_of_connections {
                    let conn_id = inner.next_id("dxcon");
                    let mut c = connection(&conn_id, ConnectionState::Requested);
                    c.bandwidth = Some(input.connections_bandwidth.clone());
                    c.location = Some(input.location.clone());
                    c.lag_id = Some(lag_id.clone());
                    inner.connections.insert(conn_id, c);
                }
            }
        }
        Ok(lag_id)
    }

    async fn update_lag(&self, lag_id: &str, lag_name: &str) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("UpdateLag")?;
        match inner.lags.get_mut(lag_id) {
            Some(l) => {
                l.lag_name = Some(lag_name.to_string());
                Ok(())
            }
            None => Err(client_error(
                "UpdateLag",
                format!("{} {}", messages::LAG_NOT_FOUND, lag_id),
            )),
        }
    }

    async fn delete_lag(&self, lag_id: &str) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("DeleteLag")?;
        let has_members = inner
            .connections
            .values()
            .any(|c| c.lag_id.as_deref() == Some(lag_id));
        if has_members {
            return Err(client_error(
                "DeleteLag",
                format!("Lag {} has connections associated", lag_id),
            ));
        }
        match inner.lags.get_mut(lag_id) {
            Some(l) => {
                l.lag_state = LagState::Deleted;
                Ok(())
            }
            None => Err(client_error(
                "DeleteLag",
                format!("{} {}", messages::LAG_NOT_FOUND, lag_id),
            )),
        }
    }

    async fn describe_gateways(&self, gateway_id: Option<&str>) -> ApiResult<Vec<Gateway>> {
        let mut inner = self.lock();
        inner.call("DescribeDirectConnectGateways")?;
        match gateway_id {
            Some(id) => {
                inner.advance_gateway(id);
                Ok(inner.gateways.get(id).cloned().into_iter().collect())
            }
            None => Ok(inner.gateways.values().cloned().collect()),
        }
    }

    async fn create_gateway(&self, name: &str, amazon_side_asn: i64) -> ApiResult<String> {
        let mut inner = self.lock();
        inner.call("CreateDirectConnectGateway")?;
        let id = inner.next_id("dxgw");
        let mut g = gateway(&id, GatewayState::Available);
        g.direct_connect_gateway_name = Some(name.to_string());
        g.amazon_side_asn = Some(amazon_side_asn);
        inner.gateways.insert(id.clone(), g);
        Ok(id)
    }

    async fn update_gateway(&self, gateway_id: &str, new_name: &str) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("UpdateDirectConnectGateway")?;
        match inner.gateways.get_mut(gateway_id) {
            Some(g) => {
                g.direct_connect_gateway_name = Some(new_name.to_string());
                Ok(())
            }
            None => Err(client_error(
                "UpdateDirectConnectGateway",
                format!("Direct Connect Gateway {} {}", gateway_id, messages::DOES_NOT_EXIST),
            )),
        }
    }

    async fn delete_gateway(&self, gateway_id: &str) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("DeleteDirectConnectGateway")?;
        match inner.gateways.get_mut(gateway_id) {
            Some(g) => {
                g.direct_connect_gateway_state = GatewayState::Deleted;
                Ok(())
            }
            None => Err(client_error(
                "DeleteDirectConnectGateway",
                format!("Direct Connect Gateway {} {}", gateway_id, messages::DOES_NOT_EXIST),
            )),
        }
    }

    async fn describe_gateway_associations(
        &self,
        filter: GatewayAssociationFilter,
    ) -> ApiResult<Vec<GatewayAssociation>> {
        let mut inner = self.lock();
        inner.call("DescribeDirectConnectGatewayAssociations")?;
        if let Some(id) = &filter.association_id {
            inner.advance_association(id);
        }
        let ignore = inner.ignore_association_filter;
        Ok(inner
            .associations
            .values()
            .filter(|a| {
                ignore
                    || (filter
                        .association_id
                        .as_deref()
                        .is_none_or(|id| a.association_id == id)
                        && filter
                            .direct_connect_gateway_id
                            .as_deref()
                            .is_none_or(|id| a.direct_connect_gateway_id.as_deref() == Some(id))
                        && filter
                            .associated_gateway_id
                            .as_deref()
                            .is_none_or(|id| a.associated_gateway_id() == Some(id)))
            })
            .cloned()
            .collect())
    }

    async fn create_gateway_association(
        &self,
        input: CreateGatewayAssociationInput,
    ) -> ApiResult<GatewayAssociation> {
        let mut inner = self.lock();
        inner.call("CreateDirectConnectGatewayAssociation")?;
        let id = inner.next_id("dxgwassoc");
        let mut a = gateway_association(&id, &input.direct_connect_gateway_id, &input.gateway_id);
        a.allowed_prefixes = input.add_allowed_prefixes;
        inner.associations.insert(id, a.clone());
        Ok(a)
    }

    async fn update_gateway_association(
        &self,
        input: UpdateGatewayAssociationInput,
    ) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("UpdateDirectConnectGatewayAssociation")?;
        let a = inner
            .associations
            .get_mut(&input.association_id)
            .ok_or_else(|| {
                client_error(
                    "UpdateDirectConnectGatewayAssociation",
                    format!("Association {} {}", input.association_id, messages::DOES_NOT_EXIST),
                )
            })?;
        a.allowed_prefixes
            .retain(|p| !input.remove_allowed_prefixes.contains(p));
        for prefix in input.add_allowed_prefixes {
            if !a.allowed_prefixes.contains(&prefix) {
                a.allowed_prefixes.push(prefix);
            }
        }
        Ok(())
    }

    async fn delete_gateway_association(&self, association_id: &str) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("DeleteDirectConnectGatewayAssociation")?;
        match inner.associations.get_mut(association_id) {
            Some(a) => {
                a.association_state = GatewayAssociationState::Disassociated;
                Ok(())
            }
            None => Err(client_error(
                "DeleteDirectConnectGatewayAssociation",
                format!("Association {} {}", association_id, messages::DOES_NOT_EXIST),
            )),
        }
    }

    async fn accept_gateway_association_proposal(
        &self,
        input: AcceptProposalInput,
    ) -> ApiResult<GatewayAssociation> {
        let mut inner = self.lock();
        inner.call("AcceptDirectConnectGatewayAssociationProposal")?;
        let proposal = inner
            .proposals
            .get_mut(&input.proposal_id)
            .ok_or_else(|| {
                client_error(
                    "AcceptDirectConnectGatewayAssociationProposal",
                    format!("Proposal {} {}", input.proposal_id, messages::PROPOSAL_NOT_FOUND),
                )
            })?;
        proposal.proposal_state = GatewayAssociationProposalState::Accepted;
        let gateway_id = proposal
            .associated_gateway
            .as_ref()
            .and_then(|g| g.id.clone())
            .unwrap_or_default();
        let prefixes = if input.override_allowed_prefixes.is_empty() {
            proposal.requested_allowed_prefixes.clone()
        } else {
            input.override_allowed_prefixes
        };

        let id = inner.next_id("dxgwassoc");
        let mut a = gateway_association(&id, &input.direct_connect_gateway_id, &gateway_id);
        a.allowed_prefixes = prefixes;
        if let Some(g) = a.associated_gateway.as_mut() {
            g.owner_account = Some(input.associated_gateway_owner_account);
        }
        inner.associations.insert(id, a.clone());
        Ok(a)
    }

    async fn describe_gateway_association_proposals(
        &self,
        proposal_id: &str,
    ) -> ApiResult<Vec<GatewayAssociationProposal>> {
        let mut inner = self.lock();
        inner.call("DescribeDirectConnectGatewayAssociationProposals")?;
        inner.advance(proposal_id);
        Ok(inner.proposals.get(proposal_id).cloned().into_iter().collect())
    }

    async fn create_gateway_association_proposal(
        &self,
        input: CreateProposalInput,
    ) -> ApiResult<String> {
        let mut inner = self.lock();
        inner.call("CreateDirectConnectGatewayAssociationProposal")?;
        let id = inner.next_id("proposal");
        inner.proposals.insert(
            id.clone(),
            GatewayAssociationProposal {
                proposal_id: id.clone(),
                proposal_state: GatewayAssociationProposalState::Requested,
                direct_connect_gateway_id: Some(input.direct_connect_gateway_id),
                direct_connect_gateway_owner_account: Some(
                    input.direct_connect_gateway_owner_account,
                ),
                associated_gateway: Some(AssociatedGateway {
                    id: Some(input.gateway_id.clone()),
                    gateway_type: Some(gateway_type_of(&input.gateway_id).to_string()),
                    owner_account: Some(ACCOUNT_ID.to_string()),
                    region: Some(REGION.to_string()),
                }),
                existing_allowed_prefixes: vec![],
                requested_allowed_prefixes: input.add_allowed_prefixes,
            },
        );
        Ok(id)
    }

    async fn delete_gateway_association_proposal(&self, proposal_id: &str) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("DeleteDirectConnectGatewayAssociationProposal")?;
        match inner.proposals.get_mut(proposal_id) {
            Some(p) => {
                p.proposal_state = GatewayAssociationProposalState::Deleted;
                Ok(())
            }
            None => Err(client_error(
                "DeleteDirectConnectGatewayAssociationProposal",
                format!("Proposal {} {}", proposal_id, messages::PROPOSAL_NOT_FOUND),
            )),
        }
    }

    async fn describe_virtual_interfaces(
        &self,
        virtual_interface_id: Option<&str>,
    ) -> ApiResult<Vec<VirtualInterface>> {
        let mut inner = self.lock();
        inner.call("DescribeVirtualInterfaces")?;
        if let Some(id) = virtual_interface_id {
            inner.advance_interface(id);
        }
        let ignore = inner.ignore_virtual_interface_filter;
        Ok(inner
            .interfaces
            .values()
            .filter(|v| {
                ignore
                    || virtual_interface_id.is_none_or(|id| v.virtual_interface_id == id)
            })
            .cloned()
            .collect())
    }

    async fn create_virtual_interface(
        &self,
        connection_id: &str,
        input: NewVirtualInterface,
    ) -> ApiResult<String> {
        let mut inner = self.lock();
        inner.call("CreateVirtualInterface")?;
        if !inner.connections.contains_key(connection_id) {
            return Err(client_error(
                "CreateVirtualInterface",
                format!("{} {}", messages::CONNECTION_NOT_FOUND, connection_id),
            ));
        }
        let id = inner.next_id("dxvif");
        let mut vif = interface_from(&id, connection_id, input, VirtualInterfaceState::Available);
        vif.owner_account = Some(ACCOUNT_ID.to_string());
        inner.interfaces.insert(id.clone(), vif);
        Ok(id)
    }

    async fn allocate_hosted_virtual_interface(
        &self,
        connection_id: &str,
        owner_account: &str,
        input: NewVirtualInterface,
    ) -> ApiResult<String> {
        let mut inner = self.lock();
        inner.call("AllocateHostedVirtualInterface")?;
        let id = inner.next_id("dxvif");
        let mut vif = interface_from(&id, connection_id, input, VirtualInterfaceState::Confirming);
        vif.owner_account = Some(owner_account.to_string());
        inner.interfaces.insert(id.clone(), vif);
        Ok(id)
    }

    async fn confirm_virtual_interface(
        &self,
        interface_type: VirtualInterfaceType,
        virtual_interface_id: &str,
        virtual_gateway_id: Option<&str>,
        direct_connect_gateway_id: Option<&str>,
    ) -> ApiResult<VirtualInterfaceState> {
        let mut inner = self.lock();
        inner.call("ConfirmVirtualInterface")?;
        let vif = inner
            .interfaces
            .get_mut(virtual_interface_id)
            .ok_or_else(|| {
                client_error(
                    "ConfirmVirtualInterface",
                    format!("Virtual interface {} {}", virtual_interface_id, messages::DOES_NOT_EXIST),
                )
            })?;
        if vif.virtual_interface_type.as_deref() != Some(interface_type.as_str()) {
            return Err(client_error(
                "ConfirmVirtualInterface",
                format!("Virtual interface {} is not {}", virtual_interface_id, interface_type),
            ));
        }
        vif.virtual_gateway_id = virtual_gateway_id.map(str::to_string);
        vif.direct_connect_gateway_id = direct_connect_gateway_id.map(str::to_string);
        vif.virtual_interface_state = VirtualInterfaceState::Available;
        Ok(VirtualInterfaceState::Pending)
    }

    async fn update_virtual_interface_attributes(
        &self,
        input: UpdateVirtualInterfaceInput,
    ) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("UpdateVirtualInterfaceAttributes")?;
        let vif = inner
            .interfaces
            .get_mut(&input.virtual_interface_id)
            .ok_or_else(|| {
                client_error(
                    "UpdateVirtualInterfaceAttributes",
                    format!(
                        "Virtual interface {} {}",
                        input.virtual_interface_id,
                        messages::DOES_NOT_EXIST
                    ),
                )
            })?;
        if let Some(mtu) = input.mtu {
            vif.mtu = Some(mtu);
            vif.jumbo_frame_capable = Some(mtu > 1500);
        }
        if let Some(enabled) = input.site_link_enabled {
            vif.site_link_enabled = Some(enabled);
        }
        if let Some(name) = input.name {
            vif.virtual_interface_name = Some(name);
        }
        Ok(())
    }

    async fn delete_virtual_interface(
        &self,
        virtual_interface_id: &str,
    ) -> ApiResult<VirtualInterfaceState> {
        let mut inner = self.lock();
        inner.call("DeleteVirtualInterface")?;
        match inner.interfaces.get_mut(virtual_interface_id) {
            Some(v) => {
                v.virtual_interface_state = VirtualInterfaceState::Deleted;
                Ok(VirtualInterfaceState::Deleting)
            }
            None => Err(client_error(
                "DeleteVirtualInterface",
                format!("Virtual interface {} {}", virtual_interface_id, messages::DOES_NOT_EXIST),
            )),
        }
    }

    async fn create_bgp_peer(&self, virtual_interface_id: &str, peer: NewBgpPeer) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("CreateBGPPeer")?;
        let peer_id = inner.next_id("dxpeer");
        let vif = inner
            .interfaces
            .get_mut(virtual_interface_id)
            .ok_or_else(|| {
                client_error(
                    "CreateBGPPeer",
                    format!("Virtual interface {} {}", virtual_interface_id, messages::DOES_NOT_EXIST),
                )
            })?;
        let family = peer.address_family.clone().unwrap_or_else(|| "ipv4".to_string());
        let mut created = bgp_peer(&family, peer.asn, BgpPeerState::Available);
        created.bgp_peer_id = Some(peer_id);
        created.amazon_address = peer.amazon_address;
        created.customer_address = peer.customer_address;
        created.auth_key = peer.auth_key;
        vif.bgp_peers.push(created);
        Ok(())
    }

    async fn delete_bgp_peer(
        &self,
        virtual_interface_id: &str,
        asn: i64,
        customer_address: Option<&str>,
    ) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("DeleteBGPPeer")?;
        let vif = inner
            .interfaces
            .get_mut(virtual_interface_id)
            .ok_or_else(|| {
                client_error(
                    "DeleteBGPPeer",
                    format!("Virtual interface {} {}", virtual_interface_id, messages::DOES_NOT_EXIST),
                )
            })?;
        let peer = vif
            .bgp_peers
            .iter_mut()
            .find(|p| {
                p.asn == asn
                    && customer_address.is_none_or(|addr| p.customer_address.as_deref() == Some(addr))
            })
            .ok_or_else(|| {
                client_error(
                    "DeleteBGPPeer",
                    format!("BGP peer {} {}", asn, messages::DOES_NOT_EXIST),
                )
            })?;
        peer.bgp_peer_state = BgpPeerState::Deleted;
        Ok(())
    }

    async fn associate_macsec_key(
        &self,
        connection_id: &str,
        secret_arn: Option<&str>,
        ckn: Option<&str>,
        cak: Option<&str>,
    ) -> ApiResult<MacSecAssociation> {
        let mut inner = self.lock();
        inner.call("AssociateMacSecKey")?;
        let conn = inner.connections.get_mut(connection_id).ok_or_else(|| {
            client_error(
                "AssociateMacSecKey",
                format!("{} {}", messages::CONNECTION_NOT_FOUND, connection_id),
            )
        })?;
        let arn = match (secret_arn, ckn, cak) {
            (Some(arn), _, _) => arn.to_string(),
            (None, Some(ckn), Some(_)) => format!(
                "arn:aws:secretsmanager:{}:{}:secret:directconnect!{}",
                REGION, ACCOUNT_ID, ckn
            ),
            _ => {
                return Err(ApiError::new(
                    "AssociateMacSecKey",
                    Some("DirectConnectClientException"),
                    "either secretARN or ckn and cak must be given",
                ));
            }
        };
        conn.macsec_keys.push(MacSecKey {
            secret_arn: Some(arn),
            ckn: ckn.map(str::to_string),
            state: Some("associated".to_string()),
            start_on: Some("2024-01-01T00:00:00Z".to_string()),
        });
        Ok(MacSecAssociation {
            connection_id: Some(connection_id.to_string()),
            keys: conn.macsec_keys.clone(),
        })
    }

    async fn disassociate_macsec_key(&self, connection_id: &str, secret_arn: &str) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("DisassociateMacSecKey")?;
        let conn = inner.connections.get_mut(connection_id).ok_or_else(|| {
            client_error(
                "DisassociateMacSecKey",
                format!("{} {}", messages::CONNECTION_NOT_FOUND, connection_id),
            )
        })?;
        conn.macsec_keys
            .retain(|k| k.secret_arn.as_deref() != Some(secret_arn));
        Ok(())
    }

    async fn describe_locations(&self) -> ApiResult<Vec<Location>> {
        let mut inner = self.lock();
        inner.call("DescribeLocations")?;
        Ok(inner.locations.clone())
    }

    async fn tag_resource(&self, resource_arn: &str, tags: Tags) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("TagResource")?;
        if let Some(existing) = inner.find_tagged(resource_arn) {
            existing.extend(tags);
        }
        Ok(())
    }

    async fn untag_resource(&self, resource_arn: &str, tag_keys: Vec<String>) -> ApiResult<()> {
        let mut inner = self.lock();
        inner.call("UntagResource")?;
        if let Some(existing) = inner.find_tagged(resource_arn) {
            for key in tag_keys {
                existing.remove(&key);
            }
        }
        Ok(())
    }
}

fn gateway_type_of(gateway_id: &str) -> &'static str {
    if gateway_id.starts_with("tgw-") {
        "transitGateway"
    } else {
        "virtualPrivateGateway"
    }
}

fn interface_from(
    id: &str,
    connection_id: &str,
    input: NewVirtualInterface,
    state: VirtualInterfaceState,
) -> VirtualInterface {
    let mut vif = virtual_interface(id, input.interface_type, state);
    vif.connection_id = Some(connection_id.to_string());
    vif.virtual_interface_name = Some(input.name);
    vif.vlan = input.vlan;
    vif.asn = input.asn;
    vif.address_family = input.address_family;
    vif.amazon_address = input.amazon_address.or_else(|| Some("175.45.176.1/30".to_string()));
    vif.customer_address = input
        .customer_address
        .or_else(|| Some("175.45.176.2/30".to_string()));
    vif.auth_key = input.auth_key.or_else(|| Some("0xAbCdEf".to_string()));
    vif.mtu = input.mtu.or(Some(1500));
    vif.jumbo_frame_capable = Some(vif.mtu.unwrap_or(1500) > 1500);
    vif.site_link_enabled = input.site_link_enabled;
    vif.virtual_gateway_id = input.virtual_gateway_id;
    vif.direct_connect_gateway_id = input.direct_connect_gateway_id;
    vif.route_filter_prefixes = input.route_filter_prefixes;
    vif.tags = input.tags;
    vif
}

/// A client over `mock` with a 1 ms probe interval
pub fn test_client(mock: MockDirectConnect) -> AwsClient {
    AwsClient::new(Arc::new(mock), REGION, "aws").with_poll_interval(Some(Duration::from_millis(1)))
}

pub fn connection(id: &str, state: ConnectionState) -> Connection {
    Connection {
        connection_id: id.to_string(),
        connection_name: Some(format!("{}-name", id)),
        connection_state: state,
        bandwidth: Some("1Gbps".to_string()),
        location: Some("EqDC2".to_string()),
        owner_account: Some(ACCOUNT_ID.to_string()),
        partner_name: None,
        provider_name: None,
        region: Some(REGION.to_string()),
        lag_id: None,
        aws_device: Some("EqDC2-123h49s71dabc".to_string()),
        has_logical_redundancy: Some("unknown".to_string()),
        jumbo_frame_capable: Some(false),
        macsec_capable: Some(false),
        encryption_mode: None,
        port_encryption_status: None,
        vlan: 0,
        macsec_keys: vec![],
        tags: Tags::new(),
    }
}

pub fn lag(id: &str, state: LagState) -> Lag {
    Lag {
        lag_id: id.to_string(),
        lag_name: Some(format!("{}-name", id)),
        lag_state: state,
        connections_bandwidth: Some("1Gbps".to_string()),
        number_of_connections: 0,
        location: Some("EqDC2".to_string()),
        owner_account: Some(ACCOUNT_ID.to_string()),
        provider_name: None,
        region: Some(REGION.to_string()),
        aws_device: Some("EqDC2-123h49s71dabc".to_string()),
        has_logical_redundancy: Some("unknown".to_string()),
        jumbo_frame_capable: Some(false),
        allows_hosted_connections: false,
        connections: vec![],
        tags: Tags::new(),
    }
}

pub fn gateway(id: &str, state: GatewayState) -> Gateway {
    Gateway {
        direct_connect_gateway_id: id.to_string(),
        direct_connect_gateway_name: Some(format!("{}-name", id)),
        amazon_side_asn: Some(64512),
        owner_account: Some(ACCOUNT_ID.to_string()),
        direct_connect_gateway_state: state,
        state_change_error: None,
    }
}

pub fn gateway_association(id: &str, dx_gateway_id: &str, gateway_id: &str) -> GatewayAssociation {
    GatewayAssociation {
        association_id: id.to_string(),
        association_state: GatewayAssociationState::Associated,
        direct_connect_gateway_id: Some(dx_gateway_id.to_string()),
        direct_connect_gateway_owner_account: Some(ACCOUNT_ID.to_string()),
        associated_gateway: Some(AssociatedGateway {
            id: Some(gateway_id.to_string()),
            gateway_type: Some(gateway_type_of(gateway_id).to_string()),
            owner_account: Some(ACCOUNT_ID.to_string()),
            region: Some(REGION.to_string()),
        }),
        allowed_prefixes: vec![],
        state_change_error: None,
    }
}

pub fn virtual_interface(
    id: &str,
    interface_type: VirtualInterfaceType,
    state: VirtualInterfaceState,
) -> VirtualInterface {
    VirtualInterface {
        virtual_interface_id: id.to_string(),
        virtual_interface_name: Some(format!("{}-name", id)),
        virtual_interface_type: Some(interface_type.as_str().to_string()),
        virtual_interface_state: state,
        connection_id: Some("dxcon-1".to_string()),
        owner_account: Some(ACCOUNT_ID.to_string()),
        region: Some(REGION.to_string()),
        vlan: 4094,
        asn: 65352,
        amazon_side_asn: Some(64512),
        address_family: Some("ipv4".to_string()),
        amazon_address: Some("175.45.176.1/30".to_string()),
        customer_address: Some("175.45.176.2/30".to_string()),
        auth_key: Some("0xAbCdEf".to_string()),
        mtu: Some(1500),
        jumbo_frame_capable: Some(false),
        site_link_enabled: None,
        virtual_gateway_id: None,
        direct_connect_gateway_id: None,
        aws_device: Some("EqDC2-123h49s71dabc".to_string()),
        route_filter_prefixes: vec![],
        bgp_peers: vec![],
        tags: Tags::new(),
    }
}

pub fn bgp_peer(address_family: &str, asn: i64, state: BgpPeerState) -> BgpPeer {
    BgpPeer {
        bgp_peer_id: Some(format!("dxpeer-{}-{}", address_family, asn)),
        asn,
        address_family: Some(address_family.to_string()),
        amazon_address: None,
        customer_address: None,
        auth_key: None,
        bgp_peer_state: state,
        bgp_status: Some("up".to_string()),
        aws_device: Some("EqDC2-123h49s71dabc".to_string()),
    }
}
