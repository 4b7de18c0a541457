//! [`DirectConnectApi`] over the AWS SDK

use std::error::Error;
use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_directconnect::Client;
use aws_sdk_directconnect::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_directconnect::types;

use crate::api::*;

/// Production implementation backed by `aws_sdk_directconnect::Client`
#[derive(Debug, Clone)]
pub struct SdkDirectConnect {
    client: Client,
}

impl SdkDirectConnect {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_conf(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

fn sdk_error<E, R>(operation: &'static str) -> impl FnOnce(SdkError<E, R>) -> ApiError
where
    E: ProvideErrorMetadata + Error + 'static,
    R: Debug,
{
    move |err| {
        let code = err.code().map(str::to_string);
        let message = err
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
        ApiError::new(operation, code.as_deref(), message)
    }
}

fn build_error(operation: &'static str) -> impl FnOnce(BuildError) -> ApiError {
    move |err| ApiError::new(operation, Some("BuildError"), err.to_string())
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

fn tags_from(tags: &[types::Tag]) -> Tags {
    tags.iter()
        .map(|t| (t.key().to_string(), t.value().unwrap_or_default().to_string()))
        .collect()
}

fn tags_to(operation: &'static str, tags: Tags) -> ApiResult<Vec<types::Tag>> {
    let mut out: Vec<types::Tag> = tags
        .into_iter()
        .map(|(k, v)| {
            types::Tag::builder()
                .key(k)
                .value(v)
                .build()
                .map_err(build_error(operation))
        })
        .collect::<ApiResult<_>>()?;
    out.sort_by(|a, b| a.key().cmp(b.key()));
    Ok(out)
}

fn optional_tags(operation: &'static str, tags: Tags) -> ApiResult<Option<Vec<types::Tag>>> {
    if tags.is_empty() {
        Ok(None)
    } else {
        tags_to(operation, tags).map(Some)
    }
}

fn prefixes_from(prefixes: &[types::RouteFilterPrefix]) -> Vec<String> {
    prefixes
        .iter()
        .filter_map(|p| owned(p.cidr()))
        .collect()
}

fn prefixes_to(prefixes: Vec<String>) -> Option<Vec<types::RouteFilterPrefix>> {
    if prefixes.is_empty() {
        return None;
    }
    Some(
        prefixes
            .into_iter()
            .map(|cidr| types::RouteFilterPrefix::builder().cidr(cidr).build())
            .collect(),
    )
}

fn asn32(operation: &'static str, asn: i64) -> ApiResult<i32> {
    i32::try_from(asn).map_err(|_| {
        ApiError::new(
            operation,
            Some("ValidationError"),
            format!("ASN {} does not fit the API's 32-bit field", asn),
        )
    })
}

fn macsec_key(k: &types::MacSecKey) -> MacSecKey {
    MacSecKey {
        secret_arn: owned(k.secret_arn()),
        ckn: owned(k.ckn()),
        state: owned(k.state()),
        start_on: owned(k.start_on()),
    }
}

fn connection(c: &types::Connection) -> Connection {
    Connection {
        connection_id: c.connection_id().unwrap_or_default().to_string(),
        connection_name: owned(c.connection_name()),
        connection_state: c
            .connection_state()
            .map(|s| ConnectionState::from(s.as_str()))
            .unwrap_or_else(|| ConnectionState::Unknown(String::new())),
        bandwidth: owned(c.bandwidth()),
        location: owned(c.location()),
        owner_account: owned(c.owner_account()),
        partner_name: owned(c.partner_name()),
        provider_name: owned(c.provider_name()),
        region: owned(c.region()),
        lag_id: owned(c.lag_id()),
        aws_device: owned(c.aws_device_v2()).or_else(|| owned(c.aws_device())),
        has_logical_redundancy: c.has_logical_redundancy().map(|h| h.as_str().to_string()),
        jumbo_frame_capable: c.jumbo_frame_capable(),
        macsec_capable: c.mac_sec_capable(),
        encryption_mode: owned(c.encryption_mode()),
        port_encryption_status: owned(c.port_encryption_status()),
        vlan: c.vlan(),
        macsec_keys: c.mac_sec_keys().iter().map(macsec_key).collect(),
        tags: tags_from(c.tags()),
    }
}

fn lag(l: &types::Lag) -> Lag {
    Lag {
        lag_id: l.lag_id().unwrap_or_default().to_string(),
        lag_name: owned(l.lag_name()),
        lag_state: l
            .lag_state()
            .map(|s| LagState::from(s.as_str()))
            .unwrap_or_else(|| LagState::Unknown(String::new())),
        connections_bandwidth: owned(l.connections_bandwidth()),
        number_of_connections: l.number_of_connections(),
        location: owned(l.location()),
        owner_account: owned(l.owner_account()),
        provider_name: owned(l.provider_name()),
        region: owned(l.region()),
        aws_device: owned(l.aws_device_v2()).or_else(|| owned(l.aws_device())),
        has_logical_redundancy: l.has_logical_redundancy().map(|h| h.as_str().to_string()),
        jumbo_frame_capable: l.jumbo_frame_capable(),
        allows_hosted_connections: l.allows_hosted_connections(),
        connections: l.connections().iter().map(connection).collect(),
        tags: tags_from(l.tags()),
    }
}

fn gateway(g: &types::DirectConnectGateway) -> Gateway {
    Gateway {
        direct_connect_gateway_id: g.direct_connect_gateway_id().unwrap_or_default().to_string(),
        direct_connect_gateway_name: owned(g.direct_connect_gateway_name()),
        amazon_side_asn: g.amazon_side_asn(),
        owner_account: owned(g.owner_account()),
        direct_connect_gateway_state: g
            .direct_connect_gateway_state()
            .map(|s| GatewayState::from(s.as_str()))
            .unwrap_or_else(|| GatewayState::Unknown(String::new())),
        state_change_error: owned(g.state_change_error()),
    }
}

fn associated_gateway(g: &types::AssociatedGateway) -> AssociatedGateway {
    AssociatedGateway {
        id: owned(g.id()),
        gateway_type: g.r#type().map(|t| t.as_str().to_string()),
        owner_account: owned(g.owner_account()),
        region: owned(g.region()),
    }
}

fn gateway_association(a: &types::DirectConnectGatewayAssociation) -> GatewayAssociation {
    GatewayAssociation {
        association_id: a.association_id().unwrap_or_default().to_string(),
        association_state: a
            .association_state()
            .map(|s| GatewayAssociationState::from(s.as_str()))
            .unwrap_or_else(|| GatewayAssociationState::Unknown(String::new())),
        direct_connect_gateway_id: owned(a.direct_connect_gateway_id()),
        direct_connect_gateway_owner_account: owned(a.direct_connect_gateway_owner_account()),
        associated_gateway: a.associated_gateway().map(associated_gateway),
        allowed_prefixes: prefixes_from(a.allowed_prefixes_to_direct_connect_gateway()),
        state_change_error: owned(a.state_change_error()),
    }
}

fn proposal(p: &types::DirectConnectGatewayAssociationProposal) -> GatewayAssociationProposal {
    GatewayAssociationProposal {
        proposal_id: p.proposal_id().unwrap_or_default().to_string(),
        proposal_state: p
            .proposal_state()
            .map(|s| GatewayAssociationProposalState::from(s.as_str()))
            .unwrap_or_else(|| GatewayAssociationProposalState::Unknown(String::new())),
        direct_connect_gateway_id: owned(p.direct_connect_gateway_id()),
        direct_connect_gateway_owner_account: owned(p.direct_connect_gateway_owner_account()),
        associated_gateway: p.associated_gateway().map(associated_gateway),
        existing_allowed_prefixes: prefixes_from(
            p.existing_allowed_prefixes_to_direct_connect_gateway(),
        ),
        requested_allowed_prefixes: prefixes_from(
            p.requested_allowed_prefixes_to_direct_connect_gateway(),
        ),
    }
}

fn bgp_peer(p: &types::BgpPeer) -> BgpPeer {
    BgpPeer {
        bgp_peer_id: owned(p.bgp_peer_id()),
        asn: i64::from(p.asn()),
        address_family: p.address_family().map(|f| f.as_str().to_string()),
        amazon_address: owned(p.amazon_address()),
        customer_address: owned(p.customer_address()),
        auth_key: owned(p.auth_key()),
        bgp_peer_state: p
            .bgp_peer_state()
            .map(|s| BgpPeerState::from(s.as_str()))
            .unwrap_or_else(|| BgpPeerState::Unknown(String::new())),
        bgp_status: p.bgp_status().map(|s| s.as_str().to_string()),
        aws_device: owned(p.aws_device_v2()),
    }
}

fn virtual_interface(v: &types::VirtualInterface) -> VirtualInterface {
    VirtualInterface {
        virtual_interface_id: v.virtual_interface_id().unwrap_or_default().to_string(),
        virtual_interface_name: owned(v.virtual_interface_name()),
        virtual_interface_type: owned(v.virtual_interface_type()),
        virtual_interface_state: v
            .virtual_interface_state()
            .map(|s| VirtualInterfaceState::from(s.as_str()))
            .unwrap_or_else(|| VirtualInterfaceState::Unknown(String::new())),
        connection_id: owned(v.connection_id()),
        owner_account: owned(v.owner_account()),
        region: owned(v.region()),
        vlan: v.vlan(),
        asn: i64::from(v.asn()),
        amazon_side_asn: v.amazon_side_asn(),
        address_family: v.address_family().map(|f| f.as_str().to_string()),
        amazon_address: owned(v.amazon_address()),
        customer_address: owned(v.customer_address()),
        auth_key: owned(v.auth_key()),
        mtu: v.mtu(),
        jumbo_frame_capable: v.jumbo_frame_capable(),
        site_link_enabled: v.site_link_enabled(),
        virtual_gateway_id: owned(v.virtual_gateway_id()),
        direct_connect_gateway_id: owned(v.direct_connect_gateway_id()),
        aws_device: owned(v.aws_device_v2()),
        route_filter_prefixes: prefixes_from(v.route_filter_prefixes()),
        bgp_peers: v.bgp_peers().iter().map(bgp_peer).collect(),
        tags: tags_from(v.tags()),
    }
}

fn location(l: &types::Location) -> Location {
    Location {
        location_code: l.location_code().unwrap_or_default().to_string(),
        location_name: owned(l.location_name()),
        region: owned(l.region()),
        available_port_speeds: l.available_port_speeds().to_vec(),
        available_providers: l.available_providers().to_vec(),
        available_macsec_port_speeds: l.available_mac_sec_port_speeds().to_vec(),
    }
}

fn address_family(family: Option<String>) -> Option<types::AddressFamily> {
    family.map(|f| types::AddressFamily::from(f.as_str()))
}

fn missing_id(operation: &'static str, what: &str) -> ApiError {
    ApiError::new(
        operation,
        None,
        format!("response did not include a {} ID", what),
    )
}

#[async_trait]
impl DirectConnectApi for SdkDirectConnect {
    async fn describe_connections(
        &self,
        connection_id: Option<&str>,
    ) -> ApiResult<Vec<Connection>> {
        const OP: &str = "DescribeConnections";
        let output = self
            .client
            .describe_connections()
            .set_connection_id(owned(connection_id))
            .send()
            .await
            .map_err(sdk_error(OP))?;
        Ok(output.connections().iter().map(connection).collect())
    }

    async fn create_connection(&self, input: CreateConnectionInput) -> ApiResult<String> {
        const OP: &str = "CreateConnection";
        let output = self
            .client
            .create_connection()
            .connection_name(input.connection_name)
            .bandwidth(input.bandwidth)
            .location(input.location)
            .set_lag_id(input.lag_id)
            .set_provider_name(input.provider_name)
            .request_mac_sec(input.request_macsec)
            .set_tags(optional_tags(OP, input.tags)?)
            .send()
            .await
            .map_err(sdk_error(OP))?;
        owned(output.connection_id()).ok_or_else(|| missing_id(OP, "connection"))
    }

    async fn update_connection(&self, input: UpdateConnectionInput) -> ApiResult<()> {
        const OP: &str = "UpdateConnection";
        self.client
            .update_connection()
            .connection_id(input.connection_id)
            .set_connection_name(input.connection_name)
            .set_encryption_mode(input.encryption_mode)
            .send()
            .await
            .map_err(sdk_error(OP))?;
        Ok(())
    }

    async fn delete_connection(&self, connection_id: &str) -> ApiResult<()> {
        self.client
            .delete_connection()
            .connection_id(connection_id)
            .send()
            .await
            .map_err(sdk_error("DeleteConnection"))?;
        Ok(())
    }

    async fn confirm_connection(&self, connection_id: &str) -> ApiResult<ConnectionState> {
        let output = self
            .client
            .confirm_connection()
            .connection_id(connection_id)
            .send()
            .await
            .map_err(sdk_error("ConfirmConnection"))?;
        Ok(output
            .connection_state()
            .map(|s| ConnectionState::from(s.as_str()))
            .unwrap_or_else(|| ConnectionState::Unknown(String::new())))
    }

    async fn associate_connection_with_lag(
        &self,
        connection_id: &str,
        lag_id: &str,
    ) -> ApiResult<()> {
        self.client
            .associate_connection_with_lag()
            .connection_id(connection_id)
            .lag_id(lag_id)
            .send()
            .await
            .map_err(sdk_error("AssociateConnectionWithLag"))?;
        Ok(())
    }

    async fn disassociate_connection_from_lag(
        &self,
        connection_id: &str,
        lag_id: &str,
    ) -> ApiResult<()> {
        self.client
            .disassociate_connection_from_lag()
            .connection_id(connection_id)
            .lag_id(lag_id)
            .send()
            .await
            .map_err(sdk_error("DisassociateConnectionFromLag"))?;
        Ok(())
    }

    async fn describe_lags(&self, lag_id: Option<&str>) -> ApiResult<Vec<Lag>> {
        let output = self
            .client
            .describe_lags()
            .set_lag_id(owned(lag_id))
            .send()
            .await
            .map_err(sdk_error("DescribeLags"))?;
        Ok(output.lags().iter().map(lag).collect())
    }

    async fn create_lag(&self, input: CreateLagInput) -> ApiResult<String> {
        const OP: &str = "CreateLag";
        let output = self
            .client
            .create_lag()
            .lag_name(input.lag_name)
            .location(input.location)
            .connections_bandwidth(input.connections_bandwidth)
            .number_of_connections(input.number_of_connections)
            .set_connection_id(input.connection_id)
            .set_provider_name(input.provider_name)
            .set_tags(optional_tags(OP, input.tags)?)
            .send()
            .await
            .map_err(sdk_error(OP))?;
        owned(output.lag_id()).ok_or_else(|| missing_id(OP, "LAG"))
    }

    async fn update_lag(&self, lag_id: &str, lag_name: &str) -> ApiResult<()> {
        self.client
            .update_lag()
            .lag_id(lag_id)
            .lag_name(lag_name)
            .send()
            .await
            .map_err(sdk_error("UpdateLag"))?;
        Ok(())
    }

    async fn delete_lag(&self, lag_id: &str) -> ApiResult<()> {
        self.client
            .delete_lag()
            .lag_id(lag_id)
            .send()
            .await
            .map_err(sdk_error("DeleteLag"))?;
        Ok(())
    }

    async fn describe_gateways(&self, gateway_id: Option<&str>) -> ApiResult<Vec<Gateway>> {
        const OP: &str = "DescribeDirectConnectGateways";
        let mut gateways = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .client
                .describe_direct_connect_gateways()
                .set_direct_connect_gateway_id(owned(gateway_id))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(sdk_error(OP))?;
            gateways.extend(output.direct_connect_gateways().iter().map(gateway));
            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }
        Ok(gateways)
    }

    async fn create_gateway(&self, name: &str, amazon_side_asn: i64) -> ApiResult<String> {
        const OP: &str = "CreateDirectConnectGateway";
        let output = self
            .client
            .create_direct_connect_gateway()
            .direct_connect_gateway_name(name)
            .amazon_side_asn(amazon_side_asn)
            .send()
            .await
            .map_err(sdk_error(OP))?;
        output
            .direct_connect_gateway()
            .and_then(|g| owned(g.direct_connect_gateway_id()))
            .ok_or_else(|| missing_id(OP, "gateway"))
    }

    async fn update_gateway(&self, gateway_id: &str, new_name: &str) -> ApiResult<()> {
        self.client
            .update_direct_connect_gateway()
            .direct_connect_gateway_id(gateway_id)
            .new_direct_connect_gateway_name(new_name)
            .send()
            .await
            .map_err(sdk_error("UpdateDirectConnectGateway"))?;
        Ok(())
    }

    async fn delete_gateway(&self, gateway_id: &str) -> ApiResult<()> {
        self.client
            .delete_direct_connect_gateway()
            .direct_connect_gateway_id(gateway_id)
            .send()
            .await
            .map_err(sdk_error("DeleteDirectConnectGateway"))?;
        Ok(())
    }

    async fn describe_gateway_associations(
        &self,
        filter: GatewayAssociationFilter,
    ) -> ApiResult<Vec<GatewayAssociation>> {
        const OP: &str = "DescribeDirectConnectGatewayAssociations";
        let mut associations = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let output = self
                .client
                .describe_direct_connect_gateway_associations()
                .set_association_id(filter.association_id.clone())
                .set_direct_connect_gateway_id(filter.direct_connect_gateway_id.clone())
                .set_associated_gateway_id(filter.associated_gateway_id.clone())
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(sdk_error(OP))?;
            associations.extend(
                output
                    .direct_connect_gateway_associations()
                    .iter()
                    .map(gateway_association),
            );
            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }
        Ok(associations)
    }

    async fn create_gateway_association(
        &self,
        input: CreateGatewayAssociationInput,
    ) -> ApiResult<GatewayAssociation> {
        const OP: &str = "CreateDirectConnectGatewayAssociation";
        let output = self
            .client
            .create_direct_connect_gateway_association()
            .direct_connect_gateway_id(input.direct_connect_gateway_id)
            .gateway_id(input.gateway_id)
            .set_add_allowed_prefixes_to_direct_connect_gateway(prefixes_to(
                input.add_allowed_prefixes,
            ))
            .send()
            .await
            .map_err(sdk_error(OP))?;
        output
            .direct_connect_gateway_association()
            .map(gateway_association)
            .ok_or_else(|| missing_id(OP, "association"))
    }

    async fn update_gateway_association(
        &self,
        input: UpdateGatewayAssociationInput,
    ) -> ApiResult<()> {
        self.client
            .update_direct_connect_gateway_association()
            .association_id(input.association_id)
            .set_add_allowed_prefixes_to_direct_connect_gateway(prefixes_to(
                input.add_allowed_prefixes,
            ))
            .set_remove_allowed_prefixes_to_direct_connect_gateway(prefixes_to(
                input.remove_allowed_prefixes,
            ))
            .send()
            .await
            .map_err(sdk_error("UpdateDirectConnectGatewayAssociation"))?;
        Ok(())
    }

    async fn delete_gateway_association(&self, association_id: &str) -> ApiResult<()> {
        self.client
            .delete_direct_connect_gateway_association()
            .association_id(association_id)
            .send()
            .await
            .map_err(sdk_error("DeleteDirectConnectGatewayAssociation"))?;
        Ok(())
    }

    async fn accept_gateway_association_proposal(
        &self,
        input: AcceptProposalInput,
    ) -> ApiResult<GatewayAssociation> {
        const OP: &str = "AcceptDirectConnectGatewayAssociationProposal";
        let output = self
            .client
            .accept_direct_connect_gateway_association_proposal()
            .direct_connect_gateway_id(input.direct_connect_gateway_id)
            .proposal_id(input.proposal_id)
            .associated_gateway_owner_account(input.associated_gateway_owner_account)
            .set_override_allowed_prefixes_to_direct_connect_gateway(prefixes_to(
                input.override_allowed_prefixes,
            ))
            .send()
            .await
            .map_err(sdk_error(OP))?;
        output
            .direct_connect_gateway_association()
            .map(gateway_association)
            .ok_or_else(|| missing_id(OP, "association"))
    }

    async fn describe_gateway_association_proposals(
        &self,
        proposal_id: &str,
    ) -> ApiResult<Vec<GatewayAssociationProposal>> {
        let output = self
            .client
            .describe_direct_connect_gateway_association_proposals()
            .proposal_id(proposal_id)
            .send()
            .await
            .map_err(sdk_error("DescribeDirectConnectGatewayAssociationProposals"))?;
        Ok(output
            .direct_connect_gateway_association_proposals()
            .iter()
            .map(proposal)
            .collect())
    }

    async fn create_gateway_association_proposal(
        &self,
        input: CreateProposalInput,
    ) -> ApiResult<String> {
        const OP: &str = "CreateDirectConnectGatewayAssociationProposal";
        let output = self
            .client
            .create_direct_connect_gateway_association_proposal()
            .direct_connect_gateway_id(input.direct_connect_gateway_id)
            .direct_connect_gateway_owner_account(input.direct_connect_gateway_owner_account)
            .gateway_id(input.gateway_id)
            .set_add_allowed_prefixes_to_direct_connect_gateway(prefixes_to(
                input.add_allowed_prefixes,
            ))
            .send()
            .await
            .map_err(sdk_error(OP))?;
        output
            .direct_connect_gateway_association_proposal()
            .and_then(|p| owned(p.proposal_id()))
            .ok_or_else(|| missing_id(OP, "proposal"))
    }

    async fn delete_gateway_association_proposal(&self, proposal_id: &str) -> ApiResult<()> {
        self.client
            .delete_direct_connect_gateway_association_proposal()
            .proposal_id(proposal_id)
            .send()
            .await
            .map_err(sdk_error("DeleteDirectConnectGatewayAssociationProposal"))?;
        Ok(())
    }

    async fn describe_virtual_interfaces(
        &self,
        virtual_interface_id: Option<&str>,
    ) -> ApiResult<Vec<VirtualInterface>> {
        let output = self
            .client
            .describe_virtual_interfaces()
            .set_virtual_interface_id(owned(virtual_interface_id))
            .send()
            .await
            .map_err(sdk_error("DescribeVirtualInterfaces"))?;
        Ok(output
            .virtual_interfaces()
            .iter()
            .map(virtual_interface)
            .collect())
    }

    async fn create_virtual_interface(
        &self,
        connection_id: &str,
        input: NewVirtualInterface,
    ) -> ApiResult<String> {
        match input.interface_type {
            VirtualInterfaceType::Private => {
                const OP: &str = "CreatePrivateVirtualInterface";
                let spec = types::NewPrivateVirtualInterface::builder()
                    .virtual_interface_name(input.name)
                    .vlan(input.vlan)
                    .asn(asn32(OP, input.asn)?)
                    .set_mtu(input.mtu)
                    .set_auth_key(input.auth_key)
                    .set_amazon_address(input.amazon_address)
                    .set_customer_address(input.customer_address)
                    .set_address_family(address_family(input.address_family))
                    .set_virtual_gateway_id(input.virtual_gateway_id)
                    .set_direct_connect_gateway_id(input.direct_connect_gateway_id)
                    .set_enable_site_link(input.site_link_enabled)
                    .set_tags(optional_tags(OP, input.tags)?)
                    .build()
                    .map_err(build_error(OP))?;
                let output = self
                    .client
                    .create_private_virtual_interface()
                    .connection_id(connection_id)
                    .new_private_virtual_interface(spec)
                    .send()
                    .await
                    .map_err(sdk_error(OP))?;
                owned(output.virtual_interface_id()).ok_or_else(|| missing_id(OP, "interface"))
            }
            VirtualInterfaceType::Public => {
                const OP: &str = "CreatePublicVirtualInterface";
                let spec = types::NewPublicVirtualInterface::builder()
                    .virtual_interface_name(input.name)
                    .vlan(input.vlan)
                    .asn(asn32(OP, input.asn)?)
                    .set_auth_key(input.auth_key)
                    .set_amazon_address(input.amazon_address)
                    .set_customer_address(input.customer_address)
                    .set_address_family(address_family(input.address_family))
                    .set_route_filter_prefixes(prefixes_to(input.route_filter_prefixes))
                    .set_tags(optional_tags(OP, input.tags)?)
                    .build()
                    .map_err(build_error(OP))?;
                let output = self
                    .client
                    .create_public_virtual_interface()
                    .connection_id(connection_id)
                    .new_public_virtual_interface(spec)
                    .send()
                    .await
                    .map_err(sdk_error(OP))?;
                owned(output.virtual_interface_id()).ok_or_else(|| missing_id(OP, "interface"))
            }
            VirtualInterfaceType::Transit => {
                const OP: &str = "CreateTransitVirtualInterface";
                let spec = types::NewTransitVirtualInterface::builder()
                    .virtual_interface_name(input.name)
                    .vlan(input.vlan)
                    .asn(asn32(OP, input.asn)?)
                    .set_mtu(input.mtu)
                    .set_auth_key(input.auth_key)
                    .set_amazon_address(input.amazon_address)
                    .set_customer_address(input.customer_address)
                    .set_address_family(address_family(input.address_family))
                    .set_direct_connect_gateway_id(input.direct_connect_gateway_id)
                    .set_enable_site_link(input.site_link_enabled)
                    .set_tags(optional_tags(OP, input.tags)?)
                    .build();
                let output = self
                    .client
                    .create_transit_virtual_interface()
                    .connection_id(connection_id)
                    .new_transit_virtual_interface(spec)
                    .send()
                    .await
                    .map_err(sdk_error(OP))?;
                output
                    .virtual_interface()
                    .and_then(|v| owned(v.virtual_interface_id()))
                    .ok_or_else(|| missing_id(OP, "interface"))
            }
        }
    }

    async fn allocate_hosted_virtual_interface(
        &self,
        connection_id: &str,
        owner_account: &str,
        input: NewVirtualInterface,
    ) -> ApiResult<String> {
        match input.interface_type {
            VirtualInterfaceType::Private => {
                const OP: &str = "AllocatePrivateVirtualInterface";
                let spec = types::NewPrivateVirtualInterfaceAllocation::builder()
                    .virtual_interface_name(input.name)
                    .vlan(input.vlan)
                    .asn(asn32(OP, input.asn)?)
                    .set_mtu(input.mtu)
                    .set_auth_key(input.auth_key)
                    .set_amazon_address(input.amazon_address)
                    .set_customer_address(input.customer_address)
                    .set_address_family(address_family(input.address_family))
                    .set_tags(optional_tags(OP, input.tags)?)
                    .build()
                    .map_err(build_error(OP))?;
                let output = self
                    .client
                    .allocate_private_virtual_interface()
                    .connection_id(connection_id)
                    .owner_account(owner_account)
                    .new_private_virtual_interface_allocation(spec)
                    .send()
                    .await
                    .map_err(sdk_error(OP))?;
                owned(output.virtual_interface_id()).ok_or_else(|| missing_id(OP, "interface"))
            }
            VirtualInterfaceType::Public => {
                const OP: &str = "AllocatePublicVirtualInterface";
                let spec = types::NewPublicVirtualInterfaceAllocation::builder()
                    .virtual_interface_name(input.name)
                    .vlan(input.vlan)
                    .asn(asn32(OP, input.asn)?)
                    .set_auth_key(input.auth_key)
                    .set_amazon_address(input.amazon_address)
                    .set_customer_address(input.customer_address)
                    .set_address_family(address_family(input.address_family))
                    .set_route_filter_prefixes(prefixes_to(input.route_filter_prefixes))
                    .set_tags(optional_tags(OP, input.tags)?)
                    .build()
                    .map_err(build_error(OP))?;
                let output = self
                    .client
                    .allocate_public_virtual_interface()
                    .connection_id(connection_id)
                    .owner_account(owner_account)
                    .new_public_virtual_interface_allocation(spec)
                    .send()
                    .await
                    .map_err(sdk_error(OP))?;
                owned(output.virtual_interface_id()).ok_or_else(|| missing_id(OP, "interface"))
            }
            VirtualInterfaceType::Transit => {
                const OP: &str = "AllocateTransitVirtualInterface";
                let spec = types::NewTransitVirtualInterfaceAllocation::builder()
                    .virtual_interface_name(input.name)
                    .vlan(input.vlan)
                    .asn(asn32(OP, input.asn)?)
                    .set_mtu(input.mtu)
                    .set_auth_key(input.auth_key)
                    .set_amazon_address(input.amazon_address)
                    .set_customer_address(input.customer_address)
                    .set_address_family(address_family(input.address_family))
                    .set_tags(optional_tags(OP, input.tags)?)
                    .build();
                let output = self
                    .client
                    .allocate_transit_virtual_interface()
                    .connection_id(connection_id)
                    .owner_account(owner_account)
                    .new_transit_virtual_interface_allocation(spec)
                    .send()
                    .await
                    .map_err(sdk_error(OP))?;
                output
                    .virtual_interface()
                    .and_then(|v| owned(v.virtual_interface_id()))
                    .ok_or_else(|| missing_id(OP, "interface"))
            }
        }
    }

    async fn confirm_virtual_interface(
        &self,
        interface_type: VirtualInterfaceType,
        virtual_interface_id: &str,
        virtual_gateway_id: Option<&str>,
        direct_connect_gateway_id: Option<&str>,
    ) -> ApiResult<VirtualInterfaceState> {
        let state = match interface_type {
            VirtualInterfaceType::Private => self
                .client
                .confirm_private_virtual_interface()
                .virtual_interface_id(virtual_interface_id)
                .set_virtual_gateway_id(owned(virtual_gateway_id))
                .set_direct_connect_gateway_id(owned(direct_connect_gateway_id))
                .send()
                .await
                .map_err(sdk_error("ConfirmPrivateVirtualInterface"))?
                .virtual_interface_state()
                .cloned(),
            VirtualInterfaceType::Public => self
                .client
                .confirm_public_virtual_interface()
                .virtual_interface_id(virtual_interface_id)
                .send()
                .await
                .map_err(sdk_error("ConfirmPublicVirtualInterface"))?
                .virtual_interface_state()
                .cloned(),
            VirtualInterfaceType::Transit => self
                .client
                .confirm_transit_virtual_interface()
                .virtual_interface_id(virtual_interface_id)
                .set_direct_connect_gateway_id(owned(direct_connect_gateway_id))
                .send()
                .await
                .map_err(sdk_error("ConfirmTransitVirtualInterface"))?
                .virtual_interface_state()
                .cloned(),
        };
        Ok(state
            .map(|s| VirtualInterfaceState::from(s.as_str()))
            .unwrap_or_else(|| VirtualInterfaceState::Unknown(String::new())))
    }

    async fn update_virtual_interface_attributes(
        &self,
        input: UpdateVirtualInterfaceInput,
    ) -> ApiResult<()> {
        self.client
            .update_virtual_interface_attributes()
            .virtual_interface_id(input.virtual_interface_id)
            .set_virtual_interface_name(input.name)
            .set_mtu(input.mtu)
            .set_enable_site_link(input.site_link_enabled)
            .send()
            .await
            .map_err(sdk_error("UpdateVirtualInterfaceAttributes"))?;
        Ok(())
    }

    async fn delete_virtual_interface(
        &self,
        virtual_interface_id: &str,
    ) -> ApiResult<VirtualInterfaceState> {
        let output = self
            .client
            .delete_virtual_interface()
            .virtual_interface_id(virtual_interface_id)
            .send()
            .await
            .map_err(sdk_error("DeleteVirtualInterface"))?;
        Ok(output
            .virtual_interface_state()
            .map(|s| VirtualInterfaceState::from(s.as_str()))
            .unwrap_or_else(|| VirtualInterfaceState::Unknown(String::new())))
    }

    async fn create_bgp_peer(&self, virtual_interface_id: &str, peer: NewBgpPeer) -> ApiResult<()> {
        const OP: &str = "CreateBGPPeer";
        let spec = types::NewBgpPeer::builder()
            .asn(asn32(OP, peer.asn)?)
            .set_address_family(address_family(peer.address_family))
            .set_amazon_address(peer.amazon_address)
            .set_customer_address(peer.customer_address)
            .set_auth_key(peer.auth_key)
            .build();
        self.client
            .create_bgp_peer()
            .virtual_interface_id(virtual_interface_id)
            .new_bgp_peer(spec)
            .send()
            .await
            .map_err(sdk_error(OP))?;
        Ok(())
    }

    async fn delete_bgp_peer(
        &self,
        virtual_interface_id: &str,
        asn: i64,
        customer_address: Option<&str>,
    ) -> ApiResult<()> {
        const OP: &str = "DeleteBGPPeer";
        self.client
            .delete_bgp_peer()
            .virtual_interface_id(virtual_interface_id)
            .asn(asn32(OP, asn)?)
            .set_customer_address(owned(customer_address))
            .send()
            .await
            .map_err(sdk_error(OP))?;
        Ok(())
    }

    async fn associate_macsec_key(
        &self,
        connection_id: &str,
        secret_arn: Option<&str>,
        ckn: Option<&str>,
        cak: Option<&str>,
    ) -> ApiResult<MacSecAssociation> {
        let output = self
            .client
            .associate_mac_sec_key()
            .connection_id(connection_id)
            .set_secret_arn(owned(secret_arn))
            .set_ckn(owned(ckn))
            .set_cak(owned(cak))
            .send()
            .await
            .map_err(sdk_error("AssociateMacSecKey"))?;
        Ok(MacSecAssociation {
            connection_id: owned(output.connection_id()),
            keys: output.mac_sec_keys().iter().map(macsec_key).collect(),
        })
    }

    async fn disassociate_macsec_key(&self, connection_id: &str, secret_arn: &str) -> ApiResult<()> {
        self.client
            .disassociate_mac_sec_key()
            .connection_id(connection_id)
            .secret_arn(secret_arn)
            .send()
            .await
            .map_err(sdk_error("DisassociateMacSecKey"))?;
        Ok(())
    }

    async fn describe_locations(&self) -> ApiResult<Vec<Location>> {
        let output = self
            .client
            .describe_locations()
            .send()
            .await
            .map_err(sdk_error("DescribeLocations"))?;
        Ok(output.locations().iter().map(location).collect())
    }

    async fn tag_resource(&self, resource_arn: &str, tags: Tags) -> ApiResult<()> {
        const OP: &str = "TagResource";
        self.client
            .tag_resource()
            .resource_arn(resource_arn)
            .set_tags(Some(tags_to(OP, tags)?))
            .send()
            .await
            .map_err(sdk_error(OP))?;
        Ok(())
    }

    async fn untag_resource(&self, resource_arn: &str, tag_keys: Vec<String>) -> ApiResult<()> {
        self.client
            .untag_resource()
            .resource_arn(resource_arn)
            .set_tag_keys(Some(tag_keys))
            .send()
            .await
            .map_err(sdk_error("UntagResource"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prefix_list_is_omitted() {
        assert!(prefixes_to(vec![]).is_none());
        let prefixes = prefixes_to(vec!["10.0.0.0/16".to_string()]).unwrap();
        assert_eq!(prefixes_from(&prefixes), vec!["10.0.0.0/16".to_string()]);
    }

    #[test]
    fn asn_beyond_32_bits_is_rejected_before_the_call() {
        assert_eq!(asn32("CreateBGPPeer", 65000).unwrap(), 65000);
        let err = asn32("CreateBGPPeer", 4_200_000_000).unwrap_err();
        assert_eq!(err.code.as_deref(), Some("ValidationError"));
    }

    #[test]
    fn tags_are_sorted_by_key() {
        let mut tags = Tags::new();
        tags.insert("b".to_string(), "2".to_string());
        tags.insert("a".to_string(), "1".to_string());
        let sdk_tags = tags_to("TagResource", tags).unwrap();
        assert_eq!(sdk_tags[0].key(), "a");
        assert_eq!(tags_from(&sdk_tags).get("b").map(String::as_str), Some("2"));
    }
}
