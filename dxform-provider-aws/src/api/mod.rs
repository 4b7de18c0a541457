//! The Direct Connect API seam
//!
//! Handlers talk to AWS only through [`DirectConnectApi`]. The production
//! implementation wraps the AWS SDK client ([`crate::sdk::SdkDirectConnect`]);
//! tests substitute an in-memory implementation.
//!
//! Each method is exactly one API call, except `describe_gateways`, which
//! follows pagination. Most create calls return only the new identifier;
//! callers read the object back through a finder.

pub mod model;

use async_trait::async_trait;

pub use model::*;

/// A failed Direct Connect call, normalised from the SDK error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{operation}: {}{message}", code.as_deref().map(|c| format!("{}: ", c)).unwrap_or_default())]
pub struct ApiError {
    pub operation: &'static str,
    pub code: Option<String>,
    pub message: String,
}

impl ApiError {
    pub fn new(operation: &'static str, code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            operation,
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    /// Whether the error code equals `code` and the message contains `fragment`
    pub fn matches(&self, code: &str, fragment: &str) -> bool {
        self.code.as_deref() == Some(code) && self.message.contains(fragment)
    }

    pub fn message_contains(&self, fragment: &str) -> bool {
        self.message.contains(fragment)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[async_trait]
pub trait DirectConnectApi: Send + Sync {
    // Connections
    async fn describe_connections(&self, connection_id: Option<&str>)
    -> ApiResult<Vec<Connection>>;
    async fn create_connection(&self, input: CreateConnectionInput) -> ApiResult<String>;
    async fn update_connection(&self, input: UpdateConnectionInput) -> ApiResult<()>;
    async fn delete_connection(&self, connection_id: &str) -> ApiResult<()>;
    /// Returns the connection state after confirmation
    async fn confirm_connection(&self, connection_id: &str) -> ApiResult<ConnectionState>;
    async fn associate_connection_with_lag(&self, connection_id: &str, lag_id: &str)
    -> ApiResult<()>;
    async fn disassociate_connection_from_lag(
        &self,
        connection_id: &str,
        lag_id: &str,
    ) -> ApiResult<()>;

    // Link aggregation groups
    async fn describe_lags(&self, lag_id: Option<&str>) -> ApiResult<Vec<Lag>>;
    async fn create_lag(&self, input: CreateLagInput) -> ApiResult<String>;
    async fn update_lag(&self, lag_id: &str, lag_name: &str) -> ApiResult<()>;
    async fn delete_lag(&self, lag_id: &str) -> ApiResult<()>;

    // Direct Connect gateways
    /// Follows pagination and returns every page
    async fn describe_gateways(&self, gateway_id: Option<&str>) -> ApiResult<Vec<Gateway>>;
    async fn create_gateway(&self, name: &str, amazon_side_asn: i64) -> ApiResult<String>;
    async fn update_gateway(&self, gateway_id: &str, new_name: &str) -> ApiResult<()>;
    async fn delete_gateway(&self, gateway_id: &str) -> ApiResult<()>;

    // Gateway associations
    async fn describe_gateway_associations(
        &self,
        filter: GatewayAssociationFilter,
    ) -> ApiResult<Vec<GatewayAssociation>>;
    async fn create_gateway_association(
        &self,
        input: CreateGatewayAssociationInput,
    ) -> ApiResult<GatewayAssociation>;
    async fn update_gateway_association(&self, input: UpdateGatewayAssociationInput)
    -> ApiResult<()>;
    async fn delete_gateway_association(&self, association_id: &str) -> ApiResult<()>;
    async fn accept_gateway_association_proposal(
        &self,
        input: AcceptProposalInput,
    ) -> ApiResult<GatewayAssociation>;

    // Gateway association proposals
    async fn describe_gateway_association_proposals(
        &self,
        proposal_id: &str,
    ) -> ApiResult<Vec<GatewayAssociationProposal>>;
    async fn create_gateway_association_proposal(
        &self,
        input: CreateProposalInput,
    ) -> ApiResult<String>;
    async fn delete_gateway_association_proposal(&self, proposal_id: &str) -> ApiResult<()>;

    // Virtual interfaces
    async fn describe_virtual_interfaces(
        &self,
        virtual_interface_id: Option<&str>,
    ) -> ApiResult<Vec<VirtualInterface>>;
    async fn create_virtual_interface(
        &self,
        connection_id: &str,
        input: NewVirtualInterface,
    ) -> ApiResult<String>;
    async fn allocate_hosted_virtual_interface(
        &self,
        connection_id: &str,
        owner_account: &str,
        input: NewVirtualInterface,
    ) -> ApiResult<String>;
    /// Accept a hosted interface on the owner side
    async fn confirm_virtual_interface(
        &self,
        interface_type: VirtualInterfaceType,
        virtual_interface_id: &str,
        virtual_gateway_id: Option<&str>,
        direct_connect_gateway_id: Option<&str>,
    ) -> ApiResult<VirtualInterfaceState>;
    async fn update_virtual_interface_attributes(
        &self,
        input: UpdateVirtualInterfaceInput,
    ) -> ApiResult<()>;
    async fn delete_virtual_interface(
        &self,
        virtual_interface_id: &str,
    ) -> ApiResult<VirtualInterfaceState>;

    // BGP peers
    async fn create_bgp_peer(&self, virtual_interface_id: &str, peer: NewBgpPeer)
    -> ApiResult<()>;
    async fn delete_bgp_peer(
        &self,
        virtual_interface_id: &str,
        asn: i64,
        customer_address: Option<&str>,
    ) -> ApiResult<()>;

    // MACsec
    async fn associate_macsec_key(
        &self,
        connection_id: &str,
        secret_arn: Option<&str>,
        ckn: Option<&str>,
        cak: Option<&str>,
    ) -> ApiResult<MacSecAssociation>;
    async fn disassociate_macsec_key(&self, connection_id: &str, secret_arn: &str)
    -> ApiResult<()>;

    // Locations
    async fn describe_locations(&self) -> ApiResult<Vec<Location>>;

    // Tags
    async fn tag_resource(&self, resource_arn: &str, tags: Tags) -> ApiResult<()>;
    async fn untag_resource(&self, resource_arn: &str, tag_keys: Vec<String>) -> ApiResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_code() {
        let err = ApiError::new(
            "DescribeConnections",
            Some("DirectConnectClientException"),
            "Could not find Connection with ID dxcon-1",
        );
        assert_eq!(
            err.to_string(),
            "DescribeConnections: DirectConnectClientException: Could not find Connection with ID dxcon-1"
        );
        assert!(err.matches("DirectConnectClientException", "Could not find"));
    }

    #[test]
    fn api_error_display_without_code() {
        let err = ApiError::new("DeleteLag", None, "timed out");
        assert_eq!(err.to_string(), "DeleteLag: timed out");
    }
}
