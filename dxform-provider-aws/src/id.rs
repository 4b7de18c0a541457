//! Composite resource identifiers
//!
//! Resources that are not addressable by a single AWS ID store a composite
//! identifier built from their parts. Every `*_create_resource_id` has an
//! inverse `*_parse_resource_id`.

use crate::error::{DxError, Result};

const GATEWAY_ASSOCIATION_SEPARATOR: char = '/';
const CONNECTION_ASSOCIATION_SEPARATOR: char = '/';
const MACSEC_SEPARATOR: char = '_';
const BGP_PEER_SEPARATOR: char = '-';

fn invalid(id: &str, expected: &str) -> DxError {
    DxError::InvalidId {
        id: id.to_string(),
        message: format!("expected {}", expected),
    }
}

pub fn gateway_association_create_resource_id(
    dx_gateway_id: &str,
    associated_gateway_id: &str,
) -> String {
    format!(
        "{}{}{}",
        dx_gateway_id, GATEWAY_ASSOCIATION_SEPARATOR, associated_gateway_id
    )
}

/// Returns `(dx_gateway_id, associated_gateway_id)`
pub fn gateway_association_parse_resource_id(id: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = id.split(GATEWAY_ASSOCIATION_SEPARATOR).collect();
    match parts.as_slice() {
        [dxgw, gw] if !dxgw.is_empty() && !gw.is_empty() => {
            Ok((dxgw.to_string(), gw.to_string()))
        }
        _ => Err(invalid(id, "DX-GATEWAY-ID/ASSOCIATED-GATEWAY-ID")),
    }
}

pub fn connection_association_create_resource_id(connection_id: &str, lag_id: &str) -> String {
    format!(
        "{}{}{}",
        connection_id, CONNECTION_ASSOCIATION_SEPARATOR, lag_id
    )
}

/// Returns `(connection_id, lag_id)`
pub fn connection_association_parse_resource_id(id: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = id.split(CONNECTION_ASSOCIATION_SEPARATOR).collect();
    match parts.as_slice() {
        [conn, lag] if !conn.is_empty() && !lag.is_empty() => {
            Ok((conn.to_string(), lag.to_string()))
        }
        _ => Err(invalid(id, "CONNECTION-ID/LAG-ID")),
    }
}

pub fn macsec_key_association_create_resource_id(secret_arn: &str, connection_id: &str) -> String {
    format!("{}{}{}", secret_arn, MACSEC_SEPARATOR, connection_id)
}

/// Returns `(secret_arn, connection_id)`.
///
/// Secret ARNs may contain `_`; connection IDs never do, so the split is on the
/// last separator.
pub fn macsec_key_association_parse_resource_id(id: &str) -> Result<(String, String)> {
    match id.rsplit_once(MACSEC_SEPARATOR) {
        Some((arn, conn)) if !arn.is_empty() && !conn.is_empty() => {
            Ok((arn.to_string(), conn.to_string()))
        }
        _ => Err(invalid(id, "SECRET-ARN_CONNECTION-ID")),
    }
}

pub fn bgp_peer_create_resource_id(
    virtual_interface_id: &str,
    address_family: &str,
    asn: i64,
) -> String {
    format!(
        "{}{sep}{}{sep}{}",
        virtual_interface_id,
        address_family,
        asn,
        sep = BGP_PEER_SEPARATOR
    )
}

/// Returns `(virtual_interface_id, address_family, asn)`.
///
/// Interface IDs contain `-` themselves (`dxvif-...`), so the two trailing
/// components are split off from the right.
pub fn bgp_peer_parse_resource_id(id: &str) -> Result<(String, String, i64)> {
    let mut parts = id.rsplitn(3, BGP_PEER_SEPARATOR);
    let (Some(asn), Some(family), Some(vif)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid(id, "VIRTUAL-INTERFACE-ID-ADDRESS-FAMILY-ASN"));
    };
    if vif.is_empty() || family.is_empty() {
        return Err(invalid(id, "VIRTUAL-INTERFACE-ID-ADDRESS-FAMILY-ASN"));
    }
    let asn = asn
        .parse::<i64>()
        .map_err(|_| invalid(id, "a numeric ASN as the last component"))?;
    Ok((vif.to_string(), family.to_string(), asn))
}
