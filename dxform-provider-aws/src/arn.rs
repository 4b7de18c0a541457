//! ARN construction for Direct Connect resources

use std::fmt;

const SERVICE: &str = "directconnect";

/// An Amazon Resource Name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account_id: String,
    pub resource: String,
}

impl Arn {
    pub fn directconnect(partition: &str, region: &str, account_id: &str, resource: String) -> Self {
        Self {
            partition: partition.to_string(),
            service: SERVICE.to_string(),
            region: region.to_string(),
            account_id: account_id.to_string(),
            resource,
        }
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account_id, self.resource
        )
    }
}

/// Partition a region belongs to
pub fn partition_for_region(region: &str) -> &'static str {
    if region.starts_with("cn-") {
        "aws-cn"
    } else if region.starts_with("us-gov-") {
        "aws-us-gov"
    } else if region.starts_with("us-iso-") {
        "aws-iso"
    } else if region.starts_with("us-isob-") {
        "aws-iso-b"
    } else {
        "aws"
    }
}

pub fn connection_arn(partition: &str, region: &str, account_id: &str, id: &str) -> String {
    Arn::directconnect(partition, region, account_id, format!("dxcon/{}", id)).to_string()
}

pub fn lag_arn(partition: &str, region: &str, account_id: &str, id: &str) -> String {
    Arn::directconnect(partition, region, account_id, format!("dxlag/{}", id)).to_string()
}

pub fn virtual_interface_arn(partition: &str, region: &str, account_id: &str, id: &str) -> String {
    Arn::directconnect(partition, region, account_id, format!("dxvif/{}", id)).to_string()
}

/// Gateways are global; their ARN has no region
pub fn gateway_arn(partition: &str, account_id: &str, id: &str) -> String {
    Arn::directconnect(partition, "", account_id, format!("dx-gateway/{}", id)).to_string()
}
