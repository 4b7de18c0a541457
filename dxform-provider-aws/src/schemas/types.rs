//! Direct Connect attribute types
//!
//! Custom types wrap the validators in [`crate::validation`] so that schema
//! validation reports the same messages the validators produce.

use dxform_core::resource::Value;
use dxform_core::schema::{AttributeType, types};

use crate::config::parse_duration;
use crate::validation::{self, ValidationResult};

fn messages(result: ValidationResult) -> Result<(), String> {
    result.map_err(|errors| {
        errors
            .iter()
            .map(|e| e.message.clone())
            .collect::<Vec<_>>()
            .join("; ")
    })
}

/// Port speed of a dedicated connection or LAG member
pub fn bandwidth() -> AttributeType {
    AttributeType::Custom {
        name: "Bandwidth".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) => messages(validation::valid_connection_bandwidth(s, "bandwidth")),
            _ => Err("Expected string".to_string()),
        },
    }
}

/// Amazon side ASN of a Direct Connect gateway, given as a decimal string
pub fn amazon_side_asn() -> AttributeType {
    AttributeType::Custom {
        name: "AmazonSideAsn".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) => messages(validation::valid_amazon_side_asn(s, "amazon_side_asn")),
            _ => Err("Expected string".to_string()),
        },
    }
}

pub fn address_family() -> AttributeType {
    AttributeType::Custom {
        name: "AddressFamily".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) => messages(validation::valid_address_family(s, "address_family")),
            _ => Err("Expected string".to_string()),
        },
    }
}

/// MACsec encryption mode of a connection
pub fn encryption_mode() -> AttributeType {
    AttributeType::Custom {
        name: "EncryptionMode".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) => messages(validation::valid_encryption_mode(s, "encryption_mode")),
            _ => Err("Expected string".to_string()),
        },
    }
}

/// 802.1Q VLAN tag
pub fn vlan() -> AttributeType {
    AttributeType::Custom {
        name: "Vlan".to_string(),
        base: Box::new(AttributeType::Int),
        validate: |value| match value {
            Value::Int(n) => messages(validation::valid_vlan(*n, "vlan")),
            _ => Err("Expected integer".to_string()),
        },
    }
}

/// MTU of a private virtual interface: 1500 or 9001
pub fn private_mtu() -> AttributeType {
    AttributeType::Custom {
        name: "PrivateMtu".to_string(),
        base: Box::new(AttributeType::Int),
        validate: |value| match value {
            Value::Int(n) => messages(validation::valid_mtu(*n, 9001, "mtu")),
            _ => Err("Expected integer".to_string()),
        },
    }
}

/// MTU of a transit virtual interface: 1500 or 8500
pub fn transit_mtu() -> AttributeType {
    AttributeType::Custom {
        name: "TransitMtu".to_string(),
        base: Box::new(AttributeType::Int),
        validate: |value| match value {
            Value::Int(n) => messages(validation::valid_mtu(*n, 8500, "mtu")),
            _ => Err("Expected integer".to_string()),
        },
    }
}

/// MACsec connectivity association key name
pub fn ckn() -> AttributeType {
    AttributeType::Custom {
        name: "Ckn".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) => messages(validation::valid_ckn(s, "ckn")),
            _ => Err("Expected string".to_string()),
        },
    }
}

pub fn prefixes() -> AttributeType {
    AttributeType::List(Box::new(types::cidr()))
}

pub fn strings() -> AttributeType {
    AttributeType::List(Box::new(AttributeType::String))
}

/// Per-resource `timeouts` block: `create`, `update` and `delete` durations
pub fn timeouts() -> AttributeType {
    AttributeType::Custom {
        name: "Timeouts".to_string(),
        base: Box::new(AttributeType::Map(Box::new(AttributeType::String))),
        validate: |value| {
            let Value::Map(map) = value else {
                return Err("Expected map".to_string());
            };
            for (key, value) in map {
                if !matches!(key.as_str(), "create" | "update" | "delete") {
                    return Err(format!(
                        "unknown timeout '{}', expected create, update or delete",
                        key
                    ));
                }
                if let Some(text) = value.as_str() {
                    parse_duration(text, &format!("timeouts.{}", key))
                        .map_err(|e| e.to_string())?;
                }
            }
            Ok(())
        },
    }
}
