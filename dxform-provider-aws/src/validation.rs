//! Attribute validators
//!
//! Validators check configuration values before any API call is made. Each
//! returns every problem found, keyed by the attribute path.

/// Validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Result type for validation
pub type ValidationResult = Result<(), Vec<ValidationError>>;

fn fail(path: &str, message: String) -> ValidationResult {
    Err(vec![ValidationError {
        path: path.to_string(),
        message,
    }])
}

/// Port and hosted-connection speeds Direct Connect offers
pub const CONNECTION_BANDWIDTHS: &[&str] = &[
    "1Gbps", "2Gbps", "5Gbps", "10Gbps", "100Gbps", "50Mbps", "100Mbps", "200Mbps", "300Mbps",
    "400Mbps", "500Mbps",
];

/// ASNs Amazon used before private ASNs were supported
const LEGACY_AMAZON_SIDE_ASNS: &[i64] = &[7224, 9059, 10124, 17493];

const PRIVATE_ASN_16: (i64, i64) = (64512, 65534);
const PRIVATE_ASN_32: (i64, i64) = (4_200_000_000, 4_294_967_294);

pub const ADDRESS_FAMILIES: &[&str] = &["ipv4", "ipv6"];

pub const ENCRYPTION_MODES: &[&str] = &["no_encrypt", "should_encrypt", "must_encrypt"];

pub fn valid_connection_bandwidth(value: &str, path: &str) -> ValidationResult {
    if CONNECTION_BANDWIDTHS.contains(&value) {
        Ok(())
    } else {
        fail(
            path,
            format!(
                "expected {} to be one of [{}], got {}",
                path,
                CONNECTION_BANDWIDTHS.join(", "),
                value
            ),
        )
    }
}

/// Amazon-side ASN of a Direct Connect gateway.
///
/// Accepts the legacy public ASNs and the two private ranges. Input is the
/// decimal string as written in configuration.
pub fn valid_amazon_side_asn(value: &str, path: &str) -> ValidationResult {
    let digits = !value.is_empty() && value.chars().all(|c| c.is_ascii_digit());
    let Some(asn) = digits.then(|| value.parse::<i64>().ok()).flatten() else {
        return fail(
            path,
            format!("{} should be a valid ASN, got {:?}", path, value),
        );
    };

    let in_range = |(lo, hi): (i64, i64)| (lo..=hi).contains(&asn);
    if LEGACY_AMAZON_SIDE_ASNS.contains(&asn) || in_range(PRIVATE_ASN_16) || in_range(PRIVATE_ASN_32)
    {
        Ok(())
    } else {
        fail(
            path,
            format!(
                "{} must be 7224, 9059, 10124 or 17493 or in the range 64512 to 65534 or 4200000000 to 4294967294, got {}",
                path, asn
            ),
        )
    }
}

pub fn valid_address_family(value: &str, path: &str) -> ValidationResult {
    if ADDRESS_FAMILIES.contains(&value) {
        Ok(())
    } else {
        fail(
            path,
            format!("expected {} to be one of [ipv4, ipv6], got {}", path, value),
        )
    }
}

/// VLAN tags usable on a virtual interface
pub fn valid_vlan(value: i64, path: &str) -> ValidationResult {
    if (1..=4094).contains(&value) {
        Ok(())
    } else {
        fail(
            path,
            format!("expected {} to be in the range (1 - 4094), got {}", path, value),
        )
    }
}

/// MTU values a virtual interface accepts; `jumbo` is 9001 for private and
/// 8500 for transit interfaces
pub fn valid_mtu(value: i64, jumbo: i64, path: &str) -> ValidationResult {
    if value == 1500 || value == jumbo {
        Ok(())
    } else {
        fail(
            path,
            format!(
                "expected {} to be one of [1500, {}], got {}",
                path, jumbo, value
            ),
        )
    }
}

/// MACsec connectivity association key name: 64 hexadecimal characters
pub fn valid_ckn(value: &str, path: &str) -> ValidationResult {
    if value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        fail(
            path,
            format!("{} must be 64 hexadecimal characters", path),
        )
    }
}

pub fn valid_encryption_mode(value: &str, path: &str) -> ValidationResult {
    if ENCRYPTION_MODES.contains(&value) {
        Ok(())
    } else {
        fail(
            path,
            format!(
                "expected {} to be one of [{}], got {}",
                path,
                ENCRYPTION_MODES.join(", "),
                value
            ),
        )
    }
}
