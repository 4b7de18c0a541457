//! Provider configuration

use std::time::Duration;

use serde::Deserialize;

use crate::arn::partition_for_region;
use crate::error::{DxError, Result};

/// The `provider` block of a configuration file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// AWS region; falls back to the SDK's default resolution chain
    #[serde(default)]
    pub region: Option<String>,
    /// Named profile from the shared AWS config files
    #[serde(default)]
    pub profile: Option<String>,
    /// Custom Direct Connect endpoint (e.g. a local emulator)
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Overrides the partition derived from the region
    #[serde(default)]
    pub partition: Option<String>,
    /// Provider-wide operation timeouts, e.g. `{"create": "20m"}`
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
    /// Fixed interval between status probes, disabling backoff
    #[serde(default)]
    pub poll_interval: Option<String>,
}

impl ProviderConfig {
    pub fn partition(&self, region: &str) -> String {
        self.partition
            .clone()
            .unwrap_or_else(|| partition_for_region(region).to_string())
    }

    pub fn poll_interval(&self) -> Result<Option<Duration>> {
        self.poll_interval
            .as_deref()
            .map(|s| parse_duration(s, "poll_interval"))
            .transpose()
    }
}

/// Timeout overrides as human-readable durations
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TimeoutsConfig {
    #[serde(default)]
    pub create: Option<String>,
    #[serde(default)]
    pub update: Option<String>,
    #[serde(default)]
    pub delete: Option<String>,
}

/// Parse a duration such as `"30s"`, `"10m"`, `"1h30m"` or `"500ms"`
pub fn parse_duration(input: &str, name: &str) -> Result<Duration> {
    let invalid = |message: &str| DxError::InvalidAttribute {
        name: name.to_string(),
        message: format!("{} in duration {:?}", message, input),
    };

    let input = input.trim();
    if input.is_empty() {
        return Err(invalid("empty value"));
    }

    let mut total = Duration::ZERO;
    let mut rest = input;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| invalid("missing unit"))?;
        if digits == 0 {
            return Err(invalid("expected a number"));
        }
        let amount: u64 = rest[..digits]
            .parse()
            .map_err(|_| invalid("number out of range"))?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let step = match &rest[..unit_len] {
            "ms" => Some(Duration::from_millis(amount)),
            "s" => Some(Duration::from_secs(amount)),
            "m" => amount.checked_mul(60).map(Duration::from_secs),
            "h" => amount.checked_mul(3600).map(Duration::from_secs),
            other => return Err(invalid(&format!("unknown unit {:?}", other))),
        };
        total = step
            .and_then(|step| total.checked_add(step))
            .ok_or_else(|| invalid("duration out of range"))?;
        rest = &rest[unit_len..];
    }

    Ok(total)
}
