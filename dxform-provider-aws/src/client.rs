//! The typed AWS client handed to every handler

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dxform_core::resource::Value;
use dxform_core::waiter::StateChangeConf;

use crate::api::DirectConnectApi;
use crate::config::{TimeoutsConfig, parse_duration};
use crate::error::{DxError, Result};

/// Create/update/delete deadlines for one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Timeouts {
    pub const fn minutes(create: u64, update: u64, delete: u64) -> Self {
        Self {
            create: Duration::from_secs(create * 60),
            update: Duration::from_secs(update * 60),
            delete: Duration::from_secs(delete * 60),
        }
    }
}

/// Provider-wide timeout overrides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeoutOverrides {
    pub create: Option<Duration>,
    pub update: Option<Duration>,
    pub delete: Option<Duration>,
}

impl TimeoutOverrides {
    pub fn from_config(config: &TimeoutsConfig) -> Result<Self> {
        let parse = |value: &Option<String>, name: &str| {
            value.as_deref().map(|s| parse_duration(s, name)).transpose()
        };
        Ok(Self {
            create: parse(&config.create, "timeouts.create")?,
            update: parse(&config.update, "timeouts.update")?,
            delete: parse(&config.delete, "timeouts.delete")?,
        })
    }
}

/// Shared state of every handler: the API seam and the account context
#[derive(Clone)]
pub struct AwsClient {
    pub dxconn: Arc<dyn DirectConnectApi>,
    pub region: String,
    pub partition: String,
    pub timeouts: TimeoutOverrides,
    /// Fixed probe interval; also caps the initial waiter delay
    pub poll_interval: Option<Duration>,
}

impl AwsClient {
    pub fn new(dxconn: Arc<dyn DirectConnectApi>, region: impl Into<String>, partition: impl Into<String>) -> Self {
        Self {
            dxconn,
            region: region.into(),
            partition: partition.into(),
            timeouts: TimeoutOverrides::default(),
            poll_interval: None,
        }
    }

    pub fn with_timeouts(mut self, timeouts: TimeoutOverrides) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_poll_interval(mut self, interval: Option<Duration>) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Effective timeouts for a resource.
    ///
    /// Resource defaults are overridden by the provider configuration, which is
    /// overridden by the resource's own `timeouts` attribute.
    pub fn timeouts(
        &self,
        defaults: Timeouts,
        attributes: &HashMap<String, Value>,
    ) -> Result<Timeouts> {
        let mut effective = Timeouts {
            create: self.timeouts.create.unwrap_or(defaults.create),
            update: self.timeouts.update.unwrap_or(defaults.update),
            delete: self.timeouts.delete.unwrap_or(defaults.delete),
        };

        let Some(value) = attributes.get("timeouts") else {
            return Ok(effective);
        };
        let Value::Map(map) = value else {
            return Err(DxError::InvalidAttribute {
                name: "timeouts".to_string(),
                message: "expected a map of create/update/delete durations".to_string(),
            });
        };

        for (key, value) in map {
            let Some(text) = value.as_str() else {
                return Err(DxError::InvalidAttribute {
                    name: format!("timeouts.{}", key),
                    message: "expected a duration string".to_string(),
                });
            };
            let name = format!("timeouts.{}", key);
            let duration = parse_duration(text, &name)?;
            match key.as_str() {
                "create" => effective.create = duration,
                "update" => effective.update = duration,
                "delete" => effective.delete = duration,
                _ => {
                    return Err(DxError::InvalidAttribute {
                        name,
                        message: "unknown timeout".to_string(),
                    });
                }
            }
        }

        Ok(effective)
    }

    /// Apply the configured probe cadence to a waiter
    pub fn tune(&self, conf: StateChangeConf) -> StateChangeConf {
        match self.poll_interval {
            Some(interval) => {
                let delay = conf.delay.min(interval);
                let min_timeout = conf.min_timeout.min(interval);
                conf.with_poll_interval(Some(interval))
                    .with_delay(delay)
                    .with_min_timeout(min_timeout)
            }
            None => conf,
        }
    }
}

impl std::fmt::Debug for AwsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsClient")
            .field("region", &self.region)
            .field("partition", &self.partition)
            .field("timeouts", &self.timeouts)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}
