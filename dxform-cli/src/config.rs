//! Loading `dxform.json`

use std::collections::{HashMap, HashSet};
use std::path::Path;

use dxform_core::differ::dependencies_of;
use dxform_core::resource::{Resource, Value};
use dxform_provider_aws::config::ProviderConfig;
use dxform_provider_aws::resources::{DataSourceKind, ResourceKind};
use dxform_state::BackendConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    provider: ProviderConfig,
    #[serde(default)]
    backend: BackendConfig,
    #[serde(default)]
    resources: Vec<ResourceDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResourceDecl {
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    /// Data source lookup instead of a managed resource
    #[serde(default)]
    data: bool,
    #[serde(default)]
    attributes: serde_json::Map<String, serde_json::Value>,
}

/// A parsed configuration file
#[derive(Debug)]
pub struct Config {
    pub provider: ProviderConfig,
    pub backend: BackendConfig,
    pub resources: Vec<Resource>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::parse(&content).map_err(|e| format!("{}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        let raw: RawConfig =
            serde_json::from_str(content).map_err(|e| format!("Parse error: {}", e))?;

        let mut names = HashSet::new();
        let mut resources = Vec::with_capacity(raw.resources.len());
        for decl in raw.resources {
            // References name the binding only, so names are unique across types
            if !names.insert(decl.name.clone()) {
                return Err(format!("Duplicate resource name '{}'", decl.name));
            }
            let known = if decl.data {
                DataSourceKind::from_name(&decl.resource_type).is_some()
            } else {
                ResourceKind::from_name(&decl.resource_type).is_some()
            };
            if !known {
                return Err(format!(
                    "Unknown {} type '{}' for '{}'",
                    if decl.data { "data source" } else { "resource" },
                    decl.resource_type,
                    decl.name
                ));
            }

            let mut resource =
                Resource::new(&decl.resource_type, &decl.name).with_read_only(decl.data);
            for (key, value) in &decl.attributes {
                if let Some(value) = Value::from_json(value) {
                    resource.attributes.insert(key.clone(), value);
                }
            }
            resources.push(resource);
        }

        for resource in &resources {
            for dep in dependencies_of(resource) {
                if !names.contains(&dep) {
                    return Err(format!(
                        "{} references unknown resource '{}'",
                        resource.id, dep
                    ));
                }
            }
        }

        Ok(Self {
            provider: raw.provider,
            backend: raw.backend,
            resources,
        })
    }

    /// Managed resources only
    pub fn managed(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(|r| !r.is_data_source())
    }

    /// Check every declaration against its schema. References are accepted
    /// as any type since their values are only known at apply time.
    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();
        for resource in &self.resources {
            let schema = if resource.is_data_source() {
                DataSourceKind::from_name(&resource.id.resource_type).map(|k| k.schema())
            } else {
                ResourceKind::from_name(&resource.id.resource_type).map(|k| k.schema())
            };
            let Some(schema) = schema else {
                continue;
            };
            if let Err(type_errors) = schema.validate(&resource.attributes) {
                errors.extend(type_errors.iter().map(|e| format!("{}: {}", resource.id, e)));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(format!("Validation failed:\n  {}", errors.join("\n  ")))
        }
    }
}

/// Managed resource schemas keyed by type, for planning
pub fn resource_schemas() -> HashMap<String, dxform_core::schema::ResourceSchema> {
    ResourceKind::all()
        .iter()
        .map(|k| (k.name().to_string(), k.schema()))
        .collect()
}
