//! Direct Connect resource and data source schemas

pub mod connection;
pub mod data_sources;
pub mod gateway;
pub mod macsec;
pub mod types;
pub mod virtual_interface;

use dxform_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types as core_types};

use crate::resources::{DataSourceKind, ResourceKind};

/// Returns all Direct Connect schemas, resources first
pub fn all_schemas() -> Vec<ResourceSchema> {
    let mut schemas: Vec<ResourceSchema> = ResourceKind::all().iter().map(|k| k.schema()).collect();
    schemas.extend(DataSourceKind::all().iter().map(|k| k.schema()));
    schemas
}

fn computed_string(name: &str) -> AttributeSchema {
    AttributeSchema::new(name, AttributeType::String).read_only()
}

fn arn() -> AttributeSchema {
    computed_string("arn").with_description("ARN of the resource")
}

fn tags() -> AttributeSchema {
    AttributeSchema::new("tags", core_types::tags())
}

fn timeouts() -> AttributeSchema {
    AttributeSchema::new("timeouts", types::timeouts())
        .with_description("Overrides of the create, update and delete timeouts")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn schema_names_are_unique_per_namespace() {
        let schemas = all_schemas();
        let resources: HashSet<_> = schemas
            .iter()
            .filter(|s| !s.data_source)
            .map(|s| s.resource_type.clone())
            .collect();
        let data_sources = schemas.iter().filter(|s| s.data_source).count();

        assert_eq!(resources.len(), ResourceKind::all().len());
        assert_eq!(data_sources, DataSourceKind::all().len());
        assert!(resources.contains("dx_hosted_transit_virtual_interface_accepter"));
    }

    #[test]
    fn every_resource_accepts_timeouts() {
        for schema in all_schemas().iter().filter(|s| !s.data_source) {
            assert!(
                schema.attributes.contains_key("timeouts"),
                "{} has no timeouts",
                schema.resource_type
            );
        }
    }
}
