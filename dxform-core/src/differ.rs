//! Differ - Compare desired state with current state to generate a Plan
//!
//! Compares the "desired state" declared in configuration with the "current
//! state" read from the Provider, and generates the Effects needed to converge.

use std::collections::{HashMap, HashSet};

use crate::effect::Effect;
use crate::interpreter::resolve_references;
use crate::plan::Plan;
use crate::resource::{Resource, ResourceId, State, Value};
use crate::schema::ResourceSchema;

/// Result of a diff operation
#[derive(Debug, Clone, PartialEq)]
pub enum Diff {
    /// Resource does not exist -> needs creation
    Create(Resource),
    /// Resource exists with differences -> needs update
    Update {
        id: ResourceId,
        from: State,
        to: Resource,
        changed_attributes: Vec<String>,
    },
    /// A force-new attribute differs -> needs replacement
    Replace {
        id: ResourceId,
        from: State,
        to: Resource,
        changed_attributes: Vec<String>,
    },
    /// Resource exists with no differences -> no action needed
    NoChange(ResourceId),
}

impl Diff {
    /// Returns whether this Diff involves a change
    pub fn is_change(&self) -> bool {
        !matches!(self, Diff::NoChange(_))
    }
}

/// Compare desired state with current state to compute a Diff
pub fn diff(desired: &Resource, current: &State, schema: Option<&ResourceSchema>) -> Diff {
    if !current.exists {
        return Diff::Create(desired.clone());
    }

    let changed = find_changed_attributes(&desired.attributes, &current.attributes);

    if changed.is_empty() {
        return Diff::NoChange(desired.id.clone());
    }

    let replace = schema.is_some_and(|s| changed.iter().any(|name| s.forces_new(name)));
    if replace {
        Diff::Replace {
            id: desired.id.clone(),
            from: current.clone(),
            to: desired.clone(),
            changed_attributes: changed,
        }
    } else {
        Diff::Update {
            id: desired.id.clone(),
            from: current.clone(),
            to: desired.clone(),
            changed_attributes: changed,
        }
    }
}

/// Find changed attributes between desired and current state
fn find_changed_attributes(
    desired: &HashMap<String, Value>,
    current: &HashMap<String, Value>,
) -> Vec<String> {
    let mut changed: Vec<String> = desired
        .iter()
        .filter(|(key, desired_value)| match current.get(key.as_str()) {
            Some(current_value) => !values_equal(desired_value, current_value),
            None => true,
        })
        .map(|(key, _)| key.clone())
        .collect();
    changed.sort();
    changed
}

/// Structural equality where an integer and its decimal string are the same value
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(n), Value::String(s)) | (Value::String(s), Value::Int(n)) => {
            s.parse::<i64>().is_ok_and(|parsed| parsed == *n)
        }
        (Value::List(xs), Value::List(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Map(xs), Value::Map(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Binding names referenced anywhere in a resource's attributes
pub fn dependencies_of(resource: &Resource) -> HashSet<String> {
    fn collect(value: &Value, deps: &mut HashSet<String>) {
        match value {
            Value::ResourceRef(binding, _) => {
                deps.insert(binding.clone());
            }
            Value::List(items) => items.iter().for_each(|item| collect(item, deps)),
            Value::Map(map) => map.values().for_each(|v| collect(v, deps)),
            _ => {}
        }
    }

    let mut deps = HashSet::new();
    for value in resource.attributes.values() {
        collect(value, &mut deps);
    }
    deps
}

/// Sort resources topologically so that referenced resources come first.
///
/// Declaration order is kept among independent resources. Cycles are broken
/// at the first back edge.
pub fn sort_by_dependencies(resources: &[Resource]) -> Vec<Resource> {
    let by_name: HashMap<&str, &Resource> = resources
        .iter()
        .map(|r| (r.id.name.as_str(), r))
        .collect();

    let mut sorted = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut visiting: HashSet<String> = HashSet::new();

    fn visit(
        resource: &Resource,
        by_name: &HashMap<&str, &Resource>,
        visited: &mut HashSet<String>,
        visiting: &mut HashSet<String>,
        sorted: &mut Vec<Resource>,
    ) {
        let name = &resource.id.name;
        if visited.contains(name) || visiting.contains(name) {
            return;
        }

        visiting.insert(name.clone());

        let mut deps: Vec<String> = dependencies_of(resource).into_iter().collect();
        deps.sort();
        for dep in deps {
            if let Some(dep_resource) = by_name.get(dep.as_str()) {
                visit(dep_resource, by_name, visited, visiting, sorted);
            }
        }

        visiting.remove(name);
        visited.insert(name.clone());
        sorted.push(resource.clone());
    }

    for resource in resources {
        visit(
            resource,
            &by_name,
            &mut visited,
            &mut visiting,
            &mut sorted,
        );
    }

    sorted
}

/// Compute Diffs for all declared resources and generate a Plan.
///
/// `current_states` holds the refreshed state of every resource known to the
/// state file. Known resources that are no longer declared are deleted, after
/// all other effects.
pub fn create_plan(
    desired: &[Resource],
    current_states: &HashMap<ResourceId, State>,
    schemas: &HashMap<String, ResourceSchema>,
) -> Plan {
    let mut plan = Plan::new();

    let bindings: HashMap<String, State> = current_states
        .values()
        .filter(|s| s.exists)
        .map(|s| (s.id.name.clone(), s.clone()))
        .collect();

    let sorted = sort_by_dependencies(desired);
    for resource in &sorted {
        if resource.is_data_source() {
            plan.add(Effect::Read(resource.clone()));
            continue;
        }

        let resolved = resolve_references(resource, &bindings);
        let current = current_states
            .get(&resource.id)
            .cloned()
            .unwrap_or_else(|| State::not_found(resource.id.clone()));

        match diff(&resolved, &current, schemas.get(&resource.id.resource_type)) {
            Diff::Create(_) => plan.add(Effect::Create(resource.clone())),
            Diff::Update {
                id,
                from,
                changed_attributes,
                ..
            } => plan.add(Effect::Update {
                id,
                from,
                to: resource.clone(),
                changed: changed_attributes,
            }),
            Diff::Replace {
                id,
                from,
                changed_attributes,
                ..
            } => plan.add(Effect::Replace {
                id,
                from,
                to: resource.clone(),
                changed: changed_attributes,
            }),
            Diff::NoChange(_) => {}
        }
    }

    let declared: HashSet<&ResourceId> = desired.iter().map(|r| &r.id).collect();
    let mut orphans: Vec<&State> = current_states
        .values()
        .filter(|s| s.exists && !declared.contains(&s.id))
        .collect();
    orphans.sort_by(|a, b| b.id.to_string().cmp(&a.id.to_string()));
    for state in orphans {
        plan.add(Effect::Delete(state.clone()));
    }

    plan
}

/// Plan deletion of every existing declared resource, dependents first
pub fn create_destroy_plan(
    desired: &[Resource],
    current_states: &HashMap<ResourceId, State>,
) -> Plan {
    let mut plan = Plan::new();

    for resource in sort_by_dependencies(desired).iter().rev() {
        if resource.is_data_source() {
            continue;
        }
        if let Some(state) = current_states.get(&resource.id)
            && state.exists
        {
            plan.add(Effect::Delete(state.clone()));
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeSchema, AttributeType};

    fn gateway_schema() -> ResourceSchema {
        ResourceSchema::new("dx_gateway")
            .attribute(AttributeSchema::new("name", AttributeType::String).required())
            .attribute(
                AttributeSchema::new("amazon_side_asn", AttributeType::String)
                    .required()
                    .force_new(),
            )
    }

    fn existing(resource_type: &str, name: &str, attrs: &[(&str, Value)]) -> State {
        State::existing(
            ResourceId::new(resource_type, name),
            attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
        .with_identifier(format!("{}-id", name))
    }

    #[test]
    fn diff_create_when_not_exists() {
        let desired = Resource::new("dx_gateway", "gw");
        let current = State::not_found(ResourceId::new("dx_gateway", "gw"));

        assert!(matches!(diff(&desired, &current, None), Diff::Create(_)));
    }

    #[test]
    fn diff_no_change_when_same() {
        let desired = Resource::new("dx_gateway", "gw").with_attribute("name", "edge");
        let current = existing("dx_gateway", "gw", &[("name", Value::from("edge"))]);

        assert!(!diff(&desired, &current, None).is_change());
    }

    #[test]
    fn diff_treats_numeric_string_as_int() {
        let desired = Resource::new("dx_gateway", "gw").with_attribute("amazon_side_asn", "64512");
        let current = existing("dx_gateway", "gw", &[("amazon_side_asn", Value::Int(64512))]);

        assert!(!diff(&desired, &current, None).is_change());
    }

    #[test]
    fn diff_update_when_mutable_attribute_differs() {
        let schema = gateway_schema();
        let desired = Resource::new("dx_gateway", "gw").with_attribute("name", "new");
        let current = existing("dx_gateway", "gw", &[("name", Value::from("old"))]);

        match diff(&desired, &current, Some(&schema)) {
            Diff::Update {
                changed_attributes, ..
            } => assert_eq!(changed_attributes, vec!["name".to_string()]),
            other => panic!("Expected Update, got {:?}", other),
        }
    }

    #[test]
    fn diff_replace_when_force_new_attribute_differs() {
        let schema = gateway_schema();
        let desired = Resource::new("dx_gateway", "gw")
            .with_attribute("name", "edge")
            .with_attribute("amazon_side_asn", "64513");
        let current = existing(
            "dx_gateway",
            "gw",
            &[
                ("name", Value::from("edge")),
                ("amazon_side_asn", Value::from("64512")),
            ],
        );

        assert!(matches!(
            diff(&desired, &current, Some(&schema)),
            Diff::Replace { .. }
        ));
    }

    #[test]
    fn sort_puts_references_first() {
        let vif = Resource::new("dx_private_virtual_interface", "vif")
            .with_attribute("connection_id", Value::ResourceRef("conn".into(), "id".into()));
        let peer = Resource::new("dx_bgp_peer", "peer")
            .with_attribute("virtual_interface_id", Value::ResourceRef("vif".into(), "id".into()));
        let conn = Resource::new("dx_connection", "conn");

        let sorted = sort_by_dependencies(&[peer, vif, conn]);
        let names: Vec<&str> = sorted.iter().map(|r| r.id.name.as_str()).collect();
        assert_eq!(names, vec!["conn", "vif", "peer"]);
    }

    #[test]
    fn create_plan_resolves_references_before_comparing() {
        let conn_state = existing("dx_connection", "conn", &[]);
        let lag_state = existing(
            "dx_connection_association",
            "assoc",
            &[("connection_id", Value::from("conn-id"))],
        );
        let desired = vec![
            Resource::new("dx_connection", "conn"),
            Resource::new("dx_connection_association", "assoc")
                .with_attribute("connection_id", Value::ResourceRef("conn".into(), "id".into())),
        ];
        let current: HashMap<ResourceId, State> = [conn_state, lag_state]
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();

        let plan = create_plan(&desired, &current, &HashMap::new());
        assert!(plan.is_empty(), "unexpected effects: {:?}", plan.effects());
    }

    #[test]
    fn create_plan_reads_data_sources_and_deletes_orphans() {
        let desired = vec![
            Resource::new("dx_location", "loc").with_read_only(true),
            Resource::new("dx_gateway", "new"),
        ];
        let orphan = existing("dx_gateway", "old", &[]);
        let current: HashMap<ResourceId, State> =
            [(orphan.id.clone(), orphan)].into_iter().collect();

        let plan = create_plan(&desired, &current, &HashMap::new());

        assert_eq!(plan.effects().len(), 3);
        assert!(matches!(plan.effects()[0], Effect::Read(_)));
        assert!(matches!(plan.effects()[1], Effect::Create(_)));
        assert!(matches!(plan.effects()[2], Effect::Delete(_)));
    }

    #[test]
    fn destroy_plan_deletes_dependents_first() {
        let desired = vec![
            Resource::new("dx_gateway", "gw"),
            Resource::new("dx_gateway_association", "assoc")
                .with_attribute("dx_gateway_id", Value::ResourceRef("gw".into(), "id".into())),
        ];
        let current: HashMap<ResourceId, State> = [
            existing("dx_gateway", "gw", &[]),
            existing("dx_gateway_association", "assoc", &[]),
        ]
        .into_iter()
        .map(|s| (s.id.clone(), s))
        .collect();

        let plan = create_destroy_plan(&desired, &current);
        let order: Vec<String> = plan
            .effects()
            .iter()
            .map(|e| e.resource_id().name.clone())
            .collect();
        assert_eq!(order, vec!["assoc".to_string(), "gw".to_string()]);
    }
}
