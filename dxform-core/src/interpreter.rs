//! Interpreter - Execute Effects using a Provider
//!
//! The Interpreter executes Effects contained in a Plan in order, collecting
//! the results. This is where side effects actually occur. References to other
//! resources are resolved against the states produced so far.

use std::collections::HashMap;

use crate::effect::Effect;
use crate::plan::Plan;
use crate::provider::{Provider, ProviderError, ProviderResult};
use crate::resource::{Resource, ResourceId, State, Value};

/// Result of executing each Effect
#[derive(Debug)]
pub enum EffectOutcome {
    /// Read succeeded
    Read { state: State },
    /// Create succeeded
    Created { state: State },
    /// Update succeeded
    Updated { state: State },
    /// Replace succeeded
    Replaced { state: State },
    /// Delete succeeded
    Deleted { id: ResourceId },
}

impl EffectOutcome {
    /// The state this outcome leaves behind, if any
    pub fn state(&self) -> Option<&State> {
        match self {
            EffectOutcome::Read { state }
            | EffectOutcome::Created { state }
            | EffectOutcome::Updated { state }
            | EffectOutcome::Replaced { state } => Some(state),
            EffectOutcome::Deleted { .. } => None,
        }
    }
}

/// Result of executing the entire Plan
#[derive(Debug)]
pub struct ApplyResult {
    pub outcomes: Vec<Result<EffectOutcome, ProviderError>>,
    pub success_count: usize,
    pub failure_count: usize,
}

impl ApplyResult {
    pub fn is_success(&self) -> bool {
        self.failure_count == 0
    }
}

/// Interpreter that executes Effects using a Provider.
///
/// Execution stops at the first failing effect.
pub struct Interpreter<P: Provider> {
    provider: P,
    bindings: HashMap<String, State>,
}

impl<P: Provider> Interpreter<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            bindings: HashMap::new(),
        }
    }

    /// Seed reference resolution with already existing resources
    pub fn with_states<'a>(mut self, states: impl IntoIterator<Item = &'a State>) -> Self {
        for state in states {
            if state.exists {
                self.bindings.insert(state.id.name.clone(), state.clone());
            }
        }
        self
    }

    /// Execute a Plan, interpreting all Effects and causing side effects
    pub async fn apply(&mut self, plan: &Plan) -> ApplyResult {
        let mut outcomes = Vec::new();
        let mut success_count = 0;
        let mut failure_count = 0;

        for effect in plan.effects() {
            let result = self
                .execute_effect(effect)
                .await
                .map_err(|e| match e.resource_id {
                    Some(_) => e,
                    None => e.for_resource(effect.resource_id().clone()),
                });

            match &result {
                Ok(outcome) => {
                    success_count += 1;
                    match outcome {
                        EffectOutcome::Deleted { id } => {
                            self.bindings.remove(&id.name);
                        }
                        other => {
                            if let Some(state) = other.state() {
                                self.bindings.insert(state.id.name.clone(), state.clone());
                            }
                        }
                    }
                }
                Err(e) => {
                    log::error!("{}", e);
                    failure_count += 1;
                    outcomes.push(result);
                    break;
                }
            }

            outcomes.push(result);
        }

        ApplyResult {
            outcomes,
            success_count,
            failure_count,
        }
    }

    /// Execute a single Effect
    async fn execute_effect(&self, effect: &Effect) -> ProviderResult<EffectOutcome> {
        match effect {
            Effect::Read(resource) => {
                let resource = self.resolve(resource)?;
                let state = self.provider.read_data_source(&resource).await?;
                Ok(EffectOutcome::Read { state })
            }
            Effect::Create(resource) => {
                let resource = self.resolve(resource)?;
                let state = self.provider.create(&resource).await?;
                Ok(EffectOutcome::Created { state })
            }
            Effect::Update { from, to, .. } => {
                let to = self.resolve(to)?;
                let state = self.provider.update(from, &to).await?;
                Ok(EffectOutcome::Updated { state })
            }
            Effect::Replace { from, to, .. } => {
                let to = self.resolve(to)?;
                self.provider.delete(from).await?;
                let state = self.provider.create(&to).await?;
                Ok(EffectOutcome::Replaced { state })
            }
            Effect::Delete(state) => {
                self.provider.delete(state).await?;
                Ok(EffectOutcome::Deleted {
                    id: state.id.clone(),
                })
            }
        }
    }

    fn resolve(&self, resource: &Resource) -> ProviderResult<Resource> {
        let resolved = resolve_references(resource, &self.bindings);
        if let Some((name, _)) = resolved.attributes.iter().find(|(_, v)| v.has_refs()) {
            return Err(ProviderError::new(format!(
                "Unresolved reference in attribute '{}'",
                name
            ))
            .for_resource(resource.id.clone()));
        }
        Ok(resolved)
    }
}

/// Replace `ResourceRef`s with values from the referenced resources' states.
///
/// References whose binding or attribute is unknown are left in place.
pub fn resolve_references(resource: &Resource, bindings: &HashMap<String, State>) -> Resource {
    fn resolve(value: &Value, bindings: &HashMap<String, State>) -> Value {
        match value {
            Value::ResourceRef(binding, attr) => bindings
                .get(binding)
                .and_then(|state| state.attribute(attr))
                .unwrap_or_else(|| value.clone()),
            Value::List(items) => Value::List(items.iter().map(|v| resolve(v, bindings)).collect()),
            Value::Map(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), resolve(v, bindings)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    let mut resolved = resource.clone();
    for value in resolved.attributes.values_mut() {
        *value = resolve(value, bindings);
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::tests::RecordingProvider;

    #[tokio::test]
    async fn apply_empty_plan() {
        let mut interpreter = Interpreter::new(RecordingProvider::default());
        let result = interpreter.apply(&Plan::new()).await;

        assert!(result.is_success());
        assert_eq!(result.success_count, 0);
    }

    #[tokio::test]
    async fn create_resolves_reference_to_earlier_create() {
        let mut plan = Plan::new();
        plan.add(Effect::Create(Resource::new("dx_gateway", "gw")));
        plan.add(Effect::Create(
            Resource::new("dx_gateway_association", "assoc")
                .with_attribute("dx_gateway_id", Value::ResourceRef("gw".into(), "id".into())),
        ));

        let mut interpreter = Interpreter::new(RecordingProvider::default());
        let result = interpreter.apply(&plan).await;

        assert!(result.is_success());
        let assoc = result.outcomes[1].as_ref().unwrap().state().unwrap();
        assert_eq!(
            assoc.attributes.get("dx_gateway_id"),
            Some(&Value::from("id-gw"))
        );
    }

    #[tokio::test]
    async fn unresolved_reference_fails_and_stops() {
        let mut plan = Plan::new();
        plan.add(Effect::Create(
            Resource::new("dx_bgp_peer", "peer")
                .with_attribute("virtual_interface_id", Value::ResourceRef("vif".into(), "id".into())),
        ));
        plan.add(Effect::Create(Resource::new("dx_gateway", "gw")));

        let provider = RecordingProvider::default();
        let mut interpreter = Interpreter::new(provider);
        let result = interpreter.apply(&plan).await;

        assert!(!result.is_success());
        assert_eq!(result.outcomes.len(), 1);
        let err = result.outcomes[0].as_ref().unwrap_err();
        assert!(err.to_string().contains("virtual_interface_id"));
    }

    #[tokio::test]
    async fn replace_deletes_then_creates() {
        let from = State::existing(ResourceId::new("dx_gateway", "gw"), HashMap::new())
            .with_identifier("dxgw-old");
        let mut plan = Plan::new();
        plan.add(Effect::Replace {
            id: from.id.clone(),
            from,
            to: Resource::new("dx_gateway", "gw").with_attribute("amazon_side_asn", "64513"),
            changed: vec!["amazon_side_asn".to_string()],
        });

        let mut interpreter = Interpreter::new(RecordingProvider::default());
        let result = interpreter.apply(&plan).await;

        assert!(result.is_success());
        assert!(matches!(
            result.outcomes[0],
            Ok(EffectOutcome::Replaced { .. })
        ));
        assert_eq!(
            interpreter.provider.calls(),
            vec!["delete dx_gateway.gw", "create dx_gateway.gw"]
        );
    }

    #[test]
    fn resolve_references_inside_lists() {
        let gw = State::existing(ResourceId::new("dx_gateway", "gw"), HashMap::new())
            .with_identifier("dxgw-1");
        let bindings: HashMap<String, State> = [("gw".to_string(), gw)].into_iter().collect();
        let resource = Resource::new("dx_gateway_association", "a").with_attribute(
            "allowed_prefixes",
            Value::List(vec![Value::ResourceRef("gw".into(), "id".into())]),
        );

        let resolved = resolve_references(&resource, &bindings);
        assert_eq!(
            resolved.attributes.get("allowed_prefixes"),
            Some(&Value::List(vec![Value::from("dxgw-1")]))
        );
    }
}
