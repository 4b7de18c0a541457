//! Effect - A single side effect as a value
//!
//! Effects describe what will happen to a resource; nothing happens until an
//! [`Interpreter`](crate::interpreter::Interpreter) executes them.

use crate::resource::{Resource, ResourceId, State};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Look up a data source
    Read(Resource),
    /// Create a resource that does not exist yet
    Create(Resource),
    /// Modify a resource in place
    Update {
        id: ResourceId,
        from: State,
        to: Resource,
        changed: Vec<String>,
    },
    /// Destroy and recreate a resource because a force-new attribute changed
    Replace {
        id: ResourceId,
        from: State,
        to: Resource,
        changed: Vec<String>,
    },
    /// Delete a resource
    Delete(State),
}

impl Effect {
    pub fn resource_id(&self) -> &ResourceId {
        match self {
            Effect::Read(r) | Effect::Create(r) => &r.id,
            Effect::Update { id, .. } | Effect::Replace { id, .. } => id,
            Effect::Delete(state) => &state.id,
        }
    }

    /// Whether this effect changes remote infrastructure
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Effect::Read(_))
    }

    /// One-character marker used in plan output
    pub fn symbol(&self) -> &'static str {
        match self {
            Effect::Read(_) => "<=",
            Effect::Create(_) => "+",
            Effect::Update { .. } => "~",
            Effect::Replace { .. } => "-/+",
            Effect::Delete(_) => "-",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_is_not_mutating() {
        let read = Effect::Read(Resource::new("dx_location", "loc").with_read_only(true));
        assert!(!read.is_mutating());
        assert!(Effect::Create(Resource::new("dx_gateway", "gw")).is_mutating());
    }

    #[test]
    fn resource_id_of_delete_comes_from_state() {
        let state = State::not_found(ResourceId::new("dx_lag", "old"));
        let effect = Effect::Delete(state);
        assert_eq!(effect.resource_id().to_string(), "dx_lag.old");
        assert_eq!(effect.symbol(), "-");
    }
}
