//! Provider - Trait abstracting resource operations
//!
//! A Provider maps declared resources onto a remote API. It is responsible for
//! turning Effects into API calls and for reading remote objects back into
//! [`State`] values.

use std::future::Future;
use std::pin::Pin;

use crate::resource::{Resource, ResourceId, State};
use crate::schema::ResourceSchema;

/// Error type for Provider operations
#[derive(Debug)]
pub struct ProviderError {
    pub message: String,
    pub resource_id: Option<ResourceId>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref id) = self.resource_id {
            write!(f, "[{}] {}", id, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(ref cause) = self.cause {
            write!(f, ": {}", cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            resource_id: None,
            cause: None,
        }
    }

    pub fn for_resource(mut self, id: ResourceId) -> Self {
        self.resource_id = Some(id);
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Definition of resource types that a Provider can handle
pub trait ResourceType: Send + Sync {
    /// Resource type name (e.g., "dx_connection")
    fn name(&self) -> &'static str;

    /// Attribute schema for this resource type
    fn schema(&self) -> ResourceSchema;
}

/// Main Provider trait
///
/// All operations are async and involve side effects.
pub trait Provider: Send + Sync {
    /// Name of this Provider (e.g., "aws")
    fn name(&self) -> &'static str;

    /// Resource and data source types this Provider can handle
    fn resource_types(&self) -> Vec<Box<dyn ResourceType>>;

    /// Refresh a managed resource.
    ///
    /// `prior` carries the identifier and the last known attributes.
    /// Returns a state with `exists == false` if the object is gone.
    fn read<'a>(&'a self, prior: &'a State) -> BoxFuture<'a, ProviderResult<State>>;

    /// Look up a data source by its declared arguments
    fn read_data_source<'a>(&'a self, resource: &'a Resource)
    -> BoxFuture<'a, ProviderResult<State>>;

    /// Create a resource
    ///
    /// Returns State with identifier set to the remote ID (e.g., dxcon-xxx)
    fn create<'a>(&'a self, resource: &'a Resource) -> BoxFuture<'a, ProviderResult<State>>;

    /// Update a resource in place
    fn update<'a>(
        &'a self,
        from: &'a State,
        to: &'a Resource,
    ) -> BoxFuture<'a, ProviderResult<State>>;

    /// Delete a resource
    fn delete<'a>(&'a self, state: &'a State) -> BoxFuture<'a, ProviderResult<()>>;

    /// Adopt an existing remote object under `id` using its import identifier
    fn import<'a>(
        &'a self,
        id: &'a ResourceId,
        import_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<State>>;
}

/// Provider implementation for Box<dyn Provider>
/// This enables dynamic dispatch for Providers
impl Provider for Box<dyn Provider> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        (**self).resource_types()
    }

    fn read<'a>(&'a self, prior: &'a State) -> BoxFuture<'a, ProviderResult<State>> {
        (**self).read(prior)
    }

    fn read_data_source<'a>(
        &'a self,
        resource: &'a Resource,
    ) -> BoxFuture<'a, ProviderResult<State>> {
        (**self).read_data_source(resource)
    }

    fn create<'a>(&'a self, resource: &'a Resource) -> BoxFuture<'a, ProviderResult<State>> {
        (**self).create(resource)
    }

    fn update<'a>(
        &'a self,
        from: &'a State,
        to: &'a Resource,
    ) -> BoxFuture<'a, ProviderResult<State>> {
        (**self).update(from, to)
    }

    fn delete<'a>(&'a self, state: &'a State) -> BoxFuture<'a, ProviderResult<()>> {
        (**self).delete(state)
    }

    fn import<'a>(
        &'a self,
        id: &'a ResourceId,
        import_id: &'a str,
    ) -> BoxFuture<'a, ProviderResult<State>> {
        (**self).import(id, import_id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records calls and echoes declared attributes back as state
    #[derive(Default)]
    pub(crate) struct RecordingProvider {
        pub calls: Mutex<Vec<String>>,
    }

    impl RecordingProvider {
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl Provider for RecordingProvider {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
            vec![]
        }

        fn read<'a>(&'a self, prior: &'a State) -> BoxFuture<'a, ProviderResult<State>> {
            self.record(format!("read {}", prior.id));
            let state = prior.clone();
            Box::pin(async move { Ok(state) })
        }

        fn read_data_source<'a>(
            &'a self,
            resource: &'a Resource,
        ) -> BoxFuture<'a, ProviderResult<State>> {
            self.record(format!("data {}", resource.id));
            let state = State::existing(resource.id.clone(), resource.attributes.clone())
                .with_identifier(format!("data-{}", resource.id.name));
            Box::pin(async move { Ok(state) })
        }

        fn create<'a>(&'a self, resource: &'a Resource) -> BoxFuture<'a, ProviderResult<State>> {
            self.record(format!("create {}", resource.id));
            let state = State::existing(resource.id.clone(), resource.attributes.clone())
                .with_identifier(format!("id-{}", resource.id.name));
            Box::pin(async move { Ok(state) })
        }

        fn update<'a>(
            &'a self,
            from: &'a State,
            to: &'a Resource,
        ) -> BoxFuture<'a, ProviderResult<State>> {
            self.record(format!("update {}", to.id));
            let mut state = State::existing(to.id.clone(), to.attributes.clone());
            state.identifier = from.identifier.clone();
            Box::pin(async move { Ok(state) })
        }

        fn delete<'a>(&'a self, state: &'a State) -> BoxFuture<'a, ProviderResult<()>> {
            self.record(format!("delete {}", state.id));
            Box::pin(async { Ok(()) })
        }

        fn import<'a>(
            &'a self,
            id: &'a ResourceId,
            import_id: &'a str,
        ) -> BoxFuture<'a, ProviderResult<State>> {
            self.record(format!("import {}", id));
            let state = State::existing(id.clone(), Default::default()).with_identifier(import_id);
            Box::pin(async move { Ok(state) })
        }
    }

    #[tokio::test]
    async fn boxed_provider_dispatches() {
        let provider: Box<dyn Provider> = Box::new(RecordingProvider::default());
        let resource = Resource::new("dx_gateway", "gw");
        let state = provider.create(&resource).await.unwrap();
        assert!(state.exists);
        assert_eq!(state.identifier.as_deref(), Some("id-gw"));
    }

    #[test]
    fn error_display_includes_resource_and_cause() {
        let err = ProviderError::new("Failed to create")
            .for_resource(ResourceId::new("dx_lag", "main"))
            .with_cause(std::io::Error::other("boom"));
        assert_eq!(err.to_string(), "[dx_lag.main] Failed to create: boom");
    }
}
