//! Provider errors

use dxform_core::provider::ProviderError;
use dxform_core::resource::ResourceId;
use dxform_core::waiter::WaitError;

use crate::api::ApiError;

/// Fragments of AWS error messages that identify a missing object.
///
/// Direct Connect reports most missing objects as a generic
/// `DirectConnectClientException`, so these substrings are the only signal.
/// They are fragile: AWS may reword them at any time.
pub mod messages {
    pub const CONNECTION_NOT_FOUND: &str = "Could not find Connection with ID";
    pub const LAG_NOT_FOUND: &str = "Could not find Lag with ID";
    pub const DOES_NOT_EXIST: &str = "does not exist";
    pub const PROPOSAL_NOT_FOUND: &str = "is not found";
    pub const CONNECTION_HAS_NO_LAG: &str = "has no LAG";
    pub const LAST_BGP_PEER: &str = "The last BGP Peer on a Virtual Interface cannot be deleted";

    /// Substrings treated as "not found" by every finder
    pub const NOT_FOUND: &[&str] = &[CONNECTION_NOT_FOUND, LAG_NOT_FOUND, DOES_NOT_EXIST];
}

#[derive(Debug, thiserror::Error)]
pub enum DxError {
    /// The object is missing or in a terminal state
    #[error("{0}")]
    NotFound(String),

    #[error("empty result")]
    EmptyResult,

    #[error("too many results: wanted 1, got {0}")]
    TooManyResults(usize),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("waiting for {what} ({id}): {source}")]
    Wait {
        what: &'static str,
        id: String,
        #[source]
        source: Box<WaitError<DxError>>,
    },

    #[error("missing required attribute '{0}'")]
    MissingAttribute(String),

    #[error("invalid value for '{name}': {message}")]
    InvalidAttribute { name: String, message: String },

    #[error("invalid resource ID '{id}': {message}")]
    InvalidId { id: String, message: String },

    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("expected Direct Connect virtual interface type '{expected}', got '{actual}'")]
    UnexpectedVirtualInterfaceType { expected: String, actual: String },
}

pub type Result<T> = std::result::Result<T, DxError>;

impl DxError {
    /// Whether this error means the object does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            DxError::NotFound(_) | DxError::EmptyResult => true,
            DxError::Api(e) => is_not_found_api_error(e),
            _ => false,
        }
    }

    pub fn wait(what: &'static str, id: impl Into<String>, source: WaitError<DxError>) -> Self {
        DxError::Wait {
            what,
            id: id.into(),
            source: Box::new(source),
        }
    }

    /// Convert into the core provider error for `id`
    pub fn into_provider_error(self, action: &str, id: &ResourceId) -> ProviderError {
        ProviderError::new(format!("{} failed", action))
            .for_resource(id.clone())
            .with_cause(self)
    }
}

/// Whether an API error carries one of the well-known not-found messages
pub fn is_not_found_api_error(err: &ApiError) -> bool {
    messages::NOT_FOUND.iter().any(|m| err.message_contains(m))
}

/// Treat errors whose message contains any of `tolerated` as success
pub fn ignore_messages(result: std::result::Result<(), ApiError>, tolerated: &[&str]) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if tolerated.iter().any(|m| e.message_contains(m)) => {
            log::debug!("ignoring {}: {}", e.operation, e.message);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
