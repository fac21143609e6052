//! Error types for the status engine

use thiserror::Error;

/// Main error type for status engine operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// A condition source failed to query its downstream resource
    #[error("{source_name} status query failed: {message}")]
    Source {
        /// Name of the source that failed (kubelet, machine-config-pool, tuned)
        source_name: String,
        /// Description of what failed
        message: String,
    },

    /// The owning MachineConfigPool could not be resolved
    #[error("machine config pool for profile {profile} not found: {message}")]
    PoolLookup {
        /// Name of the profile whose pool was looked up
        profile: String,
        /// Description of what failed
        message: String,
    },

    /// An object of the wrong kind was handed to the engine
    #[error("wrong type conversion; want={expected} got={got}")]
    WrongKind {
        /// The expected apiVersion/kind
        expected: String,
        /// The apiVersion/kind actually received
        got: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create a source query error
    pub fn query_failed(source_name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            message: msg.into(),
        }
    }

    /// Create a pool lookup error for the given profile
    pub fn pool_lookup(profile: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::PoolLookup {
            profile: profile.into(),
            message: msg.into(),
        }
    }

    /// Create a wrong-kind error
    pub fn wrong_kind(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::WrongKind {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Check if this error is retryable
    ///
    /// Wrong-kind and serialization errors are wiring bugs and never succeed on
    /// retry. Kubernetes 4xx errors other than conflicts are permanent too.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Kube(source) => !matches!(
                source,
                kube::Error::Api(ae) if (400..500).contains(&ae.code) && ae.code != 409
            ),
            Error::Source { .. } => true,
            Error::PoolLookup { .. } => true,
            Error::WrongKind { .. } => false,
            Error::Serialization(_) => false,
        }
    }
}
