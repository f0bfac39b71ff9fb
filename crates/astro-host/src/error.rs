//! Host-side errors

use astro_sdk::SuffixError;
use thiserror::Error;

/// Failure reported by the simulated world
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// No part with this uid exists (destroyed or never loaded)
    #[error("Part {0} does not exist")]
    PartNotFound(u64),

    /// No vessel with this id exists
    #[error("Vessel {0} does not exist")]
    VesselNotFound(u64),

    /// No vessel with this name exists
    #[error("No vessel named '{0}'")]
    VesselNameNotFound(String),

    /// The part is the root of its vessel
    #[error("Part {0} has no parent")]
    NoParent(u64),

    /// Module index out of range for a part
    #[error("Part {uid} has no module at index {index}")]
    ModuleNotFound {
        /// Owning part
        uid: u64,
        /// Requested module index
        index: usize,
    },

    /// Resource index out of range for a part
    #[error("Part {uid} has no resource at index {index}")]
    ResourceNotFound {
        /// Owning part
        uid: u64,
        /// Requested resource index
        index: usize,
    },

    /// The part carries no docking node
    #[error("Part {0} is not a docking port")]
    NotDockingPort(u64),
}

/// Result type for world accessors
pub type HostResult<T> = Result<T, HostError>;

impl From<HostError> for SuffixError {
    fn from(err: HostError) -> Self {
        SuffixError::host(err)
    }
}

/// Errors that can occur while loading a scenario
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Failed to read scenario file
    #[error("Failed to read scenario file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid scenario: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_becomes_host_suffix_error() {
        let err: SuffixError = HostError::NoParent(12).into();
        assert_eq!(err, SuffixError::Host("Part 12 has no parent".into()));
    }
}
