//! Error types for azprov.
//!
//! This module defines the crate-wide error type. Provider-level failures are
//! carried as [`ProviderError`] and wrapped here so callers can tell a
//! validation failure (nothing was touched) from a failure reported by the
//! cloud provider (the remaining chain was abandoned).

use crate::provider::ProviderError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for azprov operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for azprov.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// Region is not in the set reported by the provider.
    #[error("Invalid region '{region}'. Valid regions: {}", valid.join(", "))]
    InvalidRegion {
        /// Requested region
        region: String,
        /// Region names reported by the provider
        valid: Vec<String>,
    },

    /// VM size is not offered in the region.
    #[error("VM size '{size}' is not available in region '{region}'")]
    InvalidVmSize {
        /// Requested size
        size: String,
        /// Region the size was checked against
        region: String,
    },

    /// Image publisher is not offered in the region.
    #[error("Image publisher '{publisher}' is not available in region '{region}'")]
    InvalidPublisher {
        /// Requested publisher
        publisher: String,
        /// Region the publisher was checked against
        region: String,
    },

    /// A parameter failed local validation.
    #[error("Invalid value for '{field}': {message}")]
    InvalidParameter {
        /// Parameter name
        field: String,
        /// Error message
        message: String,
    },

    /// A required parameter was not supplied.
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    // ========================================================================
    // Lookup Errors
    // ========================================================================
    /// VM has no network interface that exists in its resource group.
    #[error("Virtual machine '{vm}' has no network interface in resource group '{resource_group}'")]
    NoNetworkInterface {
        /// VM name
        vm: String,
        /// Resource group searched
        resource_group: String,
    },

    /// Network interface carries no public IP reference.
    #[error("Network interface '{0}' has no public IP address attached")]
    NoPublicIp(String),

    /// Public IP resource exists but no address is allocated yet.
    #[error("Public IP '{0}' has no allocated address")]
    UnallocatedPublicIp(String),

    // ========================================================================
    // Provider Errors
    // ========================================================================
    /// The cloud provider rejected or failed a call.
    #[error("Cloud provider error: {0}")]
    Provider(#[from] ProviderError),

    // ========================================================================
    // RDP Errors
    // ========================================================================
    /// The remote desktop client could not be started.
    #[error("Failed to launch RDP client '{program}': {message}")]
    RdpLaunch {
        /// Client program
        program: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // Deployment Errors
    // ========================================================================
    /// Error parsing a deployment file.
    #[error("Failed to parse deployment '{path}': {message}")]
    DeploymentParse {
        /// Path to the deployment file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// A deployment task failed; later tasks were not run.
    #[error("Task '{task}' failed: {message}")]
    TaskFailed {
        /// Task name
        task: String,
        /// Error message
        message: String,
        /// Exit code of the underlying failure
        exit_code: i32,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // IO / Serialization Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Generic error with source.
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
        /// Source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Creates a new invalid parameter error.
    pub fn invalid_parameter(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a new RDP launch error.
    pub fn rdp_launch(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RdpLaunch {
            program: program.into(),
            message: message.into(),
        }
    }

    /// Returns true if the error was raised before any remote mutation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidRegion { .. }
                | Error::InvalidVmSize { .. }
                | Error::InvalidPublisher { .. }
                | Error::InvalidParameter { .. }
                | Error::MissingParameter(_)
        )
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            e if e.is_validation() => 2,
            Error::Provider(_) => 3,
            Error::DeploymentParse { .. }
            | Error::Config(_)
            | Error::YamlParse(_)
            | Error::JsonParse(_) => 4,
            Error::TaskFailed { exit_code, .. } => *exit_code,
            _ => 1,
        }
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Adds context with a closure that is only evaluated on error.
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Other {
            message: message.into(),
            source: Some(Box::new(e)),
        })
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| Error::Other {
            message: f().into(),
            source: Some(Box::new(e)),
        })
    }
}
