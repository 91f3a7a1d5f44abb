//! Ports and Adapters Infrastructure
//!
//! This module provides the foundational types for implementing the hexagonal
//! architecture (ports and adapters) pattern across all domain modules.
//!
//! Each domain defines its own port trait that extends the marker traits here.
//! Adapters implement these traits to provide either internal (database) or
//! mock (in-memory) implementations.
//!
//! ```rust,ignore
//! // In domain_kyc/src/ports.rs
//! #[async_trait]
//! pub trait KycCasePort: DomainPort {
//!     async fn get_case(&self, id: KycCaseId) -> Result<KycCase, PortError>;
//!     async fn save_case(&self, case: &KycCase) -> Result<(), PortError>;
//! }
//!
//! // In infra_db - internal adapter
//! impl KycCasePort for PostgresKycAdapter { ... }
//! ```

use std::fmt;
use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Error type for port operations
///
/// Provides a unified error type that all port implementations must use,
/// ensuring consistent error handling across adapters.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// A validation error occurred
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// The requested state change is not allowed from the current state
    #[error("Invalid transition: {message}")]
    InvalidTransition {
        message: String,
    },

    /// The operation conflicts with existing data
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation timed out
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a Validation error with field information
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates an InvalidTransition error
    pub fn invalid_transition(message: impl Into<String>) -> Self {
        PortError::InvalidTransition {
            message: message.into(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. } | PortError::Timeout { .. }
        )
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    /// Returns true if this error indicates a rejected state transition
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, PortError::InvalidTransition { .. })
    }
}

/// Marker trait for all domain ports
///
/// All port traits should extend this marker to ensure they are
/// thread-safe and can be used in async contexts.
pub trait DomainPort: Send + Sync + 'static {}

/// Health status for an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    /// Adapter is healthy and operational
    Healthy,
    /// Adapter is degraded but operational
    Degraded,
    /// Adapter is unhealthy and not operational
    Unhealthy,
    /// Health status is unknown
    Unknown,
}

/// Health check result for an adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Adapter identifier
    pub adapter_id: String,
    /// Current health status
    pub status: AdapterHealth,
    /// Latency of the health check in milliseconds
    pub latency_ms: u64,
    /// Optional message with additional details
    pub message: Option<String>,
    /// Timestamp of the health check
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

/// Trait for adapters that support health checks
#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    /// Performs a health check on the adapter
    async fn health_check(&self) -> HealthCheckResult;
}

/// Metadata about a port operation for auditing and tracing
#[derive(Debug, Clone, Default)]
pub struct OperationMetadata {
    /// Correlation ID for tracing across systems
    pub correlation_id: Option<String>,
    /// User or system that initiated the operation
    pub initiated_by: Option<String>,
    /// Additional context as key-value pairs
    pub context: std::collections::HashMap<String, String>,
}

impl OperationMetadata {
    /// Creates new metadata with a correlation ID
    pub fn with_correlation_id(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(correlation_id.into()),
            ..Default::default()
        }
    }

    /// Creates new metadata recording the initiating user
    pub fn initiated_by(user: impl Into<String>) -> Self {
        Self {
            initiated_by: Some(user.into()),
            ..Default::default()
        }
    }

    /// Adds context to the metadata
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_not_found() {
        let error = PortError::not_found("KycCase", "123");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert!(error.to_string().contains("KycCase"));
        assert!(error.to_string().contains("123"));
    }

    #[test]
    fn test_port_error_transient() {
        let timeout = PortError::Timeout {
            operation: "get_case".to_string(),
            duration_ms: 5000,
        };
        assert!(timeout.is_transient());

        let validation = PortError::validation("Invalid document number");
        assert!(!validation.is_transient());
    }

    #[test]
    fn test_port_error_invalid_transition() {
        let error = PortError::invalid_transition("approved -> pending");
        assert!(error.is_invalid_transition());
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_operation_metadata() {
        let metadata = OperationMetadata::with_correlation_id("req-123")
            .with_context("agent_id", "agent-456");

        assert_eq!(metadata.correlation_id, Some("req-123".to_string()));
        assert_eq!(
            metadata.context.get("agent_id"),
            Some(&"agent-456".to_string())
        );
    }
}
