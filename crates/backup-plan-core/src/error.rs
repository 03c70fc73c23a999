// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for backup-plan-core.
//!
//! Every translator returns [`PlanError`]. Variants fall into four
//! categories (see [`ErrorCategory`]) so callers can decide how to surface
//! them: validation problems point at a configuration field, lookup problems
//! list every missing resource at once, consistency problems indicate a bug
//! in the caller, and upstream problems come from the backend.

use thiserror::Error;

/// Result type using PlanError.
pub type Result<T> = std::result::Result<T, PlanError>;

/// Boxed error returned by upstream listing calls.
pub type UpstreamError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Broad classification of a [`PlanError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// User input is invalid. Never retried.
    Validation,
    /// A referenced resource does not exist upstream.
    Lookup,
    /// Two caller-supplied inputs disagree with each other.
    Consistency,
    /// The backend failed or returned data that cannot be interpreted.
    Upstream,
}

/// Errors produced while translating backup plans.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlanError {
    /// A configuration field holds an unacceptable value.
    #[error("invalid {field}: {message}")]
    Validation {
        /// The offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// A time of day could not be parsed.
    #[error("invalid time of day '{input}': expected HH:MM or HH:MM±HH")]
    InvalidTime {
        /// The rejected input.
        input: String,
    },

    /// A weekday abbreviation is not one of `Mo`..`Su`.
    #[error("unknown weekday '{0}': expected one of Mo, Tu, We, Th, Fr, Sa, Su")]
    UnknownWeekday(String),

    /// The provider name maps to no supported provider kind.
    #[error("unknown provider kind: {0}")]
    UnknownProvider(String),

    /// One or more requested resource IDs were not found upstream.
    #[error("resources not found: {}", .ids.join(", "))]
    ResourcesNotFound {
        /// Every ID that could not be matched, in request order.
        ids: Vec<String>,
    },

    /// A volume target names an instance absent from the resolved resources.
    #[error("volume target references instance '{instance_id}' which is not among the resolved resources")]
    VolumeTargetWithoutInstance {
        /// The instance the target points at.
        instance_id: String,
    },

    /// An upstream listing call failed.
    #[error("{operation} failed: {source}")]
    Upstream {
        /// Name of the failing call.
        operation: &'static str,
        /// The transport error.
        #[source]
        source: UpstreamError,
    },

    /// The backend returned a trigger pattern this crate cannot read.
    #[error("malformed trigger pattern '{pattern}': {reason}")]
    MalformedPattern {
        /// The pattern as received.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The backend returned an inconsistent plan.
    #[error("malformed backend state: {0}")]
    MalformedState(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl PlanError {
    /// Shorthand for a [`PlanError::Validation`].
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Wrap an upstream failure with the name of the call that produced it.
    pub fn upstream(operation: &'static str, source: UpstreamError) -> Self {
        Self::Upstream { operation, source }
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. }
            | Self::InvalidTime { .. }
            | Self::UnknownWeekday(_)
            | Self::UnknownProvider(_) => ErrorCategory::Validation,
            Self::ResourcesNotFound { .. } => ErrorCategory::Lookup,
            Self::VolumeTargetWithoutInstance { .. } => ErrorCategory::Consistency,
            Self::Upstream { .. }
            | Self::MalformedPattern { .. }
            | Self::MalformedState(_)
            | Self::Serialization(_) => ErrorCategory::Upstream,
        }
    }

    /// Get the error code string for this error type.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::InvalidTime { .. } => "INVALID_TIME",
            Self::UnknownWeekday(_) => "UNKNOWN_WEEKDAY",
            Self::UnknownProvider(_) => "UNKNOWN_PROVIDER",
            Self::ResourcesNotFound { .. } => "RESOURCES_NOT_FOUND",
            Self::VolumeTargetWithoutInstance { .. } => "VOLUME_TARGET_WITHOUT_INSTANCE",
            Self::Upstream { .. } => "UPSTREAM_ERROR",
            Self::MalformedPattern { .. } => "MALFORMED_PATTERN",
            Self::MalformedState(_) => "MALFORMED_STATE",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// The configuration field a validation error is attributed to.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            Self::InvalidTime { .. } => Some("time"),
            Self::UnknownWeekday(_) => Some("dates"),
            Self::UnknownProvider(_) => Some("provider_name"),
            Self::ResourcesNotFound { .. } => Some("instance_ids"),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PlanError {
    fn from(err: serde_json::Error) -> Self {
        PlanError::Serialization(err.to_string())
    }
}
