//! # Error Handling
//!
//! Error type for the beam path encoder, with per-error context.
//!
//! ## What is an error here
//!
//! Path generation itself never fails on content: an empty frame yields a blank
//! buffer and an over-full frame is truncated and reported through the frame
//! report. Errors are reserved for configuration mistakes, failed buffer
//! allocation (fatal for the frame), I/O, decoding and hand-off failures.
//!
//! ## Usage
//!
//! ```rust
//! use beamscan::error::{BeamError, classify};
//!
//! let error = BeamError::resource("sample_buffer", "capacity overflow")
//!     .with_context("allocating 800x600 sample buffer")
//!     .with_metadata("capacity", "480000");
//!
//! assert_eq!(error.category(), "resource");
//! assert!(classify::is_frame_fatal(&error));
//! assert_eq!(
//!     error.to_string(),
//!     "Resource allocation failed for sample_buffer: capacity overflow \
//!      (allocating 800x600 sample buffer)"
//! );
//! ```

use std::{collections::BTreeMap, error::Error as StdError, fmt};

/// Free-form detail attached to an error after it is raised.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// What the caller was doing, appended to the message
    pub context: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug)]
pub enum BeamError {
    /// Configuration validation errors
    Config {
        field: String,
        value: String,
        reason: String,
        context: ErrorContext,
    },
    /// Input validation errors (frame geometry, sample counts)
    Validation {
        field: String,
        constraint: String,
        value: String,
        context: ErrorContext,
    },
    /// Output buffer allocation failures
    Resource {
        resource: String,
        reason: String,
        context: ErrorContext,
    },
    /// A buffer was finished without being filled to capacity
    Capacity {
        capacity: usize,
        written: usize,
        context: ErrorContext,
    },
    Io {
        operation: String,
        path: String,
        source: std::io::Error,
        context: ErrorContext,
    },
    /// Image decoding errors
    Decode {
        path: String,
        source: image::ImageError,
        context: ErrorContext,
    },
    /// Errors surfaced by a dependency with no dedicated variant
    External {
        library: String,
        source: Box<dyn StdError + Send + Sync>,
        context: ErrorContext,
    },
    /// An operation was attempted in the wrong lifecycle state
    State {
        current_state: String,
        attempted_operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// Frame hand-off failures (other side gone)
    Handoff {
        reason: String,
        context: ErrorContext,
    },
}

impl BeamError {
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn validation(
        field: impl Into<String>,
        constraint: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            constraint: constraint.into(),
            value: value.into(),
            context: ErrorContext::default(),
        }
    }

    /// Allocation failures are fatal for the frame; see [`classify::is_frame_fatal`].
    pub fn resource(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resource {
            resource: resource.into(),
            reason: reason.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn capacity(capacity: usize, written: usize) -> Self {
        Self::Capacity {
            capacity,
            written,
            context: ErrorContext::default(),
        }
    }

    pub fn io_at(
        operation: impl Into<String>,
        path: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
            context: ErrorContext::default(),
        }
    }

    pub fn decode(path: impl Into<String>, source: image::ImageError) -> Self {
        Self::Decode {
            path: path.into(),
            source,
            context: ErrorContext::default(),
        }
    }

    pub fn external(
        library: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            library: library.into(),
            source: Box::new(source),
            context: ErrorContext::default(),
        }
    }

    pub fn state(
        current_state: impl Into<String>,
        attempted_operation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::State {
            current_state: current_state.into(),
            attempted_operation: attempted_operation.into(),
            reason: reason.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn handoff(reason: impl Into<String>) -> Self {
        Self::Handoff {
            reason: reason.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_mut().context = Some(context.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context_mut().metadata.insert(key.into(), value.into());
        self
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Config { context, .. }
            | Self::Validation { context, .. }
            | Self::Resource { context, .. }
            | Self::Capacity { context, .. }
            | Self::Io { context, .. }
            | Self::Decode { context, .. }
            | Self::External { context, .. }
            | Self::State { context, .. }
            | Self::Handoff { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Config { context, .. }
            | Self::Validation { context, .. }
            | Self::Resource { context, .. }
            | Self::Capacity { context, .. }
            | Self::Io { context, .. }
            | Self::Decode { context, .. }
            | Self::External { context, .. }
            | Self::State { context, .. }
            | Self::Handoff { context, .. } => context,
        }
    }

    /// Short lowercase name of the variant, used in logs and tests.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Validation { .. } => "validation",
            Self::Resource { .. } => "resource",
            Self::Capacity { .. } => "capacity",
            Self::Io { .. } => "io",
            Self::Decode { .. } => "decode",
            Self::External { .. } => "external",
            Self::State { .. } => "state",
            Self::Handoff { .. } => "handoff",
        }
    }
}

impl fmt::Display for BeamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeamError::Config {
                field,
                value,
                reason,
                ..
            } => write!(
                f,
                "Configuration error in '{}': {} (value: {})",
                field, reason, value
            )?,
            BeamError::Validation {
                field,
                constraint,
                value,
                ..
            } => write!(
                f,
                "Validation failed for '{}': {} (value: {})",
                field, constraint, value
            )?,
            BeamError::Resource {
                resource, reason, ..
            } => write!(f, "Resource allocation failed for {}: {}", resource, reason)?,
            BeamError::Capacity {
                capacity, written, ..
            } => write!(
                f,
                "Sample buffer incomplete: {} of {} samples written",
                written, capacity
            )?,
            BeamError::Io {
                operation,
                path,
                source,
                ..
            } => write!(f, "I/O error during {} on '{}': {}", operation, path, source)?,
            BeamError::Decode { path, source, .. } => {
                write!(f, "Failed to decode '{}': {}", path, source)?
            }
            BeamError::External {
                library, source, ..
            } => write!(f, "External library error in {}: {}", library, source)?,
            BeamError::State {
                current_state,
                attempted_operation,
                reason,
                ..
            } => write!(
                f,
                "Cannot {} while {}: {}",
                attempted_operation, current_state, reason
            )?,
            BeamError::Handoff { reason, .. } => write!(f, "Frame hand-off failed: {}", reason)?,
        }
        if let Some(context) = &self.context().context {
            write!(f, " ({})", context)?;
        }
        Ok(())
    }
}

impl StdError for BeamError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            Self::External { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

pub type BeamResult<T> = Result<T, BeamError>;

/// Error classification utilities
pub mod classify {
    use super::*;

    /// Fatal for the frame: nothing may be emitted for it, the session moves on.
    pub fn is_frame_fatal(error: &BeamError) -> bool {
        matches!(
            error,
            BeamError::Resource { .. } | BeamError::Capacity { .. }
        )
    }
}

impl From<serde_json::Error> for BeamError {
    fn from(error: serde_json::Error) -> Self {
        Self::external("serde_json", error)
    }
}
