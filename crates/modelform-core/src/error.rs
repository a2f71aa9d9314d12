// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Error types for the form engine.
//!
//! The taxonomy follows the lifecycle of a form:
//!
//! | Error | Raised by | Recoverable |
//! |-------|-----------|-------------|
//! | [`ConfigError`] | [`Registry::register`](crate::Registry::register) | No, abort the registration |
//! | [`FieldError`] | submission parsing | Yes, per submission |
//! | [`GatewayError`] | [`StorageGateway`](crate::StorageGateway) implementations | Yes, per submission |
//! | [`ValueError`] | typed assignment into an entity | Yes, surfaced as a field error |
//!
//! Everything reaching the caller of the engine is wrapped in [`FormError`].

use thiserror::Error;

use crate::{kind::FieldKind, value::Value};

/// Top-level error returned by [`FormEngine`](crate::FormEngine) operations.
#[derive(Debug, Error)]
pub enum FormError {
    /// Entity registration failed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A single field rejected the submission.
    ///
    /// Parsing is fail-fast, so at most one field error is reported per
    /// submission attempt.
    #[error("field `{field}`: {error}")]
    Field {
        /// Name of the offending field.
        field: &'static str,
        /// What went wrong.
        #[source]
        error: FieldError
    },

    /// The storage gateway failed to persist the entity.
    #[error("persistence error: {0}")]
    Persistence(#[source] GatewayError)
}

impl FormError {
    /// Attribute a [`FieldError`] to a field.
    pub fn field(field: &'static str, error: impl Into<FieldError>) -> Self {
        Self::Field {
            field,
            error: error.into()
        }
    }

    /// Check if this is a configuration error.
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a validation error (missing, malformed or rejected
    /// value).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Field { error, .. } if error.is_validation())
    }

    /// Check if this is a lookup error (referenced entity missing, gateway
    /// query failure).
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::Field { error, .. } if error.is_lookup())
    }

    /// Check if this is a persistence error.
    pub const fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    /// Name of the field the error is attributed to, if any.
    pub const fn field_name(&self) -> Option<&'static str> {
        match self {
            Self::Field { field, .. } => Some(*field),
            _ => None
        }
    }
}

/// Per-field submission error.
#[derive(Debug, Error)]
pub enum FieldError {
    /// Required field has no value.
    #[error("value is required")]
    Required,

    /// Validation hook rejected the coerced value.
    #[error("{0}")]
    Invalid(String),

    /// Posted string could not be coerced to the field kind.
    #[error("cannot parse `{value}` as {kind}: {reason}")]
    Parse {
        /// Target kind.
        kind:   FieldKind,
        /// Raw posted value.
        value:  String,
        /// Parser message.
        reason: String
    },

    /// Coerced value does not fit the entity slot.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// Referenced entity does not exist.
    #[error("{entity} `{id}` not found")]
    NotFound {
        /// Related entity name.
        entity: &'static str,
        /// Posted identifier.
        id:     String
    },

    /// Gateway query for a related entity failed.
    #[error("lookup failed: {0}")]
    Lookup(#[source] GatewayError),

    /// Uploaded file could not be stored.
    #[error("upload failed: {0}")]
    Upload(#[source] GatewayError),

    /// One-way hashing failed.
    #[error("hashing failed: {0}")]
    Hash(String)
}

impl FieldError {
    /// Build a parse error.
    pub fn parse(kind: FieldKind, value: &str, reason: impl ToString) -> Self {
        Self::Parse {
            kind,
            value: value.to_string(),
            reason: reason.to_string()
        }
    }

    /// Check if this is a validation error.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Required | Self::Invalid(_) | Self::Parse { .. } | Self::Value(_)
        )
    }

    /// Check if this is a lookup error.
    pub const fn is_lookup(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Lookup(_) | Self::Upload(_) | Self::Hash(_)
        )
    }
}

/// Typed assignment failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Value variant does not match the slot type.
    #[error("expected {expected}, found {found}")]
    Mismatch {
        /// Slot type.
        expected: &'static str,
        /// Value variant.
        found:    &'static str
    },

    /// Value does not fit the numeric range of the slot.
    #[error("{value} does not fit {target}")]
    OutOfRange {
        /// Rendered value.
        value:  String,
        /// Slot type.
        target: &'static str
    },

    /// Entity has no field with this name.
    #[error("unknown field `{0}`")]
    UnknownField(String)
}

impl ValueError {
    /// Build a mismatch error for `found`.
    pub fn mismatch(expected: &'static str, found: &Value) -> Self {
        Self::Mismatch {
            expected,
            found: found.type_name()
        }
    }

    /// Build a range error.
    pub fn out_of_range(value: impl ToString, target: &'static str) -> Self {
        Self::OutOfRange {
            value: value.to_string(),
            target
        }
    }
}

/// Registration-time configuration error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Relationship target uses an identifier type the resolver cannot
    /// filter on.
    #[error(
        "{entity}.{field}: related identifier must be an integer, string or UUID, found {shape}"
    )]
    UnsupportedIdentifier {
        /// Owning entity.
        entity: &'static str,
        /// Relationship field.
        field:  &'static str,
        /// Offending identifier shape.
        shape:  String
    },

    /// `options_from` names a provider the entity does not declare.
    #[error("{entity}.{field}: option provider `{provider}` is not declared")]
    UnknownOptionSource {
        /// Owning entity.
        entity:   &'static str,
        /// Select field.
        field:    &'static str,
        /// Provider name from the directive.
        provider: String
    }
}

/// Storage gateway failure.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Entity to save does not exist.
    #[error("{entity} `{id}` not found")]
    NotFound {
        /// Entity name.
        entity: &'static str,
        /// Identifier rendered as string.
        id:     String
    },

    /// Blob stream could not be read or written.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure.
    #[error("{0}")]
    Backend(String)
}

impl GatewayError {
    /// Check if this is a not-found error.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
