// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Field kind inference.
//!
//! Every form field is classified into exactly one [`FieldKind`]. The kind is
//! derived from the declared type's [`TypeShape`] (reported by
//! [`FormValue::shape`](crate::FormValue::shape)) and the field's directive
//! table, once, when the entity is described.
//!
//! # Decision Table
//!
//! | Shape | Kind |
//! |-------|------|
//! | `Integer`, `Unsigned`, `Float` | `Number` (`Select` with an option source) |
//! | `Duration` | `Duration` |
//! | `Bool` | `Checkbox` |
//! | `Text`, `Uuid` | `Text`, or `TextArea` / `Password` / `Email` / `Select` by directive |
//! | `Date` | `Date` |
//! | `DateTime` | `DateTime` (`Date` with the `date` directive) |
//! | `Blob` | `File` |
//! | `Entity` | `ForeignReference` |
//! | `Collection(Entity)` | `ManyReference` (`MultiGroupField` with `multigroup`) |
//! | `Collection(primitive)` | `Select` |
//! | `Metadata`, `Unsupported`, nested collections | excluded |
//!
//! `Optional(shape)` is classified as `shape`. The `-` directive excludes any
//! field.

use std::fmt;

use crate::{directive::DirectiveTable, entity::EntityType};

/// Presentation kind of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Single-line text input.
    Text,
    /// Multi-line text input.
    TextArea,
    /// Password input.
    Password,
    /// Email input.
    Email,
    /// Numeric input.
    Number,
    /// Boolean checkbox.
    Checkbox,
    /// Calendar date (`YYYY-MM-DD`).
    Date,
    /// Date and time (`YYYY-MM-DD hh:mm:ss`).
    DateTime,
    /// Duration (`1h30m`).
    Duration,
    /// File upload.
    File,
    /// Choice among static or provided options.
    Select,
    /// Reference to one related entity.
    ForeignReference,
    /// References to many related entities.
    ManyReference,
    /// Many-to-many relation rendered as a selected/unselected dual list.
    MultiGroupField
}

impl FieldKind {
    /// Lowercase name used in messages and templates.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::TextArea => "textarea",
            Self::Password => "password",
            Self::Email => "email",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Duration => "duration",
            Self::File => "file",
            Self::Select => "select",
            Self::ForeignReference => "foreign_reference",
            Self::ManyReference => "many_reference",
            Self::MultiGroupField => "multi_group"
        }
    }

    /// Check if this kind holds references to other entities.
    pub const fn is_reference(&self) -> bool {
        matches!(
            self,
            Self::ForeignReference | Self::ManyReference | Self::MultiGroupField
        )
    }

    /// Check if this kind manages a many-to-many association.
    pub const fn is_many(&self) -> bool {
        matches!(self, Self::ManyReference | Self::MultiGroupField)
    }

    /// Check if the posted value is taken verbatim as a string.
    pub const fn is_textual(&self) -> bool {
        matches!(
            self,
            Self::Text | Self::TextArea | Self::Password | Self::Email
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Related entity type and the shape of its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationTarget {
    /// Related entity type.
    pub entity: EntityType,

    /// Shape of the related entity's identifier.
    pub id: Box<TypeShape>
}

/// Structural description of a field's declared Rust type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    /// Signed integer (`i8` to `i64`).
    Integer,
    /// Unsigned integer (`u8` to `u64`).
    Unsigned,
    /// Floating point (`f32`, `f64`).
    Float,
    /// `bool`.
    Bool,
    /// `String`.
    Text,
    /// `uuid::Uuid`.
    Uuid,
    /// `chrono::TimeDelta`.
    Duration,
    /// `chrono::NaiveDate`.
    Date,
    /// `chrono::NaiveDateTime`, `chrono::DateTime<Utc>`.
    DateTime,
    /// Stored upload ([`Blob`](crate::Blob)).
    Blob,
    /// Embedded id/timestamp block ([`Timestamps`](crate::Timestamps)).
    Metadata,
    /// Reference to a related entity ([`Ref`](crate::Ref)).
    Entity(RelationTarget),
    /// `Vec<T>`.
    Collection(Box<TypeShape>),
    /// `Option<T>`.
    Optional(Box<TypeShape>),
    /// Anything the engine cannot present.
    Unsupported
}

impl TypeShape {
    /// Strip any number of `Optional` wrappers.
    pub fn unwrap_optional(&self) -> &Self {
        match self {
            Self::Optional(inner) => inner.unwrap_optional(),
            other => other
        }
    }

    /// Check if the outermost shape is `Optional`.
    pub const fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Element shape of a collection, looking through `Optional`.
    pub fn element(&self) -> Option<&Self> {
        match self.unwrap_optional() {
            Self::Collection(inner) => Some(inner.unwrap_optional()),
            _ => None
        }
    }

    /// Relation target of a reference or collection of references.
    pub fn relation(&self) -> Option<&RelationTarget> {
        match self.unwrap_optional() {
            Self::Entity(target) => Some(target),
            Self::Collection(inner) => match inner.unwrap_optional() {
                Self::Entity(target) => Some(target),
                _ => None
            },
            _ => None
        }
    }

    /// Check if relationship filters can be built over this identifier
    /// shape.
    pub fn is_identifier(&self) -> bool {
        matches!(
            self.unwrap_optional(),
            Self::Integer | Self::Unsigned | Self::Text | Self::Uuid
        )
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => f.write_str("integer"),
            Self::Unsigned => f.write_str("unsigned"),
            Self::Float => f.write_str("float"),
            Self::Bool => f.write_str("bool"),
            Self::Text => f.write_str("text"),
            Self::Uuid => f.write_str("uuid"),
            Self::Duration => f.write_str("duration"),
            Self::Date => f.write_str("date"),
            Self::DateTime => f.write_str("datetime"),
            Self::Blob => f.write_str("blob"),
            Self::Metadata => f.write_str("metadata"),
            Self::Entity(target) => write!(f, "ref<{}>", target.entity.name()),
            Self::Collection(inner) => write!(f, "list<{inner}>"),
            Self::Optional(inner) => write!(f, "option<{inner}>"),
            Self::Unsupported => f.write_str("unsupported")
        }
    }
}

/// Classify a field.
///
/// Returns `None` when the field is excluded from forms. Never panics.
///
/// # Example
///
/// ```rust
/// use modelform_core::{DirectiveTable, FieldKind, TypeShape, infer_kind};
///
/// let plain = DirectiveTable::default();
/// assert_eq!(infer_kind(&TypeShape::Bool, &plain), Some(FieldKind::Checkbox));
///
/// let secret = DirectiveTable::parse("bcrypt");
/// assert_eq!(infer_kind(&TypeShape::Text, &secret), Some(FieldKind::Password));
/// ```
pub fn infer_kind(shape: &TypeShape, directives: &DirectiveTable) -> Option<FieldKind> {
    if directives.has("-") {
        return None;
    }
    let has_options = directives.has("options") || directives.has("options_from");

    match shape.unwrap_optional() {
        TypeShape::Integer | TypeShape::Unsigned | TypeShape::Float => {
            if has_options {
                Some(FieldKind::Select)
            } else {
                Some(FieldKind::Number)
            }
        }
        TypeShape::Duration => Some(FieldKind::Duration),
        TypeShape::Bool => Some(FieldKind::Checkbox),
        TypeShape::Text | TypeShape::Uuid => Some(text_kind(directives, has_options)),
        TypeShape::Date => Some(FieldKind::Date),
        TypeShape::DateTime => {
            if directives.has("date") {
                Some(FieldKind::Date)
            } else {
                Some(FieldKind::DateTime)
            }
        }
        TypeShape::Blob => Some(FieldKind::File),
        TypeShape::Entity(_) => Some(FieldKind::ForeignReference),
        TypeShape::Collection(inner) => match inner.unwrap_optional() {
            TypeShape::Entity(_) if directives.has("multigroup") => {
                Some(FieldKind::MultiGroupField)
            }
            TypeShape::Entity(_) => Some(FieldKind::ManyReference),
            TypeShape::Collection(_) | TypeShape::Metadata | TypeShape::Unsupported => None,
            _ => Some(FieldKind::Select)
        },
        TypeShape::Metadata | TypeShape::Unsupported | TypeShape::Optional(_) => None
    }
}

fn text_kind(directives: &DirectiveTable, has_options: bool) -> FieldKind {
    if has_options {
        FieldKind::Select
    } else if directives.has("textarea") {
        FieldKind::TextArea
    } else if directives.has("password") || directives.has("bcrypt") {
        FieldKind::Password
    } else if directives.has("email") {
        FieldKind::Email
    } else {
        FieldKind::Text
    }
}
