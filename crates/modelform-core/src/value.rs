// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Dynamic field values and typed slot conversion.
//!
//! The engine moves field data around as [`Value`]. Entity fields convert to
//! and from `Value` through [`FormValue`], implemented here for every type the
//! engine can present.
//!
//! # Optional Reconciliation
//!
//! [`assign`] writes a `Value` into a typed slot regardless of whether the
//! slot is `Option<T>` or a bare `T`:
//!
//! | Value | `T` slot | `Option<T>` slot |
//! |-------|----------|------------------|
//! | `Null` | [`FormValue::zero`] | `None` |
//! | concrete | `T` | `Some(T)` |
//!
//! ```rust
//! use modelform_core::{Value, value::assign};
//!
//! let mut bare: i32 = 7;
//! let mut optional: Option<i32> = None;
//!
//! assign(&mut bare, Value::Null).unwrap();
//! assign(&mut optional, Value::Int(3)).unwrap();
//!
//! assert_eq!(bare, 0);
//! assert_eq!(optional, Some(3));
//! ```

use std::{fmt, marker::PhantomData};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    coerce::format_duration,
    entity::{EntityType, FormEntity},
    error::ValueError,
    kind::{RelationTarget, TypeShape}
};

/// Canonical date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical date-time format.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Entity identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    /// Signed integer key.
    Int(i64),
    /// Unsigned integer key.
    UInt(u64),
    /// UUID key.
    Uuid(Uuid),
    /// String key.
    Text(String)
}

impl Identifier {
    /// Check if this is the zero value of its type (`0`, `""`, nil UUID).
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Int(v) => *v == 0,
            Self::UInt(v) => *v == 0,
            Self::Text(v) => v.is_empty(),
            Self::Uuid(v) => v.is_nil()
        }
    }

    /// Extract a non-zero identifier from a field value.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = match value {
            Value::Int(v) => Self::Int(*v),
            Value::UInt(v) => Self::UInt(*v),
            Value::Text(v) => Self::Text(v.clone()),
            Value::Uuid(v) => Self::Uuid(*v),
            Value::Ref(id) => id.clone(),
            _ => return None
        };
        (!id.is_zero()).then_some(id)
    }

    /// Convert into the matching primitive value.
    pub fn into_value(self) -> Value {
        match self {
            Self::Int(v) => Value::Int(v),
            Self::UInt(v) => Value::UInt(v),
            Self::Text(v) => Value::Text(v),
            Self::Uuid(v) => Value::Uuid(v)
        }
    }

    /// Parse a posted identifier according to the target's identifier shape.
    ///
    /// Returns `Ok(None)` for empty and zero identifiers.
    ///
    /// # Errors
    ///
    /// Returns the parser message when `raw` is not a valid identifier of
    /// `shape`.
    pub fn parse(shape: &TypeShape, raw: &str) -> Result<Option<Self>, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let id = match shape.unwrap_optional() {
            TypeShape::Integer => Self::Int(raw.parse().map_err(|e| format!("{e}"))?),
            TypeShape::Unsigned => Self::UInt(raw.parse().map_err(|e| format!("{e}"))?),
            TypeShape::Uuid => Self::Uuid(Uuid::parse_str(raw).map_err(|e| format!("{e}"))?),
            TypeShape::Text => Self::Text(raw.to_string()),
            other => return Err(format!("{other} cannot be used as an identifier"))
        };
        Ok((!id.is_zero()).then_some(id))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Uuid(v) => write!(f, "{v}")
        }
    }
}

impl From<i64> for Identifier {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Identifier {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<Uuid> for Identifier {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Stored upload reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Blob {
    /// Storage path returned by the gateway.
    pub path: String,

    /// Public URL returned by the gateway.
    pub url: String
}

impl Blob {
    /// Check if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.url.is_empty()
    }
}

/// Embedded persistence metadata.
///
/// Fields of this type never appear in forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    /// Creation time.
    pub created_at: Option<NaiveDateTime>,

    /// Last update time.
    pub updated_at: Option<NaiveDateTime>
}

/// Dynamic field value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point.
    Float(f64),
    /// String.
    Text(String),
    /// UUID.
    Uuid(Uuid),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time.
    DateTime(NaiveDateTime),
    /// Duration.
    Duration(TimeDelta),
    /// Stored upload.
    Blob(Blob),
    /// Reference to a related entity.
    Ref(Identifier),
    /// Collection.
    List(Vec<Value>)
}

impl Value {
    /// Variant name used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::UInt(_) => "unsigned",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Uuid(_) => "uuid",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Duration(_) => "duration",
            Self::Blob(_) => "blob",
            Self::Ref(_) => "reference",
            Self::List(_) => "list"
        }
    }

    /// Check if this is the empty/zero value of its type.
    ///
    /// Dates are never zero; an unset date is `Null`.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(v) => !v,
            Self::Int(v) => *v == 0,
            Self::UInt(v) => *v == 0,
            Self::Float(v) => *v == 0.0,
            Self::Text(v) => v.is_empty(),
            Self::Uuid(v) => v.is_nil(),
            Self::Date(_) | Self::DateTime(_) => false,
            Self::Duration(v) => v.is_zero(),
            Self::Blob(v) => v.is_empty(),
            Self::Ref(v) => v.is_zero(),
            Self::List(v) => v.is_empty()
        }
    }

    /// Render for display in a form input.
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(v) => v.to_string(),
            Self::Int(v) => v.to_string(),
            Self::UInt(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::Text(v) => v.clone(),
            Self::Uuid(v) => v.to_string(),
            Self::Date(v) => v.format(DATE_FORMAT).to_string(),
            Self::DateTime(v) => v.format(DATETIME_FORMAT).to_string(),
            Self::Duration(v) => format_duration(*v),
            Self::Blob(v) => v.url.clone(),
            Self::Ref(v) => v.to_string(),
            Self::List(items) => items
                .iter()
                .map(Self::render)
                .collect::<Vec<_>>()
                .join(",")
        }
    }

    /// Rendered strings of every element; a scalar yields one element and
    /// `Null` none.
    pub fn rendered_items(&self) -> Vec<String> {
        match self {
            Self::Null => Vec::new(),
            Self::List(items) => items.iter().map(Self::render).collect(),
            other => vec![other.render()]
        }
    }
}

/// Conversion between a field type and [`Value`].
///
/// Implemented for the primitives, `chrono`/`uuid` types, [`Blob`],
/// [`Timestamps`], [`Ref`], `Option<T>` and `Vec<T>`. Host types (enums,
/// newtypes) implement it to take part in forms.
pub trait FormValue: Sized {
    /// Structural shape used for kind inference.
    fn shape() -> TypeShape;

    /// Read the slot.
    fn to_value(&self) -> Value;

    /// Convert a non-null value into the slot type.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] when the variant does not fit.
    fn from_value(value: Value) -> Result<Self, ValueError>;

    /// Value stored when `Null` is assigned to a bare slot.
    fn zero() -> Self;
}

/// Types with their own string form.
///
/// Fields whose type implements this trait are parsed through it instead of
/// the built-in coercion when registered with `#[field(parse)]` or
/// [`FieldSpec::parse_with`](crate::FieldSpec::parse_with)`(parse_hook::<T>)`.
///
/// ```rust
/// use modelform_core::{FormValue, StringParsable, TypeShape, Value, ValueError};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// struct Percent(u8);
///
/// impl FormValue for Percent {
///     fn shape() -> TypeShape {
///         TypeShape::Unsigned
///     }
///
///     fn to_value(&self) -> Value {
///         Value::UInt(u64::from(self.0))
///     }
///
///     fn from_value(value: Value) -> Result<Self, ValueError> {
///         u8::from_value(value).map(Percent)
///     }
///
///     fn zero() -> Self {
///         Percent(0)
///     }
/// }
///
/// impl StringParsable for Percent {
///     fn parse_form_str(raw: &str) -> Result<Self, String> {
///         let digits = raw.trim().trim_end_matches('%');
///         digits.parse().map(Percent).map_err(|e| format!("{e}"))
///     }
/// }
///
/// assert_eq!(Percent::parse_form_str("40%"), Ok(Percent(40)));
/// ```
pub trait StringParsable: FormValue {
    /// Parse a posted string.
    ///
    /// # Errors
    ///
    /// Returns a message shown as the field's parse error.
    fn parse_form_str(raw: &str) -> Result<Self, String>;
}

/// Convert a value into `T`, reconciling `Null` with [`FormValue::zero`].
///
/// # Errors
///
/// Propagates [`FormValue::from_value`] errors.
pub fn reconcile<T: FormValue>(value: Value) -> Result<T, ValueError> {
    match value {
        Value::Null => Ok(T::zero()),
        value => T::from_value(value)
    }
}

/// Write a value into a typed slot.
///
/// # Errors
///
/// Propagates [`FormValue::from_value`] errors; the slot is left untouched
/// on error.
pub fn assign<T: FormValue>(slot: &mut T, value: Value) -> Result<(), ValueError> {
    *slot = reconcile(value)?;
    Ok(())
}

fn float_to_i64(value: f64, target: &'static str) -> Result<i64, ValueError> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
    if value.is_finite()
        && value.fract() == 0.0
        && value >= i64::MIN as f64
        && value < i64::MAX as f64
    {
        Ok(value as i64)
    } else {
        Err(ValueError::out_of_range(value, target))
    }
}

fn float_to_u64(value: f64, target: &'static str) -> Result<u64, ValueError> {
    if value.is_finite() && value.fract() == 0.0 && value >= 0.0 && value < u64::MAX as f64 {
        Ok(value as u64)
    } else {
        Err(ValueError::out_of_range(value, target))
    }
}

macro_rules! signed_form_value {
    ($($ty:ty),*) => {
        $(
            impl FormValue for $ty {
                fn shape() -> TypeShape {
                    TypeShape::Integer
                }

                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    let target = stringify!($ty);
                    let wide = match value {
                        Value::Int(v) => v,
                        Value::UInt(v) => {
                            i64::try_from(v).map_err(|_| ValueError::out_of_range(v, target))?
                        }
                        Value::Float(v) => float_to_i64(v, target)?,
                        other => return Err(ValueError::mismatch(target, &other))
                    };
                    <$ty>::try_from(wide).map_err(|_| ValueError::out_of_range(wide, target))
                }

                fn zero() -> Self {
                    0
                }
            }
        )*
    };
}

macro_rules! unsigned_form_value {
    ($($ty:ty),*) => {
        $(
            impl FormValue for $ty {
                fn shape() -> TypeShape {
                    TypeShape::Unsigned
                }

                fn to_value(&self) -> Value {
                    Value::UInt(u64::from(*self))
                }

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    let target = stringify!($ty);
                    let wide = match value {
                        Value::UInt(v) => v,
                        Value::Int(v) => {
                            u64::try_from(v).map_err(|_| ValueError::out_of_range(v, target))?
                        }
                        Value::Float(v) => float_to_u64(v, target)?,
                        other => return Err(ValueError::mismatch(target, &other))
                    };
                    <$ty>::try_from(wide).map_err(|_| ValueError::out_of_range(wide, target))
                }

                fn zero() -> Self {
                    0
                }
            }
        )*
    };
}

signed_form_value!(i8, i16, i32, i64);
unsigned_form_value!(u8, u16, u32, u64);

impl FormValue for f64 {
    fn shape() -> TypeShape {
        TypeShape::Float
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f64),
            Value::UInt(v) => Ok(v as f64),
            other => Err(ValueError::mismatch("f64", &other))
        }
    }

    fn zero() -> Self {
        0.0
    }
}

impl FormValue for f32 {
    fn shape() -> TypeShape {
        TypeShape::Float
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        let wide = f64::from_value(value).map_err(|err| match err {
            ValueError::Mismatch { found, .. } => ValueError::Mismatch {
                expected: "f32",
                found
            },
            other => other
        })?;
        if wide.is_finite() && wide.abs() > f64::from(f32::MAX) {
            return Err(ValueError::out_of_range(wide, "f32"));
        }
        Ok(wide as f32)
    }

    fn zero() -> Self {
        0.0
    }
}

impl FormValue for bool {
    fn shape() -> TypeShape {
        TypeShape::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(ValueError::mismatch("bool", &other))
        }
    }

    fn zero() -> Self {
        false
    }
}

impl FormValue for String {
    fn shape() -> TypeShape {
        TypeShape::Text
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Text(v) => Ok(v),
            Value::Uuid(v) => Ok(v.to_string()),
            other => Err(ValueError::mismatch("String", &other))
        }
    }

    fn zero() -> Self {
        Self::new()
    }
}

impl FormValue for Uuid {
    fn shape() -> TypeShape {
        TypeShape::Uuid
    }

    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Uuid(v) => Ok(v),
            Value::Text(v) => Self::parse_str(&v).map_err(|_| ValueError::Mismatch {
                expected: "Uuid",
                found:    "text"
            }),
            other => Err(ValueError::mismatch("Uuid", &other))
        }
    }

    fn zero() -> Self {
        Self::nil()
    }
}

impl FormValue for NaiveDate {
    fn shape() -> TypeShape {
        TypeShape::Date
    }

    fn to_value(&self) -> Value {
        Value::Date(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Date(v) => Ok(v),
            Value::DateTime(v) => Ok(v.date()),
            other => Err(ValueError::mismatch("NaiveDate", &other))
        }
    }

    fn zero() -> Self {
        Self::default()
    }
}

impl FormValue for NaiveDateTime {
    fn shape() -> TypeShape {
        TypeShape::DateTime
    }

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::DateTime(v) => Ok(v),
            Value::Date(v) => v.and_hms_opt(0, 0, 0).ok_or(ValueError::Mismatch {
                expected: "NaiveDateTime",
                found:    "date"
            }),
            other => Err(ValueError::mismatch("NaiveDateTime", &other))
        }
    }

    fn zero() -> Self {
        Self::default()
    }
}

impl FormValue for DateTime<Utc> {
    fn shape() -> TypeShape {
        TypeShape::DateTime
    }

    fn to_value(&self) -> Value {
        Value::DateTime(self.naive_utc())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        NaiveDateTime::from_value(value).map(|naive| naive.and_utc())
    }

    fn zero() -> Self {
        Self::default()
    }
}

impl FormValue for TimeDelta {
    fn shape() -> TypeShape {
        TypeShape::Duration
    }

    fn to_value(&self) -> Value {
        Value::Duration(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Duration(v) => Ok(v),
            other => Err(ValueError::mismatch("TimeDelta", &other))
        }
    }

    fn zero() -> Self {
        Self::zero()
    }
}

impl FormValue for Blob {
    fn shape() -> TypeShape {
        TypeShape::Blob
    }

    fn to_value(&self) -> Value {
        if self.is_empty() {
            Value::Null
        } else {
            Value::Blob(self.clone())
        }
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Blob(v) => Ok(v),
            other => Err(ValueError::mismatch("Blob", &other))
        }
    }

    fn zero() -> Self {
        Self::default()
    }
}

impl FormValue for Timestamps {
    fn shape() -> TypeShape {
        TypeShape::Metadata
    }

    fn to_value(&self) -> Value {
        Value::Null
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        Err(ValueError::mismatch("Timestamps", &value))
    }

    fn zero() -> Self {
        Self::default()
    }
}

impl<T: FormValue> FormValue for Option<T> {
    fn shape() -> TypeShape {
        TypeShape::Optional(Box::new(T::shape()))
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, FormValue::to_value)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            value => T::from_value(value).map(Some)
        }
    }

    fn zero() -> Self {
        None
    }
}

impl<T: FormValue> FormValue for Vec<T> {
    fn shape() -> TypeShape {
        TypeShape::Collection(Box::new(T::shape()))
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FormValue::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::List(items) => items.into_iter().map(reconcile).collect(),
            Value::Null => Ok(Vec::new()),
            single => Ok(vec![T::from_value(single)?])
        }
    }

    fn zero() -> Self {
        Vec::new()
    }
}

/// Reference to a related entity, stored by identifier.
///
/// `Ref<T>` fields are presented as [`ForeignReference`] selects;
/// `Vec<Ref<T>>` fields as [`ManyReference`] lists.
///
/// [`ForeignReference`]: crate::FieldKind::ForeignReference
/// [`ManyReference`]: crate::FieldKind::ManyReference
pub struct Ref<T> {
    id:      Option<Identifier>,
    _target: PhantomData<fn() -> T>
}

impl<T> Ref<T> {
    /// Reference to the entity with `id`.
    pub fn new(id: impl Into<Identifier>) -> Self {
        let id = id.into();
        Self {
            id:      (!id.is_zero()).then_some(id),
            _target: PhantomData
        }
    }

    /// Unset reference.
    pub const fn unset() -> Self {
        Self {
            id:      None,
            _target: PhantomData
        }
    }

    /// Identifier of the referenced entity.
    pub const fn id(&self) -> Option<&Identifier> {
        self.id.as_ref()
    }

    /// Check if the reference points to an entity.
    pub const fn is_set(&self) -> bool {
        self.id.is_some()
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            id:      self.id.clone(),
            _target: PhantomData
        }
    }
}

impl<T> Default for Ref<T> {
    fn default() -> Self {
        Self::unset()
    }
}

impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Ref<T> {}

impl<T> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ref").field(&self.id).finish()
    }
}

impl<T: FormEntity> FormValue for Ref<T> {
    fn shape() -> TypeShape {
        TypeShape::Entity(RelationTarget {
            entity: EntityType::of::<T>(),
            id:     Box::new(T::id_shape())
        })
    }

    fn to_value(&self) -> Value {
        self.id.clone().map_or(Value::Null, Value::Ref)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match &value {
            Value::Ref(_) | Value::Int(_) | Value::UInt(_) | Value::Text(_) | Value::Uuid(_) => {
                Ok(Identifier::from_value(&value).map_or_else(Self::unset, Self::new))
            }
            other => Err(ValueError::mismatch("Ref", other))
        }
    }

    fn zero() -> Self {
        Self::unset()
    }
}
