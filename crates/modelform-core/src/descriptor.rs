// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Field registrations and descriptors.
//!
//! A [`FieldSpec`] is what an entity declares about one of its fields: the
//! name, the structural shape, the directives and the optional hooks. The
//! [`Registry`](crate::Registry) turns specs into immutable
//! [`FieldDescriptor`]s by inferring the kind and resolving option sources.
//!
//! # Builder
//!
//! ```rust
//! use modelform_core::{FieldSpec, FieldKind};
//!
//! let spec = FieldSpec::of::<String>("plan")
//!     .required()
//!     .options(["free", "pro", "team"])
//!     .set("class", ["wide"]);
//!
//! assert!(spec.directives.has("required"));
//! assert_eq!(spec.directives.value("options"), Some("free"));
//! ```

use crate::{
    directive::{DirectiveTable, FieldFlags},
    kind::{FieldKind, RelationTarget, TypeShape},
    value::{FormValue, Value}
};

/// Custom string parser (`StringParsable` capability).
pub type ParseHook = fn(&str) -> Result<Value, String>;

/// Post-coercion validation.
pub type ValidateHook = fn(&Value) -> Result<(), String>;

/// Dynamic option source for `Select` fields.
pub type OptionProvider = fn() -> Vec<SelectOption>;

/// One entry of a select list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Submitted value.
    pub value: String,

    /// Displayed text.
    pub label: String,

    /// Matches the current value.
    pub selected: bool
}

impl SelectOption {
    /// Unselected option.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value:    value.into(),
            label:    label.into(),
            selected: false
        }
    }

    /// Option whose label is its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
            selected: false
        }
    }

    /// Set the selected flag.
    #[must_use]
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

/// Optional per-field hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldHooks {
    /// Replaces built-in string coercion.
    pub parse: Option<ParseHook>,

    /// Runs after coercion; an error aborts the submission.
    pub validate: Option<ValidateHook>,

    /// Option source, resolved from `options_from` at description time.
    pub options: Option<OptionProvider>
}

/// Field registration.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Field name as used in submissions.
    pub name: &'static str,

    /// Declared type shape.
    pub shape: TypeShape,

    /// Directives.
    pub directives: DirectiveTable,

    /// Hooks.
    pub hooks: FieldHooks
}

impl FieldSpec {
    /// Spec with an explicit shape.
    pub fn new(name: &'static str, shape: TypeShape) -> Self {
        Self {
            name,
            shape,
            directives: DirectiveTable::default(),
            hooks: FieldHooks::default()
        }
    }

    /// Spec for a field of type `V`.
    pub fn of<V: FormValue>(name: &'static str) -> Self {
        Self::new(name, V::shape())
    }

    /// Merge directives in the compact string form.
    #[must_use]
    pub fn directives(mut self, raw: &str) -> Self {
        self.directives.merge(DirectiveTable::parse(raw));
        self
    }

    /// Add a presence-only directive.
    #[must_use]
    pub fn flag(mut self, key: &str) -> Self {
        self.directives.insert_flag(key);
        self
    }

    /// Add directive values.
    #[must_use]
    pub fn set<I, V>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>
    {
        self.directives.insert(key, values);
        self
    }

    /// `required`
    #[must_use]
    pub fn required(self) -> Self {
        self.flag("required")
    }

    /// `readonly`
    #[must_use]
    pub fn readonly(self) -> Self {
        self.flag("readonly")
    }

    /// `options:..`
    #[must_use]
    pub fn options<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>
    {
        self.set("options", values)
    }

    /// Exclude the field from forms.
    #[must_use]
    pub fn skip(self) -> Self {
        self.flag("-")
    }

    /// Install a custom string parser.
    #[must_use]
    pub fn parse_with(mut self, hook: ParseHook) -> Self {
        self.hooks.parse = Some(hook);
        self
    }

    /// Install a validation hook.
    #[must_use]
    pub fn validate_with(mut self, hook: ValidateHook) -> Self {
        self.hooks.validate = Some(hook);
        self
    }

    /// Install an option provider directly.
    #[must_use]
    pub fn options_with(mut self, provider: OptionProvider) -> Self {
        self.hooks.options = Some(provider);
        self
    }
}

/// Immutable description of one form field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: &'static str,

    /// Presentation kind.
    pub kind: FieldKind,

    /// Directives as registered.
    pub directives: DirectiveTable,

    /// Position among the entity's registered fields, excluded ones
    /// included.
    pub structural_index: usize,

    /// Declared type shape.
    pub shape: TypeShape,

    /// Typed view of [`directives`](Self::directives).
    pub flags: FieldFlags,

    /// Hooks, with the option provider resolved.
    pub hooks: FieldHooks
}

impl FieldDescriptor {
    /// Related entity of a reference field.
    pub fn relation(&self) -> Option<&RelationTarget> {
        self.shape.relation()
    }

    /// Check if the slot is a collection.
    pub fn is_collection(&self) -> bool {
        self.shape.element().is_some()
    }

    /// Check if the field accepts several values.
    pub fn is_multiple(&self) -> bool {
        self.flags.multiple || self.kind.is_many() || self.is_collection()
    }

    /// Element shape used for per-value coercion.
    pub fn element_shape(&self) -> &TypeShape {
        self.shape.element().unwrap_or_else(|| self.shape.unwrap_optional())
    }

    /// Options of a non-reference `Select`: static `options` first, then the
    /// provider's.
    pub fn static_options(&self) -> Vec<SelectOption> {
        let mut options: Vec<SelectOption> = self
            .flags
            .options
            .iter()
            .map(SelectOption::plain)
            .collect();
        if let Some(provider) = self.hooks.options {
            options.extend(provider());
        }
        options
    }
}

/// Build a parse hook from a [`StringParsable`](crate::value::StringParsable)
/// type.
pub fn parse_hook<T: crate::value::StringParsable>(raw: &str) -> Result<Value, String> {
    T::parse_form_str(raw).map(|parsed| parsed.to_value())
}
