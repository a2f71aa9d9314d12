// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Per-field directives.
//!
//! Directives are stored in a [`DirectiveTable`], a mapping from directive
//! name to a list of values. Typed registration APIs (the `#[field(...)]`
//! attribute, [`FieldSpec`](crate::FieldSpec) builder methods) write
//! canonical keys directly; the compact string form is accepted by
//! [`DirectiveTable::parse`].
//!
//! # Compact Syntax
//!
//! ```text
//! required; options:free,pro,team; class:wide,mono; custom:data-role="x"
//! ```
//!
//! - Fragments are separated by `;`
//! - A bare key is a presence-only flag
//! - `key:v1,v2` stores a comma-split value list
//! - `custom`, `label`, `placeholder`, `help` keep their value verbatim
//! - Fragments with an empty key are dropped; parsing never fails
//!
//! [`FieldFlags`] is the typed view the engine works with.

use indexmap::IndexMap;

/// Directives whose value is kept whole instead of comma-split.
const VERBATIM: &[&str] = &["custom", "label", "placeholder", "help"];

/// Ordered directive-name → values mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveTable {
    entries: IndexMap<String, Vec<String>>
}

impl DirectiveTable {
    /// Parse the compact directive syntax.
    ///
    /// # Example
    ///
    /// ```rust
    /// use modelform_core::DirectiveTable;
    ///
    /// let table = DirectiveTable::parse("required; options:a,b,c");
    /// assert!(table.has("required"));
    /// assert_eq!(table.get("options"), Some(&["a".to_string(), "b".into(), "c".into()][..]));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let mut table = Self::default();
        for fragment in raw.split(';') {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }
            match fragment.split_once(':') {
                Some((key, rest)) => {
                    let key = key.trim();
                    if key.is_empty() {
                        continue;
                    }
                    if VERBATIM.contains(&key) {
                        let rest = rest.trim();
                        if rest.is_empty() {
                            table.insert_flag(key);
                        } else {
                            table.insert(key, [rest]);
                        }
                    } else {
                        table.insert(
                            key,
                            rest.split(',').map(str::trim).filter(|v| !v.is_empty())
                        );
                    }
                }
                None => table.insert_flag(fragment)
            }
        }
        table
    }

    /// Add a presence-only directive.
    pub fn insert_flag(&mut self, key: impl Into<String>) {
        self.entries.entry(key.into()).or_default();
    }

    /// Add values to a directive, extending any existing list.
    pub fn insert<I, V>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>
    {
        self.entries
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
    }

    /// Merge another table into this one.
    pub fn merge(&mut self, other: Self) {
        for (key, values) in other.entries {
            self.insert(key, values);
        }
    }

    /// Check if a directive is present.
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All values of a directive.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// First value of a directive.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// First value of a directive, or `default`.
    pub fn value_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.value(key).unwrap_or(default)
    }

    /// Number of directives.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate directives in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }
}

/// Typed view over a [`DirectiveTable`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFlags {
    /// `required`
    pub required: bool,

    /// `disabled`
    pub disabled: bool,

    /// `readonly`
    pub readonly: bool,

    /// `disabledfull`: writable only while the stored value is empty.
    pub disabled_full: bool,

    /// `readonlyfull`: writable only while the stored value is empty.
    pub readonly_full: bool,

    /// `needs_admin`: visible and writable for elevated actors only.
    pub needs_admin: bool,

    /// `multiple`
    pub multiple: bool,

    /// `hidden`
    pub hidden: bool,

    /// `bcrypt`: hash the posted value before storing it.
    pub bcrypt: bool,

    /// `options:a,b,c`
    pub options: Vec<String>,

    /// `options_from:name`
    pub options_from: Option<String>,

    /// `class`
    pub class: Vec<String>,

    /// `label_class`
    pub label_class: Vec<String>,

    /// `div_class`
    pub div_class: Vec<String>,

    /// `custom`: opaque attribute string for the template.
    pub custom: Option<String>,

    /// `autocomplete`
    pub autocomplete: Option<String>,

    /// `label`
    pub label: Option<String>,

    /// `placeholder`
    pub placeholder: Option<String>,

    /// `help`
    pub help: Option<String>
}

impl FieldFlags {
    /// Build the typed view.
    pub fn from_table(table: &DirectiveTable) -> Self {
        let list = |key: &str| table.get(key).map(<[String]>::to_vec).unwrap_or_default();
        let text = |key: &str| table.value(key).map(str::to_string);

        Self {
            required:      table.has("required"),
            disabled:      table.has("disabled"),
            readonly:      table.has("readonly"),
            disabled_full: table.has("disabledfull"),
            readonly_full: table.has("readonlyfull"),
            needs_admin:   table.has("needs_admin"),
            multiple:      table.has("multiple"),
            hidden:        table.has("hidden"),
            bcrypt:        table.has("bcrypt"),
            options:       list("options"),
            options_from:  text("options_from"),
            class:         list("class"),
            label_class:   list("label_class"),
            div_class:     list("div_class"),
            custom:        text("custom"),
            autocomplete:  text("autocomplete"),
            label:         text("label"),
            placeholder:   text("placeholder"),
            help:          text("help")
        }
    }

    /// Check if submissions never write this field.
    pub const fn is_locked(&self) -> bool {
        self.disabled || self.readonly || self.hidden
    }

    /// Check if the field is writable only while empty.
    pub const fn has_full_override(&self) -> bool {
        self.disabled_full || self.readonly_full
    }
}
