// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Field-level attribute parsing.
//!
//! Handles `#[id]` and `#[field(...)]`. Every option maps to a canonical
//! directive key understood by the runtime engine.

use syn::{Attribute, Field, Ident, LitStr, Meta, Path, Type, meta::ParseNestedMeta};

/// Presence-only options.
///
/// `#[field(required, bcrypt)]`
const FLAGS: &[&str] = &[
    "required",
    "readonly",
    "disabled",
    "hidden",
    "needs_admin",
    "readonlyfull",
    "disabledfull",
    "bcrypt",
    "textarea",
    "password",
    "email",
    "date",
    "multigroup",
    "multiple"
];

/// Single-string options.
///
/// `#[field(label = "E-mail", class = "wide")]`
const TEXT: &[&str] = &[
    "label",
    "placeholder",
    "help",
    "class",
    "label_class",
    "div_class",
    "custom",
    "autocomplete",
    "options_from"
];

/// One canonical directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Directive key.
    pub key: String,

    /// Values; empty for flags.
    pub values: Vec<String>
}

/// Function paths installed as field hooks.
#[derive(Debug, Default)]
pub struct FieldHooks {
    /// `parse = "path"`: `fn(&str) -> Result<Value, String>`.
    pub parse: Option<Path>,

    /// `validate = "path"`: `fn(&Value) -> Result<(), String>`.
    pub validate: Option<Path>,

    /// `options_with = "path"`: `fn() -> Vec<SelectOption>`.
    pub options: Option<Path>
}

/// Field definition with all parsed attributes.
///
/// # Options
///
/// | Option | Directive |
/// |--------|-----------|
/// | `required`, `readonly`, `bcrypt`, ... | flag of the same name |
/// | `label = "..."`, `class = "..."`, ... | key with one value |
/// | `options = "a,b,c"` | `options` with the comma-separated values |
/// | `directives = "..."` | compact string form, merged first |
/// | `skip` | `-`: excluded from forms and by-name access |
/// | `parse`, `validate`, `options_with` | hooks |
#[derive(Debug)]
pub struct FieldDef {
    /// Field identifier.
    pub ident: Ident,

    /// Field type.
    pub ty: Type,

    /// `#[id]` present.
    pub is_id: bool,

    /// `#[field(skip)]` present.
    pub skip: bool,

    /// Compact directive string.
    pub raw: Option<String>,

    /// Canonical directives in attribute order.
    pub directives: Vec<Directive>,

    /// Hook paths.
    pub hooks: FieldHooks
}

impl FieldDef {
    /// Parse field definition from syn's `Field`.
    ///
    /// # Errors
    ///
    /// Unknown options, malformed values, and fields without a name.
    pub fn from_field(field: &Field) -> darling::Result<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| darling::Error::custom("named field required"))?;

        let mut def = Self {
            ident,
            ty: field.ty.clone(),
            is_id: false,
            skip: false,
            raw: None,
            directives: Vec::new(),
            hooks: FieldHooks::default()
        };

        for attr in &field.attrs {
            if attr.path().is_ident("id") {
                def.is_id = true;
            } else if attr.path().is_ident("field") {
                def.parse_field_attr(attr)?;
            }
        }

        Ok(def)
    }

    /// Field name as registered with the engine.
    pub fn name_str(&self) -> String {
        self.ident.to_string()
    }

    fn parse_field_attr(&mut self, attr: &Attribute) -> darling::Result<()> {
        let Meta::List(list) = &attr.meta else {
            return Err(darling::Error::custom("expected #[field(...)]").with_span(attr));
        };
        list.parse_nested_meta(|meta| self.parse_option(&meta))?;
        Ok(())
    }

    fn parse_option(&mut self, meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
        let Some(key) = meta.path.get_ident().map(Ident::to_string) else {
            return Err(meta.error("expected an option name"));
        };

        match key.as_str() {
            "skip" => self.skip = true,
            "options" => {
                let values = string_value(meta)?
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect();
                self.push(key, values);
            }
            "directives" => self.raw = Some(string_value(meta)?),
            "parse" => self.hooks.parse = Some(path_value(meta)?),
            "validate" => self.hooks.validate = Some(path_value(meta)?),
            "options_with" => self.hooks.options = Some(path_value(meta)?),
            flag if FLAGS.contains(&flag) => self.push(key, Vec::new()),
            text if TEXT.contains(&text) => {
                let value = string_value(meta)?;
                self.push(key, vec![value]);
            }
            _ => return Err(meta.error(format!("unknown field option `{key}`")))
        }
        Ok(())
    }

    fn push(&mut self, key: String, values: Vec<String>) {
        self.directives.push(Directive {
            key,
            values
        });
    }
}

fn string_value(meta: &ParseNestedMeta<'_>) -> syn::Result<String> {
    let lit: LitStr = meta.value()?.parse()?;
    Ok(lit.value())
}

fn path_value(meta: &ParseNestedMeta<'_>) -> syn::Result<Path> {
    string_value(meta).and_then(|raw| syn::parse_str(&raw))
}
