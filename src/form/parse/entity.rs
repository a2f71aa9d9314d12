// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Entity-level attribute parsing.
//!
//! This module handles parsing of `#[form(...)]` using darling and provides
//! the [`FormDef`] structure used by the code generators.

use darling::FromDeriveInput;
use syn::{DeriveInput, Generics, Ident};

use super::{field::FieldDef, source::OptionSource};

/// Entity-level attributes parsed from `#[form(...)]`.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(form), supports(struct_named))]
struct FormAttrs {
    /// Struct identifier (e.g., `User`).
    ident: Ident,

    /// Struct generics.
    generics: Generics,

    /// Entity name reported by `FormEntity::NAME`.
    ///
    /// Defaults to the struct name.
    #[darling(default)]
    name: Option<String>,

    /// Field whose rendered value labels the entity in option lists.
    ///
    /// Defaults to the identifier.
    #[darling(default)]
    label: Option<Ident>,

    /// Named option providers.
    #[darling(multiple, rename = "source")]
    sources: Vec<OptionSource>
}

/// Complete parsed form entity definition.
#[derive(Debug)]
pub struct FormDef {
    /// Struct identifier.
    pub ident: Ident,

    /// Struct generics, propagated to the generated impl.
    pub generics: Generics,

    /// Entity name.
    pub name: String,

    /// Label field.
    pub label: Option<Ident>,

    /// Named option providers.
    pub sources: Vec<OptionSource>,

    /// All fields in declaration order.
    pub fields: Vec<FieldDef>
}

impl FormDef {
    /// Parse the form definition from syn's `DeriveInput`.
    ///
    /// # Errors
    ///
    /// - Applied to anything but a struct with named fields
    /// - Zero or several `#[id]` fields
    /// - Unknown `#[field(...)]` option
    /// - `label` naming a missing or skipped field
    /// - `options_from` naming an undeclared source
    pub fn from_derive_input(input: &DeriveInput) -> darling::Result<Self> {
        let attrs = FormAttrs::from_derive_input(input)?;

        let named = match &input.data {
            syn::Data::Struct(data) => match &data.fields {
                syn::Fields::Named(named) => &named.named,
                _ => {
                    return Err(darling::Error::custom("Form requires named fields")
                        .with_span(&input.ident));
                }
            },
            _ => {
                return Err(darling::Error::custom("Form can only be derived for structs")
                    .with_span(&input.ident));
            }
        };

        let mut errors = darling::Error::accumulator();
        let fields: Vec<FieldDef> = named
            .iter()
            .filter_map(|field| errors.handle(FieldDef::from_field(field)))
            .collect();

        let ids = fields.iter().filter(|f| f.is_id).count();
        if ids != 1 {
            errors.push(
                darling::Error::custom(format!(
                    "Form requires exactly one #[id] field, found {ids}"
                ))
                .with_span(&input.ident)
            );
        }

        if let Some(label) = &attrs.label
            && !fields.iter().any(|f| f.ident == *label && !f.skip)
        {
            errors.push(
                darling::Error::custom(format!("label field `{label}` is not a form field"))
                    .with_span(label)
            );
        }

        for field in &fields {
            for directive in &field.directives {
                if directive.key != "options_from" {
                    continue;
                }
                let declared = directive
                    .values
                    .iter()
                    .all(|name| attrs.sources.iter().any(|s| s.name == *name));
                if !declared {
                    errors.push(
                        darling::Error::custom(format!(
                            "options_from `{}` has no matching #[form(source(...))]",
                            directive.values.join(",")
                        ))
                        .with_span(&field.ident)
                    );
                }
            }
        }

        errors.finish()?;

        Ok(Self {
            name: attrs.name.unwrap_or_else(|| attrs.ident.to_string()),
            ident: attrs.ident,
            generics: attrs.generics,
            label: attrs.label,
            sources: attrs.sources,
            fields
        })
    }

    /// The `#[id]` field.
    ///
    /// Always present after a successful parse.
    pub fn id_field(&self) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.is_id)
    }

    /// Fields registered with the engine: everything except the identifier.
    pub fn form_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| !f.is_id)
    }

    /// Fields readable and writable by name.
    pub fn value_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.form_fields().filter(|f| !f.skip)
    }
}
