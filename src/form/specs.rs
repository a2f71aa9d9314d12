// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Field registration generation.
//!
//! Generates `field_specs()` and `option_sources()`:
//!
//! ```rust,ignore
//! fn field_specs() -> Vec<FieldSpec> {
//!     vec![
//!         FieldSpec::of::<String>("name").flag("required"),
//!         FieldSpec::of::<String>("tier").set("options_from", ["tiers"]),
//!         FieldSpec::new("cache", TypeShape::Unsupported).flag("-"),
//!     ]
//! }
//! ```
//!
//! Skipped fields keep their structural position but never touch their
//! type, so it does not need to implement `FormValue`.

use proc_macro2::TokenStream;
use quote::quote;

use super::parse::{FieldDef, FormDef};

/// Generates `field_specs()` in declaration order.
pub fn field_specs(form: &FormDef) -> TokenStream {
    let specs = form.form_fields().map(field_spec);
    quote! {
        fn field_specs() -> ::std::vec::Vec<::modelform_core::FieldSpec> {
            ::std::vec![#(#specs),*]
        }
    }
}

/// Generates `option_sources()`, or nothing when none are declared.
pub fn option_sources(form: &FormDef) -> TokenStream {
    if form.sources.is_empty() {
        return TokenStream::new();
    }
    let entries = form.sources.iter().map(|source| {
        let name = &source.name;
        let with = &source.with;
        quote! { (#name, #with as ::modelform_core::OptionProvider) }
    });
    quote! {
        fn option_sources() -> ::std::vec::Vec<(&'static str, ::modelform_core::OptionProvider)> {
            ::std::vec![#(#entries),*]
        }
    }
}

fn field_spec(field: &FieldDef) -> TokenStream {
    let name = field.name_str();
    if field.skip {
        return quote! {
            ::modelform_core::FieldSpec::new(#name, ::modelform_core::TypeShape::Unsupported).skip()
        };
    }

    let ty = &field.ty;
    let raw = field.raw.as_ref().map(|raw| quote! { .directives(#raw) });
    let directives = field.directives.iter().map(|directive| {
        let key = &directive.key;
        let values = &directive.values;
        if values.is_empty() {
            quote! { .flag(#key) }
        } else {
            quote! { .set(#key, [#(#values),*]) }
        }
    });
    let parse = field.hooks.parse.as_ref().map(|p| quote! { .parse_with(#p) });
    let validate = field.hooks.validate.as_ref().map(|p| quote! { .validate_with(#p) });
    let options = field.hooks.options.as_ref().map(|p| quote! { .options_with(#p) });

    quote! {
        ::modelform_core::FieldSpec::of::<#ty>(#name)
            #raw
            #(#directives)*
            #parse
            #validate
            #options
    }
}
