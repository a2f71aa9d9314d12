// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Identifier and by-name field access generation.
//!
//! # Generated Methods
//!
//! | Method | Body |
//! |--------|------|
//! | `id_shape` | `<Id as FormValue>::shape()` |
//! | `identifier` | id value, `None` while zero |
//! | `assign_identifier` | `assign(&mut self.id, ..)` |
//! | `get` / `set` | one match arm per non-skipped form field |
//! | `label` | rendered label field, only with `#[form(label = "..")]` |

use proc_macro2::TokenStream;
use quote::quote;

use super::parse::FormDef;

/// Generates the identifier and field accessor methods.
pub fn generate(form: &FormDef) -> TokenStream {
    let identifier = identifier(form);
    let get_arms = form.value_fields().map(|f| {
        let ident = &f.ident;
        let name = f.name_str();
        quote! {
            #name => ::core::option::Option::Some(::modelform_core::FormValue::to_value(&self.#ident))
        }
    });
    let set_arms = form.value_fields().map(|f| {
        let ident = &f.ident;
        let name = f.name_str();
        quote! { #name => ::modelform_core::value::assign(&mut self.#ident, value) }
    });
    let label = form.label.as_ref().map(|label| {
        quote! {
            fn label(&self) -> ::std::string::String {
                ::modelform_core::FormValue::to_value(&self.#label).render()
            }
        }
    });

    quote! {
        #identifier

        fn get(&self, field: &str) -> ::core::option::Option<::modelform_core::Value> {
            match field {
                #(#get_arms,)*
                _ => ::core::option::Option::None
            }
        }

        #[allow(unused_variables)]
        fn set(
            &mut self,
            field: &str,
            value: ::modelform_core::Value
        ) -> ::core::result::Result<(), ::modelform_core::ValueError> {
            match field {
                #(#set_arms,)*
                _ => ::core::result::Result::Err(
                    ::modelform_core::ValueError::UnknownField(field.to_string())
                )
            }
        }

        #label
    }
}

fn identifier(form: &FormDef) -> TokenStream {
    let Some(id) = form.id_field() else {
        return TokenStream::new();
    };
    let ident = &id.ident;
    let ty = &id.ty;

    quote! {
        fn id_shape() -> ::modelform_core::TypeShape {
            <#ty as ::modelform_core::FormValue>::shape()
        }

        fn identifier(&self) -> ::core::option::Option<::modelform_core::Identifier> {
            ::modelform_core::Identifier::from_value(
                &::modelform_core::FormValue::to_value(&self.#ident)
            )
        }

        fn assign_identifier(
            &mut self,
            id: ::modelform_core::Identifier
        ) -> ::core::result::Result<(), ::modelform_core::ValueError> {
            ::modelform_core::value::assign(&mut self.#ident, id.into_value())
        }
    }
}
