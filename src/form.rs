// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Form derive macro implementation.
//!
//! Contains all code generation logic for `#[derive(Form)]`.

mod accessors;
pub mod parse;
mod specs;

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

use self::parse::FormDef;

/// Main entry point for the Form derive macro.
pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match FormDef::from_derive_input(&input) {
        Ok(form) => generate(&form).into(),
        Err(err) => err.write_errors().into()
    }
}

fn generate(form: &FormDef) -> proc_macro2::TokenStream {
    let ident = &form.ident;
    let (impl_generics, ty_generics, where_clause) = form.generics.split_for_impl();
    let name = &form.name;
    let specs = specs::field_specs(form);
    let sources = specs::option_sources(form);
    let accessors = accessors::generate(form);

    quote! {
        impl #impl_generics ::modelform_core::FormEntity for #ident #ty_generics #where_clause {
            const NAME: &'static str = #name;

            #specs
            #sources
            #accessors
        }
    }
}
